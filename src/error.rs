//! Error types
//!
//! Nothing in the player raises across its public lifecycle; these types
//! travel through `Result`s internally, into log events and into the
//! `on_merger_error` callback.

use std::fmt;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug, Clone)]
pub enum Error {
    /// Endpoint is not a `ws://` or `wss://` URL
    InvalidEndpoint(String),
    /// Configuration value out of range
    InvalidConfig(&'static str),
    /// Codec discovery failed on the first segment
    Demux(DemuxError),
    /// Playback sink rejected an operation
    Sink(SinkError),
    /// No Tokio runtime to run the player on
    NoRuntime,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidEndpoint(url) => {
                write!(f, "Invalid endpoint (only ws:// and wss:// are supported): {}", url)
            }
            Error::InvalidConfig(what) => write!(f, "Invalid configuration: {}", what),
            Error::Demux(e) => write!(f, "Demux error: {}", e),
            Error::Sink(e) => write!(f, "Sink error: {}", e),
            Error::NoRuntime => write!(f, "Player must be started within a Tokio runtime"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Demux(e) => Some(e),
            Error::Sink(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DemuxError> for Error {
    fn from(e: DemuxError) -> Self {
        Error::Demux(e)
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Error::Sink(e)
    }
}

/// Errors raised while probing an init segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemuxError {
    /// Input ended in the middle of a box
    Truncated,
    /// No `moov` box in the first segment
    MissingMovie,
    /// `moov` present but without usable tracks
    NoTracks,
    /// Box contents did not match the expected layout
    Malformed(&'static str),
    /// Box tree could not be decoded
    Decode(String),
    /// Sample entry without a known codec string
    UnsupportedCodec(String),
}

impl fmt::Display for DemuxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DemuxError::Truncated => write!(f, "truncated box"),
            DemuxError::MissingMovie => write!(f, "no moov box in first segment"),
            DemuxError::NoTracks => write!(f, "moov box has no tracks"),
            DemuxError::Malformed(what) => write!(f, "malformed {}", what),
            DemuxError::Decode(msg) => write!(f, "decode failed: {}", msg),
            DemuxError::UnsupportedCodec(entry) => write!(f, "unsupported codec: {}", entry),
        }
    }
}

impl std::error::Error for DemuxError {}

impl From<mp4_atom::Error> for DemuxError {
    fn from(e: mp4_atom::Error) -> Self {
        DemuxError::Decode(e.to_string())
    }
}

/// Errors reported by a playback sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// Sink could not be created
    Unavailable(String),
    /// MIME type not accepted when opening the track
    UnsupportedType(String),
    /// Operation attempted while the sink is mid-update
    Busy,
    /// Operation attempted after the sink was closed
    Closed,
    /// Any other sink-side failure
    Other(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Unavailable(msg) => write!(f, "sink unavailable: {}", msg),
            SinkError::UnsupportedType(mime) => write!(f, "unsupported type: {}", mime),
            SinkError::Busy => write!(f, "sink is updating"),
            SinkError::Closed => write!(f, "sink is closed"),
            SinkError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for SinkError {}
