//! Codec discovery for fragmented MP4 streams
//!
//! This module provides:
//! - The [`Demuxer`] boundary the buffering engine talks to
//! - Init segment codec discovery built on `mp4-atom` ([`Mp4Demuxer`])
//! - RFC 6381 codec strings for H.264, H.265, AV1 and AAC
//! - MIME rendering for the sink track ([`CodecDescriptor`])

pub mod aac;
pub mod av1;
pub mod codec;
pub mod demux;
pub mod h264;
pub mod hevc;
pub mod mp4;

pub use av1::Av1Profile;
pub use codec::CodecDescriptor;
pub use demux::{DemuxReply, Demuxer};
pub use hevc::HevcProfile;
pub use mp4::{init_codecs, Mp4Demuxer};
