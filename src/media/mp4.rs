//! fMP4 init segment codec discovery
//!
//! Decodes the `moov` box of the first segment and renders one RFC 6381
//! codec string per track from its first sample entry:
//!
//! ```text
//! moov
//! └── trak (one per track)
//!     └── mdia/minf/stbl/stsd
//!         └── avc1 | hvc1 | hev1 | av01 | vp09 | mp4a | Opus
//!             └── avcC | hvcC | av1C | vpcC | esds | dOps
//! ```

use std::io::Cursor;

use bytes::{Bytes, BytesMut};
use mp4_atom::{Any, Atom, Codec, DecodeMaybe, Moov};

use crate::error::DemuxError;

use super::aac;
use super::av1::Av1Profile;
use super::demux::{DemuxReply, Demuxer};
use super::h264;
use super::hevc::HevcProfile;

/// Codec strings for every track in an init segment, in track order
pub fn init_codecs(init: Bytes) -> Result<Vec<String>, DemuxError> {
    let moov = read_moov(init)?;
    if moov.trak.is_empty() {
        return Err(DemuxError::NoTracks);
    }

    moov.trak
        .iter()
        .map(|trak| {
            let codec = trak
                .mdia
                .minf
                .stbl
                .stsd
                .codecs
                .first()
                .ok_or(DemuxError::Malformed("stsd"))?;
            codec_string(codec)
        })
        .collect()
}

fn read_moov(mut init: Bytes) -> Result<Moov, DemuxError> {
    let len = init.len();
    let mut cursor = Cursor::new(&mut init);

    while let Some(atom) = Any::decode_maybe(&mut cursor)? {
        if let Any::Moov(moov) = atom {
            return Ok(moov);
        }
    }

    // decode_maybe stops short of a box that runs past the end
    if (cursor.position() as usize) < len {
        Err(DemuxError::Truncated)
    } else {
        Err(DemuxError::MissingMovie)
    }
}

fn codec_string(codec: &Codec) -> Result<String, DemuxError> {
    let codec = match codec {
        Codec::Avc1(avc1) => {
            let avcc = &avc1.avcc;
            h264::codec_string(
                "avc1",
                avcc.avc_profile_indication,
                avcc.profile_compatibility,
                avcc.avc_level_indication,
            )
        }
        Codec::Hvc1(hvc1) => HevcProfile::parse(config_record(&hvc1.hvcc)?)?.codec_string("hvc1"),
        Codec::Hev1(hev1) => HevcProfile::parse(config_record(&hev1.hvcc)?)?.codec_string("hev1"),
        Codec::Av01(av01) => Av1Profile::parse(config_record(&av01.av1c)?)?.codec_string(),
        Codec::Vp08(_) => "vp8".to_string(),
        Codec::Vp09(vp09) => {
            let vpcc = &vp09.vpcc;
            format!(
                "vp09.{:02}.{:02}.{:02}",
                vpcc.profile, vpcc.level, vpcc.bit_depth
            )
        }
        Codec::Mp4a(mp4a) => {
            let desc = &mp4a.esds.es_desc.dec_config;
            aac::codec_string(desc.object_type_indication, desc.dec_specific.profile)
        }
        Codec::Opus(_) => "opus".to_string(),
        Codec::Unknown(kind) => return Err(DemuxError::UnsupportedCodec(format!("{:?}", kind))),
        other => return Err(DemuxError::UnsupportedCodec(format!("{:?}", other))),
    };
    Ok(codec)
}

/// Re-encode a decoder configuration box body to its on-wire record
fn config_record<A: Atom>(atom: &A) -> Result<Bytes, DemuxError> {
    let mut record = BytesMut::new();
    atom.encode_body(&mut record)?;
    Ok(record.freeze())
}

/// Default [`Demuxer`] for fragmented MP4 streams
///
/// Answers synchronously from the init segment; the reply still travels
/// through the event queue.
#[derive(Debug, Default, Clone)]
pub struct Mp4Demuxer;

impl Mp4Demuxer {
    pub fn new() -> Self {
        Self
    }
}

impl Demuxer for Mp4Demuxer {
    fn demux(&mut self, init: Bytes, reply: DemuxReply) {
        reply.send(init_codecs(init));
    }
}
