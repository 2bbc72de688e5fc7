//! MPEG-4 audio codec strings
//!
//! In fMP4 the decoder configuration sits inside the `esds` box of an
//! `mp4a` sample entry:
//!
//! ```text
//! esds (full box)
//! └── ES_Descriptor (tag 0x03)
//!     └── DecoderConfigDescriptor (tag 0x04)  objectTypeIndication
//!         └── DecoderSpecificInfo (tag 0x05)  audioObjectType
//! ```

/// Object type indication for MPEG-4 audio
pub const OTI_MPEG4_AUDIO: u8 = 0x40;

/// RFC 6381 codec string: `mp4a.40.2` for AAC-LC
///
/// The audio object type is only meaningful for MPEG-4 audio; any other
/// object type renders as `mp4a.<oti>` (e.g. `mp4a.6b` for MP3).
pub fn codec_string(object_type_indication: u8, audio_object_type: u8) -> String {
    if object_type_indication == OTI_MPEG4_AUDIO && audio_object_type != 0 {
        format!("mp4a.{:02x}.{}", object_type_indication, audio_object_type)
    } else {
        format!("mp4a.{:02x}", object_type_indication)
    }
}
