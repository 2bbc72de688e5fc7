//! H.264/AVC codec strings
//!
//! The `avcC` box (AVCDecoderConfigurationRecord) starts with the three
//! bytes an RFC 6381 `avc1` string is built from:
//!
//! ```text
//! +---------+---------+---------------+-------+----------------+
//! | version | profile | compatibility | level | lengthSize ... |
//! |   (1)   |   (1)   |      (1)      |  (1)  |      (1)       |
//! +---------+---------+---------------+-------+----------------+
//! ```

/// RFC 6381 codec string, e.g. `avc1.64001f`
///
/// `fourcc` is the sample entry type (`avc1` or `avc3`).
pub fn codec_string(fourcc: &str, profile: u8, compatibility: u8, level: u8) -> String {
    format!("{}.{:02x}{:02x}{:02x}", fourcc, profile, compatibility, level)
}
