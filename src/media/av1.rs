//! AV1 codec strings
//!
//! The `av1C` box (AV1CodecConfigurationRecord):
//!
//! ```text
//! +---------------------+---------------------------+------------------------------+
//! | marker(1) version(7)| profile(3) level_idx(5)   | tier high_bd twelve mono ... |
//! +---------------------+---------------------------+------------------------------+
//! ```
//!
//! Rendered in the short form `av01.<profile>.<level><tier>.<bitdepth>`.

use bytes::{Buf, Bytes};

use crate::error::DemuxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Av1Profile {
    pub seq_profile: u8,
    pub seq_level_idx: u8,
    pub seq_tier: bool,
    pub high_bitdepth: bool,
    pub twelve_bit: bool,
}

impl Av1Profile {
    pub fn parse(mut record: Bytes) -> Result<Self, DemuxError> {
        if record.len() < 4 {
            return Err(DemuxError::Malformed("av1C"));
        }
        if record.get_u8() != 0x81 {
            return Err(DemuxError::Malformed("av1C version"));
        }
        let b1 = record.get_u8();
        let b2 = record.get_u8();

        Ok(Av1Profile {
            seq_profile: b1 >> 5,
            seq_level_idx: b1 & 0x1F,
            seq_tier: b2 & 0x80 != 0,
            high_bitdepth: b2 & 0x40 != 0,
            twelve_bit: b2 & 0x20 != 0,
        })
    }

    pub fn bit_depth(&self) -> u8 {
        match (self.high_bitdepth, self.twelve_bit) {
            (false, _) => 8,
            (true, false) => 10,
            (true, true) => 12,
        }
    }

    /// RFC 6381 style codec string, e.g. `av01.0.08M.08`
    pub fn codec_string(&self) -> String {
        format!(
            "av01.{}.{:02}{}.{:02}",
            self.seq_profile,
            self.seq_level_idx,
            if self.seq_tier { 'H' } else { 'M' },
            self.bit_depth()
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// av1C payload: Main profile, level 4.0 (idx 8), Main tier, 8-bit 4:2:0
    pub const AV1C_MAIN_L8: &[u8] = &[0x81, 0x08, 0x0C, 0x00];
}
