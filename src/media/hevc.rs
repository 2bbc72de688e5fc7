//! H.265/HEVC codec strings
//!
//! Built from the fixed head of the `hvcC` box
//! (HEVCDecoderConfigurationRecord):
//!
//! ```text
//! +---------+---------------------------+----------------+-------------+-------+
//! | version | space(2) tier(1) idc(5)   | compatibility  | constraints | level |
//! |   (1)   |           (1)             |      (4)       |     (6)     |  (1)  |
//! +---------+---------------------------+----------------+-------------+-------+
//! ```
//!
//! Rendered as `hvc1.<space><idc>.<compat>.<tier><level>[.<constraint>...]`
//! (ISO/IEC 14496-15 Annex E).

use bytes::{Buf, Bytes};

use crate::error::DemuxError;

/// Bytes of the record the codec string is derived from
const RECORD_HEAD_LEN: usize = 13;

/// Profile, tier and level of an HEVC stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HevcProfile {
    pub profile_space: u8,
    pub tier_flag: bool,
    pub profile_idc: u8,
    pub compatibility_flags: u32,
    pub constraint_flags: [u8; 6],
    pub level_idc: u8,
}

impl HevcProfile {
    /// Parse the head of an HEVCDecoderConfigurationRecord
    pub fn parse(mut record: Bytes) -> Result<Self, DemuxError> {
        if record.len() < RECORD_HEAD_LEN {
            return Err(DemuxError::Malformed("hvcC"));
        }
        if record.get_u8() != 1 {
            return Err(DemuxError::Malformed("hvcC version"));
        }

        let b = record.get_u8();
        let compatibility_flags = record.get_u32();
        let mut constraint_flags = [0u8; 6];
        record.copy_to_slice(&mut constraint_flags);
        let level_idc = record.get_u8();

        Ok(HevcProfile {
            profile_space: b >> 6,
            tier_flag: b & 0x20 != 0,
            profile_idc: b & 0x1F,
            compatibility_flags,
            constraint_flags,
            level_idc,
        })
    }

    /// RFC 6381 codec string, e.g. `hvc1.1.6.L93.B0`
    ///
    /// `fourcc` is the sample entry type (`hvc1` or `hev1`).
    pub fn codec_string(&self, fourcc: &str) -> String {
        let space = match self.profile_space {
            1 => "A",
            2 => "B",
            3 => "C",
            _ => "",
        };
        let tier = if self.tier_flag { 'H' } else { 'L' };

        let mut out = format!(
            "{}.{}{}.{:X}.{}{}",
            fourcc,
            space,
            self.profile_idc,
            self.compatibility_flags.reverse_bits(),
            tier,
            self.level_idc
        );

        // Trailing zero bytes are omitted
        let used = self
            .constraint_flags
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        for byte in &self.constraint_flags[..used] {
            out.push_str(&format!(".{:X}", byte));
        }
        out
    }
}
