//! Pitch CV to OPL3 block/frequency-number conversion.

// -------------------------------------------------------------------------------------------------

/// Reference frequency at 0 V: middle C, in Hz.
pub const BASE_FREQUENCY_HZ: f32 = 261.6256;

/// Highest frequency reachable in each of the 8 frequency blocks. A note is encoded in the
/// first block whose bound exceeds its frequency; anything at or above the last bound cannot
/// be represented. See the 0xB0 register documentation on the OPL3 register map.
const BLOCK_HIGHEST_HZ: [f32; 8] = [
    48.503, 97.006, 194.013, 388.026, 776.053, 1552.107, 3104.215, 6208.431,
];

/// Frequency-number step size per block, i.e. the interval between two adjacent 10-bit
/// frequency numbers within that block.
const BLOCK_INTERVAL_HZ: [f32; 8] = [0.048, 0.095, 0.190, 0.379, 0.759, 1.517, 3.034, 6.069];

// -------------------------------------------------------------------------------------------------

/// Convert a 1 V/octave pitch CV into a frequency in Hz, with 0 V mapping to middle C.
#[inline]
pub fn cv_to_hz(cv: f32) -> f32 {
    BASE_FREQUENCY_HZ * 2.0f32.powf(cv)
}

// -------------------------------------------------------------------------------------------------

/// A pitch encoded into OPL3 note register fields: a 3-bit block (octave range) selector and a
/// 10-bit frequency number split into the low byte for the 0xA0 register and the two high bits
/// for the 0xB0 register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    /// Block (octave range) selector, 0..=7.
    pub block: u8,
    /// Low 8 bits of the frequency number.
    pub freq_lo: u8,
    /// High 2 bits of the frequency number.
    pub freq_hi: u8,
}

impl Note {
    /// Encode a pitch CV into block and frequency-number fields.
    ///
    /// Walks the ascending per-block frequency bounds and encodes the pitch in the first block
    /// that can represent it, truncating to the block's step size. Returns `None` when the pitch
    /// exceeds the highest representable frequency; callers should then leave the previous note
    /// registers untouched rather than treat this as an error.
    pub fn from_cv(cv: f32) -> Option<Self> {
        let frequency = cv_to_hz(cv);
        for (block, &highest) in BLOCK_HIGHEST_HZ.iter().enumerate() {
            if frequency < highest {
                let freq_bits = (frequency / BLOCK_INTERVAL_HZ[block]) as u32;
                return Some(Self {
                    block: block as u8,
                    freq_lo: (freq_bits & 0xff) as u8,
                    freq_hi: ((freq_bits >> 8) & 0x3) as u8,
                });
            }
        }
        None
    }
}

// -------------------------------------------------------------------------------------------------
