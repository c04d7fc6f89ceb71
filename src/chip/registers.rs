//! Bit-exact value types for the OPL3 register groups written by the driver.
//!
//! Each type mirrors one logical register group and packs its fields into the register byte
//! with explicit shifts and masks; every field is truncated to its declared width, so
//! out-of-range inputs can never bleed into neighboring fields.

// -------------------------------------------------------------------------------------------------

/// Tremolo / vibrato / sustain / KSR / frequency multiplier, registers 0x20..=0x35.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorEffects {
    /// Tremolo (amplitude vibrato) enable, 1 bit.
    pub tremolo: u8,
    /// Frequency vibrato enable, 1 bit.
    pub vibrato: u8,
    /// Hold the sustain level until key-off, 1 bit.
    pub sustain_hold: u8,
    /// Key scale rate: scale envelope speed with pitch, 1 bit.
    pub key_scale_rate: u8,
    /// Frequency multiplication factor, 4 bits.
    pub multiplier: u8,
}

impl OperatorEffects {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        (self.tremolo & 0x1) << 7
            | (self.vibrato & 0x1) << 6
            | (self.sustain_hold & 0x1) << 5
            | (self.key_scale_rate & 0x1) << 4
            | (self.multiplier & 0xf)
    }
}

// -------------------------------------------------------------------------------------------------

/// Key scale level / output attenuation, registers 0x40..=0x55.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorLevels {
    /// Key scale level: attenuate output with rising pitch, 2 bits.
    pub key_scale_level: u8,
    /// Output attenuation, 6 bits.
    pub attenuation: u8,
}

impl OperatorLevels {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        (self.key_scale_level & 0x3) << 6 | (self.attenuation & 0x3f)
    }
}

// -------------------------------------------------------------------------------------------------

/// Attack / decay rates, registers 0x60..=0x75.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorAttackDecay {
    /// Attack rate, 4 bits.
    pub attack: u8,
    /// Decay rate, 4 bits.
    pub decay: u8,
}

impl OperatorAttackDecay {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        (self.attack & 0xf) << 4 | (self.decay & 0xf)
    }
}

// -------------------------------------------------------------------------------------------------

/// Sustain level / release rate, registers 0x80..=0x95.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorSustainRelease {
    /// Sustain level, 4 bits.
    pub sustain: u8,
    /// Release rate, 4 bits.
    pub release: u8,
}

impl OperatorSustainRelease {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        (self.sustain & 0xf) << 4 | (self.release & 0xf)
    }
}

// -------------------------------------------------------------------------------------------------

/// Waveform select, registers 0xE0..=0xF5.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorWaveform {
    /// Waveform index, 3 bits.
    pub waveform: u8,
}

impl OperatorWaveform {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        self.waveform & 0x7
    }
}

// -------------------------------------------------------------------------------------------------

/// Output routing / feedback / synthesis type, registers 0xC0..=0xC8.
///
/// The 2-bit algorithm selection of a 4-operator voice is split across two of these registers:
/// the low bit goes into the primary channel's `synth_type`, the high bit into the shadow
/// channel's. Routing and feedback are only honored on the primary channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSynthesis {
    /// Route to output channel D.
    pub out_d: bool,
    /// Route to output channel C.
    pub out_c: bool,
    /// Route to the right output.
    pub out_right: bool,
    /// Route to the left output.
    pub out_left: bool,
    /// Modulation feedback for the first operator, 3 bits.
    pub feedback: u8,
    /// Synthesis type (algorithm) bit.
    pub synth_type: u8,
}

impl ChannelSynthesis {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        (self.out_d as u8) << 7
            | (self.out_c as u8) << 6
            | (self.out_right as u8) << 5
            | (self.out_left as u8) << 4
            | (self.feedback & 0x7) << 1
            | (self.synth_type & 0x1)
    }
}

// -------------------------------------------------------------------------------------------------

/// Frequency number low byte, registers 0xA0..=0xA8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteLow {
    /// Low 8 bits of the 10-bit frequency number.
    pub freq_lo: u8,
}

impl NoteLow {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        self.freq_lo
    }
}

/// Key-on / block / frequency number high bits, registers 0xB0..=0xB8.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoteHigh {
    /// Key-on: gate the channel's envelope generators.
    pub key_on: bool,
    /// Block (octave range) selector, 3 bits.
    pub block: u8,
    /// High 2 bits of the 10-bit frequency number.
    pub freq_hi: u8,
}

impl NoteHigh {
    /// Pack into the register byte.
    pub const fn value(self) -> u8 {
        (self.key_on as u8) << 5 | (self.block & 0x7) << 2 | (self.freq_hi & 0x3)
    }
}

// -------------------------------------------------------------------------------------------------
