//! Learnable synthesis parameter ids, metadata and manual (knob) values.

use std::{fmt::Display, str::FromStr};

use four_cc::FourCC;
use strum::{EnumCount, IntoEnumIterator, VariantArray};

use crate::{chip::OPERATORS_PER_CHANNEL, error::Error};

// -------------------------------------------------------------------------------------------------

pub(crate) mod binding;

// -------------------------------------------------------------------------------------------------

/// Valid voltage range of knob and modulation values: 0 to 10 V, the usual unipolar CV
/// convention of this domain.
pub const VOLTAGE_MAX: f32 = 10.0;

/// Number of learnable parameters: each [`ParamKind`] exists once per operator slot. The
/// algorithm selector and the learn/unlearn controls are deliberately not part of this set.
pub const PARAM_COUNT: usize = ParamKind::COUNT * OPERATORS_PER_CHANNEL;

// -------------------------------------------------------------------------------------------------

/// The kinds of learnable synthesis parameters, one instance per operator slot.
///
/// Every kind carries the fixed-point maximum its knob value is normalized against and the bit
/// mask of the register field it ends up in. Flag-style kinds run through the same continuous
/// scale-then-round machinery as the multi-bit ones; a bound modulation source thus flips a
/// flag at the rounding midpoint instead of through a dedicated boolean threshold.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumCount,
    strum::EnumIter,
    strum::EnumString,
    strum::VariantArray,
)]
#[strum(serialize_all = "snake_case")]
pub enum ParamKind {
    /// Tremolo (amplitude vibrato) enable.
    Tremolo,
    /// Frequency vibrato enable.
    Vibrato,
    /// Hold sustain level until key-off.
    SustainHold,
    /// Key scale rate flag.
    KeyScaleRate,
    /// Frequency multiplication factor.
    Multiplier,
    /// Key scale level.
    KeyScaleLevel,
    /// Output attenuation.
    Attenuation,
    /// Waveform select.
    Waveform,
    /// Envelope attack rate.
    Attack,
    /// Envelope decay rate.
    Decay,
    /// Envelope sustain level.
    Sustain,
    /// Envelope release rate.
    Release,
}

impl ParamKind {
    /// Unique four-char id of the kind, for UIs and persistence.
    pub const fn id(self) -> FourCC {
        match self {
            Self::Tremolo => FourCC(*b"TREM"),
            Self::Vibrato => FourCC(*b"VIBR"),
            Self::SustainHold => FourCC(*b"SUSH"),
            Self::KeyScaleRate => FourCC(*b"KSRT"),
            Self::Multiplier => FourCC(*b"MULT"),
            Self::KeyScaleLevel => FourCC(*b"KSLV"),
            Self::Attenuation => FourCC(*b"ATTN"),
            Self::Waveform => FourCC(*b"WAVE"),
            Self::Attack => FourCC(*b"EATK"),
            Self::Decay => FourCC(*b"EDCY"),
            Self::Sustain => FourCC(*b"ESUS"),
            Self::Release => FourCC(*b"ERLS"),
        }
    }

    /// The knob value that maps to the register field's maximum.
    pub const fn max_value(self) -> f32 {
        match self {
            Self::Tremolo | Self::Vibrato | Self::SustainHold | Self::KeyScaleRate => 1.0,
            Self::KeyScaleLevel => 3.0,
            Self::Attenuation => 63.0,
            Self::Waveform => 7.0,
            Self::Multiplier | Self::Attack | Self::Decay | Self::Sustain | Self::Release => 15.0,
        }
    }

    /// Bit mask of the register field the resolved value is scaled into.
    pub const fn mask(self) -> u8 {
        match self {
            Self::Tremolo | Self::Vibrato | Self::SustainHold | Self::KeyScaleRate => 0x1,
            Self::KeyScaleLevel => 0x3,
            Self::Attenuation => 0x3f,
            Self::Waveform => 0x7,
            Self::Multiplier | Self::Attack | Self::Decay | Self::Sustain | Self::Release => 0xf,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Identifies one learnable parameter: a [`ParamKind`] on one of the four operator slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamId {
    /// The parameter kind.
    pub kind: ParamKind,
    /// Operator slot 0..=3.
    pub operator: usize,
}

impl ParamId {
    /// Create a new parameter id. Panics on an invalid operator slot.
    pub fn new(kind: ParamKind, operator: usize) -> Self {
        assert!(operator < OPERATORS_PER_CHANNEL, "Invalid operator slot");
        Self { kind, operator }
    }

    /// Flat index in `0..PARAM_COUNT`, used for tables and persistence.
    #[inline]
    pub fn index(self) -> usize {
        self.kind as usize * OPERATORS_PER_CHANNEL + self.operator
    }

    /// Inverse of [`ParamId::index`].
    pub fn from_index(index: usize) -> Result<Self, Error> {
        if index >= PARAM_COUNT {
            return Err(Error::ParameterIndexOutOfRange(index));
        }
        Ok(Self {
            kind: ParamKind::VARIANTS[index / OPERATORS_PER_CHANNEL],
            operator: index % OPERATORS_PER_CHANNEL,
        })
    }

    /// All learnable parameters in flat index order.
    pub fn all() -> impl Iterator<Item = Self> {
        ParamKind::iter().flat_map(|kind| {
            (0..OPERATORS_PER_CHANNEL).map(move |operator| Self { kind, operator })
        })
    }
}

impl Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind, self.operator + 1)
    }
}

impl FromStr for ParamId {
    type Err = Error;

    /// Parses names in display format, e.g. `"attack1"` or `"sustain_hold4"`.
    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let split = string.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (kind, slot) = string.split_at(split);
        let kind =
            ParamKind::from_str(kind).map_err(|_| Error::ParameterNotFound(string.to_string()))?;
        let operator = slot
            .parse::<usize>()
            .ok()
            .and_then(|slot| slot.checked_sub(1))
            .filter(|operator| *operator < OPERATORS_PER_CHANNEL)
            .ok_or_else(|| Error::ParameterNotFound(string.to_string()))?;
        Ok(Self { kind, operator })
    }
}

// -------------------------------------------------------------------------------------------------

/// The manual (knob) values of all learnable parameters, owned by the host and read by the
/// driver every sample. Values live in the 0..=10 V domain; each parameter's effective range
/// within that is set by its kind's maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamValues {
    values: [f32; PARAM_COUNT],
}

impl ParamValues {
    /// Create a new table with all knobs at zero.
    pub const fn new() -> Self {
        Self {
            values: [0.0; PARAM_COUNT],
        }
    }

    /// The current value of a parameter.
    #[inline]
    pub fn value(&self, param: ParamId) -> f32 {
        self.values[param.index()]
    }

    /// Set a parameter's value, clamped into the valid voltage range.
    pub fn set_value(&mut self, param: ParamId, value: f32) {
        self.values[param.index()] = value.clamp(0.0, VOLTAGE_MAX);
    }

    /// Set a parameter's value by its display name, e.g. from a text-based UI or a preset file.
    pub fn set_value_by_name(&mut self, name: &str, value: f32) -> Result<(), Error> {
        let param = name.parse::<ParamId>()?;
        self.set_value(param, value);
        Ok(())
    }
}

impl Default for ParamValues {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------
