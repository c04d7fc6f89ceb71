//! Binding of learnable parameters to external modulation sources.

use std::fmt::Display;

use crate::{
    chip::CHANNELS,
    error::Error,
    parameter::{ParamId, ParamValues, PARAM_COUNT, VOLTAGE_MAX},
};

// -------------------------------------------------------------------------------------------------

/// Number of generic modulation inputs shared by all channels.
pub const GENERIC_SOURCE_COUNT: usize = 6;

/// An external modulation source a parameter can be bound to.
///
/// Generic sources are single inputs shared by all channels and are rescaled from their
/// voltage range into the bound parameter's value range. The two per-channel sources are
/// banks of one input per channel, resolved against whichever channel is being processed,
/// and contribute their raw (clamped) voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModSource {
    /// One of the shared modulation inputs.
    Generic(u8),
    /// The per-channel modulation input bank A.
    ChannelA,
    /// The per-channel modulation input bank B.
    ChannelB,
}

impl ModSource {
    /// Total number of modulation sources (and thus learn buttons).
    pub const COUNT: usize = GENERIC_SOURCE_COUNT + 2;

    /// All sources in flat index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Generic(0),
        Self::Generic(1),
        Self::Generic(2),
        Self::Generic(3),
        Self::Generic(4),
        Self::Generic(5),
        Self::ChannelA,
        Self::ChannelB,
    ];

    /// Flat index in `0..COUNT`, used for learn buttons and persistence.
    pub const fn index(self) -> usize {
        match self {
            Self::Generic(input) => input as usize,
            Self::ChannelA => GENERIC_SOURCE_COUNT,
            Self::ChannelB => GENERIC_SOURCE_COUNT + 1,
        }
    }

    /// Inverse of [`ModSource::index`].
    pub fn from_index(index: usize) -> Result<Self, Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(Error::SourceIndexOutOfRange(index))
    }
}

impl Display for ModSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generic(input) => write!(f, "cv{}", input + 1),
            Self::ChannelA => f.write_str("channel_a"),
            Self::ChannelB => f.write_str("channel_b"),
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// The live modulation input voltages for one sample, as supplied by the host.
#[derive(Debug, Clone, Copy)]
pub struct ModInputs<'a> {
    /// The shared modulation inputs.
    pub generic: &'a [f32; GENERIC_SOURCE_COUNT],
    /// Per-channel modulation input bank A.
    pub channel_a: &'a [f32; CHANNELS],
    /// Per-channel modulation input bank B.
    pub channel_b: &'a [f32; CHANNELS],
}

// -------------------------------------------------------------------------------------------------

/// Maps each learnable parameter to an optional modulation source and resolves effective
/// register field values from live inputs and knob values.
///
/// Bindings are global: a parameter is bound at most once, for all channels alike; only the
/// per-channel sources read a different input per channel. Resolution happens fresh on every
/// sample for every channel that needs it, since bound sources are live signals.
#[derive(Debug, Clone)]
pub struct BindingTable {
    bindings: [Option<ModSource>; PARAM_COUNT],
}

impl BindingTable {
    /// Create a new table with all parameters unbound.
    pub const fn new() -> Self {
        Self {
            bindings: [None; PARAM_COUNT],
        }
    }

    /// The source a parameter currently is bound to, if any.
    #[inline]
    pub fn binding(&self, param: ParamId) -> Option<ModSource> {
        self.bindings[param.index()]
    }

    /// Bind a parameter to a modulation source, replacing any previous binding.
    pub fn bind(&mut self, param: ParamId, source: ModSource) {
        self.bindings[param.index()] = Some(source);
    }

    /// Remove a parameter's binding. Returns the previously bound source.
    pub fn clear(&mut self, param: ParamId) -> Option<ModSource> {
        self.bindings[param.index()].take()
    }

    /// All bindings in flat parameter index order, e.g. for persistence.
    pub fn iter(&self) -> impl Iterator<Item = (ParamId, Option<ModSource>)> + '_ {
        ParamId::all().map(|param| (param, self.bindings[param.index()]))
    }

    /// Resolve a parameter's effective register field value for one channel.
    ///
    /// Starts from the bound source's contribution (zero when unbound), adds the manual knob
    /// value, clamps the sum into the voltage range, normalizes by the kind's declared maximum
    /// and rounds into the register field's width. The result may overshoot the field when a
    /// bound source adds on top of a raised knob; register packing truncates it.
    pub fn resolve(
        &self,
        param: ParamId,
        channel: usize,
        inputs: &ModInputs,
        knobs: &ParamValues,
    ) -> u8 {
        debug_assert!(channel < CHANNELS, "Invalid channel index");
        let kind = param.kind;
        let mut value = match self.bindings[param.index()] {
            Some(ModSource::Generic(input)) => {
                inputs.generic[input as usize].clamp(0.0, VOLTAGE_MAX) / VOLTAGE_MAX
                    * kind.max_value()
            }
            Some(ModSource::ChannelA) => inputs.channel_a[channel].clamp(0.0, VOLTAGE_MAX),
            Some(ModSource::ChannelB) => inputs.channel_b[channel].clamp(0.0, VOLTAGE_MAX),
            None => 0.0,
        };
        value += knobs.value(param);
        value = value.clamp(0.0, VOLTAGE_MAX);
        (kind.mask() as f32 * (value / kind.max_value())).round() as u8
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------
