#![doc = include_str!("../README.md")]

// private mods (will be partly re-exported)
mod chip;
mod driver;
mod error;
mod learn;
mod parameter;
mod pitch;
mod trigger;

// public, flat re-exports
pub use error::Error;

pub use chip::{
    ChipBackend, StereoFrame, CHANNELS, HW_CHANNEL, HW_FIRST_OPERATOR, OPERATORS_PER_CHANNEL,
};

pub use driver::{ChannelRouting, FrameInput, OplDriver};

pub use learn::{projection::LearnProjection, LearnEvent, LearnMode};

pub use parameter::{
    binding::{BindingTable, ModSource, GENERIC_SOURCE_COUNT},
    ParamId, ParamKind, ParamValues, PARAM_COUNT, VOLTAGE_MAX,
};

pub use pitch::{cv_to_hz, Note, BASE_FREQUENCY_HZ};

pub use trigger::HysteresisTrigger;

// public mods
pub mod registers {
    //! Packed value types for the chip's register groups.

    pub use super::chip::registers::{
        ChannelSynthesis, NoteHigh, NoteLow, OperatorAttackDecay, OperatorEffects, OperatorLevels,
        OperatorSustainRelease, OperatorWaveform,
    };

    pub use super::chip::{channel_register, operator_register};
}
