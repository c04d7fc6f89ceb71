//! Lock-free read-only view of the learn state for non-real-time observers.

use std::sync::atomic::{AtomicI8, AtomicU8, Ordering};

use crate::{
    learn::LearnMode,
    parameter::{
        binding::ModSource,
        ParamId, PARAM_COUNT,
    },
};

// -------------------------------------------------------------------------------------------------

/// Read-only projection of the current learn mode and parameter bindings, for indicator
/// rendering on UI threads.
///
/// The audio thread is the single writer and publishes through per-field relaxed atomics, so
/// readers never make it block or wait. Reads may lag behind by a sample; that staleness is
/// fine for display purposes.
#[derive(Debug)]
pub struct LearnProjection {
    /// 0 = idle, 1..=`ModSource::COUNT` = learning source index + 1, `UNLEARNING` = unlearning.
    mode: AtomicU8,
    /// Bound source index per parameter, -1 when unbound.
    bindings: [AtomicI8; PARAM_COUNT],
}

impl LearnProjection {
    const IDLE: u8 = 0;
    const UNLEARNING: u8 = ModSource::COUNT as u8 + 1;

    /// Create a new projection: idle, all parameters unbound.
    pub fn new() -> Self {
        Self {
            mode: AtomicU8::new(Self::IDLE),
            bindings: std::array::from_fn(|_| AtomicI8::new(-1)),
        }
    }

    /// The learn mode last published by the audio thread.
    pub fn mode(&self) -> LearnMode {
        match self.mode.load(Ordering::Relaxed) {
            Self::IDLE => LearnMode::Idle,
            Self::UNLEARNING => LearnMode::Unlearning,
            index => ModSource::from_index(index as usize - 1)
                .map(LearnMode::Learning)
                .unwrap_or(LearnMode::Idle),
        }
    }

    /// The binding last published for the given parameter.
    pub fn binding(&self, param: ParamId) -> Option<ModSource> {
        match self.bindings[param.index()].load(Ordering::Relaxed) {
            index if index >= 0 => ModSource::from_index(index as usize).ok(),
            _ => None,
        }
    }

    /// Publish a new learn mode. Audio thread only.
    pub(crate) fn publish_mode(&self, mode: LearnMode) {
        let encoded = match mode {
            LearnMode::Idle => Self::IDLE,
            LearnMode::Learning(source) => source.index() as u8 + 1,
            LearnMode::Unlearning => Self::UNLEARNING,
        };
        self.mode.store(encoded, Ordering::Relaxed);
    }

    /// Publish a new binding for one parameter. Audio thread only.
    pub(crate) fn publish_binding(&self, param: ParamId, source: Option<ModSource>) {
        let encoded = source.map(|source| source.index() as i8).unwrap_or(-1);
        self.bindings[param.index()].store(encoded, Ordering::Relaxed);
    }
}

impl Default for LearnProjection {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParamKind;

    #[test]
    fn modes_round_trip() {
        let projection = LearnProjection::new();
        assert_eq!(projection.mode(), LearnMode::Idle);
        for source in ModSource::ALL {
            projection.publish_mode(LearnMode::Learning(source));
            assert_eq!(projection.mode(), LearnMode::Learning(source));
        }
        projection.publish_mode(LearnMode::Unlearning);
        assert_eq!(projection.mode(), LearnMode::Unlearning);
        projection.publish_mode(LearnMode::Idle);
        assert_eq!(projection.mode(), LearnMode::Idle);
    }

    #[test]
    fn bindings_round_trip() {
        let projection = LearnProjection::new();
        let param = ParamId::new(ParamKind::Vibrato, 3);
        assert_eq!(projection.binding(param), None);
        projection.publish_binding(param, Some(ModSource::ChannelA));
        assert_eq!(projection.binding(param), Some(ModSource::ChannelA));
        // other parameters stay untouched
        assert_eq!(projection.binding(ParamId::new(ParamKind::Vibrato, 2)), None);
        projection.publish_binding(param, None);
        assert_eq!(projection.binding(param), None);
    }
}
