//! Learn/unlearn state machine for binding modulation sources to parameters.

use crate::{
    parameter::{
        binding::{BindingTable, ModSource},
        ParamId, ParamValues,
    },
    trigger::HysteresisTrigger,
};

// -------------------------------------------------------------------------------------------------

pub(crate) mod projection;

// -------------------------------------------------------------------------------------------------

/// The mode the learn state machine currently is in. At most one mode is active at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LearnMode {
    /// Not learning; knob changes have no side effects.
    #[default]
    Idle,
    /// Waiting for a knob change to bind that parameter to the given source.
    Learning(ModSource),
    /// Waiting for a knob change to clear that parameter's binding.
    Unlearning,
}

/// Notification about a binding change, for UI indicators or logging. Delivered through the
/// driver's optional event channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnEvent {
    /// A parameter was bound to a modulation source.
    Bound { param: ParamId, source: ModSource },
    /// A parameter's binding was cleared.
    Cleared { param: ParamId },
}

// -------------------------------------------------------------------------------------------------

/// State machine governing the learn/unlearn gesture.
///
/// Pressing a learn button arms the controller for that source and snapshots all manual knob
/// values; the first knob that then moves away from its snapshot gets bound and the controller
/// disarms. Pressing the armed button again (or switching to another button) toggles off or
/// re-arms. The unlearn button works the same way, clearing instead of binding. Detecting "the
/// user moved this knob" via the snapshot keeps the gesture uniform across all parameters
/// without per-parameter selection widgets.
///
/// There is no timeout: an armed controller stays armed until a knob moves or the mode is
/// toggled off.
#[derive(Debug, Clone)]
pub struct LearnController {
    mode: LearnMode,
    snapshot: ParamValues,
    learn_buttons: [HysteresisTrigger; ModSource::COUNT],
    unlearn_button: HysteresisTrigger,
}

impl LearnController {
    /// Create a new controller in idle mode.
    pub fn new() -> Self {
        Self {
            mode: LearnMode::Idle,
            snapshot: ParamValues::new(),
            learn_buttons: std::array::from_fn(|_| HysteresisTrigger::new()),
            unlearn_button: HysteresisTrigger::new(),
        }
    }

    /// The currently active mode.
    #[inline]
    pub const fn mode(&self) -> LearnMode {
        self.mode
    }

    /// Advance the state machine by one sample: debounce the button voltages, apply mode
    /// toggles, and run change detection against the knob snapshot while armed. Applies at
    /// most one binding change to `bindings` per call and reports it.
    pub fn process(
        &mut self,
        learn_buttons: &[f32; ModSource::COUNT],
        unlearn_button: f32,
        knobs: &ParamValues,
        bindings: &mut BindingTable,
    ) -> Option<LearnEvent> {
        // both press and release edges toggle, so held buttons don't re-arm
        for (source, button) in ModSource::ALL.iter().zip(self.learn_buttons.iter_mut()) {
            if button.process(learn_buttons[source.index()]) {
                if self.mode == LearnMode::Learning(*source) {
                    self.mode = LearnMode::Idle;
                } else {
                    self.snapshot = knobs.clone();
                    self.mode = LearnMode::Learning(*source);
                }
            }
        }
        if self.unlearn_button.process(unlearn_button) {
            if self.mode == LearnMode::Unlearning {
                self.mode = LearnMode::Idle;
            } else {
                self.snapshot = knobs.clone();
                self.mode = LearnMode::Unlearning;
            }
        }

        let mode = self.mode;
        if mode == LearnMode::Idle {
            return None;
        }
        // exact compare: any knob movement since the snapshot counts, first one wins
        let changed = ParamId::all().find(|param| knobs.value(*param) != self.snapshot.value(*param))?;
        self.mode = LearnMode::Idle;
        match mode {
            LearnMode::Learning(source) => {
                bindings.bind(changed, source);
                Some(LearnEvent::Bound {
                    param: changed,
                    source,
                })
            }
            LearnMode::Unlearning => {
                bindings.clear(changed);
                Some(LearnEvent::Cleared { param: changed })
            }
            LearnMode::Idle => unreachable!(),
        }
    }
}

impl Default for LearnController {
    fn default() -> Self {
        Self::new()
    }
}

// -------------------------------------------------------------------------------------------------
