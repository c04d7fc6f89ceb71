//! The per-sample OPL3 register-write driver.

use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::{
    chip::{
        self, channel_register, operator_register, registers, ChipBackend, CHANNELS, HW_CHANNEL,
        HW_FIRST_OPERATOR, OPERATORS_PER_CHANNEL,
    },
    learn::{projection::LearnProjection, LearnController, LearnEvent, LearnMode},
    parameter::{
        binding::{BindingTable, ModInputs, ModSource, GENERIC_SOURCE_COUNT},
        ParamId, ParamKind, ParamValues,
    },
    pitch::Note,
    trigger::HysteresisTrigger,
};

// -------------------------------------------------------------------------------------------------

/// Length of the register-write cycle in samples. Seven steps carry register groups, the rest
/// of the cycle is idle: this rate-limits full reprogramming against the sample rate and
/// bounds the per-callback work to a single register group.
const CYCLE_LENGTH: u32 = 32;

/// Nominal output voltage a full-scale chip sample maps to.
const OUTPUT_VOLTAGE_MAX: f32 = 10.0;

// -------------------------------------------------------------------------------------------------

/// All control voltages and values the host supplies for one sample tick.
#[derive(Debug, Clone, Copy)]
pub struct FrameInput<'a> {
    /// Per-channel gate voltages.
    pub gate: &'a [f32; CHANNELS],
    /// Per-channel pitch CVs, 1 V/octave with middle C at 0 V.
    pub pitch: &'a [f32; CHANNELS],
    /// The shared modulation input voltages.
    pub generic_mod: &'a [f32; GENERIC_SOURCE_COUNT],
    /// Per-channel modulation input bank A.
    pub channel_mod_a: &'a [f32; CHANNELS],
    /// Per-channel modulation input bank B.
    pub channel_mod_b: &'a [f32; CHANNELS],
    /// Algorithm selector value; clamped into the four 4-operator algorithms.
    pub algorithm: f32,
    /// Momentary learn button voltages, one per modulation source.
    pub learn_buttons: &'a [f32; ModSource::COUNT],
    /// Momentary unlearn button voltage.
    pub unlearn_button: f32,
    /// The manual (knob) values of all learnable parameters.
    pub knobs: &'a ParamValues,
}

impl<'a> FrameInput<'a> {
    fn mod_inputs(&self) -> ModInputs<'a> {
        ModInputs {
            generic: self.generic_mod,
            channel_a: self.channel_mod_a,
            channel_b: self.channel_mod_b,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Output routing and feedback configuration, applied to every channel's primary synthesis
/// register. Not part of the learnable parameter set; configure it from the same thread that
/// calls [`OplDriver::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelRouting {
    /// Route voices to the left output.
    pub out_left: bool,
    /// Route voices to the right output.
    pub out_right: bool,
    /// Modulation feedback for each voice's first operator, 0..=7.
    pub feedback: u8,
}

impl Default for ChannelRouting {
    fn default() -> Self {
        Self {
            out_left: true,
            out_right: true,
            feedback: 0,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Drives a [`ChipBackend`] from continuous control signals, one sample at a time.
///
/// All six voices share a single instrument definition, so every parameter register is written
/// once per channel. Register writes are spread over a 32-step cycle (see [`CYCLE_LENGTH`]);
/// bound modulation sources are re-resolved on every write, which keeps parameters following
/// live signals at the reprogramming rate.
///
/// The driver owns all of its mutable state and must be advanced from a single (audio) thread.
/// The per-sample path never allocates, locks or blocks. UI threads observe learn state
/// through the shared [`LearnProjection`] and, optionally, a learn event channel.
pub struct OplDriver<B: ChipBackend> {
    chip: B,
    step: u32,
    gates: [HysteresisTrigger; CHANNELS],
    bindings: BindingTable,
    learn: LearnController,
    routing: ChannelRouting,
    projection: Arc<LearnProjection>,
    event_sender: Option<Sender<LearnEvent>>,
}

impl<B: ChipBackend> OplDriver<B> {
    /// Create a new driver around the given chip backend and bring the chip into its
    /// operating mode.
    pub fn new(mut chip: B) -> Self {
        chip::initialize(&mut chip);
        Self {
            chip,
            step: 0,
            gates: std::array::from_fn(|_| HysteresisTrigger::new()),
            bindings: BindingTable::new(),
            learn: LearnController::new(),
            routing: ChannelRouting::default(),
            projection: Arc::new(LearnProjection::new()),
            event_sender: None,
        }
    }

    /// Reset the device: reprogram the chip's operating mode and restart the write cycle.
    /// Bindings and learn state survive a reset.
    pub fn reset(&mut self) {
        log::debug!("resetting OPL3 driver");
        chip::initialize(&mut self.chip);
        self.step = 0;
        for gate in &mut self.gates {
            gate.reset();
        }
    }

    /// Access to the chip backend.
    pub fn chip(&self) -> &B {
        &self.chip
    }

    /// Mutable access to the chip backend.
    pub fn chip_mut(&mut self) -> &mut B {
        &mut self.chip
    }

    /// The current output routing and feedback configuration.
    pub const fn routing(&self) -> ChannelRouting {
        self.routing
    }

    /// Set the output routing and feedback configuration. Takes effect on the next pass of
    /// the synthesis step.
    pub fn set_routing(&mut self, routing: ChannelRouting) {
        self.routing = routing;
    }

    /// The currently active learn mode.
    pub const fn learn_mode(&self) -> LearnMode {
        self.learn.mode()
    }

    /// The current parameter bindings.
    pub const fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    /// Restore a parameter binding, e.g. from persisted state. Publishes the change to the
    /// projection like a learned binding would.
    pub fn set_binding(&mut self, param: ParamId, source: Option<ModSource>) {
        match source {
            Some(source) => self.bindings.bind(param, source),
            None => {
                self.bindings.clear(param);
            }
        }
        self.projection.publish_binding(param, source);
    }

    /// The shared read-only projection of learn mode and bindings, safe to read from other
    /// threads.
    pub fn projection(&self) -> Arc<LearnProjection> {
        Arc::clone(&self.projection)
    }

    /// Install a channel on which binding changes are published. The audio thread never
    /// blocks on it: when the channel is full, events are dropped with a warning.
    pub fn set_event_sender(&mut self, sender: Sender<LearnEvent>) {
        self.event_sender = Some(sender);
    }

    /// Advance the driver by one sample: run the learn state machine, emit this step's
    /// register group, and synthesize one stereo frame, returned in the nominal ±10 V range.
    pub fn process(&mut self, input: &FrameInput) -> (f32, f32) {
        Self::assert_no_alloc(|| {
            self.process_learning(input);
            self.process_step(input);

            let mut frame = [[0i16; 2]; 1];
            self.chip.generate(&mut frame);
            let [left, right] = frame[0];
            (
                left as f32 / i16::MAX as f32 * OUTPUT_VOLTAGE_MAX,
                right as f32 / i16::MAX as f32 * OUTPUT_VOLTAGE_MAX,
            )
        })
    }

    fn process_learning(&mut self, input: &FrameInput) {
        let mode_before = self.learn.mode();
        let event = self.learn.process(
            input.learn_buttons,
            input.unlearn_button,
            input.knobs,
            &mut self.bindings,
        );
        if let Some(event) = event {
            match event {
                LearnEvent::Bound { param, source } => {
                    self.projection.publish_binding(param, Some(source));
                    Self::permit_alloc(|| log::debug!("bound parameter {param} to {source}"));
                }
                LearnEvent::Cleared { param } => {
                    self.projection.publish_binding(param, None);
                    Self::permit_alloc(|| log::debug!("cleared binding of parameter {param}"));
                }
            }
            if let Some(sender) = &self.event_sender {
                if let Err(err) = sender.try_send(event) {
                    Self::permit_alloc(|| log::warn!("failed to send learn event: {err}"));
                }
            }
        }
        if self.learn.mode() != mode_before {
            self.projection.publish_mode(self.learn.mode());
        }
    }

    fn process_step(&mut self, input: &FrameInput) {
        self.step += 1;
        match self.step {
            1 => self.write_operator_effects(input),
            2 => self.write_operator_levels(input),
            3 => self.write_operator_attack_decay(input),
            4 => self.write_operator_sustain_release(input),
            5 => self.write_channel_synthesis(input),
            6 => self.write_operator_waveforms(input),
            7 => self.write_notes(input),
            _ => {} // idle tail of the cycle
        }
        if self.step >= CYCLE_LENGTH {
            self.step = 0;
        }
    }

    /// Step 1: tremolo/vibrato/sustain/KSR/multiplier registers for all operator slots.
    fn write_operator_effects(&mut self, input: &FrameInput) {
        let inputs = input.mod_inputs();
        for op in 0..OPERATORS_PER_CHANNEL {
            for ch in 0..CHANNELS {
                let resolve = |kind| {
                    self.bindings
                        .resolve(ParamId::new(kind, op), ch, &inputs, input.knobs)
                };
                let effects = registers::OperatorEffects {
                    tremolo: resolve(ParamKind::Tremolo),
                    vibrato: resolve(ParamKind::Vibrato),
                    sustain_hold: resolve(ParamKind::SustainHold),
                    key_scale_rate: resolve(ParamKind::KeyScaleRate),
                    multiplier: resolve(ParamKind::Multiplier),
                };
                self.chip.write(
                    operator_register(0x20, HW_FIRST_OPERATOR[ch] + 3 * op as u16),
                    effects.value(),
                );
            }
        }
    }

    /// Step 2: key-scale-level/attenuation registers for all operator slots.
    fn write_operator_levels(&mut self, input: &FrameInput) {
        let inputs = input.mod_inputs();
        for op in 0..OPERATORS_PER_CHANNEL {
            for ch in 0..CHANNELS {
                let levels = registers::OperatorLevels {
                    key_scale_level: self.bindings.resolve(
                        ParamId::new(ParamKind::KeyScaleLevel, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                    attenuation: self.bindings.resolve(
                        ParamId::new(ParamKind::Attenuation, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                };
                self.chip.write(
                    operator_register(0x40, HW_FIRST_OPERATOR[ch] + 3 * op as u16),
                    levels.value(),
                );
            }
        }
    }

    /// Step 3: attack/decay registers for all operator slots.
    fn write_operator_attack_decay(&mut self, input: &FrameInput) {
        let inputs = input.mod_inputs();
        for op in 0..OPERATORS_PER_CHANNEL {
            for ch in 0..CHANNELS {
                let envelope = registers::OperatorAttackDecay {
                    attack: self.bindings.resolve(
                        ParamId::new(ParamKind::Attack, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                    decay: self.bindings.resolve(
                        ParamId::new(ParamKind::Decay, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                };
                self.chip.write(
                    operator_register(0x60, HW_FIRST_OPERATOR[ch] + 3 * op as u16),
                    envelope.value(),
                );
            }
        }
    }

    /// Step 4: sustain-level/release registers for all operator slots.
    fn write_operator_sustain_release(&mut self, input: &FrameInput) {
        let inputs = input.mod_inputs();
        for op in 0..OPERATORS_PER_CHANNEL {
            for ch in 0..CHANNELS {
                let envelope = registers::OperatorSustainRelease {
                    sustain: self.bindings.resolve(
                        ParamId::new(ParamKind::Sustain, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                    release: self.bindings.resolve(
                        ParamId::new(ParamKind::Release, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                };
                self.chip.write(
                    operator_register(0x80, HW_FIRST_OPERATOR[ch] + 3 * op as u16),
                    envelope.value(),
                );
            }
        }
    }

    /// Step 5: synthesis-type/feedback/routing registers for all channels. The 2-bit
    /// algorithm is split across the primary and shadow channel's synth-type bits; routing
    /// and feedback only matter on the primary one.
    fn write_channel_synthesis(&mut self, input: &FrameInput) {
        let algorithm = input.algorithm.clamp(0.0, 3.0) as u8;
        let primary = registers::ChannelSynthesis {
            out_d: false, // the extra output channels C and D stay unused
            out_c: false,
            out_right: self.routing.out_right,
            out_left: self.routing.out_left,
            feedback: self.routing.feedback,
            synth_type: algorithm & 1,
        };
        let secondary = registers::ChannelSynthesis {
            out_d: false,
            out_c: false,
            out_right: false,
            out_left: false,
            feedback: 0,
            synth_type: (algorithm >> 1) & 1,
        };
        for ch in 0..CHANNELS {
            self.chip
                .write(channel_register(0xc0, HW_CHANNEL[ch]), primary.value());
            self.chip
                .write(channel_register(0xc0, HW_CHANNEL[ch] + 3), secondary.value());
        }
    }

    /// Step 6: waveform-select registers for all operator slots.
    fn write_operator_waveforms(&mut self, input: &FrameInput) {
        let inputs = input.mod_inputs();
        for op in 0..OPERATORS_PER_CHANNEL {
            for ch in 0..CHANNELS {
                let waveform = registers::OperatorWaveform {
                    waveform: self.bindings.resolve(
                        ParamId::new(ParamKind::Waveform, op),
                        ch,
                        &inputs,
                        input.knobs,
                    ),
                };
                self.chip.write(
                    operator_register(0xe0, HW_FIRST_OPERATOR[ch] + 3 * op as u16),
                    waveform.value(),
                );
            }
        }
    }

    /// Step 7: note registers, written only on gate edges. The fresh pitch encoding carries
    /// the key-on state of the edge; a pitch outside the representable range skips the writes
    /// and leaves the previous note in the chip. Note registers are mirrored to the shadow
    /// channel, as 4-operator linking requires.
    fn write_notes(&mut self, input: &FrameInput) {
        for ch in 0..CHANNELS {
            if !self.gates[ch].process(input.gate[ch]) {
                continue;
            }
            let Some(note) = Note::from_cv(input.pitch[ch]) else {
                continue;
            };
            let low = registers::NoteLow {
                freq_lo: note.freq_lo,
            };
            let high = registers::NoteHigh {
                key_on: self.gates[ch].state(),
                block: note.block,
                freq_hi: note.freq_hi,
            };
            self.chip
                .write(channel_register(0xa0, HW_CHANNEL[ch]), low.value());
            self.chip
                .write(channel_register(0xa0, HW_CHANNEL[ch] + 3), low.value());
            self.chip
                .write(channel_register(0xb0, HW_CHANNEL[ch]), high.value());
            self.chip
                .write(channel_register(0xb0, HW_CHANNEL[ch] + 3), high.value());
        }
    }

    fn assert_no_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::assert_no_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }

    #[inline]
    fn permit_alloc<T, F: FnOnce() -> T>(func: F) -> T {
        #[cfg(feature = "assert-allocs")]
        return assert_no_alloc::permit_alloc::<T, F>(func);

        #[cfg(not(feature = "assert-allocs"))]
        return func();
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::StereoFrame;

    /// Chip stub that records all register writes and generates silence.
    struct RecordingChip {
        writes: Vec<(u16, u8)>,
    }

    impl RecordingChip {
        fn new() -> Self {
            Self {
                writes: Vec::with_capacity(8192),
            }
        }

        fn registers_written(&self) -> Vec<u16> {
            self.writes.iter().map(|(register, _)| *register).collect()
        }
    }

    impl ChipBackend for RecordingChip {
        fn write(&mut self, register: u16, value: u8) {
            self.writes.push((register, value));
        }

        fn generate(&mut self, frames: &mut [StereoFrame]) {
            frames.fill([0, 0]);
        }
    }

    const SILENCE: [f32; CHANNELS] = [0.0; CHANNELS];
    const NO_MOD: [f32; GENERIC_SOURCE_COUNT] = [0.0; GENERIC_SOURCE_COUNT];
    const NO_BUTTONS: [f32; ModSource::COUNT] = [0.0; ModSource::COUNT];

    fn silent_input(knobs: &ParamValues) -> FrameInput<'_> {
        FrameInput {
            gate: &SILENCE,
            pitch: &SILENCE,
            generic_mod: &NO_MOD,
            channel_mod_a: &SILENCE,
            channel_mod_b: &SILENCE,
            algorithm: 0.0,
            learn_buttons: &NO_BUTTONS,
            unlearn_button: 0.0,
            knobs,
        }
    }

    fn new_driver() -> OplDriver<RecordingChip> {
        let mut driver = OplDriver::new(RecordingChip::new());
        driver.chip_mut().writes.clear();
        driver
    }

    #[test]
    fn initialization_programs_chip_features() {
        let driver = OplDriver::new(RecordingChip::new());
        let writes = &driver.chip().writes;
        // zeroed register file plus the three feature-enable writes
        assert_eq!(writes.len(), 0x300 + 3);
        assert!(writes[..0x300]
            .iter()
            .enumerate()
            .all(|(register, write)| *write == (register as u16, 0x00)));
        assert_eq!(writes[0x300..], [(0x001, 1 << 5), (0x105, 0x01), (0x104, 0xff)]);
    }

    #[test]
    fn cycle_emits_each_register_group_once() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let input = silent_input(&knobs);

        // two full cycles; the wrap must not shift the step pattern
        for cycle in 0..2 {
            for step in 0..CYCLE_LENGTH {
                driver.chip_mut().writes.clear();
                driver.process(&input);
                let registers = driver.chip().registers_written();
                // (base register, write count) expected for each active step
                let expected: Option<(u16, usize)> = match step {
                    0 => Some((0x20, CHANNELS * OPERATORS_PER_CHANNEL)),
                    1 => Some((0x40, CHANNELS * OPERATORS_PER_CHANNEL)),
                    2 => Some((0x60, CHANNELS * OPERATORS_PER_CHANNEL)),
                    3 => Some((0x80, CHANNELS * OPERATORS_PER_CHANNEL)),
                    4 => Some((0xc0, 2 * CHANNELS)),
                    5 => Some((0xe0, CHANNELS * OPERATORS_PER_CHANNEL)),
                    _ => None, // step 7 writes nothing with silent gates, 8..=31 idle
                };
                match expected {
                    Some((base, count)) => {
                        assert_eq!(registers.len(), count, "cycle {cycle} step {step}");
                        assert_eq!(registers[0], base, "cycle {cycle} step {step}");
                    }
                    None => assert!(registers.is_empty(), "cycle {cycle} step {step}"),
                }
            }
        }
    }

    #[test]
    fn silent_gates_never_write_note_registers() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let input = silent_input(&knobs);
        for _ in 0..40 {
            driver.process(&input);
        }
        let note_register = |register: u16| {
            let offset = register & 0xff;
            (0xa0..=0xa8).contains(&offset) || (0xb0..=0xb8).contains(&offset)
        };
        assert!(!driver
            .chip()
            .registers_written()
            .iter()
            .any(|register| note_register(*register)));
    }

    #[test]
    fn gate_edge_writes_mirrored_note_registers() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let mut gate = SILENCE;
        gate[0] = 10.0;
        let input = FrameInput {
            gate: &gate,
            ..silent_input(&knobs)
        };

        // run up to the note step
        for _ in 0..7 {
            driver.process(&input);
        }
        let writes = &driver.chip().writes;
        let note_writes: Vec<_> = writes
            .iter()
            .filter(|(register, _)| {
                matches!(register & 0xff, 0xa0..=0xa8 | 0xb0..=0xb8)
            })
            .copied()
            .collect();

        // middle C at 0 V: frequency number 690, block 3, key-on set; mirrored to the
        // shadow channel at +3
        let low = 178;
        let high = (1 << 5) | (3 << 2) | 2;
        assert_eq!(
            note_writes,
            vec![(0xa0, low), (0xa3, low), (0xb0, high), (0xb3, high)]
        );

        // a held gate is not an edge: no further note writes in the next cycle
        let writes_before = driver.chip().writes.len();
        for _ in 0..CYCLE_LENGTH {
            driver.process(&input);
        }
        let note_writes_after = driver.chip().writes[writes_before..]
            .iter()
            .filter(|(register, _)| matches!(register & 0xff, 0xa0..=0xa8 | 0xb0..=0xb8))
            .count();
        assert_eq!(note_writes_after, 0);
    }

    #[test]
    fn gate_release_writes_key_off() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let mut gate = SILENCE;
        gate[2] = 10.0;
        let high_input = FrameInput {
            gate: &gate,
            ..silent_input(&knobs)
        };
        for _ in 0..CYCLE_LENGTH {
            driver.process(&high_input);
        }

        driver.chip_mut().writes.clear();
        let low_input = silent_input(&knobs);
        for _ in 0..CYCLE_LENGTH {
            driver.process(&low_input);
        }
        let b_writes: Vec<_> = driver
            .chip()
            .writes
            .iter()
            .filter(|(register, _)| matches!(register & 0xff, 0xb0..=0xb8))
            .copied()
            .collect();
        // key-off for logical channel 2 (hardware channel 2, shadow 5), key-on bit clear
        assert_eq!(b_writes.len(), 2);
        assert_eq!(b_writes[0].0, 0xb2);
        assert_eq!(b_writes[1].0, 0xb5);
        assert!(b_writes.iter().all(|(_, value)| value & (1 << 5) == 0));
    }

    #[test]
    fn out_of_range_pitch_skips_note_writes() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let mut gate = SILENCE;
        gate[0] = 10.0;
        let mut pitch = SILENCE;
        pitch[0] = 8.0; // far above the highest representable frequency
        let input = FrameInput {
            gate: &gate,
            pitch: &pitch,
            ..silent_input(&knobs)
        };
        for _ in 0..CYCLE_LENGTH {
            driver.process(&input);
        }
        assert!(!driver
            .chip()
            .registers_written()
            .iter()
            .any(|register| matches!(register & 0xff, 0xa0..=0xa8 | 0xb0..=0xb8)));
    }

    #[test]
    fn knob_values_reach_operator_registers() {
        let mut driver = new_driver();
        let mut knobs = ParamValues::new();
        knobs.set_value(ParamId::new(ParamKind::Attack, 0), 10.0);
        knobs.set_value(ParamId::new(ParamKind::Decay, 0), 7.5);
        let input = silent_input(&knobs);

        for _ in 0..3 {
            driver.process(&input);
        }
        // step 3 writes attack/decay; operator slot 0 of channel 0 is register 0x60
        let value = driver
            .chip()
            .writes
            .iter()
            .find(|(register, _)| *register == 0x60)
            .map(|(_, value)| *value)
            .unwrap();
        assert_eq!(value, (10 << 4) | 8);
    }

    #[test]
    fn algorithm_splits_across_primary_and_shadow() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let input = FrameInput {
            algorithm: 2.0,
            ..silent_input(&knobs)
        };
        for _ in 0..5 {
            driver.process(&input);
        }
        let synth_writes: Vec<_> = driver
            .chip()
            .writes
            .iter()
            .filter(|(register, _)| matches!(register & 0xff, 0xc0..=0xc8))
            .copied()
            .collect();
        assert_eq!(synth_writes.len(), 2 * CHANNELS);
        // algorithm 2: primary synth-type bit 0, shadow bit 1; primary routes L+R
        assert_eq!(synth_writes[0], (0xc0, 0b0011_0000));
        assert_eq!(synth_writes[1], (0xc3, 0b0000_0001));
        assert_eq!(synth_writes[6], (0x1c0, 0b0011_0000));
        assert_eq!(synth_writes[7], (0x1c3, 0b0000_0001));
    }

    #[test]
    fn learned_binding_modulates_registers_live() {
        let mut driver = new_driver();
        let mut knobs = ParamValues::new();
        let param = ParamId::new(ParamKind::Attenuation, 1);

        // arm learn for generic source 0 and wiggle the attenuation knob
        let mut buttons = NO_BUTTONS;
        buttons[0] = 10.0;
        let arm_input = FrameInput {
            learn_buttons: &buttons,
            ..silent_input(&knobs)
        };
        driver.process(&arm_input);
        knobs.set_value(param, 1.0);
        let arm_input = FrameInput {
            learn_buttons: &buttons,
            ..silent_input(&knobs)
        };
        driver.process(&arm_input);
        assert_eq!(driver.bindings().binding(param), Some(ModSource::Generic(0)));
        assert_eq!(driver.learn_mode(), LearnMode::Idle);

        // with the source hot, the levels step picks up the live voltage
        knobs.set_value(param, 0.0);
        let mut generic = NO_MOD;
        generic[0] = 10.0;
        let hot_input = FrameInput {
            generic_mod: &generic,
            learn_buttons: &buttons,
            ..silent_input(&knobs)
        };
        driver.chip_mut().writes.clear();
        while driver.chip().registers_written().iter().all(|r| *r != 0x43) {
            driver.process(&hot_input);
        }
        // operator slot 1 of channel 0 is hardware operator 3 -> register 0x43. The source
        // contribution is clamped into the voltage range before normalizing, so a hot source
        // on a wide field tops out at round(mask * 10 / 63) = 10.
        let value = driver
            .chip()
            .writes
            .iter()
            .find(|(register, _)| *register == 0x43)
            .map(|(_, value)| *value)
            .unwrap();
        assert_eq!(value & 0x3f, 10);
    }

    #[test]
    fn learn_events_and_projection_track_bindings() {
        let (sender, receiver) = crossbeam_channel::bounded(16);
        let mut driver = new_driver();
        driver.set_event_sender(sender);
        let projection = driver.projection();
        let mut knobs = ParamValues::new();
        let param = ParamId::new(ParamKind::Multiplier, 3);

        let mut buttons = NO_BUTTONS;
        buttons[7] = 10.0;
        let input = FrameInput {
            learn_buttons: &buttons,
            ..silent_input(&knobs)
        };
        driver.process(&input);
        assert_eq!(
            projection.mode(),
            LearnMode::Learning(ModSource::ChannelB)
        );

        knobs.set_value(param, 2.0);
        let input = FrameInput {
            learn_buttons: &buttons,
            ..silent_input(&knobs)
        };
        driver.process(&input);
        assert_eq!(projection.mode(), LearnMode::Idle);
        assert_eq!(projection.binding(param), Some(ModSource::ChannelB));
        assert_eq!(
            receiver.try_recv().unwrap(),
            LearnEvent::Bound {
                param,
                source: ModSource::ChannelB
            }
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn reset_restarts_the_write_cycle() {
        let mut driver = new_driver();
        let knobs = ParamValues::new();
        let input = silent_input(&knobs);
        for _ in 0..5 {
            driver.process(&input);
        }
        driver.reset();
        driver.chip_mut().writes.clear();
        driver.process(&input);
        // first step after a reset is the operator effects group again
        assert_eq!(driver.chip().registers_written()[0], 0x20);
    }

    #[test]
    fn restored_bindings_show_in_projection() {
        let mut driver = new_driver();
        let param = ParamId::new(ParamKind::Release, 2);
        driver.set_binding(param, Some(ModSource::Generic(4)));
        assert_eq!(driver.projection().binding(param), Some(ModSource::Generic(4)));
        driver.set_binding(param, None);
        assert_eq!(driver.projection().binding(param), None);
    }
}
