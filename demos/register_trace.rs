//! An example showcasing how to drive the register scheduler with a stub chip backend,
//! tracing all emitted register writes and performing a learn gesture.

use opldrive::{
    ChipBackend, Error, FrameInput, ModSource, OplDriver, ParamId, ParamKind, ParamValues,
    StereoFrame, CHANNELS, GENERIC_SOURCE_COUNT,
};

// -------------------------------------------------------------------------------------------------

/// A chip backend that logs every register write and synthesizes silence. Swap in a real
/// OPL3 emulator core to hear something.
struct TracingChip;

impl ChipBackend for TracingChip {
    fn write(&mut self, register: u16, value: u8) {
        log::info!("write 0x{register:03x} <- 0x{value:02x}");
    }

    fn generate(&mut self, frames: &mut [StereoFrame]) {
        frames.fill([0, 0]);
    }
}

// -------------------------------------------------------------------------------------------------

fn main() -> Result<(), Error> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    let mut driver = OplDriver::new(TracingChip);

    let (event_sender, event_receiver) = crossbeam_channel::bounded(16);
    driver.set_event_sender(event_sender);

    // set up a basic patch on the knobs
    let mut knobs = ParamValues::new();
    knobs.set_value_by_name("attack1", 9.0)?;
    knobs.set_value_by_name("decay1", 5.0)?;
    knobs.set_value_by_name("sustain1", 7.0)?;
    knobs.set_value_by_name("release1", 4.0)?;
    knobs.set_value_by_name("multiplier1", 1.0)?;

    let silence = [0.0; CHANNELS];
    let no_mod = [0.0; GENERIC_SOURCE_COUNT];
    let no_buttons = [0.0; ModSource::COUNT];

    // play a gated middle C on channel 0 for one full write cycle
    let mut gate = silence;
    gate[0] = 10.0;
    for _ in 0..32 {
        driver.process(&FrameInput {
            gate: &gate,
            pitch: &silence,
            generic_mod: &no_mod,
            channel_mod_a: &silence,
            channel_mod_b: &silence,
            algorithm: 0.0,
            learn_buttons: &no_buttons,
            unlearn_button: 0.0,
            knobs: &knobs,
        });
    }

    // press the first learn button, then wiggle the attenuation knob of operator 1: the
    // parameter gets bound to generic modulation source 1
    let mut buttons = no_buttons;
    buttons[0] = 10.0;
    driver.process(&FrameInput {
        gate: &gate,
        pitch: &silence,
        generic_mod: &no_mod,
        channel_mod_a: &silence,
        channel_mod_b: &silence,
        algorithm: 0.0,
        learn_buttons: &buttons,
        unlearn_button: 0.0,
        knobs: &knobs,
    });
    knobs.set_value(ParamId::new(ParamKind::Attenuation, 0), 2.0);
    driver.process(&FrameInput {
        gate: &gate,
        pitch: &silence,
        generic_mod: &no_mod,
        channel_mod_a: &silence,
        channel_mod_b: &silence,
        algorithm: 0.0,
        learn_buttons: &buttons,
        unlearn_button: 0.0,
        knobs: &knobs,
    });
    while let Ok(event) = event_receiver.try_recv() {
        log::info!("learn event: {event:?}");
    }

    // run another cycle with the bound source hot: the attenuation registers now follow it
    let mut generic = no_mod;
    generic[0] = 5.0;
    for _ in 0..32 {
        driver.process(&FrameInput {
            gate: &gate,
            pitch: &silence,
            generic_mod: &generic,
            channel_mod_a: &silence,
            channel_mod_b: &silence,
            algorithm: 0.0,
            learn_buttons: &buttons,
            unlearn_button: 0.0,
            knobs: &knobs,
        });
    }

    Ok(())
}
