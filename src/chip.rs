//! OPL3 chip backend boundary and register address mapping.

pub mod registers;

// -------------------------------------------------------------------------------------------------

/// One interleaved stereo frame in signed 16 bit, as produced by [`ChipBackend::generate`].
pub type StereoFrame = [i16; 2];

/// Boundary to an OPL3 (YMF262) waveform generator, typically an emulator core.
///
/// Register writes are fire-and-forget: the chip exposes write-only byte registers in a
/// 0x000..=0x1FF address space and never reports failures. `generate` synthesizes audio from
/// the current register state and must never block, as it is called from the audio thread.
pub trait ChipBackend {
    /// Write one byte to a chip register.
    fn write(&mut self, register: u16, value: u8);

    /// Fill `frames` with synthesized stereo output.
    fn generate(&mut self, frames: &mut [StereoFrame]);
}

// -------------------------------------------------------------------------------------------------

/// Number of logical 4-operator voices the driver runs.
pub const CHANNELS: usize = 6;

/// Operator slots per 4-operator voice.
pub const OPERATORS_PER_CHANNEL: usize = 4;

/// Hardware channel behind each logical channel. 4-operator voices pair two native 2-operator
/// channels; this is the primary (lower) channel of each pair, the shadow channel is always
/// `+ 3`. Only pairs 0-2 of each register bank support 4-op linking, hence the gap.
pub const HW_CHANNEL: [u16; CHANNELS] = [0, 1, 2, 9, 10, 11];

/// First hardware operator of each logical channel; the channel's 4 operator slots sit at
/// stride 3 from there.
pub const HW_FIRST_OPERATOR: [u16; CHANNELS] = [0, 1, 2, 18, 19, 20];

/// Register address for a per-operator register group (`base` 0x20/0x40/0x60/0x80/0xE0) and a
/// hardware operator index. Operator registers are not contiguous; the address space skips two
/// slots after every six operators and switches to the second bank (+0x100) at operator 18.
pub const fn operator_register(base: u16, operator: u16) -> u16 {
    if operator < 6 {
        base + operator
    } else if operator < 12 {
        base + operator + 0x02
    } else if operator < 18 {
        base + operator + 0x04
    } else if operator < 24 {
        base + operator + 0x100 - 18
    } else if operator < 30 {
        base + operator + 0x102 - 18
    } else {
        base + operator + 0x104 - 18
    }
}

/// Register address for a per-channel register group (`base` 0xA0/0xB0/0xC0) and a hardware
/// channel index. Channels 9..=17 live in the second register bank.
pub const fn channel_register(base: u16, channel: u16) -> u16 {
    if channel < 9 {
        base + channel
    } else {
        base + channel + 0x100 - 9
    }
}

// -------------------------------------------------------------------------------------------------

/// Bring a freshly constructed or reset chip into the driver's operating mode: a zeroed
/// register file with per-operator waveform selection, OPL3 features and 4-operator linking
/// for all six channel pairs enabled.
pub(crate) fn initialize<B: ChipBackend>(chip: &mut B) {
    log::debug!("initializing OPL3 register file");
    for register in 0x000..0x300 {
        chip.write(register, 0x00);
    }
    chip.write(0x001, 1 << 5); // waveform select enable
    chip.write(0x105, 0x01); // OPL3 feature enable
    chip.write(0x104, 0xff); // 4-op mode for all channel pairs
}

// -------------------------------------------------------------------------------------------------
