//! A cycle-approximate ZX Spectrum 48K core: Z80 CPU, 64 KiB address space,
//! ULA IO ports, framebuffer decode, and `.sna`/`.z80` snapshot loading.
//! Hosts (a CLI, a GUI frontend) drive it one frame at a time through
//! [`Machine`]; nothing in this crate touches a window, an audio device, or
//! the filesystem directly.

pub mod bus;
pub mod cpu;
pub mod error;
pub mod flags;
pub mod opcodes;
pub mod registers;
pub mod snapshot;
#[cfg(feature = "trace-log")]
pub mod trace;
pub mod video;

use bus::Bus;
use cpu::Cpu;
pub use error::CoreError;
pub use snapshot::Snapshot;
use video::Video;

/// T-states in one 50 Hz PAL frame: 224 T-states per scanline x 312
/// scanlines.
pub const T_STATES_PER_FRAME: u32 = 69_888;

/// The assembled machine: CPU, bus, and the per-frame video decoder. This is
/// the crate's single public entry point.
pub struct Machine {
    cpu: Cpu,
    bus: Bus,
    video: Video,
}

impl Machine {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: Bus::new(),
            video: Video::new(),
        }
    }

    /// Load a 16,384-byte ROM image into `[0x0000, 0x4000)`.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<(), CoreError> {
        self.bus.load_rom(bytes)
    }

    /// Decode a `.sna` or `.z80` snapshot and replace the register file and
    /// RAM wholesale. Leaves the machine untouched if decoding fails.
    pub fn load_snapshot(&mut self, snapshot: Snapshot) -> Result<(), CoreError> {
        let regs = snapshot::load_snapshot(&mut self.bus, snapshot)?;
        self.cpu.regs = regs;
        Ok(())
    }

    /// Replace the 8-byte keyboard half-row matrix. By convention this is
    /// drained only at frame boundaries, though the core itself applies it
    /// immediately and leaves the cadence to the host.
    pub fn set_keyboard_state(&mut self, matrix: &[u8]) -> Result<(), CoreError> {
        let matrix: &[u8; 8] = matrix
            .try_into()
            .map_err(|_| CoreError::BadKeyboardMatrix { got: matrix.len() })?;
        self.bus.set_keyboard_state(matrix);
        Ok(())
    }

    /// Execute exactly one instruction and return the T-states it consumed.
    pub fn step(&mut self) -> u32 {
        self.cpu.step(&mut self.bus)
    }

    /// Run until at least one frame's worth of T-states ([`T_STATES_PER_FRAME`])
    /// have elapsed, then raise the end-of-frame maskable interrupt and
    /// advance the flash phase. Returns the total T-states consumed, which
    /// is always >= `T_STATES_PER_FRAME`, since the core never cuts an
    /// in-flight instruction short.
    pub fn run_for_frame(&mut self) -> u32 {
        let mut elapsed = 0u32;
        while elapsed < T_STATES_PER_FRAME {
            elapsed += self.cpu.step(&mut self.bus);
        }
        elapsed += self.cpu.accept_maskable_interrupt(&mut self.bus);
        self.video.advance_frame();
        elapsed
    }

    /// Decode the current bitmap/attribute memory into `out`, an ARGB8888
    /// buffer of exactly [`video::FRAMEBUFFER_BYTES`] bytes.
    pub fn render(&self, out: &mut [u8]) {
        self.video.render(&self.bus, out);
    }

    /// Direct access to the register file, for hosts that want to inspect or
    /// script state (e.g. a debugger) beyond what `step`/`run_for_frame`
    /// expose.
    pub fn registers(&self) -> &registers::Registers {
        &self.cpu.regs
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_wrong_sized_rom() {
        let mut machine = Machine::new();
        assert!(machine.load_rom(&[0; 100]).is_err());
    }

    #[test]
    fn rejects_wrong_sized_keyboard_matrix() {
        let mut machine = Machine::new();
        assert!(machine.set_keyboard_state(&[0; 3]).is_err());
    }

    #[test]
    fn run_for_frame_consumes_at_least_one_frame_of_t_states() {
        let mut machine = Machine::new();
        machine.load_rom(&[0x00; bus::ROM_SIZE]).unwrap(); // NOP forever
        let t = machine.run_for_frame();
        assert!(t >= T_STATES_PER_FRAME);
    }

    #[test]
    fn render_produces_a_full_size_framebuffer() {
        let machine = Machine::new();
        let mut out = vec![0u8; video::FRAMEBUFFER_BYTES];
        machine.render(&mut out);
        assert_eq!(out.len(), video::FRAMEBUFFER_BYTES);
    }
}
