//! Optional per-instruction execution trace, gated behind the `trace-log`
//! feature. Writes one line per instruction to `z80-trace.txt` by plain
//! file append, rather than pulling in a structured logging crate for a
//! debug aid nobody runs by default.

use std::fs::{self, OpenOptions};
use std::io::Write;

const TRACE_PATH: &str = "z80-trace.txt";

pub struct Trace {
    enabled: bool,
}

impl Trace {
    pub fn new() -> Self {
        let enabled = fs::File::create(TRACE_PATH).is_ok();
        Self { enabled }
    }

    pub fn record(&mut self, pc_after: u16, opcode: u8, t_states: u32) {
        if !self.enabled {
            return;
        }
        let Ok(mut file) = OpenOptions::new().append(true).open(TRACE_PATH) else {
            return;
        };
        let _ = writeln!(file, "pc={pc_after:04X} op={opcode:02X} t={t_states}");
    }
}

impl Default for Trace {
    fn default() -> Self {
        Self::new()
    }
}
