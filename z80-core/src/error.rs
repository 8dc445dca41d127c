use std::fmt;

/// Everything that can go wrong at the boundary of the core. Nothing below
/// this boundary panics on caller-supplied data; undefined opcodes are not
/// errors (see `cpu::step`), only malformed ROM/snapshot/keyboard input is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// `load_rom` was given a slice whose length isn't exactly 16,384 bytes.
    InvalidRomSize { got: usize },
    /// `load_snapshot` was given a malformed `.sna`/`.z80` payload. The
    /// message names the field or block that failed to parse.
    InvalidSnapshot(String),
    /// `set_keyboard_state` was given a slice whose length isn't exactly 8.
    BadKeyboardMatrix { got: usize },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidRomSize { got } => {
                write!(f, "ROM must be exactly 16384 bytes, got {got}")
            }
            CoreError::InvalidSnapshot(reason) => write!(f, "invalid snapshot: {reason}"),
            CoreError::BadKeyboardMatrix { got } => {
                write!(f, "keyboard matrix must be exactly 8 bytes, got {got}")
            }
        }
    }
}

impl std::error::Error for CoreError {}
