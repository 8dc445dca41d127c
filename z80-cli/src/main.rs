//! Headless driver for `z80-core`: loads a snapshot (and optionally a ROM
//! override), runs a fixed number of frames, and dumps the last one to a PPM
//! file so the core's video output is observable without a GUI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use z80_core::{Machine, Snapshot};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a `.sna` or `.z80` snapshot to load.
    snapshot: PathBuf,

    /// Override the default ROM image with a 16,384-byte file.
    #[arg(long)]
    rom: Option<PathBuf>,

    /// Number of frames to run before dumping the final frame.
    #[arg(long, default_value_t = 50)]
    frames: u32,

    /// Where to write the final frame, as a binary PPM (P6).
    #[arg(long, default_value = "frame.ppm")]
    out: PathBuf,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(1);
        }
    };

    let mut machine = Machine::new();

    if let Some(rom_path) = &cli.rom {
        let bytes = match std::fs::read(rom_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                eprintln!("failed to read ROM {}: {err}", rom_path.display());
                return ExitCode::from(2);
            }
        };
        if let Err(err) = machine.load_rom(&bytes) {
            eprintln!("failed to load ROM: {err}");
            return ExitCode::from(2);
        }
    }

    let snapshot_bytes = match std::fs::read(&cli.snapshot) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read snapshot {}: {err}", cli.snapshot.display());
            return ExitCode::from(3);
        }
    };
    let snapshot = snapshot_kind(&cli.snapshot, &snapshot_bytes);
    if let Err(err) = machine.load_snapshot(snapshot) {
        eprintln!("failed to load snapshot: {err}");
        return ExitCode::from(3);
    }

    for _ in 0..cli.frames {
        machine.run_for_frame();
    }

    let mut framebuffer = vec![0u8; z80_core::video::FRAMEBUFFER_BYTES];
    machine.render(&mut framebuffer);
    if let Err(err) = write_ppm(&cli.out, &framebuffer) {
        eprintln!("failed to write {}: {err}", cli.out.display());
        return ExitCode::from(3);
    }

    ExitCode::SUCCESS
}

/// `.sna` is fixed-size (49,179 bytes); anything else is assumed `.z80`.
fn snapshot_kind<'a>(path: &PathBuf, bytes: &'a [u8]) -> Snapshot<'a> {
    let is_sna = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("sna"))
        .unwrap_or(bytes.len() == 49_179);
    if is_sna {
        Snapshot::Sna(bytes)
    } else {
        Snapshot::Z80(bytes)
    }
}

fn write_ppm(path: &PathBuf, argb: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut out = Vec::with_capacity(argb.len());
    write!(out, "P6\n{} {}\n255\n", z80_core::video::WIDTH, z80_core::video::HEIGHT)?;
    for pixel in argb.chunks_exact(4) {
        let [_a, r, g, b] = [pixel[0], pixel[1], pixel[2], pixel[3]];
        out.extend_from_slice(&[r, g, b]);
    }
    std::fs::write(path, out)
}
