//! `.sna` and `.z80` (v1/v2/v3) snapshot decoding. Parsing happens entirely
//! against the input byte slice before anything touches the `Bus` or
//! `Registers` the host already has — on any error nothing has been
//! mutated.

use crate::bus::Bus;
use crate::error::CoreError;
use crate::registers::{InterruptMode, Registers};

/// Which binary format `load_snapshot` should interpret the bytes as.
/// Sniffing the format from a bare byte slice (`.sna` is a fixed size;
/// `.z80` is not) is left to the host; this module only owns the bit-exact
/// in-memory layouts.
pub enum Snapshot<'a> {
    Sna(&'a [u8]),
    Z80(&'a [u8]),
}

struct Decoded {
    regs: Registers,
    border: u8,
    ram: Vec<(u16, Vec<u8>)>,
}

/// Decode `snapshot` and, only if decoding succeeds completely, apply it to
/// `bus` and return the restored register file.
pub fn load_snapshot(bus: &mut Bus, snapshot: Snapshot) -> Result<Registers, CoreError> {
    let decoded = match snapshot {
        Snapshot::Sna(data) => parse_sna(data)?,
        Snapshot::Z80(data) => parse_z80(data)?,
    };

    for (addr, bytes) in &decoded.ram {
        bus.load_ram(*addr, bytes);
    }
    bus.border_color = decoded.border;
    Ok(decoded.regs)
}

fn u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

// -- .sna ---------------------------------------------------------------------

const SNA_SIZE: usize = 49_179;
const SNA_RAM_SIZE: usize = 0xC000;

fn parse_sna(data: &[u8]) -> Result<Decoded, CoreError> {
    if data.len() != SNA_SIZE {
        return Err(CoreError::InvalidSnapshot(format!(
            ".sna must be exactly {SNA_SIZE} bytes, got {}",
            data.len()
        )));
    }

    let mut regs = Registers::power_on();
    regs.i = data[0];
    regs.shadow.set_hl(u16_le(data, 1));
    regs.shadow.set_de(u16_le(data, 3));
    regs.shadow.set_bc(u16_le(data, 5));
    regs.shadow.set_af(u16_le(data, 7));
    regs.main.set_hl(u16_le(data, 9));
    regs.main.set_de(u16_le(data, 11));
    regs.main.set_bc(u16_le(data, 13));
    regs.index.set_iy(u16_le(data, 15));
    regs.index.set_ix(u16_le(data, 17));
    regs.iff2 = data[19] & 0x04 != 0;
    regs.iff1 = regs.iff2;
    regs.r = data[20];
    regs.main.set_af(u16_le(data, 21));
    let sp = u16_le(data, 23);
    regs.im = match data[25] {
        0 => InterruptMode::Im0,
        2 => InterruptMode::Im2,
        _ => InterruptMode::Im1,
    };
    let border = data[26] & 0x07;

    let ram = data[27..27 + SNA_RAM_SIZE].to_vec();

    // PC is popped from the stack at the restored SP: read the two bytes
    // the RAM image has sitting at `sp`.
    regs.pc = if sp >= 0x4000 {
        let lo_idx = (sp - 0x4000) as usize;
        let hi_idx = if lo_idx + 1 < ram.len() { lo_idx + 1 } else { 0 };
        u16::from_le_bytes([ram[lo_idx], ram[hi_idx]])
    } else {
        0
    };
    regs.sp = sp.wrapping_add(2);

    Ok(Decoded {
        regs,
        border,
        ram: vec![(0x4000, ram)],
    })
}

// -- .z80 -----------------------------------------------------------------

fn decompress_rle(input: &[u8], expected_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(expected_len);
    let mut rest = input;
    while out.len() < expected_len && !rest.is_empty() {
        if rest.len() >= 4 && rest[0] == 0xED && rest[1] == 0xED {
            let n = if rest[2] == 0 { 256 } else { rest[2] as usize };
            let v = rest[3];
            for _ in 0..n {
                if out.len() >= expected_len {
                    break;
                }
                out.push(v);
            }
            rest = &rest[4..];
        } else {
            out.push(rest[0]);
            rest = &rest[1..];
        }
    }
    out
}

const Z80_BASE_HEADER_LEN: usize = 30;

fn parse_z80(data: &[u8]) -> Result<Decoded, CoreError> {
    if data.len() < Z80_BASE_HEADER_LEN {
        return Err(CoreError::InvalidSnapshot(
            ".z80 file shorter than the base 30-byte header".into(),
        ));
    }

    let mut regs = Registers::power_on();
    regs.main.set_a(data[0]);
    regs.main.set_f(data[1]);
    regs.main.set_bc(u16_le(data, 2));
    regs.main.set_hl(u16_le(data, 4));
    let header_pc = u16_le(data, 6);
    regs.sp = u16_le(data, 8);
    regs.i = data[10];

    // Byte 12 == 255 is a historical marker meaning "treat as 1" (R bit 7
    // set, border black, uncompressed) from early `.z80` writers.
    let byte12 = if data[12] == 0xFF { 0x01 } else { data[12] };
    regs.r = (data[11] & 0x7F) | ((byte12 & 0x01) << 7);
    let border = (byte12 >> 1) & 0x07;
    let compressed = byte12 & 0x20 != 0;

    regs.main.set_de(u16_le(data, 13));
    regs.shadow.set_bc(u16_le(data, 15));
    regs.shadow.set_de(u16_le(data, 17));
    regs.shadow.set_hl(u16_le(data, 19));
    regs.shadow.set_a(data[21]);
    regs.shadow.set_f(data[22]);
    regs.index.set_iy(u16_le(data, 23));
    regs.index.set_ix(u16_le(data, 25));
    regs.iff1 = data[27] != 0;
    regs.iff2 = data[28] != 0;
    regs.im = match data[29] & 0x03 {
        0 => InterruptMode::Im0,
        2 => InterruptMode::Im2,
        _ => InterruptMode::Im1,
    };

    if header_pc != 0 {
        // Version 1: a flat 0xC000-byte RAM image follows immediately.
        regs.pc = header_pc;
        let payload = &data[Z80_BASE_HEADER_LEN..];
        let ram = if compressed {
            decompress_rle(payload, 0xC000)
        } else {
            if payload.len() < 0xC000 {
                return Err(CoreError::InvalidSnapshot(
                    "v1 .z80 RAM payload shorter than 0xC000 bytes".into(),
                ));
            }
            payload[..0xC000].to_vec()
        };
        return Ok(Decoded {
            regs,
            border,
            ram: vec![(0x4000, ram)],
        });
    }

    // Version 2/3: an extended header (whose length names the version)
    // carries the real PC, followed by a sequence of per-page memory blocks.
    if data.len() < Z80_BASE_HEADER_LEN + 2 {
        return Err(CoreError::InvalidSnapshot(
            ".z80 v2/v3 extended header length is missing".into(),
        ));
    }
    let ext_len = u16_le(data, Z80_BASE_HEADER_LEN) as usize;
    let ext_start = Z80_BASE_HEADER_LEN + 2;
    if data.len() < ext_start + ext_len || ext_len < 2 {
        return Err(CoreError::InvalidSnapshot(
            ".z80 extended header is truncated".into(),
        ));
    }
    regs.pc = u16_le(data, ext_start);

    let mut offset = ext_start + ext_len;
    let mut ram = Vec::new();
    while offset + 3 <= data.len() {
        let block_len = u16_le(data, offset) as usize;
        let page = data[offset + 2];
        offset += 3;

        let (page_bytes, consumed) = if block_len == 0xFFFF {
            if offset + 0x4000 > data.len() {
                return Err(CoreError::InvalidSnapshot(
                    "uncompressed .z80 page block runs past end of file".into(),
                ));
            }
            (data[offset..offset + 0x4000].to_vec(), 0x4000)
        } else {
            if offset + block_len > data.len() {
                return Err(CoreError::InvalidSnapshot(
                    "compressed .z80 page block runs past end of file".into(),
                ));
            }
            (decompress_rle(&data[offset..offset + block_len], 0x4000), block_len)
        };
        offset += consumed;

        // 48K mapping only; 128K banked pages are out of scope.
        let base = match page {
            4 => Some(0x8000u16),
            5 => Some(0xC000u16),
            8 => Some(0x4000u16),
            _ => None,
        };
        if let Some(base) = base {
            ram.push((base, page_bytes));
        }
    }

    Ok(Decoded { regs, border, ram })
}
