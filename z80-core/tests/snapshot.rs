//! `.sna`/`.z80` decoding: a synthetic `.sna` buffer round-trips through
//! `load_snapshot` into the expected register file, RAM image, and border.

use z80_core::bus::Bus;
use z80_core::snapshot::{load_snapshot, Snapshot};

fn synthetic_sna() -> Vec<u8> {
    let mut data = vec![0u8; 49_179];
    data[0] = 0x3F; // I
                     // HL', DE', BC', AF' all zero.
    data[9] = 0x34; // HL low
    data[10] = 0x12; // HL high -> HL = 0x1234
    data[19] = 0x04; // IFF2 bit set
    data[20] = 0x7F; // R
    data[21] = 0x00; // AF low byte (F)
    data[22] = 0x44; // AF high byte (A)
    let sp = 0xFFFE_u16;
    data[23] = sp.to_le_bytes()[0];
    data[24] = sp.to_le_bytes()[1];
    data[25] = 1; // IM1
    data[26] = 0x03; // border = 3

    // RAM starts at offset 27, covering 0x4000..=0xFFFF. Place a return
    // address at the restored SP (0xFFFE) so PC pop-off-stack is checked.
    let ram_start = 27usize;
    let sp_index = (sp - 0x4000) as usize;
    data[ram_start + sp_index] = 0x00;
    data[ram_start + sp_index + 1] = 0x80; // PC = 0x8000
    data[ram_start + (0x8000 - 0x4000)] = 0x76; // HALT at 0x8000

    data
}

#[test]
fn sna_restores_registers_ram_and_border() {
    let mut bus = Bus::new();
    let data = synthetic_sna();

    let regs = load_snapshot(&mut bus, Snapshot::Sna(&data)).expect("valid synthetic .sna");

    assert_eq!(regs.i, 0x3F);
    assert_eq!(regs.main.hl(), 0x1234);
    assert!(regs.iff1);
    assert!(regs.iff2);
    assert_eq!(regs.r, 0x7F);
    assert_eq!(regs.pc, 0x8000);
    assert_eq!(regs.sp, 0x0000); // 0xFFFE + 2 wraps to 0
    assert_eq!(bus.border_color, 3);
    assert_eq!(bus.read8(0x8000), 0x76);
}

#[test]
fn sna_rejects_wrong_size() {
    let mut bus = Bus::new();
    let data = vec![0u8; 100];
    assert!(load_snapshot(&mut bus, Snapshot::Sna(&data)).is_err());
}

#[test]
fn z80_v1_uncompressed_round_trips() {
    let mut bus = Bus::new();
    let mut data = vec![0u8; 30 + 0xC000];
    data[0] = 0x11; // A
    data[1] = 0x00; // F
    data[6] = 0x00;
    data[7] = 0x80; // PC = 0x8000 (v1 marker: nonzero)
    data[8] = 0xFE;
    data[9] = 0xFF; // SP = 0xFFFE
    data[12] = 0x00; // border=0, uncompressed
    let ram_offset = 30 + (0x8000 - 0x4000);
    data[ram_offset] = 0x76; // HALT at 0x8000

    let regs = load_snapshot(&mut bus, Snapshot::Z80(&data)).expect("valid synthetic v1 .z80");
    assert_eq!(regs.main.a(), 0x11);
    assert_eq!(regs.pc, 0x8000);
    assert_eq!(bus.read8(0x8000), 0x76);
}
