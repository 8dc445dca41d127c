//! Register aliasing, PC advancing exactly by instruction length, exchange
//! idempotence, and parity flag correctness.

use z80_core::bus::Bus;
use z80_core::cpu::Cpu;
use z80_core::flags;
use z80_core::registers::Registers;

#[test]
fn wide_register_aliasing_round_trips_both_ways() {
    let mut regs = Registers::power_on();

    regs.main.set_bc(0xBEEF);
    assert_eq!(regs.main.b(), 0xBE);
    assert_eq!(regs.main.c(), 0xEF);

    regs.main.set_d(0x12);
    regs.main.set_e(0x34);
    assert_eq!(regs.main.de(), 0x1234);

    regs.index.set_ix(0xCAFE);
    assert_eq!(regs.index.ixh(), 0xCA);
    assert_eq!(regs.index.ixl(), 0xFE);

    regs.index.set_iyh(0x01);
    regs.index.set_iyl(0x02);
    assert_eq!(regs.index.iy(), 0x0102);
}

#[test]
fn pc_advances_by_exactly_instruction_length_for_non_branches() {
    // LD BC,nn (3 bytes); INC A (1 byte); LD (HL),n (2 bytes).
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    bus.load_ram(0x0000, &[0x01, 0x34, 0x12, 0x3C, 0x36, 0x42]);
    cpu.regs.pc = 0x0000;

    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 3);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 4);
    cpu.step(&mut bus);
    assert_eq!(cpu.regs.pc, 6);
}

#[test]
fn ex_af_af_is_idempotent() {
    let mut cpu = Cpu::new();
    cpu.regs.main.set_af(0x1234);
    cpu.regs.shadow.set_af(0x5678);
    let before = cpu.regs.main.af();

    cpu.regs.ex_af();
    cpu.regs.ex_af();
    assert_eq!(cpu.regs.main.af(), before);
}

#[test]
fn exx_and_ex_de_hl_are_idempotent() {
    let mut cpu = Cpu::new();
    cpu.regs.main.set_bc(0x1111);
    cpu.regs.main.set_de(0x2222);
    cpu.regs.main.set_hl(0x3333);
    cpu.regs.shadow.set_bc(0x4444);
    cpu.regs.shadow.set_de(0x5555);
    cpu.regs.shadow.set_hl(0x6666);
    let before = cpu.regs;

    cpu.regs.exx();
    cpu.regs.exx();
    assert!(cpu.regs.main.bc() == before.main.bc() && cpu.regs.main.hl() == before.main.hl());

    cpu.regs.ex_de_hl();
    cpu.regs.ex_de_hl();
    assert_eq!(cpu.regs.main.de(), before.main.de());
    assert_eq!(cpu.regs.main.hl(), before.main.hl());
}

#[test]
fn ex_sp_hl_is_idempotent_when_sp_is_unchanged() {
    let mut cpu = Cpu::new();
    let mut bus = Bus::new();
    cpu.regs.sp = 0x8000;
    cpu.regs.main.set_hl(0xABCD);
    bus.write16(0x8000, 0x1234);
    let before_hl = cpu.regs.main.hl();
    let before_mem = bus.read16(0x8000);

    bus.load_ram(0x0000, &[0xE3, 0xE3]); // EX (SP),HL twice
    cpu.regs.pc = 0x0000;
    cpu.step(&mut bus);
    cpu.step(&mut bus);

    assert_eq!(cpu.regs.main.hl(), before_hl);
    assert_eq!(bus.read16(0x8000), before_mem);
}

#[test]
fn or_a_flag_parity_matches_popcount_for_every_byte() {
    for v in 0u8..=255 {
        let (_result, f) = flags::or8(0, v);
        let expected_even = v.count_ones() % 2 == 0;
        assert_eq!(f & flags::bit::PV != 0, expected_even, "v={v:#04x}");
    }
}
