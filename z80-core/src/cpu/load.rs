//! 8-bit and 16-bit load forms, stack push/pop, and the four exchange
//! instructions — `x = 1` (register-to-register), the load-shaped halves of
//! `x = 0`, `x = 3`'s `PUSH`/`POP`, and the `ED`-page memory/`I`/`R` loads.

use crate::bus::Bus;
use crate::flags;
use crate::opcodes::{Decomposed, IndexMode};

use super::{Cpu, Operand8};

impl Cpu {
    /// `x = 1`: `LD r[y], r[z]`, with `y = z = 6` carved out as `HALT`.
    pub(super) fn exec_main_x1(&mut self, bus: &mut Bus, d: Decomposed, mode: IndexMode) -> u32 {
        if d.y == 6 && d.z == 6 {
            self.regs.halted = true;
            return 4;
        }

        let src = self.resolve_operand(bus, mode, d.z);
        let value = self.read_operand(bus, mode, src);
        let dst = self.resolve_operand(bus, mode, d.y);
        self.write_operand(bus, mode, dst, value);

        match (src, dst) {
            (Operand8::Register(_), Operand8::Register(_)) => 4,
            _ => 7,
        }
    }

    /// `x = 0, z = 1`: `LD rp[p], nn` when `q = 0`; `ADD HL, rp[p]` (defined
    /// in `alu.rs`) when `q = 1`.
    pub(super) fn op_load_rp_or_add_hl(&mut self, bus: &Bus, d: Decomposed, mode: IndexMode) -> u32 {
        if d.q == 0 {
            let value = self.fetch_u16(bus);
            self.write_rp(mode, d.p, value);
            10
        } else {
            self.op_add_hl_rp(d, mode)
        }
    }

    /// `x = 0, z = 2`: the eight `LD (BC)/(DE)/(nn),A`/`LD HL,(nn)` forms and
    /// their mirrored loads.
    pub(super) fn op_load_indirect_accumulator(
        &mut self,
        bus: &mut Bus,
        d: Decomposed,
        mode: IndexMode,
    ) -> u32 {
        match (d.q, d.p) {
            (0, 0) => {
                bus.write8(self.regs.main.bc(), self.regs.main.a());
                7
            }
            (0, 1) => {
                bus.write8(self.regs.main.de(), self.regs.main.a());
                7
            }
            (0, 2) => {
                let addr = self.fetch_u16(bus);
                let value = self.read_rp(mode, 2);
                bus.write16(addr, value);
                16
            }
            (0, 3) => {
                let addr = self.fetch_u16(bus);
                bus.write8(addr, self.regs.main.a());
                13
            }
            (1, 0) => {
                let value = bus.read8(self.regs.main.bc());
                self.regs.main.set_a(value);
                7
            }
            (1, 1) => {
                let value = bus.read8(self.regs.main.de());
                self.regs.main.set_a(value);
                7
            }
            (1, 2) => {
                let addr = self.fetch_u16(bus);
                let value = bus.read16(addr);
                self.write_rp(mode, 2, value);
                16
            }
            (1, 3) => {
                let addr = self.fetch_u16(bus);
                let value = bus.read8(addr);
                self.regs.main.set_a(value);
                13
            }
            _ => unreachable!("q is a single bit, p is masked to 2 bits"),
        }
    }

    /// `x = 0, z = 6`: `LD r[y], n`.
    pub(super) fn op_load_r_immediate(&mut self, bus: &mut Bus, d: Decomposed, mode: IndexMode) -> u32 {
        let op = self.resolve_operand(bus, mode, d.y);
        let value = self.fetch_u8(bus);
        self.write_operand(bus, mode, op, value);
        match op {
            Operand8::Register(_) => 7,
            Operand8::Memory(_) => 10,
        }
    }

    /// `x = 0, z = 0, y = 0..3`: `NOP`, `EX AF,AF'`, `DJNZ d`, `JR d`; `y =
    /// 4..7`: `JR cc[y-4], d` (the branch forms live in `control.rs`).
    pub(super) fn op_misc_z0(&mut self, bus: &Bus, d: Decomposed) -> u32 {
        match d.y {
            0 => 4,
            1 => {
                self.op_ex_af_af();
                4
            }
            2 => self.op_djnz(bus),
            3 => self.op_jr_unconditional(bus),
            _ => self.op_jr_conditional(bus, d),
        }
    }

    pub(super) fn op_ex_af_af(&mut self) {
        self.regs.ex_af();
    }

    pub(super) fn op_ex_de_hl(&mut self) -> u32 {
        self.regs.ex_de_hl();
        4
    }

    pub(super) fn op_exx(&mut self) -> u32 {
        self.regs.exx();
        4
    }

    pub(super) fn op_ex_sp_hl(&mut self, bus: &mut Bus, mode: IndexMode) -> u32 {
        let sp = self.regs.sp;
        let stack_value = bus.read16(sp);
        let reg_value = self.read_rp(mode, 2);
        bus.write16(sp, reg_value);
        self.write_rp(mode, 2, stack_value);
        19
    }

    pub(super) fn op_ld_sp_hl(&mut self, mode: IndexMode) -> u32 {
        self.regs.sp = self.read_rp(mode, 2);
        6
    }

    pub(super) fn op_pop(&mut self, bus: &Bus, d: Decomposed, mode: IndexMode) -> u32 {
        let value = self.pop16(bus);
        self.write_rp2(mode, d.p, value);
        10
    }

    pub(super) fn op_push(&mut self, bus: &mut Bus, d: Decomposed, mode: IndexMode) -> u32 {
        let value = self.read_rp2(mode, d.p);
        self.push16(bus, value);
        11
    }

    // -- ED-page loads ---------------------------------------------------------

    /// `ED`, `x = 1, z = 3`: `LD (nn), rp[p]` (`q = 0`) / `LD rp[p], (nn)`
    /// (`q = 1`).
    pub(super) fn op_ed_ld_rp_nn(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        let addr = self.fetch_u16(bus);
        if d.q == 0 {
            let value = self.read_rp(IndexMode::Hl, d.p);
            bus.write16(addr, value);
        } else {
            let value = bus.read16(addr);
            self.write_rp(IndexMode::Hl, d.p, value);
        }
        20
    }

    /// `ED`, `x = 1, z = 7, y = 0..3`: `LD I,A` / `LD R,A` / `LD A,I` / `LD
    /// A,R`.
    pub(super) fn op_ld_i_r_a(&mut self, d: Decomposed) -> u32 {
        match d.y {
            0 => self.regs.i = self.regs.main.a(),
            1 => self.regs.r = self.regs.main.a(),
            2 => {
                let i = self.regs.i;
                self.set_a_with_iff2_flags(i);
            }
            3 => {
                let r = self.regs.r;
                self.set_a_with_iff2_flags(r);
            }
            _ => unreachable!("only y = 0..3 reaches this handler"),
        }
        9
    }

    /// `LD A,I`/`LD A,R`: `S/Z/Y/X` from the result, `H = N = 0`, `P/V =
    /// IFF2`, `C` preserved.
    fn set_a_with_iff2_flags(&mut self, value: u8) {
        self.regs.main.set_a(value);
        let mut f = self.regs.main.f() & flags::bit::C;
        if value == 0 {
            f |= flags::bit::Z;
        }
        f |= value & (flags::bit::S | flags::bit::Y | flags::bit::X);
        if self.regs.iff2 {
            f |= flags::bit::PV;
        }
        self.regs.main.set_f(f);
    }
}
