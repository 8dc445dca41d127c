//! Arithmetic, logical, rotate/shift, and bit-test operation bodies —
//! `x = 0, z = 4/5/7`, `x = 2`, `x = 3, z = 6`, and the whole `CB` page.
//! Every operation computes a result and a flag byte and hands both back
//! for the caller to commit, rather than mutating flags inline.

use crate::bus::Bus;
use crate::flags;
use crate::opcodes::{AluOp, Decomposed, IndexMode, RotOp};
use crate::registers::InterruptMode;

use super::{Cpu, Operand8};

impl Cpu {
    pub(super) fn exec_main_x0(
        &mut self,
        bus: &mut Bus,
        opcode: u8,
        d: Decomposed,
        mode: IndexMode,
    ) -> u32 {
        match d.z {
            0 => self.op_misc_z0(bus, d),
            1 => self.op_load_rp_or_add_hl(bus, d, mode),
            2 => self.op_load_indirect_accumulator(bus, d, mode),
            3 => self.op_inc_dec_rp(d, mode),
            4 => self.op_inc_r(bus, d, mode),
            5 => self.op_dec_r(bus, d, mode),
            6 => self.op_load_r_immediate(bus, d, mode),
            7 => self.op_accumulator_rotate_or_flag_op(opcode, d),
            _ => unreachable!("z is masked to 3 bits"),
        }
    }

    fn op_accumulator_rotate_or_flag_op(&mut self, _opcode: u8, d: Decomposed) -> u32 {
        let a = self.regs.main.a();
        let f = self.regs.main.f();
        let (result, new_f) = match d.y {
            0 => flags::rlca(a, f),
            1 => flags::rrca(a, f),
            2 => flags::rla(a, f),
            3 => flags::rra(a, f),
            4 => {
                let (r, nf) = flags::daa(a, f);
                (r, nf)
            }
            5 => {
                let r = !a;
                let nf = (f & (flags::bit::S | flags::bit::Z | flags::bit::PV | flags::bit::C))
                    | flags::bit::H
                    | flags::bit::N
                    | (r & (flags::bit::Y | flags::bit::X));
                (r, nf)
            }
            6 => {
                // SCF: C=1, H=N=0, S/Z/PV preserved, Y/X from A.
                let nf = (f & (flags::bit::S | flags::bit::Z | flags::bit::PV))
                    | flags::bit::C
                    | (a & (flags::bit::Y | flags::bit::X));
                (a, nf)
            }
            7 => {
                // CCF: H = old C, C = !old C, N=0, S/Z/PV preserved, Y/X from A.
                let old_c = f & flags::bit::C != 0;
                let mut nf = (f & (flags::bit::S | flags::bit::Z | flags::bit::PV))
                    | (a & (flags::bit::Y | flags::bit::X));
                if old_c {
                    nf |= flags::bit::H;
                } else {
                    nf |= flags::bit::C;
                }
                (a, nf)
            }
            _ => unreachable!(),
        };
        self.regs.main.set_a(result);
        self.regs.main.set_f(new_f);
        4
    }

    fn op_inc_r(&mut self, bus: &mut Bus, d: Decomposed, mode: IndexMode) -> u32 {
        let op = self.resolve_operand(bus, mode, d.y);
        let value = self.read_operand(bus, mode, op);
        let (result, new_f) = flags::inc8(value);
        let carry = self.regs.main.f() & flags::bit::C;
        self.write_operand(bus, mode, op, result);
        self.regs.main.set_f(new_f | carry);
        match op {
            Operand8::Register(_) => 4,
            Operand8::Memory(_) => 11,
        }
    }

    fn op_dec_r(&mut self, bus: &mut Bus, d: Decomposed, mode: IndexMode) -> u32 {
        let op = self.resolve_operand(bus, mode, d.y);
        let value = self.read_operand(bus, mode, op);
        let (result, new_f) = flags::dec8(value);
        let carry = self.regs.main.f() & flags::bit::C;
        self.write_operand(bus, mode, op, result);
        self.regs.main.set_f(new_f | carry);
        match op {
            Operand8::Register(_) => 4,
            Operand8::Memory(_) => 11,
        }
    }

    fn op_inc_dec_rp(&mut self, d: Decomposed, mode: IndexMode) -> u32 {
        let value = self.read_rp(mode, d.p);
        let result = if d.q == 0 {
            value.wrapping_add(1)
        } else {
            value.wrapping_sub(1)
        };
        self.write_rp(mode, d.p, result);
        6
    }

    pub(super) fn exec_main_x2(
        &mut self,
        bus: &mut Bus,
        d: Decomposed,
        mode: IndexMode,
    ) -> u32 {
        let op = self.resolve_operand(bus, mode, d.z);
        let value = self.read_operand(bus, mode, op);
        let t = match op {
            Operand8::Register(_) => 4,
            Operand8::Memory(_) => 7,
        };
        self.alu_apply(AluOp::from_y(d.y), value);
        t
    }

    /// `ALU y, n` (`x = 3, z = 6`) — same ops, immediate operand.
    pub(super) fn op_alu_immediate(&mut self, bus: &Bus, d: Decomposed) -> u32 {
        let value = self.fetch_u8(bus);
        self.alu_apply(AluOp::from_y(d.y), value);
        7
    }

    fn alu_apply(&mut self, op: AluOp, value: u8) {
        let a = self.regs.main.a();
        let f = self.regs.main.f();
        let carry_in = (f & flags::bit::C != 0) as u8;
        let (result, new_f) = match op {
            AluOp::Add => flags::add8(a, value, 0),
            AluOp::Adc => flags::add8(a, value, carry_in),
            AluOp::Sub => flags::sub8(a, value, 0),
            AluOp::Sbc => flags::sub8(a, value, carry_in),
            AluOp::And => flags::and8(a, value),
            AluOp::Xor => flags::xor8(a, value),
            AluOp::Or => flags::or8(a, value),
            AluOp::Cp => (a, flags::cp8(a, value)),
        };
        self.regs.main.set_f(new_f);
        if op != AluOp::Cp {
            self.regs.main.set_a(result);
        }
    }

    pub(super) fn op_add_hl_rp(&mut self, d: Decomposed, mode: IndexMode) -> u32 {
        let hl = self.read_rp(mode, 2);
        let value = self.read_rp(mode, d.p);
        let (result, f) = flags::add16(hl, value, self.regs.main.f());
        self.write_rp(mode, 2, result);
        self.regs.main.set_f(f);
        11
    }

    // -- ED-page 16-bit ALU ---------------------------------------------------

    pub(super) fn op_adc_sbc_hl(&mut self, d: Decomposed) -> u32 {
        let hl = self.regs.main.hl();
        let value = self.read_rp(IndexMode::Hl, d.p);
        let carry = (self.regs.main.f() & flags::bit::C != 0) as u8;
        let (result, f) = if d.q == 1 {
            flags::adc16(hl, value, carry)
        } else {
            flags::sbc16(hl, value, carry)
        };
        self.regs.main.set_hl(result);
        self.regs.main.set_f(f);
        15
    }

    pub(super) fn op_neg(&mut self) -> u32 {
        let a = self.regs.main.a();
        let (result, f) = flags::sub8(0, a, 0);
        self.regs.main.set_a(result);
        self.regs.main.set_f(f);
        8
    }

    pub(super) fn op_rrd_rld(&mut self, bus: &mut Bus, rrd: bool) -> u32 {
        let addr = self.regs.main.hl();
        let mem = bus.read8(addr);
        let a = self.regs.main.a();

        let (new_a, new_mem) = if rrd {
            let new_a = (a & 0xF0) | (mem & 0x0F);
            let new_mem = ((a & 0x0F) << 4) | (mem >> 4);
            (new_a, new_mem)
        } else {
            let new_a = (a & 0xF0) | (mem >> 4);
            let new_mem = ((mem & 0x0F) << 4) | (a & 0x0F);
            (new_a, new_mem)
        };

        bus.write8(addr, new_mem);
        let carry = self.regs.main.f() & flags::bit::C;
        let mut f = carry;
        if new_a == 0 {
            f |= flags::bit::Z;
        }
        f |= new_a & (flags::bit::S | flags::bit::Y | flags::bit::X);
        if flags::parity(new_a) {
            f |= flags::bit::PV;
        }
        self.regs.main.set_a(new_a);
        self.regs.main.set_f(f);
        18
    }

    pub(super) fn op_im(&mut self, d: Decomposed) -> u32 {
        self.regs.im = match d.y {
            0 | 1 | 4 | 5 => InterruptMode::Im0,
            2 | 6 => InterruptMode::Im1,
            3 | 7 => InterruptMode::Im2,
            _ => unreachable!("y is masked to 3 bits"),
        };
        8
    }

    // -- CB page: rotate/shift, BIT, RES, SET ---------------------------------

    pub(super) fn exec_cb(&mut self, bus: &mut Bus, mode: IndexMode) -> u32 {
        let opcode2 = self.fetch_opcode(bus);
        let d = crate::opcodes::decompose(opcode2);
        let op = self.resolve_operand(bus, mode, d.z);

        match d.x {
            0 => self.cb_rotate(bus, mode, op, d),
            1 => self.cb_bit(bus, mode, op, d),
            2 => self.cb_res_set(bus, mode, op, d, false),
            3 => self.cb_res_set(bus, mode, op, d, true),
            _ => unreachable!(),
        }
    }

    fn cb_rotate(&mut self, bus: &mut Bus, mode: IndexMode, op: Operand8, d: Decomposed) -> u32 {
        let value = self.read_operand(bus, mode, op);
        let carry_in = self.regs.main.f() & flags::bit::C != 0;
        let (result, f) = match RotOp::from_y(d.y) {
            RotOp::Rlc => flags::rlc8(value),
            RotOp::Rrc => flags::rrc8(value),
            RotOp::Rl => flags::rl8(value, carry_in),
            RotOp::Rr => flags::rr8(value, carry_in),
            RotOp::Sla => flags::sla8(value),
            RotOp::Sra => flags::sra8(value),
            RotOp::Sll => flags::sll8(value),
            RotOp::Srl => flags::srl8(value),
        };
        self.write_operand(bus, mode, op, result);
        self.regs.main.set_f(f);
        match op {
            Operand8::Register(_) => 8,
            Operand8::Memory(_) => 15,
        }
    }

    fn cb_bit(&mut self, bus: &Bus, mode: IndexMode, op: Operand8, d: Decomposed) -> u32 {
        let value = self.read_operand(bus, mode, op);
        let yx_source = match op {
            Operand8::Register(_) => value,
            Operand8::Memory(addr) => (addr >> 8) as u8,
        };
        let f = flags::bit_test(value, d.y, yx_source, self.regs.main.f());
        self.regs.main.set_f(f);
        match op {
            Operand8::Register(_) => 8,
            Operand8::Memory(_) => 12,
        }
    }

    fn cb_res_set(
        &mut self,
        bus: &mut Bus,
        mode: IndexMode,
        op: Operand8,
        d: Decomposed,
        set: bool,
    ) -> u32 {
        let value = self.read_operand(bus, mode, op);
        let mask = 1 << d.y;
        let result = if set { value | mask } else { value & !mask };
        self.write_operand(bus, mode, op, result);
        match op {
            Operand8::Register(_) => 8,
            Operand8::Memory(_) => 15,
        }
    }

    /// `DDCB`/`FDCB`: the displacement was already consumed by the caller;
    /// the sub-opcode acts on `(IX+d)`/`(IY+d)` and, outside the `BIT` forms,
    /// also copies the result into `r[z]` when `z != 6` (the well-documented
    /// "undocumented" shadow-write).
    pub(super) fn exec_ddcb(&mut self, bus: &mut Bus, mode: IndexMode, d: i8, sub: u8) -> u32 {
        let base = match mode {
            IndexMode::Ix => self.regs.index.ix(),
            IndexMode::Iy => self.regs.index.iy(),
            IndexMode::Hl => unreachable!("DDCB/FDCB only occur under IX/IY prefixes"),
        };
        let addr = base.wrapping_add(d as u16);
        let decoded = crate::opcodes::decompose(sub);
        let op = Operand8::Memory(addr);

        let t = match decoded.x {
            0 => self.cb_rotate(bus, mode, op, decoded),
            1 => self.cb_bit(bus, mode, op, decoded),
            2 => self.cb_res_set(bus, mode, op, decoded, false),
            3 => self.cb_res_set(bus, mode, op, decoded, true),
            _ => unreachable!(),
        };

        if decoded.x != 1 && decoded.z != 6 {
            let result = bus.read8(addr);
            self.write_reg_slot(IndexMode::Hl, decoded.z, result);
        }

        4 + t
    }
}
