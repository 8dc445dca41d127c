//! Branches, calls, returns, `IN`/`OUT`, interrupt control, and the `ED`-page
//! top-level dispatcher — `x = 3` of the main page plus everything under the
//! `ED` prefix that isn't a block instruction (those are `block.rs`).

use crate::bus::Bus;
use crate::flags;
use crate::opcodes::{decompose, Condition, Decomposed, IndexMode};

use super::Cpu;

impl Cpu {
    pub(super) fn exec_main_x3(
        &mut self,
        bus: &mut Bus,
        _opcode: u8,
        d: Decomposed,
        mode: IndexMode,
    ) -> u32 {
        match d.z {
            0 => self.op_ret_conditional(bus, d),
            1 => match d.q {
                0 => self.op_pop(bus, d, mode),
                1 => match d.p {
                    0 => self.op_ret_unconditional(bus),
                    1 => self.op_exx(),
                    2 => self.op_jp_hl(mode),
                    3 => self.op_ld_sp_hl(mode),
                    _ => unreachable!("p is masked to 2 bits"),
                },
                _ => unreachable!("q is a single bit"),
            },
            2 => self.op_jp_conditional(bus, d),
            3 => match d.y {
                0 => self.op_jp_unconditional(bus),
                1 => unreachable!("CB is intercepted before reaching the main dispatcher"),
                2 => self.op_out_n_a(bus),
                3 => self.op_in_a_n(bus),
                4 => self.op_ex_sp_hl(bus, mode),
                5 => self.op_ex_de_hl(),
                6 => self.op_di(),
                7 => self.op_ei(),
                _ => unreachable!("y is masked to 3 bits"),
            },
            4 => self.op_call_conditional(bus, d),
            5 => match d.q {
                0 => self.op_push(bus, d, mode),
                1 => match d.p {
                    0 => self.op_call_unconditional(bus),
                    // A redundant prefix byte's own 4 T-states were already
                    // charged by the `exec_prefixed` call that fetched it as
                    // `opcode2` and dispatched here; `exec_prefixed`/`exec_ed`
                    // charge for *their* prefix byte internally, so nothing
                    // extra is added at this call site.
                    1 => self.exec_prefixed(bus, IndexMode::Ix),
                    2 => self.exec_ed(bus),
                    3 => self.exec_prefixed(bus, IndexMode::Iy),
                    _ => unreachable!("p is masked to 2 bits"),
                },
                _ => unreachable!("q is a single bit"),
            },
            6 => self.op_alu_immediate(bus, d),
            7 => self.op_rst(bus, d),
            _ => unreachable!("z is masked to 3 bits"),
        }
    }

    // -- JR / DJNZ ---------------------------------------------------------

    pub(super) fn op_jr_unconditional(&mut self, bus: &Bus) -> u32 {
        let e = self.fetch_displacement(bus);
        self.regs.pc = self.regs.pc.wrapping_add(e as u16);
        12
    }

    pub(super) fn op_jr_conditional(&mut self, bus: &Bus, d: Decomposed) -> u32 {
        let e = self.fetch_displacement(bus);
        if Condition::from_jr_y(d.y).holds(self.regs.main.f()) {
            self.regs.pc = self.regs.pc.wrapping_add(e as u16);
            12
        } else {
            7
        }
    }

    pub(super) fn op_djnz(&mut self, bus: &Bus) -> u32 {
        let e = self.fetch_displacement(bus);
        let b = self.regs.main.b().wrapping_sub(1);
        self.regs.main.set_b(b);
        if b != 0 {
            self.regs.pc = self.regs.pc.wrapping_add(e as u16);
            13
        } else {
            8
        }
    }

    // -- JP / CALL / RET / RST ------------------------------------------------

    fn op_jp_unconditional(&mut self, bus: &Bus) -> u32 {
        let addr = self.fetch_u16(bus);
        self.regs.pc = addr;
        10
    }

    fn op_jp_conditional(&mut self, bus: &Bus, d: Decomposed) -> u32 {
        let addr = self.fetch_u16(bus);
        if Condition::from_y(d.y).holds(self.regs.main.f()) {
            self.regs.pc = addr;
        }
        10
    }

    fn op_jp_hl(&mut self, mode: IndexMode) -> u32 {
        self.regs.pc = self.read_rp(mode, 2);
        4
    }

    fn op_call_unconditional(&mut self, bus: &mut Bus) -> u32 {
        let addr = self.fetch_u16(bus);
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = addr;
        17
    }

    fn op_call_conditional(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        let addr = self.fetch_u16(bus);
        if Condition::from_y(d.y).holds(self.regs.main.f()) {
            let ret = self.regs.pc;
            self.push16(bus, ret);
            self.regs.pc = addr;
            17
        } else {
            10
        }
    }

    fn op_ret_unconditional(&mut self, bus: &Bus) -> u32 {
        self.regs.pc = self.pop16(bus);
        10
    }

    fn op_ret_conditional(&mut self, bus: &Bus, d: Decomposed) -> u32 {
        if Condition::from_y(d.y).holds(self.regs.main.f()) {
            self.regs.pc = self.pop16(bus);
            11
        } else {
            5
        }
    }

    fn op_rst(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = d.y as u16 * 8;
        11
    }

    // -- IN / OUT (accumulator forms) -----------------------------------------

    fn op_out_n_a(&mut self, bus: &mut Bus) -> u32 {
        let n = self.fetch_u8(bus);
        let a = self.regs.main.a();
        let port = (a as u16) << 8 | n as u16;
        bus.out_port(port, a);
        11
    }

    fn op_in_a_n(&mut self, bus: &mut Bus) -> u32 {
        let n = self.fetch_u8(bus);
        let a = self.regs.main.a();
        let port = (a as u16) << 8 | n as u16;
        let value = bus.in_port(port);
        self.regs.main.set_a(value);
        11
    }

    // -- Interrupt control -----------------------------------------------------

    fn op_di(&mut self) -> u32 {
        self.regs.iff1 = false;
        self.regs.iff2 = false;
        4
    }

    fn op_ei(&mut self) -> u32 {
        self.regs.iff1 = true;
        self.regs.iff2 = true;
        self.set_ei_defer();
        4
    }

    // A nested `DD`/`FD` prefix reached through the main dispatcher (e.g.
    // `DD DD ..`, `DD FD ..`) is handled by calling back into `exec_prefixed`
    // (defined in `cpu.rs`) with the new mode — the last index prefix before
    // the actual opcode wins, which falls out naturally from that recursion.

    // -- ED page: everything except the block instructions (`block.rs`) -------

    pub(super) fn exec_ed(&mut self, bus: &mut Bus) -> u32 {
        let opcode2 = self.fetch_opcode(bus);
        let d = decompose(opcode2);
        match d.x {
            1 => self.exec_ed_x1(bus, d),
            2 => self.exec_ed_x2(bus, d),
            _ => 8,
        }
    }

    fn exec_ed_x1(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        match d.z {
            0 => self.op_in_r_c(bus, d),
            1 => self.op_out_c_r(bus, d),
            2 => self.op_adc_sbc_hl(d),
            3 => self.op_ed_ld_rp_nn(bus, d),
            4 => self.op_neg(),
            5 => self.op_retn_reti(bus),
            6 => self.op_im(d),
            7 => self.op_ed_misc(bus, d),
            _ => unreachable!("z is masked to 3 bits"),
        }
    }

    fn exec_ed_x2(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        if d.y < 4 {
            return 8;
        }
        match d.z {
            0 => self.op_block_ld(bus, d),
            1 => self.op_block_cp(bus, d),
            2 => self.op_block_in(bus, d),
            3 => self.op_block_out(bus, d),
            _ => 8,
        }
    }

    fn op_ed_misc(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        match d.y {
            0..=3 => self.op_ld_i_r_a(d),
            4 => self.op_rrd_rld(bus, true),
            5 => self.op_rrd_rld(bus, false),
            _ => 8,
        }
    }

    fn op_in_r_c(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        let port = self.regs.main.bc();
        let value = bus.in_port(port);
        if d.y != 6 {
            self.write_reg_slot(IndexMode::Hl, d.y, value);
        }
        let mut f = self.regs.main.f() & flags::bit::C;
        if value == 0 {
            f |= flags::bit::Z;
        }
        f |= value & (flags::bit::S | flags::bit::Y | flags::bit::X);
        if flags::parity(value) {
            f |= flags::bit::PV;
        }
        self.regs.main.set_f(f);
        12
    }

    fn op_out_c_r(&mut self, bus: &mut Bus, d: Decomposed) -> u32 {
        let port = self.regs.main.bc();
        let value = if d.y == 6 {
            0
        } else {
            self.read_reg_slot(IndexMode::Hl, d.y)
        };
        bus.out_port(port, value);
        12
    }

    /// `RETI`/`RETN` behave identically here: neither the core nor any
    /// external device this emulator models cares which one gets used to
    /// acknowledge an interrupt.
    fn op_retn_reti(&mut self, bus: &Bus) -> u32 {
        self.regs.pc = self.pop16(bus);
        self.regs.iff1 = self.regs.iff2;
        14
    }
}
