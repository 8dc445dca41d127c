use proc_bitfield::bitfield;

/// The three interrupt modes a Z80 can be placed into by `IM 0`/`IM 1`/`IM 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    Im0,
    Im1,
    Im2,
}

bitfield! {
    /// One 16-bit-addressable register quartet (AF, BC, DE, HL), packed into
    /// a single `u64` so that writing a pair and reading its halves (or vice
    /// versa) is automatically coherent — there is no separate storage to
    /// keep in sync. The same layout backs both the main and shadow sets.
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct WideRegisters(u64): Debug, FromRaw, IntoRaw, DerefRaw {
        /// The flag byte: S/Z/Y/H/X/P·V/N/C from bit 7 down to bit 0.
        pub f: u8 @ 0..=7,
        pub a: u8 @ 8..=15,
        pub af: u16 @ 0..=15,

        pub c: u8 @ 16..=23,
        pub b: u8 @ 24..=31,
        pub bc: u16 @ 16..=31,

        pub e: u8 @ 32..=39,
        pub d: u8 @ 40..=47,
        pub de: u16 @ 32..=47,

        pub l: u8 @ 48..=55,
        pub h: u8 @ 56..=63,
        pub hl: u16 @ 48..=63,
    }
}

impl WideRegisters {
    const fn initial() -> Self {
        // AF, BC, DE, HL all 0xFFFF after reset.
        Self(0xFFFF_FFFF_FFFF_FFFF)
    }
}

bitfield! {
    /// `IX` and `IY`, each independently exposing high/low 8-bit halves,
    /// packed the same way as [`WideRegisters`].
    #[derive(Clone, Copy, Eq, PartialEq)]
    pub struct IndexRegisters(u32): Debug, FromRaw, IntoRaw, DerefRaw {
        pub iyl: u8 @ 0..=7,
        pub iyh: u8 @ 8..=15,
        pub iy: u16 @ 0..=15,

        pub ixl: u8 @ 16..=23,
        pub ixh: u8 @ 24..=31,
        pub ix: u16 @ 16..=31,
    }
}

impl IndexRegisters {
    const fn initial() -> Self {
        Self(0xFFFF_FFFF)
    }
}

/// The complete architectural state of a Z80.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct Registers {
    pub main: WideRegisters,
    pub shadow: WideRegisters,
    pub index: IndexRegisters,

    pub pc: u16,
    pub sp: u16,

    pub i: u8,
    /// Memory refresh register. Bit 7 is software-writable and is never
    /// touched by M1-fetch increments; only the low 7 bits form the
    /// modulo-128 refresh counter.
    pub r: u8,

    pub iff1: bool,
    pub iff2: bool,
    pub im: InterruptMode,

    /// Set by `HALT`, cleared the moment an accepted interrupt resumes
    /// execution.
    pub halted: bool,
}

impl Registers {
    /// Power-on state: `PC = SP = 0`, `I = R = 0`, `IFF1 = IFF2 = 0`,
    /// `IM = 0`, `AF = BC = DE = HL = 0xFFFF`.
    pub fn power_on() -> Self {
        Self {
            main: WideRegisters::initial(),
            shadow: WideRegisters::initial(),
            index: IndexRegisters::initial(),
            pc: 0,
            sp: 0,
            i: 0,
            r: 0,
            iff1: false,
            iff2: false,
            im: InterruptMode::Im0,
            halted: false,
        }
    }

    /// Increment the low 7 bits of `R` by one, preserving bit 7. Called once
    /// per M1 (opcode fetch) cycle.
    pub fn bump_refresh(&mut self) {
        self.r = (self.r & 0x80) | (self.r.wrapping_add(1) & 0x7F);
    }

    pub fn ex_af(&mut self) {
        let af = self.main.af();
        self.main.set_af(self.shadow.af());
        self.shadow.set_af(af);
    }

    pub fn exx(&mut self) {
        let (bc, de, hl) = (self.main.bc(), self.main.de(), self.main.hl());
        self.main.set_bc(self.shadow.bc());
        self.main.set_de(self.shadow.de());
        self.main.set_hl(self.shadow.hl());
        self.shadow.set_bc(bc);
        self.shadow.set_de(de);
        self.shadow.set_hl(hl);
    }

    pub fn ex_de_hl(&mut self) {
        let de = self.main.de();
        self.main.set_de(self.main.hl());
        self.main.set_hl(de);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn af_aliasing_round_trips() {
        let mut regs = Registers::power_on();
        regs.main.set_af(0x1234);
        assert_eq!(regs.main.a(), 0x12);
        assert_eq!(regs.main.f(), 0x34);

        regs.main.set_a(0xAA);
        regs.main.set_f(0xBB);
        assert_eq!(regs.main.af(), 0xAABB);
    }

    #[test]
    fn ix_aliasing_round_trips() {
        let mut regs = Registers::power_on();
        regs.index.set_ix(0xBEEF);
        assert_eq!(regs.index.ixh(), 0xBE);
        assert_eq!(regs.index.ixl(), 0xEF);

        regs.index.set_ixh(0x01);
        regs.index.set_ixl(0x02);
        assert_eq!(regs.index.ix(), 0x0102);
    }

    #[test]
    fn exx_is_idempotent() {
        let mut regs = Registers::power_on();
        regs.main.set_bc(0x1111);
        regs.main.set_de(0x2222);
        regs.main.set_hl(0x3333);
        let before = regs;
        regs.exx();
        regs.exx();
        assert!(regs.main.bc() == before.main.bc() && regs.main.hl() == before.main.hl());
    }

    #[test]
    fn refresh_wraps_without_touching_bit_7() {
        let mut regs = Registers::power_on();
        regs.r = 0xFF;
        regs.bump_refresh();
        assert_eq!(regs.r, 0x80);
    }

    #[test]
    fn power_on_state_matches_spec() {
        let regs = Registers::power_on();
        assert_eq!(regs.pc, 0);
        assert_eq!(regs.sp, 0);
        assert_eq!(regs.i, 0);
        assert_eq!(regs.r, 0);
        assert!(!regs.iff1 && !regs.iff2);
        assert_eq!(regs.main.af(), 0xFFFF);
        assert_eq!(regs.main.bc(), 0xFFFF);
        assert_eq!(regs.main.de(), 0xFFFF);
        assert_eq!(regs.main.hl(), 0xFFFF);
    }
}
