//! The 256-entry opcode dispatch table.
//!
//! The table is the executable specification of the instruction set: one
//! entry per opcode byte carrying the mnemonic, addressing mode, encoded
//! length, and base cycle cost from the W65C02S datasheet. Dynamic costs
//! (page crossing, branches taken, decimal-mode arithmetic) are added by the
//! interpreter on top of the base cost.
//!
//! Opcode bytes the datasheet leaves unassigned execute as NOPs with their
//! defined lengths and cycle counts, so every byte value decodes.

use self::Mnemonic::*;
use crate::addressing::AddressingMode::{self, *};

/// Instruction mnemonics of the documented W65C02S set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Bra, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny,
    Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Phx, Phy, Pla, Plp,
    Plx, Ply, Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stp, Stx, Sty,
    Stz, Tax, Tay, Trb, Tsb, Tsx, Txa, Txs, Tya, Wai,
}

/// Static decode information for one opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// Operation the byte encodes.
    pub mnemonic: Mnemonic,
    /// Addressing mode the operand bytes are interpreted under.
    pub mode: AddressingMode,
    /// Encoded length including the opcode byte.
    pub bytes: u8,
    /// Base cycle cost before dynamic penalties.
    pub cycles: u8,
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, bytes: u8, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        bytes,
        cycles,
    }
}

/// Returns the table entry for an opcode byte.
#[must_use]
pub const fn lookup(opcode: u8) -> &'static Opcode {
    &OPCODE_TABLE[opcode as usize]
}

/// Complete decode table indexed by opcode byte.
pub const OPCODE_TABLE: [Opcode; 256] = [
    // 0x00 - 0x0F
    op(Brk, Implied, 1, 7),
    op(Ora, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Tsb, ZeroPage, 2, 5),
    op(Ora, ZeroPage, 2, 3),
    op(Asl, ZeroPage, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Php, Implied, 1, 3),
    op(Ora, Immediate, 2, 2),
    op(Asl, Accumulator, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Tsb, Absolute, 3, 6),
    op(Ora, Absolute, 3, 4),
    op(Asl, Absolute, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x10 - 0x1F
    op(Bpl, Relative, 2, 2),
    op(Ora, IndirectIndexed, 2, 5),
    op(Ora, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Trb, ZeroPage, 2, 5),
    op(Ora, ZeroPageX, 2, 4),
    op(Asl, ZeroPageX, 2, 6),
    op(Nop, Implied, 1, 1),
    op(Clc, Implied, 1, 2),
    op(Ora, AbsoluteY, 3, 4),
    op(Inc, Accumulator, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Trb, Absolute, 3, 6),
    op(Ora, AbsoluteX, 3, 4),
    op(Asl, AbsoluteX, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x20 - 0x2F
    op(Jsr, Absolute, 3, 6),
    op(And, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Bit, ZeroPage, 2, 3),
    op(And, ZeroPage, 2, 3),
    op(Rol, ZeroPage, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Plp, Implied, 1, 4),
    op(And, Immediate, 2, 2),
    op(Rol, Accumulator, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Bit, Absolute, 3, 4),
    op(And, Absolute, 3, 4),
    op(Rol, Absolute, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x30 - 0x3F
    op(Bmi, Relative, 2, 2),
    op(And, IndirectIndexed, 2, 5),
    op(And, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Bit, ZeroPageX, 2, 4),
    op(And, ZeroPageX, 2, 4),
    op(Rol, ZeroPageX, 2, 6),
    op(Nop, Implied, 1, 1),
    op(Sec, Implied, 1, 2),
    op(And, AbsoluteY, 3, 4),
    op(Dec, Accumulator, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Bit, AbsoluteX, 3, 4),
    op(And, AbsoluteX, 3, 4),
    op(Rol, AbsoluteX, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x40 - 0x4F
    op(Rti, Implied, 1, 6),
    op(Eor, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Nop, ZeroPage, 2, 3),
    op(Eor, ZeroPage, 2, 3),
    op(Lsr, ZeroPage, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Pha, Implied, 1, 3),
    op(Eor, Immediate, 2, 2),
    op(Lsr, Accumulator, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Jmp, Absolute, 3, 3),
    op(Eor, Absolute, 3, 4),
    op(Lsr, Absolute, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x50 - 0x5F
    op(Bvc, Relative, 2, 2),
    op(Eor, IndirectIndexed, 2, 5),
    op(Eor, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Nop, ZeroPageX, 2, 4),
    op(Eor, ZeroPageX, 2, 4),
    op(Lsr, ZeroPageX, 2, 6),
    op(Nop, Implied, 1, 1),
    op(Cli, Implied, 1, 2),
    op(Eor, AbsoluteY, 3, 4),
    op(Phy, Implied, 1, 3),
    op(Nop, Implied, 1, 1),
    op(Nop, Absolute, 3, 8),
    op(Eor, AbsoluteX, 3, 4),
    op(Lsr, AbsoluteX, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x60 - 0x6F
    op(Rts, Implied, 1, 6),
    op(Adc, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Stz, ZeroPage, 2, 3),
    op(Adc, ZeroPage, 2, 3),
    op(Ror, ZeroPage, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Pla, Implied, 1, 4),
    op(Adc, Immediate, 2, 2),
    op(Ror, Accumulator, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Jmp, Indirect, 3, 6),
    op(Adc, Absolute, 3, 4),
    op(Ror, Absolute, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x70 - 0x7F
    op(Bvs, Relative, 2, 2),
    op(Adc, IndirectIndexed, 2, 5),
    op(Adc, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Stz, ZeroPageX, 2, 4),
    op(Adc, ZeroPageX, 2, 4),
    op(Ror, ZeroPageX, 2, 6),
    op(Nop, Implied, 1, 1),
    op(Sei, Implied, 1, 2),
    op(Adc, AbsoluteY, 3, 4),
    op(Ply, Implied, 1, 4),
    op(Nop, Implied, 1, 1),
    op(Jmp, AbsoluteIndirectX, 3, 6),
    op(Adc, AbsoluteX, 3, 4),
    op(Ror, AbsoluteX, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0x80 - 0x8F
    op(Bra, Relative, 2, 2),
    op(Sta, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Sty, ZeroPage, 2, 3),
    op(Sta, ZeroPage, 2, 3),
    op(Stx, ZeroPage, 2, 3),
    op(Nop, Implied, 1, 1),
    op(Dey, Implied, 1, 2),
    op(Bit, Immediate, 2, 2),
    op(Txa, Implied, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Sty, Absolute, 3, 4),
    op(Sta, Absolute, 3, 4),
    op(Stx, Absolute, 3, 4),
    op(Nop, Implied, 1, 1),
    // 0x90 - 0x9F
    op(Bcc, Relative, 2, 2),
    op(Sta, IndirectIndexed, 2, 6),
    op(Sta, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Sty, ZeroPageX, 2, 4),
    op(Sta, ZeroPageX, 2, 4),
    op(Stx, ZeroPageY, 2, 4),
    op(Nop, Implied, 1, 1),
    op(Tya, Implied, 1, 2),
    op(Sta, AbsoluteY, 3, 5),
    op(Txs, Implied, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Stz, Absolute, 3, 4),
    op(Sta, AbsoluteX, 3, 5),
    op(Stz, AbsoluteX, 3, 5),
    op(Nop, Implied, 1, 1),
    // 0xA0 - 0xAF
    op(Ldy, Immediate, 2, 2),
    op(Lda, IndexedIndirect, 2, 6),
    op(Ldx, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Ldy, ZeroPage, 2, 3),
    op(Lda, ZeroPage, 2, 3),
    op(Ldx, ZeroPage, 2, 3),
    op(Nop, Implied, 1, 1),
    op(Tay, Implied, 1, 2),
    op(Lda, Immediate, 2, 2),
    op(Tax, Implied, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Ldy, Absolute, 3, 4),
    op(Lda, Absolute, 3, 4),
    op(Ldx, Absolute, 3, 4),
    op(Nop, Implied, 1, 1),
    // 0xB0 - 0xBF
    op(Bcs, Relative, 2, 2),
    op(Lda, IndirectIndexed, 2, 5),
    op(Lda, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Ldy, ZeroPageX, 2, 4),
    op(Lda, ZeroPageX, 2, 4),
    op(Ldx, ZeroPageY, 2, 4),
    op(Nop, Implied, 1, 1),
    op(Clv, Implied, 1, 2),
    op(Lda, AbsoluteY, 3, 4),
    op(Tsx, Implied, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Ldy, AbsoluteX, 3, 4),
    op(Lda, AbsoluteX, 3, 4),
    op(Ldx, AbsoluteY, 3, 4),
    op(Nop, Implied, 1, 1),
    // 0xC0 - 0xCF
    op(Cpy, Immediate, 2, 2),
    op(Cmp, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Cpy, ZeroPage, 2, 3),
    op(Cmp, ZeroPage, 2, 3),
    op(Dec, ZeroPage, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Iny, Implied, 1, 2),
    op(Cmp, Immediate, 2, 2),
    op(Dex, Implied, 1, 2),
    op(Wai, Implied, 1, 3),
    op(Cpy, Absolute, 3, 4),
    op(Cmp, Absolute, 3, 4),
    op(Dec, Absolute, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0xD0 - 0xDF
    op(Bne, Relative, 2, 2),
    op(Cmp, IndirectIndexed, 2, 5),
    op(Cmp, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Nop, ZeroPageX, 2, 4),
    op(Cmp, ZeroPageX, 2, 4),
    op(Dec, ZeroPageX, 2, 6),
    op(Nop, Implied, 1, 1),
    op(Cld, Implied, 1, 2),
    op(Cmp, AbsoluteY, 3, 4),
    op(Phx, Implied, 1, 3),
    op(Stp, Implied, 1, 3),
    op(Nop, Absolute, 3, 4),
    op(Cmp, AbsoluteX, 3, 4),
    op(Dec, AbsoluteX, 3, 7),
    op(Nop, Implied, 1, 1),
    // 0xE0 - 0xEF
    op(Cpx, Immediate, 2, 2),
    op(Sbc, IndexedIndirect, 2, 6),
    op(Nop, Immediate, 2, 2),
    op(Nop, Implied, 1, 1),
    op(Cpx, ZeroPage, 2, 3),
    op(Sbc, ZeroPage, 2, 3),
    op(Inc, ZeroPage, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Inx, Implied, 1, 2),
    op(Sbc, Immediate, 2, 2),
    op(Nop, Implied, 1, 2),
    op(Nop, Implied, 1, 1),
    op(Cpx, Absolute, 3, 4),
    op(Sbc, Absolute, 3, 4),
    op(Inc, Absolute, 3, 6),
    op(Nop, Implied, 1, 1),
    // 0xF0 - 0xFF
    op(Beq, Relative, 2, 2),
    op(Sbc, IndirectIndexed, 2, 5),
    op(Sbc, ZeroPageIndirect, 2, 5),
    op(Nop, Implied, 1, 1),
    op(Nop, ZeroPageX, 2, 4),
    op(Sbc, ZeroPageX, 2, 4),
    op(Inc, ZeroPageX, 2, 6),
    op(Nop, Implied, 1, 1),
    op(Sed, Implied, 1, 2),
    op(Sbc, AbsoluteY, 3, 4),
    op(Plx, Implied, 1, 4),
    op(Nop, Implied, 1, 1),
    op(Nop, Absolute, 3, 4),
    op(Sbc, AbsoluteX, 3, 4),
    op(Inc, AbsoluteX, 3, 7),
    op(Nop, Implied, 1, 1),
];

#[cfg(test)]
mod tests {
    use super::{lookup, Mnemonic, OPCODE_TABLE};
    use crate::addressing::AddressingMode;

    #[test]
    fn every_entry_length_matches_its_addressing_mode() {
        for (byte, entry) in OPCODE_TABLE.iter().enumerate() {
            assert_eq!(
                entry.bytes,
                1 + entry.mode.operand_len(),
                "length mismatch at opcode {byte:#04X}"
            );
        }
    }

    #[test]
    fn every_entry_has_a_plausible_cycle_cost() {
        for (byte, entry) in OPCODE_TABLE.iter().enumerate() {
            assert!(
                (1..=8).contains(&entry.cycles),
                "cycle cost out of range at opcode {byte:#04X}"
            );
        }
    }

    #[test]
    fn load_store_entries_match_the_datasheet() {
        let lda_im = lookup(0xA9);
        assert_eq!(lda_im.mnemonic, Mnemonic::Lda);
        assert_eq!(lda_im.mode, AddressingMode::Immediate);
        assert_eq!((lda_im.bytes, lda_im.cycles), (2, 2));

        let lda_abs = lookup(0xAD);
        assert_eq!((lda_abs.bytes, lda_abs.cycles), (3, 4));

        let sta_absx = lookup(0x9D);
        assert_eq!(sta_absx.mnemonic, Mnemonic::Sta);
        assert_eq!(sta_absx.mode, AddressingMode::AbsoluteX);
        assert_eq!((sta_absx.bytes, sta_absx.cycles), (3, 5));

        let stz_zp = lookup(0x64);
        assert_eq!(stz_zp.mnemonic, Mnemonic::Stz);
        assert_eq!((stz_zp.bytes, stz_zp.cycles), (2, 3));
    }

    #[test]
    fn control_flow_entries_match_the_datasheet() {
        assert_eq!(lookup(0x00).mnemonic, Mnemonic::Brk);
        assert_eq!(lookup(0x00).cycles, 7);
        assert_eq!(lookup(0x20).mnemonic, Mnemonic::Jsr);
        assert_eq!(lookup(0x20).cycles, 6);
        assert_eq!(lookup(0x4C).cycles, 3);
        assert_eq!(lookup(0x6C).mode, AddressingMode::Indirect);
        assert_eq!(lookup(0x6C).cycles, 6);
        assert_eq!(lookup(0x7C).mode, AddressingMode::AbsoluteIndirectX);
        assert_eq!(lookup(0x7C).cycles, 6);
        assert_eq!(lookup(0x80).mnemonic, Mnemonic::Bra);
    }

    #[test]
    fn cmos_additions_are_present() {
        assert_eq!(lookup(0x12).mnemonic, Mnemonic::Ora);
        assert_eq!(lookup(0x12).mode, AddressingMode::ZeroPageIndirect);
        assert_eq!(lookup(0x1A).mnemonic, Mnemonic::Inc);
        assert_eq!(lookup(0x1A).mode, AddressingMode::Accumulator);
        assert_eq!(lookup(0x3A).mnemonic, Mnemonic::Dec);
        assert_eq!(lookup(0x04).mnemonic, Mnemonic::Tsb);
        assert_eq!(lookup(0x14).mnemonic, Mnemonic::Trb);
        assert_eq!(lookup(0x89).mnemonic, Mnemonic::Bit);
        assert_eq!(lookup(0x89).mode, AddressingMode::Immediate);
        assert_eq!(lookup(0xDA).mnemonic, Mnemonic::Phx);
        assert_eq!(lookup(0x5A).mnemonic, Mnemonic::Phy);
        assert_eq!(lookup(0xFA).mnemonic, Mnemonic::Plx);
        assert_eq!(lookup(0x7A).mnemonic, Mnemonic::Ply);
        assert_eq!(lookup(0xCB).mnemonic, Mnemonic::Wai);
        assert_eq!(lookup(0xDB).mnemonic, Mnemonic::Stp);
    }

    #[test]
    fn unassigned_bytes_decode_as_sized_nops() {
        // One-byte one-cycle columns.
        for byte in [0x03_u8, 0x13, 0x33, 0x47, 0x8B, 0xBB, 0xF7, 0xFF] {
            let entry = lookup(byte);
            assert_eq!(entry.mnemonic, Mnemonic::Nop);
            assert_eq!((entry.bytes, entry.cycles), (1, 1));
        }
        // Two-byte immediates.
        for byte in [0x02_u8, 0x22, 0x42, 0x62, 0x82, 0xC2, 0xE2] {
            let entry = lookup(byte);
            assert_eq!(entry.mnemonic, Mnemonic::Nop);
            assert_eq!((entry.bytes, entry.cycles), (2, 2));
        }
        // Zero-page shapes.
        assert_eq!((lookup(0x44).bytes, lookup(0x44).cycles), (2, 3));
        for byte in [0x54_u8, 0xD4, 0xF4] {
            assert_eq!((lookup(byte).bytes, lookup(byte).cycles), (2, 4));
        }
        // Absolute shapes.
        assert_eq!((lookup(0x5C).bytes, lookup(0x5C).cycles), (3, 8));
        assert_eq!((lookup(0xDC).bytes, lookup(0xDC).cycles), (3, 4));
        assert_eq!((lookup(0xFC).bytes, lookup(0xFC).cycles), (3, 4));
    }

    #[test]
    fn the_canonical_nop_still_takes_two_cycles() {
        let nop = lookup(0xEA);
        assert_eq!(nop.mnemonic, Mnemonic::Nop);
        assert_eq!((nop.bytes, nop.cycles), (1, 2));
    }
}
