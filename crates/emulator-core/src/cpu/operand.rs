//! Effective-address resolution with hardware-exact bus sequences.
//!
//! Every helper performs the reads the silicon performs, in order, and
//! spends internal cycles where the silicon idles. The read path for
//! absolute-indexed modes drives the partially-carried address
//! `(base & 0xFF00) | ((base + index) & 0xFF)` on the data cycle, matching
//! the reference capture; the store path always drives the carried address.

use super::Cpu;
use crate::addressing::AddressingMode;
use crate::fault::BusFault;

/// Returns `true` when indexing steps past the base page.
pub(super) const fn page_crossed(base: u16, index: u8) -> bool {
    (base & 0x00FF) + index as u16 > 0x00FF
}

impl Cpu {
    /// Little-endian pointer fetch that wraps within the zero page.
    fn zp_pointer(&mut self, zp: u8) -> Result<u16, BusFault> {
        let lo = self.read(u16::from(zp))?;
        let hi = self.read(u16::from(zp.wrapping_add(1)))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Fetches the value operand of a read-class instruction.
    pub(super) fn read_operand(&mut self, mode: AddressingMode) -> Result<u8, BusFault> {
        if matches!(mode, AddressingMode::Immediate) {
            return self.fetch();
        }
        let addr = self.read_address(mode)?;
        self.read(addr)
    }

    /// Resolves the data address of a read-class instruction.
    fn read_address(&mut self, mode: AddressingMode) -> Result<u16, BusFault> {
        match mode {
            AddressingMode::ZeroPage => Ok(u16::from(self.fetch()?)),
            AddressingMode::ZeroPageX => {
                let zp = self.fetch()?;
                self.tick(1);
                Ok(u16::from(zp.wrapping_add(self.regs.x)))
            }
            AddressingMode::ZeroPageY => {
                let zp = self.fetch()?;
                self.tick(1);
                Ok(u16::from(zp.wrapping_add(self.regs.y)))
            }
            AddressingMode::Absolute => self.fetch16(),
            AddressingMode::AbsoluteX => {
                let index = self.regs.x;
                self.absolute_indexed_read_address(index)
            }
            AddressingMode::AbsoluteY => {
                let index = self.regs.y;
                self.absolute_indexed_read_address(index)
            }
            AddressingMode::IndexedIndirect => {
                let zp = self.fetch()?;
                self.tick(1);
                self.zp_pointer(zp.wrapping_add(self.regs.x))
            }
            AddressingMode::IndirectIndexed => {
                let zp = self.fetch()?;
                let pointer = self.zp_pointer(zp)?;
                if page_crossed(pointer, self.regs.y) {
                    self.tick(1);
                }
                Ok(pointer.wrapping_add(u16::from(self.regs.y)))
            }
            AddressingMode::ZeroPageIndirect => {
                let zp = self.fetch()?;
                self.zp_pointer(zp)
            }
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::Indirect
            | AddressingMode::AbsoluteIndirectX
            | AddressingMode::Relative => {
                unreachable!("decode table never pairs {mode:?} with a data operand")
            }
        }
    }

    /// Indexed absolute read: penalty cycle on page cross, data read at the
    /// partially-carried address.
    fn absolute_indexed_read_address(&mut self, index: u8) -> Result<u16, BusFault> {
        let base = self.fetch16()?;
        if page_crossed(base, index) {
            self.tick(1);
        }
        Ok((base & 0xFF00) | (base.wrapping_add(u16::from(index)) & 0x00FF))
    }

    /// Resolves the target address of a store instruction.
    pub(super) fn store_address(&mut self, mode: AddressingMode) -> Result<u16, BusFault> {
        match mode {
            AddressingMode::ZeroPage => Ok(u16::from(self.fetch()?)),
            AddressingMode::ZeroPageX => {
                let zp = self.fetch()?;
                self.tick(1);
                Ok(u16::from(zp.wrapping_add(self.regs.x)))
            }
            AddressingMode::ZeroPageY => {
                let zp = self.fetch()?;
                self.tick(1);
                Ok(u16::from(zp.wrapping_add(self.regs.y)))
            }
            AddressingMode::Absolute => self.fetch16(),
            AddressingMode::AbsoluteX => {
                let base = self.fetch16()?;
                self.tick(1);
                Ok(base.wrapping_add(u16::from(self.regs.x)))
            }
            AddressingMode::AbsoluteY => {
                let base = self.fetch16()?;
                self.tick(1);
                Ok(base.wrapping_add(u16::from(self.regs.y)))
            }
            AddressingMode::IndexedIndirect => {
                let zp = self.fetch()?;
                self.tick(1);
                self.zp_pointer(zp.wrapping_add(self.regs.x))
            }
            AddressingMode::IndirectIndexed => {
                let zp = self.fetch()?;
                let pointer = self.zp_pointer(zp)?;
                self.tick(1);
                Ok(pointer.wrapping_add(u16::from(self.regs.y)))
            }
            AddressingMode::ZeroPageIndirect => {
                let zp = self.fetch()?;
                self.zp_pointer(zp)
            }
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::Indirect
            | AddressingMode::AbsoluteIndirectX
            | AddressingMode::Relative => {
                unreachable!("decode table never pairs {mode:?} with a store")
            }
        }
    }

    /// Resolves the target of a memory read-modify-write.
    ///
    /// `fixed_index_penalty` distinguishes INC/DEC absolute,X (always one
    /// extra cycle) from the shifts (extra cycle only on page cross).
    pub(super) fn rmw_address(
        &mut self,
        mode: AddressingMode,
        fixed_index_penalty: bool,
    ) -> Result<u16, BusFault> {
        match mode {
            AddressingMode::ZeroPage => Ok(u16::from(self.fetch()?)),
            AddressingMode::ZeroPageX => {
                let zp = self.fetch()?;
                self.tick(1);
                Ok(u16::from(zp.wrapping_add(self.regs.x)))
            }
            AddressingMode::Absolute => self.fetch16(),
            AddressingMode::AbsoluteX => {
                let base = self.fetch16()?;
                if fixed_index_penalty || page_crossed(base, self.regs.x) {
                    self.tick(1);
                }
                Ok(base.wrapping_add(u16::from(self.regs.x)))
            }
            _ => unreachable!("decode table never pairs {mode:?} with a read-modify-write"),
        }
    }
}
