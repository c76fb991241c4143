//! Instruction semantics behind the dispatch table.

use super::{alu, Cpu};
use crate::addressing::AddressingMode;
use crate::fault::BusFault;
use crate::opcodes::{Mnemonic, Opcode};
use crate::state::{GpRegister, RunState, StatusFlags, IRQ_VECTOR};

impl Cpu {
    /// Executes one decoded instruction; the opcode byte is already fetched.
    pub(super) fn dispatch(&mut self, entry: &Opcode) -> Result<(), BusFault> {
        let mode = entry.mode;
        match entry.mnemonic {
            // Loads and stores.
            Mnemonic::Lda => self.load(mode, GpRegister::A),
            Mnemonic::Ldx => self.load(mode, GpRegister::X),
            Mnemonic::Ldy => self.load(mode, GpRegister::Y),
            Mnemonic::Sta => self.store(mode, self.regs.a),
            Mnemonic::Stx => self.store(mode, self.regs.x),
            Mnemonic::Sty => self.store(mode, self.regs.y),
            Mnemonic::Stz => self.store(mode, 0),

            // Register transfers.
            Mnemonic::Tax => self.transfer(GpRegister::X, self.regs.a),
            Mnemonic::Tay => self.transfer(GpRegister::Y, self.regs.a),
            Mnemonic::Txa => self.transfer(GpRegister::A, self.regs.x),
            Mnemonic::Tya => self.transfer(GpRegister::A, self.regs.y),
            Mnemonic::Tsx => self.transfer(GpRegister::X, self.regs.sp),
            Mnemonic::Txs => {
                self.tick(1);
                self.regs.sp = self.regs.x;
                Ok(())
            }

            // Stack operations.
            Mnemonic::Pha => self.push_value(self.regs.a),
            Mnemonic::Phx => self.push_value(self.regs.x),
            Mnemonic::Phy => self.push_value(self.regs.y),
            Mnemonic::Php => self.push_value(self.regs.ps.pushed_bits()),
            Mnemonic::Pla => self.pull_register(GpRegister::A),
            Mnemonic::Plx => self.pull_register(GpRegister::X),
            Mnemonic::Ply => self.pull_register(GpRegister::Y),
            Mnemonic::Plp => {
                self.tick(2);
                let pulled = self.pull()?;
                self.regs.ps = self.regs.ps.restored_from_pull(pulled);
                Ok(())
            }

            // Bitwise logic.
            Mnemonic::And => self.logical(mode, |a, m| a & m),
            Mnemonic::Ora => self.logical(mode, |a, m| a | m),
            Mnemonic::Eor => self.logical(mode, |a, m| a ^ m),
            Mnemonic::Bit => self.bit(mode),
            Mnemonic::Tsb => self.test_bits(mode, true),
            Mnemonic::Trb => self.test_bits(mode, false),

            // Arithmetic.
            Mnemonic::Adc => self.arithmetic(mode, alu::adc),
            Mnemonic::Sbc => self.arithmetic(mode, alu::sbc),
            Mnemonic::Cmp => self.compare(mode, self.regs.a),
            Mnemonic::Cpx => self.compare(mode, self.regs.x),
            Mnemonic::Cpy => self.compare(mode, self.regs.y),

            // Increments and decrements.
            Mnemonic::Inc => self.step_memory(mode, 1),
            Mnemonic::Dec => self.step_memory(mode, u8::MAX),
            Mnemonic::Inx => self.step_register(GpRegister::X, 1),
            Mnemonic::Iny => self.step_register(GpRegister::Y, 1),
            Mnemonic::Dex => self.step_register(GpRegister::X, u8::MAX),
            Mnemonic::Dey => self.step_register(GpRegister::Y, u8::MAX),

            // Shifts and rotates.
            Mnemonic::Asl => self.shift(mode, alu::asl),
            Mnemonic::Lsr => self.shift(mode, alu::lsr),
            Mnemonic::Rol => self.shift(mode, alu::rol),
            Mnemonic::Ror => self.shift(mode, alu::ror),

            // Jumps, calls, interrupts.
            Mnemonic::Jmp => self.jmp(mode),
            Mnemonic::Jsr => self.jsr(),
            Mnemonic::Rts => self.rts(),
            Mnemonic::Rti => self.rti(),
            Mnemonic::Brk => self.brk(),

            // Branches.
            Mnemonic::Bpl => self.branch(!self.regs.ps.negative()),
            Mnemonic::Bmi => self.branch(self.regs.ps.negative()),
            Mnemonic::Bvc => self.branch(!self.regs.ps.overflow()),
            Mnemonic::Bvs => self.branch(self.regs.ps.overflow()),
            Mnemonic::Bcc => self.branch(!self.regs.ps.carry()),
            Mnemonic::Bcs => self.branch(self.regs.ps.carry()),
            Mnemonic::Bne => self.branch(!self.regs.ps.zero()),
            Mnemonic::Beq => self.branch(self.regs.ps.zero()),
            Mnemonic::Bra => self.branch(true),

            // Status flag manipulation.
            Mnemonic::Clc => self.set_flag(StatusFlags::CARRY, false),
            Mnemonic::Sec => self.set_flag(StatusFlags::CARRY, true),
            Mnemonic::Cli => self.set_flag(StatusFlags::INTERRUPT_DISABLE, false),
            Mnemonic::Sei => self.set_flag(StatusFlags::INTERRUPT_DISABLE, true),
            Mnemonic::Cld => self.set_flag(StatusFlags::DECIMAL, false),
            Mnemonic::Sed => self.set_flag(StatusFlags::DECIMAL, true),
            Mnemonic::Clv => self.set_flag(StatusFlags::OVERFLOW, false),

            // No-ops and halts.
            Mnemonic::Nop => self.nop(entry),
            Mnemonic::Stp | Mnemonic::Wai => {
                self.tick(2);
                self.run_state = RunState::Halted;
                Ok(())
            }
        }
    }

    fn load(&mut self, mode: AddressingMode, register: GpRegister) -> Result<(), BusFault> {
        let value = self.read_operand(mode)?;
        self.regs.set_gp(register, value);
        self.regs.ps.update_nz(value);
        Ok(())
    }

    fn store(&mut self, mode: AddressingMode, value: u8) -> Result<(), BusFault> {
        let addr = self.store_address(mode)?;
        self.write(addr, value)
    }

    fn transfer(&mut self, dest: GpRegister, value: u8) -> Result<(), BusFault> {
        self.tick(1);
        self.regs.set_gp(dest, value);
        self.regs.ps.update_nz(value);
        Ok(())
    }

    fn push_value(&mut self, value: u8) -> Result<(), BusFault> {
        self.tick(1);
        self.push(value)
    }

    fn pull_register(&mut self, register: GpRegister) -> Result<(), BusFault> {
        self.tick(2);
        let value = self.pull()?;
        self.regs.set_gp(register, value);
        self.regs.ps.update_nz(value);
        Ok(())
    }

    fn logical(&mut self, mode: AddressingMode, f: fn(u8, u8) -> u8) -> Result<(), BusFault> {
        let value = self.read_operand(mode)?;
        let result = f(self.regs.a, value);
        self.regs.a = result;
        self.regs.ps.update_nz(result);
        Ok(())
    }

    fn bit(&mut self, mode: AddressingMode) -> Result<(), BusFault> {
        let immediate = matches!(mode, AddressingMode::Immediate);
        let value = self.read_operand(mode)?;
        self.regs.ps.set_zero(self.regs.a & value == 0);
        if !immediate {
            self.regs.ps.set_negative(value & 0x80 != 0);
            self.regs.ps.set_overflow(value & 0x40 != 0);
        }
        Ok(())
    }

    fn test_bits(&mut self, mode: AddressingMode, set: bool) -> Result<(), BusFault> {
        let addr = self.rmw_address(mode, false)?;
        let value = self.read(addr)?;
        self.tick(1);
        let result = if set {
            value | self.regs.a
        } else {
            value & !self.regs.a
        };
        self.write(addr, result)?;
        self.regs.ps.set_zero(self.regs.a & value == 0);
        Ok(())
    }

    fn arithmetic(
        &mut self,
        mode: AddressingMode,
        f: fn(&mut StatusFlags, u8, u8) -> u8,
    ) -> Result<(), BusFault> {
        let value = self.read_operand(mode)?;
        if self.regs.ps.decimal() {
            self.tick(1);
        }
        self.regs.a = f(&mut self.regs.ps, self.regs.a, value);
        Ok(())
    }

    fn compare(&mut self, mode: AddressingMode, register: u8) -> Result<(), BusFault> {
        let value = self.read_operand(mode)?;
        alu::compare(&mut self.regs.ps, register, value);
        Ok(())
    }

    fn step_register(&mut self, register: GpRegister, delta: u8) -> Result<(), BusFault> {
        self.tick(1);
        let value = self.regs.gp(register).wrapping_add(delta);
        self.regs.set_gp(register, value);
        self.regs.ps.update_nz(value);
        Ok(())
    }

    fn step_memory(&mut self, mode: AddressingMode, delta: u8) -> Result<(), BusFault> {
        if matches!(mode, AddressingMode::Accumulator) {
            return self.step_register(GpRegister::A, delta);
        }
        self.rmw(mode, true, move |ps, value| {
            let result = value.wrapping_add(delta);
            ps.update_nz(result);
            result
        })
    }

    fn shift(
        &mut self,
        mode: AddressingMode,
        f: fn(&mut StatusFlags, u8) -> u8,
    ) -> Result<(), BusFault> {
        if matches!(mode, AddressingMode::Accumulator) {
            self.tick(1);
            self.regs.a = f(&mut self.regs.ps, self.regs.a);
            return Ok(());
        }
        self.rmw(mode, false, f)
    }

    fn rmw(
        &mut self,
        mode: AddressingMode,
        fixed_index_penalty: bool,
        f: impl FnOnce(&mut StatusFlags, u8) -> u8,
    ) -> Result<(), BusFault> {
        let addr = self.rmw_address(mode, fixed_index_penalty)?;
        let value = self.read(addr)?;
        self.tick(1);
        let result = f(&mut self.regs.ps, value);
        self.write(addr, result)
    }

    fn jmp(&mut self, mode: AddressingMode) -> Result<(), BusFault> {
        match mode {
            AddressingMode::Absolute => {
                self.regs.pc = self.fetch16()?;
            }
            AddressingMode::Indirect => {
                let pointer = self.fetch16()?;
                self.tick(1);
                let lo = self.read(pointer)?;
                let hi = self.read(pointer.wrapping_add(1))?;
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            AddressingMode::AbsoluteIndirectX => {
                let pointer = self.fetch16()?.wrapping_add(u16::from(self.regs.x));
                self.tick(1);
                let lo = self.read(pointer)?;
                let hi = self.read(pointer.wrapping_add(1))?;
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            _ => unreachable!("decode table never pairs {mode:?} with JMP"),
        }
        Ok(())
    }

    fn jsr(&mut self) -> Result<(), BusFault> {
        let lo = self.fetch()?;
        self.tick(1);
        // PC now addresses the high operand byte; this is the return
        // address minus one that RTS re-increments.
        self.push((self.regs.pc >> 8) as u8)?;
        self.push((self.regs.pc & 0xFF) as u8)?;
        let hi = self.read(self.regs.pc)?;
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        Ok(())
    }

    fn rts(&mut self) -> Result<(), BusFault> {
        self.tick(1);
        let lo = self.pull()?;
        let hi = self.pull()?;
        self.tick(2);
        self.regs.pc = u16::from_le_bytes([lo, hi]).wrapping_add(1);
        Ok(())
    }

    fn rti(&mut self) -> Result<(), BusFault> {
        self.tick(1);
        let pulled = self.pull()?;
        self.regs.ps = self.regs.ps.restored_from_pull(pulled);
        let lo = self.pull()?;
        let hi = self.pull()?;
        self.tick(1);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        Ok(())
    }

    fn brk(&mut self) -> Result<(), BusFault> {
        // Signature byte after the opcode is fetched and discarded.
        let _ = self.fetch()?;
        self.push((self.regs.pc >> 8) as u8)?;
        self.push((self.regs.pc & 0xFF) as u8)?;
        self.push(self.regs.ps.pushed_bits())?;
        self.regs.ps.set_interrupt_disable(true);
        self.regs.ps.set_decimal(false);
        let lo = self.read(IRQ_VECTOR)?;
        let hi = self.read(IRQ_VECTOR.wrapping_add(1))?;
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        Ok(())
    }

    fn branch(&mut self, taken: bool) -> Result<(), BusFault> {
        let offset = self.fetch()? as i8;
        if taken {
            self.tick(1);
            let target = self.regs.pc.wrapping_add(i16::from(offset) as u16);
            if (target ^ self.regs.pc) & 0xFF00 != 0 {
                self.tick(1);
            }
            self.regs.pc = target;
        }
        Ok(())
    }

    fn set_flag(&mut self, mask: u8, value: bool) -> Result<(), BusFault> {
        self.tick(1);
        let mut ps = self.regs.ps.bits();
        if value {
            ps |= mask;
        } else {
            ps &= !mask;
        }
        self.regs.ps = StatusFlags::from_bits(ps);
        Ok(())
    }

    /// Every unassigned opcode is a NOP with a defined length and cost; the
    /// operand bytes are fetched and the remaining cycles are internal.
    fn nop(&mut self, entry: &Opcode) -> Result<(), BusFault> {
        for _ in 0..entry.mode.operand_len() {
            let _ = self.fetch()?;
        }
        let spent = 1 + u64::from(entry.mode.operand_len());
        self.tick(u64::from(entry.cycles).saturating_sub(spent));
        Ok(())
    }
}
