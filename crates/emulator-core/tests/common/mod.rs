//! Shared bench helpers for the instruction-level suites.

#![allow(dead_code)]

use emu65_core::{AddressWindow, Bus, Clock, Cpu, RegionKind, StatusFlags};

/// CPU over one RAM region spanning the whole address space, reset with the
/// program counter parked on the reset vector the way the reference bench
/// stages single instructions.
pub fn flat_cpu() -> Cpu {
    let ram = AddressWindow::new(RegionKind::Ram, 0x0000, 0xFFFF).expect("valid window");
    let bus = Bus::new(Some(ram), None, None).expect("single region");
    let mut cpu = Cpu::new(bus, Clock::new(0.0));
    cpu.reset(Some(0xFFFC)).expect("reset with override");
    cpu
}

/// Writes bytes through the untraced staging path.
pub fn stage(cpu: &mut Cpu, addr: u16, bytes: &[u8]) {
    for (offset, byte) in bytes.iter().enumerate() {
        let addr = addr.wrapping_add(u16::try_from(offset).expect("short staging run"));
        cpu.bus_mut().poke(addr, *byte).expect("staged address is mapped");
    }
}

/// Presets Z and N to the complement of what the loaded value implies, so a
/// passing test proves the instruction rewrote them.
pub fn invert_nz(cpu: &mut Cpu, value: u8) {
    cpu.regs_mut().ps.set_zero(value != 0);
    cpu.regs_mut().ps.set_negative(value & 0x80 == 0);
}

/// Bits of PS that a load or logical instruction must leave untouched.
pub fn untouched_bits(ps: StatusFlags) -> u8 {
    ps.bits()
        & (StatusFlags::CARRY
            | StatusFlags::INTERRUPT_DISABLE
            | StatusFlags::DECIMAL
            | StatusFlags::BREAK
            | StatusFlags::OVERFLOW)
}
