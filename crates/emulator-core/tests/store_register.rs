//! Store-instruction conformance: memory effect, flag neutrality, cycles.

mod common;

use common::{flat_cpu, stage};
use emu65_core::{Cpu, GpRegister, StatusFlags};
use proptest as _;
use rstest::rstest;
use tempfile as _;

fn step_and_check(cpu: &mut Cpu, bytes: u16, cycles: u64) {
    let pc_before = cpu.regs().pc;
    cpu.step().expect("staged program is mapped");
    assert_eq!(cpu.regs().pc.wrapping_sub(pc_before), bytes, "byte advance");
    assert_eq!(cpu.clock().cycles(), cycles, "cycle count");
}

/// Stores never touch PS.
fn assert_flags_unchanged(cpu: &Cpu, before: StatusFlags) {
    assert_eq!(cpu.regs().ps, before);
}

#[rstest]
#[case(0x85, GpRegister::A)]
#[case(0x86, GpRegister::X)]
#[case(0x84, GpRegister::Y)]
fn zero_page_store(#[case] opcode: u8, #[case] register: GpRegister) {
    let mut cpu = flat_cpu();
    cpu.regs_mut().set_gp(register, 0x80);
    stage(&mut cpu, 0xFFFC, &[opcode, 0x42]);
    let ps = cpu.regs().ps;

    step_and_check(&mut cpu, 2, 3);
    assert_eq!(cpu.bus().peek(0x0042), Ok(0x80));
    assert_flags_unchanged(&cpu, ps);
}

#[rstest]
#[case(0x8D, GpRegister::A)]
#[case(0x8E, GpRegister::X)]
#[case(0x8C, GpRegister::Y)]
fn absolute_store(#[case] opcode: u8, #[case] register: GpRegister) {
    let mut cpu = flat_cpu();
    cpu.regs_mut().set_gp(register, 0x00);
    stage(&mut cpu, 0xFFFC, &[opcode, 0x00, 0x90]);
    stage(&mut cpu, 0x9000, &[0xFF]);
    let ps = cpu.regs().ps;

    step_and_check(&mut cpu, 3, 4);
    assert_eq!(cpu.bus().peek(0x9000), Ok(0x00));
    assert_flags_unchanged(&cpu, ps);
}

#[rstest]
#[case(0x95, GpRegister::A, 0x05_u8)]
#[case(0x94, GpRegister::Y, 0xFF_u8)]
fn zero_page_x_store_wraps_in_page_zero(
    #[case] opcode: u8,
    #[case] register: GpRegister,
    #[case] x: u8,
) {
    let mut cpu = flat_cpu();
    cpu.regs_mut().x = x;
    cpu.regs_mut().set_gp(register, 0x5A);
    stage(&mut cpu, 0xFFFC, &[opcode, 0x42]);

    step_and_check(&mut cpu, 2, 4);
    assert_eq!(cpu.bus().peek(u16::from(0x42_u8.wrapping_add(x))), Ok(0x5A));
}

#[test]
fn stx_zero_page_y_wraps_in_page_zero() {
    let mut cpu = flat_cpu();
    cpu.regs_mut().y = 0xFF;
    cpu.regs_mut().x = 0xA5;
    stage(&mut cpu, 0xFFFC, &[0x96, 0x80]);

    step_and_check(&mut cpu, 2, 4);
    assert_eq!(cpu.bus().peek(0x007F), Ok(0xA5));
}

#[rstest]
#[case(0x00_u8)] // same page
#[case(0xFF_u8)] // crossing
fn absolute_x_store_always_pays_the_index_cycle(#[case] x: u8) {
    let mut cpu = flat_cpu();
    cpu.regs_mut().x = x;
    cpu.regs_mut().a = 0x21;
    stage(&mut cpu, 0xFFFC, &[0x9D, 0x80, 0x44]); // STA 0x4480,X

    step_and_check(&mut cpu, 3, 5);
    // Stores drive the fully carried address.
    assert_eq!(cpu.bus().peek(0x4480_u16.wrapping_add(u16::from(x))), Ok(0x21));
}

#[test]
fn absolute_y_store_always_pays_the_index_cycle() {
    let mut cpu = flat_cpu();
    cpu.regs_mut().y = 0xFF;
    cpu.regs_mut().a = 0x34;
    stage(&mut cpu, 0xFFFC, &[0x99, 0x80, 0x44]); // STA 0x4480,Y

    step_and_check(&mut cpu, 3, 5);
    assert_eq!(cpu.bus().peek(0x457F), Ok(0x34));
}

#[test]
fn indexed_indirect_store_takes_six_cycles() {
    let mut cpu = flat_cpu();
    cpu.regs_mut().x = 0x04;
    cpu.regs_mut().a = 0x11;
    stage(&mut cpu, 0xFFFC, &[0x81, 0x20]); // STA (0x20,X)
    stage(&mut cpu, 0x0024, &[0x74, 0x20]);

    step_and_check(&mut cpu, 2, 6);
    assert_eq!(cpu.bus().peek(0x2074), Ok(0x11));
}

#[test]
fn indirect_indexed_store_takes_six_cycles_without_crossing() {
    let mut cpu = flat_cpu();
    cpu.regs_mut().y = 0x04;
    cpu.regs_mut().a = 0x22;
    stage(&mut cpu, 0xFFFC, &[0x91, 0x80]); // STA (0x80),Y
    stage(&mut cpu, 0x0080, &[0x00, 0x90]);

    step_and_check(&mut cpu, 2, 6);
    assert_eq!(cpu.bus().peek(0x9004), Ok(0x22));
}

#[test]
fn zero_page_indirect_store_takes_five_cycles() {
    let mut cpu = flat_cpu();
    cpu.regs_mut().a = 0x33;
    stage(&mut cpu, 0xFFFC, &[0x92, 0x80]); // STA (0x80)
    stage(&mut cpu, 0x0080, &[0x00, 0x90]);

    step_and_check(&mut cpu, 2, 5);
    assert_eq!(cpu.bus().peek(0x9000), Ok(0x33));
}

#[rstest]
#[case(&[0x64_u8, 0x42], 0x0042_u16, 2, 3)] // STZ zp
#[case(&[0x74, 0x42], 0x0047, 2, 4)] // STZ zp,X with X=5
#[case(&[0x9C, 0x00, 0x90], 0x9000, 3, 4)] // STZ abs
#[case(&[0x9E, 0x00, 0x90], 0x9005, 3, 5)] // STZ abs,X
fn stz_clears_the_target(
    #[case] program: &[u8],
    #[case] target: u16,
    #[case] bytes: u16,
    #[case] cycles: u64,
) {
    let mut cpu = flat_cpu();
    cpu.regs_mut().x = 0x05;
    stage(&mut cpu, 0xFFFC, program);
    stage(&mut cpu, target, &[0xFF]);
    let ps = cpu.regs().ps;

    step_and_check(&mut cpu, bytes, cycles);
    assert_eq!(cpu.bus().peek(target), Ok(0x00));
    assert_flags_unchanged(&cpu, ps);
}
