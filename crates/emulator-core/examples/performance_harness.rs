//! Unpaced throughput probe: emulated cycles per wall-clock second.

use std::time::Instant;

use emu65_core::{AddressWindow, Bus, Clock, Cpu, RegionKind};

const BUDGET: u64 = 5_000_000;

fn main() {
    let ram = AddressWindow::new(RegionKind::Ram, 0x0000, 0xFFFF).expect("valid window");
    let bus = Bus::new(Some(ram), None, None).expect("single region");
    let mut cpu = Cpu::new(bus, Clock::new(0.0));
    cpu.reset(Some(0x0200)).expect("reset with override");

    // INX; DEX; BRA -4: a flag-churning loop that never leaves page two.
    for (addr, byte) in [(0x0200, 0xE8), (0x0201, 0xCA), (0x0202, 0x80), (0x0203, 0xFC)] {
        cpu.bus_mut()
            .poke(addr, byte)
            .expect("staged address is mapped");
    }

    let started = Instant::now();
    let outcome = cpu.execute(BUDGET).expect("loop stays mapped");
    let elapsed = started.elapsed();

    let cycles_per_second = outcome.cycles as f64 / elapsed.as_secs_f64();
    println!(
        "{} instructions, {} cycles in {:.3}s ({:.1} MHz equivalent)",
        outcome.retired,
        outcome.cycles,
        elapsed.as_secs_f64(),
        cycles_per_second / 1_000_000.0
    );
}
