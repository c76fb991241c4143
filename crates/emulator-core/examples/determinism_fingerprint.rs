//! Deterministic replay fingerprint generator used for cross-host comparison.

use emu65_core::{AddressWindow, Bus, Clock, Cpu, RegionKind, SharedSink};

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let ram = AddressWindow::new(RegionKind::Ram, 0x0000, 0xFFFF).expect("valid window");
    let bus = Bus::new(Some(ram), None, None).expect("single region");
    let mut cpu = Cpu::new(bus, Clock::new(0.0));
    cpu.reset(Some(0x0200)).expect("reset with override");

    // CLC; LDA #0x29; ADC #0x13; PHA; SED; ADC #0x27; PLA; STP
    let program = [
        0x18, 0xA9, 0x29, 0x69, 0x13, 0x48, 0xF8, 0x69, 0x27, 0x68, 0xDB,
    ];
    for (offset, byte) in program.iter().enumerate() {
        let addr = 0x0200 + u16::try_from(offset).expect("short program");
        cpu.bus_mut()
            .poke(addr, *byte)
            .expect("staged address is mapped");
    }

    let capture = SharedSink::new();
    cpu.bus_mut().set_logging(Box::new(capture.clone()));
    let outcome = cpu.execute(64).expect("staged program is mapped");

    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &outcome.retired.to_le_bytes());
    hash_bytes(&mut hash, &outcome.cycles.to_le_bytes());
    let regs = cpu.regs();
    hash_bytes(&mut hash, &[regs.a, regs.x, regs.y, regs.sp, regs.ps.bits()]);
    hash_bytes(&mut hash, &regs.pc.to_le_bytes());
    hash_bytes(&mut hash, capture.render().as_bytes());

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
