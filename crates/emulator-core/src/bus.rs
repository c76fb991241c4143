//! Address decoder routing CPU accesses to the three mapped regions.

use std::fmt;

use crate::fault::{BusFault, ConfigError};
use crate::memory::{ensure_disjoint, AddressWindow, Region, RegionKind};
use crate::timing::Clock;
use crate::trace::{AccessKind, TraceRecord, TraceSink};

/// The memory bus: one optional RAM, register, and ROM region plus an
/// optional trace sink.
///
/// Every clocked access advances the CPU clock by one cycle and, when a sink
/// is installed, appends one [`TraceRecord`] in strict program order. Sink
/// failures drop the sink; emulation continues untraced.
pub struct Bus {
    ram: Option<Region>,
    registers: Option<Region>,
    rom: Option<Region>,
    sink: Option<Box<dyn TraceSink>>,
}

impl Bus {
    /// Builds a bus over the given region windows.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OverlappingRegions`] when enabled windows share
    /// an address.
    pub fn new(
        ram: Option<AddressWindow>,
        registers: Option<AddressWindow>,
        rom: Option<AddressWindow>,
    ) -> Result<Self, ConfigError> {
        ensure_disjoint(&[
            (RegionKind::Ram, ram),
            (RegionKind::Registers, registers),
            (RegionKind::Rom, rom),
        ])?;
        Ok(Self {
            ram: ram.map(|window| Region::new(RegionKind::Ram, window)),
            registers: registers.map(|window| Region::new(RegionKind::Registers, window)),
            rom: rom.map(|window| Region::new(RegionKind::Rom, window)),
            sink: None,
        })
    }

    /// Installs a trace sink; subsequent accesses are recorded through it.
    pub fn set_logging(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    /// Removes the trace sink, flushing file-backed sinks on drop.
    pub fn clear_logging(&mut self) {
        self.sink = None;
    }

    /// Returns `true` while a trace sink is installed.
    #[must_use]
    pub const fn is_logging(&self) -> bool {
        self.sink.is_some()
    }

    /// Clocked read: one cycle, one trace record.
    ///
    /// # Errors
    ///
    /// Returns [`BusFault::UnmappedAddress`] when no enabled region covers
    /// `addr`.
    pub fn read(&mut self, addr: u16, clock: &mut Clock) -> Result<u8, BusFault> {
        let value = self
            .region(addr)
            .ok_or(BusFault::UnmappedAddress { addr })?
            .read(addr)?;
        let cycle = clock.advance(1);
        self.emit(AccessKind::Read, addr, value, cycle);
        Ok(value)
    }

    /// Clocked write: one cycle, one trace record.
    ///
    /// # Errors
    ///
    /// Returns [`BusFault::UnmappedAddress`] for uncovered addresses and
    /// [`BusFault::WriteToReadOnly`] for program-path ROM writes.
    pub fn write(&mut self, addr: u16, value: u8, clock: &mut Clock) -> Result<(), BusFault> {
        self.region_mut(addr)
            .ok_or(BusFault::UnmappedAddress { addr })?
            .write(addr, value)?;
        let cycle = clock.advance(1);
        self.emit(AccessKind::Write, addr, value, cycle);
        Ok(())
    }

    /// Side-effect-free read: no cycle, no trace record.
    ///
    /// Used by the reset-vector fetch and by tests inspecting memory.
    ///
    /// # Errors
    ///
    /// Returns [`BusFault::UnmappedAddress`] when no enabled region covers
    /// `addr`.
    pub fn peek(&self, addr: u16) -> Result<u8, BusFault> {
        self.region(addr)
            .ok_or(BusFault::UnmappedAddress { addr })?
            .read(addr)
    }

    /// Side-effect-free store that also reaches ROM (the loader/test path).
    ///
    /// # Errors
    ///
    /// Returns [`BusFault::UnmappedAddress`] when no enabled region covers
    /// `addr`.
    pub fn poke(&mut self, addr: u16, value: u8) -> Result<(), BusFault> {
        self.region_mut(addr)
            .ok_or(BusFault::UnmappedAddress { addr })?
            .poke(addr, value)
    }

    /// ROM region handle for the program loader.
    #[must_use]
    pub fn rom_mut(&mut self) -> Option<&mut Region> {
        self.rom.as_mut()
    }

    /// ROM region handle.
    #[must_use]
    pub fn rom(&self) -> Option<&Region> {
        self.rom.as_ref()
    }

    fn region(&self, addr: u16) -> Option<&Region> {
        [&self.ram, &self.registers, &self.rom]
            .into_iter()
            .flatten()
            .find(|region| region.contains(addr))
    }

    fn region_mut(&mut self, addr: u16) -> Option<&mut Region> {
        [&mut self.ram, &mut self.registers, &mut self.rom]
            .into_iter()
            .flatten()
            .find(|region| region.contains(addr))
    }

    fn emit(&mut self, kind: AccessKind, addr: u16, value: u8, cycle: u64) {
        if let Some(sink) = self.sink.as_mut() {
            let record = TraceRecord {
                kind,
                addr,
                value,
                cycle,
            };
            if sink.record(record).is_err() {
                self.sink = None;
            }
        }
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("ram", &self.ram.as_ref().map(Region::window))
            .field("registers", &self.registers.as_ref().map(Region::window))
            .field("rom", &self.rom.as_ref().map(Region::window))
            .field("logging", &self.is_logging())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::Bus;
    use crate::fault::{BusFault, ConfigError};
    use crate::memory::{AddressWindow, RegionKind};
    use crate::timing::Clock;
    use crate::trace::{SharedSink, TraceRecord, TraceSink};

    fn window(kind: RegionKind, start: u16, end: u16) -> Option<AddressWindow> {
        Some(AddressWindow::new(kind, start, end).expect("valid window"))
    }

    fn reference_bus() -> Bus {
        Bus::new(
            window(RegionKind::Ram, 0x0000, 0x3FFF),
            window(RegionKind::Registers, 0x6000, 0x7FFF),
            window(RegionKind::Rom, 0x8000, 0xFFFF),
        )
        .expect("disjoint layout")
    }

    #[test]
    fn overlapping_layout_is_rejected_at_construction() {
        let error = Bus::new(
            window(RegionKind::Ram, 0x0000, 0x8FFF),
            None,
            window(RegionKind::Rom, 0x8000, 0xFFFF),
        )
        .expect_err("overlap must be rejected");
        assert_eq!(
            error,
            ConfigError::OverlappingRegions {
                first: RegionKind::Ram,
                second: RegionKind::Rom,
            }
        );
    }

    #[test]
    fn each_access_advances_the_clock_by_one() {
        let mut bus = reference_bus();
        let mut clock = Clock::new(0.0);

        bus.write(0x0010, 0xAB, &mut clock).expect("ram write");
        assert_eq!(clock.cycles(), 1);
        assert_eq!(bus.read(0x0010, &mut clock), Ok(0xAB));
        assert_eq!(clock.cycles(), 2);
    }

    #[test]
    fn unmapped_hole_faults_without_advancing_the_clock() {
        let mut bus = reference_bus();
        let mut clock = Clock::new(0.0);

        assert_eq!(
            bus.read(0x5000, &mut clock),
            Err(BusFault::UnmappedAddress { addr: 0x5000 })
        );
        assert_eq!(
            bus.write(0x5000, 0x01, &mut clock),
            Err(BusFault::UnmappedAddress { addr: 0x5000 })
        );
        assert_eq!(clock.cycles(), 0);
    }

    #[test]
    fn program_path_rom_write_faults_but_poke_lands() {
        let mut bus = reference_bus();
        let mut clock = Clock::new(0.0);

        assert_eq!(
            bus.write(0x8000, 0x12, &mut clock),
            Err(BusFault::WriteToReadOnly { addr: 0x8000 })
        );
        bus.poke(0x8000, 0x12).expect("loader path");
        assert_eq!(bus.read(0x8000, &mut clock), Ok(0x12));
    }

    #[test]
    fn registers_region_behaves_as_plain_storage() {
        let mut bus = reference_bus();
        let mut clock = Clock::new(0.0);

        bus.write(0x6000, 0x5A, &mut clock).expect("register write");
        assert_eq!(bus.read(0x6000, &mut clock), Ok(0x5A));
    }

    #[test]
    fn trace_records_carry_kind_address_value_and_cycle() {
        let mut bus = reference_bus();
        let mut clock = Clock::new(0.0);
        let capture = SharedSink::new();
        bus.set_logging(Box::new(capture.clone()));

        bus.write(0x0002, 0x7F, &mut clock).expect("ram write");
        bus.read(0x0002, &mut clock).expect("ram read");
        bus.peek(0x0002).expect("peek is untraced");

        assert_eq!(capture.render(), "W 0002 7F 1\nR 0002 7F 2\n");
    }

    #[test]
    fn failing_sink_disables_tracing_without_stopping_the_bus() {
        struct BrokenSink;
        impl TraceSink for BrokenSink {
            fn record(&mut self, _record: TraceRecord) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink gone"))
            }
        }

        let mut bus = reference_bus();
        let mut clock = Clock::new(0.0);
        bus.set_logging(Box::new(BrokenSink));
        assert!(bus.is_logging());

        bus.write(0x0000, 0x11, &mut clock).expect("write survives");
        assert!(!bus.is_logging());
        assert_eq!(bus.read(0x0000, &mut clock), Ok(0x11));
    }
}
