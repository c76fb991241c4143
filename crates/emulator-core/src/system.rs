//! System façade: region layout, program loading, and bounded execution.

use std::path::Path;

use crate::bus::Bus;
use crate::cpu::{Cpu, RunOutcome};
use crate::fault::{ConfigError, LoadError, SystemError};
use crate::memory::{AddressWindow, RegionKind};
use crate::state::RESET_VECTOR;
use crate::timing::Clock;
use crate::trace::FileSink;

/// Construction parameters in the reference signed-bound form.
///
/// A negative value in either bound of a pair disables that region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemConfig {
    /// RAM window start, or a negative disable sentinel.
    pub ram_start: i64,
    /// RAM window end.
    pub ram_end: i64,
    /// I/O register window start.
    pub registers_start: i64,
    /// I/O register window end.
    pub registers_end: i64,
    /// ROM window start.
    pub rom_start: i64,
    /// ROM window end.
    pub rom_end: i64,
    /// Nominal clock rate for the cosmetic throttle; zero disables pacing.
    pub mhz: f64,
}

impl Default for SystemConfig {
    /// The reference breadboard layout: 16 KiB RAM, 8 KiB of registers,
    /// 32 KiB ROM, 1 MHz.
    fn default() -> Self {
        Self {
            ram_start: 0x0000,
            ram_end: 0x3FFF,
            registers_start: 0x6000,
            registers_end: 0x7FFF,
            rom_start: 0x8000,
            rom_end: 0xFFFF,
            mhz: 1.0,
        }
    }
}

/// One emulated machine: the CPU owning its bus and regions.
#[derive(Debug)]
pub struct System {
    cpu: Cpu,
}

impl System {
    /// Builds the machine from a validated region layout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for inverted, oversized, or overlapping
    /// windows.
    pub fn new(config: &SystemConfig) -> Result<Self, ConfigError> {
        let ram = AddressWindow::from_signed(RegionKind::Ram, config.ram_start, config.ram_end)?;
        let registers = AddressWindow::from_signed(
            RegionKind::Registers,
            config.registers_start,
            config.registers_end,
        )?;
        let rom = AddressWindow::from_signed(RegionKind::Rom, config.rom_start, config.rom_end)?;
        let bus = Bus::new(ram, registers, rom)?;
        Ok(Self {
            cpu: Cpu::new(bus, Clock::new(config.mhz)),
        })
    }

    /// Processor handle.
    #[must_use]
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable processor handle.
    pub const fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Loads an object file into ROM, resets through the ROM-resident reset
    /// vector, and runs up to `instructions` instructions.
    ///
    /// With `logging` enabled the trace goes to `out_file`; when the sink
    /// cannot be opened the run proceeds untraced, matching the reference
    /// behavior. The vector fetch itself bypasses the clocked bus path and
    /// never appears in the trace.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the image cannot be loaded and the first
    /// [`crate::BusFault`] when execution faults.
    pub fn execute_program(
        &mut self,
        program: &Path,
        instructions: u64,
        logging: bool,
        out_file: &Path,
    ) -> Result<RunOutcome, SystemError> {
        let vector = {
            let rom = self
                .cpu
                .bus_mut()
                .rom_mut()
                .ok_or(LoadError::RomDisabled)?;
            rom.load_program(program)?;
            let window = rom.window();
            let vector_hi = RESET_VECTOR.wrapping_add(1);
            for addr in [RESET_VECTOR, vector_hi] {
                if !window.contains(addr) {
                    return Err(LoadError::ResetVectorUnmapped { addr }.into());
                }
            }
            u16::from_le_bytes([rom.read(RESET_VECTOR)?, rom.read(vector_hi)?])
        };

        self.cpu.reset(Some(vector))?;

        if logging {
            match FileSink::create(out_file) {
                Ok(sink) => self.cpu.bus_mut().set_logging(Box::new(sink)),
                Err(_) => self.cpu.bus_mut().clear_logging(),
            }
        } else {
            self.cpu.bus_mut().clear_logging();
        }

        let result = self.cpu.execute(instructions);
        // Dropping the sink flushes file-backed traces.
        self.cpu.bus_mut().clear_logging();
        Ok(result?)
    }
}
