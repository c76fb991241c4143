//! Cycle-accurate WDC 65C02 system emulator core.
//!
//! The crate models a small breadboard machine: a W65C02S core on a 16-bit
//! bus routing accesses to RAM, a passive memory-mapped register file, and
//! ROM. Execution is deterministic and cycle-exact, including page-crossing
//! penalties and decimal-mode arithmetic, and every bus access can be logged
//! through a line-oriented trace sink for golden-file comparison.

/// The twelve addressing modes.
pub mod addressing;
pub use addressing::AddressingMode;

/// Address decoder over the mapped regions.
pub mod bus;
pub use bus::Bus;

/// CPU core and execute loop.
pub mod cpu;
pub use cpu::{Cpu, RunOutcome};

/// Fault and error taxonomy.
pub mod fault;
pub use fault::{BusFault, ConfigError, LoadError, SystemError};

/// Memory model primitives.
pub mod memory;
pub use memory::{AddressWindow, Region, RegionKind, ADDRESS_SPACE_BYTES, DISABLED_BOUND};

/// The 256-entry opcode dispatch table.
pub mod opcodes;
pub use opcodes::{lookup, Mnemonic, Opcode, OPCODE_TABLE};

/// Architectural CPU state model primitives.
pub mod state;
pub use state::{
    GpRegister, RegisterFile, RunState, StatusFlags, IRQ_VECTOR, NMI_VECTOR, RESET_SP,
    RESET_VECTOR, STACK_PAGE,
};

/// System façade and construction config.
pub mod system;
pub use system::{System, SystemConfig};

/// Bus-cycle clock and cosmetic throttle.
pub mod timing;
pub use timing::Clock;

/// Trace records, formatting, and sinks.
pub mod trace;
pub use trace::{AccessKind, FileSink, MemorySink, SharedSink, TraceRecord, TraceSink};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
