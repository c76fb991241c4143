//! The W65C02S processor core and its fetch/decode/execute loop.

mod alu;
mod exec;
mod operand;

use crate::bus::Bus;
use crate::fault::BusFault;
use crate::opcodes;
use crate::state::{RegisterFile, RunState, RESET_VECTOR, STACK_PAGE};
use crate::timing::Clock;

/// Aggregated result of a bounded [`Cpu::execute`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Instructions retired during this call.
    pub retired: u64,
    /// Total cycles elapsed since the last reset.
    pub cycles: u64,
    /// Run state after the call.
    pub state: RunState,
}

/// CPU core: register file, cycle clock, and the owned bus handle.
///
/// The interpreter is re-entrant at instruction boundaries: between steps all
/// state is consistent and the machine can be frozen and resumed.
#[derive(Debug)]
pub struct Cpu {
    pub(crate) regs: RegisterFile,
    clock: Clock,
    bus: Bus,
    run_state: RunState,
}

impl Cpu {
    /// Wires a core to its bus and clock.
    #[must_use]
    pub fn new(bus: Bus, clock: Clock) -> Self {
        Self {
            regs: RegisterFile::at_reset(),
            clock,
            bus,
            run_state: RunState::Running,
        }
    }

    /// Register file.
    #[must_use]
    pub const fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    /// Mutable register file, used by tests to stage machine state.
    pub const fn regs_mut(&mut self) -> &mut RegisterFile {
        &mut self.regs
    }

    /// Cycle clock.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Bus handle.
    #[must_use]
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable bus handle, used to stage memory and install trace sinks.
    pub const fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Applies power-on reset semantics.
    ///
    /// Registers are cleared, `SP` becomes `0xFD`, all flags except `I` are
    /// cleared, and the clock restarts at zero. `PC` comes from the override
    /// when given, otherwise from the reset vector at `0xFFFC/D` read with
    /// untraced, un-clocked peeks.
    ///
    /// # Errors
    ///
    /// Returns [`BusFault::UnmappedAddress`] when no override is given and
    /// the reset vector is unmapped.
    pub fn reset(&mut self, pc_override: Option<u16>) -> Result<(), BusFault> {
        self.regs = RegisterFile::at_reset();
        self.clock.reset();
        self.run_state = RunState::Running;
        self.regs.pc = match pc_override {
            Some(pc) => pc,
            None => {
                let lo = self.bus.peek(RESET_VECTOR)?;
                let hi = self.bus.peek(RESET_VECTOR.wrapping_add(1))?;
                u16::from_le_bytes([lo, hi])
            }
        };
        Ok(())
    }

    /// Executes one instruction.
    ///
    /// Does nothing when the machine is halted or faulted.
    ///
    /// # Errors
    ///
    /// A bus fault latches [`RunState::Faulted`] and is returned.
    pub fn step(&mut self) -> Result<(), BusFault> {
        if !self.run_state.is_running() {
            return Ok(());
        }
        let opcode = match self.fetch() {
            Ok(opcode) => opcode,
            Err(fault) => return Err(self.latch(fault)),
        };
        let entry = opcodes::lookup(opcode);
        match self.dispatch(entry) {
            Ok(()) => Ok(()),
            Err(fault) => Err(self.latch(fault)),
        }
    }

    /// Runs up to `instructions` instructions, stopping early on halt or
    /// fault, and pays the cosmetic wall-clock throttle per instruction.
    ///
    /// # Errors
    ///
    /// Propagates the first bus fault; the fault is also latched in the run
    /// state.
    pub fn execute(&mut self, instructions: u64) -> Result<RunOutcome, BusFault> {
        let mut retired = 0;
        while retired < instructions && self.run_state.is_running() {
            let before = self.clock.cycles();
            self.step()?;
            retired += 1;
            let spent = self.clock.cycles() - before;
            self.clock.throttle(spent);
        }
        Ok(RunOutcome {
            retired,
            cycles: self.clock.cycles(),
            state: self.run_state,
        })
    }

    fn latch(&mut self, fault: BusFault) -> BusFault {
        self.run_state = RunState::Faulted(fault);
        fault
    }

    /// Clocked, traced bus read.
    pub(crate) fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        self.bus.read(addr, &mut self.clock)
    }

    /// Clocked, traced bus write.
    pub(crate) fn write(&mut self, addr: u16, value: u8) -> Result<(), BusFault> {
        self.bus.write(addr, value, &mut self.clock)
    }

    /// Spends internal (non-bus) cycles.
    pub(crate) fn tick(&mut self, cycles: u64) {
        self.clock.advance(cycles);
    }

    /// Reads the byte at `PC` and advances `PC`.
    pub(crate) fn fetch(&mut self) -> Result<u8, BusFault> {
        let value = self.read(self.regs.pc)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    /// Fetches a little-endian word operand.
    pub(crate) fn fetch16(&mut self) -> Result<u16, BusFault> {
        let lo = self.fetch()?;
        let hi = self.fetch()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Pushes one byte: write at `0x0100 | SP`, then decrement `SP`.
    pub(crate) fn push(&mut self, value: u8) -> Result<(), BusFault> {
        self.write(STACK_PAGE | u16::from(self.regs.sp), value)?;
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        Ok(())
    }

    /// Pulls one byte: increment `SP`, then read at `0x0100 | SP`.
    pub(crate) fn pull(&mut self) -> Result<u8, BusFault> {
        self.regs.sp = self.regs.sp.wrapping_add(1);
        self.read(STACK_PAGE | u16::from(self.regs.sp))
    }
}
