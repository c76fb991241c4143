use crate::fault::BusFault;

/// Execution-state machine observed at instruction boundaries.
///
/// `Halted` and `Faulted` are sticky; only a reset returns to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// Stopped by an explicit halt instruction.
    Halted,
    /// A bus fault is latched; no further progress without reset.
    Faulted(BusFault),
}

impl RunState {
    /// Returns `true` while the machine can retire instructions.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Returns the latched fault, if any.
    #[must_use]
    pub const fn latched_fault(self) -> Option<BusFault> {
        match self {
            Self::Faulted(fault) => Some(fault),
            Self::Running | Self::Halted => None,
        }
    }
}
