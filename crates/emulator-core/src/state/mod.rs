//! Architectural CPU state model primitives.

pub mod registers;
pub mod run_state;

pub use registers::{
    GpRegister, RegisterFile, StatusFlags, IRQ_VECTOR, NMI_VECTOR, RESET_SP, RESET_VECTOR,
    STACK_PAGE,
};
pub use run_state::RunState;
