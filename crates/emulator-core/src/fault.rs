use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::memory::RegionKind;

/// Faults raised by bus accesses while a program is executing.
///
/// A fault latches the CPU in [`crate::RunState::Faulted`]; only a reset
/// returns the machine to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusFault {
    /// Access to an address covered by no enabled region.
    #[error("access to unmapped address {addr:#06X}")]
    UnmappedAddress {
        /// Offending 16-bit address.
        addr: u16,
    },
    /// Program-path write into the read-only ROM region.
    #[error("write to read-only address {addr:#06X}")]
    WriteToReadOnly {
        /// Offending 16-bit address.
        addr: u16,
    },
    /// Address handed to a region outside its window.
    #[error("address {addr:#06X} is outside the region window")]
    OutOfRange {
        /// Offending 16-bit address.
        addr: u16,
    },
}

impl BusFault {
    /// Returns the address the faulting access targeted.
    #[must_use]
    pub const fn addr(self) -> u16 {
        match self {
            Self::UnmappedAddress { addr }
            | Self::WriteToReadOnly { addr }
            | Self::OutOfRange { addr } => addr,
        }
    }
}

/// Construction-time rejection of an invalid memory layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A region window with `start > end`.
    #[error("{kind} window is inverted: start {start:#06X} > end {end:#06X}")]
    InvertedWindow {
        /// Region the window was given for.
        kind: RegionKind,
        /// Inclusive start bound.
        start: u16,
        /// Inclusive end bound.
        end: u16,
    },
    /// Two enabled regions share at least one address.
    #[error("{first} and {second} windows overlap")]
    OverlappingRegions {
        /// First region of the clashing pair.
        first: RegionKind,
        /// Second region of the clashing pair.
        second: RegionKind,
    },
    /// A bound that is neither a 16-bit address nor the disable sentinel.
    #[error("{kind} bound {value} does not fit the 16-bit address space")]
    InvalidBound {
        /// Region the bound was given for.
        kind: RegionKind,
        /// Rejected raw bound value.
        value: i64,
    },
}

/// Failure to load a program object file into ROM.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The object file could not be read.
    #[error("cannot read program image {path}: {source}")]
    Io {
        /// Path the loader tried to open.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The object file is larger than the ROM window.
    #[error("program image is {image} bytes but the rom window holds {capacity}")]
    ImageTooLarge {
        /// Image size in bytes.
        image: usize,
        /// ROM window capacity in bytes.
        capacity: usize,
    },
    /// The system was built without a ROM region.
    #[error("no rom region is mapped")]
    RomDisabled,
    /// The ROM window does not cover the reset vector.
    #[error("reset vector byte {addr:#06X} is outside the rom window")]
    ResetVectorUnmapped {
        /// Vector byte address the loader could not read.
        addr: u16,
    },
}

/// Top-level error surface for the system façade and the runner binary.
#[derive(Debug, Error)]
pub enum SystemError {
    /// Invalid region layout at construction.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Program image could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The CPU faulted on the bus while executing.
    #[error(transparent)]
    Bus(#[from] BusFault),
}
