//! Address windows and the region layout of the 16-bit bus.

use std::fmt;

use crate::fault::ConfigError;

/// Disable sentinel accepted in place of a window bound.
///
/// A configuration pair with this value in either slot leaves the region
/// unmapped, matching the reference system's construction contract.
pub const DISABLED_BOUND: i64 = -1;

/// Classification of the three bus-addressable devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RegionKind {
    /// General-purpose read/write storage.
    Ram,
    /// Passive memory-mapped I/O register file.
    Registers,
    /// Read-only program storage, writable only through the loader.
    Rom,
}

impl RegionKind {
    /// Stable lowercase name used in error messages and the runner CLI.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ram => "ram",
            Self::Registers => "registers",
            Self::Rom => "rom",
        }
    }
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive `[start, end]` window over the 16-bit address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AddressWindow {
    /// Inclusive start address.
    pub start: u16,
    /// Inclusive end address.
    pub end: u16,
}

impl AddressWindow {
    /// Builds a window, rejecting `start > end`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvertedWindow`] when the bounds are inverted.
    pub const fn new(kind: RegionKind, start: u16, end: u16) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::InvertedWindow { kind, start, end });
        }
        Ok(Self { start, end })
    }

    /// Interprets a signed bound pair from the construction API.
    ///
    /// A negative value in either slot disables the region (`Ok(None)`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBound`] for values above `0xFFFF` and
    /// [`ConfigError::InvertedWindow`] for `start > end`.
    pub const fn from_signed(
        kind: RegionKind,
        start: i64,
        end: i64,
    ) -> Result<Option<Self>, ConfigError> {
        if start < 0 || end < 0 {
            return Ok(None);
        }
        if start > 0xFFFF {
            return Err(ConfigError::InvalidBound { kind, value: start });
        }
        if end > 0xFFFF {
            return Err(ConfigError::InvalidBound { kind, value: end });
        }
        match Self::new(kind, start as u16, end as u16) {
            Ok(window) => Ok(Some(window)),
            Err(error) => Err(error),
        }
    }

    /// Returns `true` when `addr` lies inside the window.
    #[must_use]
    pub const fn contains(self, addr: u16) -> bool {
        addr >= self.start && addr <= self.end
    }

    /// Number of bytes the window covers.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end as usize - self.start as usize + 1
    }

    /// Windows always cover at least one byte.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Buffer offset of `addr` relative to the window start.
    ///
    /// Callers must check [`Self::contains`] first.
    #[must_use]
    pub const fn offset(self, addr: u16) -> usize {
        (addr - self.start) as usize
    }

    /// Returns `true` when the two windows share at least one address.
    #[must_use]
    pub const fn overlaps(self, other: Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Rejects layouts in which any two enabled windows overlap.
///
/// # Errors
///
/// Returns [`ConfigError::OverlappingRegions`] naming the first clashing pair.
pub fn ensure_disjoint(windows: &[(RegionKind, Option<AddressWindow>)]) -> Result<(), ConfigError> {
    for (index, (first_kind, first)) in windows.iter().enumerate() {
        let Some(first) = first else { continue };
        for (second_kind, second) in &windows[index + 1..] {
            let Some(second) = second else { continue };
            if first.overlaps(*second) {
                return Err(ConfigError::OverlappingRegions {
                    first: *first_kind,
                    second: *second_kind,
                });
            }
        }
    }
    Ok(())
}
