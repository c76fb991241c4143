//! Bus-access trace records, their canonical text form, and sinks.

use std::cell::RefCell;
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

/// Direction of a traced bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessKind {
    /// CPU read from the bus.
    Read,
    /// CPU write to the bus.
    Write,
}

impl AccessKind {
    /// Single-letter tag used in the trace file.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::Read => 'R',
            Self::Write => 'W',
        }
    }
}

/// One bus access in program order.
///
/// The `Display` form is the trace-file line format compared byte-for-byte
/// against reference captures: `R FFFC A9 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TraceRecord {
    /// Read or write.
    pub kind: AccessKind,
    /// 16-bit bus address.
    pub addr: u16,
    /// Byte driven on the data lines.
    pub value: u8,
    /// Clock cycle on which the access completed (1-based per reset).
    pub cycle: u64,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:04X} {:02X} {}",
            self.kind.tag(),
            self.addr,
            self.value,
            self.cycle
        )
    }
}

/// Line-oriented single-writer sink for trace records.
///
/// Implementations must preserve arrival order. A returned error makes the
/// bus drop the sink and continue untraced; it never aborts emulation.
pub trait TraceSink {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Any I/O failure; the bus treats it as a request to stop tracing.
    fn record(&mut self, record: TraceRecord) -> io::Result<()>;
}

/// Buffered trace writer backed by a file on disk.
#[derive(Debug)]
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Creates (or truncates) the trace file at `path`.
    ///
    /// # Errors
    ///
    /// Any error from [`File::create`].
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }
}

impl TraceSink for FileSink {
    fn record(&mut self, record: TraceRecord) -> io::Result<()> {
        writeln!(self.writer, "{record}")
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// In-memory recorder used by tests in place of a file.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<TraceRecord>,
}

impl MemorySink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records captured so far, in arrival order.
    #[must_use]
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Renders the captured records exactly as a file sink would.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = String::new();
        for record in &self.records {
            text.push_str(&record.to_string());
            text.push('\n');
        }
        text
    }
}

impl TraceSink for MemorySink {
    fn record(&mut self, record: TraceRecord) -> io::Result<()> {
        self.records.push(record);
        Ok(())
    }
}

/// Clone-able handle to one shared in-memory recorder.
///
/// The emulator is single-threaded, so a plain `Rc<RefCell<_>>` is enough to
/// keep a handle on a sink after boxing it into the bus.
#[derive(Debug, Clone, Default)]
pub struct SharedSink {
    inner: Rc<RefCell<MemorySink>>,
}

impl SharedSink {
    /// Creates an empty shared recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out the records captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<TraceRecord> {
        self.inner.borrow().records().to_vec()
    }

    /// Renders the capture exactly as a file sink would.
    #[must_use]
    pub fn render(&self) -> String {
        self.inner.borrow().render()
    }
}

impl TraceSink for SharedSink {
    fn record(&mut self, record: TraceRecord) -> io::Result<()> {
        self.inner.borrow_mut().record(record)
    }
}
