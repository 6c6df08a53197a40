//! Tracing setup for the `calc` binary.
//!
//! Events go to stderr so stdout carries only command output. A second layer
//! appends to a log file once [`enable_file_logging`] names one; until then
//! it discards everything. One global filter governs both layers.

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, reload};

/// Filter used when neither `RUST_LOG`, the config file nor `--log-level`
/// say otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// `2024-05-01 14:03:22.117 WARN  calc_core::session: message key=value`,
/// in local time.
struct LocalFmt;

impl LocalFmt {
    fn paint(
        writer: &mut Writer<'_>,
        color: &str,
        text: impl std::fmt::Display,
    ) -> std::fmt::Result {
        if writer.has_ansi_escapes() {
            write!(writer, "{color}{text}{RESET}")
        } else {
            write!(writer, "{text}")
        }
    }
}

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        Self::paint(&mut writer, DIM, stamp)?;
        write!(writer, " ")?;
        Self::paint(
            &mut writer,
            level_color(meta.level()),
            format_args!("{:<5}", meta.level()),
        )?;
        write!(writer, " ")?;
        Self::paint(&mut writer, CYAN, format_args!("{}:", meta.target()))?;
        write!(writer, " ")?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// File layer

type SharedFile = Arc<Mutex<Option<BufWriter<File>>>>;

/// Writer factory for the file layer. Empty until a path is configured.
#[derive(Clone)]
struct FileSlot(SharedFile);

impl FileSlot {
    fn lock(&self) -> MutexGuard<'_, Option<BufWriter<File>>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct SlotWriter<'a>(MutexGuard<'a, Option<BufWriter<File>>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match self.0.as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl Drop for SlotWriter<'_> {
    // One writer is made per event; flushing here keeps whole lines on disk.
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(self.lock())
    }
}

// Global state, set once by `init_logging`

static LEVEL: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();
static LOG_FILE: OnceLock<FileSlot> = OnceLock::new();

fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).with_context(|| format!("invalid log level '{directives}'"))
}

/// Replaces the active filter. Takes a bare level (`"debug"`) or any
/// `EnvFilter` directive list (`"warn,calc_core=trace"`).
pub fn set_log_level(directives: &str) -> Result<()> {
    let handle = LEVEL.get().context("logging not yet initialized")?;
    handle
        .reload(parse_filter(directives)?)
        .context("cannot apply log level")
}

/// Starts appending events to `path`, replacing any file set before. The
/// parent directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let slot = LOG_FILE.get().context("logging not yet initialized")?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    *slot.lock() = Some(BufWriter::new(file));
    Ok(())
}

/// Installs the global subscriber. Call once, first thing in `main`, so that
/// config loading is already logged; [`set_log_level`] and
/// [`enable_file_logging`] apply the settings afterwards.
///
/// The starting filter is `RUST_LOG` when set, else [`DEFAULT_LOG_LEVEL`].
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let (filter, handle) = reload::Layer::new(filter);
    let slot = FileSlot(SharedFile::default());

    let stderr = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);
    let file = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(slot.clone());

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init();
    if installed.is_ok() {
        let _ = LEVEL.set(handle);
        let _ = LOG_FILE.set(slot);
    }
}
