//! Background episode-record writer and process metrics sampling.
//!
//! Record writes are decoupled from the simulation loop: callers enqueue
//! `(destination, timestamp, message)` items onto a FIFO channel drained by
//! one dedicated writer thread, started once and scoped to the process
//! lifetime. Durability is best-effort and at-least-eventual; ordering is
//! FIFO per destination file. I/O failures are reported through `tracing`
//! and never propagated back to the simulation thread.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Mutex, OnceLock};
use std::thread;

use chrono::{DateTime, Utc};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::warn;

/// Timestamp format on record lines; round-trips with the playback parser.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

enum LogItem {
    Line {
        path: PathBuf,
        timestamp: Option<String>,
        message: String,
    },
    Flush(SyncSender<()>),
}

/// Handle to the process-wide record writer.
pub struct LogSink {
    tx: Mutex<Sender<LogItem>>,
}

static GLOBAL_SINK: OnceLock<LogSink> = OnceLock::new();

impl LogSink {
    /// The process-wide sink. The writer thread starts on first use and
    /// drains the queue forever.
    pub fn global() -> &'static LogSink {
        GLOBAL_SINK.get_or_init(|| {
            let (tx, rx) = mpsc::channel();
            let spawned = thread::Builder::new()
                .name("record-writer".to_string())
                .spawn(move || write_loop(&rx));
            if let Err(err) = spawned {
                warn!(error = %err, "could not start record writer thread");
            }
            LogSink { tx: Mutex::new(tx) }
        })
    }

    /// Enqueues one line for `path`. Messages may span multiple lines; a
    /// newline is appended on write. Timestamped lines are prefixed
    /// `"<timestamp>: "`.
    pub fn log(&self, path: &Path, timestamp: Option<DateTime<Utc>>, message: &str) {
        self.send(LogItem::Line {
            path: path.to_path_buf(),
            timestamp: timestamp.map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
            message: message.to_string(),
        });
    }

    /// Blocks until everything enqueued before this call has been written.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        self.send(LogItem::Flush(ack_tx));
        let _ = ack_rx.recv();
    }

    fn send(&self, item: LogItem) {
        let sender = match self.tx.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        if sender.send(item).is_err() {
            warn!("record writer thread is gone, dropping record line");
        }
    }
}

fn write_loop(rx: &Receiver<LogItem>) {
    while let Ok(item) = rx.recv() {
        match item {
            LogItem::Flush(ack) => {
                let _ = ack.send(());
            }
            LogItem::Line {
                path,
                timestamp,
                message,
            } => {
                if let Err(err) = append_line(&path, timestamp.as_deref(), &message) {
                    warn!(path = %path.display(), error = %err, "failed to append record line");
                }
            }
        }
    }
}

fn append_line(path: &Path, timestamp: Option<&str>, message: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    match timestamp {
        Some(ts) => writeln!(file, "{ts}: {message}"),
        None => writeln!(file, "{message}"),
    }
}

/// Samples the resident-set size of this process for the per-step memory
/// series of the metrics history.
pub struct MemorySampler {
    system: System,
    pid: Pid,
}

impl MemorySampler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(std::process::id()),
        }
    }

    /// Current resident-set size in bytes; 0 when the process cannot be
    /// inspected.
    pub fn sample(&mut self) -> u64 {
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        self.system.process(self.pid).map_or(0, |p| p.memory())
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySampler")
            .field("pid", &self.pid)
            .finish_non_exhaustive()
    }
}
