//! In-memory logger feeding the TUI log panel.
//!
//! Records go to a bounded ring buffer and, when `DROPCLOCK_LOG_STDERR` is set
//! to anything but `0`, also to stderr. While the TUI owns the terminal, raw
//! stderr output (audio backends like to print there) is piped into the same
//! buffer so it does not scribble over the screen.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::str::FromStr;
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

const LOG_CAPACITY: usize = 500;

/// Shared handle to the most recent log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<VecDeque<String>>>);

impl LogBuffer {
    fn push(&self, line: String) {
        if let Ok(mut lines) = self.0.lock() {
            if lines.len() >= LOG_CAPACITY {
                lines.pop_front();
            }
            lines.push_back(line);
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0
            .lock()
            .map(|lines| lines.iter().cloned().collect())
            .unwrap_or_default()
    }
}

struct BufferedLogger {
    level: LevelFilter,
    buffer: LogBuffer,
    echo_stderr: bool,
}

impl Log for BufferedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!(
            "{} [{}] {}",
            Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        );
        if self.echo_stderr {
            eprintln!("{}", line);
        }
        self.buffer.push(line);
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<BufferedLogger> = OnceLock::new();

/// Install the logger (once) and return its buffer.
///
/// The level comes from `RUST_LOG` (`error`, `warn`, `info`, `debug`,
/// `trace`), defaulting to `info`.
pub fn init() -> LogBuffer {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| LevelFilter::from_str(value.trim()).ok())
        .unwrap_or(LevelFilter::Info);
    let echo_stderr = std::env::var("DROPCLOCK_LOG_STDERR")
        .map(|value| value != "0")
        .unwrap_or(false);

    let logger = LOGGER.get_or_init(|| BufferedLogger {
        level,
        buffer: LogBuffer::default(),
        echo_stderr,
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }

    logger.buffer.clone()
}

/// Restores the original stderr when dropped.
pub struct StderrCaptureGuard {
    original_fd: RawFd,
    stderr_fd: RawFd,
    reader_handle: Option<JoinHandle<()>>,
}

impl Drop for StderrCaptureGuard {
    fn drop(&mut self) {
        // Restoring fd 2 closes the pipe's last writer, which ends the reader.
        unsafe {
            libc::dup2(self.original_fd, self.stderr_fd);
            libc::close(self.original_fd);
        }
        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Redirect process stderr into `buffer` until the guard is dropped.
///
/// Returns `None` (and leaves stderr untouched) if any pipe/dup call fails.
pub fn capture_stderr(buffer: LogBuffer) -> Option<StderrCaptureGuard> {
    let stderr_fd = std::io::stderr().as_raw_fd();
    let mut fds = [0; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return None;
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    let original_fd = unsafe { libc::dup(stderr_fd) };
    if original_fd < 0 {
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
        return None;
    }

    if unsafe { libc::dup2(write_fd, stderr_fd) } < 0 {
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
            libc::close(original_fd);
        }
        return None;
    }
    unsafe {
        libc::close(write_fd);
    }

    let handle = std::thread::spawn(move || {
        let file = unsafe { std::fs::File::from_raw_fd(read_fd) };
        for line in BufReader::new(file).lines() {
            let Ok(line) = line else { break };
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                buffer.push(format!("[STDERR] {}", trimmed));
            }
        }
    });

    Some(StderrCaptureGuard {
        original_fd,
        stderr_fd,
        reader_handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_keeps_only_the_newest_lines() {
        let buffer = LogBuffer::default();
        for i in 0..(LOG_CAPACITY + 10) {
            buffer.push(format!("line {}", i));
        }
        let lines = buffer.snapshot();
        assert_eq!(lines.len(), LOG_CAPACITY);
        assert_eq!(lines[0], "line 10");
        assert_eq!(lines.last().map(String::as_str), Some("line 509"));
    }
}
