//! Readiness detection by tailing the emulator's log.
//!
//! The emulator is detached, so its exit status says nothing about whether it
//! finished booting. Instead a background thread polls the boot log and fires
//! a one-shot callback when the readiness marker is written. Polling is used
//! rather than filesystem notifications because the log may not exist yet
//! when watching begins.

mod tail;

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::WATCH_TARGET;

pub use tail::LogTail;

/// Log line written once the emulator is serving ADB.
pub const READY_MARKER: &str = "Adb connected, start proxing data";

/// Background poller that reports the readiness marker once.
#[derive(Debug)]
pub struct LogWatcher {
    path: PathBuf,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl LogWatcher {
    /// Starts watching `path` every `interval`, calling `on_ready` the first
    /// time a line containing [`READY_MARKER`] is seen.
    ///
    /// # Errors
    ///
    /// Returns an error if the polling thread cannot be spawned.
    pub fn start<F>(
        path: impl Into<PathBuf>,
        interval: Duration,
        on_ready: F,
    ) -> std::io::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let path = path.into();
        let (stop, stopped) = mpsc::channel::<()>();
        let mut tail = LogTail::new(&path);
        let handle = thread::Builder::new()
            .name(String::from("avd-log-watcher"))
            .spawn(move || {
                let mut on_ready = Some(on_ready);
                loop {
                    scan(&mut tail, &mut on_ready);
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                trace!(target: WATCH_TARGET, path = %tail.path().display(), "watcher stopped");
            })?;
        debug!(
            target: WATCH_TARGET,
            path = %path.display(),
            interval_ms = interval.as_millis(),
            "watching boot log"
        );
        Ok(Self {
            path,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// File being watched.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops polling and waits for the thread to exit. Safe to call repeatedly.
    pub fn stop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!(target: WATCH_TARGET, path = %self.path.display(), "watcher thread panicked");
            }
        }
    }
}

impl Drop for LogWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn scan<F: FnOnce()>(tail: &mut LogTail, on_ready: &mut Option<F>) {
    let lines = match tail.poll() {
        Ok(lines) => lines,
        Err(error) => {
            trace!(target: WATCH_TARGET, %error, "boot log not readable yet");
            return;
        }
    };
    for line in lines {
        trace!(target: WATCH_TARGET, line = %line, "emulator");
        if line.contains(READY_MARKER) {
            if let Some(callback) = on_ready.take() {
                callback();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;

    use super::*;

    const INTERVAL: Duration = Duration::from_millis(20);

    fn append(path: &Path, text: &str) {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .expect("open log");
        file.write_all(text.as_bytes()).expect("append log");
    }

    #[test]
    fn fires_once_even_when_marker_repeats() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("Pixel.log");
        let fired = Arc::new(AtomicUsize::new(0));
        let (ready_tx, ready_rx) = mpsc::channel();
        let counter = Arc::clone(&fired);
        let mut watcher = LogWatcher::start(&path, INTERVAL, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            ready_tx.send(()).expect("send readiness");
        })
        .expect("start watcher");

        append(&path, &format!("boot\n{READY_MARKER}\n{READY_MARKER}\n"));
        ready_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("readiness reported");
        append(&path, &format!("{READY_MARKER}\n"));
        thread::sleep(INTERVAL * 5);
        watcher.stop();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tolerates_log_created_after_start() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("late.log");
        let (ready_tx, ready_rx) = mpsc::channel();
        let _watcher = LogWatcher::start(&path, INTERVAL, move || {
            ready_tx.send(()).expect("send readiness");
        })
        .expect("start watcher");

        thread::sleep(INTERVAL * 3);
        append(&path, &format!("emulator: INFO: {READY_MARKER}\n"));
        ready_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("readiness reported");
    }

    #[test]
    fn ignores_lines_without_marker() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("Pixel.log");
        append(&path, "emulator: Adb connected\n");
        let (ready_tx, ready_rx) = mpsc::channel::<()>();
        let mut watcher = LogWatcher::start(&path, INTERVAL, move || {
            ready_tx.send(()).expect("send readiness");
        })
        .expect("start watcher");
        assert!(ready_rx.recv_timeout(INTERVAL * 5).is_err());
        watcher.stop();
    }

    #[test]
    fn stop_is_idempotent_and_leaves_file_in_place() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("Pixel.log");
        append(&path, "boot\n");
        let mut watcher = LogWatcher::start(&path, INTERVAL, || {}).expect("start watcher");
        watcher.stop();
        watcher.stop();
        drop(watcher);
        assert!(path.exists());
    }
}
