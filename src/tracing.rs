//! Process-wide log output for applications embedding the repositories.
//!
//! Library code logs through the `log` facade; `init` bridges those records
//! into a `tracing-subscriber` fmt layer writing to stderr and, once
//! `set_log_file` is called, to a file as well.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockWriteGuard};

const DEFAULT_DIRECTIVE: &str = "info";

type SharedFile = Arc<RwLock<Option<File>>>;

#[derive(Clone, Default)]
struct LogSink {
    file: SharedFile,
}

struct SinkWriter {
    file: SharedFile,
}

fn lock_file(file: &SharedFile) -> RwLockWriteGuard<'_, Option<File>> {
    file.write().unwrap_or_else(PoisonError::into_inner)
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter {
            file: self.file.clone(),
        }
    }
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = io::stderr().write(buf)?;
        if let Some(file) = lock_file(&self.file).as_mut() {
            let _ = file.write_all(&buf[..written]);
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = lock_file(&self.file).as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

static SINK: OnceLock<LogSink> = OnceLock::new();

/// Installs the global subscriber. `RUST_LOG` overrides the default `info`
/// filter. Calling it again is a no-op.
pub fn init() {
    let _ = tracing_log::LogTracer::init();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVE));

    let sink = SINK.get_or_init(LogSink::default).clone();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(sink)
        .try_init();
}

/// Mirrors log output to `log_file` (appending), or stops mirroring on `None`.
pub fn set_log_file(log_file: Option<&Path>) -> io::Result<()> {
    let Some(sink) = SINK.get() else {
        return Ok(());
    };
    let file = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Some(OpenOptions::new().create(true).append(true).open(path)?)
        }
        None => None,
    };
    *lock_file(&sink.file) = file;
    Ok(())
}
