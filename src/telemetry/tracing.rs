use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    /// Append log lines to this file as well.
    pub log_file: Option<PathBuf>,
    pub log_to_stderr: bool,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            log_file: None,
            log_to_stderr: true,
            json_format: false,
        }
    }
}

impl TracingConfig {
    /// `debug` forces DEBUG regardless of `RUST_LOG`.
    pub fn from_env(debug: bool) -> Self {
        let level = if debug { Level::DEBUG } else { Level::WARN };
        Self {
            level,
            ..Self::default()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to open log file {path}: {source}")]
    LogFileOpen { path: PathBuf, source: io::Error },
}

/// Keeps the subscriber installed for the current thread; flushes the log
/// file on drop.
#[derive(Debug)]
pub struct TracingGuard {
    _default_guard: tracing::subscriber::DefaultGuard,
    file: Option<Arc<Mutex<File>>>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            if let Ok(mut handle) = file.lock() {
                let _ = handle.flush();
            }
        }
    }
}

struct FileWriter {
    file: Arc<Mutex<File>>,
}

impl io::Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file mutex poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file mutex poisoned"))?;
        guard.flush()
    }
}

#[derive(Clone)]
struct FileMakeWriter {
    file: Arc<Mutex<File>>,
}

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter {
            file: Arc::clone(&self.file),
        }
    }
}

fn fmt_layer<W>(writer: W, json: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

pub fn init_tracing(config: &TracingConfig) -> Result<TracingGuard, TracingError> {
    let env_filter = resolve_env_filter(config);

    let file = match &config.log_file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| TracingError::LogFileOpen {
                    path: path.clone(),
                    source,
                })?;
            Some(Arc::new(Mutex::new(file)))
        }
        None => None,
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.log_to_stderr {
        layers.push(fmt_layer(std::io::stderr, config.json_format));
    }
    if let Some(file) = &file {
        let writer = FileMakeWriter {
            file: Arc::clone(file),
        };
        layers.push(fmt_layer(writer, config.json_format));
    }

    let default_guard = tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .set_default();

    Ok(TracingGuard {
        _default_guard: default_guard,
        file,
    })
}

fn resolve_env_filter(config: &TracingConfig) -> EnvFilter {
    if config.level == Level::DEBUG {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
    }
}
