//! Logging of parse diagnostics
//!
//! Unknown keys and malformed lines do not stop a parse. They are returned to the
//! caller and also written to a [`Logger`], by default the process wide
//! [`global_logger`]. Attach a stream to see them.
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use mhmat::logging::{LogLevel, Logger, MemoryLogStream};
//!
//! let stream = Arc::new(Mutex::new(MemoryLogStream::new()));
//! let mut logger = Logger::new();
//! logger.attach_stream(stream.clone());
//! logger.log(LogLevel::Warn, "line 3: unknown key 'bogusKey'");
//! assert_eq!(stream.lock().unwrap().messages().len(), 1);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::error::Result;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Verbose debug information
    Debug,
    /// Informational messages
    Info,
    /// Warning messages
    Warn,
    /// Error messages
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
        })
    }
}

/// Trait for custom log stream implementations
pub trait LogStream: Send + Sync {
    /// Write a log message
    fn write(&mut self, message: &str);
}

/// A log stream that writes to stdout
pub struct StdoutLogStream;

impl LogStream for StdoutLogStream {
    fn write(&mut self, message: &str) {
        print!("{}", message);
    }
}

/// A log stream that writes to stderr
pub struct StderrLogStream;

impl LogStream for StderrLogStream {
    fn write(&mut self, message: &str) {
        eprint!("{}", message);
    }
}

/// A log stream that writes to a file
pub struct FileLogStream {
    file: std::fs::File,
}

impl FileLogStream {
    /// Create a new file log stream, appending to `path`
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        writeln!(file, "=== MHMAT Log Started ===")?;

        Ok(Self { file })
    }
}

impl LogStream for FileLogStream {
    fn write(&mut self, message: &str) {
        use std::io::Write;
        let _ = self.file.write_all(message.as_bytes());
        let _ = self.file.flush();
    }
}

/// A log stream that collects messages in memory
pub struct MemoryLogStream {
    messages: Vec<String>,
}

impl MemoryLogStream {
    /// Create a new memory log stream
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Get all collected messages
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Clear all collected messages
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Default for MemoryLogStream {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStream for MemoryLogStream {
    fn write(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Fans log messages out to attached streams
pub struct Logger {
    streams: Vec<Arc<Mutex<dyn LogStream>>>,
    verbose: bool,
}

impl Logger {
    /// Create a new logger with no streams attached
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
            verbose: false,
        }
    }

    /// Attach a log stream
    pub fn attach_stream(&mut self, stream: Arc<Mutex<dyn LogStream>>) {
        self.streams.push(stream);
    }

    /// Detach a log stream, returning whether it was attached
    pub fn detach_stream(&mut self, stream: &Arc<Mutex<dyn LogStream>>) -> bool {
        match self.streams.iter().position(|s| Arc::ptr_eq(s, stream)) {
            Some(pos) => {
                self.streams.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Detach all log streams
    pub fn detach_all_streams(&mut self) {
        self.streams.clear();
    }

    /// Number of attached streams
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Enable or disable debug messages
    pub fn enable_verbose_logging(&mut self, enable: bool) {
        self.verbose = enable;
    }

    /// Whether debug messages are written
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Write a message to every attached stream
    ///
    /// Debug messages are dropped unless verbose logging is on. A stream whose
    /// lock is poisoned is still written to.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Debug && !self.verbose {
            return;
        }
        let line = format!("{level}: {message}\n");
        for stream in &self.streams {
            let mut stream = stream.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            stream.write(&line);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("streams", &self.streams.len())
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Global logger instance
static GLOBAL_LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Get the global logger instance
pub fn global_logger() -> &'static Mutex<Logger> {
    GLOBAL_LOGGER.get_or_init(|| Mutex::new(Logger::new()))
}

fn lock_global() -> MutexGuard<'static, Logger> {
    global_logger()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write a message through the global logger
pub fn log(level: LogLevel, message: &str) {
    lock_global().log(level, message);
}

/// Convenience function to attach a stdout log stream
pub fn attach_stdout_stream() {
    lock_global().attach_stream(Arc::new(Mutex::new(StdoutLogStream)));
}

/// Convenience function to attach a stderr log stream
pub fn attach_stderr_stream() {
    lock_global().attach_stream(Arc::new(Mutex::new(StderrLogStream)));
}

/// Convenience function to attach a file log stream
pub fn attach_file_stream<P: AsRef<std::path::Path>>(path: P) -> Result<()> {
    let stream = Arc::new(Mutex::new(FileLogStream::new(path)?));
    lock_global().attach_stream(stream);
    Ok(())
}

/// Convenience function to enable verbose logging
pub fn enable_verbose_logging(enable: bool) {
    lock_global().enable_verbose_logging(enable);
}

/// Convenience function to detach all log streams
pub fn detach_all_streams() {
    lock_global().detach_all_streams();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_formats_and_filters() {
        let stream = Arc::new(Mutex::new(MemoryLogStream::new()));
        let mut logger = Logger::new();
        logger.attach_stream(stream.clone());

        logger.log(LogLevel::Warn, "line 2: malformed line");
        logger.log(LogLevel::Debug, "hidden");
        logger.enable_verbose_logging(true);
        logger.log(LogLevel::Debug, "shown");

        let messages = stream.lock().unwrap().messages().to_vec();
        assert_eq!(
            messages,
            vec!["Warn: line 2: malformed line\n", "Debug: shown\n"]
        );
    }

    #[test]
    fn test_detach_stream() {
        let stream: Arc<Mutex<dyn LogStream>> = Arc::new(Mutex::new(MemoryLogStream::new()));
        let mut logger = Logger::new();
        logger.attach_stream(stream.clone());
        assert_eq!(logger.stream_count(), 1);
        assert!(logger.detach_stream(&stream));
        assert!(!logger.detach_stream(&stream));
        assert_eq!(logger.stream_count(), 0);
    }

    #[test]
    fn test_file_log_stream() {
        let path = std::env::temp_dir().join(format!("mhmat_log_{}.log", std::process::id()));
        let _ = std::fs::remove_file(&path);
        {
            let mut stream = FileLogStream::new(&path).unwrap();
            stream.write("Warn: hello\n");
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("=== MHMAT Log Started ==="));
        assert!(contents.contains("Warn: hello"));
        let _ = std::fs::remove_file(&path);
    }
}
