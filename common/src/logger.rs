use chrono::{DateTime, Local};
use log::warn;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Debug => Self::Debug,
            Severity::Info => Self::Info,
            Severity::Warning => Self::Warn,
            Severity::Error => Self::Error,
        }
    }
}

/// One line of the log file: `[<timestamp>] <SEVERITY>: <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    timestamp: DateTime<Local>,
    severity: Severity,
    message: String,
}

impl LogEntry {
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn new(severity: Severity, message: &str) -> Self {
        Self::at(Local::now(), severity, message)
    }

    /// Builds an entry with an explicit timestamp. Line breaks in `message`
    /// are replaced with spaces so the entry always renders as one line.
    pub fn at(
        timestamp: DateTime<Local>,
        severity: Severity,
        message: &str,
    ) -> Self {
        let message = message.replace(['\r', '\n'], " ");

        Self {
            timestamp,
            severity,
            message,
        }
    }

    pub const fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format(Self::TIMESTAMP_FORMAT),
            self.severity,
            self.message
        )
    }
}

/// Append-only file sink shared by every thread of a process.
///
/// Each call opens the file in append mode, writes the whole line with a
/// single `write_all` and closes it again, so concurrent callers interleave
/// at line granularity without a lock. Failures never propagate: they are
/// reported on the console through the `log` facade and the entry is lost.
#[derive(Debug, Clone)]
pub struct FileLogger {
    path: Arc<Path>,
}

impl FileLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            path: Arc::from(path),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn log(&self, severity: Severity, message: impl AsRef<str>) {
        let entry = LogEntry::new(severity, message.as_ref());
        log::log!(log::Level::from(severity), "{}", entry.message());

        if let Err(e) = self.append(&entry) {
            warn!(
                "Failed to write log file {}: {e}",
                self.path.display()
            );
        }
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(Severity::Error, message);
    }

    fn append(&self, entry: &LogEntry) -> io::Result<()> {
        let mut file =
            OpenOptions::new().create(true).append(true).open(&self.path)?;

        let line = format!("{entry}\n");
        file.write_all(line.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::{prop_assert, prop_assert_eq, proptest};
    use rstest::rstest;
    use std::fs;
    use std::thread;

    fn assert_well_formed(line: &str) {
        let rest = line.strip_prefix('[').expect("missing '['");
        let (timestamp, rest) = rest.split_once("] ").expect("missing ']'");
        assert!(
            chrono::NaiveDateTime::parse_from_str(
                timestamp,
                LogEntry::TIMESTAMP_FORMAT
            )
            .is_ok(),
            "bad timestamp in {line:?}"
        );
        let (severity, _) = rest.split_once(": ").expect("missing ': '");
        assert!(
            ["DEBUG", "INFO", "WARNING", "ERROR"].contains(&severity),
            "bad severity in {line:?}"
        );
    }

    #[rstest]
    #[case(Severity::Debug, "DEBUG", log::Level::Debug)]
    #[case(Severity::Info, "INFO", log::Level::Info)]
    #[case(Severity::Warning, "WARNING", log::Level::Warn)]
    #[case(Severity::Error, "ERROR", log::Level::Error)]
    fn severity_labels(
        #[case] severity: Severity,
        #[case] label: &str,
        #[case] level: log::Level,
    ) {
        assert_eq!(severity.to_string(), label);
        assert_eq!(log::Level::from(severity), level);
    }

    #[test]
    fn entry_display_format() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let entry = LogEntry::at(timestamp, Severity::Info, "Server starting.");

        assert_eq!(
            entry.to_string(),
            "[2024-03-09 07:05:01] INFO: Server starting."
        );
    }

    #[test]
    fn entry_flattens_line_breaks() {
        let entry = LogEntry::new(Severity::Error, "first\nsecond\r\nthird");

        assert_eq!(entry.message(), "first second  third");
        assert_eq!(entry.to_string().lines().count(), 1);
    }

    #[test]
    fn appends_one_line_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(dir.path().join("server.log"));

        logger.info("Server starting.");
        logger.error("Failed to read client message.");

        let contents = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("] INFO: Server starting."));
        assert!(lines[1].ends_with("] ERROR: Failed to read client message."));
        lines.iter().copied().for_each(assert_well_formed);
    }

    #[test]
    fn keeps_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.log");
        fs::write(&path, "previous run\n").unwrap();

        FileLogger::new(&path).warning("again");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("previous run\n"));
        assert!(contents.ends_with("] WARNING: again\n"));
    }

    #[test]
    fn unopenable_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(dir.path().join("missing/dir/server.log"));

        logger.error("nowhere to go");

        assert!(!logger.path().exists());
    }

    #[test]
    fn concurrent_calls_keep_lines_intact() {
        const THREADS: usize = 16;
        const PER_THREAD: usize = 50;

        let dir = tempfile::tempdir().unwrap();
        let logger = FileLogger::new(dir.path().join("server.log"));
        let (tx, rx) = crossbeam::channel::unbounded();

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let logger = logger.clone();
                let tx = tx.clone();
                thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        logger.info(format!("thread {t} entry {i}"));
                    }
                    tx.send(t).unwrap();
                })
            })
            .collect();
        drop(tx);

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(rx.iter().count(), THREADS);

        let contents = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), THREADS * PER_THREAD);
        for line in lines {
            assert_well_formed(line);
            assert!(line.contains("] INFO: thread "));
        }
    }

    proptest! {
        #[test]
        fn any_message_renders_one_line(message in "\\PC*[\r\n]?\\PC*") {
            let entry = LogEntry::new(Severity::Debug, &message);
            let rendered = entry.to_string();

            prop_assert_eq!(rendered.lines().count(), 1);
            prop_assert!(rendered.contains("] DEBUG: "));
        }
    }
}
