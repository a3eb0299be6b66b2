//! # Reader Module
//!
//! Line-by-line decoding of one session log. A line that is not a JSON object of
//! the expected shape is skipped and counted; it never stops the rest of the
//! file from being read.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::PathBuf;

use tracing::warn;

use crate::models::LogEntry;

/// Decode a single line. `None` for blank or undecodable lines.
pub fn parse_line(line: &str) -> Option<LogEntry> {
    let t = line.trim();
    if t.is_empty() {
        return None;
    }
    serde_json::from_str(t).ok()
}

/// Handle on one log file. Every call to [`LogReader::entries`] reopens the file,
/// so the sequence can be replayed.
#[derive(Debug, Clone)]
pub struct LogReader {
    path: PathBuf,
}

impl LogReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Session id: the file stem.
    pub fn session_id(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> io::Result<Entries> {
        let file = File::open(&self.path)?;
        Ok(Entries::new(BufReader::new(file), self.path.clone()))
    }

    /// Read the whole file, keeping file order.
    pub fn read_all(&self) -> io::Result<FileEntries> {
        let mut iter = self.entries()?;
        let entries: Vec<LogEntry> = iter.by_ref().collect();
        Ok(FileEntries {
            entries,
            skipped: iter.skipped(),
        })
    }
}

/// Lazy entry sequence over an open log.
///
/// A line that is not valid UTF-8 is skipped like any other bad line. Any other
/// read error ends the sequence early; entries already yielded stand.
pub struct Entries<R = BufReader<File>> {
    lines: Lines<R>,
    path: PathBuf,
    skipped: usize,
    done: bool,
}

impl<R: BufRead> Entries<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            lines: reader.lines(),
            path: path.into(),
            skipped: 0,
            done: false,
        }
    }

    /// Non-blank lines dropped so far (bad JSON, bad shape, invalid UTF-8, or
    /// the line a read error stopped on).
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = LogEntry;

    fn next(&mut self) -> Option<LogEntry> {
        if self.done {
            return None;
        }
        for line in self.lines.by_ref() {
            let line = match line {
                Ok(l) => l,
                Err(err) if err.kind() == io::ErrorKind::InvalidData => {
                    self.skipped += 1;
                    continue;
                }
                Err(err) => {
                    warn!(path = %self.path.display(), error = %err, "stopped reading log");
                    self.skipped += 1;
                    self.done = true;
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Some(entry) => return Some(entry),
                None => self.skipped += 1,
            }
        }
        self.done = true;
        None
    }
}

#[derive(Debug, Default)]
pub struct FileEntries {
    pub entries: Vec<LogEntry>,
    pub skipped: usize,
}
