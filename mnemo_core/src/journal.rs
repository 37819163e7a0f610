//! Append-only review journal.
//!
//! Every persisted review is appended to a JSONL (JSON Lines) file with
//! file locking for safe concurrent access. The journal is the durable
//! audit trail behind each card's performance history; the card store
//! stays authoritative, so malformed lines are skipped on read rather
//! than failing the whole load.

use crate::{Result, ReviewEvent};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Review sink trait for persisting review events
pub trait ReviewSink {
    fn append(&mut self, event: &ReviewEvent) -> Result<()>;
}

/// JSONL-based review sink with file locking
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    /// Create a new JSONL sink for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ReviewSink for JsonlSink {
    fn append(&mut self, event: &ReviewEvent) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(event)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Appended review of card {} to journal", event.card_id);
        Ok(())
    }
}

/// Read all events from a journal file
pub fn read_events(path: &Path) -> Result<Vec<ReviewEvent>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut events = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ReviewEvent>(&line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!("Failed to parse journal line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} events from journal", events.len());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{apply_review, Card, Rating};
    use chrono::Utc;

    fn create_test_event() -> ReviewEvent {
        let now = Utc::now();
        let card = Card::new("q", "a", vec![], now);
        let outcome = apply_review(&card, Rating::new(5).unwrap(), now);
        ReviewEvent::from_card(&outcome.card).unwrap()
    }

    #[test]
    fn test_append_and_read_single_event() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("reviews.jsonl");

        let event = create_test_event();
        let card_id = event.card_id;

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&event).unwrap();

        let events = read_events(&journal_path).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].card_id, card_id);
        assert_eq!(events[0].rating.value(), 5);
        assert_eq!(events[0].interval_days, 1);
    }

    #[test]
    fn test_append_multiple_events() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("reviews.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        for _ in 0..5 {
            sink.append(&create_test_event()).unwrap();
        }

        let events = read_events(&journal_path).unwrap();
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_read_missing_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("nonexistent.jsonl");

        let events = read_events(&journal_path).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("reviews.jsonl");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&create_test_event()).unwrap();

        // Simulate a crash mid-append
        let mut file = OpenOptions::new()
            .append(true)
            .open(&journal_path)
            .unwrap();
        file.write_all(b"{ truncated").unwrap();

        let events = read_events(&journal_path).unwrap();
        assert_eq!(events.len(), 1);
    }
}
