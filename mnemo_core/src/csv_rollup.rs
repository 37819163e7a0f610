//! CSV rollup functionality for archiving the review journal.
//!
//! Converts the append-only journal into a long-term CSV archive
//! atomically, without risking loss of review events.

use crate::{Result, ReviewEvent};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    card_id: String,
    rating: u8,
    reviewed_at: String,
    ease_factor: f64,
    interval_days: i64,
    repetition: u32,
}

impl From<&ReviewEvent> for CsvRow {
    fn from(event: &ReviewEvent) -> Self {
        CsvRow {
            card_id: event.card_id.to_string(),
            rating: event.rating.value(),
            reviewed_at: event.reviewed_at.to_rfc3339(),
            ease_factor: event.ease_factor,
            interval_days: event.interval_days,
            repetition: event.repetition,
        }
    }
}

/// Roll up journal events into CSV and archive the journal atomically
///
/// This function:
/// 1. Reads all events from the journal
/// 2. Appends them to the CSV file (creates with headers if needed)
/// 3. Syncs the CSV to disk
/// 4. Renames the journal to .processed
/// 5. Returns the number of events processed
///
/// # Safety
/// - CSV is fsynced before the journal is renamed
/// - The journal is renamed (not deleted) to allow manual recovery
/// - Processed journal files can be cleaned up separately
pub fn journal_to_csv_and_archive(journal_path: &Path, csv_path: &Path) -> Result<usize> {
    let events = crate::journal::read_events(journal_path)?;

    if events.is_empty() {
        tracing::info!("No events in journal to roll up");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file is brand new
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for event in &events {
        let row = CsvRow::from(event);
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} review events to CSV", events.len());

    let processed_path = journal_path.with_extension("jsonl.processed");
    std::fs::rename(journal_path, &processed_path)?;

    tracing::info!("Archived journal to {:?}", processed_path);

    Ok(events.len())
}

/// Clean up old processed journal files
///
/// This removes all .jsonl.processed files in the given directory.
pub fn cleanup_processed_journals(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if let Some(extension) = path.extension() {
            if extension == "processed" {
                std::fs::remove_file(&path)?;
                tracing::debug!("Removed processed journal: {:?}", path);
                count += 1;
            }
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed journal files", count);
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{JsonlSink, ReviewSink};
    use crate::{apply_review, Card, Rating};
    use chrono::Utc;
    use std::fs::File;

    fn create_test_event(rating: u8) -> ReviewEvent {
        let now = Utc::now();
        let card = Card::new("q", "a", vec![], now);
        let outcome = apply_review(&card, Rating::new(rating).unwrap(), now);
        ReviewEvent::from_card(&outcome.card).unwrap()
    }

    #[test]
    fn test_rollup_creates_csv_and_archives_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("reviews.jsonl");
        let csv_path = temp_dir.path().join("reviews.csv");

        let mut sink = JsonlSink::new(&journal_path);
        for rating in [5, 3, 0] {
            sink.append(&create_test_event(rating)).unwrap();
        }

        let count = journal_to_csv_and_archive(&journal_path, &csv_path).unwrap();
        assert_eq!(count, 3);

        assert!(csv_path.exists());
        assert!(!journal_path.exists());
        assert!(journal_path.with_extension("jsonl.processed").exists());
    }

    #[test]
    fn test_rollup_appends_across_runs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("reviews.jsonl");
        let csv_path = temp_dir.path().join("reviews.csv");

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&create_test_event(5)).unwrap();
        assert_eq!(
            journal_to_csv_and_archive(&journal_path, &csv_path).unwrap(),
            1
        );

        let mut sink = JsonlSink::new(&journal_path);
        sink.append(&create_test_event(4)).unwrap();
        assert_eq!(
            journal_to_csv_and_archive(&journal_path, &csv_path).unwrap(),
            1
        );

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        let record_count = reader.into_records().count();
        assert_eq!(record_count, 2);
    }

    #[test]
    fn test_empty_journal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let journal_path = temp_dir.path().join("empty.jsonl");
        let csv_path = temp_dir.path().join("reviews.csv");

        File::create(&journal_path).unwrap();

        let count = journal_to_csv_and_archive(&journal_path, &csv_path).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_cleanup_processed_journals() {
        let temp_dir = tempfile::tempdir().unwrap();

        File::create(temp_dir.path().join("r1.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("r2.jsonl.processed")).unwrap();
        File::create(temp_dir.path().join("keep.jsonl")).unwrap();

        let count = cleanup_processed_journals(temp_dir.path()).unwrap();
        assert_eq!(count, 2);

        assert!(!temp_dir.path().join("r1.jsonl.processed").exists());
        assert!(temp_dir.path().join("keep.jsonl").exists());
    }
}
