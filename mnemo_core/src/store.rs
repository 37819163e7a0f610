//! Card store persistence with file locking.
//!
//! The full collection lives in a single JSON file. Saves are atomic
//! (write temp, fsync, rename); reads take a shared lock. A missing file
//! is an empty collection; a present but unreadable file is a hard error,
//! never silently treated as empty.

use crate::{Card, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// JSON-file card store
#[derive(Clone, Debug)]
pub struct CardStore {
    path: PathBuf,
}

impl CardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every card, with a shared lock held for the read.
    ///
    /// A store that does not exist yet loads as an empty collection.
    /// A store that exists but cannot be read or parsed is a hard error:
    /// the distinction between "absent" and "corrupt" must never be
    /// papered over by returning an empty set.
    pub fn load(&self) -> Result<Vec<Card>> {
        if !self.path.exists() {
            tracing::info!("No card store found at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let cards: Vec<Card> = serde_json::from_str(&contents).map_err(|e| {
            Error::Store(format!(
                "card store {:?} is present but unreadable: {}",
                self.path, e
            ))
        })?;

        tracing::debug!("Loaded {} cards from {:?}", cards.len(), self.path);
        Ok(cards)
    }

    /// Atomically replace the full collection.
    ///
    /// Writes to a temp file in the same directory, takes an exclusive
    /// lock, syncs, then renames over the original so a crash mid-write
    /// can never leave a half-written store behind.
    pub fn save(&self, cards: &[Card]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(cards)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} cards to {:?}", cards.len(), self.path);
        Ok(())
    }
}

/// Find a card by id in a loaded collection
pub fn find_by_id(cards: &[Card], id: Uuid) -> Result<&Card> {
    cards
        .iter()
        .find(|c| c.id == id)
        .ok_or(Error::CardNotFound(id))
}

/// Mutable lookup, for writing a reviewed card back into the collection
pub fn find_by_id_mut(cards: &mut [Card], id: Uuid) -> Result<&mut Card> {
    cards
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or(Error::CardNotFound(id))
}
