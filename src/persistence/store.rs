//! Save file store and write debouncing

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::core::error::Result;
use crate::persistence::snapshot::SaveSnapshot;

/// Writes snapshots to one file, replacing it atomically
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    /// Write from async code
    pub async fn write(&self, snapshot: &SaveSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        tracing::debug!("Saved tick {} to {}", snapshot.game_time, self.path.display());
        Ok(())
    }

    /// Write from synchronous code
    pub fn write_blocking(&self, snapshot: &SaveSnapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Tracks when a write is due
///
/// A write is due `delay` after the oldest unsaved change. Further changes
/// in that window ride along with the same write.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    dirty_since: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            dirty_since: None,
        }
    }

    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty_since.get_or_insert(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Whether a write should happen now. Clears the dirty flag if so.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.dirty_since {
            Some(since) if now.duration_since(since) >= self.delay => {
                self.dirty_since = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::persistence::snapshot::Session;

    #[test]
    fn test_debounce_waits_for_delay() {
        let start = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_secs(2));
        assert!(!debouncer.take_due(start));

        debouncer.mark_dirty(start);
        assert!(!debouncer.take_due(start + Duration::from_secs(1)));
        assert!(debouncer.take_due(start + Duration::from_secs(2)));
        assert!(!debouncer.is_dirty());
        assert!(!debouncer.take_due(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_constant_changes_still_write() {
        let start = Instant::now();
        let mut debouncer = SaveDebouncer::new(Duration::from_secs(2));

        // One change per second never leaves a quiet period
        let mut writes = Vec::new();
        for second in 0..7 {
            let now = start + Duration::from_secs(second);
            debouncer.mark_dirty(now);
            if debouncer.take_due(now) {
                writes.push(second);
            }
        }

        // The write at 2 s covers that change, so the next window opens at 3 s
        assert_eq!(writes, vec![2, 5]);
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let path = std::env::temp_dir().join(format!("civ-store-{}.json", uuid::Uuid::new_v4()));
        let store = SaveStore::new(&path);
        let session = Session::new(SimulationConfig::default());

        store.write(&session.snapshot()).await.unwrap();

        let loaded = SaveSnapshot::load(store.path()).unwrap();
        assert_eq!(loaded.session_id, session.id);
        assert!(!store.temp_path().exists());
        std::fs::remove_file(path).ok();
    }
}
