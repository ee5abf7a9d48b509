use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chime_core::{Job, JobStore, StoreError};
use tempfile::NamedTempFile;
use tracing::debug;

/// File-backed job store: the whole set as one pretty-printed JSON array.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JobStore for JsonStore {
    /// A missing file is an empty set, not an error.
    fn load(&self) -> Result<Vec<Job>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "job file absent, starting empty");
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write-to-temp then rename, so a crash mid-save never leaves a
    /// half-written job file behind. The temp name is unique per save —
    /// concurrent execution units must not rename each other's snapshots.
    fn save(&self, jobs: &[Job]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(d) if !d.as_os_str().is_empty() => {
                fs::create_dir_all(d)?;
                d
            }
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(jobs)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        debug!(path = %self.path.display(), count = jobs.len(), "job set saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chime_core::Rule;
    use chrono::Utc;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("jobs.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("jobs.json"));

        let now = Utc::now();
        let mut backup = Job::new("backup", "echo task", Rule::Interval { seconds: 5 }, now);
        backup.running = true; // transient, must not survive persistence
        let mut alarm = Job::new("alarm", "echo task", Rule::Once { at: now }, now);
        alarm.done = true;

        store.save(&[backup, alarm]).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "backup");
        assert!(!loaded[0].running);
        assert_eq!(loaded[0].rule, Rule::Interval { seconds: 5 });
        assert!(loaded[1].done);
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested/deeper/jobs.json"));
        store.save(&[]).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn concurrent_saves_leave_a_complete_snapshot() {
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonStore::new(dir.path().join("jobs.json")));
        let now = Utc::now();

        let handles: Vec<_> = (1..=8usize)
            .map(|size| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let jobs: Vec<Job> = (0..size)
                        .map(|n| Job::new(&format!("job-{n}"), "echo task", Rule::Daily, now))
                        .collect();
                    for _ in 0..25 {
                        store.save(&jobs).unwrap(); // no spurious rename errors
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // Whichever save won, the file is one writer's complete snapshot.
        let loaded = store.load().unwrap();
        assert!((1..=8).contains(&loaded.len()));
        for (n, job) in loaded.iter().enumerate() {
            assert_eq!(job.name, format!("job-{n}"));
        }
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        fs::write(&path, "not json").unwrap();
        assert!(JsonStore::new(path).load().is_err());
    }
}
