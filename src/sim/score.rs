//! High-score persistence.
//!
//! One record per mode: the highest level ever completed. Records only
//! move up — `record_completion` is the single mutation path and it is
//! improvement-only.
//!
//! ## File format
//!   Key-value lines, one mode per line (`classic=7`). Unknown keys and
//!   malformed lines are skipped on load, so a damaged file degrades to
//!   fresh zeroes instead of an error.
//!
//! Stored as `scores.dat` next to the executable when that directory is
//! writable, else under `~/.local/share/memtrainer`, else CWD.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::mode::GameMode;

const SCORE_FILE: &str = "scores.dat";

fn save_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs like /usr/games/ won't be)
            let test_path = parent.join(".write_test_memtrainer");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/memtrainer) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/memtrainer");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub struct ScoreStore {
    path: PathBuf,
    best: HashMap<GameMode, usize>,
}

impl ScoreStore {
    /// Load the score file from the standard location.
    pub fn load_default() -> Self {
        Self::load(save_dir().join(SCORE_FILE))
    }

    /// Load from an explicit path. Missing or unreadable file = all zeroes.
    pub fn load(path: PathBuf) -> Self {
        let mut store = ScoreStore {
            path,
            best: HashMap::new(),
        };
        if let Ok(content) = std::fs::read_to_string(&store.path) {
            store.best = parse_scores(&content);
        }
        store
    }

    /// Best completed level for a mode; 0 if never completed.
    pub fn best(&self, mode: GameMode) -> usize {
        self.best.get(&mode).copied().unwrap_or(0)
    }

    /// Record a completed round. Persists and returns true only when the
    /// level beats the stored best; otherwise leaves the record alone.
    pub fn record_completion(&mut self, mode: GameMode, level: usize) -> bool {
        if level <= self.best(mode) {
            return false;
        }
        self.best.insert(mode, level);
        if let Err(e) = self.save() {
            eprintln!("Warning: {e}");
        }
        true
    }

    fn save(&self) -> Result<(), String> {
        let mut content = String::new();
        for mode in GameMode::ALL {
            content.push_str(&format!("{}={}\n", mode.key(), self.best(mode)));
        }
        std::fs::write(&self.path, content)
            .map_err(|e| format!("could not save {}: {e}", self.path.display()))
    }
}

fn parse_scores(content: &str) -> HashMap<GameMode, usize> {
    let mut best = HashMap::new();
    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else { continue };
        let Ok(level) = value.trim().parse::<usize>() else { continue };
        for mode in GameMode::ALL {
            if mode.key() == key.trim() {
                best.insert(mode, level);
            }
        }
    }
    best
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Unique temp path per test so parallel runs don't collide.
    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("memtrainer_{}_{}.dat", name, std::process::id()))
    }

    #[test]
    fn missing_file_loads_as_zeroes() {
        let store = ScoreStore::load(temp_path("missing_nonexistent"));
        assert_eq!(store.best(GameMode::Classic), 0);
        assert_eq!(store.best(GameMode::NBack), 0);
    }

    #[test]
    fn improvement_persists_across_reload() {
        let path = temp_path("roundtrip");
        let mut store = ScoreStore::load(path.clone());
        assert!(store.record_completion(GameMode::Classic, 5));
        assert!(store.record_completion(GameMode::NBack, 4));

        let reloaded = ScoreStore::load(path.clone());
        assert_eq!(reloaded.best(GameMode::Classic), 5);
        assert_eq!(reloaded.best(GameMode::NBack), 4);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn lower_or_equal_level_is_a_no_op() {
        let path = temp_path("noop");
        let mut store = ScoreStore::load(path.clone());
        assert!(store.record_completion(GameMode::Classic, 7));
        assert!(!store.record_completion(GameMode::Classic, 7));
        assert!(!store.record_completion(GameMode::Classic, 3));
        assert_eq!(store.best(GameMode::Classic), 7);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn best_is_running_maximum() {
        let path = temp_path("monotonic");
        let mut store = ScoreStore::load(path.clone());
        let levels = [3, 5, 4, 9, 2, 9, 11, 6];
        let mut observed_max = 0;
        for level in levels {
            store.record_completion(GameMode::NBack, level);
            observed_max = observed_max.max(level);
            assert_eq!(store.best(GameMode::NBack), observed_max);
        }

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn modes_are_independent() {
        let path = temp_path("independent");
        let mut store = ScoreStore::load(path.clone());
        store.record_completion(GameMode::Classic, 9);
        assert_eq!(store.best(GameMode::NBack), 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_file_degrades_to_zeroes() {
        let path = temp_path("malformed");
        std::fs::write(&path, "classic=banana\n???\nnback=\n").unwrap();
        let store = ScoreStore::load(path.clone());
        assert_eq!(store.best(GameMode::Classic), 0);
        assert_eq!(store.best(GameMode::NBack), 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let path = temp_path("unknown_keys");
        std::fs::write(&path, "speedrun=99\nclassic=6\n").unwrap();
        let store = ScoreStore::load(path.clone());
        assert_eq!(store.best(GameMode::Classic), 6);

        let _ = std::fs::remove_file(path);
    }
}
