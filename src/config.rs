//! External configuration loader.
//!
//! Reads `config.toml` from the executable's directory (or CWD).
//! Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub progression: ProgressionConfig,
    /// Custom symbol catalog. Empty = use the built-in set.
    pub symbols: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub reveal_ms: u64,        // how long each sequence card stays up
    pub reveal_gap_ms: u64,    // blank between cards (the "flip")
    pub outcome_pause_ms: u64, // win/lose banner duration
    pub tap_flash_ms: u64,     // selection highlight / tap debounce
}

/// Level progression rules. Start level and per-mode step on success;
/// failure always drops back to `start_level`.
#[derive(Clone, Copy, Debug)]
pub struct ProgressionConfig {
    pub start_level: usize,
    pub classic_step: usize,
    pub nback_step: usize,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    progression: TomlProgression,
    #[serde(default)]
    catalog: TomlCatalog,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_reveal")]
    reveal_ms: u64,
    #[serde(default = "default_reveal_gap")]
    reveal_gap_ms: u64,
    #[serde(default = "default_outcome_pause")]
    outcome_pause_ms: u64,
    #[serde(default = "default_tap_flash")]
    tap_flash_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlProgression {
    #[serde(default = "default_start_level")]
    start_level: usize,
    #[serde(default = "default_classic_step")]
    classic_step: usize,
    #[serde(default = "default_nback_step")]
    nback_step: usize,
}

#[derive(Deserialize, Debug, Default)]
struct TomlCatalog {
    #[serde(default)]
    symbols: Vec<String>,
}

// ── Defaults ──

fn default_reveal() -> u64 { 1000 }      // 1.0s per card
fn default_reveal_gap() -> u64 { 300 }   // 0.3s flip between cards
fn default_outcome_pause() -> u64 { 2000 }
fn default_tap_flash() -> u64 { 300 }

fn default_start_level() -> usize { 3 }
fn default_classic_step() -> usize { 2 }
fn default_nback_step() -> usize { 1 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            reveal_ms: default_reveal(),
            reveal_gap_ms: default_reveal_gap(),
            outcome_pause_ms: default_outcome_pause(),
            tap_flash_ms: default_tap_flash(),
        }
    }
}

impl Default for TomlProgression {
    fn default() -> Self {
        TomlProgression {
            start_level: default_start_level(),
            classic_step: default_classic_step(),
            nback_step: default_nback_step(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        Self::from_toml(toml_cfg)
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        GameConfig {
            timing: TimingConfig {
                reveal_ms: toml_cfg.timing.reveal_ms,
                reveal_gap_ms: toml_cfg.timing.reveal_gap_ms,
                outcome_pause_ms: toml_cfg.timing.outcome_pause_ms,
                tap_flash_ms: toml_cfg.timing.tap_flash_ms,
            },
            progression: ProgressionConfig {
                start_level: toml_cfg.progression.start_level.max(1),
                classic_step: toml_cfg.progression.classic_step.max(1),
                nback_step: toml_cfg.progression.nback_step.max(1),
            },
            symbols: toml_cfg.catalog.symbols,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GameConfig {
        GameConfig::from_toml(toml::from_str::<TomlConfig>(text).unwrap())
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.timing.reveal_ms, 1000);
        assert_eq!(cfg.timing.reveal_gap_ms, 300);
        assert_eq!(cfg.timing.outcome_pause_ms, 2000);
        assert_eq!(cfg.progression.start_level, 3);
        assert_eq!(cfg.progression.classic_step, 2);
        assert_eq!(cfg.progression.nback_step, 1);
        assert!(cfg.symbols.is_empty());
    }

    #[test]
    fn partial_section_fills_missing_keys() {
        let cfg = parse("[timing]\nreveal_ms = 750\n");
        assert_eq!(cfg.timing.reveal_ms, 750);
        assert_eq!(cfg.timing.reveal_gap_ms, 300);
    }

    #[test]
    fn custom_catalog_parses() {
        let cfg = parse("[catalog]\nsymbols = [\"A\", \"B\", \"C\"]\n");
        assert_eq!(cfg.symbols, vec!["A", "B", "C"]);
    }

    #[test]
    fn zero_step_clamped_to_one() {
        let cfg = parse("[progression]\nclassic_step = 0\n");
        assert_eq!(cfg.progression.classic_step, 1);
    }
}
