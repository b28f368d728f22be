//! Best-score persistence: a single value in a small local file, read
//! at startup and written whenever the current round beats it.

use log::warn;
use std::path::{Path, PathBuf};

const BEST_SCORE_FILE: &str = "skydash_best_score";

fn best_score_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(BEST_SCORE_FILE)
}

pub fn load_best_score() -> f32 {
    load_from(&best_score_path())
}

pub fn save_best_score(score: f32) {
    save_to(&best_score_path(), score);
}

fn load_from(path: &Path) -> f32 {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|text| text.trim().parse::<f32>().ok())
        .unwrap_or(0.0)
}

fn save_to(path: &Path, score: f32) {
    if let Err(e) = std::fs::write(path, format!("{}", score)) {
        warn!("Failed to persist best score to {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("skydash_test_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_roundtrip() {
        let path = temp_path("roundtrip");
        save_to(&path, 41.5);
        assert_eq!(load_from(&path), 41.5);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_or_garbled_file_reads_zero() {
        assert_eq!(load_from(Path::new("/nonexistent/skydash")), 0.0);

        let path = temp_path("garbled");
        std::fs::write(&path, "not a number").unwrap();
        assert_eq!(load_from(&path), 0.0);
        let _ = std::fs::remove_file(&path);
    }
}
