pub mod csv;
pub mod fsrs;
pub mod spaced_repetition;

use anyhow::Context;
use std::fs::create_dir;
use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    let path = dirs::data_local_dir().unwrap().join("vocab-reviewer");
    if !path.exists() {
        create_dir(&path)
            .with_context(|| format!("Failed to create directory {:?}", path))
            .unwrap();
    }
    path
}

pub fn db_path() -> PathBuf {
    data_dir().join("cards.db")
}
