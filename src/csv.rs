use crate::fsrs::sqlite_store::SQLiteStore;
use anyhow::Result;
use log::info;
use std::fs::File;
use std::path::Path;

/// One row of a vocabulary word list, e.g. an exported TOEIC deck.
#[derive(Debug, serde::Deserialize)]
pub struct Record {
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub example: String,
}

pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut v = Vec::new();
    for result in rdr.deserialize() {
        // Notice that we need to provide a type hint for automatic
        // deserialization.
        let record: Record = result?;
        v.push(record);
    }
    Ok(v)
}

impl SQLiteStore {
    /// Import a word list into the catalog. Words already present are kept
    /// as-is; returns how many rows were newly added.
    pub async fn import_words(&self, path: &Path) -> Result<usize> {
        let records = read_records(path)?;
        let mut added = 0;
        for record in &records {
            if self
                .add_word(
                    &record.word,
                    &record.definition,
                    &record.pronunciation,
                    &record.example,
                )
                .await?
            {
                added += 1;
            }
        }
        info!("imported {added} of {} words from {path:?}", records.len());
        Ok(added)
    }
}
