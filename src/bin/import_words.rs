use anyhow::Result;
use std::env::args;
use std::path::PathBuf;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let path = args().nth(1).unwrap_or("--help".to_owned());
    if path == "--help" {
        println!("import a csv word list: word,definition,pronunciation,example");
        println!("usage: import_words WORDLIST.csv");
        return Ok(());
    }

    let store = SQLiteStore::default().await;
    let added = store.import_words(&PathBuf::from(path)).await?;
    println!("{added} new words");
    Ok(())
}
