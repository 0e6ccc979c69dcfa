use anyhow::Result;
use std::env::args;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let word = args().nth(1).unwrap_or("--help".to_owned());
    if word == "--help" {
        println!("add a word to the vocabulary catalog");
        println!("usage: add_word WORD DEFINITION [PRONUNCIATION] [EXAMPLE]");
        return Ok(());
    }

    let definition = args().nth(2).unwrap_or_default();
    let pronunciation = args().nth(3).unwrap_or_default();
    let example = args().nth(4).unwrap_or_default();

    let store = SQLiteStore::default().await;
    if store
        .add_word(&word, &definition, &pronunciation, &example)
        .await?
    {
        println!("added {word}");
    } else {
        println!("{word} is already in the catalog");
    }
    Ok(())
}
