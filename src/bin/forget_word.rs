use anyhow::Result;
use std::env::args;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;
use vocab_reviewer::spaced_repetition::SpacedRepetition;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let w = args().nth(1).unwrap_or("--help".to_owned());
    if w == "--help" {
        println!("drop words from the default learner's deck");
        println!("usage: forget_word WORD [WORD...]");
        return Ok(());
    }

    let store = SQLiteStore::default().await;
    for word in args().skip(1) {
        if let Some(card_id) = store.find_word(&word).await? {
            store.delete("default", card_id).await?;
        }
    }
    Ok(())
}
