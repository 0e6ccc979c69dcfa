use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use shadow_rs::shadow;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;

shadow!(build);

#[derive(Parser)]
#[command(version = build::VERSION)]
struct Args {
    /// learner whose deck to extend
    #[arg(long, default_value = "default")]
    user: String,

    /// how many new words to start learning
    #[arg(long, default_value_t = 10)]
    count: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let store = SQLiteStore::default().await;
    let learned = store
        .learn_new_cards(&args.user, args.count, Utc::now())
        .await?;
    if learned.is_empty() {
        println!("no new words left to learn");
        return Ok(());
    }
    for card in &learned {
        println!("{}\t{}", card.word, card.definition);
    }
    Ok(())
}
