use anyhow::anyhow;
use anyhow::Result;
use clap::Parser;
use shadow_rs::shadow;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;
use vocab_reviewer::spaced_repetition::SpacedRepetition;

shadow!(build);

#[derive(Parser)]
#[command(version = build::VERSION)]
struct Args {
    #[arg(long, default_value = "default")]
    user: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let store = SQLiteStore::default().await;
    match store.next_to_review(&args.user).await? {
        Some(card) => {
            println!("{}", card.word);
            eprintln!("{} {}", card.pronunciation, card.definition);
            Ok(())
        }
        None => {
            eprintln!("all reviewed");
            Err(anyhow!("not found"))
        }
    }
}
