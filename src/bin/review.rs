use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use shadow_rs::shadow;
use vocab_reviewer::fsrs::scheduler::Rating;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;
use vocab_reviewer::spaced_repetition::SpacedRepetition;

shadow!(build);

#[derive(Parser)]
#[command(version = build::VERSION)]
struct Args {
    /// learner submitting the review
    #[arg(long, default_value = "default")]
    user: String,

    /// word being reviewed
    word: String,

    /// recall rating: 1 = again, 2 = hard, 3 = good, 4 = easy
    rating: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let rating = Rating::from_i64(args.rating).context("rating must be 1 (again) to 4 (easy)")?;

    let store = SQLiteStore::default().await;
    let card_id = store
        .find_word(&args.word)
        .await?
        .with_context(|| format!("{} is not in the catalog", args.word))?;
    let card = store.update(&args.user, card_id, rating).await?;
    println!("{}", serde_json::to_string_pretty(&card)?);
    Ok(())
}
