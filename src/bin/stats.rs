use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use shadow_rs::shadow;
use vocab_reviewer::fsrs::sqlite_store::SQLiteStore;

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
    let stats = store.stats(&args.user, Utc::now()).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
