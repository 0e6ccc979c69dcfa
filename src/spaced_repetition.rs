use crate::fsrs::scheduler::Card;
use crate::fsrs::scheduler::Rating;
use crate::fsrs::sqlite_store::DueCard;
use anyhow::Result;

pub trait SpacedRepetition: Sized {
    /// find next card due for review; None when the deck is caught up
    async fn next_to_review(&self, user_id: &str) -> Result<Option<DueCard>>;

    async fn update(&self, user_id: &str, card_id: i64, rating: Rating) -> Result<Card>;

    async fn delete(&self, user_id: &str, card_id: i64) -> Result<()>;
}
