use crate::fsrs::scheduler::Card;
use crate::fsrs::scheduler::Rating;
use crate::fsrs::sqlite_store::card_from_row;
use crate::fsrs::sqlite_store::due_card_from_row;
use crate::fsrs::sqlite_store::ts;
use crate::fsrs::sqlite_store::DueCard;
use crate::fsrs::sqlite_store::SQLiteStore;
use crate::spaced_repetition::SpacedRepetition;
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

pub mod scheduler;
pub mod sqlite_store;

impl SpacedRepetition for SQLiteStore {
    async fn next_to_review(&self, user_id: &str) -> Result<Option<DueCard>> {
        let row = sqlx::query(
            "SELECT f.id, f.word, f.definition, f.pronunciation, f.example,
                    u.state, u.stability, u.difficulty, u.due, u.last_review
             FROM user_card u JOIN flashcard f ON f.id = u.card_id
             WHERE u.user_id = $1 AND u.due <= $2
             ORDER BY RANDOM() LIMIT 1;",
        )
        .bind(user_id)
        .bind(ts(Utc::now()))
        .fetch_optional(&self.conn)
        .await?;
        row.as_ref().map(due_card_from_row).transpose()
    }

    async fn update(&self, user_id: &str, card_id: i64, rating: Rating) -> Result<Card> {
        self.review(user_id, card_id, rating, Utc::now()).await
    }

    async fn delete(&self, user_id: &str, card_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM user_card WHERE user_id = $1 AND card_id = $2;")
            .bind(user_id)
            .bind(card_id)
            .execute(&self.conn)
            .await?;
        Ok(())
    }
}

/// Fetch one user's scheduling state for one card.
pub async fn get_card(pool: &SqlitePool, user_id: &str, card_id: i64) -> Result<Option<Card>> {
    let row = sqlx::query(
        "SELECT state, stability, difficulty, due, last_review FROM user_card WHERE user_id = $1 AND card_id = $2;",
    )
    .bind(user_id)
    .bind(card_id)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(card_from_row).transpose()
}
