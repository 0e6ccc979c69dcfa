//! Per-user card scheduling state and the word catalog, stored in SQLite.

use crate::db_path;
use crate::fsrs::scheduler;
use crate::fsrs::scheduler::Card;
use crate::fsrs::scheduler::CardState;
use crate::fsrs::scheduler::Rating;
use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;
use log::info;
use serde::Serialize;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use sqlx::Sqlite;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

/// Scheduling state plus catalog entry, as handed to callers of the
/// due-card queries.
#[derive(Debug, Clone, Serialize)]
pub struct DueCard {
    pub card_id: i64,
    pub word: String,
    pub definition: String,
    pub pronunciation: String,
    pub example: String,
    #[serde(flatten)]
    pub card: Card,
}

/// Per-state card counts for one user's deck.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Stats {
    pub new: i64,
    pub learning: i64,
    pub review: i64,
    pub due: i64,
    pub total: i64,
}

/// Card store backed by an SQLite database.
#[derive(Clone)]
pub struct SQLiteStore {
    pub conn: SqlitePool, /* we need to keep a connection opened at least for in memory
                           * database and also for cached statement(s) */
}

impl SQLiteStore {
    pub async fn default() -> Self {
        Self::new(db_path()).await.unwrap()
    }

    async fn new(path: PathBuf) -> Result<Self> {
        if !Sqlite::database_exists(path.to_str().unwrap()).await? {
            Sqlite::create_database(path.to_str().unwrap()).await?;
        }
        let conn = conn(&path).await?;
        let mut store = Self { conn };
        store.check_schema().await?;
        Ok(store)
    }

    async fn check_schema(&mut self) -> Result<()> {
        let user_version = &sqlx::query("pragma user_version;")
            .fetch_all(&self.conn)
            .await?[0];
        let user_version: i32 = user_version.get(0);

        if user_version <= 0 {
            sqlx::raw_sql(
                "
BEGIN EXCLUSIVE;
PRAGMA auto_vacuum = INCREMENTAL;
CREATE TABLE flashcard (
    id INTEGER PRIMARY KEY NOT NULL,
    word TEXT NOT NULL UNIQUE,
    definition TEXT NOT NULL,
    pronunciation TEXT NOT NULL DEFAULT '',
    example TEXT NOT NULL DEFAULT ''
) STRICT;
CREATE TABLE user_card (
    user_id TEXT NOT NULL,
    card_id INTEGER NOT NULL,
    state TEXT NOT NULL,
    stability REAL NOT NULL,
    difficulty REAL NOT NULL,
    due TEXT NOT NULL,
    last_review TEXT NOT NULL,
    PRIMARY KEY (user_id, card_id),
    FOREIGN KEY (card_id) REFERENCES flashcard(id) ON DELETE CASCADE
) STRICT;
CREATE INDEX user_card_due ON user_card(user_id, due);
PRAGMA user_version = 1;
COMMIT;
                 ",
            )
            .execute(&self.conn)
            .await?;
        }
        sqlx::query("pragma foreign_keys = 1;")
            .execute(&self.conn)
            .await?;
        Ok(())
    }

    /// Add a word to the catalog. Returns false if the word already exists.
    pub async fn add_word(
        &self,
        word: &str,
        definition: &str,
        pronunciation: &str,
        example: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO flashcard (word, definition, pronunciation, example) VALUES ($1, $2, $3, $4) ON CONFLICT(word) DO NOTHING;",
        )
        .bind(word)
        .bind(definition)
        .bind(pronunciation)
        .bind(example)
        .execute(&self.conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn find_word(&self, word: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT id FROM flashcard WHERE word = $1;")
            .bind(word)
            .fetch_optional(&self.conn)
            .await?;
        Ok(row.map(|row| row.get(0)))
    }

    /// Upsert one user's scheduling state for one card. The primary key on
    /// (user_id, card_id) keeps at most one state per pair.
    pub async fn save_card(&self, user_id: &str, card_id: i64, card: &Card) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO user_card (user_id, card_id, state, stability, difficulty, due, last_review) VALUES ($1, $2, $3, $4, $5, $6, $7);",
        )
        .bind(user_id)
        .bind(card_id)
        .bind(card.state.as_str())
        .bind(card.stability)
        .bind(card.difficulty)
        .bind(ts(card.due))
        .bind(ts(card.last_review))
        .execute(&self.conn)
        .await?;
        Ok(())
    }

    /// Cards due at `now`, oldest due first, joined with the catalog.
    pub async fn due_cards(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<DueCard>> {
        sqlx::query(
            "SELECT f.id, f.word, f.definition, f.pronunciation, f.example,
                    u.state, u.stability, u.difficulty, u.due, u.last_review
             FROM user_card u JOIN flashcard f ON f.id = u.card_id
             WHERE u.user_id = $1 AND u.due <= $2
             ORDER BY u.due ASC LIMIT $3;",
        )
        .bind(user_id)
        .bind(ts(now))
        .bind(limit)
        .fetch_all(&self.conn)
        .await?
        .iter()
        .map(due_card_from_row)
        .collect()
    }

    /// Submit one review: fetch the stored state, run the scheduler, persist
    /// the result. The read-modify-write runs in a single transaction so two
    /// concurrent reviews of the same card cannot drop an update.
    pub async fn review(
        &self,
        user_id: &str,
        card_id: i64,
        rating: Rating,
        now: DateTime<Utc>,
    ) -> Result<Card> {
        let mut tx = self.conn.begin().await?;
        let row = sqlx::query(
            "SELECT state, stability, difficulty, due, last_review FROM user_card WHERE user_id = $1 AND card_id = $2;",
        )
        .bind(user_id)
        .bind(card_id)
        .fetch_optional(&mut *tx)
        .await?;
        let old = row
            .as_ref()
            .map(card_from_row)
            .transpose()?
            .with_context(|| format!("card {card_id} is not scheduled for user {user_id}"))?;

        let card = scheduler::schedule(&old, rating, now);
        sqlx::query(
            "UPDATE user_card SET state = $3, stability = $4, difficulty = $5, due = $6, last_review = $7 WHERE user_id = $1 AND card_id = $2;",
        )
        .bind(user_id)
        .bind(card_id)
        .bind(card.state.as_str())
        .bind(card.stability)
        .bind(card.difficulty)
        .bind(ts(card.due))
        .bind(ts(card.last_review))
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!("{user_id} rated card {card_id} {rating:?}, next due {}", card.due);
        Ok(card)
    }

    /// Start learning up to `count` catalog words the user is not studying
    /// yet, alphabetically. Each gets a fresh, immediately-due state.
    pub async fn learn_new_cards(
        &self,
        user_id: &str,
        count: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<DueCard>> {
        let mut tx = self.conn.begin().await?;
        let rows = sqlx::query(
            "SELECT id, word, definition, pronunciation, example FROM flashcard
             WHERE id NOT IN (SELECT card_id FROM user_card WHERE user_id = $1)
             ORDER BY word ASC LIMIT $2;",
        )
        .bind(user_id)
        .bind(count)
        .fetch_all(&mut *tx)
        .await?;

        let mut learned = Vec::with_capacity(rows.len());
        for row in &rows {
            let card = Card::new(now);
            let card_id: i64 = row.try_get("id")?;
            sqlx::query(
                "INSERT INTO user_card (user_id, card_id, state, stability, difficulty, due, last_review) VALUES ($1, $2, $3, $4, $5, $6, $7);",
            )
            .bind(user_id)
            .bind(card_id)
            .bind(card.state.as_str())
            .bind(card.stability)
            .bind(card.difficulty)
            .bind(ts(card.due))
            .bind(ts(card.last_review))
            .execute(&mut *tx)
            .await?;
            learned.push(DueCard {
                card_id,
                word: row.try_get("word")?,
                definition: row.try_get("definition")?,
                pronunciation: row.try_get("pronunciation")?,
                example: row.try_get("example")?,
                card,
            });
        }
        tx.commit().await?;

        info!("{user_id} started learning {} new cards", learned.len());
        Ok(learned)
    }

    pub async fn stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<Stats> {
        let row = sqlx::query(
            "SELECT
                COALESCE(SUM(state = 'new'), 0),
                COALESCE(SUM(state = 'learning' OR state = 'relearning'), 0),
                COALESCE(SUM(state = 'review'), 0),
                COALESCE(SUM(due <= $2), 0),
                COUNT(*)
             FROM user_card WHERE user_id = $1;",
        )
        .bind(user_id)
        .bind(ts(now))
        .fetch_one(&self.conn)
        .await?;
        Ok(Stats {
            new: row.get(0),
            learning: row.get(1),
            review: row.get(2),
            due: row.get(3),
            total: row.get(4),
        })
    }
}

pub async fn conn(path: &Path) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(path.to_str().unwrap())?;
    Ok(SqlitePoolOptions::new().connect_with(options).await?)
}

/* Timestamps are persisted as RFC 3339 text at millisecond resolution, in
one uniform format, so `due <= now` comparisons in SQL work on the plain
column value. */

pub(crate) fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

pub(crate) fn card_from_row(row: &SqliteRow) -> Result<Card> {
    let state: &str = row.try_get("state")?;
    Ok(Card {
        state: CardState::from_str(state).with_context(|| format!("bad card state {state:?}"))?,
        stability: row.try_get("stability")?,
        difficulty: row.try_get("difficulty")?,
        due: parse_ts(row.try_get("due")?)?,
        last_review: parse_ts(row.try_get("last_review")?)?,
    })
}

pub(crate) fn due_card_from_row(row: &SqliteRow) -> Result<DueCard> {
    Ok(DueCard {
        card_id: row.try_get("id")?,
        word: row.try_get("word")?,
        definition: row.try_get("definition")?,
        pronunciation: row.try_get("pronunciation")?,
        example: row.try_get("example")?,
        card: card_from_row(row)?,
    })
}
