//! FSRS scheduling core: from a card's memory state and a recall rating,
//! compute the next memory state and due date.
//!
//! <https://github.com/open-spaced-repetition/fsrs4anki>

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Tuned FSRS parameters. Indices 4, 5 and 7 are not read by the formulas
/// below but keep their slots so the indexing matches the published vector.
pub const W: [f64; 17] = [
    0.4, 0.6, 2.4, 5.8, 4.93, 0.94, 0.86, 0.01, 1.49, 0.14, 0.94, 2.18, 0.05, 0.34, 1.26, 0.29,
    2.61,
];

/// Target recall probability at review time.
const REQUESTED_RETENTION: f64 = 0.9;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Learner's self-reported recall quality for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    /// Ratings arrive from outside as integers; anything outside 1..=4 is
    /// rejected here, before the scheduler sees it.
    pub fn from_i64(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl CardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Review => "review",
            Self::Relearning => "relearning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "review" => Some(Self::Review),
            "relearning" => Some(Self::Relearning),
            _ => None,
        }
    }
}

/// Per-(user, card) scheduling state. The store persists exactly this; the
/// scheduler never sees anything else.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub state: CardState,
    /// modeled days until recall probability decays to ~90%
    pub stability: f64,
    /// intrinsic recall difficulty, clamped to [1, 10]
    pub difficulty: f64,
    pub due: DateTime<Utc>,
    pub last_review: DateTime<Utc>,
}

impl Card {
    /// A card that has never been reviewed. It is due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: CardState::New,
            stability: 0.0,
            difficulty: 5.0,
            due: now,
            last_review: now,
        }
    }
}

/// Compute the schedule after the learner answered `rating` at `now`.
///
/// Pure and total: no clock access, no I/O. Stability is computed first,
/// from the pre-update difficulty; the interval comes from the new stability.
pub fn schedule(card: &Card, rating: Rating, now: DateTime<Utc>) -> Card {
    let stability = next_stability(card, rating, now);
    let difficulty = next_difficulty(card.difficulty, rating);
    let interval = next_interval(stability);
    let due = now + Duration::milliseconds((interval * MILLIS_PER_DAY) as i64);

    let state = match (card.state, rating) {
        (CardState::New, Rating::Again) => CardState::Learning,
        (_, Rating::Again) => CardState::Relearning,
        (CardState::New | CardState::Learning | CardState::Relearning, _) => CardState::Review,
        (CardState::Review, _) => CardState::Review,
    };

    Card {
        state,
        stability,
        difficulty,
        due,
        last_review: now,
    }
}

fn next_stability(card: &Card, rating: Rating, now: DateTime<Utc>) -> f64 {
    if card.state == CardState::New {
        // first review: rating picks one of four seed stabilities
        return W[rating as usize - 1];
    }

    let elapsed = days_between(card.last_review, now);
    let retrievability = (1.0 + elapsed / (9.0 * card.stability)).recip();

    if rating == Rating::Again {
        // lapse: stability collapses, the more surprising the lapse the harder
        return W[11]
            * card.difficulty.powf(-W[12])
            * ((card.stability + 1.0).powf(W[13]) - 1.0)
            * (W[14] * (1.0 - retrievability)).exp();
    }

    let hard_penalty = if rating == Rating::Hard { W[15] } else { 1.0 };
    let easy_bonus = if rating == Rating::Easy { W[16] } else { 1.0 };

    card.stability
        * (1.0
            + W[8].exp()
                * (11.0 - card.difficulty)
                * card.stability.powf(-W[9])
                * (((1.0 - retrievability) * W[10]).exp() - 1.0)
                * hard_penalty
                * easy_bonus)
}

fn next_difficulty(difficulty: f64, rating: Rating) -> f64 {
    let delta = W[6] * (rating as i64 as f64 - 3.0);
    (difficulty - delta).clamp(1.0, 10.0)
}

/// Days until retrievability decays to the requested retention.
fn next_interval(stability: f64) -> f64 {
    9.0 * stability / REQUESTED_RETENTION * (1.0 / REQUESTED_RETENTION - 1.0)
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn new_card_is_immediately_due() {
        let card = Card::new(t0());
        assert_eq!(card.state, CardState::New);
        assert_eq!(card.stability, 0.0);
        assert_eq!(card.difficulty, 5.0);
        assert!(card.due <= t0());
        assert_eq!(card.last_review, t0());
    }

    #[test]
    fn first_review_seeds_stability_from_rating() {
        let card = Card::new(t0());
        assert_eq!(schedule(&card, Rating::Again, t0()).stability, W[0]);
        assert_eq!(schedule(&card, Rating::Hard, t0()).stability, W[1]);
        assert_eq!(schedule(&card, Rating::Good, t0()).stability, W[2]);
        assert_eq!(schedule(&card, Rating::Easy, t0()).stability, W[3]);
        assert_eq!(schedule(&card, Rating::Good, t0()).stability, 2.4);
    }

    #[test]
    fn state_machine() {
        let new = Card::new(t0());
        assert_eq!(schedule(&new, Rating::Again, t0()).state, CardState::Learning);
        assert_eq!(schedule(&new, Rating::Good, t0()).state, CardState::Review);

        let learning = schedule(&new, Rating::Again, t0());
        assert_eq!(
            schedule(&learning, Rating::Again, t0()).state,
            CardState::Relearning
        );
        assert_eq!(
            schedule(&learning, Rating::Good, t0()).state,
            CardState::Review
        );

        let review = schedule(&new, Rating::Good, t0());
        assert_eq!(
            schedule(&review, Rating::Again, t0()).state,
            CardState::Relearning
        );
        assert_eq!(schedule(&review, Rating::Good, t0()).state, CardState::Review);

        let relearning = schedule(&review, Rating::Again, t0());
        assert_eq!(
            schedule(&relearning, Rating::Good, t0()).state,
            CardState::Review
        );
    }

    #[test]
    fn lapse_collapses_stability() {
        let card = Card {
            state: CardState::Review,
            stability: 10.0,
            difficulty: 5.0,
            due: t0() + Duration::days(11),
            last_review: t0(),
        };
        let now = t0() + Duration::days(5);
        let next = schedule(&card, Rating::Again, now);
        assert_eq!(next.state, CardState::Relearning);
        assert!(next.stability > 0.0);
        assert!(next.stability < card.stability);
    }

    #[test]
    fn repeated_easy_grows_stability_and_erodes_difficulty() {
        let mut card = schedule(&Card::new(t0()), Rating::Good, t0());
        for _ in 0..8 {
            let next = schedule(&card, Rating::Easy, card.due);
            assert!(next.stability > card.stability);
            assert!(next.difficulty <= card.difficulty);
            assert!(next.difficulty >= 1.0);
            card = next;
        }
        assert_eq!(card.difficulty, 1.0);
    }

    #[test]
    fn difficulty_stays_clamped() {
        let mut card = schedule(&Card::new(t0()), Rating::Good, t0());
        card.difficulty = 10.0;
        for _ in 0..5 {
            card = schedule(&card, Rating::Again, card.due);
            assert!(card.difficulty <= 10.0);
        }
        card.difficulty = 1.0;
        for _ in 0..5 {
            card = schedule(&card, Rating::Easy, card.due);
            assert!(card.difficulty >= 1.0);
        }
    }

    #[test]
    fn due_never_precedes_the_review() {
        let mut card = Card::new(t0());
        for rating in [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy] {
            let now = card.due + Duration::hours(3);
            let next = schedule(&card, rating, now);
            assert!(next.due >= now);
            assert!(next.stability >= 0.0);
            assert_eq!(next.last_review, now);
            card = next;
        }
    }

    #[test]
    fn good_on_new_card_lands_a_couple_of_days_out() {
        let next = schedule(&Card::new(t0()), Rating::Good, t0());
        let days = (next.due - t0()).num_days();
        assert!((2..3).contains(&days));
    }

    #[test]
    fn deterministic_for_fixed_inputs() {
        let card = Card {
            state: CardState::Review,
            stability: 3.7,
            difficulty: 6.2,
            due: t0() + Duration::days(4),
            last_review: t0(),
        };
        let now = t0() + Duration::days(3);
        assert_eq!(
            schedule(&card, Rating::Hard, now),
            schedule(&card, Rating::Hard, now)
        );
    }

    #[test]
    fn different_review_times_give_different_schedules() {
        let card = schedule(&Card::new(t0()), Rating::Good, t0());
        let a = schedule(&card, Rating::Good, t0() + Duration::days(1));
        let b = schedule(&card, Rating::Good, t0() + Duration::days(2));
        assert_ne!(a.stability, b.stability);
        assert_ne!(a.due, b.due);
    }

    #[test]
    fn fractional_elapsed_days_count() {
        let card = schedule(&Card::new(t0()), Rating::Good, t0());
        let a = schedule(&card, Rating::Good, t0() + Duration::hours(36));
        let b = schedule(&card, Rating::Good, t0() + Duration::hours(37));
        assert_ne!(a.stability, b.stability);
    }

    #[test]
    fn rating_from_i64_rejects_out_of_range() {
        assert_eq!(Rating::from_i64(1), Some(Rating::Again));
        assert_eq!(Rating::from_i64(4), Some(Rating::Easy));
        assert_eq!(Rating::from_i64(0), None);
        assert_eq!(Rating::from_i64(5), None);
    }
}
