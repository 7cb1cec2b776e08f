//! Guess classification and time-based scoring.

use serde::{Deserialize, Serialize};
use sketchroom_protocol::Classification;
use tracing::warn;

// ---------------------------------------------------------------------------
// Guess evaluation
// ---------------------------------------------------------------------------

/// Result of comparing a guess to the secret word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub exact: bool,
    /// Only ever `true` when `exact` is `false`.
    pub close: bool,
}

impl Evaluation {
    pub fn classification(&self) -> Classification {
        if self.exact {
            Classification::Exact
        } else if self.close {
            Classification::Close
        } else {
            Classification::Wrong
        }
    }
}

/// Classifies `guess` against `secret`, ignoring case and surrounding
/// whitespace.
///
/// Closeness counts positional character mismatches over the overlapping
/// length plus the length difference. The guess is close when that count
/// is at most 1 for secrets of up to 6 characters, or at most 2 for longer
/// ones. This is a positional approximation, not an edit distance: an
/// extra leading character shifts every later comparison, so `"xapple"`
/// is not close to `"apple"`.
pub fn evaluate(secret: &str, guess: &str) -> Evaluation {
    let secret: Vec<char> = secret.trim().to_lowercase().chars().collect();
    let guess: Vec<char> = guess.trim().to_lowercase().chars().collect();

    if secret == guess {
        return Evaluation {
            exact: true,
            close: false,
        };
    }
    if guess.is_empty() {
        return Evaluation {
            exact: false,
            close: false,
        };
    }

    let positional = secret
        .iter()
        .zip(guess.iter())
        .filter(|(a, b)| a != b)
        .count();
    let mismatches = positional + secret.len().abs_diff(guess.len());
    let threshold = if secret.len() <= 6 { 1 } else { 2 };

    Evaluation {
        exact: false,
        close: mismatches <= threshold,
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// One breakpoint: strictly more than `above_secs` remaining earns `points`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStep {
    pub above_secs: u32,
    pub points: u32,
}

/// Step function from seconds remaining to points for a correct guess.
///
/// Default: `>60 → 100, >40 → 80, >20 → 60, >1 → 40, else 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    steps: Vec<ScoreStep>,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::new(vec![
            ScoreStep { above_secs: 60, points: 100 },
            ScoreStep { above_secs: 40, points: 80 },
            ScoreStep { above_secs: 20, points: 60 },
            ScoreStep { above_secs: 1, points: 40 },
        ])
    }
}

impl ScoreTable {
    pub fn new(steps: Vec<ScoreStep>) -> Self {
        Self { steps }.validated()
    }

    /// Sorts breakpoints from the highest threshold down and lowers any
    /// step that would pay more than a higher one, so the table is
    /// monotonic in remaining time.
    pub fn validated(mut self) -> Self {
        self.steps.sort_by(|a, b| b.above_secs.cmp(&a.above_secs));
        self.steps.dedup_by_key(|s| s.above_secs);

        let mut ceiling = u32::MAX;
        for step in &mut self.steps {
            if step.points > ceiling {
                warn!(
                    above_secs = step.above_secs,
                    points = step.points,
                    max = ceiling,
                    "score step pays more than a faster guess; clamping"
                );
                step.points = ceiling;
            }
            ceiling = step.points;
        }
        self
    }

    pub fn score(&self, seconds_remaining: u32) -> u32 {
        self.steps
            .iter()
            .find(|s| seconds_remaining > s.above_secs)
            .map_or(0, |s| s.points)
    }

    pub fn steps(&self) -> &[ScoreStep] {
        &self.steps
    }
}
