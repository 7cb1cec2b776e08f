//! Word supply and guess judging for Sketchroom.
//!
//! - [`WordProvider`] hands the drawer a batch of candidates, skipping
//!   words the room has already played. [`WordBank`] samples the built-in
//!   or a user-supplied list; [`FixedWords`] is deterministic.
//! - [`evaluate`] classifies a guess as exact, close or wrong.
//! - [`ScoreTable`] turns seconds remaining into points.

mod builtin;
mod error;
mod evaluate;
mod provider;

pub use error::WordError;
pub use evaluate::{Evaluation, ScoreStep, ScoreTable, evaluate};
pub use provider::{FixedWords, WordBank, WordProvider};
