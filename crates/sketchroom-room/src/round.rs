//! One drawing turn: the drawer, what they were offered and what they chose.

use std::collections::HashSet;

use sketchroom_protocol::{PlayerId, WordChoice};
use tokio::time::Instant;

use crate::reveal;

#[derive(Debug, Clone)]
pub struct Round {
    /// Rotation number this turn belongs to (1-based).
    pub number: u32,
    pub drawer: PlayerId,
    pub candidates: Vec<WordChoice>,
    /// Set when the drawing phase begins.
    pub word: Option<WordChoice>,
    /// Revealed character indices, in reveal order.
    pub revealed: Vec<usize>,
    /// Reveal steps that already fired this turn.
    pub(crate) fired_steps: HashSet<usize>,
    pub started_at: Instant,
}

impl Round {
    pub fn new(number: u32, drawer: PlayerId, candidates: Vec<WordChoice>) -> Self {
        Self {
            number,
            drawer,
            candidates,
            word: None,
            revealed: Vec::new(),
            fired_steps: HashSet::new(),
            started_at: Instant::now(),
        }
    }

    /// The offered candidate matching `word`, ignoring case and surrounding
    /// whitespace.
    pub fn candidate(&self, word: &str) -> Option<&WordChoice> {
        let wanted = word.trim().to_lowercase();
        self.candidates
            .iter()
            .find(|c| c.word.to_lowercase() == wanted)
    }

    pub fn is_drawer(&self, player_id: &PlayerId) -> bool {
        &self.drawer == player_id
    }

    /// The chosen word as guessers currently see it.
    pub fn mask(&self) -> Option<String> {
        self.word
            .as_ref()
            .map(|w| reveal::mask(&w.word, &self.revealed))
    }
}
