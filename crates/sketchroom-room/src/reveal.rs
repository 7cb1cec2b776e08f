//! Progressive letter reveal during the drawing phase.
//!
//! A [`RevealSchedule`] is a list of steps, each firing once when the
//! fraction of the turn still remaining drops to its threshold. Indices are
//! character positions; only alphabetic characters are ever hidden or
//! revealed. A reveal never uncovers the last hidden letter.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What a reveal step uncovers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealTarget {
    FirstVowel,
    /// A random hidden letter not adjacent to any revealed one.
    RandomLetter,
    LastVowel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealStep {
    /// Fires once `remaining / turn` is at or below this value.
    pub at_fraction: f64,
    pub target: RevealTarget,
    /// Skip unless the word has at least this many letters.
    #[serde(default)]
    pub min_letters: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevealSchedule {
    steps: Vec<RevealStep>,
}

impl Default for RevealSchedule {
    fn default() -> Self {
        Self::new(vec![
            RevealStep {
                at_fraction: 0.70,
                target: RevealTarget::FirstVowel,
                min_letters: 0,
            },
            RevealStep {
                at_fraction: 0.50,
                target: RevealTarget::RandomLetter,
                min_letters: 5,
            },
            RevealStep {
                at_fraction: 0.35,
                target: RevealTarget::RandomLetter,
                min_letters: 8,
            },
            RevealStep {
                at_fraction: 0.15,
                target: RevealTarget::LastVowel,
                min_letters: 0,
            },
        ])
    }
}

impl RevealSchedule {
    pub fn new(steps: Vec<RevealStep>) -> Self {
        Self { steps }.validated()
    }

    /// No reveals at all.
    pub fn disabled() -> Self {
        Self { steps: Vec::new() }
    }

    /// Clamps fractions into `[0, 1]` and orders steps from the earliest
    /// (highest fraction) to the latest.
    pub fn validated(mut self) -> Self {
        for step in &mut self.steps {
            if !(0.0..=1.0).contains(&step.at_fraction) {
                warn!(at_fraction = step.at_fraction, "reveal threshold outside [0, 1]; clamping");
                step.at_fraction = if step.at_fraction.is_nan() {
                    0.0
                } else {
                    step.at_fraction.clamp(0.0, 1.0)
                };
            }
        }
        self.steps
            .sort_by(|a, b| b.at_fraction.total_cmp(&a.at_fraction));
        self
    }

    pub fn steps(&self) -> &[RevealStep] {
        &self.steps
    }

    /// Indices of steps that are due at `remaining_fraction` and not yet in
    /// `fired`, in schedule order.
    pub fn due(&self, remaining_fraction: f64, fired: &HashSet<usize>) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(i, step)| !fired.contains(i) && remaining_fraction <= step.at_fraction)
            .map(|(i, _)| i)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Letter selection
// ---------------------------------------------------------------------------

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Number of alphabetic characters in `word`.
pub fn letter_count(word: &str) -> usize {
    word.chars().filter(|c| c.is_alphabetic()).count()
}

/// `word` with every unrevealed letter replaced by `_`.
pub fn mask(word: &str, revealed: &[usize]) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if c.is_alphabetic() && !revealed.contains(&i) {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Picks the next character index to reveal for `step`, or `None` when the
/// step has nothing suitable to uncover.
pub fn pick<R: Rng + ?Sized>(
    step: &RevealStep,
    word: &str,
    revealed: &[usize],
    rng: &mut R,
) -> Option<(usize, char)> {
    let chars: Vec<char> = word.chars().collect();
    let hidden: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(i, c)| c.is_alphabetic() && !revealed.contains(i))
        .map(|(i, _)| i)
        .collect();

    if letter_count(word) < step.min_letters || hidden.len() <= 1 {
        return None;
    }

    let index = match step.target {
        RevealTarget::FirstVowel => hidden.iter().copied().find(|&i| is_vowel(chars[i])),
        RevealTarget::LastVowel => hidden.iter().copied().rev().find(|&i| is_vowel(chars[i])),
        RevealTarget::RandomLetter => {
            let spaced: Vec<usize> = hidden
                .iter()
                .copied()
                .filter(|&i| !revealed.iter().any(|&r| r.abs_diff(i) <= 1))
                .collect();
            spaced.choose(rng).copied()
        }
    }?;

    Some((index, chars[index]))
}
