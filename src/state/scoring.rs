//! Accuracy and win computation for BugHunt guesses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dao::models::BugHuntMove;

/// How a player's guesses are judged for the win.
///
/// Both rules grade a single guess on its precision; they differ in what counts as
/// finding the defects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringRule {
    /// Any number of lines; defects found accumulate over the player's guesses.
    #[default]
    FreeForm,
    /// Every guess names exactly as many lines as there are defects and only the
    /// latest guess counts towards the win.
    ExactCount,
}

/// Share of the selected lines that are actual defects, in `[0, 1]`.
pub fn move_correctness(selected: &[u32], defects: &BTreeSet<u32>) -> f64 {
    if selected.is_empty() {
        return 0.0;
    }
    let hits = selected.iter().filter(|line| defects.contains(*line)).count();
    hits as f64 / selected.len() as f64
}

/// Aggregate of one player's moves in a match.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub guesses: u32,
    pub hints: u32,
    correctness_sum: f64,
    /// Correctness used for the win check.
    pub cumulative: f64,
}

impl Progress {
    /// Fold a player's moves, in submission order.
    pub fn of<'a>(
        rule: ScoringRule,
        defects: &BTreeSet<u32>,
        moves: impl IntoIterator<Item = &'a BugHuntMove>,
    ) -> Self {
        let mut progress = Progress::default();
        let mut found: BTreeSet<u32> = BTreeSet::new();

        for guess in moves {
            if guess.is_hint {
                progress.hints += 1;
                continue;
            }
            let correctness = move_correctness(&guess.selected_lines, defects);
            progress.guesses += 1;
            progress.correctness_sum += correctness;
            progress.cumulative = match rule {
                ScoringRule::FreeForm => {
                    found.extend(
                        guess
                            .selected_lines
                            .iter()
                            .filter(|line| defects.contains(*line)),
                    );
                    if defects.is_empty() {
                        0.0
                    } else {
                        found.len() as f64 / defects.len() as f64
                    }
                }
                ScoringRule::ExactCount => correctness,
            };
        }

        progress
    }

    /// Mean guess correctness plus the hint penalties, floored at zero.
    pub fn accuracy(&self, hint_penalty: f64) -> f64 {
        let mean = if self.guesses == 0 {
            0.0
        } else {
            self.correctness_sum / f64::from(self.guesses)
        };
        (mean + f64::from(self.hints) * hint_penalty).max(0.0)
    }

    pub fn has_won(&self, threshold: f64) -> bool {
        self.cumulative >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guess(lines: &[u32]) -> BugHuntMove {
        BugHuntMove {
            selected_lines: lines.to_vec(),
            is_hint: false,
        }
    }

    fn hint(line: u32) -> BugHuntMove {
        BugHuntMove {
            selected_lines: vec![line],
            is_hint: true,
        }
    }

    fn defects() -> BTreeSet<u32> {
        BTreeSet::from([2, 3, 4])
    }

    fn round2(value: f64) -> f64 {
        (value * 100.0).round() / 100.0
    }

    #[test]
    fn piecemeal_discovery_wins_with_full_precision() {
        let moves = [guess(&[2]), guess(&[3]), guess(&[4])];
        let progress = Progress::of(ScoringRule::FreeForm, &defects(), &moves);
        assert!(progress.has_won(0.97));
        assert_eq!(progress.accuracy(-0.1), 1.0);
    }

    #[test]
    fn selecting_every_line_wins_with_low_accuracy() {
        let moves = [guess(&[1, 2, 3, 4, 5, 6, 7, 8])];
        let progress = Progress::of(ScoringRule::FreeForm, &defects(), &moves);
        assert!(progress.has_won(0.97));
        assert_eq!(progress.accuracy(-0.1), 0.375);
    }

    #[test]
    fn missing_a_defect_loses() {
        let moves = [guess(&[2]), guess(&[3]), guess(&[8])];
        let progress = Progress::of(ScoringRule::FreeForm, &defects(), &moves);
        assert!(!progress.has_won(0.97));
        assert_eq!(progress.guesses, 3);
        assert_eq!(round2(progress.accuracy(-0.1)), 0.67);
    }

    #[test]
    fn hints_reduce_accuracy_but_not_guess_count() {
        let moves = [hint(6), hint(7), guess(&[2, 3, 4])];
        let progress = Progress::of(ScoringRule::FreeForm, &defects(), &moves);
        assert_eq!(progress.guesses, 1);
        assert_eq!(progress.hints, 2);
        assert!(progress.has_won(0.97));
        assert_eq!(round2(progress.accuracy(-0.1)), 0.8);
    }

    #[test]
    fn accuracy_is_floored_at_zero() {
        let moves = [hint(1), hint(5), guess(&[9])];
        let progress = Progress::of(ScoringRule::FreeForm, &defects(), &moves);
        assert_eq!(progress.accuracy(-0.1), 0.0);
    }

    #[test]
    fn exact_count_grades_each_guess_on_precision() {
        let rule = ScoringRule::ExactCount;
        assert_eq!(round2(move_correctness(&[2, 3, 9], &defects())), 0.67);

        let moves = [guess(&[2, 3, 9]), guess(&[2, 8, 9])];
        let progress = Progress::of(rule, &defects(), &moves);
        assert_eq!(round2(progress.cumulative), 0.33);
        assert!(!progress.has_won(0.97));
    }
}
