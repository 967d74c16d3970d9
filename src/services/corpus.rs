use std::{collections::BTreeSet, sync::Arc};

use rand::{Rng, seq::IndexedRandom};
use tracing::{debug, info};

use crate::{
    dao::{game_store::GameStore, models::BuggyFileEntity},
    dto::game::SafeBuggyFile,
    error::ServiceError,
};

/// Store-backed access to the buggy-file corpus.
#[derive(Clone)]
pub struct Corpus {
    store: Arc<dyn GameStore>,
}

impl Corpus {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Player-safe view of a file, `None` when unknown.
    pub async fn get_buggy_file(&self, id: &str) -> Result<Option<SafeBuggyFile>, ServiceError> {
        Ok(self.load_file(id).await?.map(Into::into))
    }

    /// Every file with its answer key; never hand this to players.
    pub async fn all_files(&self) -> Result<Vec<BuggyFileEntity>, ServiceError> {
        Ok(self.store.list_buggy_files().await?)
    }

    pub(crate) async fn load_file(&self, id: &str) -> Result<Option<BuggyFileEntity>, ServiceError> {
        Ok(self.store.find_buggy_file(id.to_owned()).await?)
    }

    /// The guessed lines that are actual defects, `None` when the file is unknown.
    pub async fn compare_lines(
        &self,
        id: &str,
        guessed: &[u32],
    ) -> Result<Option<Vec<u32>>, ServiceError> {
        Ok(self
            .load_file(id)
            .await?
            .map(|file| correct_subset(&file, guessed)))
    }

    /// A clean, non-trivial line the player has not seen yet.
    pub async fn hint_line<R: Rng + ?Sized>(
        &self,
        id: &str,
        known: &BTreeSet<u32>,
        rng: &mut R,
    ) -> Result<Option<u32>, ServiceError> {
        let Some(file) = self.load_file(id).await? else {
            return Err(ServiceError::NotFound(format!("buggy file `{id}` not found")));
        };
        Ok(pick_hint_line(&file, known, rng))
    }

    /// Insert `files` when the corpus is empty; returns how many were written.
    pub async fn seed(&self, files: Vec<BuggyFileEntity>) -> Result<usize, ServiceError> {
        let existing = self.store.list_buggy_files().await?;
        if !existing.is_empty() {
            debug!(count = existing.len(), "corpus already populated; seed skipped");
            return Ok(0);
        }

        let count = files.len();
        for file in files {
            self.store.save_buggy_file(file).await?;
        }
        info!(count, "seeded buggy-file corpus");
        Ok(count)
    }
}

/// Intersection of the guess with the defect lines, in guess order without repeats.
pub fn correct_subset(file: &BuggyFileEntity, guessed: &[u32]) -> Vec<u32> {
    let mut seen = BTreeSet::new();
    guessed
        .iter()
        .copied()
        .filter(|line| file.buggy_lines.contains(line) && seen.insert(*line))
        .collect()
}

/// Lines that carry no information: blank, punctuation only, or opening a block.
pub fn is_trivial_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.ends_with('{')
        || trimmed
            .chars()
            .all(|c| matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ',' | '.'))
}

/// Uniform pick among the eligible lines (1-based), `None` when all are exhausted.
pub fn pick_hint_line<R: Rng + ?Sized>(
    file: &BuggyFileEntity,
    known: &BTreeSet<u32>,
    rng: &mut R,
) -> Option<u32> {
    let eligible: Vec<u32> = file
        .code
        .lines()
        .zip(1u32..)
        .filter(|(text, number)| {
            !is_trivial_line(text)
                && !file.buggy_lines.contains(number)
                && !known.contains(number)
        })
        .map(|(_, number)| number)
        .collect();
    eligible.choose(rng).copied()
}
