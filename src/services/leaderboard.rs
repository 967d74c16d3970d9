use std::{collections::BTreeSet, sync::Arc};

use time::Date;

use crate::{
    dao::{
        game_store::GameStore,
        models::{GameFilter, GameInstance, GameState, GameType, Score},
    },
    error::ServiceError,
    services::game_manager::utc_day,
};

/// Read-only views over the persisted daily challenges.
#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn GameStore>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self { store }
    }

    /// Every score recorded in the daily challenges of `day`, fastest first among equals.
    pub async fn daily_scores(&self, day: Date) -> Result<Vec<Score>, ServiceError> {
        let mut scores: Vec<Score> = self
            .daily_games()
            .await?
            .into_iter()
            .filter(|game| game.created_at().map(utc_day) == Some(day))
            .flat_map(scores_of)
            .collect();
        scores.sort_by(|a, b| {
            b.accuracy
                .total_cmp(&a.accuracy)
                .then(a.elapsed_millis.cmp(&b.elapsed_millis))
        });
        Ok(scores)
    }

    /// Consecutive days, ending today or yesterday, on which `player` finished the daily.
    pub async fn consecutive_daily_streak(
        &self,
        player: &str,
        today: Date,
    ) -> Result<u32, ServiceError> {
        let days: BTreeSet<Date> = self
            .daily_games()
            .await?
            .into_iter()
            .filter(|game| {
                matches!(&game.state, GameState::BugHunt(state)
                    if state.scores.iter().any(|score| score.player == player))
            })
            .filter_map(|game| game.created_at().map(utc_day))
            .collect();
        Ok(streak_ending(&days, today))
    }

    async fn daily_games(&self) -> Result<Vec<GameInstance>, ServiceError> {
        Ok(self
            .store
            .list_games(GameFilter {
                game_type: Some(GameType::BugHuntDaily),
                status: None,
            })
            .await?)
    }
}

fn scores_of(game: GameInstance) -> Vec<Score> {
    match game.state {
        GameState::BugHunt(state) => state.scores,
        GameState::Nim(_) => Vec::new(),
    }
}

/// Length of the run of consecutive days in `days` ending at `today`, or at yesterday
/// when today is still open.
fn streak_ending(days: &BTreeSet<Date>, today: Date) -> u32 {
    let start = if days.contains(&today) {
        Some(today)
    } else {
        today.previous_day()
    };
    let Some(mut cursor) = start else {
        return 0;
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.previous_day() {
            Some(day) => cursor = day,
            None => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{
        game_store::memory::MemoryGameStore,
        models::{BugHuntState, GameStatus},
    };
    use time::macros::date;
    use uuid::Uuid;

    fn daily(day: Date, scores: &[(&str, f64, u64)]) -> GameInstance {
        let at = day.with_hms(8, 0, 0).unwrap().assume_utc();
        GameInstance {
            instance_id: Uuid::new_v4(),
            game_type: GameType::BugHuntDaily,
            players: scores.iter().map(|(p, ..)| p.to_string()).collect(),
            state: GameState::BugHunt(BugHuntState {
                status: GameStatus::Daily,
                winners: None,
                moves: vec![],
                buggy_file_id: Some("f".into()),
                created_at: at,
                updated_at: at,
                logs: vec![],
                scores: scores
                    .iter()
                    .map(|(player, accuracy, elapsed)| Score {
                        player: player.to_string(),
                        elapsed_millis: *elapsed,
                        accuracy: *accuracy,
                    })
                    .collect(),
            }),
        }
    }

    async fn board(games: Vec<GameInstance>) -> Leaderboard {
        let store = MemoryGameStore::new();
        for game in games {
            store.save_game(game).await.unwrap();
        }
        Leaderboard::new(Arc::new(store))
    }

    #[tokio::test]
    async fn daily_scores_only_cover_the_requested_day() {
        let board = board(vec![
            daily(date!(2026 - 04 - 01), &[("ada", 1.0, 9_000)]),
            daily(
                date!(2026 - 04 - 02),
                &[("bob", 0.5, 1_000), ("ada", 1.0, 4_000), ("cy", 1.0, 2_000)],
            ),
        ])
        .await;

        let scores = board.daily_scores(date!(2026 - 04 - 02)).await.unwrap();
        let order: Vec<_> = scores.iter().map(|s| s.player.as_str()).collect();
        assert_eq!(order, ["cy", "ada", "bob"]);
        assert!(board.daily_scores(date!(2026 - 04 - 03)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn streak_counts_back_from_today_or_yesterday() {
        let board = board(vec![
            daily(date!(2026 - 03 - 29), &[("ada", 0.2, 1)]),
            daily(date!(2026 - 03 - 31), &[("ada", 1.0, 1)]),
            daily(date!(2026 - 04 - 01), &[("ada", 1.0, 1), ("bob", 1.0, 1)]),
            daily(date!(2026 - 04 - 02), &[("bob", 1.0, 1)]),
        ])
        .await;

        let today = date!(2026 - 04 - 02);
        assert_eq!(board.consecutive_daily_streak("ada", today).await.unwrap(), 2);
        assert_eq!(board.consecutive_daily_streak("bob", today).await.unwrap(), 2);
        assert_eq!(board.consecutive_daily_streak("cy", today).await.unwrap(), 0);
        assert_eq!(
            board
                .consecutive_daily_streak("ada", date!(2026 - 04 - 04))
                .await
                .unwrap(),
            0
        );
    }
}
