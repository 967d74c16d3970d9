use std::sync::Arc;

use dashmap::DashMap;
use rand::{SeedableRng, rngs::StdRng};
use time::{Date, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{AppConfig, GameRules},
    dao::{
        game_store::GameStore,
        models::{BugHuntMove, GameFilter, GameInstance, GameType, InstanceId, PlayerId},
    },
    dto::{
        game::{GuessRequest, HintResponse, TakeRequest},
        validation::validate_player_id,
    },
    error::ServiceError,
    services::corpus::Corpus,
    state::{
        Clock, Game, GameError, GameEvent, MovePayload, SystemClock, TransitionContext,
        compute_transition,
    },
};

/// Player recorded as starter of the daily challenge.
pub const DAILY_HOST: &str = "daily";

/// Deterministic instance id of the daily challenge for `day`.
pub fn daily_instance_id(day: Date) -> InstanceId {
    let name = format!("{}:{}", GameType::BugHuntDaily, day);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Registry of live games: the single entry point for every lifecycle operation.
///
/// Every operation on an instance runs resolve, transition and persist under that
/// instance's lock, so concurrent callers observe a serial history and a cache miss is
/// rehydrated once.
pub struct GameManager {
    store: Arc<dyn GameStore>,
    corpus: Corpus,
    rules: GameRules,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    games: DashMap<InstanceId, Game>,
    locks: DashMap<InstanceId, Arc<Mutex<()>>>,
}

impl GameManager {
    pub fn new(
        store: Arc<dyn GameStore>,
        rules: GameRules,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        Self {
            corpus: Corpus::new(store.clone()),
            store,
            rules,
            clock,
            rng: Mutex::new(rng),
            games: DashMap::new(),
            locks: DashMap::new(),
        }
    }

    /// Manager on the system clock, seeded from config when a seed is set.
    pub fn from_config(store: Arc<dyn GameStore>, config: &AppConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(store, config.rules.clone(), Arc::new(SystemClock), rng)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Drop every cached game and lock; the store is untouched.
    pub fn reset(&self) {
        self.games.clear();
        self.locks.clear();
    }

    /// Create and persist a fresh instance. A daily request resolves to today's challenge.
    pub async fn add_game(&self, game_type: GameType) -> Result<InstanceId, ServiceError> {
        if game_type == GameType::BugHuntDaily {
            let today = utc_day(self.clock.now());
            return Ok(self.daily_game(today).await?.instance_id);
        }

        let id = Uuid::new_v4();
        let game = Game::new(id, game_type, &self.rules, self.clock.now());
        if !self.store.create_game(game.to_model()).await? {
            return Err(ServiceError::Integrity(format!(
                "instance id `{id}` is already taken"
            )));
        }
        self.games.insert(id, game);
        info!(instance_id = %id, game_type = %game_type, "game created");
        Ok(id)
    }

    /// Snapshot of an instance, rehydrating it from the store when not cached.
    pub async fn get_game(&self, id: InstanceId) -> Result<Option<GameInstance>, ServiceError> {
        self.locked(id, self.snapshot_of(id)).await
    }

    pub async fn join_game(&self, id: InstanceId, player: &str) -> Result<GameInstance, ServiceError> {
        self.transition(id, GameEvent::Join(checked_player(player)?)).await
    }

    pub async fn start_game(
        &self,
        id: InstanceId,
        player: &str,
    ) -> Result<GameInstance, ServiceError> {
        self.transition(id, GameEvent::Start(checked_player(player)?))
            .await
    }

    pub async fn leave_game(
        &self,
        id: InstanceId,
        player: &str,
    ) -> Result<GameInstance, ServiceError> {
        self.transition(id, GameEvent::Leave(checked_player(player)?))
            .await
    }

    pub async fn apply_move(
        &self,
        id: InstanceId,
        player: &str,
        payload: MovePayload,
    ) -> Result<GameInstance, ServiceError> {
        self.transition(id, GameEvent::Move(checked_player(player)?, payload))
            .await
    }

    /// Validate and apply a BugHunt guess or hint.
    pub async fn submit_guess(
        &self,
        id: InstanceId,
        request: GuessRequest,
    ) -> Result<GameInstance, ServiceError> {
        request.validate()?;
        let (player, payload) = request.into_parts();
        self.transition(id, GameEvent::Move(player, payload)).await
    }

    /// Validate and apply a Nim turn.
    pub async fn submit_take(
        &self,
        id: InstanceId,
        request: TakeRequest,
    ) -> Result<GameInstance, ServiceError> {
        request.validate()?;
        let (player, payload) = request.into_parts();
        self.transition(id, GameEvent::Move(player, payload)).await
    }

    /// Reveal one clean line to `player` and record it as a hint move.
    pub async fn request_hint(
        &self,
        id: InstanceId,
        player: &str,
    ) -> Result<HintResponse, ServiceError> {
        let player = checked_player(player)?;
        self.locked(id, self.hint_locked(id, player)).await
    }

    async fn hint_locked(
        &self,
        id: InstanceId,
        player: PlayerId,
    ) -> Result<HintResponse, ServiceError> {
        let game = self
            .resolve(id)
            .await?
            .ok_or_else(ServiceError::game_not_found)?;
        if !game.status().is_active() {
            return Err(GameError::NotInProgress.into());
        }
        let file_id = game
            .buggy_file_id()
            .ok_or(GameError::FileNeverChosen)?
            .to_owned();
        if !game.players().contains(&player) {
            return Err(GameError::NotParticipant.into());
        }

        let known = game.known_lines(&player);
        let line = {
            let mut rng = self.rng.lock().await;
            self.corpus.hint_line(&file_id, &known, &mut *rng).await?
        };
        let Some(line) = line else {
            debug!(instance_id = %id, player_id = %player, "no hint line left");
            return Ok(HintResponse {
                line: None,
                game: game.to_model(),
            });
        };

        let payload = MovePayload::BugHunt(BugHuntMove {
            selected_lines: vec![line],
            is_hint: true,
        });
        let game = self
            .apply_locked(game, GameEvent::Move(player, payload))
            .await?;
        Ok(HintResponse {
            line: Some(line),
            game,
        })
    }

    /// Get or create the single daily challenge for `day`.
    pub async fn daily_game(&self, day: Date) -> Result<GameInstance, ServiceError> {
        let id = daily_instance_id(day);
        self.locked(id, self.daily_locked(id, day)).await
    }

    async fn daily_locked(&self, id: InstanceId, day: Date) -> Result<GameInstance, ServiceError> {
        if let Some(game) = self.resolve(id).await? {
            return Ok(game.to_model());
        }

        let now = self.clock.now();
        let created_at = if now.date() == day {
            now
        } else {
            day.midnight().assume_utc()
        };
        let fresh = Game::new(id, GameType::BugHuntDaily, &self.rules, created_at);
        let files = self.corpus.all_files().await?;
        let started = {
            let mut rng = self.rng.lock().await;
            let mut ctx = TransitionContext {
                rules: &self.rules,
                now: created_at,
                files: &files,
                rng: &mut *rng,
            };
            compute_transition(&fresh, &GameEvent::Start(DAILY_HOST.into()), &mut ctx)?
        };

        if self.store.create_game(started.to_model()).await? {
            info!(instance_id = %id, day = %day, file_id = ?started.buggy_file_id(), "daily challenge created");
            let snapshot = started.to_model();
            self.games.insert(id, started);
            return Ok(snapshot);
        }

        debug!(instance_id = %id, day = %day, "daily challenge created elsewhere; loading it");
        self.resolve(id)
            .await?
            .map(|game| game.to_model())
            .ok_or_else(|| ServiceError::Integrity(format!("daily challenge `{id}` vanished")))
    }

    /// Persisted instances matching `filter`, most recent first.
    pub async fn find_games(&self, filter: GameFilter) -> Result<Vec<GameInstance>, ServiceError> {
        let mut games = self.store.list_games(filter).await?;
        games.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(games)
    }

    /// Evict an instance from the cache; the stored record is kept.
    pub fn remove_game(&self, id: InstanceId) -> bool {
        let removed = self.games.remove(&id).is_some();
        self.locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
        if removed {
            debug!(instance_id = %id, "game evicted on request");
        }
        removed
    }

    /// Snapshots of every cached game.
    pub fn active_game_instances(&self) -> Vec<GameInstance> {
        self.games.iter().map(|entry| entry.value().to_model()).collect()
    }

    /// Run `work` under the instance lock. The lock entry is dropped afterwards unless
    /// the game is cached or another caller holds or awaits it.
    async fn locked<T>(
        &self,
        id: InstanceId,
        work: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        let lock = self.locks.entry(id).or_default().clone();
        let guard = lock.lock().await;
        let result = work.await;
        drop(guard);
        drop(lock);
        if !self.games.contains_key(&id) {
            self.locks
                .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
        }
        result
    }

    async fn snapshot_of(&self, id: InstanceId) -> Result<Option<GameInstance>, ServiceError> {
        Ok(self.resolve(id).await?.map(|game| game.to_model()))
    }

    /// Cached game or the rehydrated stored one. Caller holds the instance lock.
    async fn resolve(&self, id: InstanceId) -> Result<Option<Game>, ServiceError> {
        if let Some(game) = self.games.get(&id) {
            debug!(instance_id = %id, "cache hit");
            return Ok(Some(game.clone()));
        }

        let Some(instance) = self.store.find_game(id).await? else {
            return Ok(None);
        };
        let mut game = Game::from_model(instance)?;
        if let Some(file_id) = game.missing_answer().map(str::to_owned) {
            let file = self
                .corpus
                .load_file(&file_id)
                .await?
                .ok_or(GameError::AnswerUnavailable { file_id })?;
            game.restore_answer(&file)?;
        }

        if !game.is_over() {
            self.games.insert(id, game.clone());
        }
        info!(instance_id = %id, game_type = %game.game_type(), status = ?game.status(), "game rehydrated");
        Ok(Some(game))
    }

    async fn transition(
        &self,
        id: InstanceId,
        event: GameEvent,
    ) -> Result<GameInstance, ServiceError> {
        self.locked(id, self.transition_locked(id, event)).await
    }

    async fn transition_locked(
        &self,
        id: InstanceId,
        event: GameEvent,
    ) -> Result<GameInstance, ServiceError> {
        let game = self
            .resolve(id)
            .await?
            .ok_or_else(ServiceError::game_not_found)?;
        self.apply_locked(game, event).await
    }

    /// Run `event` against `game`, then cache and persist the result.
    async fn apply_locked(
        &self,
        game: Game,
        event: GameEvent,
    ) -> Result<GameInstance, ServiceError> {
        let id = game.id();
        let files = if game.corpus_needed(&event, &self.rules) {
            self.corpus.all_files().await?
        } else {
            Vec::new()
        };

        let next = {
            let mut rng = self.rng.lock().await;
            let mut ctx = TransitionContext {
                rules: &self.rules,
                now: self.clock.now(),
                files: &files,
                rng: &mut *rng,
            };
            compute_transition(&game, &event, &mut ctx)
        };
        let next = match next {
            Ok(next) => next,
            Err(err) => {
                debug!(instance_id = %id, player_id = %event.player(), event = event.label(), error = %err, "transition rejected");
                return Err(err.into());
            }
        };

        if next.status() != game.status() {
            info!(instance_id = %id, from = ?game.status(), to = ?next.status(), "status changed");
        }
        debug!(instance_id = %id, player_id = %event.player(), event = event.label(), "transition applied");

        let snapshot = next.to_model();
        let over = next.is_over();
        self.games.insert(id, next);

        if let Err(err) = self.store.save_game(snapshot.clone()).await {
            warn!(instance_id = %id, error = %err, "failed to persist game; cache is ahead of the store");
            return Err(err.into());
        }
        if over {
            self.games.remove(&id);
            info!(instance_id = %id, "finished game evicted from cache");
        }
        Ok(snapshot)
    }
}

fn checked_player(player: &str) -> Result<PlayerId, ServiceError> {
    validate_player_id(player).map_err(|err| {
        ServiceError::InvalidInput(
            err.message
                .map(|message| message.into_owned())
                .unwrap_or_else(|| err.code.into_owned()),
        )
    })?;
    Ok(player.to_owned())
}

/// Calendar day of `at` in UTC.
pub fn utc_day(at: OffsetDateTime) -> Date {
    at.to_offset(time::UtcOffset::UTC).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::{
            game_store::memory::MemoryGameStore,
            models::{BuggyFileEntity, GameState, GameStatus, NimMove},
        },
        error::GAME_NOT_FOUND,
        state::FixedClock,
    };
    use time::{Duration, macros::datetime};

    struct Fixture {
        store: MemoryGameStore,
        clock: FixedClock,
        manager: GameManager,
    }

    fn file() -> BuggyFileEntity {
        BuggyFileEntity {
            id: "triple".into(),
            code: [
                "function f(a) {",
                "  let x = a;",
                "  x = x * 3;",
                "  x = x - 1;",
                "  x = x / 0;",
                "  log(x);",
                "  return x;",
                "}",
            ]
            .join("\n"),
            description: "three defects".into(),
            buggy_lines: vec![2, 3, 4],
        }
    }

    async fn fixture(rules: GameRules) -> Fixture {
        let store = MemoryGameStore::new();
        let clock = FixedClock::new(datetime!(2026-04-02 09:00 UTC));
        let manager = GameManager::new(
            Arc::new(store.clone()),
            rules,
            Arc::new(clock.clone()),
            StdRng::seed_from_u64(11),
        );
        manager.corpus().seed(vec![file()]).await.unwrap();
        Fixture {
            store,
            clock,
            manager,
        }
    }

    fn guess(lines: &[u32]) -> MovePayload {
        MovePayload::BugHunt(BugHuntMove {
            selected_lines: lines.to_vec(),
            is_hint: false,
        })
    }

    fn bughunt(instance: &GameInstance) -> &crate::dao::models::BugHuntState {
        match &instance.state {
            GameState::BugHunt(state) => state,
            other => panic!("unexpected state {other:?}"),
        }
    }

    async fn started(fx: &Fixture, players: &[&str]) -> InstanceId {
        let id = fx.manager.add_game(GameType::BugHunt).await.unwrap();
        for player in players {
            fx.manager.join_game(id, player).await.unwrap();
        }
        fx.manager.start_game(id, players[0]).await.unwrap();
        id
    }

    #[tokio::test]
    async fn winner_recorded_while_match_continues() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada", "bob"]).await;
        fx.clock.advance(Duration::seconds(3));

        let snapshot = fx.manager.apply_move(id, "ada", guess(&[2, 3, 4])).await.unwrap();
        let state = bughunt(&snapshot);
        assert_eq!(state.winners.as_deref(), Some(&["ada".to_string()][..]));
        assert_eq!(state.scores[0].accuracy, 1.0);
        assert_eq!(state.scores[0].elapsed_millis, 3_000);
        assert_eq!(snapshot.status(), GameStatus::InProgress);

        let stored = fx.store.find_game(id).await.unwrap();
        assert_eq!(stored, Some(snapshot));
    }

    #[tokio::test]
    async fn fourth_guess_is_refused() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada", "bob"]).await;
        for _ in 0..3 {
            fx.manager.apply_move(id, "ada", guess(&[8])).await.unwrap();
        }
        let err = fx.manager.apply_move(id, "ada", guess(&[8])).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid move: player already guessed the maximum number of times"
        );
    }

    #[tokio::test]
    async fn two_hints_then_a_win_scores_point_eight() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada", "bob"]).await;

        for _ in 0..2 {
            let hint = fx.manager.request_hint(id, "ada").await.unwrap();
            let line = hint.line.unwrap();
            assert!(![2, 3, 4].contains(&line));
        }
        let snapshot = fx.manager.apply_move(id, "ada", guess(&[2, 3, 4])).await.unwrap();
        let score = &bughunt(&snapshot).scores[0];
        assert!((score.accuracy - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn exhausted_hints_record_nothing() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada"]).await;
        // Lines 5, 6 and 7 are the only clean, non-trivial ones.
        for _ in 0..3 {
            assert!(fx.manager.request_hint(id, "ada").await.unwrap().line.is_some());
        }
        let last = fx.manager.request_hint(id, "ada").await.unwrap();
        assert_eq!(last.line, None);
        assert_eq!(bughunt(&last.game).moves.len(), 3);
    }

    #[tokio::test]
    async fn filling_join_flips_status_and_blocks_latecomers() {
        let rules = GameRules {
            max_players: 3,
            ..GameRules::default()
        };
        let fx = fixture(rules).await;
        let id = fx.manager.add_game(GameType::BugHunt).await.unwrap();
        for (player, status) in [
            ("ada", GameStatus::WaitingToStart),
            ("bob", GameStatus::WaitingToStart),
            ("cy", GameStatus::InProgress),
        ] {
            let snapshot = fx.manager.join_game(id, player).await.unwrap();
            assert_eq!(snapshot.status(), status);
            assert!(snapshot.players.len() <= 3);
        }
        let err = fx.manager.join_game(id, "dee").await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot join game: already started");
        assert!(fx.manager.apply_move(id, "cy", guess(&[2])).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_instance_reports_not_found() {
        let fx = fixture(GameRules::default()).await;
        let err = fx
            .manager
            .join_game(Uuid::new_v4(), "ada")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), GAME_NOT_FOUND);
        assert!(fx.manager.get_game(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_player_is_invalid_input() {
        let fx = fixture(GameRules::default()).await;
        let id = fx.manager.add_game(GameType::BugHunt).await.unwrap();
        assert!(matches!(
            fx.manager.join_game(id, "  ").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn lookups_do_not_leave_locks_behind() {
        let fx = fixture(GameRules::default()).await;
        for _ in 0..50 {
            assert!(fx.manager.get_game(Uuid::new_v4()).await.unwrap().is_none());
            assert!(fx.manager.request_hint(Uuid::new_v4(), "ada").await.is_err());
        }
        assert!(fx.manager.locks.is_empty());

        let id = started(&fx, &["ada"]).await;
        assert_eq!(fx.manager.locks.len(), 1);
        fx.manager.apply_move(id, "ada", guess(&[2, 3, 4])).await.unwrap();
        assert!(fx.manager.locks.is_empty());

        // Finished games are rehydrated on every lookup without being cached.
        for _ in 0..3 {
            assert!(fx.manager.get_game(id).await.unwrap().is_some());
        }
        assert!(fx.manager.request_hint(id, "ada").await.is_err());
        assert!(fx.manager.locks.is_empty());
    }

    #[tokio::test]
    async fn rehydrated_game_keeps_playing() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada", "bob"]).await;
        let before = fx.manager.get_game(id).await.unwrap().unwrap();

        fx.manager.reset();
        assert!(fx.manager.active_game_instances().is_empty());

        let after = fx.manager.get_game(id).await.unwrap().unwrap();
        assert_eq!(after, before);
        let snapshot = fx.manager.apply_move(id, "bob", guess(&[2, 3, 4])).await.unwrap();
        assert_eq!(bughunt(&snapshot).winners.as_deref().map(<[_]>::len), Some(1));
    }

    #[tokio::test]
    async fn finished_games_leave_the_cache_but_stay_stored() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada"]).await;
        let snapshot = fx.manager.apply_move(id, "ada", guess(&[2, 3, 4])).await.unwrap();
        assert_eq!(snapshot.status(), GameStatus::Over);
        assert!(fx.manager.active_game_instances().is_empty());
        assert_eq!(
            fx.manager.get_game(id).await.unwrap().map(|g| g.status()),
            Some(GameStatus::Over)
        );
    }

    #[tokio::test]
    async fn store_outage_keeps_cache_ahead() {
        let fx = fixture(GameRules::default()).await;
        let id = fx.manager.add_game(GameType::BugHunt).await.unwrap();
        fx.store.set_offline(true);

        let err = fx.manager.join_game(id, "ada").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        let cached = fx.manager.active_game_instances();
        assert_eq!(cached[0].players, vec!["ada".to_string()]);

        fx.store.set_offline(false);
        let stored = fx.store.find_game(id).await.unwrap().unwrap();
        assert!(stored.players.is_empty());
    }

    #[tokio::test]
    async fn daily_challenge_is_shared_and_rejoin_is_a_no_op() {
        let fx = fixture(GameRules::default()).await;
        let day = utc_day(fx.clock.now());
        let first = fx.manager.daily_game(day).await.unwrap();
        assert_eq!(first.instance_id, daily_instance_id(day));
        assert_eq!(first.status(), GameStatus::Daily);
        assert!(bughunt(&first).buggy_file_id.is_some());

        let via_add = fx.manager.add_game(GameType::BugHuntDaily).await.unwrap();
        assert_eq!(via_add, first.instance_id);

        let joined = fx.manager.join_game(via_add, "ada").await.unwrap();
        let again = fx.manager.join_game(via_add, "ada").await.unwrap();
        assert_eq!(joined, again);

        fx.manager.reset();
        let reloaded = fx.manager.daily_game(day).await.unwrap();
        assert_eq!(reloaded, again);
        assert_eq!(fx.store.game_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_daily_requests_converge() {
        let fx = fixture(GameRules::default()).await;
        let day = utc_day(fx.clock.now());
        let (a, b) = tokio::join!(fx.manager.daily_game(day), fx.manager.daily_game(day));
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(fx.store.game_count(), 1);
    }

    #[tokio::test]
    async fn nim_runs_through_the_same_pipeline() {
        let fx = fixture(GameRules {
            nim_objects: 3,
            ..GameRules::default()
        })
        .await;
        let id = fx.manager.add_game(GameType::Nim).await.unwrap();
        fx.manager.join_game(id, "ada").await.unwrap();
        fx.manager.join_game(id, "bob").await.unwrap();
        fx.manager
            .submit_take(
                id,
                TakeRequest {
                    player_id: "ada".into(),
                    num_objects: 2,
                },
            )
            .await
            .unwrap();
        let over = fx
            .manager
            .apply_move(id, "bob", MovePayload::Nim(NimMove { num_objects: 1 }))
            .await
            .unwrap();
        assert_eq!(over.status(), GameStatus::Over);
        assert_eq!(over.state.winners(), ["ada".to_string()]);
    }

    #[tokio::test]
    async fn find_games_lists_newest_first() {
        let fx = fixture(GameRules::default()).await;
        let older = fx.manager.add_game(GameType::BugHunt).await.unwrap();
        fx.clock.advance(Duration::minutes(1));
        let newer = fx.manager.add_game(GameType::BugHunt).await.unwrap();
        fx.manager.add_game(GameType::Nim).await.unwrap();

        let listed = fx
            .manager
            .find_games(GameFilter {
                game_type: Some(GameType::BugHunt),
                status: None,
            })
            .await
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|g| g.instance_id).collect();
        assert_eq!(ids, vec![newer, older]);
    }

    #[tokio::test]
    async fn invalid_guess_request_is_rejected_before_the_rules() {
        let fx = fixture(GameRules::default()).await;
        let id = started(&fx, &["ada"]).await;
        let err = fx
            .manager
            .submit_guess(
                id,
                GuessRequest {
                    player_id: "ada".into(),
                    selected_lines: vec![0],
                    is_hint: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
