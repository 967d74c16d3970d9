/// Buggy-file corpus access and hint selection.
pub mod corpus;
/// Registry of live games and the lifecycle pipeline.
pub mod game_manager;
/// Daily challenge scores and streaks.
pub mod leaderboard;
/// Snippets bundled with the binary.
pub mod seed;
