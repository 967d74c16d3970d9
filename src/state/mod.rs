//! Game rules: the runtime [`Game`](game::Game), the per-variant transitions and the
//! dispatch table tying them together.

mod bughunt;
pub mod clock;
mod error;
pub mod game;
mod nim;
pub mod scoring;
pub mod state_machine;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::error::GameError;
pub use self::game::{Game, TransitionContext};
pub use self::state_machine::{GameEvent, MovePayload, compute_transition};
