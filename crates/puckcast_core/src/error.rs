use thiserror::Error;

use crate::persist::PersistError;
use crate::state::GameState;

#[derive(Error, Debug)]
pub enum ChainError {
    /// The one fatal input error in the core: a propagation query from
    /// a state outside the state space has no meaningful answer
    #[error("unknown initial state: score {} situation {} zone {}", .0.score, .0.situation, .0.zone.as_str())]
    UnknownState(GameState),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

pub type Result<T> = std::result::Result<T, ChainError>;
