//! Serialized command entry for the betting machine.
//!
//! All mutation funnels through [`apply`]-style dispatch on a single
//! [`GameState`], so concurrent callers can sit behind one queue and
//! out-of-turn submissions are rejected instead of silently reordered.

use serde::{Deserialize, Serialize};

use crate::game::{ActionError, GameState};

/// A betting action as submitted by (or on behalf of) a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum PlayerAction {
    Bet { amount: u64 },
    Check,
    Call,
    Fold,
    AllIn,
}

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("snapshot deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Apply `action` for `seat`, rejecting submissions from any seat other than
/// the one the state says is to act.
///
/// ```
/// use provable_holdem::deck::Deck;
/// use provable_holdem::engine::{apply, PlayerAction};
/// use provable_holdem::fairness::Seed;
/// use provable_holdem::game::{ActionError, GameState, Player};
///
/// let players = vec![Player::new(0, "a", 1000), Player::new(1, "b", 1000)];
/// let mut state = GameState::new(players, 5, 10);
/// state.start_new_hand(Deck::from_seed(&Seed::from_bytes([7u8; 32]))).unwrap();
///
/// let wrong = (state.current_player + 1) % 2;
/// assert!(matches!(
///     apply(&mut state, wrong, PlayerAction::Call),
///     Err(ActionError::OutOfTurn { .. })
/// ));
/// let seat = state.current_player;
/// apply(&mut state, seat, PlayerAction::Call).unwrap();
/// ```
pub fn apply(state: &mut GameState, seat: usize, action: PlayerAction) -> Result<(), ActionError> {
    if seat >= state.players.len() {
        return Err(ActionError::NoSuchSeat(seat));
    }
    if seat != state.current_player {
        return Err(ActionError::OutOfTurn { expected: state.current_player, got: seat });
    }
    match action {
        PlayerAction::Bet { amount } => state.bet(amount),
        PlayerAction::Check => state.check(),
        PlayerAction::Call => state.call(),
        PlayerAction::Fold => state.fold(),
        PlayerAction::AllIn => state.all_in(),
    }
}

/// Snapshot the full table state, hole cards and deck included. The output is
/// trusted storage for crash recovery, not a public view.
pub fn serialize(state: &GameState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(SnapshotError::Serialize)
}

/// Restore a state previously produced by [`serialize`].
pub fn load_state(snapshot: &str) -> Result<GameState, SnapshotError> {
    serde_json::from_str(snapshot).map_err(SnapshotError::Deserialize)
}
