//! Commit-reveal fairness protocol.
//!
//! Per hand the host commits to a secret salt, an external VRF service later
//! delivers a random value, and at reveal time the salt plus the actually
//! dealt `(card, position)` pairs are checked against a replay of the
//! deterministic shuffle. A session proves the host could not have picked the
//! deck after seeing the random value; it does not prove the host will reveal.
//!
//! Session lifecycle (one-way, single writer):
//! `Committed -> RandomnessFulfilled -> Revealed{valid|invalid}`.
//! Verification itself is read-only and can be replayed by any party from the
//! public session fields alone via [`verify_deal`].

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::shuffle::shuffle;

/// Caller-chosen session key, one per hand.
pub type GameId = u64;
/// Opaque handle for an in-flight external randomness request.
pub type SequenceId = u64;

fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for p in parts {
        hasher.update(p);
    }
    hasher.finalize().into()
}

fn hex(bytes: &[u8; 32], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for b in bytes {
        write!(f, "{b:02x}")?;
    }
    Ok(())
}

/// A 256-bit keccak digest (salt commitments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest32([u8; 32]);

impl Digest32 {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Digest32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(&self.0, f)
    }
}

/// A 256-bit random value: either the VRF output or the derived final seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed([u8; 32]);

impl Seed {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        hex(&self.0, f)
    }
}

/// The host's secret salt. Only its keccak256 digest is published before the
/// reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salt([u8; 32]);

impl Salt {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Fresh host-side salt.
    pub fn random() -> Self {
        Self(rand::rng().random())
    }

    /// `keccak256(salt)`, the value published at commit time.
    pub fn commitment(&self) -> Digest32 {
        Digest32(keccak256(&[&self.0]))
    }
}

/// One dealt card as claimed by the host at reveal time: the card's canonical
/// index and the deck position it was taken from. Untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealClaim {
    pub card: u8,
    pub position: u8,
}

impl DealClaim {
    pub const fn new(card: u8, position: u8) -> Self {
        Self { card, position }
    }
}

/// Public per-hand fairness record. Every field is write-once: `salt_hash` at
/// commit, `random_value` at fulfillment, the rest at reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    pub salt_hash: Digest32,
    pub sequence_id: SequenceId,
    pub random_value: Option<Seed>,
    pub revealed_salt: Option<Salt>,
    pub final_seed: Option<Seed>,
    pub vrf_fulfilled: bool,
    pub ended: bool,
    pub verified: bool,
}

impl GameSession {
    fn new(salt_hash: Digest32, sequence_id: SequenceId) -> Self {
        Self {
            salt_hash,
            sequence_id,
            random_value: None,
            revealed_salt: None,
            final_seed: None,
            vrf_fulfilled: false,
            ended: false,
            verified: false,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FairnessError {
    #[error("no session for game {0}")]
    UnknownSession(GameId),
    #[error("game {0} already has a commitment")]
    CommitmentExists(GameId),
    #[error("sequence id {0} is already routed to a session")]
    SequenceInUse(SequenceId),
    #[error("randomness for game {0} has not been fulfilled yet")]
    RandomnessPending(GameId),
    #[error("game {0} has already been revealed")]
    SessionEnded(GameId),
    #[error("revealed salt does not hash to the committed value")]
    SaltMismatch,
    #[error("claimed deck position {0} is out of range")]
    PositionOutOfRange(u8),
}

/// Result of a reveal: whether every claimed deal matched the replayed deck,
/// and the seed the deck was replayed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealOutcome {
    pub valid: bool,
    pub final_seed: Seed,
}

/// Derive the seed the deck was shuffled with: `keccak256(random || salt)`.
pub fn final_seed(random_value: &Seed, salt: &Salt) -> Seed {
    Seed(keccak256(&[&random_value.0, &salt.0]))
}

/// Read-only fairness replay from public fields. Any party can run this; it
/// does not require (or touch) ledger state.
///
/// Returns `false` on a salt/commitment mismatch, an out-of-range position,
/// or any claimed card differing from the replayed deck at its position.
pub fn verify_deal(
    salt_hash: &Digest32,
    random_value: &Seed,
    salt: &Salt,
    claims: &[DealClaim],
) -> bool {
    if salt.commitment() != *salt_hash {
        return false;
    }
    let deck = shuffle(&final_seed(random_value, salt));
    claims
        .iter()
        .all(|c| (c.position as usize) < deck.len() && deck[c.position as usize] == c.card)
}

/// Host-side ledger of fairness sessions, keyed by game id, with a
/// `sequence_id -> game_id` routing table for the asynchronous RNG callback.
#[derive(Debug, Default)]
pub struct FairnessLedger {
    sessions: HashMap<GameId, GameSession>,
    routes: HashMap<SequenceId, GameId>,
}

impl FairnessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase 1: bind a salt commitment to a game and register the pending
    /// randomness request. The commitment is immutable afterwards.
    pub fn commit(
        &mut self,
        game_id: GameId,
        salt_hash: Digest32,
        sequence_id: SequenceId,
    ) -> Result<(), FairnessError> {
        if self.sessions.contains_key(&game_id) {
            return Err(FairnessError::CommitmentExists(game_id));
        }
        if self.routes.contains_key(&sequence_id) {
            return Err(FairnessError::SequenceInUse(sequence_id));
        }
        self.sessions.insert(game_id, GameSession::new(salt_hash, sequence_id));
        self.routes.insert(sequence_id, game_id);
        info!("game {game_id}: committed salt hash {salt_hash}, awaiting sequence {sequence_id}");
        Ok(())
    }

    /// Phase 2: asynchronous RNG callback. Routes by sequence id; unknown ids
    /// and replays are ignored so the external service can redeliver freely.
    /// Returns the game id the value was applied to, if any.
    pub fn fulfill_randomness(
        &mut self,
        sequence_id: SequenceId,
        random_value: Seed,
    ) -> Option<GameId> {
        let game_id = match self.routes.get(&sequence_id) {
            Some(&id) => id,
            None => {
                debug!("ignoring randomness for unknown sequence {sequence_id}");
                return None;
            }
        };
        let session = self.sessions.get_mut(&game_id)?;
        if session.vrf_fulfilled || session.ended {
            debug!("ignoring duplicate randomness for game {game_id}");
            return None;
        }
        session.random_value = Some(random_value);
        session.vrf_fulfilled = true;
        info!("game {game_id}: randomness fulfilled via sequence {sequence_id}");
        Some(game_id)
    }

    /// Phase 3: reveal the salt and check the claimed deals against a replay
    /// of the shuffle.
    ///
    /// Protocol violations (unknown session, reveal before fulfillment,
    /// double reveal, salt mismatch, position >= 52) abort with an error and
    /// leave the session untouched. A card mismatch is NOT an error: the
    /// reveal completes with `valid == false`, permanently flagging the hand.
    pub fn reveal(
        &mut self,
        game_id: GameId,
        salt: Salt,
        claims: &[DealClaim],
    ) -> Result<RevealOutcome, FairnessError> {
        let session =
            self.sessions.get(&game_id).ok_or(FairnessError::UnknownSession(game_id))?;
        if session.ended {
            return Err(FairnessError::SessionEnded(game_id));
        }
        let random_value = match session.random_value {
            Some(v) if session.vrf_fulfilled => v,
            _ => return Err(FairnessError::RandomnessPending(game_id)),
        };
        if salt.commitment() != session.salt_hash {
            return Err(FairnessError::SaltMismatch);
        }
        if let Some(bad) = claims.iter().find(|c| c.position >= 52) {
            return Err(FairnessError::PositionOutOfRange(bad.position));
        }

        let seed = final_seed(&random_value, &salt);
        let deck = shuffle(&seed);
        // Short-circuit on the first mismatch; one is enough to flag fraud.
        let valid = claims.iter().all(|c| deck[c.position as usize] == c.card);

        let session = self.sessions.get_mut(&game_id).expect("session checked above");
        session.revealed_salt = Some(salt);
        session.final_seed = Some(seed);
        session.ended = true;
        session.verified = valid;
        if valid {
            info!("game {game_id}: reveal verified, final seed {seed}");
        } else {
            warn!("game {game_id}: fairness check failed");
        }
        Ok(RevealOutcome { valid, final_seed: seed })
    }

    /// Public session record, usable for independent re-verification.
    pub fn session(&self, game_id: GameId) -> Option<&GameSession> {
        self.sessions.get(&game_id)
    }
}
