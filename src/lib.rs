//! Provably fair No-Limit Texas Hold'em.
//!
//! Two halves, deliberately decoupled:
//!
//! - A commit-reveal fairness protocol ([`fairness`]): the host commits to a
//!   secret salt, an external randomness service delivers a random value, and
//!   at reveal time anyone can replay the deterministic keccak256
//!   Fisher-Yates shuffle ([`shuffle`]) and check the dealt cards against it.
//! - A betting state machine ([`game`], [`engine`]): blinds, streets,
//!   raise sizing, all-ins with side pots, and 5-card hand evaluation
//!   ([`evaluator`]).
//!
//! The betting machine consumes an already-resolved [`deck::Deck`] and knows
//! nothing about where its ordering came from.
//!
//! # Quick start
//!
//! ```
//! use provable_holdem::deck::Deck;
//! use provable_holdem::fairness::{final_seed, FairnessLedger, Salt, Seed};
//! use provable_holdem::game::{GameState, Player};
//!
//! // Host side: commit before any randomness exists.
//! let salt = Salt::random();
//! let mut ledger = FairnessLedger::new();
//! ledger.commit(1, salt.commitment(), 77)?;
//!
//! // Randomness service fulfills by sequence id.
//! let random_value = Seed::from_bytes([3u8; 32]);
//! assert_eq!(ledger.fulfill_randomness(77, random_value), Some(1));
//!
//! // Deal from the derived seed and play the hand.
//! let seed = final_seed(&random_value, &salt);
//! let players = vec![Player::new(0, "alice", 1000), Player::new(1, "bob", 1000)];
//! let mut table = GameState::new(players, 5, 10);
//! table.start_new_hand(Deck::from_seed(&seed))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod evaluator;
pub mod fairness;
pub mod game;
pub mod hand;
pub mod shuffle;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
