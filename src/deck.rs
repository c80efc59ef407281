use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::fairness::Seed;
use crate::shuffle::shuffle;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeckError {
    #[error("wire deck must contain exactly 52 bytes, got {0}")]
    WrongLength(usize),
    #[error("invalid card index {0} in wire deck")]
    InvalidIndex(u8),
    #[error("duplicate card index {0} in wire deck")]
    DuplicateIndex(u8),
}

/// An ordered 52-card deck.
///
/// Cards come off the FRONT: position 0 is the first card dealt. This matches
/// the fairness protocol, where a claimed `(card, position)` pair is checked
/// against the replayed permutation by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Unshuffled deck in canonical index order.
    ///
    /// ```
    /// use provable_holdem::deck::Deck;
    ///
    /// let deck = Deck::standard();
    /// assert_eq!(deck.len(), 52);
    /// ```
    pub fn standard() -> Self {
        let cards = (0..52u8).map(|i| Card::from_index(i).unwrap()).collect();
        Self { cards }
    }

    /// Deck ordered by the deterministic shuffle of `seed`.
    pub fn from_seed(seed: &Seed) -> Self {
        let indices = shuffle(seed);
        let cards = indices.iter().map(|&i| Card::from_index(i).unwrap()).collect();
        Self { cards }
    }

    /// Decode the packed 52-byte wire form (each byte a distinct index < 52).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeckError> {
        if bytes.len() != 52 {
            return Err(DeckError::WrongLength(bytes.len()));
        }
        let mut seen = [false; 52];
        let mut cards = Vec::with_capacity(52);
        for &b in bytes {
            let card = Card::from_index(b).ok_or(DeckError::InvalidIndex(b))?;
            if seen[b as usize] {
                return Err(DeckError::DuplicateIndex(b));
            }
            seen[b as usize] = true;
            cards.push(card);
        }
        Ok(Self { cards })
    }

    /// Encode the remaining cards as packed indices. A full deck yields the
    /// canonical 52-byte interchange form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cards.iter().map(|c| c.index()).collect()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw the next card from the front of the deck.
    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Remove and discard a single card from the front.
    pub fn burn(&mut self) -> Option<Card> {
        self.draw()
    }

    /// Card at `position` without removing it (position counts from the front
    /// of the current deck).
    pub fn peek(&self, position: usize) -> Option<Card> {
        self.cards.get(position).copied()
    }
}
