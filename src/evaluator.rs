use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank};

/// Poker hand category from weakest to strongest. The ace-high straight flush
/// gets its own top category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
#[repr(u8)]
pub enum Category {
    HighCard = 0,
    Pair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl Category {
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            Category::HighCard => "High Card",
            Category::Pair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::Straight => "Straight",
            Category::Flush => "Flush",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::StraightFlush => "Straight Flush",
            Category::RoyalFlush => "Royal Flush",
        }
    }
}

/// Evaluated best five-card hand.
///
/// `value` is a single monotonic integer: comparing two values alone decides
/// the winner. The category sits in the high bits with the five tiebreak
/// ranks (6 bits each) in descending significance below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandEvaluation {
    pub category: Category,
    pub value: u64,
    pub description: String,
    pub best_five: [Card; 5],
}

impl PartialEq for HandEvaluation {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for HandEvaluation {}

impl PartialOrd for HandEvaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandEvaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    #[error("need at least 5 cards to evaluate, got {0}")]
    InsufficientCards(usize),
}

/// Pack a category and five tiebreak ranks into a comparable value.
/// Layout (msb -> lsb): category (8 bits) | r0..r4 (6 bits each) | padding.
fn pack(category: Category, ranks_desc: &[Rank; 5]) -> u64 {
    const CAT_SHIFT: u32 = 48;
    const RANK_STRIDE: u32 = 6;
    let mut v: u64 = (category as u64) << CAT_SHIFT;
    for (i, r) in ranks_desc.iter().enumerate() {
        let offset = CAT_SHIFT - RANK_STRIDE * (i as u32 + 1);
        v |= (*r as u64) << offset;
    }
    v
}

/// Evaluate the best five-card hand from any set of at least five cards.
///
/// ```
/// use provable_holdem::cards::parse_cards;
/// use provable_holdem::evaluator::{evaluate, Category};
///
/// let cards = parse_cards("As Ah Kc Qd Jh 3s 2c").unwrap();
/// let eval = evaluate(&cards).unwrap();
/// assert_eq!(eval.category, Category::Pair);
/// ```
pub fn evaluate(cards: &[Card]) -> Result<HandEvaluation, EvalError> {
    if cards.len() < 5 {
        return Err(EvalError::InsufficientCards(cards.len()));
    }
    let mut best: Option<HandEvaluation> = None;
    for_each_combination(cards.len(), |idx| {
        let five = [cards[idx[0]], cards[idx[1]], cards[idx[2]], cards[idx[3]], cards[idx[4]]];
        let eval = evaluate_five(&five);
        match &best {
            Some(b) if eval.value <= b.value => {}
            _ => best = Some(eval),
        }
    });
    Ok(best.expect("at least one 5-card combination"))
}

/// Walk every 5-element index combination of `0..n` in lexicographic order.
fn for_each_combination(n: usize, mut f: impl FnMut(&[usize; 5])) {
    let mut idx = [0, 1, 2, 3, 4];
    loop {
        f(&idx);
        // advance the rightmost index that can still move
        let mut k = 4usize;
        loop {
            if idx[k] < n - (5 - k) {
                idx[k] += 1;
                for j in k + 1..5 {
                    idx[j] = idx[j - 1] + 1;
                }
                break;
            }
            if k == 0 {
                return;
            }
            k -= 1;
        }
    }
}

/// Evaluate exactly five cards.
pub fn evaluate_five(cards: &[Card; 5]) -> HandEvaluation {
    let mut sorted = *cards;
    sorted.sort_by(|a, b| b.rank().cmp(&a.rank()).then(b.suit().cmp(&a.suit())));

    let ranks =
        [sorted[0].rank(), sorted[1].rank(), sorted[2].rank(), sorted[3].rank(), sorted[4].rank()];
    let mut counts = [0u8; 15];
    for r in ranks.iter() {
        counts[*r as usize] += 1;
    }

    let is_flush = sorted.iter().all(|c| c.suit() == sorted[0].suit());

    let mut uniq_vals: Vec<u8> = ranks.iter().map(|&r| r as u8).collect();
    uniq_vals.sort_unstable();
    uniq_vals.dedup();
    // The wheel (A-2-3-4-5) needs an explicit check: the ace's numeric value
    // of 14 breaks consecutive-rank detection.
    let is_wheel = uniq_vals == [2, 3, 4, 5, 14];
    let is_consecutive = uniq_vals.len() == 5 && uniq_vals.windows(2).all(|w| w[1] == w[0] + 1);
    let is_straight = is_wheel || is_consecutive;
    let straight_top: Rank = if is_wheel {
        Rank::Five
    } else if is_straight {
        Rank::from_value(*uniq_vals.last().unwrap()).unwrap_or(Rank::Ace)
    } else {
        Rank::Two
    };

    let finish = |category: Category, tiebreak: [Rank; 5], description: String| HandEvaluation {
        category,
        value: pack(category, &tiebreak),
        description,
        best_five: sorted,
    };

    if is_flush && is_straight {
        let tiebreak = [straight_top, Rank::Two, Rank::Two, Rank::Two, Rank::Two];
        if straight_top == Rank::Ace {
            return finish(Category::RoyalFlush, tiebreak, "Royal Flush".into());
        }
        return finish(
            Category::StraightFlush,
            tiebreak,
            format!("Straight Flush, {} high", straight_top.name()),
        );
    }

    // Groups: (rank, count) sorted by count desc then rank desc
    let mut groups: Vec<(Rank, u8)> = (2u8..=14u8)
        .rev()
        .filter_map(|v| {
            let c = counts[v as usize];
            (c > 0).then(|| (Rank::from_value(v).unwrap(), c))
        })
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));

    if let Some(&(quad, 4)) = groups.first() {
        let kicker = groups.iter().find(|(_, c)| *c == 1).map(|(r, _)| *r).unwrap_or(Rank::Two);
        return finish(
            Category::FourOfAKind,
            [quad, kicker, Rank::Two, Rank::Two, Rank::Two],
            format!("Four of a Kind, {}s", quad.name()),
        );
    }

    if groups.len() >= 2 && groups[0].1 == 3 && groups[1].1 >= 2 {
        let (trips, pair) = (groups[0].0, groups[1].0);
        return finish(
            Category::FullHouse,
            [trips, pair, Rank::Two, Rank::Two, Rank::Two],
            format!("Full House, {}s over {}s", trips.name(), pair.name()),
        );
    }

    if is_flush {
        let mut rdesc = ranks;
        rdesc.sort_by(|a, b| b.cmp(a));
        return finish(Category::Flush, rdesc, format!("Flush, {} high", rdesc[0].name()));
    }

    if is_straight {
        return finish(
            Category::Straight,
            [straight_top, Rank::Two, Rank::Two, Rank::Two, Rank::Two],
            format!("Straight, {} high", straight_top.name()),
        );
    }

    if let Some(&(trips, 3)) = groups.first() {
        let mut kickers: Vec<Rank> =
            groups.iter().filter(|(_, c)| *c == 1).map(|(r, _)| *r).collect();
        kickers.sort_by(|a, b| b.cmp(a));
        return finish(
            Category::ThreeOfAKind,
            [trips, kickers[0], kickers[1], Rank::Two, Rank::Two],
            format!("Three of a Kind, {}s", trips.name()),
        );
    }

    let pairs: Vec<Rank> = groups.iter().filter(|(_, c)| *c == 2).map(|(r, _)| *r).collect();
    if pairs.len() >= 2 {
        let mut p = pairs.clone();
        p.sort_by(|a, b| b.cmp(a));
        let kicker = groups
            .iter()
            .find_map(|(r, c)| (*c == 1).then_some(*r))
            .unwrap_or(Rank::Two);
        return finish(
            Category::TwoPair,
            [p[0], p[1], kicker, Rank::Two, Rank::Two],
            format!("Two Pair, {}s and {}s", p[0].name(), p[1].name()),
        );
    }

    if let Some(&(pair, 2)) = groups.first() {
        let mut kickers: Vec<Rank> =
            groups.iter().filter(|(_, c)| *c == 1).map(|(r, _)| *r).collect();
        kickers.sort_by(|a, b| b.cmp(a));
        return finish(
            Category::Pair,
            [pair, kickers[0], kickers[1], kickers[2], Rank::Two],
            format!("One Pair, {}s", pair.name()),
        );
    }

    let mut rdesc = ranks;
    rdesc.sort_by(|a, b| b.cmp(a));
    finish(Category::HighCard, rdesc, format!("High Card, {}", rdesc[0].name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn eval_str(s: &str) -> HandEvaluation {
        evaluate(&parse_cards(s).unwrap()).unwrap()
    }

    #[test]
    fn too_few_cards_errors() {
        let cards = parse_cards("As Kd 2c").unwrap();
        assert_eq!(evaluate(&cards).unwrap_err(), EvalError::InsufficientCards(3));
    }

    #[test]
    fn royal_flush_beats_straight_flush() {
        let royal = eval_str("10s Js Qs Ks As");
        let sf = eval_str("9h 10h Jh Qh Kh");
        assert_eq!(royal.category, Category::RoyalFlush);
        assert_eq!(sf.category, Category::StraightFlush);
        assert!(royal > sf);
    }

    #[test]
    fn wheel_is_a_straight_below_six_high() {
        let wheel = eval_str("Ad 2c 3h 4s 5d");
        let six_high = eval_str("2d 3c 4h 5s 6d");
        assert_eq!(wheel.category, Category::Straight);
        assert_eq!(six_high.category, Category::Straight);
        assert!(wheel < six_high);
    }

    #[test]
    fn all_categories_detected() {
        assert_eq!(eval_str("Kc Kd Kh Ks 2s").category, Category::FourOfAKind);
        assert_eq!(eval_str("10c 10d 10h 2s 2h").category, Category::FullHouse);
        assert_eq!(eval_str("Ah 9h 7h 3h 2h").category, Category::Flush);
        assert_eq!(eval_str("Qc Qd Qh 9s 2c").category, Category::ThreeOfAKind);
        assert_eq!(eval_str("Jc Jd 9c 9h 2s").category, Category::TwoPair);
        assert_eq!(eval_str("Ah Ad 10s 9c 2d").category, Category::Pair);
        assert_eq!(eval_str("Ah Kd 7s 5c 2d").category, Category::HighCard);
    }

    #[test]
    fn seven_card_best_combination_wins() {
        // Board pair plus hole pair makes two pair; flush possibility beats it
        let eval = eval_str("Ah Kh Qh Jh 2c 2d 9h");
        assert_eq!(eval.category, Category::Flush);
    }

    #[test]
    fn six_card_input_is_supported() {
        let eval = eval_str("Ah Ad As 2c 3d 4h");
        assert_eq!(eval.category, Category::ThreeOfAKind);
    }

    #[test]
    fn kickers_break_ties_in_order() {
        let hi = eval_str("Ah Ad Ks 9c 2d");
        let lo = eval_str("As Ac Qs 9h 2h");
        assert!(hi > lo, "king kicker beats queen kicker");
    }

    #[test]
    fn descriptions_are_readable() {
        assert_eq!(eval_str("10s Js Qs Ks As").description, "Royal Flush");
        assert_eq!(eval_str("10c 10d 10h 2s 2h").description, "Full House, Tens over Twos");
        assert_eq!(eval_str("Ad 2c 3h 4s 5d").description, "Straight, Five high");
    }
}
