use log::debug;
use serde::{Deserialize, Serialize};

use crate::deck::Deck;
use crate::evaluator::{evaluate, HandEvaluation};
use crate::hand::{Board, HoleCards};

/// Stable player identifier, independent of seat order.
pub type PlayerId = u64;

/// Betting rounds in order. `Showdown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Stage {
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum LogVerb {
    SmallBlind,
    BigBlind,
    Fold,
    Check,
    Call,
    Bet,
    Raise,
    AllIn,
    Win,
    Split,
}

impl LogVerb {
    pub fn label(self) -> &'static str {
        match self {
            LogVerb::SmallBlind => "SB",
            LogVerb::BigBlind => "BB",
            LogVerb::Fold => "Fold",
            LogVerb::Check => "Check",
            LogVerb::Call => "Call",
            LogVerb::Bet => "Bet",
            LogVerb::Raise => "Raise",
            LogVerb::AllIn => "All-in",
            LogVerb::Win => "Win",
            LogVerb::Split => "Split",
        }
    }
}

/// One entry of the per-hand action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub seat: usize,
    pub verb: LogVerb,
    pub amount: Option<u64>,
    pub stage: Stage,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ActionError {
    #[error("seat {got} acted out of turn (expected seat {expected})")]
    OutOfTurn { expected: usize, got: usize },
    #[error("no such seat: {0}")]
    NoSuchSeat(usize),
    #[error("hand is over; no actions allowed during showdown")]
    HandOver,
    #[error("player cannot act (folded, all-in or out of chips)")]
    CannotAct,
    #[error("cannot check while facing a bet")]
    CheckFacingBet,
    #[error("bet amount must be positive")]
    ZeroAmount,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StartError {
    #[error("need at least two players with chips to start a hand")]
    NotEnoughPlayers,
    #[error("deck too short to deal a hand: {0} cards")]
    ShortDeck(usize),
}

/// One seat's state for the current hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub chips: u64,
    pub hole: Option<HoleCards>,
    pub folded: bool,
    pub all_in: bool,
    /// Wagered this street.
    pub current_bet: u64,
    /// Wagered over the whole hand. Invariant: `current_bet <= total_bet`.
    pub total_bet: u64,
    /// Seated and dealt into the current hand.
    pub active: bool,
    /// Has taken a voluntary action this street (blinds do not count).
    pub acted: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, chips: u64) -> Self {
        Self {
            id,
            name: name.into(),
            chips,
            hole: None,
            folded: false,
            all_in: false,
            current_bet: 0,
            total_bet: 0,
            active: true,
            acted: false,
        }
    }

    /// Can still take a betting action this hand.
    pub fn can_act(&self) -> bool {
        self.active && !self.folded && !self.all_in && self.chips > 0
    }

    /// Still contesting the pot (may be all-in).
    pub fn in_hand(&self) -> bool {
        self.active && !self.folded
    }
}

/// A pot (main or side) and the players allowed to win it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u64,
    pub eligible: Vec<PlayerId>,
}

/// Full table state for one hand of No-Limit Hold'em.
///
/// Exactly one authoritative writer applies actions at a time; cross-hand
/// state (chip stacks, dealer rotation) carries forward through
/// [`GameState::start_new_hand`]. The engine has no awareness of the fairness
/// protocol: it consumes an already-resolved [`Deck`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub players: Vec<Player>,
    pub deck: Deck,
    pub community: Board,
    pub pot: u64,
    /// Highest total street wager at the table.
    pub current_bet: u64,
    pub stage: Stage,
    pub dealer: usize,
    pub small_blind_pos: usize,
    pub big_blind_pos: usize,
    pub current_player: usize,
    pub last_to_act: usize,
    pub last_raise_amount: u64,
    pub small_blind: u64,
    pub big_blind: u64,
    pub side_pots: Vec<SidePot>,
    pub betting_actions: u64,
    pub log: Vec<LogEntry>,
}

impl GameState {
    /// Seat a roster. No hand is in progress until
    /// [`GameState::start_new_hand`]; the dealer button starts at the last
    /// seat so the first rotation lands on seat 0.
    pub fn new(players: Vec<Player>, small_blind: u64, big_blind: u64) -> Self {
        let dealer = players.len().saturating_sub(1);
        Self {
            players,
            deck: Deck::standard(),
            community: Board::default(),
            pot: 0,
            current_bet: 0,
            stage: Stage::Showdown,
            dealer,
            small_blind_pos: 0,
            big_blind_pos: 0,
            current_player: 0,
            last_to_act: 0,
            last_raise_amount: big_blind,
            small_blind,
            big_blind,
            side_pots: Vec::new(),
            betting_actions: 0,
            log: Vec::new(),
        }
    }

    // ---- hand lifecycle ----------------------------------------------------

    /// Start a hand from a resolved deck: rotate the dealer, post blinds and
    /// deal hole cards round-robin.
    pub fn start_new_hand(&mut self, deck: Deck) -> Result<(), StartError> {
        let n = self.players.len();
        for p in &mut self.players {
            p.hole = None;
            p.folded = false;
            p.all_in = false;
            p.current_bet = 0;
            p.total_bet = 0;
            p.acted = false;
            p.active = p.chips > 0;
        }
        let playing = self.players.iter().filter(|p| p.active).count();
        if playing < 2 {
            return Err(StartError::NotEnoughPlayers);
        }
        if deck.len() < 2 * playing + 8 {
            return Err(StartError::ShortDeck(deck.len()));
        }

        self.deck = deck;
        self.community = Board::default();
        self.pot = 0;
        self.current_bet = 0;
        self.stage = Stage::PreFlop;
        self.side_pots.clear();
        self.betting_actions = 0;
        self.log.clear();
        self.last_raise_amount = self.big_blind;

        // Dealer moves to the next seat still holding chips.
        self.dealer = self.next_active_from(self.dealer);

        // Heads-up: the dealer posts the small blind and acts first preflop.
        let (sb, bb) = if playing == 2 {
            let sb = self.dealer;
            (sb, self.next_active_from(sb))
        } else {
            let sb = self.next_active_from(self.dealer);
            (sb, self.next_active_from(sb))
        };
        self.small_blind_pos = sb;
        self.big_blind_pos = bb;

        // Hole cards go out round-robin: one card to every player, then the
        // second, starting left of the dealer.
        let order: Vec<usize> = (1..=n)
            .map(|off| (self.dealer + off) % n)
            .filter(|&i| self.players[i].active)
            .collect();
        let mut first: Vec<Option<crate::cards::Card>> = vec![None; n];
        for &i in &order {
            first[i] = self.deck.draw();
        }
        for &i in &order {
            if let (Some(a), Some(b)) = (first[i], self.deck.draw()) {
                if let Ok(hole) = HoleCards::try_new(a, b) {
                    self.players[i].hole = Some(hole);
                }
            }
        }

        // Blinds are forced wagers; they bypass the action-then-advance flow.
        let sb_amount = self.small_blind;
        let bb_amount = self.big_blind;
        self.post_forced(sb, sb_amount, LogVerb::SmallBlind);
        self.post_forced(bb, bb_amount, LogVerb::BigBlind);
        // The big blind is live for its nominal amount even when the poster
        // is all-in for less.
        self.current_bet = bb_amount;
        self.last_raise_amount = bb_amount.max(1);
        self.last_to_act = bb;
        self.current_player = if playing == 2 { self.dealer } else { self.next_actor_from(bb) };
        debug!(
            "new hand: dealer seat {}, blinds {}/{}, {} players",
            self.dealer, self.small_blind, self.big_blind, playing
        );
        // Blinds can put short stacks all-in before anyone acts.
        self.maybe_auto_runout();
        Ok(())
    }

    fn post_forced(&mut self, seat: usize, amount: u64, verb: LogVerb) {
        let p = &mut self.players[seat];
        let paid = p.chips.min(amount);
        p.chips -= paid;
        p.current_bet += paid;
        p.total_bet += paid;
        if p.chips == 0 {
            p.all_in = true;
        }
        self.pot += paid;
        self.record(seat, verb, Some(paid));
    }

    // ---- seat iteration ----------------------------------------------------

    fn next_active_from(&self, start: usize) -> usize {
        let n = self.players.len();
        let mut i = (start + 1) % n;
        for _ in 0..n {
            if self.players[i].active {
                return i;
            }
            i = (i + 1) % n;
        }
        start % n
    }

    fn next_actor_from(&self, start: usize) -> usize {
        let n = self.players.len();
        let mut i = (start + 1) % n;
        for _ in 0..n {
            if self.players[i].can_act() {
                return i;
            }
            i = (i + 1) % n;
        }
        start % n
    }

    fn count_in_hand(&self) -> usize {
        self.players.iter().filter(|p| p.in_hand()).count()
    }

    fn count_can_act(&self) -> usize {
        self.players.iter().filter(|p| p.can_act()).count()
    }

    /// Amount seat `idx` must add to match the table bet.
    pub fn to_call(&self, idx: usize) -> u64 {
        self.current_bet.saturating_sub(self.players[idx].current_bet)
    }

    // ---- actions -----------------------------------------------------------

    fn ensure_can_act(&self) -> Result<(), ActionError> {
        if matches!(self.stage, Stage::Showdown) {
            return Err(ActionError::HandOver);
        }
        if !self.players[self.current_player].can_act() {
            return Err(ActionError::CannotAct);
        }
        Ok(())
    }

    /// Wager `amount` additional chips. Opens the betting or raises.
    ///
    /// The minimum raise delta is the big blind when no bet exists this
    /// street, otherwise the size of the last raise. An under-minimum wager
    /// from a player who is not going all-in degrades to a call rather than
    /// being rejected; a short all-in stands but does not reopen the action.
    /// Wagers are capped at the remaining stack (auto all-in on exhaustion).
    pub fn bet(&mut self, amount: u64) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        if amount == 0 {
            return Err(ActionError::ZeroAmount);
        }
        let idx = self.current_player;
        let chips = self.players[idx].chips;
        let wager = amount.min(chips);
        let goes_all_in = wager == chips;
        let new_total = self.players[idx].current_bet + wager;

        if new_total <= self.current_bet {
            // Not enough to exceed the table bet; treat as a call.
            return self.call();
        }
        let delta = new_total - self.current_bet;
        let min_delta = if self.current_bet == 0 { self.big_blind } else { self.last_raise_amount };
        if delta < min_delta && !goes_all_in {
            // Under-minimum raise with chips to spare collapses to a call.
            return self.call();
        }

        self.commit_chips(idx, wager);
        let verb = if goes_all_in {
            LogVerb::AllIn
        } else if self.current_bet == 0 {
            LogVerb::Bet
        } else {
            LogVerb::Raise
        };
        self.current_bet = new_total;
        // A full raise resets the raise unit and makes the raiser the
        // reference seat the action must return to.
        if delta >= min_delta {
            self.last_raise_amount = delta;
            self.last_to_act = idx;
        }
        self.players[idx].acted = true;
        self.record(idx, verb, Some(new_total));
        self.betting_actions += 1;
        self.advance_turn(idx);
        Ok(())
    }

    /// Pass without wagering. Only legal when already matching the table bet.
    pub fn check(&mut self) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        let idx = self.current_player;
        if self.players[idx].current_bet != self.current_bet {
            return Err(ActionError::CheckFacingBet);
        }
        self.players[idx].acted = true;
        self.record(idx, LogVerb::Check, None);
        self.betting_actions += 1;
        self.advance_turn(idx);
        Ok(())
    }

    /// Match the table bet, capped at the remaining stack. A zero shortfall
    /// degrades to a check.
    pub fn call(&mut self) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        let idx = self.current_player;
        let shortfall = self.to_call(idx);
        if shortfall == 0 {
            return self.check();
        }
        let pay = shortfall.min(self.players[idx].chips);
        self.commit_chips(idx, pay);
        let verb = if self.players[idx].all_in { LogVerb::AllIn } else { LogVerb::Call };
        self.players[idx].acted = true;
        self.record(idx, verb, Some(pay));
        self.betting_actions += 1;
        self.advance_turn(idx);
        Ok(())
    }

    /// Give up the hand. Folding down to one contender ends the hand
    /// immediately, regardless of betting completeness.
    pub fn fold(&mut self) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        let idx = self.current_player;
        self.players[idx].folded = true;
        self.players[idx].acted = true;
        self.record(idx, LogVerb::Fold, None);
        self.betting_actions += 1;
        if self.count_in_hand() <= 1 {
            self.stage = Stage::Showdown;
            self.settle();
            return Ok(());
        }
        self.advance_turn(idx);
        Ok(())
    }

    /// Wager the entire remaining stack via the bet path.
    pub fn all_in(&mut self) -> Result<(), ActionError> {
        self.ensure_can_act()?;
        let chips = self.players[self.current_player].chips;
        self.bet(chips)
    }

    fn commit_chips(&mut self, idx: usize, amount: u64) {
        let p = &mut self.players[idx];
        debug_assert!(amount <= p.chips);
        p.chips -= amount;
        p.current_bet += amount;
        p.total_bet += amount;
        if p.chips == 0 {
            p.all_in = true;
        }
        self.pot += amount;
    }

    // ---- turn advancement --------------------------------------------------

    fn bets_matched(&self) -> bool {
        self.players
            .iter()
            .filter(|p| p.in_hand() && !p.all_in)
            .all(|p| p.current_bet == self.current_bet)
    }

    fn round_complete(&self, prev: usize) -> bool {
        if !self.bets_matched() {
            return false;
        }
        if prev == self.last_to_act {
            return true;
        }
        // Everyone who can still act has had a voluntary say this street.
        self.players.iter().filter(|p| p.can_act()).all(|p| p.acted)
    }

    fn advance_turn(&mut self, prev: usize) {
        if matches!(self.stage, Stage::Showdown) {
            return;
        }
        if self.round_complete(prev) {
            self.advance_stage();
        } else {
            self.current_player = self.next_actor_from(prev);
        }
        self.maybe_auto_runout();
    }

    /// Burn one card and deal the next street, or settle at showdown.
    fn advance_stage(&mut self) {
        match self.stage {
            Stage::PreFlop => {
                self.deck.burn();
                let flop = [self.deck.draw(), self.deck.draw(), self.deck.draw()];
                self.community.extend(flop.into_iter().flatten());
                self.stage = Stage::Flop;
                self.begin_street();
            }
            Stage::Flop => {
                self.deck.burn();
                if let Some(c) = self.deck.draw() {
                    self.community.push(c);
                }
                self.stage = Stage::Turn;
                self.begin_street();
            }
            Stage::Turn => {
                self.deck.burn();
                if let Some(c) = self.deck.draw() {
                    self.community.push(c);
                }
                self.stage = Stage::River;
                self.begin_street();
            }
            Stage::River => {
                self.stage = Stage::Showdown;
                self.settle();
            }
            Stage::Showdown => {}
        }
    }

    /// Reset per-street betting state on entry to Flop/Turn/River.
    fn begin_street(&mut self) {
        debug!("entering {:?}, board {} cards", self.stage, self.community.len());
        for p in &mut self.players {
            p.current_bet = 0;
            p.acted = false;
        }
        self.current_bet = 0;
        self.last_raise_amount = self.big_blind;
        // Last to act: the most recent non-folded seat at or before the
        // dealer, walking backward.
        let n = self.players.len();
        let mut lta = self.dealer;
        for _ in 0..n {
            if self.players[lta].in_hand() {
                break;
            }
            lta = (lta + n - 1) % n;
        }
        self.last_to_act = lta;
        self.current_player = self.next_actor_from(self.dealer);
    }

    /// When nobody is left to act but more than one player is contesting,
    /// cascade the remaining streets (burns included) straight to showdown.
    fn maybe_auto_runout(&mut self) {
        if matches!(self.stage, Stage::Showdown) {
            return;
        }
        if self.count_can_act() > 1 || !self.bets_matched() {
            return;
        }
        if self.count_in_hand() < 2 {
            // Fold wins settle directly in fold().
            return;
        }
        while !matches!(self.stage, Stage::Showdown) {
            self.advance_stage();
        }
    }

    // ---- settlement --------------------------------------------------------

    /// Split total contributions into a main pot plus one side pot per
    /// distinct contribution level among the remaining contenders. Folded
    /// money is included in the amounts; eligibility is restricted to
    /// non-folded players whose contribution reaches the pot's threshold.
    /// Pots always sum to the total contributed.
    pub fn compute_side_pots(&self) -> Vec<SidePot> {
        let mut levels: Vec<u64> = self
            .players
            .iter()
            .filter(|p| p.in_hand() && p.total_bet > 0)
            .map(|p| p.total_bet)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut pots = Vec::new();
        let mut prev = 0u64;
        for &level in &levels {
            let amount: u64 = self
                .players
                .iter()
                .map(|p| p.total_bet.min(level).saturating_sub(p.total_bet.min(prev)))
                .sum();
            let eligible: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| p.in_hand() && p.total_bet >= level)
                .map(|p| p.id)
                .collect();
            if amount > 0 && !eligible.is_empty() {
                pots.push(SidePot { amount, eligible });
            }
            prev = level;
        }

        let remainder: u64 =
            self.players.iter().map(|p| p.total_bet.saturating_sub(prev)).sum();
        if remainder > 0 {
            let mut eligible: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| p.in_hand() && p.total_bet > prev)
                .map(|p| p.id)
                .collect();
            if eligible.is_empty() {
                // Over-contribution from folded seats: fall back to every
                // remaining contender so no chips are stranded.
                eligible = self.players.iter().filter(|p| p.in_hand()).map(|p| p.id).collect();
            }
            if eligible.is_empty() {
                if let Some(last) = pots.last_mut() {
                    last.amount += remainder;
                }
            } else {
                pots.push(SidePot { amount: remainder, eligible });
            }
        }
        pots
    }

    /// Award every pot to the best hand(s) among its eligible players.
    fn settle(&mut self) {
        debug_assert!(matches!(self.stage, Stage::Showdown));
        let total: u64 = self.players.iter().map(|p| p.total_bet).sum();
        if total == 0 {
            return;
        }
        self.pot = total;

        // With more than one contender the board must be complete before
        // hands can be ranked.
        if self.count_in_hand() > 1 {
            while self.community.len() < 5 {
                self.deck.burn();
                match self.deck.draw() {
                    Some(c) => self.community.push(c),
                    None => break,
                }
            }
        }

        self.side_pots = self.compute_side_pots();
        let evals: Vec<Option<HandEvaluation>> = self
            .players
            .iter()
            .map(|p| {
                if !p.in_hand() {
                    return None;
                }
                let hole = p.hole?;
                let mut cards = hole.as_array().to_vec();
                cards.extend_from_slice(self.community.as_slice());
                evaluate(&cards).ok()
            })
            .collect();

        let n = self.players.len();
        let start = (self.dealer + 1) % n;
        let mut winnings = vec![0u64; n];
        let mut shared = vec![false; n];

        for pot in &self.side_pots {
            let eligible: Vec<usize> = (0..n)
                .filter(|&i| pot.eligible.contains(&self.players[i].id))
                .collect();
            if eligible.is_empty() {
                continue;
            }
            // Best evaluation wins; if nobody in the pot can be evaluated
            // (short board, missing holes), split evenly among contenders.
            let best = eligible.iter().filter_map(|&i| evals[i].as_ref()).map(|e| e.value).max();
            let mut pot_winners: Vec<usize> = match best {
                Some(v) => eligible
                    .iter()
                    .copied()
                    .filter(|&i| evals[i].as_ref().is_some_and(|e| e.value == v))
                    .collect(),
                None => eligible.clone(),
            };
            // Odd chips go to the earliest eligible seat clockwise of the
            // dealer.
            pot_winners.sort_by_key(|&i| (i + n - start) % n);
            let per = pot.amount / pot_winners.len() as u64;
            let mut rem = (pot.amount % pot_winners.len() as u64) as usize;
            for &i in &pot_winners {
                let mut amt = per;
                if rem > 0 {
                    amt += 1;
                    rem -= 1;
                }
                winnings[i] += amt;
                if pot_winners.len() > 1 {
                    shared[i] = true;
                }
            }
        }

        for p in &mut self.players {
            p.current_bet = 0;
        }
        for i in 0..n {
            if winnings[i] == 0 {
                continue;
            }
            self.players[i].chips += winnings[i];
            let verb = if shared[i] { LogVerb::Split } else { LogVerb::Win };
            self.record(i, verb, Some(winnings[i]));
        }
        self.pot = 0;
        self.current_bet = 0;
        debug!("hand settled: {} chips distributed", total);
    }

    fn record(&mut self, seat: usize, verb: LogVerb, amount: Option<u64>) {
        self.log.push(LogEntry { seat, verb, amount, stage: self.stage });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, Rank, Suit};
    use crate::fairness::Seed;

    fn seeded_deck(byte: u8) -> Deck {
        Deck::from_seed(&Seed::from_bytes([byte; 32]))
    }

    fn mk_game(n: usize, chips: u64) -> GameState {
        let players = (0..n).map(|i| Player::new(i as u64, format!("P{i}"), chips)).collect();
        GameState::new(players, 5, 10)
    }

    fn hole(a: Card, b: Card) -> HoleCards {
        HoleCards::try_new(a, b).expect("valid hole cards")
    }

    #[test]
    fn heads_up_setup_posts_blinds_and_dealer_acts_first() {
        let mut g = mk_game(2, 1000);
        g.small_blind = 10;
        g.big_blind = 20;
        g.start_new_hand(seeded_deck(1)).unwrap();
        let d = g.dealer;
        let other = (d + 1) % 2;
        assert_eq!(g.players[d].current_bet, 10, "dealer posts the small blind heads-up");
        assert_eq!(g.players[other].current_bet, 20);
        assert_eq!(g.pot, 30);
        assert_eq!(g.current_player, d, "dealer acts first preflop heads-up");
        assert_eq!(g.current_bet, 20);
    }

    #[test]
    fn hole_cards_are_dealt_round_robin() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(2)).unwrap();
        let deck = Deck::from_seed(&Seed::from_bytes([2u8; 32]));
        let order = [
            (g.dealer + 1) % 3,
            (g.dealer + 2) % 3,
            g.dealer,
        ];
        // First three deck cards are everyone's first card, next three the
        // second card.
        for (k, &seat) in order.iter().enumerate() {
            let h = g.players[seat].hole.unwrap();
            assert_eq!(h.first(), deck.peek(k).unwrap());
            assert_eq!(h.second(), deck.peek(k + 3).unwrap());
        }
    }

    #[test]
    fn checking_around_reaches_the_turn() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(3)).unwrap();
        // Preflop: UTG (= dealer with 3 players) calls, SB completes, BB checks.
        g.call().unwrap();
        g.call().unwrap();
        g.check().unwrap();
        assert_eq!(g.stage, Stage::Flop);
        assert_eq!(g.community.len(), 3);
        g.check().unwrap();
        g.check().unwrap();
        g.check().unwrap();
        assert_eq!(g.stage, Stage::Turn);
        assert_eq!(g.community.len(), 4);
    }

    #[test]
    fn big_blind_keeps_the_preflop_option() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(4)).unwrap();
        g.call().unwrap();
        g.call().unwrap();
        // Action is on the big blind, bets are matched, but the street must
        // not end before the blind has had a say.
        assert_eq!(g.stage, Stage::PreFlop);
        assert_eq!(g.current_player, g.big_blind_pos);
    }

    #[test]
    fn under_minimum_bet_with_chips_degrades_to_call() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(5)).unwrap();
        let utg = g.current_player;
        // Table bet is 10; raising requires a delta of at least 10, so a
        // wager of 12 (delta 2) collapses to a call of 10.
        g.bet(12).unwrap();
        assert_eq!(g.players[utg].current_bet, 10);
        assert_eq!(g.current_bet, 10);
        assert_eq!(g.last_raise_amount, 10);
    }

    #[test]
    fn short_all_in_stands_without_reopening() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(6)).unwrap();
        let utg = g.current_player;
        g.players[utg].chips = 14;
        g.bet(14).unwrap();
        assert!(g.players[utg].all_in);
        assert_eq!(g.current_bet, 14, "short all-in raises the table bet");
        assert_eq!(g.last_raise_amount, 10, "short all-in does not reset the raise unit");
        assert_ne!(g.last_to_act, utg);
    }

    #[test]
    fn raise_moves_last_to_act_and_resets_raise_unit() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(7)).unwrap();
        let utg = g.current_player;
        g.bet(40).unwrap(); // raises the 10 blind to 40, delta 30
        assert_eq!(g.current_bet, 40);
        assert_eq!(g.last_raise_amount, 30);
        assert_eq!(g.last_to_act, utg);
    }

    #[test]
    fn check_facing_bet_is_rejected_without_state_change() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(8)).unwrap();
        let before = g.clone();
        assert_eq!(g.check(), Err(ActionError::CheckFacingBet));
        assert_eq!(g, before, "rejected action must not mutate state");
    }

    #[test]
    fn fold_to_one_short_circuits_to_showdown() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(9)).unwrap();
        g.fold().unwrap();
        g.fold().unwrap();
        assert_eq!(g.stage, Stage::Showdown);
        let winner = g.players.iter().find(|p| p.in_hand()).unwrap();
        assert_eq!(winner.chips, 1000 + 15 - winner.total_bet);
        assert_eq!(g.pot, 0);
    }

    #[test]
    fn all_in_cascade_runs_out_the_board() {
        let mut g = mk_game(3, 100);
        g.start_new_hand(seeded_deck(10)).unwrap();
        g.all_in().unwrap();
        g.call().unwrap();
        g.call().unwrap();
        assert_eq!(g.stage, Stage::Showdown);
        assert_eq!(g.community.len(), 5);
        let total: u64 = g.players.iter().map(|p| p.chips).sum();
        assert_eq!(total, 300, "chips conserved through runout and settlement");
    }

    #[test]
    fn burns_happen_before_each_street() {
        let mut g = mk_game(2, 1000);
        g.start_new_hand(seeded_deck(11)).unwrap();
        let fresh = Deck::from_seed(&Seed::from_bytes([11u8; 32]));
        g.call().unwrap();
        g.check().unwrap();
        assert_eq!(g.stage, Stage::Flop);
        // 4 hole cards dealt, then burn + 3 flop cards: flop is positions 5-7.
        let board = g.community.as_slice();
        assert_eq!(board[0], fresh.peek(5).unwrap());
        assert_eq!(board[1], fresh.peek(6).unwrap());
        assert_eq!(board[2], fresh.peek(7).unwrap());
    }

    #[test]
    fn side_pots_cover_every_contribution_level() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(12)).unwrap();
        for p in &mut g.players {
            p.current_bet = 0;
            p.total_bet = 0;
            p.all_in = false;
            p.folded = false;
        }
        g.players[0].total_bet = 100;
        g.players[1].total_bet = 50;
        g.players[1].all_in = true;
        g.players[2].total_bet = 200;
        g.players[2].all_in = true;

        let pots = g.compute_side_pots();
        let total: u64 = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, 350, "pots must sum to total contributions");

        // Levels at 50, 200, plus a 100 remainder slice between them.
        assert_eq!(pots[0].amount, 150);
        assert_eq!(pots[0].eligible.len(), 3);
        assert_eq!(pots[1].amount, 100);
        assert!(pots[1].eligible.contains(&0));
        assert!(pots[1].eligible.contains(&2));
        assert!(!pots[1].eligible.contains(&1), "short all-in excluded above its level");
        assert_eq!(pots[2].amount, 100);
        assert_eq!(pots[2].eligible, vec![2]);
    }

    #[test]
    fn settlement_awards_side_pots_by_hand_strength() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(13)).unwrap();
        g.stage = Stage::Showdown;
        g.community = Board::new(vec![
            Card::new(Rank::Two, Suit::Clubs),
            Card::new(Rank::Three, Suit::Diamonds),
            Card::new(Rank::Four, Suit::Hearts),
            Card::new(Rank::Eight, Suit::Spades),
            Card::new(Rank::King, Suit::Clubs),
        ]);
        g.players[0].hole =
            Some(hole(Card::new(Rank::Queen, Suit::Spades), Card::new(Rank::Queen, Suit::Hearts)));
        g.players[1].hole =
            Some(hole(Card::new(Rank::Ace, Suit::Spades), Card::new(Rank::Ace, Suit::Hearts)));
        g.players[2].hole =
            Some(hole(Card::new(Rank::Seven, Suit::Clubs), Card::new(Rank::Six, Suit::Clubs)));
        for p in &mut g.players {
            p.all_in = true;
            p.folded = false;
            p.chips = 0;
            p.current_bet = 0;
        }
        g.players[0].total_bet = 100;
        g.players[1].total_bet = 50;
        g.players[2].total_bet = 200;
        g.pot = 350;

        g.settle();

        assert_eq!(g.players[1].chips, 150, "main pot to the best hand");
        assert_eq!(g.players[0].chips, 100, "middle pot to the next best hand");
        assert_eq!(g.players[2].chips, 100, "lone-eligible top pot returns to contributor");
    }

    #[test]
    fn tied_winners_split_with_odd_chip_by_seat_order() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(14)).unwrap();
        g.stage = Stage::Showdown;
        g.dealer = 0;
        g.community = Board::new(vec![
            Card::new(Rank::Ace, Suit::Clubs),
            Card::new(Rank::King, Suit::Diamonds),
            Card::new(Rank::Queen, Suit::Hearts),
            Card::new(Rank::Jack, Suit::Spades),
            Card::new(Rank::Two, Suit::Clubs),
        ]);
        g.players[0].hole =
            Some(hole(Card::new(Rank::Ten, Suit::Clubs), Card::new(Rank::Three, Suit::Diamonds)));
        g.players[1].hole =
            Some(hole(Card::new(Rank::Ten, Suit::Hearts), Card::new(Rank::Four, Suit::Spades)));
        g.players[2].hole =
            Some(hole(Card::new(Rank::Nine, Suit::Clubs), Card::new(Rank::Nine, Suit::Diamonds)));
        for p in &mut g.players {
            p.all_in = true;
            p.folded = false;
            p.chips = 0;
            p.current_bet = 0;
        }
        g.players[0].total_bet = 1;
        g.players[1].total_bet = 1;
        g.players[2].total_bet = 2;
        g.pot = 4;

        g.settle();

        // Seats 0 and 1 tie with the board straight; seat 1 sits closer to
        // the dealer's left and takes the odd chip.
        assert_eq!(g.players[1].chips, 2);
        assert_eq!(g.players[0].chips, 1);
        assert_eq!(g.players[2].chips, 1);
    }

    #[test]
    fn zero_stack_players_sit_out() {
        let mut g = mk_game(3, 100);
        g.players[1].chips = 0;
        g.start_new_hand(seeded_deck(15)).unwrap();
        assert!(!g.players[1].active);
        assert!(g.players[1].hole.is_none());
        assert_ne!(g.current_player, 1);
    }

    #[test]
    fn hand_needs_two_funded_players() {
        let mut g = mk_game(3, 100);
        g.players[0].chips = 0;
        g.players[1].chips = 0;
        assert_eq!(g.start_new_hand(seeded_deck(16)), Err(StartError::NotEnoughPlayers));
    }

    #[test]
    fn betting_actions_counter_tracks_accepted_actions() {
        let mut g = mk_game(3, 1000);
        g.start_new_hand(seeded_deck(17)).unwrap();
        assert_eq!(g.betting_actions, 0, "blinds are not actions");
        g.call().unwrap();
        g.call().unwrap();
        g.check().unwrap();
        assert_eq!(g.betting_actions, 3);
    }
}
