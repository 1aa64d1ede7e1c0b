//! The round state machine.
//!
//! One `Session` plays rounds of a single mode:
//!
//!   Ready ──start_round──▶ Revealing ──advance_reveal×N──▶ AwaitingInput
//!     ▲                                                        │
//!     └───────────── resolve (synchronous) ◀──full selection───┘
//!
//! The machine owns no timing: the presentation layer calls
//! `advance_reveal` once per reveal tick, exactly like the tick loop
//! drives a simulation step. Every operation returns the events it
//! produced; the UI and sound layers react to those.
//!
//! Out-of-phase calls never mutate state. `submit_selection` signals the
//! rejection with `GameEvent::InputIgnored` so stray taps stay
//! diagnosable; a stray reveal tick is dropped silently (the timer keeps
//! running across phases by design of the caller, not by error).

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::ProgressionConfig;
use crate::domain::card::{Card, DeckError, SymbolCatalog};
use crate::domain::mode::GameMode;
use crate::sim::event::GameEvent;
use crate::sim::score::ScoreStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Idle between rounds. The only phase that accepts `start_round`.
    Ready,
    /// Sequence cards are being shown one at a time.
    Revealing,
    /// The player reconstructs the sequence by selecting cards.
    AwaitingInput,
    /// Transient: the full selection is being checked. Resolves back to
    /// `Ready` before `submit_selection` returns, so callers never
    /// observe it.
    Evaluating,
}

pub struct Session {
    mode: GameMode,
    rules: ProgressionConfig,
    /// Catalog-derived ceiling; progression never climbs past it.
    max_level: usize,
    phase: Phase,
    level: usize,
    /// Reveal order — the order the player must reproduce.
    sequence: Vec<Card>,
    /// The same cards, independently shuffled for the selection grid.
    display: Vec<Card>,
    reveal_index: usize,
    /// Ordered card ids picked so far. Each id appears at most once.
    selection: Vec<usize>,
}

impl Session {
    pub fn new(mode: GameMode, rules: ProgressionConfig, max_level: usize) -> Self {
        Session {
            mode,
            rules,
            max_level,
            phase: Phase::Ready,
            level: rules.start_level.min(max_level),
            sequence: Vec::new(),
            display: Vec::new(),
            reveal_index: 0,
            selection: Vec::new(),
        }
    }

    // ── Observable state ──

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Level of the round in progress, or of the next round when Ready.
    pub fn level(&self) -> usize {
        self.level
    }

    /// The sequence card currently shown, while revealing.
    pub fn current_card(&self) -> Option<&Card> {
        match self.phase {
            Phase::Revealing => self.sequence.get(self.reveal_index),
            _ => None,
        }
    }

    pub fn reveal_index(&self) -> usize {
        self.reveal_index
    }

    /// Cards in grid order, for rendering the tap surface.
    pub fn display_cards(&self) -> &[Card] {
        &self.display
    }

    /// Card ids picked so far, in pick order.
    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    // ── Operations ──

    /// Begin a round at the current level: deal the reveal sequence,
    /// shuffle an independent copy for the grid, show the first card.
    ///
    /// Only valid from `Ready`; otherwise the running round is kept and
    /// the call is reported as ignored. `DeckError` means the level
    /// outgrew the catalog, which a correctly clamped session prevents.
    pub fn start_round<R: Rng>(
        &mut self,
        catalog: &SymbolCatalog,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, DeckError> {
        if self.phase != Phase::Ready {
            return Ok(vec![GameEvent::InputIgnored]);
        }

        self.sequence = catalog.deal(self.level, rng)?;
        // Second independent shuffle. It may coincide with the reveal
        // order; that is allowed, not filtered.
        self.display = self.sequence.clone();
        self.display.shuffle(rng);

        self.reveal_index = 0;
        self.selection.clear();
        self.phase = Phase::Revealing;

        Ok(vec![
            GameEvent::RoundStarted { level: self.level },
            GameEvent::CardShown { index: 0 },
        ])
    }

    /// Step the reveal. Driven externally once per reveal interval.
    /// After the last card the round switches to input.
    pub fn advance_reveal(&mut self) -> Vec<GameEvent> {
        if self.phase != Phase::Revealing {
            return vec![];
        }

        self.reveal_index += 1;
        if self.reveal_index < self.sequence.len() {
            vec![GameEvent::CardShown { index: self.reveal_index }]
        } else {
            self.phase = Phase::AwaitingInput;
            self.selection.clear();
            vec![GameEvent::InputOpen]
        }
    }

    /// Toggle a card in the selection. Selecting an already-picked card
    /// removes it; a new card is appended. Once the selection reaches
    /// the round length the answer is checked immediately and the
    /// session returns to `Ready` with the next level set.
    pub fn submit_selection(&mut self, card_id: usize, scores: &mut ScoreStore) -> Vec<GameEvent> {
        if self.phase != Phase::AwaitingInput {
            return vec![GameEvent::InputIgnored];
        }
        if !self.display.iter().any(|c| c.id == card_id) {
            // Not a card of this round; nothing to toggle.
            return vec![GameEvent::InputIgnored];
        }

        let mut events = Vec::with_capacity(2);
        if let Some(pos) = self.selection.iter().position(|&id| id == card_id) {
            self.selection.remove(pos);
            events.push(GameEvent::SelectionRemoved { card_id });
        } else {
            self.selection.push(card_id);
            events.push(GameEvent::SelectionAdded { card_id });
        }

        if self.selection.len() == self.sequence.len() {
            events.push(self.resolve(scores));
        }
        events
    }

    // ── Validation ──

    /// Compare the full selection against the mode's target order and
    /// settle the round. Runs synchronously inside `submit_selection`.
    fn resolve(&mut self, scores: &mut ScoreStore) -> GameEvent {
        self.phase = Phase::Evaluating;

        let mut target: Vec<usize> = self.sequence.iter().map(|c| c.id).collect();
        if self.mode.reversed_recall() {
            target.reverse();
        }

        // Element-wise over the full length; no partial credit.
        let event = if self.selection == target {
            let level = self.level;
            let new_best = scores.record_completion(self.mode, level);
            self.level = (level + self.mode.level_step(&self.rules)).min(self.max_level);
            GameEvent::RoundWon { level, new_best }
        } else {
            let level = self.level;
            self.level = self.rules.start_level.min(self.max_level);
            GameEvent::RoundLost { level }
        };

        self.sequence.clear();
        self.display.clear();
        self.reveal_index = 0;
        self.selection.clear();
        self.phase = Phase::Ready;
        event
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::path::PathBuf;

    const RULES: ProgressionConfig = ProgressionConfig {
        start_level: 3,
        classic_step: 2,
        nback_step: 1,
    };

    fn rng(seed: u64) -> Pcg64 {
        Pcg64::seed_from_u64(seed)
    }

    /// Score store on a unique temp path (removed on drop via test body).
    fn scratch_scores(name: &str) -> (ScoreStore, PathBuf) {
        let path = std::env::temp_dir().join(format!(
            "memtrainer_round_{}_{}.dat",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        (ScoreStore::load(path.clone()), path)
    }

    fn session(mode: GameMode) -> Session {
        Session::new(mode, RULES, SymbolCatalog::builtin().max_level())
    }

    /// Start a round and run the reveal to completion.
    fn start_and_reveal(s: &mut Session, seed: u64) {
        let catalog = SymbolCatalog::builtin();
        s.start_round(&catalog, &mut rng(seed)).unwrap();
        while s.phase() == Phase::Revealing {
            s.advance_reveal();
        }
        assert_eq!(s.phase(), Phase::AwaitingInput);
    }

    // ── Round setup ──

    #[test]
    fn start_round_deals_and_shows_first_card() {
        let mut s = session(GameMode::Classic);
        let catalog = SymbolCatalog::builtin();
        let events = s.start_round(&catalog, &mut rng(1)).unwrap();

        assert_eq!(s.phase(), Phase::Revealing);
        assert_eq!(s.display_cards().len(), 3);
        assert_eq!(s.current_card().unwrap().id, 0);
        assert_eq!(
            events,
            vec![
                GameEvent::RoundStarted { level: 3 },
                GameEvent::CardShown { index: 0 },
            ]
        );
    }

    #[test]
    fn display_is_a_permutation_of_the_sequence() {
        let mut s = session(GameMode::Classic);
        let catalog = SymbolCatalog::builtin();
        s.start_round(&catalog, &mut rng(9)).unwrap();

        let mut ids: Vec<usize> = s.display_cards().iter().map(|c| c.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn reveal_steps_through_every_card_then_opens_input() {
        let mut s = session(GameMode::Classic);
        let catalog = SymbolCatalog::builtin();
        s.start_round(&catalog, &mut rng(2)).unwrap();

        assert_eq!(s.advance_reveal(), vec![GameEvent::CardShown { index: 1 }]);
        assert_eq!(s.current_card().unwrap().id, 1);
        assert_eq!(s.advance_reveal(), vec![GameEvent::CardShown { index: 2 }]);
        assert_eq!(s.advance_reveal(), vec![GameEvent::InputOpen]);
        assert_eq!(s.phase(), Phase::AwaitingInput);
        assert!(s.selection().is_empty());
        assert!(s.current_card().is_none());
    }

    #[test]
    fn start_round_during_reveal_is_ignored() {
        let mut s = session(GameMode::Classic);
        let catalog = SymbolCatalog::builtin();
        s.start_round(&catalog, &mut rng(3)).unwrap();
        let before: Vec<usize> = s.display_cards().iter().map(|c| c.id).collect();

        let events = s.start_round(&catalog, &mut rng(99)).unwrap();
        assert_eq!(events, vec![GameEvent::InputIgnored]);
        let after: Vec<usize> = s.display_cards().iter().map(|c| c.id).collect();
        assert_eq!(before, after);
        assert_eq!(s.phase(), Phase::Revealing);
    }

    #[test]
    fn oversized_level_fails_with_deck_exhausted() {
        let catalog = SymbolCatalog::from_symbols(
            ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        // Miswired on purpose: ceiling above what the catalog can deal.
        let mut s = Session::new(
            GameMode::Classic,
            ProgressionConfig {
                start_level: 5,
                classic_step: 2,
                nback_step: 1,
            },
            10,
        );
        let err = s.start_round(&catalog, &mut rng(4)).unwrap_err();
        assert_eq!(
            err,
            DeckError::Exhausted {
                requested: 5,
                available: 4
            }
        );
        assert_eq!(s.phase(), Phase::Ready);
    }

    // ── Validation ──

    #[test]
    fn forward_order_wins_classic() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("fwd_win");
        start_and_reveal(&mut s, 5);

        s.submit_selection(0, &mut scores);
        s.submit_selection(1, &mut scores);
        let events = s.submit_selection(2, &mut scores);
        assert!(events.contains(&GameEvent::RoundWon { level: 3, new_best: true }));
        assert_eq!(s.phase(), Phase::Ready);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn wrong_order_loses_classic() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("fwd_lose");
        start_and_reveal(&mut s, 5);

        s.submit_selection(0, &mut scores);
        s.submit_selection(2, &mut scores);
        let events = s.submit_selection(1, &mut scores);
        assert!(events.contains(&GameEvent::RoundLost { level: 3 }));
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(scores.best(GameMode::Classic), 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn reverse_order_wins_nback() {
        let mut s = session(GameMode::NBack);
        let (mut scores, path) = scratch_scores("rev_win");
        start_and_reveal(&mut s, 6);

        s.submit_selection(2, &mut scores);
        s.submit_selection(1, &mut scores);
        let events = s.submit_selection(0, &mut scores);
        assert!(events.contains(&GameEvent::RoundWon { level: 3, new_best: true }));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn reveal_order_loses_nback() {
        let mut s = session(GameMode::NBack);
        let (mut scores, path) = scratch_scores("rev_lose");
        start_and_reveal(&mut s, 6);

        s.submit_selection(0, &mut scores);
        s.submit_selection(1, &mut scores);
        let events = s.submit_selection(2, &mut scores);
        assert!(events.contains(&GameEvent::RoundLost { level: 3 }));

        let _ = std::fs::remove_file(path);
    }

    // ── Selection semantics ──

    #[test]
    fn second_tap_deselects() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("toggle");
        start_and_reveal(&mut s, 7);

        assert_eq!(
            s.submit_selection(1, &mut scores),
            vec![GameEvent::SelectionAdded { card_id: 1 }]
        );
        assert_eq!(
            s.submit_selection(1, &mut scores),
            vec![GameEvent::SelectionRemoved { card_id: 1 }]
        );
        assert!(s.selection().is_empty());
        assert_eq!(s.phase(), Phase::AwaitingInput);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn deselect_then_refill_still_validates() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("toggle_refill");
        start_and_reveal(&mut s, 7);

        s.submit_selection(0, &mut scores);
        s.submit_selection(2, &mut scores);
        s.submit_selection(2, &mut scores); // undo the mistake
        assert_eq!(s.selection(), &[0]);
        s.submit_selection(1, &mut scores);
        let events = s.submit_selection(2, &mut scores);
        assert!(events.contains(&GameEvent::RoundWon { level: 3, new_best: true }));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unknown_card_id_is_ignored() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("unknown_id");
        start_and_reveal(&mut s, 8);

        let events = s.submit_selection(999, &mut scores);
        assert_eq!(events, vec![GameEvent::InputIgnored]);
        assert!(s.selection().is_empty());

        let _ = std::fs::remove_file(path);
    }

    // ── Phase guards ──

    #[test]
    fn taps_during_reveal_are_ignored() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("guard_reveal");
        let catalog = SymbolCatalog::builtin();
        s.start_round(&catalog, &mut rng(10)).unwrap();

        let events = s.submit_selection(0, &mut scores);
        assert_eq!(events, vec![GameEvent::InputIgnored]);
        assert!(s.selection().is_empty());
        assert_eq!(s.phase(), Phase::Revealing);
        assert_eq!(s.reveal_index(), 0);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn taps_while_ready_are_ignored() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("guard_ready");
        let events = s.submit_selection(0, &mut scores);
        assert_eq!(events, vec![GameEvent::InputIgnored]);
        assert_eq!(s.phase(), Phase::Ready);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn reveal_tick_outside_reveal_is_a_noop() {
        let mut s = session(GameMode::Classic);
        assert!(s.advance_reveal().is_empty());
        assert_eq!(s.phase(), Phase::Ready);
        assert_eq!(s.reveal_index(), 0);
    }

    // ── Progression ──

    #[test]
    fn classic_win_steps_level_by_two() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("step_classic");
        start_and_reveal(&mut s, 11);
        for id in [0, 1, 2] {
            s.submit_selection(id, &mut scores);
        }
        assert_eq!(s.level(), 5);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn nback_win_steps_level_by_one() {
        let mut s = session(GameMode::NBack);
        let (mut scores, path) = scratch_scores("step_nback");
        start_and_reveal(&mut s, 11);
        for id in [2, 1, 0] {
            s.submit_selection(id, &mut scores);
        }
        assert_eq!(s.level(), 4);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn loss_resets_level_to_start() {
        let mut s = session(GameMode::Classic);
        let (mut scores, path) = scratch_scores("reset");

        // Win once to climb off the floor.
        start_and_reveal(&mut s, 12);
        for id in [0, 1, 2] {
            s.submit_selection(id, &mut scores);
        }
        assert_eq!(s.level(), 5);

        // Now blow the next round.
        start_and_reveal(&mut s, 13);
        for id in [4, 3, 2, 1, 0] {
            s.submit_selection(id, &mut scores);
        }
        assert_eq!(s.level(), 3);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn level_never_climbs_past_the_catalog() {
        let catalog = SymbolCatalog::from_symbols(
            ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect(),
        )
        .unwrap();
        let mut s = Session::new(GameMode::Classic, RULES, catalog.max_level());
        let (mut scores, path) = scratch_scores("clamp");

        s.start_round(&catalog, &mut rng(14)).unwrap();
        while s.phase() == Phase::Revealing {
            s.advance_reveal();
        }
        for id in [0, 1, 2] {
            s.submit_selection(id, &mut scores);
        }
        // 3 + 2 would be 5, but the catalog only holds 4 symbols.
        assert_eq!(s.level(), 4);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn repeat_win_at_same_level_is_not_a_new_best() {
        let mut s = session(GameMode::NBack);
        let (mut scores, path) = scratch_scores("best_flag");

        start_and_reveal(&mut s, 15);
        let events: Vec<GameEvent> = [2, 1, 0]
            .iter()
            .flat_map(|&id| s.submit_selection(id, &mut scores))
            .collect();
        assert!(events.contains(&GameEvent::RoundWon { level: 3, new_best: true }));

        // Fail back down, then win level 3 again.
        start_and_reveal(&mut s, 16);
        for id in [0, 1, 2, 3] {
            s.submit_selection(id, &mut scores);
        }
        assert_eq!(s.level(), 3);

        start_and_reveal(&mut s, 17);
        let events: Vec<GameEvent> = [2, 1, 0]
            .iter()
            .flat_map(|&id| s.submit_selection(id, &mut scores))
            .collect();
        assert!(events.contains(&GameEvent::RoundWon { level: 3, new_best: false }));

        let _ = std::fs::remove_file(path);
    }
}
