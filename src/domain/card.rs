//! Cards and the symbol catalog.
//!
//! A round deals `level` cards, each carrying a distinct symbol drawn
//! from the catalog. Card identity is the id alone (position in the
//! drawn sequence); the symbol is what the player sees.
//!
//! Dealing shuffles the *whole* catalog (Fisher–Yates via `rand`) and
//! takes a prefix, so every draw is an unbiased permutation. The RNG is
//! passed in by the caller, which is what makes the deal pinnable in
//! tests.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

/// One face-up card. Equality is by `id`; the symbol is cosmetic.
#[derive(Clone, Debug)]
pub struct Card {
    pub id: usize,
    pub symbol: String,
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Card {}

/// Asking for more cards than the catalog holds. This is a configuration
/// bug, not a runtime condition: level progression clamps to
/// `SymbolCatalog::max_level`, so a correctly wired game never hits it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeckError {
    Exhausted { requested: usize, available: usize },
}

impl fmt::Display for DeckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeckError::Exhausted { requested, available } => write!(
                f,
                "deck exhausted: requested {requested} cards, catalog has {available} symbols"
            ),
        }
    }
}

impl std::error::Error for DeckError {}

/// The built-in symbol set: 86 distinct emoji, enough for level 86.
const BUILTIN_SYMBOLS: &[&str] = &[
    // Games & sport
    "🎈", "🎨", "🎭", "🎪", "🎫", "🎮", "🎲", "🎯", "🎱", "🎳",
    "⚽️", "🏀", "🏈", "🎾", "🏐",
    // Animals
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯",
    "🦁", "🐮", "🐷", "🐸", "🐵",
    // Food
    "🍎", "🍐", "🍊", "🍋", "🍌", "🍉", "🍇", "🍓", "🫐", "🍒",
    "🥝", "🍅", "🥥", "🥑", "🌶️",
    // Transport
    "✈️", "🚗", "🚲", "🚂", "🚁", "🚀", "🛸", "🛵", "🏎️", "🚌",
    "🚓", "🚑", "🚕", "⛵️", "🛳️",
    // Nature
    "🌸", "🌺", "🌻", "🌹", "🌴", "🌈", "⭐️", "🌙", "☀️", "❄️",
    "🌊", "🔥", "⚡️", "🌍", "🌵",
    // Music & gadgets
    "💎", "🎵", "🎹", "🎬", "📱", "⌚️", "💻", "🎸", "🎺", "🎤",
    "🎧",
];

/// Ordered, fixed set of distinct symbols. Catalog length bounds the
/// highest playable level.
#[derive(Clone, Debug)]
pub struct SymbolCatalog {
    symbols: Vec<String>,
}

impl SymbolCatalog {
    pub fn builtin() -> Self {
        SymbolCatalog {
            symbols: BUILTIN_SYMBOLS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Build a catalog from user-supplied symbols (config override).
    /// Rejects empty sets and duplicate entries.
    pub fn from_symbols(symbols: Vec<String>) -> Result<Self, String> {
        if symbols.is_empty() {
            return Err("symbol catalog is empty".to_string());
        }
        for (i, sym) in symbols.iter().enumerate() {
            if symbols[..i].iter().any(|s| s == sym) {
                return Err(format!("duplicate symbol in catalog: {sym}"));
            }
        }
        Ok(SymbolCatalog { symbols })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Highest level the catalog can supply cards for.
    pub fn max_level(&self) -> usize {
        self.symbols.len()
    }

    /// Deal `count` cards: shuffle the full catalog, take the first
    /// `count` symbols, assign ids 0..count in drawn order.
    pub fn deal<R: Rng>(&self, count: usize, rng: &mut R) -> Result<Vec<Card>, DeckError> {
        if count > self.symbols.len() {
            return Err(DeckError::Exhausted {
                requested: count,
                available: self.symbols.len(),
            });
        }

        let mut order: Vec<usize> = (0..self.symbols.len()).collect();
        order.shuffle(rng);

        Ok(order[..count]
            .iter()
            .enumerate()
            .map(|(id, &sym)| Card {
                id,
                symbol: self.symbols[sym].clone(),
            })
            .collect())
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
