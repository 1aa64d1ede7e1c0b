//! Events emitted by round state-machine operations.
//! The presentation layer consumes these for rendering/sound.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A new round began; the first sequence card is up.
    RoundStarted { level: usize },
    /// The reveal stepped to the sequence card at this index.
    CardShown { index: usize },
    /// The reveal finished; selections are now accepted.
    InputOpen,
    /// A card was added to the selection.
    SelectionAdded { card_id: usize },
    /// A previously selected card was tapped again and removed.
    SelectionRemoved { card_id: usize },
    /// An operation arrived in the wrong phase and was dropped.
    InputIgnored,
    /// Full-length selection matched the target.
    RoundWon { level: usize, new_best: bool },
    /// Full-length selection did not match; level drops to the floor.
    RoundLost { level: usize },
}
