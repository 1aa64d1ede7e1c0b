//! Game modes. The two modes share one round state machine and differ
//! only in recall direction and progression step.

use crate::config::ProgressionConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Recall the sequence in reveal order.
    Classic,
    /// Recall the sequence in reverse reveal order.
    NBack,
}

impl GameMode {
    pub const ALL: [GameMode; 2] = [GameMode::Classic, GameMode::NBack];

    /// Stable key used in the score file.
    pub fn key(self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::NBack => "nback",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameMode::Classic => "Classic Mode",
            GameMode::NBack => "N-Back Mode",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            GameMode::Classic => "Recall the sequence",
            GameMode::NBack => "Recall the sequence in reverse",
        }
    }

    /// Does this mode expect the recall target reversed?
    pub fn reversed_recall(self) -> bool {
        matches!(self, GameMode::NBack)
    }

    /// Levels gained per completed round.
    pub fn level_step(self, rules: &ProgressionConfig) -> usize {
        match self {
            GameMode::Classic => rules.classic_step,
            GameMode::NBack => rules.nback_step,
        }
    }
}
