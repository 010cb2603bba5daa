use serde::{Deserialize, Serialize};

/// Final standing of a session, in the shape a high-score store records it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Name the player configured.
    pub player_name: String,
    /// Banked score.
    pub score: u64,
    /// Last level reached.
    pub level: u32,
    /// Whether every level was cleared.
    pub victory: bool,
}
