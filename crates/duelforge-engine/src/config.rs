//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Every room holds at most two duelists. This is a structural limit —
/// resolution destructures exactly two seats — not a tunable.
pub const ROOM_CAPACITY: usize = 2;

/// Configuration for a [`DuelEngine`](crate::DuelEngine) instance.
///
/// Constructed once at process start and injected — there is no ambient
/// global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// HP each player starts a match with. Restored by a match reset.
    pub starting_hp: i32,

    /// How long after a match-ending resolution the automatic match
    /// reset fires, giving clients time to display the outcome.
    pub match_reset_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_hp: 10,
            match_reset_delay: Duration::from_secs(2),
        }
    }
}
