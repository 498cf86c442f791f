//! Daily login reward notification.

use serde::{Deserialize, Serialize};

/// Points granted for a login streak, shown once and then dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReward {
    /// Loyalty points awarded today.
    pub points: u64,
    /// Consecutive login days including today.
    pub streak: u32,
}
