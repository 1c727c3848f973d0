use derive_new::new;
use serde::{Deserialize, Serialize};

use super::Account;
use crate::database::Record;
use crate::time::{now, Timestamp};

/// Cumulative channel statistics of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct ChannelStats {
    pub total_views: u64,
    pub subscribers: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub videos_uploaded: u64,
    pub estimated_earnings: f64,
    pub engagement_rate: f64,
    pub watch_time_hours: f64,
}

impl ChannelStats {
    /// Engagement in percent, rounded to two decimals. Zero until the channel has views.
    pub fn engagement(&self) -> f64 {
        if self.total_views == 0 {
            return 0.0;
        }

        let interactions = self.total_likes.saturating_add(self.total_comments) as f64;
        let rate = 100.0 * interactions / self.total_views as f64;
        (rate * 100.0).round() / 100.0
    }
}

/// One persisted copy of an account's statistics. Snapshots are only ever appended.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct StatsSnapshot {
    #[new(default)]
    pub id: Record<StatsSnapshot>,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub account: Record<Account>,
    pub stats: ChannelStats,
}

crate::table!("stats": StatsSnapshot = id);
