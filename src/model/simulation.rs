use std::ops::{Add, AddAssign};

use derive_new::new;
use serde::{Deserialize, Serialize};

use super::Account;
use crate::database::Record;
use crate::time::{now, Timestamp};

/// The change produced by one growth computation, before it is added to the totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, new)]
pub struct GrowthDelta {
    pub subscribers: u64,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl Add for GrowthDelta {
    type Output = GrowthDelta;

    fn add(self, rhs: Self) -> Self::Output {
        GrowthDelta {
            subscribers: self.subscribers.saturating_add(rhs.subscribers),
            views: self.views.saturating_add(rhs.views),
            likes: self.likes.saturating_add(rhs.likes),
            comments: self.comments.saturating_add(rhs.comments),
            shares: self.shares.saturating_add(rhs.shares),
        }
    }
}

impl AddAssign for GrowthDelta {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for GrowthDelta {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(GrowthDelta::default(), Add::add)
    }
}

/// Immutable log entry of one growth step.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct SimulationRecord {
    #[new(default)]
    pub id: Record<SimulationRecord>,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub account: Record<Account>,
    pub hours: f64,
    pub delta: GrowthDelta,
}

crate::table!("simulations": SimulationRecord = id);
