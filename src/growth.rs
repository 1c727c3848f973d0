//! One step of synthetic channel growth.
//!
//! Every metric gets a uniformly drawn base amount that is scaled by the elapsed hours and by a
//! multiplier that shrinks as the channel grows. Each metric has a floor so that even a tiny step
//! shows some progress.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::model::{ChannelStats, GrowthDelta};

/// Watch time credited per view, in hours (three minutes).
pub const WATCH_HOURS_PER_VIEW: f64 = 0.05;

const BASE_CPM: f64 = 0.5;
const MAX_CPM_BONUS: f64 = 2.0;
const SUBSCRIBERS_PER_CPM_POINT: f64 = 10_000.0;

const MIN_MULTIPLIER: f64 = 0.1;

/// Draw range and floor of one metric.
#[derive(Debug, Clone)]
struct Metric {
    draw: RangeInclusive<u64>,
    floor: u64,
}

const VIEWS: Metric = Metric {
    draw: 50..=300,
    floor: 10,
};
const SUBSCRIBERS: Metric = Metric {
    draw: 1..=15,
    floor: 1,
};
const LIKES: Metric = Metric {
    draw: 10..=60,
    floor: 1,
};
const COMMENTS: Metric = Metric {
    draw: 1..=20,
    floor: 0,
};
const SHARES: Metric = Metric {
    draw: 1..=10,
    floor: 0,
};

impl Metric {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, scale: f64) -> u64 {
        let base = rng.gen_range(self.draw.clone()) as f64;
        let scaled = (base * scale) as u64;
        scaled.max(self.floor)
    }
}

/// Growth slows down as the subscriber base grows, but never drops below a tenth of the base rate.
pub fn base_multiplier(subscribers: u64) -> f64 {
    (10.0 / (subscribers as f64 + 1.0)).max(MIN_MULTIPLIER)
}

/// Cost per thousand views, rising with the subscriber count up to a fixed bonus.
pub fn cpm(subscribers: u64) -> f64 {
    BASE_CPM + (subscribers as f64 / SUBSCRIBERS_PER_CPM_POINT).min(MAX_CPM_BONUS)
}

/// Draws the delta for `hours` of growth without applying it.
pub fn draw_delta<R: Rng + ?Sized>(current: &ChannelStats, hours: f64, rng: &mut R) -> GrowthDelta {
    let scale = hours * base_multiplier(current.subscribers);

    GrowthDelta {
        views: VIEWS.sample(rng, scale),
        subscribers: SUBSCRIBERS.sample(rng, scale),
        likes: LIKES.sample(rng, scale),
        comments: COMMENTS.sample(rng, scale),
        shares: SHARES.sample(rng, scale),
    }
}

/// Adds `delta` to the totals and recomputes the derived metrics. Totals saturate at `u64::MAX`.
pub fn apply_delta(current: &ChannelStats, delta: &GrowthDelta) -> ChannelStats {
    let mut updated = *current;

    updated.total_views = updated.total_views.saturating_add(delta.views);
    updated.subscribers = updated.subscribers.saturating_add(delta.subscribers);
    updated.total_likes = updated.total_likes.saturating_add(delta.likes);
    updated.total_comments = updated.total_comments.saturating_add(delta.comments);
    updated.watch_time_hours += delta.views as f64 * WATCH_HOURS_PER_VIEW;
    updated.estimated_earnings += delta.views as f64 / 1000.0 * cpm(updated.subscribers);
    updated.engagement_rate = updated.engagement();

    updated
}

/// Computes one growth step: the randomized delta and the statistics after applying it.
///
/// `hours` must be positive and finite; callers validate it.
pub fn simulate_growth<R: Rng + ?Sized>(
    current: &ChannelStats,
    hours: f64,
    rng: &mut R,
) -> (GrowthDelta, ChannelStats) {
    debug_assert!(hours.is_finite() && hours > 0.0, "hours must be positive");

    let delta = draw_delta(current, hours, rng);
    let updated = apply_delta(current, &delta);
    (delta, updated)
}
