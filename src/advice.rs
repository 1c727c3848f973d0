//! Rule-based growth tips derived from the current statistics.

use crate::model::ChannelStats;

const FIRST_VIDEO: &str = "Create your first video with the content generator to get your channel started.";
const FIRST_SIMULATION: &str = "Run your first growth simulation to see how your channel could develop.";
const PUBLISH_MORE: &str = "Publish more videos: channels with at least three uploads grow noticeably faster.";
const ENGAGE: &str = "Engage with your audience: reply to comments and ask viewers questions to raise engagement.";
const MONETIZE: &str = "Enable monetization: your audience is large enough to start earning from it.";

const GENERAL: [&str; 4] = [
    "Keep a consistent upload schedule so viewers know when to come back.",
    "Experiment with thumbnails and titles to improve your click-through rate.",
    "Collaborate with creators in your niche to reach new viewers.",
    "Review your analytics after every simulation to spot what works.",
];

/// Tips for the given statistics, most specific first. Never empty.
pub fn recommendations(stats: &ChannelStats) -> Vec<&'static str> {
    let mut tips = Vec::new();

    if stats.subscribers == 0 {
        tips.push(FIRST_VIDEO);
        tips.push(FIRST_SIMULATION);
    }

    if stats.videos_uploaded < 3 {
        tips.push(PUBLISH_MORE);
    }

    if stats.total_views > 0 && stats.engagement_rate < 1.0 {
        tips.push(ENGAGE);
    }

    if stats.estimated_earnings < 10.0 && stats.subscribers > 100 {
        tips.push(MONETIZE);
    }

    if tips.is_empty() {
        tips.extend(GENERAL);
    }

    tips
}
