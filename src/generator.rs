//! Template-based video content: titles, descriptions, hashtags and timecodes.

use itertools::Itertools as _;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{Category, ContentBundle, Timecode};

/// Keyword used when no keyword is given and the category has no keyword bank.
pub const FALLBACK_KEYWORD: &str = "Trending Topic";

const KEYWORD_PLACEHOLDER: &str = "{keyword}";

const MAX_HASHTAGS: usize = 10;

const TIMECODE_OFFSETS: [u32; 5] = [0, 30, 120, 300, 600];
const TIMECODE_TOPICS: [&str; 5] = ["Intro", "Main part", "Demo", "Tips", "Outro"];

const PLATFORM_HASHTAGS: [&str; 3] = ["#youtube", "#youtuber", "#newvideo"];

const CALLS_TO_ACTION: [&str; 8] = [
    "🔔 Subscribe to the channel and hit the bell!",
    "👍 Leave a like if this video helped you!",
    "💬 Tell us what you think in the comments!",
    "📱 Links to our socials are below 👇",
    "🎯 New video every week!",
    "🌟 Don't forget to share with your friends!",
    "📅 The next episode is coming soon!",
    "🏆 Thank you for your support!",
];

fn title_templates(category: &Category) -> &'static [&'static str] {
    match category {
        Category::Gaming => &[
            "🎮 {keyword} - EPIC GAMEPLAY!",
            "🚀 {keyword}: ALL THE SECRETS",
            "🔥 {keyword} - FULL WALKTHROUGH",
            "🤯 {keyword} - YOU WON'T BELIEVE IT!",
            "👑 {keyword} - BECOMING THE BEST",
        ],
        Category::Tech => &[
            "🤖 {keyword} - REVIEW AND TESTS",
            "💻 {keyword}: TEARDOWN IN DETAIL",
            "⚡ {keyword} - AN HONEST REVIEW",
            "🔧 {keyword} - REPAIR AND SETUP",
            "🚀 {keyword} - THE FUTURE IS HERE",
        ],
        Category::Entertainment => &[
            "😄 {keyword} - FUNNY MOMENTS",
            "🎭 {keyword}: THE SHOW GOES ON",
            "🌟 {keyword} - BEST EPISODES",
            "🤣 {keyword} - LAUGHING TOGETHER",
            "🎬 {keyword} - BEHIND THE SCENES",
        ],
        Category::Education | Category::Other(_) => &[
            "📚 {keyword} - COMPLEX MADE SIMPLE",
            "💡 {keyword}: HOW IT WORKS",
            "🎓 {keyword} - THE COMPLETE GUIDE",
            "🧠 {keyword} - FROM BEGINNER TO PRO",
            "⚡ {keyword} - CRASH COURSE",
        ],
    }
}

/// Keywords drawn when the caller gives none. Unknown categories have no bank.
pub fn keyword_bank(category: &Category) -> Option<&'static [&'static str]> {
    let bank: &'static [&'static str] = match category {
        Category::Gaming => &[
            "Minecraft",
            "CS:GO",
            "Dota 2",
            "GTA 5",
            "Fortnite",
            "Warzone",
            "Valorant",
            "Apex Legends",
            "Cyberpunk",
            "Rocket League",
        ],
        Category::Education => &[
            "Python",
            "JavaScript",
            "Design",
            "Marketing",
            "English",
            "Finance",
            "Cooking",
            "Photography",
            "Music",
            "History",
        ],
        Category::Tech => &[
            "iPhone",
            "Android",
            "Laptop",
            "Graphics",
            "Processor",
            "Graphics Card",
            "Smartphone",
            "Tablet",
            "Headphones",
            "Camera",
        ],
        Category::Entertainment => &[
            "Pranks",
            "Top 10",
            "Reaction",
            "Challenge",
            "Interview",
            "Travel",
            "Food",
            "Music",
            "Dance",
            "Humor",
        ],
        Category::Other(_) => return None,
    };

    Some(bank)
}

fn base_hashtags(category: &Category) -> &'static [&'static str] {
    match category {
        Category::Gaming => &["#games", "#gaming", "#stream", "#letsplay", "#esports"],
        Category::Tech => &["#technology", "#gadgets", "#review", "#it", "#innovation"],
        Category::Entertainment => &["#entertainment", "#humor", "#top", "#pranks", "#reaction"],
        Category::Education | Category::Other(_) => {
            &["#learning", "#education", "#guide", "#tips", "#knowledge"]
        }
    }
}

/// Picks the keyword: the given one if it has any content, otherwise a random one from the bank.
pub fn choose_keyword<R: Rng + ?Sized>(category: &Category, keyword: Option<&str>, rng: &mut R) -> String {
    if let Some(keyword) = keyword.map(str::trim).filter(|keyword| !keyword.is_empty()) {
        return keyword.to_string();
    }

    keyword_bank(category)
        .and_then(|bank| bank.choose(rng))
        .unwrap_or(&FALLBACK_KEYWORD)
        .to_string()
}

pub fn generate_title<R: Rng + ?Sized>(category: &Category, keyword: &str, rng: &mut R) -> String {
    let template = title_templates(category)
        .choose(rng)
        .copied()
        .unwrap_or(KEYWORD_PLACEHOLDER);
    template.replace(KEYWORD_PLACEHOLDER, &keyword.to_uppercase())
}

/// Three to five distinct call-to-action lines.
pub fn generate_description<R: Rng + ?Sized>(rng: &mut R) -> String {
    let count = rng.gen_range(3..=5);
    let lines: Vec<&str> = CALLS_TO_ACTION
        .choose_multiple(rng, count)
        .copied()
        .collect();
    lines.join("\n")
}

/// Lower-cased with all whitespace removed.
fn tag_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// At most ten distinct hashtags drawn from the category tags, the keyword tag and the platform tags.
pub fn generate_hashtags<R: Rng + ?Sized>(category: &Category, keyword: &str, rng: &mut R) -> Vec<String> {
    let mut pool: Vec<String> = base_hashtags(category)
        .iter()
        .map(|tag| tag.to_string())
        .collect();
    pool.push(format!("#{}", tag_text(keyword)));
    pool.push(format!("#{}channel", tag_text(category.name())));
    pool.extend(PLATFORM_HASHTAGS.iter().map(|tag| tag.to_string()));

    let union: Vec<String> = pool.into_iter().unique().collect();

    let count = union.len().min(MAX_HASHTAGS);
    union.choose_multiple(rng, count).cloned().collect()
}

/// Three to five chapter markers at the fixed offsets, in order, each with a random topic.
pub fn generate_timecodes<R: Rng + ?Sized>(rng: &mut R) -> Vec<Timecode> {
    let count = rng.gen_range(3..=5);

    TIMECODE_OFFSETS
        .iter()
        .take(count)
        .map(|&offset| {
            let topic = TIMECODE_TOPICS.choose(rng).copied().unwrap_or("Intro");
            Timecode::new(offset, topic.to_string())
        })
        .collect()
}

fn timecode_block(timecodes: &[Timecode]) -> String {
    let lines: Vec<String> = timecodes.iter().map(Timecode::to_string).collect();
    format!("Timecodes:\n{}", lines.join("\n"))
}

/// Generates a complete content bundle for `category`.
///
/// An absent or blank `keyword` is replaced by a random keyword from the category's bank, or by
/// [FALLBACK_KEYWORD] for categories without one.
pub fn generate_content<R: Rng + ?Sized>(
    category: &Category,
    keyword: Option<&str>,
    rng: &mut R,
) -> ContentBundle {
    let keyword = choose_keyword(category, keyword, rng);
    let title = generate_title(category, &keyword, rng);
    let description = generate_description(rng);
    let hashtags = generate_hashtags(category, &keyword, rng);
    let timecodes = generate_timecodes(rng);

    let full_description = format!(
        "{title}\n\n{description}\n\n{}\n\n{}",
        timecode_block(&timecodes),
        hashtags.join(" ")
    );

    ContentBundle {
        category: category.clone(),
        keyword,
        title,
        description,
        hashtags,
        timecodes,
        full_description,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn blank_keyword_comes_from_the_gaming_bank() {
        let bank = keyword_bank(&Category::Gaming).unwrap();

        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bundle = generate_content(&Category::Gaming, Some(""), &mut rng);

            assert!(bank.contains(&bundle.keyword.as_str()), "{}", bundle.keyword);
            assert!(bundle.title.contains(&bundle.keyword.to_uppercase()));
            assert!(bundle.hashtags.len() <= 10);
        }
    }

    #[test]
    fn given_keyword_is_used_upper_cased() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bundle = generate_content(&Category::Tech, Some("Steam Deck"), &mut rng);

        assert_eq!(bundle.keyword, "Steam Deck");
        assert!(bundle.title.contains("STEAM DECK"));
        assert!(bundle.hashtags.contains(&"#steamdeck".to_string()));
        assert!(bundle.hashtags.contains(&"#techchannel".to_string()));
    }

    #[test]
    fn unknown_category_falls_back_to_education() {
        let category = Category::parse("Cooking Shows");
        let education: HashSet<&str> = title_templates(&Category::Education)
            .iter()
            .map(|template| template.split(KEYWORD_PLACEHOLDER).nth(1).unwrap())
            .collect();

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let bundle = generate_content(&category, None, &mut rng);

            assert_eq!(bundle.keyword, FALLBACK_KEYWORD);
            assert!(bundle.title.contains("TRENDING TOPIC"));
            assert!(education.iter().any(|suffix| bundle.title.ends_with(suffix)));
            assert!(bundle.hashtags.contains(&"#cookingshowschannel".to_string()));
        }
    }

    #[test]
    fn description_lines_are_distinct_and_sized() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let description = generate_description(&mut rng);
            let lines: Vec<&str> = description.lines().collect();

            assert!((3..=5).contains(&lines.len()));
            let unique: HashSet<&&str> = lines.iter().collect();
            assert_eq!(unique.len(), lines.len());
            assert!(lines.iter().all(|line| CALLS_TO_ACTION.contains(line)));
        }
    }

    #[test]
    fn hashtags_are_distinct() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            // "Reaction" collides with the base tag "#reaction"
            let tags = generate_hashtags(&Category::Entertainment, "Reaction", &mut rng);

            let unique: HashSet<&String> = tags.iter().collect();
            assert_eq!(unique.len(), tags.len());
            assert_eq!(tags.len(), 9);
        }
    }

    #[test]
    fn timecodes_use_fixed_offsets_in_order() {
        for seed in 0..50 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let timecodes = generate_timecodes(&mut rng);

            assert!((3..=5).contains(&timecodes.len()));
            for (timecode, offset) in timecodes.iter().zip(TIMECODE_OFFSETS) {
                assert_eq!(timecode.offset_seconds, offset);
                assert!(TIMECODE_TOPICS.contains(&timecode.topic.as_str()));
            }
        }
    }

    #[test]
    fn full_description_is_assembled_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let bundle = generate_content(&Category::Education, Some("Rust"), &mut rng);

        let sections: Vec<&str> = bundle.full_description.split("\n\n").collect();
        assert_eq!(sections.len(), 4);
        assert_eq!(sections[0], bundle.title);
        assert_eq!(sections[1], bundle.description);
        assert!(sections[2].starts_with("Timecodes:\n0:00 - "));
        assert_eq!(sections[3], bundle.hashtag_line());
    }
}
