use derive_new::new;
use serde::{Deserialize, Serialize};

use super::Account;
use crate::database::Record;
use crate::time::{now, Timestamp};

/// Content category. Anything that is not one of the known categories is kept verbatim as
/// [Category::Other] and handled with the fallback templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Gaming,
    Education,
    Tech,
    Entertainment,
    Other(String),
}

impl Category {
    pub fn parse(name: &str) -> Category {
        match name.trim().to_lowercase().as_str() {
            "gaming" => Category::Gaming,
            "education" => Category::Education,
            "tech" => Category::Tech,
            "entertainment" => Category::Entertainment,
            _ => Category::Other(name.trim().to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Gaming => "gaming",
            Category::Education => "education",
            Category::Tech => "tech",
            Category::Entertainment => "entertainment",
            Category::Other(name) => name,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Category {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Category::parse(&name))
    }
}

/// A chapter marker in the video description.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Timecode {
    pub offset_seconds: u32,
    pub topic: String,
}

impl std::fmt::Display for Timecode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.offset_seconds / 60;
        let seconds = self.offset_seconds % 60;
        write!(f, "{minutes}:{seconds:02} - {}", self.topic)
    }
}

/// Everything produced by one content generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentBundle {
    pub category: Category,
    pub keyword: String,
    pub title: String,
    /// The call-to-action lines only.
    pub description: String,
    pub hashtags: Vec<String>,
    pub timecodes: Vec<Timecode>,
    /// Title, description, timecodes and hashtags assembled the way they are published.
    pub full_description: String,
}

impl ContentBundle {
    pub fn hashtag_line(&self) -> String {
        self.hashtags.join(" ")
    }
}

/// Immutable record of one content generation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, new)]
pub struct ContentRecord {
    #[new(default)]
    pub id: Record<ContentRecord>,
    #[new(value = "now()")]
    pub created_at: Timestamp,
    pub account: Record<Account>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub keyword: String,
}

crate::table!("contents": ContentRecord = id);

impl ContentRecord {
    pub fn from_bundle(account: Record<Account>, bundle: &ContentBundle) -> Self {
        Self::new(
            account,
            bundle.title.clone(),
            bundle.full_description.clone(),
            bundle.category.clone(),
            bundle.keyword.clone(),
        )
    }
}
