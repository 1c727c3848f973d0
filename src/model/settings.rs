use serde::{Deserialize, Serialize};

use super::Account;
use crate::database::Record;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{other}', expected 'dark' or 'light'")),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => f.write_str("dark"),
            Theme::Light => f.write_str("light"),
        }
    }
}

/// Per-account preferences, created with defaults at registration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    pub id: Record<Settings>,
    pub account: Record<Account>,
    pub remember_login: bool,
    pub auto_fullscreen: bool,
    pub theme: Theme,
    pub auto_save: bool,
}

crate::table!("settings": Settings = id);

impl Settings {
    pub fn defaults(account: Record<Account>) -> Self {
        Self {
            id: Record::default(),
            account,
            remember_login: true,
            auto_fullscreen: true,
            theme: Theme::Dark,
            auto_save: true,
        }
    }
}
