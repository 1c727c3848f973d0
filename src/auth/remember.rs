use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snafu::{Location, ResultExt as _, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RememberError {
    #[snafu(display("cannot access the remembered login at `{}`: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("the remembered login at `{}` is corrupt: {source}", path.display()))]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// The login name offered as the default on the next start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedLogin {
    pub login: String,
    pub remember_login: bool,
}

impl RememberedLogin {
    /// Reads the remembered login. A missing file means nothing is remembered.
    pub fn load(path: &Path) -> Result<Option<Self>, RememberError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error).context(IoSnafu { path }),
        };

        let remembered: Self = serde_json::from_str(&content).context(CorruptSnafu { path })?;
        Ok(remembered.remember_login.then_some(remembered))
    }

    /// Remembers `login`, or forgets whatever was remembered when `remember` is false.
    pub fn save(path: &Path, login: &str, remember: bool) -> Result<(), RememberError> {
        if !remember {
            return Self::forget(path);
        }

        let remembered = Self {
            login: login.to_string(),
            remember_login: true,
        };
        let content = serde_json::to_string_pretty(&remembered).context(CorruptSnafu { path })?;

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context(IoSnafu { path })?;
        }
        std::fs::write(path, content).context(IoSnafu { path })
    }

    pub fn forget(path: &Path) -> Result<(), RememberError> {
        match std::fs::remove_file(path) {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error).context(IoSnafu { path }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_nothing_is_remembered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remember.json");
        assert_eq!(RememberedLogin::load(&path).unwrap(), None);
    }

    #[test]
    fn saved_login_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("remember.json");

        RememberedLogin::save(&path, "okayu", true).unwrap();
        let loaded = RememberedLogin::load(&path).unwrap().unwrap();
        assert_eq!(loaded.login, "okayu");
        assert!(loaded.remember_login);
    }

    #[test]
    fn saving_without_remembering_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remember.json");

        RememberedLogin::save(&path, "okayu", true).unwrap();
        RememberedLogin::save(&path, "okayu", false).unwrap();
        assert!(!path.exists());

        RememberedLogin::save(&path, "okayu", false).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remember.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            RememberedLogin::load(&path),
            Err(RememberError::Corrupt { .. })
        ));
    }

    #[test]
    fn opted_out_entries_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remember.json");
        std::fs::write(&path, r#"{"login":"subaru","remember_login":false}"#).unwrap();

        assert_eq!(RememberedLogin::load(&path).unwrap(), None);
    }
}
