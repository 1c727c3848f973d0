use std::io::Write as _;
use std::path::{Path, PathBuf};

use snafu::{Location, ResultExt as _, Snafu};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};

use crate::time::now;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ActivityError {
    #[snafu(display("cannot open the activity log in `{}`: {source}", dir.display()))]
    Open {
        dir: PathBuf,
        source: InitError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot append to the activity log of `{account}`: {source}"))]
    Append {
        account: String,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Kinds of entries written to the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Registered,
    LoggedIn,
    LoggedOut,
    GrowthSimulated,
    ContentGenerated,
    TaskCreated,
    TaskUpdated,
    SettingsUpdated,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Registered => "REGISTERED",
            Activity::LoggedIn => "LOGIN",
            Activity::LoggedOut => "LOGOUT",
            Activity::GrowthSimulated => "GROWTH_SIMULATED",
            Activity::ContentGenerated => "CONTENT_GENERATED",
            Activity::TaskCreated => "TASK_CREATED",
            Activity::TaskUpdated => "TASK_UPDATED",
            Activity::SettingsUpdated => "SETTINGS_UPDATED",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only, human readable log of everything one account did.
///
/// Lives at `<dir>/activity-<account>.log` and is never rotated. Every entry is mirrored as a
/// tracing event so it also shows up in the application log.
pub struct ActivityLog {
    account: String,
    writer: RollingFileAppender,
}

impl std::fmt::Debug for ActivityLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityLog")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl ActivityLog {
    pub fn open(dir: impl AsRef<Path>, account: impl Into<String>) -> Result<Self, ActivityError> {
        let dir = dir.as_ref();
        let account = account.into();

        let writer = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(format!("activity-{account}"))
            .filename_suffix("log")
            .build(dir)
            .context(OpenSnafu { dir })?;

        Ok(Self { account, writer })
    }

    /// Path of the log file for `account` inside `dir`.
    pub fn path(dir: impl AsRef<Path>, account: &str) -> PathBuf {
        dir.as_ref().join(format!("activity-{account}.log"))
    }

    pub fn record(&mut self, activity: Activity, details: &str) -> Result<(), ActivityError> {
        tracing::info!(account = %self.account, %activity, details, "activity");

        let line = format!(
            "[{}] [{}] {}: {}",
            now().log_format(),
            self.account,
            activity,
            details
        );

        writeln!(self.writer, "{line}")
            .and_then(|_| self.writer.flush())
            .context(AppendSnafu {
                account: &self.account,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_appended_in_the_documented_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ActivityLog::open(dir.path(), "abc123").unwrap();

        log.record(Activity::LoggedIn, "session started").unwrap();
        log.record(Activity::GrowthSimulated, "+3 subscribers").unwrap();

        let content = std::fs::read_to_string(ActivityLog::path(dir.path(), "abc123")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            // "[YYYY-MM-DD HH:MM:SS] "
            assert_eq!(&line[0..1], "[");
            assert_eq!(&line[20..22], "] ");
            assert!(line[1..20].chars().filter(|c| c.is_ascii_digit()).count() == 14);
        }
        assert!(lines[0].ends_with("[abc123] LOGIN: session started"));
        assert!(lines[1].ends_with("[abc123] GROWTH_SIMULATED: +3 subscribers"));
    }

    #[test]
    fn entries_are_stamped_with_local_time() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ActivityLog::open(dir.path(), "local").unwrap();
        log.record(Activity::ContentGenerated, "Gaming").unwrap();

        let content = std::fs::read_to_string(ActivityLog::path(dir.path(), "local")).unwrap();
        let stamp = chrono::NaiveDateTime::parse_from_str(&content[1..20], "%Y-%m-%d %H:%M:%S").unwrap();

        let skew = chrono::Local::now().naive_local() - stamp;
        assert!(skew.num_seconds().abs() < 60, "{stamp} is not local time");
    }

    #[test]
    fn reopening_keeps_earlier_entries() {
        let dir = tempfile::tempdir().unwrap();

        ActivityLog::open(dir.path(), "k")
            .unwrap()
            .record(Activity::Registered, "first")
            .unwrap();
        ActivityLog::open(dir.path(), "k")
            .unwrap()
            .record(Activity::LoggedOut, "second")
            .unwrap();

        let content = std::fs::read_to_string(ActivityLog::path(dir.path(), "k")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
