use std::path::Path;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};

use crate::activity::{Activity, ActivityError, ActivityLog};
use crate::database::{Record, Store, StoreError};
use crate::generator;
use crate::growth;
use crate::model::{
    Account, Category, ChannelStats, ContentBundle, ContentRecord, GrowthDelta, NewTask, Priority,
    Settings, SimulationRecord, Task,
};
use crate::validate::{self, ValidationError};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SessionError {
    #[snafu(display("datastore operation failed at {location}: {source}"))]
    Store {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(transparent)]
    Validation { source: ValidationError },

    #[snafu(transparent)]
    Activity { source: ActivityError },

    #[snafu(display("account {account} has no settings record"))]
    MissingSettings {
        account: Record<Account>,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Result of one persisted growth step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthReport {
    pub delta: GrowthDelta,
    pub stats: ChannelStats,
    /// Whether this was the first growth step ever recorded for the account.
    pub first_run: bool,
}

/// Everything needed to act on behalf of one logged-in account.
///
/// The session owns the only cached copy of the account's statistics. Every mutation computes the
/// new statistics in memory, persists them and only then updates the cache.
pub struct Session {
    store: Store,
    account: Account,
    settings: Settings,
    stats: ChannelStats,
    simulated_before: bool,
    rng: Box<dyn RngCore + Send>,
    activity: ActivityLog,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account", &self.account)
            .field("stats", &self.stats)
            .field("simulated_before", &self.simulated_before)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Loads the state of `account` from the store and opens its activity log.
    ///
    /// Accounts that predate their settings or statistics get defaults written on the spot.
    #[tracing::instrument(skip(store, account, activity_dir), fields(account = %account.id))]
    pub async fn open(
        store: Store,
        account: Account,
        activity_dir: &Path,
    ) -> Result<Self, SessionError> {
        let settings = match store.settings(&account.id).await.context(StoreSnafu)? {
            Some(settings) => settings,
            None => store
                .insert(&Settings::defaults(account.id.clone()))
                .await
                .context(StoreSnafu)?,
        };

        let stats = match store.latest_stats(&account.id).await.context(StoreSnafu)? {
            Some(stats) => stats,
            None => {
                let stats = ChannelStats::default();
                store
                    .append_stats(&account.id, &stats)
                    .await
                    .context(StoreSnafu)?;
                stats
            }
        };

        let simulated_before = store
            .has_simulations(&account.id)
            .await
            .context(StoreSnafu)?;

        let activity = ActivityLog::open(activity_dir, account.id.key())?;

        Ok(Self {
            store,
            account,
            settings,
            stats,
            simulated_before,
            rng: Box::new(StdRng::from_entropy()),
            activity,
        })
    }

    /// Replaces the random source, mainly so tests can be seeded.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    pub fn has_simulated(&self) -> bool {
        self.simulated_before
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub(crate) fn record_activity(
        &mut self,
        activity: Activity,
        details: &str,
    ) -> Result<(), SessionError> {
        self.activity.record(activity, details)?;
        Ok(())
    }

    /// Runs one growth step over `hours` and persists the result.
    #[tracing::instrument(skip(self), fields(account = %self.account.id))]
    pub async fn simulate_growth(&mut self, hours: f64) -> Result<GrowthReport, SessionError> {
        let hours = validate::elapsed_hours(hours)?;

        let (delta, stats) = growth::simulate_growth(&self.stats, hours, &mut *self.rng);

        self.store
            .append_stats(&self.account.id, &stats)
            .await
            .context(StoreSnafu)?;
        self.store
            .append_simulation(&self.account.id, hours, &delta)
            .await
            .context(StoreSnafu)?;

        let first_run = !self.simulated_before;
        self.stats = stats;
        self.simulated_before = true;

        self.activity.record(
            Activity::GrowthSimulated,
            &format!(
                "{hours:.3}h: +{} subscribers, +{} views, +{} likes, +{} comments, +{} shares",
                delta.subscribers, delta.views, delta.likes, delta.comments, delta.shares
            ),
        )?;

        Ok(GrowthReport {
            delta,
            stats,
            first_run,
        })
    }

    /// A single one-hour growth step.
    pub async fn quick_simulation(&mut self) -> Result<GrowthReport, SessionError> {
        self.simulate_growth(1.0).await
    }

    /// Generates video content and counts it as an upload.
    #[tracing::instrument(skip(self), fields(account = %self.account.id))]
    pub async fn generate_content(
        &mut self,
        category: &Category,
        keyword: Option<&str>,
    ) -> Result<ContentBundle, SessionError> {
        let bundle = generator::generate_content(category, keyword, &mut *self.rng);

        let mut stats = self.stats;
        stats.videos_uploaded += 1;

        self.store
            .append_content(&self.account.id, &bundle)
            .await
            .context(StoreSnafu)?;
        self.store
            .append_stats(&self.account.id, &stats)
            .await
            .context(StoreSnafu)?;

        self.stats = stats;

        self.activity.record(
            Activity::ContentGenerated,
            &format!("[{}] {}", bundle.category, bundle.title),
        )?;

        Ok(bundle)
    }

    pub async fn create_task(
        &mut self,
        title: &str,
        description: Option<&str>,
        due_date: NaiveDate,
        priority: Priority,
    ) -> Result<Task, SessionError> {
        let title = validate::non_empty("title", title)?;
        let description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .map(String::from);

        let task = NewTask::new(title.to_string(), description, due_date, priority);
        let task = self
            .store
            .create_task(&self.account.id, task)
            .await
            .context(StoreSnafu)?;

        self.activity.record(
            Activity::TaskCreated,
            &format!("{} (due {}, {} priority)", task.title, task.due_date, task.priority),
        )?;

        Ok(task)
    }

    pub async fn list_tasks(&self, include_completed: bool) -> Result<Vec<Task>, SessionError> {
        self.store
            .list_tasks(&self.account.id, include_completed)
            .await
            .context(StoreSnafu)
    }

    /// Marks a task as done or not done. Returns `None` if the task does not exist.
    pub async fn set_task_completed(
        &mut self,
        task: &Record<Task>,
        completed: bool,
    ) -> Result<Option<Task>, SessionError> {
        let updated = self
            .store
            .set_task_completed(task, completed)
            .await
            .context(StoreSnafu)?;

        if let Some(task) = &updated {
            let state = if completed { "completed" } else { "reopened" };
            self.activity
                .record(Activity::TaskUpdated, &format!("{} {state}", task.title))?;
        }

        Ok(updated)
    }

    pub async fn simulation_history(
        &self,
        limit: usize,
    ) -> Result<Vec<SimulationRecord>, SessionError> {
        self.store
            .list_simulations(&self.account.id, limit)
            .await
            .context(StoreSnafu)
    }

    pub async fn content_history(&self, limit: usize) -> Result<Vec<ContentRecord>, SessionError> {
        self.store
            .list_content(&self.account.id, limit)
            .await
            .context(StoreSnafu)
    }

    pub async fn update_settings(&mut self, settings: Settings) -> Result<&Settings, SessionError> {
        let mut settings = settings;
        settings.id = self.settings.id.clone();
        settings.account = self.account.id.clone();

        let updated = self
            .store
            .update_settings(&settings)
            .await
            .context(StoreSnafu)?
            .context(MissingSettingsSnafu {
                account: self.account.id.clone(),
            })?;

        self.settings = updated;
        self.activity.record(
            Activity::SettingsUpdated,
            &format!(
                "theme={} remember_login={} auto_fullscreen={} auto_save={}",
                self.settings.theme,
                self.settings.remember_login,
                self.settings.auto_fullscreen,
                self.settings.auto_save
            ),
        )?;

        Ok(&self.settings)
    }

    pub fn recommendations(&self) -> Vec<&'static str> {
        crate::advice::recommendations(&self.stats)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::model::Theme;

    pub(crate) async fn fresh_session(login: &str, dir: &Path, seed: u64) -> Session {
        let store = Store::memory().await.unwrap();
        let account = store.register_account(login, "password").await.unwrap();
        Session::open(store, account, dir)
            .await
            .unwrap()
            .with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    #[tokio::test]
    async fn growth_is_persisted_before_the_cache_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("sora", dir.path(), 1).await;

        let report = session.simulate_growth(2.0).await.unwrap();
        assert_eq!(session.stats(), &report.stats);

        let stored = session
            .store()
            .latest_stats(&session.account().id)
            .await
            .unwrap();
        assert_eq!(stored, Some(report.stats));

        let history = session.simulation_history(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].delta, report.delta);
        assert_eq!(history[0].hours, 2.0);
    }

    #[tokio::test]
    async fn first_run_is_reported_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("roboco", dir.path(), 2).await;

        assert!(!session.has_simulated());
        assert!(session.quick_simulation().await.unwrap().first_run);
        assert!(!session.quick_simulation().await.unwrap().first_run);
    }

    #[tokio::test]
    async fn first_run_flag_survives_a_new_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("miko", dir.path(), 3).await;
        session.quick_simulation().await.unwrap();

        let store = session.store().clone();
        let account = session.account().clone();
        let stats = *session.stats();
        drop(session);

        let reopened = Session::open(store, account, dir.path()).await.unwrap();
        assert!(reopened.has_simulated());
        assert_eq!(reopened.stats(), &stats);
    }

    #[tokio::test]
    async fn invalid_hours_change_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("azki", dir.path(), 4).await;

        let result = session.simulate_growth(0.0).await;
        assert!(matches!(result, Err(SessionError::Validation { .. })));
        assert_eq!(session.stats(), &ChannelStats::default());
        assert!(session.simulation_history(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn content_generation_counts_exactly_one_upload() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("chloe", dir.path(), 5).await;

        let bundle = session
            .generate_content(&Category::Gaming, Some("Minecraft"))
            .await
            .unwrap();
        assert_eq!(bundle.keyword, "Minecraft");
        assert_eq!(session.stats().videos_uploaded, 1);
        assert_eq!(session.stats().subscribers, 0);

        session
            .generate_content(&Category::parse("Cooking"), None)
            .await
            .unwrap();
        assert_eq!(session.stats().videos_uploaded, 2);

        let listed = session.content_history(10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].title, bundle.title);
        assert_eq!(listed[1].description, bundle.full_description);
    }

    #[tokio::test]
    async fn every_operation_is_written_to_the_activity_log() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("lui", dir.path(), 6).await;

        session.quick_simulation().await.unwrap();
        session
            .generate_content(&Category::Tech, None)
            .await
            .unwrap();
        let due = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let task = session
            .create_task("film unboxing", None, due, Priority::High)
            .await
            .unwrap();
        session.set_task_completed(&task.id, true).await.unwrap();

        let path = ActivityLog::path(dir.path(), &session.account().id.key());
        let content = std::fs::read_to_string(path).unwrap();
        let events: Vec<&str> = content
            .lines()
            .map(|line| line.split("] ").nth(2).unwrap().split(':').next().unwrap())
            .collect();
        assert_eq!(
            events,
            ["GROWTH_SIMULATED", "CONTENT_GENERATED", "TASK_CREATED", "TASK_UPDATED"]
        );
    }

    #[tokio::test]
    async fn blank_task_titles_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("koyori", dir.path(), 7).await;
        let due = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();

        let result = session.create_task("   ", None, due, Priority::Low).await;
        assert!(matches!(result, Err(SessionError::Validation { .. })));
        assert!(session.list_tasks(true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settings_updates_keep_their_identity() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("iroha", dir.path(), 8).await;

        let mut settings = session.settings().clone();
        settings.theme = Theme::Light;
        settings.remember_login = false;

        let updated = session.update_settings(settings).await.unwrap().clone();
        assert_eq!(updated.theme, Theme::Light);
        assert!(!updated.remember_login);

        let stored = session
            .store()
            .settings(&session.account().id)
            .await
            .unwrap();
        assert_eq!(stored, Some(updated));
    }

    #[tokio::test]
    async fn recommendations_follow_the_cached_stats() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = fresh_session("laplus", dir.path(), 9).await;
        assert_eq!(session.recommendations().len(), 3);

        session.quick_simulation().await.unwrap();
        assert!(session.stats().subscribers > 0);
        assert!(!session.recommendations().is_empty());
    }
}
