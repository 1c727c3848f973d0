use super::{Record, Result, Store};
use crate::model::{Account, ChannelStats, CredentialMatch, Settings, StatsSnapshot};
use crate::time::now;

/// Creates the account together with everything it owns from the start. Either all records are
/// written or none are.
const REGISTER: &str = "
BEGIN TRANSACTION;
CREATE accounts CONTENT $account;
CREATE credentials CONTENT {
    login: $login,
    password: crypto::argon2::generate($password),
    account: $account.id
};
CREATE settings CONTENT $settings;
CREATE stats CONTENT $snapshot;
COMMIT TRANSACTION;
";

impl Store {
    crate::query! {
        pub fn find_account(login: &str) -> Option<Account>
            where "SELECT * FROM accounts WHERE login = $login LIMIT 1"
    }

    crate::query! {
        pub fn settings(account: &Record<Account>) -> Option<Settings>
            where "SELECT * FROM settings WHERE account = $account LIMIT 1"
    }

    crate::query! {
        fn replace_settings(id: &Record<Settings>, settings: &Settings) -> Option<Settings>
            where "UPDATE $id CONTENT $settings RETURN AFTER"
    }

    crate::query! {
        fn touch_login(account: &Record<Account>, at: crate::time::Timestamp) -> Option<Account>
            where "UPDATE $account SET last_login = $at, total_sessions += 1 RETURN AFTER"
    }

    /// Registers a new account with default settings and all-zero statistics.
    ///
    /// The unique index on the login name rejects a duplicate inside the transaction, so a
    /// failed registration leaves nothing behind.
    #[tracing::instrument(skip(self, password))]
    pub async fn register_account(&self, login: &str, password: &str) -> Result<Account> {
        let account = Account::new(login.to_string());
        let settings = Settings::defaults(account.id.clone());
        let snapshot = StatsSnapshot::new(account.id.clone(), ChannelStats::default());

        self.sql(REGISTER)
            .bind(("account", &account))
            .bind(("login", login))
            .bind(("password", password))
            .bind(("settings", &settings))
            .bind(("snapshot", &snapshot))
            .execute()
            .await?;

        tracing::info!(account = %account.id, login, "registered account");
        Ok(account)
    }

    /// Resolves a login name and password to an account. Unknown login names and wrong passwords
    /// are indistinguishable.
    #[tracing::instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Record<Account>>> {
        let found: Option<CredentialMatch> = self
            .sql(
                "SELECT account FROM credentials \
                 WHERE login = $login AND crypto::argon2::compare(password, $password) \
                 LIMIT 1",
            )
            .bind(("login", login))
            .bind(("password", password))
            .fetch_first()
            .await?;

        Ok(found.map(|found| found.account))
    }

    /// Stamps the login time and bumps the session counter.
    pub async fn record_login(&self, account: &Record<Account>) -> Result<Option<Account>> {
        self.touch_login(account, now()).await
    }

    pub async fn update_settings(&self, settings: &Settings) -> Result<Option<Settings>> {
        self.replace_settings(&settings.id, settings).await
    }
}
