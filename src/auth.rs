use std::path::{Path, PathBuf};

use snafu::{ensure, Location, OptionExt as _, ResultExt as _, Snafu};

use crate::activity::Activity;
use crate::database::{Store, StoreError};
use crate::model::Account;
use crate::session::{Session, SessionError};
use crate::validate::{Registration, ValidationError};

pub mod remember;

pub use remember::{RememberError, RememberedLogin};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AuthError {
    #[snafu(display("an account named '{login}' already exists"))]
    DuplicateAccount {
        login: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("invalid login name or password"))]
    InvalidLogin {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(transparent)]
    Validation { source: ValidationError },

    #[snafu(display("datastore operation failed at {location}: {source}"))]
    Store {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("cannot open the session: {source}"))]
    OpenSession {
        source: SessionError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(transparent)]
    Remember { source: RememberError },
}

/// Registration, login and logout on top of a [Store].
#[derive(Debug, Clone)]
pub struct Accounts {
    store: Store,
    activity_dir: PathBuf,
}

impl Accounts {
    pub fn new(store: Store, activity_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            activity_dir: activity_dir.into(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Validates the form and creates the account with default settings and zero statistics.
    #[tracing::instrument(skip_all, fields(login = %registration.login.trim()))]
    pub async fn register(&self, registration: &Registration) -> Result<Session, AuthError> {
        let login = registration.validate()?;

        let existing = self.store.find_account(login).await.context(StoreSnafu)?;
        ensure!(existing.is_none(), DuplicateAccountSnafu { login });

        let account = self
            .store
            .register_account(login, &registration.password)
            .await
            .context(StoreSnafu)?;

        let mut session = self.open(account).await?;
        session
            .record_activity(Activity::Registered, login)
            .context(OpenSessionSnafu)?;

        Ok(session)
    }

    /// Checks the credentials and opens a session. Unknown login names and wrong passwords fail
    /// the same way.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, login: &str, password: &str) -> Result<Session, AuthError> {
        let login = login.trim();
        ensure!(!login.is_empty() && !password.is_empty(), InvalidLoginSnafu);

        let account = self
            .store
            .verify_credentials(login, password)
            .await
            .context(StoreSnafu)?
            .context(InvalidLoginSnafu)?;

        let account = self
            .store
            .record_login(&account)
            .await
            .context(StoreSnafu)?
            .context(InvalidLoginSnafu)?;

        let mut session = self.open(account).await?;
        let sessions = session.account().total_sessions;
        session
            .record_activity(Activity::LoggedIn, &format!("session #{sessions}"))
            .context(OpenSessionSnafu)?;

        tracing::info!(account = %session.account().id, "logged in");
        Ok(session)
    }

    /// Ends the session. The statistics were persisted on every change, so nothing is flushed here.
    pub fn logout(&self, mut session: Session) -> Result<(), AuthError> {
        let login = session.account().login.clone();
        session
            .record_activity(Activity::LoggedOut, &login)
            .context(OpenSessionSnafu)?;

        tracing::info!(account = %session.account().id, "logged out");
        Ok(())
    }

    /// Persists or clears the remembered login according to the session's settings.
    pub fn remember(&self, path: &Path, session: &Session) -> Result<(), AuthError> {
        let settings = session.settings();
        RememberedLogin::save(path, &session.account().login, settings.remember_login)?;
        Ok(())
    }

    async fn open(&self, account: Account) -> Result<Session, AuthError> {
        Session::open(self.store.clone(), account, &self.activity_dir)
            .await
            .context(OpenSessionSnafu)
    }
}
