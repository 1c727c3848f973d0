use serde::{de::DeserializeOwned, Serialize};
use snafu::{Location, OptionExt as _, ResultExt as _, Snafu};
use surrealdb::{engine::any::Any, Surreal};
use url::Url;

pub use surrealdb::sql::Thing;

/// Typed record identifiers.
pub mod record;

/// Helper for executing arbitrary SurrealQL queries.
pub mod query;

/// Macros for defining tables and query methods.
pub mod macros;

mod accounts;
mod history;
mod tasks;

pub use query::Bindings;
pub use record::Record;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

const SETUP: &str = include_str!("../../schema.surrealql");

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("cannot connect to the datastore `{url}` at {location}: {source}"))]
    Connect {
        url: Url,
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to apply the datastore schema at {location}: {source}"))]
    Setup {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to query the datastore at {location}: {source}"))]
    Query {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("failed to deserialize the datastore response at {location}: {source}"))]
    Deserialize {
        source: surrealdb::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("expected a record from the datastore at {location}, but got none"))]
    EmptyResult {
        #[snafu(implicit)]
        location: Location,
    },
}

/// Represents a type that is stored as a record in its own table.
pub trait Table {
    /// Returns the ID of the record.
    fn id(&self) -> &Thing;

    /// Returns the name of the table associated with the record.
    fn table() -> &'static str;
}

/// Handle to the embedded datastore. Cloning is cheap; every clone talks to the same datastore.
#[derive(Debug, Clone)]
pub struct Store {
    database: Surreal<Any>,
}

impl Store {
    /// Connects to the datastore at `url` and applies the schema.
    ///
    /// `mem://` gives a throwaway in-memory datastore, `surrealkv://path` a durable one on disk.
    pub async fn connect(url: &Url, namespace: &str, database: &str) -> Result<Self> {
        let connection = surrealdb::engine::any::connect(url.as_str())
            .await
            .context(ConnectSnafu { url: url.clone() })?;

        connection
            .use_ns(namespace)
            .use_db(database)
            .await
            .context(ConnectSnafu { url: url.clone() })?;

        connection
            .query(SETUP)
            .await
            .and_then(|response| response.check())
            .context(SetupSnafu)?;

        tracing::info!(%url, namespace, database, "connected to the datastore");

        Ok(Self {
            database: connection,
        })
    }

    /// Opens a fresh in-memory datastore.
    pub async fn memory() -> Result<Self> {
        let url = Url::parse("mem://").expect("static url is valid");
        Self::connect(&url, "channel_growth", "channel_growth").await
    }

    /// Create a builder to execute arbitrary SurrealQL on the datastore.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let tasks: Vec<Task> = store
    ///     .sql("SELECT * FROM tasks WHERE account = $account AND completed = false")
    ///     .bind(("account", &account))
    ///     .fetch_first()
    ///     .await?;
    /// ```
    pub fn sql(&self, query: &str) -> Bindings<'_> {
        Bindings::new(self.database.query(query))
    }

    /// Inserts a new record under its own id. Records are never updated through this path.
    pub async fn insert<T>(&self, record: &T) -> Result<T>
    where
        T: Table + Serialize + DeserializeOwned,
    {
        let created: Option<T> = self
            .database
            .create(record.id().clone())
            .content(record)
            .await
            .context(QuerySnafu)?;

        created.context(EmptyResultSnafu)
    }
}
