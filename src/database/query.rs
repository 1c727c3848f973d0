use derive_new::new;
use serde::de::DeserializeOwned;
use snafu::ResultExt as _;
use surrealdb::opt::QueryResult;

use super::{DeserializeSnafu, QuerySnafu, Result};

/// A pending SurrealQL query. Parameters can be bound using the [Bindings::bind] method which takes any serializable data structure.
///
/// # Example
/// ```ignore
/// let recent: Vec<SimulationRecord> = store.sql("SELECT * FROM simulations WHERE account = $account LIMIT $limit")
///     .bind(("account", &account))
///     .bind(("limit", 10))
///     .fetch_first()
///     .await?;
/// ```
#[derive(Debug, new)]
pub struct Bindings<'a> {
    query: surrealdb::method::Query<'a, surrealdb::engine::any::Any>,
}

impl Bindings<'_> {
    pub fn bind(mut self, params: impl serde::Serialize) -> Self {
        let query = self.query;
        self.query = query.bind(params);
        self
    }

    /// Execute the query and return a [surrealdb::Response] which is SurrealDB's way to represent a list of statements returned from the database.
    ///
    /// Fails if any of the statements failed, so a transaction that was cancelled is reported as an error.
    pub async fn execute(self) -> Result<surrealdb::Response> {
        let response = self
            .query
            .await
            .and_then(|response| response.check())
            .context(QuerySnafu)?;
        tracing::trace!(?response, "executed query");
        Ok(response)
    }

    /// Execute the query and return the first result as a deserialized value.
    pub async fn fetch_first<T: DeserializeOwned>(self) -> Result<T>
    where
        usize: QueryResult<T>,
    {
        let mut statements = self.execute().await?;
        let result = statements.take::<T>(0).context(DeserializeSnafu)?;
        Ok(result)
    }
}
