/// Implements [Table](crate::database::Table) for a model whose id is stored in the given field.
///
/// ```ignore
/// table!("tasks": Task = id);
/// ```
#[macro_export]
macro_rules! table {
    ($table:literal: $model:ty = $id:ident) => {
        impl $crate::database::Table for $model {
            fn id(&self) -> &$crate::database::Thing {
                self.$id.as_ref()
            }

            fn table() -> &'static str {
                $table
            }
        }
    };
}

/// Defines a method on [Store](crate::database::Store) that runs a single SurrealQL statement.
///
/// # Syntax
/// ```ignore
/// fn method_name(...arguments) -> [Output Type] where "surrealql query"
/// ```
/// Every argument is bound to the query parameter of the same name, and the result of the first
/// statement is deserialized into the output type (`Vec<T>` or `Option<T>`).
///
/// # Example
///
/// ```ignore
/// impl Store {
///     query! {
///         pub fn list_simulations(account: &Record<Account>, limit: usize) -> Vec<SimulationRecord>
///             where "SELECT * FROM simulations WHERE account = $account ORDER BY created_at DESC LIMIT $limit"
///     }
/// }
///
/// let history = store.list_simulations(&account, 10).await?;
/// ```
#[macro_export]
macro_rules! query {
    ($(#[$meta:meta])* $vis:vis fn $name:ident ($($binding:ident : $binding_type:ty),*) -> $export:ty where $query:literal) => {
        $(#[$meta])*
        #[tracing::instrument(skip(self), level = "debug")]
        $vis async fn $name(&self, $($binding : $binding_type ,)*) -> $crate::database::Result<$export> {
            self.sql($query)
                $(.bind((stringify!($binding), $binding)))*
                .fetch_first()
                .await
        }
    };
}
