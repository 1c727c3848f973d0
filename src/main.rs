use dotenvy::dotenv;
use snafu::ResultExt as _;

use channel_growth::auth::Accounts;
use channel_growth::config::Config;
use channel_growth::database::Store;
use channel_growth::error::{ApplicationError, ConnectDatabaseSnafu, TerminalSnafu};
use channel_growth::logger;
use channel_growth::repl::{ReplError, Shell};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    let store = Store::connect(&config.surreal_url, &config.namespace, &config.database)
        .await
        .context(ConnectDatabaseSnafu)?;
    let accounts = Accounts::new(store, config.activity_dir.clone());

    let mut shell = Shell::new(config, accounts).context(TerminalSnafu)?;
    match shell.run().await {
        Ok(()) => Ok(()),
        Err(error @ ReplError::Rustyline { .. }) => Err(error).context(TerminalSnafu),
        Err(error) => {
            tracing::error!(%error, "shell stopped");
            Ok(())
        }
    }
}
