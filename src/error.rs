use snafu::{Location, Snafu};

use crate::config::ConfigError;
use crate::database::StoreError;
use crate::repl::ReplError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApplicationError {
    /// could not read the configuration from the environment
    #[snafu(transparent)]
    ConfigLoad { source: ConfigError },

    /// Could not open the datastore
    #[snafu(display("cannot open the datastore: {source}"))]
    ConnectDatabase {
        source: StoreError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    #[snafu(display("cannot initialize the logger: {source}"))]
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not set up or read from the terminal
    #[snafu(display("terminal failed: {source}"))]
    Terminal {
        source: ReplError,
        #[snafu(implicit)]
        location: Location,
    },
}
