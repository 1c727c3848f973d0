pub use account::*;
pub use content::*;
pub use settings::*;
pub use simulation::*;
pub use stats::*;
pub use task::*;

mod account;
mod content;
mod settings;
mod simulation;
mod stats;
mod task;
