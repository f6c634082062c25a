// clipsmith-cli/src/lib.rs
//
// Library portion of the clipsmith CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ForgeArgs};
pub use commands::forge::run_forge;
pub use commands::profiles::run_profiles;
pub use error::{CliErrorContext, CliResult};
