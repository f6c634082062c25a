//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Module containing the implementation of the `forge` command.
/// This command composes one output video from input videos and folders.
pub mod forge;

/// Module containing the implementation of the `profiles` command.
pub mod profiles;
