// clipsmith-cli/src/commands/profiles.rs
//
// Implementation of the `profiles` command.

use crate::error::{CliErrorContext, CliResult};
use crate::output::print_profiles;

use clipsmith_core::profile::{all_profiles, find_profile};

use std::slice;

/// Lists the built-in camera profiles on stdout, or only the one named `id`.
pub fn run_profiles(id: Option<&str>) -> CliResult<()> {
    match id {
        Some(id) => {
            let profile = find_profile(id).cli_with_context(|| {
                let known: Vec<&str> = all_profiles().iter().map(|p| p.id).collect();
                format!("Unknown profile '{}' (known: {})", id, known.join(", "))
            })?;
            print_profiles(slice::from_ref(profile));
        }
        None => print_profiles(all_profiles()),
    }
    Ok(())
}
