//! Imperative shell for asana-export
//!
//! Pairs with [`asana_export_core`]: this crate owns every side effect
//! (requests against the remote API, attachment downloads, directory
//! trees, the CLI) and feeds the pure core types.

pub mod asana;
pub mod prelude;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "ASANA_EXPORT_VERBOSE", global = true, default_value = "false")]
    pub verbose: bool,
}
