//! CLI domain: parse, route and output only.
//! No hashing logic; the single route table dispatches to library services.

mod output;
mod parse;
mod route;

pub use output::{exit_code, map_error, EXIT_CANCELLED};
pub use parse::{Cli, Commands, DocumentFormat};
pub use route::RunContext;
