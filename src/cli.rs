//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to library operations.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{exit_code, map_error};
pub use parse::{Cli, Commands, GranularityArg, HashSelection};
pub use presentation::format_diff;
pub use route::{Outcome, RunContext};
