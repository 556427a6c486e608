//! CLI domain: parse, route, and output only.
//! No generation logic; the route table dispatches to the generator and host session.

mod output;
mod parse;
mod route;

pub use output::{format_report, map_error};
pub use parse::{Cli, Commands};
pub use route::RunContext;
