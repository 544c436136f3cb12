//! Fluent command/option builder on top of `argkit-parser`.
//!
//! A [`Program`] holds global options, subcommands and an optional fallback
//! action. [`Program::parse`] tokenizes argv with the program's alias table,
//! handles `--help` / `--version`, binds command slots and runs the action.
//!
//! # Example
//!
//! ```rust,ignore
//! use argkit::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let program = Program::new("greeting")
//!         .version("1.0.0")
//!         .command(
//!             Command::new("hello <name>")?
//!                 .describe("Greets the user")
//!                 .option(Opt::new("--greet, -g", "Greet message")?.default_value("Hello"))
//!                 .action(|inv| {
//!                     let greet = inv.option("greet").map(ToString::to_string).unwrap_or_default();
//!                     println!("{greet}, {}!", inv.arg("name").unwrap_or("stranger"));
//!                     Ok(())
//!                 }),
//!         );
//!     program.run_env()?;
//!     Ok(())
//! }
//! ```

mod builder;
mod dispatch;
mod error;
pub mod help;

pub use argkit_parser::{AliasTable, POSITIONAL_KEY, ParseResult, Scalar, Value, tokenize};
pub use builder::{Command, HELP, Opt, Program, Slot, VERSION};
pub use dispatch::{Invocation, Outcome};
pub use error::{BuildError, DispatchError};
pub use help::{render_help, render_version};

/// Common imports for programs built with argkit.
pub mod prelude {
    pub use super::{Command, Invocation, Opt, Outcome, Program, Value};
}
