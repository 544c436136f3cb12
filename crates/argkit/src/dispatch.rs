use argkit_parser::{ParseResult, Scalar, Value, tokenize};
use indexmap::IndexMap;
use serde::Serialize;

use crate::builder::{Command, HELP, Program, Slot, VERSION};
use crate::error::DispatchError;
use crate::help::{render_help, render_version};

/// What a command action receives.
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    /// Canonical name of the matched command (`None` for the global action).
    pub command: Option<String>,
    /// Command slots bound from positional arguments.
    pub args: IndexMap<String, String>,
    /// The full tokenizer result, with option defaults applied.
    pub options: ParseResult,
}

impl Invocation {
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    pub fn positional(&self) -> &[Scalar] {
        self.options.positional()
    }
}

#[derive(Debug, Clone)]
pub enum Outcome {
    /// `--help` was given; rendered help text.
    Help(String),
    /// `--version` was given; rendered version line.
    Version(String),
    /// A command (or the global) action ran.
    Handled(Invocation),
    /// Nothing matched and there is no global action.
    Unhandled(Invocation),
}

/// Bind positionals to declared slots in order.
///
/// The last slot takes every remaining positional joined with a space.
/// Slots with nothing left to bind are omitted.
fn bind_slots(slots: &[Slot], positionals: &[Scalar]) -> IndexMap<String, String> {
    let mut args = IndexMap::new();
    let mut rest = positionals.iter();
    for (idx, slot) in slots.iter().enumerate() {
        if idx + 1 == slots.len() {
            let remaining = rest.as_slice();
            if !remaining.is_empty() {
                let joined: Vec<String> = remaining.iter().map(|s| s.to_string()).collect();
                args.insert(slot.name.clone(), joined.join(" "));
            }
            break;
        }
        let Some(value) = rest.next() else {
            break;
        };
        args.insert(slot.name.clone(), value.to_string());
    }
    args
}

impl Program {
    /// Tokenize `argv` (program name already stripped) and dispatch it.
    ///
    /// - `--help` / `-h` => [`Outcome::Help`] for the program or the named command
    /// - `--version` / `-v` => [`Outcome::Version`]
    /// - otherwise the first positional selects a command (name or alias); its
    ///   action runs, falling back to the global action
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<Outcome, DispatchError> {
        self.validate()?;

        let mut options = tokenize(argv, &self.alias_table());
        let token = options
            .positional()
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default();

        if options.is_truthy(HELP) {
            return Ok(Outcome::Help(render_help(self, Some(token.as_str()))));
        }
        if options.is_truthy(VERSION) {
            return Ok(Outcome::Version(render_version(self)));
        }

        let command: Option<&Command> = self.find_command(&token);

        let scoped = command.map(|c| c.options()).unwrap_or_default();
        for opt in self.options().iter().chain(scoped) {
            if let Some(default) = opt.get_default() {
                options.set_default(opt.name(), default.clone());
            }
        }

        let rest = options.positional().get(1..).unwrap_or_default();
        let args = command
            .map(|c| bind_slots(c.slots(), rest))
            .unwrap_or_default();

        let invocation = Invocation {
            command: command.map(|c| c.name().to_string()),
            args,
            options,
        };

        let action = command
            .and_then(Command::get_action)
            .or_else(|| self.get_action());
        let Some(action) = action else {
            tracing::debug!(command = %token, "no action for command");
            return Ok(Outcome::Unhandled(invocation));
        };

        tracing::debug!(
            command = invocation.command.as_deref().unwrap_or("<global>"),
            "dispatching"
        );
        action(&invocation)
            .map_err(|err| DispatchError::handler(invocation.command.as_deref(), err))?;
        Ok(Outcome::Handled(invocation))
    }

    /// [`parse`](Self::parse), printing help and version text to stdout.
    pub fn run<S: AsRef<str>>(&self, argv: &[S]) -> Result<(), DispatchError> {
        match self.parse(argv)? {
            Outcome::Help(text) | Outcome::Version(text) => print!("{text}"),
            Outcome::Handled(_) | Outcome::Unhandled(_) => {}
        }
        Ok(())
    }

    /// [`run`](Self::run) with the process arguments.
    pub fn run_env(&self) -> Result<(), DispatchError> {
        let argv: Vec<String> = std::env::args().skip(1).collect();
        self.run(&argv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildError, Opt};
    use std::sync::{Arc, Mutex};

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn greeting() -> Program {
        Program::new("greeting")
            .version("1.0.0")
            .command(
                Command::new("hello <name>")
                    .unwrap()
                    .describe("Greets the user")
                    .option(Opt::new("--greet", "Greet message").unwrap().default_value("Hello"))
                    .option(Opt::new("--from", "From").unwrap().default_value("Cat")),
            )
    }

    #[test]
    fn binds_slots_and_defaults() {
        let outcome = greeting().parse(&argv(&["hello", "Bob"])).unwrap();
        let inv = match outcome {
            Outcome::Unhandled(inv) => inv,
            other => panic!("expected Unhandled, got: {other:?}"),
        };
        assert_eq!(inv.command.as_deref(), Some("hello"));
        assert_eq!(inv.arg("name"), Some("Bob"));
        assert_eq!(inv.option("greet"), Some(&Value::from("Hello")));
        assert_eq!(inv.option("from"), Some(&Value::from("Cat")));
    }

    #[test]
    fn defaults_come_from_globals_and_matched_command_only() {
        let program = Program::new("app")
            .option(Opt::new("--level", "").unwrap().default_value(3_i64))
            .command(
                Command::new("a")
                    .unwrap()
                    .option(Opt::new("--x", "").unwrap().default_value("ax")),
            )
            .command(
                Command::new("b")
                    .unwrap()
                    .option(Opt::new("--y", "").unwrap().default_value("by")),
            );
        let Outcome::Unhandled(inv) = program.parse(&argv(&["a"])).unwrap() else {
            panic!("expected Unhandled");
        };
        assert_eq!(inv.option("level"), Some(&Value::from(3_i64)));
        assert_eq!(inv.option("x"), Some(&Value::from("ax")));
        assert!(!inv.options.contains("y"));
        assert_eq!(
            serde_json::to_value(&inv.options).unwrap(),
            serde_json::json!({ "__": ["a"], "level": 3, "x": "ax" })
        );
    }

    #[test]
    fn positional_key_default_keeps_single_positional_entry() {
        let program =
            Program::new("app").option(Opt::new("--__", "").unwrap().default_value("x"));
        let Outcome::Unhandled(inv) = program.parse(&argv(&["a"])).unwrap() else {
            panic!("expected Unhandled");
        };
        assert_eq!(
            serde_json::to_string(&inv.options).unwrap(),
            r#"{"__":["a"]}"#
        );
    }

    #[test]
    fn argv_overrides_default() {
        let outcome = greeting()
            .parse(&argv(&["hello", "Bob", "--greet", "Hi"]))
            .unwrap();
        let Outcome::Unhandled(inv) = outcome else {
            panic!("expected Unhandled");
        };
        assert_eq!(inv.option("greet"), Some(&Value::from("Hi")));
    }

    #[test]
    fn last_slot_joins_leftovers() {
        let program = Program::new("app").command(Command::new("say <who> [words]").unwrap());
        let Outcome::Unhandled(inv) = program
            .parse(&argv(&["say", "bob", "hello", "there", "10"]))
            .unwrap()
        else {
            panic!("expected Unhandled");
        };
        assert_eq!(inv.arg("who"), Some("bob"));
        assert_eq!(inv.arg("words"), Some("hello there 10"));
    }

    #[test]
    fn missing_slots_are_omitted() {
        let program = Program::new("app").command(Command::new("cp <src> <dst>").unwrap());
        let Outcome::Unhandled(inv) = program.parse(&argv(&["cp"])).unwrap() else {
            panic!("expected Unhandled");
        };
        assert!(inv.args.is_empty());

        let Outcome::Unhandled(inv) = program.parse(&argv(&["cp", "a"])).unwrap() else {
            panic!("expected Unhandled");
        };
        assert_eq!(inv.arg("src"), Some("a"));
        assert_eq!(inv.arg("dst"), None);
    }

    #[test]
    fn runs_command_action() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let program = Program::new("app").command(
            Command::new("install <pkg>")
                .unwrap()
                .alias("i")
                .action(move |inv| {
                    sink.lock().unwrap().push(inv.arg("pkg").unwrap_or_default().to_string());
                    Ok(())
                }),
        );

        let outcome = program.parse(&argv(&["i", "serde"])).unwrap();
        assert!(matches!(outcome, Outcome::Handled(_)));
        assert_eq!(*seen.lock().unwrap(), vec!["serde".to_string()]);
    }

    #[test]
    fn falls_back_to_global_action() {
        let program = Program::new("app")
            .command(Command::new("build").unwrap())
            .action(|inv| {
                assert!(inv.command.is_none());
                assert!(inv.args.is_empty());
                Ok(())
            });
        let outcome = program.parse(&argv(&["unknown", "x"])).unwrap();
        let Outcome::Handled(inv) = outcome else {
            panic!("expected Handled");
        };
        assert_eq!(inv.positional().len(), 2);
    }

    #[test]
    fn help_and_version_short_circuit() {
        let program = greeting();
        let Outcome::Help(text) = program.parse(&argv(&["--help"])).unwrap() else {
            panic!("expected Help");
        };
        assert!(text.contains("Commands"));

        let Outcome::Help(text) = program.parse(&argv(&["hello", "-h"])).unwrap() else {
            panic!("expected Help");
        };
        assert!(text.contains("$ greeting hello <name>"));

        let Outcome::Version(text) = program.parse(&argv(&["-v"])).unwrap() else {
            panic!("expected Version");
        };
        assert_eq!(text, "greeting 1.0.0\n");
    }

    #[test]
    fn negated_help_does_not_trigger() {
        let outcome = greeting().parse(&argv(&["--no-help"])).unwrap();
        assert!(matches!(outcome, Outcome::Unhandled(_)));
    }

    #[test]
    fn handler_error_is_wrapped() {
        let program = Program::new("app").command(
            Command::new("fail")
                .unwrap()
                .action(|_| Err(anyhow::anyhow!("boom"))),
        );
        let err = program.parse(&argv(&["fail"])).unwrap_err();
        assert_eq!(err.to_string(), "command `fail` failed");
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("boom"));
    }

    #[test]
    fn invalid_program_is_reported() {
        let program = Program::new("app")
            .command(Command::new("a").unwrap())
            .command(Command::new("a").unwrap());
        let err = program.parse(&argv(&[])).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Build(BuildError::DuplicateCommand(_))
        ));
    }

    #[test]
    fn invocation_serializes() {
        let Outcome::Unhandled(inv) = greeting().parse(&argv(&["hello", "Bob"])).unwrap() else {
            panic!("expected Unhandled");
        };
        let json = serde_json::to_value(&inv).unwrap();
        assert_eq!(json["command"], "hello");
        assert_eq!(json["args"]["name"], "Bob");
        assert_eq!(json["options"]["__"], serde_json::json!(["hello", "Bob"]));
        assert_eq!(json["options"]["greet"], "Hello");
    }
}
