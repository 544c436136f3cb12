use std::collections::{HashMap, HashSet};
use std::fmt;

use argkit_parser::{AliasTable, Value};

use crate::dispatch::Invocation;
use crate::error::BuildError;

pub(crate) type Action = Box<dyn Fn(&Invocation) -> anyhow::Result<()> + Send + Sync>;

/// Canonical name of the built-in `--help, -h` option.
pub const HELP: &str = "help";
/// Canonical name of the built-in `--version, -v` option.
pub const VERSION: &str = "version";

/// A declared option such as `--output, -o`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opt {
    raw: String,
    spellings: Vec<String>,
    description: String,
    default_value: Option<Value>,
}

impl Opt {
    /// Parse a declaration like `"--output, -o"`.
    ///
    /// Spellings are split on `,` and stripped of one leading `--` or `-`.
    /// The first spelling is the canonical name.
    pub fn new(flags: impl Into<String>, description: impl Into<String>) -> Result<Self, BuildError> {
        let raw = flags.into();
        let spellings: Vec<String> = raw
            .split(',')
            .map(|s| strip_dashes(s.trim()).to_string())
            .collect();
        if spellings.iter().any(|s| s.is_empty()) {
            return Err(BuildError::EmptyOption { raw });
        }
        Ok(Self {
            raw,
            spellings,
            description: description.into(),
            default_value: None,
        })
    }

    fn builtin(name: &str, short: &str, description: &str) -> Self {
        Self {
            raw: format!("--{name}, -{short}"),
            spellings: vec![name.to_string(), short.to_string()],
            description: description.to_string(),
            default_value: None,
        }
    }

    /// Value stored under this option when argv does not set it.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        self.spellings.first().map(String::as_str).unwrap_or_default()
    }

    /// The declaration as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn spellings(&self) -> &[String] {
        self.spellings.as_slice()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn get_default(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }
}

fn strip_dashes(s: &str) -> &str {
    s.strip_prefix("--")
        .or_else(|| s.strip_prefix('-'))
        .unwrap_or(s)
}

/// A named positional slot of a command: `<name>` (required) or `[name]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub required: bool,
}

impl Slot {
    fn parse(segment: &str) -> Option<Self> {
        let (inner, required) = if let Some(inner) =
            segment.strip_prefix('<').and_then(|s| s.strip_suffix('>'))
        {
            (inner, true)
        } else if let Some(inner) = segment.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            (inner, false)
        } else {
            return None;
        };
        if inner.trim().is_empty() {
            return None;
        }
        Some(Self {
            name: inner.to_string(),
            required,
        })
    }
}

/// A subcommand descriptor.
///
/// Every builder method consumes and returns the descriptor it configures, so
/// there is no implicit "current command".
pub struct Command {
    name: String,
    usage: String,
    slots: Vec<Slot>,
    description: String,
    aliases: Vec<String>,
    options: Vec<Opt>,
    action: Option<Action>,
}

impl Command {
    /// Parse a declaration like `"install <pkg> [dir]"`.
    pub fn new(declaration: impl Into<String>) -> Result<Self, BuildError> {
        let usage = declaration.into();
        let mut segments = usage.split_whitespace();
        let Some(name) = segments.next() else {
            return Err(BuildError::EmptyCommand);
        };
        let name = name.to_string();

        let mut slots = Vec::new();
        for segment in segments {
            let Some(slot) = Slot::parse(segment) else {
                return Err(BuildError::InvalidSegment {
                    command: name,
                    segment: segment.to_string(),
                });
            };
            slots.push(slot);
        }

        Ok(Self {
            name,
            usage: usage.trim().to_string(),
            slots,
            description: String::new(),
            aliases: Vec::new(),
            options: Vec::new(),
            action: None,
        })
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add an option scoped to this command.
    pub fn option(mut self, opt: Opt) -> Self {
        self.options.push(opt);
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declaration as written (`install <pkg> [dir]`).
    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn slots(&self) -> &[Slot] {
        self.slots.as_slice()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_slice()
    }

    pub fn options(&self) -> &[Opt] {
        self.options.as_slice()
    }

    pub(crate) fn get_action(&self) -> Option<&Action> {
        self.action.as_ref()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("usage", &self.usage)
            .field("slots", &self.slots)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .field("options", &self.options)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// A command-line program: global options, subcommands and an optional
/// fallback action.
pub struct Program {
    name: String,
    version: Option<String>,
    strict: bool,
    options: Vec<Opt>,
    commands: Vec<Command>,
    action: Option<Action>,
}

impl Program {
    /// Create a program with the built-in `--help, -h` and `--version, -v` options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            strict: false,
            options: vec![
                Opt::builtin(HELP, "h", "Show help"),
                Opt::builtin(VERSION, "v", "Show version"),
            ],
            commands: Vec::new(),
            action: None,
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Match flag spellings case-sensitively.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Add a global option.
    pub fn option(mut self, opt: Opt) -> Self {
        self.options.push(opt);
        self
    }

    /// Append a command.
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Action used when no command matches the first positional argument.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Invocation) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get_version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Global options, built-ins first.
    pub fn options(&self) -> &[Opt] {
        self.options.as_slice()
    }

    pub fn commands(&self) -> &[Command] {
        self.commands.as_slice()
    }

    pub(crate) fn get_action(&self) -> Option<&Action> {
        self.action.as_ref()
    }

    /// Find a command by name, then by alias.
    pub fn find_command(&self, raw: &str) -> Option<&Command> {
        if let Some(c) = self.commands.iter().find(|c| c.name == raw) {
            return Some(c);
        }
        self.commands
            .iter()
            .find(|c| c.aliases.iter().any(|a| a == raw))
    }

    /// Alias table for the tokenizer: global options, then every command's
    /// options in declaration order.
    pub fn alias_table(&self) -> AliasTable {
        let mut table = AliasTable::new().strict(self.strict);
        let scoped = self.commands.iter().flat_map(|c| c.options.iter());
        for opt in self.options.iter().chain(scoped) {
            table.insert(opt.name(), opt.spellings());
        }
        table
    }

    /// Detect duplicate commands and conflicting aliases.
    pub fn validate(&self) -> Result<(), BuildError> {
        let mut names: HashSet<&str> = HashSet::new();
        for c in &self.commands {
            if !names.insert(c.name()) {
                return Err(BuildError::DuplicateCommand(c.name().to_string()));
            }
        }

        let mut alias_map: HashMap<&str, &str> = HashMap::new();
        for c in &self.commands {
            for alias in c.aliases() {
                let alias = alias.trim();
                if alias.is_empty() || alias == c.name() {
                    continue;
                }
                if names.contains(alias) {
                    return Err(BuildError::AliasShadowsCommand {
                        alias: alias.to_string(),
                        command: c.name().to_string(),
                    });
                }
                if let Some(prev) = alias_map.insert(alias, c.name())
                    && prev != c.name()
                {
                    return Err(BuildError::DuplicateAlias {
                        alias: alias.to_string(),
                        first: prev.to_string(),
                        second: c.name().to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("strict", &self.strict)
            .field("options", &self.options)
            .field("commands", &self.commands)
            .field("action", &self.action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_parses_spellings() {
        let opt = Opt::new("--output, -o", "Output file").unwrap();
        assert_eq!(opt.name(), "output");
        assert_eq!(opt.spellings(), &["output".to_string(), "o".to_string()]);
        assert_eq!(opt.raw(), "--output, -o");

        let bare = Opt::new("verbose", "").unwrap();
        assert_eq!(bare.name(), "verbose");
    }

    #[test]
    fn opt_rejects_empty_spelling() {
        let err = Opt::new("--out, ", "").unwrap_err();
        assert_eq!(
            err,
            BuildError::EmptyOption {
                raw: "--out, ".to_string()
            }
        );
        assert!(Opt::new("--", "").is_err());
    }

    #[test]
    fn command_parses_slots() {
        let cmd = Command::new("install <pkg> [dir]").unwrap();
        assert_eq!(cmd.name(), "install");
        assert_eq!(
            cmd.slots(),
            &[
                Slot {
                    name: "pkg".to_string(),
                    required: true
                },
                Slot {
                    name: "dir".to_string(),
                    required: false
                },
            ]
        );
    }

    #[test]
    fn command_rejects_unbracketed_segment() {
        let err = Command::new("install pkg").unwrap_err();
        match err {
            BuildError::InvalidSegment { command, segment } => {
                assert_eq!(command, "install");
                assert_eq!(segment, "pkg");
            }
            other => panic!("expected InvalidSegment, got: {other:?}"),
        }
        assert!(Command::new("x <>").is_err());
        assert!(Command::new("x <a").is_err());
    }

    #[test]
    fn command_rejects_empty_declaration() {
        assert_eq!(Command::new("   ").unwrap_err(), BuildError::EmptyCommand);
    }

    #[test]
    fn alias_table_orders_global_then_scoped() {
        let program = Program::new("app")
            .option(Opt::new("--debug, -d", "").unwrap())
            .command(
                Command::new("build")
                    .unwrap()
                    .option(Opt::new("--output, -o, -O", "").unwrap()),
            );
        let table = program.alias_table();
        let names: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["help", "version", "debug", "output"]);
        assert_eq!(table.resolve("O"), "output");
        assert_eq!(table.resolve("h"), "help");
        assert!(!table.is_strict());
    }

    #[test]
    fn later_declaration_replaces_spellings() {
        let program = Program::new("app")
            .command(Command::new("a").unwrap().option(Opt::new("--out, -o", "").unwrap()))
            .command(Command::new("b").unwrap().option(Opt::new("--out, -x", "").unwrap()));
        let table = program.alias_table();
        assert_eq!(table.resolve("x"), "out");
        assert_eq!(table.resolve("o"), "o");
    }

    #[test]
    fn find_command_by_alias() {
        let program = Program::new("app").command(Command::new("install").unwrap().alias("i"));
        assert_eq!(program.find_command("i").map(Command::name), Some("install"));
        assert!(program.find_command("x").is_none());
    }

    #[test]
    fn validate_rejects_duplicates_and_conflicts() {
        let dup = Program::new("app")
            .command(Command::new("a").unwrap())
            .command(Command::new("a <x>").unwrap());
        assert_eq!(
            dup.validate().unwrap_err(),
            BuildError::DuplicateCommand("a".to_string())
        );

        let shadow = Program::new("app")
            .command(Command::new("alpha").unwrap().alias("beta"))
            .command(Command::new("beta").unwrap());
        let err = shadow.validate().unwrap_err();
        assert!(err.to_string().contains("alias conflict"));

        let shared = Program::new("app")
            .command(Command::new("alpha").unwrap().alias("x"))
            .command(Command::new("beta").unwrap().alias("x"));
        assert!(matches!(
            shared.validate().unwrap_err(),
            BuildError::DuplicateAlias { .. }
        ));
    }

    #[test]
    fn validate_allows_repeated_alias_on_same_command() {
        let program = Program::new("app")
            .command(Command::new("install").unwrap().alias("i").alias("i"))
            .command(Command::new("remove").unwrap().alias("rm"));
        assert_eq!(program.validate(), Ok(()));
    }
}
