use thiserror::Error;

/// Malformed command or option declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid command declaration: missing command name")]
    EmptyCommand,

    #[error("invalid argument `{segment}` in command `{command}`: expected <name> or [name]")]
    InvalidSegment { command: String, segment: String },

    #[error("invalid option `{raw}`: empty flag name")]
    EmptyOption { raw: String },

    #[error("duplicate command `{0}`")]
    DuplicateCommand(String),

    #[error("alias conflict: `{alias}` is both a command name and an alias (command: {command})")]
    AliasShadowsCommand { alias: String, command: String },

    #[error("alias conflict: `{alias}` refers to both `{first}` and `{second}`")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// Failures surfaced by [`Program::parse`](crate::Program::parse).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("command `{command}` failed")]
    Handler {
        command: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl DispatchError {
    pub(crate) fn handler(command: Option<&str>, err: anyhow::Error) -> Self {
        Self::Handler {
            command: command.unwrap_or("<global>").to_string(),
            source: err.into(),
        }
    }
}
