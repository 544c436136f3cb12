use indexmap::IndexMap;
use serde::Serialize;

use crate::POSITIONAL_KEY;
use crate::alias::AliasTable;
use crate::value::{Scalar, Value, parse_number};

/// Structured result of one tokenizer pass.
///
/// Serializes as a single object: the positional sequence under `__`
/// followed by every flag in first-assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    #[serde(rename = "__")]
    positional: Vec<Scalar>,
    #[serde(flatten)]
    values: IndexMap<String, Value>,
}

impl ParseResult {
    /// Positional arguments in input order.
    pub fn positional(&self) -> &[Scalar] {
        self.positional.as_slice()
    }

    /// Get the value stored under a canonical name (or raw flag name).
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Whether `name` holds a truthy value.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_truthy)
    }

    /// Flags in first-assignment order (positionals excluded).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of flag keys (positionals excluded).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Store `value` under `name` unless the pass already set it.
    ///
    /// Positionals only come from argv, so defaults for the positional key
    /// (and for empty names) are ignored.
    pub fn set_default(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if name.is_empty() || name == POSITIONAL_KEY {
            return;
        }
        self.values.entry(name).or_insert(value);
    }

    pub fn into_parts(self) -> (Vec<Scalar>, IndexMap<String, Value>) {
        (self.positional, self.values)
    }

    pub(crate) fn push_positional(&mut self, value: Scalar) {
        self.positional.push(value);
    }

    pub(crate) fn assign(&mut self, name: &str, value: Scalar) {
        if name.is_empty() {
            return;
        }
        if name == POSITIONAL_KEY {
            self.push_positional(value);
            return;
        }
        match self.values.get_mut(name) {
            Some(existing) => existing.push(value),
            None => {
                self.values.insert(name.to_string(), Value::Scalar(value));
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Pending<'a> {
    Nothing,
    Flag(&'a str),
    PositionalOnly,
}

impl Pending<'_> {
    /// A flag still waiting for a value becomes a boolean toggle.
    fn flush(&mut self, out: &mut ParseResult, names: &AliasTable) {
        if let Pending::Flag(flag) = *self {
            out.assign(names.resolve(flag), Scalar::Bool(true));
            *self = Pending::Nothing;
        }
    }
}

/// `-abc` style token: a single dash, at least one flag letter, not a number.
fn is_short_cluster(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && parse_number(arg).is_none()
}

/// Tokenize `argv` (program name already stripped) against `names`.
///
/// Rules, first match wins:
/// - after a bare `--`, every token is positional
/// - `--no-key` => `key = false`
/// - `--key=value` => `key = value` (an empty value is kept)
/// - `--key` / `-abc` => `a`, `b` are `true`; `key` / `c` take the next value token
/// - a negative number or a bare `-` is a value, never a flag
/// - other non-empty tokens are the pending flag's value, or positional
/// - empty tokens are dropped
///
/// A pending flag that gets no value (next token is a flag, `--`, or end of
/// input) is stored as `true`. Every stored value goes through
/// [`Scalar::coerce`]. Unknown flags are kept under their raw name; this
/// function never fails.
pub fn tokenize<S: AsRef<str>>(argv: &[S], names: &AliasTable) -> ParseResult {
    let mut out = ParseResult::default();
    let mut pending = Pending::Nothing;

    for arg in argv {
        let arg = arg.as_ref();

        if let Pending::PositionalOnly = pending {
            out.push_positional(Scalar::coerce(arg));
            continue;
        }

        if arg == "--" {
            pending.flush(&mut out, names);
            pending = Pending::PositionalOnly;
            continue;
        }

        if let Some(body) = arg.strip_prefix("--") {
            pending.flush(&mut out, names);
            let (key, value) = match body.split_once('=') {
                Some((key, value)) => (key, Some(value)),
                None => (body, None),
            };
            if let Some(negated) = key.strip_prefix("no-") {
                out.assign(names.resolve(negated), Scalar::Bool(false));
            } else if let Some(value) = value {
                out.assign(names.resolve(key), Scalar::coerce(value));
            } else {
                pending = Pending::Flag(key);
            }
            continue;
        }

        if is_short_cluster(arg) {
            pending.flush(&mut out, names);
            let cluster = &arg[1..];
            // `cluster` is non-empty, so there is always a last char.
            let last = cluster.char_indices().last().map_or(0, |(idx, _)| idx);
            for (idx, c) in cluster[..last].char_indices() {
                let flag = &cluster[idx..idx + c.len_utf8()];
                out.assign(names.resolve(flag), Scalar::Bool(true));
            }
            pending = Pending::Flag(&cluster[last..]);
            continue;
        }

        if arg.is_empty() {
            continue;
        }

        match pending {
            Pending::Flag(flag) => {
                out.assign(names.resolve(flag), Scalar::coerce(arg));
                pending = Pending::Nothing;
            }
            _ => out.push_positional(Scalar::coerce(arg)),
        }
    }

    pending.flush(&mut out, names);

    tracing::trace!(
        args = argv.len(),
        positional = out.positional.len(),
        flags = out.values.len(),
        "tokenized argv"
    );

    out
}
