use serde::{Deserialize, Serialize};
use std::fmt;

/// A single parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(i64),
    String(String),
}

impl Scalar {
    /// Convert a raw argument into a typed scalar.
    ///
    /// - an optionally signed run of ASCII digits (surrounding whitespace ignored) => `Number`
    /// - `true` / `false` in any case => `Bool`
    /// - anything else, including the empty string => `String`, unchanged
    pub fn coerce(raw: &str) -> Self {
        if let Some(n) = parse_number(raw.trim()) {
            return Self::Number(n);
        }
        if raw.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        Self::String(raw.to_string())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// `true`, a nonzero number, or a non-empty string.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0,
            Self::String(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

/// The value stored under one key of a parse result.
///
/// A key assigned once holds a `Scalar`; every further assignment turns it
/// into (or extends) a `List` in assignment order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Value {
    /// Accumulate another occurrence of the same key.
    pub fn push(&mut self, value: Scalar) {
        match self {
            Self::List(items) => items.push(value),
            Self::Scalar(first) => {
                let first = std::mem::replace(first, Scalar::Bool(false));
                *self = Self::List(vec![first, value]);
            }
        }
    }

    /// All occurrences, oldest first.
    pub fn values(&self) -> &[Scalar] {
        match self {
            Self::Scalar(s) => std::slice::from_ref(s),
            Self::List(items) => items.as_slice(),
        }
    }

    /// The most recent occurrence.
    pub fn last(&self) -> Option<&Scalar> {
        self.values().last()
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Scalar]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => Some(items.as_slice()),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_truthy(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => s.fmt(f),
            Self::List(items) => {
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(",")?;
                    }
                    item.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Scalar(Scalar::Number(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

impl From<Vec<Scalar>> for Value {
    fn from(items: Vec<Scalar>) -> Self {
        Self::List(items)
    }
}

/// Parse an optionally signed decimal integer made only of ASCII digits.
///
/// Unlike `str::parse`, whitespace, decimals and exponents are rejected and
/// values outside `i64` yield `None`.
pub(crate) fn parse_number(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_numbers() {
        assert_eq!(Scalar::coerce("10"), Scalar::Number(10));
        assert_eq!(Scalar::coerce("-10"), Scalar::Number(-10));
        assert_eq!(Scalar::coerce("+7"), Scalar::Number(7));
        assert_eq!(Scalar::coerce(" 42 "), Scalar::Number(42));
        assert_eq!(Scalar::coerce("1.5"), Scalar::String("1.5".into()));
        assert_eq!(Scalar::coerce("-"), Scalar::String("-".into()));
        assert_eq!(Scalar::coerce("0x10"), Scalar::String("0x10".into()));
    }

    #[test]
    fn coerce_out_of_range_number_stays_string() {
        let raw = "99999999999999999999";
        assert_eq!(Scalar::coerce(raw), Scalar::String(raw.into()));
    }

    #[test]
    fn coerce_booleans_ignore_case() {
        assert_eq!(Scalar::coerce("true"), Scalar::Bool(true));
        assert_eq!(Scalar::coerce("FALSE"), Scalar::Bool(false));
        assert_eq!(Scalar::coerce("yes"), Scalar::String("yes".into()));
    }

    #[test]
    fn coerce_keeps_empty_string() {
        assert_eq!(Scalar::coerce(""), Scalar::String(String::new()));
        assert_eq!(Scalar::coerce("   "), Scalar::String("   ".into()));
    }

    #[test]
    fn push_promotes_scalar_to_list() {
        let mut v = Value::from(10_i64);
        v.push(Scalar::Number(20));
        assert_eq!(v, Value::List(vec![Scalar::Number(10), Scalar::Number(20)]));
        v.push(Scalar::from("x"));
        assert_eq!(v.values().len(), 3);
        assert_eq!(v.last(), Some(&Scalar::from("x")));
    }

    #[test]
    fn truthiness() {
        assert!(Value::from(true).is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::from(0_i64).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::List(vec![Scalar::Bool(false)]).is_truthy());
    }

    #[test]
    fn display_joins_lists() {
        let v = Value::List(vec![Scalar::Number(1), Scalar::from("b")]);
        assert_eq!(v.to_string(), "1,b");
    }
}
