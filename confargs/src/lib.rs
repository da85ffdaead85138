//! Long-option parsing driven by registered option descriptors.
//!
//! A [`Configurations`] registry holds named option descriptors. Parsing
//! scans a token vector from index 1, matches each `--name` token against
//! the registry by prefix in registration order, hands the option's
//! arguments to the descriptor's converter, and returns a [`ParseResult`]
//! mapping stripped option names to typed [`Value`]s plus the index where
//! scanning stopped.
//!
//! ```
//! use confargs::{Configurations, Value, DURATION, FLAG, SIZE};
//!
//! let mut cfg = Configurations::new();
//! cfg.add("--verbose", FLAG);
//! cfg.add("--timeout", DURATION);
//! cfg.add("--cache", SIZE);
//!
//! let parsed = cfg
//!     .parse(&["prog", "--timeout", "2h", "--cache", "10kb", "--verbose", "input"])
//!     .unwrap();
//! assert_eq!(parsed.get::<u64>("timeout").unwrap(), 7200);
//! assert_eq!(parsed.value("cache"), Some(&Value::UInt(10240)));
//! assert!(parsed.get::<bool>("verbose").unwrap());
//! assert_eq!(parsed.break_point(), 6);
//! ```

mod convert;
mod option;
mod parse;

pub use convert::{
    duration, flag, full_convert_unsigned, identity, size, unsigned, DURATION_SUFFIXES,
    SIZE_SUFFIXES,
};
pub use option::{
    Arity, ConvertFn, Converter, Descriptor, DynamicOption, FixedOption, DURATION, FLAG,
    IDENTITY, SIZE, UNSIGNED, VARIABLE_ARGUMENTS,
};
pub use parse::{Configurations, HelpFn, ParseResult, BREAK_POINT_KEY, OPTION_MARKER};

// ============================================================================
// Result and Error types
// ============================================================================

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid value {0}")]
    InvalidNumericValue(String),

    #[error("invalid suffix {0}")]
    InvalidSuffix(String),

    #[error("insufficient arguments for {0}")]
    InsufficientArguments(String),

    #[error("unrecognized option {0}")]
    UnrecognizedOption(String),

    #[error("invalid option string {token} with option name {name}")]
    InvalidEqualsUsage { token: String, name: String },

    #[error("cannot modify converter of a fixed option")]
    FixedConverter,

    #[error("no converter bound for {0}")]
    MissingConverter(String),

    #[error("converter expects {expected} argument(s), got {got}")]
    ConverterArity { expected: &'static str, got: usize },

    #[error("argument is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("option {later} is shadowed by {earlier}")]
    AmbiguousOption { earlier: String, later: String },

    #[error("option name {0} is reserved")]
    ReservedOption(String),

    #[error("option not found: {0}")]
    NotFound(String),

    #[error("type mismatch: expected {0}")]
    TypeMismatch(&'static str),
}

// ============================================================================
// Value — typed converter output
// ============================================================================

/// Converter output, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    UInt(u64),
    Str(String),
    List(Vec<String>),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(v) => write!(f, "{}", v.join(",")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v)
    }
}

// ============================================================================
// Trait for typed retrieval from ParseResult
// ============================================================================

/// Exact-kind extraction from a [`Value`]. There are no coercions between
/// kinds: a `Str` never reads as a one-element list, a `UInt` never reads
/// as a bool.
pub trait FromValue: Sized {
    fn from_value(v: &Value) -> Result<Self>;
}

impl FromValue for bool {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(*b),
            _ => Err(Error::TypeMismatch("bool")),
        }
    }
}

impl FromValue for u64 {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::UInt(n) => Ok(*n),
            _ => Err(Error::TypeMismatch("u64")),
        }
    }
}

impl FromValue for String {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Str(s) => Ok(s.clone()),
            _ => Err(Error::TypeMismatch("String")),
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::List(v) => Ok(v.clone()),
            _ => Err(Error::TypeMismatch("Vec<String>")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_lists() {
        let v = Value::List(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(v.to_string(), "a,b,c");
        assert_eq!(Value::UInt(42).to_string(), "42");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn from_value_is_exact() {
        assert_eq!(u64::from_value(&Value::UInt(7)).unwrap(), 7);
        assert!(matches!(
            u64::from_value(&Value::Bool(true)),
            Err(Error::TypeMismatch("u64"))
        ));
        assert!(matches!(
            Vec::<String>::from_value(&Value::Str("a".into())),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            String::from_value(&Value::List(vec!["a".into()])),
            Err(Error::TypeMismatch(_))
        ));
        assert!(!bool::from_value(&Value::Bool(false)).unwrap());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            Error::InsufficientArguments("--size".into()).to_string(),
            "insufficient arguments for --size"
        );
        assert_eq!(
            Error::InvalidEqualsUsage {
                token: "--size=1".into(),
                name: "--size".into()
            }
            .to_string(),
            "invalid option string --size=1 with option name --size"
        );
    }
}
