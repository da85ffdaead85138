//! Built-in converters and the unit suffix tables they read.
//!
//! Every converter receives the exact token range the dispatcher selected
//! and either consumes all of it or fails.

use crate::{Error, Result, Value};

// ============================================================================
// Suffix tables
// ============================================================================

/// Byte-size units. The `kb`/`kib` spellings are both binary (1024) on
/// purpose.
pub const SIZE_SUFFIXES: &[(&str, u64)] = &[
    ("k", 1 << 10),
    ("kb", 1 << 10),
    ("kib", 1 << 10),
    ("m", 1 << 20),
    ("mb", 1 << 20),
    ("mib", 1 << 20),
    ("g", 1 << 30),
    ("gb", 1 << 30),
    ("gib", 1 << 30),
    ("t", 1 << 40),
    ("tb", 1 << 40),
    ("tib", 1 << 40),
    ("p", 1 << 50),
    ("pb", 1 << 50),
    ("pib", 1 << 50),
];

/// Duration units, in seconds.
pub const DURATION_SUFFIXES: &[(&str, u64)] = &[
    ("m", 60),
    ("minute", 60),
    ("minutes", 60),
    ("h", 60 * 60),
    ("hour", 60 * 60),
    ("hours", 60 * 60),
    ("d", 60 * 60 * 24),
    ("day", 60 * 60 * 24),
    ("days", 60 * 60 * 24),
];

fn lookup_suffix(table: &[(&str, u64)], suffix: &str) -> Option<u64> {
    let suffix = suffix.to_ascii_lowercase();
    table
        .iter()
        .find(|(unit, _)| *unit == suffix)
        .map(|(_, factor)| *factor)
}

// ============================================================================
// Numeric helpers
// ============================================================================

/// Convert the whole of `value` to an unsigned integer of type `T`.
///
/// Fails if the string is empty, holds anything but ASCII digits, or does
/// not fit in `T`.
pub fn full_convert_unsigned<T: TryFrom<u64>>(value: &str) -> Result<T> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidNumericValue(value.to_string()));
    }
    let n: u64 = value
        .parse()
        .map_err(|_| Error::InvalidNumericValue(value.to_string()))?;
    T::try_from(n).map_err(|_| Error::InvalidNumericValue(value.to_string()))
}

/// Leading unsigned integer times the factor of the (optional) unit suffix
/// that follows it.
fn convert_with_suffix(token: &str, table: &[(&str, u64)]) -> Result<u64> {
    let digits = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    if digits == 0 {
        return Err(Error::InvalidNumericValue(token.to_string()));
    }
    let (number, suffix) = token.split_at(digits);
    let base: u64 = full_convert_unsigned(number)
        .map_err(|_| Error::InvalidNumericValue(token.to_string()))?;

    if suffix.is_empty() {
        return Ok(base);
    }
    let factor =
        lookup_suffix(table, suffix).ok_or_else(|| Error::InvalidSuffix(suffix.to_string()))?;
    base.checked_mul(factor)
        .ok_or_else(|| Error::InvalidNumericValue(token.to_string()))
}

fn single(args: &[String]) -> Result<&str> {
    match args {
        [one] => Ok(one.as_str()),
        _ => Err(Error::ConverterArity {
            expected: "exactly 1",
            got: args.len(),
        }),
    }
}

// ============================================================================
// Converters
// ============================================================================

/// Takes no arguments and produces `true`.
pub fn flag(args: &[String]) -> Result<Value> {
    if !args.is_empty() {
        return Err(Error::ConverterArity {
            expected: "0",
            got: args.len(),
        });
    }
    Ok(Value::Bool(true))
}

/// One duration such as `90`, `5m` or `2Days`, in seconds.
pub fn duration(args: &[String]) -> Result<Value> {
    convert_with_suffix(single(args)?, DURATION_SUFFIXES).map(Value::UInt)
}

/// One byte size such as `512`, `10kb` or `4GiB`, in bytes.
pub fn size(args: &[String]) -> Result<Value> {
    convert_with_suffix(single(args)?, SIZE_SUFFIXES).map(Value::UInt)
}

/// One plain unsigned integer.
pub fn unsigned(args: &[String]) -> Result<Value> {
    full_convert_unsigned(single(args)?).map(Value::UInt)
}

/// The tokens as given: a string for one token, a list for several.
pub fn identity(args: &[String]) -> Result<Value> {
    match args {
        [] => Err(Error::ConverterArity {
            expected: "at least 1",
            got: 0,
        }),
        [one] => Ok(Value::Str(one.clone())),
        many => Ok(Value::List(many.to_vec())),
    }
}
