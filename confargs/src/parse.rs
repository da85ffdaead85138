//! The option registry and the scan loop that drives it.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::option::{Arity, Converter, Descriptor, DynamicOption};
use crate::{Error, FromValue, Result, Value};

/// Prefix of every option token, and on its own the end-of-options marker.
pub const OPTION_MARKER: &str = "--";

/// Key under which [`ParseResult`] records where scanning stopped.
pub const BREAK_POINT_KEY: &str = "_break_point";

const HELP_OPTION: &str = "--help";

pub type HelpFn = Arc<dyn Fn() + Send + Sync + 'static>;

// ============================================================================
// Registry
// ============================================================================

struct OptionEntry {
    name: String,
    /// Index into `Configurations::descriptors`.
    descriptor: usize,
}

/// Registered options, in registration order.
///
/// Built during a configuration phase and then only read, so one registry
/// can serve concurrent parses.
#[derive(Default)]
pub struct Configurations {
    options: Vec<OptionEntry>,
    descriptors: Vec<Descriptor>,
    help: Option<HelpFn>,
}

impl Configurations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `descriptor` under `name` (marker included, e.g. `--size`).
    ///
    /// Names are not validated and may overlap; the earliest registered
    /// entry that matches a token wins. See [`Configurations::validate`].
    pub fn add(&mut self, name: &str, descriptor: impl Into<Descriptor>) -> &mut Self {
        self.descriptors.push(descriptor.into());
        self.options.push(OptionEntry {
            name: name.to_string(),
            descriptor: self.descriptors.len() - 1,
        });
        self
    }

    /// Register an ad hoc option from a converter and a raw argument count
    /// ([`VARIABLE_ARGUMENTS`](crate::VARIABLE_ARGUMENTS) for variable).
    pub fn add_option<F>(&mut self, name: &str, converter: F, argument_count: u8) -> &mut Self
    where
        F: Fn(&[String]) -> Result<Value> + Send + Sync + 'static,
    {
        DynamicOption::new()
            .converter(converter)
            .argument_count(argument_count)
            .register(self, name);
        self
    }

    /// Rebind the converter of the first entry registered as `name`.
    pub fn set_converter<F>(&mut self, name: &str, converter: F) -> Result<&mut Self>
    where
        F: Fn(&[String]) -> Result<Value> + Send + Sync + 'static,
    {
        let idx = self
            .options
            .iter()
            .find(|o| o.name == name)
            .map(|o| o.descriptor)
            .ok_or_else(|| Error::NotFound(name.to_string()))?;
        let converter: Converter = Arc::new(converter);
        self.descriptors[idx].set_converter(converter)?;
        Ok(self)
    }

    pub fn with_help<F>(&mut self, render: F) -> &mut Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.help = Some(Arc::new(render));
        self
    }

    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| &self.descriptors[o.descriptor])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.name.as_str())
    }

    /// Reject name sets where a later entry can never be reached: an exact
    /// duplicate, or an earlier name followed by `=`. Also rejects a name
    /// whose result key would be [`BREAK_POINT_KEY`].
    ///
    /// Opt-in; `parse` never calls it.
    pub fn validate(&self) -> Result<()> {
        for (i, later) in self.options.iter().enumerate() {
            if strip_marker(&later.name) == BREAK_POINT_KEY {
                return Err(Error::ReservedOption(later.name.clone()));
            }
            for earlier in &self.options[..i] {
                let shadowed = match later.name.strip_prefix(earlier.name.as_str()) {
                    Some(rest) => rest.is_empty() || rest.starts_with('='),
                    None => false,
                };
                if shadowed {
                    return Err(Error::AmbiguousOption {
                        earlier: earlier.name.clone(),
                        later: later.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Help
    // ========================================================================

    /// One line per registered option showing the arguments it takes.
    pub fn usage(&self) -> String {
        let mut out = String::from("Options:\n");
        for entry in &self.options {
            let descriptor = &self.descriptors[entry.descriptor];
            let _ = write!(out, "  {}", entry.name);
            let shape = match descriptor.arity() {
                Arity::Fixed(0) => String::new(),
                Arity::Fixed(n) => vec!["ARG"; n as usize].join(" "),
                Arity::Variable => "ARG...".to_string(),
            };
            if shape.is_empty() {
                out.push('\n');
            } else if descriptor.is_optional() {
                let _ = write!(out, " [{}]\n", shape);
            } else {
                let _ = write!(out, " {}\n", shape);
            }
        }
        let _ = write!(out, "  {}\n", HELP_OPTION);
        out
    }

    /// Render help through the installed renderer, or print [`usage`]
    /// to stdout when none is installed.
    ///
    /// [`usage`]: Configurations::usage
    pub fn help(&self) {
        match &self.help {
            Some(render) => render(),
            None => print!("{}", self.usage()),
        }
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Parse `args`, where `args[0]` is the program name.
    ///
    /// Scanning stops after a bare `--`, at the first token not starting
    /// with `--`, at `--help`, or at the end of `args`.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> Result<ParseResult> {
        let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
        self.parse_tokens(&args)
    }

    /// Parse a raw OS argument vector.
    pub fn parse_os<I: IntoIterator<Item = OsString>>(&self, args: I) -> Result<ParseResult> {
        let args = args
            .into_iter()
            .map(|a| {
                a.into_string()
                    .map_err(|bad| Error::InvalidUtf8(bad.to_string_lossy().into_owned()))
            })
            .collect::<Result<Vec<String>>>()?;
        self.parse_tokens(&args)
    }

    /// Parse the arguments of the running process.
    pub fn parse_env(&self) -> Result<ParseResult> {
        self.parse_os(std::env::args_os())
    }

    fn parse_tokens(&self, args: &[String]) -> Result<ParseResult> {
        let mut result = ParseResult::default();
        let mut break_point = 1;

        while break_point < args.len() && args[break_point].starts_with(OPTION_MARKER) {
            if args[break_point] == OPTION_MARKER {
                break_point += 1;
                debug!(break_point, "end of options marker");
                break;
            }

            let mut matched = false;
            for entry in &self.options {
                let descriptor = &self.descriptors[entry.descriptor];
                if let Some(value) = test_option(&entry.name, descriptor, &mut break_point, args)? {
                    trace!(option = %entry.name, break_point, "matched option");
                    result.values.insert(strip_marker(&entry.name).to_string(), value);
                    matched = true;
                    break;
                }
            }
            if matched {
                continue;
            }

            self.help();
            if args[break_point] == HELP_OPTION {
                debug!(break_point, "help requested");
                result.help = true;
                break;
            }
            return Err(Error::UnrecognizedOption(args[break_point].clone()));
        }

        debug!(break_point, "option scan finished");
        result.break_point = break_point;
        // An option stored under the reserved key keeps its value.
        result
            .values
            .entry(BREAK_POINT_KEY.to_string())
            .or_insert(Value::UInt(break_point as u64));
        Ok(result)
    }
}

fn strip_marker(name: &str) -> &str {
    name.strip_prefix(OPTION_MARKER).unwrap_or(name)
}

// ============================================================================
// Dispatch
// ============================================================================

/// Cheap guard: only tokens that start with `name` reach [`dispatch`].
fn test_option(
    name: &str,
    descriptor: &Descriptor,
    break_point: &mut usize,
    args: &[String],
) -> Result<Option<Value>> {
    if args[*break_point].get(..name.len()) == Some(name) {
        return dispatch(name, descriptor, break_point, args);
    }
    Ok(None)
}

/// Match the token at `break_point`, known to start with `name`, and run
/// the converter on the arguments it selects. `Ok(None)` leaves
/// `break_point` untouched.
fn dispatch(
    name: &str,
    descriptor: &Descriptor,
    break_point: &mut usize,
    args: &[String],
) -> Result<Option<Value>> {
    let token = &args[*break_point];

    if token == name {
        // --name [args...]
        let available = args[*break_point + 1..]
            .iter()
            .take_while(|a| !a.starts_with('-'))
            .count();
        let required = match descriptor.arity() {
            Arity::Variable => available.max(1),
            Arity::Fixed(n) => usize::from(n),
        };

        if available < required {
            if descriptor.is_optional() {
                *break_point += 1;
                return descriptor.convert(name, &[]).map(Some);
            }
            return Err(Error::InsufficientArguments(name.to_string()));
        }

        let start = *break_point + 1;
        *break_point = start + required;
        return descriptor
            .convert(name, &args[start..start + required])
            .map(Some);
    }

    if token.len() > name.len() {
        if token.as_bytes()[name.len()] != b'=' {
            // --namefoo: some other option
            return Ok(None);
        }
        // Tests the optional flag rather than a single-argument arity; the
        // `=` form is accepted for any optional option.
        if descriptor.is_optional() || descriptor.arity() == Arity::Variable {
            let value = [token[name.len() + 1..].to_string()];
            *break_point += 1;
            return descriptor.convert(name, &value).map(Some);
        }
        return Err(Error::InvalidEqualsUsage {
            token: token.clone(),
            name: name.to_string(),
        });
    }

    unreachable!("token {:?} passed the prefix test for {:?}", token, name)
}

// ============================================================================
// ParseResult
// ============================================================================

/// Values keyed by option name without its `--`, plus the break point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseResult {
    values: HashMap<String, Value>,
    break_point: usize,
    help: bool,
}

impl ParseResult {
    /// Typed value of `name` (or [`BREAK_POINT_KEY`], unless an option was
    /// registered under that key).
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        match self.values.get(name) {
            Some(v) => T::from_value(v),
            None => Err(Error::NotFound(name.to_string())),
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        name != BREAK_POINT_KEY && self.values.contains_key(name)
    }

    /// Index of the first token not consumed as an option.
    pub fn break_point(&self) -> usize {
        self.break_point
    }

    /// Whether scanning stopped at `--help` after rendering help.
    pub fn help_requested(&self) -> bool {
        self.help
    }

    /// Option values, without the break point entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != BREAK_POINT_KEY)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// The tokens of `args` left after option scanning.
    pub fn remaining<'a, S>(&self, args: &'a [S]) -> &'a [S] {
        &args[self.break_point.min(args.len())..]
    }
}
