use std::ffi::OsString;
use std::io::Write;

use confargs::{Configurations, DynamicOption, ParseResult, Value, DURATION, FLAG, IDENTITY, SIZE};
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cmdline {
    pub verbose: bool,
    pub timeout: Option<u64>,
    pub cache_size: Option<u64>,
    pub name: Option<String>,
    pub include: Vec<String>,
    pub level: Option<u64>,
    pub break_point: usize,
    pub positional: Vec<String>,
}

#[derive(Debug)]
pub enum Outcome {
    Help,
    Parsed(Cmdline),
}

const USAGE: &str = r#"Usage: confargs [OPTION]... [--] [ARG]...
Parse the given options and print what was recognized.

Options:
      --verbose          Note every recognized option.
      --timeout DURATION Seconds, or with a unit: 90, 5m, 2h, 1d.
      --cache-size SIZE  Bytes, or with a binary unit: 512, 10kb, 4GiB.
      --name NAME        A single name.
      --include PATH...  One or more paths, up to the next option.
      --level[=N]        Verbosity level; 1 when given without a value.
      --help             This help.

Option scanning stops at the first argument not starting with "--",
or after a bare "--".  Remaining arguments are printed as positional.

Environment variables: CONFARGS_LOG (log filter, default "warn").
"#;

/// Level reported for a bare `--level`.
const DEFAULT_LEVEL: u64 = 1;

fn build_options() -> Configurations {
    let mut cfg = Configurations::new();
    cfg.with_help(|| print!("{}", USAGE));
    cfg.add("--verbose", FLAG)
        .add("--timeout", DURATION)
        .add("--cache-size", SIZE)
        .add("--name", IDENTITY.argument_count(1))
        .add("--include", IDENTITY)
        .add(
            "--level",
            DynamicOption::new()
                .argument_count(1)
                .optional(true)
                .converter(|args| match args {
                    [] => Ok(Value::UInt(DEFAULT_LEVEL)),
                    _ => confargs::unsigned(args),
                }),
        );
    cfg
}

fn strings(value: &Value) -> Vec<String> {
    match value {
        Value::Str(s) => vec![s.clone()],
        Value::List(v) => v.clone(),
        other => vec![other.to_string()],
    }
}

impl Cmdline {
    fn from_parsed(parsed: &ParseResult, args: &[OsString]) -> Result<Cmdline> {
        let optional_u64 = |name: &str| -> Result<Option<u64>> {
            if parsed.is_present(name) {
                Ok(Some(parsed.get::<u64>(name)?))
            } else {
                Ok(None)
            }
        };

        let cmdline = Cmdline {
            verbose: parsed.is_present("verbose"),
            timeout: optional_u64("timeout")?,
            cache_size: optional_u64("cache-size")?,
            name: if parsed.is_present("name") {
                Some(parsed.get::<String>("name")?)
            } else {
                None
            },
            include: parsed.value("include").map(strings).unwrap_or_default(),
            level: optional_u64("level")?,
            break_point: parsed.break_point(),
            positional: parsed
                .remaining(args)
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
        };
        if cmdline.verbose {
            for (name, value) in parsed.iter() {
                debug!(option = name, %value, "recognized");
            }
        }
        Ok(cmdline)
    }

    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        if self.verbose {
            writeln!(out, "verbose: true")?;
        }
        if let Some(t) = self.timeout {
            writeln!(out, "timeout: {}", t)?;
        }
        if let Some(s) = self.cache_size {
            writeln!(out, "cache-size: {}", s)?;
        }
        if let Some(ref n) = self.name {
            writeln!(out, "name: {}", n)?;
        }
        if !self.include.is_empty() {
            writeln!(out, "include: {}", self.include.join(","))?;
        }
        if let Some(l) = self.level {
            writeln!(out, "level: {}", l)?;
        }
        writeln!(out, "break-point: {}", self.break_point)?;
        for p in &self.positional {
            writeln!(out, "positional: {}", p)?;
        }
        Ok(())
    }
}

pub fn parse_args(args: Vec<OsString>) -> Result<Outcome> {
    let cfg = build_options();
    let parsed = cfg.parse_os(args.clone())?;
    if parsed.help_requested() {
        return Ok(Outcome::Help);
    }
    Ok(Outcome::Parsed(Cmdline::from_parsed(&parsed, &args)?))
}
