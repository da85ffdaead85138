//! Option descriptors: how many arguments an option takes, whether it may
//! go without them, and which converter turns them into a [`Value`].
//!
//! Two flavours exist. A [`FixedOption`] carries a plain function pointer
//! bound when it is built and refuses to be rebound; the presets
//! ([`FLAG`], [`DURATION`], [`SIZE`], ...) are fixed options usable in
//! `const` position. A [`DynamicOption`] holds any closure and may be
//! rebound until the registry is parsed with it.

use std::sync::Arc;

use crate::convert;
use crate::parse::Configurations;
use crate::{Error, Result, Value};

/// Raw argument count that stands for [`Arity::Variable`].
pub const VARIABLE_ARGUMENTS: u8 = u8::MAX;

pub type ConvertFn = fn(&[String]) -> Result<Value>;

pub type Converter = Arc<dyn Fn(&[String]) -> Result<Value> + Send + Sync + 'static>;

// ============================================================================
// Arity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments, 0 to 254.
    Fixed(u8),
    /// Every following argument up to the next `-`-prefixed token, at least one.
    Variable,
}

impl Default for Arity {
    fn default() -> Self {
        Arity::Fixed(0)
    }
}

impl Arity {
    const fn from_count(count: u8) -> Self {
        if count == VARIABLE_ARGUMENTS {
            Arity::Variable
        } else {
            Arity::Fixed(count)
        }
    }
}

impl From<u8> for Arity {
    fn from(count: u8) -> Self {
        Arity::from_count(count)
    }
}

// ============================================================================
// FixedOption
// ============================================================================

#[derive(Clone, Copy)]
pub struct FixedOption {
    converter: ConvertFn,
    arity: Arity,
    optional_argument: bool,
}

impl FixedOption {
    pub const fn new(converter: ConvertFn, argument_count: u8, optional_argument: bool) -> Self {
        FixedOption {
            converter,
            arity: Arity::from_count(argument_count),
            optional_argument,
        }
    }

    pub const fn argument_count(mut self, count: u8) -> Self {
        self.arity = Arity::from_count(count);
        self
    }

    pub const fn variable(mut self) -> Self {
        self.arity = Arity::Variable;
        self
    }

    /// Accept the option with no arguments when fewer than required follow.
    /// Meaningless for an arity of zero.
    pub const fn optional(mut self, value: bool) -> Self {
        self.optional_argument = value;
        self
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_optional(&self) -> bool {
        self.optional_argument
    }

    pub fn converter(&self) -> ConvertFn {
        self.converter
    }

    /// Always fails: the converter of a fixed option is bound for good.
    pub fn set_converter(&mut self, _converter: Converter) -> Result<&mut Self> {
        Err(Error::FixedConverter)
    }

    pub fn register(self, configurations: &mut Configurations, name: &str) {
        configurations.add(name, self);
    }
}

impl std::fmt::Debug for FixedOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedOption")
            .field("arity", &self.arity)
            .field("optional_argument", &self.optional_argument)
            .finish_non_exhaustive()
    }
}

/// `--name`: no arguments, yields `true`.
pub const FLAG: FixedOption = FixedOption::new(convert::flag, 0, false);
/// `--name 2h`: one duration, yields seconds.
pub const DURATION: FixedOption = FixedOption::new(convert::duration, 1, false);
/// `--name 10kb`: one size, yields bytes.
pub const SIZE: FixedOption = FixedOption::new(convert::size, 1, false);
/// `--name 17`: one unsigned integer.
pub const UNSIGNED: FixedOption = FixedOption::new(convert::unsigned, 1, false);
/// `--name a b c`: the arguments as given.
pub const IDENTITY: FixedOption = FixedOption::new(convert::identity, VARIABLE_ARGUMENTS, false);

// ============================================================================
// DynamicOption
// ============================================================================

#[derive(Clone, Default)]
pub struct DynamicOption {
    converter: Option<Converter>,
    arity: Arity,
    optional_argument: bool,
}

impl DynamicOption {
    /// A zero-argument, non-optional option with no converter bound yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converter<F>(mut self, func: F) -> Self
    where
        F: Fn(&[String]) -> Result<Value> + Send + Sync + 'static,
    {
        self.converter = Some(Arc::new(func));
        self
    }

    pub fn argument_count(mut self, count: u8) -> Self {
        self.arity = Arity::from(count);
        self
    }

    pub fn variable(mut self) -> Self {
        self.arity = Arity::Variable;
        self
    }

    pub fn optional(mut self, value: bool) -> Self {
        self.optional_argument = value;
        self
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn is_optional(&self) -> bool {
        self.optional_argument
    }

    pub fn bound_converter(&self) -> Option<Converter> {
        self.converter.clone()
    }

    pub fn set_converter(&mut self, converter: Converter) -> Result<&mut Self> {
        self.converter = Some(converter);
        Ok(self)
    }

    pub fn register(self, configurations: &mut Configurations, name: &str) {
        configurations.add(name, self);
    }
}

impl std::fmt::Debug for DynamicOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicOption")
            .field("bound", &self.converter.is_some())
            .field("arity", &self.arity)
            .field("optional_argument", &self.optional_argument)
            .finish()
    }
}

// ============================================================================
// Descriptor — what the registry stores
// ============================================================================

#[derive(Debug, Clone)]
pub enum Descriptor {
    Fixed(FixedOption),
    Dynamic(DynamicOption),
}

impl Descriptor {
    pub fn arity(&self) -> Arity {
        match self {
            Descriptor::Fixed(o) => o.arity(),
            Descriptor::Dynamic(o) => o.arity(),
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            Descriptor::Fixed(o) => o.is_optional(),
            Descriptor::Dynamic(o) => o.is_optional(),
        }
    }

    pub fn converter(&self) -> Option<Converter> {
        match self {
            Descriptor::Fixed(o) => {
                let func: Converter = Arc::new(o.converter());
                Some(func)
            }
            Descriptor::Dynamic(o) => o.bound_converter(),
        }
    }

    pub fn set_converter(&mut self, converter: Converter) -> Result<()> {
        match self {
            Descriptor::Fixed(o) => o.set_converter(converter).map(|_| ()),
            Descriptor::Dynamic(o) => o.set_converter(converter).map(|_| ()),
        }
    }

    pub(crate) fn convert(&self, name: &str, args: &[String]) -> Result<Value> {
        match self {
            Descriptor::Fixed(o) => (o.converter)(args),
            Descriptor::Dynamic(o) => match &o.converter {
                Some(func) => func(args),
                None => Err(Error::MissingConverter(name.to_string())),
            },
        }
    }
}

impl From<FixedOption> for Descriptor {
    fn from(o: FixedOption) -> Self {
        Descriptor::Fixed(o)
    }
}

impl From<DynamicOption> for Descriptor {
    fn from(o: DynamicOption) -> Self {
        Descriptor::Dynamic(o)
    }
}
