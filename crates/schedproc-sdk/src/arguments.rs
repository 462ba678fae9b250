// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Typed input/output arguments resolved per invocation.
//!
//! The host binds activity inputs by name. An input can be in three states:
//! not bound at all, bound to null, or bound to a value. [`InArgument::get`]
//! keeps those apart so activities can report each case with its own message.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input controlling whether caught failures are re-raised to the host.
pub const FAIL_ON_EXCEPTION: &str = "FailOnException";
/// Output set to true when the error boundary caught a failure.
pub const EXCEPTION_OCCURRED: &str = "ExceptionOccurred";
/// Output carrying the caught failure message.
pub const EXCEPTION_MESSAGE: &str = "ExceptionMessage";

/// Value of an option set (picklist) attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionSetValue {
    /// Numeric option code
    pub value: i32,
}

impl OptionSetValue {
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

impl fmt::Display for OptionSetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A loosely-typed argument value as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Bool(bool),
    String(String),
    OptionSet(OptionSetValue),
}

impl ArgumentValue {
    fn type_name(&self) -> &'static str {
        match self {
            ArgumentValue::Bool(_) => "bool",
            ArgumentValue::String(_) => "string",
            ArgumentValue::OptionSet(_) => "option set",
        }
    }
}

impl From<bool> for ArgumentValue {
    fn from(value: bool) -> Self {
        ArgumentValue::Bool(value)
    }
}

impl From<String> for ArgumentValue {
    fn from(value: String) -> Self {
        ArgumentValue::String(value)
    }
}

impl From<&str> for ArgumentValue {
    fn from(value: &str) -> Self {
        ArgumentValue::String(value.to_string())
    }
}

impl From<OptionSetValue> for ArgumentValue {
    fn from(value: OptionSetValue) -> Self {
        ArgumentValue::OptionSet(value)
    }
}

/// Errors resolving an argument.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The host did not bind the argument
    #[error("argument '{0}' is not bound")]
    Unbound(String),

    /// The bound value has a different type than the activity declares
    #[error("argument '{name}' expected {expected} but was bound to {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Conversion from a loosely-typed [`ArgumentValue`].
pub trait FromArgument: Sized {
    /// Type name used in mismatch errors
    const TYPE_NAME: &'static str;

    fn from_argument(value: &ArgumentValue) -> Option<Self>;
}

impl FromArgument for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_argument(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromArgument for String {
    const TYPE_NAME: &'static str = "string";

    fn from_argument(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromArgument for OptionSetValue {
    const TYPE_NAME: &'static str = "option set";

    fn from_argument(value: &ArgumentValue) -> Option<Self> {
        match value {
            ArgumentValue::OptionSet(v) => Some(*v),
            _ => None,
        }
    }
}

/// Argument bag for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    /// Bound inputs. A `None` value is an input bound to null.
    #[serde(default)]
    pub inputs: HashMap<String, Option<ArgumentValue>>,
    /// Outputs written during the invocation
    #[serde(default)]
    pub outputs: HashMap<String, ArgumentValue>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an input to a value.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) {
        self.inputs.insert(name.into(), Some(value.into()));
    }

    /// Bind an input to null.
    pub fn bind_null(&mut self, name: impl Into<String>) {
        self.inputs.insert(name.into(), None);
    }

    /// Builder form of [`Arguments::bind`].
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) -> Self {
        self.bind(name, value);
        self
    }

    /// Look up an input: outer `None` is unbound, inner `None` is null.
    pub fn input(&self, name: &str) -> Option<Option<&ArgumentValue>> {
        self.inputs.get(name).map(Option::as_ref)
    }

    pub fn output(&self, name: &str) -> Option<&ArgumentValue> {
        self.outputs.get(name)
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: impl Into<ArgumentValue>) {
        self.outputs.insert(name.into(), value.into());
    }
}

/// Typed handle to a named input argument.
pub struct InArgument<T> {
    name: &'static str,
    default: Option<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromArgument + Clone> InArgument<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            _marker: PhantomData,
        }
    }

    /// Declare the value used when the input is unbound or null.
    pub fn with_default(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolve the input.
    ///
    /// Returns `Err(ArgumentError::Unbound)` when the host did not bind the
    /// argument and `Ok(None)` when it is bound to null.
    pub fn get(&self, args: &Arguments) -> Result<Option<T>, ArgumentError> {
        match args.input(self.name) {
            None => Err(ArgumentError::Unbound(self.name.to_string())),
            Some(None) => Ok(None),
            Some(Some(value)) => T::from_argument(value).map(Some).ok_or_else(|| {
                ArgumentError::TypeMismatch {
                    name: self.name.to_string(),
                    expected: T::TYPE_NAME,
                    actual: value.type_name(),
                }
            }),
        }
    }

    /// Resolve the input, falling back to the declared default when the input
    /// is unbound or null. Type mismatches are still reported.
    pub fn get_or_default(&self, args: &Arguments) -> Result<Option<T>, ArgumentError> {
        match self.get(args) {
            Ok(Some(value)) => Ok(Some(value)),
            Ok(None) | Err(ArgumentError::Unbound(_)) => Ok(self.default.clone()),
            Err(e) => Err(e),
        }
    }
}

impl<T> fmt::Debug for InArgument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InArgument")
            .field("name", &self.name)
            .finish()
    }
}

/// Typed handle to a named output argument.
pub struct OutArgument<T> {
    name: &'static str,
    _marker: PhantomData<fn(T)>,
}

impl<T: Into<ArgumentValue>> OutArgument<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn set(&self, args: &mut Arguments, value: T) {
        args.set_output(self.name, value);
    }
}

impl<T> fmt::Debug for OutArgument<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutArgument")
            .field("name", &self.name)
            .finish()
    }
}
