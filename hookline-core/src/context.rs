//! # Scope Context
//!
//! Scoped listeners declare the context they care about. At dispatch time the
//! caller supplies its own context and a scoped listener fires only when its
//! declaration is a subset of what was supplied:
//!
//! - every declared key must be present with an equal value,
//! - extra supplied keys are ignored,
//! - an empty declaration always matches.
//!
//! Call sites can describe their context with a typed struct by implementing
//! [`Scope`], or build one inline with the [`scope!`](crate::scope) macro.
//!
//! ```rust
//! use hookline_core::{Scope, ScopeContext, scope};
//!
//! struct PostScope<'a> {
//!     post_type: &'a str,
//! }
//!
//! impl Scope for PostScope<'_> {
//!     fn scope(&self) -> ScopeContext {
//!         scope! { "post_type" => self.post_type }
//!     }
//! }
//!
//! let declared = scope! { "post_type" => "portfolio" };
//! let supplied = PostScope { post_type: "portfolio" }.scope().with("lang", "en");
//! assert!(declared.is_satisfied_by(&supplied));
//! ```

use std::{collections::BTreeMap, fmt};

/// A single context value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextValue {
    /// Text value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Str(s) => f.write_str(s),
            ContextValue::Int(i) => write!(f, "{i}"),
            ContextValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_owned())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

impl From<&String> for ContextValue {
    fn from(value: &String) -> Self {
        ContextValue::Str(value.clone())
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Int(value)
    }
}

impl From<i32> for ContextValue {
    fn from(value: i32) -> Self {
        ContextValue::Int(i64::from(value))
    }
}

impl From<u32> for ContextValue {
    fn from(value: u32) -> Self {
        ContextValue::Int(i64::from(value))
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

/// A flat key/value context map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeContext {
    entries: BTreeMap<String, ContextValue>,
}

impl ScopeContext {
    /// Create an empty context, which matches any supplied context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the context declares nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Subset-equality match against a supplied context.
    pub fn is_satisfied_by(&self, supplied: &ScopeContext) -> bool {
        self.entries
            .iter()
            .all(|(key, expected)| supplied.get(key) == Some(expected))
    }
}

impl<K, V> FromIterator<(K, V)> for ScopeContext
where
    K: Into<String>,
    V: Into<ContextValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = ScopeContext::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

/// Types that can describe themselves as a [`ScopeContext`].
pub trait Scope {
    /// Build the context map.
    fn scope(&self) -> ScopeContext;
}

impl Scope for ScopeContext {
    fn scope(&self) -> ScopeContext {
        self.clone()
    }
}

impl Scope for () {
    fn scope(&self) -> ScopeContext {
        ScopeContext::new()
    }
}

impl<T: Scope + ?Sized> Scope for &T {
    fn scope(&self) -> ScopeContext {
        (**self).scope()
    }
}

impl<V, const N: usize> Scope for [(&str, V); N]
where
    V: Into<ContextValue> + Clone,
{
    fn scope(&self) -> ScopeContext {
        self.iter().map(|(k, v)| (*k, v.clone())).collect()
    }
}

/// Build a [`ScopeContext`] inline.
///
/// ```rust
/// let ctx = hookline_core::scope! { "post_type" => "page", "id" => 7 };
/// assert_eq!(ctx.len(), 2);
/// ```
#[macro_export]
macro_rules! scope {
    () => {
        $crate::ScopeContext::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::ScopeContext::new()$(.with($key, $value))+
    };
}
