//! Value providers supplying substitution values for template tokens.
//!
//! A [`ValueProviderGroup`] is a named bundle of properties. Tokens of the form
//! `[[GROUP.PROPERTY]]` are resolved against the group whose name matches
//! `GROUP`, compared case-insensitively.

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Suffix stripped from model type names to derive the group name.
pub const TEMPLATE_SUFFIX: &str = "Template";

/// Callback producing the value of a nested property from its tag.
pub type Resolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// A single property value.
#[derive(Clone)]
pub enum Value {
    /// Plain value, stringified on demand.
    Scalar(serde_json::Value),
    /// Lazily produced value; the resolver is invoked with `tag` on every resolution.
    Nested { tag: String, resolver: Resolver },
}

impl Value {
    pub fn nested<T, F>(tag: T, resolver: F) -> Self
    where
        T: Into<String>,
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Value::Nested { tag: tag.into(), resolver: Arc::new(resolver) }
    }

    /// Resolves the value into the string inserted in place of a token.
    ///
    /// Absent values resolve to an empty string. Scalars use a locale
    /// independent representation: strings verbatim, booleans as `true`/`false`,
    /// numbers in their decimal form and compound values as compact JSON.
    pub fn resolve(&self) -> String {
        match self {
            Value::Nested { tag, resolver } => resolver(tag).unwrap_or_default(),
            Value::Scalar(serde_json::Value::Null) => String::new(),
            Value::Scalar(serde_json::Value::String(s)) => s.clone(),
            Value::Scalar(other) => other.to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Value::Nested { tag, .. } => f.debug_struct("Nested").field("tag", tag).finish(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Scalar(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(serde_json::Value::String(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(serde_json::Value::String(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Scalar(serde_json::Value::Null))
    }
}

macro_rules! scalar_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Scalar(serde_json::Value::from(value))
            }
        })*
    };
}

scalar_from!(bool, i32, i64, u32, u64, f64);

/// A statically declared value provider.
///
/// Implementors list their properties explicitly, in the order the engine
/// should process them.
pub trait TemplateModel {
    /// Type name of the model. A trailing `Template` is stripped to form the group name.
    fn type_name(&self) -> &str;

    /// Ordered registration table of the model's properties.
    fn properties(&self) -> Vec<(&'static str, Value)>;
}

/// Named set of properties matched by `[[NAME.PROPERTY]]` tokens.
#[derive(Debug, Clone)]
pub struct ValueProviderGroup {
    name: String,
    properties: IndexMap<String, Value>,
}

impl ValueProviderGroup {
    /// Creates an empty group, deriving its name from `type_name`.
    pub fn new<S: AsRef<str>>(type_name: S) -> Self {
        Self { name: group_name(type_name.as_ref()).to_string(), properties: IndexMap::new() }
    }

    pub fn from_model(model: &dyn TemplateModel) -> Self {
        let mut group = Self::new(model.type_name());
        for (name, value) in model.properties() {
            group.insert(name, value);
        }
        group
    }

    pub fn with_value<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn with_nested<K, T, F>(mut self, name: K, tag: T, resolver: F) -> Self
    where
        K: Into<String>,
        T: Into<String>,
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.insert(name, Value::nested(tag, resolver));
        self
    }

    /// Adds or replaces a property. Names differing only in case refer to the
    /// same property, so an existing entry keeps its position and spelling.
    pub fn insert<K: Into<String>>(&mut self, name: K, value: Value) {
        let name = name.into();
        match self.properties.keys().position(|key| key.eq_ignore_ascii_case(&name)) {
            Some(index) => {
                if let Some((_, slot)) = self.properties.get_index_mut(index) {
                    *slot = value;
                }
            }
            None => {
                self.properties.insert(name, value);
            }
        }
    }

    /// Copies every property of `other` into this group.
    pub fn merge(&mut self, other: ValueProviderGroup) {
        for (name, value) in other.properties {
            self.insert(name, value);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(group_name(name))
    }
}

/// Derives a group name from a model type name.
pub fn group_name(type_name: &str) -> &str {
    type_name.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(type_name)
}

/// The solution being generated.
#[derive(Debug, Clone, Default)]
pub struct SolutionTemplate {
    pub name: String,
    pub directory: String,
}

impl TemplateModel for SolutionTemplate {
    fn type_name(&self) -> &str {
        "SolutionTemplate"
    }

    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![("Name", self.name.as_str().into()), ("Directory", self.directory.as_str().into())]
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompanyTemplate {
    pub name: String,
}

impl TemplateModel for CompanyTemplate {
    fn type_name(&self) -> &str {
        "CompanyTemplate"
    }

    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![("Name", self.name.as_str().into())]
    }
}

/// Date and time of the generation run, captured once at construction.
#[derive(Debug, Clone)]
pub struct DateTimeTemplate {
    now: DateTime<Local>,
}

impl DateTimeTemplate {
    pub fn new() -> Self {
        Self { now: Local::now() }
    }

    pub fn at(now: DateTime<Local>) -> Self {
        Self { now }
    }
}

impl Default for DateTimeTemplate {
    fn default() -> Self {
        DateTimeTemplate::new()
    }
}

impl TemplateModel for DateTimeTemplate {
    fn type_name(&self) -> &str {
        "DateTimeTemplate"
    }

    fn properties(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("Year", self.now.format("%Y").to_string().into()),
            ("Month", self.now.format("%m").to_string().into()),
            ("Day", self.now.format("%d").to_string().into()),
            ("Date", self.now.format("%Y-%m-%d").to_string().into()),
            ("Time", self.now.format("%H:%M:%S").to_string().into()),
        ]
    }
}
