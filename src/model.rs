#![allow(clippy::module_name_repetitions)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type EnvMap = BTreeMap<String, EnvFlag>;
pub type GlobalMap = BTreeMap<String, GlobalSetting>;
pub type RuleMap = BTreeMap<String, RuleSetting>;
pub type ExtraMap = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Off,
    Warn,
    Error,
}

impl Severity {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "off" => Some(Self::Off),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    #[must_use]
    pub const fn from_number(value: u64) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Warn),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Accepts both spellings: `"off" | "warn" | "error"` and `0 | 1 | 2`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Number(num) => num.as_u64().and_then(Self::from_number),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the `rules` mapping, kept exactly as written.
///
/// Well-formed entries are a severity or a list whose first element is a
/// severity and whose remaining elements are rule options. Anything else is
/// forwarded untouched and left for the consuming engine to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RuleSetting(pub Value);

impl RuleSetting {
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        match &self.0 {
            Value::Array(items) => items.first().and_then(Severity::from_value),
            other => Severity::from_value(other),
        }
    }

    #[must_use]
    pub fn options(&self) -> &[Value] {
        match &self.0 {
            Value::Array(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.severity().is_some()
    }
}

impl From<Value> for RuleSetting {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalPolicy {
    Readonly,
    Writable,
    Off,
}

impl GlobalPolicy {
    /// Legacy spellings (`readable`, `writeable`, booleans) map onto the
    /// current policies.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::Writable),
            Value::Bool(false) => Some(Self::Readonly),
            Value::String(text) => match text.as_str() {
                "readonly" | "readable" | "false" => Some(Self::Readonly),
                "writable" | "writeable" | "true" => Some(Self::Writable),
                "off" => Some(Self::Off),
                _ => None,
            },
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Readonly => "readonly",
            Self::Writable => "writable",
            Self::Off => "off",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct GlobalSetting(pub Value);

impl GlobalSetting {
    #[must_use]
    pub fn policy(&self) -> Option<GlobalPolicy> {
        GlobalPolicy::from_value(&self.0)
    }
}

impl From<GlobalPolicy> for GlobalSetting {
    fn from(value: GlobalPolicy) -> Self {
        Self(Value::from(value.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EnvFlag(pub Value);

impl EnvFlag {
    #[must_use]
    pub fn enabled(&self) -> Option<bool> {
        self.0.as_bool()
    }
}

impl From<bool> for EnvFlag {
    fn from(value: bool) -> Self {
        Self(Value::Bool(value))
    }
}

static PLUGIN_PRESET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^plugin:((?:@[^/\s]+/)?[^/\s]+)/(\S+)$").expect("plugin preset pattern is valid")
});

const PRESET_FILE_SUFFIXES: [&str; 4] = [".yaml", ".yml", ".json", ".toml"];

/// An `extends` entry. Normally a preset identifier; other values are
/// malformed but still forwarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct PresetRef(pub Value);

/// A `plugin:<plugin>/<config>` identifier split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginPreset<'a> {
    pub plugin: &'a str,
    pub config: &'a str,
}

impl PresetRef {
    #[must_use]
    pub fn as_id(&self) -> Option<&str> {
        self.0.as_str()
    }

    #[must_use]
    pub fn plugin(&self) -> Option<PluginPreset<'_>> {
        let id = self.as_id()?;
        let caps = PLUGIN_PRESET.captures(id)?;
        Some(PluginPreset {
            plugin: caps.get(1)?.as_str(),
            config: caps.get(2)?.as_str(),
        })
    }

    /// True when the identifier names a file rather than a registered preset.
    #[must_use]
    pub fn is_path_like(&self) -> bool {
        self.as_id().is_some_and(is_path_like)
    }
}

pub(crate) fn is_path_like(id: &str) -> bool {
    id.starts_with("./")
        || id.starts_with("../")
        || id.starts_with('/')
        || PRESET_FILE_SUFFIXES.iter().any(|suffix| id.ends_with(suffix))
}

impl fmt::Display for PresetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_id() {
            Some(id) => f.write_str(id),
            None => write!(f, "{}", self.0),
        }
    }
}

impl From<&str> for PresetRef {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl From<String> for PresetRef {
    fn from(value: String) -> Self {
        Self(Value::from(value))
    }
}

/// A scalar or a list of scalars; both spellings are accepted for
/// `extends`, `ignorePatterns`, `files` and `excludedFiles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Many(items) => items,
            Self::One(item) => std::slice::from_ref(item),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(value: Vec<T>) -> Self {
        Self::Many(value)
    }
}

/// On-disk configuration document (`.lintrc`, `.lintrc.yaml`, `.lintrc.json`,
/// `.lintrc.toml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    /// Environments whose global symbols are assumed available.
    #[serde(default)]
    pub env: EnvMap,
    /// Presets applied in order before the local entries.
    #[serde(default)]
    pub extends: OneOrMany<PresetRef>,
    /// Per-symbol access policy, layered on top of `env`.
    #[serde(default)]
    pub globals: GlobalMap,
    /// Rule id to severity or `[severity, ...options]`.
    #[serde(default)]
    pub rules: RuleMap,
    /// Gitignore-style patterns relative to the config's directory.
    #[serde(default)]
    pub ignore_patterns: OneOrMany<String>,
    /// Per-file blocks applied after the base configuration.
    #[serde(default)]
    pub overrides: Vec<OverrideBlock>,
    /// Remaining keys (`root`, `settings`, `parserOptions`, ...) forwarded as-is.
    #[serde(flatten)]
    pub extra: ExtraMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverrideBlock {
    pub files: OneOrMany<String>,
    #[serde(default)]
    pub excluded_files: OneOrMany<String>,
    #[serde(default)]
    pub extends: OneOrMany<PresetRef>,
    #[serde(default)]
    pub env: EnvMap,
    #[serde(default)]
    pub globals: GlobalMap,
    #[serde(default)]
    pub rules: RuleMap,
    #[serde(flatten)]
    pub extra: ExtraMap,
}

/// Borrowed view of one configuration layer: its presets and its own entries.
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub extends: &'a [PresetRef],
    pub env: &'a EnvMap,
    pub globals: &'a GlobalMap,
    pub rules: &'a RuleMap,
    pub extra: &'a ExtraMap,
}

impl ConfigFile {
    #[must_use]
    pub fn layer(&self) -> Layer<'_> {
        Layer {
            extends: self.extends.as_slice(),
            env: &self.env,
            globals: &self.globals,
            rules: &self.rules,
            extra: &self.extra,
        }
    }
}

impl OverrideBlock {
    #[must_use]
    pub fn layer(&self) -> Layer<'_> {
        Layer {
            extends: self.extends.as_slice(),
            env: &self.env,
            globals: &self.globals,
            rules: &self.rules,
            extra: &self.extra,
        }
    }
}

/// JSON schema of [`ConfigFile`].
///
/// # Errors
/// Returns an error only if the generated schema cannot be serialized.
pub fn config_schema() -> serde_json::Result<Value> {
    serde_json::to_value(schemars::schema_for!(ConfigFile))
}
