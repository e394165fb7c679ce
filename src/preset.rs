use std::collections::HashMap;

use crate::conf;
use crate::load::{Format, parse_config};
use crate::model::{ConfigFile, EnvMap, ExtraMap, GlobalMap, Layer, PresetRef, RuleMap};

/// A named bundle of defaults that a configuration can `extends`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preset {
    pub extends: Vec<PresetRef>,
    pub env: EnvMap,
    pub globals: GlobalMap,
    pub rules: RuleMap,
    pub extra: ExtraMap,
}

impl Preset {
    #[must_use]
    pub fn layer(&self) -> Layer<'_> {
        Layer {
            extends: &self.extends,
            env: &self.env,
            globals: &self.globals,
            rules: &self.rules,
            extra: &self.extra,
        }
    }
}

impl From<ConfigFile> for Preset {
    /// `ignorePatterns` and `overrides` only apply to the file that declares
    /// them, so a preset keeps just its layer.
    fn from(file: ConfigFile) -> Self {
        Self {
            extends: file.extends.as_slice().to_vec(),
            env: file.env,
            globals: file.globals,
            rules: file.rules,
            extra: file.extra,
        }
    }
}

/// Lookup of presets by identifier. Identifiers a source does not know are
/// not an error; they are forwarded to the consuming engine.
pub trait PresetSource {
    fn preset(&self, id: &str) -> Option<&Preset>;
}

#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    entries: HashMap<String, Preset>,
}

impl PresetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the embedded presets.
    ///
    /// # Panics
    /// Panics only if an embedded preset fails to parse, which is a programming error.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for name in conf::BUILTIN_NAMES {
            let text = conf::builtin(name).expect("builtin preset is embedded");
            let file = parse_config(text, Format::Yaml, name).expect("builtin preset must parse");
            registry.insert(name, Preset::from(file));
        }
        registry
    }

    pub fn insert(&mut self, id: impl Into<String>, preset: Preset) {
        self.entries.insert(id.into(), preset);
    }

    #[must_use]
    pub fn with(mut self, id: impl Into<String>, preset: Preset) -> Self {
        self.insert(id, preset);
        self
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    #[must_use]
    pub fn get_cloned(&self, id: &str) -> Option<Preset> {
        self.entries.get(id).cloned()
    }
}

impl PresetSource for PresetRegistry {
    fn preset(&self, id: &str) -> Option<&Preset> {
        self.entries.get(id)
    }
}
