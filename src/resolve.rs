use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::conf;
use crate::model::{
    EnvFlag, EnvMap, ExtraMap, GlobalMap, GlobalPolicy, Layer, PresetRef, RuleMap, RuleSetting,
    Severity,
};
use crate::preset::PresetSource;

/// The flattened configuration handed to the linting engine.
///
/// Built once by [`resolve`] (plus any per-file override layers) and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedConfig {
    #[serde(rename = "env")]
    pub environment: EnvMap,
    pub extends: Vec<PresetRef>,
    pub rules: RuleMap,
    pub globals: GlobalMap,
    #[serde(flatten)]
    pub extra: ExtraMap,
    /// Preset identifiers no source could expand, in first-seen order.
    #[serde(skip)]
    pub unresolved: Vec<String>,
}

/// Merge `presets` (in order, last wins) and then the local entries into one
/// configuration. Local entries win over every preset.
///
/// Entries are never validated: malformed rule settings, unknown
/// environments and unknown preset identifiers are all forwarded.
#[must_use]
pub fn resolve(
    presets: &[PresetRef],
    environment: &EnvMap,
    globals: &GlobalMap,
    overrides: &RuleMap,
    source: &dyn PresetSource,
) -> ResolvedConfig {
    let extra = ExtraMap::new();
    let mut out = ResolvedConfig::default();
    out.apply(
        Layer {
            extends: presets,
            env: environment,
            globals,
            rules: overrides,
            extra: &extra,
        },
        source,
    );
    out
}

impl ResolvedConfig {
    /// Apply one more layer on top: its presets first, then its own entries.
    pub fn apply(&mut self, layer: Layer<'_>, source: &dyn PresetSource) {
        let mut stack = Vec::new();
        for reference in layer.extends {
            self.expand(reference, source, &mut stack);
        }
        self.extends.extend(layer.extends.iter().cloned());
        self.merge_entries(layer);
    }

    fn expand(&mut self, reference: &PresetRef, source: &dyn PresetSource, stack: &mut Vec<String>) {
        let Some(id) = reference.as_id() else {
            debug!(preset = %reference, "non-string preset reference forwarded");
            self.note_unresolved(reference.to_string());
            return;
        };
        if stack.iter().any(|seen| seen == id) {
            warn!(preset = id, chain = ?stack, "preset extends itself; skipping");
            self.note_unresolved(id.to_owned());
            return;
        }
        let Some(preset) = source.preset(id) else {
            debug!(preset = id, "preset not available locally; forwarded");
            self.note_unresolved(id.to_owned());
            return;
        };
        stack.push(id.to_owned());
        for nested in &preset.extends {
            self.expand(nested, source, stack);
        }
        self.merge_entries(preset.layer());
        stack.pop();
    }

    // Whole entries are replaced; rule options are never merged.
    fn merge_entries(&mut self, layer: Layer<'_>) {
        for (name, flag) in layer.env {
            self.environment.insert(name.clone(), flag.clone());
        }
        for (name, setting) in layer.globals {
            self.globals.insert(name.clone(), setting.clone());
        }
        for (name, setting) in layer.rules {
            self.rules.insert(name.clone(), setting.clone());
        }
        for (key, value) in layer.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    fn note_unresolved(&mut self, id: String) {
        if !self.unresolved.contains(&id) {
            self.unresolved.push(id);
        }
    }

    #[must_use]
    pub fn severity(&self, rule: &str) -> Option<Severity> {
        self.rules.get(rule)?.severity()
    }

    #[must_use]
    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        self.severity(rule).is_some_and(|level| level != Severity::Off)
    }

    #[must_use]
    pub fn rule_options(&self, rule: &str) -> &[Value] {
        self.rules.get(rule).map_or(&[], RuleSetting::options)
    }

    #[must_use]
    pub fn env_enabled(&self, name: &str) -> bool {
        self.environment
            .get(name)
            .and_then(EnvFlag::enabled)
            .unwrap_or(false)
    }

    #[must_use]
    pub fn global_policy(&self, name: &str) -> Option<GlobalPolicy> {
        self.effective_globals().get(name).copied()
    }

    /// Globals implied by enabled environments, with explicit `globals`
    /// layered on top. `off` removes a symbol; unknown policies are skipped.
    #[must_use]
    pub fn effective_globals(&self) -> BTreeMap<String, GlobalPolicy> {
        let mut out = BTreeMap::new();
        for (name, flag) in &self.environment {
            if flag.enabled() != Some(true) {
                continue;
            }
            if let Some(symbols) = conf::env_globals(name) {
                for (symbol, policy) in symbols {
                    out.insert((*symbol).to_owned(), *policy);
                }
            }
        }
        for (name, setting) in &self.globals {
            match setting.policy() {
                Some(GlobalPolicy::Off) => {
                    out.remove(name);
                }
                Some(policy) => {
                    out.insert(name.clone(), policy);
                }
                None => {}
            }
        }
        out
    }

    /// # Errors
    /// Returns an error only if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::GlobalSetting;
    use crate::preset::{Preset, PresetRegistry};

    fn preset(rules: &[(&str, Value)]) -> Preset {
        Preset {
            rules: rules
                .iter()
                .map(|(k, v)| ((*k).to_owned(), RuleSetting(v.clone())))
                .collect(),
            ..Preset::default()
        }
    }

    fn rules(entries: &[(&str, Value)]) -> RuleMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), RuleSetting(v.clone())))
            .collect()
    }

    #[test]
    fn nested_presets_expand_before_their_own_entries() {
        let registry = PresetRegistry::new()
            .with("inner", preset(&[("a", json!("warn")), ("b", json!("warn"))]))
            .with(
                "outer",
                Preset {
                    extends: vec![PresetRef::from("inner")],
                    ..preset(&[("b", json!("error"))])
                },
            );
        let out = resolve(
            &[PresetRef::from("outer")],
            &EnvMap::new(),
            &GlobalMap::new(),
            &RuleMap::new(),
            &registry,
        );
        assert_eq!(out.rules["a"], RuleSetting(json!("warn")));
        assert_eq!(out.rules["b"], RuleSetting(json!("error")));
        assert_eq!(out.extends, vec![PresetRef::from("outer")]);
        assert!(out.unresolved.is_empty());
    }

    #[test]
    fn preset_cycle_is_skipped() {
        let registry = PresetRegistry::new()
            .with(
                "a",
                Preset {
                    extends: vec![PresetRef::from("b")],
                    ..preset(&[("x", json!(1))])
                },
            )
            .with(
                "b",
                Preset {
                    extends: vec![PresetRef::from("a")],
                    ..preset(&[("y", json!(2))])
                },
            );
        let out = resolve(
            &[PresetRef::from("a")],
            &EnvMap::new(),
            &GlobalMap::new(),
            &RuleMap::new(),
            &registry,
        );
        assert_eq!(out.rules.len(), 2);
        assert_eq!(out.unresolved, vec!["a".to_string()]);
    }

    #[test]
    fn non_string_and_unknown_presets_are_forwarded() {
        let refs = [PresetRef(json!(7)), PresetRef::from("airbnb"), PresetRef::from("airbnb")];
        let out = resolve(
            &refs,
            &EnvMap::new(),
            &GlobalMap::new(),
            &rules(&[("semi", json!(["error", "never"]))]),
            &PresetRegistry::new(),
        );
        assert_eq!(out.extends, refs.to_vec());
        assert_eq!(out.unresolved, vec!["7".to_string(), "airbnb".to_string()]);
        assert_eq!(out.rules.len(), 1);
    }

    #[test]
    fn presets_contribute_env_and_globals_local_wins() {
        let registry = PresetRegistry::new().with(
            "p",
            Preset {
                env: [("node".to_owned(), EnvFlag::from(true))].into(),
                globals: [("jest".to_owned(), GlobalSetting(json!("readonly")))].into(),
                ..Preset::default()
            },
        );
        let out = resolve(
            &[PresetRef::from("p")],
            &[("node".to_owned(), EnvFlag::from(false))].into(),
            &[("jest".to_owned(), GlobalSetting(json!("off")))].into(),
            &RuleMap::new(),
            &registry,
        );
        assert!(!out.env_enabled("node"));
        assert_eq!(out.globals["jest"], GlobalSetting(json!("off")));
    }

    #[test]
    fn effective_globals_layer_on_env() {
        let out = resolve(
            &[],
            &[
                ("jest".to_owned(), EnvFlag::from(true)),
                ("browser".to_owned(), EnvFlag::from(false)),
                ("made-up".to_owned(), EnvFlag::from(true)),
            ]
            .into(),
            &[
                ("describe".to_owned(), GlobalSetting(json!("off"))),
                ("expect".to_owned(), GlobalSetting(json!("writable"))),
                ("myGlobal".to_owned(), GlobalSetting(json!(false))),
                ("odd".to_owned(), GlobalSetting(json!("sometimes"))),
            ]
            .into(),
            &RuleMap::new(),
            &PresetRegistry::new(),
        );
        let globals = out.effective_globals();
        assert_eq!(globals.get("it"), Some(&GlobalPolicy::Readonly));
        assert!(!globals.contains_key("describe"));
        assert!(!globals.contains_key("window"));
        assert!(!globals.contains_key("odd"));
        assert_eq!(out.global_policy("expect"), Some(GlobalPolicy::Writable));
        assert_eq!(out.global_policy("myGlobal"), Some(GlobalPolicy::Readonly));
    }

    #[test]
    fn serializes_with_env_key_and_extra() {
        let mut out = resolve(
            &[PresetRef::from("x")],
            &[("es6".to_owned(), EnvFlag::from(true))].into(),
            &GlobalMap::new(),
            &rules(&[("camelcase", json!(1))]),
            &PresetRegistry::new(),
        );
        out.extra.insert("root".to_owned(), json!(true));
        assert_eq!(
            out.to_json().unwrap(),
            json!({
                "env": {"es6": true},
                "extends": ["x"],
                "rules": {"camelcase": 1},
                "globals": {},
                "root": true
            })
        );
    }

    #[test]
    fn accessors() {
        let out = resolve(
            &[],
            &EnvMap::new(),
            &GlobalMap::new(),
            &rules(&[
                ("quotes", json!(["error", "single", {"avoidEscape": true}])),
                ("func-names", json!(0)),
            ]),
            &PresetRegistry::new(),
        );
        assert!(out.is_rule_enabled("quotes"));
        assert!(!out.is_rule_enabled("func-names"));
        assert!(!out.is_rule_enabled("missing"));
        assert_eq!(out.rule_options("quotes")[0], json!("single"));
        assert!(out.rule_options("func-names").is_empty());
        assert_eq!(out.severity("func-names"), Some(Severity::Off));
    }
}
