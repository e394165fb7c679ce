use std::fmt;

use crate::config::LintConfig;
use crate::model::{EnvMap, GlobalMap, Layer, PresetRef, RuleMap};
use crate::preset::{PresetRegistry, PresetSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Note,
    Warning,
}

impl Level {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Warning => "warning",
        }
    }
}

/// A shape problem found in a configuration. Problems never stop
/// resolution; they only describe what the engine is likely to reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub level: Level,
    /// Dotted location inside the document, e.g. `overrides[0].rules.semi`.
    pub location: String,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut line = format!("  {}", self.location);
        line.push_str(&" ".repeat(32usize.saturating_sub(line.len())));
        line.push_str(self.level.as_str());
        line.push_str(&" ".repeat(42usize.saturating_sub(line.len())));
        line.push_str(&self.message);
        f.write_str(&line)
    }
}

/// Check a loaded configuration and each of its `overrides` blocks.
#[must_use]
pub fn check(config: &LintConfig) -> Vec<Problem> {
    let mut problems = Vec::new();
    check_layer(&mut problems, "", config.file().layer(), config.presets());
    for (idx, block) in config.file().overrides.iter().enumerate() {
        check_layer(
            &mut problems,
            &format!("overrides[{idx}]."),
            block.layer(),
            config.presets(),
        );
    }
    problems
}

fn check_layer(out: &mut Vec<Problem>, prefix: &str, layer: Layer<'_>, presets: &PresetRegistry) {
    check_extends(out, prefix, layer.extends, presets);
    check_env(out, prefix, layer.env);
    check_globals(out, prefix, layer.globals);
    check_rules(out, prefix, layer.rules);
}

fn check_extends(out: &mut Vec<Problem>, prefix: &str, refs: &[PresetRef], presets: &PresetRegistry) {
    for (idx, reference) in refs.iter().enumerate() {
        let location = format!("{prefix}extends[{idx}]");
        let Some(id) = reference.as_id() else {
            out.push(Problem {
                level: Level::Warning,
                location,
                message: format!("preset reference should be a string, found {}", reference.0),
            });
            continue;
        };
        if presets.preset(id).is_some() {
            continue;
        }
        let message = reference.plugin().map_or_else(
            || format!("preset '{id}' is not known locally and is left to the engine"),
            |parts| format!("preset '{id}' is provided by plugin '{}'", parts.plugin),
        );
        out.push(Problem {
            level: Level::Note,
            location,
            message,
        });
    }
}

fn check_env(out: &mut Vec<Problem>, prefix: &str, env: &EnvMap) {
    for (name, flag) in env {
        if flag.enabled().is_none() {
            out.push(Problem {
                level: Level::Warning,
                location: format!("{prefix}env.{name}"),
                message: format!("environment flag should be true or false, found {}", flag.0),
            });
        }
    }
}

fn check_globals(out: &mut Vec<Problem>, prefix: &str, globals: &GlobalMap) {
    for (name, setting) in globals {
        if setting.policy().is_none() {
            out.push(Problem {
                level: Level::Warning,
                location: format!("{prefix}globals.{name}"),
                message: format!(
                    "global policy should be one of readonly, writable, off, found {}",
                    setting.0
                ),
            });
        }
    }
}

fn check_rules(out: &mut Vec<Problem>, prefix: &str, rules: &RuleMap) {
    for (name, setting) in rules {
        if !setting.is_well_formed() {
            out.push(Problem {
                level: Level::Warning,
                location: format!("{prefix}rules.{name}"),
                message: "rule should be a severity (off, warn, error, 0, 1, 2) or a list starting with one"
                    .to_string(),
            });
        }
    }
}
