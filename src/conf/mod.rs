#![allow(clippy::module_name_repetitions)]

use crate::model::GlobalPolicy::{self, Readonly, Writable};

// Built-in presets, embedded as YAML so they go through the same loader as
// user-provided preset files.

pub const BUILTIN_NAMES: [&str; 3] = ["empty", "recommended", "strict"];

#[must_use]
pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        "empty" => Some(EMPTY),
        "recommended" => Some(RECOMMENDED),
        "strict" => Some(STRICT),
        _ => None,
    }
}

const EMPTY: &str = r"
rules: {}
";

const RECOMMENDED: &str = r#"
env:
  es6: true
rules:
  no-debugger: error
  no-dupe-keys: error
  no-undef: error
  no-unreachable: error
  no-unused-vars: warn
  no-console: "off"
"#;

const STRICT: &str = r"
extends: recommended
rules:
  no-unused-vars: error
  no-console: warn
  eqeqeq: [error, always]
  curly: [error, all]
";

const BROWSER: &[(&str, GlobalPolicy)] = &[
    ("document", Readonly),
    ("fetch", Readonly),
    ("localStorage", Readonly),
    ("location", Writable),
    ("navigator", Readonly),
    ("window", Readonly),
];

const NODE: &[(&str, GlobalPolicy)] = &[
    ("Buffer", Readonly),
    ("__dirname", Readonly),
    ("__filename", Readonly),
    ("exports", Writable),
    ("global", Readonly),
    ("module", Readonly),
    ("process", Readonly),
    ("require", Readonly),
];

const ES6: &[(&str, GlobalPolicy)] = &[
    ("Map", Readonly),
    ("Promise", Readonly),
    ("Proxy", Readonly),
    ("Reflect", Readonly),
    ("Set", Readonly),
    ("Symbol", Readonly),
    ("WeakMap", Readonly),
    ("WeakSet", Readonly),
];

const JEST: &[(&str, GlobalPolicy)] = &[
    ("afterAll", Readonly),
    ("afterEach", Readonly),
    ("beforeAll", Readonly),
    ("beforeEach", Readonly),
    ("describe", Readonly),
    ("expect", Readonly),
    ("it", Readonly),
    ("jest", Readonly),
    ("test", Readonly),
];

const MOCHA: &[(&str, GlobalPolicy)] = &[
    ("after", Readonly),
    ("afterEach", Readonly),
    ("before", Readonly),
    ("beforeEach", Readonly),
    ("context", Readonly),
    ("describe", Readonly),
    ("it", Readonly),
];

/// Global symbols implied by an environment flag. Unknown environments have
/// no table and are forwarded without expansion.
#[must_use]
pub fn env_globals(name: &str) -> Option<&'static [(&'static str, GlobalPolicy)]> {
    match name {
        "browser" => Some(BROWSER),
        "node" => Some(NODE),
        "es6" => Some(ES6),
        "jest" => Some(JEST),
        "mocha" => Some(MOCHA),
        _ => None,
    }
}
