use std::fs;

use lintrc::config::{Overrides, discover_config};
use serde_json::json;
use tempfile::tempdir;

fn load(name: &str, content: &[u8]) -> lintrc::ResolvedConfig {
    let td = tempdir().unwrap();
    let path = td.path().join(name);
    fs::write(&path, content).unwrap();
    discover_config(
        &[],
        &Overrides {
            config_file: Some(path),
            config_data: None,
        },
    )
    .expect("config loads")
    .config
    .resolved()
    .clone()
}

#[test]
fn json_toml_and_yaml_resolve_alike() {
    let yaml = load(
        "a.yaml",
        b"env: {node: true}\nrules:\n  semi: [error, never]\n  func-names: 0\n",
    );
    let json_cfg = load(
        "a.json",
        br#"{"env": {"node": true}, "rules": {"semi": ["error", "never"], "func-names": 0}}"#,
    );
    let toml_cfg = load(
        "a.toml",
        b"[env]\nnode = true\n[rules]\nsemi = [\"error\", \"never\"]\nfunc-names = 0\n",
    );
    assert_eq!(yaml, json_cfg);
    assert_eq!(yaml, toml_cfg);
}

#[test]
fn utf8_bom_is_accepted() {
    let out = load("bom.yaml", b"\xEF\xBB\xBFrules: {camelcase: 1}\n");
    assert_eq!(out.rules["camelcase"].0, json!(1));
}

#[test]
fn utf16_config_is_decoded() {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend("rules: {eqeqeq: 2}\n".encode_utf16().flat_map(u16::to_le_bytes));
    let out = load("wide.yaml", &bytes);
    assert_eq!(out.rules["eqeqeq"].0, json!(2));
}

#[test]
fn json_syntax_error_names_the_file() {
    let td = tempdir().unwrap();
    let path = td.path().join("broken.json");
    fs::write(&path, b"{\"rules\": ").unwrap();
    let err = discover_config(
        &[],
        &Overrides {
            config_file: Some(path),
            config_data: None,
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("broken.json"), "{err}");
}

#[test]
fn duplicate_rule_keys_keep_the_last_entry() {
    let yaml = load(
        "dup.yaml",
        b"rules:\n  quotes: [error, single, {avoidEscape: true}]\n  quotes: warn\n",
    );
    assert_eq!(yaml.rules["quotes"].0, json!("warn"));
    assert!(yaml.rule_options("quotes").is_empty());

    let json_cfg = load(
        "dup.json",
        br#"{"rules": {"quotes": ["error", "single", {"avoidEscape": true}], "quotes": "warn"}}"#,
    );
    assert_eq!(json_cfg.rules["quotes"].0, json!("warn"));
}
