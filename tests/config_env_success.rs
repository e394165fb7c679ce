use std::fs;

use lintrc::config::{Overrides, discover_config_with_env};
use tempfile::tempdir;

#[test]
fn env_points_to_valid_config_applies() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("envcfg.yml");
    fs::write(&cfg, "ignorePatterns: ['**/skipme/**']\nrules: {eqeqeq: 2}\n").unwrap();

    let inputs: Vec<std::path::PathBuf> = vec![];
    let ctx = discover_config_with_env(&inputs, &Overrides::default(), &|k| {
        if k == "LINTRC_CONFIG_FILE" {
            Some(cfg.display().to_string())
        } else {
            None
        }
    })
    .expect("env config should load");

    let path = ctx.base_dir.join("a/skipme/file.js");
    assert!(ctx.is_file_ignored(&path));
    assert!(ctx.config.resolved().is_rule_enabled("eqeqeq"));
}

#[test]
fn env_pointing_to_missing_file_is_skipped() {
    let inputs: Vec<std::path::PathBuf> = vec![];
    let ctx = discover_config_with_env(&inputs, &Overrides::default(), &|k| {
        (k == "LINTRC_CONFIG_FILE").then(|| "/definitely/not/here.yaml".to_string())
    })
    .expect("missing env config falls through");
    assert_ne!(
        ctx.source.as_deref(),
        Some(std::path::Path::new("/definitely/not/here.yaml"))
    );
}
