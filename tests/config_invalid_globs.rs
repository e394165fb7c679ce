use std::path::PathBuf;

use lintrc::config::{Overrides, discover_config};

#[test]
fn invalid_override_glob_is_reported() {
    let cfg = "overrides:\n  - files: ['a/[b']\n    rules: {semi: 2}\n";
    let err = discover_config(
        &[],
        &Overrides {
            config_file: None,
            config_data: Some(cfg.into()),
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("a/[b"), "{err}");
}

#[test]
fn valid_ignore_patterns_do_not_touch_other_files() {
    let cfg = "ignorePatterns: ['build/', '*.min.js']\n";
    let ctx = discover_config(
        &[],
        &Overrides {
            config_file: None,
            config_data: Some(cfg.into()),
        },
    )
    .expect("parse config");
    assert!(ctx.is_file_ignored(&PathBuf::from("vendor/jquery.min.js")));
    assert!(!ctx.is_file_ignored(&PathBuf::from("src/app.js")));
}
