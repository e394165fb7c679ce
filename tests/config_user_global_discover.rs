use std::fs;
use std::path::PathBuf;

use lintrc::config::{Overrides, discover_config};
use tempfile::tempdir;

#[test]
fn discover_config_uses_user_global_when_no_project_or_overrides() {
    let td = tempdir().unwrap();

    // XDG-style user-global config: $XDG_CONFIG_HOME/lintrc/config
    let xdg = td.path().join("xdg").join("lintrc");
    fs::create_dir_all(&xdg).unwrap();
    let global_cfg = xdg.join("config");
    fs::write(&global_cfg, "ignorePatterns: ['**/a.js']\n").unwrap();

    let proj = td.path().join("proj");
    fs::create_dir_all(&proj).unwrap();

    // Safety: setting a process env var for test isolation only.
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", td.path().join("xdg"));
    }
    let inputs: Vec<PathBuf> = vec![proj.clone()];
    let ctx = discover_config(&inputs, &Overrides::default()).expect("discover user-global");

    assert_eq!(ctx.source.as_deref(), Some(global_cfg.as_path()));
    let a = PathBuf::from("a.js");
    assert!(ctx.is_file_ignored(&a));
}
