use lintrc::model::config_schema;
use serde_json::json;

#[test]
fn schema_accepts_typical_documents() {
    let schema = config_schema().unwrap();
    let docs = [
        json!({}),
        json!({"extends": "recommended", "rules": {"semi": ["error", "never"]}}),
        json!({
            "root": true,
            "env": {"browser": true},
            "extends": ["react-app", "plugin:prettier/recommended"],
            "globals": {"jest": "off"},
            "ignorePatterns": "dist/**",
            "overrides": [{"files": ["*.test.js"], "env": {"jest": true}}],
            "rules": {"react/forbid-prop-types": [true, {"forbid": ["any"]}]}
        }),
    ];
    for doc in &docs {
        assert!(jsonschema::is_valid(&schema, doc), "rejected {doc}");
    }
}

#[test]
fn schema_rejects_wrong_container_shapes() {
    let schema = config_schema().unwrap();
    let docs = [
        json!({"rules": ["semi"]}),
        json!({"env": "browser"}),
        json!({"overrides": [{"rules": {}}]}),
        json!({"overrides": {"files": "*.js"}}),
    ];
    for doc in &docs {
        assert!(!jsonschema::is_valid(&schema, doc), "accepted {doc}");
    }
}
