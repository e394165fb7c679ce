use std::path::Path;

use saphyr::{LoadableYamlNode, YamlOwned};
use serde_json::{Map, Number, Value};

use crate::error::ConfigError;
use crate::model::ConfigFile;

/// Keys whose value is a container; an explicit `null` reads as "absent".
const CONTAINER_KEYS: [&str; 8] = [
    "env",
    "extends",
    "globals",
    "rules",
    "ignorePatterns",
    "overrides",
    "files",
    "excludedFiles",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Picks the parser from the file extension; anything unrecognised
    /// (including the extension-less `.lintrc`) is read as YAML.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Decode raw file bytes, honouring a UTF-8 or UTF-16 byte order mark.
///
/// # Errors
/// Returns an error message when the bytes are not valid in the sniffed encoding.
pub fn decode(bytes: &[u8]) -> Result<String, String> {
    let (text, encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if malformed {
        return Err(format!("invalid {} data", encoding.name()));
    }
    Ok(text.into_owned())
}

/// Parse a configuration document into the file model.
///
/// Only the container shapes are checked here. Entries inside `rules`,
/// `env`, `globals` and `extends` are kept verbatim.
///
/// # Errors
/// Returns [`ConfigError::Parse`] for syntax errors and
/// [`ConfigError::Invalid`] when the document or one of its containers has
/// the wrong shape.
pub fn parse_config(text: &str, format: Format, origin: &str) -> Result<ConfigFile, ConfigError> {
    let mut doc = parse_document(text, format, origin)?;
    match &mut doc {
        Value::Object(map) => strip_null_containers(map),
        Value::Null => return Ok(ConfigFile::default()),
        _ => return Err(ConfigError::invalid(origin, "not a mapping")),
    }
    serde_json::from_value(doc).map_err(|err| ConfigError::invalid(origin, err.to_string()))
}

fn parse_document(text: &str, format: Format, origin: &str) -> Result<Value, ConfigError> {
    match format {
        Format::Json => {
            serde_json::from_str(text).map_err(|err| ConfigError::parse(origin, err.to_string()))
        }
        Format::Toml => {
            toml::from_str(text).map_err(|err| ConfigError::parse(origin, err.to_string()))
        }
        Format::Yaml => {
            let docs = YamlOwned::load_from_str(text)
                .map_err(|err| ConfigError::parse(origin, err.to_string()))?;
            Ok(docs.first().map_or(Value::Null, yaml_to_json))
        }
    }
}

fn strip_null_containers(map: &mut Map<String, Value>) {
    map.retain(|key, value| !(value.is_null() && CONTAINER_KEYS.contains(&key.as_str())));
    if let Some(Value::Array(blocks)) = map.get_mut("overrides") {
        for block in blocks {
            if let Value::Object(inner) = block {
                strip_null_containers(inner);
            }
        }
    }
}

/// Convert a YAML node into its JSON equivalent. Non-string mapping keys are
/// stringified; nodes with no JSON counterpart become `null`.
#[must_use]
pub fn yaml_to_json(node: &YamlOwned) -> Value {
    if let Some(map) = node.as_mapping() {
        let mut out = Map::new();
        for (key, value) in map {
            out.insert(yaml_key(key), yaml_to_json(value));
        }
        return Value::Object(out);
    }
    if let Some(seq) = node.as_sequence() {
        return Value::Array(seq.iter().map(yaml_to_json).collect());
    }
    if let Some(flag) = node.as_bool() {
        return Value::Bool(flag);
    }
    if let Some(num) = node.as_integer() {
        return Value::from(num);
    }
    if let Some(float) = node.as_floating_point() {
        return Number::from_f64(float).map_or(Value::Null, Value::Number);
    }
    node.as_str()
        .map_or(Value::Null, |text| Value::String(text.to_owned()))
}

fn yaml_key(key: &YamlOwned) -> String {
    if let Some(text) = key.as_str() {
        return text.to_owned();
    }
    match yaml_to_json(key) {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{PresetRef, RuleSetting};

    #[test]
    fn yaml_and_json_documents_agree() {
        let yaml = "env:\n  browser: true\nextends: [airbnb]\nrules:\n  semi: [error, never]\n";
        let json = r#"{"env": {"browser": true}, "extends": ["airbnb"], "rules": {"semi": ["error", "never"]}}"#;
        let a = parse_config(yaml, Format::Yaml, "a").unwrap();
        let b = parse_config(json, Format::Json, "b").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn toml_document_parses() {
        let text = "extends = \"recommended\"\n[rules]\nquotes = [\"error\", \"single\"]\ncamelcase = 1\n";
        let cfg = parse_config(text, Format::Toml, "t").unwrap();
        assert_eq!(cfg.extends.as_slice(), &[PresetRef::from("recommended")]);
        assert_eq!(cfg.rules["camelcase"], RuleSetting(json!(1)));
    }

    #[test]
    fn empty_document_is_empty_config() {
        assert_eq!(parse_config("", Format::Yaml, "e").unwrap(), ConfigFile::default());
    }

    #[test]
    fn null_containers_read_as_absent() {
        let cfg = parse_config("rules:\nenv:\n", Format::Yaml, "n").unwrap();
        assert!(cfg.rules.is_empty());
        assert!(cfg.env.is_empty());
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = parse_config("just text", Format::Yaml, "s").unwrap_err();
        assert!(err.to_string().contains("not a mapping"), "{err}");
    }

    #[test]
    fn wrong_container_shape_is_rejected() {
        let err = parse_config("rules: [semi]\n", Format::Yaml, "r").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = parse_config("rules: [1, 2\n", Format::Yaml, "bad.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn unknown_keys_are_kept() {
        let cfg = parse_config("root: true\nsettings:\n  react: {version: detect}\n", Format::Yaml, "x")
            .unwrap();
        assert_eq!(cfg.extra["root"], json!(true));
        assert_eq!(cfg.extra["settings"], json!({"react": {"version": "detect"}}));
    }

    #[test]
    fn decode_strips_bom_and_reads_utf16() {
        assert_eq!(decode(b"\xEF\xBB\xBFrules: {}").unwrap(), "rules: {}");
        let utf16: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("a: 1".encode_utf16().flat_map(u16::to_le_bytes))
            .collect();
        assert_eq!(decode(&utf16).unwrap(), "a: 1");
        assert!(decode(b"\xFF\x00\xC3").is_err());
    }
}
