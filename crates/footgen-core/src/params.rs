//! Parameter loading and layering
//!
//! Parameters are collected into a single YAML tree before being turned into a
//! [`Config`]. Sources are applied in order, later ones winning:
//!
//! 1. parameter files (`.json` parsed as JSON, anything else as YAML), deep-merged
//! 2. `key.path=value` overrides
//!
//! Nested mappings merge key by key. Any other value, sequences included,
//! replaces what was there before.

use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};

/// Merged parameter tree
#[derive(Debug, Clone)]
pub struct Params {
    root: Value,
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

impl Params {
    /// Empty parameter tree
    pub fn new() -> Self {
        Self {
            root: Value::Mapping(Mapping::new()),
        }
    }

    /// Read a parameter file and merge it over the current tree
    pub fn merge_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Merging parameters from {}", path.display());

        let contents = std::fs::read_to_string(path)?;
        let value: Value = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents)?
        } else {
            serde_yaml::from_str(&contents)?
        };

        match value {
            // An empty YAML document contributes nothing.
            Value::Null => Ok(self),
            Value::Mapping(_) => self.merge_value(value),
            _ => Err(Error::ConfigInvalid {
                message: format!("top level of {} must be a mapping", path.display()),
            }),
        }
    }

    /// Merge an in-memory mapping over the current tree
    pub fn merge_value(&mut self, value: Value) -> Result<&mut Self> {
        if !value.is_mapping() {
            return Err(Error::ConfigInvalid {
                message: "parameters must be a mapping".to_string(),
            });
        }
        deep_merge(&mut self.root, value);
        Ok(self)
    }

    /// Apply a single `key.path=value` override
    ///
    /// Intermediate mappings are created as needed. The value is read as a YAML
    /// scalar, so `3` becomes a number and `true` a bool. Anything that reads
    /// as a float is kept as the text given.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<&mut Self> {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::ConfigInvalid {
                message: format!("invalid parameter key '{}'", key),
            });
        }
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::ConfigInvalid {
                message: format!("invalid parameter key '{}'", key),
            });
        };

        let mut cursor = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            cursor = cursor
                .as_mapping_mut()
                .ok_or_else(|| not_a_mapping(key, &segments[..depth]))?
                .entry(Value::String(segment.to_string()))
                .or_insert(Value::Mapping(Mapping::new()));
        }

        cursor
            .as_mapping_mut()
            .ok_or_else(|| not_a_mapping(key, parents))?
            .insert(Value::String(last.to_string()), parse_scalar(raw));

        tracing::debug!("Override {} = {}", key, raw);
        Ok(self)
    }

    /// Split a `key=value` command-line override
    pub fn parse_override(arg: &str) -> Result<(&str, &str)> {
        arg.split_once('=').ok_or_else(|| Error::ConfigInvalid {
            message: format!("parameter override '{}' must be in 'key=value' format", arg),
        })
    }

    #[cfg(test)]
    pub(crate) fn value(&self) -> &Value {
        &self.root
    }

    /// Deserialize the merged tree into a [`Config`]
    pub fn into_config(self) -> Result<Config> {
        Ok(serde_yaml::from_value(self.root)?)
    }
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn parse_scalar(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::String(String::new());
    }
    // Floats stay as written: no numeric field takes one, and `1.10` must not
    // turn into `1.1` on its way to a version string.
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Number(n)) if n.is_f64() => Value::String(raw.to_string()),
        Ok(value @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn not_a_mapping(key: &str, prefix: &[&str]) -> Error {
    Error::ConfigInvalid {
        message: format!(
            "cannot set '{}': '{}' is not a mapping",
            key,
            prefix.join(".")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_deep_merge_nested_mappings() {
        let mut params = Params::new();
        params
            .merge_value(yaml("cluster: {name: a, workers: {nodes: 1}}"))
            .unwrap();
        params
            .merge_value(yaml("cluster: {workers: {nodes: 3, cpus: 2}}"))
            .unwrap();

        let v = params.value();
        assert_eq!(v["cluster"]["name"], Value::String("a".into()));
        assert_eq!(v["cluster"]["workers"]["nodes"], Value::Number(3.into()));
        assert_eq!(v["cluster"]["workers"]["cpus"], Value::Number(2.into()));
    }

    #[test]
    fn test_sequences_replace_rather_than_append() {
        let mut params = Params::new();
        params.merge_value(yaml("machines: [a, b, c]")).unwrap();
        params.merge_value(yaml("machines: [d]")).unwrap();
        assert_eq!(params.value()["machines"], yaml("[d]"));
    }

    #[test]
    fn test_merge_value_rejects_non_mapping() {
        let mut params = Params::new();
        assert!(params.merge_value(yaml("[1, 2]")).is_err());
    }

    #[rstest]
    #[case("3", Value::Number(3.into()))]
    #[case("true", Value::Bool(true))]
    #[case("ignite", Value::String("ignite".into()))]
    #[case("1.14.1", Value::String("1.14.1".into()))]
    #[case("1.10", Value::String("1.10".into()))]
    #[case("", Value::String(String::new()))]
    #[case("[1, 2]", Value::String("[1, 2]".into()))]
    fn test_override_values_are_scalars(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(parse_scalar(raw), expected);
    }

    #[test]
    fn test_set_creates_intermediate_mappings() {
        let mut params = Params::new();
        params.set("cluster.workers.nodes", "4").unwrap();
        assert_eq!(
            params.value()["cluster"]["workers"]["nodes"],
            Value::Number(4.into())
        );
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut params = Params::new();
        params.set("backend", "docker").unwrap();
        let err = params.set("backend.kind", "x").unwrap_err();
        assert!(err.to_string().contains("'backend' is not a mapping"));
    }

    #[rstest]
    #[case("")]
    #[case("cluster..name")]
    #[case(".name")]
    fn test_set_rejects_bad_keys(#[case] key: &str) {
        let mut params = Params::new();
        assert!(params.set(key, "x").is_err());
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(
            Params::parse_override("cluster.name=c1").unwrap(),
            ("cluster.name", "c1")
        );
        assert_eq!(
            Params::parse_override("images.footloose=repo/img:tag=x").unwrap(),
            ("images.footloose", "repo/img:tag=x")
        );
        assert!(Params::parse_override("backend").is_err());
    }

    #[test]
    fn test_into_config() {
        let mut params = Params::new();
        params
            .merge_value(yaml(
                "backend: docker\ncluster: {name: c1, controlPlane: {nodes: 1}, workers: {nodes: 2}}",
            ))
            .unwrap();
        params.set("cluster.workers.nodes", "5").unwrap();

        let config = params.into_config().unwrap();
        assert_eq!(config.cluster.workers.nodes, 5);
        assert_eq!(config.backend, "docker");
    }

    #[rstest]
    #[case("versions.kubelet", "1.15", "1.15")]
    #[case("versions.kubelet", "1.10", "1.10")]
    #[case("cluster.name", "2019", "2019")]
    #[case("cluster.namespace", "true", "true")]
    #[case("images.footloose", "7", "7")]
    fn test_numeric_looking_overrides_reach_string_fields(
        #[case] key: &str,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        let mut params = Params::new();
        params
            .merge_value(yaml(
                "backend: docker\ncluster: {name: c1, controlPlane: {nodes: 1}, workers: {nodes: 2}}",
            ))
            .unwrap();
        params.set(key, raw).unwrap();

        let config = params.into_config().unwrap();
        let actual = match key {
            "versions.kubelet" => config.versions.kubelet,
            "cluster.name" => Some(config.cluster.name),
            "cluster.namespace" => config.cluster.namespace,
            "images.footloose" => config.images.footloose,
            other => panic!("unexpected key {}", other),
        };
        assert_eq!(actual.as_deref(), Some(expected));
    }

    #[test]
    fn test_merge_missing_file() {
        let mut params = Params::new();
        let err = params.merge_file("/nonexistent/params.yaml").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }
}
