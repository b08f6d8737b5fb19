//! Runtime parameter store
//!
//! Flat key-value configuration shared between the binary and its nodes.
//! Nested tables from a config file are flattened into `/`-separated keys, so
//! `[turbo] steps = 4` is read back as `turbo/steps`.

use crate::error::{TeleopError, TeleopResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Tick rate of the teleop loop, in Hz
pub const PARAM_HZ: &str = "hz";
/// Number of discrete speed steps per direction
pub const PARAM_STEPS: &str = "turbo/steps";
pub const PARAM_LINEAR_FORWARD_MIN: &str = "turbo/linear_forward_min";
pub const PARAM_LINEAR_FORWARD_MAX: &str = "turbo/linear_forward_max";
pub const PARAM_LINEAR_BACKWARD_MIN: &str = "turbo/linear_backward_min";
pub const PARAM_LINEAR_BACKWARD_MAX: &str = "turbo/linear_backward_max";
pub const PARAM_ANGULAR_MIN: &str = "turbo/angular_min";
pub const PARAM_ANGULAR_MAX: &str = "turbo/angular_max";
/// Name of the topic velocity commands are published on
pub const PARAM_TOPIC: &str = "topic";

/// Simple runtime parameter store
#[derive(Clone)]
pub struct RuntimeParams {
    /// BTreeMap keeps `list_keys` sorted
    params: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl RuntimeParams {
    /// Create a store populated with the teleop defaults
    pub fn new() -> Self {
        let params = Self::empty();
        let mut map = BTreeMap::new();

        map.insert(PARAM_HZ.to_string(), Value::from(10));
        map.insert(PARAM_STEPS.to_string(), Value::from(4));

        map.insert(PARAM_LINEAR_FORWARD_MIN.to_string(), Value::from(0.5));
        map.insert(PARAM_LINEAR_FORWARD_MAX.to_string(), Value::from(1.0));
        map.insert(PARAM_LINEAR_BACKWARD_MIN.to_string(), Value::from(0.25));
        map.insert(PARAM_LINEAR_BACKWARD_MAX.to_string(), Value::from(0.5));
        map.insert(PARAM_ANGULAR_MIN.to_string(), Value::from(0.7));
        map.insert(PARAM_ANGULAR_MAX.to_string(), Value::from(1.2));

        map.insert(PARAM_TOPIC.to_string(), Value::from("key_vel"));

        if let Ok(mut inner) = params.params.write() {
            *inner = map;
        }
        params
    }

    /// Create a store without any defaults
    pub fn empty() -> Self {
        Self {
            params: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Get a parameter value
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        let params = self.params.read().ok()?;
        let value = params.get(key)?;
        serde_json::from_value(value.clone()).ok()
    }

    /// Get parameter with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn get_f64(&self, key: &str, default: f64) -> f64 {
        self.get_or(key, default)
    }

    pub fn get_i64(&self, key: &str, default: i64) -> i64 {
        self.get_or(key, default)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_or(key, default.to_string())
    }

    /// Set a parameter value
    pub fn set<T: Serialize>(&self, key: &str, value: T) -> TeleopResult<()> {
        let json_value = serde_json::to_value(value)?;
        let mut params = self.params.write()?;
        params.insert(key.to_string(), json_value);
        Ok(())
    }

    pub fn has(&self, key: &str) -> bool {
        self.params
            .read()
            .map(|p| p.contains_key(key))
            .unwrap_or(false)
    }

    pub fn list_keys(&self) -> Vec<String> {
        self.params
            .read()
            .map(|p| p.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get_all(&self) -> BTreeMap<String, Value> {
        self.params.read().map(|p| p.clone()).unwrap_or_default()
    }

    /// Overlay every entry of `other` on top of this store
    pub fn merge(&self, other: &RuntimeParams) -> TeleopResult<()> {
        let incoming = other.get_all();
        let mut params = self.params.write()?;
        params.extend(incoming);
        Ok(())
    }

    /// Load parameters from a TOML or YAML file, overriding existing keys
    pub fn load_from_disk(&self, path: &Path) -> TeleopResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            TeleopError::config(format!(
                "Failed to read parameter file {}: {}",
                path.display(),
                e
            ))
        })?;

        let root: Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)?,
            other => {
                return Err(TeleopError::config(format!(
                    "Unsupported parameter file extension {:?} (expected .toml, .yaml or .yml)",
                    other.unwrap_or("")
                )))
            }
        };

        let Value::Object(table) = root else {
            return Err(TeleopError::config(format!(
                "Parameter file {} must contain a table at the top level",
                path.display()
            )));
        };

        let mut flat = BTreeMap::new();
        flatten_into(&mut flat, None, table);

        let mut params = self.params.write()?;
        params.extend(flat);
        Ok(())
    }
}

fn flatten_into(
    out: &mut BTreeMap<String, Value>,
    prefix: Option<&str>,
    table: serde_json::Map<String, Value>,
) {
    for (key, value) in table {
        let full_key = match prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => key,
        };
        match value {
            Value::Object(nested) => flatten_into(out, Some(&full_key), nested),
            leaf => {
                out.insert(full_key, leaf);
            }
        }
    }
}

impl Default for RuntimeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuntimeParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.get_all()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let params = RuntimeParams::new();

        assert_eq!(params.get_i64(PARAM_HZ, 0), 10);
        assert_eq!(params.get_i64(PARAM_STEPS, 0), 4);
        assert_eq!(params.get_f64(PARAM_LINEAR_BACKWARD_MIN, 0.0), 0.25);
        assert_eq!(params.get_string(PARAM_TOPIC, ""), "key_vel");
    }

    #[test]
    fn test_set_and_overwrite() {
        let params = RuntimeParams::new();

        params.set("test_value", 42.5).unwrap();
        assert_eq!(params.get::<f64>("test_value"), Some(42.5));

        params.set(PARAM_HZ, 20).unwrap();
        assert_eq!(params.get_i64(PARAM_HZ, 0), 20);
    }

    #[test]
    fn test_integer_reads_as_float() {
        let params = RuntimeParams::empty();
        params.set(PARAM_ANGULAR_MAX, 2).unwrap();
        assert_eq!(params.get_f64(PARAM_ANGULAR_MAX, 0.0), 2.0);
    }

    #[test]
    fn test_load_nested_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "hz = 25\n\n[turbo]\nsteps = 6\nangular_max = 1.5").unwrap();

        let params = RuntimeParams::new();
        params.load_from_disk(file.path()).unwrap();

        assert_eq!(params.get_i64(PARAM_HZ, 0), 25);
        assert_eq!(params.get_i64(PARAM_STEPS, 0), 6);
        assert_eq!(params.get_f64(PARAM_ANGULAR_MAX, 0.0), 1.5);
        // untouched defaults survive
        assert_eq!(params.get_f64(PARAM_ANGULAR_MIN, 0.0), 0.7);
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "turbo:\n  linear_forward_max: 2.0\ntopic: cmd_vel").unwrap();

        let params = RuntimeParams::new();
        params.load_from_disk(file.path()).unwrap();

        assert_eq!(params.get_f64(PARAM_LINEAR_FORWARD_MAX, 0.0), 2.0);
        assert_eq!(params.get_string(PARAM_TOPIC, ""), "cmd_vel");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let params = RuntimeParams::new();
        let err = params.load_from_disk(file.path()).unwrap_err();
        assert!(matches!(err, TeleopError::Config(_)));
    }

    #[test]
    fn test_merge_overrides() {
        let base = RuntimeParams::new();
        let overrides = RuntimeParams::empty();
        overrides.set(PARAM_STEPS, 8).unwrap();

        base.merge(&overrides).unwrap();
        assert_eq!(base.get_i64(PARAM_STEPS, 0), 8);
        assert!(base.has(PARAM_HZ));
    }
}
