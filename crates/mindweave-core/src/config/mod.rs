use crate::error::Result;
use serde_json::{Map, Value, json};

/// Viewer configuration: a JSON object addressed by dotted paths (`layout.coolingRate`).
///
/// Components read typed views out of it (`LayoutSettings`, `InteractionSettings`, ...);
/// keys they don't recognize are carried along untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig(Value);

impl Default for ViewerConfig {
    fn default() -> Self {
        Self(default_config())
    }
}

/// Built-in defaults. `layout.idealEdgeLength` and `layout.seed` are intentionally absent:
/// the former derives from `fontSize`, the latter means "seed from entropy".
pub fn default_config() -> Value {
    json!({
        "fontSize": 16.0,
        "layout": {
            "initialTemperature": 40.0,
            "coolingRate": 0.97,
            "minTemperature": 0.5,
            "gravity": 0.02,
            "repulsion": 120000.0,
            "attraction": 0.05,
            "damping": 0.85,
            "timeStep": 1.0
        },
        "interaction": {
            "clickThreshold": 5.0,
            "wheelZoomFactor": 1.1,
            "minZoom": 0.1,
            "maxZoom": 5.0
        },
        "view": {
            "fitMargin": 0.9,
            "transitionMs": 400
        }
    })
}

impl ViewerConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Parses a JSON object of overrides and layers it over the defaults.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let overrides: Value = serde_json::from_str(text)?;
        let mut cfg = Self::default();
        cfg.deep_merge(&overrides);
        Ok(cfg)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn as_value_mut(&mut self) -> &mut Value {
        &mut self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    /// Numbers are accepted in any JSON numeric representation; non-finite values are `None`.
    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        let v = self.get(dotted_path)?;
        v.as_f64()
            .or_else(|| v.as_i64().map(|n| n as f64))
            .or_else(|| v.as_u64().map(|n| n as f64))
            .filter(|n| n.is_finite())
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get(dotted_path)?.as_u64()
    }

    /// `get_f64` restricted to strictly positive values.
    pub fn get_positive_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get_f64(dotted_path).filter(|v| *v > 0.0)
    }

    pub fn font_size(&self) -> f64 {
        self.get_positive_f64("fontSize").unwrap_or(16.0)
    }

    /// Writes `value` at `dotted_path`, replacing non-object segments on the way.
    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    /// Layers `other` over this config: objects merge key by key, anything else replaces.
    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}
