use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load + deep-merge YAML files in order (later files override earlier ones),
/// then canonicalize key order so the result is reproducible across runs.
pub fn load_layered_yaml(paths: &[&Path]) -> Result<Value> {
    let mut merged = Value::Object(Default::default());
    for p in paths {
        let s = fs::read_to_string(p).with_context(|| format!("read config {:?}", p))?;
        let yaml_val: serde_yaml::Value =
            serde_yaml::from_str(&s).with_context(|| format!("parse yaml {:?}", p))?;
        let json_val = serde_json::to_value(yaml_val)
            .with_context(|| format!("yaml->json conversion failed for {:?}", p))?;
        deep_merge(&mut merged, json_val);
    }
    Ok(sort_keys(&merged))
}

fn deep_merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst_map), Value::Object(src_map)) => {
            for (k, v) in src_map {
                match dst_map.get_mut(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => {
                        dst_map.insert(k, v);
                    }
                }
            }
        }
        (dst_slot, src_val) => {
            *dst_slot = src_val;
        }
    }
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}
