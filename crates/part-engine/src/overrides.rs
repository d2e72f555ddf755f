//! Named parameter overrides on top of a typed spec.
//!
//! Overrides are a JSON object merged onto the serialized spec. A few
//! shorthand keys are expanded first:
//!
//! - `no_lip: true` sets `lip_style` to `none`; `false` leaves it alone
//! - `labels: bool` sets `label_style` to `full` or `none`
//! - a numeric `scoops` enables scoops and sets `scoop_scale`

use grid_ops::Violations;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::types::EngineError;

/// Apply `overrides` to `base` and return the result.
///
/// Unknown keys are configuration errors naming every such key. Values of the wrong
/// type are reported as [`EngineError::Override`].
pub fn apply_overrides<T>(base: &T, overrides: &Map<String, Value>) -> Result<T, EngineError>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = to_object(base)?;
    let expanded = expand_aliases(overrides);
    let mut unknown = Violations::new();
    check_keys(&merged, &expanded, "", &mut unknown);
    unknown.into_result()?;
    merge(&mut merged, &expanded);
    match serde_json::from_value(Value::Object(merged)) {
        Ok(v) => Ok(v),
        Err(e) => Err(blame(base, &expanded, e)),
    }
}

fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, EngineError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(EngineError::Override {
            key: String::new(),
            reason: "spec does not serialize to an object".to_string(),
        }),
        Err(e) => Err(EngineError::Override {
            key: String::new(),
            reason: e.to_string(),
        }),
    }
}

fn expand_aliases(overrides: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in overrides {
        match (key.as_str(), value) {
            ("no_lip", Value::Bool(b)) => {
                if *b {
                    out.insert("lip_style".to_string(), Value::from("none"));
                }
            }
            ("labels", Value::Bool(b)) => {
                let style = if *b { "full" } else { "none" };
                out.insert("label_style".to_string(), Value::from(style));
            }
            ("scoops", Value::Number(n)) => {
                let scale = n.as_f64().unwrap_or(0.0).clamp(0.0, 1.0);
                out.insert("scoops".to_string(), Value::Bool(scale > 0.0));
                out.insert("scoop_scale".to_string(), Value::from(scale));
            }
            (_, Value::Object(inner)) => {
                out.insert(key.clone(), Value::Object(expand_aliases(inner)));
            }
            _ => {
                out.insert(key.clone(), value.clone());
            }
        }
    }
    if out.len() != overrides.len() {
        debug!("override aliases expanded");
    }
    out
}

fn check_keys(
    base: &Map<String, Value>,
    overrides: &Map<String, Value>,
    prefix: &str,
    unknown: &mut Violations,
) {
    for (key, value) in overrides {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match (base.get(key), value) {
            (None, _) => unknown.push(path, "unknown parameter"),
            (Some(Value::Object(b)), Value::Object(o)) => check_keys(b, o, &path, unknown),
            _ => {}
        }
    }
}

fn merge(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        match (base.get_mut(key), value) {
            (Some(Value::Object(b)), Value::Object(o)) => merge(b, o),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Find the first key that fails on its own.
fn blame<T>(base: &T, overrides: &Map<String, Value>, err: serde_json::Error) -> EngineError
where
    T: Serialize + DeserializeOwned,
{
    for (key, value) in overrides {
        let Ok(mut single) = to_object(base) else {
            break;
        };
        let mut one = Map::new();
        one.insert(key.clone(), value.clone());
        merge(&mut single, &one);
        if let Err(e) = serde_json::from_value::<T>(Value::Object(single)) {
            return EngineError::Override {
                key: key.clone(),
                reason: e.to_string(),
            };
        }
    }
    EngineError::Override {
        key: overrides.keys().cloned().collect::<Vec<_>>().join(", "),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bin::{BinSpec, LabelStyle};
    use crate::item_holder::ItemHolderSpec;
    use grid_ops::dims::LipStyle;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_plain_override() {
        let b = apply_overrides(&BinSpec::new(2, 2, 3), &obj(json!({"height_u": 6, "holes": true})))
            .unwrap();
        assert_eq!(b.height_u, 6);
        assert!(b.holes);
        assert_eq!(b.length_u, 2);
    }

    #[test]
    fn test_aliases() {
        let b = apply_overrides(
            &BinSpec::new(1, 1, 3),
            &obj(json!({"no_lip": true, "labels": true, "scoops": 0.5})),
        )
        .unwrap();
        assert_eq!(b.lip_style, LipStyle::None);
        assert_eq!(b.label_style, LabelStyle::Full);
        assert!(b.scoops);
        assert_eq!(b.scoop_scale, 0.5);

        let off = apply_overrides(&b, &obj(json!({"scoops": 0}))).unwrap();
        assert!(!off.scoops);
    }

    #[test]
    fn test_no_lip_false_keeps_lip_style() {
        let b = apply_overrides(
            &BinSpec::new(1, 1, 3),
            &obj(json!({"lip_style": "reduced", "no_lip": false})),
        )
        .unwrap();
        assert_eq!(b.lip_style, LipStyle::Reduced);

        let b = apply_overrides(&b, &obj(json!({"no_lip": false}))).unwrap();
        assert_eq!(b.lip_style, LipStyle::Reduced);
    }

    #[test]
    fn test_unknown_key_is_configuration_error() {
        let err = apply_overrides(&BinSpec::default(), &obj(json!({"colour": "red"}))).unwrap_err();
        match err {
            EngineError::Configuration(c) => assert!(c.mentions("colour")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_every_unknown_key_is_reported() {
        let err = apply_overrides(
            &BinSpec::default(),
            &obj(json!({"colour": "red", "height_u": 4, "texture": 2})),
        )
        .unwrap_err();
        match err {
            EngineError::Configuration(c) => {
                assert_eq!(c.violations.len(), 2);
                assert!(c.mentions("colour"));
                assert!(c.mentions("texture"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_nested_keys() {
        let h = ItemHolderSpec::round(BinSpec::new(2, 2, 3), 10.0);
        let out = apply_overrides(&h, &obj(json!({"bin": {"no_lip": true}, "grid_x": 2}))).unwrap();
        assert_eq!(out.bin.lip_style, LipStyle::None);
        assert_eq!(out.bin.length_u, 2);
        assert_eq!(out.grid_x, 2);

        let err = apply_overrides(&h, &obj(json!({"bin": {"nope": 1}}))).unwrap_err();
        match err {
            EngineError::Configuration(c) => assert!(c.mentions("bin.nope")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_type_error_names_key() {
        let err = apply_overrides(
            &BinSpec::default(),
            &obj(json!({"height_u": 4, "wall_th": "thick"})),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Override { ref key, .. } if key == "wall_th"));
    }
}
