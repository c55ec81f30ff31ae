//! Type-safe schema generation for OpenAI structured outputs.
//!
//! Uses the `schemars` crate to automatically generate JSON schemas from Rust types.
//!
//! # Example
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//! use openai_client::StructuredOutput;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Listing {
//!     name: Option<String>,
//!     equipment: Option<Vec<String>>,
//! }
//!
//! // Get OpenAI-compatible schema
//! let schema = Listing::openai_schema();
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keywords schemars emits for numeric types that strict mode rejects.
const UNSUPPORTED_KEYWORDS: [&str; 3] = ["format", "minimum", "maximum"];

/// Trait for types that can be used as OpenAI structured output.
///
/// Automatically implemented for any type that implements `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate an OpenAI-compatible JSON schema for this type.
    ///
    /// OpenAI requires:
    /// 1. `additionalProperties: false` on all object schemas
    /// 2. ALL properties listed in `required`, even nullable ones
    /// 3. Fully inlined schemas (no `$ref` references)
    /// 4. No numeric `format`/range keywords
    fn openai_schema() -> Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        fix_object_schemas(&mut value);
        inline_refs(&mut value);

        if let Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        strip_unsupported_keywords(&mut value, false);

        value
    }

    /// Get the schema name for this type.
    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Add `additionalProperties: false` and list every property in `required`.
fn fix_object_schemas(value: &mut Value) {
    if let Value::Object(map) = value {
        if map.get("type") == Some(&Value::String("object".to_string())) {
            map.insert("additionalProperties".to_string(), Value::Bool(false));

            if let Some(Value::Object(props)) = map.get("properties") {
                let all_keys: Vec<Value> = props.keys().map(|k| Value::String(k.clone())).collect();
                map.insert("required".to_string(), Value::Array(all_keys));
            }
        }

        for (_, v) in map.iter_mut() {
            fix_object_schemas(v);
        }
    } else if let Value::Array(arr) = value {
        for item in arr.iter_mut() {
            fix_object_schemas(item);
        }
    }
}

/// Replace every `#/definitions/..` reference with the definition itself.
fn inline_refs(value: &mut Value) {
    let definitions = match value {
        Value::Object(map) => map.get("definitions").cloned(),
        _ => None,
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut Value, definitions: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(type_name) = ref_path.strip_prefix("#/definitions/") {
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}

/// Drop keywords strict mode rejects.
///
/// `name_map` is true while walking a `properties` map, whose keys are field
/// names rather than keywords (a field may legitimately be called `format`).
fn strip_unsupported_keywords(value: &mut Value, name_map: bool) {
    match value {
        Value::Object(map) => {
            if !name_map {
                for keyword in UNSUPPORTED_KEYWORDS {
                    map.remove(keyword);
                }
            }
            for (key, v) in map.iter_mut() {
                strip_unsupported_keywords(v, !name_map && key == "properties");
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                strip_unsupported_keywords(item, false);
            }
        }
        _ => {}
    }
}
