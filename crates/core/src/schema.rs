//! Strict input schemas with alias support.
//!
//! An [`InputSchema`] is compiled once when a tool is registered. At call time
//! it maps alias spellings onto canonical field names, rejects unknown keys,
//! fills defaults and runs the compiled JSON Schema validator over the
//! canonical object.

use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer { min: i64, max: i64 },
    Enum(&'static [&'static str]),
    /// Array whose items follow the given JSON Schema.
    Array(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub required: bool,
    pub default: Option<Value>,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

impl FieldSpec {
    fn new(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self {
            name,
            field_type,
            required: false,
            default: None,
            aliases: &[],
            description,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, FieldType::String, description)
    }

    pub fn integer(name: &'static str, min: i64, max: i64, description: &'static str) -> Self {
        Self::new(name, FieldType::Integer { min, max }, description)
    }

    pub fn enumeration(
        name: &'static str,
        values: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, FieldType::Enum(values), description)
    }

    pub fn array(name: &'static str, items: Value, description: &'static str) -> Self {
        Self::new(name, FieldType::Array(items), description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    fn json_schema(&self) -> Value {
        let mut schema = match &self.field_type {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Integer { min, max } => json!({
                "type": "integer",
                "minimum": min,
                "maximum": max
            }),
            FieldType::Enum(values) => json!({ "type": "string", "enum": values }),
            FieldType::Array(items) => json!({ "type": "array", "items": items }),
        };

        let description = if self.aliases.is_empty() {
            self.description.to_string()
        } else {
            format!("{} (aliases: {})", self.description, self.aliases.join(", "))
        };
        schema["description"] = json!(description);

        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

/// Two-way mapping between canonical field names and their accepted aliases.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    to_canonical: HashMap<&'static str, &'static str>,
    to_aliases: HashMap<&'static str, Vec<&'static str>>,
}

impl AliasTable {
    pub fn build(fields: &[FieldSpec]) -> Result<Self> {
        let mut table = Self::default();

        for field in fields {
            if table.to_canonical.insert(field.name, field.name).is_some() {
                return Err(Error::Schema(format!("duplicate field `{}`", field.name)));
            }
            table.to_aliases.insert(field.name, Vec::new());
        }

        for field in fields {
            for &alias in field.aliases {
                if let Some(existing) = table.to_canonical.insert(alias, field.name) {
                    return Err(Error::Schema(format!(
                        "alias `{}` of `{}` collides with `{}`",
                        alias, field.name, existing
                    )));
                }
                table.to_aliases.entry(field.name).or_default().push(alias);
            }
        }

        Ok(table)
    }

    /// Canonical name for a canonical name or alias.
    pub fn resolve(&self, key: &str) -> Option<&'static str> {
        self.to_canonical.get(key).copied()
    }

    pub fn aliases_of(&self, canonical: &str) -> &[&'static str] {
        self.to_aliases
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub struct InputSchema {
    fields: Vec<FieldSpec>,
    aliases: AliasTable,
    schema: Value,
    validator: Validator,
}

impl InputSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        let aliases = AliasTable::build(&fields)?;

        let properties: Map<String, Value> = fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = fields.iter().filter(|f| f.required).map(|f| f.name).collect();

        let schema = json!({
            "type": "object",
            "properties": properties,
            "required": required
        });

        let validator = jsonschema::validator_for(&schema)
            .map_err(|e| Error::Schema(format!("schema compilation error: {e}")))?;

        Ok(Self {
            fields,
            aliases,
            schema,
            validator,
        })
    }

    /// JSON Schema advertised to hosts.
    pub fn json_schema(&self) -> &Value {
        &self.schema
    }

    pub fn alias_table(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn normalize(&self, raw: &Value) -> Result<Map<String, Value>> {
        let input = match raw {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(Error::invalid(format!(
                    "expected an object, got {}",
                    type_name(other)
                )))
            }
        };

        let mut canonical = Map::new();
        let mut sources: HashMap<&'static str, String> = HashMap::new();

        for (key, value) in input {
            let name = self.aliases.resolve(&key).ok_or_else(|| {
                Error::invalid(format!(
                    "unknown field `{}`, expected one of: {}",
                    key,
                    self.fields.iter().map(|f| f.name).collect::<Vec<_>>().join(", ")
                ))
            })?;

            match canonical.get(name) {
                Some(existing) if *existing != value => {
                    return Err(Error::invalid(format!(
                        "conflicting values for `{}` (from `{}` and `{}`)",
                        name, sources[name], key
                    )));
                }
                Some(_) => {}
                None => {
                    canonical.insert(name.to_string(), value);
                    sources.insert(name, key);
                }
            }
        }

        for field in &self.fields {
            if let Some(default) = &field.default {
                canonical
                    .entry(field.name.to_string())
                    .or_insert_with(|| default.clone());
            }
        }

        let instance = Value::Object(canonical);
        self.validator.validate(&instance).map_err(|errors| {
            let messages: Vec<String> = errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("at '{}': {}", path, e)
                    }
                })
                .collect();
            Error::invalid(messages.join("; "))
        })?;

        match instance {
            Value::Object(map) => Ok(map),
            _ => unreachable!("normalized input is always an object"),
        }
    }

    /// Normalizes `raw` and deserializes the canonical object into `T`.
    pub fn parse<T: DeserializeOwned>(&self, raw: &Value) -> Result<T> {
        let canonical = self.normalize(raw)?;
        serde_json::from_value(Value::Object(canonical)).map_err(|e| Error::invalid(e.to_string()))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
