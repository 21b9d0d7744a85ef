//! Request schemas: per-field rules checked against the raw JSON body before it is
//! deserialized into a typed payload. Every failing field is reported, keyed by name.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that concern the body as a whole rather than one field.
pub const SCHEMA_KEY: &str = "_schema";

pub const MISSING: &str = "Missing data for required field.";
pub const NULL: &str = "Field may not be null.";
pub const UNKNOWN: &str = "Unknown field.";
pub const EMPTY: &str = "Field may not be empty.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    String,
    Float,
    /// ISO calendar date, `YYYY-MM-DD`.
    Date,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub nullable: bool,
    pub non_empty: bool,
    pub minimum: Option<f64>,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            name,
            kind,
            required: true,
            nullable: false,
            non_empty: false,
            minimum: None,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub const fn nullable(self) -> Self {
        FieldRule {
            nullable: true,
            ..self
        }
    }

    pub const fn non_empty(self) -> Self {
        FieldRule {
            non_empty: true,
            ..self
        }
    }

    pub const fn minimum(self, minimum: f64) -> Self {
        FieldRule {
            minimum: Some(minimum),
            ..self
        }
    }

    /// `Ok(Some(v))` when the accepted value is stored in a normalized form.
    fn check(&self, value: &Value) -> Result<Option<Value>, String> {
        match self.kind {
            FieldKind::String => {
                let s = value.as_str().ok_or("Not a valid string.")?;
                if self.non_empty && s.trim().is_empty() {
                    return Err(EMPTY.into());
                }
            }
            FieldKind::Integer => {
                let n = whole_number(value).ok_or("Not a valid integer.")?;
                if !value.is_i64() {
                    return Ok(Some(Value::from(n)));
                }
            }
            FieldKind::Float => {
                let n = value.as_f64().ok_or("Not a valid number.")?;
                if let Some(min) = self.minimum {
                    if n < min {
                        return Err(format!("Must be greater than or equal to {}.", min));
                    }
                }
            }
            FieldKind::Date => {
                let ok = value
                    .as_str()
                    .map(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
                    .unwrap_or(false);
                if !ok {
                    return Err("Not a valid date.".into());
                }
            }
        }
        Ok(None)
    }
}

/// An `i32`, given as an integer or as a float with no fractional part.
fn whole_number(value: &Value) -> Option<i32> {
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    let f = value.as_f64().filter(|f| f.fract() == 0.0)?;
    if f < f64::from(i32::MIN) || f > f64::from(i32::MAX) {
        return None;
    }
    Some(f as i32)
}

/// Field name -> messages. Serializes as a plain JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.0.get(name).map(Vec::as_slice)
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A payload whose JSON shape is described by field rules.
pub trait Schema: DeserializeOwned {
    const FIELDS: &'static [FieldRule];

    /// Check `value` against [`Self::FIELDS`] and deserialize it.
    fn load(value: Value) -> Result<Self, ValidationErrors> {
        let Value::Object(mut map) = value else {
            return Err(ValidationErrors::single(SCHEMA_KEY, "Invalid input type."));
        };
        check_fields(&mut map, Self::FIELDS)?;
        serde_json::from_value(Value::Object(map))
            .map_err(|e| ValidationErrors::single(SCHEMA_KEY, e.to_string()))
    }
}

fn check_fields(map: &mut Map<String, Value>, rules: &[FieldRule]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for key in map.keys() {
        if !rules.iter().any(|r| r.name == key) {
            errors.add(key.clone(), UNKNOWN);
        }
    }
    for rule in rules {
        let normalized = match map.get(rule.name) {
            None if rule.required => {
                errors.add(rule.name, MISSING);
                None
            }
            None => None,
            Some(Value::Null) if rule.nullable => None,
            Some(Value::Null) => {
                errors.add(rule.name, NULL);
                None
            }
            Some(v) => rule.check(v).unwrap_or_else(|message| {
                errors.add(rule.name, message);
                None
            }),
        };
        if let Some(value) = normalized {
            map.insert(rule.name.to_string(), value);
        }
    }
    errors.into_result()
}
