//! The generic configuration value tree
//!
//! Every structured merge operates on [`Value`], a closed tagged union over
//! scalars, mappings, and sequences. Keeping the variant set closed lets the
//! merge rules pattern-match exhaustively instead of type-switching on a
//! dynamic value.
//!
//! Mappings use `BTreeMap`, so re-serialized output always carries a
//! deterministic key order.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A leaf value.
///
/// The lexical type is preserved so round-trips stay lossless; the merge
/// rules compare scalars through their string-normalized form instead
/// (see [`Scalar::normalized`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// The string-normalized form used for merge-rule equality.
    ///
    /// `old == base` comparisons must not distinguish `1.0` written as a
    /// float from `"1.0"` written as a string; a user re-typing an
    /// equivalent value has not customized it.
    pub fn normalized(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

/// A generic configuration tree: scalar leaf, ordered mapping, or sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Mapping(BTreeMap<String, Value>),
    Sequence(Vec<Value>),
}

impl Value {
    /// Empty mapping.
    pub fn empty_mapping() -> Self {
        Self::Mapping(BTreeMap::new())
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    /// Borrow the mapping entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Structural equality through the string-normalized scalar form.
    ///
    /// This is the equality the three-way rules use to decide whether the
    /// user touched a value since the last sync.
    pub fn normalized_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a.normalized() == b.normalized(),
            (Self::Sequence(a), Self::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.normalized_eq(y))
            }
            (Self::Mapping(a), Self::Mapping(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ka, va), (kb, vb))| {
                        ka == kb && va.normalized_eq(vb)
                    })
            }
            _ => false,
        }
    }

    /// Parse a YAML document into a tree.
    ///
    /// An empty document parses as an empty mapping.
    pub fn parse_yaml(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::empty_mapping());
        }
        let value: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| Error::parse("YAML", e.to_string()))?;
        Ok(Self::from_yaml(&value))
    }

    /// Render the tree as a YAML document.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_yaml())
            .map_err(|e| Error::serialize("YAML", e.to_string()))
    }

    /// Parse a JSON document into a tree.
    pub fn parse_json(source: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::empty_mapping());
        }
        let value: serde_json::Value =
            serde_json::from_str(source).map_err(|e| Error::parse("JSON", e.to_string()))?;
        Ok(Self::from_json(&value))
    }

    /// Render the tree as pretty-printed JSON with a trailing newline.
    pub fn to_json_string(&self) -> Result<String> {
        let rendered = serde_json::to_string_pretty(&self.to_json())
            .map_err(|e| Error::serialize("JSON", e.to_string()))?;
        Ok(format!("{rendered}\n"))
    }

    /// Convert from a `serde_yaml` value. Total: every YAML value has a
    /// representation, non-string keys map through their scalar form and
    /// tagged values collapse to their inner value.
    pub fn from_yaml(value: &serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Self::Scalar(Scalar::Null),
            serde_yaml::Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            serde_yaml::Value::Number(n) => Self::Scalar(number_from_yaml(n)),
            serde_yaml::Value::String(s) => Self::Scalar(Scalar::Str(s.clone())),
            serde_yaml::Value::Sequence(seq) => {
                Self::Sequence(seq.iter().map(Self::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => {
                let mut out = BTreeMap::new();
                for (key, val) in map {
                    out.insert(yaml_key_string(key), Self::from_yaml(val));
                }
                Self::Mapping(out)
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    /// Convert to a `serde_yaml` value.
    pub fn to_yaml(&self) -> serde_yaml::Value {
        match self {
            Self::Scalar(Scalar::Null) => serde_yaml::Value::Null,
            Self::Scalar(Scalar::Bool(b)) => serde_yaml::Value::Bool(*b),
            Self::Scalar(Scalar::Int(i)) => serde_yaml::Value::Number((*i).into()),
            Self::Scalar(Scalar::Float(f)) => serde_yaml::Value::Number((*f).into()),
            Self::Scalar(Scalar::Str(s)) => serde_yaml::Value::String(s.clone()),
            Self::Sequence(seq) => {
                serde_yaml::Value::Sequence(seq.iter().map(Self::to_yaml).collect())
            }
            Self::Mapping(map) => {
                let mut out = serde_yaml::Mapping::new();
                for (key, val) in map {
                    out.insert(serde_yaml::Value::String(key.clone()), val.to_yaml());
                }
                serde_yaml::Value::Mapping(out)
            }
        }
    }

    /// Convert from a `serde_json` value.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Scalar(Scalar::Null),
            serde_json::Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => Self::Scalar(number_from_json(n)),
            serde_json::Value::String(s) => Self::Scalar(Scalar::Str(s.clone())),
            serde_json::Value::Array(arr) => {
                Self::Sequence(arr.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => {
                let mut out = BTreeMap::new();
                for (key, val) in map {
                    out.insert(key.clone(), Self::from_json(val));
                }
                Self::Mapping(out)
            }
        }
    }

    /// Convert to a `serde_json` value. Floats without a JSON
    /// representation (NaN, infinities) render as null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Scalar(Scalar::Null) => serde_json::Value::Null,
            Self::Scalar(Scalar::Bool(b)) => serde_json::Value::Bool(*b),
            Self::Scalar(Scalar::Int(i)) => serde_json::Value::Number((*i).into()),
            Self::Scalar(Scalar::Float(f)) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Scalar(Scalar::Str(s)) => serde_json::Value::String(s.clone()),
            Self::Sequence(seq) => {
                serde_json::Value::Array(seq.iter().map(Self::to_json).collect())
            }
            Self::Mapping(map) => {
                let mut out = serde_json::Map::new();
                for (key, val) in map {
                    out.insert(key.clone(), val.to_json());
                }
                serde_json::Value::Object(out)
            }
        }
    }
}

fn number_from_yaml(n: &serde_yaml::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(f) = n.as_f64() {
        Scalar::Float(f)
    } else {
        // u64 beyond i64::MAX; keep the digits
        Scalar::Str(n.to_string())
    }
}

fn number_from_json(n: &serde_json::Number) -> Scalar {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(f) = n.as_f64() {
        Scalar::Float(f)
    } else {
        Scalar::Str(n.to_string())
    }
}

fn yaml_key_string(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        other => Value::from_yaml(other).render_key(),
    }
}

impl Value {
    /// String form of a value used as a mapping key.
    fn render_key(&self) -> String {
        match self {
            Self::Scalar(s) => s.normalized(),
            // Composite keys are exotic in config files; fall back to the
            // YAML rendering of the key itself.
            other => serde_yaml::to_string(&other.to_yaml())
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default(),
        }
    }
}
