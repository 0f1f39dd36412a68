// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Raw declaration parameters and their typed readers

use crate::error::{CsgError, CsgResult};
use crate::geometry::Vec3;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parameter value as written in a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl FromStr for Value {
    type Err = String;

    /// `[a, b, c]` parses as a vector, anything else as a single number
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if let Some(inner) = text.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| format!("unterminated vector '{}'", text))?;
            if inner.trim().is_empty() {
                return Ok(Value::Vector(Vec::new()));
            }
            let components = inner
                .split(',')
                .map(|c| parse_number(c.trim()))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::Vector(components));
        }
        parse_number(text).map(Value::Scalar)
    }
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", text))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{}", v),
            Value::Vector(components) => {
                let parts: Vec<String> = components.iter().map(|c| c.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Ordered parameter list of one declaration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "entries::Entries")]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`; a repeated name replaces the earlier value
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Typed view that names `node` in every error
    pub fn reader<'a>(&'a self, node: &'a str) -> ParamReader<'a> {
        ParamReader { node, params: self }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

mod entries {
    use super::{Params, Value};
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer};
    use std::fmt;

    /// Map entries in document order
    pub struct Entries(pub Vec<(String, Value)>);

    impl<'de> Deserialize<'de> for Entries {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            struct EntriesVisitor;

            impl<'de> Visitor<'de> for EntriesVisitor {
                type Value = Entries;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str("a map of parameter values")
                }

                fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Entries, A::Error> {
                    let mut entries = Vec::new();
                    while let Some((name, value)) = access.next_entry::<String, Value>()? {
                        entries.push((name, value));
                    }
                    Ok(Entries(entries))
                }
            }

            deserializer.deserialize_map(EntriesVisitor)
        }
    }

    impl From<Entries> for Params {
        fn from(entries: Entries) -> Self {
            let mut params = Params::new();
            for (name, value) in entries.0 {
                params.insert(name, value);
            }
            params
        }
    }
}

/// Typed access to the parameters of one node
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    node: &'a str,
    params: &'a Params,
}

impl<'a> ParamReader<'a> {
    /// Reject parameters outside `known`
    pub fn only(&self, known: &[&str]) -> CsgResult<()> {
        match self.params.iter().find(|(name, _)| !known.contains(name)) {
            Some((name, _)) => Err(CsgError::Parse(format!(
                "node '{}': unknown parameter '{}'",
                self.node, name
            ))),
            None => Ok(()),
        }
    }

    fn required(&self, name: &str) -> CsgResult<&'a Value> {
        self.params
            .get(name)
            .ok_or_else(|| CsgError::missing(self.node, name))
    }

    pub fn vec3(&self, name: &str) -> CsgResult<Vec3> {
        self.as_vec3(name, self.required(name)?)
    }

    pub fn vec3_or(&self, name: &str, default: Vec3) -> CsgResult<Vec3> {
        match self.params.get(name) {
            Some(value) => self.as_vec3(name, value),
            None => Ok(default),
        }
    }

    pub fn scalar(&self, name: &str) -> CsgResult<f64> {
        self.as_scalar(name, self.required(name)?)
    }

    pub fn scalar_or(&self, name: &str, default: f64) -> CsgResult<f64> {
        match self.params.get(name) {
            Some(value) => self.as_scalar(name, value),
            None => Ok(default),
        }
    }

    /// Scalar broadcast to all three axes, or a 3-vector
    pub fn factor(&self, name: &str) -> CsgResult<Vec3> {
        match self.required(name)? {
            Value::Scalar(s) => Ok(Vec3::repeat(*s)),
            value => self.as_vec3(name, value),
        }
    }

    /// Non-negative whole number such as a refinement level
    pub fn count_or(&self, name: &str, default: u32) -> CsgResult<u32> {
        let Some(value) = self.params.get(name) else {
            return Ok(default);
        };
        let n = self.as_scalar(name, value)?;
        if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
            Ok(n as u32)
        } else {
            Err(CsgError::degenerate(
                self.node,
                name,
                format!("must be a non-negative integer, got {}", n),
            ))
        }
    }

    fn as_vec3(&self, name: &str, value: &Value) -> CsgResult<Vec3> {
        match value {
            Value::Vector(c) if c.len() == 3 => Ok(Vec3::new(c[0], c[1], c[2])),
            Value::Vector(c) => Err(self.dimension(name, c.len())),
            Value::Scalar(_) => Err(self.dimension(name, 1)),
        }
    }

    fn as_scalar(&self, name: &str, value: &Value) -> CsgResult<f64> {
        match value {
            Value::Scalar(v) => Ok(*v),
            Value::Vector(c) => Err(CsgError::Parse(format!(
                "node '{}': parameter '{}' must be a single number, got a {}-component vector",
                self.node,
                name,
                c.len()
            ))),
        }
    }

    fn dimension(&self, name: &str, found: usize) -> CsgError {
        CsgError::Dimension {
            node: self.node.to_string(),
            parameter: name.to_string(),
            found,
        }
    }
}
