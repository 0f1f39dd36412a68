// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! XML description reader
//!
//! ```xml
//! <csg output="holed">
//!   <solid name="box" shape="cuboid"><size>[2, 2, 2]</size></solid>
//!   <solid name="rod" shape="cylinder">
//!     <start>[0, -2, 0]</start><end>[0, 2, 0]</end><radius>0.5</radius>
//!   </solid>
//!   <binary_op name="holed" type="difference">
//!     <operand>box</operand><operand>rod</operand>
//!   </binary_op>
//! </csg>
//! ```

use crate::ast::{Declaration, Params, Value};
use crate::error::{CsgError, CsgResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// Declarations of one description plus its explicit output, if any
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub declarations: Vec<Declaration>,
}

/// Parse a `<csg>` document into declarations, in document order
pub fn parse_description(source: &str) -> CsgResult<Description> {
    let root = read_tree(source)?;
    if root.name != "csg" {
        return Err(CsgError::Parse(format!(
            "expected root element <csg>, found <{}>",
            root.name
        )));
    }

    let declarations = root
        .children
        .iter()
        .map(declaration)
        .collect::<CsgResult<Vec<_>>>()?;

    Ok(Description {
        output: root.attribute("output").map(str::to_string),
        declarations,
    })
}

fn declaration(element: &Element) -> CsgResult<Declaration> {
    match element.name.as_str() {
        "solid" => {
            let name = element.required_attribute("name")?;
            let shape = element.required_attribute("shape")?;
            let params = params(name, element.children.iter())?;
            Ok(Declaration::solid(name, shape, params))
        }
        "unary_op" => {
            let name = element.required_attribute("name")?;
            let op = element.required_attribute("type")?;
            let operands = element.operands();
            let [operand] = operands.as_slice() else {
                return Err(CsgError::Parse(format!(
                    "unary_op '{}' needs exactly one <operand>, found {}",
                    name,
                    operands.len()
                )));
            };
            let rest = element.children.iter().filter(|c| c.name != "operand");
            Ok(Declaration::unary(name, op, *operand, params(name, rest)?))
        }
        "binary_op" => {
            let name = element.required_attribute("name")?;
            let op = element.required_attribute("type")?;
            let operands = element.operands();
            let [lhs, rhs] = operands.as_slice() else {
                return Err(CsgError::Parse(format!(
                    "binary_op '{}' needs exactly two <operand> elements, found {}",
                    name,
                    operands.len()
                )));
            };
            if let Some(extra) = element.children.iter().find(|c| c.name != "operand") {
                return Err(CsgError::Parse(format!(
                    "binary_op '{}': unexpected element <{}>",
                    name, extra.name
                )));
            }
            Ok(Declaration::binary(name, op, *lhs, *rhs))
        }
        other => Err(CsgError::Parse(format!("unknown element <{}>", other))),
    }
}

fn params<'a>(node: &str, elements: impl Iterator<Item = &'a Element>) -> CsgResult<Params> {
    let mut params = Params::new();
    for element in elements {
        if params.get(&element.name).is_some() {
            return Err(CsgError::Parse(format!(
                "node '{}': parameter '{}' given more than once",
                node, element.name
            )));
        }
        let value = element.text.parse::<Value>().map_err(|reason| {
            CsgError::Parse(format!(
                "node '{}': parameter '{}': {}",
                node, element.name, reason
            ))
        })?;
        params.insert(element.name.clone(), value);
    }
    Ok(params)
}

/// Minimal element tree; the description format has no mixed content
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart) -> CsgResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| CsgError::Parse(format!("<{}>: {}", name, e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| CsgError::Parse(format!("<{}>: {}", name, e)))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn required_attribute(&self, key: &str) -> CsgResult<&str> {
        self.attribute(key).ok_or_else(|| {
            CsgError::Parse(format!("<{}> is missing the '{}' attribute", self.name, key))
        })
    }

    fn operands(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter(|c| c.name == "operand")
            .map(|c| c.text.as_str())
            .collect()
    }
}

/// Hand a finished element to its parent, or make it the root
fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> CsgResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(CsgError::Parse(format!(
                "unexpected second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

fn read_tree(source: &str) -> CsgResult<Element> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            CsgError::Parse(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;
        match event {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(element, &mut stack, &mut root)?;
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| CsgError::Parse(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(text.trim());
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(String::from_utf8_lossy(&data).trim());
                }
            }
            Event::Eof => break,
            // Declarations, comments and processing instructions carry nothing
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CsgError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| CsgError::Parse("document has no root element".to_string()))
}
