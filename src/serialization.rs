//! Conversion between JSON values and DynamoDB `AttributeValue`s.
//!
//! Callers hand the driver plain JSON (`serde_json::Value`) and get plain
//! JSON back. This module does the marshaling both ways, plus the tagged
//! wire rendering (`{"S": "..."}`) used in request descriptions.

use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

use crate::errors::{Error, Result};

/// An item, key, or placeholder mapping with native values.
pub type Item = Map<String, Value>;

/// Convert a JSON value to an `AttributeValue`.
pub fn marshal_value(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(list) => AttributeValue::L(list.iter().map(marshal_value).collect()),
        Value::Object(map) => AttributeValue::M(marshal_item(map)),
    }
}

/// Convert every attribute of an item to an `AttributeValue`.
pub fn marshal_item(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(k, v)| (k.clone(), marshal_value(v)))
        .collect()
}

/// Convert an `AttributeValue` back to a JSON value.
///
/// `attribute` names the value in errors. Binary values come back as
/// standard base64 strings; sets come back as arrays.
///
/// Numbers become `serde_json::Number`: integers that fit in `i64`/`u64`
/// are exact, everything else is an `f64`. DynamoDB keeps up to 38
/// significant digits, so wider values lose precision here.
pub fn unmarshal_value(attribute: &str, value: &AttributeValue) -> Result<Value> {
    let json = match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(attribute, n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::B(b) => Value::String(BASE64.encode(b.as_ref())),
        AttributeValue::L(list) => Value::Array(
            list.iter()
                .map(|v| unmarshal_value(attribute, v))
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::M(map) => Value::Object(unmarshal_map(map)?),
        AttributeValue::Ss(ss) => Value::Array(ss.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(ns) => Value::Array(
            ns.iter()
                .map(|n| parse_number(attribute, n).map(Value::Number))
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::Bs(bs) => Value::Array(
            bs.iter()
                .map(|b| Value::String(BASE64.encode(b.as_ref())))
                .collect(),
        ),
        _ => {
            return Err(Error::unmarshal(
                attribute,
                "unknown DynamoDB AttributeValue type",
            ))
        }
    };
    Ok(json)
}

/// Convert a DynamoDB item to a JSON object.
pub fn unmarshal_item(item: &HashMap<String, AttributeValue>) -> Result<Item> {
    unmarshal_map(item)
}

fn unmarshal_map(map: &HashMap<String, AttributeValue>) -> Result<Item> {
    let mut result = Map::new();
    for (key, value) in map {
        result.insert(key.clone(), unmarshal_value(key, value)?);
    }
    Ok(result)
}

fn parse_number(attribute: &str, n: &str) -> Result<Number> {
    n.parse::<Number>()
        .map_err(|e| Error::unmarshal(attribute, format!("invalid number '{}': {}", n, e)))
}

/// Render an `AttributeValue` in the service's tagged JSON form.
pub fn to_wire(value: &AttributeValue) -> Value {
    let mut tagged = Map::new();
    let (tag, body) = match value {
        AttributeValue::S(s) => ("S", Value::String(s.clone())),
        AttributeValue::N(n) => ("N", Value::String(n.clone())),
        AttributeValue::Bool(b) => ("BOOL", Value::Bool(*b)),
        AttributeValue::Null(n) => ("NULL", Value::Bool(*n)),
        AttributeValue::B(b) => ("B", Value::String(BASE64.encode(b.as_ref()))),
        AttributeValue::L(list) => ("L", Value::Array(list.iter().map(to_wire).collect())),
        AttributeValue::M(map) => ("M", Value::Object(item_to_wire(map))),
        AttributeValue::Ss(ss) => ("SS", Value::Array(ss.iter().cloned().map(Value::String).collect())),
        AttributeValue::Ns(ns) => ("NS", Value::Array(ns.iter().cloned().map(Value::String).collect())),
        AttributeValue::Bs(bs) => (
            "BS",
            Value::Array(
                bs.iter()
                    .map(|b| Value::String(BASE64.encode(b.as_ref())))
                    .collect(),
            ),
        ),
        _ => return Value::Null,
    };
    tagged.insert(tag.to_string(), body);
    Value::Object(tagged)
}

/// Render a marshaled item in tagged JSON form.
pub fn item_to_wire(item: &HashMap<String, AttributeValue>) -> Map<String, Value> {
    item.iter().map(|(k, v)| (k.clone(), to_wire(v))).collect()
}
