//! Table management operations: create and delete.

use aws_sdk_dynamodb::types::{
    AttributeDefinition as SdkAttributeDefinition, BillingMode as SdkBillingMode,
    KeySchemaElement, KeyType as SdkKeyType, ProvisionedThroughput, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::str::FromStr;

use crate::errors::{map_sdk_error, Error};
use crate::response::{normalize, rejected, Operation, Response};

/// Role of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyType {
    Hash,
    Range,
}

impl FromStr for KeyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HASH" | "PARTITION" => Ok(KeyType::Hash),
            "RANGE" | "SORT" => Ok(KeyType::Range),
            _ => Err(Error::Validation(format!(
                "Invalid key type: '{}'. Use 'HASH' or 'RANGE'",
                s
            ))),
        }
    }
}

/// Scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    S,
    N,
    B,
}

impl FromStr for AttributeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "S" | "STRING" => Ok(AttributeType::S),
            "N" | "NUMBER" => Ok(AttributeType::N),
            "B" | "BINARY" => Ok(AttributeType::B),
            _ => Err(Error::Validation(format!(
                "Invalid attribute type: '{}'. Use 'S' (string), 'N' (number), or 'B' (binary)",
                s
            ))),
        }
    }
}

/// One element of a table's key schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchema {
    pub attribute_name: String,
    pub key_type: KeyType,
}

impl KeySchema {
    pub fn hash(name: impl Into<String>) -> Self {
        KeySchema {
            attribute_name: name.into(),
            key_type: KeyType::Hash,
        }
    }

    pub fn range(name: impl Into<String>) -> Self {
        KeySchema {
            attribute_name: name.into(),
            key_type: KeyType::Range,
        }
    }
}

/// Type declaration for an attribute used in the key schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: AttributeType,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        AttributeDefinition {
            attribute_name: name.into(),
            attribute_type,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingMode {
    #[default]
    PayPerRequest,
    Provisioned,
}

impl FromStr for BillingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PAY_PER_REQUEST" => Ok(BillingMode::PayPerRequest),
            "PROVISIONED" => Ok(BillingMode::Provisioned),
            _ => Err(Error::Validation(format!(
                "Invalid billing_mode: '{}'. Use 'PAY_PER_REQUEST' or 'PROVISIONED'",
                s
            ))),
        }
    }
}

/// Extra table settings for [`create_table`].
///
/// Capacity units only apply to provisioned billing and default to 5.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    pub billing_mode: BillingMode,
    pub read_capacity: Option<i64>,
    pub write_capacity: Option<i64>,
}

const DEFAULT_CAPACITY_UNITS: i64 = 5;

/// Create a new DynamoDB table.
///
/// # Arguments
///
/// * `client` - The DynamoDB client
/// * `table` - Name of the table to create
/// * `key_schema` - Hash key and optional range key, at least one element
/// * `attribute_definitions` - Scalar types of the key attributes
/// * `options` - Billing mode; capacity units apply to provisioned billing only
///
/// # Returns
///
/// The envelope with no items. An existing table comes back as a failure
/// carrying the service's `ResourceInUseException` message.
pub async fn create_table(
    client: &Client,
    table: &str,
    key_schema: &[KeySchema],
    attribute_definitions: &[AttributeDefinition],
    options: &TableOptions,
) -> Response {
    let request = describe_create_table(table, key_schema, attribute_definitions, options);

    let built = build_create_table(key_schema, attribute_definitions, options);
    let (keys, attributes, throughput) = match built {
        Ok(parts) => parts,
        Err(e) => return rejected(Operation::CreateTable, request, e),
    };

    tracing::debug!(table, "create_table");

    let mut call = client
        .create_table()
        .table_name(table)
        .set_key_schema(Some(keys))
        .set_attribute_definitions(Some(attributes))
        .billing_mode(sdk_billing_mode(options.billing_mode));

    if let Some(throughput) = throughput {
        call = call.provisioned_throughput(throughput);
    }

    let outcome = call.send().await.map_err(map_sdk_error);
    normalize(Operation::CreateTable, request, outcome)
}

/// Delete a table.
pub async fn delete_table(client: &Client, table: &str) -> Response {
    let request = json!({ "TableName": table });

    tracing::debug!(table, "delete_table");

    let outcome = client
        .delete_table()
        .table_name(table)
        .send()
        .await
        .map_err(map_sdk_error);
    normalize(Operation::DeleteTable, request, outcome)
}

#[allow(clippy::type_complexity)]
fn build_create_table(
    key_schema: &[KeySchema],
    attribute_definitions: &[AttributeDefinition],
    options: &TableOptions,
) -> Result<
    (
        Vec<KeySchemaElement>,
        Vec<SdkAttributeDefinition>,
        Option<ProvisionedThroughput>,
    ),
    Error,
> {
    if key_schema.is_empty() {
        return Err(Error::Validation(
            "key schema must name at least one attribute".to_string(),
        ));
    }

    let keys = key_schema
        .iter()
        .map(|k| {
            KeySchemaElement::builder()
                .attribute_name(&k.attribute_name)
                .key_type(sdk_key_type(k.key_type))
                .build()
                .map_err(|e| Error::Validation(format!("Invalid key schema: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let attributes = attribute_definitions
        .iter()
        .map(|a| {
            SdkAttributeDefinition::builder()
                .attribute_name(&a.attribute_name)
                .attribute_type(sdk_attribute_type(a.attribute_type))
                .build()
                .map_err(|e| Error::Validation(format!("Invalid attribute definition: {}", e)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let throughput = match options.billing_mode {
        BillingMode::PayPerRequest => None,
        BillingMode::Provisioned => Some(
            ProvisionedThroughput::builder()
                .read_capacity_units(options.read_capacity.unwrap_or(DEFAULT_CAPACITY_UNITS))
                .write_capacity_units(options.write_capacity.unwrap_or(DEFAULT_CAPACITY_UNITS))
                .build()
                .map_err(|e| Error::Validation(format!("Invalid provisioned throughput: {}", e)))?,
        ),
    };

    Ok((keys, attributes, throughput))
}

fn describe_create_table(
    table: &str,
    key_schema: &[KeySchema],
    attribute_definitions: &[AttributeDefinition],
    options: &TableOptions,
) -> Value {
    let mut request = Map::new();
    request.insert("TableName".into(), json!(table));
    request.insert("KeySchema".into(), json!(key_schema));
    request.insert("AttributeDefinitions".into(), json!(attribute_definitions));
    request.insert("BillingMode".into(), json!(options.billing_mode));
    if options.billing_mode == BillingMode::Provisioned {
        request.insert(
            "ProvisionedThroughput".into(),
            json!({
                "ReadCapacityUnits": options.read_capacity.unwrap_or(DEFAULT_CAPACITY_UNITS),
                "WriteCapacityUnits": options.write_capacity.unwrap_or(DEFAULT_CAPACITY_UNITS),
            }),
        );
    }
    Value::Object(request)
}

fn sdk_key_type(key_type: KeyType) -> SdkKeyType {
    match key_type {
        KeyType::Hash => SdkKeyType::Hash,
        KeyType::Range => SdkKeyType::Range,
    }
}

fn sdk_attribute_type(attribute_type: AttributeType) -> ScalarAttributeType {
    match attribute_type {
        AttributeType::S => ScalarAttributeType::S,
        AttributeType::N => ScalarAttributeType::N,
        AttributeType::B => ScalarAttributeType::B,
    }
}

fn sdk_billing_mode(mode: BillingMode) -> SdkBillingMode {
    match mode {
        BillingMode::PayPerRequest => SdkBillingMode::PayPerRequest,
        BillingMode::Provisioned => SdkBillingMode::Provisioned,
    }
}
