//! # dynamodb-driver
//!
//! A small table/key/attribute driver over Amazon DynamoDB.
//!
//! This crate handles:
//! - Type marshaling between JSON values and DynamoDB `AttributeValue`s
//! - AWS SDK calls via aws-sdk-dynamodb
//! - A uniform response envelope (`status`, `message`, `request`, `count`,
//!   `items`) for every operation, success or failure
//!
//! [`DynamoDriver`] is async; [`BlockingDriver`] runs the same calls on a
//! shared Tokio runtime.

mod basic_operations;
mod blocking;
mod client;
mod config;
mod errors;
mod logging;
mod response;
mod serialization;
mod table_operations;

pub use basic_operations::{build_update_expression, UpdateAction, UpdateExpression};
pub use blocking::BlockingDriver;
pub use client::DynamoDriver;
pub use config::{DriverConfig, API_VERSION};
pub use errors::{map_sdk_error, Error, Failure, Result};
pub use logging::init_logging;
pub use response::{Operation, Response};
pub use serialization::{
    item_to_wire, marshal_item, marshal_value, to_wire, unmarshal_item, unmarshal_value, Item,
};
pub use table_operations::{
    AttributeDefinition, AttributeType, BillingMode, KeySchema, KeyType, TableOptions,
};
