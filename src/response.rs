//! The uniform response envelope returned by every driver operation.

use aws_sdk_dynamodb::operation::create_table::CreateTableOutput;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemOutput;
use aws_sdk_dynamodb::operation::delete_table::DeleteTableOutput;
use aws_sdk_dynamodb::operation::get_item::GetItemOutput;
use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
use aws_sdk_dynamodb::operation::query::QueryOutput;
use aws_sdk_dynamodb::operation::scan::ScanOutput;
use aws_sdk_dynamodb::operation::update_item::UpdateItemOutput;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::errors::{Error, Failure, Result};
use crate::serialization::{unmarshal_item, Item};

/// Which driver operation produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateTable,
    PutItem,
    GetItem,
    UpdateItem,
    Query,
    Scan,
    DeleteItem,
    DeleteTable,
}

impl Operation {
    /// Message reported on success.
    pub fn tag(self) -> &'static str {
        match self {
            Operation::CreateTable => "CREATE TABLE OK",
            Operation::PutItem => "PUT ITEM OK",
            Operation::GetItem => "GET ITEM OK",
            Operation::UpdateItem => "UPDATE ITEM OK",
            Operation::Query => "QUERY OK",
            Operation::Scan => "SCAN OK",
            Operation::DeleteItem => "DELETE ITEM OK",
            Operation::DeleteTable => "DELETE TABLE OK",
        }
    }
}

/// Envelope returned by every operation, success or failure.
///
/// On success `items.len() == count`. On failure `count` is 0, `items` is
/// empty and `error` describes what went wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: bool,
    pub message: String,
    /// The request as it was sent, with values in tagged wire form.
    pub request: Value,
    pub count: usize,
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Failure>,
}

impl Response {
    pub fn success(operation: Operation, request: Value, items: Vec<Item>) -> Self {
        Response {
            status: true,
            message: operation.tag().to_string(),
            request,
            count: items.len(),
            items,
            error: None,
        }
    }

    pub fn failure(request: Value, failure: Failure) -> Self {
        Response {
            status: false,
            message: failure.message.clone(),
            request,
            count: 0,
            items: Vec::new(),
            error: Some(failure),
        }
    }

    /// Convert into a plain `Result`, keeping the items on success.
    pub fn into_result(self) -> std::result::Result<Vec<Item>, Failure> {
        match self.error {
            Some(failure) => Err(failure),
            None => Ok(self.items),
        }
    }

    /// The first returned item, if any.
    pub fn first(&self) -> Option<&Item> {
        self.items.first()
    }
}

/// The record-carrying shape of an SDK output.
pub(crate) enum Records {
    None,
    One(Option<HashMap<String, AttributeValue>>),
    Many(Vec<HashMap<String, AttributeValue>>),
}

/// SDK outputs that can be normalized into an envelope.
pub(crate) trait IntoRecords {
    fn into_records(self) -> Records;
}

impl IntoRecords for CreateTableOutput {
    fn into_records(self) -> Records {
        Records::None
    }
}

impl IntoRecords for DeleteTableOutput {
    fn into_records(self) -> Records {
        Records::None
    }
}

impl IntoRecords for PutItemOutput {
    fn into_records(self) -> Records {
        Records::One(self.attributes)
    }
}

impl IntoRecords for GetItemOutput {
    fn into_records(self) -> Records {
        Records::One(self.item)
    }
}

impl IntoRecords for UpdateItemOutput {
    fn into_records(self) -> Records {
        Records::One(self.attributes)
    }
}

impl IntoRecords for DeleteItemOutput {
    fn into_records(self) -> Records {
        Records::One(self.attributes)
    }
}

impl IntoRecords for QueryOutput {
    fn into_records(self) -> Records {
        Records::Many(self.items.unwrap_or_default())
    }
}

impl IntoRecords for ScanOutput {
    fn into_records(self) -> Records {
        Records::Many(self.items.unwrap_or_default())
    }
}

fn unmarshal_records(records: Records) -> Result<Vec<Item>> {
    match records {
        Records::None | Records::One(None) => Ok(Vec::new()),
        // An empty attribute map means nothing was returned.
        Records::One(Some(item)) if item.is_empty() => Ok(Vec::new()),
        Records::One(Some(item)) => Ok(vec![unmarshal_item(&item)?]),
        Records::Many(items) => items.iter().map(unmarshal_item).collect(),
    }
}

/// Fold the outcome of one remote call into the envelope.
pub(crate) fn normalize<O>(operation: Operation, request: Value, outcome: Result<O>) -> Response
where
    O: IntoRecords,
{
    let items = outcome.and_then(|output| unmarshal_records(output.into_records()));

    match items {
        Ok(items) => Response::success(operation, request, items),
        Err(err) => {
            log_failure(operation, &err);
            Response::failure(request, err.into())
        }
    }
}

/// Envelope for an operation rejected before any remote call was made.
pub(crate) fn rejected(operation: Operation, request: Value, err: Error) -> Response {
    log_failure(operation, &err);
    Response::failure(request, err.into())
}

fn log_failure(operation: Operation, err: &Error) {
    tracing::warn!(
        operation = operation.tag(),
        code = err.code().unwrap_or("unknown"),
        error = %err,
        "dynamodb call failed"
    );
}
