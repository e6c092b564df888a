//! Item operations: put, get, update, delete, query and scan.
//!
//! Each function marshals its arguments once, builds the request
//! description from the marshaled values and sends the same values to
//! the service.

use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::str::FromStr;

use crate::errors::{map_sdk_error, Error};
use crate::response::{normalize, rejected, Operation, Response};
use crate::serialization::{item_to_wire, marshal_item, marshal_value, Item};

/// Put an item into a DynamoDB table.
pub async fn put_item(client: &Client, table: &str, item: &Item) -> Response {
    let dynamo_item = marshal_item(item);
    let request = json!({
        "TableName": table,
        "Item": item_to_wire(&dynamo_item),
    });

    tracing::debug!(table, "put_item");

    let outcome = client
        .put_item()
        .table_name(table)
        .set_item(Some(dynamo_item))
        .send()
        .await
        .map_err(map_sdk_error);
    normalize(Operation::PutItem, request, outcome)
}

/// Get an item from a DynamoDB table by its key.
pub async fn get_item(client: &Client, table: &str, key: &Item) -> Response {
    let dynamo_key = marshal_item(key);
    let request = json!({
        "TableName": table,
        "Key": item_to_wire(&dynamo_key),
    });

    tracing::debug!(table, "get_item");

    let outcome = client
        .get_item()
        .table_name(table)
        .set_key(Some(dynamo_key))
        .send()
        .await
        .map_err(map_sdk_error);
    normalize(Operation::GetItem, request, outcome)
}

/// Delete an item by key, returning the deleted item when there was one.
pub async fn delete_item(client: &Client, table: &str, key: &Item) -> Response {
    let dynamo_key = marshal_item(key);
    let request = json!({
        "TableName": table,
        "Key": item_to_wire(&dynamo_key),
        "ReturnValues": ReturnValue::AllOld.as_str(),
    });

    tracing::debug!(table, "delete_item");

    let outcome = client
        .delete_item()
        .table_name(table)
        .set_key(Some(dynamo_key))
        .return_values(ReturnValue::AllOld)
        .send()
        .await
        .map_err(map_sdk_error);
    normalize(Operation::DeleteItem, request, outcome)
}

/// Update clause keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Set,
    Add,
    Delete,
    Remove,
}

impl FromStr for UpdateAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SET" => Ok(UpdateAction::Set),
            "ADD" => Ok(UpdateAction::Add),
            "DELETE" => Ok(UpdateAction::Delete),
            "REMOVE" => Ok(UpdateAction::Remove),
            _ => Err(Error::Validation(format!(
                "Invalid update operation: '{}'. Use 'SET', 'ADD', 'DELETE' or 'REMOVE'",
                s
            ))),
        }
    }
}

impl UpdateAction {
    fn keyword(self) -> &'static str {
        match self {
            UpdateAction::Set => "SET",
            UpdateAction::Add => "ADD",
            UpdateAction::Delete => "DELETE",
            UpdateAction::Remove => "REMOVE",
        }
    }
}

/// An update expression with its placeholder bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Build an update expression from attribute:value pairs.
///
/// The i-th attribute is bound to `#f{i}` and its value to `:v{i}`.
/// `REMOVE` only uses the attribute names.
///
/// # Arguments
///
/// * `action` - Clause keyword shared by every attribute
/// * `updates` - Attribute:value pairs, bound in iteration order
///
/// # Returns
///
/// The expression with its name and value placeholder maps, or a
/// validation error when `updates` is empty.
pub fn build_update_expression(
    action: UpdateAction,
    updates: &Item,
) -> Result<UpdateExpression, Error> {
    if updates.is_empty() {
        return Err(Error::Validation(
            "update requires at least one attribute".to_string(),
        ));
    }

    let mut parts = Vec::with_capacity(updates.len());
    let mut names = HashMap::new();
    let mut values = HashMap::new();

    for (i, (field, value)) in updates.iter().enumerate() {
        let name_placeholder = format!("#f{}", i);
        let value_placeholder = format!(":v{}", i);

        let part = match action {
            UpdateAction::Set => format!("{} = {}", name_placeholder, value_placeholder),
            UpdateAction::Add | UpdateAction::Delete => {
                format!("{} {}", name_placeholder, value_placeholder)
            }
            UpdateAction::Remove => name_placeholder.clone(),
        };
        parts.push(part);
        names.insert(name_placeholder, field.clone());

        if action != UpdateAction::Remove {
            values.insert(value_placeholder, marshal_value(value));
        }
    }

    Ok(UpdateExpression {
        expression: format!("{} {}", action.keyword(), parts.join(", ")),
        names,
        values,
    })
}

/// Update an item, returning the updated attributes.
///
/// # Arguments
///
/// * `client` - DynamoDB client
/// * `table` - Table name
/// * `key` - Key attributes of the item
/// * `operation` - `SET`, `ADD`, `DELETE` or `REMOVE` (any case)
/// * `values` - Attribute:value pairs turned into one clause each
/// * `condition` - Optional condition expression; blank is ignored
///
/// # Returns
///
/// The envelope with `ReturnValues=UPDATED_NEW` attributes as the single
/// item. An unknown operation or empty `values` is rejected before any
/// remote call.
pub async fn update_item(
    client: &Client,
    table: &str,
    key: &Item,
    operation: &str,
    values: &Item,
    condition: Option<&str>,
) -> Response {
    let dynamo_key = marshal_item(key);
    let condition = condition.filter(|c| !c.trim().is_empty());

    let mut request = Map::new();
    request.insert("TableName".into(), json!(table));
    request.insert("Key".into(), Value::Object(item_to_wire(&dynamo_key)));

    let update = match operation
        .parse::<UpdateAction>()
        .and_then(|action| build_update_expression(action, values))
    {
        Ok(update) => update,
        Err(e) => return rejected(Operation::UpdateItem, Value::Object(request), e),
    };

    request.insert("UpdateExpression".into(), json!(update.expression));
    request.insert("ExpressionAttributeNames".into(), json!(update.names));
    if !update.values.is_empty() {
        request.insert(
            "ExpressionAttributeValues".into(),
            Value::Object(item_to_wire(&update.values)),
        );
    }
    if let Some(condition) = condition {
        request.insert("ConditionExpression".into(), json!(condition));
    }
    request.insert(
        "ReturnValues".into(),
        json!(ReturnValue::UpdatedNew.as_str()),
    );

    tracing::debug!(table, expression = %update.expression, "update_item");

    let mut call = client
        .update_item()
        .table_name(table)
        .set_key(Some(dynamo_key))
        .update_expression(update.expression)
        .set_expression_attribute_names(Some(update.names))
        .return_values(ReturnValue::UpdatedNew);

    if !update.values.is_empty() {
        call = call.set_expression_attribute_values(Some(update.values));
    }
    if let Some(condition) = condition {
        call = call.condition_expression(condition);
    }

    let outcome = call.send().await.map_err(map_sdk_error);
    normalize(Operation::UpdateItem, Value::Object(request), outcome)
}

/// Query items by key condition.
///
/// # Arguments
///
/// * `client` - DynamoDB client
/// * `table` - Table name
/// * `key_condition_expression` - Key condition expression (required)
/// * `values` - Value placeholders for both expressions; omitted when empty
/// * `filter_expression` - Optional filter expression
/// * `projection_expression` - Optional projection expression
pub async fn query(
    client: &Client,
    table: &str,
    key_condition_expression: &str,
    values: &Item,
    filter_expression: Option<&str>,
    projection_expression: Option<&str>,
) -> Response {
    let dynamo_values = marshal_item(values);
    let filter = filter_expression.filter(|f| !f.trim().is_empty());
    let projection = projection_expression.filter(|p| !p.trim().is_empty());

    let request = describe_read(
        table,
        Some(("KeyConditionExpression", key_condition_expression)),
        &dynamo_values,
        filter,
        projection,
    );

    tracing::debug!(table, key_condition_expression, "query");

    let mut call = client
        .query()
        .table_name(table)
        .key_condition_expression(key_condition_expression);

    if !dynamo_values.is_empty() {
        call = call.set_expression_attribute_values(Some(dynamo_values));
    }
    if let Some(filter) = filter {
        call = call.filter_expression(filter);
    }
    if let Some(projection) = projection {
        call = call.projection_expression(projection);
    }

    let outcome = call.send().await.map_err(map_sdk_error);
    normalize(Operation::Query, request, outcome)
}

/// Scan a table, optionally filtering and projecting.
///
/// A blank `filter_expression` scans the whole table.
pub async fn scan(
    client: &Client,
    table: &str,
    filter_expression: &str,
    values: &Item,
    projection_expression: Option<&str>,
) -> Response {
    let dynamo_values = marshal_item(values);
    let filter = Some(filter_expression).filter(|f| !f.trim().is_empty());
    let projection = projection_expression.filter(|p| !p.trim().is_empty());

    let request = describe_read(table, None, &dynamo_values, filter, projection);

    tracing::debug!(table, filter_expression, "scan");

    let mut call = client.scan().table_name(table);

    if !dynamo_values.is_empty() {
        call = call.set_expression_attribute_values(Some(dynamo_values));
    }
    if let Some(filter) = filter {
        call = call.filter_expression(filter);
    }
    if let Some(projection) = projection {
        call = call.projection_expression(projection);
    }

    let outcome = call.send().await.map_err(map_sdk_error);
    normalize(Operation::Scan, request, outcome)
}

/// Request description shared by query and scan.
fn describe_read(
    table: &str,
    key_condition: Option<(&str, &str)>,
    values: &HashMap<String, AttributeValue>,
    filter: Option<&str>,
    projection: Option<&str>,
) -> Value {
    let mut request = Map::new();
    request.insert("TableName".into(), json!(table));
    if let Some((field, expression)) = key_condition {
        request.insert(field.into(), json!(expression));
    }
    if !values.is_empty() {
        request.insert(
            "ExpressionAttributeValues".into(),
            Value::Object(item_to_wire(values)),
        );
    }
    if let Some(filter) = filter {
        request.insert("FilterExpression".into(), json!(filter));
    }
    if let Some(projection) = projection {
        request.insert("ProjectionExpression".into(), json!(projection));
    }
    Value::Object(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(value: Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn set_expression_binds_every_attribute() {
        // serde_json maps iterate in key order
        let update =
            build_update_expression(UpdateAction::Set, &item(json!({"age": 31, "name": "Ann"})))
                .unwrap();

        assert_eq!(update.expression, "SET #f0 = :v0, #f1 = :v1");
        assert_eq!(update.names["#f0"], "age");
        assert_eq!(update.names["#f1"], "name");
        assert_eq!(update.values[":v0"], AttributeValue::N("31".into()));
        assert_eq!(update.values[":v1"], AttributeValue::S("Ann".into()));
    }

    #[test]
    fn add_expression_has_no_equals() {
        let update =
            build_update_expression(UpdateAction::Add, &item(json!({"visits": 1}))).unwrap();
        assert_eq!(update.expression, "ADD #f0 :v0");
        assert_eq!(update.values.len(), 1);
    }

    #[test]
    fn remove_expression_has_no_values() {
        let update = build_update_expression(
            UpdateAction::Remove,
            &item(json!({"nickname": null, "old": null})),
        )
        .unwrap();
        assert_eq!(update.expression, "REMOVE #f0, #f1");
        assert!(update.values.is_empty());
        assert_eq!(update.names.len(), 2);
    }

    #[test]
    fn empty_update_is_rejected() {
        let err = build_update_expression(UpdateAction::Set, &Item::new()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn parses_update_operation() {
        assert_eq!("set".parse::<UpdateAction>().unwrap(), UpdateAction::Set);
        assert_eq!(" Remove ".parse::<UpdateAction>().unwrap(), UpdateAction::Remove);
        assert!("UPSERT".parse::<UpdateAction>().is_err());
    }

    #[test]
    fn read_description_omits_empty_parts() {
        let request = describe_read("Users", None, &HashMap::new(), None, None);
        assert_eq!(request, json!({"TableName": "Users"}));
    }

    #[test]
    fn read_description_includes_expressions() {
        let values = marshal_item(&item(json!({":id": "42"})));
        let request = describe_read(
            "Users",
            Some(("KeyConditionExpression", "id = :id")),
            &values,
            Some("age > :min"),
            Some("id, age"),
        );
        assert_eq!(
            request,
            json!({
                "TableName": "Users",
                "KeyConditionExpression": "id = :id",
                "ExpressionAttributeValues": {":id": {"S": "42"}},
                "FilterExpression": "age > :min",
                "ProjectionExpression": "id, age"
            })
        );
    }
}
