//! Synchronous driver.
//!
//! [`BlockingDriver`] runs every call of [`DynamoDriver`] to completion on
//! one process-wide Tokio runtime. Do not call it from inside an async
//! context; use [`DynamoDriver`] there.

use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::client::DynamoDriver;
use crate::config::DriverConfig;
use crate::errors::Result;
use crate::response::Response;
use crate::serialization::Item;
use crate::table_operations::{AttributeDefinition, KeySchema, TableOptions};

/// Global shared Tokio runtime.
///
/// All blocking drivers share it so creating many drivers does not spawn
/// many thread pools.
static RUNTIME: Lazy<Arc<Runtime>> =
    Lazy::new(|| Arc::new(Runtime::new().expect("Failed to create global Tokio runtime")));

/// Blocking wrapper around [`DynamoDriver`].
#[derive(Debug, Clone)]
pub struct BlockingDriver {
    inner: DynamoDriver,
    runtime: Arc<Runtime>,
}

impl BlockingDriver {
    /// Build the SDK client from `config` on the shared runtime.
    ///
    /// See [`DynamoDriver::connect`].
    pub fn connect(config: DriverConfig) -> Result<Self> {
        let runtime = RUNTIME.clone();
        let inner = runtime.block_on(DynamoDriver::connect(config))?;
        Ok(BlockingDriver { inner, runtime })
    }

    /// Run an existing async driver on the shared runtime.
    pub fn from_driver(inner: DynamoDriver) -> Self {
        BlockingDriver {
            inner,
            runtime: RUNTIME.clone(),
        }
    }

    /// Get the AWS region the SDK client resolved.
    pub fn region(&self) -> &str {
        self.inner.region()
    }

    /// The async driver this one wraps.
    pub fn inner(&self) -> &DynamoDriver {
        &self.inner
    }

    /// Check that DynamoDB is reachable with one ListTables call.
    pub fn ping(&self) -> Result<()> {
        self.runtime.block_on(self.inner.ping())
    }

    /// Create a table with on-demand billing.
    pub fn create_table(
        &self,
        table: &str,
        key_schema: &[KeySchema],
        attribute_definitions: &[AttributeDefinition],
    ) -> Response {
        self.runtime
            .block_on(self.inner.create_table(table, key_schema, attribute_definitions))
    }

    /// Create a table with explicit billing settings.
    ///
    /// # Arguments
    ///
    /// * `table` - Name of the table to create
    /// * `key_schema` - Hash key and optional range key
    /// * `attribute_definitions` - Types of the key attributes
    /// * `options` - Billing mode and capacity units
    pub fn create_table_with(
        &self,
        table: &str,
        key_schema: &[KeySchema],
        attribute_definitions: &[AttributeDefinition],
        options: &TableOptions,
    ) -> Response {
        self.runtime.block_on(self.inner.create_table_with(
            table,
            key_schema,
            attribute_definitions,
            options,
        ))
    }

    /// Put an item into a table.
    pub fn put_item(&self, table: &str, item: &Item) -> Response {
        self.runtime.block_on(self.inner.put_item(table, item))
    }

    /// Get an item by its key.
    ///
    /// # Returns
    ///
    /// The item as the single entry of `items`, or `count` 0 when missing.
    pub fn get_item(&self, table: &str, key: &Item) -> Response {
        self.runtime.block_on(self.inner.get_item(table, key))
    }

    /// Update an item, one clause per attribute in `values`.
    ///
    /// # Arguments
    ///
    /// * `table` - The name of the DynamoDB table
    /// * `key` - The key attributes of the item to update
    /// * `operation` - `SET`, `ADD`, `DELETE` or `REMOVE`
    /// * `values` - Attribute:value pairs; values are ignored for `REMOVE`
    /// * `condition` - Optional condition expression
    pub fn update_item(
        &self,
        table: &str,
        key: &Item,
        operation: &str,
        values: &Item,
        condition: Option<&str>,
    ) -> Response {
        self.runtime
            .block_on(self.inner.update_item(table, key, operation, values, condition))
    }

    /// Query items by key condition.
    ///
    /// `values` binds the `:placeholders` used by the key condition and
    /// the filter.
    pub fn query(
        &self,
        table: &str,
        key_condition_expression: &str,
        values: &Item,
        filter_expression: Option<&str>,
        projection_expression: Option<&str>,
    ) -> Response {
        self.runtime.block_on(self.inner.query(
            table,
            key_condition_expression,
            values,
            filter_expression,
            projection_expression,
        ))
    }

    /// Scan a table. An empty filter scans everything.
    pub fn scan(
        &self,
        table: &str,
        filter_expression: &str,
        values: &Item,
        projection_expression: Option<&str>,
    ) -> Response {
        self.runtime.block_on(self.inner.scan(
            table,
            filter_expression,
            values,
            projection_expression,
        ))
    }

    /// Delete an item by key, returning it if it existed.
    pub fn delete_item(&self, table: &str, key: &Item) -> Response {
        self.runtime.block_on(self.inner.delete_item(table, key))
    }

    /// Delete a table.
    pub fn delete_table(&self, table: &str) -> Response {
        self.runtime.block_on(self.inner.delete_table(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use serde_json::{json, Value};

    #[test]
    fn connect_validates_config() {
        let config = DriverConfig {
            access_key: Some("AKIA".into()),
            ..Default::default()
        };
        assert!(matches!(
            BlockingDriver::connect(config),
            Err(Error::Config(_))
        ));
    }

    /// A driver whose endpoint refuses connections, so every call fails
    /// after the request has been built.
    fn unreachable_driver() -> BlockingDriver {
        let config = DriverConfig::new("us-east-1", "AKIA", "secret")
            .with_endpoint_url("http://127.0.0.1:9");
        BlockingDriver::connect(config).unwrap()
    }

    fn obj(value: Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn set_update_sends_names_values_and_condition() {
        let driver = unreachable_driver();

        let response = driver.update_item(
            "Users",
            &obj(json!({"id": "42"})),
            "SET",
            &obj(json!({"name": "Ann", "age": 31})),
            Some("attribute_exists(id)"),
        );

        assert!(!response.status);
        assert_eq!(response.count, 0);
        assert!(response.items.is_empty());
        assert_ne!(
            response.error.as_ref().and_then(|e| e.code.as_deref()),
            Some("ValidationError")
        );
        assert_eq!(
            response.request,
            json!({
                "TableName": "Users",
                "Key": {"id": {"S": "42"}},
                "UpdateExpression": "SET #f0 = :v0, #f1 = :v1",
                "ExpressionAttributeNames": {"#f0": "age", "#f1": "name"},
                "ExpressionAttributeValues": {":v0": {"N": "31"}, ":v1": {"S": "Ann"}},
                "ConditionExpression": "attribute_exists(id)",
                "ReturnValues": "UPDATED_NEW"
            })
        );
    }

    #[test]
    fn remove_update_sends_no_values() {
        let driver = unreachable_driver();

        let response = driver.update_item(
            "Users",
            &obj(json!({"id": "42"})),
            "remove",
            &obj(json!({"nickname": null})),
            Some("  "),
        );

        assert!(!response.status);
        assert_eq!(
            response.request,
            json!({
                "TableName": "Users",
                "Key": {"id": {"S": "42"}},
                "UpdateExpression": "REMOVE #f0",
                "ExpressionAttributeNames": {"#f0": "nickname"},
                "ReturnValues": "UPDATED_NEW"
            })
        );
    }

    #[test]
    fn update_with_bad_operation_fails_without_network() {
        let driver = unreachable_driver();
        let key = serde_json::json!({"id": "42"});
        let values = serde_json::json!({"name": "Ann"});

        let response = driver.update_item(
            "Users",
            key.as_object().unwrap(),
            "UPSERT",
            values.as_object().unwrap(),
            None,
        );
        assert!(!response.status);
        assert_eq!(response.count, 0);
        assert!(response.items.is_empty());
        assert_eq!(response.request["TableName"], "Users");
        assert_eq!(
            response.error.unwrap().code.as_deref(),
            Some("ValidationError")
        );
    }
}
