//! DynamoDB driver module.
//!
//! Provides a driver that supports multiple credential sources:
//! - Hardcoded credentials
//! - AWS profiles
//! - Environment variables and the default provider chain
//!
//! The main struct is [`DynamoDriver`], which wraps the AWS SDK client.

use aws_config::meta::region::RegionProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::Client;

use crate::basic_operations;
use crate::config::{DriverConfig, DEFAULT_REGION};
use crate::errors::{map_sdk_error, Result};
use crate::response::Response;
use crate::serialization::Item;
use crate::table_operations::{self, AttributeDefinition, KeySchema, TableOptions};

/// Async DynamoDB driver.
///
/// Every operation returns a [`Response`] envelope; remote failures are
/// reported in the envelope instead of as `Err`.
///
/// # Examples
///
/// ```no_run
/// use dynamodb_driver::{DriverConfig, DynamoDriver};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), dynamodb_driver::Error> {
/// let config = DriverConfig::new("us-east-1", "AKIA...", "secret...");
/// let driver = DynamoDriver::connect(config).await?;
///
/// let key = json!({"id": "42"});
/// let response = driver.get_item("Users", key.as_object().unwrap()).await;
/// if response.status && response.count == 1 {
///     println!("{}", response.items[0]["name"]);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DynamoDriver {
    client: Client,
    region: String,
}

impl DynamoDriver {
    /// Build the SDK client from `config`.
    ///
    /// Fails only on an invalid config; nothing is sent to AWS here.
    ///
    /// # Arguments
    ///
    /// * `config` - Region, API version, credentials and endpoint
    ///
    /// # Returns
    ///
    /// A driver whose [`region`](Self::region) is the one the SDK resolved.
    pub async fn connect(config: DriverConfig) -> Result<Self> {
        config.validate()?;
        let driver = Self::from_client(build_client(config).await);
        tracing::debug!(region = %driver.region, "dynamodb driver ready");
        Ok(driver)
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(client: Client) -> Self {
        let region = client
            .config()
            .region()
            .map(|r| r.to_string())
            .unwrap_or_default();
        DynamoDriver { client, region }
    }

    /// Get the AWS region the SDK client resolved.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Check that DynamoDB is reachable.
    ///
    /// Makes a single ListTables call with limit 1.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .list_tables()
            .limit(1)
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }

    /// Create a table with on-demand billing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dynamodb_driver::{AttributeDefinition, AttributeType, DynamoDriver, KeySchema};
    ///
    /// # async fn example(driver: DynamoDriver) {
    /// let response = driver
    ///     .create_table(
    ///         "Users",
    ///         &[KeySchema::hash("id")],
    ///         &[AttributeDefinition::new("id", AttributeType::S)],
    ///     )
    ///     .await;
    /// assert!(response.status, "{}", response.message);
    /// # }
    /// ```
    pub async fn create_table(
        &self,
        table: &str,
        key_schema: &[KeySchema],
        attribute_definitions: &[AttributeDefinition],
    ) -> Response {
        self.create_table_with(table, key_schema, attribute_definitions, &TableOptions::default())
            .await
    }

    /// Create a table with explicit billing settings.
    ///
    /// # Arguments
    ///
    /// * `table` - Name of the table to create
    /// * `key_schema` - Hash key and optional range key
    /// * `attribute_definitions` - Types of the key attributes
    /// * `options` - Billing mode and capacity units
    pub async fn create_table_with(
        &self,
        table: &str,
        key_schema: &[KeySchema],
        attribute_definitions: &[AttributeDefinition],
        options: &TableOptions,
    ) -> Response {
        table_operations::create_table(&self.client, table, key_schema, attribute_definitions, options)
            .await
    }

    /// Put an item into a table.
    ///
    /// # Arguments
    ///
    /// * `table` - The name of the DynamoDB table
    /// * `item` - The item, as a JSON object
    ///
    /// # Returns
    ///
    /// A response with `count` 0; the stored item is not echoed back.
    pub async fn put_item(&self, table: &str, item: &Item) -> Response {
        basic_operations::put_item(&self.client, table, item).await
    }

    /// Get an item by its key.
    ///
    /// # Arguments
    ///
    /// * `table` - The name of the DynamoDB table
    /// * `key` - The key attributes (hash key and optional range key)
    ///
    /// # Returns
    ///
    /// The item as the single entry of `items`. A missing item is a
    /// success with `count` 0.
    pub async fn get_item(&self, table: &str, key: &Item) -> Response {
        basic_operations::get_item(&self.client, table, key).await
    }

    /// Update the attributes in `values` with one clause each.
    ///
    /// # Arguments
    ///
    /// * `table` - The name of the DynamoDB table
    /// * `key` - The key attributes of the item to update
    /// * `operation` - `SET`, `ADD`, `DELETE` or `REMOVE`
    /// * `values` - Attribute:value pairs; values are ignored for `REMOVE`
    /// * `condition` - Optional condition expression
    ///
    /// # Returns
    ///
    /// The updated attributes as the single item, or no item when nothing
    /// was left to return.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use dynamodb_driver::DynamoDriver;
    /// # use serde_json::json;
    /// # async fn example(driver: DynamoDriver) {
    /// let key = json!({"id": "42"});
    /// let values = json!({"name": "Ann", "age": 31});
    /// let response = driver
    ///     .update_item(
    ///         "Users",
    ///         key.as_object().unwrap(),
    ///         "SET",
    ///         values.as_object().unwrap(),
    ///         Some("attribute_exists(id)"),
    ///     )
    ///     .await;
    /// # }
    /// ```
    pub async fn update_item(
        &self,
        table: &str,
        key: &Item,
        operation: &str,
        values: &Item,
        condition: Option<&str>,
    ) -> Response {
        basic_operations::update_item(&self.client, table, key, operation, values, condition).await
    }

    /// Query items by key condition.
    ///
    /// # Arguments
    ///
    /// * `table` - The name of the DynamoDB table
    /// * `key_condition_expression` - Key condition (e.g., "id = :id")
    /// * `values` - Binds the `:placeholders` used by both expressions
    /// * `filter_expression` - Optional filter on non-key attributes
    /// * `projection_expression` - Optional list of attributes to return
    ///
    /// # Returns
    ///
    /// One page of matching items, in key order.
    pub async fn query(
        &self,
        table: &str,
        key_condition_expression: &str,
        values: &Item,
        filter_expression: Option<&str>,
        projection_expression: Option<&str>,
    ) -> Response {
        basic_operations::query(
            &self.client,
            table,
            key_condition_expression,
            values,
            filter_expression,
            projection_expression,
        )
        .await
    }

    /// Scan a table.
    ///
    /// # Arguments
    ///
    /// * `table` - The name of the DynamoDB table
    /// * `filter_expression` - Filter expression; empty scans everything
    /// * `values` - Binds the `:placeholders` used by the filter
    /// * `projection_expression` - Optional list of attributes to return
    pub async fn scan(
        &self,
        table: &str,
        filter_expression: &str,
        values: &Item,
        projection_expression: Option<&str>,
    ) -> Response {
        basic_operations::scan(
            &self.client,
            table,
            filter_expression,
            values,
            projection_expression,
        )
        .await
    }

    /// Delete an item by key, returning the deleted item if it existed.
    pub async fn delete_item(&self, table: &str, key: &Item) -> Response {
        basic_operations::delete_item(&self.client, table, key).await
    }

    /// Delete a table and all its items.
    pub async fn delete_table(&self, table: &str) -> Response {
        table_operations::delete_table(&self.client, table).await
    }
}

/// Build the AWS SDK DynamoDB client with the given configuration.
async fn build_client(config: DriverConfig) -> Client {
    let region_provider = RegionProviderChain::first_try(config.region.map(Region::new))
        .or_default_provider()
        .or_else(DEFAULT_REGION);

    let mut config_loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);

    // Credentials priority: hardcoded > profile > env/default chain
    if let (Some(ak), Some(sk)) = (config.access_key, config.secret_key) {
        let creds = Credentials::new(ak, sk, config.session_token, None, "dynamodb-driver");
        config_loader = config_loader.credentials_provider(creds);
    } else if let Some(profile_name) = config.profile {
        let profile_provider = ProfileFileCredentialsProvider::builder()
            .profile_name(&profile_name)
            .build();
        config_loader = config_loader.credentials_provider(profile_provider);
    }

    let sdk_config = config_loader.load().await;

    let mut dynamo_config = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

    if let Some(url) = config.endpoint_url {
        dynamo_config = dynamo_config.endpoint_url(url);
    }

    Client::from_conf(dynamo_config.build())
}
