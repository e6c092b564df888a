//! End-to-end tests against DynamoDB Local or LocalStack.
//!
//! Set `DYNAMODB_ENDPOINT` (for example `http://localhost:8000`) to run
//! them; without it every test returns early.

use dynamodb_driver::{
    AttributeDefinition, AttributeType, DriverConfig, DynamoDriver, Item, KeySchema,
};
use serde_json::{json, Value};

async fn local_driver() -> Option<DynamoDriver> {
    let endpoint = std::env::var("DYNAMODB_ENDPOINT").ok()?;
    dynamodb_driver::init_logging("dynamodb_driver=debug");
    let config = DriverConfig::new("us-east-1", "local", "local").with_endpoint_url(endpoint);
    Some(DynamoDriver::connect(config).await.expect("valid config"))
}

fn unique_table(name: &str) -> String {
    format!("{}_{}", name, uuid::Uuid::new_v4().simple())
}

fn obj(value: Value) -> Item {
    value.as_object().cloned().expect("object literal")
}

async fn create_users(driver: &DynamoDriver, table: &str) {
    let response = driver
        .create_table(
            table,
            &[KeySchema::hash("id"), KeySchema::range("seq")],
            &[
                AttributeDefinition::new("id", AttributeType::S),
                AttributeDefinition::new("seq", AttributeType::N),
            ],
        )
        .await;
    assert!(response.status, "create_table failed: {}", response.message);
    assert_eq!(response.message, "CREATE TABLE OK");
}

#[tokio::test]
async fn item_lifecycle() {
    let Some(driver) = local_driver().await else {
        return;
    };
    let table = unique_table("users");
    create_users(&driver, &table).await;

    let missing = driver.get_item(&table, &obj(json!({"id": "42", "seq": 1}))).await;
    assert!(missing.status);
    assert_eq!(missing.count, 0);
    assert!(missing.items.is_empty());

    let put = driver
        .put_item(
            &table,
            &obj(json!({"id": "42", "seq": 1, "name": "Ann", "tags": ["a", "b"]})),
        )
        .await;
    assert!(put.status, "{}", put.message);
    assert_eq!(put.message, "PUT ITEM OK");
    assert!(put.count <= 1);

    let found = driver.get_item(&table, &obj(json!({"id": "42", "seq": 1}))).await;
    assert!(found.status);
    assert_eq!(found.count, 1);
    assert_eq!(found.items[0]["name"], json!("Ann"));
    assert_eq!(found.items[0]["tags"], json!(["a", "b"]));

    let updated = driver
        .update_item(
            &table,
            &obj(json!({"id": "42", "seq": 1})),
            "SET",
            &obj(json!({"name": "Bea", "age": 31})),
            Some("attribute_exists(id)"),
        )
        .await;
    assert!(updated.status, "{}", updated.message);
    assert_eq!(updated.count, 1);
    assert_eq!(updated.items[0]["name"], json!("Bea"));
    assert_eq!(updated.items[0]["age"], json!(31));

    let deleted = driver.delete_item(&table, &obj(json!({"id": "42", "seq": 1}))).await;
    assert!(deleted.status);
    assert_eq!(deleted.count, 1);

    assert!(driver.delete_table(&table).await.status);
}

#[tokio::test]
async fn conditional_update_failure_is_reported() {
    let Some(driver) = local_driver().await else {
        return;
    };
    let table = unique_table("users");
    create_users(&driver, &table).await;

    let response = driver
        .update_item(
            &table,
            &obj(json!({"id": "nobody", "seq": 0})),
            "SET",
            &obj(json!({"name": "Ghost"})),
            Some("attribute_exists(id)"),
        )
        .await;
    assert!(!response.status);
    assert_eq!(response.count, 0);
    assert!(response.items.is_empty());
    let failure = response.into_result().unwrap_err();
    assert_eq!(
        failure.code.as_deref(),
        Some("ConditionalCheckFailedException")
    );

    assert!(driver.delete_table(&table).await.status);
}

#[tokio::test]
async fn query_and_scan_count_matches_items() {
    let Some(driver) = local_driver().await else {
        return;
    };
    let table = unique_table("events");
    create_users(&driver, &table).await;

    for seq in 0..5 {
        let item = obj(json!({"id": "u1", "seq": seq, "even": seq % 2 == 0}));
        assert!(driver.put_item(&table, &item).await.status);
    }
    assert!(driver
        .put_item(&table, &obj(json!({"id": "u2", "seq": 0, "even": true})))
        .await
        .status);

    let queried = driver
        .query(
            &table,
            "id = :id",
            &obj(json!({":id": "u1", ":even": true})),
            Some("even = :even"),
            None,
        )
        .await;
    assert!(queried.status, "{}", queried.message);
    assert_eq!(queried.count, 3);
    assert_eq!(queried.items.len(), queried.count);
    assert_eq!(queried.request["FilterExpression"], json!("even = :even"));

    let scanned = driver.scan(&table, "", &Item::new(), Some("id, seq")).await;
    assert!(scanned.status, "{}", scanned.message);
    assert_eq!(scanned.count, 6);
    assert!(scanned.items.iter().all(|item| !item.contains_key("even")));

    assert!(driver.delete_table(&table).await.status);
}

#[tokio::test]
async fn creating_existing_table_fails_with_conflict() {
    let Some(driver) = local_driver().await else {
        return;
    };
    let table = unique_table("dupe");
    create_users(&driver, &table).await;

    let again = driver
        .create_table(
            &table,
            &[KeySchema::hash("id")],
            &[AttributeDefinition::new("id", AttributeType::S)],
        )
        .await;
    assert!(!again.status);
    assert_eq!(again.count, 0);
    assert!(again.message.contains("ResourceInUseException"));

    assert!(driver.delete_table(&table).await.status);
}

#[tokio::test]
async fn missing_table_is_a_failed_response() {
    let Some(driver) = local_driver().await else {
        return;
    };
    let response = driver
        .get_item("does_not_exist_table", &obj(json!({"id": "1"})))
        .await;
    assert!(!response.status);
    assert_eq!(response.count, 0);
    assert!(response.items.is_empty());
    assert_eq!(response.request["TableName"], json!("does_not_exist_table"));
}
