use reqwest::StatusCode;
use serde::Deserialize;
use std::{env, time::Duration};
use tokio::time::sleep;

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    mobile_phone_number: Option<String>,
    email: Option<String>,
    nickname: Option<String>,
    created_at: String,
    modified_at: String,
}

#[derive(Deserialize)]
struct UserListResponse {
    data: Vec<UserResponse>,
    limit: u64,
    total: u64,
}

#[derive(Deserialize)]
struct ColumnResponse {
    column: String,
}

#[derive(Deserialize)]
struct SchemaResponse {
    table: String,
    columns: Vec<ColumnResponse>,
}

#[tokio::test]
async fn smoke_user_flow() {
    dotenvy::dotenv().ok();

    // Needs a running login-api backed by a database; opt in explicitly.
    let run_smoke = env::var("RUN_SMOKE_USERS")
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if !run_smoke {
        eprintln!("skipping smoke_user_flow (set RUN_SMOKE_USERS=1 to enable)");
        return;
    }

    let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3333".to_string());
    let retries: usize = env::var("SMOKE_USERS_RETRIES")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);

    let client = reqwest::Client::new();
    wait_for_health(&client, &base_url, retries).await;

    let schema: SchemaResponse = client
        .get(format!("{}/api/v1/schema/user", base_url))
        .send()
        .await
        .expect("schema request failed")
        .json()
        .await
        .expect("schema json");
    assert_eq!(schema.table, "user");
    let columns: Vec<_> = schema.columns.iter().map(|c| c.column.as_str()).collect();
    assert_eq!(&columns[..4], ["id", "created_at", "modified_at", "deleted"]);

    let create = client
        .post(format!("{}/api/v1/users", base_url))
        .json(&serde_json::json!({ "mobile_phone_number": "5551234" }))
        .send()
        .await
        .expect("create request failed");
    assert_eq!(create.status(), StatusCode::CREATED);
    let created: UserResponse = create.json().await.expect("create json");
    assert!(!created.id.is_empty());
    assert_eq!(created.mobile_phone_number.as_deref(), Some("5551234"));
    assert_eq!(created.email, None);
    assert_eq!(created.created_at, created.modified_at);

    let update = client
        .patch(format!("{}/api/v1/users/{}", base_url, created.id))
        .json(&serde_json::json!({ "nickname": "smoke" }))
        .send()
        .await
        .expect("update request failed");
    assert_eq!(update.status(), StatusCode::OK);
    let updated: UserResponse = update.json().await.expect("update json");
    assert_eq!(updated.nickname.as_deref(), Some("smoke"));
    assert_eq!(updated.mobile_phone_number.as_deref(), Some("5551234"));

    let list: UserListResponse = client
        .get(format!("{}/api/v1/users?limit=100", base_url))
        .send()
        .await
        .expect("list request failed")
        .json()
        .await
        .expect("list json");
    assert_eq!(list.limit, 100);
    assert!(list.data.iter().any(|u| u.id == created.id));
    assert!(list.total >= 1);

    let delete = client
        .delete(format!("{}/api/v1/users/{}", base_url, created.id))
        .send()
        .await
        .expect("delete request failed");
    assert_eq!(delete.status(), StatusCode::NO_CONTENT);

    let after = client
        .get(format!("{}/api/v1/users/{}", base_url, created.id))
        .send()
        .await
        .expect("get request failed");
    assert_eq!(after.status(), StatusCode::NOT_FOUND);
}

async fn wait_for_health(client: &reqwest::Client, base_url: &str, retries: usize) {
    for _ in 0..retries {
        if let Ok(resp) = client
            .get(format!("{}/api/v1/health", base_url))
            .send()
            .await
        {
            if resp.status().is_success() {
                return;
            }
        }
        sleep(Duration::from_millis(300)).await;
    }
    panic!("login-api at {} never became healthy", base_url);
}
