mod common;

use axum::http::StatusCode;
use common::{PASSWORD, build_test_app, get, json_body, login};
use serde_json::{Value, json};
use tower::ServiceExt;

fn ids(page: &Value) -> Vec<i64> {
    page["content"]
        .as_array()
        .expect("content array")
        .iter()
        .map(|row| row["id"].as_i64().expect("row id"))
        .collect()
}

async fn fetch(
    router: &axum::Router,
    uri: &str,
    token: &str,
) -> (StatusCode, Value) {
    let response = router.clone().oneshot(get(uri, Some(token))).await.unwrap();
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn first_page_uses_the_configured_default_limit() {
    let app = build_test_app();
    let token = login(&app.router, "admin", PASSWORD).await;

    let (status, page) = fetch(&app.router, "/api/users", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&page), vec![1, 2, 3]);
    assert_eq!(page["hasNext"], true);
    assert_eq!(page["hasPrevious"], false);
    assert_eq!(page["nextId"], 3);
    assert_eq!(page["previousId"], 1);

    let first = &page["content"][0];
    assert_eq!(first["username"], "admin");
    assert_eq!(first["isAdmin"], true);
    assert!(first.get("passwordHash").is_none());
}

#[tokio::test]
async fn walks_forward_to_the_end_and_back() {
    let app = build_test_app();
    let token = login(&app.router, "admin", PASSWORD).await;

    let (_, second) =
        fetch(&app.router, "/api/users?lastId=3&limit=3", &token).await;
    assert_eq!(ids(&second), vec![4, 5, 6]);
    assert_eq!(second["hasNext"], true);
    assert_eq!(second["hasPrevious"], true);

    let (_, last) =
        fetch(&app.router, "/api/users?lastId=6&limit=3", &token).await;
    assert_eq!(ids(&last), vec![7]);
    assert_eq!(last["hasNext"], false);
    assert_eq!(last["hasPrevious"], true);

    let (_, back) = fetch(
        &app.router,
        "/api/users?lastId=7&limit=3&direction=previous",
        &token,
    )
    .await;
    assert_eq!(ids(&back), vec![4, 5, 6]);
    assert_eq!(back["hasNext"], true);
    assert_eq!(back["hasPrevious"], true);

    let (_, start) = fetch(
        &app.router,
        "/api/users?lastId=4&limit=3&direction=PREVIOUS",
        &token,
    )
    .await;
    assert_eq!(ids(&start), vec![1, 2, 3]);
    assert_eq!(start["hasPrevious"], false);
}

#[tokio::test]
async fn past_the_end_is_an_empty_page() {
    let app = build_test_app();
    let token = login(&app.router, "alice", PASSWORD).await;

    let (status, page) =
        fetch(&app.router, "/api/users?lastId=7", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        page,
        json!({
            "content": [],
            "nextId": null,
            "previousId": null,
            "hasNext": false,
            "hasPrevious": false,
        })
    );
}

#[tokio::test]
async fn filters_combine_and_match_prefixes_case_insensitively() {
    let app = build_test_app();
    let token = login(&app.router, "alice", PASSWORD).await;

    let (_, page) =
        fetch(&app.router, "/api/users?username=AL&limit=10", &token).await;
    assert_eq!(ids(&page), vec![2, 3, 5]);

    let (_, page) = fetch(
        &app.router,
        "/api/users?username=al&email=alb&limit=10",
        &token,
    )
    .await;
    assert_eq!(ids(&page), vec![3]);

    let (_, page) = fetch(&app.router, "/api/users?id=6", &token).await;
    assert_eq!(ids(&page), vec![6]);
    assert_eq!(page["hasNext"], false);

    let (_, page) =
        fetch(&app.router, "/api/users?username=al&limit=2", &token).await;
    assert_eq!(ids(&page), vec![2, 3]);
    assert_eq!(page["hasNext"], true);
}

#[tokio::test]
async fn invalid_paging_parameters_are_bad_requests() {
    let app = build_test_app();
    let token = login(&app.router, "alice", PASSWORD).await;

    for uri in [
        "/api/users?direction=sideways",
        "/api/users?limit=0",
        "/api/users?limit=-5",
        "/api/users?limit=11",
        "/api/users?lastId=abc",
    ] {
        let (status, body) = fetch(&app.router, uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["status"], 400);
    }
}

#[tokio::test]
async fn user_details_resolve_names() {
    let app = build_test_app();
    let token = login(&app.router, "alice", PASSWORD).await;

    let (status, user) = fetch(&app.router, "/api/users/1", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["username"], "admin");
    assert_eq!(
        user["roles"],
        json!([
            { "id": 1, "name": "ROLE_ADMIN" },
            { "id": 2, "name": "ROLE_USER" },
        ])
    );
    assert_eq!(user["modules"], json!([{ "id": 1, "name": "USERS" }]));
    assert_eq!(user["submodules"], json!([]));
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = build_test_app();
    let token = login(&app.router, "alice", PASSWORD).await;

    let (status, body) = fetch(&app.router, "/api/users/999", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "User with ID 999 not found");

    let (status, _) = fetch(&app.router, "/api/users/abc", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permission_catalog_lists_everything() {
    let app = build_test_app();
    let token = login(&app.router, "bob", PASSWORD).await;

    let (status, catalog) =
        fetch(&app.router, "/api/permissions", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        catalog,
        json!({
            "roles": [
                { "id": 1, "name": "ROLE_ADMIN" },
                { "id": 2, "name": "ROLE_USER" },
            ],
            "modules": [{ "id": 1, "name": "USERS" }],
            "submodules": [{ "id": 1, "name": "USERS_READ" }],
        })
    );
}
