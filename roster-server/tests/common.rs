use std::{sync::Arc, time::Duration};

use argon2::ParamsBuilder;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use roster_config::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    PaginationConfig, ServerConfig,
};
use roster_core::{
    AuthCrypto, IdSet, Principal, database::InMemoryUsersRepository,
    users::Credentials,
};
use roster_server::{AppState, create_app};
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct horse battery staple";
const PEPPER: &str = "integration-test-pepper";

// Code is used by test modules, but not in this scope
#[allow(unused)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        auth: AuthConfig {
            token_secret: "integration-test-secret-0123456789abcdef".into(),
            token_ttl: Duration::from_secs(3600),
            password_pepper: PEPPER.into(),
        },
        pagination: PaginationConfig {
            default_limit: 3,
            max_limit: 10,
        },
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into()],
            allowed_methods: vec![
                "GET".into(),
                "POST".into(),
                "OPTIONS".into(),
            ],
            allowed_headers: vec![
                "authorization".into(),
                "content-type".into(),
            ],
            max_age: Duration::from_secs(600),
        },
        dev_mode: true,
        metadata: ConfigMetadata::default(),
    }
}

fn cheap_crypto() -> AuthCrypto {
    let params = ParamsBuilder::new()
        .m_cost(8)
        .t_cost(1)
        .p_cost(1)
        .build()
        .expect("argon2 params");
    AuthCrypto::with_params(PEPPER, params).expect("auth crypto")
}

fn user(
    crypto: &AuthCrypto,
    id: i64,
    username: &str,
    enabled: bool,
    roles: Vec<i64>,
) -> Credentials {
    Credentials {
        principal: Principal {
            id,
            username: username.into(),
            email: format!("{username}@example.com"),
            enabled,
            is_admin: id == 1,
            roles: IdSet::from(roles),
            modules: IdSet::from(vec![1]),
            submodules: IdSet::new(),
        },
        password_hash: crypto.hash_password(PASSWORD).expect("hash password"),
    }
}

/// Seven users; `dave` (id 4) is disabled.
pub fn directory(crypto: &AuthCrypto) -> InMemoryUsersRepository {
    InMemoryUsersRepository::new()
        .with_role(1, "ROLE_ADMIN")
        .with_role(2, "ROLE_USER")
        .with_module(1, "USERS")
        .with_submodule(1, "USERS_READ")
        .with_user(user(crypto, 1, "admin", true, vec![1, 2]))
        .with_user(user(crypto, 2, "alice", true, vec![2]))
        .with_user(user(crypto, 3, "albert", true, vec![2]))
        .with_user(user(crypto, 4, "dave", false, vec![2]))
        .with_user(user(crypto, 5, "alina", true, vec![2]))
        .with_user(user(crypto, 6, "bob", true, vec![2]))
        .with_user(user(crypto, 7, "carol", true, vec![]))
}

pub fn build_test_app() -> TestApp {
    let crypto = cheap_crypto();
    let users = Arc::new(directory(&crypto));
    let state =
        AppState::new(Arc::new(test_config()), users, Arc::new(crypto))
            .expect("app state");

    TestApp {
        router: create_app(state.clone()),
        state,
    }
}

#[allow(unused)]
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

#[allow(unused)]
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[allow(unused)]
pub async fn login(router: &Router, username: &str, password: &str) -> String {
    let response = router
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({ "username": username, "password": password }),
        ))
        .await
        .expect("login response");
    assert_eq!(response.status(), 200, "login as {username}");

    json_body(response)
        .await
        .get("token")
        .and_then(Value::as_str)
        .expect("token field")
        .to_string()
}
