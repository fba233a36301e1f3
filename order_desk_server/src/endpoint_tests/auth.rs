use actix_web::{
    http::{Method, StatusCode},
    web,
    web::ServiceConfig,
};
use order_desk_engine::{
    db_types::{Credentials, Role},
    helpers::hash_password,
    AuthApi,
};

use super::{
    helpers::{assert_error, get_auth_config, json, send_request},
    mocks::MockAuthManager,
};
use crate::{auth::TokenIssuer, routes::AuthRoute};

fn configure_with(mock: MockAuthManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(AuthRoute::<MockAuthManager>::new())
            .app_data(web::Data::new(AuthApi::new(mock)))
            .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())));
    }
}

fn mock_with_alice() -> MockAuthManager {
    let hash = hash_password("correct horse").unwrap();
    let mut mock = MockAuthManager::new();
    mock.expect_fetch_credentials().returning(move |username| match username {
        "alice" => Ok(Some(Credentials {
            id: 3,
            username: "alice".into(),
            password_hash: Some(hash.clone()),
            is_admin: true,
        })),
        "bob" => Ok(Some(Credentials { id: 4, username: "bob".into(), password_hash: None, is_admin: false })),
        _ => Ok(None),
    });
    mock
}

async fn login(body: &str) -> (StatusCode, String) {
    send_request(Method::POST, "/auth", "", Some(body), false, configure_with(mock_with_alice())).await
}

#[actix_web::test]
async fn login_issues_a_bearer_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = login(r#"{"username": "alice", "password": "correct horse"}"#).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let value = json(&body);
    assert_eq!(value["token_type"], "Bearer");
    assert_eq!(value["expires_in"], 3600);
    let token = value["access_token"].as_str().unwrap();
    let claims = TokenIssuer::new(&get_auth_config()).verify_token(token).unwrap();
    assert_eq!(claims.sub, "alice");
    assert_eq!(claims.user_id, 3);
    assert_eq!(claims.roles, vec![Role::User, Role::Admin]);
}

#[actix_web::test]
async fn bad_credentials_are_unauthorized() {
    let _ = env_logger::try_init().ok();
    let (status, body) = login(r#"{"username": "alice", "password": "wrong"}"#).await;
    assert_error(status, StatusCode::UNAUTHORIZED, &body);
    let (status, body) = login(r#"{"username": "mallory", "password": "correct horse"}"#).await;
    assert_error(status, StatusCode::UNAUTHORIZED, &body);
    // No password set
    let (status, body) = login(r#"{"username": "bob", "password": ""}"#).await;
    assert_error(status, StatusCode::UNAUTHORIZED, &body);
    // All failures look the same
    assert_eq!(json(&body)["error"], "Authentication Error. Invalid username or password.");
}

#[actix_web::test]
async fn login_needs_a_password() {
    let _ = env_logger::try_init().ok();
    let (status, body) = login(r#"{"username": "alice"}"#).await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
}
