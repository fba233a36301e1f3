use actix_web::{
    body,
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, Method, StatusCode},
    middleware::NormalizePath,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{Duration, NaiveDate};
use log::debug;
use ods_common::Money;
use order_desk_engine::{
    db_types::{Article, Role},
    AuthenticatedUser,
};
use serde_json::Value;

use crate::{auth::TokenIssuer, config::AuthConfig, errors::ServerError, middleware::JwtMiddlewareFactory};

pub const TEST_HOST: &str = "desk.test";

// A fixed test secret. DO NOT re-use it anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig::new("endpoint-test-secret-3df23c742b25e412", Duration::hours(1))
}

pub fn issue_token(roles: Vec<Role>) -> String {
    let user = AuthenticatedUser { id: 1, username: "tester".into(), roles };
    TokenIssuer::new(&get_auth_config()).issue_token(&user).expect("Failed to sign token")
}

pub fn user_token() -> String {
    issue_token(vec![Role::User])
}

pub fn admin_token() -> String {
    issue_token(vec![Role::User, Role::Admin])
}

pub fn article(id: i64, reference: &str, price: f64, tax: f64) -> Article {
    Article {
        id,
        reference: reference.into(),
        name: format!("Article {reference}"),
        description: String::new(),
        price: Money::from(price),
        tax,
        creation_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    }
}

/// Sends a request to an app whose routes are registered by `configure`. When `protected` is true, the routes sit
/// behind the JWT middleware, as they do in the server.
///
/// Middleware errors are rendered into responses, just as the server does.
pub async fn send_request<F>(
    method: Method,
    path: &str,
    token: &str,
    body: Option<&str>,
    protected: bool,
    configure: F,
) -> (StatusCode, String)
where
    F: FnOnce(&mut ServiceConfig) + 'static,
{
    let mut req = TestRequest::default().method(method).uri(path).insert_header((header::HOST, TEST_HOST));
    if !token.is_empty() {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    if let Some(body) = body {
        req = req.insert_header(header::ContentType::json()).set_payload(body.to_string());
    }
    let req = req.to_request();
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let app = App::new().wrap(NormalizePath::trim()).app_data(json_config);
    debug!("🚀️ Making request to {path}");
    if protected {
        let scope = web::scope("").wrap(JwtMiddlewareFactory::new(TokenIssuer::new(&get_auth_config())));
        let service = test::init_service(app.service(scope.configure(configure))).await;
        call(&service, req).await
    } else {
        let service = test::init_service(app.configure(configure)).await;
        call(&service, req).await
    }
}

async fn call<S, R, B>(service: &S, req: R) -> (StatusCode, String)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(service, req).await {
        Ok(res) => (res.status(), body::to_bytes(res.into_body()).await.unwrap_or_default()),
        Err(e) => {
            let res = e.error_response();
            (res.status(), body::to_bytes(res.into_body()).await.unwrap_or_default())
        },
    };
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub async fn get_request<F>(path: &str, token: &str, configure: F) -> (StatusCode, String)
where F: FnOnce(&mut ServiceConfig) + 'static {
    send_request(Method::GET, path, token, None, true, configure).await
}

pub fn json(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Invalid JSON ({e}): {body}"))
}

#[allow(dead_code)]
pub fn assert_error(status: StatusCode, expected: StatusCode, body: &str) {
    assert_eq!(status, expected, "Unexpected status. Body: {body}");
    assert!(json(body)["error"].is_string(), "Expected an error message, got {body}");
}
