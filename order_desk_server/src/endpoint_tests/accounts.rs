use actix_web::{
    http::{Method, StatusCode},
    web,
    web::ServiceConfig,
};
use chrono::{TimeZone, Utc};
use order_desk_engine::{
    db_types::{Group, User},
    traits::AccountApiError,
    AccountApi,
};

use super::{
    helpers::{admin_token, assert_error, get_request, json, send_request, user_token},
    mocks::MockAccountManager,
};
use crate::routes::{
    CreateGroupRoute,
    CreateUserRoute,
    DeleteUserRoute,
    GetUserRoute,
    ListGroupsRoute,
    ListUsersRoute,
    PatchGroupRoute,
    PatchUserRoute,
};

fn configure_with(mock: MockAccountManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(ListUsersRoute::<MockAccountManager>::new())
            .service(CreateUserRoute::<MockAccountManager>::new())
            .service(GetUserRoute::<MockAccountManager>::new())
            .service(PatchUserRoute::<MockAccountManager>::new())
            .service(DeleteUserRoute::<MockAccountManager>::new())
            .service(ListGroupsRoute::<MockAccountManager>::new())
            .service(CreateGroupRoute::<MockAccountManager>::new())
            .service(PatchGroupRoute::<MockAccountManager>::new())
            .app_data(web::Data::new(AccountApi::new(mock)));
    }
}

fn carol() -> User {
    User {
        id: 2,
        username: "carol".into(),
        email: "carol@example.com".into(),
        is_admin: false,
        date_joined: Utc.with_ymd_and_hms(2024, 4, 1, 9, 30, 0).unwrap(),
        groups: vec![1],
    }
}

#[actix_web::test]
async fn users_are_for_admins_only() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_users().never();
    let (status, body) = get_request("/users", &user_token(), configure_with(mock)).await;
    assert_error(status, StatusCode::FORBIDDEN, &body);
    let (status, body) = get_request("/groups", "", configure_with(MockAccountManager::new())).await;
    assert_error(status, StatusCode::UNAUTHORIZED, &body);
}

#[actix_web::test]
async fn list_users() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_users().returning(|| Ok(vec![carol()]));
    let (status, body) = get_request("/users", &admin_token(), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let value = json(&body);
    assert_eq!(value[0]["url"], "http://desk.test/users/2/");
    assert_eq!(value[0]["username"], "carol");
    assert_eq!(value[0]["groups"], serde_json::json!([1]));
    assert!(!body.contains("password"));
}

#[actix_web::test]
async fn create_user_hashes_the_password() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_insert_user()
        .withf(|user, hash| {
            user.username == "carol" &&
                user.groups == vec![1] &&
                hash.as_deref().map(|h| h.starts_with("$argon2id$") && !h.contains("s3cret")) == Some(true)
        })
        .times(1)
        .returning(|_, _| Ok(carol()));
    let body = r#"{"username": "carol", "email": "carol@example.com", "password": "s3cret", "groups": [1]}"#;
    let (status, body) =
        send_request(Method::POST, "/users", &admin_token(), Some(body), true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(json(&body)["id"], 2);
}

#[actix_web::test]
async fn duplicate_usernames_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_insert_user().returning(|u, _| Err(AccountApiError::UsernameTaken(u.username)));
    let (status, body) = send_request(
        Method::POST,
        "/users",
        &admin_token(),
        Some(r#"{"username": "carol"}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
    assert!(body.contains("carol"));
}

#[actix_web::test]
async fn unknown_groups_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_update_user().returning(|_, _, _| Err(AccountApiError::GroupNotFound(9)));
    let (status, body) = send_request(
        Method::PATCH,
        "/users/2",
        &admin_token(),
        Some(r#"{"groups": [9]}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
}

#[actix_web::test]
async fn missing_and_deleted_users() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_user().returning(|_| Ok(None));
    let (status, body) = get_request("/users/77", &admin_token(), configure_with(mock)).await;
    assert_error(status, StatusCode::NOT_FOUND, &body);

    let mut mock = MockAccountManager::new();
    mock.expect_delete_user().withf(|id| *id == 2).returning(|_| Ok(true));
    let (status, _) = send_request(Method::DELETE, "/users/2", &admin_token(), None, true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn groups() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockAccountManager::new();
    mock.expect_fetch_groups().returning(|| Ok(vec![Group { id: 1, name: "clerks".into() }]));
    let (status, body) = get_request("/groups", &admin_token(), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), serde_json::json!([{"url": "http://desk.test/groups/1/", "id": 1, "name": "clerks"}]));

    let mut mock = MockAccountManager::new();
    mock.expect_insert_group().returning(|g| Ok(Group { id: 5, name: g.name }));
    let (status, body) = send_request(
        Method::POST,
        "/groups",
        &admin_token(),
        Some(r#"{"name": "buyers"}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json(&body)["name"], "buyers");

    let mut mock = MockAccountManager::new();
    mock.expect_update_group()
        .withf(|id, g| *id == 5 && g.name == "purchasing")
        .returning(|id, g| Ok(Some(Group { id, name: g.name })));
    let (status, body) = send_request(
        Method::PATCH,
        "/groups/5",
        &admin_token(),
        Some(r#"{"name": "purchasing"}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["url"], "http://desk.test/groups/5/");
}
