use actix_web::{
    http::{Method, StatusCode},
    web,
    web::ServiceConfig,
};
use ods_common::Money;
use order_desk_engine::{db_types::Article, traits::CatalogApiError, CatalogApi};

use super::{
    helpers::{article, assert_error, get_request, json, send_request, user_token},
    mocks::MockCatalogManager,
};
use crate::routes::{
    CreateArticleRoute,
    DeleteArticleRoute,
    GetArticleRoute,
    ListArticlesRoute,
    PatchArticleRoute,
    ReplaceArticleRoute,
};

fn configure_with(mock: MockCatalogManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(ListArticlesRoute::<MockCatalogManager>::new())
            .service(CreateArticleRoute::<MockCatalogManager>::new())
            .service(GetArticleRoute::<MockCatalogManager>::new())
            .service(ReplaceArticleRoute::<MockCatalogManager>::new())
            .service(PatchArticleRoute::<MockCatalogManager>::new())
            .service(DeleteArticleRoute::<MockCatalogManager>::new())
            .app_data(web::Data::new(CatalogApi::new(mock)));
    }
}

#[actix_web::test]
async fn articles_need_a_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("/articles", "", configure_with(MockCatalogManager::new())).await;
    assert_error(status, StatusCode::UNAUTHORIZED, &body);
    let (status, body) = get_request("/articles", "garbage", configure_with(MockCatalogManager::new())).await;
    assert_error(status, StatusCode::UNAUTHORIZED, &body);
}

#[actix_web::test]
async fn list_articles() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_articles()
        .times(1)
        .returning(|| Ok(vec![article(1, "AB-1", 1.0, 1.0), article(2, "CD", 2.5, 21.0)]));
    let (status, body) = get_request("/articles", &user_token(), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    let value = json(&body);
    let articles = value.as_array().unwrap();
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["url"], "http://desk.test/articles/1/");
    assert_eq!(articles[0]["reference"], "AB-1");
    assert_eq!(articles[1]["price"], 2.5);
    assert_eq!(articles[1]["tax"], 21.0);
    assert_eq!(articles[1]["creation_date"], "2024-03-01");
}

#[actix_web::test]
async fn trailing_slashes_are_ignored() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_article().withf(|id| *id == 3).returning(|_| Ok(Some(article(3, "X", 1.0, 0.0))));
    let (status, body) = get_request("/articles/3/", &user_token(), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["id"], 3);
}

#[actix_web::test]
async fn missing_article_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_article().returning(|_| Ok(None));
    let (status, body) = get_request("/articles/99", &user_token(), configure_with(mock)).await;
    assert_error(status, StatusCode::NOT_FOUND, &body);
}

#[actix_web::test]
async fn create_article() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_insert_article()
        .withf(|a| a.reference == "AB-1" && a.price == 1.5 && a.tax == 1.0 && a.creation_date.is_some())
        .times(1)
        .returning(|a| {
            Ok(Article {
                id: 5,
                reference: a.reference,
                name: a.name,
                description: a.description,
                price: Money::from(a.price),
                tax: a.tax,
                creation_date: a.creation_date.unwrap(),
            })
        });
    let body = r#"{"reference": "AB-1", "name": "Widget", "price": "1.5", "tax": 1}"#;
    let (status, body) =
        send_request(Method::POST, "/articles", &user_token(), Some(body), true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let value = json(&body);
    assert_eq!(value["url"], "http://desk.test/articles/5/");
    assert_eq!(value["name"], "Widget");
    assert_eq!(value["description"], "");
}

#[actix_web::test]
async fn invalid_articles_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = user_token();
    // Malformed JSON
    let (status, body) =
        send_request(Method::POST, "/articles", &token, Some("{"), true, configure_with(MockCatalogManager::new()))
            .await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
    // Missing name
    let (status, body) = send_request(
        Method::POST,
        "/articles",
        &token,
        Some(r#"{"reference": "AB-1", "price": 1, "tax": 1}"#),
        true,
        configure_with(MockCatalogManager::new()),
    )
    .await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
    // Negative price never reaches the backend
    let (status, body) = send_request(
        Method::POST,
        "/articles",
        &token,
        Some(r#"{"reference": "AB-1", "name": "Widget", "price": -1, "tax": 1}"#),
        true,
        configure_with(MockCatalogManager::new()),
    )
    .await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
}

#[actix_web::test]
async fn patch_article() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_update_article()
        .withf(|id, u| *id == 2 && u.price == Some(3.0) && u.name.is_none())
        .returning(|_, _| Ok(Some(article(2, "CD", 3.0, 21.0))));
    let (status, body) = send_request(
        Method::PATCH,
        "/articles/2",
        &user_token(),
        Some(r#"{"price": 3}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["price"], 3.0);
}

#[actix_web::test]
async fn replace_missing_article() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_update_article().returning(|_, _| Ok(None));
    let (status, body) = send_request(
        Method::PUT,
        "/articles/2",
        &user_token(),
        Some(r#"{"reference": "AB-1", "name": "Widget", "price": 1, "tax": 1}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_error(status, StatusCode::NOT_FOUND, &body);
}

#[actix_web::test]
async fn delete_article() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_delete_article().withf(|id| *id == 4).returning(|_| Ok(true));
    let (status, body) =
        send_request(Method::DELETE, "/articles/4", &user_token(), None, true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn backend_errors_are_hidden() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockCatalogManager::new();
    mock.expect_fetch_articles().returning(|| Err(CatalogApiError::DatabaseError("disk I/O error".into())));
    let (status, body) = get_request("/articles", &user_token(), configure_with(mock)).await;
    assert_error(status, StatusCode::INTERNAL_SERVER_ERROR, &body);
    assert!(!body.contains("disk I/O"));
}
