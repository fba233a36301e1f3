use actix_web::{
    http::{Method, StatusCode},
    web,
    web::ServiceConfig,
};
use chrono::{Local, NaiveDate};
use ods_common::Money;
use order_desk_engine::{
    order_objects::{FullOrder, LineRejection, LineResult, OrderArticle, OrderLine, OrderResult},
    OrderFlowApi,
};
use serde_json::json as json_value;

use super::{
    helpers::{article, assert_error, get_request, json, send_request, user_token},
    mocks::MockOrderManager,
};
use crate::routes::{
    CreateOrderArticleRoute,
    CreateOrderRoute,
    DeleteOrderRoute,
    GetOrderRoute,
    ListOrderArticlesRoute,
    ListOrdersRoute,
    PatchOrderRoute,
    ReplaceOrderRoute,
};

fn configure_with(mock: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(ListOrdersRoute::<MockOrderManager>::new())
            .service(CreateOrderRoute::<MockOrderManager>::new())
            .service(GetOrderRoute::<MockOrderManager>::new())
            .service(ReplaceOrderRoute::<MockOrderManager>::new())
            .service(PatchOrderRoute::<MockOrderManager>::new())
            .service(DeleteOrderRoute::<MockOrderManager>::new())
            .service(ListOrderArticlesRoute::<MockOrderManager>::new())
            .service(CreateOrderArticleRoute::<MockOrderManager>::new())
            .app_data(web::Data::new(OrderFlowApi::new(mock)));
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

fn order_77() -> FullOrder {
    FullOrder {
        id: 10,
        price: Money::from(77.0),
        tax_price: Money::from(77.77),
        creation_date: date(),
        articles: vec![OrderLine { id: 31, amount: 77, article: article(1, "AB-1", 1.0, 1.0) }],
    }
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_articles_by_reference()
        .withf(|r| r == "AB-1")
        .times(1)
        .returning(|_| Ok(vec![article(1, "AB-1", 1.0, 1.0)]));
    mock.expect_insert_order()
        .withf(|order, lookup| {
            order.articles.len() == 1 &&
                order.creation_date == Some(Local::now().date_naive()) &&
                lookup.resolve("AB-1").map(|a| a.id) == Ok(1)
        })
        .times(1)
        .returning(|_, _| {
            let accepted = LineResult::accepted(0, Some("AB-1".into()), Some(31));
            Ok(OrderResult { order: order_77(), line_results: vec![accepted] })
        });
    // Client-supplied totals are not part of the payload and are ignored
    let body = r#"{"articles": [{"reference": "AB-1", "amount": "77"}], "price": 1000, "tax_price": 1000}"#;
    let (status, body) =
        send_request(Method::POST, "/orders", &user_token(), Some(body), true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let value = json(&body);
    assert_eq!(value["url"], "http://desk.test/orders/10/");
    assert_eq!(value["price"], 77.0);
    assert_eq!(value["tax_price"], 77.77);
    assert_eq!(value["articles"][0]["id"], 31);
    assert_eq!(value["articles"][0]["amount"], 77);
    assert_eq!(value["articles"][0]["article"]["reference"], "AB-1");
    assert_eq!(
        value["line_results"],
        json_value!([{"position": 0, "reference": "AB-1", "line_item_id": 31, "status": "accepted"}])
    );
}

#[actix_web::test]
async fn unknown_references_are_reported() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_articles_by_reference().returning(|_| Ok(vec![]));
    mock.expect_insert_order().withf(|_, lookup| lookup.is_empty()).returning(|order, _| {
        let empty = FullOrder {
            id: 11,
            price: Money::default(),
            tax_price: Money::default(),
            creation_date: order.creation_date.unwrap(),
            articles: vec![],
        };
        let rejected = LineResult::rejected(0, Some("NOPE".into()), None, LineRejection::UnknownReference);
        Ok(OrderResult { order: empty, line_results: vec![rejected] })
    });
    let body = r#"{"articles": [{"reference": "NOPE", "amount": 1}], "creation_date": "2020-01-02"}"#;
    let (status, body) =
        send_request(Method::POST, "/orders", &user_token(), Some(body), true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let value = json(&body);
    assert_eq!(value["price"], 0.0);
    assert_eq!(value["creation_date"], "2020-01-02");
    assert_eq!(value["articles"], json_value!([]));
    assert_eq!(
        value["line_results"],
        json_value!([{"position": 0, "reference": "NOPE", "status": "rejected", "reason": "unknown_reference"}])
    );
}

#[actix_web::test]
async fn patch_without_lines_leaves_them_alone() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_articles_by_reference().never();
    mock.expect_update_order()
        .withf(|id, update, _| *id == 10 && update.articles.is_none() && update.creation_date.is_some())
        .returning(|_, _, _| Ok(Some(OrderResult { order: order_77(), line_results: vec![] })));
    let (status, body) = send_request(
        Method::PATCH,
        "/orders/10",
        &user_token(),
        Some(r#"{"creation_date": "2024-05-17"}"#),
        true,
        configure_with(mock),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(json(&body)["articles"][0]["amount"], 77);
}

#[actix_web::test]
async fn replace_only_resolves_new_lines() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_articles_by_reference()
        .withf(|r| r == "CD")
        .times(1)
        .returning(|_| Ok(vec![article(2, "CD", 2.0, 2.0)]));
    mock.expect_update_order()
        .withf(|id, update, _| *id == 10 && update.articles.as_ref().map(Vec::len) == Some(2))
        .returning(|_, _, _| Ok(Some(OrderResult { order: order_77(), line_results: vec![] })));
    let body = r#"{"articles": [{"id": 31, "amount": 66}, {"reference": "CD", "amount": 22}]}"#;
    let (status, body) =
        send_request(Method::PUT, "/orders/10", &user_token(), Some(body), true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[actix_web::test]
async fn replace_needs_lines() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(
        Method::PUT,
        "/orders/10",
        &user_token(),
        Some(r#"{"creation_date": "2024-05-17"}"#),
        true,
        configure_with(MockOrderManager::new()),
    )
    .await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
}

#[actix_web::test]
async fn missing_orders() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_order().returning(|_| Ok(None));
    let (status, body) = get_request("/orders/404", &user_token(), configure_with(mock)).await;
    assert_error(status, StatusCode::NOT_FOUND, &body);

    let mut mock = MockOrderManager::new();
    mock.expect_delete_order().returning(|_| Ok(false));
    let (status, body) =
        send_request(Method::DELETE, "/orders/404", &user_token(), None, true, configure_with(mock)).await;
    assert_error(status, StatusCode::NOT_FOUND, &body);
}

#[actix_web::test]
async fn delete_order() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_delete_order().withf(|id| *id == 10).times(1).returning(|_| Ok(true));
    let (status, _) =
        send_request(Method::DELETE, "/orders/10", &user_token(), None, true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn list_orders() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_orders().returning(|| Ok(vec![order_77()]));
    let (status, body) = get_request("/orders", &user_token(), configure_with(mock)).await;
    assert_eq!(status, StatusCode::OK);
    let value = json(&body);
    assert_eq!(value[0]["url"], "http://desk.test/orders/10/");
    assert!(value[0].get("line_results").is_none());
}

#[actix_web::test]
async fn line_items_need_a_known_reference() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_articles_by_reference().returning(|_| Ok(vec![]));
    mock.expect_insert_order_article().never();
    let body = r#"{"order": 10, "reference": "NOPE", "amount": 3}"#;
    let (status, body) =
        send_request(Method::POST, "/order-articles", &user_token(), Some(body), true, configure_with(mock)).await;
    assert_error(status, StatusCode::BAD_REQUEST, &body);
    assert!(body.contains("NOPE"));
}

#[actix_web::test]
async fn create_line_item() {
    let _ = env_logger::try_init().ok();
    let mut mock = MockOrderManager::new();
    mock.expect_fetch_articles_by_reference().returning(|_| Ok(vec![article(2, "CD", 2.0, 2.0)]));
    mock.expect_insert_order_article()
        .withf(|line| line.order_id == 10 && line.article_id == 2 && line.amount == 3)
        .returning(|line| {
            Ok(OrderArticle { id: 40, order: line.order_id, amount: line.amount, article: article(2, "CD", 2.0, 2.0) })
        });
    let body = r#"{"order": 10, "reference": "CD", "amount": "3"}"#;
    let (status, body) =
        send_request(Method::POST, "/order-articles", &user_token(), Some(body), true, configure_with(mock)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let value = json(&body);
    assert_eq!(value["id"], 40);
    assert_eq!(value["order"], 10);
    assert!(value.get("url").is_none());
}
