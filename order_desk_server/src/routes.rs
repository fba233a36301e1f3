//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
//!
//! Several resources share a path (e.g. `GET /articles` and `POST /articles`). Each one carries a method guard, so the
//! router falls through to the next resource registered under the same path.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use order_desk_engine::{
    db_types::{ArticleUpdate, NewArticle, NewGroup, NewUser, Role, UserUpdate},
    order_objects::{NewOrder, NewOrderArticle, OrderArticleUpdate, OrderResult, OrderUpdate, ReplaceOrder},
    AccountApi,
    AccountManagement,
    AuthApi,
    AuthManagement,
    CatalogApi,
    CatalogManagement,
    OrderFlowApi,
    OrderManagement,
};

use crate::{
    auth::{JwtClaims, TokenIssuer, TOKEN_TYPE},
    data_objects::{AccessTokenResponse, Linked, LoginRequest},
    errors::ServerError,
    helpers::linked,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:path),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:path),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

fn not_found(kind: &str, id: i64) -> ServerError {
    debug!("💻️ {kind} #{id} does not exist");
    ServerError::NoRecordFound(format!("{kind} #{id} does not exist"))
}

fn deleted_or_not_found(deleted: bool, kind: &str, id: i64) -> Result<HttpResponse, ServerError> {
    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(not_found(kind, id))
    }
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(auth => Post "/auth" impl AuthManagement);
/// Route handler for the auth endpoint
///
/// This route is used to authenticate a local user and issue a JWT access token.
///
/// The body is a JSON object with `username` and `password` fields. On success, the server replies with
/// `{"access_token": "...", "token_type": "Bearer", "expires_in": <seconds>}`. Pass the token in the
/// `Authorization: Bearer <token>` header on every other request.
/// The token carries the user's roles and does NOT refresh.
pub async fn auth<A>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<A>>,
    signer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, ServerError>
where
    A: AuthManagement,
{
    let LoginRequest { username, password } = body.into_inner();
    trace!("💻️ Received auth request for {username}");
    let user = api.authenticate(&username, password.reveal()).await?;
    let access_token = signer.issue_token(&user)?;
    debug!("💻️ Issued access token for {username} with roles {:?}", user.roles);
    let response = AccessTokenResponse {
        access_token,
        token_type: TOKEN_TYPE.to_string(),
        expires_in: signer.lifetime().num_seconds(),
    };
    Ok(HttpResponse::Ok().json(response))
}

//----------------------------------------------   Articles  ----------------------------------------------------
route!(list_articles => Get "/articles" impl CatalogManagement where requires [Role::User]);
pub async fn list_articles<B: CatalogManagement>(
    req: HttpRequest,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET articles");
    let articles = api.articles().await?;
    let articles = articles.into_iter().map(|a| linked(&req, "articles", a.id, a)).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(articles))
}

route!(create_article => Post "/articles" impl CatalogManagement where requires [Role::User]);
pub async fn create_article<B: CatalogManagement>(
    req: HttpRequest,
    body: web::Json<NewArticle>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let article = api.create_article(body.into_inner()).await?;
    debug!("💻️ Created article #{} ({})", article.id, article.reference);
    Ok(HttpResponse::Created().json(linked(&req, "articles", article.id, article)))
}

route!(get_article => Get "/articles/{id}" impl CatalogManagement where requires [Role::User]);
pub async fn get_article<B: CatalogManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let article = api.article(id).await?.ok_or_else(|| not_found("Article", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "articles", id, article)))
}

route!(replace_article => Put "/articles/{id}" impl CatalogManagement where requires [Role::User]);
/// Replaces every field of an article. The creation date is kept when the body omits it.
pub async fn replace_article<B: CatalogManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<NewArticle>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let article = api.replace_article(id, body.into_inner()).await?.ok_or_else(|| not_found("Article", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "articles", id, article)))
}

route!(patch_article => Patch "/articles/{id}" impl CatalogManagement where requires [Role::User]);
pub async fn patch_article<B: CatalogManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ArticleUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let article = api.update_article(id, body.into_inner()).await?.ok_or_else(|| not_found("Article", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "articles", id, article)))
}

route!(delete_article => Delete "/articles/{id}" impl CatalogManagement where requires [Role::User]);
pub async fn delete_article<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let deleted = api.delete_article(id).await?;
    deleted_or_not_found(deleted, "Article", id)
}

//----------------------------------------------   Orders  ----------------------------------------------------
fn order_response(req: &HttpRequest, result: OrderResult) -> Linked<OrderResult> {
    let rejected = result.line_results.iter().filter(|r| !r.is_accepted()).count();
    if rejected > 0 {
        info!("💻️ {rejected} line(s) of order #{} were rejected", result.order.id);
    }
    linked(req, "orders", result.order.id, result)
}

route!(list_orders => Get "/orders" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn list_orders<B: OrderManagement + CatalogManagement>(
    req: HttpRequest,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET orders");
    let orders = api.orders().await?;
    let orders = orders.into_iter().map(|o| linked(&req, "orders", o.id, o)).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(orders))
}

route!(create_order => Post "/orders" impl OrderManagement, CatalogManagement where requires [Role::User]);
/// Creates an order from a list of `{reference, amount}` lines. Lines whose reference cannot be resolved are skipped
/// and reported in `line_results`; they do not fail the request. Client-supplied totals are ignored.
pub async fn create_order<B: OrderManagement + CatalogManagement>(
    req: HttpRequest,
    body: web::Json<NewOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let result = api.create_order(body.into_inner()).await?;
    debug!("💻️ Created order #{}", result.order.id);
    Ok(HttpResponse::Created().json(order_response(&req, result)))
}

route!(get_order => Get "/orders/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn get_order<B: OrderManagement + CatalogManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let order = api.order(id).await?.ok_or_else(|| not_found("Order", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "orders", id, order)))
}

route!(replace_order => Put "/orders/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
/// Reconciles the order's line items against the `articles` list in the body. Lines carrying an `id` update the
/// matching line item, lines without one are added, and existing line items that are not mentioned are removed.
pub async fn replace_order<B: OrderManagement + CatalogManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ReplaceOrder>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let result = api.replace_order(id, body.into_inner()).await?.ok_or_else(|| not_found("Order", id))?;
    Ok(HttpResponse::Ok().json(order_response(&req, result)))
}

route!(patch_order => Patch "/orders/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
/// Same as `PUT`, except that omitting `articles` leaves the line items alone.
pub async fn patch_order<B: OrderManagement + CatalogManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<OrderUpdate>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let result = api.update_order(id, body.into_inner()).await?.ok_or_else(|| not_found("Order", id))?;
    Ok(HttpResponse::Ok().json(order_response(&req, result)))
}

route!(delete_order => Delete "/orders/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn delete_order<B: OrderManagement + CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let deleted = api.delete_order(id).await?;
    deleted_or_not_found(deleted, "Order", id)
}

//----------------------------------------------   Order Articles  ----------------------------------------------------
route!(list_order_articles => Get "/order-articles" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn list_order_articles<B: OrderManagement + CatalogManagement>(
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let lines = api.order_articles().await?;
    Ok(HttpResponse::Ok().json(lines))
}

route!(create_order_article => Post "/order-articles" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn create_order_article<B: OrderManagement + CatalogManagement>(
    body: web::Json<NewOrderArticle>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let line = api.create_order_article(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(line))
}

route!(get_order_article => Get "/order-articles/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn get_order_article<B: OrderManagement + CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let line = api.order_article(id).await?.ok_or_else(|| not_found("Line item", id))?;
    Ok(HttpResponse::Ok().json(line))
}

route!(replace_order_article => Put "/order-articles/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn replace_order_article<B: OrderManagement + CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<NewOrderArticle>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let line = api.replace_order_article(id, body.into_inner()).await?.ok_or_else(|| not_found("Line item", id))?;
    Ok(HttpResponse::Ok().json(line))
}

route!(patch_order_article => Patch "/order-articles/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn patch_order_article<B: OrderManagement + CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<OrderArticleUpdate>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let line = api.update_order_article(id, body.into_inner()).await?.ok_or_else(|| not_found("Line item", id))?;
    Ok(HttpResponse::Ok().json(line))
}

route!(delete_order_article => Delete "/order-articles/{id}" impl OrderManagement, CatalogManagement where requires [Role::User]);
pub async fn delete_order_article<B: OrderManagement + CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let deleted = api.delete_order_article(id).await?;
    deleted_or_not_found(deleted, "Line item", id)
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(list_users => Get "/users" impl AccountManagement where requires [Role::Admin]);
pub async fn list_users<B: AccountManagement>(
    req: HttpRequest,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let users = api.users().await?;
    let users = users.into_iter().map(|u| linked(&req, "users", u.id, u)).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(users))
}

route!(create_user => Post "/users" impl AccountManagement where requires [Role::Admin]);
pub async fn create_user<B: AccountManagement>(
    claims: JwtClaims,
    req: HttpRequest,
    body: web::Json<NewUser>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = api.create_user(body.into_inner()).await?;
    info!("💻️ {} created user #{} ({})", claims.sub, user.id, user.username);
    Ok(HttpResponse::Created().json(linked(&req, "users", user.id, user)))
}

route!(get_user => Get "/users/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn get_user<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let user = api.user(id).await?.ok_or_else(|| not_found("User", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "users", id, user)))
}

route!(replace_user => Put "/users/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn replace_user<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<NewUser>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let user = api.replace_user(id, body.into_inner()).await?.ok_or_else(|| not_found("User", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "users", id, user)))
}

route!(patch_user => Patch "/users/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn patch_user<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UserUpdate>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let user = api.update_user(id, body.into_inner()).await?.ok_or_else(|| not_found("User", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "users", id, user)))
}

route!(delete_user => Delete "/users/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn delete_user<B: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let deleted = api.delete_user(id).await?;
    if deleted {
        info!("💻️ {} deleted user #{id}", claims.sub);
    }
    deleted_or_not_found(deleted, "User", id)
}

//----------------------------------------------   Groups  ----------------------------------------------------
route!(list_groups => Get "/groups" impl AccountManagement where requires [Role::Admin]);
pub async fn list_groups<B: AccountManagement>(
    req: HttpRequest,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let groups = api.groups().await?;
    let groups = groups.into_iter().map(|g| linked(&req, "groups", g.id, g)).collect::<Vec<_>>();
    Ok(HttpResponse::Ok().json(groups))
}

route!(create_group => Post "/groups" impl AccountManagement where requires [Role::Admin]);
pub async fn create_group<B: AccountManagement>(
    req: HttpRequest,
    body: web::Json<NewGroup>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group = api.create_group(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(linked(&req, "groups", group.id, group)))
}

route!(get_group => Get "/groups/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn get_group<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let group = api.group(id).await?.ok_or_else(|| not_found("Group", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "groups", id, group)))
}

route!(replace_group => Put "/groups/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn replace_group<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<NewGroup>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let group = api.update_group(id, body.into_inner()).await?.ok_or_else(|| not_found("Group", id))?;
    Ok(HttpResponse::Ok().json(linked(&req, "groups", id, group)))
}

// A group only has a name, so PATCH and PUT do the same thing.
route!(patch_group => Patch "/groups/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn patch_group<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<NewGroup>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    replace_group(req, path, body, api).await
}

route!(delete_group => Delete "/groups/{id}" impl AccountManagement where requires [Role::Admin]);
pub async fn delete_group<B: AccountManagement>(
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let deleted = api.delete_group(id).await?;
    deleted_or_not_found(deleted, "Group", id)
}
