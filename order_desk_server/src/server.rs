use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{Logger, NormalizePath},
    web,
    App,
    HttpServer,
};
use log::{info, warn};
use order_desk_engine::{
    AccountApi,
    AccountManagement,
    AuthApi,
    AuthManagement,
    CatalogApi,
    CatalogManagement,
    OrderFlowApi,
    OrderManagement,
    SqliteDatabase,
};

use crate::{
    auth::TokenIssuer,
    config::{AdminCredentials, AuthConfig, ServerConfig},
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    routes::*,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🗃️ Database at {} is ready", db.url());
    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(&db, admin).await?;
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

async fn bootstrap_admin<B>(db: &B, admin: &AdminCredentials) -> Result<(), ServerError>
where B: AccountManagement + Clone {
    let api = AccountApi::new(db.clone());
    let created = api.ensure_admin(&admin.username, admin.password.reveal()).await?;
    if created {
        warn!("🧑️ Created the bootstrap administrator account, {}", admin.username);
    } else {
        info!("🧑️ Bootstrap administrator {} already exists", admin.username);
    }
    Ok(())
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let db = db.clone();
        let auth = config.auth.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ods::access_log"))
            .wrap(NormalizePath::trim())
            .configure(move |cfg| configure_app(cfg, db, &auth))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the API objects, the JSON error handler and every route on `cfg`.
///
/// `/health` and `/auth` are public. Everything else sits behind the JWT middleware, and each route then applies its
/// own role requirements.
pub fn configure_app<B>(cfg: &mut web::ServiceConfig, db: B, auth: &AuthConfig)
where B: CatalogManagement + OrderManagement + AccountManagement + AuthManagement + Clone + 'static {
    let issuer = TokenIssuer::new(auth);
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let protected = web::scope("")
        .wrap(JwtMiddlewareFactory::new(issuer.clone()))
        .service(ListArticlesRoute::<B>::new())
        .service(CreateArticleRoute::<B>::new())
        .service(GetArticleRoute::<B>::new())
        .service(ReplaceArticleRoute::<B>::new())
        .service(PatchArticleRoute::<B>::new())
        .service(DeleteArticleRoute::<B>::new())
        .service(ListOrdersRoute::<B>::new())
        .service(CreateOrderRoute::<B>::new())
        .service(GetOrderRoute::<B>::new())
        .service(ReplaceOrderRoute::<B>::new())
        .service(PatchOrderRoute::<B>::new())
        .service(DeleteOrderRoute::<B>::new())
        .service(ListOrderArticlesRoute::<B>::new())
        .service(CreateOrderArticleRoute::<B>::new())
        .service(GetOrderArticleRoute::<B>::new())
        .service(ReplaceOrderArticleRoute::<B>::new())
        .service(PatchOrderArticleRoute::<B>::new())
        .service(DeleteOrderArticleRoute::<B>::new())
        .service(ListUsersRoute::<B>::new())
        .service(CreateUserRoute::<B>::new())
        .service(GetUserRoute::<B>::new())
        .service(ReplaceUserRoute::<B>::new())
        .service(PatchUserRoute::<B>::new())
        .service(DeleteUserRoute::<B>::new())
        .service(ListGroupsRoute::<B>::new())
        .service(CreateGroupRoute::<B>::new())
        .service(GetGroupRoute::<B>::new())
        .service(ReplaceGroupRoute::<B>::new())
        .service(PatchGroupRoute::<B>::new())
        .service(DeleteGroupRoute::<B>::new());
    cfg.app_data(json_config)
        .app_data(web::Data::new(CatalogApi::new(db.clone())))
        .app_data(web::Data::new(OrderFlowApi::new(db.clone())))
        .app_data(web::Data::new(AccountApi::new(db.clone())))
        .app_data(web::Data::new(AuthApi::new(db)))
        .app_data(web::Data::new(issuer))
        .service(health)
        .service(AuthRoute::<B>::new())
        .service(protected);
}
