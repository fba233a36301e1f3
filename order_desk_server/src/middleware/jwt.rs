//! Bearer token middleware.
//!
//! Reads the `Authorization: Bearer <token>` header, verifies the token with the [`TokenIssuer`] and stores the
//! resulting [`JwtClaims`] in the request extensions, where [`crate::middleware::AclMiddlewareFactory`] and handlers
//! can find them. Requests without a valid token are rejected with 401 Unauthorized.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{debug, trace};

use crate::{
    auth::{TokenIssuer, TOKEN_TYPE},
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    issuer: TokenIssuer,
}

impl JwtMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        JwtMiddlewareFactory { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { issuer: self.issuer.clone(), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    issuer: TokenIssuer,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = bearer_token(&req).and_then(|token| self.issuer.verify_token(token));
        Box::pin(async move {
            let claims = claims.map_err(|e| {
                debug!("🔐️ Denying access to {}. {e}", req.path());
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ Access token for {} accepted", claims.sub);
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<&str, AuthError> {
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::InvalidToken(e.to_string()))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case(TOKEN_TYPE) && !token.trim().is_empty() => {
            Ok(token.trim())
        },
        _ => Err(AuthError::InvalidToken("Expected a Bearer token".to_string())),
    }
}
