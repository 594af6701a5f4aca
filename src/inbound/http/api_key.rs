//! API key guard for the zone management routes.
//!
//! Requests must carry `X-API-Key` matching the configured key; a
//! missing or mismatched key short-circuits with the 401 envelope
//! before the handler runs.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error as ActixError;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error;
use crate::inbound::http::error::ApiError;

const API_KEY_HEADER: &str = "X-API-Key";

/// Guard middleware holding the configured key.
#[derive(Clone)]
pub struct ApiKeyGuard {
    key: Arc<str>,
}

impl ApiKeyGuard {
    pub fn new(key: impl Into<Arc<str>>) -> Self {
        Self { key: key.into() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = ApiKeyGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyGuardMiddleware {
            service,
            key: Arc::clone(&self.key),
        }))
    }
}

/// Service wrapper produced by [`ApiKeyGuard`].
pub struct ApiKeyGuardMiddleware<S> {
    service: S,
    key: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let presented = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        if presented != Some(self.key.as_ref()) {
            warn!(path = %req.path(), "request rejected: invalid api key");
            let rejection: ActixError =
                ApiError::from(Error::unauthorized("invalid api key")).into();
            return Box::pin(ready(Err(rejection)));
        }

        Box::pin(self.service.call(req))
    }
}
