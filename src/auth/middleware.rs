use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, HttpResponse,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::identity::{require_active, resolve};
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;

/// Paths reachable without a bearer token.
const PUBLIC_PATHS: [&str; 2] = ["/api/v1/login/access-token", "/api/v1/users/signup"];

/// Resolves the bearer token on every protected request and stores the
/// resulting `User` in the request extensions. Rejections are rendered as
/// responses here, so outer middleware still sees them.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_owned)
}

async fn authenticate(
    state: Option<web::Data<AppState>>,
    token: Option<String>,
) -> Result<User, AppError> {
    let state = state.ok_or_else(|| {
        AppError::InternalServerError("Application state is not configured".into())
    })?;
    let token = token.ok_or_else(|| AppError::Unauthorized("Not authenticated".into()))?;

    let user = resolve(state.store.as_ref(), &state.tokens, &token).await?;
    require_active(user)
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.iter().any(|path| *path == req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let token = bearer_token(&req);
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authenticate(state, token).await {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    log::debug!("rejected request to {}: {}", req.path(), err);
                    let response = HttpResponse::from_error(err);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
