use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;

use crate::auth::extractors::claims_of;
use crate::error::AppError;
use crate::models::Role;

/// Authorization gate: lets a request through only if the claims attached by
/// `AuthMiddleware` carry the expected role.
///
/// Must be nested inside `AuthMiddleware`. Missing claims are answered with a
/// 500 because they mean the chain is misconfigured. A role mismatch is a 401
/// "unauthorized user".
#[derive(Debug, Clone, Copy)]
pub struct RequireRole {
    expected: Role,
}

impl RequireRole {
    pub fn new(expected: Role) -> Self {
        Self { expected }
    }

    pub fn admin() -> Self {
        Self::new(Role::Admin)
    }

    /// The check itself, usable outside the middleware.
    pub fn check(&self, req: &ServiceRequest) -> Result<(), AppError> {
        let claims = claims_of(req)?;
        if claims.role == self.expected {
            Ok(())
        } else {
            debug!(
                "user {} with role {} denied {} {}",
                claims.id,
                claims.role,
                req.method(),
                req.path()
            );
            Err(AppError::Unauthorized("unauthorized user".into()))
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            gate: *self,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    gate: RequireRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.gate.check(&req) {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = app_err.error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}
