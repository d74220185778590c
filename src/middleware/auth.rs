use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_token, Claims};
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from a validated JWT.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = ApiError;

    fn try_from(claims: Claims) -> Result<Self, ApiError> {
        let role = Role::parse(&claims.role)
            .ok_or_else(|| ApiError::unauthorized("Unknown role in token"))?;
        Ok(Self {
            id: claims.sub,
            email: claims.email,
            role,
        })
    }
}

/// JWT authentication middleware: validates the bearer token and injects
/// an `AuthUser` extension for downstream handlers.
pub async fn jwt_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let claims = validate_token(&token, &state.config.security.jwt_secret)?;
    let auth_user = AuthUser::try_from(claims)?;
    request.extensions_mut().insert(auth_user);
    Ok(next.run(request).await)
}

/// Gate for the review endpoints. Only the Prime Admin reviews admin
/// requests; runs after `jwt_auth` has injected the `AuthUser`.
pub async fn require_prime_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.role == Role::PrimeAdmin => Ok(next.run(request).await),
        Some(_) => Err(ApiError::forbidden(
            "Only the Prime Admin can review admin requests",
        )),
        None => Err(ApiError::unauthorized("Authentication required")),
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
