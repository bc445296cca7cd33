use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use shared_models::auth::{UserToken, TOKEN_HEADER};
use shared_models::error::AppError;

/// Requires the `token` header and exposes it to handlers as an `Extension<UserToken>`.
pub async fn token_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request)?;

    debug!("Session token present for {}", request.uri().path());
    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}

pub fn extract_token<B>(request: &Request<B>) -> Result<UserToken, AppError> {
    let value = request
        .headers()
        .get(TOKEN_HEADER)
        .ok_or_else(|| AppError::Auth("Login to continue".to_string()))?;

    let token = value
        .to_str()
        .map_err(|_| AppError::Auth("Invalid token header format".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Auth("Login to continue".to_string()));
    }

    Ok(UserToken::new(token))
}
