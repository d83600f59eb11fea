use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};

use crate::error::ApiError;
use crate::session::{SessionHandle, SessionToken};
use crate::state::AppState;

/// The authenticated session a request runs under.
#[derive(Clone)]
pub struct CurrentSession {
    pub token: SessionToken,
    pub handle: SessionHandle,
}

/// Reject requests without a live session; otherwise attach [`CurrentSession`].
pub async fn require_session(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| ApiError::Unauthorized)?;
    let token: SessionToken = bearer.token().parse().map_err(|_| ApiError::Unauthorized)?;
    let handle = state
        .sessions()
        .session(&token)
        .await
        .ok_or(ApiError::Unauthorized)?;

    request.extensions_mut().insert(CurrentSession { token, handle });
    Ok(next.run(request).await)
}
