use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use ephemail_core::AppError;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn require_admin_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if let Err(error) = authorize_bearer(request.headers(), &state.admin_token) {
        warn!(path = %request.uri().path(), "rejected admin request");
        return Err(error.into());
    }

    Ok(next.run(request).await)
}

pub(crate) fn authorize_bearer(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| AppError::Unauthorized("admin bearer token required".to_owned()))?;

    if expected_token.is_empty()
        || !constant_time_eq(provided.as_bytes(), expected_token.as_bytes())
    {
        return Err(AppError::Unauthorized("invalid admin token".to_owned()));
    }

    Ok(())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
        == 0
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue, header};
    use ephemail_core::AppError;

    use super::authorize_bearer;

    const TOKEN: &str = "0123456789abcdef-admin";

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn matching_bearer_token_is_accepted() {
        let headers = headers_with("Bearer 0123456789abcdef-admin");
        assert!(authorize_bearer(&headers, TOKEN).is_ok());
    }

    #[test]
    fn missing_or_wrong_token_is_unauthorized() {
        assert!(matches!(
            authorize_bearer(&HeaderMap::new(), TOKEN),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize_bearer(&headers_with("Bearer 0123456789abcdef-admiN"), TOKEN),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            authorize_bearer(&headers_with("Basic 0123456789abcdef-admin"), TOKEN),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn empty_expected_token_rejects_everything() {
        assert!(authorize_bearer(&headers_with("Bearer "), "").is_err());
    }
}
