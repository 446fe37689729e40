use axum::http::{header, HeaderMap};

use super::jwt::JwtService;

/// Opaque viewer identity for the current request, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewerIdentity(pub Option<String>);

/// Extract the viewer identity from a bearer token or the `auth_token`
/// cookie. Missing, invalid or expired tokens mean anonymous.
pub fn extract_identity(jwt_service: Option<&JwtService>, headers: &HeaderMap) -> ViewerIdentity {
    let Some(jwt) = jwt_service else {
        return ViewerIdentity(None);
    };

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(auth_token_cookie);

    let Some(token) = bearer.or(cookie) else {
        return ViewerIdentity(None);
    };

    match jwt.verify_token(token) {
        Ok(claims) => ViewerIdentity(Some(claims.sub)),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session token");
            ViewerIdentity(None)
        }
    }
}

fn auth_token_cookie(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .map(|s| s.trim())
        .find_map(|s| s.strip_prefix("auth_token="))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtService {
        JwtService::new("secret", "puzzlebox".to_string())
    }

    #[test]
    fn test_bearer_token() {
        let jwt = jwt();
        let token = jwt.create_token("user_9", chrono::Duration::hours(1)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(
            extract_identity(Some(&jwt), &headers),
            ViewerIdentity(Some("user_9".to_string()))
        );
    }

    #[test]
    fn test_cookie_token() {
        let jwt = jwt();
        let token = jwt.create_token("user_7", chrono::Duration::hours(1)).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; auth_token={token}")).unwrap(),
        );
        assert_eq!(
            extract_identity(Some(&jwt), &headers).0.as_deref(),
            Some("user_7")
        );
    }

    #[test]
    fn test_invalid_or_unconfigured_is_anonymous() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer nope"));
        assert_eq!(extract_identity(Some(&jwt()), &headers), ViewerIdentity(None));
        assert_eq!(extract_identity(None, &headers), ViewerIdentity(None));
    }
}
