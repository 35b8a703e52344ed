//! Authentication middleware and credential parsing

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::api::error::ApiError;
use crate::api::AppState;
use crate::auth::password::{verify_decoy, verify_password};
use crate::error::Result;
use crate::models::User;
use crate::store::UserStore;

/// Email and password taken from an `Authorization: Basic` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The user the guard resolved, stored in request extensions
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Parse an `Authorization` header value of the form `Basic base64(email:password)`
pub fn parse_basic_credentials(value: &str) -> Option<Credentials> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    // Passwords may contain ':' but emails may not
    let (email, password) = decoded.split_once(':')?;

    Some(Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// Extract credentials from request headers
pub fn extract_credentials(headers: &HeaderMap) -> Option<Credentials> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_basic_credentials)
}

/// Resolve the user behind the request's Basic credentials.
///
/// `Ok(None)` covers every authentication failure (no header, unknown email,
/// wrong password); the reason is logged but not returned. `Err` is reserved
/// for store failures. Unknown emails still pay for one bcrypt check at
/// `bcrypt_cost`.
pub async fn authenticate(
    users: &dyn UserStore,
    headers: &HeaderMap,
    bcrypt_cost: u32,
) -> Result<Option<User>> {
    let Some(credentials) = extract_credentials(headers) else {
        tracing::warn!("Authentication failed: no Basic credentials supplied");
        return Ok(None);
    };

    let Some(user) = users.find_user_by_email(&credentials.email).await? else {
        tracing::warn!("Authentication failed: no user with email {}", credentials.email);
        verify_decoy(credentials.password, bcrypt_cost).await?;
        return Ok(None);
    };

    if !verify_password(credentials.password, user.password_hash.clone()).await? {
        tracing::warn!("Authentication failed: wrong password for {}", user.email_address);
        return Ok(None);
    }

    tracing::debug!("Authenticated user {}", user.id);
    Ok(Some(user))
}

/// Middleware for requiring authentication
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    let user = authenticate(state.stores.users.as_ref(), req.headers(), state.auth.bcrypt_cost)
        .await?
        .ok_or_else(|| ApiError::Unauthenticated {
            realm: state.auth.realm.clone(),
        })?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(raw: &str) -> String {
        format!("Basic {}", STANDARD.encode(raw))
    }

    #[test]
    fn test_parse_basic_credentials() {
        let credentials = parse_basic_credentials(&basic("joe@smith.com:joepassword")).unwrap();
        assert_eq!(credentials.email, "joe@smith.com");
        assert_eq!(credentials.password, "joepassword");
    }

    #[test]
    fn test_password_may_contain_colon() {
        let credentials = parse_basic_credentials(&basic("joe@smith.com:pa:ss")).unwrap();
        assert_eq!(credentials.password, "pa:ss");
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let header = format!("basic {}", STANDARD.encode("joe@smith.com:pw"));
        assert!(parse_basic_credentials(&header).is_some());
    }

    #[test]
    fn test_rejects_other_schemes_and_garbage() {
        assert!(parse_basic_credentials("Bearer abc.def.ghi").is_none());
        assert!(parse_basic_credentials("Basic !!!notbase64").is_none());
        assert!(parse_basic_credentials(&basic("no-separator")).is_none());
        assert!(parse_basic_credentials("Basic").is_none());
    }

    #[test]
    fn test_extract_credentials_no_header() {
        assert!(extract_credentials(&HeaderMap::new()).is_none());
    }
}
