use axum::{extract::{Request, State}, http::HeaderMap, middleware::Next, response::Response};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::identity::{Caller, UserRef};

use crate::errors::ApiError;
use crate::graphql::TrackSchema;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub auth: ServerAuthConfig,
    pub schema: TrackSchema,
}

/// Claims issued by the identity provider. `username` falls back to `sub`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub uid: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
}

impl Claims {
    pub fn into_user(self) -> UserRef {
        let username = self.username.filter(|u| !u.trim().is_empty()).unwrap_or(self.sub);
        UserRef { id: self.uid, username }
    }
}

/// Token from `Authorization: Bearer`, falling back to the `auth_token` cookie.
/// `Ok(None)` means no credentials at all.
pub fn extract_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    if let Some(h) = headers.get(axum::http::header::AUTHORIZATION) {
        let value = h.to_str().map_err(|_| ApiError::unauthorized("invalid Authorization header"))?;
        return match value.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
            _ => Err(ApiError::unauthorized("invalid Authorization format (expect Bearer)")),
        };
    }
    let jar = CookieJar::from_headers(headers);
    Ok(jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty()))
}

pub fn verify_token(token: &str, cfg: &ServerAuthConfig) -> Result<Claims, ApiError> {
    let key = DecodingKey::from_secret(cfg.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!(err = %e, "token validation failed");
            ApiError::unauthorized("invalid or expired token")
        })
}

/// No credentials → anonymous; credentials that fail verification → 401.
pub fn resolve_caller(headers: &HeaderMap, cfg: &ServerAuthConfig) -> Result<Caller, ApiError> {
    match extract_token(headers)? {
        None => Ok(Caller::Anonymous),
        Some(token) => Ok(Caller::User(verify_token(&token, cfg)?.into_user())),
    }
}

/// 中间件：解析调用者身份并注入 request 扩展，供 GraphQL handler 使用
pub async fn attach_caller(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = resolve_caller(req.headers(), &state.auth)?;
    if let Caller::User(u) = &caller {
        tracing::debug!(user_id = %u.id, path = %req.uri().path(), "caller resolved");
    }
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn cfg() -> ServerAuthConfig { ServerAuthConfig { jwt_secret: "unit-secret".into() } }

    fn mint(secret: &str, exp_offset_secs: i64, username: Option<&str>) -> (Uuid, String) {
        let uid = Uuid::new_v4();
        let exp = (chrono::Utc::now().timestamp() + exp_offset_secs) as usize;
        let claims = Claims { sub: "subject".into(), uid, username: username.map(Into::into), exp, iat: None };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap();
        (uid, token)
    }

    #[test]
    fn no_credentials_is_anonymous() {
        let caller = resolve_caller(&HeaderMap::new(), &cfg()).unwrap();
        assert!(caller.is_anonymous());
    }

    #[test]
    fn bearer_token_resolves_user() {
        let (uid, token) = mint("unit-secret", 600, Some("alice"));
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        let caller = resolve_caller(&headers, &cfg()).unwrap();
        assert_eq!(caller.user().map(|u| (u.id, u.username.as_str())), Some((uid, "alice")));
    }

    #[test]
    fn cookie_token_and_sub_fallback() {
        let (_, token) = mint("unit-secret", 600, None);
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(&format!("theme=dark; auth_token={token}")).unwrap());
        let caller = resolve_caller(&headers, &cfg()).unwrap();
        assert_eq!(caller.user().map(|u| u.username.as_str()), Some("subject"));
    }

    #[test]
    fn bad_tokens_are_rejected() {
        let (_, wrong_key) = mint("other-secret", 600, Some("x"));
        let (_, expired) = mint("unit-secret", -3600, Some("x"));
        for token in [wrong_key, expired, "garbage".to_string()] {
            let mut headers = HeaderMap::new();
            headers.insert("authorization", HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
            assert!(resolve_caller(&headers, &cfg()).is_err());
        }
        let mut basic = HeaderMap::new();
        basic.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(resolve_caller(&basic, &cfg()).is_err());
    }
}
