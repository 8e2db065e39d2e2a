use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use videmaison::Claims;
use videmaison_core::{Error, error::AuthError};

use crate::error::ApiError;

/// Address used as the rate-limit key.
///
/// First entry of `X-Forwarded-For`, then `X-Real-IP`, then the socket peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let ip = header("X-Forwarded-For")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .or_else(|| header("X-Real-IP"))
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());

        ClientIp(ip)
    }
}

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIp::from_headers(&parts.headers, peer))
    }
}

/// Claims of a verified access token, placed in the request by the auth
/// middleware.
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser(claims))
    }
}

pub struct AdminUser(pub Claims);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            return Err(Error::from(AuthError::Forbidden).into());
        }

        Ok(AdminUser(claims))
    }
}

/// Raw bearer token, used where the token is not an access token (refresh).
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_token(&parts.headers)))
    }
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_forwarded_for_wins() {
        let ip = ClientIp::from_headers(
            &headers(&[
                ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
                ("x-real-ip", "198.51.100.2"),
            ]),
            Some("127.0.0.1:4000".parse().unwrap()),
        );
        assert_eq!(ip.0, "203.0.113.7");
    }

    #[test]
    fn test_real_ip_then_peer() {
        let peer: SocketAddr = "192.0.2.10:5555".parse().unwrap();
        assert_eq!(
            ClientIp::from_headers(&headers(&[("x-real-ip", "198.51.100.2")]), Some(peer)).0,
            "198.51.100.2"
        );
        assert_eq!(ClientIp::from_headers(&HeaderMap::new(), Some(peer)).0, "192.0.2.10");
        assert_eq!(ClientIp::from_headers(&HeaderMap::new(), None).0, "unknown");
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(
            bearer_token(&headers(&[("authorization", "Bearer abc.def")])).as_deref(),
            Some("abc.def")
        );
        assert_eq!(bearer_token(&headers(&[("authorization", "Basic Zm9v")])), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
