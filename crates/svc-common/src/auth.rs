use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
};
use domain::authz::{Claims as DomainClaims, Permissions};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::types::{TenantId, UserId, UserType};

/// JWT claims, per the wire contract: `{sub: user_id, tenant_id, user_type,
/// permissions, exp}`. `permissions` is a snapshot taken at login time — a
/// mid-session grant only takes effect on the next login, same as `user_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: UserId,
    pub tenant_id: TenantId,
    pub user_type: UserType,
    #[serde(default)]
    pub permissions: Permissions,
    pub exp: usize,
}

impl JwtClaims {
    pub fn new(
        user_id: UserId,
        tenant_id: TenantId,
        user_type: UserType,
        permissions: Permissions,
        expires_in_hours: i64,
    ) -> Self {
        let exp = (chrono::Utc::now() + chrono::Duration::hours(expires_in_hours)).timestamp() as usize;
        Self {
            sub: user_id,
            tenant_id,
            user_type,
            permissions,
            exp,
        }
    }

    /// The authorization-layer view of this token, used by `domain::authz::authorize`.
    pub fn to_domain_claims(&self) -> DomainClaims {
        DomainClaims {
            user_id: self.sub,
            tenant_id: self.tenant_id,
            user_type: self.user_type,
        }
    }
}

pub fn create_token(claims: &JwtClaims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
    let data = decode::<JwtClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::default())?;
    Ok(data.claims)
}

/// Implemented by each service's `AppState` so the `AuthUser` extractor can
/// find the JWT secret without depending on any particular state type.
pub trait JwtSecretProvider {
    fn jwt_secret(&self) -> &str;
}

/// The authenticated caller, extracted from a verified bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub claims_sub: UserId,
    pub tenant_id: TenantId,
    pub user_type: UserType,
    pub permissions: Permissions,
}

impl AuthUser {
    pub fn domain_claims(&self) -> DomainClaims {
        DomainClaims {
            user_id: self.claims_sub,
            tenant_id: self.tenant_id,
            user_type: self.user_type,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    S: JwtSecretProvider,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or((StatusCode::UNAUTHORIZED, "missing authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or((StatusCode::UNAUTHORIZED, "invalid authorization header"))?;

        let claims = verify_token(token, state.jwt_secret())
            .map_err(|_| (StatusCode::UNAUTHORIZED, "invalid or expired token"))?;

        Ok(AuthUser {
            claims_sub: claims.sub,
            tenant_id: claims.tenant_id,
            user_type: claims.user_type,
            permissions: claims.permissions,
        })
    }
}
