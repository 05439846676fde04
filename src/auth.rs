// src/auth.rs
use crate::core::Database;
use crate::database::UserRoleRepository;
use crate::session::SessionHub;
use crate::types::{Role, Session, SessionUser};
use anyhow::Result;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Access-token claims issued by the hosted identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub exp: usize, // Expiration timestamp
    pub iat: usize, // Issued at timestamp
}

pub struct AuthConfig {
    secret: String,
    pub audience: String,
    pub issuer: Option<String>,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, audience: impl Into<String>, issuer: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            audience: audience.into(),
            issuer,
        }
    }

    /// Verify an HS256 access token and return who it belongs to along with
    /// its expiry.
    pub fn verify_token(&self, token: &str) -> Result<(SessionUser, i64)> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.audience]);
        if let Some(issuer) = &self.issuer {
            // A token without `iss` must not slip past the issuer check.
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        let claims = token_data.claims;

        if claims.sub.trim().is_empty() {
            anyhow::bail!("Token has an empty subject");
        }

        Ok((
            SessionUser {
                id: claims.sub,
                email: claims.email,
            },
            claims.exp as i64,
        ))
    }
}

/// Caller identity with the role registered for it, if any.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: SessionUser,
    pub role: Option<Role>,
}

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        match self.role {
            Some(r) if r == role => Ok(()),
            Some(r) => {
                warn!(
                    "User {} with role {} tried a {} action",
                    self.user.id, r, role
                );
                Err(AuthError::Forbidden)
            }
            None => Err(AuthError::RoleRequired),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = AuthError;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_config = match req.guard::<&State<AuthConfig>>().await {
            Outcome::Success(config) => config,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let db = match req.guard::<&State<Database>>().await {
            Outcome::Success(db) => db,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let hub = match req.guard::<&State<SessionHub>>().await {
            Outcome::Success(hub) => hub,
            Outcome::Error((status, _)) => return Outcome::Error((status, AuthError::DatabaseError)),
            Outcome::Forward(f) => return Outcome::Forward(f),
        };

        let token = match req.headers().get_one("Authorization") {
            Some(header) => match header.strip_prefix("Bearer ") {
                Some(token) => token.trim(),
                None => {
                    warn!("Invalid Authorization header format");
                    return fail(req, Status::Unauthorized, AuthError::InvalidToken);
                }
            },
            None => {
                debug!("Missing Authorization header");
                return fail(req, Status::Unauthorized, AuthError::MissingToken);
            }
        };

        let (user, expires_at) = match auth_config.verify_token(token) {
            Ok(verified) => verified,
            Err(e) => {
                warn!("Token verification failed: {}", e);
                return fail(req, Status::Unauthorized, AuthError::TokenVerificationFailed);
            }
        };

        let role = match UserRoleRepository::new(db.pool()).find(&user.id).await {
            Ok(found) => found.map(|r| r.role),
            Err(e) => {
                error!("Failed to load role for {}: {}", user.id, e);
                return fail(req, Status::InternalServerError, AuthError::DatabaseError);
            }
        };

        hub.sign_in(Session {
            user: user.clone(),
            role,
            expires_at,
        })
        .await;

        Outcome::Success(AuthenticatedUser { user, role })
    }
}

/// Remember why authentication failed so the catcher can say so.
fn fail<'r>(
    req: &'r Request<'_>,
    status: Status,
    err: AuthError,
) -> Outcome<AuthenticatedUser, AuthError> {
    req.local_cache(|| Some(err));
    Outcome::Error((status, err))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    TokenVerificationFailed,
    RoleRequired,
    Forbidden,
    DatabaseError,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "Authorization token required",
            AuthError::InvalidToken => "Invalid authorization token format",
            AuthError::TokenVerificationFailed => "Token verification failed",
            AuthError::RoleRequired => "Choose a role before using this feature",
            AuthError::Forbidden => "Your role does not allow this action",
            AuthError::DatabaseError => "Database error occurred",
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => "AUTHENTICATION_REQUIRED",
            AuthError::TokenVerificationFailed => "INVALID_TOKEN",
            AuthError::RoleRequired => "ROLE_REQUIRED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::DatabaseError => "DATABASE_ERROR",
        }
    }

    pub fn status(&self) -> Status {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenVerificationFailed => Status::Unauthorized,
            AuthError::RoleRequired | AuthError::Forbidden => Status::Forbidden,
            AuthError::DatabaseError => Status::InternalServerError,
        }
    }
}
