use super::actor::{Actor, Role};
use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub email: String,      // User email
    pub name: String,       // User name
    pub roles: Vec<String>, // User roles
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
}

impl JwtClaims {
    /// Resolve the claims into the request principal.
    pub fn to_actor(&self) -> eyre::Result<Actor> {
        let id = Uuid::parse_str(&self.sub)?;
        let role = if self.roles.iter().any(|r| r == "admin") {
            Role::Admin
        } else {
            self.roles
                .first()
                .and_then(|r| Role::from_str(r).ok())
                .unwrap_or_default()
        };

        Ok(Actor {
            id,
            name: self.name.clone(),
            email: self.email.clone(),
            role,
        })
    }
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies stateless session tokens.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
    ttl_seconds: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let keys = Keys {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        };

        tracing::info!(ttl_days = config.expires_in_days, "JWT auth initialized");
        Self {
            keys: Arc::new(keys),
            ttl_seconds: config.ttl_seconds(),
        }
    }

    /// Lifetime of issued tokens; the auth cookie uses the same value as `Max-Age`.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token for `actor`.
    pub fn issue(&self, actor: &Actor) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: actor.id.to_string(),
            email: actor.email.clone(),
            name: actor.name.clone(),
            roles: vec![actor.role.to_string()],
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(Algorithm::HS256);
        let token = encode(&header, &claims, &self.keys.encoding)?;
        Ok(token)
    }

    /// Verify the signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.keys.decoding,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}
