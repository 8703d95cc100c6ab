use core_config::{ConfigError, FromEnv, env_parse, env_required};

const MIN_SECRET_LEN: usize = 32;

/// JWT signing configuration.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_EXPIRES_IN_DAYS` (default 30), also used as the auth cookie lifetime
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_days: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expires_in_days: i64) -> Result<Self, ConfigError> {
        let secret = secret.into();
        validate_secret(&secret)?;

        if expires_in_days <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_EXPIRES_IN_DAYS".to_string(),
                details: "must be a positive number of days".to_string(),
            });
        }

        Ok(Self {
            secret,
            expires_in_days,
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.expires_in_days * 24 * 60 * 60
    }
}

fn validate_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        let expires_in_days = env_parse("JWT_EXPIRES_IN_DAYS", 30i64)?;
        Self::new(secret, expires_in_days)
    }
}
