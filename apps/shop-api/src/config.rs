use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_or_default, env_parse, server::ServerConfig,
};
use database::mongodb::MongoConfig;
use domain_cart::{DEFAULT_ABANDONED_HOURS, MAX_ABANDONED_HOURS};
use storage::StorageConfig;

pub use core_config::Environment;

/// Shop-level settings that no shared library owns
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShopConfig {
    /// Storefront base URL used in email links
    pub client_url: String,
    /// Recipient of contact form notifications
    pub admin_email: String,
    /// Default idle threshold for the abandoned cart sweep
    pub abandoned_cart_hours: i64,
}

impl FromEnv for ShopConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let abandoned_cart_hours = env_parse("ABANDONED_CART_HOURS", DEFAULT_ABANDONED_HOURS)?;
        if !(1..=MAX_ABANDONED_HOURS).contains(&abandoned_cart_hours) {
            return Err(ConfigError::ParseError {
                key: "ABANDONED_CART_HOURS".to_string(),
                details: format!("must be between 1 and {}", MAX_ABANDONED_HOURS),
            });
        }

        Ok(Self {
            client_url: env_or_default("CLIENT_URL", "http://localhost:3000"),
            admin_email: env_or_default("ADMIN_EMAIL", "admin@localhost"),
            abandoned_cart_hours,
        })
    }
}

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub shop: ShopConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;
        let storage = StorageConfig::from_env()?;
        let shop = ShopConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            jwt,
            storage,
            shop,
            environment,
        })
    }

    /// Auth cookies carry `Secure` only behind TLS
    pub fn secure_cookies(&self) -> bool {
        self.environment.use_https()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_config_defaults() {
        temp_env::with_vars_unset(
            ["CLIENT_URL", "ADMIN_EMAIL", "ABANDONED_CART_HOURS"],
            || {
                let config = ShopConfig::from_env().unwrap();
                assert_eq!(config.client_url, "http://localhost:3000");
                assert_eq!(config.admin_email, "admin@localhost");
                assert_eq!(config.abandoned_cart_hours, 24);
            },
        );
    }

    #[test]
    fn test_shop_config_from_env() {
        temp_env::with_vars(
            [
                ("CLIENT_URL", Some("https://tornadowatches.com")),
                ("ADMIN_EMAIL", Some("orders@tornadowatches.com")),
                ("ABANDONED_CART_HOURS", Some("48")),
            ],
            || {
                let config = ShopConfig::from_env().unwrap();
                assert_eq!(config.client_url, "https://tornadowatches.com");
                assert_eq!(config.admin_email, "orders@tornadowatches.com");
                assert_eq!(config.abandoned_cart_hours, 48);
            },
        );
    }

    #[test]
    fn test_shop_config_rejects_bad_threshold() {
        temp_env::with_var("ABANDONED_CART_HOURS", Some("soon"), || {
            let err = ShopConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("ABANDONED_CART_HOURS"));
        });

        temp_env::with_var("ABANDONED_CART_HOURS", Some("0"), || {
            assert!(ShopConfig::from_env().is_err());
        });

        temp_env::with_var("ABANDONED_CART_HOURS", Some("1000000000000"), || {
            let err = ShopConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("must be between 1 and 8760"));
        });

        temp_env::with_var("ABANDONED_CART_HOURS", Some("8760"), || {
            assert_eq!(ShopConfig::from_env().unwrap().abandoned_cart_hours, 8_760);
        });
    }
}
