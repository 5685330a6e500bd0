use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub mailchimp: MailchimpConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailchimpConfig {
    /// Upstream base URL; `{dc}` is replaced with the key's data center.
    pub api_base: String,
    /// Basic-auth username. Mailchimp ignores it, only the key matters.
    pub auth_username: String,
    pub request_timeout_secs: u64,
    /// Hard stop for paginated loops against a misbehaving upstream.
    pub max_pages: usize,
    pub member_page_size: usize,
    pub tagged_member_page_size: usize,
    pub template_page_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    pub max_webhook_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
}

impl MailchimpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(port) = env::var("MAILCHIMP_PROXY_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|v| v.parse().ok())
        {
            self.server.port = port;
        }

        // Mailchimp overrides
        if let Ok(v) = env::var("MAILCHIMP_API_BASE") {
            self.mailchimp.api_base = v;
        }
        if let Ok(v) = env::var("MAILCHIMP_AUTH_USERNAME") {
            self.mailchimp.auth_username = v;
        }
        if let Ok(v) = env::var("MAILCHIMP_REQUEST_TIMEOUT_SECS") {
            self.mailchimp.request_timeout_secs = v.parse().unwrap_or(self.mailchimp.request_timeout_secs);
        }
        if let Ok(v) = env::var("MAILCHIMP_MAX_PAGES") {
            self.mailchimp.max_pages = v.parse().unwrap_or(self.mailchimp.max_pages);
        }
        if let Ok(v) = env::var("MAILCHIMP_MEMBER_PAGE_SIZE") {
            self.mailchimp.member_page_size = v.parse().unwrap_or(self.mailchimp.member_page_size);
        }
        if let Ok(v) = env::var("MAILCHIMP_TAGGED_MEMBER_PAGE_SIZE") {
            self.mailchimp.tagged_member_page_size = v.parse().unwrap_or(self.mailchimp.tagged_member_page_size);
        }
        if let Ok(v) = env::var("MAILCHIMP_TEMPLATE_PAGE_SIZE") {
            self.mailchimp.template_page_size = v.parse().unwrap_or(self.mailchimp.template_page_size);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_MAX_WEBHOOK_SIZE_BYTES") {
            self.api.max_webhook_size_bytes = v.parse().unwrap_or(self.api.max_webhook_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self
    }

    fn mailchimp_defaults(request_timeout_secs: u64) -> MailchimpConfig {
        MailchimpConfig {
            api_base: "https://{dc}.api.mailchimp.com/3.0".to_string(),
            auth_username: "anystring".to_string(),
            request_timeout_secs,
            max_pages: 1000,
            member_page_size: 100,
            tagged_member_page_size: 500,
            template_page_size: 300,
        }
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            mailchimp: Self::mailchimp_defaults(30),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 100 * 1024 * 1024, // 100MB
                max_webhook_size_bytes: 500 * 1024 * 1024, // 500MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            mailchimp: Self::mailchimp_defaults(20),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 50 * 1024 * 1024, // 50MB
                max_webhook_size_bytes: 100 * 1024 * 1024, // 100MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            mailchimp: Self::mailchimp_defaults(15),
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                max_webhook_size_bytes: 50 * 1024 * 1024, // 50MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
