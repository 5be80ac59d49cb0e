use url::Url;

use crate::auth::jwt::JwtConfig;
use crate::geocode::GeocodeConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development except
/// the JWT secret, which must always be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for in-flight requests on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Base URL relative category icon paths resolve against.
    pub public_base_url: Url,
    /// Icon shown for categories without one.
    pub default_icon_url: String,
    /// Where the header's "Login" link points.
    pub login_url: String,
    /// Row store backend selection.
    pub store: StoreConfig,
    /// Access token verification.
    pub jwt: JwtConfig,
    /// Reverse geocoding client settings.
    pub geocode: GeocodeConfig,
}

const DEFAULT_PUBLIC_BASE_URL: &str = "https://danielramirezopisso.github.io/thebestagain/";

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                 |
    /// |------------------------|-----------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                               |
    /// | `PORT`                 | `3000`                                  |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                 |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                                    |
    /// | `PUBLIC_BASE_URL`      | the public site root                    |
    /// | `DEFAULT_ICON_URL`     | `icons/default.svg` under the site root |
    /// | `LOGIN_URL`            | `login.html` under the site root        |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values, and when a nested config panics.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a custom variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins =
            split_list(&var("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()));

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let public_base_url = Url::parse(
            &var("PUBLIC_BASE_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.into()),
        )
        .expect("PUBLIC_BASE_URL must be an absolute URL");

        let default_icon_url = var("DEFAULT_ICON_URL")
            .unwrap_or_else(|| site_url(&public_base_url, "icons/default.svg"));
        let login_url =
            var("LOGIN_URL").unwrap_or_else(|| site_url(&public_base_url, "login.html"));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            public_base_url,
            default_icon_url,
            login_url,
            store: StoreConfig::from_vars(&var),
            jwt: JwtConfig::from_vars(&var),
            geocode: GeocodeConfig::from_vars(&var),
        }
    }
}

fn site_url(base: &Url, path: &str) -> String {
    base.join(path)
        .map(String::from)
        .unwrap_or_else(|_| path.to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Which [`tba_db::RowStore`] implementation backs the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// The hosted PostgREST-compatible store.
    Rest { base_url: String, anon_key: String },
    /// An in-process store, optionally seeded from a JSON file.
    Memory { seed_path: Option<String> },
}

/// Row store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl StoreConfig {
    /// | Env Var             | Required            | Default |
    /// |---------------------|---------------------|---------|
    /// | `STORE_BACKEND`     | no                  | `rest`  |
    /// | `SUPABASE_URL`      | when backend `rest` | --      |
    /// | `SUPABASE_ANON_KEY` | when backend `rest` | --      |
    /// | `MEMORY_SEED_PATH`  | no                  | --      |
    ///
    /// # Panics
    ///
    /// Panics on an unknown backend or missing `rest` credentials.
    pub fn from_vars<F>(var: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("rest") => {
                let base_url =
                    var("SUPABASE_URL").expect("SUPABASE_URL must be set for the rest backend");
                let anon_key = var("SUPABASE_ANON_KEY")
                    .expect("SUPABASE_ANON_KEY must be set for the rest backend");
                assert!(!anon_key.is_empty(), "SUPABASE_ANON_KEY must not be empty");
                StoreBackend::Rest { base_url, anon_key }
            }
            Some("memory") => StoreBackend::Memory {
                seed_path: var("MEMORY_SEED_PATH").filter(|p| !p.trim().is_empty()),
            },
            Some(other) => panic!("STORE_BACKEND must be `rest` or `memory`, got `{other}`"),
        };
        Self { backend }
    }
}
