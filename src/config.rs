use anyhow::{Context, Result, bail};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// OAuth2 client id for the Drive API.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Public base URL of this server; the OAuth2 redirect URI is
    /// `{server_url}/auth/oauth2callback`.
    pub server_url: String,
    /// Browser origin allowed by CORS and used for the post-login redirect.
    pub origin: String,
    /// Default parent folder id for listing, upload and create-folder.
    pub root_folder_id: String,
    /// Directory where upload bodies are spooled before reaching the provider.
    pub spool_dir: String,
    /// Session cookie SameSite policy: lax | strict | none.
    pub same_site: String,
    /// Gates the cookie `Secure` flag.
    pub production: bool,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "OAuth2 gateway for Google Drive file operations")]
pub struct Args {
    /// Host to bind to (overrides DRIVE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides DRIVE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Public base URL of this server (overrides DRIVE_GATEWAY_SERVER_URL)
    #[arg(long)]
    pub server_url: Option<String>,

    /// Allowed browser origin (overrides DRIVE_GATEWAY_ORIGIN)
    #[arg(long)]
    pub origin: Option<String>,

    /// Default root folder id (overrides DRIVE_GATEWAY_ROOT_FOLDER)
    #[arg(long)]
    pub root_folder_id: Option<String>,

    /// Upload spool directory (overrides DRIVE_GATEWAY_SPOOL_DIR)
    #[arg(long)]
    pub spool_dir: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();
        Self::from_env(args)
    }

    fn from_env(args: Args) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env::var("DRIVE_GATEWAY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("DRIVE_GATEWAY_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing DRIVE_GATEWAY_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading DRIVE_GATEWAY_PORT"),
        };

        let client_id = env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID is required")?;
        let client_secret =
            env::var("GOOGLE_CLIENT_SECRET").context("GOOGLE_CLIENT_SECRET is required")?;
        let env_server_url = env::var("DRIVE_GATEWAY_SERVER_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", env_port));
        let env_origin =
            env::var("DRIVE_GATEWAY_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".into());
        let env_root = env::var("DRIVE_GATEWAY_ROOT_FOLDER")
            .context("DRIVE_GATEWAY_ROOT_FOLDER is required")?;
        let env_spool =
            env::var("DRIVE_GATEWAY_SPOOL_DIR").unwrap_or_else(|_| "./data/spool".into());
        let same_site = env::var("DRIVE_GATEWAY_SAMESITE")
            .unwrap_or_else(|_| "lax".into())
            .to_ascii_lowercase();
        if !matches!(same_site.as_str(), "lax" | "strict" | "none") {
            bail!("DRIVE_GATEWAY_SAMESITE must be one of lax|strict|none, got `{same_site}`");
        }
        let production = env::var("DRIVE_GATEWAY_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        // --- Merge ---
        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            client_id,
            client_secret,
            server_url: trim_trailing_slash(args.server_url.unwrap_or(env_server_url)),
            origin: trim_trailing_slash(args.origin.unwrap_or(env_origin)),
            root_folder_id: args.root_folder_id.unwrap_or(env_root),
            spool_dir: args.spool_dir.unwrap_or(env_spool),
            same_site,
            production,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// OAuth2 redirect URI registered with the provider.
    pub fn redirect_url(&self) -> String {
        format!("{}/auth/oauth2callback", self.server_url)
    }
}

fn trim_trailing_slash(mut value: String) -> String {
    while value.ends_with('/') {
        value.pop();
    }
    value
}
