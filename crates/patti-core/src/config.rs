use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable that overrides `spreadsheet_id`.
pub const SPREADSHEET_ID_ENV: &str = "SPREADSHEET_ID";

/// HTTP transfer parameters (optional `[http]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds: a transfer stalled this long is aborted.
    pub read_timeout_secs: u64,
    /// Body write chunk size in bytes for direct downloads.
    pub chunk_size: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            chunk_size: 8192,
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Throttling after filename searches (optional `[throttle]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Pause in milliseconds after a search that found and fetched a file.
    pub search_delay_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: 500,
        }
    }
}

/// Google API endpoints (optional `[api]` section). Overridable for testing
/// against a local server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub sheets_base: String,
    pub drive_base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            sheets_base: "https://sheets.googleapis.com/v4".to_string(),
            drive_base: "https://www.googleapis.com/drive/v3".to_string(),
        }
    }
}

/// Where the bearer token comes from (optional `[auth]` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Literal OAuth2 access token. Prefer `token_command` or the env var.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Shell command printing an access token, e.g. `gcloud auth print-access-token`.
    #[serde(default)]
    pub token_command: Option<String>,
}

/// Global configuration loaded from `~/.config/patti/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PattiConfig {
    /// Spreadsheet key (the long id in the sheet URL). `SPREADSHEET_ID` overrides it.
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    /// Sheet (tab) title. Takes precedence over `sheet_gid`.
    #[serde(default)]
    pub sheet_name: Option<String>,
    /// Sheet (tab) id, the `gid=` in the sheet URL; resolved to a title at startup.
    #[serde(default)]
    pub sheet_gid: Option<i64>,
    /// Column holding row identifiers.
    pub id_column: String,
    /// Column holding PDF links.
    pub link_column: String,
    /// First data row (rows above are headers).
    pub first_row: u32,
    /// Identifier value that marks a header row.
    pub header_sentinel: String,
    /// Output directory for downloaded PDFs.
    pub output_dir: PathBuf,
    /// Output filename prefix; files are `<prefix><id>.pdf`.
    pub file_prefix: String,
    /// Skip rows whose output file already exists instead of overwriting it.
    #[serde(default)]
    pub skip_existing: bool,
    /// When a Drive fetch fails for a share link, retry it as a plain HTTP GET.
    #[serde(default = "default_true")]
    pub drive_fallback_to_direct: bool,
    #[serde(default)]
    pub http: Option<HttpConfig>,
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

fn default_true() -> bool {
    true
}

impl Default for PattiConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: None,
            sheet_gid: None,
            id_column: "A".to_string(),
            link_column: "AF".to_string(),
            first_row: 3,
            header_sentinel: "Id_Prog".to_string(),
            output_dir: PathBuf::from("patti"),
            file_prefix: "patto_".to_string(),
            skip_existing: false,
            drive_fallback_to_direct: true,
            http: None,
            throttle: None,
            api: None,
            auth: None,
        }
    }
}

impl PattiConfig {
    pub fn http(&self) -> HttpConfig {
        self.http.clone().unwrap_or_default()
    }

    pub fn throttle(&self) -> ThrottleConfig {
        self.throttle.clone().unwrap_or_default()
    }

    pub fn api(&self) -> ApiConfig {
        self.api.clone().unwrap_or_default()
    }

    pub fn auth(&self) -> AuthConfig {
        self.auth.clone().unwrap_or_default()
    }

    /// Applies environment overrides (`SPREADSHEET_ID`).
    pub fn apply_env(&mut self) {
        if let Ok(id) = std::env::var(SPREADSHEET_ID_ENV) {
            if !id.trim().is_empty() {
                self.spreadsheet_id = Some(id.trim().to_string());
            }
        }
    }

    /// Checks that the settings needed for a run are present and sane.
    pub fn validate(&self) -> Result<()> {
        if self
            .spreadsheet_id
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            anyhow::bail!(
                "spreadsheet_id is not set (config file, {} or --spreadsheet-id)",
                SPREADSHEET_ID_ENV
            );
        }
        if self.sheet_name.is_none() && self.sheet_gid.is_none() {
            anyhow::bail!("either sheet_name or sheet_gid must be set");
        }
        if self.first_row < 1 {
            anyhow::bail!("first_row must be >= 1");
        }
        for (key, col) in [("id_column", &self.id_column), ("link_column", &self.link_column)] {
            if !is_column_letters(col) {
                anyhow::bail!("{} must be column letters (e.g. \"AF\"), got {:?}", key, col);
            }
        }
        if self.http().chunk_size == 0 {
            anyhow::bail!("http.chunk_size must be > 0");
        }
        Ok(())
    }
}

fn is_column_letters(s: &str) -> bool {
    !s.is_empty() && s.len() <= 3 && s.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("patti")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PattiConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PattiConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PattiConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
