use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Media under `<data_dir>/media`, records in `<data_dir>/records.sqlite`.
    #[default]
    Local,
    Firebase,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "firebase" => Ok(BackendKind::Firebase),
            other => Err(format!("unknown backend '{}' (expected local or firebase)", other)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Firebase => f.write_str("firebase"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub log_level: String,
    pub backend: BackendKind,
    pub data_dir: PathBuf,
    pub firebase_project_id: Option<String>,
    pub firebase_bucket: Option<String>,
    pub collection: String,
    pub admin_secret_sha256: Option<String>,
    pub prune_broken_images: bool,
    pub image_workers: usize,
    pub thumbnails: bool,
    pub storage_base_url: Option<String>,
    pub firestore_base_url: Option<String>,
}

#[derive(Default)]
pub struct AppConfigOverrides {
    pub log_level: Option<String>,
    pub backend: Option<BackendKind>,
    pub data_dir: Option<PathBuf>,
}

fn memorial_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memorial")
}

pub fn default_config_path() -> PathBuf {
    memorial_dir().join("config")
}

impl AppConfig {
    /// Read the TOML file at `path` (default `~/.memorial/config`), then
    /// `MEMORIAL_*` environment variables. Missing values fall back to defaults.
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let path = path.unwrap_or_else(default_config_path);
        let cfg = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(false))
            .add_source(config::Environment::with_prefix("MEMORIAL"))
            .build()
            .unwrap_or_default();

        let get_opt = |key: &str| cfg.get_string(key).ok().filter(|v| !v.is_empty());

        let backend = match cfg.get_string("backend") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring configured backend");
                BackendKind::default()
            }),
            Err(_) => BackendKind::default(),
        };

        Self {
            log_level: cfg.get_string("log_level").unwrap_or_else(|_| "info".to_string()),
            backend,
            data_dir: get_opt("data_dir").map(PathBuf::from).unwrap_or_else(memorial_dir),
            firebase_project_id: get_opt("firebase_project_id"),
            firebase_bucket: get_opt("firebase_bucket"),
            collection: get_opt("collection").unwrap_or_else(|| "images".to_string()),
            admin_secret_sha256: get_opt("admin_secret_sha256"),
            prune_broken_images: cfg.get_bool("prune_broken_images").unwrap_or(true),
            image_workers: cfg.get_int("image_workers").map(|n| n.max(1) as usize).unwrap_or(4),
            thumbnails: cfg.get_bool("thumbnails").unwrap_or(true),
            storage_base_url: get_opt("storage_base_url"),
            firestore_base_url: get_opt("firestore_base_url"),
        }
    }

    pub fn apply_overrides(mut self, ov: &AppConfigOverrides) -> Self {
        if let Some(l) = &ov.log_level {
            self.log_level = l.clone();
        }
        if let Some(b) = ov.backend {
            self.backend = b;
        }
        if let Some(d) = &ov.data_dir {
            self.data_dir = d.clone();
        }
        self
    }

    pub fn save_to(&self, path: Option<PathBuf>) -> std::io::Result<()> {
        let path = path.unwrap_or_else(default_config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = toml::to_string(self).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, data)
    }
}
