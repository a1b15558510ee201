use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::export::SnippetFont;

pub mod defaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub auth: AuthConfig,
    pub server: ServerConfig,
    pub export: ExportConfig,
    pub input: InputConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Where the client sends `/lyrics` requests.
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub client_id: String,
    pub authorize_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub spotify_api_url: String,
    pub spotify_token_url: String,
    pub lrclib_url: String,
    /// App credentials for requests that arrive without a bearer token.
    /// `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET` take precedence.
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub require_auth_for_lyrics: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    /// Searched before the platform font directories.
    pub font_dirs: Vec<PathBuf>,
    pub font_files: HashMap<SnippetFont, PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub mouse: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::PROXY_BASE_URL.to_string(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authorize_url: defaults::AUTHORIZE_URL.to_string(),
            redirect_uri: defaults::REDIRECT_URI.to_string(),
            scopes: defaults::SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::SERVER_BIND.to_string(),
            spotify_api_url: crate::spotify::SpotifyCatalog::DEFAULT_API_URL.to_string(),
            spotify_token_url: defaults::SPOTIFY_TOKEN_URL.to_string(),
            lrclib_url: crate::lyrics::lrclib::LrclibClient::DEFAULT_BASE_URL.to_string(),
            client_id: None,
            client_secret: None,
            require_auth_for_lyrics: false,
        }
    }
}

impl ServerConfig {
    /// App credentials, with the environment overriding the file.
    pub fn app_credentials(&self) -> Option<(String, String)> {
        let id = std::env::var("SPOTIFY_CLIENT_ID").ok().or_else(|| self.client_id.clone());
        let secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .ok()
            .or_else(|| self.client_secret.clone());
        match (id, secret) {
            (Some(id), Some(secret)) if !id.trim().is_empty() && !secret.trim().is_empty() => {
                Some((id, secret))
            }
            _ => None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        let output_dir = directories::UserDirs::new()
            .and_then(|u| u.picture_dir().map(|p| p.join("lyricsnap")))
            .unwrap_or_else(|| PathsConfig::default().data_dir.join("exports"));
        Self {
            output_dir,
            font_dirs: Vec::new(),
            font_files: HashMap::new(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { mouse: true }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = project_dirs();
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("lyricsnap"));
        Self { data_dir }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "lyricsnap", "lyricsnap")
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj = project_dirs().context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

fn write_config(cfg: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

/// Load the config, writing the defaults first if the file does not exist.
pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        write_config(&cfg, &path).context("write default config")?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [auth]
            client_id = "abc"

            [export.font_files]
            mono = "/fonts/Iosevka.ttf"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.auth.client_id, "abc");
        assert_eq!(cfg.auth.redirect_uri, defaults::REDIRECT_URI);
        assert_eq!(cfg.proxy.base_url, defaults::PROXY_BASE_URL);
        assert!(cfg.input.mouse);
        assert_eq!(
            cfg.export.font_files.get(&SnippetFont::Mono),
            Some(&PathBuf::from("/fonts/Iosevka.ttf"))
        );
    }

    #[test]
    fn test_load_writes_defaults_then_reads_them_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = load(Some(&path)).unwrap();
        assert!(path.exists());
        let second = load(Some(&path)).unwrap();
        assert_eq!(first.server.bind, second.server.bind);
        assert_eq!(second.auth.scopes, first.auth.scopes);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[proxy\nbase_url = 1").unwrap();
        assert!(load(Some(&path)).is_err());
    }
}
