use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{Result, WatchError};

pub const DEFAULT_CONFIG_FILE: &str = "trek_watch.toml";
pub const DEFAULT_INCLUDE_PATTERN: &str = r"(?:\b58\s?cm\b|\bLarge\b)";
pub const DEFAULT_EXCLUDE_PATTERN: &str = r"(Medium/?Large|Domane\+)";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listings: Vec<ListingConfig>,
    pub user_agent: String,
    pub request_timeout_seconds: u64,
    pub state_path: PathBuf,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub persist_on_delivery_failure: bool,
    pub extraction: ExtractionStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Category label shown in the digest, e.g. "Road".
    pub name: String,
    pub url: String,
    pub price_cap: f64,
    #[serde(default = "default_include_pattern")]
    pub include_pattern: String,
    #[serde(default = "default_exclude_pattern")]
    pub exclude_pattern: String,
}

/// Where the impressions pattern is searched for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Whole page text.
    #[default]
    Page,
    /// Only the bodies of `<script>` elements.
    Script,
}

fn default_include_pattern() -> String {
    DEFAULT_INCLUDE_PATTERN.to_string()
}

fn default_exclude_pattern() -> String {
    DEFAULT_EXCLUDE_PATTERN.to_string()
}

impl ListingConfig {
    pub fn new(name: &str, url: &str, price_cap: f64) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            price_cap,
            include_pattern: default_include_pattern(),
            exclude_pattern: default_exclude_pattern(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listings: vec![
                ListingConfig::new(
                    "Road",
                    "https://www.trekbikes.com/us/en_US/pre-owned-bikes/pre-owned-road-bikes/c/RBR200/?pageSize=72&sort=price-asc&q=%3Aprice-asc%3AsizeFrameSummarized%3AEnumSizeFrameSummarized004%3AfacetBrakes%3AfacetBrake4",
                    2500.0,
                ),
                ListingConfig::new(
                    "Mountain",
                    "https://www.trekbikes.com/us/en_US/pre-owned-bikes/pre-owned-mountain-bikes/c/RBR300/?pageSize=72&sort=price-asc&q=%3Arelevance%3AsizeFrameSummarized%3AEnumSizeFrameSummarized004%3AfacetBrakes%3AfacetBrake4",
                    2000.0,
                ),
            ],
            user_agent: "Mozilla/5.0".to_string(),
            request_timeout_seconds: 30,
            state_path: PathBuf::from("trek_seen.json"),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            persist_on_delivery_failure: true,
            extraction: ExtractionStrategy::Page,
        }
    }
}

impl Config {
    /// Defaults, overlaid by the optional config file (`TREK_WATCH_CONFIG`
    /// or `trek_watch.toml`) and then by `TREK_WATCH__*` variables.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("TREK_WATCH_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("TREK_WATCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listings.is_empty() {
            return Err(WatchError::Config("no listings configured".to_string()));
        }

        for listing in &self.listings {
            Url::parse(&listing.url).map_err(|e| {
                WatchError::Config(format!("listing {} has invalid url {}: {}", listing.name, listing.url, e))
            })?;
            if !listing.price_cap.is_finite() {
                return Err(WatchError::Config(format!(
                    "listing {} has a non-finite price cap",
                    listing.name
                )));
            }
        }

        Ok(())
    }

    pub fn source_urls(&self) -> Vec<String> {
        self.listings.iter().map(|l| l.url.clone()).collect()
    }

    /// `state_path` as used at runtime. A relative path sits next to the
    /// executable so every invocation shares one state file regardless of
    /// the working directory.
    pub fn resolved_state_path(&self) -> Result<PathBuf> {
        if self.state_path.is_absolute() {
            return Ok(self.state_path.clone());
        }

        let exe = std::env::current_exe()
            .map_err(|e| WatchError::Config(format!("cannot locate executable: {}", e)))?;
        let dir = exe
            .parent()
            .ok_or_else(|| WatchError::Config(format!("executable {} has no parent directory", exe.display())))?;

        Ok(resolve_against(dir, &self.state_path))
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// SMTP credentials and envelope addresses, read from the environment.
#[derive(Clone)]
pub struct MailSettings {
    pub smtp_user: String,
    pub smtp_pass: String,
    pub from: String,
    pub to: String,
}

impl MailSettings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            let value = lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
            if value.is_empty() {
                Err(WatchError::Config(format!(
                    "environment variable {} is not set (mail settings are required on every run)",
                    key
                )))
            } else {
                Ok(value)
            }
        };

        Ok(Self {
            smtp_user: required("SMTP_USER")?,
            smtp_pass: required("SMTP_PASS")?,
            from: required("MAIL_FROM")?,
            to: required("MAIL_TO")?,
        })
    }
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &"<redacted>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn default_config_has_both_trek_listings() {
        let config = Config::default();
        assert_eq!(config.listings.len(), 2);
        assert_eq!(config.listings[0].name, "Road");
        assert_eq!(config.listings[0].price_cap, 2500.0);
        assert_eq!(config.listings[1].name, "Mountain");
        assert_eq!(config.listings[1].price_cap, 2000.0);
        assert_eq!(config.user_agent, "Mozilla/5.0");
        assert_eq!(config.request_timeout_seconds, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mail_settings_trims_values() {
        let vars = env(&[
            ("SMTP_USER", " bot@example.com "),
            ("SMTP_PASS", "app-password\n"),
            ("MAIL_FROM", "bot@example.com"),
            ("MAIL_TO", "rider@example.com"),
        ]);
        let settings = MailSettings::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(settings.smtp_user, "bot@example.com");
        assert_eq!(settings.smtp_pass, "app-password");
    }

    #[test]
    fn mail_settings_rejects_missing_or_blank() {
        let vars = env(&[
            ("SMTP_USER", "bot@example.com"),
            ("SMTP_PASS", "   "),
            ("MAIL_FROM", "bot@example.com"),
        ]);
        let err = MailSettings::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, WatchError::Config(ref msg) if msg.contains("SMTP_PASS")));
        assert!(err.to_string().contains("required on every run"));
    }

    #[test]
    fn debug_output_hides_password() {
        let settings = MailSettings {
            smtp_user: "u".to_string(),
            smtp_pass: "hunter2".to_string(),
            from: "a@example.com".to_string(),
            to: "b@example.com".to_string(),
        };
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
state_path = "/var/lib/trek/seen.json"
persist_on_delivery_failure = false
extraction = "script"

[[listings]]
name = "Gravel"
url = "https://www.trekbikes.com/us/en_US/pre-owned-bikes/gravel/"
price_cap = 1800
"#
        )
        .unwrap();

        let config = Config::load_from(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.state_path, PathBuf::from("/var/lib/trek/seen.json"));
        assert!(!config.persist_on_delivery_failure);
        assert_eq!(config.extraction, ExtractionStrategy::Script);
        assert_eq!(config.listings.len(), 1);
        assert_eq!(config.listings[0].price_cap, 1800.0);
        assert_eq!(config.listings[0].include_pattern, DEFAULT_INCLUDE_PATTERN);
        assert_eq!(config.smtp_port, 465);
    }

    #[test]
    fn relative_state_path_resolves_next_to_executable() {
        let config = Config::default();
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();

        assert_eq!(config.resolved_state_path().unwrap(), exe_dir.join("trek_seen.json"));
        assert_eq!(
            resolve_against(Path::new("/opt/trek-watch/bin"), Path::new("state/seen.json")),
            PathBuf::from("/opt/trek-watch/bin/state/seen.json")
        );
    }

    #[test]
    fn absolute_state_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            state_path: dir.path().join("seen.json"),
            ..Config::default()
        };
        assert_eq!(config.resolved_state_path().unwrap(), dir.path().join("seen.json"));
    }

    #[test]
    fn invalid_listing_url_is_rejected() {
        let mut config = Config::default();
        config.listings[0].url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(WatchError::Config(_))));
    }
}
