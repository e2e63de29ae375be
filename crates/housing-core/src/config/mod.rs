use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::matching::domain::{Education, FamilyType, ResidencyClass};

/// Environment variable that overrides the profile's AMap key.
pub const AMAP_KEY_ENV: &str = "AMAP_API_KEY";

/// Top-level runtime configuration: the household profile plus external API
/// credentials. Loaded once per run and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub user_profile: UserProfile,
    #[serde(default)]
    pub api_keys: ApiKeys,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeys {
    #[serde(default)]
    pub amap: Option<String>,
}

/// The single household this tool matches for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub basic_info: BasicInfo,
    pub assets: Assets,
    pub preferences: Preferences,
    pub transportation: Transportation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub hukou: ResidencyClass,
    pub age: u32,
    pub social_insurance_years: u32,
    pub education: Education,
    pub family_type: FamilyType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    pub annual_income: f64,
    pub has_local_property: bool,
    pub total_assets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Ordered by preference; the district score term pays by position.
    pub preferred_districts: Vec<String>,
    pub housing_types: Vec<String>,
    pub preferred_layout: String,
    pub budget_min: f64,
    pub budget_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transportation {
    pub workplace_address: String,
    #[serde(default)]
    pub workplace_name: Option<String>,
}

impl AppConfig {
    /// Load the profile from an explicit path, layering `.env` / environment
    /// on top for the AMap key.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        if !path.exists() {
            return Err(ConfigError::MissingProfile {
                path: path.to_path_buf(),
            });
        }

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AppConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;

        if let Ok(key) = env::var(AMAP_KEY_ENV) {
            if !key.trim().is_empty() {
                config.api_keys.amap = Some(key);
            }
        }

        Ok(config)
    }

    /// The AMap key, required by transport enrichment.
    pub fn amap_key(&self) -> Result<&str, ConfigError> {
        self.api_keys
            .amap
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingAmapKey)
    }

    /// Write a filled-in example profile for the user to edit. Refuses to
    /// clobber an existing file.
    pub fn write_template(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::TemplateExists {
                path: path.to_path_buf(),
            });
        }

        let encoded = serde_json::to_string_pretty(&Self::template())
            .expect("template configuration serializes");
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| ConfigError::TemplateWrite {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(path, encoded).map_err(|source| ConfigError::TemplateWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    fn template() -> Self {
        Self {
            user_profile: UserProfile {
                basic_info: BasicInfo {
                    hukou: ResidencyClass::Local,
                    age: 31,
                    social_insurance_years: 5,
                    education: Education::Master,
                    family_type: FamilyType::Married,
                },
                assets: Assets {
                    annual_income: 600_000.0,
                    has_local_property: false,
                    total_assets: 1_200_000.0,
                },
                preferences: Preferences {
                    preferred_districts: vec!["龙华".to_string(), "福田".to_string()],
                    housing_types: vec!["安居房".to_string(), "人才房".to_string()],
                    preferred_layout: "两房一厅".to_string(),
                    budget_min: 2_000_000.0,
                    budget_max: 4_000_000.0,
                },
                transportation: Transportation {
                    workplace_address: "深圳市龙岗区坂田街道天安云谷".to_string(),
                    workplace_name: Some("天安云谷".to_string()),
                },
            },
            api_keys: ApiKeys { amap: None },
        }
    }
}

/// Configuration problems are fatal for the run and carry remediation text.
#[derive(Debug)]
pub enum ConfigError {
    MissingProfile { path: PathBuf },
    Unreadable { path: PathBuf, source: std::io::Error },
    Invalid { path: PathBuf, source: serde_json::Error },
    MissingAmapKey,
    TemplateExists { path: PathBuf },
    TemplateWrite { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingProfile { path } => write!(
                f,
                "no user profile at {}; run `housing-matcher init --config {}` and fill in the template",
                path.display(),
                path.display()
            ),
            ConfigError::Unreadable { path, .. } => {
                write!(f, "could not read user profile at {}", path.display())
            }
            ConfigError::Invalid { path, source } => write!(
                f,
                "user profile at {} is not valid JSON: {source}",
                path.display()
            ),
            ConfigError::MissingAmapKey => write!(
                f,
                "no AMap API key configured; set {AMAP_KEY_ENV} or api_keys.amap in the profile \
                 (keys are issued at https://lbs.amap.com/)"
            ),
            ConfigError::TemplateExists { path } => write!(
                f,
                "refusing to overwrite the existing profile at {}",
                path.display()
            ),
            ConfigError::TemplateWrite { path, .. } => {
                write!(f, "could not write profile template to {}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Unreadable { source, .. } => Some(source),
            ConfigError::Invalid { source, .. } => Some(source),
            ConfigError::TemplateWrite { source, .. } => Some(source),
            ConfigError::MissingProfile { .. }
            | ConfigError::MissingAmapKey
            | ConfigError::TemplateExists { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn template_round_trips_through_load() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        env::remove_var(AMAP_KEY_ENV);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");

        AppConfig::write_template(&path).expect("template writes");
        let config = AppConfig::load(&path).expect("template loads");

        assert_eq!(config.user_profile.basic_info.age, 31);
        assert_eq!(
            config.user_profile.preferences.preferred_districts[0],
            "龙华"
        );
        assert!(matches!(config.amap_key(), Err(ConfigError::MissingAmapKey)));
    }

    #[test]
    fn template_never_clobbers_an_existing_profile() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");
        fs::write(&path, "{}").expect("seed file");

        match AppConfig::write_template(&path) {
            Err(ConfigError::TemplateExists { .. }) => {}
            other => panic!("expected template-exists error, got {other:?}"),
        }
    }

    #[test]
    fn missing_profile_error_points_at_the_init_command() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.json");

        let err = AppConfig::load(&path).expect_err("profile is absent");
        assert!(err.to_string().contains("housing-matcher init"));
    }

    #[test]
    fn environment_key_overrides_the_profile_key() {
        let _lock = env_guard().lock().expect("env mutex poisoned");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");
        AppConfig::write_template(&path).expect("template writes");

        env::set_var(AMAP_KEY_ENV, "key-from-env");
        let config = AppConfig::load(&path).expect("loads");
        env::remove_var(AMAP_KEY_ENV);

        assert_eq!(config.amap_key().expect("key present"), "key-from-env");
    }

    #[test]
    fn invalid_profile_reports_the_offending_path() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("profile.json");
        fs::write(&path, "{ not json").expect("seed file");

        let err = AppConfig::load(&path).expect_err("profile is invalid");
        match &err {
            ConfigError::Invalid { path: reported, .. } => {
                assert_eq!(reported, &path);
            }
            other => panic!("expected invalid-profile error, got {other:?}"),
        }
    }
}
