use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{domain::image::ImageUrls, editor::CoverImagePolicy};

/// Configuration for the console.
///
/// Stored as TOML in the root of a post store. Values can be overridden
/// from the environment with [`Config::with_env_overrides`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The deployment environment.
    pub env: Environment,

    /// Identifier of the author new posts are attributed to.
    pub admin_id: Option<String>,

    /// Account id on the hosted image service.
    ///
    /// Used to build cover image and thumbnail URLs.
    pub cloudinary_id: Option<String>,

    /// Whether opening a post without a cover image clears the cover image
    /// left over from a previous edit.
    ///
    /// When `false` (default) the previous cover image is kept.
    pub clear_cover_on_absence: bool,
}

/// Error returned when the configuration cannot be loaded or saved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this configuration.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration, falling back to the default if the file does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `FMC_ENV`, `FMC_ADMIN_ID` and `FMC_CLOUDINARY_ID` from the
    /// process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    #[must_use]
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(env) = var("FMC_ENV") {
            self.env = Environment::from_variable(&env);
        }
        if let Some(admin_id) = var("FMC_ADMIN_ID").filter(|v| !v.is_empty()) {
            self.admin_id = Some(admin_id);
        }
        if let Some(cloudinary_id) = var("FMC_CLOUDINARY_ID").filter(|v| !v.is_empty()) {
            self.cloudinary_id = Some(cloudinary_id);
        }
        self
    }

    /// The cover image policy this configuration selects.
    #[must_use]
    pub const fn cover_image_policy(&self) -> CoverImagePolicy {
        if self.clear_cover_on_absence {
            CoverImagePolicy::Clear
        } else {
            CoverImagePolicy::Preserve
        }
    }

    /// An image URL builder, if an image-host account is configured.
    #[must_use]
    pub fn image_urls(&self) -> Option<ImageUrls> {
        self.cloudinary_id.as_deref().map(ImageUrls::new)
    }

    /// The subset of the configuration exposed to the editor front-end.
    #[must_use]
    pub fn public(&self) -> PublicConfig {
        PublicConfig {
            env: self.env.to_string(),
            admin_id: self.admin_id.clone().unwrap_or_default(),
            cloudinary_id: self.cloudinary_id.clone().unwrap_or_default(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development.
    #[default]
    Dev,
    /// Production.
    Prod,
}

impl Environment {
    /// Interpret an `FMC_ENV` value. Only `production` selects production.
    #[must_use]
    pub fn from_variable(value: &str) -> Self {
        if value == "production" {
            Self::Prod
        } else {
            Self::Dev
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Dev => f.write_str("dev"),
            Self::Prod => f.write_str("prod"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Public configuration variables, as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConfig {
    /// Environment name (`dev` or `prod`).
    #[serde(rename = "ENV")]
    pub env: String,
    /// Admin (author) id.
    #[serde(rename = "ADMIN_ID")]
    pub admin_id: String,
    /// Image-host account id.
    #[serde(rename = "CLOUDINARY_ID")]
    pub cloudinary_id: String,
}

impl PublicConfig {
    /// Look up a variable by its wire name, falling back when it is unknown
    /// or empty.
    #[must_use]
    pub fn variable<'a>(&'a self, name: &str, fallback: &'a str) -> &'a str {
        let value = match name {
            "ENV" => self.env.as_str(),
            "ADMIN_ID" => self.admin_id.as_str(),
            "CLOUDINARY_ID" => self.cloudinary_id.as_str(),
            _ => "",
        };
        if value.is_empty() { fallback } else { value }
    }
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        env: Environment,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        admin_id: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        cloudinary_id: Option<String>,

        #[serde(default)]
        clear_cover_on_absence: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                env,
                admin_id,
                cloudinary_id,
                clear_cover_on_absence,
            } => Self {
                env,
                admin_id,
                cloudinary_id,
                clear_cover_on_absence,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            env: config.env,
            admin_id: config.admin_id,
            cloudinary_id: config.cloudinary_id,
            clear_cover_on_absence: config.clear_cover_on_absence,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
_version = "1"
env = "prod"
admin_id = "admin"
cloudinary_id = "demo"
clear_cover_on_absence = true
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.env, Environment::Prod);
        assert_eq!(config.admin_id.as_deref(), Some("admin"));
        assert_eq!(config.cloudinary_id.as_deref(), Some("demo"));
        assert_eq!(config.cover_image_policy(), CoverImagePolicy::Clear);
    }

    #[test]
    fn load_missing_file_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        let error = Config::load(&missing).unwrap_err();
        assert!(matches!(error, ConfigError::Io(_)));
        assert!(error.to_string().starts_with("failed to access config file:"));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&tmp.path().join("fconsole.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_invalid_toml_returns_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nenv = \"staging\"\n").unwrap();

        let error = Config::load(file.path()).unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn empty_file_returns_default() {
        let expected = Config::default();
        let actual: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("fconsole.toml");
        let config = Config {
            env: Environment::Prod,
            admin_id: Some("653a1f0c2b9e4d7f8a6c1e02".into()),
            cloudinary_id: None,
            clear_cover_on_absence: false,
        };

        config.save(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("_version = \"1\""));
        assert!(!written.contains("cloudinary_id"));

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn overrides_apply_environment_variables() {
        let vars = HashMap::from([
            ("FMC_ENV", "production"),
            ("FMC_ADMIN_ID", "admin"),
            ("FMC_CLOUDINARY_ID", ""),
        ]);
        let base = Config {
            cloudinary_id: Some("kept".into()),
            ..Config::default()
        };

        let config = base.with_overrides(|name| vars.get(name).map(ToString::to_string));

        assert_eq!(config.env, Environment::Prod);
        assert_eq!(config.admin_id.as_deref(), Some("admin"));
        assert_eq!(config.cloudinary_id.as_deref(), Some("kept"));
    }

    #[test]
    fn non_production_env_value_means_dev() {
        assert_eq!(Environment::from_variable("staging"), Environment::Dev);
        assert_eq!(Environment::from_variable("production"), Environment::Prod);
    }

    #[test]
    fn env_argument_accepts_short_names_only() {
        assert_eq!("prod".parse::<Environment>(), Ok(Environment::Prod));
        assert_eq!(Environment::default().to_string().parse(), Ok(Environment::Dev));
        assert!("production".parse::<Environment>().is_err());
    }

    #[test]
    fn public_config_uses_wire_names() {
        let config = Config {
            env: Environment::Prod,
            admin_id: Some("admin".into()),
            cloudinary_id: Some("demo".into()),
            clear_cover_on_absence: true,
        };

        let json = serde_json::to_value(config.public()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ENV": "prod", "ADMIN_ID": "admin", "CLOUDINARY_ID": "demo"})
        );
    }

    #[test]
    fn variable_lookup_falls_back() {
        let public = PublicConfig {
            env: "dev".into(),
            admin_id: String::new(),
            cloudinary_id: "demo".into(),
        };
        assert_eq!(public.variable("CLOUDINARY_ID", "none"), "demo");
        assert_eq!(public.variable("ADMIN_ID", "none"), "none");
        assert_eq!(public.variable("UNKNOWN", "x"), "x");
    }
}
