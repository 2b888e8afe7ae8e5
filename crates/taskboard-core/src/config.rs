use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::view::SortKey;

const CONFIG_FILE_NAME: &str =
  "taskboard.toml";
const CONFIG_ENV_VAR: &str =
  "TASKBOARD_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  pub api_url:      String,
  pub timeout_secs: u64,
  pub timezone:     String,
  pub default_sort: String,
  pub color:        bool,
  #[serde(skip)]
  pub loaded_from:  Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_url:      "http://127.0.0.1:5000"
        .to_string(),
      timeout_secs: 10,
      timezone:     "UTC".to_string(),
      default_sort: SortKey::default()
        .as_str()
        .to_string(),
      color:        true,
      loaded_from:  None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) = resolve_config_path(
      config_override
    ) else {
      warn!(
        "no taskboard config found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading config");
    Self::load_file(&path)
  }

  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text =
      fs::read_to_string(path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg: Config =
      toml::from_str(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;
    cfg.loaded_from =
      Some(path.to_path_buf());
    cfg.validate()?;
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      match key.as_str() {
        | "api_url" => self.api_url = v,
        | "timeout_secs" => {
          self.timeout_secs = v
            .trim()
            .parse()
            .with_context(|| {
              format!(
                "invalid timeout_secs: \
                 {v}"
              )
            })?;
        }
        | "timezone" => self.timezone = v,
        | "default_sort" => {
          self.default_sort = v
        }
        | "color" => {
          self.color = parse_bool(&v)
        }
        | other => {
          return Err(anyhow!(
            "unknown config key: {other}"
          ));
        }
      }
    }

    self.validate()
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(
      self.timeout_secs
    )
  }

  pub fn timezone(
    &self
  ) -> anyhow::Result<Tz> {
    self
      .timezone
      .trim()
      .parse::<Tz>()
      .map_err(|err| {
        anyhow!(
          "invalid timezone '{}': {err}",
          self.timezone
        )
      })
  }

  pub fn sort_key(&self) -> SortKey {
    SortKey::parse(&self.default_sort)
  }

  fn validate(
    &self
  ) -> anyhow::Result<()> {
    if self.api_url.trim().is_empty() {
      return Err(anyhow!(
        "api_url cannot be empty"
      ));
    }
    if self.timeout_secs == 0 {
      return Err(anyhow!(
        "timeout_secs must be at least 1"
      ));
    }
    self.timezone()?;
    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    if raw == "/dev/null" {
      return None;
    }
    return Some(PathBuf::from(raw));
  }

  let candidate = dirs::config_dir()?
    .join("taskboard")
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}

fn parse_bool(s: &str) -> bool {
  matches!(
    s.trim()
      .to_ascii_lowercase()
      .as_str(),
    "1" | "y" | "yes" | "on" | "true"
  )
}
