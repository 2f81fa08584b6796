use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use town_engine::{EngineConfig, EngineConfigError};
use tracing::info;

pub(crate) const TUNING_ENV_VAR: &str = "TOWN_TUNING";
const DEFAULT_TUNING_FILE: &str = "tuning.json";

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: EngineConfigError,
    },
}

/// Engine tuning from `TOWN_TUNING`, else `assets/tuning.json`, else the
/// built-in defaults.
pub(crate) fn load_tuning(assets_dir: &Path) -> Result<EngineConfig, TuningError> {
    let env_value = match env::var(TUNING_ENV_VAR) {
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(source) => {
            return Err(TuningError::EnvVar {
                var: TUNING_ENV_VAR,
                source,
            })
        }
    };

    match tuning_path(env_value, assets_dir) {
        Some(path) => {
            let config = load_tuning_file(&path)?;
            info!(
                file = %path.display(),
                move_speed = config.move_speed,
                zoom_default = config.zoom_default,
                "tuning_loaded"
            );
            Ok(config)
        }
        None => {
            info!("tuning_defaults");
            Ok(EngineConfig::default())
        }
    }
}

/// An explicit path is used even if it is missing so the read error names
/// it. The default file is optional.
fn tuning_path(env_value: Option<String>, assets_dir: &Path) -> Option<PathBuf> {
    if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
        return Some(PathBuf::from(value.trim()));
    }
    let default_path = assets_dir.join(DEFAULT_TUNING_FILE);
    default_path.is_file().then_some(default_path)
}

pub(crate) fn load_tuning_file(path: &Path) -> Result<EngineConfig, TuningError> {
    let raw = fs::read_to_string(path).map_err(|source| TuningError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tuning(path, &raw)
}

fn parse_tuning(path: &Path, raw: &str) -> Result<EngineConfig, TuningError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config = serde_path_to_error::deserialize::<_, EngineConfig>(&mut deserializer).map_err(
        |error| {
            let field = error.path().to_string();
            TuningError::Parse {
                path: path.to_path_buf(),
                field,
                source: error.into_inner(),
            }
        },
    )?;
    config.validate().map_err(|source| TuningError::Invalid {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config =
            parse_tuning(Path::new("tuning.json"), r#"{ "move_speed": 6.0 }"#).expect("parse");
        assert_eq!(config.move_speed, 6.0);
        assert_eq!(config.house_range, EngineConfig::default().house_range);
    }

    #[test]
    fn type_error_reports_field_path() {
        let err = parse_tuning(Path::new("tuning.json"), r#"{ "zoom_step": "big" }"#)
            .expect_err("err");
        match err {
            TuningError::Parse { field, .. } => assert_eq!(field, "zoom_step"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_tuning(Path::new("tuning.json"), r#"{ "jump_height": 3 }"#)
            .expect_err("err");
        assert!(matches!(err, TuningError::Parse { .. }));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let err = parse_tuning(
            Path::new("tuning.json"),
            r#"{ "zoom_min": 2.0, "zoom_max": 1.0 }"#,
        )
        .expect_err("err");
        assert!(matches!(err, TuningError::Invalid { .. }));
    }

    #[test]
    fn explicit_path_wins_over_default_file() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join(DEFAULT_TUNING_FILE), "{}").expect("write");

        let explicit = tuning_path(Some(" /tmp/custom.json ".to_string()), temp.path());
        assert_eq!(explicit, Some(PathBuf::from("/tmp/custom.json")));

        let fallback = tuning_path(Some("  ".to_string()), temp.path());
        assert_eq!(fallback, Some(temp.path().join(DEFAULT_TUNING_FILE)));
    }

    #[test]
    fn missing_default_file_means_defaults() {
        let temp = TempDir::new().expect("temp");
        assert_eq!(tuning_path(None, temp.path()), None);
    }

    #[test]
    fn load_tuning_file_reports_missing_file() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("absent.json");
        let err = load_tuning_file(&path).expect_err("err");
        assert!(matches!(err, TuningError::Read { .. }));
    }

    #[test]
    fn shipped_tuning_is_valid() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("assets")
            .join(DEFAULT_TUNING_FILE);
        load_tuning_file(&path).expect("shipped tuning");
    }
}
