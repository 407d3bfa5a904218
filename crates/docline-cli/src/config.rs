//! Job configuration loading from TOML files

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Deserializer};

use docline_core::{DEFAULT_CHUNK_SIZE, DEFAULT_WORKERS, PipelineConfig};

/// One ingestion job
///
/// ```toml
/// input_dir = "${DATA_ROOT}/pdfs"
/// output_dir = "/scratch/docline/out"
/// chunk_size = 500
/// workers = 8
/// extensions = ["pdf"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_path")]
    pub input_dir: PathBuf,
    #[serde(deserialize_with = "deserialize_path")]
    pub output_dir: PathBuf,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE.get()
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_extensions() -> Vec<String> {
    vec!["pdf".to_string()]
}

/// Deserialize a path that may reference environment variables as `${VAR}`
fn deserialize_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    expand_env_vars(&raw)
        .map(PathBuf::from)
        .map_err(serde::de::Error::custom)
}

/// Replace every `${VAR}` in `s` with the variable's value
fn expand_env_vars(s: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| format!("unterminated variable reference in {s:?}"))?;
        let name = &after[..end];
        let value =
            std::env::var(name).map_err(|_| format!("environment variable {name} is not set"))?;
        out.push_str(&value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

impl Config {
    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.chunk_size > 0, "chunk_size must be at least 1");
        ensure!(self.workers > 0, "workers must be at least 1");
        ensure!(
            !self.extensions.is_empty(),
            "extensions must list at least one file extension"
        );
        ensure!(
            self.extensions.iter().all(|e| !e.trim_start_matches('.').is_empty()),
            "extensions must not contain empty entries"
        );
        Ok(())
    }

    pub fn into_pipeline_config(self) -> Result<PipelineConfig> {
        self.validate()?;
        Ok(PipelineConfig {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            chunk_size: NonZeroUsize::new(self.chunk_size)
                .context("chunk_size must be at least 1")?,
            workers: self.workers,
            extensions: self.extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn defaults_apply() {
        let config = parse(
            r#"
input_dir = "/data/in"
output_dir = "/data/out"
"#,
        );
        assert_eq!(config.input_dir, PathBuf::from("/data/in"));
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.extensions, ["pdf"]);
        config.validate().unwrap();
    }

    #[test]
    fn full_config() {
        let config = parse(
            r#"
input_dir = "in"
output_dir = "out"
chunk_size = 50
workers = 16
extensions = ["pdf", "PDF"]
"#,
        );
        let pipeline = config.into_pipeline_config().unwrap();
        assert_eq!(pipeline.chunk_size.get(), 50);
        assert_eq!(pipeline.workers, 16);
        assert_eq!(pipeline.extensions.len(), 2);
    }

    #[test]
    fn output_dir_is_required() {
        let err = toml::from_str::<Config>(r#"input_dir = "in""#).unwrap_err();
        assert!(err.to_string().contains("output_dir"));
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = toml::from_str::<Config>(
            r#"
input_dir = "in"
output_dir = "out"
chunksize = 10
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn zero_values_rejected() {
        let base = parse(
            r#"
input_dir = "in"
output_dir = "out"
"#,
        );

        let zero_chunk = Config {
            chunk_size: 0,
            ..base.clone()
        };
        assert!(zero_chunk.validate().is_err());

        let zero_workers = Config {
            workers: 0,
            ..base.clone()
        };
        assert!(zero_workers.validate().is_err());

        let no_extensions = Config {
            extensions: Vec::new(),
            ..base.clone()
        };
        assert!(no_extensions.validate().is_err());

        let blank_extension = Config {
            extensions: vec![".".to_string()],
            ..base
        };
        assert!(blank_extension.into_pipeline_config().is_err());
    }

    #[test]
    fn expand_env_vars_embedded() {
        std::env::set_var("DOCLINE_TEST_ROOT", "/mnt/data");
        assert_eq!(
            expand_env_vars("${DOCLINE_TEST_ROOT}/pdfs").unwrap(),
            "/mnt/data/pdfs"
        );
        std::env::remove_var("DOCLINE_TEST_ROOT");
    }

    #[test]
    fn expand_env_vars_literal() {
        assert_eq!(expand_env_vars("/plain/path").unwrap(), "/plain/path");
    }

    #[test]
    fn expand_env_vars_missing() {
        let err = expand_env_vars("${DOCLINE_NONEXISTENT_12345}/x").unwrap_err();
        assert!(err.contains("DOCLINE_NONEXISTENT_12345"));
    }

    #[test]
    fn expand_env_vars_unterminated() {
        assert!(expand_env_vars("/a/${OOPS").is_err());
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("job.toml");

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read config file"));

        std::fs::write(&path, "input_dir = [").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
