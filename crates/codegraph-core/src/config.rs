use std::env;
use std::path::PathBuf;

use config as cfg;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{CodeGraphError, Result};

/// AST-cache and thread-pool tuning (C3/C4 and §5's concurrency model).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ParserConfig {
    /// Bounded LRU size for the AST cache, keyed by file path.
    #[serde(default = "ParserConfig::default_ast_cache_size")]
    pub ast_cache_size: usize,
    /// Upper bound on concurrent extraction workers; defaults to the number
    /// of logical CPUs, matching the teacher's `parse_directory_parallel`.
    #[serde(default)]
    pub max_parse_concurrency: Option<usize>,
}

impl ParserConfig {
    fn default_ast_cache_size() -> usize {
        50
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ast_cache_size: Self::default_ast_cache_size(),
            max_parse_concurrency: None,
        }
    }
}

/// Process Processor (C14) thresholds, pinned to the values named in
/// spec §4.13 (`MIN_TRACE_CONFIDENCE`, `maxTraceDepth`, `minSteps`) plus the
/// `maxProcesses` cap the source leaves as an open question (resolved in
/// DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProcessConfig {
    #[serde(default = "ProcessConfig::default_min_trace_confidence")]
    pub min_trace_confidence: f32,
    #[serde(default = "ProcessConfig::default_max_trace_depth")]
    pub max_trace_depth: usize,
    #[serde(default = "ProcessConfig::default_min_steps")]
    pub min_steps: usize,
    #[serde(default = "ProcessConfig::default_max_processes")]
    pub max_processes: usize,
}

impl ProcessConfig {
    fn default_min_trace_confidence() -> f32 {
        0.5
    }
    fn default_max_trace_depth() -> usize {
        8
    }
    fn default_min_steps() -> usize {
        3
    }
    fn default_max_processes() -> usize {
        200
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            min_trace_confidence: Self::default_min_trace_confidence(),
            max_trace_depth: Self::default_max_trace_depth(),
            min_steps: Self::default_min_steps(),
            max_processes: Self::default_max_processes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

/// Top-level pipeline configuration, loaded the way the teacher's
/// `ConfigManager` loads `Settings`: layered TOML files plus
/// `CODEGRAPH__*` environment overrides, via the `config` crate.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.parser.ast_cache_size == 0 {
            return Err(CodeGraphError::Configuration(
                "parser.ast_cache_size must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.process.min_trace_confidence) {
            return Err(CodeGraphError::Configuration(
                "process.min_trace_confidence must be in [0, 1]".into(),
            ));
        }
        if self.process.min_steps == 0 {
            return Err(CodeGraphError::Configuration(
                "process.min_steps must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// `~/.codegraph`, falling back to `./config`, then the current
    /// directory — same priority order as the teacher's
    /// `ConfigManager::default_config_dir`.
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let codegraph_dir = home_dir.join(".codegraph");
            if codegraph_dir.exists() {
                return codegraph_dir;
            }
        }
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            return project_config;
        }
        cwd
    }

    pub fn load_from_sources(config_dir: &std::path::Path) -> Result<Self> {
        let builder = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("CODEGRAPH").separator("__"));

        let settings: PipelineConfig = builder
            .build()
            .map_err(|e| CodeGraphError::Configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CodeGraphError::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads from `~/.codegraph` (or the project-local fallback), logging
    /// where it looked, matching the teacher's `ConfigManager::new_watching`
    /// minus the file-watching reload loop — this repo builds the graph
    /// once per run, so there is nothing to hot-reload configuration for.
    pub fn load() -> Result<Self> {
        let dir = Self::default_config_dir();
        info!("loading pipeline configuration from {:?}", dir);
        Self::load_from_sources(&dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_thresholds() {
        let config = PipelineConfig::default();
        assert_eq!(config.parser.ast_cache_size, 50);
        assert_eq!(config.process.min_trace_confidence, 0.5);
        assert_eq!(config.process.max_trace_depth, 8);
        assert_eq!(config.process.min_steps, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        let mut config = PipelineConfig::default();
        config.process.min_trace_confidence = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_defaults_from_an_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::load_from_sources(dir.path()).unwrap();
        assert_eq!(config.parser.ast_cache_size, 50);
    }
}
