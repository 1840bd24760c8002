use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// How MATCH nodes are grouped into components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentMode {
    /// Every node goes into a single `main` component.
    #[default]
    Collapsed,
    /// One component per union-find root, ordered by first discovery.
    Connected,
}

/// What to do with a conjunct that references more than one alias.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossPredicatePolicy {
    /// Keep it out of the segments and return it for post-filtering.
    #[default]
    Residual,
    /// Fail the compile.
    Reject,
}

impl FromStr for ComponentMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collapsed" => Ok(ComponentMode::Collapsed),
            "connected" => Ok(ComponentMode::Connected),
            _ => Err(UnknownVariant {
                kind: "component mode",
                value: s.to_string(),
                expected: "collapsed, connected",
            }),
        }
    }
}

impl FromStr for CrossPredicatePolicy {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "residual" => Ok(CrossPredicatePolicy::Residual),
            "reject" => Ok(CrossPredicatePolicy::Reject),
            _ => Err(UnknownVariant {
                kind: "cross-predicate policy",
                value: s.to_string(),
                expected: "residual, reject",
            }),
        }
    }
}

impl fmt::Display for ComponentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentMode::Collapsed => write!(f, "collapsed"),
            ComponentMode::Connected => write!(f, "connected"),
        }
    }
}

impl fmt::Display for CrossPredicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossPredicatePolicy::Residual => write!(f, "residual"),
            CrossPredicatePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Compiler configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompilerConfig {
    /// Rows pulled from the predecessor stage per batch
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Input batch size must be between 1 and 100000"
    ))]
    pub input_batch_size: u32,

    /// Rows emitted by a stage per batch
    #[validate(range(
        min = 1,
        max = 100000,
        message = "Output batch size must be between 1 and 100000"
    ))]
    pub output_batch_size: u32,

    pub component_mode: ComponentMode,

    pub cross_predicate_policy: CrossPredicatePolicy,

    /// Reject MATCH aliases that are not declared in FROM
    pub strict_from: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            input_batch_size: 50,
            output_batch_size: 100,
            component_mode: ComponentMode::Collapsed,
            cross_predicate_policy: CrossPredicatePolicy::Residual,
            strict_from: false,
        }
    }
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            input_batch_size: parse_env_var("DOCGRAPH_INPUT_BATCH_SIZE", "50")?,
            output_batch_size: parse_env_var("DOCGRAPH_OUTPUT_BATCH_SIZE", "100")?,
            component_mode: parse_env_var("DOCGRAPH_COMPONENT_MODE", "collapsed")?,
            cross_predicate_policy: parse_env_var("DOCGRAPH_CROSS_PREDICATES", "residual")?,
            strict_from: parse_env_var("DOCGRAPH_STRICT_FROM", "false")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from CLI arguments with validation.
    ///
    /// The base comes from `--config` when given, otherwise from the
    /// environment; explicit flags override it.
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = match &cli.config_file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::from_env()?,
        };

        if let Some(size) = cli.input_batch_size {
            config.input_batch_size = size;
        }
        if let Some(size) = cli.output_batch_size {
            config.output_batch_size = size;
        }
        if let Some(mode) = cli.component_mode {
            config.component_mode = mode;
        }
        if let Some(policy) = cli.cross_predicate_policy {
            config.cross_predicate_policy = policy;
        }
        if cli.strict_from {
            config.strict_from = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub config_file: Option<PathBuf>,
    pub input_batch_size: Option<u32>,
    pub output_batch_size: Option<u32>,
    pub component_mode: Option<ComponentMode>,
    pub cross_predicate_policy: Option<CrossPredicatePolicy>,
    pub strict_from: bool,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
