//! Configuration management for the recon service.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Placeholder substituted with the scan target in tool arguments.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Main application configuration.
///
/// This is loaded from `~/.config/recon/config.toml` (or platform equivalent),
/// or from the path in `RECON_CONFIG`. If the file doesn't exist, default
/// values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// External tool invocations
    pub tools: ToolsConfig,
    /// Liveness probe settings
    pub probe: ProbeConfig,
    /// Stage deadlines
    pub pipeline: PipelineConfig,
    /// Report output settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = match std::env::var_os("RECON_CONFIG") {
            Some(path) => PathBuf::from(path),
            None => Self::config_path()?,
        };
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, using defaults if it is absent.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `RECON_BIND_ADDR`: Override server bind address
    /// - `RECON_WORK_DIR`: Override directory reports are written to
    /// - `RECON_RESULTS_DIR`: Override the parameter tool's results directory
    /// - `RECON_PROBE_CONCURRENCY`: Override the probe concurrency ceiling
    /// - `RECON_PROBE_TIMEOUT_SECS`: Override the per-request probe timeout
    /// - `RECON_STDERR_POLICY`: `strict` or `lenient`
    /// - `RECON_PARAM_SOURCE`: `results_dir` or `stdout`
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("RECON_BIND_ADDR") {
            tracing::debug!("Override server.bind_addr from env: {}", val);
            self.server.bind_addr = val;
        }

        if let Some(val) = lookup("RECON_WORK_DIR") {
            tracing::debug!("Override output.work_dir from env: {}", val);
            self.output.work_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("RECON_RESULTS_DIR") {
            tracing::debug!("Override tools.results_dir from env: {}", val);
            self.tools.results_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("RECON_PROBE_CONCURRENCY") {
            if let Ok(max) = val.parse() {
                self.probe.max_concurrency = max;
                tracing::debug!("Override probe.max_concurrency from env: {}", max);
            }
        }

        if let Some(val) = lookup("RECON_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.probe.timeout_secs = secs;
                tracing::debug!("Override probe.timeout_secs from env: {}", secs);
            }
        }

        if let Some(val) = lookup("RECON_STDERR_POLICY") {
            if let Ok(policy) = val.parse() {
                self.tools.stderr_policy = policy;
                tracing::debug!("Override tools.stderr_policy from env: {}", policy);
            }
        }

        if let Some(val) = lookup("RECON_PARAM_SOURCE") {
            if let Ok(source) = val.parse() {
                self.output.param_source = source;
                tracing::debug!("Override output.param_source from env: {}", source);
            }
        }
    }

    /// Check values that would make a scan impossible.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.probe.max_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.max_concurrency".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.probe.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        for (name, tool) in self.tools.iter() {
            if tool.program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: format!("tools.{name}.program"),
                    reason: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/recon/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "recon", "recon").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the scan endpoint listens on
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
        }
    }
}

/// One external program and its argument pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    /// Program name or path
    pub program: String,
    /// Arguments; `{target}` is replaced with the host being processed
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Create a tool command from a program and argument pattern.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Arguments with the target placeholder substituted.
    #[must_use]
    pub fn args_for(&self, target: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(TARGET_PLACEHOLDER, target))
            .collect()
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// How the process runner treats text on standard error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StderrPolicy {
    /// Any stderr output degrades the invocation to an empty result
    #[default]
    Strict,
    /// Stderr is logged; stdout is kept if the process exited successfully
    Lenient,
}

impl FromStr for StderrPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(ConfigError::InvalidValue {
                field: "tools.stderr_policy".to_string(),
                reason: format!("expected 'strict' or 'lenient', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for StderrPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Directory the parameter harvester writes `<host>.txt` files into
    pub results_dir: PathBuf,
    /// Treatment of tool stderr output
    pub stderr_policy: StderrPolicy,
    /// First subdomain enumerator
    pub subfinder: ToolCommand,
    /// Second subdomain enumerator
    pub assetfinder: ToolCommand,
    /// Archived-URL harvester
    pub waybackurls: ToolCommand,
    /// Parameter-discovery harvester
    pub paramspider: ToolCommand,
}

impl ToolsConfig {
    /// Iterate over the configured tools with their section names.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ToolCommand)> {
        [
            ("subfinder", &self.subfinder),
            ("assetfinder", &self.assetfinder),
            ("waybackurls", &self.waybackurls),
            ("paramspider", &self.paramspider),
        ]
        .into_iter()
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            stderr_policy: StderrPolicy::default(),
            subfinder: ToolCommand::new("subfinder", ["-d", TARGET_PLACEHOLDER]),
            assetfinder: ToolCommand::new("assetfinder", ["--subs-only", TARGET_PLACEHOLDER]),
            waybackurls: ToolCommand::new("waybackurls", [TARGET_PLACEHOLDER]),
            paramspider: ToolCommand::new("paramspider", ["--domain", TARGET_PLACEHOLDER]),
        }
    }
}

/// Liveness probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum number of in-flight probe requests
    pub max_concurrency: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// URL scheme used to build probe URLs
    pub scheme: String,
    /// Maximum redirects followed per probe
    pub max_redirects: usize,
    /// User agent string
    pub user_agent: String,
}

impl ProbeConfig {
    /// Per-request timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 100,
            timeout_secs: 10,
            scheme: "http".to_string(),
            max_redirects: 10,
            user_agent: concat!("recon/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Per-stage deadlines. Unset means the stage may run indefinitely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Deadline for both enumerators, in seconds
    pub discovery_timeout_secs: Option<u64>,
    /// Deadline for the whole probe fan-out, in seconds
    pub probe_stage_timeout_secs: Option<u64>,
    /// Deadline for all harvest invocations, in seconds
    pub harvest_timeout_secs: Option<u64>,
}

impl PipelineConfig {
    /// Discovery stage deadline.
    #[must_use]
    pub fn discovery_timeout(&self) -> Option<Duration> {
        self.discovery_timeout_secs.map(Duration::from_secs)
    }

    /// Probe stage deadline.
    #[must_use]
    pub fn probe_stage_timeout(&self) -> Option<Duration> {
        self.probe_stage_timeout_secs.map(Duration::from_secs)
    }

    /// Harvest stage deadline.
    #[must_use]
    pub fn harvest_timeout(&self) -> Option<Duration> {
        self.harvest_timeout_secs.map(Duration::from_secs)
    }
}

/// Which capture of the parameter harvester feeds the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamSource {
    /// Files the tool wrote into the results directory
    #[default]
    ResultsDir,
    /// Lines captured from the tool's standard output
    Stdout,
}

impl FromStr for ParamSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "results_dir" => Ok(Self::ResultsDir),
            "stdout" => Ok(Self::Stdout),
            other => Err(ConfigError::InvalidValue {
                field: "output.param_source".to_string(),
                reason: format!("expected 'results_dir' or 'stdout', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResultsDir => write!(f, "results_dir"),
            Self::Stdout => write!(f, "stdout"),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory `<domain>.json` reports are written to
    pub work_dir: PathBuf,
    /// Authoritative source for `paramspider_data`
    pub param_source: ParamSource,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            param_source: ParamSource::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
        assert_eq!(config.probe.max_concurrency, 100);
        assert_eq!(config.probe.timeout(), Duration::from_secs(10));
        assert_eq!(config.probe.scheme, "http");
        assert_eq!(config.tools.stderr_policy, StderrPolicy::Strict);
        assert_eq!(config.output.param_source, ParamSource::ResultsDir);
        assert_eq!(config.tools.results_dir, PathBuf::from("results"));
        assert!(config.pipeline.discovery_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tool_args_substitution() {
        let tools = ToolsConfig::default();
        assert_eq!(tools.subfinder.args_for("ex.com"), vec!["-d", "ex.com"]);
        assert_eq!(
            tools.assetfinder.args_for("ex.com"),
            vec!["--subs-only", "ex.com"]
        );
        assert_eq!(tools.waybackurls.args_for("a.ex.com"), vec!["a.ex.com"]);
        assert_eq!(
            tools.paramspider.args_for("a.ex.com"),
            vec!["--domain", "a.ex.com"]
        );
        assert_eq!(tools.subfinder.to_string(), "subfinder -d {target}");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[probe]"));
        assert!(toml_str.contains("[tools.subfinder]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.tools.paramspider, config.tools.paramspider);
        assert_eq!(parsed.probe.max_concurrency, config.probe.max_concurrency);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let toml_str = r#"
[probe]
max_concurrency = 25

[pipeline]
harvest_timeout_secs = 600

[tools]
stderr_policy = "lenient"

[tools.subfinder]
program = "/opt/bin/subfinder"
args = ["-silent", "-d", "{target}"]

[output]
param_source = "stdout"
"#;
        fs::write(&config_path, toml_str).expect("write config file");

        let config = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(config.probe.max_concurrency, 25);
        assert_eq!(config.probe.timeout_secs, 10);
        assert_eq!(
            config.pipeline.harvest_timeout(),
            Some(Duration::from_secs(600))
        );
        assert_eq!(config.tools.stderr_policy, StderrPolicy::Lenient);
        assert_eq!(config.tools.subfinder.program, "/opt/bin/subfinder");
        assert_eq!(config.tools.assetfinder.program, "assetfinder");
        assert_eq!(config.output.param_source, ParamSource::Stdout);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().expect("create temp dir");
        let config = AppConfig::load_from(&tmp.path().join("absent.toml")).expect("defaults");
        assert_eq!(config.probe.max_concurrency, 100);
    }

    #[test]
    fn test_load_rejects_zero_concurrency() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[probe]\nmax_concurrency = 0\n").expect("write config file");

        let err = AppConfig::load_from(&config_path).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "probe.max_concurrency"
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("RECON_BIND_ADDR", "0.0.0.0:8080"),
            ("RECON_WORK_DIR", "/tmp/reports"),
            ("RECON_PROBE_CONCURRENCY", "7"),
            ("RECON_PROBE_TIMEOUT_SECS", "not-a-number"),
            ("RECON_STDERR_POLICY", "Lenient"),
            ("RECON_PARAM_SOURCE", "stdout"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.output.work_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.probe.max_concurrency, 7);
        // Unparseable values leave the previous setting in place
        assert_eq!(config.probe.timeout_secs, 10);
        assert_eq!(config.tools.stderr_policy, StderrPolicy::Lenient);
        assert_eq!(config.output.param_source, ParamSource::Stdout);
    }

    #[test]
    fn test_enum_parsing_errors() {
        assert!("loud".parse::<StderrPolicy>().is_err());
        assert!("disk".parse::<ParamSource>().is_err());
        assert_eq!("RESULTS_DIR".parse::<ParamSource>().ok(), Some(ParamSource::ResultsDir));
    }
}
