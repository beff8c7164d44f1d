//! Configuration management for srcfix
//!
//! Configuration is layered with figment: embedded defaults, then a
//! repository file (or an explicit `--config` file), then `SRCFIX_*`
//! environment variables. The merged result is extracted into
//! [`SrcfixConfig`].

use anyhow::{Context, Result, bail};
use encoding_rs::Encoding;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod options;
mod smart_load;

#[cfg(test)]
mod tests;

pub use options::Options;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Main configuration structure for srcfix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrcfixConfig {
    /// Encoding label for tool output and rewritten files
    pub encoding: String,

    /// Environment variable naming the include directory for the refactor tool
    pub include_env: String,

    /// Worker pool limits
    pub parallel: ParallelConfig,

    /// Work-list resolution
    pub files: FilesConfig,

    /// Analysis tools
    pub repair: RepairConfig,

    /// Formatter
    pub format: FormatConfig,
}

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    /// Maximum number of file workers (0 = no limit)
    #[serde(default)]
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    #[serde(default = "default_thread_percentage")]
    pub thread_percentage: u8,

    /// Drop verbose progress lines when several workers run at once
    #[serde(default = "default_true")]
    pub quiet_when_parallel: bool,
}

fn default_thread_percentage() -> u8 {
    100
}

fn default_true() -> bool {
    true
}

/// Which files a directory argument expands to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// File name globs, e.g. "*.cpp"
    pub include: Vec<String>,
}

/// Analysis tool set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Tools that only read the file, in run order
    #[serde(default)]
    pub tools: Vec<ToolConfig>,

    /// Tool run after all others; it may rewrite the file
    #[serde(default)]
    pub refactor: Option<ToolConfig>,
}

/// How a tool's output is turned into report text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Filtered pass-through
    #[default]
    Plain,
    /// "Duplicate block:" sections from a complexity analyzer
    ComplexityDuplicates,
    /// "Found a N line (M tokens) duplication" reports
    CrossFileDuplicates,
}

/// One external analysis tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Display name (also used as the thread name)
    pub name: String,

    /// Program to execute
    pub program: String,

    /// Argument template; supports `{file}` and `{include}`
    #[serde(default)]
    pub args: Vec<String>,

    /// Output lines containing this substring are dropped
    #[serde(default)]
    pub ignore: Option<String>,

    /// Output scanner
    #[serde(default)]
    pub output: OutputKind,

    /// Tool name used inside diagnostics (defaults to `name`)
    #[serde(default)]
    pub label: Option<String>,

    /// Partially useful tool, skipped with --essential-only
    #[serde(default)]
    pub partial: bool,

    /// Whether this tool runs at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl ToolConfig {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Formatter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Display name
    pub name: String,

    /// Program printing the formatted file on stdout
    pub program: String,

    /// Argument template; supports `{file}`
    #[serde(default)]
    pub args: Vec<String>,

    /// Literal (from, to) substitutions applied to every formatted line
    #[serde(default)]
    pub replacements: Vec<(String, String)>,
}

impl SrcfixConfig {
    /// Load defaults, the repository config file and environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_with_custom_config(None)
    }

    /// Like [`SrcfixConfig::load`], but a custom file replaces the repository file.
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            if !custom_path.is_file() {
                bail!("Config file not found: {}", custom_path.display());
            }
            tracing::debug!("CONFIG LOAD: Using custom config {}", custom_path.display());
            figment = figment.merge(smart_load::auto(custom_path));
        } else {
            figment = figment
                .merge(Toml::file("srcfix.toml"))
                .merge(Json::file("srcfix.json"))
                .merge(Yaml::file("srcfix.yaml"))
                .merge(Yaml::file("srcfix.yml"));
        }

        // Environment variables always have highest priority
        figment = figment.merge(Env::prefixed("SRCFIX_").split("__"));

        Self::extract(figment)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml_overrides(overrides: &str) -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::string(overrides));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .context("Failed to parse srcfix configuration")?;
        config.validate()?;
        tracing::trace!(
            "CONFIG LOAD: {} analysis tools, refactor = {:?}",
            config.repair.tools.len(),
            config.repair.refactor.as_ref().map(|t| &t.name)
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.encoding()?;

        if !(1..=100).contains(&self.parallel.thread_percentage) {
            bail!(
                "parallel.thread_percentage must be within 1..=100, got {}",
                self.parallel.thread_percentage
            );
        }

        let tools = self.repair.tools.iter().chain(self.repair.refactor.iter());
        for tool in tools {
            if tool.program.trim().is_empty() {
                bail!("Tool '{}' has no program", tool.name);
            }
        }

        if self.format.program.trim().is_empty() {
            bail!("Formatter '{}' has no program", self.format.name);
        }

        Ok(())
    }

    /// The configured text encoding.
    ///
    /// Only encodings that `encoding_rs` can also write are accepted: files
    /// are decoded and rewritten with the same encoding.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        let encoding = Encoding::for_label(self.encoding.trim().as_bytes())
            .with_context(|| format!("Unknown encoding '{}'", self.encoding))?;
        if encoding.output_encoding() != encoding {
            bail!(
                "Encoding '{}' cannot be written back ({} output is {})",
                self.encoding,
                encoding.name(),
                encoding.output_encoding().name()
            );
        }
        Ok(encoding)
    }
}
