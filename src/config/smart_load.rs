use figment::providers::{Format, Json, Toml, Yaml};
use std::path::Path;

/// Choose a figment provider for a config file from its extension.
/// Unknown extensions fall back to content sniffing, then TOML.
pub fn auto<P: AsRef<Path>>(path: P) -> impl figment::Provider {
    let path = path.as_ref();
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    match extension.to_lowercase().as_str() {
        "toml" => SmartProvider::Toml(Toml::file(path)),
        "json" => SmartProvider::Json(Json::file(path)),
        "yaml" | "yml" => SmartProvider::Yaml(Yaml::file(path)),
        _ => {
            let detected = std::fs::read_to_string(path)
                .ok()
                .and_then(|content| detect_format_from_content(&content));
            tracing::debug!(
                "Config format for {} detected as {:?}",
                path.display(),
                detected
            );
            match detected {
                Some(ConfigFormat::Json) => SmartProvider::Json(Json::file(path)),
                Some(ConfigFormat::Yaml) => SmartProvider::Yaml(Yaml::file(path)),
                _ => SmartProvider::Toml(Toml::file(path)),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Wrapper enum to handle different provider types
enum SmartProvider {
    Toml(figment::providers::Data<Toml>),
    Json(figment::providers::Data<Json>),
    Yaml(figment::providers::Data<Yaml>),
}

impl figment::Provider for SmartProvider {
    fn metadata(&self) -> figment::Metadata {
        match self {
            SmartProvider::Toml(p) => p.metadata(),
            SmartProvider::Json(p) => p.metadata(),
            SmartProvider::Yaml(p) => p.metadata(),
        }
    }

    fn data(
        &self,
    ) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, figment::Error> {
        match self {
            SmartProvider::Toml(p) => p.data(),
            SmartProvider::Json(p) => p.data(),
            SmartProvider::Yaml(p) => p.data(),
        }
    }
}

fn detect_format_from_content(content: &str) -> Option<ConfigFormat> {
    let trimmed = content.trim();

    if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
    {
        return Some(ConfigFormat::Json);
    }

    // TOML before YAML: "key = value" and "[section]" lines are unambiguous
    if trimmed.lines().any(|line| {
        let line = line.trim();
        (line.starts_with('[') && line.ends_with(']'))
            || (line.contains('=') && !line.contains(':'))
    }) {
        return Some(ConfigFormat::Toml);
    }

    if trimmed.contains("---") || trimmed.lines().any(|line| line.contains(':')) {
        return Some(ConfigFormat::Yaml);
    }

    None
}
