//! Shell Configuration
//!
//! JSON configuration for a cache worker: the generation name, the
//! scope the worker controls, the asset manifest to pre-cache, and an
//! optional offline fallback page. Scope handling also lives here so
//! manifest entries can be resolved to absolute URLs.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::Deserialize;

// ── Scope ───────────────────────────────────────────────────

/// URL prefix the worker controls, always slash-terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope(String);

impl Scope {
    /// Create a scope, appending a trailing slash if missing.
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.ends_with('/') {
            path.push('/');
        }
        Self(path)
    }

    /// Get the scope path.
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Check if a URL falls under this scope.
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.0)
    }

    /// Resolve a manifest entry to an absolute URL.
    ///
    /// `"./"` names the scope root. Entries carrying a scheme or a
    /// leading slash are taken as-is, everything else is joined onto
    /// the scope.
    pub fn resolve(&self, entry: &str) -> String {
        if entry == "./" || entry == "." {
            return self.0.clone();
        }
        if entry.contains("://") {
            return entry.to_string();
        }
        if let Some(rest) = entry.strip_prefix("./") {
            return format!("{}{}", self.0, rest);
        }
        if entry.starts_with('/') {
            return entry.to_string();
        }
        format!("{}{}", self.0, entry)
    }
}

// ── Asset manifest ──────────────────────────────────────────

/// Ordered list of asset URLs to pre-cache at install.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AssetManifest(pub Vec<String>);

impl AssetManifest {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the manifest has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve every entry against a scope, preserving order.
    pub fn resolved(&self, scope: &Scope) -> Vec<String> {
        self.0.iter().map(|entry| scope.resolve(entry)).collect()
    }
}

// ── Configuration ───────────────────────────────────────────

/// Cache worker configuration.
///
/// Parsed from JSON:
///
/// ```json
/// {
///     "generation": "shell-v1",
///     "scope": "/",
///     "assets": ["./", "index.html", "app.js"],
///     "offline_fallback": "index.html"
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    /// Cache generation this worker installs and serves from.
    pub generation: String,
    /// Scope prefix the worker controls.
    #[serde(default = "default_scope")]
    pub scope: String,
    /// Assets to pre-cache at install.
    pub assets: AssetManifest,
    /// Page served when a network fetch fails, if configured.
    #[serde(default)]
    pub offline_fallback: Option<String>,
}

fn default_scope() -> String {
    "/".to_string()
}

impl ShellConfig {
    /// Create a configuration with the default scope.
    pub fn new(generation: impl Into<String>, assets: AssetManifest) -> Self {
        Self {
            generation: generation.into(),
            scope: default_scope(),
            assets,
            offline_fallback: None,
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ShellConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check for values the worker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.is_empty() {
            return Err(ConfigError::EmptyGeneration);
        }
        if self.assets.is_empty() {
            return Err(ConfigError::EmptyManifest);
        }
        if self.assets.0.iter().any(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::BlankEntry);
        }
        Ok(())
    }
}

// ── Errors ──────────────────────────────────────────────────

/// Configuration error types.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// JSON parsing failed.
    Parse(String),
    /// The generation name is empty.
    EmptyGeneration,
    /// The asset manifest has no entries.
    EmptyManifest,
    /// A manifest entry is empty or whitespace.
    BlankEntry,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "invalid config: {}", msg),
            ConfigError::EmptyGeneration => write!(f, "generation name is empty"),
            ConfigError::EmptyManifest => write!(f, "asset manifest is empty"),
            ConfigError::BlankEntry => write!(f, "asset manifest entry is blank"),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn scope_appends_trailing_slash() {
        assert_eq!(Scope::new("/app").path(), "/app/");
        assert_eq!(Scope::new("/app/").path(), "/app/");
        assert_eq!(Scope::new("/").path(), "/");
    }

    #[test]
    fn scope_contains() {
        let scope = Scope::new("/app");
        assert!(scope.contains("/app/index.html"));
        assert!(scope.contains("/app/"));
        assert!(!scope.contains("/admin/index.html"));
        assert!(!scope.contains("/app"));
    }

    #[test]
    fn resolve_dot_slash_is_scope_root() {
        assert_eq!(Scope::new("/").resolve("./"), "/");
        assert_eq!(Scope::new("/app").resolve("./"), "/app/");
        assert_eq!(Scope::new("/app").resolve("."), "/app/");
    }

    #[test]
    fn resolve_relative_entries() {
        let root = Scope::new("/");
        assert_eq!(root.resolve("index.html"), "/index.html");
        assert_eq!(root.resolve("./app.js"), "/app.js");

        let app = Scope::new("/app/");
        assert_eq!(app.resolve("style.css"), "/app/style.css");
        assert_eq!(app.resolve("./icons/icon.png"), "/app/icons/icon.png");
    }

    #[test]
    fn resolve_absolute_and_external_entries() {
        let app = Scope::new("/app/");
        assert_eq!(app.resolve("/shared/logo.png"), "/shared/logo.png");
        assert_eq!(
            app.resolve("https://cdn.example.com/lib.js"),
            "https://cdn.example.com/lib.js"
        );
    }

    #[test]
    fn manifest_resolved_preserves_order() {
        let manifest = AssetManifest(vec![
            "./".to_string(),
            "index.html".to_string(),
            "app.js".to_string(),
        ]);
        assert_eq!(
            manifest.resolved(&Scope::new("/")),
            vec!["/", "/index.html", "/app.js"]
        );
    }

    #[test]
    fn config_from_json() {
        let config = ShellConfig::from_json(
            r#"{
                "generation": "shell-v1",
                "assets": ["./", "index.html", "app.js", "manifest.json", "icon.png"],
                "offline_fallback": "index.html"
            }"#,
        )
        .unwrap();
        assert_eq!(config.generation, "shell-v1");
        assert_eq!(config.scope, "/");
        assert_eq!(config.assets.len(), 5);
        assert_eq!(config.offline_fallback.as_deref(), Some("index.html"));
    }

    #[test]
    fn config_rejects_bad_json() {
        assert!(matches!(
            ShellConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn config_rejects_empty_generation() {
        assert!(matches!(
            ShellConfig::from_json(r#"{"generation": "", "assets": ["./"]}"#),
            Err(ConfigError::EmptyGeneration)
        ));
    }

    #[test]
    fn config_rejects_empty_manifest() {
        assert!(matches!(
            ShellConfig::from_json(r#"{"generation": "shell-v1", "assets": []}"#),
            Err(ConfigError::EmptyManifest)
        ));
    }

    #[test]
    fn config_rejects_blank_manifest_entries() {
        // A blank entry would resolve to the scope root and shadow "./".
        assert!(matches!(
            ShellConfig::from_json(r#"{"generation": "shell-v1", "assets": ["./", ""]}"#),
            Err(ConfigError::BlankEntry)
        ));
        assert!(matches!(
            ShellConfig::from_json(r#"{"generation": "shell-v1", "assets": ["./", "   "]}"#),
            Err(ConfigError::BlankEntry)
        ));
    }

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::EmptyGeneration.to_string(),
            "generation name is empty"
        );
        assert_eq!(
            ConfigError::EmptyManifest.to_string(),
            "asset manifest is empty"
        );
        assert_eq!(
            ConfigError::BlankEntry.to_string(),
            "asset manifest entry is blank"
        );
    }
}
