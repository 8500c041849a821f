//! Configuration for asset-batch.
//!
//! Use [`ConfigBuilder`] at application startup to override the defaults.
//! Individual compilations can still override the nesting limit through
//! [`Compiler::with_max_depth`](crate::process::Compiler::with_max_depth).

use std::sync::OnceLock;

/// Global configuration, initialized via [`ConfigBuilder::init`].
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Default limit for nested `evaluate` calls.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default basename for directory index files (`foo/index.js` for `foo.js`).
pub const DEFAULT_INDEX_NAME: &str = "index";

/// Runtime configuration for asset-batch.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum nesting of `evaluate` calls within one compilation.
    pub max_depth: usize,
    /// Basename the filesystem registry tries inside a directory
    /// when a reference names the directory.
    pub index_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            index_name: DEFAULT_INDEX_NAME.to_string(),
        }
    }
}

/// Configuration builder for fluent API.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    max_depth: Option<usize>,
    index_name: Option<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the evaluation nesting limit.
    ///
    /// Default: 32
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the directory index basename.
    ///
    /// Default: "index"
    ///
    /// # Example
    ///
    /// ```
    /// use asset_batch::config::ConfigBuilder;
    ///
    /// ConfigBuilder::new()
    ///     .index_name("main")
    ///     .init();
    /// ```
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Build the configuration without installing it globally.
    pub fn build(self) -> Config {
        let defaults = Config::default();
        Config {
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            index_name: self.index_name.unwrap_or(defaults.index_name),
        }
    }

    /// Build and initialize the global configuration.
    ///
    /// This can only be called once. Subsequent calls are ignored.
    /// Returns `true` if configuration was set, `false` if already initialized.
    pub fn init(self) -> bool {
        CONFIG.set(self.build()).is_ok()
    }
}

/// Initialize asset-batch with default configuration.
///
/// This is equivalent to `ConfigBuilder::new().init()`.
pub fn init_default() -> bool {
    ConfigBuilder::new().init()
}

/// Get the current configuration, or default if not initialized.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.index_name, "index");
    }

    #[test]
    fn test_builder() {
        let builder = ConfigBuilder::new().max_depth(4);
        assert_eq!(builder.max_depth, Some(4));

        let config = builder.build();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.index_name, DEFAULT_INDEX_NAME);
    }
}
