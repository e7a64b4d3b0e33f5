//! Merge rules: defaults applied beneath every source.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("server.url", crate::config::DEFAULT_SERVER)?
        .set_default("compile.compiler", crate::config::DEFAULT_COMPILER)?
        .set_default("compile.args", "")?
        .set_default("watch.debounce_ms", 100)
}
