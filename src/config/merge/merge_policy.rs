//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("collector.flush_interval", 1000)?
        .set_default("collector.generate_index", true)?
        .set_default("collector.worker_env_var", "SHARDFOLD_WORKER_ID")?
        .set_default("logging.level", "warn")?
        .set_default("logging.output", "stderr")
}
