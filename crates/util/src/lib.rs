//! Helpers shared by the `gcphcp` command line: configuration file loading,
//! resource type aliases, secret redaction, relative time formatting and the
//! text/JSON/YAML renderers for workflow results.

pub mod aliases;
pub mod config;
pub mod output;
pub mod text_processing;
pub mod time_format;

pub use aliases::canonical_resource_type;
pub use config::{CliConfig, ConfigFileError, expand_tilde, resolve_config_path};
pub use output::{OutputFormat, RenderError, Table, render_describe, render_resource_table, render_structured};
pub use text_processing::{redact_sensitive, redact_sensitive_with};
pub use time_format::{age_at, format_duration, format_elapsed, format_timestamp};
