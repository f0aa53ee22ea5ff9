//! Per-invocation state shared by the `ops` commands: merged configuration,
//! output format and the interrupt token.

use std::time::Duration;

use anyhow::{Context, Result};
use gcphcp_api::{GatewayConfig, WorkflowsClient};
use gcphcp_engine::WaitControl;
use gcphcp_types::WorkflowScope;
use gcphcp_util::{CliConfig, OutputFormat};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::GlobalArgs;

pub struct Session {
    config: CliConfig,
    pub output: OutputFormat,
    pub cancel: CancellationToken,
}

impl Session {
    /// Merge flags and environment (already folded together by clap) over the
    /// config file.
    pub fn load(global: &GlobalArgs, cancel: CancellationToken) -> Result<Self> {
        let file = CliConfig::load(global.config.as_deref()).context("loading config file")?;
        let config = CliConfig {
            project: global.project.clone(),
            region: global.region.clone(),
            output: global.output.clone(),
        }
        .or(file);
        let output = config.output.as_deref().map(OutputFormat::parse).unwrap_or_default();
        debug!(project = ?config.project, region = ?config.region, ?output, "resolved configuration");
        Ok(Self { config, output, cancel })
    }

    pub fn scope(&self) -> Result<WorkflowScope> {
        Ok(WorkflowScope::new(
            self.config.require_project()?,
            self.config.require_region()?,
        ))
    }

    /// Resolve credentials and build a client for the configured scope.
    pub async fn connect(&self) -> Result<WorkflowsClient> {
        let gateway = GatewayConfig::from_env(self.scope()?);
        WorkflowsClient::connect(&gateway).await.context("creating client")
    }

    pub fn wait_control(&self, timeout: Duration) -> WaitControl {
        WaitControl::with_timeout(timeout).with_cancel(self.cancel.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcphcp_util::config::CONFIG_PATH_ENV;

    fn args(project: Option<&str>, config: Option<&str>) -> GlobalArgs {
        GlobalArgs {
            project: project.map(String::from),
            region: None,
            output: None,
            config: config.map(String::from),
            verbose: false,
        }
    }

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "project: file-project\nregion: us-east1\noutput: yaml\n").expect("write");

        let session = Session::load(&args(Some("flag-project"), path.to_str()), CancellationToken::new()).expect("loads");

        assert_eq!(session.scope().expect("scope"), WorkflowScope::new("flag-project", "us-east1"));
        assert_eq!(session.output, OutputFormat::Yaml);
    }

    #[test]
    fn missing_region_names_flag_and_variable() {
        let dir = tempfile::tempdir().expect("tempdir");
        temp_env::with_var(CONFIG_PATH_ENV, Some(dir.path().join("absent.yaml").to_str().expect("utf8")), || {
            let session = Session::load(&args(Some("p"), None), CancellationToken::new()).expect("loads");

            assert_eq!(session.output, OutputFormat::Text);
            let error = session.scope().expect_err("no region");
            assert_eq!(error.to_string(), "--region is required (or set GCPHCP_REGION)");
        });
    }
}
