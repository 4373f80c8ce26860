//! Containerized executor backed by the Docker API.
//!
//! Runs invocations inside the official terraform image with the working
//! directory bind-mounted into the container, so no terraform binary is
//! needed on the host.

use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, RemoveContainerOptions,
    StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::service::{HostConfig, Mount, MountTypeEnum};
use bollard::Docker;
use chrono::Utc;
use futures_util::StreamExt;
use tokio::time::timeout;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ExecError, ExecResult};
use crate::executor::{CommandExecutor, ExecutionResult};
use crate::invocation::{Invocation, RunConfig};

const CONTAINER_WORKDIR: &str = "/workspace";

/// Executor that runs invocations in a terraform container.
pub struct DockerExecutor {
    client: Docker,
    image: String,
    tag: String,
    pull_image: bool,
}

impl DockerExecutor {
    /// Connect to the local Docker daemon.
    pub async fn new() -> ExecResult<Self> {
        let client = Docker::connect_with_local_defaults()?;
        client.ping().await?;

        Ok(Self {
            client,
            image: "hashicorp/terraform".to_string(),
            tag: "1.6".to_string(),
            pull_image: true,
        })
    }

    /// Connect to a custom Docker host.
    pub async fn with_host(host: &str) -> ExecResult<Self> {
        let client = Docker::connect_with_http(host, 120, bollard::API_DEFAULT_VERSION)?;
        client.ping().await?;

        Ok(Self {
            client,
            image: "hashicorp/terraform".to_string(),
            tag: "1.6".to_string(),
            pull_image: true,
        })
    }

    /// Use a custom image.
    pub fn with_image(mut self, image: impl Into<String>, tag: impl Into<String>) -> Self {
        self.image = image.into();
        self.tag = tag.into();
        self
    }

    /// Skip pulling the image before running.
    pub fn no_pull(mut self) -> Self {
        self.pull_image = false;
        self
    }

    /// Get the Docker daemon version.
    pub async fn daemon_version(&self) -> ExecResult<String> {
        let version = self.client.version().await?;
        Ok(format!(
            "Docker {} (API {})",
            version.version.unwrap_or_default(),
            version.api_version.unwrap_or_default()
        ))
    }

    fn full_image(&self) -> String {
        format!("{}:{}", self.image, self.tag)
    }

    async fn image_exists(&self) -> ExecResult<bool> {
        match self.client.inspect_image(&self.full_image()).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ensure_image(&self) -> ExecResult<()> {
        if self.image_exists().await? {
            return Ok(());
        }

        info!("Pulling image {}", self.full_image());

        let options = CreateImageOptions {
            from_image: self.image.as_str(),
            tag: self.tag.as_str(),
            ..Default::default()
        };

        let mut stream = self.client.create_image(Some(options), None, None);
        while let Some(result) = stream.next().await {
            match result {
                Ok(progress) => {
                    if let Some(status) = progress.status {
                        debug!("Pull status: {}", status);
                    }
                }
                Err(e) => return Err(ExecError::ImagePullFailed(e.to_string())),
            }
        }

        info!("Image {} pulled successfully", self.full_image());
        Ok(())
    }
}

#[async_trait]
impl CommandExecutor for DockerExecutor {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn is_available(&self) -> ExecResult<bool> {
        match self.client.ping().await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }

    async fn run(
        &self,
        invocation: &Invocation,
        run_config: &RunConfig,
    ) -> ExecResult<ExecutionResult> {
        let container_name = format!("tfprobe-{}", &Uuid::new_v4().to_string()[..8]);
        let started_at = Utc::now();

        debug!(
            "Running {} in container {} ({})",
            invocation.command_line(),
            container_name,
            self.full_image()
        );

        if self.pull_image {
            self.ensure_image().await?;
        }

        // Mount the invocation's working directory into the container and
        // run there. The image's entrypoint is overridden with the
        // invocation's program so any tool works, not just terraform.
        let (mounts, working_dir) = match &invocation.dir {
            Some(dir) => (
                Some(vec![Mount {
                    target: Some(CONTAINER_WORKDIR.to_string()),
                    source: Some(dir.to_string_lossy().to_string()),
                    typ: Some(MountTypeEnum::BIND),
                    read_only: Some(false),
                    ..Default::default()
                }]),
                Some(CONTAINER_WORKDIR.to_string()),
            ),
            None => (None, None),
        };

        let env: Vec<String> = invocation
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let host_config = HostConfig {
            mounts,
            auto_remove: Some(false), // removed manually after collecting logs
            ..Default::default()
        };

        let container_config = Config {
            image: Some(self.full_image()),
            entrypoint: Some(vec![invocation.program.clone()]),
            cmd: if invocation.args.is_empty() {
                None
            } else {
                Some(invocation.args.clone())
            },
            working_dir,
            env: Some(env),
            host_config: Some(host_config),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: &container_name,
            platform: None,
        };

        let container = self
            .client
            .create_container(Some(create_options), container_config)
            .await?;
        let container_id = container.id;

        self.client
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await?;

        let wait_future = async {
            let mut wait_stream = self
                .client
                .wait_container(&container_id, None::<WaitContainerOptions<String>>);

            if let Some(result) = wait_stream.next().await {
                match result {
                    Ok(exit) => return Ok(exit.status_code),
                    Err(e) => return Err(ExecError::ExecutionFailed(e.to_string())),
                }
            }
            Err(ExecError::ExecutionFailed(
                "Container wait stream ended unexpectedly".to_string(),
            ))
        };

        let exit_code = if run_config.timeout_seconds > 0 {
            match timeout(
                Duration::from_secs(run_config.timeout_seconds),
                wait_future,
            )
            .await
            {
                Ok(result) => result?,
                Err(_) => {
                    let _ = self.client.stop_container(&container_id, None).await;
                    let _ = self
                        .client
                        .remove_container(
                            &container_id,
                            Some(RemoveContainerOptions {
                                force: true,
                                ..Default::default()
                            }),
                        )
                        .await;
                    return Err(ExecError::Timeout(run_config.timeout_seconds));
                }
            }
        } else {
            wait_future.await?
        };

        let log_options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            ..Default::default()
        };

        let mut stdout = String::new();
        let mut stderr = String::new();

        let mut log_stream = self.client.logs(&container_id, Some(log_options));
        while let Some(result) = log_stream.next().await {
            match result {
                Ok(LogOutput::StdOut { message }) => {
                    stdout.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(LogOutput::StdErr { message }) => {
                    stderr.push_str(&String::from_utf8_lossy(&message));
                }
                _ => {}
            }
        }

        let _ = self
            .client
            .remove_container(
                &container_id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await;

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds() as u64;

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
        })
    }
}
