//! `kubectl get pods` collaborator.
//!
//! Runs the orchestration CLI under the configured timeout and hands back
//! its stdout untouched. Parsing belongs to `podwatch-health`.

use std::process::Stdio;

use anyhow::{anyhow, bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info};

use podwatch_core::config::KubectlConfig;

/// Arguments for a wide, header-less pod listing of the driver's node pods.
pub fn pod_list_args(config: &KubectlConfig) -> Vec<String> {
    let mut args = vec![
        "get".to_string(),
        "pods".to_string(),
        "-n".to_string(),
        config.namespace.clone(),
        "-o".to_string(),
        "wide".to_string(),
        "--no-headers".to_string(),
        "--ignore-not-found".to_string(),
    ];
    if !config.selector.is_empty() {
        args.push("-l".to_string());
        args.push(config.selector.clone());
    }
    if let Some(kubeconfig) = &config.kubeconfig {
        args.push(format!("--kubeconfig={}", kubeconfig.display()));
    }
    args
}

/// Run `kubectl get pods` and return its stdout.
pub async fn get_pods(config: &KubectlConfig) -> Result<String> {
    let timeout = config.timeout()?;
    let args = pod_list_args(config);

    info!(binary = %config.binary, namespace = %config.namespace, "listing pods");
    debug!(?args, ?timeout, "kubectl invocation");

    let mut cmd = Command::new(&config.binary);
    cmd.args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| anyhow!("'{}' timed out after {:?}", config.binary, timeout))?
        .with_context(|| format!("failed to execute '{}'", config.binary))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let reason = stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no error output");
        bail!("'{}' exited with {}: {}", config.binary, output.status, reason);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    debug!(lines = stdout.lines().count(), "kubectl output captured");
    Ok(stdout)
}
