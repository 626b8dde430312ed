//! `podwatch pods` and `podwatch restarts` — driver node pod checks.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use podwatch_core::{PodwatchConfig, Thresholds, Verdict};
use podwatch_health::{parse_rows, Evaluator, MatchSet, Policy};

use super::identity::{self, HOSTS_FILE};
use super::{kubectl, read_capture};

#[derive(Debug, Clone, Default, Args)]
pub struct PodArgs {
    /// Node hostname to check (default: the local hostname)
    #[arg(long)]
    pub hostname: Option<String>,
    /// Additional node identity (hostname, FQDN, or IP); repeatable
    #[arg(long = "identity", value_name = "IDENTITY")]
    pub identities: Vec<String>,
    /// kubeconfig passed to kubectl
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,
    /// Warn when an instance restarted more than this many times
    #[arg(short, long)]
    pub warn: Option<u32>,
    /// Go critical when an instance restarted more than this many times
    #[arg(short, long)]
    pub crit: Option<u32>,
    /// Read captured `kubectl get pods -o wide` output instead of running kubectl ("-" for stdin)
    #[arg(long)]
    pub input: Option<PathBuf>,
}

impl PodArgs {
    /// Thresholds from flags, falling back to the config file.
    pub fn thresholds(&self, base: Thresholds) -> Result<Thresholds> {
        let thresholds = Thresholds {
            warn: self.warn.unwrap_or(base.warn),
            crit: self.crit.unwrap_or(base.crit),
        };
        if thresholds.warn > thresholds.crit {
            bail!(
                "warning threshold {} exceeds critical threshold {}",
                thresholds.warn,
                thresholds.crit
            );
        }
        Ok(thresholds)
    }
}

pub async fn run(args: &PodArgs, config: &PodwatchConfig, policy: Policy) -> Result<Verdict> {
    run_with_hosts(args, config, policy, Path::new(HOSTS_FILE)).await
}

async fn run_with_hosts(
    args: &PodArgs,
    config: &PodwatchConfig,
    policy: Policy,
    hosts_file: &Path,
) -> Result<Verdict> {
    let identities = identity::discover(args.hostname.as_deref(), &args.identities, hosts_file).await;
    if identities.is_empty() {
        return Ok(Verdict::unknown("No candidate identity given."));
    }
    let thresholds = args.thresholds(config.thresholds)?;

    let output = match &args.input {
        Some(path) => read_capture(path)?,
        None => {
            let mut kubectl_config = config.kubectl.clone();
            if let Some(kubeconfig) = &args.kubeconfig {
                kubectl_config.kubeconfig = Some(kubeconfig.clone());
            }
            kubectl::get_pods(&kubectl_config).await?
        }
    };

    let mut rows = MatchSet::select(parse_rows(&output), &identities);
    if policy == Policy::RestartsOnly {
        rows = rows.with_name_prefix(&config.check.name_prefix);
    }

    let decision = Evaluator::new(policy)
        .with_thresholds(thresholds)
        .with_subject(config.check.subject.as_str())
        .decide(&rows);

    info!(
        ?policy,
        rule = decision.rule,
        matched = rows.len(),
        code = %decision.verdict.code,
        "pod check complete"
    );
    Ok(decision.verdict)
}
