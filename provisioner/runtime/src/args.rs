use crate::{render, Config, Format};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tenancy_provisioner_core::{ClusterAccess, ConfigurationError, Kubeconfig};
use tenancy_provisioner_k8s_bundle::{plan, Plan};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[clap(
    name = "tenancy-provisioner",
    version,
    about = "Derives the resources that isolate each tenant of a shared cluster"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "tenancy=info,warn",
        env = "TENANCY_PROVISIONER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints resource identities in apply order, with their predecessors.
    Plan {
        #[clap(flatten)]
        input: Input,
    },

    /// Prints manifests in apply order.
    ///
    /// The output is meant for a chart-aware apply engine, not `kubectl apply`: the mesh control
    /// plane is rendered as a `HelmRelease` chart descriptor with no `apiVersion`.
    Render {
        #[clap(flatten)]
        input: Input,

        /// `yaml` or `json`.
        #[clap(long, default_value = "yaml")]
        format: Format,

        /// Writes exported cluster credentials here, readable by the owner only, when the
        /// provider exports any.
        #[clap(long)]
        kubeconfig_out: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct Input {
    /// Tenant configuration file.
    #[clap(long, env = "TENANCY_CONFIG")]
    config: PathBuf,

    /// `linode` or `minikube`. Overrides the configuration file.
    #[clap(long, env = "TENANCY_PROVIDER")]
    provider: Option<String>,

    /// Credentials handed over by the cluster provisioner. Without one, the ambient client
    /// configuration is assumed.
    #[clap(long)]
    kubeconfig: Option<PathBuf>,
}

// === impl Args ===

impl Args {
    pub fn parse_and_run() -> Result<()> {
        let Self {
            log_level,
            log_format,
            command,
        } = Self::parse();

        log_format
            .try_init(log_level)
            .context("failed to configure logging")?;

        command.run()
    }
}

// === impl Command ===

impl Command {
    fn run(self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match self {
            Command::Plan { input } => {
                let plan = input.plan()?;
                render::write_listing(&mut out, &plan)?;
            }

            Command::Render {
                input,
                format,
                kubeconfig_out,
            } => {
                let plan = input.plan()?;
                render::write_manifests(&mut out, &plan.resources, format)?;

                if let Some(path) = kubeconfig_out {
                    match plan.credentials.kubeconfig() {
                        Some(kubeconfig) => {
                            write_private(&path, kubeconfig.expose()).with_context(|| {
                                format!("failed to write {}", path.display())
                            })?;
                            info!(path = %path.display(), "exported kubeconfig");
                        }
                        None => {
                            info!(provider = %plan.provider, "provider exports no credentials")
                        }
                    }
                }
            }
        }

        out.flush()?;
        Ok(())
    }
}

// === impl Input ===

impl Input {
    fn plan(&self) -> Result<Plan> {
        let config = Config::load(&self.config)?;
        debug!(path = %self.config.display(), tenants = config.tenants.len(), "loaded config");

        let provider = self
            .provider
            .clone()
            .or_else(|| config.provider.clone())
            .ok_or(ConfigurationError::MissingProvider)?;

        let access = match &self.kubeconfig {
            Some(path) => {
                let kubeconfig = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                ClusterAccess::Kubeconfig(Kubeconfig::new(kubeconfig))
            }
            None => ClusterAccess::Ambient,
        };

        let policy = config.cluster_policy();
        let plan = plan(&provider, access, config.tenants, &policy)?;
        Ok(plan)
    }
}

/// Creates or replaces `path` with mode 0600. An existing file is narrowed before it is
/// truncated and written.
#[cfg(unix)]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies when the file is created.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    file.write_all(contents.as_bytes())
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &str) -> io::Result<()> {
    fs::write(path, contents)
}
