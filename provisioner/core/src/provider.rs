use std::{fmt, str::FromStr};

/// Where the cluster runs. Selects the mesh scaling profile and whether credentials are exported.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    /// A managed Linode Kubernetes Engine cluster.
    Linode,

    /// A local development cluster.
    Minikube,
}

/// Raised before any derivation happens; nothing is produced for a misconfigured run.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("provider must be either \"minikube\" or \"linode\" (got {0:?})")]
    UnknownProvider(String),

    #[error("no provider selected")]
    MissingProvider,

    #[error("provider {0} exports cluster credentials, but no kubeconfig was supplied")]
    MissingKubeconfig(Provider),

    #[error("the kubeconfig supplied for provider {0} is empty")]
    EmptyKubeconfig(Provider),
}

// === impl Provider ===

impl Provider {
    /// Managed clusters hand their kubeconfig back to the caller; local clusters use the
    /// ambient context.
    pub fn exports_credentials(&self) -> bool {
        matches!(self, Self::Linode)
    }
}

impl FromStr for Provider {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linode" => Ok(Self::Linode),
            "minikube" => Ok(Self::Minikube),
            s => Err(ConfigurationError::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linode => "linode".fmt(f),
            Self::Minikube => "minikube".fmt(f),
        }
    }
}
