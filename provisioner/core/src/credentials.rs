use crate::{ConfigurationError, Provider};
use std::fmt;

/// A kubeconfig document. Its contents are never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct Kubeconfig(String);

/// How the provisioning subsystem reached the cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClusterAccess {
    /// Credentials produced while creating the cluster.
    Kubeconfig(Kubeconfig),

    /// The caller's ambient client configuration, e.g. a local minikube context.
    Ambient,
}

/// Credentials surfaced to the caller at the end of a run.
///
/// Whether anything is exported is decided by the provider alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportedCredentials {
    Kubeconfig(Kubeconfig),
    NotExported,
}

// === impl Kubeconfig ===

impl Kubeconfig {
    pub fn new(contents: impl Into<String>) -> Self {
        Self(contents.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Kubeconfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Kubeconfig").field(&"<redacted>").finish()
    }
}

// === impl ExportedCredentials ===

impl ExportedCredentials {
    pub fn for_provider(
        provider: Provider,
        access: ClusterAccess,
    ) -> Result<Self, ConfigurationError> {
        if !provider.exports_credentials() {
            return Ok(Self::NotExported);
        }

        match access {
            ClusterAccess::Kubeconfig(kc) if kc.0.trim().is_empty() => {
                Err(ConfigurationError::EmptyKubeconfig(provider))
            }
            ClusterAccess::Kubeconfig(kc) => Ok(Self::Kubeconfig(kc)),
            ClusterAccess::Ambient => Err(ConfigurationError::MissingKubeconfig(provider)),
        }
    }

    pub fn kubeconfig(&self) -> Option<&Kubeconfig> {
        match self {
            Self::Kubeconfig(kc) => Some(kc),
            Self::NotExported => None,
        }
    }
}
