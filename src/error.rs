use thiserror::Error;

use crate::{protocol::ProtocolId, registry::Role};

/// Startup-time configuration failures. None of these are transient; a
/// process that hits one should exit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlavorError {
    #[error("configuration error: a protocols flavor is already installed ('{0}')")]
    AlreadyInstalled(String),

    #[error("configuration error: no protocols flavor installed")]
    NotInstalled,

    #[error("duplicate registration of protocol '{protocol}' for {role}")]
    DuplicateRegistration { role: Role, protocol: ProtocolId },

    #[error("no implementation of protocol '{protocol}' registered for {role}")]
    UnregisteredProtocol { role: Role, protocol: ProtocolId },

    #[error("invalid service map entry '{0}'")]
    InvalidServiceBinding(String),
}

impl FlavorError {
    /// Install twice, or query before install.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::AlreadyInstalled(_) | Self::NotInstalled)
    }
}
