use std::{borrow::Cow, fmt, str::FromStr};

use crate::{error::FlavorError, protocol::ProtocolId};

use super::Subsystem;

/// A server for `service` must be started over `protocol`.
///
/// Rendered as `<listener>-<service>`, e.g. `grpc-vtworker` or
/// `bsonrpc-vt-vtctl`, which is also the form accepted by [`FromStr`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceBinding {
    protocol: ProtocolId,
    service: Cow<'static, str>,
}

impl ServiceBinding {
    pub fn new(protocol: ProtocolId, service: impl Into<Cow<'static, str>>) -> Self {
        Self {
            protocol,
            service: service.into(),
        }
    }

    pub fn protocol(&self) -> &ProtocolId {
        &self.protocol
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Subsystem whose protocol choice governs this service.
    pub fn subsystem(&self) -> Option<Subsystem> {
        Subsystem::from_service_name(&self.service)
    }
}

impl fmt::Display for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.protocol.listener_name(), self.service)
    }
}

impl FromStr for ServiceBinding {
    type Err = FlavorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match ProtocolId::split_listener(s) {
            Some((protocol, service)) if !service.is_empty() => {
                Ok(ServiceBinding::new(protocol, service.to_string()))
            }
            _ => Err(FlavorError::InvalidServiceBinding(s.to_string())),
        }
    }
}
