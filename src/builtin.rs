//! Transport implementations shipped with the fleet.
//!
//! [`register_all`] is the startup routine that makes them resolvable. It has
//! to run before any subsystem bootstraps. The table below is the single
//! place recording which (role, protocol) pairs actually have an
//! implementation; the legacy protocol notably has none for the worker,
//! tablet manager, tablet transport or binlog surfaces.
use std::sync::Arc;

use log::info;

use crate::{
    error::FlavorError,
    flavor::{ServiceBinding, Subsystem},
    protocol::{GORPC, GRPC, ProtocolId},
    registry::{Registry, Role, SharedFactory, Side, TransportFactory},
};

/// Factory for one of the shipped transports.
#[derive(Debug, Clone)]
pub struct BuiltinFactory {
    name: String,
}

impl BuiltinFactory {
    fn new(role: Role, protocol: &ProtocolId) -> Self {
        let name = match (role.side, role.subsystem.service_name()) {
            (Side::Server, Some(service)) => {
                ServiceBinding::new(protocol.clone(), service).to_string()
            }
            _ => format!("{protocol}-{}", role.to_string().replace(' ', "-")),
        };
        Self { name }
    }
}

impl TransportFactory for BuiltinFactory {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Every shipped (role, protocol) pair.
pub fn implementations() -> Vec<(Role, ProtocolId)> {
    let mut pairs = Vec::new();

    for subsystem in Subsystem::ALL {
        pairs.push((Role::client(subsystem), GRPC));
        if subsystem.service_name().is_some() {
            pairs.push((Role::server(subsystem), GRPC));
        }
    }

    pairs.extend([
        (Role::client(Subsystem::ControlClient), GORPC),
        (Role::client(Subsystem::ControlClientCli), GORPC),
        (Role::server(Subsystem::ControlClient), GORPC),
        (Role::server(Subsystem::Gateway), GORPC),
        (Role::client(Subsystem::Gateway), GORPC),
        (Role::client(Subsystem::GatewayClient), GORPC),
        (Role::client(Subsystem::TestHarness), GORPC),
    ]);

    pairs
}

/// Registers every shipped transport with `registry`. Either all of them
/// are added or, if any pair is already registered, none are.
pub fn register_all(registry: &Registry) -> Result<(), FlavorError> {
    let entries = implementations().into_iter().map(|(role, protocol)| {
        let factory: SharedFactory = Arc::new(BuiltinFactory::new(role, &protocol));
        (role, protocol, factory)
    });
    let count = registry.register_batch(entries)?;

    info!("registered {count} builtin transport implementations");
    Ok(())
}
