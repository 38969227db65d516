//! Subsystem bootstrap helpers.
//!
//! Turn the active flavor's answers into transport endpoints by resolving
//! them against the registry. Any missing (role, protocol) pair surfaces
//! here, at startup, rather than on the first RPC.
use std::collections::HashMap;

use log::{info, warn};

use crate::{
    error::FlavorError,
    flavor::{ProtocolsFlavor, ServiceBinding, Subsystem},
    protocol::ProtocolId,
    registry::{Endpoint, Registry, Role},
};

/// Builds the client endpoint `subsystem` should use under `flavor`.
pub fn client(
    flavor: &ProtocolsFlavor,
    registry: &Registry,
    subsystem: Subsystem,
    address: &str,
) -> Result<Endpoint, FlavorError> {
    let role = Role::client(subsystem);
    let protocol = flavor.protocol(subsystem);
    let factory = registry.resolve(role, protocol)?;
    Ok(factory.create(role, protocol, address))
}

/// Resolves every service a server running `flavor` must start, followed by
/// `extra` bindings, in order. Repeated bindings are started once.
pub fn services(
    flavor: &ProtocolsFlavor,
    registry: &Registry,
    extra: &[ServiceBinding],
    address: &str,
) -> Result<Vec<Endpoint>, FlavorError> {
    let mut seen: HashMap<&str, &ProtocolId> = HashMap::new();
    let mut endpoints = Vec::new();

    for binding in flavor.service_bindings().iter().chain(extra) {
        if let Some(previous) = seen.get(binding.service()) {
            if *previous != binding.protocol() {
                warn!(
                    "service {} bound to both {previous} and {}",
                    binding.service(),
                    binding.protocol()
                );
            } else {
                continue;
            }
        }
        seen.insert(binding.service(), binding.protocol());

        let subsystem = binding
            .subsystem()
            .ok_or_else(|| FlavorError::InvalidServiceBinding(binding.to_string()))?;
        let role = Role::server(subsystem);
        let factory = registry.resolve(role, binding.protocol())?;

        info!("starting {binding} with {}", factory.name());
        endpoints.push(factory.create(role, binding.protocol(), address));
    }

    Ok(endpoints)
}

/// Checks that every client and service `flavor` asks for is registered.
pub fn verify(flavor: &ProtocolsFlavor, registry: &Registry) -> Result<(), FlavorError> {
    for subsystem in Subsystem::ALL {
        registry.resolve(Role::client(subsystem), flavor.protocol(subsystem))?;
    }

    for binding in flavor.service_bindings() {
        let subsystem = binding
            .subsystem()
            .ok_or_else(|| FlavorError::InvalidServiceBinding(binding.to_string()))?;
        registry.resolve(Role::server(subsystem), binding.protocol())?;
    }

    Ok(())
}
