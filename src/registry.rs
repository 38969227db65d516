//! Transport implementation registry.
//!
//! Maps a ([`Role`], [`ProtocolId`]) pair to the factory building that
//! transport. Client and server implementations of the same protocol are
//! separate entries. The registry knows nothing about concrete transports;
//! they are added by an explicit startup routine such as
//! [`builtin::register_all`](crate::builtin::register_all).
//!
//! Registrations happen during single-threaded startup, lookups afterwards.
//! The lock only guards against racing registrations.
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use log::{debug, trace};

use crate::{error::FlavorError, flavor::Subsystem, protocol::ProtocolId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Client,
    Server,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Client => f.write_str("client"),
            Side::Server => f.write_str("server"),
        }
    }
}

/// Which end of which subsystem an implementation serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    pub subsystem: Subsystem,
    pub side: Side,
}

impl Role {
    pub fn client(subsystem: Subsystem) -> Self {
        Self {
            subsystem,
            side: Side::Client,
        }
    }

    pub fn server(subsystem: Subsystem) -> Self {
        Self {
            subsystem,
            side: Side::Server,
        }
    }
}

/// Servers are named after the service they expose; clients after their
/// subsystem.
impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.side, self.subsystem.service_name()) {
            (Side::Server, Some(service)) => write!(f, "{service} server"),
            (Side::Server, None) => write!(f, "{} server", self.subsystem),
            (Side::Client, _) if self.subsystem.name().contains("client") => {
                write!(f, "{}", self.subsystem)
            }
            (Side::Client, _) => write!(f, "{} client", self.subsystem),
        }
    }
}

/// What a factory hands back: a configured, not yet connected, transport
/// endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub role: Role,
    pub protocol: ProtocolId,
    pub implementation: String,
    pub address: String,
}

/// Builds one transport implementation.
pub trait TransportFactory: Send + Sync {
    /// Implementation name, for logs.
    fn name(&self) -> &str;

    /// Prepares an endpoint for `address`. Must not perform I/O.
    fn create(&self, role: Role, protocol: &ProtocolId, address: &str) -> Endpoint {
        Endpoint {
            role,
            protocol: protocol.clone(),
            implementation: self.name().to_string(),
            address: address.to_string(),
        }
    }
}

pub type SharedFactory = Arc<dyn TransportFactory>;

#[derive(Default)]
pub struct Registry {
    factories: RwLock<HashMap<(Role, ProtocolId), SharedFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory` for `(role, protocol)`. An existing registration is
    /// left untouched and reported as a duplicate.
    pub fn register(
        &self,
        role: Role,
        protocol: ProtocolId,
        factory: SharedFactory,
    ) -> Result<(), FlavorError> {
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match factories.entry((role, protocol)) {
            Entry::Occupied(entry) => {
                let (role, protocol) = entry.key().clone();
                Err(FlavorError::DuplicateRegistration { role, protocol })
            }
            Entry::Vacant(entry) => {
                debug!(
                    "registered {} for {role} over {}",
                    factory.name(),
                    entry.key().1
                );
                entry.insert(factory);
                Ok(())
            }
        }
    }

    /// Registers every entry or none of them: if any pair is already taken,
    /// or repeats within `entries`, the registry is left unchanged.
    pub fn register_batch(
        &self,
        entries: impl IntoIterator<Item = (Role, ProtocolId, SharedFactory)>,
    ) -> Result<usize, FlavorError> {
        let mut factories = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut pending: HashMap<(Role, ProtocolId), SharedFactory> = HashMap::new();
        for (role, protocol, factory) in entries {
            let key = (role, protocol);
            if factories.contains_key(&key) || pending.contains_key(&key) {
                let (role, protocol) = key;
                return Err(FlavorError::DuplicateRegistration { role, protocol });
            }
            pending.insert(key, factory);
        }

        let count = pending.len();
        for ((role, protocol), factory) in pending {
            debug!("registered {} for {role} over {protocol}", factory.name());
            factories.insert((role, protocol), factory);
        }
        Ok(count)
    }

    pub fn resolve(&self, role: Role, protocol: &ProtocolId) -> Result<SharedFactory, FlavorError> {
        let factories = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match factories.get(&(role, protocol.clone())) {
            Some(factory) => {
                trace!("resolved {role} over {protocol} to {}", factory.name());
                Ok(Arc::clone(factory))
            }
            None => Err(FlavorError::UnregisteredProtocol {
                role,
                protocol: protocol.clone(),
            }),
        }
    }

    pub fn contains(&self, role: Role, protocol: &ProtocolId) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(role, protocol.clone()))
    }

    /// Every registered pair, ordered by role then protocol name.
    pub fn registered(&self) -> Vec<(Role, ProtocolId)> {
        let mut pairs: Vec<_> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.as_str().cmp(b.1.as_str())));
        pairs
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("registered", &self.registered())
            .finish()
    }
}
