//! Protocol identifiers.
//!
//! A [`ProtocolId`] is the opaque token naming a transport implementation,
//! e.g. `grpc` or `gorpc`. Identifiers show up in configuration files and
//! command-line flags outside this crate, so they are stable: a renamed
//! identifier keeps its old spelling as an alias (see [`ALIASES`]).
//!
//! Equality is the only operation defined on identifiers. They carry no
//! ordering or version information.
//!
//! # Listener names
//!
//! Server processes start listeners named after the protocol they serve.
//! For most protocols the listener name is the identifier itself; the legacy
//! binary-RPC protocol listens as `bsonrpc-vt` for historical reasons. See
//! [`ProtocolId::listener_name`].
use std::{borrow::Cow, fmt, str::FromStr};

/// Modern RPC framework.
pub const GRPC: ProtocolId = ProtocolId(Cow::Borrowed("grpc"));
/// Legacy BSON-encoded binary RPC.
pub const GORPC: ProtocolId = ProtocolId(Cow::Borrowed("gorpc"));

/// Retired spellings still accepted on input, as `(alias, identifier)`.
pub const ALIASES: &[(&str, &str)] = &[("bsonrpc", "gorpc")];

const GORPC_LISTENER: &str = "bsonrpc-vt";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtocolId(Cow<'static, str>);

impl ProtocolId {
    /// Normalises `name` to lowercase and resolves retired aliases.
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim().to_ascii_lowercase();
        match ALIASES.iter().find(|(alias, _)| *alias == name) {
            Some((_, canonical)) => Self(Cow::Borrowed(*canonical)),
            None => Self(Cow::Owned(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Prefix used for this protocol's entries in a service map.
    pub fn listener_name(&self) -> &str {
        if *self == GORPC {
            GORPC_LISTENER
        } else {
            self.as_str()
        }
    }

    /// Splits a service map entry into its protocol and service name.
    pub(crate) fn split_listener(entry: &str) -> Option<(ProtocolId, &str)> {
        if let Some(service) = entry
            .strip_prefix(GORPC_LISTENER)
            .and_then(|rest| rest.strip_prefix('-'))
        {
            return Some((GORPC, service));
        }

        let (listener, service) = entry.split_once('-')?;
        if listener.is_empty() {
            return None;
        }
        Some((ProtocolId::new(listener), service))
    }
}

impl fmt::Display for ProtocolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProtocolId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ProtocolId::new(s))
    }
}

impl From<&str> for ProtocolId {
    fn from(value: &str) -> Self {
        ProtocolId::new(value)
    }
}
