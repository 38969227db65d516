//! Protocols flavors.
//!
//! A flavor is a named, immutable bundle answering "which wire protocol does
//! subsystem X speak" for every [`Subsystem`] in the cluster, together with
//! the error classification and timeout text of the protocol family it is
//! built around, and the ordered list of services a server process running
//! it has to start.
//!
//! # Overview
//!
//! [`ProtocolsFlavor`] is a plain value. Every query is a pure function of
//! the flavor: no parameters beyond the subsystem, no side effects. Flavors
//! are built with [`FlavorBuilder`], which starts from the contract defaults
//! (the modern RPC framework everywhere) so that a flavor only spells out the
//! subsystems where it deliberately diverges.
//!
//! Two flavors ship with the crate:
//!
//! - [`grpc::flavor`]: the contract defaults.
//! - [`gorpc::flavor`]: the legacy binary-RPC personality, which still falls
//!   back to grpc wherever the legacy transport has no implementation.
//!
//! # Service bindings
//!
//! [`ProtocolsFlavor::service_bindings`] returns a sequence of
//! [`ServiceBinding`]s. Unless a flavor sets them explicitly they are derived
//! from the per-subsystem answers, which keeps the two views consistent.
//!
//! # See Also
//!
//! - [`selector`](crate::selector): holds the process-wide active flavor.
//! - [`registry`](crate::registry): resolves the identifiers returned here.
mod binding;
mod classify;
pub mod gorpc;
pub mod grpc;

use std::{borrow::Cow, fmt};

use clap::ValueEnum;

use crate::protocol::{GRPC, ProtocolId};

pub use binding::ServiceBinding;
pub use classify::{ClientErrorKind, RpcError};

/// Every role in the fleet that needs its own protocol choice.
///
/// The set is closed: adding a subsystem means adding a variant here, a field
/// on [`SubsystemProtocols`] and, if the default is wrong for it, an override
/// in each flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    /// Binlog streaming service.
    BinlogPlayer,
    /// Client side of binlog streaming.
    BinlogPlayerClient,
    /// Control-plane client library.
    ControlClient,
    /// Control-plane client used across a process boundary (the CLI).
    ControlClientCli,
    /// Background worker RPC client.
    WorkerClient,
    /// Tablet lifecycle management, client and server.
    TabletManager,
    /// Data-plane transport between the query gateway and tablets.
    TabletTransport,
    /// Query gateway service.
    Gateway,
    /// Query gateway client.
    GatewayClient,
    /// Integrated test harness.
    TestHarness,
}

impl Subsystem {
    pub const ALL: [Subsystem; 10] = [
        Subsystem::BinlogPlayer,
        Subsystem::BinlogPlayerClient,
        Subsystem::ControlClient,
        Subsystem::ControlClientCli,
        Subsystem::WorkerClient,
        Subsystem::TabletManager,
        Subsystem::TabletTransport,
        Subsystem::Gateway,
        Subsystem::GatewayClient,
        Subsystem::TestHarness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Subsystem::BinlogPlayer => "binlog-player",
            Subsystem::BinlogPlayerClient => "binlog-player-client",
            Subsystem::ControlClient => "control-client",
            Subsystem::ControlClientCli => "control-client-cli",
            Subsystem::WorkerClient => "worker-client",
            Subsystem::TabletManager => "tablet-manager",
            Subsystem::TabletTransport => "tablet-transport",
            Subsystem::Gateway => "gateway",
            Subsystem::GatewayClient => "gateway-client",
            Subsystem::TestHarness => "test-harness",
        }
    }

    /// Name of the server-side service this subsystem's protocol choice
    /// governs, if it has one.
    pub fn service_name(&self) -> Option<&'static str> {
        match self {
            Subsystem::ControlClient => Some("vtctl"),
            Subsystem::Gateway => Some("vtgateservice"),
            Subsystem::WorkerClient => Some("vtworker"),
            Subsystem::TabletTransport => Some("queryservice"),
            Subsystem::TabletManager => Some("tabletmanager"),
            Subsystem::BinlogPlayer => Some("updatestream"),
            _ => None,
        }
    }

    pub fn from_service_name(service: &str) -> Option<Subsystem> {
        Subsystem::ALL
            .into_iter()
            .find(|s| s.service_name() == Some(service))
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One protocol choice per [`Subsystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemProtocols {
    pub binlog_player: ProtocolId,
    pub binlog_player_client: ProtocolId,
    pub control_client: ProtocolId,
    pub control_client_cli: ProtocolId,
    pub worker_client: ProtocolId,
    pub tablet_manager: ProtocolId,
    pub tablet_transport: ProtocolId,
    pub gateway: ProtocolId,
    pub gateway_client: ProtocolId,
    pub test_harness: ProtocolId,
}

impl Default for SubsystemProtocols {
    fn default() -> Self {
        Self {
            binlog_player: GRPC,
            binlog_player_client: GRPC,
            control_client: GRPC,
            control_client_cli: GRPC,
            worker_client: GRPC,
            tablet_manager: GRPC,
            // Strictest compatibility requirements (unsigned 64-bit values on
            // the wire); only grpc is known to carry them.
            tablet_transport: GRPC,
            gateway: GRPC,
            gateway_client: GRPC,
            test_harness: GRPC,
        }
    }
}

impl SubsystemProtocols {
    pub fn get(&self, subsystem: Subsystem) -> &ProtocolId {
        match subsystem {
            Subsystem::BinlogPlayer => &self.binlog_player,
            Subsystem::BinlogPlayerClient => &self.binlog_player_client,
            Subsystem::ControlClient => &self.control_client,
            Subsystem::ControlClientCli => &self.control_client_cli,
            Subsystem::WorkerClient => &self.worker_client,
            Subsystem::TabletManager => &self.tablet_manager,
            Subsystem::TabletTransport => &self.tablet_transport,
            Subsystem::Gateway => &self.gateway,
            Subsystem::GatewayClient => &self.gateway_client,
            Subsystem::TestHarness => &self.test_harness,
        }
    }

    fn get_mut(&mut self, subsystem: Subsystem) -> &mut ProtocolId {
        match subsystem {
            Subsystem::BinlogPlayer => &mut self.binlog_player,
            Subsystem::BinlogPlayerClient => &mut self.binlog_player_client,
            Subsystem::ControlClient => &mut self.control_client,
            Subsystem::ControlClientCli => &mut self.control_client_cli,
            Subsystem::WorkerClient => &mut self.worker_client,
            Subsystem::TabletManager => &mut self.tablet_manager,
            Subsystem::TabletTransport => &mut self.tablet_transport,
            Subsystem::Gateway => &mut self.gateway,
            Subsystem::GatewayClient => &mut self.gateway_client,
            Subsystem::TestHarness => &mut self.test_harness,
        }
    }
}

/// Timeout text surfaced by the modern RPC framework.
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "DEADLINE_EXCEEDED";

/// A complete protocol personality for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolsFlavor {
    name: Cow<'static, str>,
    protocols: SubsystemProtocols,
    client_error: ClientErrorKind,
    timeout_message: Cow<'static, str>,
    service_bindings: Vec<ServiceBinding>,
}

impl ProtocolsFlavor {
    pub fn builder(name: impl Into<Cow<'static, str>>) -> FlavorBuilder {
        FlavorBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Protocol chosen for `subsystem`.
    pub fn protocol(&self, subsystem: Subsystem) -> &ProtocolId {
        self.protocols.get(subsystem)
    }

    pub fn protocols(&self) -> &SubsystemProtocols {
        &self.protocols
    }

    pub fn binlog_player_protocol(&self) -> &ProtocolId {
        &self.protocols.binlog_player
    }

    pub fn binlog_player_client_protocol(&self) -> &ProtocolId {
        &self.protocols.binlog_player_client
    }

    pub fn control_client_protocol(&self) -> &ProtocolId {
        &self.protocols.control_client
    }

    pub fn control_client_cli_protocol(&self) -> &ProtocolId {
        &self.protocols.control_client_cli
    }

    pub fn worker_client_protocol(&self) -> &ProtocolId {
        &self.protocols.worker_client
    }

    pub fn tablet_manager_protocol(&self) -> &ProtocolId {
        &self.protocols.tablet_manager
    }

    pub fn tablet_transport_protocol(&self) -> &ProtocolId {
        &self.protocols.tablet_transport
    }

    pub fn gateway_protocol(&self) -> &ProtocolId {
        &self.protocols.gateway
    }

    pub fn gateway_client_protocol(&self) -> &ProtocolId {
        &self.protocols.gateway_client
    }

    pub fn test_harness_protocol(&self) -> &ProtocolId {
        &self.protocols.test_harness
    }

    /// Kind every client-side RPC failure of this flavor is reported as.
    pub fn client_error_type(&self) -> ClientErrorKind {
        self.client_error
    }

    /// Literal text a deadline-exceeded error carries under this flavor.
    ///
    /// Matching on it is brittle; changing a transport's deadline message is
    /// a breaking change for everything calling [`Self::is_timeout`].
    pub fn timeout_message(&self) -> &str {
        &self.timeout_message
    }

    /// Services a server process has to start, in startup order.
    pub fn service_bindings(&self) -> &[ServiceBinding] {
        &self.service_bindings
    }

    /// Whether `err`, or anything in its source chain, is a client-side RPC
    /// failure of this flavor's protocol.
    pub fn is_client_error(&self, err: &(dyn std::error::Error + 'static)) -> bool {
        classify::client_error_kinds(err).any(|kind| kind == self.client_error)
    }

    /// Whether `err`, or anything in its source chain, reports a timeout.
    pub fn is_timeout(&self, err: &(dyn std::error::Error + 'static)) -> bool {
        classify::error_chain_contains(err, &self.timeout_message)
    }
}

impl Default for ProtocolsFlavor {
    fn default() -> Self {
        grpc::flavor()
    }
}

/// Builds a [`ProtocolsFlavor`], starting from the contract defaults.
///
/// # Example
/// ```rust
/// use protoflavor::flavor::{ProtocolsFlavor, Subsystem};
/// use protoflavor::protocol::GORPC;
///
/// let flavor = ProtocolsFlavor::builder("gateway-migration")
///     .protocol(Subsystem::GatewayClient, GORPC)
///     .build();
///
/// assert_eq!(flavor.gateway_client_protocol(), &GORPC);
/// assert_eq!(flavor.gateway_protocol().as_str(), "grpc");
/// ```
#[derive(Debug, Clone)]
pub struct FlavorBuilder {
    name: Cow<'static, str>,
    protocols: SubsystemProtocols,
    client_error: ClientErrorKind,
    timeout_message: Cow<'static, str>,
    service_bindings: Option<Vec<ServiceBinding>>,
}

impl FlavorBuilder {
    fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            protocols: SubsystemProtocols::default(),
            client_error: ClientErrorKind::Abortion,
            timeout_message: Cow::Borrowed(DEFAULT_TIMEOUT_MESSAGE),
            service_bindings: None,
        }
    }

    pub fn protocol(mut self, subsystem: Subsystem, protocol: ProtocolId) -> Self {
        *self.protocols.get_mut(subsystem) = protocol;
        self
    }

    pub fn client_error(mut self, kind: ClientErrorKind) -> Self {
        self.client_error = kind;
        self
    }

    pub fn timeout_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.timeout_message = message.into();
        self
    }

    /// Pins the service list instead of deriving it from the protocol
    /// choices.
    pub fn service_bindings(mut self, bindings: impl IntoIterator<Item = ServiceBinding>) -> Self {
        self.service_bindings = Some(bindings.into_iter().collect());
        self
    }

    pub fn build(self) -> ProtocolsFlavor {
        let service_bindings = match self.service_bindings {
            Some(bindings) => bindings,
            None => Subsystem::ALL
                .into_iter()
                .filter_map(|s| {
                    let service = s.service_name()?;
                    Some(ServiceBinding::new(self.protocols.get(s).clone(), service))
                })
                .collect(),
        };

        ProtocolsFlavor {
            name: self.name,
            protocols: self.protocols,
            client_error: self.client_error,
            timeout_message: self.timeout_message,
            service_bindings,
        }
    }
}

/// Flavors selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FlavorKind {
    #[default]
    Grpc,
    Gorpc,
}

impl FlavorKind {
    pub fn build(self) -> ProtocolsFlavor {
        match self {
            FlavorKind::Grpc => grpc::flavor(),
            FlavorKind::Gorpc => gorpc::flavor(),
        }
    }
}
