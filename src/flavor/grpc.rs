//! The modern RPC flavor: grpc for every subsystem.
use crate::protocol::GRPC;

use super::{ProtocolsFlavor, ServiceBinding};

pub const NAME: &str = "grpc";

pub fn flavor() -> ProtocolsFlavor {
    ProtocolsFlavor::builder(NAME)
        .service_bindings([
            ServiceBinding::new(GRPC, "tabletmanager"),
            ServiceBinding::new(GRPC, "vtgateservice"),
            ServiceBinding::new(GRPC, "vtctl"),
            ServiceBinding::new(GRPC, "vtworker"),
            ServiceBinding::new(GRPC, "queryservice"),
            ServiceBinding::new(GRPC, "updatestream"),
        ])
        .build()
}
