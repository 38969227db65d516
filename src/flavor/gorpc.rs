//! The legacy binary-RPC flavor.
//!
//! Uses gorpc wherever a legacy implementation still exists and grpc
//! everywhere else. Each grpc override states what is missing on the legacy
//! side so it can be dropped once that changes.
use crate::protocol::{GORPC, GRPC};

use super::{ClientErrorKind, ProtocolsFlavor, ServiceBinding, Subsystem};

pub const NAME: &str = "gorpc";

/// Deadline failures of the legacy client read like this.
pub const TIMEOUT_MESSAGE: &str = "context deadline exceeded";

pub fn flavor() -> ProtocolsFlavor {
    ProtocolsFlavor::builder(NAME)
        // The binlog player lost its gorpc implementation, service and client.
        .protocol(Subsystem::BinlogPlayer, GRPC)
        .protocol(Subsystem::BinlogPlayerClient, GRPC)
        .protocol(Subsystem::ControlClient, GORPC)
        .protocol(Subsystem::ControlClientCli, GORPC)
        // No gorpc implementation of the worker RPC interface exists.
        .protocol(Subsystem::WorkerClient, GRPC)
        // Tablet manager no longer supports bson rpc.
        .protocol(Subsystem::TabletManager, GRPC)
        // The bson encoder no longer handles uint64, which the
        // gateway-to-tablet interface carries.
        .protocol(Subsystem::TabletTransport, GRPC)
        .protocol(Subsystem::Gateway, GORPC)
        .protocol(Subsystem::GatewayClient, GORPC)
        .protocol(Subsystem::TestHarness, GORPC)
        .client_error(ClientErrorKind::AppError)
        .timeout_message(TIMEOUT_MESSAGE)
        .service_bindings([
            ServiceBinding::new(GORPC, "vtctl"),
            ServiceBinding::new(GORPC, "vtgateservice"),
            ServiceBinding::new(GRPC, "vtworker"),
            ServiceBinding::new(GRPC, "queryservice"),
            ServiceBinding::new(GRPC, "tabletmanager"),
            ServiceBinding::new(GRPC, "updatestream"),
        ])
        .build()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::flavor::{RpcError, grpc::flavor as grpc_flavor};

    use super::*;

    #[test]
    fn answers_are_known_identifiers() {
        let flavor = flavor();

        for subsystem in Subsystem::ALL {
            let protocol = flavor.protocol(subsystem);
            assert!(!protocol.is_empty());
            assert!(
                [GRPC, GORPC].contains(protocol),
                "{subsystem} -> {protocol}"
            );
        }
    }

    #[test]
    fn bindings_agree_with_queries() {
        let flavor = flavor();

        for binding in flavor.service_bindings() {
            let subsystem = binding
                .subsystem()
                .unwrap_or_else(|| panic!("unknown service {}", binding.service()));
            assert_eq!(binding.protocol(), flavor.protocol(subsystem), "{binding}");
        }
    }

    #[test]
    fn bindings_do_not_contradict() {
        let mut seen = HashMap::new();

        for binding in flavor().service_bindings() {
            if let Some(previous) = seen.insert(binding.service(), binding.protocol()) {
                assert_eq!(previous, binding.protocol(), "{binding}");
            }
        }
    }

    #[test]
    fn service_map_strings() {
        let map: Vec<String> = flavor()
            .service_bindings()
            .iter()
            .map(ToString::to_string)
            .collect();

        assert_eq!(
            map,
            vec![
                "bsonrpc-vt-vtctl",
                "bsonrpc-vt-vtgateservice",
                "grpc-vtworker",
                "grpc-queryservice",
                "grpc-tabletmanager",
                "grpc-updatestream",
            ]
        );
    }

    #[test]
    fn tablet_manager_has_no_legacy_implementation() {
        let flavor = flavor();
        assert_eq!(flavor.tablet_manager_protocol(), &GRPC);
        assert_ne!(flavor.tablet_manager_protocol(), &GORPC);
    }

    #[test]
    fn legacy_subsystems_stay_on_gorpc() {
        let flavor = flavor();
        assert_eq!(flavor.control_client_protocol(), &GORPC);
        assert_eq!(flavor.control_client_cli_protocol(), &GORPC);
        assert_eq!(flavor.gateway_protocol(), &GORPC);
        assert_eq!(flavor.gateway_client_protocol(), &GORPC);
        assert_eq!(flavor.test_harness_protocol(), &GORPC);
        assert_eq!(flavor.worker_client_protocol(), &GRPC);
        assert_eq!(flavor.tablet_transport_protocol(), &GRPC);
        assert_eq!(flavor.binlog_player_protocol(), &GRPC);
        assert_eq!(flavor.binlog_player_client_protocol(), &GRPC);
    }

    #[test]
    fn timeout_detection() {
        let flavor = flavor();
        assert_eq!(flavor.timeout_message(), "context deadline exceeded");

        let err = RpcError::new(
            ClientErrorKind::AppError,
            format!("vtgate.Execute: {}", flavor.timeout_message()),
        );
        assert!(flavor.is_timeout(&err));
        assert!(flavor.is_client_error(&err));

        let refused = RpcError::new(ClientErrorKind::AppError, "connection refused");
        assert!(!flavor.is_timeout(&refused));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("vtctl command failed")]
    struct CommandFailed(#[source] RpcError);

    #[test]
    fn wrapped_client_errors_are_classified() {
        let flavor = flavor();
        let err = CommandFailed(RpcError::new(
            ClientErrorKind::AppError,
            "context deadline exceeded",
        ));

        assert!(flavor.is_client_error(&err));
        assert!(flavor.is_timeout(&err));
        assert!(!grpc_flavor().is_client_error(&err));
        assert!(!flavor.is_client_error(&std::io::Error::other("disk full")));
    }

    #[test]
    fn grpc_failures_are_not_gorpc_client_errors() {
        let err = RpcError::new(ClientErrorKind::Abortion, "DEADLINE_EXCEEDED");
        assert!(!flavor().is_client_error(&err));
    }
}
