use protoflavor::{
    FlavorError, Role, Subsystem, bootstrap,
    flavor::{ClientErrorKind, RpcError, gorpc, grpc},
    protocol::{GORPC, GRPC},
    selector,
};

#[derive(Debug, thiserror::Error)]
#[error("vtctl status check failed")]
struct StatusFailed(#[source] RpcError);

// The process-wide selector is one-shot, so the whole lifecycle lives in a
// single test.
#[test]
fn process_wide_lifecycle() {
    assert_eq!(selector::active().unwrap_err(), FlavorError::NotInstalled);

    let installed = selector::initialize(gorpc::flavor()).unwrap();
    let active = selector::active().unwrap();
    assert!(std::ptr::eq(installed, active));
    assert_eq!(active.name(), "gorpc");

    let err = selector::install(grpc::flavor()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(selector::active().unwrap().name(), "gorpc");

    assert_eq!(active.tablet_manager_protocol(), &GRPC);
    let endpoint = bootstrap::client(
        active,
        selector::registry(),
        Subsystem::TabletManager,
        "tablet-100:16002",
    )
    .unwrap();
    assert_eq!(endpoint.protocol, GRPC);

    let err = selector::registry()
        .resolve(Role::server(Subsystem::TabletManager), &GORPC)
        .err()
        .unwrap();
    let message = err.to_string();
    assert!(message.contains("tabletmanager server"), "{message}");
    assert!(message.contains("gorpc"), "{message}");

    let timeout = RpcError::new(
        ClientErrorKind::AppError,
        "vtctl.ExecuteVtctlCommand: context deadline exceeded",
    );
    assert!(active.is_client_error(&timeout));
    assert!(active.is_timeout(&timeout));

    bootstrap::verify(active, selector::registry()).unwrap();

    let gateway = bootstrap::client(
        active,
        selector::registry(),
        Subsystem::Gateway,
        "vtgate:15991",
    )
    .unwrap();
    assert_eq!(gateway.protocol, GORPC);

    let wrapped: Box<dyn std::error::Error> = Box::new(StatusFailed(timeout));
    assert!(active.is_client_error(wrapped.as_ref()));
    assert!(active.is_timeout(wrapped.as_ref()));
}
