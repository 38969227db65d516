//! Active-flavor selection.
//!
//! A process installs exactly one [`ProtocolsFlavor`] at startup. Every
//! subsystem's bootstrap code asks the installed flavor which protocol to
//! speak, then resolves that protocol in the [`Registry`].
//!
//! ```text
//! Unconfigured --install--> Active
//! ```
//!
//! There is no way back to unconfigured: subsystems may already have acted
//! on the first answer, so a second install is a configuration error.
//!
//! [`Selector`] holds that state for one process. The free functions at the
//! bottom of this module operate on a process-wide instance; tests build
//! their own selectors instead.
use std::sync::OnceLock;

use log::info;

use crate::{builtin, error::FlavorError, flavor::ProtocolsFlavor, registry::Registry};

#[derive(Debug, Default)]
pub struct Selector {
    active: OnceLock<ProtocolsFlavor>,
    registry: Registry,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `flavor` the active flavor.
    pub fn install(&self, flavor: ProtocolsFlavor) -> Result<&ProtocolsFlavor, FlavorError> {
        let name = flavor.name().to_string();

        self.active.set(flavor).map_err(|_| {
            FlavorError::AlreadyInstalled(
                self.active
                    .get()
                    .map(|f| f.name().to_string())
                    .unwrap_or_default(),
            )
        })?;

        info!("installed protocols flavor '{name}'");
        self.active()
    }

    /// Registers the builtin transports, then installs `flavor`.
    ///
    /// Builtin registration is all-or-nothing, so if any builtin pair was
    /// registered beforehand this fails with nothing installed and nothing
    /// added. Callers registering their own transports alongside the builtins
    /// should use [`Self::install`] instead.
    pub fn initialize(&self, flavor: ProtocolsFlavor) -> Result<&ProtocolsFlavor, FlavorError> {
        if let Some(current) = self.active.get() {
            return Err(FlavorError::AlreadyInstalled(current.name().to_string()));
        }
        builtin::register_all(&self.registry)?;
        self.install(flavor)
    }

    pub fn active(&self) -> Result<&ProtocolsFlavor, FlavorError> {
        self.active.get().ok_or(FlavorError::NotInstalled)
    }

    pub fn is_installed(&self) -> bool {
        self.active.get().is_some()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn global() -> &'static Selector {
    static GLOBAL: OnceLock<Selector> = OnceLock::new();
    GLOBAL.get_or_init(Selector::new)
}

/// Installs the process-wide flavor.
pub fn install(flavor: ProtocolsFlavor) -> Result<&'static ProtocolsFlavor, FlavorError> {
    global().install(flavor)
}

/// Registers the builtin transports and installs the process-wide flavor.
pub fn initialize(flavor: ProtocolsFlavor) -> Result<&'static ProtocolsFlavor, FlavorError> {
    global().initialize(flavor)
}

/// The process-wide flavor.
pub fn active() -> Result<&'static ProtocolsFlavor, FlavorError> {
    global().active()
}

/// The process-wide implementation registry.
pub fn registry() -> &'static Registry {
    global().registry()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        flavor::{Subsystem, gorpc, grpc},
        protocol::GRPC,
        registry::{Role, SharedFactory, TransportFactory},
    };

    use super::*;

    struct Custom;

    impl TransportFactory for Custom {
        fn name(&self) -> &str {
            "custom-vtgateservice"
        }
    }

    #[test]
    fn active_before_install_fails() {
        let selector = Selector::new();

        let err = selector.active().unwrap_err();
        assert_eq!(err, FlavorError::NotInstalled);
        assert!(err.is_configuration());
        assert!(!selector.is_installed());
    }

    #[test]
    fn active_returns_installed_flavor() {
        let selector = Selector::new();
        let installed = selector.install(gorpc::flavor()).unwrap() as *const ProtocolsFlavor;

        let active = selector.active().unwrap();
        assert_eq!(active, &gorpc::flavor());
        assert!(std::ptr::eq(active, installed));
        assert!(std::ptr::eq(active, selector.active().unwrap()));
    }

    #[test]
    fn second_install_fails() {
        let selector = Selector::new();
        selector.install(gorpc::flavor()).unwrap();

        let err = selector.install(grpc::flavor()).unwrap_err();
        assert_eq!(err, FlavorError::AlreadyInstalled("gorpc".to_string()));
        assert!(err.is_configuration());
        assert_eq!(selector.active().unwrap().name(), "gorpc");
    }

    #[test]
    fn initialize_registers_builtins() {
        let selector = Selector::new();
        let flavor = selector.initialize(gorpc::flavor()).unwrap();

        let role = Role::client(Subsystem::TabletManager);
        assert_eq!(flavor.tablet_manager_protocol(), &GRPC);
        assert!(selector.registry().resolve(role, &GRPC).is_ok());
    }

    #[test]
    fn initialize_after_builtin_registration_changes_nothing() {
        let selector = Selector::new();
        let role = Role::server(Subsystem::Gateway);
        let factory: SharedFactory = Arc::new(Custom);
        selector.registry().register(role, GRPC, factory).unwrap();

        let err = selector.initialize(gorpc::flavor()).unwrap_err();
        assert_eq!(
            err,
            FlavorError::DuplicateRegistration {
                role,
                protocol: GRPC
            }
        );
        assert!(!selector.is_installed());
        assert_eq!(selector.registry().registered(), vec![(role, GRPC)]);

        selector.install(gorpc::flavor()).unwrap();
        assert_eq!(selector.active().unwrap().name(), "gorpc");
    }

    #[test]
    fn initialize_twice_is_a_configuration_error() {
        let selector = Selector::new();
        selector.initialize(grpc::flavor()).unwrap();

        let err = selector.initialize(gorpc::flavor()).unwrap_err();
        assert_eq!(err, FlavorError::AlreadyInstalled("grpc".to_string()));
    }

    #[test]
    fn registration_may_precede_install() {
        let selector = Selector::new();
        builtin::register_all(selector.registry()).unwrap();
        selector.install(grpc::flavor()).unwrap();

        let role = Role::server(Subsystem::Gateway);
        let protocol = selector.active().unwrap().gateway_protocol();
        assert!(selector.registry().resolve(role, protocol).is_ok());
    }
}
