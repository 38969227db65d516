pub mod bootstrap;
pub mod builtin;
pub mod error;
pub mod flavor;
pub mod protocol;
pub mod registry;
pub mod selector;

pub use error::FlavorError;
pub use flavor::{FlavorKind, ProtocolsFlavor, ServiceBinding, Subsystem};
pub use protocol::ProtocolId;
pub use registry::{Registry, Role, Side};
