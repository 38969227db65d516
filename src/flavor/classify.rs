//! Client error classification.
//!
//! Generic retry and error handling code has to recognise "this failed in the
//! RPC client" without depending on any particular transport. Each flavor
//! names the [`ClientErrorKind`] its protocol's client failures surface as,
//! and transports wrap their failures in an [`RpcError`] carrying that kind.
use std::{error::Error, fmt};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorKind {
    /// Application error raised by the legacy binary-RPC client.
    AppError,
    /// Aborted call in the modern RPC framework.
    Abortion,
}

impl fmt::Display for ClientErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientErrorKind::AppError => f.write_str("gorpc app error"),
            ClientErrorKind::Abortion => f.write_str("grpc abortion"),
        }
    }
}

/// A client-side RPC failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct RpcError {
    kind: ClientErrorKind,
    message: String,
}

impl RpcError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ClientErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Kinds of every [`RpcError`] in `err`'s source chain, outermost first.
pub(crate) fn client_error_kinds<'a>(
    err: &'a (dyn Error + 'static),
) -> impl Iterator<Item = ClientErrorKind> + 'a {
    std::iter::successors(Some(err), |&e: &&'a (dyn Error + 'static)| e.source())
        .filter_map(|e| e.downcast_ref::<RpcError>().map(RpcError::kind))
}

/// Transports don't flag timeouts uniformly, so detection falls back to the
/// error text of every error in the chain.
pub(crate) fn error_chain_contains(err: &(dyn Error + 'static), needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let mut current = Some(err);
    while let Some(e) = current {
        if e.to_string().contains(needle) {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("call to vtgate failed")]
    struct Wrapped(#[source] RpcError);

    #[test]
    fn finds_text_in_source_chain() {
        let inner = RpcError::new(ClientErrorKind::AppError, "context deadline exceeded");
        let outer = Wrapped(inner);

        assert!(error_chain_contains(&outer, "deadline exceeded"));
        assert!(!error_chain_contains(&outer, "connection refused"));
    }

    #[test]
    fn finds_rpc_error_in_source_chain() {
        let outer = Wrapped(RpcError::new(ClientErrorKind::AppError, "boom"));

        let kinds: Vec<_> = client_error_kinds(&outer).collect();
        assert_eq!(kinds, vec![ClientErrorKind::AppError]);
    }

    #[test]
    fn unrelated_errors_have_no_kind() {
        let err = std::io::Error::other("connection refused");
        assert_eq!(client_error_kinds(&err).count(), 0);
    }

    #[test]
    fn empty_needle_never_matches() {
        let err = RpcError::new(ClientErrorKind::Abortion, "anything");
        assert!(!error_chain_contains(&err, ""));
    }

    #[test]
    fn display_includes_kind() {
        let err = RpcError::new(ClientErrorKind::Abortion, "DEADLINE_EXCEEDED");
        assert_eq!(err.to_string(), "grpc abortion: DEADLINE_EXCEEDED");
    }
}
