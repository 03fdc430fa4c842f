//! The user's invocation, captured once from argv.

use std::ffi::OsString;

/// What the user asked for: an operation name and the arguments to forward.
///
/// Built once at process start and never mutated. An empty operation string
/// is normalized to `None`, so "no operation" has a single representation.
/// Forwarded arguments stay `OsString` and are never decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    operation: Option<String>,
    args: Vec<OsString>,
}

impl InvocationRequest {
    /// Build a request from an explicit operation and its arguments.
    pub fn new(operation: Option<String>, args: Vec<OsString>) -> Self {
        Self {
            operation: operation.filter(|op| !op.is_empty()),
            args,
        }
    }

    /// Build a request from argv with the binary name already stripped.
    ///
    /// Only the operation is decoded; a name that is not valid UTF-8 is
    /// converted lossily and will not match any declared operation.
    pub fn from_args<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = argv.into_iter().map(Into::into);
        let operation = iter.next().map(|op: OsString| {
            op.into_string()
                .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
        });
        Self::new(operation, iter.collect())
    }

    /// The requested operation, if any.
    pub fn operation(&self) -> Option<&str> {
        self.operation.as_deref()
    }

    /// Arguments following the operation, in original order.
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether the request names the reserved install operation.
    pub fn is_install(&self) -> bool {
        self.operation() == Some(crate::INSTALL_OPERATION)
    }
}
