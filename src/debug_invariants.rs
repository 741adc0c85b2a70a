//! Invariant checks compiled into debug and `*-invariants` builds.

use crate::mesh_error::MeshForestError;

/// Structures whose internal consistency can be re-checked after mutation.
pub trait DebugInvariants {
    /// Return the first broken invariant.
    fn validate_invariants(&self) -> Result<(), MeshForestError>;

    /// Panic on a broken invariant when checking is compiled in.
    #[inline]
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "structure check failed");
    }
}

/// Evaluate a `Result`-returning check and panic with context on `Err`,
/// only in debug builds or with `strict-invariants` / `check-invariants`.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
