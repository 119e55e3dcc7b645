//! Base plugin trait.
//!
//! Every decoder implements [`Plugin`] for naming and lifecycle. The registry
//! calls `initialize` on registration and `shutdown` when it is torn down.

use crate::Result;

pub trait Plugin: Send + Sync {
    /// Unique, whitespace-free name, e.g. `pdf-extractor`.
    fn name(&self) -> &str;

    fn version(&self) -> String;

    fn initialize(&self) -> Result<()>;

    fn shutdown(&self) -> Result<()>;

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }
}
