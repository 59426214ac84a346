//! LIMS duplicate checking.
//!
//! The engine consumes exactly one capability from the laboratory
//! information management system: "does a sequencing-data object already
//! exist for this sample id".

mod mock;
mod slims;

pub use mock::MockLims;
pub use slims::{SlimsClient, SlimsCredentials};

/// Boundary to the LIMS.
///
/// Implementations must be thread-safe (Send + Sync) and must never
/// propagate transport failures to the caller: a lookup that cannot
/// complete answers `false` ("no conflict") and logs the failure itself.
pub trait LimsClient: Send + Sync {
    /// True when the LIMS already holds a sequencing-data object for the
    /// given sample id.
    fn exists(&self, sample_id: &str) -> bool;

    /// Name of this client (for logging/debugging).
    fn name(&self) -> &str;
}
