use crate::models::constraints::AccessConstraints;
use crate::models::error::AcquireError;
use crate::models::stream::SharedStream;

/// The platform's media-acquisition primitive.
///
/// Backends implement this over real or synthetic devices. The
/// `AcquisitionInterceptor` implements the same trait as a decorator, so a
/// consumer wired against `dyn MediaAcquisition` cannot tell the substituted
/// entry point from the underlying one — and never holds a reference to the
/// underlying one.
pub trait MediaAcquisition: Send + Sync {
    /// Request live tracks for the given constraints.
    ///
    /// Blocks until the platform resolves the request. A refusal surfaces as
    /// `AcquireError::Denied`.
    fn acquire(&self, constraints: &AccessConstraints) -> Result<SharedStream, AcquireError>;
}
