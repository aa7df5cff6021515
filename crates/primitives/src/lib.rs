//! Coordinate model for addressing text: positions, ranges, selections, and edits.
//!
//! These are self-validating value types that are independent of any particular
//! document instance. Construction never fails on out-of-range values; clamping
//! against a live document belongs to the document layer.

/// Single text edit operations.
pub mod edit;
/// Async future aliases.
pub mod future;
/// Line/character positions with lexicographic ordering.
pub mod position;
/// Ordered position pairs delimiting a span.
pub mod range;
/// Directional ranges carrying anchor/active endpoints.
pub mod selection;

pub use edit::TextEdit;
pub use future::{BoxFutureLocal, BoxFutureSend, BoxFutureStatic};
pub use position::Position;
pub use range::{Range, RangeTarget};
pub use selection::Selection;
