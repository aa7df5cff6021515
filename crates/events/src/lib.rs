//! Disposable handles, typed events, and cooperative cancellation.
//!
//! Every registration or subscription in the workspace is released through a
//! [`Disposable`]: a one-shot handle whose release is idempotent. Events are
//! fanned out by [`EventEmitter`] in subscription order with per-listener
//! failure isolation. Cancellation is cooperative and one-way, carried by
//! the re-exported [`CancellationToken`].

/// One-way cancellation signalling.
pub mod cancel;
/// One-shot idempotent release handles.
pub mod disposable;
/// Typed event fan-out.
pub mod emitter;

pub use cancel::CancellationTokenSource;
pub use disposable::{Disposable, DisposableBag};
pub use emitter::EventEmitter;
/// Re-export of the cancellation token used across the workspace.
pub use tokio_util::sync::CancellationToken;
