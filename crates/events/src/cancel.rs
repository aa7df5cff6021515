use tokio_util::sync::CancellationToken;

/// Owns a [`CancellationToken`] and drives its one-way transition.
///
/// The token moves once from not-requested to requested and never back.
/// Operations hold clones of the token and observe the request either by
/// polling [`CancellationToken::is_cancelled`] at reasonable intervals or by
/// awaiting [`CancellationToken::cancelled`].
#[derive(Debug, Default)]
pub struct CancellationTokenSource {
	token: CancellationToken,
}

impl CancellationTokenSource {
	/// Creates a source with a fresh, uncancelled token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a clone of the token to hand to an operation.
	pub fn token(&self) -> CancellationToken {
		self.token.clone()
	}

	/// Requests cancellation. Idempotent.
	pub fn cancel(&self) {
		self.token.cancel();
	}

	/// Releases the source, requesting cancellation of anything still
	/// holding the token.
	pub fn dispose(&self) {
		self.cancel();
	}
}
