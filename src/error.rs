use thiserror::Error;

/// Failure taxonomy for a content import.
///
/// Resolution failures ([`NotFound`](ImportError::NotFound), [`LoadFailed`](ImportError::LoadFailed))
/// abort the whole import before any node is attached. Script failures are caught and logged
/// per directive and never surface here. A missing source is a quiet no-op and is only
/// represented for completeness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
	/// No template or selector match anywhere in the scope chain.
	#[error("no match for {0:?} in the scope chain")]
	NotFound(String),

	/// Every fetch attempt (exact path and stem fallbacks) was exhausted.
	#[error("all fetch attempts for {0:?} failed")]
	LoadFailed(String),

	/// The resolved script unit is not invocable.
	#[error("script unit for {0:?} is not invocable")]
	InvalidScript(String),

	/// No source is configured at all. Treated as a no-op by the controller, not reported.
	#[error("no content source configured")]
	MisconfiguredSource,
}
