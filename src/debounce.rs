use gloo_timers::callback::Timeout;

/// Single-slot pending task. Replacing the slot drops (and thereby cancels) whatever
/// was scheduled before, so rapid reconfiguration collapses into the last write.
#[derive(Default)]
pub(crate) struct DebounceSlot(Option<Timeout>);

impl DebounceSlot {
	pub fn replace(&mut self, deferred: Timeout) {
		self.0 = Some(deferred);
	}

	pub fn cancel(&mut self) {
		self.0 = None;
	}

	pub fn is_scheduled(&self) -> bool {
		self.0.is_some()
	}
}
