//! The lifecycle controller: owns at most one live fragment per widget instance,
//! performs insertion, records exactly which nodes it inserted, and reverses the whole
//! operation on demand without ever double-inserting or losing a node.

use crate::{
	debounce::DebounceSlot,
	error::ImportError,
	events,
	host::{Fetch, ModuleLoader, WebHost},
	placement::{self, Placement},
	reroute, script,
	source::{self, SourceDescriptor},
};
use gloo_timers::callback::Timeout;
use std::{cell::RefCell, rc::Rc};
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::UnwrapThrowExt;
use web_sys::{DocumentFragment, Element, Node};

/// Per-widget configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportConfig {
	/// Where content comes from. `None` keeps the controller idle.
	pub source: Option<SourceDescriptor>,
	/// Where the fragment goes.
	pub target: Placement,
	/// Execute embedded script directives.
	pub scripts: bool,
	/// Rewrite relative references in remotely fetched content.
	pub reroute: bool,
	/// Treat fetched content as literal text instead of markup.
	pub text: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
	/// No fragment owned.
	Idle,
	/// Resolution, reroute, scripts or placement in flight.
	Importing,
	/// A fragment is owned. It may still be structurally absent when placement
	/// resolved to nothing.
	Attached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
	Detached,
	Attached,
}

/// An opaque token over the exact set of nodes one import produced.
///
/// The node list is captured once, right before the ownership notification, and is the
/// complete and exact set returned to the backing fragment on teardown. No node is
/// silently dropped or duplicated.
#[derive(Debug)]
pub struct FragmentHandle {
	fragment: DocumentFragment,
	nodes: Vec<Node>,
	state: HandleState,
}

impl FragmentHandle {
	fn capture(fragment: DocumentFragment) -> Self {
		let child_nodes = fragment.child_nodes();
		let nodes = (0..child_nodes.length()).map(|i| child_nodes.get(i).unwrap_throw()).collect();
		Self {
			fragment,
			nodes,
			state: HandleState::Detached,
		}
	}

	#[must_use]
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	#[must_use]
	pub fn state(&self) -> HandleState {
		self.state
	}

	/// The backing fragment, which doubles as the fragment-level event target.
	#[must_use]
	pub fn fragment(&self) -> &DocumentFragment {
		&self.fragment
	}

	/// Detaches every owned node from wherever it currently sits and returns it to the
	/// backing fragment, in the original order. The handle stays fully inspectable.
	fn restore(&mut self) {
		for node in &self.nodes {
			self.fragment.append_child(node).expect_throw("embed-dom: returning an owned node to its fragment failed");
		}
		self.state = HandleState::Detached;
	}
}

struct Inner {
	widget: Element,
	config: ImportConfig,
	state: LifecycleState,
	handle: Option<FragmentHandle>,
	/// Bumped by every `clear`/`import`. An in-flight import re-checks it before the
	/// final DOM mutation so a superseded cycle never touches the tree.
	generation: u64,
	pending: DebounceSlot,
}

/// Content lifecycle controller for one widget element.
///
/// Cheap to clone; clones share the same instance. All operations run on the single
/// Wasm execution context, suspending only at fetch and module-load boundaries.
pub struct FragmentController<H = WebHost> {
	host: Rc<H>,
	inner: Rc<RefCell<Inner>>,
}

impl<H> Clone for FragmentController<H> {
	fn clone(&self) -> Self {
		Self {
			host: Rc::clone(&self.host),
			inner: Rc::clone(&self.inner),
		}
	}
}

impl FragmentController<WebHost> {
	#[must_use]
	pub fn new(widget: Element, config: ImportConfig) -> Self {
		Self::with_host(WebHost, widget, config)
	}
}

impl<H: Fetch + ModuleLoader + 'static> FragmentController<H> {
	#[must_use]
	pub fn with_host(host: H, widget: Element, config: ImportConfig) -> Self {
		Self {
			host: Rc::new(host),
			inner: Rc::new(RefCell::new(Inner {
				widget,
				config,
				state: LifecycleState::Idle,
				handle: None,
				generation: 0,
				pending: DebounceSlot::default(),
			})),
		}
	}

	#[must_use]
	pub fn state(&self) -> LifecycleState {
		self.inner.borrow().state
	}

	#[must_use]
	pub fn config(&self) -> ImportConfig {
		self.inner.borrow().config.clone()
	}

	/// The exact nodes the live import produced, if one is owned.
	#[must_use]
	pub fn owned_nodes(&self) -> Option<Vec<Node>> {
		self.inner.borrow().handle.as_ref().map(|handle| handle.nodes().to_vec())
	}

	/// Whether a deferred clear+reimport is currently scheduled.
	#[must_use]
	pub fn reimport_pending(&self) -> bool {
		self.inner.borrow().pending.is_scheduled()
	}

	/// Removes the owned fragment from the tree, if any, returning every node to the
	/// handle in its original order. Fires `detach` on the fragment and `remove` on the
	/// widget. No-op when idle.
	#[instrument(skip(self))]
	pub fn clear(&self) -> Option<FragmentHandle> {
		let (widget, handle) = {
			let mut inner = self.inner.borrow_mut();
			inner.generation += 1;
			inner.state = LifecycleState::Idle;
			(inner.widget.clone(), inner.handle.take())
		};
		let mut handle = handle?;
		handle.restore();
		events::dispatch_on_fragment(handle.fragment(), events::DETACH);
		events::dispatch_carrying(&widget, events::REMOVE, handle.fragment());
		Some(handle)
	}

	/// Runs one full import cycle: clear any live fragment, resolve the source, reroute
	/// and execute scripts as configured, take ownership, fire `insert`, place, fire
	/// `attach`.
	///
	/// With no source configured this is a quiet no-op. Resolution failures abort
	/// before any node is attached and are returned to the caller; script failures are
	/// logged per directive and non-fatal; an unresolvable placement leaves the
	/// fragment owned but structurally absent.
	#[instrument(skip(self))]
	pub async fn import(&self) -> Result<(), ImportError> {
		drop(self.clear());
		let (generation, source, config, widget) = {
			let mut inner = self.inner.borrow_mut();
			let Some(source) = inner.config.source.clone() else {
				trace!("{}", ImportError::MisconfiguredSource);
				return Ok(());
			};
			inner.generation += 1;
			inner.state = LifecycleState::Importing;
			(inner.generation, source, inner.config.clone(), inner.widget.clone())
		};

		let resolved = match source::resolve(&*self.host, &source, &widget, config.text).await {
			Ok(resolved) => resolved,
			Err(error) => {
				let mut inner = self.inner.borrow_mut();
				if inner.generation == generation {
					inner.state = LifecycleState::Idle;
				}
				return Err(error);
			}
		};

		if config.reroute {
			if let Some(base_url) = &resolved.base_url {
				reroute::reroute(&resolved.fragment, base_url);
			}
		}
		if config.scripts {
			script::execute_all(&*self.host, &resolved.fragment, resolved.fragment.as_ref()).await;
		}

		// Ownership transfer. A clear or newer import that ran while this one was
		// suspended supersedes it; the stale fragment is dropped untouched.
		{
			let mut inner = self.inner.borrow_mut();
			if inner.generation != generation {
				trace!("Superseded before ownership transfer; dropping the fragment.");
				return Ok(());
			}
			inner.handle = Some(FragmentHandle::capture(resolved.fragment.clone()));
		}
		events::dispatch_carrying(&widget, events::INSERT, &resolved.fragment);

		// An `insert` listener may have reconfigured or cleared; re-check before the
		// structural mutation. The target resolves lazily, against the tree as it is
		// now.
		let point = {
			let inner = self.inner.borrow();
			if inner.generation != generation {
				trace!("Superseded during the ownership notification; leaving the tree untouched.");
				return Ok(());
			}
			placement::resolve(&inner.config.target, &widget)
		};

		let mut placed = false;
		match point {
			Some(point) => match point.insert(resolved.fragment.as_ref()) {
				Ok(()) => placed = true,
				Err(error) => warn!("Structural insertion refused; the fragment stays owned but detached: {:?}", error),
			},
			None => trace!("No placement target in the scope chain; the fragment stays owned but detached."),
		}

		{
			let mut inner = self.inner.borrow_mut();
			if inner.generation != generation {
				return Ok(());
			}
			inner.state = LifecycleState::Attached;
			if placed {
				if let Some(handle) = inner.handle.as_mut() {
					handle.state = HandleState::Attached;
				}
			}
		}
		if placed {
			events::dispatch_on_fragment(&resolved.fragment, events::ATTACH);
		}
		Ok(())
	}

	/// Widget teardown: cancels any pending reimport and clears.
	pub fn disconnect(&self) {
		self.inner.borrow_mut().pending.cancel();
		drop(self.clear());
	}

	pub fn set_source(&self, source: Option<SourceDescriptor>) {
		self.reconfigure(move |config| {
			if config.source == source {
				false
			} else {
				config.source = source;
				true
			}
		});
	}

	pub fn set_target(&self, target: Placement) {
		self.reconfigure(move |config| {
			if config.target == target {
				false
			} else {
				config.target = target;
				true
			}
		});
	}

	pub fn set_scripts(&self, scripts: bool) {
		self.reconfigure(move |config| {
			if config.scripts == scripts {
				false
			} else {
				config.scripts = scripts;
				true
			}
		});
	}

	pub fn set_reroute(&self, reroute: bool) {
		self.reconfigure(move |config| {
			if config.reroute == reroute {
				false
			} else {
				config.reroute = reroute;
				true
			}
		});
	}

	pub fn set_text(&self, text: bool) {
		self.reconfigure(move |config| {
			if config.text == text {
				false
			} else {
				config.text = text;
				true
			}
		});
	}

	/// No-op transitions never trigger work, and neither does reconfiguration before
	/// anything is owned; the first import goes through [`import`](Self::import)
	/// directly. Otherwise a single deferred clear+reimport is (re)scheduled,
	/// last-write-wins, reading the configuration only when it finally runs.
	fn reconfigure(&self, change: impl FnOnce(&mut ImportConfig) -> bool) {
		let schedule = {
			let mut inner = self.inner.borrow_mut();
			let changed = change(&mut inner.config);
			changed && inner.handle.is_some()
		};
		if schedule {
			self.schedule_reimport();
		}
	}

	fn schedule_reimport(&self) {
		let controller = self.clone();
		let deferred = Timeout::new(0, move || {
			// Release the slot right away: the spent timeout's closure captures this
			// controller, so leaving it parked would keep the instance alive in a cycle.
			controller.inner.borrow_mut().pending.cancel();
			wasm_bindgen_futures::spawn_local(async move {
				if let Err(import_error) = controller.import().await {
					error!("Deferred reimport failed: {}", import_error);
				}
			});
		});
		self.inner.borrow_mut().pending.replace(deferred);
	}
}
