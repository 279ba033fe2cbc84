//! A fragment lifecycle engine for DOM-embedding widgets.
//!
//! The [`controller::FragmentController`] fetches or locates a content fragment,
//! optionally executes its embedded script directives, inserts it into one of several
//! target locations, tracks exactly which nodes it owns so they can be cleanly removed
//! again, and coalesces rapid reconfiguration into single clear+reimport cycles.
#![warn(clippy::pedantic)]

pub mod controller;
pub mod error;
pub mod events;
pub mod host;
pub mod placement;
pub mod reroute;
pub mod source;

mod debounce;
mod scope;
mod script;

pub use controller::{FragmentController, FragmentHandle, HandleState, ImportConfig, LifecycleState};
pub use error::ImportError;
pub use host::{Fetch, FetchedText, ModuleLoader, WebHost};
pub use placement::Placement;
pub use source::SourceDescriptor;
