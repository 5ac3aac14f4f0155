//! Mounting and tearing down panel behaviors.
//!
//! A behavior is a typed plugin registered under a panel location. It is
//! initialized once against the mounted panel container and may hand back a
//! teardown. Failures and panics in either step are contained and logged.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use log::error;

use crate::components::graph::GraphNode;
use crate::error::BehaviorError;

/// What a behavior sees about the panel it was mounted for.
#[derive(Clone, Debug)]
pub struct PanelContext {
	/// Request the panel was mounted for; behaviors of one request share a stack.
	pub request: u64,
	/// Base of the node's own panel files.
	pub panel: String,
	/// Template base, when the panel uses one.
	pub template: Option<String>,
	pub node: GraphNode,
}

/// An object exposing a teardown method.
pub trait Dispose {
	fn dispose(self: Box<Self>) -> Result<(), BehaviorError>;
}

pub enum Teardown {
	Callback(Box<dyn FnOnce() -> Result<(), BehaviorError>>),
	Handle(Box<dyn Dispose>),
}

impl Teardown {
	/// Infallible callback.
	pub fn callback(f: impl FnOnce() + 'static) -> Self {
		Self::Callback(Box::new(move || {
			f();
			Ok(())
		}))
	}

	pub fn handle(handle: impl Dispose + 'static) -> Self {
		Self::Handle(Box::new(handle))
	}

	fn invoke(self) -> Result<(), BehaviorError> {
		match self {
			Self::Callback(f) => f(),
			Self::Handle(h) => h.dispose(),
		}
	}
}

/// Optional behavior for a panel, generic over the container handle type.
pub trait PanelBehavior<C> {
	fn init(&self, container: &C, ctx: &PanelContext) -> Result<Option<Teardown>, BehaviorError>;
}

/// Behaviors keyed by panel location.
pub struct BehaviorRegistry<C> {
	entries: HashMap<String, Rc<dyn PanelBehavior<C>>>,
}

impl<C> Default for BehaviorRegistry<C> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<C: 'static> BehaviorRegistry<C> {
	pub fn register(&mut self, panel: impl Into<String>, behavior: impl PanelBehavior<C> + 'static) {
		self.entries.insert(panel.into(), Rc::new(behavior));
	}

	pub fn with(mut self, panel: impl Into<String>, behavior: impl PanelBehavior<C> + 'static) -> Self {
		self.register(panel, behavior);
		self
	}

	/// Behavior registered for a panel, if any. Resolves to `None` when the panel
	/// has none.
	pub fn lookup(&self, panel: &str) -> LocalBoxFuture<'static, Option<Rc<dyn PanelBehavior<C>>>> {
		future::ready(self.entries.get(panel).cloned()).boxed_local()
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.entries.len()
	}
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
	payload
		.downcast_ref::<&str>()
		.map(|s| s.to_string())
		.or_else(|| payload.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "unknown panic".to_string())
}

/// Stack of teardowns for the currently mounted panel.
#[derive(Default)]
pub struct ScriptHost {
	stack: Vec<(String, Teardown)>,
	active_request: Option<u64>,
}

impl ScriptHost {
	pub fn new() -> Self {
		Self::default()
	}

	/// Initializes `behavior` against `container`. A context from a different
	/// request than the mounted one tears the old panel down first.
	///
	/// Returns whether a teardown was registered.
	pub fn run<C>(&mut self, behavior: &dyn PanelBehavior<C>, container: &C, ctx: &PanelContext) -> bool {
		if self.active_request != Some(ctx.request) {
			self.teardown_all();
			self.active_request = Some(ctx.request);
		}
		let result = catch_unwind(AssertUnwindSafe(|| behavior.init(container, ctx)))
			.unwrap_or_else(|payload| {
				Err(BehaviorError::Panicked {
					panel: ctx.panel.clone(),
					message: panic_message(payload),
				})
			});
		match result {
			Ok(Some(teardown)) => {
				self.stack.push((ctx.panel.clone(), teardown));
				true
			}
			Ok(None) => false,
			Err(err) => {
				error!("{err}");
				false
			}
		}
	}

	/// Runs every teardown, newest first. Each one is isolated: a failure is
	/// logged and the rest still run. Returns how many failed.
	pub fn teardown_all(&mut self) -> usize {
		let mut failures = 0;
		while let Some((panel, teardown)) = self.stack.pop() {
			let result = catch_unwind(AssertUnwindSafe(|| teardown.invoke())).unwrap_or_else(|payload| {
				Err(BehaviorError::Panicked {
					panel: panel.clone(),
					message: panic_message(payload),
				})
			});
			if let Err(err) = result {
				error!("{err}");
				failures += 1;
			}
		}
		self.active_request = None;
		failures
	}

	#[cfg(test)]
	fn mounted(&self) -> usize {
		self.stack.len()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;

	use super::*;

	type Log = Rc<RefCell<Vec<String>>>;

	/// Records init and teardown order into a shared log.
	struct Recording {
		name: &'static str,
		log: Log,
		fail_teardown: bool,
	}

	impl PanelBehavior<()> for Recording {
		fn init(&self, _: &(), _: &PanelContext) -> Result<Option<Teardown>, BehaviorError> {
			self.log.borrow_mut().push(format!("init {}", self.name));
			let (log, name, fail) = (self.log.clone(), self.name, self.fail_teardown);
			Ok(Some(Teardown::Callback(Box::new(move || {
				log.borrow_mut().push(format!("teardown {name}"));
				if fail {
					Err(BehaviorError::Teardown {
						panel: name.into(),
						message: "boom".into(),
					})
				} else {
					Ok(())
				}
			}))))
		}
	}

	struct Panicking;

	impl PanelBehavior<()> for Panicking {
		fn init(&self, _: &(), _: &PanelContext) -> Result<Option<Teardown>, BehaviorError> {
			panic!("init exploded")
		}
	}

	struct Flag(Log);

	impl Dispose for Flag {
		fn dispose(self: Box<Self>) -> Result<(), BehaviorError> {
			self.0.borrow_mut().push("dispose".into());
			Ok(())
		}
	}

	struct WithHandle(Log);

	impl PanelBehavior<()> for WithHandle {
		fn init(&self, _: &(), _: &PanelContext) -> Result<Option<Teardown>, BehaviorError> {
			Ok(Some(Teardown::handle(Flag(self.0.clone()))))
		}
	}

	fn ctx(request: u64, panel: &str) -> PanelContext {
		PanelContext {
			request,
			panel: panel.into(),
			template: None,
			node: serde_json::from_str(r#"{ "id": "n" }"#).unwrap(),
		}
	}

	fn recording(name: &'static str, log: &Log, fail_teardown: bool) -> Recording {
		Recording {
			name,
			log: log.clone(),
			fail_teardown,
		}
	}

	#[test]
	fn teardown_runs_in_reverse_registration_order() {
		let log = Log::default();
		let mut host = ScriptHost::new();
		host.run(&recording("template", &log, false), &(), &ctx(1, "t"));
		host.run(&recording("panel", &log, false), &(), &ctx(1, "p"));
		assert_eq!(host.mounted(), 2);
		assert_eq!(host.teardown_all(), 0);
		assert_eq!(
			*log.borrow(),
			["init template", "init panel", "teardown panel", "teardown template"]
		);
	}

	#[test]
	fn new_panel_tears_down_previous_before_init() {
		let log = Log::default();
		let mut host = ScriptHost::new();
		host.run(&recording("p1-a", &log, false), &(), &ctx(1, "p1"));
		host.run(&recording("p1-b", &log, false), &(), &ctx(1, "p1"));
		host.run(&recording("p2", &log, false), &(), &ctx(2, "p2"));
		assert_eq!(
			*log.borrow(),
			["init p1-a", "init p1-b", "teardown p1-b", "teardown p1-a", "init p2"]
		);
		assert_eq!(host.mounted(), 1);
	}

	#[test]
	fn failing_teardown_does_not_block_others() {
		let log = Log::default();
		let mut host = ScriptHost::new();
		host.run(&recording("a", &log, false), &(), &ctx(1, "a"));
		host.run(&recording("b", &log, true), &(), &ctx(1, "b"));
		host.run(&recording("c", &log, false), &(), &ctx(1, "c"));
		assert_eq!(host.teardown_all(), 1);
		assert_eq!(
			log.borrow()[3..],
			["teardown c", "teardown b", "teardown a"]
		);
	}

	#[test]
	fn panicking_init_is_contained() {
		let mut host = ScriptHost::new();
		assert!(!host.run(&Panicking, &(), &ctx(1, "x")));
		assert_eq!(host.mounted(), 0);
	}

	#[test]
	fn teardown_handles_are_disposed() {
		let log = Log::default();
		let mut host = ScriptHost::new();
		assert!(host.run(&WithHandle(log.clone()), &(), &ctx(1, "x")));
		host.teardown_all();
		assert_eq!(*log.borrow(), ["dispose"]);
	}

	#[test]
	fn teardown_without_mount_is_a_noop() {
		let mut host = ScriptHost::new();
		assert_eq!(host.teardown_all(), 0);
		assert_eq!(host.teardown_all(), 0);
	}

	#[test]
	fn registry_lookup_resolves_registered_behaviors() {
		let log = Log::default();
		let registry = BehaviorRegistry::<()>::default().with("panels/home", WithHandle(log));
		assert_eq!(registry.len(), 1);
		assert!(futures::executor::block_on(registry.lookup("panels/home")).is_some());
		assert!(futures::executor::block_on(registry.lookup("panels/blog")).is_none());
	}
}
