//! Deduplicating, non-evicting cache of asynchronous loads.
//!
//! The first caller for a key starts the load; everyone else, concurrent or
//! later, awaits the same shared future. Failures are cached too and stay
//! failed for the session.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;

use futures::FutureExt;
use futures::future::{LocalBoxFuture, Shared};

use crate::error::ResourceError;

pub type SharedLoad<T> = Shared<LocalBoxFuture<'static, Result<T, ResourceError>>>;

pub struct ResourceCache<T> {
	entries: RefCell<HashMap<String, SharedLoad<T>>>,
}

impl<T> Default for ResourceCache<T> {
	fn default() -> Self {
		Self {
			entries: RefCell::new(HashMap::new()),
		}
	}
}

impl<T: Clone + 'static> ResourceCache<T> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Shared result for `key`, calling `loader` only if nothing is cached yet.
	pub fn get_or_load<F, Fut>(&self, key: &str, loader: F) -> SharedLoad<T>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<T, ResourceError>> + 'static,
	{
		if let Some(existing) = self.entries.borrow().get(key) {
			return existing.clone();
		}
		let shared = loader().boxed_local().shared();
		self.entries
			.borrow_mut()
			.insert(key.to_string(), shared.clone());
		shared
	}

	/// Completed result for `key`, if the load has finished.
	#[cfg(test)]
	fn peek(&self, key: &str) -> Option<Result<T, ResourceError>> {
		self.entries.borrow().get(key)?.peek().cloned()
	}

	#[cfg(test)]
	fn contains(&self, key: &str) -> bool {
		self.entries.borrow().contains_key(key)
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	#[cfg(test)]
	fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

/// One cache per resource family used by the detail panel.
#[derive(Default)]
pub struct ContentCaches {
	pub stylesheets: ResourceCache<()>,
	pub fragments: ResourceCache<String>,
	pub markdown: ResourceCache<String>,
	pub images: ResourceCache<()>,
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use futures::channel::oneshot;
	use futures::executor::block_on;
	use futures::future::join;

	use super::*;

	fn failed(url: &str) -> ResourceError {
		ResourceError::Status {
			url: url.into(),
			status: 404,
		}
	}

	#[test]
	fn concurrent_requests_share_one_load() {
		let cache = ResourceCache::<String>::new();
		let calls = Rc::new(Cell::new(0));
		let (tx, rx) = oneshot::channel::<String>();

		let first = cache.get_or_load("a.md", || {
			calls.set(calls.get() + 1);
			async move { rx.await.map_err(|_| failed("a.md")) }
		});
		let second = cache.get_or_load("a.md", || {
			calls.set(calls.get() + 1);
			async { Ok("# other".to_string()) }
		});
		tx.send("# hello".to_string()).unwrap();

		let (a, b) = block_on(join(first, second));
		assert_eq!(calls.get(), 1);
		assert_eq!(a, Ok("# hello".to_string()));
		assert_eq!(a, b);
		assert_eq!(cache.len(), 1);
	}

	#[test]
	fn failures_are_cached_and_not_retried() {
		let cache = ResourceCache::<String>::new();
		let calls = Rc::new(Cell::new(0));
		for _ in 0..3 {
			let calls = calls.clone();
			let result = block_on(cache.get_or_load("missing.md", move || {
				calls.set(calls.get() + 1);
				async { Err(failed("missing.md")) }
			}));
			assert_eq!(result, Err(failed("missing.md")));
		}
		assert_eq!(calls.get(), 1);
		assert_eq!(cache.peek("missing.md"), Some(Err(failed("missing.md"))));
	}

	#[test]
	fn failure_reaches_every_waiter() {
		let cache = ResourceCache::<()>::new();
		let (tx, rx) = oneshot::channel::<Result<(), ResourceError>>();
		let first = cache.get_or_load("a.css", move || async move {
			rx.await.unwrap_or_else(|_| Err(failed("a.css")))
		});
		let second = cache.get_or_load("a.css", || async { Ok(()) });
		tx.send(Err(failed("a.css"))).unwrap();
		let (a, b) = block_on(join(first, second));
		assert_eq!(a, Err(failed("a.css")));
		assert_eq!(b, Err(failed("a.css")));
	}

	#[test]
	fn keys_are_independent() {
		let cache = ResourceCache::<u32>::new();
		assert!(cache.is_empty());
		let a = block_on(cache.get_or_load("a", || async { Ok(1) }));
		let b = block_on(cache.get_or_load("b", || async { Ok(2) }));
		assert_eq!((a, b), (Ok(1), Ok(2)));
		assert!(cache.contains("a") && cache.contains("b"));
		assert_eq!(cache.peek("c"), None);
	}
}
