/// Uniform scale that fits a panel's natural size into the available area,
/// leaving `margin` (e.g. 0.9 for a 10% inset) of breathing room.
///
/// `None` while either box is still empty, i.e. before layout has settled.
pub fn fit_scale(available: (f64, f64), natural: (f64, f64), margin: f64) -> Option<f64> {
	let (aw, ah) = available;
	let (nw, nh) = natural;
	if aw <= 0.0 || ah <= 0.0 || nw <= 0.0 || nh <= 0.0 {
		return None;
	}
	Some((aw * margin / nw).min(ah * margin / nh))
}

/// A live fit observer; disconnects when dropped.
pub struct FitObserver {
	disconnect: Option<Box<dyn FnOnce()>>,
}

impl FitObserver {
	pub fn new(disconnect: impl FnOnce() + 'static) -> Self {
		Self {
			disconnect: Some(Box::new(disconnect)),
		}
	}

	/// Observer with nothing to release.
	pub fn inert() -> Self {
		Self { disconnect: None }
	}
}

impl Drop for FitObserver {
	fn drop(&mut self) {
		if let Some(disconnect) = self.disconnect.take() {
			disconnect();
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn limited_by_tighter_axis() {
		assert_eq!(fit_scale((1000.0, 500.0), (500.0, 500.0), 0.9), Some(0.9));
		assert_eq!(fit_scale((1000.0, 1000.0), (2000.0, 500.0), 1.0), Some(0.5));
	}

	#[test]
	fn small_panels_grow() {
		let scale = fit_scale((800.0, 800.0), (200.0, 100.0), 0.9).unwrap();
		assert!((scale - 3.6).abs() < 1e-12);
	}

	#[test]
	fn empty_boxes_are_not_measured() {
		assert_eq!(fit_scale((0.0, 500.0), (10.0, 10.0), 0.9), None);
		assert_eq!(fit_scale((500.0, 500.0), (10.0, 0.0), 0.9), None);
	}

	#[test]
	fn drop_disconnects_once() {
		let count = Rc::new(Cell::new(0));
		let c = count.clone();
		let observer = FitObserver::new(move || c.set(c.get() + 1));
		drop(observer);
		assert_eq!(count.get(), 1);
		drop(FitObserver::inert());
	}
}
