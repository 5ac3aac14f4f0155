//! Deterministic "hand-drawn" link geometry.
//!
//! Everything here is a pure function of its arguments: a link is jittered by
//! hashing its key, so it redraws identically on every frame and every reload.

use std::f64::consts::PI;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

const MIN_SEGMENTS: usize = 4;
const MAX_SEGMENTS: usize = 9;
const SEGMENT_LENGTH: f64 = 80.0;
const MIN_AMPLITUDE: f64 = 2.2;
const MAX_AMPLITUDE: f64 = 8.0;
const AMPLITUDE_PER_LENGTH: f64 = 0.020;
const ALONG_FACTOR: f64 = 0.18;
const MAX_TILT_DEG: f64 = 6.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// FNV-1a over UTF-16 code units, reduced to `[0, 1)` in millionths.
pub fn hash_to_unit(key: &str) -> f64 {
	let mut h = FNV_OFFSET;
	for unit in key.encode_utf16() {
		h ^= u32::from(unit);
		h = h.wrapping_mul(FNV_PRIME);
	}
	f64::from(h % 1_000_000) / 1_000_000.0
}

/// Hash remapped to `[-1, 1)`.
fn signed_unit(key: &str) -> f64 {
	(hash_to_unit(key) - 0.5) * 2.0
}

/// Slight per-node rotation in degrees, within ±6.
pub fn node_tilt_deg(node_id: &str) -> f64 {
	signed_unit(&format!("tilt:{node_id}")) * MAX_TILT_DEG
}

pub fn segment_count(length: f64) -> usize {
	((length / SEGMENT_LENGTH).round() as usize).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

pub fn base_amplitude(length: f64) -> f64 {
	(length * AMPLITUDE_PER_LENGTH).clamp(MIN_AMPLITUDE, MAX_AMPLITUDE)
}

/// Fades jitter toward both ends while keeping a little at the tips.
fn envelope(t: f64) -> f64 {
	0.28 + 0.72 * (PI * t).sin()
}

/// Polyline from `source` to `target`, pulled in by the two insets, with
/// interior points jittered perpendicular to (and slightly along) the link.
///
/// Returns the inset start, `segment_count` interior points, and the inset end.
pub fn path_for(
	link_key: &str,
	source: Point,
	target: Point,
	source_inset: f64,
	target_inset: f64,
) -> Vec<Point> {
	let (dx, dy) = (target.x - source.x, target.y - source.y);
	let length = match dx.hypot(dy) {
		l if l > 0.0 => l,
		_ => 1.0,
	};
	let (ux, uy) = (dx / length, dy / length);
	let (px, py) = (-uy, ux);

	let start = Point::new(source.x + ux * source_inset, source.y + uy * source_inset);
	let end = Point::new(target.x - ux * target_inset, target.y - uy * target_inset);

	let amplitude = base_amplitude(length);
	let segments = segment_count(length);

	let mut points = Vec::with_capacity(segments + 2);
	points.push(start);
	for i in 1..=segments {
		let t = i as f64 / (segments + 1) as f64;
		let env = envelope(t);
		let r1 = signed_unit(&format!("j:{link_key}:{i}:a"));
		let r2 = signed_unit(&format!("j:{link_key}:{i}:b"));

		// Side comes from the hash so the kinks don't strictly alternate.
		let sign = if r2 >= 0.0 { 1.0 } else { -1.0 };
		let amp = amplitude * env * (0.55 + 0.55 * r1.abs());
		let along = amplitude * ALONG_FACTOR * env * r2;

		points.push(Point::new(
			start.x + (end.x - start.x) * t + px * amp * sign + ux * along,
			start.y + (end.y - start.y) * t + py * amp * sign + uy * along,
		));
	}
	points.push(end);
	points
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fnv_matches_reference_values() {
		// FNV-1a("") is the offset basis; FNV-1a("a") = 0xe40c292c.
		assert_eq!(hash_to_unit(""), f64::from(FNV_OFFSET % 1_000_000) / 1e6);
		assert_eq!(hash_to_unit("a"), f64::from(0xe40c_292c_u32 % 1_000_000) / 1e6);
	}

	#[test]
	fn same_inputs_produce_identical_paths() {
		let a = path_for("Root→A", Point::new(0.0, 0.0), Point::new(320.0, 140.0), 20.0, 26.0);
		let b = path_for("Root→A", Point::new(0.0, 0.0), Point::new(320.0, 140.0), 20.0, 26.0);
		let bits = |ps: &[Point]| ps.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect::<Vec<_>>();
		assert_eq!(bits(&a), bits(&b));
	}

	#[test]
	fn different_links_jitter_differently() {
		let a = path_for("Root→A", Point::new(0.0, 0.0), Point::new(400.0, 0.0), 0.0, 0.0);
		let b = path_for("Root→B", Point::new(0.0, 0.0), Point::new(400.0, 0.0), 0.0, 0.0);
		assert_ne!(a, b);
	}

	#[test]
	fn endpoints_are_inset_exactly() {
		let points = path_for("k", Point::new(0.0, 0.0), Point::new(300.0, 400.0), 10.0, 20.0);
		let close = |p: &Point, x: f64, y: f64| (p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9;
		assert!(close(&points[0], 6.0, 8.0));
		assert!(close(&points[points.len() - 1], 288.0, 384.0));
	}

	#[test]
	fn segment_count_is_bounded() {
		assert_eq!(segment_count(10.0), 4);
		assert_eq!(segment_count(480.0), 6);
		assert_eq!(segment_count(5000.0), 9);
		let points = path_for("k", Point::new(0.0, 0.0), Point::new(5000.0, 0.0), 0.0, 0.0);
		assert_eq!(points.len(), 11);
	}

	#[test]
	fn jitter_stays_within_amplitude_envelope() {
		let length = 600.0;
		let points = path_for("Root→Blog", Point::new(0.0, 0.0), Point::new(length, 0.0), 0.0, 0.0);
		// Perpendicular offset is the y coordinate for a horizontal link.
		let max = base_amplitude(length) * 1.1;
		for p in &points[1..points.len() - 1] {
			assert!(p.y.abs() <= max + 1e-9, "offset {} exceeds {}", p.y, max);
			assert!(p.y.abs() > 0.0);
		}
	}

	#[test]
	fn zero_length_links_do_not_produce_nan() {
		let points = path_for("k", Point::new(5.0, 5.0), Point::new(5.0, 5.0), 3.0, 3.0);
		assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
	}

	#[test]
	fn tilt_is_stable_and_bounded() {
		assert_eq!(node_tilt_deg("Root"), node_tilt_deg("Root"));
		for id in ["Root", "About", "Blog", "Papers", "x"] {
			assert!(node_tilt_deg(id).abs() <= 6.0);
		}
	}
}
