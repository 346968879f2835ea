//! Throttled transfer progress

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One progress emission for a single transfer.
///
/// `fraction` is `None` while the total length is unknown. For any one
/// transfer, fractions are delivered in non-decreasing order and the final
/// emission reports completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferProgress {
	pub fraction: Option<f32>,
	pub label: String,
}

/// Decides when a progress emission is due.
///
/// Fast storage can push thousands of chunk completions per second; emitting
/// each one would saturate the consumer. With a known total, an emission is
/// due only when the integer percentage changes AND the minimum interval has
/// elapsed. With an unknown total, indeterminate ticks are paced by time
/// alone at a coarser interval.
pub struct ProgressThrottle {
	total: Option<u64>,
	label: String,
	min_interval: Duration,
	indeterminate_interval: Duration,
	last_percent: i64,
	last_emit: Option<Instant>,
}

impl ProgressThrottle {
	/// Interval floor between determinate emissions
	pub const MIN_INTERVAL: Duration = Duration::from_millis(40);
	/// Interval between indeterminate ticks when the length is unknown
	pub const INDETERMINATE_INTERVAL: Duration = Duration::from_millis(200);

	pub fn new(total: Option<u64>, label: impl Into<String>) -> Self {
		Self::with_intervals(
			total,
			label,
			Self::MIN_INTERVAL,
			Self::INDETERMINATE_INTERVAL,
		)
	}

	pub fn with_intervals(
		total: Option<u64>,
		label: impl Into<String>,
		min_interval: Duration,
		indeterminate_interval: Duration,
	) -> Self {
		Self {
			// A zero total carries no progress information; stream it as
			// indeterminate and let `finish` report completion.
			total: total.filter(|&t| t > 0),
			label: label.into(),
			min_interval,
			indeterminate_interval,
			last_percent: -1,
			last_emit: None,
		}
	}

	/// Report the running byte count; returns an emission if one is due
	pub fn update(&mut self, copied: u64) -> Option<TransferProgress> {
		match self.total {
			Some(total) => {
				let fraction = (copied as f64 / total as f64).min(1.0) as f32;
				let percent = (fraction * 100.0) as i64;
				if percent == self.last_percent {
					return None;
				}
				if !self.interval_elapsed(self.min_interval) {
					return None;
				}
				self.last_percent = percent;
				self.last_emit = Some(Instant::now());
				Some(TransferProgress {
					fraction: Some(fraction),
					label: self.label.clone(),
				})
			}
			None => {
				if !self.interval_elapsed(self.indeterminate_interval) {
					return None;
				}
				self.last_emit = Some(Instant::now());
				Some(TransferProgress {
					fraction: None,
					label: self.label.clone(),
				})
			}
		}
	}

	/// Unconditional final emission reporting completion
	pub fn finish(&mut self) -> TransferProgress {
		self.last_percent = 100;
		self.last_emit = Some(Instant::now());
		TransferProgress {
			fraction: Some(1.0),
			label: "Finalizing".to_string(),
		}
	}

	fn interval_elapsed(&self, interval: Duration) -> bool {
		match self.last_emit {
			Some(at) => at.elapsed() >= interval,
			None => true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unthrottled(total: Option<u64>) -> ProgressThrottle {
		ProgressThrottle::with_intervals(total, "Copying", Duration::ZERO, Duration::ZERO)
	}

	#[test]
	fn emits_only_on_percent_change() {
		let mut throttle = unthrottled(Some(1000));

		assert!(throttle.update(5).is_some()); // 0%
		assert!(throttle.update(7).is_none()); // still 0%
		assert!(throttle.update(10).is_some()); // 1%
		assert!(throttle.update(14).is_none());
		assert!(throttle.update(500).is_some()); // 50%
	}

	#[test]
	fn interval_floor_suppresses_emissions() {
		let mut throttle = ProgressThrottle::with_intervals(
			Some(1000),
			"Copying",
			Duration::from_secs(3600),
			Duration::ZERO,
		);

		assert!(throttle.update(10).is_some());
		// Percent changed, but the interval floor has not elapsed
		assert!(throttle.update(500).is_none());
		assert!(throttle.update(1000).is_none());
	}

	#[test]
	fn unknown_total_ticks_are_indeterminate() {
		let mut throttle = unthrottled(None);
		let tick = throttle.update(12345).unwrap();
		assert!(tick.fraction.is_none());
	}

	#[test]
	fn fractions_are_monotonic_and_clamped() {
		let mut throttle = unthrottled(Some(100));
		let mut last = -1.0f32;
		// Push past the declared total; fraction must clamp at 1.0
		for copied in [10u64, 50, 90, 100, 150] {
			if let Some(p) = throttle.update(copied) {
				let f = p.fraction.unwrap();
				assert!(f >= last);
				assert!(f <= 1.0);
				last = f;
			}
		}
		assert_eq!(throttle.finish().fraction, Some(1.0));
	}

	#[test]
	fn zero_total_streams_as_indeterminate() {
		let mut throttle = unthrottled(Some(0));
		assert!(throttle.update(0).unwrap().fraction.is_none());
		assert_eq!(throttle.finish().fraction, Some(1.0));
	}
}
