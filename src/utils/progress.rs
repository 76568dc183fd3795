use std::time::{Duration, Instant};

/// Tracks accepted-record throughput for operator progress lines.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    target: Option<usize>,
    started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressStats {
    pub elapsed: Duration,
    pub per_second: f64,
    pub remaining: Option<Duration>,
}

impl ProgressTracker {
    pub fn new(target: Option<usize>) -> Self {
        Self {
            target,
            started: Instant::now(),
        }
    }

    pub fn stats(&self, done: usize) -> ProgressStats {
        stats_for(self.started.elapsed(), done, self.target)
    }
}

fn stats_for(elapsed: Duration, done: usize, target: Option<usize>) -> ProgressStats {
    let secs = elapsed.as_secs_f64();
    let per_second = if secs > 0.0 { done as f64 / secs } else { 0.0 };
    let remaining = match target {
        Some(target) if per_second > 0.0 && target > done => {
            Some(Duration::from_secs_f64((target - done) as f64 / per_second))
        }
        Some(_) if per_second > 0.0 => Some(Duration::ZERO),
        _ => None,
    };
    ProgressStats {
        elapsed,
        per_second,
        remaining,
    }
}

/// "1h 2m 3s", "4m 5s" or "6s"
pub fn format_time(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_like_a_stopwatch() {
        assert_eq!(format_time(Duration::from_secs(3723)), "1h 2m 3s");
        assert_eq!(format_time(Duration::from_secs(245)), "4m 5s");
        assert_eq!(format_time(Duration::from_millis(6900)), "6s");
    }

    #[test]
    fn remaining_time_from_rate() {
        let stats = stats_for(Duration::from_secs(10), 20, Some(100));
        assert_eq!(stats.per_second, 2.0);
        assert_eq!(stats.remaining, Some(Duration::from_secs(40)));

        let unbounded = stats_for(Duration::from_secs(10), 20, None);
        assert_eq!(unbounded.remaining, None);

        let idle = stats_for(Duration::ZERO, 0, Some(5));
        assert_eq!(idle.per_second, 0.0);
        assert_eq!(idle.remaining, None);
    }
}
