use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CompletionError;
use crate::models::CompletionStats;

/// Processing-time samples kept for the rolling average.
const SAMPLE_WINDOW: usize = 100;

#[derive(Debug)]
struct MetricsState {
    samples: VecDeque<i64>,
    total_completed: u64,
    completed_today: u64,
    today: NaiveDate,
    last_completion_at: Option<DateTime<Utc>>,
}

impl MetricsState {
    fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SAMPLE_WINDOW),
            total_completed: 0,
            completed_today: 0,
            today: Utc::now().date_naive(),
            last_completion_at: None,
        }
    }
}

/// In-memory completion metrics: lifetime and per-day counters plus a
/// rolling average over the most recent processing times. State resets on
/// restart.
#[derive(Debug)]
pub struct CompletionMetrics {
    state: Mutex<MetricsState>,
}

impl Default for CompletionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionMetrics {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MetricsState::new()),
        }
    }

    /// Records one completion. Negative processing times are clamped to
    /// zero, since clock skew between creation and confirmation can
    /// produce them.
    pub async fn record(&self, processing_time_ms: i64) {
        let now = Utc::now();
        let mut state = self.state.lock().await;

        if state.today != now.date_naive() {
            state.today = now.date_naive();
            state.completed_today = 0;
        }

        if state.samples.len() == SAMPLE_WINDOW {
            state.samples.pop_front();
        }
        state.samples.push_back(processing_time_ms.max(0));

        state.total_completed += 1;
        state.completed_today += 1;
        state.last_completion_at = Some(now);

        debug!(
            processing_time_ms,
            total = state.total_completed,
            "Recorded completion"
        );
    }

    pub async fn snapshot(&self) -> Result<CompletionStats, CompletionError> {
        let state = self.state.lock().await;
        let average = if state.samples.is_empty() {
            0
        } else {
            state.samples.iter().sum::<i64>() / state.samples.len() as i64
        };
        CompletionStats::new(
            state.total_completed,
            state.completed_today,
            average,
            state.last_completion_at,
        )
    }

    pub async fn sample_count(&self) -> usize {
        self.state.lock().await.samples.len()
    }
}
