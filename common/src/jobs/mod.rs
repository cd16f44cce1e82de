use serde::Serialize;

/// What happened to a single contact row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ContactOutcome {
    /// Delivered on the given attempt (1-based).
    Sent { attempts: u32 },
    /// Every attempt failed; `reason` is the error of the last one.
    Failed { attempts: u32, reason: String },
    /// The phone cell was blank, nothing was attempted.
    Skipped,
}

/// Aggregate counters for one batch run.
///
/// `success + failed + skipped == total` holds once every row has been recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &ContactOutcome) {
        match outcome {
            ContactOutcome::Sent { .. } => self.success += 1,
            ContactOutcome::Failed { .. } => self.failed += 1,
            ContactOutcome::Skipped => self.skipped += 1,
        }
    }

    /// Rows recorded so far.
    pub fn processed(&self) -> usize {
        self.success + self.failed + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_each_outcome_once() {
        let mut summary = RunSummary::new(3);
        summary.record(&ContactOutcome::Sent { attempts: 2 });
        summary.record(&ContactOutcome::Skipped);
        summary.record(&ContactOutcome::Failed {
            attempts: 3,
            reason: "compose box not found".to_string(),
        });
        assert_eq!(summary.success, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.processed(), summary.total);
    }
}
