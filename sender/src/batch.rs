//! The per-contact send loop.
//!
//! Each row goes through `pending -> attempting (1..=max_attempts) -> sent |
//! failed`, or straight to skipped when the phone cell is blank. Errors from a
//! single contact stay inside its retry loop; the batch itself cannot fail.

use crate::dispatch::Messenger;
use crate::failure_log::FailureLog;
use crate::phone::normalize_phone;
use crate::timings::Timings;
use common::jobs::{ContactOutcome, RunSummary};
use common::model::config::SendConfig;
use common::model::template::{placeholders, MessageTemplate};
use common::sheet::{Row, Table};
use log::{info, warn};
use tokio::time::sleep;

/// Everything a batch run produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub summary: RunSummary,
    /// One entry per spreadsheet row, in row order.
    pub outcomes: Vec<ContactOutcome>,
}

pub struct BatchRunner<'a> {
    config: &'a SendConfig,
    table: &'a Table,
    timings: &'a Timings,
    failure_log: Option<&'a FailureLog>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a SendConfig, table: &'a Table, timings: &'a Timings) -> Self {
        Self {
            config,
            table,
            timings,
            failure_log: None,
        }
    }

    pub fn with_failure_log(mut self, log: &'a FailureLog) -> Self {
        self.failure_log = Some(log);
        self
    }

    fn template(&self) -> MessageTemplate<'a> {
        MessageTemplate {
            text: &self.config.message_template,
            selected_vars: &self.config.selected_vars,
            headers: &self.table.headers,
            phone_column: &self.config.phone_column,
        }
    }

    /// Placeholders that no row will ever fill: unselected, unknown, or both.
    fn untouched_placeholders(&self) -> Vec<String> {
        placeholders(&self.config.message_template)
            .into_iter()
            .filter(|p| {
                p != &self.config.phone_column
                    && !(self.config.selected_vars.contains(p) && self.table.has_column(p))
            })
            .collect()
    }

    pub async fn run<M: Messenger + ?Sized>(&self, messenger: &mut M) -> BatchReport {
        let total = self.table.len();
        let mut summary = RunSummary::new(total);
        let mut outcomes = Vec::with_capacity(total);

        let untouched = self.untouched_placeholders();
        if !untouched.is_empty() {
            warn!(
                "placeholders left as written (not selected or not a column): {}",
                untouched.join(", ")
            );
        }

        for (i, row) in self.table.rows.iter().enumerate() {
            info!("{}/{}:", i + 1, total);
            let outcome = match row.get(&self.config.phone_column) {
                None => {
                    warn!("  empty phone, skipping row {}", row.number);
                    ContactOutcome::Skipped
                }
                Some(raw_phone) => {
                    let outcome = self.deliver(messenger, row, raw_phone).await;
                    if i + 1 < total {
                        let delay = self.timings.jitter();
                        info!("  waiting {}s...", delay.as_secs());
                        sleep(delay).await;
                    }
                    outcome
                }
            };
            summary.record(&outcome);
            outcomes.push(outcome);
        }

        BatchReport { summary, outcomes }
    }

    async fn deliver<M: Messenger + ?Sized>(
        &self,
        messenger: &mut M,
        row: &Row,
        raw_phone: &str,
    ) -> ContactOutcome {
        let phone = normalize_phone(raw_phone, self.config.country_code());
        info!("  phone: {}", phone);
        let message = self.template().render(row, raw_phone);

        let max_attempts = self.timings.max_attempts.max(1);
        let mut last_error = String::new();
        for attempt in 1..=max_attempts {
            match messenger.send(&phone, &message).await {
                Ok(()) => {
                    info!("  sent");
                    return ContactOutcome::Sent { attempts: attempt };
                }
                Err(e) => {
                    last_error = e.to_string();
                    if attempt < max_attempts {
                        info!("  retry {}/{}", attempt, max_attempts);
                        sleep(self.timings.retry_backoff).await;
                    }
                }
            }
        }

        warn!("  failed after {} attempts: {}", max_attempts, last_error);
        if let Some(log) = self.failure_log {
            log.record(row.number, &phone, &last_error);
        }
        ContactOutcome::Failed {
            attempts: max_attempts,
            reason: last_error,
        }
    }
}
