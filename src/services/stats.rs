//! Statistics service

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{format_elapsed, Transaction},
    repository::Repository,
};

/// Headline counts for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_students: usize,
    pub total_equipment: usize,
    pub currently_out: usize,
    pub overdue: usize,
}

/// One row of the currently-out report.
#[derive(Debug, Clone, Serialize)]
pub struct CheckedOutRow {
    pub student_name: String,
    pub equipment: String,
    /// Elapsed time since checkout ("42 min", "3 hrs").
    pub checked_out_for: String,
    pub expected_return_time: Option<DateTime<Utc>>,
    pub overdue: bool,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Headline counts. Overdue is recomputed against `now`, never stored.
    pub fn summary(&self, now: DateTime<Utc>) -> AppResult<SummaryStats> {
        Ok(SummaryStats {
            total_students: self.repository.students_list()?.len(),
            total_equipment: self.repository.equipment_list()?.len(),
            currently_out: self.repository.count_active()?,
            overdue: self.repository.count_overdue(now)?,
        })
    }

    /// The currently-out report, one row per open transaction.
    pub fn checked_out_report(&self, now: DateTime<Utc>) -> AppResult<Vec<CheckedOutRow>> {
        let open = self.repository.open_transactions(None)?;
        Ok(open.iter().map(|t| Self::row(t, now)).collect())
    }

    fn row(transaction: &Transaction, now: DateTime<Utc>) -> CheckedOutRow {
        CheckedOutRow {
            student_name: transaction.student_name.clone(),
            equipment: transaction.equipment_label(),
            checked_out_for: format_elapsed(transaction.minutes_out(now)),
            expected_return_time: transaction.expected_return_time,
            overdue: transaction.is_overdue(now),
        }
    }
}
