//! Checkout/check-in service over the transaction ledger

use chrono::{DateTime, Utc};

use crate::{
    error::AppResult,
    events::{AppEvent, EventBus},
    models::Transaction,
    repository::Repository,
};

/// History view filter. Overdue is recomputed against `now` at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    All,
    Out,
    In,
    Overdue,
}

#[derive(Clone)]
pub struct CheckoutsService {
    repository: Repository,
    events: EventBus,
}

impl CheckoutsService {
    pub fn new(repository: Repository, events: EventBus) -> Self {
        Self { repository, events }
    }

    /// Everything currently out.
    pub fn currently_out(&self) -> AppResult<Vec<Transaction>> {
        self.repository.open_transactions(None)
    }

    /// Open transactions held by one student.
    pub fn open_for_student(&self, student_barcode: &str) -> AppResult<Vec<Transaction>> {
        self.repository.open_transactions_for(student_barcode)
    }

    pub fn is_checked_out(&self, equipment_barcode: &str) -> AppResult<bool> {
        self.repository.is_checked_out(equipment_barcode)
    }

    /// Check equipment out to a student, stamping the current time.
    pub fn check_out(
        &self,
        student_barcode: &str,
        equipment_barcode: &str,
        notes: &str,
        expected_return_time: Option<DateTime<Utc>>,
    ) -> AppResult<Transaction> {
        let student = self.repository.students_get(student_barcode)?;
        let equipment = self.repository.equipment_get(equipment_barcode)?;
        let transaction = self.repository.record_checkout(
            &student,
            &equipment,
            notes,
            expected_return_time,
            Utc::now(),
        )?;
        self.events.emit(AppEvent::LedgerChanged);
        Ok(transaction)
    }

    /// Return one piece of equipment.
    pub fn check_in(&self, equipment_barcode: &str, notes: &str) -> AppResult<Transaction> {
        let transaction = self
            .repository
            .record_checkin(equipment_barcode, notes, Utc::now())?;
        self.events.emit(AppEvent::LedgerChanged);
        Ok(transaction)
    }

    /// Return everything a student has out; each record closes independently.
    pub fn check_in_all(&self, student_barcode: &str, notes: &str) -> AppResult<usize> {
        let closed = self
            .repository
            .record_checkin_all(student_barcode, notes, Utc::now())?;
        if closed > 0 {
            self.events.emit(AppEvent::LedgerChanged);
        }
        Ok(closed)
    }

    /// Full history, newest checkout first, filtered by status.
    pub fn history(&self, filter: HistoryFilter, now: DateTime<Utc>) -> AppResult<Vec<Transaction>> {
        let mut transactions = self.repository.transactions_list()?;
        transactions.sort_by(|a, b| b.checkout_time.cmp(&a.checkout_time));
        transactions.retain(|t| match filter {
            HistoryFilter::All => true,
            HistoryFilter::Out => t.is_open(),
            HistoryFilter::In => !t.is_open(),
            HistoryFilter::Overdue => t.is_overdue(now),
        });
        Ok(transactions)
    }

    /// Count open transactions
    pub fn count_active(&self) -> AppResult<usize> {
        self.repository.count_active()
    }

    /// Count overdue transactions
    pub fn count_overdue(&self, now: DateTime<Utc>) -> AppResult<usize> {
        self.repository.count_overdue(now)
    }
}
