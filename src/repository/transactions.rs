//! Transaction ledger methods on Repository.
//!
//! Invariants enforced here: at most one open transaction per equipment
//! barcode, open means no check-in time, and records are never deleted.

use chrono::{DateTime, Utc};

use super::{DataSet, Repository};
use crate::{
    error::{AppError, AppResult},
    models::{EquipmentItem, Student, Transaction, TransactionStatus},
};

impl Repository {
    /// Every transaction, in ledger (append) order.
    pub fn transactions_list(&self) -> AppResult<Vec<Transaction>> {
        let data = self.read()?;
        Ok(data.transactions.clone())
    }

    /// Open transactions, optionally restricted to one equipment barcode.
    pub fn open_transactions(&self, equipment_barcode: Option<&str>) -> AppResult<Vec<Transaction>> {
        let data = self.read()?;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.is_open())
            .filter(|t| equipment_barcode.map_or(true, |b| t.equipment_barcode == b))
            .cloned()
            .collect())
    }

    /// Open transactions held by one student.
    pub fn open_transactions_for(&self, student_barcode: &str) -> AppResult<Vec<Transaction>> {
        let data = self.read()?;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.is_open() && t.student_barcode == student_barcode)
            .cloned()
            .collect())
    }

    /// The unique open transaction for an equipment barcode, if any.
    pub fn open_transaction(&self, equipment_barcode: &str) -> AppResult<Option<Transaction>> {
        let data = self.read()?;
        Ok(data
            .transactions
            .iter()
            .find(|t| t.is_open() && t.equipment_barcode == equipment_barcode)
            .cloned())
    }

    pub fn is_checked_out(&self, equipment_barcode: &str) -> AppResult<bool> {
        Ok(self.open_transaction(equipment_barcode)?.is_some())
    }

    /// Record a checkout. Refuses when the equipment is already out,
    /// naming the current holder. Display fields are denormalized copies
    /// taken here, at checkout time.
    pub fn record_checkout(
        &self,
        student: &Student,
        equipment: &EquipmentItem,
        notes: &str,
        expected_return_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let mut state = self.write()?;
        if let Some(open) = state
            .transactions
            .iter()
            .find(|t| t.is_open() && t.equipment_barcode == equipment.barcode)
        {
            return Err(AppError::BusinessRule(format!(
                "Equipment is already checked out to {}",
                open.student_name
            )));
        }

        let transaction = Transaction {
            id: self.next_id(),
            student_name: student.name.clone(),
            student_barcode: student.barcode.clone(),
            equipment_type: equipment.equipment_type.clone(),
            equipment_barcode: equipment.barcode.clone(),
            equipment_description: equipment.description.clone().unwrap_or_default(),
            checkout_time: now,
            expected_return_time,
            checkin_time: None,
            status: TransactionStatus::Out,
            checkout_notes: notes.to_string(),
            checkin_notes: String::new(),
        };
        state.transactions.push(transaction.clone());
        self.save_transactions(&state)?;
        Ok(transaction)
    }

    /// Close the open transaction for an equipment barcode.
    pub fn record_checkin(
        &self,
        equipment_barcode: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let mut state = self.write()?;
        let transaction = state
            .transactions
            .iter_mut()
            .find(|t| t.is_open() && t.equipment_barcode == equipment_barcode)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No open checkout for equipment {}",
                    equipment_barcode
                ))
            })?;

        transaction.checkin_time = Some(now);
        transaction.status = TransactionStatus::In;
        transaction.checkin_notes = notes.to_string();
        let transaction = transaction.clone();
        self.save_transactions(&state)?;
        Ok(transaction)
    }

    /// Close every open transaction held by one student. Each closes
    /// independently; returns how many were closed.
    pub fn record_checkin_all(
        &self,
        student_barcode: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let mut state = self.write()?;
        let mut closed = 0;
        for transaction in state
            .transactions
            .iter_mut()
            .filter(|t| t.is_open() && t.student_barcode == student_barcode)
        {
            transaction.checkin_time = Some(now);
            transaction.status = TransactionStatus::In;
            transaction.checkin_notes = notes.to_string();
            closed += 1;
        }
        if closed > 0 {
            self.save_transactions(&state)?;
        }
        Ok(closed)
    }

    /// Rewrite a student barcode on every matching transaction, open or
    /// closed. Returns how many records were rewritten.
    pub fn rename_student_barcode(&self, old: &str, new: &str) -> AppResult<usize> {
        let mut state = self.write()?;
        let rewritten = cascade_student_barcode(&mut state, old, new);
        if rewritten > 0 {
            self.save_transactions(&state)?;
        }
        Ok(rewritten)
    }

    /// Rewrite an equipment barcode on every matching transaction, open or
    /// closed. Returns how many records were rewritten.
    pub fn rename_equipment_barcode(&self, old: &str, new: &str) -> AppResult<usize> {
        let mut state = self.write()?;
        let rewritten = cascade_equipment_barcode(&mut state, old, new);
        if rewritten > 0 {
            self.save_transactions(&state)?;
        }
        Ok(rewritten)
    }

    /// Count open transactions.
    pub fn count_active(&self) -> AppResult<usize> {
        let data = self.read()?;
        Ok(data.transactions.iter().filter(|t| t.is_open()).count())
    }

    /// Count open transactions past their expected return.
    pub fn count_overdue(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let data = self.read()?;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.is_overdue(now))
            .count())
    }
}

pub(crate) fn cascade_student_barcode(state: &mut DataSet, old: &str, new: &str) -> usize {
    let mut rewritten = 0;
    for transaction in state
        .transactions
        .iter_mut()
        .filter(|t| t.student_barcode == old)
    {
        transaction.student_barcode = new.to_string();
        rewritten += 1;
    }
    rewritten
}

pub(crate) fn cascade_equipment_barcode(state: &mut DataSet, old: &str, new: &str) -> usize {
    let mut rewritten = 0;
    for transaction in state
        .transactions
        .iter_mut()
        .filter(|t| t.equipment_barcode == old)
    {
        transaction.equipment_barcode = new.to_string();
        rewritten += 1;
    }
    rewritten
}
