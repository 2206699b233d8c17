//! Scan interpreter: turns barcode scans into checkout/check-in actions.
//!
//! Session-scoped state machine. A scan never commits anything by itself;
//! every checkout and check-in needs an explicit confirm, and cancel from
//! any state discards the draft without touching the ledger. Scan errors
//! leave the state unchanged.

use chrono::{DateTime, Utc};

use crate::{
    config::CheckoutConfig,
    error::{AppError, AppResult},
    events::{AppEvent, EventBus},
    models::{EquipmentItem, Student, Transaction},
    repository::Repository,
};

/// A checkout prepared by scanning, awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutDraft {
    pub student: Student,
    pub equipment: EquipmentItem,
    /// Prefilled with the configured default (next day, end of school day);
    /// the confirm step may override it.
    pub expected_return_time: Option<DateTime<Utc>>,
}

/// Where the scan session currently stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScanState {
    #[default]
    Idle,
    /// A student with nothing out was identified; awaiting an equipment scan.
    StudentSelected { student: Student },
    /// A student with open checkouts was identified; each item can be
    /// returned individually, all at once, or the student can proceed to a
    /// fresh checkout.
    StudentHasOpenItems {
        student: Student,
        open: Vec<Transaction>,
    },
    AwaitingCheckoutConfirm { draft: CheckoutDraft },
    AwaitingCheckinConfirm { transaction: Transaction },
}

pub struct ScanInterpreter {
    repository: Repository,
    events: EventBus,
    checkout: CheckoutConfig,
    state: ScanState,
}

impl ScanInterpreter {
    pub fn new(repository: Repository, events: EventBus, checkout: CheckoutConfig) -> Self {
        Self {
            repository,
            events,
            checkout,
            state: ScanState::Idle,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    fn set_state(&mut self, state: ScanState) {
        self.state = state;
        self.events
            .emit(AppEvent::ScanStateChanged(self.state.clone()));
    }

    /// The student this session is acting for, if one has been scanned.
    fn selected_student(&self) -> Option<&Student> {
        match &self.state {
            ScanState::StudentSelected { student } => Some(student),
            ScanState::StudentHasOpenItems { student, .. } => Some(student),
            ScanState::AwaitingCheckoutConfirm { draft } => Some(&draft.student),
            ScanState::Idle | ScanState::AwaitingCheckinConfirm { .. } => None,
        }
    }

    /// Interpret one scanned code against the roster, inventory and ledger.
    ///
    /// A code matching both a student and an equipment barcode is treated
    /// as the student: the roster is always consulted first.
    pub fn handle_scan(&mut self, code: &str, now: DateTime<Utc>) -> AppResult<&ScanState> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(&self.state);
        }

        if self.selected_student().is_none() {
            if let Some(student) = self.repository.students_find(code)? {
                let open = self.repository.open_transactions_for(code)?;
                if open.is_empty() {
                    self.set_state(ScanState::StudentSelected { student });
                } else {
                    self.set_state(ScanState::StudentHasOpenItems { student, open });
                }
                return Ok(&self.state);
            }
        }

        if let Some(equipment) = self.repository.equipment_find(code)? {
            let active = self.repository.open_transaction(code)?;
            let selected = self.selected_student().cloned();
            return match (active, selected) {
                (Some(transaction), None) => {
                    self.set_state(ScanState::AwaitingCheckinConfirm { transaction });
                    Ok(&self.state)
                }
                (None, Some(student)) => {
                    let draft = CheckoutDraft {
                        student,
                        equipment,
                        expected_return_time: self.checkout.default_expected_return(now),
                    };
                    self.set_state(ScanState::AwaitingCheckoutConfirm { draft });
                    Ok(&self.state)
                }
                (Some(transaction), Some(_)) => Err(AppError::BusinessRule(format!(
                    "Equipment is already checked out to {}",
                    transaction.student_name
                ))),
                (None, None) => Err(AppError::BadRequest(
                    "Please scan a student pass first".into(),
                )),
            };
        }

        Err(AppError::NotFound(
            "Barcode not recognized. Please add student or equipment first.".into(),
        ))
    }

    /// From the open-items list, keep the student selected and move on to a
    /// fresh checkout instead of returning anything.
    pub fn proceed_to_checkout(&mut self) -> AppResult<&ScanState> {
        match &self.state {
            ScanState::StudentHasOpenItems { student, .. } => {
                let student = student.clone();
                self.set_state(ScanState::StudentSelected { student });
                Ok(&self.state)
            }
            _ => Err(AppError::BadRequest(
                "No open-items list to proceed from".into(),
            )),
        }
    }

    /// Return a single item from the open-items list. Stays on the list
    /// until it drains, then resets to idle.
    pub fn check_in_single(
        &mut self,
        equipment_barcode: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let (student, open) = match &self.state {
            ScanState::StudentHasOpenItems { student, open } => (student.clone(), open.clone()),
            _ => {
                return Err(AppError::BadRequest(
                    "No open-items list to check in from".into(),
                ))
            }
        };

        let transaction =
            self.repository
                .record_checkin(equipment_barcode, "Single item check-in", now)?;
        self.events.emit(AppEvent::LedgerChanged);

        let open: Vec<Transaction> = open
            .into_iter()
            .filter(|t| t.equipment_barcode != equipment_barcode)
            .collect();
        if open.is_empty() {
            self.set_state(ScanState::Idle);
        } else {
            self.set_state(ScanState::StudentHasOpenItems { student, open });
        }
        Ok(transaction)
    }

    /// Return everything on the open-items list; each item closes
    /// independently. Resets to idle.
    pub fn check_in_all(&mut self, now: DateTime<Utc>) -> AppResult<usize> {
        let student = match &self.state {
            ScanState::StudentHasOpenItems { student, .. } => student.clone(),
            _ => {
                return Err(AppError::BadRequest(
                    "No open-items list to check in from".into(),
                ))
            }
        };

        let closed =
            self.repository
                .record_checkin_all(&student.barcode, "Batch check-in (all items)", now)?;
        if closed > 0 {
            self.events.emit(AppEvent::LedgerChanged);
        }
        self.set_state(ScanState::Idle);
        Ok(closed)
    }

    /// Commit the drafted checkout. An explicit expected-return overrides
    /// the draft default.
    pub fn confirm_checkout(
        &mut self,
        notes: &str,
        expected_return_override: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let draft = match &self.state {
            ScanState::AwaitingCheckoutConfirm { draft } => draft.clone(),
            _ => {
                return Err(AppError::BadRequest(
                    "No checkout awaiting confirmation".into(),
                ))
            }
        };

        let expected = expected_return_override.or(draft.expected_return_time);
        let transaction =
            self.repository
                .record_checkout(&draft.student, &draft.equipment, notes, expected, now)?;
        self.events.emit(AppEvent::LedgerChanged);
        self.set_state(ScanState::Idle);
        Ok(transaction)
    }

    /// Commit the drafted check-in.
    pub fn confirm_checkin(&mut self, notes: &str, now: DateTime<Utc>) -> AppResult<Transaction> {
        let equipment_barcode = match &self.state {
            ScanState::AwaitingCheckinConfirm { transaction } => {
                transaction.equipment_barcode.clone()
            }
            _ => {
                return Err(AppError::BadRequest(
                    "No check-in awaiting confirmation".into(),
                ))
            }
        };

        let transaction = self.repository.record_checkin(&equipment_barcode, notes, now)?;
        self.events.emit(AppEvent::LedgerChanged);
        self.set_state(ScanState::Idle);
        Ok(transaction)
    }

    /// Discard any draft and return to idle. Never touches the ledger.
    pub fn cancel(&mut self) {
        self.set_state(ScanState::Idle);
    }
}
