//! Student roster service

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    events::{AppEvent, EventBus},
    models::{CreateStudent, ImportReport, Student, UpdateStudent},
    repository::Repository,
};

#[derive(Clone)]
pub struct RosterService {
    repository: Repository,
    events: EventBus,
    photo_max_bytes: usize,
}

impl RosterService {
    pub fn new(repository: Repository, events: EventBus, photo_max_bytes: usize) -> Self {
        Self {
            repository,
            events,
            photo_max_bytes,
        }
    }

    /// List all students
    pub fn list(&self) -> AppResult<Vec<Student>> {
        self.repository.students_list()
    }

    /// Get a student by barcode
    pub fn get(&self, barcode: &str) -> AppResult<Student> {
        self.repository.students_get(barcode)
    }

    /// Case-insensitive substring search over name, barcode and email.
    pub fn search(&self, query: &str) -> AppResult<Vec<Student>> {
        let needle = query.to_lowercase();
        Ok(self
            .repository
            .students_list()?
            .into_iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.barcode.to_lowercase().contains(&needle)
                    || s.email
                        .as_deref()
                        .map(|e| e.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .collect())
    }

    /// Add a new student
    pub fn create(&self, data: CreateStudent, now: DateTime<Utc>) -> AppResult<Student> {
        let data = normalize(data);
        data.validate()?;
        self.check_photo(data.photo.as_deref())?;
        let student = self.repository.students_insert(data, now)?;
        self.events.emit(AppEvent::RosterChanged);
        Ok(student)
    }

    /// Edit a student. A barcode rename cascades through the ledger.
    pub fn update(&self, barcode: &str, update: UpdateStudent) -> AppResult<Student> {
        update.validate()?;
        self.check_photo(update.photo.as_deref())?;
        let renamed = update.barcode.as_deref().is_some_and(|b| b != barcode);
        let student = self.repository.students_update(barcode, &update)?;
        self.events.emit(AppEvent::RosterChanged);
        if renamed {
            self.events.emit(AppEvent::LedgerChanged);
        }
        Ok(student)
    }

    /// Remove a student. Their transaction history is preserved.
    pub fn delete(&self, barcode: &str) -> AppResult<()> {
        self.repository.students_delete(barcode)?;
        self.events.emit(AppEvent::RosterChanged);
        Ok(())
    }

    /// Bulk import, skipping entries whose barcode is already on the roster.
    pub fn import(&self, entries: Vec<CreateStudent>, now: DateTime<Utc>) -> AppResult<ImportReport> {
        let mut added = 0;
        let mut skipped = 0;
        for entry in entries {
            let entry = normalize(entry);
            entry.validate()?;
            if self.repository.students_find(&entry.barcode)?.is_some() {
                tracing::debug!(barcode = %entry.barcode, "import: skipped, already exists");
                skipped += 1;
                continue;
            }
            self.check_photo(entry.photo.as_deref())?;
            self.repository.students_insert(entry, now)?;
            added += 1;
        }
        let total = self.repository.students_list()?.len();
        tracing::info!(added, skipped, total, "roster import complete");
        if added > 0 {
            self.events.emit(AppEvent::RosterChanged);
        }
        Ok(ImportReport {
            added,
            skipped,
            total,
        })
    }

    /// Pretty-printed JSON export of the full roster, photos included.
    pub fn export_json(&self) -> AppResult<String> {
        let students = self.repository.students_list()?;
        Ok(serde_json::to_string_pretty(&students)?)
    }

    fn check_photo(&self, photo: Option<&str>) -> AppResult<()> {
        match photo {
            Some(data) if data.len() > self.photo_max_bytes => Err(AppError::Validation(format!(
                "Photo size too large. Please use a photo under {}KB.",
                self.photo_max_bytes / 1000
            ))),
            _ => Ok(()),
        }
    }
}

/// Trim whitespace and drop an empty email, matching form input handling.
fn normalize(mut data: CreateStudent) -> CreateStudent {
    data.name = data.name.trim().to_string();
    data.barcode = data.barcode.trim().to_string();
    data.email = data
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    data
}
