//! Student roster methods on Repository

use chrono::{DateTime, Utc};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{CreateStudent, Student, UpdateStudent},
};

impl Repository {
    /// List all students in roster order.
    pub fn students_list(&self) -> AppResult<Vec<Student>> {
        let data = self.read()?;
        Ok(data.students.values().cloned().collect())
    }

    /// Find a student by exact barcode.
    pub fn students_find(&self, barcode: &str) -> AppResult<Option<Student>> {
        let data = self.read()?;
        Ok(data.students.get(barcode).cloned())
    }

    /// Get a student by barcode
    pub fn students_get(&self, barcode: &str) -> AppResult<Student> {
        self.students_find(barcode)?
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", barcode)))
    }

    /// Add a new student. Fails on a duplicate barcode.
    pub fn students_insert(&self, data: CreateStudent, now: DateTime<Utc>) -> AppResult<Student> {
        let mut state = self.write()?;
        if state.students.contains_key(&data.barcode) {
            return Err(AppError::Conflict(
                "A student with this barcode already exists".into(),
            ));
        }

        let student = Student {
            name: data.name,
            barcode: data.barcode,
            email: data.email,
            photo: data.photo,
            added_date: now,
        };
        state
            .students
            .insert(student.barcode.clone(), student.clone());
        self.save_students(&state)?;
        Ok(student)
    }

    /// Edit a student in place. A barcode rename cascades through the
    /// ledger; denormalized names on historical transactions keep their
    /// point-in-time values.
    pub fn students_update(&self, barcode: &str, update: &UpdateStudent) -> AppResult<Student> {
        let mut state = self.write()?;
        let index = state
            .students
            .get_index_of(barcode)
            .ok_or_else(|| AppError::NotFound(format!("Student {} not found", barcode)))?;

        let new_barcode = update.barcode.as_deref().unwrap_or(barcode);
        let renamed = new_barcode != barcode;
        if renamed && state.students.contains_key(new_barcode) {
            return Err(AppError::Conflict(
                "A student with this barcode already exists".into(),
            ));
        }

        let mut student = state.students[index].clone();
        if let Some(name) = &update.name {
            student.name = name.clone();
        }
        student.barcode = new_barcode.to_string();
        if let Some(email) = &update.email {
            student.email = Some(email.clone());
        }
        if let Some(photo) = &update.photo {
            student.photo = Some(photo.clone());
        }

        if renamed {
            state.students.shift_remove_index(index);
            state
                .students
                .shift_insert(index, student.barcode.clone(), student.clone());
            let rewritten =
                super::transactions::cascade_student_barcode(&mut state, barcode, new_barcode);
            self.save_students(&state)?;
            if rewritten > 0 {
                self.save_transactions(&state)?;
            }
        } else {
            state.students[index] = student.clone();
            self.save_students(&state)?;
        }
        Ok(student)
    }

    /// Remove a student from the roster. Transaction history is untouched.
    pub fn students_delete(&self, barcode: &str) -> AppResult<()> {
        let mut state = self.write()?;
        if state.students.shift_remove(barcode).is_none() {
            return Err(AppError::NotFound(format!("Student {} not found", barcode)));
        }
        self.save_students(&state)?;
        Ok(())
    }
}
