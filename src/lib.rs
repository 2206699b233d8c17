//! Equiptrack - Equipment Check-In/Out Tracker
//!
//! A single-station checkout tracker for school media/AV equipment:
//! barcode scans associate students with borrowable gear, a transaction
//! ledger records every checkout and return, and reports surface what is
//! out and what is overdue. State lives in three whole-document JSON
//! collections behind a storage adapter; the rendering layer subscribes to
//! change events instead of polling.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod repository;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
