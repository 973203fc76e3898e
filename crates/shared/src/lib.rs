//! igrejas Shared Types and Utilities
//!
//! This crate contains types, errors, and utilities shared across the igrejas platform.

pub mod calendar;
pub mod db;
pub mod error;
pub mod report;
pub mod types;

pub use calendar::{brazilian_holidays, easter_sunday, Holiday, HolidayKind};
pub use db::*;
pub use error::*;
pub use report::{church_clients_csv, church_report_filename, format_br_date};
pub use types::*;
