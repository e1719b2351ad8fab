//! Medicine domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the data they guard.
//!
//! # Invariants
//! - Every medicine is identified by a stable `MedicineId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod medicine;
