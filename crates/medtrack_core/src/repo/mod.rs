//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract behind the medicine store.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce field validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.
//! - Adapters are interchangeable behind `MedicineRepository`.

pub mod medicine_repo;
pub mod memory_repo;
