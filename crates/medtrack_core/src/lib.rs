//! Core domain logic for the medicine tracker.
//! This crate is the single source of truth for medicine record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::medicine::{
    IntakeFrequency, Medicine, MedicineDraft, MedicineId, MedicineType, MedicineUpdate,
    MedicineValidationError, UserId,
};
pub use repo::medicine_repo::{
    MedicineListQuery, MedicineRepository, RepoError, RepoResult, SqliteMedicineRepository,
};
pub use repo::memory_repo::InMemoryMedicineRepository;
pub use service::medicine_service::MedicineService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
