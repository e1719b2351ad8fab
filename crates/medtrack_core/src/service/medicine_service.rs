//! Medicine store use-case service.
//!
//! # Responsibility
//! - Provide the create/read/update/delete entry points for core callers.
//! - Assign identities on create and translate missing rows to `NotFound`.
//! - Delegate persistence to a `MedicineRepository` implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.
//! - Log events carry ids and counts only, never medicine text.

use crate::model::medicine::{Medicine, MedicineDraft, MedicineId, MedicineUpdate};
use crate::repo::medicine_repo::{MedicineListQuery, MedicineRepository, RepoError, RepoResult};
use log::{debug, info, warn};
use std::time::Instant;

/// Use-case service wrapper for medicine CRUD operations.
pub struct MedicineService<R: MedicineRepository> {
    repo: R,
}

impl<R: MedicineRepository> MedicineService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists every stored medicine in creation order.
    pub fn get_all_medicines(&self) -> RepoResult<Vec<Medicine>> {
        let medicines = self.repo.list_medicines(&MedicineListQuery::default())?;
        debug!(
            "event=medicine_list module=service status=ok scope=all count={}",
            medicines.len()
        );
        Ok(medicines)
    }

    /// Lists medicines owned by `user_id`.
    ///
    /// Unknown users yield an empty list, not an error.
    pub fn get_medicines_by_user_id(&self, user_id: &str) -> RepoResult<Vec<Medicine>> {
        let medicines = self
            .repo
            .list_medicines(&MedicineListQuery::for_user(user_id))?;
        debug!(
            "event=medicine_list module=service status=ok scope=user count={}",
            medicines.len()
        );
        Ok(medicines)
    }

    /// Gets one medicine by ID.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no record has this ID.
    pub fn get_medicine_by_id(&self, id: MedicineId) -> RepoResult<Medicine> {
        self.repo
            .get_medicine(id)?
            .ok_or(RepoError::NotFound(id))
    }

    /// Stores a new medicine under a freshly generated ID and returns it.
    ///
    /// # Errors
    /// - `RepoError::Validation` when draft fields are malformed; nothing is
    ///   stored in that case.
    pub fn create_medicine(&self, draft: MedicineDraft) -> RepoResult<MedicineId> {
        let started_at = Instant::now();
        let medicine = Medicine::from_draft(draft);
        let result = self.repo.insert_medicine(&medicine);
        log_write("medicine_create", medicine.id, started_at, &result);
        result
    }

    /// Replaces the mutable fields of the medicine `update.id`.
    ///
    /// The update applies only when `update.user_id` owns the record.
    /// `intake_frequency = None` keeps the stored frequency.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when the ID is absent or owned by another user.
    /// - `RepoError::Validation` on malformed fields.
    pub fn update_medicine(&self, update: &MedicineUpdate) -> RepoResult<MedicineId> {
        let started_at = Instant::now();
        let result = self.repo.update_medicine(update).map(|()| update.id);
        log_write("medicine_update", update.id, started_at, &result);
        result
    }

    /// Hard-deletes a medicine and returns its ID.
    pub fn delete_medicine(&self, id: MedicineId) -> RepoResult<MedicineId> {
        let started_at = Instant::now();
        let result = self.repo.delete_medicine(id).map(|()| id);
        log_write("medicine_delete", id, started_at, &result);
        result
    }

    /// Number of stored medicines across all users.
    pub fn count_medicines(&self) -> RepoResult<u64> {
        self.repo.count_medicines()
    }
}

fn log_write(event: &str, id: MedicineId, started_at: Instant, result: &RepoResult<MedicineId>) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={event} module=service status=ok medicine_id={id} duration_ms={duration_ms}"
        ),
        Err(err) => warn!(
            "event={event} module=service status=error medicine_id={id} duration_ms={duration_ms} error_code={}",
            error_code(err)
        ),
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation_failed",
        RepoError::NotFound(_) => "not_found",
        RepoError::Conflict(_) => "conflict",
        RepoError::Db(_) => "db_error",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::UninitializedConnection { .. }
        | RepoError::MissingRequiredTable(_)
        | RepoError::MissingRequiredColumn { .. } => "schema_mismatch",
        RepoError::LockPoisoned => "lock_poisoned",
    }
}

#[cfg(test)]
mod tests {
    use super::error_code;
    use crate::model::medicine::MedicineValidationError;
    use crate::repo::medicine_repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn error_codes_are_stable_metadata() {
        assert_eq!(
            error_code(&RepoError::Validation(MedicineValidationError::EmptyName)),
            "validation_failed"
        );
        assert_eq!(error_code(&RepoError::NotFound(Uuid::nil())), "not_found");
        assert_eq!(
            error_code(&RepoError::MissingRequiredTable("medicines")),
            "schema_mismatch"
        );
    }
}
