//! In-process medicine repository.
//!
//! Same contract as the SQLite adapter, kept in a `BTreeMap` behind a
//! `RwLock`. Used where durability is not needed (tests, previews).

use crate::model::medicine::{Medicine, MedicineId, MedicineUpdate};
use crate::repo::medicine_repo::{MedicineListQuery, MedicineRepository, RepoError, RepoResult};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    // Insertion sequence keeps list order stable across updates.
    next_seq: u64,
    records: BTreeMap<MedicineId, (u64, Medicine)>,
}

/// `RwLock`-guarded in-memory medicine storage.
#[derive(Debug, Default)]
pub struct InMemoryMedicineRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryMedicineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, MemoryState>> {
        self.state.read().map_err(|_| RepoError::LockPoisoned)
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state.write().map_err(|_| RepoError::LockPoisoned)
    }
}

impl MedicineRepository for InMemoryMedicineRepository {
    fn insert_medicine(&self, medicine: &Medicine) -> RepoResult<MedicineId> {
        medicine.validate()?;

        let mut state = self.write()?;
        if state.records.contains_key(&medicine.id) {
            return Err(RepoError::Conflict(medicine.id));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.records.insert(medicine.id, (seq, medicine.clone()));
        Ok(medicine.id)
    }

    fn get_medicine(&self, id: MedicineId) -> RepoResult<Option<Medicine>> {
        let state = self.read()?;
        Ok(state.records.get(&id).map(|(_, medicine)| medicine.clone()))
    }

    fn list_medicines(&self, query: &MedicineListQuery) -> RepoResult<Vec<Medicine>> {
        let state = self.read()?;
        let mut matched = state
            .records
            .values()
            .filter(|(_, medicine)| {
                query
                    .user_id
                    .as_deref()
                    .map_or(true, |user_id| medicine.user_id == user_id)
            })
            .collect::<Vec<_>>();
        matched.sort_by_key(|(seq, _)| *seq);
        Ok(matched
            .into_iter()
            .map(|(_, medicine)| medicine.clone())
            .collect())
    }

    fn update_medicine(&self, update: &MedicineUpdate) -> RepoResult<()> {
        update.validate()?;

        let mut state = self.write()?;
        match state.records.get_mut(&update.id) {
            Some((_, medicine)) if medicine.user_id == update.user_id => {
                medicine.apply(update);
                Ok(())
            }
            _ => Err(RepoError::NotFound(update.id)),
        }
    }

    fn delete_medicine(&self, id: MedicineId) -> RepoResult<()> {
        let mut state = self.write()?;
        match state.records.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn count_medicines(&self) -> RepoResult<u64> {
        let state = self.read()?;
        Ok(state.records.len() as u64)
    }
}
