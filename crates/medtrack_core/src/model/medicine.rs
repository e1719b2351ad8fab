//! Medicine domain model.
//!
//! # Responsibility
//! - Define the canonical medicine record tracked for one owning user.
//! - Own field-level validation shared by every storage adapter.
//!
//! # Invariants
//! - `id` is stable and never reused for another medicine.
//! - Every medicine has exactly one non-empty `user_id`.
//! - `dosage_per_take` is a positive integer.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier assigned by the store at creation.
pub type MedicineId = Uuid;

/// Identifier of the owning user. Opaque to core.
pub type UserId = String;

pub const NAME_MAX_CHARS: usize = 200;
pub const TEXT_MAX_CHARS: usize = 2000;
pub const USER_ID_MAX_CHARS: usize = 128;

/// Closed set of medicine categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicineType {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Drops,
    Ointment,
    Inhaler,
    Other,
}

impl MedicineType {
    pub const ALL: [MedicineType; 8] = [
        Self::Tablet,
        Self::Capsule,
        Self::Syrup,
        Self::Injection,
        Self::Drops,
        Self::Ointment,
        Self::Inhaler,
        Self::Other,
    ];

    /// Stable snake_case tag shared by storage and wire formats.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tablet => "tablet",
            Self::Capsule => "capsule",
            Self::Syrup => "syrup",
            Self::Injection => "injection",
            Self::Drops => "drops",
            Self::Ointment => "ointment",
            Self::Inhaler => "inhaler",
            Self::Other => "other",
        }
    }
}

impl FromStr for MedicineType {
    type Err = MedicineValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| MedicineValidationError::UnknownMedicineType(value.to_string()))
    }
}

/// How often a medicine is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeFrequency {
    OnceDaily,
    TwiceDaily,
    ThreeTimesDaily,
    EveryOtherDay,
    Weekly,
    /// Taken only when symptoms require it.
    AsNeeded,
}

impl IntakeFrequency {
    pub const ALL: [IntakeFrequency; 6] = [
        Self::OnceDaily,
        Self::TwiceDaily,
        Self::ThreeTimesDaily,
        Self::EveryOtherDay,
        Self::Weekly,
        Self::AsNeeded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnceDaily => "once_daily",
            Self::TwiceDaily => "twice_daily",
            Self::ThreeTimesDaily => "three_times_daily",
            Self::EveryOtherDay => "every_other_day",
            Self::Weekly => "weekly",
            Self::AsNeeded => "as_needed",
        }
    }
}

impl FromStr for IntakeFrequency {
    type Err = MedicineValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|frequency| frequency.as_str() == value)
            .ok_or_else(|| MedicineValidationError::UnknownIntakeFrequency(value.to_string()))
    }
}

/// Field-level validation failures for medicine input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MedicineValidationError {
    EmptyName,
    NameTooLong { max_chars: usize },
    NonPositiveDosage(i32),
    EmptyUserId,
    UserIdTooLong { max_chars: usize },
    TextTooLong { field: &'static str, max_chars: usize },
    UnknownMedicineType(String),
    UnknownIntakeFrequency(String),
}

impl Display for MedicineValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "medicine name cannot be empty"),
            Self::NameTooLong { max_chars } => {
                write!(f, "medicine name exceeds {max_chars} characters")
            }
            Self::NonPositiveDosage(value) => {
                write!(f, "dosage_per_take must be positive, got {value}")
            }
            Self::EmptyUserId => write!(f, "user_id cannot be empty"),
            Self::UserIdTooLong { max_chars } => {
                write!(f, "user_id exceeds {max_chars} characters")
            }
            Self::TextTooLong { field, max_chars } => {
                write!(f, "{field} exceeds {max_chars} characters")
            }
            Self::UnknownMedicineType(value) => write!(f, "unknown medicine type `{value}`"),
            Self::UnknownIntakeFrequency(value) => {
                write!(f, "unknown intake frequency `{value}`")
            }
        }
    }
}

impl Error for MedicineValidationError {}

/// Canonical medicine record owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub description: String,
    /// Units per administration. Must be >= 1.
    pub dosage_per_take: i32,
    pub storage_conditions: String,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub medicine_type: MedicineType,
    pub intake_frequency: IntakeFrequency,
    pub user_id: UserId,
}

impl Medicine {
    /// Builds a medicine from caller input with a freshly generated ID.
    pub fn from_draft(draft: MedicineDraft) -> Self {
        Self::with_id(Uuid::new_v4(), draft)
    }

    /// Builds a medicine with a caller-provided stable ID.
    ///
    /// Used by import paths and tests where identity already exists.
    /// Does not validate; call [`Medicine::validate`] before persisting.
    pub fn with_id(id: MedicineId, draft: MedicineDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            dosage_per_take: draft.dosage_per_take,
            storage_conditions: draft.storage_conditions,
            medicine_type: draft.medicine_type,
            intake_frequency: draft.intake_frequency,
            user_id: draft.user_id,
        }
    }

    /// Checks field constraints. Storage adapters call this on every write
    /// and on every row they read back.
    pub fn validate(&self) -> Result<(), MedicineValidationError> {
        validate_fields(
            &self.name,
            &self.description,
            self.dosage_per_take,
            &self.storage_conditions,
            &self.user_id,
        )
    }

    /// Applies an update request to this record.
    ///
    /// `id` and `user_id` are never changed. `intake_frequency` is kept when
    /// the request leaves it unset.
    pub fn apply(&mut self, update: &MedicineUpdate) {
        self.name = update.name.clone();
        self.description = update.description.clone();
        self.dosage_per_take = update.dosage_per_take;
        self.storage_conditions = update.storage_conditions.clone();
        self.medicine_type = update.medicine_type;
        if let Some(frequency) = update.intake_frequency {
            self.intake_frequency = frequency;
        }
    }
}

/// Caller input for creating a medicine. The store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dosage_per_take: i32,
    #[serde(default)]
    pub storage_conditions: String,
    #[serde(rename = "type")]
    pub medicine_type: MedicineType,
    pub intake_frequency: IntakeFrequency,
    pub user_id: UserId,
}

impl MedicineDraft {
    /// Minimal draft with empty optional text fields.
    pub fn new(
        name: impl Into<String>,
        dosage_per_take: i32,
        medicine_type: MedicineType,
        intake_frequency: IntakeFrequency,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            dosage_per_take,
            storage_conditions: String::new(),
            medicine_type,
            intake_frequency,
            user_id: user_id.into(),
        }
    }
}

/// Full-field replacement of a medicine's mutable fields.
///
/// `user_id` scopes the update to the current owner; it does not transfer
/// ownership. `intake_frequency = None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineUpdate {
    pub id: MedicineId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub dosage_per_take: i32,
    #[serde(default)]
    pub storage_conditions: String,
    #[serde(rename = "type")]
    pub medicine_type: MedicineType,
    pub user_id: UserId,
    #[serde(default)]
    pub intake_frequency: Option<IntakeFrequency>,
}

impl MedicineUpdate {
    pub fn validate(&self) -> Result<(), MedicineValidationError> {
        validate_fields(
            &self.name,
            &self.description,
            self.dosage_per_take,
            &self.storage_conditions,
            &self.user_id,
        )
    }
}

fn validate_fields(
    name: &str,
    description: &str,
    dosage_per_take: i32,
    storage_conditions: &str,
    user_id: &str,
) -> Result<(), MedicineValidationError> {
    if name.trim().is_empty() {
        return Err(MedicineValidationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(MedicineValidationError::NameTooLong {
            max_chars: NAME_MAX_CHARS,
        });
    }
    if dosage_per_take <= 0 {
        return Err(MedicineValidationError::NonPositiveDosage(dosage_per_take));
    }
    check_text_len("description", description)?;
    check_text_len("storage_conditions", storage_conditions)?;
    if user_id.trim().is_empty() {
        return Err(MedicineValidationError::EmptyUserId);
    }
    if user_id.chars().count() > USER_ID_MAX_CHARS {
        return Err(MedicineValidationError::UserIdTooLong {
            max_chars: USER_ID_MAX_CHARS,
        });
    }
    Ok(())
}

fn check_text_len(field: &'static str, value: &str) -> Result<(), MedicineValidationError> {
    if value.chars().count() > TEXT_MAX_CHARS {
        return Err(MedicineValidationError::TextTooLong {
            field,
            max_chars: TEXT_MAX_CHARS,
        });
    }
    Ok(())
}
