//! Medicine repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `medicines` storage.
//! - Keep SQL details and row mapping inside the persistence boundary.
//!
//! # Invariants
//! - Write paths must validate input before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Updates are scoped by `(id, user_id)`; ownership never changes.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::medicine::{
    IntakeFrequency, Medicine, MedicineId, MedicineType, MedicineUpdate, MedicineValidationError,
    UserId,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const MEDICINE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    dosage_per_take,
    storage_conditions,
    type,
    intake_frequency,
    user_id
FROM medicines";

const MEDICINES_TABLE: &str = "medicines";

const REQUIRED_COLUMNS: &[&str] = &[
    "uuid",
    "name",
    "description",
    "dosage_per_take",
    "storage_conditions",
    "type",
    "intake_frequency",
    "user_id",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for medicine persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MedicineValidationError),
    Db(DbError),
    NotFound(MedicineId),
    /// Insert collided with an existing ID.
    Conflict(MedicineId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "medicine not found: {id}"),
            Self::Conflict(id) => write!(f, "medicine already exists: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted medicine data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::LockPoisoned => write!(f, "medicine store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MedicineValidationError> for RepoError {
    fn from(value: MedicineValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing medicines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicineListQuery {
    /// Restricts results to one owner when set.
    pub user_id: Option<UserId>,
}

impl MedicineListQuery {
    pub fn for_user(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

/// Storage contract behind the medicine store.
///
/// Results from `list_medicines` are ordered by insertion.
pub trait MedicineRepository {
    fn insert_medicine(&self, medicine: &Medicine) -> RepoResult<MedicineId>;
    fn get_medicine(&self, id: MedicineId) -> RepoResult<Option<Medicine>>;
    fn list_medicines(&self, query: &MedicineListQuery) -> RepoResult<Vec<Medicine>>;
    fn update_medicine(&self, update: &MedicineUpdate) -> RepoResult<()>;
    fn delete_medicine(&self, id: MedicineId) -> RepoResult<()>;
    fn count_medicines(&self) -> RepoResult<u64>;
}

/// SQLite-backed medicine repository.
pub struct SqliteMedicineRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMedicineRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match what this binary expects.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MedicineRepository for SqliteMedicineRepository<'_> {
    fn insert_medicine(&self, medicine: &Medicine) -> RepoResult<MedicineId> {
        medicine.validate()?;

        let result = self.conn.execute(
            "INSERT INTO medicines (
                uuid,
                name,
                description,
                dosage_per_take,
                storage_conditions,
                type,
                intake_frequency,
                user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                medicine.id.to_string(),
                medicine.name.as_str(),
                medicine.description.as_str(),
                medicine.dosage_per_take,
                medicine.storage_conditions.as_str(),
                medicine.medicine_type.as_str(),
                medicine.intake_frequency.as_str(),
                medicine.user_id.as_str(),
            ],
        );

        match result {
            Ok(_) => Ok(medicine.id),
            Err(err) if is_primary_key_violation(&err) => Err(RepoError::Conflict(medicine.id)),
            Err(err) => Err(err.into()),
        }
    }

    fn get_medicine(&self, id: MedicineId) -> RepoResult<Option<Medicine>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEDICINE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_medicine_row(row)?));
        }

        Ok(None)
    }

    fn list_medicines(&self, query: &MedicineListQuery) -> RepoResult<Vec<Medicine>> {
        let mut sql = format!("{MEDICINE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = &query.user_id {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Text(user_id.clone()));
        }

        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut medicines = Vec::new();

        while let Some(row) = rows.next()? {
            medicines.push(parse_medicine_row(row)?);
        }

        Ok(medicines)
    }

    fn update_medicine(&self, update: &MedicineUpdate) -> RepoResult<()> {
        update.validate()?;

        let changed = self.conn.execute(
            "UPDATE medicines
             SET
                name = ?1,
                description = ?2,
                dosage_per_take = ?3,
                storage_conditions = ?4,
                type = ?5,
                intake_frequency = COALESCE(?6, intake_frequency),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7
               AND user_id = ?8;",
            params![
                update.name.as_str(),
                update.description.as_str(),
                update.dosage_per_take,
                update.storage_conditions.as_str(),
                update.medicine_type.as_str(),
                update.intake_frequency.map(IntakeFrequency::as_str),
                update.id.to_string(),
                update.user_id.as_str(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(update.id));
        }

        Ok(())
    }

    fn delete_medicine(&self, id: MedicineId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM medicines WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_medicines(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM medicines;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative medicine count `{count}`")))
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [MEDICINES_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(MEDICINES_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({MEDICINES_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for &column in REQUIRED_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: MEDICINES_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

fn parse_medicine_row(row: &Row<'_>) -> RepoResult<Medicine> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in medicines.uuid"
        ))
    })?;

    let type_text: String = row.get("type")?;
    let medicine_type = type_text.parse::<MedicineType>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid medicine type `{type_text}` in medicines.type"
        ))
    })?;

    let frequency_text: String = row.get("intake_frequency")?;
    let intake_frequency = frequency_text.parse::<IntakeFrequency>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid intake frequency `{frequency_text}` in medicines.intake_frequency"
        ))
    })?;

    let dosage_raw: i64 = row.get("dosage_per_take")?;
    let dosage_per_take = i32::try_from(dosage_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "dosage value `{dosage_raw}` out of range in medicines.dosage_per_take"
        ))
    })?;

    let medicine = Medicine {
        id,
        name: row.get("name")?,
        description: row.get("description")?,
        dosage_per_take,
        storage_conditions: row.get("storage_conditions")?,
        medicine_type,
        intake_frequency,
        user_id: row.get("user_id")?,
    };
    medicine
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("medicine {id}: {err}")))?;
    Ok(medicine)
}
