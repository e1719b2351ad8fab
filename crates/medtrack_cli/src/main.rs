//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `medtrack_core` linkage with deterministic output.
//! - Optionally open a database file and summarize stored medicines.
//!
//! Usage: `medtrack_cli [DB_PATH] [USER_ID]`
//!
//! Logging is enabled when `MEDTRACK_LOG_DIR` is set; the level comes from
//! `MEDTRACK_LOG_LEVEL` or the build default.

use medtrack_core::db::open_db;
use medtrack_core::{MedicineService, SqliteMedicineRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("medtrack_core ping={}", medtrack_core::ping());
    println!("medtrack_core version={}", medtrack_core::core_version());

    if let Ok(log_dir) = std::env::var("MEDTRACK_LOG_DIR") {
        let level = std::env::var("MEDTRACK_LOG_LEVEL")
            .unwrap_or_else(|_| medtrack_core::default_log_level().to_string());
        if let Err(err) = medtrack_core::init_logging(&level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next() else {
        return ExitCode::SUCCESS;
    };

    match summarize(&db_path, args.next().as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_summary module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &str, user_id: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let service = MedicineService::new(SqliteMedicineRepository::try_new(&conn)?);

    println!("medicines total={}", service.count_medicines()?);
    if let Some(user_id) = user_id {
        for medicine in service.get_medicines_by_user_id(user_id)? {
            println!(
                "{} type={} frequency={} dosage_per_take={}",
                medicine.id,
                medicine.medicine_type.as_str(),
                medicine.intake_frequency.as_str(),
                medicine.dosage_per_take
            );
        }
    }
    Ok(())
}
