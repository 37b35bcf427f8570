use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use triage_core::config::{patient_data_dir_from_env_value, vital_catalog_from_env_value};
use triage_core::repositories::{PatientLookup, VitalCatalog};
use triage_core::{
    ActingUser, CoreConfig, IntakeForm, IntakeOrchestrator, NonEmptyText, PatientAttributes,
    PatientId, PatientSelection, UserId, VisitAttributes, VitalKind, VitalReadings, YamlStore,
};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Triage intake CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the vital catalog
    Vitals,
    /// Write the default vital catalog if none exists
    SeedCatalog,
    /// Show a patient with their encounters and recorded vitals
    ShowPatient {
        /// Patient identifier
        id: PatientId,
    },
    /// Record a triage intake
    Intake {
        /// Acting user identifier
        #[arg(long)]
        user_id: UserId,
        /// Acting user display name
        #[arg(long)]
        user_name: Option<String>,
        /// Existing patient identifier; omit or pass 0 to register a new patient
        #[arg(long, default_value_t = 0)]
        patient_id: u64,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<NaiveDate>,
        #[arg(long)]
        sex: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        chief_complaint: Option<String>,
        #[arg(long)]
        weeks_pregnant: Option<u32>,
        /// Vital reading as name=value, e.g. heartRate=88 (repeatable)
        #[arg(long = "vital", value_parser = parse_vital)]
        vitals: Vec<(VitalKind, f32)>,
    },
}

fn parse_vital(raw: &str) -> Result<(VitalKind, f32), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))?;
    let kind: VitalKind = name.parse().map_err(|e| format!("{e}"))?;
    let value: f32 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {kind}: {e}"))?;
    Ok((kind, value))
}

fn open_store() -> Result<YamlStore, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::new(
        patient_data_dir_from_env_value(std::env::var("PATIENT_DATA_DIR").ok()),
        vital_catalog_from_env_value(std::env::var("TRIAGE_VITAL_CATALOG").ok()),
    )?;
    Ok(YamlStore::new(Arc::new(cfg)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triage=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Vitals) => {
            let store = open_store()?;
            let vitals = store.find_all()?;
            if vitals.is_empty() {
                println!("No vitals in catalog. Run 'triage seed-catalog' first.");
            }
            for vital in vitals {
                println!(
                    "{:>2}  {:<24} {}",
                    vital.sort_order, vital.name, vital.unit_of_measurement
                );
            }
        }
        Some(Commands::SeedCatalog) => match open_store()?.seed_catalog() {
            Ok(true) => println!("Seeded default vital catalog"),
            Ok(false) => println!("Vital catalog already present"),
            Err(e) => eprintln!("Error seeding vital catalog: {}", e),
        },
        Some(Commands::ShowPatient { id }) => {
            let store = open_store()?;
            let Some(patient) = store.find_by_id(id)? else {
                eprintln!("Patient {} not found", id);
                return Ok(());
            };
            println!(
                "ID: {}, Name: {} {}, Created: {}",
                patient.id, patient.first_name, patient.last_name, patient.created_at
            );

            let catalog = store.find_all()?;
            for encounter in store.encounters_for_patient(id)? {
                println!(
                    "  Encounter {} on {}: {}",
                    encounter.id,
                    encounter.date_of_visit.format("%Y-%m-%d %H:%M"),
                    encounter.chief_complaint.as_deref().unwrap_or("-")
                );
                for measurement in store.measurements_for_encounter(encounter.id)? {
                    let vital = catalog.iter().find(|v| v.id == measurement.vital_id);
                    println!(
                        "    {} = {} {}",
                        vital.map_or("unknown", |v| v.name.as_str()),
                        measurement.value,
                        vital.map_or("", |v| v.unit_of_measurement.as_str())
                    );
                }
            }
        }
        Some(Commands::Intake {
            user_id,
            user_name,
            patient_id,
            first_name,
            last_name,
            birth_date,
            sex,
            address,
            city,
            chief_complaint,
            weeks_pregnant,
            vitals,
        }) => {
            let mut user = ActingUser::new(user_id);
            if let Some(name) = NonEmptyText::from_optional(user_name.as_deref()) {
                user = user.with_name(name);
            }

            let mut readings = VitalReadings::default();
            for (kind, value) in vitals {
                readings.set(kind, value);
            }

            let form = IntakeForm {
                patient: PatientAttributes {
                    first_name,
                    last_name,
                    birth_date,
                    sex,
                    address,
                    city,
                },
                visit: VisitAttributes {
                    chief_complaint,
                    weeks_pregnant,
                },
                vitals: readings,
            };

            let store = open_store()?;
            store.seed_catalog()?;
            let orchestrator = IntakeOrchestrator::from_backend(Arc::new(store));
            match orchestrator.submit_intake(&form, PatientSelection::from_raw_id(patient_id), &user)
            {
                Ok(outcome) => {
                    println!(
                        "Recorded encounter {} for patient {} ({} vitals)",
                        outcome.encounter_id,
                        outcome.patient_id,
                        outcome.recorded.len()
                    );
                    if !outcome.is_complete() {
                        eprintln!("{} vitals were not recorded", outcome.warnings.len());
                    }
                    for warning in &outcome.warnings {
                        eprintln!("Warning: {} not recorded: {}", warning.kind, warning.error);
                    }
                    println!("View at {}", outcome.redirect_path());
                }
                Err(e) => eprintln!("Error recording intake: {}", e),
            }
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vital_pairs() {
        assert_eq!(
            parse_vital("heartRate=88").unwrap(),
            (VitalKind::HeartRate, 88.0)
        );
        assert_eq!(
            parse_vital("blood_pressure_systolic= 120.5").unwrap(),
            (VitalKind::BloodPressureSystolic, 120.5)
        );
    }

    #[test]
    fn rejects_malformed_vital_pairs() {
        assert!(parse_vital("heartRate").is_err());
        assert!(parse_vital("pulse=80").is_err());
        assert!(parse_vital("heartRate=fast").is_err());
    }

    #[test]
    fn intake_command_collects_repeated_vitals() {
        let cli = Cli::try_parse_from([
            "triage",
            "intake",
            "--user-id",
            "3",
            "--patient-id",
            "42",
            "--vital",
            "heartRate=88",
            "--vital",
            "glucose=5.4",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Intake {
                user_id,
                patient_id,
                vitals,
                ..
            }) => {
                assert_eq!(user_id, UserId::new(3));
                assert_eq!(patient_id, 42);
                assert_eq!(
                    vitals,
                    vec![(VitalKind::HeartRate, 88.0), (VitalKind::Glucose, 5.4)]
                );
            }
            _ => panic!("expected intake command"),
        }
    }
}
