//! Command-line driver for the appointment core.
//!
//! # Responsibility
//! - Provide a smoke check (`ping`) to verify `clinic_core` linkage.
//! - Exercise list/show/create/edit/delete/sync against an on-disk store.
//!
//! # Invariants
//! - The default `file` backend keeps the full list under `<data-dir>/cookie/`
//!   and the per-id entries under `<data-dir>/local/`.
//! - The `sqlite` backend keeps both stores in `<data-dir>/clinic.sqlite3`
//!   under separate namespaces.
//! - Exit code is non-zero on validation rejection or storage failure.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clinic_core::db::open_db;
use clinic_core::storage::sqlite::{COOKIE_NAMESPACE, LOCAL_NAMESPACE};
use clinic_core::{
    default_log_level, init_logging, load_config, Appointment, AppointmentForm, AppointmentId,
    AppointmentService, AppointmentStore, CookieBackend, FileBackend, KeyValueBackend,
    SqliteBackend, SubmitOutcome,
};
use log::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const DB_FILE_NAME: &str = "clinic.sqlite3";
const CONFIG_FILE_NAME: &str = "config.json";
const COOKIE_DIR_NAME: &str = "cookie";
const LOCAL_DIR_NAME: &str = "local";

#[derive(Debug, Parser)]
#[command(name = "clinic", version, about = "Dental clinic appointment book")]
struct Cli {
    /// Directory holding the stores and logs.
    #[arg(long, default_value = ".clinic")]
    data_dir: PathBuf,
    /// Storage medium for both stores.
    #[arg(long, value_enum, default_value_t = Backend::File)]
    backend: Backend,
    /// Store config JSON; defaults to `<data-dir>/config.json`.
    #[arg(long)]
    config: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// One file per entry.
    File,
    /// One embedded SQLite file.
    Sqlite,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// List every appointment.
    List,
    /// Show one appointment as JSON.
    Show { id: String },
    /// Validate and store a new appointment.
    Create(FormArgs),
    /// Replace the fields of an existing appointment.
    Edit {
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete an appointment from both stores.
    Delete { id: String },
    /// Rebuild missing per-id entries from the full list.
    Sync,
    /// Print the Set-Cookie value for the full list.
    Cookie,
}

#[derive(Debug, Args)]
struct FormArgs {
    #[arg(long)]
    day: String,
    #[arg(long)]
    month: String,
    #[arg(long)]
    year: String,
    #[arg(long)]
    hour: String,
    #[arg(long)]
    minute: String,
    #[arg(long)]
    national_id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    birth_date: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<FormArgs> for AppointmentForm {
    fn from(args: FormArgs) -> Self {
        Self {
            day: args.day,
            month: args.month,
            year: args.year,
            hour: args.hour,
            minute: args.minute,
            national_id: args.national_id,
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            birth_date: args.birth_date,
            notes: args.notes,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, String> {
    if let Command::Ping = cli.command {
        println!("clinic_core ping={}", clinic_core::ping());
        println!("clinic_core version={}", clinic_core::core_version());
        return Ok(ExitCode::SUCCESS);
    }

    let data_dir = prepare_data_dir(&cli.data_dir)?;
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let log_dir = data_dir.join("logs");
    init_logging(level, &log_dir.to_string_lossy())?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(CONFIG_FILE_NAME));
    let config = load_config(&config_path).map_err(|err| err.to_string())?;

    match cli.backend {
        Backend::File => {
            let store = AppointmentStore::with_list_key(
                CookieBackend::new(
                    FileBackend::new(data_dir.join(COOKIE_DIR_NAME)),
                    config.cookie.clone(),
                ),
                FileBackend::new(data_dir.join(LOCAL_DIR_NAME)),
                config.list_key.clone(),
            );
            execute(AppointmentService::new(store), cli.command)
        }
        Backend::Sqlite => {
            let conn = open_db(data_dir.join(DB_FILE_NAME)).map_err(|err| err.to_string())?;
            let store = AppointmentStore::with_list_key(
                CookieBackend::new(
                    SqliteBackend::new(&conn, COOKIE_NAMESPACE),
                    config.cookie.clone(),
                ),
                SqliteBackend::new(&conn, LOCAL_NAMESPACE),
                config.list_key.clone(),
            );
            execute(AppointmentService::new(store), cli.command)
        }
    }
}

fn execute<B, F>(
    mut service: AppointmentService<CookieBackend<B>, F>,
    command: Command,
) -> Result<ExitCode, String>
where
    B: KeyValueBackend,
    F: KeyValueBackend,
{
    match command {
        Command::Ping => {}
        Command::List => {
            let appointments = service.list().map_err(|err| err.to_string())?;
            print_table(&appointments);
        }
        Command::Show { id } => {
            let id = AppointmentId::from(id);
            match service.load_for_edit(&id).map_err(|err| err.to_string())? {
                Some(appointment) => println!("{}", to_pretty_json(&appointment)?),
                None => {
                    eprintln!("appointment not found: {id}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Create(form) => {
            let outcome = service
                .submit(&form.into(), None)
                .map_err(|err| err.to_string())?;
            return report_submit(outcome);
        }
        Command::Edit { id, form } => {
            let outcome = service
                .edit(&AppointmentId::from(id), &form.into())
                .map_err(|err| err.to_string())?;
            return report_submit(outcome);
        }
        Command::Delete { id } => {
            let id = AppointmentId::from(id);
            let removed = service.delete(&id).map_err(|err| err.to_string())?;
            println!("deleted={removed} id={id}");
        }
        Command::Sync => {
            let repaired = service
                .store_mut()
                .sync_local_from_cookie()
                .map_err(|err| err.to_string())?;
            println!("repaired={repaired}");
        }
        Command::Cookie => {
            let store = service.store();
            match store
                .list_backend()
                .set_cookie_header(store.list_key())
                .map_err(|err| err.to_string())?
            {
                Some(header) => println!("{header}"),
                None => println!("(no appointments stored)"),
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn prepare_data_dir(path: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(path)
        .and_then(|()| path.canonicalize())
        .map_err(|err| format!("failed to prepare data dir `{}`: {err}", path.display()))
}

fn report_submit(outcome: SubmitOutcome) -> Result<ExitCode, String> {
    match outcome {
        SubmitOutcome::Created(appointment) => {
            println!("created id={}", appointment.id);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Updated(appointment) => {
            println!("updated id={}", appointment.id);
            Ok(ExitCode::SUCCESS)
        }
        SubmitOutcome::Rejected(validation) => {
            for (field, message) in validation.error_messages() {
                eprintln!("{field}: {message}");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_table(appointments: &[Appointment]) {
    println!("appointments={}", appointments.len());
    if appointments.is_empty() {
        println!("(empty)");
        return;
    }
    for (index, appointment) in appointments.iter().enumerate() {
        let when = &appointment.appointment_date_time;
        let patient = &appointment.patient;
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            index + 1,
            when.date_label(),
            when.time_label(),
            patient.national_id,
            patient.full_name(),
            patient.phone,
            patient.birth_date,
            appointment.id
        );
    }
}

fn to_pretty_json(appointment: &Appointment) -> Result<String, String> {
    serde_json::to_string_pretty(appointment).map_err(|err| err.to_string())
}
