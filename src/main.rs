//! Equiptrack scan terminal.
//!
//! Thin rendering layer over the services: reads one line at a time, maps
//! each command to exactly one service call, and re-renders from current
//! state when the event bus signals a change. A bare line is a barcode
//! scan.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use equiptrack::{
    config::{AppConfig, LoggingConfig},
    events::{AppEvent, EventBus},
    models::{format_elapsed, CreateEquipment, CreateStudent},
    repository::Repository,
    services::{
        checkouts::HistoryFilter,
        scan::{ScanInterpreter, ScanState},
        Services,
    },
    storage::JsonFileStorage,
};

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing; the guard must outlive the session
    let _guard = init_tracing(&config.logging)?;

    tracing::info!("Starting equiptrack v{}", env!("CARGO_PKG_VERSION"));

    // Open storage and load the collections
    let storage = Arc::new(JsonFileStorage::open(&config.storage.data_dir)?);
    let repository = Repository::open(storage)?;
    let events = EventBus::new();
    let services = Services::new(repository.clone(), events.clone(), &config);

    // Provision default equipment on first run
    let seeded = services.inventory.seed_defaults(&config.seed, Utc::now())?;
    if seeded > 0 {
        tracing::info!(seeded, "provisioned default equipment");
    }

    // Views re-render on change signals instead of polling
    let dirty = Arc::new(AtomicBool::new(false));
    {
        let dirty = dirty.clone();
        events.subscribe(move |event| {
            tracing::debug!(?event, "event");
            if !matches!(event, AppEvent::ScanStateChanged(_)) {
                dirty.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut scan = ScanInterpreter::new(repository, events, config.checkout.clone());

    println!("equiptrack: scan a barcode, or :help for commands");
    print_summary(&services)?;

    let stdin = io::stdin();
    let mut out = io::stdout();
    loop {
        print!("> ");
        out.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" || line == ":q" {
            break;
        }

        if let Err(e) = dispatch(line, &services, &mut scan) {
            println!("✗ {}", e.user_message());
        }

        if dirty.swap(false, Ordering::Relaxed) {
            print_summary(&services)?;
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}

/// Map one input line to one service call.
fn dispatch(
    line: &str,
    services: &Services,
    scan: &mut ScanInterpreter,
) -> equiptrack::AppResult<()> {
    let now = Utc::now();
    let (command, rest) = match line.strip_prefix(':') {
        Some(command_line) => match command_line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (command_line, ""),
        },
        None => {
            // A bare line is a barcode scan
            let state = scan.handle_scan(line, now)?.clone();
            print_state(&state, now);
            return Ok(());
        }
    };

    match command {
        "help" => print_help(),
        "confirm" => match scan.state().clone() {
            ScanState::AwaitingCheckoutConfirm { draft } => {
                let transaction = scan.confirm_checkout(rest, None, now)?;
                println!(
                    "✓ {} checked out to {}",
                    draft.equipment.equipment_type, transaction.student_name
                );
            }
            ScanState::AwaitingCheckinConfirm { .. } => {
                let transaction = scan.confirm_checkin(rest, now)?;
                println!("✓ {} checked in successfully", transaction.equipment_type);
            }
            _ => println!("Nothing to confirm"),
        },
        "cancel" => {
            scan.cancel();
            println!("Transaction cancelled");
        }
        "proceed" => {
            let state = scan.proceed_to_checkout()?.clone();
            print_state(&state, now);
        }
        "return" => {
            let transaction = scan.check_in_single(rest, now)?;
            println!("✓ {} checked in", transaction.equipment_label());
            print_state(scan.state(), now);
        }
        "return-all" => {
            let closed = scan.check_in_all(now)?;
            println!("✓ {} item(s) checked in", closed);
        }
        "students" => {
            let students = if rest.is_empty() {
                services.roster.list()?
            } else {
                services.roster.search(rest)?
            };
            for s in &students {
                println!(
                    "{:<24} {:<24} {}",
                    s.name,
                    s.barcode,
                    s.email.as_deref().unwrap_or("-")
                );
            }
            println!("({} students)", students.len());
        }
        "equipment" => {
            let items = if rest.is_empty() {
                services.inventory.list()?
            } else {
                services.inventory.search(rest)?
            };
            for item in &items {
                let status = if services.checkouts.is_checked_out(&item.barcode)? {
                    "OUT"
                } else {
                    "available"
                };
                println!("{:<14} {:<20} {}", item.equipment_type, item.barcode, status);
            }
            println!("({} items)", items.len());
        }
        "history" => {
            let filter = match rest {
                "out" => HistoryFilter::Out,
                "in" => HistoryFilter::In,
                "overdue" => HistoryFilter::Overdue,
                _ => HistoryFilter::All,
            };
            for t in services.checkouts.history(filter, now)? {
                let status = if t.is_overdue(now) {
                    "OVERDUE"
                } else if t.is_open() {
                    "out"
                } else {
                    "returned"
                };
                println!(
                    "{}  {:<24} {:<32} {:<8} {}",
                    fmt_time(t.checkout_time),
                    t.student_name,
                    t.equipment_label(),
                    status,
                    t.notes_display()
                );
            }
        }
        "report" => {
            print_summary(services)?;
            let rows = services.stats.checked_out_report(now)?;
            if rows.is_empty() {
                println!("All equipment returned ✓");
            }
            for row in rows {
                println!(
                    "{:<24} {:<32} {} ago  due {}{}",
                    row.student_name,
                    row.equipment,
                    row.checked_out_for,
                    row.expected_return_time.map(fmt_time).unwrap_or_else(|| "-".into()),
                    if row.overdue { "  OVERDUE" } else { "" }
                );
            }
        }
        "add-student" => {
            let mut fields = rest.splitn(3, '|').map(str::trim);
            let barcode = fields.next().unwrap_or("").to_string();
            let name = fields.next().unwrap_or("").to_string();
            let email = fields.next().map(str::to_string);
            let student = services.roster.create(
                CreateStudent {
                    name,
                    barcode,
                    email,
                    photo: None,
                },
                now,
            )?;
            println!("✓ Added student {}", student.name);
        }
        "del-student" => {
            services.roster.delete(rest)?;
            println!("✓ Student removed");
        }
        "add-equipment" => {
            let mut fields = rest.splitn(3, '|').map(str::trim);
            let equipment_type = fields.next().unwrap_or("").to_string();
            let barcode = fields.next().unwrap_or("").to_string();
            let description = fields.next().map(str::to_string);
            let item = services.inventory.create(
                CreateEquipment {
                    equipment_type,
                    barcode,
                    description,
                },
                now,
            )?;
            println!("✓ Added equipment {}", item.barcode);
        }
        "del-equipment" => {
            services.inventory.delete(rest)?;
            println!("✓ Equipment removed");
        }
        "import" => {
            let document = std::fs::read_to_string(rest)?;
            let entries: Vec<CreateStudent> = serde_json::from_str(&document)?;
            let report = services.roster.import(entries, now)?;
            println!(
                "✓ Imported {} student(s), skipped {}, roster now {}",
                report.added, report.skipped, report.total
            );
        }
        "export-csv" => {
            let csv = services.inventory.export_csv()?;
            let path = default_path(rest, "equipment_labels", "csv");
            std::fs::write(&path, csv)?;
            println!("✓ Exported equipment to {}", path);
        }
        "export-json" => {
            let json = services.roster.export_json()?;
            let path = default_path(rest, "students", "json");
            std::fs::write(&path, json)?;
            println!("✓ Exported roster to {}", path);
        }
        _ => println!("Unknown command :{}, try :help", command),
    }
    Ok(())
}

fn print_state(state: &ScanState, now: DateTime<Utc>) {
    match state {
        ScanState::Idle => println!("Ready to scan."),
        ScanState::StudentSelected { student } => {
            println!(
                "Student: {}. Now scan equipment to check out.",
                student.name
            );
        }
        ScanState::StudentHasOpenItems { student, open } => {
            println!("{} has {} item(s) out:", student.name, open.len());
            for t in open {
                println!(
                    "  {:<32} checked out {} ago",
                    t.equipment_label(),
                    format_elapsed(t.minutes_out(now))
                );
            }
            println!(":return <barcode> · :return-all · :proceed to check out more · :cancel");
        }
        ScanState::AwaitingCheckoutConfirm { draft } => {
            println!("Checkout: {} → {}", draft.equipment.label(), draft.student.name);
            match draft.expected_return_time {
                Some(due) => println!("Expected return: {}", fmt_time(due)),
                None => println!("Expected return: -"),
            }
            println!(":confirm [notes] to check out · :cancel");
        }
        ScanState::AwaitingCheckinConfirm { transaction } => {
            println!(
                "Check-in: {} from {}",
                transaction.equipment_label(),
                transaction.student_name
            );
            println!(
                "Checked out {} ({} ago)",
                fmt_time(transaction.checkout_time),
                format_elapsed(transaction.minutes_out(now))
            );
            println!(":confirm [notes] to check in · :cancel");
        }
    }
}

fn print_summary(services: &Services) -> equiptrack::AppResult<()> {
    let stats = services.stats.summary(Utc::now())?;
    println!(
        "Students: {} · Equipment: {} · Out: {} · Overdue: {}",
        stats.total_students, stats.total_equipment, stats.currently_out, stats.overdue
    );
    Ok(())
}

fn print_help() {
    println!("  <barcode>                      scan a student pass or equipment tag");
    println!("  :confirm [notes]               confirm the pending checkout/check-in");
    println!("  :cancel                        discard the pending action");
    println!("  :proceed                       check out more instead of returning");
    println!("  :return <barcode>              return one listed item");
    println!("  :return-all                    return everything listed");
    println!("  :students [query]              list or search the roster");
    println!("  :equipment [query]             list or search the inventory");
    println!("  :history [out|in|overdue]      transaction history");
    println!("  :report                        summary and currently-out report");
    println!("  :add-student bc | name | [email]");
    println!("  :del-student <barcode>");
    println!("  :add-equipment type | bc | [description]");
    println!("  :del-equipment <barcode>");
    println!("  :import <file.json>            bulk roster import");
    println!("  :export-csv [path]             equipment CSV export");
    println!("  :export-json [path]            roster JSON export");
    println!("  :quit");
}

fn fmt_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn default_path(requested: &str, stem: &str, extension: &str) -> String {
    if requested.is_empty() {
        format!(
            "{}_{}.{}",
            stem,
            Local::now().format("%Y-%m-%d"),
            extension
        )
    } else {
        requested.to_string()
    }
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("equiptrack={}", logging.level).into());

    let json = logging.format == "json";
    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("invalid log file path"))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init();
            } else {
                registry
                    .with(tracing_subscriber::fmt::layer())
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(false),
                    )
                    .init();
            }
            Ok(Some(guard))
        }
        None => {
            if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json())
                    .init();
            } else {
                registry.with(tracing_subscriber::fmt::layer()).init();
            }
            Ok(None)
        }
    }
}
