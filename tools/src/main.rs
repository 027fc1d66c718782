//! logitrack: headless runner for the LogiTrack warehouse dashboard.
//!
//! Usage:
//!   logitrack --db ops.db [--from 2024-01-01 --to 2024-01-31]
//!   logitrack --db ops.db --import backup.json
//!   logitrack --db ops.db --export backup.json
//!   logitrack --db ops.db --audit [--operator "Juan"]
//!   logitrack --db ops.db --ipc-mode

use anyhow::Result;
use logitrack_core::{
    audit::{AuditRequest, AuditWriter, Auditor},
    config::TrackConfig,
    dashboard::DashboardSummary,
    error::TrackError,
    filter::DateRange,
    model::{ConditioningRecord, PickingRecord, ReceptionRecord, StorageRecord},
    snapshot::WorkspaceSnapshot,
    stats::OperatorMetrics,
    store::{Collection, TrackStore},
    workspace::Workspace,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState {
        from: Option<String>,
        to: Option<String>,
    },
    SavePicking {
        record: PickingRecord,
    },
    SaveReception {
        record: ReceptionRecord,
    },
    SaveConditioning {
        record: ConditioningRecord,
    },
    SaveStorage {
        record: StorageRecord,
    },
    Delete {
        collection: Collection,
        id: String,
    },
    AddOperator {
        name: String,
        #[serde(default)]
        role: String,
    },
    RemoveOperator {
        id: String,
    },
    Quit,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct UiState {
    range: Option<DateRange>,
    operators: usize,
    records: usize,
    last_sync: Option<chrono::DateTime<chrono::Utc>>,
    dashboard: DashboardSummary,
    metrics: Vec<OperatorMetrics>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match arg_value(&args, "--config") {
        Some(path) => TrackConfig::load(path)?,
        None => TrackConfig::default(),
    };
    let db = arg_value(&args, "--db").unwrap_or(config.db_path.as_str());
    let ipc_mode = has_flag(&args, "--ipc-mode");
    let range = match (arg_value(&args, "--from"), arg_value(&args, "--to")) {
        (Some(from), Some(to)) => Some(DateRange::new(from, to)?),
        (None, None) => None,
        _ => anyhow::bail!("--from and --to must be given together"),
    };

    if !ipc_mode {
        println!("LogiTrack");
        println!("  db:        {db}");
        if let Some(r) = &range {
            println!("  window:    {} .. {}", r.start(), r.end());
        }
        println!();
    }

    let store = TrackStore::open(db)?;
    store.migrate()?;
    let mut ws = Workspace::load(store)?;
    config.seed(&mut ws)?;
    log::info!("logitrack: opened {db} with {} operators", ws.roster().len());

    if let Some(path) = arg_value(&args, "--import") {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let snapshot = WorkspaceSnapshot::parse_any(&raw)?;
        ws.restore(snapshot)?;
        ws.mark_synced(chrono::Utc::now())?;
        println!("Imported {path}");
    }

    if let Some(path) = arg_value(&args, "--export") {
        let snapshot = ws.snapshot().stamped(chrono::Utc::now());
        std::fs::write(path, snapshot.to_json()?)?;
        println!("Exported {path}");
    }

    if ipc_mode {
        run_ipc_loop(&mut ws, range)?;
    } else if has_flag(&args, "--audit") {
        let auditor = Auditor::new(audit_writer(&config));
        let metrics = ws.metrics(range.as_ref());
        let text = match arg_value(&args, "--operator") {
            Some(name) => auditor.operator_audit(name, &metrics),
            None => {
                let picking = match &range {
                    Some(r) => ws.records().within(r).picking,
                    None => ws.records().picking.clone(),
                };
                auditor.team_audit(&metrics, &picking, range.as_ref())
            }
        };
        println!("{text}");
    } else {
        print_summary(&ws, range.as_ref());
    }

    Ok(())
}

fn audit_writer(config: &TrackConfig) -> Box<dyn AuditWriter> {
    match config.audit_writer() {
        Some(writer) => Box::new(writer),
        None => Box::new(|_: &AuditRequest| -> Result<String, TrackError> {
            Err(TrackError::Audit("no audit_command configured".into()))
        }),
    }
}

fn run_ipc_loop(ws: &mut Workspace, mut range: Option<DateRange>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        if let IpcCommand::Quit = cmd {
            break;
        }

        // Command failures are reported and the loop keeps going.
        match handle_command(ws, &mut range, cmd) {
            Ok(()) => {
                let state = build_ui_state(ws, range.as_ref());
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            Err(e) => {
                log::warn!("ipc: command failed: {e}");
                write_error(&mut stdout, &e.to_string())?
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(
    ws: &mut Workspace,
    range: &mut Option<DateRange>,
    cmd: IpcCommand,
) -> Result<(), TrackError> {
    match cmd {
        IpcCommand::GetState { from, to } => {
            *range = match (from, to) {
                (Some(from), Some(to)) => Some(DateRange::new(&from, &to)?),
                _ => None,
            };
        }
        IpcCommand::SavePicking { record } => {
            ws.save_picking(record)?;
        }
        IpcCommand::SaveReception { record } => {
            ws.save_reception(record)?;
        }
        IpcCommand::SaveConditioning { record } => {
            ws.save_conditioning(record)?;
        }
        IpcCommand::SaveStorage { record } => {
            ws.save_storage(record)?;
        }
        IpcCommand::Delete { collection, id } => ws.delete(collection, &id)?,
        IpcCommand::AddOperator { name, role } => {
            ws.add_operator(&name, &role)?;
        }
        IpcCommand::RemoveOperator { id } => {
            ws.remove_operator(&id)?;
        }
        IpcCommand::Quit => {}
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn build_ui_state(ws: &Workspace, range: Option<&DateRange>) -> UiState {
    UiState {
        range: range.cloned(),
        operators: ws.roster().len(),
        records: ws.records().len(),
        last_sync: ws.last_sync(),
        dashboard: ws.dashboard(range),
        metrics: ws.metrics(range),
    }
}

fn print_summary(ws: &Workspace, range: Option<&DateRange>) {
    let dash = ws.dashboard(range);

    println!("=== OPERATIONS SUMMARY ===");
    println!("  orders:            {}", dash.total_orders);
    println!("  picked (done):     {}", dash.processed_picking);
    println!("  packed (done):     {}", dash.processed_packing);
    println!("  lines / units:     {} / {}", dash.total_lines, dash.total_units);
    println!("  reception units:   {}", dash.reception_units);
    println!("  vas units:         {}", dash.vas_units);
    println!("  storage units:     {}", dash.storage_units);
    println!("  compliance:        {:.1}%", dash.compliance_pct);
    println!("  team efficiency:   {:.1} L/H", dash.team_pick_efficiency);

    println!();
    println!("=== OPERATORS ===");
    let metrics = ws.metrics(range);
    if metrics.is_empty() {
        println!("  (Roster is empty)");
        return;
    }
    for m in &metrics {
        println!(
            "  {:<24} | Pick {:>6.1} L/H | Pack {:>6.1} L/H | Rec {:>6.1} L/H | VAS {:>6.1} L/H | Stor {:>6.1} U/H",
            m.name,
            m.pick_efficiency,
            m.pack_efficiency,
            m.reception_efficiency,
            m.conditioning_efficiency,
            m.storage_efficiency,
        );
    }
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
