//! benchline: command-line front end for the ticket lifecycle engine.
//!
//! Exit codes: 0 = allowed / committed, 1 = denied or conflicted,
//! 2 = usage, validation, or storage error.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use benchline_core::{
    allowed_for, check, execute, status_change_message, ExecuteError, FollowUpSignal, HistoryLog,
    PaymentSnapshot, Role, TicketStatus, TransitionRequest, TransitionResult,
};
use benchline_storage::{HistoryRecord, JsonHistory};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Repair-ticket lifecycle toolchain.
#[derive(Parser)]
#[command(name = "benchline", version, about = "Repair-ticket lifecycle toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the transitions a role may take from a status
    Actions {
        /// Current ticket status (wire name, e.g. IN_PROGRESS)
        #[arg(long)]
        status: String,
        /// Acting role (ADMIN, STAFF, TECHNICIAN)
        #[arg(long)]
        role: String,
    },

    /// Check a transition without committing anything
    Check {
        #[command(flatten)]
        request: RequestArgs,
        /// Current status
        #[arg(long)]
        from: String,
    },

    /// Execute a transition against a JSON history store
    Execute {
        /// Path to the JSON history journal
        #[arg(long)]
        store: PathBuf,
        #[command(flatten)]
        request: RequestArgs,
        /// Current status; defaults to the store's view of the ticket
        #[arg(long)]
        from: Option<String>,
        /// Notes for the history entry
        #[arg(long)]
        notes: Option<String>,
    },

    /// Show a ticket's history, newest first
    History {
        /// Path to the JSON history journal
        #[arg(long)]
        store: PathBuf,
        /// Ticket id
        #[arg(long)]
        ticket: String,
    },
}

/// The request fields shared by `check` and `execute`.
#[derive(Args)]
struct RequestArgs {
    /// Ticket id
    #[arg(long)]
    ticket: String,
    /// Target status
    #[arg(long)]
    to: String,
    /// Acting role
    #[arg(long)]
    role: String,
    /// Outstanding balance on the ticket
    #[arg(long, default_value = "0")]
    outstanding: Decimal,
    /// Whether the ticket is marked paid
    #[arg(long)]
    paid: bool,
    /// Cancellation reason (required for CANCELLED)
    #[arg(long)]
    reason: Option<String>,
    /// Whether the ticket has inventory parts attached
    #[arg(long)]
    parts: bool,
}

impl RequestArgs {
    fn into_request(self, current: TicketStatus) -> Result<TransitionRequest, String> {
        Ok(TransitionRequest {
            ticket_id: self.ticket,
            current,
            target: self.to.parse().map_err(|e| format!("{e}"))?,
            role: self.role.parse().map_err(|e| format!("{e}"))?,
            payment: PaymentSnapshot {
                paid: self.paid,
                outstanding: self.outstanding,
            },
            reason: self.reason,
            parts_attached: self.parts,
        })
    }
}

fn main() {
    let cli = Cli::parse();
    let output = cli.output;
    let code = match run(cli.command, output) {
        Ok(code) => code,
        Err(message) => {
            eprintln!("error: {message}");
            2
        }
    };
    process::exit(code);
}

fn run(command: Commands, output: OutputFormat) -> Result<i32, String> {
    match command {
        Commands::Actions { status, role } => cmd_actions(&status, &role, output),
        Commands::Check { request, from } => cmd_check(request, &from, output),
        Commands::Execute {
            store,
            request,
            from,
            notes,
        } => cmd_execute(&store, request, from.as_deref(), notes.as_deref(), output),
        Commands::History { store, ticket } => cmd_history(&store, &ticket, output),
    }
}

// ──────────────────────────────────────────────
// Subcommands
// ──────────────────────────────────────────────

fn cmd_actions(status: &str, role: &str, output: OutputFormat) -> Result<i32, String> {
    let status: TicketStatus = status.parse().map_err(|e| format!("{e}"))?;
    let role: Role = role.parse().map_err(|e| format!("{e}"))?;
    let targets = allowed_for(role, status);

    match output {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "status": status,
                "role": role,
                "allowed": targets,
            });
            println!("{}", serde_json::to_string_pretty(&value).map_err(stringify)?);
        }
        OutputFormat::Text => {
            if targets.is_empty() {
                println!("{role} has no transitions from {status}");
            } else {
                for target in targets {
                    println!("{status} -> {target}");
                }
            }
        }
    }
    Ok(0)
}

fn cmd_check(request: RequestArgs, from: &str, output: OutputFormat) -> Result<i32, String> {
    let current: TicketStatus = from.parse().map_err(|e| format!("{e}"))?;
    let req = request.into_request(current)?;
    let result = check(&req);
    print_result(&req, &result, output)?;
    Ok(if result.allowed { 0 } else { 1 })
}

fn cmd_execute(
    store: &PathBuf,
    request: RequestArgs,
    from: Option<&str>,
    notes: Option<&str>,
    output: OutputFormat,
) -> Result<i32, String> {
    let mut log = JsonHistory::open(store).map_err(stringify)?;

    let current = match from {
        Some(raw) => raw.parse().map_err(|e| format!("{e}"))?,
        None => log
            .current_status(&request.ticket)
            .map_err(stringify)?
            .ok_or_else(|| {
                format!(
                    "ticket {} has no history in {}; pass --from",
                    request.ticket,
                    store.display()
                )
            })?,
    };
    let req = request.into_request(current)?;

    match execute(&req, notes, &mut log) {
        Ok(outcome) => {
            let message = outcome
                .entry
                .as_ref()
                .map(|_| status_change_message(&req.ticket_id, req.current, outcome.new_status));
            match output {
                OutputFormat::Json => {
                    let entry = outcome
                        .entry
                        .as_ref()
                        .map(|e| HistoryRecord::from_entry(e))
                        .transpose()
                        .map_err(stringify)?;
                    let value = serde_json::json!({
                        "new_status": outcome.new_status,
                        "follow_up": outcome.follow_up,
                        "entry": entry,
                        "message": message,
                    });
                    println!("{}", serde_json::to_string_pretty(&value).map_err(stringify)?);
                }
                OutputFormat::Text => {
                    println!("{}: {} -> {}", req.ticket_id, req.current, outcome.new_status);
                    if let Some(follow_up) = follow_up_name(outcome.follow_up) {
                        println!("follow-up: {follow_up}");
                    }
                    if let Some(message) = message {
                        println!("{message}");
                    }
                }
            }
            Ok(0)
        }
        Err(err @ (ExecuteError::Conflict { .. } | ExecuteError::StaleStatus { .. })) => {
            eprintln!("{err}");
            Ok(1)
        }
        Err(err) => Err(format!("{err}")),
    }
}

fn cmd_history(store: &PathBuf, ticket: &str, output: OutputFormat) -> Result<i32, String> {
    let log = JsonHistory::open(store).map_err(stringify)?;
    let entries = log.entries_newest_first(ticket).map_err(stringify)?;
    let records: Vec<HistoryRecord> = entries
        .iter()
        .map(HistoryRecord::from_entry)
        .collect::<Result<_, _>>()
        .map_err(stringify)?;

    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&records).map_err(stringify)?
            );
        }
        OutputFormat::Text => {
            if records.is_empty() {
                println!("no history for {ticket}");
            }
            for record in &records {
                let notes = record.notes.as_deref().unwrap_or("-");
                println!(
                    "#{} {} {} by {}: {}",
                    record.id, record.created_at, record.status, record.actor, notes
                );
            }
        }
    }
    Ok(0)
}

// ──────────────────────────────────────────────
// Output helpers
// ──────────────────────────────────────────────

fn print_result(
    req: &TransitionRequest,
    result: &TransitionResult,
    output: OutputFormat,
) -> Result<(), String> {
    match output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(result).map_err(stringify)?
            );
        }
        OutputFormat::Text => {
            if result.allowed {
                println!("allowed: {} -> {}", req.current, req.target);
            } else if let Some(reason) = result.denial_reason() {
                println!("denied: {reason}");
            }
        }
    }
    Ok(())
}

/// Text name for a follow-up signal; `None` suppresses the line entirely.
fn follow_up_name(signal: FollowUpSignal) -> Option<&'static str> {
    match signal {
        FollowUpSignal::RequireParts => Some("require_parts"),
        FollowUpSignal::RequirePayment => Some("require_payment"),
        FollowUpSignal::ManageParts => Some("manage_parts"),
        FollowUpSignal::CollectPayment => Some("collect_payment"),
        FollowUpSignal::InitiateReturn => Some("initiate_return"),
        FollowUpSignal::None => None,
    }
}

fn stringify(err: impl std::fmt::Display) -> String {
    err.to_string()
}
