//! Narrative audits generated by an external text writer.
//!
//! The writer receives a JSON payload built from the same metrics the
//! dashboard shows. Any failure degrades to a fixed fallback text; an
//! audit never fails the caller and waits at most the writer's timeout.

use crate::{
    error::{TrackError, TrackResult},
    filter::DateRange,
    model::{OrderStatus, PickingRecord},
    stats::{metrics_for, saturating_sum, OperatorMetrics},
};
use serde::Serialize;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const TEAM_AUDIT_FALLBACK: &str = "Managerial analysis unavailable. Check the connection.";
pub const OPERATOR_AUDIT_FALLBACK: &str = "The individual technical report could not be generated.";

/// How long an external writer may run before it is killed.
pub const DEFAULT_AUDIT_TIMEOUT: Duration = Duration::from_secs(60);
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Raw order counts sent alongside the team metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCounts {
    pub total_orders: usize,
    pub processed_picking: usize,
    pub processed_packing: usize,
    pub total_lines: u64,
    pub total_units: u64,
}

impl OrderCounts {
    pub fn from_picking(picking: &[PickingRecord]) -> Self {
        Self {
            total_orders: picking.len(),
            processed_picking: picking
                .iter()
                .filter(|o| o.status == OrderStatus::Processed)
                .count(),
            processed_packing: picking
                .iter()
                .filter(|o| o.packing_status == Some(OrderStatus::Processed))
                .count(),
            total_lines: saturating_sum(picking.iter().map(|o| o.lines)),
            total_units: saturating_sum(picking.iter().map(|o| o.quantity)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum AuditRequest {
    Team {
        metrics: Vec<OperatorMetrics>,
        orders: OrderCounts,
        #[serde(skip_serializing_if = "Option::is_none")]
        range: Option<DateRange>,
    },
    Operator {
        name: String,
        metrics: OperatorMetrics,
    },
}

impl AuditRequest {
    pub fn fallback(&self) -> &'static str {
        match self {
            Self::Team { .. } => TEAM_AUDIT_FALLBACK,
            Self::Operator { .. } => OPERATOR_AUDIT_FALLBACK,
        }
    }
}

/// Turns an audit request into free text.
pub trait AuditWriter {
    fn write(&self, request: &AuditRequest) -> TrackResult<String>;
}

impl<F> AuditWriter for F
where
    F: Fn(&AuditRequest) -> TrackResult<String>,
{
    fn write(&self, request: &AuditRequest) -> TrackResult<String> {
        self(request)
    }
}

/// Runs an external program: the request JSON goes to stdin, the audit
/// text is read from stdout. A program still running at the timeout is
/// killed and the call fails.
pub struct CommandAuditWriter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAuditWriter {
    /// `command[0]` is the program, the rest are its arguments.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: DEFAULT_AUDIT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl AuditWriter for CommandAuditWriter {
    fn write(&self, request: &AuditRequest) -> TrackResult<String> {
        let payload = serde_json::to_vec(request)?;
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Pipes are fed and drained on their own threads so a full pipe
        // never stalls the deadline loop.
        let stdin = child.stdin.take();
        let feeder = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                // The child may exit without reading its input.
                let _ = stdin.write_all(&payload);
            }
        });
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TrackError::Audit(format!(
                    "{} timed out after {}ms",
                    self.program,
                    self.timeout.as_millis()
                )));
            }
            thread::sleep(POLL_INTERVAL);
        };
        let _ = feeder.join();
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();

        if !status.success() {
            return Err(TrackError::Audit(format!(
                "{} exited with {}: {}",
                self.program,
                status,
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        let text = String::from_utf8_lossy(&stdout).trim().to_string();
        if text.is_empty() {
            return Err(TrackError::Audit(format!("{} returned no text", self.program)));
        }
        Ok(text)
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

pub struct Auditor {
    writer: Box<dyn AuditWriter>,
}

impl Auditor {
    pub fn new(writer: Box<dyn AuditWriter>) -> Self {
        Self { writer }
    }

    /// Audit of the whole team.
    pub fn team_audit(
        &self,
        metrics: &[OperatorMetrics],
        picking: &[PickingRecord],
        range: Option<&DateRange>,
    ) -> String {
        let request = AuditRequest::Team {
            metrics: metrics.to_vec(),
            orders: OrderCounts::from_picking(picking),
            range: range.cloned(),
        };
        self.run(&request)
    }

    /// Audit of a single operator. Unknown names get the fallback text.
    pub fn operator_audit(&self, name: &str, metrics: &[OperatorMetrics]) -> String {
        let Some(row) = metrics_for(metrics, name) else {
            log::warn!("audit: operator '{name}' is not on the roster");
            return OPERATOR_AUDIT_FALLBACK.to_string();
        };
        let request = AuditRequest::Operator {
            name: row.name.clone(),
            metrics: row.clone(),
        };
        self.run(&request)
    }

    fn run(&self, request: &AuditRequest) -> String {
        match self.writer.write(request) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("audit: writer failed, using fallback: {e}");
                request.fallback().to_string()
            }
        }
    }
}
