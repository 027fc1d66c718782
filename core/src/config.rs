use crate::{
    audit::{CommandAuditWriter, DEFAULT_AUDIT_TIMEOUT},
    error::TrackResult,
    model::MasterOrder,
    workspace::Workspace,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedOperator {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackConfig {
    /// SQLite path; `:memory:` keeps everything in RAM for the process.
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// External audit writer: program followed by its arguments.
    /// Empty disables audits (the fallback text is returned).
    #[serde(default)]
    pub audit_command: Vec<String>,
    /// Seconds the audit writer may run before it is killed.
    #[serde(default = "default_audit_timeout_secs")]
    pub audit_timeout_secs: u64,
    /// Operators created on first start, when the roster is empty.
    #[serde(default)]
    pub seed_roster: Vec<SeedOperator>,
    /// Expected orders loaded on first start, when the master list is empty.
    #[serde(default)]
    pub seed_master_orders: Vec<MasterOrder>,
}

fn default_db_path() -> String {
    "logitrack.db".to_string()
}

fn default_audit_timeout_secs() -> u64 {
    DEFAULT_AUDIT_TIMEOUT.as_secs()
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            audit_command: Vec::new(),
            audit_timeout_secs: default_audit_timeout_secs(),
            seed_roster: Vec::new(),
            seed_master_orders: Vec::new(),
        }
    }
}

impl TrackConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: TrackConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self {
            db_path: ":memory:".into(),
            audit_command: Vec::new(),
            audit_timeout_secs: default_audit_timeout_secs(),
            seed_roster: vec![
                SeedOperator {
                    name: "Juan".into(),
                    role: "Picking".into(),
                },
                SeedOperator {
                    name: "Maria".into(),
                    role: "Packing".into(),
                },
            ],
            seed_master_orders: vec![
                MasterOrder::new("DOC-101", "RETAIL STORES", 10, 100),
                MasterOrder::new("DOC-102", "NORTH DISTRIBUTION", 5, 50),
            ],
        }
    }

    /// The configured external audit writer, if any.
    pub fn audit_writer(&self) -> Option<CommandAuditWriter> {
        CommandAuditWriter::from_command(&self.audit_command)
            .map(|w| w.with_timeout(Duration::from_secs(self.audit_timeout_secs)))
    }

    /// Fill an empty roster and an empty master list from the seeds.
    /// Returns how many operators were created.
    pub fn seed(&self, ws: &mut Workspace) -> TrackResult<usize> {
        let mut created = 0;
        if ws.roster().is_empty() {
            for seed in &self.seed_roster {
                ws.add_operator(&seed.name, &seed.role)?;
                created += 1;
            }
        }
        if ws.master_orders().is_empty() && !self.seed_master_orders.is_empty() {
            ws.replace_master_orders(self.seed_master_orders.clone())?;
        }
        if created > 0 {
            log::info!("config: seeded {created} operators");
        }
        Ok(created)
    }
}
