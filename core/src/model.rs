//! Roster and process record types.
//!
//! Serialized names are camelCase English. The keys written by the old
//! browser store (`operador`, `lineas`, `duracionMinutos`, ...) are accepted
//! as aliases so existing backups load unchanged.

use crate::{
    coerce::{
        effective_packing, floor_duration, lenient_count, lenient_id, lenient_minutes,
        lenient_opt_count, lenient_opt_minutes, minutes_between, non_empty_name,
    },
    error::TrackResult,
    types::{IsoDate, OperatorName, RecordId},
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPERATOR_ROLE: &str = "Logistics Operator";

fn new_id() -> RecordId {
    uuid::Uuid::new_v4().to_string()
}

// ── Roster ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operator {
    #[serde(deserialize_with = "lenient_id")]
    pub id: RecordId,
    pub name: OperatorName,
    #[serde(default)]
    pub role: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Operator {
    pub fn new(name: &str, role: &str) -> Self {
        let role = role.trim();
        Self {
            id: new_id(),
            name: name.trim().to_string(),
            role: if role.is_empty() {
                DEFAULT_OPERATOR_ROLE.to_string()
            } else {
                role.to_string()
            },
            active: true,
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    #[serde(alias = "Pendiente")]
    Pending,
    #[serde(alias = "Procesado")]
    Processed,
    #[serde(alias = "Anulado")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Unknown stored values read back as `Pending`.
    pub fn from_db(raw: &str) -> Self {
        match raw {
            "processed" => Self::Processed,
            "cancelled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

// ── Picking / packing ────────────────────────────────────────────────────────

/// One document picked (and optionally packed) by up to two operators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PickingRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: RecordId,
    #[serde(default, alias = "fecha")]
    pub date: IsoDate,
    #[serde(default, alias = "documento")]
    pub document: String,
    #[serde(default, alias = "cliente")]
    pub client: String,
    #[serde(default, alias = "tipoLista")]
    pub list_type: String,
    #[serde(default, alias = "operador")]
    pub operator: OperatorName,
    #[serde(default, alias = "horaInicio")]
    pub start_time: String,
    #[serde(default, alias = "horaFin")]
    pub end_time: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, alias = "lineas", deserialize_with = "lenient_count")]
    pub lines: u64,
    #[serde(default, alias = "cantidad", deserialize_with = "lenient_count")]
    pub quantity: u64,
    #[serde(default, alias = "duracionMinutos", deserialize_with = "lenient_minutes")]
    pub duration_minutes: u32,

    #[serde(default, alias = "fechaDocumento", skip_serializing_if = "Option::is_none")]
    pub document_date: Option<IsoDate>,
    #[serde(default, alias = "horaGeneracion", skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    #[serde(default, alias = "operadorPacking", skip_serializing_if = "Option::is_none")]
    pub packing_operator: Option<OperatorName>,
    #[serde(default, alias = "horaInicioPacking", skip_serializing_if = "Option::is_none")]
    pub packing_start_time: Option<String>,
    #[serde(default, alias = "horaFinPacking", skip_serializing_if = "Option::is_none")]
    pub packing_end_time: Option<String>,
    #[serde(default, alias = "statusPacking", skip_serializing_if = "Option::is_none")]
    pub packing_status: Option<OrderStatus>,
    #[serde(
        default,
        alias = "lineasPacking",
        deserialize_with = "lenient_opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub packing_lines: Option<u64>,
    #[serde(
        default,
        alias = "cantidadPacking",
        deserialize_with = "lenient_opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub packing_quantity: Option<u64>,
    #[serde(
        default,
        alias = "duracionPackingMinutos",
        deserialize_with = "lenient_opt_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub packing_duration_minutes: Option<u32>,

    #[serde(default, alias = "referenciaBatch", skip_serializing_if = "Option::is_none")]
    pub batch_reference: Option<String>,
}

impl PickingRecord {
    pub fn new(
        date: &str,
        document: &str,
        operator: &str,
        lines: u64,
        quantity: u64,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: new_id(),
            date: date.to_string(),
            document: document.trim().to_string(),
            client: String::new(),
            list_type: String::new(),
            operator: operator.trim().to_string(),
            start_time: String::new(),
            end_time: String::new(),
            status: OrderStatus::Pending,
            lines,
            quantity,
            duration_minutes: floor_duration(duration_minutes as i64),
            document_date: None,
            generated_at: None,
            packing_operator: None,
            packing_start_time: None,
            packing_end_time: None,
            packing_status: None,
            packing_lines: None,
            packing_quantity: None,
            packing_duration_minutes: None,
            batch_reference: None,
        }
    }

    /// Set picking start/end and derive the picking duration from them.
    pub fn timed(mut self, start: &str, end: &str) -> TrackResult<Self> {
        self.duration_minutes = minutes_between(start, end)?;
        self.start_time = start.to_string();
        self.end_time = end.to_string();
        Ok(self)
    }

    pub fn packed_by(mut self, operator: &str, duration_minutes: u32) -> Self {
        self.packing_operator = Some(operator.trim().to_string());
        self.packing_duration_minutes = Some(floor_duration(duration_minutes as i64));
        self
    }

    /// Set packing start/end and derive the packing duration from them.
    pub fn packing_timed(mut self, start: &str, end: &str) -> TrackResult<Self> {
        self.packing_duration_minutes = Some(minutes_between(start, end)?);
        self.packing_start_time = Some(start.to_string());
        self.packing_end_time = Some(end.to_string());
        Ok(self)
    }

    pub fn with_packing_figures(mut self, lines: u64, quantity: u64) -> Self {
        self.packing_lines = Some(lines);
        self.packing_quantity = Some(quantity);
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_packing_status(mut self, status: OrderStatus) -> Self {
        self.packing_status = Some(status);
        self
    }

    pub fn with_client(mut self, client: &str) -> Self {
        self.client = client.to_string();
        self
    }

    /// The packing operator, when one is recorded and not blank.
    pub fn packer(&self) -> Option<&str> {
        non_empty_name(self.packing_operator.as_deref())
    }

    pub fn effective_packing_lines(&self) -> u64 {
        effective_packing(self.packing_lines, self.lines)
    }

    pub fn effective_packing_quantity(&self) -> u64 {
        effective_packing(self.packing_quantity, self.quantity)
    }
}

// ── Reception ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: RecordId,
    #[serde(default, alias = "fecha")]
    pub date: IsoDate,
    #[serde(default, rename = "type", alias = "tipo")]
    pub kind: String,
    #[serde(default, alias = "documento")]
    pub document: String,
    #[serde(default, alias = "proveedor")]
    pub supplier: String,
    #[serde(default, alias = "operador")]
    pub operator: OperatorName,
    #[serde(default, alias = "horaInicio")]
    pub start_time: String,
    #[serde(default, alias = "horaFin")]
    pub end_time: String,
    #[serde(default, alias = "lineas", deserialize_with = "lenient_count")]
    pub lines: u64,
    #[serde(default, alias = "cantidad", deserialize_with = "lenient_count")]
    pub quantity: u64,
    #[serde(default, alias = "duracionMinutos", deserialize_with = "lenient_minutes")]
    pub duration_minutes: u32,
    #[serde(default, alias = "fotoEvidencia", skip_serializing_if = "Option::is_none")]
    pub photo_evidence: Option<String>,
}

impl ReceptionRecord {
    pub fn new(date: &str, operator: &str, lines: u64, quantity: u64, duration_minutes: u32) -> Self {
        Self {
            id: new_id(),
            date: date.to_string(),
            kind: String::new(),
            document: String::new(),
            supplier: String::new(),
            operator: operator.trim().to_string(),
            start_time: String::new(),
            end_time: String::new(),
            lines,
            quantity,
            duration_minutes: floor_duration(duration_minutes as i64),
            photo_evidence: None,
        }
    }

    pub fn timed(mut self, start: &str, end: &str) -> TrackResult<Self> {
        self.duration_minutes = minutes_between(start, end)?;
        self.start_time = start.to_string();
        self.end_time = end.to_string();
        Ok(self)
    }

    pub fn from_supplier(mut self, supplier: &str, document: &str) -> Self {
        self.supplier = supplier.to_string();
        self.document = document.to_string();
        self
    }
}

// ── Conditioning (VAS) ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConditioningRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: RecordId,
    #[serde(default, alias = "fecha")]
    pub date: IsoDate,
    #[serde(default, rename = "type", alias = "tipo")]
    pub kind: String,
    #[serde(default, alias = "operador")]
    pub operator: OperatorName,
    #[serde(default, alias = "cliente")]
    pub client: String,
    #[serde(default, alias = "documento")]
    pub document: String,
    #[serde(default, alias = "horaInicio")]
    pub start_time: String,
    #[serde(default, alias = "horaFin")]
    pub end_time: String,
    #[serde(default, alias = "lineas", deserialize_with = "lenient_count")]
    pub lines: u64,
    #[serde(default, alias = "cantidad", deserialize_with = "lenient_count")]
    pub quantity: u64,
    #[serde(default, alias = "duracionMinutos", deserialize_with = "lenient_minutes")]
    pub duration_minutes: u32,
}

impl ConditioningRecord {
    pub fn new(
        date: &str,
        kind: &str,
        operator: &str,
        lines: u64,
        quantity: u64,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: new_id(),
            date: date.to_string(),
            kind: kind.to_string(),
            operator: operator.trim().to_string(),
            client: String::new(),
            document: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            lines,
            quantity,
            duration_minutes: floor_duration(duration_minutes as i64),
        }
    }

    pub fn timed(mut self, start: &str, end: &str) -> TrackResult<Self> {
        self.duration_minutes = minutes_between(start, end)?;
        self.start_time = start.to_string();
        self.end_time = end.to_string();
        Ok(self)
    }
}

// ── Storage movements ────────────────────────────────────────────────────────

/// A relocation between two warehouse positions. Storage has no line concept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: RecordId,
    #[serde(default, alias = "fecha")]
    pub date: IsoDate,
    #[serde(default, alias = "ubicacionEntrada")]
    pub entry_location: String,
    #[serde(default, alias = "ubicacionSalida")]
    pub exit_location: String,
    #[serde(default, alias = "operador")]
    pub operator: OperatorName,
    #[serde(default, alias = "horaInicio")]
    pub start_time: String,
    #[serde(default, alias = "horaFin")]
    pub end_time: String,
    #[serde(default, alias = "tipoBodega")]
    pub warehouse_type: String,
    #[serde(default, alias = "cantidad", deserialize_with = "lenient_count")]
    pub quantity: u64,
    #[serde(default, alias = "duracionMinutos", deserialize_with = "lenient_minutes")]
    pub duration_minutes: u32,
    #[serde(default, alias = "codigoProducto", skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
    #[serde(default, alias = "descripcionProducto", skip_serializing_if = "Option::is_none")]
    pub product_description: Option<String>,
}

impl StorageRecord {
    pub fn new(date: &str, operator: &str, quantity: u64, duration_minutes: u32) -> Self {
        Self {
            id: new_id(),
            date: date.to_string(),
            entry_location: String::new(),
            exit_location: String::new(),
            operator: operator.trim().to_string(),
            start_time: String::new(),
            end_time: String::new(),
            warehouse_type: String::new(),
            quantity,
            duration_minutes: floor_duration(duration_minutes as i64),
            product_code: None,
            product_description: None,
        }
    }

    pub fn timed(mut self, start: &str, end: &str) -> TrackResult<Self> {
        self.duration_minutes = minutes_between(start, end)?;
        self.start_time = start.to_string();
        self.end_time = end.to_string();
        Ok(self)
    }

    pub fn between(mut self, entry: &str, exit: &str) -> Self {
        self.entry_location = entry.to_string();
        self.exit_location = exit.to_string();
        self
    }

    pub fn of_product(mut self, code: &str, description: &str) -> Self {
        self.product_code = Some(code.to_string());
        self.product_description = Some(description.to_string());
        self
    }

    /// Fill the product description from the article master.
    ///
    /// A matching article always wins. Without a match the record keeps
    /// whatever description it already carries. Returns true on a match.
    pub fn link_article(&mut self, articles: &[ArticleMaster]) -> bool {
        let Some(code) = self.product_code.as_deref() else {
            return false;
        };
        match ArticleMaster::find(articles, code) {
            Some(article) => {
                self.product_description = Some(article.description.clone());
                true
            }
            None => false,
        }
    }
}

// ── Masters ──────────────────────────────────────────────────────────────────

/// An expected order from the master list; the compliance denominator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MasterOrder {
    #[serde(alias = "documento")]
    pub document: String,
    #[serde(default, alias = "cliente")]
    pub client: String,
    #[serde(default, alias = "lineas", deserialize_with = "lenient_count")]
    pub lines: u64,
    #[serde(default, alias = "cantidad", deserialize_with = "lenient_count")]
    pub quantity: u64,
}

impl MasterOrder {
    pub fn new(document: &str, client: &str, lines: u64, quantity: u64) -> Self {
        Self {
            document: document.trim().to_string(),
            client: client.to_string(),
            lines,
            quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleMaster {
    #[serde(alias = "codigo")]
    pub code: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
}

impl ArticleMaster {
    pub fn new(code: &str, description: &str) -> Self {
        Self {
            code: code.trim().to_string(),
            description: description.to_string(),
        }
    }

    /// Exact, case-insensitive lookup by code. Blank codes never match.
    pub fn find<'a>(articles: &'a [ArticleMaster], code: &str) -> Option<&'a ArticleMaster> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return None;
        }
        articles
            .iter()
            .find(|a| a.code.trim().to_lowercase() == code)
    }
}

// ── Record set ───────────────────────────────────────────────────────────────

/// The four process collections the aggregation engine reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordSet {
    pub picking: Vec<PickingRecord>,
    pub reception: Vec<ReceptionRecord>,
    pub conditioning: Vec<ConditioningRecord>,
    pub storage: Vec<StorageRecord>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.picking.len() + self.reception.len() + self.conditioning.len() + self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
