//! Inspection run entity
//!
//! A run is one executed instance of an inspection against a template
//! snapshot. Its items are copies of the template's checklist items at
//! creation time; its approval steps accumulate across submission cycles
//! and are never reordered or deleted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::EntityId;

/// Run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Draft,
    Submitted,
    Approved,
    Rejected,
    Done,
    Canceled,
}

impl RunStatus {
    /// Whether items and notes may still be edited
    pub fn is_editable(&self) -> bool {
        matches!(self, RunStatus::Draft | RunStatus::Rejected)
    }

    /// Terminal states accept no further workflow transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Done | RunStatus::Canceled)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Draft => write!(f, "draft"),
            RunStatus::Submitted => write!(f, "submitted"),
            RunStatus::Approved => write!(f, "approved"),
            RunStatus::Rejected => write!(f, "rejected"),
            RunStatus::Done => write!(f, "done"),
            RunStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(RunStatus::Draft),
            "submitted" => Ok(RunStatus::Submitted),
            "approved" => Ok(RunStatus::Approved),
            "rejected" => Ok(RunStatus::Rejected),
            "done" => Ok(RunStatus::Done),
            "canceled" => Ok(RunStatus::Canceled),
            _ => Err(format!("Unknown run status: {}", s)),
        }
    }
}

/// Result recorded against one run item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemResult {
    Compliant,
    Noncompliant,
    #[default]
    Na,
}

impl std::fmt::Display for ItemResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemResult::Compliant => write!(f, "compliant"),
            ItemResult::Noncompliant => write!(f, "noncompliant"),
            ItemResult::Na => write!(f, "na"),
        }
    }
}

impl std::str::FromStr for ItemResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compliant" => Ok(ItemResult::Compliant),
            "noncompliant" => Ok(ItemResult::Noncompliant),
            "na" => Ok(ItemResult::Na),
            _ => Err(format!(
                "Unknown item result: '{}'. Use compliant/noncompliant/na",
                s
            )),
        }
    }
}

/// Decision on one approval step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Pending => write!(f, "pending"),
            Decision::Approved => write!(f, "approved"),
            Decision::Rejected => write!(f, "rejected"),
        }
    }
}

/// One checklist line inside a run
///
/// `id` is a generated row identifier, distinct from the template-level
/// `item_key`. Owned exclusively by the parent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunItem {
    pub id: String,
    pub item_key: String,
    pub item_text: String,
    pub category: String,

    #[serde(default)]
    pub result: ItemResult,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,

    /// Opaque handle supplied by the upload collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// One entry in a run's sign-off chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalStep {
    /// 1-based within its submission cycle
    pub step_no: u32,

    /// Approver identity recorded at submission time
    pub approver: String,

    #[serde(default)]
    pub decision: Decision,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// One executed inspection, tracked through its status lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier
    pub id: EntityId,

    /// Human-facing code, e.g. `R260808-7GQ2`
    pub run_code: String,

    /// Site scope
    #[serde(default)]
    pub site: String,

    /// Inspection target reference
    pub target: String,

    /// Template this run was materialized from
    pub template: EntityId,

    #[serde(default)]
    pub status: RunStatus,

    /// Date the inspection covers
    pub run_date: NaiveDate,

    /// Owning inspector identity
    pub inspector: String,

    /// Snapshot copies of the template's checklist items
    #[serde(default)]
    pub items: Vec<RunItem>,

    /// Full approval history; one chain per submission cycle
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub approvals: Vec<ApprovalStep>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Run {
    const PREFIX: &'static str = "RUN";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.run_code
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.inspector
    }
}

impl Run {
    /// The current pending approval step, if any (at most one exists)
    pub fn pending_step(&self) -> Option<&ApprovalStep> {
        self.approvals
            .iter()
            .find(|s| s.decision == Decision::Pending)
    }

    /// Mutable access to the current pending step
    pub fn pending_step_mut(&mut self) -> Option<&mut ApprovalStep> {
        self.approvals
            .iter_mut()
            .find(|s| s.decision == Decision::Pending)
    }

    /// Look up a run item by row id
    pub fn item(&self, id: &str) -> Option<&RunItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Mutable lookup of a run item by row id
    pub fn item_mut(&mut self, id: &str) -> Option<&mut RunItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Resolve an item reference that may be a row id or an `item_key`
    pub fn resolve_item_id(&self, reference: &str) -> Option<String> {
        if self.item(reference).is_some() {
            return Some(reference.to_string());
        }
        self.items
            .iter()
            .find(|i| i.item_key == reference)
            .map(|i| i.id.clone())
    }
}
