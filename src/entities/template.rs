//! Checklist template entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::tree::{self, CategoryTree, TreeError};

/// Inspection cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Daily => write!(f, "daily"),
            Period::Weekly => write!(f, "weekly"),
            Period::Monthly => write!(f, "monthly"),
            Period::Quarterly => write!(f, "quarterly"),
            Period::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            "quarterly" => Ok(Period::Quarterly),
            "yearly" => Ok(Period::Yearly),
            _ => Err(format!(
                "Unknown period: '{}'. Use daily/weekly/monthly/quarterly/yearly",
                s
            )),
        }
    }
}

/// One checklist line, produced by flattening a category tree
///
/// `item_key` is unique within a template and never reused; `sort_order`
/// carries the display order and must round-trip stably through storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub item_key: String,
    pub item_text: String,

    /// Major category name the item was derived from
    pub category: String,

    #[serde(default = "default_severity")]
    pub severity: u8,

    pub sort_order: u32,

    #[serde(default)]
    pub requires_photo: bool,

    #[serde(default)]
    pub requires_note: bool,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_severity() -> u8 {
    1
}

fn default_true() -> bool {
    true
}

/// A reusable checklist definition scoped to a site/target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: EntityId,

    /// Site scope
    #[serde(default)]
    pub site: String,

    /// Inspection target (building, line, asset reference)
    pub target: String,

    /// Template display name
    pub name: String,

    /// Inspection cadence
    #[serde(default)]
    pub period: Period,

    /// Ordered checklist items; immutable after creation except through
    /// explicit template edit/delete
    #[serde(default)]
    pub items: Vec<ChecklistItem>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author (who created this template)
    pub author: String,

    /// Revision number
    #[serde(default = "default_revision")]
    pub revision: u32,
}

fn default_revision() -> u32 {
    1
}

impl Entity for Template {
    const PREFIX: &'static str = "TPL";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Template {
    /// Create a template by flattening an authored category tree
    ///
    /// Fails atomically when the tree is structurally invalid; no partial
    /// item list is ever produced.
    pub fn from_tree(
        name: String,
        site: String,
        target: String,
        period: Period,
        tree: &CategoryTree,
        author: String,
    ) -> Result<Self, TreeError> {
        let items = tree::flatten(tree)?;
        Ok(Self {
            id: EntityId::new(EntityPrefix::Tpl),
            site,
            target,
            name,
            period,
            items,
            is_active: true,
            created: Utc::now(),
            author,
            revision: 1,
        })
    }

    /// Items that are still active, in sort order
    pub fn active_items(&self) -> impl Iterator<Item = &ChecklistItem> {
        self.items.iter().filter(|i| i.is_active)
    }
}
