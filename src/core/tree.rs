//! Category tree codec
//!
//! Converts the 3-level authoring structure (major → middle → minor) into a
//! flat, uniquely-keyed checklist and approximately inverts that transform
//! for editing. Flatten validates atomically and reports every offending
//! position; unflatten is best-effort and lossy by design.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::template::ChecklistItem;

/// Authoring bounds; kept small so generated forms stay tractable
pub const MAX_MAJORS: usize = 10;
pub const MAX_MIDDLES: usize = 10;
pub const MAX_MINORS: usize = 10;

/// Major name used when an item carries no category
const SYNTHETIC_MAJOR: &str = "General";

/// The major/middle/minor authoring structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTree {
    #[serde(default)]
    pub majors: Vec<MajorNode>,
}

/// A major category; the name is mandatory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorNode {
    pub name: String,

    #[serde(default)]
    pub middles: Vec<MiddleNode>,
}

/// A middle row; the name may be empty, and "no minors" is represented as
/// a single empty-string slot (a zero-length slot list is a structural error)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddleNode {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub minors: Vec<String>,
}

/// One structural problem found while validating a tree; positions are 1-based
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeIssue {
    #[error("tree has no major categories")]
    Empty,

    #[error("tree has {0} major categories (limit {MAX_MAJORS})")]
    TooManyMajors(usize),

    #[error("major {0} has no name")]
    UnnamedMajor(usize),

    #[error("major {0} has {1} middle rows (limit {MAX_MIDDLES})")]
    TooManyMiddles(usize, usize),

    #[error("major {0}, middle {1} has no minor slots")]
    NoMinorSlots(usize, usize),

    #[error("major {0}, middle {1} has {2} minor slots (limit {MAX_MINORS})")]
    TooManyMinors(usize, usize, usize),
}

/// All structural problems in an authored tree, reported together
#[derive(Debug, Error)]
#[error("Invalid category tree: {}", .issues.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("; "))]
pub struct TreeError {
    pub issues: Vec<TreeIssue>,
}

/// Validate a tree, collecting every issue before failing
fn validate(tree: &CategoryTree) -> Result<(), TreeError> {
    let mut issues = Vec::new();

    if tree.majors.is_empty() {
        issues.push(TreeIssue::Empty);
    }
    if tree.majors.len() > MAX_MAJORS {
        issues.push(TreeIssue::TooManyMajors(tree.majors.len()));
    }

    for (mi, major) in tree.majors.iter().enumerate() {
        let major_pos = mi + 1;
        if major.name.trim().is_empty() {
            issues.push(TreeIssue::UnnamedMajor(major_pos));
        }
        if major.middles.len() > MAX_MIDDLES {
            issues.push(TreeIssue::TooManyMiddles(major_pos, major.middles.len()));
        }
        for (di, middle) in major.middles.iter().enumerate() {
            let middle_pos = di + 1;
            if middle.minors.is_empty() {
                issues.push(TreeIssue::NoMinorSlots(major_pos, middle_pos));
            }
            if middle.minors.len() > MAX_MINORS {
                issues.push(TreeIssue::TooManyMinors(
                    major_pos,
                    middle_pos,
                    middle.minors.len(),
                ));
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(TreeError { issues })
    }
}

/// Flatten an authored tree into ordered checklist items
///
/// One key counter runs across the whole tree: `item_NNN`, `sort_order`
/// stepping by 10. Duplicate minor names produce duplicate items (append-only
/// authoring). All-or-nothing: an invalid tree yields no items at all.
pub fn flatten(tree: &CategoryTree) -> Result<Vec<ChecklistItem>, TreeError> {
    validate(tree)?;

    let mut items = Vec::new();
    let mut seq: u32 = 0;

    for major in &tree.majors {
        let category = major.name.trim();
        // A major with no middle rows yields nothing; the authoring tool
        // always supplies at least one empty-named middle.
        for middle in &major.middles {
            let middle_name = middle.name.trim();
            let minors: Vec<&str> = middle
                .minors
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect();

            if minors.is_empty() {
                let text = if middle_name.is_empty() {
                    category.to_string()
                } else {
                    middle_name.to_string()
                };
                seq += 1;
                items.push(make_item(seq, text, category));
            } else {
                for minor in minors {
                    let text = if middle_name.is_empty() {
                        minor.to_string()
                    } else {
                        format!("{} / {}", middle_name, minor)
                    };
                    seq += 1;
                    items.push(make_item(seq, text, category));
                }
            }
        }
    }

    Ok(items)
}

fn make_item(seq: u32, text: String, category: &str) -> ChecklistItem {
    ChecklistItem {
        item_key: format!("item_{:03}", seq),
        item_text: text,
        category: category.to_string(),
        severity: 1,
        sort_order: seq * 10,
        requires_photo: false,
        requires_note: false,
        is_active: true,
    }
}

/// Rebuild an editable tree from stored checklist items
///
/// Best effort and explicitly lossy: empty middle/minor distinctions do not
/// round-trip, and a `/` inside an authored name is indistinguishable from
/// the middle/minor join. Caps apply by truncation, not error.
pub fn unflatten(items: &[ChecklistItem]) -> CategoryTree {
    let mut majors: Vec<MajorNode> = Vec::new();

    for item in items {
        let category = item.category.trim();
        let major_name = if category.is_empty() {
            SYNTHETIC_MAJOR
        } else {
            category
        };

        let major_idx = match majors.iter().position(|m| m.name == major_name) {
            Some(i) => i,
            None => {
                if majors.len() >= MAX_MAJORS {
                    continue;
                }
                majors.push(MajorNode {
                    name: major_name.to_string(),
                    middles: Vec::new(),
                });
                majors.len() - 1
            }
        };
        let major = &mut majors[major_idx];

        let text = item.item_text.trim();
        let segments: Vec<&str> = text
            .split('/')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();

        if text.is_empty() || text == major.name || segments.is_empty() {
            ensure_middle(major, "");
        } else if segments.len() == 1 {
            ensure_middle(major, segments[0]);
        } else {
            let minor = segments[1..].join(" / ");
            if let Some(middle) = ensure_middle(major, segments[0]) {
                add_minor(middle, minor);
            }
        }
    }

    CategoryTree { majors }
}

/// Find or create a middle by name; None when the middle cap truncates
fn ensure_middle<'a>(major: &'a mut MajorNode, name: &str) -> Option<&'a mut MiddleNode> {
    if let Some(idx) = major.middles.iter().position(|m| m.name == name) {
        return Some(&mut major.middles[idx]);
    }
    if major.middles.len() >= MAX_MIDDLES {
        return None;
    }
    major.middles.push(MiddleNode {
        name: name.to_string(),
        // one empty slot = "no minors yet"; keeps the node re-flattenable
        minors: vec![String::new()],
    });
    major.middles.last_mut()
}

/// Append a minor, dropping the empty placeholder slot and duplicates
fn add_minor(middle: &mut MiddleNode, minor: String) {
    if middle.minors.len() == 1 && middle.minors[0].is_empty() {
        middle.minors.clear();
    }
    if middle.minors.contains(&minor) {
        return;
    }
    if middle.minors.len() >= MAX_MINORS {
        return;
    }
    middle.minors.push(minor);
}
