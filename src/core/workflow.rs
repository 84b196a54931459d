//! Run workflow - inspection lifecycle and approval chain
//!
//! DRAFT → SUBMITTED → {APPROVED → DONE, REJECTED}; REJECTED is editable
//! again and re-submittable. DONE and CANCELED are terminal. Every mutating
//! operation re-checks permission against the run it is about to change;
//! side effects stay inside the run aggregate.

use chrono::{NaiveDate, Utc};
use rand::{distr::Alphanumeric, Rng};
use thiserror::Error;
use ulid::Ulid;

use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::policy;
use crate::core::team::Member;
use crate::entities::run::{ApprovalStep, Decision, ItemResult, Run, RunItem, RunStatus};
use crate::entities::template::Template;

/// Errors that can occur during workflow operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Permission denied: {action} ({detail})")]
    PermissionDenied {
        action: &'static str,
        detail: String,
    },

    #[error("Operation not valid while run is {current}")]
    InvalidState { current: RunStatus },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// Check if a status transition is valid
pub fn is_valid_transition(from: RunStatus, to: RunStatus) -> bool {
    matches!(
        (from, to),
        // Submission, from scratch or after a rejection
        (RunStatus::Draft, RunStatus::Submitted)
            | (RunStatus::Rejected, RunStatus::Submitted)
            // Decisions
            | (RunStatus::Submitted, RunStatus::Approved)
            | (RunStatus::Submitted, RunStatus::Rejected)
            // Finalization cascade
            | (RunStatus::Approved, RunStatus::Done)
            // Abandoning an editable run
            | (RunStatus::Draft, RunStatus::Canceled)
            | (RunStatus::Rejected, RunStatus::Canceled)
    )
}

/// Get allowed transitions from the current status
pub fn allowed_transitions(current: RunStatus) -> Vec<RunStatus> {
    match current {
        RunStatus::Draft => vec![RunStatus::Submitted, RunStatus::Canceled],
        RunStatus::Rejected => vec![RunStatus::Submitted, RunStatus::Canceled],
        RunStatus::Submitted => vec![RunStatus::Approved, RunStatus::Rejected],
        RunStatus::Approved => vec![RunStatus::Done],
        RunStatus::Done | RunStatus::Canceled => vec![],
    }
}

/// Request payload for creating a run
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub site: String,
    pub target: String,
    /// `%Y-%m-%d`; validated here
    pub run_date: String,
    pub note: String,
}

/// One `{result, note}` update addressed by run-item row id
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ItemPatch {
    pub id: String,

    #[serde(default)]
    pub result: Option<ItemResult>,

    #[serde(default)]
    pub note: Option<String>,
}

/// Materialize a run from a template snapshot
///
/// Items are copies of the template's active checklist items with fresh row
/// ids and `result = na`. The new run starts in DRAFT.
pub fn create_run(
    template: &Template,
    request: RunRequest,
    actor: &Member,
) -> Result<Run, WorkflowError> {
    if !policy::can_create_run(actor) {
        return Err(WorkflowError::PermissionDenied {
            action: "create run",
            detail: format!("{} lacks the run-creation capability", actor.name),
        });
    }
    if !template.is_active {
        return Err(WorkflowError::InvalidArgument(format!(
            "template {} is deactivated",
            template.id
        )));
    }

    let run_date = NaiveDate::parse_from_str(&request.run_date, "%Y-%m-%d").map_err(|_| {
        WorkflowError::InvalidArgument(format!(
            "unparseable run date '{}' (expected YYYY-MM-DD)",
            request.run_date
        ))
    })?;

    let items = template
        .active_items()
        .map(|item| RunItem {
            id: Ulid::new().to_string(),
            item_key: item.item_key.clone(),
            item_text: item.item_text.clone(),
            category: item.category.clone(),
            result: ItemResult::Na,
            note: String::new(),
            photo: None,
        })
        .collect();

    Ok(Run {
        id: EntityId::new(EntityPrefix::Run),
        run_code: generate_run_code(run_date),
        site: request.site,
        target: request.target,
        template: template.id.clone(),
        status: RunStatus::Draft,
        run_date,
        inspector: actor.name.clone(),
        items,
        approvals: Vec::new(),
        note: request.note,
        created: Utc::now(),
        revision: 1,
    })
}

/// Human-facing run code: date plus a short random suffix
fn generate_run_code(date: NaiveDate) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!("R{}-{}", date.format("%y%m%d"), suffix.to_uppercase())
}

/// Apply `{result, note}` patches to matching run items
///
/// Unknown row ids are ignored (partial forms are fine); re-applying the
/// same patch set yields the same state. Returns the number of rows touched.
pub fn apply_item_patches(
    run: &mut Run,
    patches: &[ItemPatch],
    actor: &Member,
) -> Result<usize, WorkflowError> {
    ensure_editable(run, actor, "edit run items")?;

    let mut touched = 0;
    for patch in patches {
        let Some(item) = run.item_mut(&patch.id) else {
            continue;
        };
        if let Some(result) = patch.result {
            item.result = result;
        }
        if let Some(ref note) = patch.note {
            item.note = note.clone();
        }
        touched += 1;
    }
    Ok(touched)
}

/// Attach or replace the photo reference on one run item
///
/// Follows the edit gate, except that a DONE run still accepts photos from
/// an administrative actor (post-hoc correction of the finalized record).
pub fn attach_photo(
    run: &mut Run,
    item_id: &str,
    photo_ref: &str,
    actor: &Member,
) -> Result<(), WorkflowError> {
    if run.status == RunStatus::Done {
        if !actor.admin {
            return Err(WorkflowError::PermissionDenied {
                action: "attach photo",
                detail: "finalized runs accept photos from administrators only".to_string(),
            });
        }
    } else {
        ensure_editable(run, actor, "attach photo")?;
    }

    let Some(item) = run.item_mut(item_id) else {
        return Err(WorkflowError::NotFound {
            kind: "run item",
            id: item_id.to_string(),
        });
    };
    item.photo = Some(photo_ref.to_string());
    Ok(())
}

/// Submit a run for approval
///
/// Starts a fresh approval chain (`step_no` restarts at 1); earlier chains
/// stay in the history. The approver is resolved by the caller; the
/// workflow only records it.
pub fn submit(run: &mut Run, approver: &str, actor: &Member) -> Result<(), WorkflowError> {
    ensure_editable(run, actor, "submit run")?;

    let approver = approver.trim();
    if approver.is_empty() {
        return Err(WorkflowError::InvalidArgument(
            "no approver resolved for submission".to_string(),
        ));
    }

    run.approvals.push(ApprovalStep {
        step_no: 1,
        approver: approver.to_string(),
        decision: Decision::Pending,
        decided_at: None,
        comment: None,
    });
    run.status = RunStatus::Submitted;
    Ok(())
}

/// Approve the current pending step
///
/// Resolves the step and cascades APPROVED → DONE when no further pending
/// step exists (single-step chains). Returns the resulting status.
pub fn approve(
    run: &mut Run,
    comment: Option<String>,
    actor: &Member,
) -> Result<RunStatus, WorkflowError> {
    decide(run, Decision::Approved, comment, actor)?;
    run.status = RunStatus::Approved;
    if run.pending_step().is_none() {
        run.status = RunStatus::Done;
    }
    Ok(run.status)
}

/// Reject the current pending step; the run becomes editable again
pub fn reject(
    run: &mut Run,
    comment: Option<String>,
    actor: &Member,
) -> Result<RunStatus, WorkflowError> {
    decide(run, Decision::Rejected, comment, actor)?;
    run.status = RunStatus::Rejected;
    Ok(run.status)
}

/// Cancel an editable run; terminal, no further mutation
pub fn cancel(run: &mut Run, actor: &Member) -> Result<(), WorkflowError> {
    ensure_editable(run, actor, "cancel run")?;
    run.status = RunStatus::Canceled;
    Ok(())
}

/// Shared gate for decision operations: state first, then actor
fn decide(
    run: &mut Run,
    decision: Decision,
    comment: Option<String>,
    actor: &Member,
) -> Result<(), WorkflowError> {
    if run.status != RunStatus::Submitted {
        return Err(WorkflowError::InvalidState {
            current: run.status,
        });
    }
    if run.pending_step().is_some() && !policy::can_decide(actor, run) {
        return Err(WorkflowError::PermissionDenied {
            action: "decide run",
            detail: format!("{} is not the pending approver", actor.name),
        });
    }

    match run.pending_step_mut() {
        Some(step) => {
            step.decision = decision;
            step.decided_at = Some(Utc::now());
            step.comment = comment;
            Ok(())
        }
        None => Err(WorkflowError::PermissionDenied {
            action: "decide run",
            detail: "run has no pending approval step".to_string(),
        }),
    }
}

/// Shared gate for edit-class operations: state first, then actor
fn ensure_editable(run: &Run, actor: &Member, action: &'static str) -> Result<(), WorkflowError> {
    if !run.status.is_editable() {
        return Err(WorkflowError::InvalidState {
            current: run.status,
        });
    }
    if !policy::can_edit(actor, run) {
        return Err(WorkflowError::PermissionDenied {
            action,
            detail: format!("{} is not the owning inspector", actor.name),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::team::Role;
    use crate::core::tree::{CategoryTree, MajorNode, MiddleNode};
    use crate::entities::template::Period;

    fn template() -> Template {
        let tree = CategoryTree {
            majors: vec![MajorNode {
                name: "Electrical".to_string(),
                middles: vec![MiddleNode {
                    name: "Switchgear".to_string(),
                    minors: vec!["Breaker condition".to_string(), "Cable jacketing".to_string()],
                }],
            }],
        };
        Template::from_tree(
            "Monthly electrical".to_string(),
            "HQ".to_string(),
            "BLDG-A".to_string(),
            Period::Monthly,
            &tree,
            "lee".to_string(),
        )
        .unwrap()
    }

    fn manager(name: &str) -> Member {
        Member {
            name: name.to_string(),
            email: None,
            roles: vec![Role::SiteManager],
            admin: false,
            can_create_runs: None,
        }
    }

    fn admin(name: &str) -> Member {
        Member::unrestricted(name)
    }

    fn inspector(name: &str) -> Member {
        let mut m = Member::inspector(name);
        m.can_create_runs = Some(true);
        m
    }

    fn request(date: &str) -> RunRequest {
        RunRequest {
            site: "HQ".to_string(),
            target: "BLDG-A".to_string(),
            run_date: date.to_string(),
            note: String::new(),
        }
    }

    fn draft_run() -> Run {
        create_run(&template(), request("2026-08-08"), &inspector("kim")).unwrap()
    }

    #[test]
    fn test_transition_table() {
        assert!(is_valid_transition(RunStatus::Draft, RunStatus::Submitted));
        assert!(is_valid_transition(RunStatus::Rejected, RunStatus::Submitted));
        assert!(is_valid_transition(RunStatus::Submitted, RunStatus::Approved));
        assert!(is_valid_transition(RunStatus::Submitted, RunStatus::Rejected));
        assert!(is_valid_transition(RunStatus::Approved, RunStatus::Done));

        assert!(!is_valid_transition(RunStatus::Draft, RunStatus::Approved));
        assert!(!is_valid_transition(RunStatus::Done, RunStatus::Draft));
        assert!(!is_valid_transition(RunStatus::Canceled, RunStatus::Submitted));
        assert!(allowed_transitions(RunStatus::Done).is_empty());
        assert!(allowed_transitions(RunStatus::Canceled).is_empty());
    }

    #[test]
    fn test_create_run_snapshots_active_items() {
        let mut tpl = template();
        tpl.items[1].is_active = false;

        let run = create_run(&tpl, request("2026-08-08"), &inspector("kim")).unwrap();
        assert_eq!(run.status, RunStatus::Draft);
        assert_eq!(run.inspector, "kim");
        assert_eq!(run.items.len(), 1);
        assert_eq!(run.items[0].item_key, "item_001");
        assert_eq!(run.items[0].result, ItemResult::Na);
        // row ids are fresh, not the template item keys
        assert_ne!(run.items[0].id, run.items[0].item_key);
        assert!(run.run_code.starts_with("R260808-"));
    }

    #[test]
    fn test_create_run_gates() {
        let tpl = template();
        let err = create_run(&tpl, request("2026-08-08"), &Member::inspector("kim")).unwrap_err();
        assert!(matches!(err, WorkflowError::PermissionDenied { .. }));

        let err = create_run(&tpl, request("08/08/2026"), &manager("lee")).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));

        let mut inactive = template();
        inactive.is_active = false;
        let err = create_run(&inactive, request("2026-08-08"), &manager("lee")).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));
    }

    #[test]
    fn test_patch_partial_and_idempotent() {
        let mut run = draft_run();
        let first = run.items[0].id.clone();

        let patches = vec![ItemPatch {
            id: first.clone(),
            result: Some(ItemResult::Noncompliant),
            note: Some("균열".to_string()),
        }];
        let touched = apply_item_patches(&mut run, &patches, &inspector("kim")).unwrap();
        assert_eq!(touched, 1);
        assert_eq!(run.items[0].result, ItemResult::Noncompliant);
        assert_eq!(run.items[0].note, "균열");
        // the other item is untouched
        assert_eq!(run.items[1].result, ItemResult::Na);

        let again = apply_item_patches(&mut run, &patches, &inspector("kim")).unwrap();
        assert_eq!(again, 1);
        assert_eq!(run.items[0].result, ItemResult::Noncompliant);
        assert_eq!(run.items[0].note, "균열");
    }

    #[test]
    fn test_patch_ignores_unknown_ids() {
        let mut run = draft_run();
        let patches = vec![ItemPatch {
            id: "no-such-row".to_string(),
            result: Some(ItemResult::Compliant),
            note: None,
        }];
        let touched = apply_item_patches(&mut run, &patches, &inspector("kim")).unwrap();
        assert_eq!(touched, 0);
    }

    #[test]
    fn test_patch_denied_for_non_owner() {
        let mut run = draft_run();
        let id = run.items[0].id.clone();
        let patches = vec![ItemPatch {
            id,
            result: Some(ItemResult::Compliant),
            note: None,
        }];
        let err = apply_item_patches(&mut run, &patches, &Member::inspector("lee")).unwrap_err();
        assert!(matches!(err, WorkflowError::PermissionDenied { .. }));

        // admin bypasses ownership
        apply_item_patches(&mut run, &patches, &admin("root")).unwrap();
    }

    #[test]
    fn test_submit_then_decide_flow() {
        let mut run = draft_run();
        let kim = inspector("kim");

        submit(&mut run, "lee", &kim).unwrap();
        assert_eq!(run.status, RunStatus::Submitted);
        assert_eq!(run.approvals.len(), 1);
        assert_eq!(run.pending_step().unwrap().approver, "lee");

        // double submit is an invalid state
        let err = submit(&mut run, "lee", &kim).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidState {
                current: RunStatus::Submitted
            }
        ));

        // only the pending approver (or an admin) may decide
        let err = approve(&mut run, None, &kim).unwrap_err();
        assert!(matches!(err, WorkflowError::PermissionDenied { .. }));

        let status = approve(&mut run, Some("good".to_string()), &manager("lee")).unwrap();
        // single-step chain cascades straight to done
        assert_eq!(status, RunStatus::Done);
        let step = &run.approvals[0];
        assert_eq!(step.decision, Decision::Approved);
        assert!(step.decided_at.is_some());
        assert_eq!(step.comment.as_deref(), Some("good"));
    }

    #[test]
    fn test_reject_resubmit_keeps_history() {
        let mut run = draft_run();
        let kim = inspector("kim");

        submit(&mut run, "lee", &kim).unwrap();
        let status = reject(&mut run, Some("incomplete".to_string()), &manager("lee")).unwrap();
        assert_eq!(status, RunStatus::Rejected);

        // rejected runs are editable again
        let id = run.items[0].id.clone();
        apply_item_patches(
            &mut run,
            &[ItemPatch {
                id,
                result: Some(ItemResult::Compliant),
                note: None,
            }],
            &kim,
        )
        .unwrap();

        submit(&mut run, "lee", &kim).unwrap();
        assert_eq!(run.status, RunStatus::Submitted);

        // two chains in history, each restarting at step 1, exactly one pending
        assert_eq!(run.approvals.len(), 2);
        assert_eq!(run.approvals[0].step_no, 1);
        assert_eq!(run.approvals[0].decision, Decision::Rejected);
        assert_eq!(run.approvals[1].step_no, 1);
        assert_eq!(run.approvals[1].decision, Decision::Pending);
        assert_eq!(
            run.approvals
                .iter()
                .filter(|s| s.decision == Decision::Pending)
                .count(),
            1
        );
    }

    #[test]
    fn test_decide_without_pending_step_is_denied() {
        let mut run = draft_run();
        // force the inconsistent shape: submitted but no steps
        run.status = RunStatus::Submitted;

        let err = approve(&mut run, None, &admin("root")).unwrap_err();
        assert!(matches!(err, WorkflowError::PermissionDenied { .. }));

        run.status = RunStatus::Draft;
        let err = reject(&mut run, None, &admin("root")).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn test_attach_photo_rules() {
        let mut run = draft_run();
        let kim = inspector("kim");
        let id = run.items[0].id.clone();

        attach_photo(&mut run, &id, "photos/7f3a.jpg", &kim).unwrap();
        assert_eq!(run.items[0].photo.as_deref(), Some("photos/7f3a.jpg"));

        // replace, never append
        attach_photo(&mut run, &id, "photos/900b.jpg", &kim).unwrap();
        assert_eq!(run.items[0].photo.as_deref(), Some("photos/900b.jpg"));

        let err = attach_photo(&mut run, "missing", "x.jpg", &kim).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));

        // submitted runs accept no photos at all
        submit(&mut run, "lee", &kim).unwrap();
        let err = attach_photo(&mut run, &id, "x.jpg", &kim).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));

        // finalized runs: admin only
        approve(&mut run, None, &manager("lee")).unwrap();
        assert_eq!(run.status, RunStatus::Done);
        let err = attach_photo(&mut run, &id, "late.jpg", &kim).unwrap_err();
        assert!(matches!(err, WorkflowError::PermissionDenied { .. }));
        attach_photo(&mut run, &id, "late.jpg", &admin("root")).unwrap();
        assert_eq!(run.items[0].photo.as_deref(), Some("late.jpg"));
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut run = draft_run();
        cancel(&mut run, &inspector("kim")).unwrap();
        assert_eq!(run.status, RunStatus::Canceled);

        let err = submit(&mut run, "lee", &inspector("kim")).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState { .. }));
    }

    #[test]
    fn test_submit_requires_approver() {
        let mut run = draft_run();
        let err = submit(&mut run, "  ", &inspector("kim")).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidArgument(_)));
        assert_eq!(run.status, RunStatus::Draft);
        assert!(run.approvals.is_empty());
    }
}
