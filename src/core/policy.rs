//! Permission policy - pure predicates over (actor, run)
//!
//! No side effects; callers must re-check immediately before every mutating
//! call because a run's status can change between a read and a write.

use crate::core::team::Member;
use crate::entities::run::{Run, RunStatus};

/// Whether the actor counts as site management
pub fn is_manager(actor: &Member) -> bool {
    actor.admin || actor.roles.iter().any(|r| r.is_elevated())
}

/// Whether the actor may create inspection runs
///
/// An explicit capability flag wins; otherwise management may create.
pub fn can_create_run(actor: &Member) -> bool {
    match actor.can_create_runs {
        Some(explicit) => explicit,
        None => is_manager(actor),
    }
}

/// Whether the actor may edit the run's items and notes
pub fn can_edit(actor: &Member, run: &Run) -> bool {
    run.status.is_editable()
        && (actor.admin || actor.name.eq_ignore_ascii_case(&run.inspector))
}

/// Whether the actor may decide the run's current pending approval step
pub fn can_decide(actor: &Member, run: &Run) -> bool {
    if run.status != RunStatus::Submitted {
        return false;
    }
    match run.pending_step() {
        Some(step) => actor.admin || actor.name.eq_ignore_ascii_case(&step.approver),
        None => false,
    }
}
