use crate::detection::Detection;
use crate::store::{Capture, SnapshotStore, StoreError};
use crate::types::ChangeVerdict;

/// Whether the change revealed by a detection was communicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// No notification was attempted (no change to report).
    NotAttempted,
    Delivered,
    Failed,
}

/// Which captures of a detection are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetentionPlan {
    pub delete_prior: bool,
    pub delete_pending: bool,
    pub delete_new: bool,
    /// Put an overwritten baseline back into its bucket.
    pub restore_baseline: bool,
}

impl RetentionPlan {
    /// Decide retention from a verdict and the notification outcome.
    ///
    /// A capture that revealed a change is only ever removed once that change
    /// has been delivered; on failure everything is kept.
    pub fn decide(verdict: &ChangeVerdict, outcome: NotifyOutcome) -> Self {
        match (verdict, outcome) {
            (ChangeVerdict::NoPriorCapture, _) => RetentionPlan::default(),
            (ChangeVerdict::Unchanged, _) => RetentionPlan {
                delete_new: true,
                ..RetentionPlan::default()
            },
            (ChangeVerdict::Changed(_), NotifyOutcome::Delivered) => RetentionPlan {
                delete_prior: true,
                delete_pending: true,
                ..RetentionPlan::default()
            },
            (ChangeVerdict::Changed(_), _) => RetentionPlan {
                restore_baseline: true,
                ..RetentionPlan::default()
            },
        }
    }

    pub fn deletes_nothing(&self) -> bool {
        !(self.delete_prior || self.delete_pending || self.delete_new)
    }
}

/// Apply retention to a detection. Returns the removed captures.
///
/// A new capture written over the baseline's bucket is the baseline, so it is
/// never deleted; if its change was not delivered, the baseline content is
/// restored so the next run reproduces the same comparison.
///
/// Deletion is best effort and not rolled back: the first storage error is
/// returned and earlier removals stand.
pub fn apply(
    store: &SnapshotStore,
    detection: &Detection,
    outcome: NotifyOutcome,
) -> Result<Vec<Capture>, StoreError> {
    let plan = RetentionPlan::decide(&detection.verdict, outcome);
    tracing::debug!(?plan, ?outcome, "applying retention");

    let mut doomed: Vec<&Capture> = Vec::new();
    if plan.delete_prior {
        doomed.extend(detection.prior.iter());
    }
    if plan.delete_pending {
        doomed.extend(detection.pending.iter());
    }
    if plan.delete_new && !detection.reuses_baseline() {
        doomed.push(&detection.capture);
    }

    if plan.restore_baseline {
        if let Some(baseline) = &detection.replaced {
            store.restore_content(&detection.capture, baseline)?;
        }
    }

    let mut deleted = Vec::with_capacity(doomed.len());
    for capture in doomed {
        store.delete(capture)?;
        deleted.push(capture.clone());
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_prior_keeps_everything() {
        let plan = RetentionPlan::decide(&ChangeVerdict::NoPriorCapture, NotifyOutcome::NotAttempted);
        assert_eq!(plan, RetentionPlan::default());
    }

    #[test]
    fn unchanged_drops_only_the_new_capture() {
        let plan = RetentionPlan::decide(&ChangeVerdict::Unchanged, NotifyOutcome::NotAttempted);
        assert_eq!(
            plan,
            RetentionPlan {
                delete_prior: false,
                delete_pending: false,
                delete_new: true,
                restore_baseline: false,
            }
        );
    }

    #[test]
    fn delivered_change_settles_on_new_capture() {
        let verdict = ChangeVerdict::Changed("- a\n+ b".into());
        let plan = RetentionPlan::decide(&verdict, NotifyOutcome::Delivered);
        assert!(plan.delete_prior);
        assert!(plan.delete_pending);
        assert!(!plan.delete_new);
        assert!(!plan.restore_baseline);
    }

    #[test]
    fn failed_change_keeps_evidence() {
        let verdict = ChangeVerdict::Changed("- a\n+ b".into());
        for outcome in [NotifyOutcome::Failed, NotifyOutcome::NotAttempted] {
            let plan = RetentionPlan::decide(&verdict, outcome);
            assert!(plan.deletes_nothing());
            assert!(plan.restore_baseline);
        }
    }
}
