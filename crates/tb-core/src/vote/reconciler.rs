//! Vote state machine
//!
//! Voting the same way twice withdraws the vote; voting the other way
//! switches it. The reconciler only computes the outcome. Persisting the vote
//! record and the counters is the caller's job, as two separate writes.

use super::model::{VoteDelta, VoteKind, VoteState};

/// Outcome of a vote request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    pub next: VoteState,
    pub delta: VoteDelta,
}

/// Compute the next vote state and the counter adjustment
pub fn reconcile(current: VoteState, requested: VoteKind) -> Reconciliation {
    let (next, up, down) = match (current, requested) {
        (VoteState::None, VoteKind::Upvote) => (VoteState::Upvoted, 1, 0),
        (VoteState::None, VoteKind::Downvote) => (VoteState::Downvoted, 0, 1),
        (VoteState::Upvoted, VoteKind::Upvote) => (VoteState::None, -1, 0),
        (VoteState::Upvoted, VoteKind::Downvote) => (VoteState::Downvoted, -1, 1),
        (VoteState::Downvoted, VoteKind::Downvote) => (VoteState::None, 0, -1),
        (VoteState::Downvoted, VoteKind::Upvote) => (VoteState::Upvoted, 1, -1),
    };
    Reconciliation {
        next,
        delta: VoteDelta::new(up, down),
    }
}

/// Write needed on the vote record to move from one state to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteWrite {
    Insert(VoteKind),
    Update(VoteKind),
    Delete,
}

impl VoteWrite {
    /// `None` when both states are equal
    pub fn between(current: VoteState, next: VoteState) -> Option<VoteWrite> {
        match (current.kind(), next.kind()) {
            (None, None) => None,
            (None, Some(kind)) => Some(VoteWrite::Insert(kind)),
            (Some(_), None) => Some(VoteWrite::Delete),
            (Some(old), Some(new)) if old == new => None,
            (Some(_), Some(new)) => Some(VoteWrite::Update(new)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STATES: [VoteState; 3] = [VoteState::None, VoteState::Upvoted, VoteState::Downvoted];
    const ACTIONS: [VoteKind; 2] = [VoteKind::Upvote, VoteKind::Downvote];

    #[test]
    fn test_transition_table() {
        let table = [
            (VoteState::None, VoteKind::Upvote, VoteState::Upvoted, (1, 0)),
            (VoteState::None, VoteKind::Downvote, VoteState::Downvoted, (0, 1)),
            (VoteState::Upvoted, VoteKind::Upvote, VoteState::None, (-1, 0)),
            (VoteState::Upvoted, VoteKind::Downvote, VoteState::Downvoted, (-1, 1)),
            (VoteState::Downvoted, VoteKind::Downvote, VoteState::None, (0, -1)),
            (VoteState::Downvoted, VoteKind::Upvote, VoteState::Upvoted, (1, -1)),
        ];
        for (current, requested, next, (up, down)) in table {
            assert_eq!(
                reconcile(current, requested),
                Reconciliation {
                    next,
                    delta: VoteDelta::new(up, down)
                },
                "{:?} + {:?}",
                current,
                requested
            );
        }
    }

    #[test]
    fn test_switch_from_upvote_to_downvote() {
        let result = reconcile(VoteState::Upvoted, VoteKind::Downvote);
        assert_eq!(result.next, VoteState::Downvoted);
        assert_eq!(result.delta, VoteDelta::new(-1, 1));
    }

    #[test]
    fn test_same_action_twice_returns_to_none() {
        for action in ACTIONS {
            let first = reconcile(VoteState::None, action);
            let second = reconcile(first.next, action);
            assert_eq!(second.next, VoteState::None);
            assert!(first.delta.combine(second.delta).is_zero());
        }
    }

    #[test]
    fn test_delta_fields_never_share_sign() {
        for state in STATES {
            for action in ACTIONS {
                let d = reconcile(state, action).delta;
                assert!((-1..=1).contains(&d.upvotes) && (-1..=1).contains(&d.downvotes));
                assert!(d.upvotes * d.downvotes <= 0);
                assert!(!d.is_zero());
            }
        }
    }

    #[test]
    fn test_delta_matches_state_difference() {
        // Applying a delta must move the user's own contribution from current to next
        let contribution = |s: VoteState| match s {
            VoteState::None => (0, 0),
            VoteState::Upvoted => (1, 0),
            VoteState::Downvoted => (0, 1),
        };
        for state in STATES {
            for action in ACTIONS {
                let r = reconcile(state, action);
                let (u0, d0) = contribution(state);
                let (u1, d1) = contribution(r.next);
                assert_eq!(r.delta, VoteDelta::new(u1 - u0, d1 - d0));
            }
        }
    }

    #[test]
    fn test_vote_write_between() {
        assert_eq!(
            VoteWrite::between(VoteState::None, VoteState::Upvoted),
            Some(VoteWrite::Insert(VoteKind::Upvote))
        );
        assert_eq!(
            VoteWrite::between(VoteState::Upvoted, VoteState::Downvoted),
            Some(VoteWrite::Update(VoteKind::Downvote))
        );
        assert_eq!(
            VoteWrite::between(VoteState::Downvoted, VoteState::None),
            Some(VoteWrite::Delete)
        );
        assert_eq!(VoteWrite::between(VoteState::Upvoted, VoteState::Upvoted), None);
        assert_eq!(VoteWrite::between(VoteState::None, VoteState::None), None);
    }
}
