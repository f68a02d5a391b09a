//! # Admission Quorum
//!
//! Pure commit decision for a candidate block. With `n` replicas (every
//! active participant except the proposer), the ledger tolerates
//! `f = floor(n / 3)` faulty replicas and needs `q = 2f + 1` acceptances.
//! Timeouts count as rejections.

use std::collections::BTreeSet;

use serde::Serialize;
use unichain_core::ParticipantId;

use crate::replica::ReplicaResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionQuorum {
    replicas: usize,
}

/// Tally of one admission round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuorumOutcome {
    pub accepted: usize,
    pub rejected: usize,
    pub timed_out: usize,
    pub required: usize,
}

impl QuorumOutcome {
    pub fn is_committed(&self) -> bool {
        self.accepted >= self.required
    }
}

impl AdmissionQuorum {
    pub fn new(replicas: usize) -> Self {
        Self { replicas }
    }

    /// Quorum for a round where `proposer` proposes to `participants`.
    pub fn for_round(participants: &BTreeSet<ParticipantId>, proposer: &ParticipantId) -> Self {
        Self::new(participants.iter().filter(|p| *p != proposer).count())
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// `f`: tolerated faulty replicas.
    pub fn fault_tolerance(&self) -> usize {
        self.replicas / 3
    }

    /// `q = 2f + 1`.
    pub fn required(&self) -> usize {
        2 * self.fault_tolerance() + 1
    }

    pub fn decide(&self, responses: &[ReplicaResponse]) -> QuorumOutcome {
        let count = |r: ReplicaResponse| responses.iter().filter(|x| **x == r).count();
        QuorumOutcome {
            accepted: count(ReplicaResponse::Accept),
            rejected: count(ReplicaResponse::Reject),
            timed_out: count(ReplicaResponse::Timeout),
            required: self.required(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ReplicaResponse::{Accept, Reject, Timeout};

    fn ids(names: &[&str]) -> BTreeSet<ParticipantId> {
        names.iter().map(|n| ParticipantId::new(*n).unwrap()).collect()
    }

    #[test]
    fn four_participants_need_three_accepts() {
        let participants = ids(&["a", "b", "c", "d"]);
        let q = AdmissionQuorum::for_round(&participants, &ParticipantId::new("a").unwrap());
        assert_eq!(q.replicas(), 3);
        assert_eq!(q.fault_tolerance(), 1);
        assert_eq!(q.required(), 3);

        assert!(q.decide(&[Accept, Accept, Accept]).is_committed());
        assert!(!q.decide(&[Accept, Accept, Reject]).is_committed());
        let outcome = q.decide(&[Accept, Timeout, Accept]);
        assert!(!outcome.is_committed());
        assert_eq!(outcome.timed_out, 1);
    }

    #[test]
    fn required_grows_with_replicas() {
        let table = [(0, 1), (1, 1), (2, 1), (3, 3), (5, 3), (6, 5), (7, 5), (9, 7), (10, 7)];
        for (n, q) in table {
            assert_eq!(AdmissionQuorum::new(n).required(), q, "n={n}");
        }
    }

    #[test]
    fn lone_participant_cannot_commit() {
        let q = AdmissionQuorum::for_round(&ids(&["solo"]), &ParticipantId::new("solo").unwrap());
        assert_eq!(q.replicas(), 0);
        assert!(!q.decide(&[]).is_committed());
    }

    #[test]
    fn proposer_outside_participant_set() {
        let q = AdmissionQuorum::for_round(&ids(&["b", "c"]), &ParticipantId::new("a").unwrap());
        assert_eq!(q.replicas(), 2);
        assert_eq!(q.required(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn all_accept_commits_iff_enough_replicas(n in 0usize..64) {
            let q = AdmissionQuorum::new(n);
            let outcome = q.decide(&vec![ReplicaResponse::Accept; n]);
            prop_assert_eq!(outcome.is_committed(), n >= 1);
        }

        #[test]
        fn tally_covers_every_response(
            responses in prop::collection::vec(
                prop_oneof![
                    Just(ReplicaResponse::Accept),
                    Just(ReplicaResponse::Reject),
                    Just(ReplicaResponse::Timeout),
                ],
                0..32,
            )
        ) {
            let outcome = AdmissionQuorum::new(responses.len()).decide(&responses);
            prop_assert_eq!(outcome.accepted + outcome.rejected + outcome.timed_out, responses.len());
        }
    }
}
