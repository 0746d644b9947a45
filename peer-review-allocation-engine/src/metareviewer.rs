use std::collections::HashMap;

use itertools::Itertools as _;
use tracing::{debug, info, warn};

use crate::error::SelectionError;
use crate::model::{ContributorId, Participant, ParticipantId, ReviewMapping};
use crate::registry::ContributorRegistry;

/// Answered reviews the metareviewer could be assigned next, best candidate first.
pub fn eligible_review_mappings<'r>(
    registry: &'r ContributorRegistry<'_>,
    metareviewer: ParticipantId,
) -> Result<Vec<&'r ReviewMapping>, SelectionError> {
    let participant = registry.participant(metareviewer)?;

    let answered: Vec<&ReviewMapping> = registry
        .review_mappings()
        .iter()
        .filter(|mapping| mapping.is_answered())
        .collect();
    debug!(count = answered.len(), "answered reviews");
    if answered.is_empty() {
        return Err(SelectionError::NoReviewsYet);
    }

    let uninvolved: Vec<&ReviewMapping> = answered
        .into_iter()
        .filter(|mapping| !is_involved(registry, participant, mapping))
        .collect();
    debug!(count = uninvolved.len(), "reviews the metareviewer is not part of");
    if uninvolved.is_empty() {
        return Err(SelectionError::NoMoreReviewsToMetareview);
    }

    let mut candidates: Vec<&ReviewMapping> = uninvolved
        .into_iter()
        .filter(|mapping| !registry.has_metareviewed(metareviewer, mapping.id))
        .collect();
    debug!(count = candidates.len(), "reviews not metareviewed yet");
    if candidates.is_empty() {
        return Err(SelectionError::AlreadyMetareviewedAll);
    }

    let min_metareviews = least_metareviews(registry, &candidates);
    candidates.retain(|mapping| registry.metareview_count(mapping.id) == min_metareviews);

    // spread the load over reviewers too, not only over their reviews
    let per_reviewer: HashMap<ParticipantId, usize> = registry
        .review_mappings()
        .iter()
        .map(|mapping| (mapping.reviewer, registry.metareview_count(mapping.id)))
        .into_grouping_map()
        .sum();
    let min_per_reviewer = candidates
        .iter()
        .filter_map(|mapping| per_reviewer.get(&mapping.reviewer).copied())
        .min()
        .unwrap_or(0);
    candidates.retain(|mapping| {
        per_reviewer.get(&mapping.reviewer).copied().unwrap_or(0) <= min_per_reviewer
    });

    let min_metareviews = least_metareviews(registry, &candidates);
    if min_metareviews > 0 {
        candidates.sort_by_key(|mapping| registry.last_metareview_token(mapping.id));
    }
    debug!(
        min_metareviews,
        min_per_reviewer,
        count = candidates.len(),
        "least metareviewed reviews"
    );

    Ok(candidates)
}

/// The review the metareviewer should metareview next. Always the same one for the same
/// snapshot.
pub fn response_map_to_metareview<'r>(
    registry: &'r ContributorRegistry<'_>,
    metareviewer: ParticipantId,
) -> Result<&'r ReviewMapping, SelectionError> {
    let selected = eligible_review_mappings(registry, metareviewer)
        .and_then(|candidates| {
            candidates
                .first()
                .copied()
                .ok_or(SelectionError::AlreadyMetareviewedAll)
        })
        .inspect_err(|error| warn!(%metareviewer, %error, "no review to metareview"))?;
    info!(%metareviewer, review = %selected.id, "selected review to metareview");
    Ok(selected)
}

fn least_metareviews(registry: &ContributorRegistry<'_>, candidates: &[&ReviewMapping]) -> usize {
    candidates
        .iter()
        .map(|mapping| registry.metareview_count(mapping.id))
        .min()
        .unwrap_or(0)
}

/// Whether the participant wrote the review or is (part of) the reviewed contributor.
fn is_involved(
    registry: &ContributorRegistry<'_>,
    participant: &Participant,
    mapping: &ReviewMapping,
) -> bool {
    let wrote_review = mapping.reviewer == participant.id
        || registry
            .snapshot()
            .participant(mapping.reviewer)
            .is_some_and(|reviewer| reviewer.user == participant.user);
    let was_reviewed = mapping.reviewee == ContributorId::Participant(participant.id)
        || registry
            .get(mapping.reviewee)
            .is_some_and(|reviewee| reviewee.includes(participant.user));
    wrote_review || was_reviewed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ReviewMappingId;
    use crate::testing::SnapshotBuilder;

    fn review_ids(mappings: &[&ReviewMapping]) -> Vec<ReviewMappingId> {
        mappings.iter().map(|mapping| mapping.id).collect()
    }

    #[test]
    fn unanswered_reviews_cannot_be_metareviewed() {
        let snapshot = SnapshotBuilder::individual()
            .participants(3)
            .review(1, 2, false)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            response_map_to_metareview(&registry, ParticipantId(3)),
            Err(SelectionError::NoReviewsYet)
        );

        let snapshot = SnapshotBuilder::individual()
            .participants(3)
            .review(1, 2, false)
            .review(2, 1, true)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            response_map_to_metareview(&registry, ParticipantId(3)).map(|mapping| mapping.id),
            Ok(ReviewMappingId(2))
        );
    }

    #[test]
    fn own_reviews_are_excluded() {
        let snapshot = SnapshotBuilder::individual()
            .participants(3)
            .review(1, 2, true)
            .review(2, 1, true)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            eligible_review_mappings(&registry, ParticipantId(1)),
            Err(SelectionError::NoMoreReviewsToMetareview)
        );
    }

    #[test]
    fn team_members_do_not_metareview_reviews_of_their_team() {
        let snapshot = SnapshotBuilder::teams()
            .participants(5)
            .team(1, &[1, 2])
            .team(2, &[3, 4])
            .review(5, 1, true)
            .review(1, 2, true)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        // 2 is in team 1, which is reviewed by review 1
        assert_eq!(
            review_ids(&eligible_review_mappings(&registry, ParticipantId(2)).unwrap()),
            vec![ReviewMappingId(2)]
        );
    }

    #[test]
    fn already_metareviewed_all() {
        let snapshot = SnapshotBuilder::individual()
            .participants(4)
            .review(1, 2, true)
            .review(2, 1, true)
            .metareview(4, 1)
            .metareview(4, 2)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            eligible_review_mappings(&registry, ParticipantId(4)),
            Err(SelectionError::AlreadyMetareviewedAll)
        );
    }

    #[test]
    fn least_metareviewed_review_wins() {
        let snapshot = SnapshotBuilder::individual()
            .participants(5)
            .review(1, 2, true)
            .review(2, 3, true)
            .metareview(5, 1)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            response_map_to_metareview(&registry, ParticipantId(4)).map(|mapping| mapping.id),
            Ok(ReviewMappingId(2))
        );
    }

    #[test]
    fn load_is_spread_over_reviewers() {
        let snapshot = SnapshotBuilder::individual()
            .participants(5)
            .review(1, 2, true)
            .review(1, 3, true)
            .review(4, 2, true)
            .metareview(5, 2)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        // reviews 1 and 3 are both unmetareviewed, but reviewer 1 already got one for review 2
        assert_eq!(
            review_ids(&eligible_review_mappings(&registry, ParticipantId(5)).unwrap()),
            vec![ReviewMappingId(3)]
        );
    }

    #[test]
    fn longest_waiting_review_first() {
        let snapshot = SnapshotBuilder::individual()
            .participants(7)
            .review(1, 2, true)
            .review(3, 4, true)
            .metareview(5, 2)
            .metareview(6, 1)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            review_ids(&eligible_review_mappings(&registry, ParticipantId(7)).unwrap()),
            vec![ReviewMappingId(2), ReviewMappingId(1)]
        );
    }

    #[test]
    fn selection_is_deterministic() {
        let snapshot = SnapshotBuilder::individual()
            .participants(6)
            .review(1, 2, true)
            .review(2, 3, true)
            .review(3, 4, true)
            .review(4, 5, true)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        let first = response_map_to_metareview(&registry, ParticipantId(6)).unwrap();
        let second = response_map_to_metareview(&registry, ParticipantId(6)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.id, ReviewMappingId(1));

        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            response_map_to_metareview(&registry, ParticipantId(6)),
            Ok(first)
        );
    }

    #[test]
    fn metareviewer_must_take_part() {
        let snapshot = SnapshotBuilder::individual()
            .participants(2)
            .review(1, 2, true)
            .build();
        let registry = ContributorRegistry::new(&snapshot);
        assert_eq!(
            response_map_to_metareview(&registry, ParticipantId(3)),
            Err(SelectionError::UnknownParticipant(ParticipantId(3)))
        );
    }
}
