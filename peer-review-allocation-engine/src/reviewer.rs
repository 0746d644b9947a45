use rand::seq::SliceRandom as _;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::SelectionError;
use crate::model::{ParticipantId, TopicId};
use crate::registry::{Contributor, ContributorRegistry};
use crate::topics::candidate_topics_to_review;

/// All contributors the reviewer could be assigned next, ordered longest waiting first
/// once everybody has received at least one response.
pub fn eligible_contributors<'r>(
    registry: &'r ContributorRegistry<'_>,
    reviewer: ParticipantId,
    topic: Option<TopicId>,
) -> Result<Vec<&'r Contributor>, SelectionError> {
    check_topic(registry, topic)?;
    let participant = registry.participant(reviewer)?;

    let submitted: Vec<&Contributor> = registry
        .contributors()
        .iter()
        .filter(|contributor| contributor.signed_up_topic == topic)
        .filter(|contributor| !contributor.includes(participant.user))
        .filter(|contributor| contributor.has_submissions)
        .collect();
    debug!(count = submitted.len(), "contributors with submissions");
    if submitted.is_empty() {
        return Err(SelectionError::NoSubmissionsToReview);
    }

    let mut candidates: Vec<&Contributor> = submitted
        .into_iter()
        .filter(|contributor| !registry.has_reviewed(reviewer, contributor.id))
        .collect();
    debug!(count = candidates.len(), "contributors not reviewed yet");
    if candidates.is_empty() {
        return Err(SelectionError::AlreadyReviewedAll);
    }

    // balance by completed reviews, not by assigned ones
    let min_responses = candidates
        .iter()
        .map(|contributor| contributor.response_count)
        .min()
        .unwrap_or(0);
    candidates.retain(|contributor| contributor.response_count == min_responses);
    if min_responses > 0 {
        candidates.sort_by_key(|contributor| contributor.last_review_token);
    }
    debug!(min_responses, count = candidates.len(), "least reviewed contributors");

    Ok(candidates)
}

/// Picks the contributor the reviewer should review next.
///
/// The pick is uniform over all of [`eligible_contributors`]; their order does not
/// influence it.
pub fn contributor_to_review<'r, R: Rng + ?Sized>(
    registry: &'r ContributorRegistry<'_>,
    reviewer: ParticipantId,
    topic: Option<TopicId>,
    rng: &mut R,
) -> Result<&'r Contributor, SelectionError> {
    let selected = eligible_contributors(registry, reviewer, topic)
        .and_then(|candidates| {
            candidates
                .choose(rng)
                .copied()
                .ok_or(SelectionError::AlreadyReviewedAll)
        })
        .inspect_err(|error| warn!(%reviewer, ?topic, %error, "no contributor to review"))?;
    info!(%reviewer, contributor = %selected.id, "selected contributor to review");
    Ok(selected)
}

fn check_topic(
    registry: &ContributorRegistry<'_>,
    topic: Option<TopicId>,
) -> Result<(), SelectionError> {
    match (candidate_topics_to_review(registry), topic) {
        (Some(_), None) => Err(SelectionError::NoTopicSelected),
        (None, Some(topic)) => Err(SelectionError::TopicNotApplicable(topic)),
        (Some(candidates), Some(topic)) if !candidates.contains(&topic) => {
            Err(SelectionError::TopicOverloaded(topic))
        }
        _ => Ok(()),
    }
}
