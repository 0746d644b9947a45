use std::collections::BTreeSet;

use tracing::debug;

use crate::error::SelectionError;
use crate::model::{ParticipantId, TopicId};
use crate::registry::{Contributor, ContributorRegistry};

/// Topics that may currently be picked for review.
///
/// Returns `None` if the assignment has no topics at all. Only topics of contributors
/// that submitted something and whose topic is in a reviewable stage are considered, and of
/// those only the ones with at most `review_topic_threshold` more reviews than the least
/// reviewed contributor.
#[must_use]
pub fn candidate_topics_to_review(registry: &ContributorRegistry<'_>) -> Option<BTreeSet<TopicId>> {
    if !registry.assignment().has_topics() {
        return None;
    }
    Some(least_reviewed_topics(registry, registry.contributors().iter()))
}

/// Like [`candidate_topics_to_review`] but leaves out the reviewer's own work and work the
/// reviewer already reviews, so every returned topic has something left for this reviewer.
pub fn candidate_topics_for_reviewer(
    registry: &ContributorRegistry<'_>,
    reviewer: ParticipantId,
) -> Result<Option<BTreeSet<TopicId>>, SelectionError> {
    let participant = registry.participant(reviewer)?;
    if !registry.assignment().has_topics() {
        return Ok(None);
    }
    let contributors = registry.contributors().iter().filter(|contributor| {
        !contributor.includes(participant.user) && !registry.has_reviewed(reviewer, contributor.id)
    });
    Ok(Some(least_reviewed_topics(registry, contributors)))
}

fn least_reviewed_topics<'c>(
    registry: &ContributorRegistry<'_>,
    contributors: impl Iterator<Item = &'c Contributor>,
) -> BTreeSet<TopicId> {
    let snapshot = registry.snapshot();
    let reviewable: Vec<(&Contributor, TopicId)> = contributors
        .filter(|contributor| contributor.has_submissions)
        .filter_map(|contributor| Some((contributor, contributor.signed_up_topic?)))
        .filter(|&(_, topic)| !snapshot.stage_of(topic).closed_for_review())
        .collect();

    let min_reviews = reviewable
        .iter()
        .map(|(contributor, _)| contributor.received_review_count)
        .min()
        .unwrap_or(0);
    let max_reviews = min_reviews + registry.assignment().review_topic_threshold;

    let topics: BTreeSet<TopicId> = reviewable
        .into_iter()
        .filter(|(contributor, _)| contributor.received_review_count <= max_reviews)
        .map(|(_, topic)| topic)
        .collect();
    debug!(min_reviews, max_reviews, topics = topics.len(), "candidate topics");
    topics
}
