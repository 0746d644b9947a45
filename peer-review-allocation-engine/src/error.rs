use thiserror::Error;

use crate::model::{
    AssignmentId, ContributorId, ParticipantId, ReviewMappingId, ReviewStrategy, TopicId,
};

/// How a caller is expected to react to a failed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The request itself does not fit the assignment (topic given where none is expected and
    /// the other way around).
    Configuration,
    /// There is nothing to review or metareview at all.
    NoEligibleTarget,
    /// There is something left, but this reviewer has already covered all of it.
    ExhaustedByReviewer,
    /// The topic was eligible when it was shown, but isn't anymore. Retrying with another
    /// topic usually works.
    StaleCandidate,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("this assignment has topics, please select a topic to review")]
    NoTopicSelected,
    #[error("this assignment has no topics, but topic {0} was selected")]
    TopicNotApplicable(TopicId),
    #[error("too many reviews have been done on topic {0}, please select another topic")]
    TopicOverloaded(TopicId),
    #[error("there are no more submissions to review")]
    NoSubmissionsToReview,
    #[error("you have already reviewed all submissions that are available")]
    AlreadyReviewedAll,
    #[error("there are no reviews to metareview yet")]
    NoReviewsYet,
    #[error("there are no more reviews to metareview")]
    NoMoreReviewsToMetareview,
    #[error("you have already metareviewed all reviews that are available")]
    AlreadyMetareviewedAll,
    #[error("participant {0} does not take part in this assignment")]
    UnknownParticipant(ParticipantId),
}

impl SelectionError {
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::NoTopicSelected | Self::TopicNotApplicable(_) | Self::UnknownParticipant(_) => {
                FailureKind::Configuration
            }
            Self::NoSubmissionsToReview | Self::NoReviewsYet | Self::NoMoreReviewsToMetareview => {
                FailureKind::NoEligibleTarget
            }
            Self::AlreadyReviewedAll | Self::AlreadyMetareviewedAll => {
                FailureKind::ExhaustedByReviewer
            }
            Self::TopicOverloaded(_) => FailureKind::StaleCandidate,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("assignment {0} not found")]
    AssignmentNotFound(AssignmentId),
    #[error("review mapping {0} not found")]
    ReviewMappingNotFound(ReviewMappingId),
    #[error("participant {reviewer} is already reviewing {reviewee}")]
    DuplicateReview {
        reviewer: ParticipantId,
        reviewee: ContributorId,
    },
    #[error("participant {metareviewer} is already metareviewing review {review}")]
    DuplicateMetareview {
        metareviewer: ParticipantId,
        review: ReviewMappingId,
    },
    #[error("storage backend failed {0}")]
    Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("{0}")]
    Selection(#[from] SelectionError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("you cannot do more than {limit} reviews based on assignment policy")]
    ReviewLimitReached { limit: usize },
    #[error("you cannot do more reviews when you have {outstanding} reviews to do")]
    OutstandingReviews { outstanding: usize },
    #[error("reviews of this assignment are assigned {0:?}, not dynamically")]
    StrategyNotDynamic(ReviewStrategy),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_selection_failure_has_a_kind() {
        let cases = [
            (SelectionError::NoTopicSelected, FailureKind::Configuration),
            (
                SelectionError::TopicNotApplicable(TopicId(1)),
                FailureKind::Configuration,
            ),
            (
                SelectionError::TopicOverloaded(TopicId(1)),
                FailureKind::StaleCandidate,
            ),
            (
                SelectionError::NoSubmissionsToReview,
                FailureKind::NoEligibleTarget,
            ),
            (
                SelectionError::AlreadyReviewedAll,
                FailureKind::ExhaustedByReviewer,
            ),
            (SelectionError::NoReviewsYet, FailureKind::NoEligibleTarget),
            (
                SelectionError::NoMoreReviewsToMetareview,
                FailureKind::NoEligibleTarget,
            ),
            (
                SelectionError::AlreadyMetareviewedAll,
                FailureKind::ExhaustedByReviewer,
            ),
        ];
        for (error, kind) in cases {
            assert_eq!(error.kind(), kind, "{error}");
        }
    }

    #[test]
    fn allocation_error_keeps_selection_message() {
        let error = AllocationError::from(SelectionError::AlreadyReviewedAll);
        assert_eq!(
            error.to_string(),
            "you have already reviewed all submissions that are available"
        );
    }
}
