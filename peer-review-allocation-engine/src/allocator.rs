//! Serializes "select, then record" per assignment.
//!
//! The pipelines themselves are pure. Two reviewers asking at the same time could otherwise
//! both be handed a target based on the same counters, so every assignment gets its own lock
//! that is held from capturing the snapshot until the new mapping is recorded.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use rand::Rng;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use crate::error::AllocationError;
use crate::metareviewer::response_map_to_metareview;
use crate::model::{
    AssignmentId, MetareviewMapping, ParticipantId, ReviewMapping, ReviewStrategy, TopicId,
};
use crate::registry::ContributorRegistry;
use crate::reviewer::contributor_to_review;
use crate::snapshot::Snapshot;
use crate::store::{AssignmentStore, MappingRecorder, StageOracle};
use crate::topics::{candidate_topics_for_reviewer, candidate_topics_to_review};

pub type Result<T> = core::result::Result<T, AllocationError>;

/// Limits checked before a reviewer gets another review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewPolicy {
    pub max_reviews_per_reviewer: Option<usize>,
    /// reviews that were assigned but not answered yet
    pub max_outstanding_reviews: Option<usize>,
    pub require_auto_selected: bool,
}

impl ReviewPolicy {
    fn check(&self, registry: &ContributorRegistry<'_>, reviewer: ParticipantId) -> Result<()> {
        let strategy = registry.assignment().review_strategy;
        if self.require_auto_selected && strategy != ReviewStrategy::AutoSelected {
            return Err(AllocationError::StrategyNotDynamic(strategy));
        }

        let (assigned, outstanding) = registry
            .review_mappings()
            .iter()
            .filter(|mapping| mapping.reviewer == reviewer)
            .fold((0, 0), |(assigned, outstanding), mapping| {
                (
                    assigned + 1,
                    outstanding + usize::from(!mapping.is_answered()),
                )
            });
        if let Some(limit) = self.max_reviews_per_reviewer {
            if assigned >= limit {
                return Err(AllocationError::ReviewLimitReached { limit });
            }
        }
        if let Some(limit) = self.max_outstanding_reviews {
            if outstanding >= limit {
                return Err(AllocationError::OutstandingReviews { outstanding });
            }
        }
        Ok(())
    }
}

pub struct Allocator<S, O, R> {
    store: S,
    oracle: O,
    rng: Mutex<R>,
    policy: ReviewPolicy,
    locks: Mutex<HashMap<AssignmentId, Arc<Mutex<()>>>>,
}

impl<S, O, R> Allocator<S, O, R>
where
    S: AssignmentStore + MappingRecorder,
    O: StageOracle,
    R: Rng + Send,
{
    pub fn new(store: S, oracle: O, rng: R, policy: ReviewPolicy) -> Self {
        Self {
            store,
            oracle,
            rng: Mutex::new(rng),
            policy,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    async fn lock(&self, assignment: AssignmentId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.lock().await.entry(assignment).or_default());
        lock.lock_owned().await
    }

    async fn capture(&self, assignment: AssignmentId) -> Result<Snapshot> {
        Ok(Snapshot::capture(&self.store, &self.oracle, assignment).await?)
    }

    /// Topics that can currently be picked, `None` if the assignment has no topics.
    pub async fn candidate_topics(
        &self,
        assignment: AssignmentId,
    ) -> Result<Option<BTreeSet<TopicId>>> {
        let snapshot = self.capture(assignment).await?;
        Ok(candidate_topics_to_review(&ContributorRegistry::new(
            &snapshot,
        )))
    }

    pub async fn candidate_topics_for(
        &self,
        assignment: AssignmentId,
        reviewer: ParticipantId,
    ) -> Result<Option<BTreeSet<TopicId>>> {
        let snapshot = self.capture(assignment).await?;
        let registry = ContributorRegistry::new(&snapshot);
        Ok(candidate_topics_for_reviewer(&registry, reviewer)?)
    }

    /// Selects the next contributor for the reviewer and records the review mapping.
    #[tracing::instrument(skip(self))]
    pub async fn assign_reviewer(
        &self,
        assignment: AssignmentId,
        reviewer: ParticipantId,
        topic: Option<TopicId>,
    ) -> Result<ReviewMapping> {
        let _guard = self.lock(assignment).await;
        let snapshot = self.capture(assignment).await?;
        let registry = ContributorRegistry::new(&snapshot);
        self.policy
            .check(&registry, reviewer)
            .inspect_err(|error| warn!(%error, "review policy refused assignment"))?;

        let reviewee = {
            let mut rng = self.rng.lock().await;
            contributor_to_review(&registry, reviewer, topic, &mut *rng)?.id
        };
        let mapping = self
            .store
            .record_review(assignment, reviewer, reviewee)
            .await?;
        info!(
            mapping = %mapping.id,
            %reviewee,
            token = mapping.token.0,
            "recorded review mapping"
        );
        Ok(mapping)
    }

    /// Selects the next review for the metareviewer and records the metareview mapping.
    #[tracing::instrument(skip(self))]
    pub async fn assign_metareviewer(
        &self,
        assignment: AssignmentId,
        metareviewer: ParticipantId,
    ) -> Result<MetareviewMapping> {
        let _guard = self.lock(assignment).await;
        let snapshot = self.capture(assignment).await?;
        let registry = ContributorRegistry::new(&snapshot);

        let review = response_map_to_metareview(&registry, metareviewer)?.id;
        let mapping = self
            .store
            .record_metareview(assignment, metareviewer, review)
            .await?;
        info!(
            mapping = %mapping.id,
            %review,
            token = mapping.token.0,
            "recorded metareview mapping"
        );
        Ok(mapping)
    }
}
