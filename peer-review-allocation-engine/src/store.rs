//! Boundary traits towards persistence and the deadline logic.
//!
//! The engine only ever reads through [`AssignmentStore`] and [`StageOracle`].
//! Writing the selected mapping back goes through [`MappingRecorder`], which is
//! only called by the [`Allocator`](crate::allocator::Allocator) while it holds
//! the assignment's lock.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
pub use memory::{Fixture, MemoryStore, TopicStage};

use crate::error::StoreError;
use crate::model::{
    Assignment, AssignmentId, ContributorId, MetareviewMapping, Participant, ParticipantId,
    ReviewMapping, ReviewMappingId, SignUp, Stage, StageTarget, Team,
};

pub type Result<T> = core::result::Result<T, StoreError>;

/// Read access to everything the matching pipelines look at, scoped to one assignment.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn assignment(&self, id: AssignmentId) -> Result<Assignment>;

    async fn participants(&self, id: AssignmentId) -> Result<Vec<Participant>>;

    async fn teams(&self, id: AssignmentId) -> Result<Vec<Team>>;

    async fn sign_ups(&self, id: AssignmentId) -> Result<Vec<SignUp>>;

    /// All review mappings of the assignment, in creation order.
    async fn review_mappings(&self, id: AssignmentId) -> Result<Vec<ReviewMapping>>;

    /// All metareview mappings of the assignment, in creation order.
    async fn metareview_mappings(&self, id: AssignmentId) -> Result<Vec<MetareviewMapping>>;
}

/// Resolves the current lifecycle stage from deadlines.
#[async_trait]
pub trait StageOracle: Send + Sync {
    async fn stage_of(&self, target: StageTarget) -> Result<Stage>;
}

#[async_trait]
pub trait MappingRecorder: Send + Sync {
    async fn record_review(
        &self,
        assignment: AssignmentId,
        reviewer: ParticipantId,
        reviewee: ContributorId,
    ) -> Result<ReviewMapping>;

    async fn record_metareview(
        &self,
        assignment: AssignmentId,
        metareviewer: ParticipantId,
        review: ReviewMappingId,
    ) -> Result<MetareviewMapping>;
}

#[async_trait]
impl<T: AssignmentStore + ?Sized> AssignmentStore for Arc<T> {
    async fn assignment(&self, id: AssignmentId) -> Result<Assignment> {
        (**self).assignment(id).await
    }

    async fn participants(&self, id: AssignmentId) -> Result<Vec<Participant>> {
        (**self).participants(id).await
    }

    async fn teams(&self, id: AssignmentId) -> Result<Vec<Team>> {
        (**self).teams(id).await
    }

    async fn sign_ups(&self, id: AssignmentId) -> Result<Vec<SignUp>> {
        (**self).sign_ups(id).await
    }

    async fn review_mappings(&self, id: AssignmentId) -> Result<Vec<ReviewMapping>> {
        (**self).review_mappings(id).await
    }

    async fn metareview_mappings(&self, id: AssignmentId) -> Result<Vec<MetareviewMapping>> {
        (**self).metareview_mappings(id).await
    }
}

#[async_trait]
impl<T: StageOracle + ?Sized> StageOracle for Arc<T> {
    async fn stage_of(&self, target: StageTarget) -> Result<Stage> {
        (**self).stage_of(target).await
    }
}

#[async_trait]
impl<T: MappingRecorder + ?Sized> MappingRecorder for Arc<T> {
    async fn record_review(
        &self,
        assignment: AssignmentId,
        reviewer: ParticipantId,
        reviewee: ContributorId,
    ) -> Result<ReviewMapping> {
        (**self)
            .record_review(assignment, reviewer, reviewee)
            .await
    }

    async fn record_metareview(
        &self,
        assignment: AssignmentId,
        metareviewer: ParticipantId,
        review: ReviewMappingId,
    ) -> Result<MetareviewMapping> {
        (**self)
            .record_metareview(assignment, metareviewer, review)
            .await
    }
}
