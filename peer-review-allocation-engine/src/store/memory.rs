//! In-memory implementation of the store traits.
//!
//! All data is lost when the store is dropped. Used by the tests and by the cli.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::{AssignmentStore, MappingRecorder, Result, StageOracle};
use crate::error::StoreError;
use crate::model::{
    Assignment, AssignmentId, ContributorId, CreationToken, MetareviewMapping,
    MetareviewMappingId, Participant, ParticipantId, ResponseId, ReviewMapping, ReviewMappingId,
    SignUp, Stage, StageTarget, Team, TopicId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicStage {
    pub topic: TopicId,
    pub stage: Stage,
}

/// Everything stored for one assignment. Also the json format the cli reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub assignment: Assignment,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub sign_ups: Vec<SignUp>,
    #[serde(default)]
    pub review_mappings: Vec<ReviewMapping>,
    #[serde(default)]
    pub metareview_mappings: Vec<MetareviewMapping>,
    #[serde(default)]
    pub topic_stages: Vec<TopicStage>,
    #[serde(default)]
    pub stage: Option<Stage>,
}

impl Fixture {
    #[must_use]
    pub const fn new(assignment: Assignment) -> Self {
        Self {
            assignment,
            participants: Vec::new(),
            teams: Vec::new(),
            sign_ups: Vec::new(),
            review_mappings: Vec::new(),
            metareview_mappings: Vec::new(),
            topic_stages: Vec::new(),
            stage: None,
        }
    }
}

#[derive(Debug, Default)]
struct Tables {
    assignments: HashMap<AssignmentId, Fixture>,
    stages: HashMap<StageTarget, Stage>,
    next_token: u64,
    next_review_id: u64,
    next_metareview_id: u64,
    next_response_id: u64,
}

impl Tables {
    fn get(&self, id: AssignmentId) -> Result<&Fixture> {
        self.assignments
            .get(&id)
            .ok_or(StoreError::AssignmentNotFound(id))
    }

    fn get_mut(&mut self, id: AssignmentId) -> Result<&mut Fixture> {
        self.assignments
            .get_mut(&id)
            .ok_or(StoreError::AssignmentNotFound(id))
    }

    fn issue_token(&mut self) -> CreationToken {
        let token = CreationToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Counters continue after whatever the fixture brought along.
    fn absorb(&mut self, fixture: &Fixture) {
        let review_tokens = fixture.review_mappings.iter().map(|mapping| mapping.token.0);
        let metareview_tokens = fixture
            .metareview_mappings
            .iter()
            .map(|mapping| mapping.token.0);
        if let Some(max) = review_tokens.chain(metareview_tokens).max() {
            self.next_token = self.next_token.max(max.saturating_add(1));
        }
        if let Some(max) = fixture.review_mappings.iter().map(|m| m.id.0).max() {
            self.next_review_id = self.next_review_id.max(max.saturating_add(1));
        }
        if let Some(max) = fixture.metareview_mappings.iter().map(|m| m.id.0).max() {
            self.next_metareview_id = self.next_metareview_id.max(max.saturating_add(1));
        }
        if let Some(max) = fixture
            .review_mappings
            .iter()
            .filter_map(|m| m.response.map(|response| response.0))
            .max()
        {
            self.next_response_id = self.next_response_id.max(max.saturating_add(1));
        }
        for topic_stage in &fixture.topic_stages {
            self.stages
                .insert(StageTarget::Topic(topic_stage.topic), topic_stage.stage);
        }
        if let Some(stage) = fixture.stage {
            self.stages
                .insert(StageTarget::Assignment(fixture.assignment.id), stage);
        }
    }
}

/// Stores assignments in a `HashMap` protected by a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_fixtures(fixtures: impl IntoIterator<Item = Fixture>) -> Self {
        let mut tables = Tables::default();
        for fixture in fixtures {
            tables.absorb(&fixture);
            tables.assignments.insert(fixture.assignment.id, fixture);
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Attaches a fresh response to the review mapping, i.e. the reviewer finished the review.
    pub async fn submit_response(
        &self,
        assignment: AssignmentId,
        mapping: ReviewMappingId,
    ) -> Result<ResponseId> {
        let mut tables = self.tables.write().await;
        let response = ResponseId(tables.next_response_id);
        let review = tables
            .get_mut(assignment)?
            .review_mappings
            .iter_mut()
            .find(|review| review.id == mapping)
            .ok_or(StoreError::ReviewMappingNotFound(mapping))?;
        review.response = Some(response);
        tables.next_response_id += 1;
        debug!(%assignment, %mapping, %response, "response submitted");
        Ok(response)
    }

    pub async fn set_stage(&self, target: StageTarget, stage: Stage) {
        self.tables.write().await.stages.insert(target, stage);
    }

    /// Copy of everything currently stored for the assignment.
    pub async fn fixture(&self, id: AssignmentId) -> Result<Fixture> {
        self.tables.read().await.get(id).cloned()
    }
}

#[async_trait]
impl AssignmentStore for MemoryStore {
    async fn assignment(&self, id: AssignmentId) -> Result<Assignment> {
        Ok(self.tables.read().await.get(id)?.assignment.clone())
    }

    async fn participants(&self, id: AssignmentId) -> Result<Vec<Participant>> {
        Ok(self.tables.read().await.get(id)?.participants.clone())
    }

    async fn teams(&self, id: AssignmentId) -> Result<Vec<Team>> {
        Ok(self.tables.read().await.get(id)?.teams.clone())
    }

    async fn sign_ups(&self, id: AssignmentId) -> Result<Vec<SignUp>> {
        Ok(self.tables.read().await.get(id)?.sign_ups.clone())
    }

    async fn review_mappings(&self, id: AssignmentId) -> Result<Vec<ReviewMapping>> {
        let mut mappings = self.tables.read().await.get(id)?.review_mappings.clone();
        mappings.sort_by_key(|mapping| mapping.token);
        Ok(mappings)
    }

    async fn metareview_mappings(&self, id: AssignmentId) -> Result<Vec<MetareviewMapping>> {
        let mut mappings = self.tables.read().await.get(id)?.metareview_mappings.clone();
        mappings.sort_by_key(|mapping| mapping.token);
        Ok(mappings)
    }
}

#[async_trait]
impl StageOracle for MemoryStore {
    async fn stage_of(&self, target: StageTarget) -> Result<Stage> {
        Ok(self
            .tables
            .read()
            .await
            .stages
            .get(&target)
            .copied()
            .unwrap_or(Stage::Unknown))
    }
}

#[async_trait]
impl MappingRecorder for MemoryStore {
    async fn record_review(
        &self,
        assignment: AssignmentId,
        reviewer: ParticipantId,
        reviewee: ContributorId,
    ) -> Result<ReviewMapping> {
        let mut tables = self.tables.write().await;
        if tables
            .get(assignment)?
            .review_mappings
            .iter()
            .any(|mapping| mapping.reviewer == reviewer && mapping.reviewee == reviewee)
        {
            return Err(StoreError::DuplicateReview { reviewer, reviewee });
        }
        let mapping = ReviewMapping {
            id: ReviewMappingId(tables.next_review_id),
            reviewer,
            reviewee,
            token: tables.issue_token(),
            response: None,
        };
        tables.next_review_id += 1;
        tables
            .get_mut(assignment)?
            .review_mappings
            .push(mapping.clone());
        Ok(mapping)
    }

    async fn record_metareview(
        &self,
        assignment: AssignmentId,
        metareviewer: ParticipantId,
        review: ReviewMappingId,
    ) -> Result<MetareviewMapping> {
        let mut tables = self.tables.write().await;
        let fixture = tables.get(assignment)?;
        if !fixture
            .review_mappings
            .iter()
            .any(|mapping| mapping.id == review)
        {
            return Err(StoreError::ReviewMappingNotFound(review));
        }
        if fixture
            .metareview_mappings
            .iter()
            .any(|mapping| mapping.metareviewer == metareviewer && mapping.review == review)
        {
            return Err(StoreError::DuplicateMetareview {
                metareviewer,
                review,
            });
        }
        let mapping = MetareviewMapping {
            id: MetareviewMappingId(tables.next_metareview_id),
            metareviewer,
            review,
            token: tables.issue_token(),
        };
        tables.next_metareview_id += 1;
        tables
            .get_mut(assignment)?
            .metareview_mappings
            .push(mapping.clone());
        Ok(mapping)
    }
}
