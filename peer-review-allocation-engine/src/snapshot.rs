use std::collections::HashMap;

use tracing::debug;

use crate::model::{
    Assignment, AssignmentId, MetareviewMapping, Participant, ParticipantId, ReviewMapping,
    SignUp, Stage, StageTarget, Team, TopicId,
};
use crate::store::{AssignmentStore, Result, StageOracle};

/// Everything one matching call looks at, read once at the start of the call.
///
/// The pipelines never go back to the store, so all counters they derive are
/// consistent with each other even if the store changes meanwhile.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub assignment: Assignment,
    pub participants: Vec<Participant>,
    pub teams: Vec<Team>,
    pub sign_ups: Vec<SignUp>,
    /// sorted by creation token
    pub review_mappings: Vec<ReviewMapping>,
    /// sorted by creation token
    pub metareview_mappings: Vec<MetareviewMapping>,
    pub topic_stages: HashMap<TopicId, Stage>,
}

impl Snapshot {
    #[tracing::instrument(skip(store, oracle))]
    pub async fn capture<S, O>(store: &S, oracle: &O, assignment: AssignmentId) -> Result<Self>
    where
        S: AssignmentStore + ?Sized,
        O: StageOracle + ?Sized,
    {
        let assignment = store.assignment(assignment).await?;
        let participants = store.participants(assignment.id).await?;
        let teams = store.teams(assignment.id).await?;
        let sign_ups = store.sign_ups(assignment.id).await?;
        let review_mappings = store.review_mappings(assignment.id).await?;
        let metareview_mappings = store.metareview_mappings(assignment.id).await?;

        let mut topic_stages = HashMap::with_capacity(assignment.topics.len());
        for &topic in &assignment.topics {
            topic_stages.insert(topic, oracle.stage_of(StageTarget::Topic(topic)).await?);
        }

        debug!(
            participants = participants.len(),
            teams = teams.len(),
            reviews = review_mappings.len(),
            metareviews = metareview_mappings.len(),
            "captured snapshot"
        );

        Ok(Self::new(
            assignment,
            participants,
            teams,
            sign_ups,
            review_mappings,
            metareview_mappings,
            topic_stages,
        ))
    }

    /// Puts the mappings into creation order, the stores are not required to.
    #[must_use]
    pub fn new(
        assignment: Assignment,
        participants: Vec<Participant>,
        teams: Vec<Team>,
        sign_ups: Vec<SignUp>,
        mut review_mappings: Vec<ReviewMapping>,
        mut metareview_mappings: Vec<MetareviewMapping>,
        topic_stages: HashMap<TopicId, Stage>,
    ) -> Self {
        review_mappings.sort_by_key(|mapping| mapping.token);
        metareview_mappings.sort_by_key(|mapping| mapping.token);
        Self {
            assignment,
            participants,
            teams,
            sign_ups,
            review_mappings,
            metareview_mappings,
            topic_stages,
        }
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.id == id)
    }

    /// Topics the oracle did not know about count as [`Stage::Unknown`].
    #[must_use]
    pub fn stage_of(&self, topic: TopicId) -> Stage {
        self.topic_stages
            .get(&topic)
            .copied()
            .unwrap_or(Stage::Unknown)
    }
}
