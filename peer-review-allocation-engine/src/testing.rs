//! Terse construction of snapshots for the unit tests.
//!
//! Participant `n` always belongs to user `n`. Contributor ids given to the builder refer to
//! participants in individual assignments and to teams in team assignments.

use std::collections::HashMap;

use crate::model::{
    Assignment, AssignmentId, ContributorId, CreationToken, MetareviewMapping,
    MetareviewMappingId, Participant, ParticipantId, ResponseId, ReviewMapping, ReviewMappingId,
    ReviewStrategy, SignUp, Stage, Team, TeamId, TopicId, UserId,
};
use crate::snapshot::Snapshot;

pub struct SnapshotBuilder {
    assignment: Assignment,
    participants: Vec<Participant>,
    teams: Vec<Team>,
    sign_ups: Vec<SignUp>,
    review_mappings: Vec<ReviewMapping>,
    metareview_mappings: Vec<MetareviewMapping>,
    topic_stages: HashMap<TopicId, Stage>,
    next_token: u64,
    next_response: u64,
}

impl SnapshotBuilder {
    fn new(team_assignment: bool) -> Self {
        Self {
            assignment: Assignment {
                id: AssignmentId(1),
                team_assignment,
                topics: Vec::new(),
                review_topic_threshold: 0,
                review_strategy: ReviewStrategy::AutoSelected,
            },
            participants: Vec::new(),
            teams: Vec::new(),
            sign_ups: Vec::new(),
            review_mappings: Vec::new(),
            metareview_mappings: Vec::new(),
            topic_stages: HashMap::new(),
            next_token: 1,
            next_response: 1,
        }
    }

    pub fn individual() -> Self {
        Self::new(false)
    }

    pub fn teams() -> Self {
        Self::new(true)
    }

    pub const fn contributor(&self, id: u64) -> ContributorId {
        if self.assignment.team_assignment {
            ContributorId::Team(TeamId(id))
        } else {
            ContributorId::Participant(ParticipantId(id))
        }
    }

    /// Topics start out in the review stage.
    pub fn topics(mut self, topics: &[u64]) -> Self {
        for &topic in topics {
            self.assignment.topics.push(TopicId(topic));
            self.topic_stages.insert(TopicId(topic), Stage::Review);
        }
        self
    }

    pub fn threshold(mut self, threshold: usize) -> Self {
        self.assignment.review_topic_threshold = threshold;
        self
    }

    pub fn participants(mut self, count: u64) -> Self {
        for id in 1..=count {
            self.participants.push(Participant {
                id: ParticipantId(id),
                user: UserId(id),
                has_submissions: true,
            });
        }
        self
    }

    pub fn team(mut self, id: u64, participants: &[u64]) -> Self {
        self.teams.push(Team {
            id: TeamId(id),
            members: participants.iter().map(|&user| UserId(user)).collect(),
            has_submissions: true,
        });
        self
    }

    pub fn without_submissions(mut self, contributor: u64) -> Self {
        match self.contributor(contributor) {
            ContributorId::Participant(id) => self
                .participants
                .iter_mut()
                .filter(|participant| participant.id == id)
                .for_each(|participant| participant.has_submissions = false),
            ContributorId::Team(id) => self
                .teams
                .iter_mut()
                .filter(|team| team.id == id)
                .for_each(|team| team.has_submissions = false),
        }
        self
    }

    pub fn sign_up(mut self, contributor: u64, topic: u64) -> Self {
        self.sign_ups.push(SignUp {
            topic: TopicId(topic),
            contributor: self.contributor(contributor),
            waitlisted: false,
        });
        self
    }

    pub fn waitlisted(mut self, contributor: u64, topic: u64) -> Self {
        self.sign_ups.push(SignUp {
            topic: TopicId(topic),
            contributor: self.contributor(contributor),
            waitlisted: true,
        });
        self
    }

    pub fn stage(mut self, topic: u64, stage: Stage) -> Self {
        self.topic_stages.insert(TopicId(topic), stage);
        self
    }

    /// Review mapping ids are handed out in order starting at 1.
    pub fn review(mut self, reviewer: u64, reviewee: u64, answered: bool) -> Self {
        let response = answered.then(|| {
            let response = ResponseId(self.next_response);
            self.next_response += 1;
            response
        });
        let mapping = ReviewMapping {
            id: ReviewMappingId(self.review_mappings.len() as u64 + 1),
            reviewer: ParticipantId(reviewer),
            reviewee: self.contributor(reviewee),
            token: self.token(),
            response,
        };
        self.review_mappings.push(mapping);
        self
    }

    pub fn metareview(mut self, metareviewer: u64, review: u64) -> Self {
        let mapping = MetareviewMapping {
            id: MetareviewMappingId(self.metareview_mappings.len() as u64 + 1),
            metareviewer: ParticipantId(metareviewer),
            review: ReviewMappingId(review),
            token: self.token(),
        };
        self.metareview_mappings.push(mapping);
        self
    }

    fn token(&mut self) -> CreationToken {
        let token = CreationToken(self.next_token);
        self.next_token += 1;
        token
    }

    pub fn build(self) -> Snapshot {
        Snapshot::new(
            self.assignment,
            self.participants,
            self.teams,
            self.sign_ups,
            self.review_mappings,
            self.metareview_mappings,
            self.topic_stages,
        )
    }
}
