// these mirror rows of the course database. ids are only unique within their own kind,
// so every kind gets its own newtype.

use core::fmt::{self, Display};

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            )]
            #[serde(transparent)]
            pub struct $name(pub u64);

            impl Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    Display::fmt(&self.0, f)
                }
            }
        )*
    };
}

id_type!(
    AssignmentId,
    ParticipantId,
    TeamId,
    UserId,
    TopicId,
    ReviewMappingId,
    MetareviewMappingId,
    ResponseId,
);

/// Issued by the store whenever a mapping is created. A mapping created later
/// always carries a greater token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreationToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStrategy {
    InstructorSelected,
    StudentSelected,
    AutoSelected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub team_assignment: bool,
    #[serde(default)]
    pub topics: Vec<TopicId>,
    /// How many reviews above the least reviewed contributor a topic may be and
    /// still be offered for review.
    #[serde(default)]
    pub review_topic_threshold: usize,
    pub review_strategy: ReviewStrategy,
}

impl Assignment {
    #[must_use]
    pub fn has_topics(&self) -> bool {
        !self.topics.is_empty()
    }
}

/// A user taking part in one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub user: UserId,
    #[serde(default)]
    pub has_submissions: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub members: Vec<UserId>,
    #[serde(default)]
    pub has_submissions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributorId {
    Participant(ParticipantId),
    Team(TeamId),
}

impl Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Participant(id) => write!(f, "participant {id}"),
            Self::Team(id) => write!(f, "team {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUp {
    pub topic: TopicId,
    pub contributor: ContributorId,
    /// waitlisted contributors are not working on the topic (yet)
    #[serde(default)]
    pub waitlisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMapping {
    pub id: ReviewMappingId,
    pub reviewer: ParticipantId,
    pub reviewee: ContributorId,
    pub token: CreationToken,
    #[serde(default)]
    pub response: Option<ResponseId>,
}

impl ReviewMapping {
    #[must_use]
    pub const fn is_answered(&self) -> bool {
        self.response.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetareviewMapping {
    pub id: MetareviewMappingId,
    pub metareviewer: ParticipantId,
    pub review: ReviewMappingId,
    pub token: CreationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Submission,
    Review,
    Rereview,
    Metareview,
    Complete,
    Unknown,
}

impl Stage {
    /// Topics in these stages are not offered for review anymore (or not yet).
    #[must_use]
    pub const fn closed_for_review(self) -> bool {
        matches!(self, Self::Submission | Self::Complete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageTarget {
    Topic(TopicId),
    Assignment(AssignmentId),
}
