// sample data for running without a fixture file, shaped like a small course with one team
// project and one individual essay.

use peer_review_allocation_engine::model::{
    Assignment, AssignmentId, ContributorId, Participant, ParticipantId, ReviewStrategy, SignUp,
    Stage, Team, TeamId, TopicId, UserId,
};
use peer_review_allocation_engine::store::{Fixture, TopicStage};

pub const TEAM_PROJECT: AssignmentId = AssignmentId(1);
pub const ESSAY: AssignmentId = AssignmentId(2);

fn participants(first: u64, users: impl IntoIterator<Item = u64>) -> Vec<Participant> {
    users
        .into_iter()
        .enumerate()
        .map(|(offset, user)| Participant {
            id: ParticipantId(first + offset as u64),
            user: UserId(user),
            has_submissions: true,
        })
        .collect()
}

#[must_use]
pub fn team_project() -> Fixture {
    let mut fixture = Fixture::new(Assignment {
        id: TEAM_PROJECT,
        team_assignment: true,
        topics: vec![TopicId(1), TopicId(2), TopicId(3)],
        review_topic_threshold: 1,
        review_strategy: ReviewStrategy::AutoSelected,
    });
    fixture.participants = participants(1, 1..=10);
    fixture.teams = (1..=5)
        .map(|team| Team {
            id: TeamId(team),
            members: vec![UserId(team * 2 - 1), UserId(team * 2)],
            // team 4 never handed anything in
            has_submissions: team != 4,
        })
        .collect();
    fixture.sign_ups = vec![
        (1, 1, false),
        (2, 1, false),
        (3, 2, false),
        (4, 2, false),
        (5, 3, false),
        (5, 1, true),
    ]
    .into_iter()
    .map(|(team, topic, waitlisted)| SignUp {
        topic: TopicId(topic),
        contributor: ContributorId::Team(TeamId(team)),
        waitlisted,
    })
    .collect();
    fixture.topic_stages = vec![
        TopicStage {
            topic: TopicId(1),
            stage: Stage::Review,
        },
        TopicStage {
            topic: TopicId(2),
            stage: Stage::Review,
        },
        // topic 3 got an extended submission deadline
        TopicStage {
            topic: TopicId(3),
            stage: Stage::Submission,
        },
    ];
    fixture.stage = Some(Stage::Review);
    fixture
}

#[must_use]
pub fn essay() -> Fixture {
    let mut fixture = Fixture::new(Assignment {
        id: ESSAY,
        team_assignment: false,
        topics: Vec::new(),
        review_topic_threshold: 0,
        review_strategy: ReviewStrategy::AutoSelected,
    });
    fixture.participants = participants(11, 1..=6);
    fixture.stage = Some(Stage::Review);
    fixture
}

#[must_use]
pub fn fixtures() -> Vec<Fixture> {
    vec![team_project(), essay()]
}
