//! Uniform view over the two kinds of contributors.
//!
//! Team assignments are reviewed per team, individual assignments per participant.
//! The counters on [`Contributor`] are derived from the snapshot's mappings when the
//! registry is built and stay fixed for the rest of the matching call.

use std::collections::{HashMap, HashSet};

use crate::error::SelectionError;
use crate::model::{
    Assignment, ContributorId, CreationToken, Participant, ParticipantId, ReviewMapping,
    ReviewMappingId, TopicId, UserId,
};
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub id: ContributorId,
    members: Vec<UserId>,
    pub has_submissions: bool,
    pub signed_up_topic: Option<TopicId>,
    /// review mappings targeting this contributor, answered or not
    pub received_review_count: usize,
    /// review mappings targeting this contributor that have a response
    pub response_count: usize,
    /// token of the most recent review mapping targeting this contributor
    pub last_review_token: Option<CreationToken>,
}

impl Contributor {
    #[must_use]
    pub fn includes(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MetareviewStats {
    count: usize,
    last_token: Option<CreationToken>,
}

pub struct ContributorRegistry<'a> {
    snapshot: &'a Snapshot,
    contributors: Vec<Contributor>,
    reviewed: HashSet<(ParticipantId, ContributorId)>,
    metareviews: HashMap<ReviewMappingId, MetareviewStats>,
    metareviewed: HashSet<(ParticipantId, ReviewMappingId)>,
}

impl<'a> ContributorRegistry<'a> {
    #[must_use]
    pub fn new(snapshot: &'a Snapshot) -> Self {
        let signed_up: HashMap<ContributorId, TopicId> = snapshot
            .sign_ups
            .iter()
            .filter(|sign_up| !sign_up.waitlisted)
            .rev()
            .map(|sign_up| (sign_up.contributor, sign_up.topic))
            .collect();

        let mut contributors: Vec<Contributor> = if snapshot.assignment.team_assignment {
            snapshot
                .teams
                .iter()
                .map(|team| Contributor {
                    id: ContributorId::Team(team.id),
                    members: team.members.clone(),
                    has_submissions: team.has_submissions,
                    signed_up_topic: None,
                    received_review_count: 0,
                    response_count: 0,
                    last_review_token: None,
                })
                .collect()
        } else {
            snapshot
                .participants
                .iter()
                .map(|participant| Contributor {
                    id: ContributorId::Participant(participant.id),
                    members: vec![participant.user],
                    has_submissions: participant.has_submissions,
                    signed_up_topic: None,
                    received_review_count: 0,
                    response_count: 0,
                    last_review_token: None,
                })
                .collect()
        };

        let index: HashMap<ContributorId, usize> = contributors
            .iter()
            .enumerate()
            .map(|(position, contributor)| (contributor.id, position))
            .collect();
        for contributor in &mut contributors {
            contributor.signed_up_topic = signed_up.get(&contributor.id).copied();
        }
        for mapping in &snapshot.review_mappings {
            if let Some(&position) = index.get(&mapping.reviewee) {
                let contributor = &mut contributors[position];
                contributor.received_review_count += 1;
                if mapping.is_answered() {
                    contributor.response_count += 1;
                }
                contributor.last_review_token =
                    contributor.last_review_token.max(Some(mapping.token));
            }
        }

        let reviewed = snapshot
            .review_mappings
            .iter()
            .map(|mapping| (mapping.reviewer, mapping.reviewee))
            .collect();

        let mut metareviews: HashMap<ReviewMappingId, MetareviewStats> = HashMap::new();
        for mapping in &snapshot.metareview_mappings {
            let stats = metareviews.entry(mapping.review).or_default();
            stats.count += 1;
            stats.last_token = stats.last_token.max(Some(mapping.token));
        }
        let metareviewed = snapshot
            .metareview_mappings
            .iter()
            .map(|mapping| (mapping.metareviewer, mapping.review))
            .collect();

        Self {
            snapshot,
            contributors,
            reviewed,
            metareviews,
            metareviewed,
        }
    }

    #[must_use]
    pub const fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    #[must_use]
    pub const fn assignment(&self) -> &'a Assignment {
        &self.snapshot.assignment
    }

    #[must_use]
    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    #[must_use]
    pub fn get(&self, id: ContributorId) -> Option<&Contributor> {
        self.contributors
            .iter()
            .find(|contributor| contributor.id == id)
    }

    pub fn participant(&self, id: ParticipantId) -> Result<&'a Participant, SelectionError> {
        self.snapshot
            .participant(id)
            .ok_or(SelectionError::UnknownParticipant(id))
    }

    /// The contributor whose work the participant submits, if any.
    #[must_use]
    pub fn own_contributor(&self, participant: &Participant) -> Option<&Contributor> {
        self.contributors
            .iter()
            .find(|contributor| contributor.includes(participant.user))
    }

    #[must_use]
    pub fn has_reviewed(&self, reviewer: ParticipantId, contributor: ContributorId) -> bool {
        self.reviewed.contains(&(reviewer, contributor))
    }

    #[must_use]
    pub fn review_mappings(&self) -> &'a [ReviewMapping] {
        &self.snapshot.review_mappings
    }

    #[must_use]
    pub fn metareview_count(&self, review: ReviewMappingId) -> usize {
        self.metareviews
            .get(&review)
            .map_or(0, |stats| stats.count)
    }

    #[must_use]
    pub fn last_metareview_token(&self, review: ReviewMappingId) -> Option<CreationToken> {
        self.metareviews
            .get(&review)
            .and_then(|stats| stats.last_token)
    }

    #[must_use]
    pub fn has_metareviewed(&self, metareviewer: ParticipantId, review: ReviewMappingId) -> bool {
        self.metareviewed.contains(&(metareviewer, review))
    }
}
