mod error;
mod examples;

use std::path::Path;
use std::sync::Arc;

use peer_review_allocation_config::{get_config, PolicyConfig};
use peer_review_allocation_engine::model::{AssignmentId, ParticipantId};
use peer_review_allocation_engine::registry::ContributorRegistry;
use peer_review_allocation_engine::snapshot::Snapshot;
use peer_review_allocation_engine::store::{Fixture, MemoryStore};
use peer_review_allocation_engine::{AllocationError, Allocator, ReviewPolicy};
use peer_review_allocation_telemetry::setup_logging;
use rand::rngs::StdRng;
use rand::SeedableRng as _;
use tracing::{info, warn};

use crate::error::CliError;

type MemoryAllocator = Allocator<Arc<MemoryStore>, Arc<MemoryStore>, StdRng>;

const fn policy(config: &PolicyConfig) -> ReviewPolicy {
    ReviewPolicy {
        max_reviews_per_reviewer: config.max_reviews_per_reviewer,
        max_outstanding_reviews: config.max_outstanding_reviews,
        require_auto_selected: config.require_auto_selected,
    }
}

async fn load_fixtures(path: &Path) -> Result<Vec<Fixture>, CliError> {
    let content = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&content)?)
}

/// Selection failures are expected once reviewers run out of work, everything else aborts.
fn expected<T>(result: Result<T, AllocationError>) -> Result<Option<T>, AllocationError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AllocationError::Selection(error)) => {
            warn!(kind = ?error.kind(), "{error}");
            Ok(None)
        }
        Err(
            error @ (AllocationError::ReviewLimitReached { .. }
            | AllocationError::OutstandingReviews { .. }
            | AllocationError::StrategyNotDynamic(_)),
        ) => {
            warn!("{error}");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

async fn review_round(
    allocator: &MemoryAllocator,
    assignment: AssignmentId,
    reviewers: &[ParticipantId],
) -> Result<(), AllocationError> {
    let shown = allocator.candidate_topics(assignment).await?;
    info!(%assignment, ?shown, "topics open for review");

    for &reviewer in reviewers {
        let topics = match allocator.candidate_topics_for(assignment, reviewer).await {
            Ok(Some(topics)) => topics.into_iter().map(Some).collect(),
            Ok(None) => vec![None],
            Err(error) => {
                expected::<()>(Err(error))?;
                continue;
            }
        };
        // the reviewer would pick from the list, take the first one that works
        for topic in topics {
            let result = allocator.assign_reviewer(assignment, reviewer, topic).await;
            if let Some(mapping) = expected(result)? {
                allocator
                    .store()
                    .submit_response(assignment, mapping.id)
                    .await?;
                break;
            }
        }
    }
    Ok(())
}

async fn metareview_round(
    allocator: &MemoryAllocator,
    assignment: AssignmentId,
    metareviewers: &[ParticipantId],
) -> Result<(), AllocationError> {
    for &metareviewer in metareviewers {
        expected(
            allocator
                .assign_metareviewer(assignment, metareviewer)
                .await,
        )?;
    }
    Ok(())
}

async fn summary(allocator: &MemoryAllocator, assignment: AssignmentId) -> Result<(), CliError> {
    let store = allocator.store();
    let snapshot = Snapshot::capture(&**store, &**store, assignment)
        .await
        .map_err(AllocationError::from)?;
    let registry = ContributorRegistry::new(&snapshot);
    for contributor in registry.contributors() {
        info!(
            %assignment,
            contributor = %contributor.id,
            topic = ?contributor.signed_up_topic,
            reviews = contributor.received_review_count,
            responses = contributor.response_count,
            "review load"
        );
    }
    info!(
        %assignment,
        metareviews = snapshot.metareview_mappings.len(),
        "metareview load"
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    let config = get_config()?;
    setup_logging(Some(&config.log_filter))?;

    let fixtures = match &config.fixture {
        Some(path) => load_fixtures(path).await?,
        None => examples::course::fixtures(),
    };
    let rng = config
        .rng_seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let store = Arc::new(MemoryStore::from_fixtures(fixtures.iter().cloned()));
    let allocator = Allocator::new(Arc::clone(&store), store, rng, policy(&config.policy));

    for fixture in &fixtures {
        let assignment = fixture.assignment.id;
        let participants: Vec<ParticipantId> = fixture
            .participants
            .iter()
            .map(|participant| participant.id)
            .collect();
        info!(%assignment, participants = participants.len(), "allocating");

        // two rounds so the second one sees the responses of the first
        review_round(&allocator, assignment, &participants).await?;
        review_round(&allocator, assignment, &participants).await?;
        metareview_round(&allocator, assignment, &participants).await?;
        summary(&allocator, assignment).await?;
    }
    Ok(())
}
