//! Repository discovery using the GitHub REST API.
//!
//! Repositories come from two sources: every repository of the configured organizations
//! (paginated listing) and explicitly named "owner/name" repositories (one lookup each).

mod error;
mod repository;

pub use error::DiscoveryError;
pub use repository::DiscoveredRepository;

use crate::rate_limit::ensure_core_rate_limit;
use crate::repository::split_slug;
use futures::stream::{self, StreamExt, TryStreamExt};
use octocrab::models::Repository;
use octocrab::Octocrab;
use std::collections::HashSet;
use tracing::{debug, info, info_span, warn, Instrument};

/// Results per page for repository listings.
const RESULTS_PER_PAGE: u8 = 100;

/// Maximum concurrent lookups of explicitly named repositories.
const LOOKUP_CONCURRENCY: usize = 4;

/// Discovers every configured repository.
///
/// Organizations are listed first, in the given order, followed by the explicitly named
/// repositories. Duplicates (by full name) keep their first position.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if any listing or lookup fails. No partial results are
/// returned.
pub async fn discover_repositories(
    octocrab: &Octocrab,
    organizations: &[String],
    repositories: &[String],
) -> Result<Vec<DiscoveredRepository>, DiscoveryError> {
    let mut discovered = Vec::new();

    for organization in organizations {
        discovered.extend(list_organization_repositories(octocrab, organization).await?);
    }

    let explicit: Vec<DiscoveredRepository> = stream::iter(repositories)
        .map(|slug| get_repository(octocrab, slug))
        .buffered(LOOKUP_CONCURRENCY)
        .try_collect()
        .await?;
    discovered.extend(explicit);

    let discovered = deduplicate(discovered);
    let archived = discovered.iter().filter(|r| r.archived).count();
    debug!(archived, "Archived repositories are crawled as well");
    info!(count = discovered.len(), "Discovery complete");

    Ok(discovered)
}

/// Lists all repositories of an organization, following pagination.
///
/// # Errors
///
/// Returns [`DiscoveryError::GitHubError`] if a page cannot be fetched.
pub async fn list_organization_repositories(
    octocrab: &Octocrab,
    organization: &str,
) -> Result<Vec<DiscoveredRepository>, DiscoveryError> {
    let span = info_span!("list_org", org = %organization);

    async {
        info!("Listing organization repositories");
        check_rate_limit(octocrab).await;

        let mut page = octocrab
            .orgs(organization)
            .list_repos()
            .per_page(RESULTS_PER_PAGE)
            .send()
            .await?;

        let mut repositories: Vec<DiscoveredRepository> =
            page.take_items().into_iter().map(Into::into).collect();

        while let Some(mut next_page) = octocrab.get_page::<Repository>(&page.next).await? {
            check_rate_limit(octocrab).await;
            repositories.extend(next_page.take_items().into_iter().map(DiscoveredRepository::from));
            page.next = next_page.next;
            debug!(count = repositories.len(), "Fetched repository page");
        }

        info!(count = repositories.len(), "Listed organization repositories");
        Ok(repositories)
    }
    .instrument(span)
    .await
}

/// Looks up a single repository by "owner/name".
///
/// # Errors
///
/// Returns [`DiscoveryError::InvalidSlug`] for a malformed name and
/// [`DiscoveryError::GitHubError`] if the lookup fails.
pub async fn get_repository(
    octocrab: &Octocrab,
    slug: &str,
) -> Result<DiscoveredRepository, DiscoveryError> {
    let (owner, name) = split_slug(slug).ok_or_else(|| DiscoveryError::InvalidSlug {
        slug: slug.to_string(),
    })?;
    debug!(repo = slug, "Looking up repository");
    let repository = octocrab.repos(owner, name).get().await?;
    Ok(repository.into())
}

/// Applies the name filter and the result limit.
///
/// `name_filter` keeps repositories whose name contains it (case-sensitive). The limit is
/// applied after filtering and keeps discovery order.
#[must_use]
pub fn select_repositories(
    repositories: Vec<DiscoveredRepository>,
    name_filter: Option<&str>,
    limit: Option<usize>,
) -> Vec<DiscoveredRepository> {
    let filtered = repositories
        .into_iter()
        .filter(|repo| match name_filter {
            Some(needle) if !needle.is_empty() => repo.name.contains(needle),
            _ => true,
        });

    match limit {
        Some(limit) => filtered.take(limit).collect(),
        None => filtered.collect(),
    }
}

/// Removes repeated repositories, keeping the first occurrence.
fn deduplicate(repositories: Vec<DiscoveredRepository>) -> Vec<DiscoveredRepository> {
    let mut seen = HashSet::new();
    repositories
        .into_iter()
        .filter(|repo| seen.insert(repo.full_name.clone()))
        .collect()
}

/// Waits for the core rate limit to reset if it is nearly exhausted.
///
/// A failing rate limit query is logged and otherwise ignored; the listing call that
/// follows will surface any real API problem.
async fn check_rate_limit(octocrab: &Octocrab) {
    if let Err(e) = ensure_core_rate_limit(octocrab).await {
        warn!(error = %e, "Failed to check rate limit");
    }
}
