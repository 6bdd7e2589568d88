//! Audience collection - gather users from comment sections of discovered targets

use remark_foundation::{ContentActionService, Error, Result, Target};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Users gathered for a keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudienceReport {
    pub keyword: String,
    /// Targets whose comment sections were read
    pub targets_scanned: usize,
    /// Unique user handles, in the order first seen
    pub users: Vec<String>,
}

/// Collect up to `limit` unique commenters from targets matching `keyword`.
///
/// Targets are read in discovery order. A comment section that fails to load
/// is skipped; an unavailable service ends collection with an error.
pub async fn collect_audience(
    service: &dyn ContentActionService,
    keyword: &str,
    limit: usize,
) -> Result<AudienceReport> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(Error::InvalidInput("keyword must not be empty".to_string()));
    }
    if limit == 0 {
        return Err(Error::InvalidInput("user limit must be positive".to_string()));
    }

    let targets: Vec<Target> = service.discover(keyword).await?;
    info!(keyword, targets = targets.len(), limit, "Collecting audience");

    let mut seen = HashSet::new();
    let mut users = Vec::new();
    let mut targets_scanned = 0;

    for target in &targets {
        if users.len() >= limit {
            break;
        }

        let handles = match service.commenters(target, limit - users.len()).await {
            Ok(handles) => handles,
            Err(e) if e.is_unavailable() => return Err(e.into()),
            Err(e) => {
                warn!(%target, error = %e, "Skipping comment section");
                continue;
            }
        };
        targets_scanned += 1;

        for handle in handles {
            if users.len() >= limit {
                break;
            }
            if seen.insert(handle.clone()) {
                users.push(handle);
            }
        }
    }

    Ok(AudienceReport {
        keyword: keyword.to_string(),
        targets_scanned,
        users,
    })
}
