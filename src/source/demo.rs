// Demo source: an in-memory speaker catalog with simulated latency
//
// Lets the shell run without a backend. Filtering is a case-insensitive
// substring match on name and job, which is close enough to what the real
// API does for the list to behave the same way.
//
// Run with: SEARCHLIST_DEMO=1 cargo run

use super::{FetchError, ListSource};
use crate::model::{Page, Speaker};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

/// How many speakers the "latest" list contains
const LATEST_COUNT: usize = 5;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Linus", "Barbara", "Ken", "Margaret", "Dennis", "Frances", "Alan", "Radia",
    "Bjarne", "Hedy", "Guido", "Katherine", "Niklaus", "Sophie",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Torvalds", "Liskov", "Thompson", "Hamilton", "Ritchie", "Allen",
    "Turing", "Perlman", "Stroustrup", "Lamarr", "van Rossum", "Johnson", "Wirth", "Wilson",
];

const JOBS: &[&str] = &[
    "iOS Developer",
    "Backend Engineer",
    "Engineering Manager",
    "Designer",
    "Compiler Engineer",
    "Developer Advocate",
];

/// In-memory list source for demos and tests
pub struct DemoSource {
    catalog: Vec<Speaker>,
    latency: Duration,
}

impl DemoSource {
    pub fn new(catalog: Vec<Speaker>, latency: Duration) -> Self {
        Self { catalog, latency }
    }

    /// Build a deterministic catalog of `count` speakers
    pub fn generated(count: usize, latency: Duration) -> Self {
        let catalog = (0..count)
            .map(|i| Speaker {
                id: i as u64 + 1,
                name: format!(
                    "{} {}",
                    FIRST_NAMES[i % FIRST_NAMES.len()],
                    LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()]
                ),
                job: Some(JOBS[i % JOBS.len()].to_string()),
                avatar_url: None,
            })
            .collect();

        Self::new(catalog, latency)
    }

    fn matches(speaker: &Speaker, needle: &str) -> bool {
        needle.is_empty()
            || speaker.name.to_lowercase().contains(needle)
            || speaker
                .job
                .as_deref()
                .is_some_and(|job| job.to_lowercase().contains(needle))
    }
}

#[async_trait]
impl ListSource<Speaker> for DemoSource {
    async fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
        query: &str,
    ) -> Result<Page<Speaker>, FetchError> {
        sleep(self.latency).await;

        if page == 0 || page_size == 0 {
            return Err(FetchError::Status {
                status: 400,
                message: format!("invalid page {} / size {}", page, page_size),
            });
        }

        let needle = query.trim().to_lowercase();
        let matching: Vec<&Speaker> = self
            .catalog
            .iter()
            .filter(|s| Self::matches(s, &needle))
            .collect();

        let size = page_size as usize;
        let page_count = matching.len().div_ceil(size) as u32;
        let elements = matching
            .into_iter()
            .skip((page as usize - 1) * size)
            .take(size)
            .cloned()
            .collect();

        Ok(Page::new(elements, page, page_count))
    }

    async fn fetch_latest(&self) -> Result<Vec<Speaker>, FetchError> {
        sleep(self.latency).await;
        Ok(self.catalog.iter().rev().take(LATEST_COUNT).cloned().collect())
    }
}
