//! Where station readings and recycling points come from
//!
//! Every strategy implements [`DataSource`]; configuration decides which
//! one answers and which one steps in when it fails.

pub mod cached;
pub mod estimated;
pub mod fallback;
pub mod live;
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::BoundedCache;
use crate::config::{AmbientalConfig, DataStrategy, FallbackStrategy};
use crate::geo::{Candidate, GeoPoint};
use crate::models::{CityInfo, RecyclingInfo, StationReading};
use crate::upstream::Upstream;

pub use cached::CachedSource;
pub use estimated::EstimatedSource;
pub use fallback::FallbackSource;
pub use live::LiveSource;
pub use mock::MockSource;

/// Candidates together with the name of the source that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset<T> {
    pub source: String,
    pub items: Vec<Candidate<T>>,
}

impl<T> Dataset<T> {
    pub fn new(source: impl Into<String>, items: Vec<Candidate<T>>) -> Self {
        Self {
            source: source.into(),
            items,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    /// City the point belongs to
    async fn locate(&self, point: GeoPoint) -> Result<CityInfo>;

    /// Air quality stations relevant to `point`
    async fn air_stations(
        &self,
        point: GeoPoint,
        city: &CityInfo,
    ) -> Result<Dataset<StationReading>>;

    /// Recycling points around `point`; callers still filter by radius
    async fn recycling_points(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        city: &CityInfo,
    ) -> Result<Dataset<RecyclingInfo>>;
}

fn fallback_source(strategy: FallbackStrategy) -> Option<Box<dyn DataSource>> {
    match strategy {
        FallbackStrategy::Estimated => Some(Box::new(EstimatedSource)),
        FallbackStrategy::Mock => Some(Box::new(MockSource)),
        FallbackStrategy::None => None,
    }
}

/// Compose the configured source chain
pub fn build(config: &AmbientalConfig) -> Result<Arc<dyn DataSource>> {
    let primary: Box<dyn DataSource> = match config.data.strategy {
        DataStrategy::Live => Box::new(LiveSource::new(Upstream::new(&config.upstream)?)),
        DataStrategy::Cached => {
            let cache = BoundedCache::new(
                config.cache.capacity,
                Duration::from_secs(config.cache.ttl_seconds),
            );
            Box::new(CachedSource::new(
                LiveSource::new(Upstream::new(&config.upstream)?),
                Arc::new(cache),
            ))
        }
        DataStrategy::Mock => Box::new(MockSource),
    };

    let source: Arc<dyn DataSource> = match fallback_source(config.data.fallback) {
        Some(fallback) => Arc::new(FallbackSource::new(primary, fallback)),
        None => Arc::from(primary),
    };

    tracing::info!(source = source.name(), "Data source ready");
    Ok(source)
}
