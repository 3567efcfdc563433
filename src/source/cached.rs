//! Read-through cache in front of another source
//!
//! Keys use coordinates rounded to two decimals, roughly a kilometer. When
//! the inner source fails, an expired entry for the same key is served.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;

use crate::cache::BoundedCache;
use crate::error::AmbientalError;
use crate::geo::GeoPoint;
use crate::models::{CityInfo, RecyclingInfo, StationReading};
use crate::source::{DataSource, Dataset};

pub struct CachedSource<S> {
    inner: S,
    cache: Arc<BoundedCache>,
    name: String,
}

impl<S: DataSource> CachedSource<S> {
    pub fn new(inner: S, cache: Arc<BoundedCache>) -> Self {
        let name = format!("cached+{}", inner.name());
        Self { inner, cache, name }
    }

    async fn read_through<T, F>(&self, key: String, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Debug,
        F: Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key).await.map_err(cache_error)? {
            return Ok(hit);
        }

        match fetch.await {
            Ok(value) => {
                self.cache.put(&key, &value).await.map_err(cache_error)?;
                Ok(value)
            }
            Err(err) => match self.cache.get_stale::<T>(&key).await.map_err(cache_error)? {
                Some(stale) => {
                    tracing::warn!(%key, error = %format!("{err:#}"), "Serving stale cache entry");
                    Ok(stale)
                }
                None => Err(err),
            },
        }
    }
}

fn cache_error(err: anyhow::Error) -> anyhow::Error {
    AmbientalError::cache(format!("{err:#}")).into()
}

fn point_key(prefix: &str, point: GeoPoint) -> String {
    let (lat, lon) = point.rounded(2);
    format!("{prefix}:{lat:.2}:{lon:.2}")
}

#[async_trait]
impl<S: DataSource> DataSource for CachedSource<S> {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self))]
    async fn locate(&self, point: GeoPoint) -> Result<CityInfo> {
        self.read_through(point_key("city", point), self.inner.locate(point))
            .await
    }

    #[instrument(skip(self))]
    async fn air_stations(
        &self,
        point: GeoPoint,
        city: &CityInfo,
    ) -> Result<Dataset<StationReading>> {
        let key = format!("{}:{}", point_key("air", point), city.city);
        self.read_through(key, self.inner.air_stations(point, city))
            .await
    }

    #[instrument(skip(self))]
    async fn recycling_points(
        &self,
        point: GeoPoint,
        radius_meters: f64,
        city: &CityInfo,
    ) -> Result<Dataset<RecyclingInfo>> {
        let key = format!("{}:{radius_meters:.0}", point_key("recycling", point));
        self.read_through(key, self.inner.recycling_points(point, radius_meters, city))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::geo::{Candidate, Pollutants};

    /// Counts calls and fails once `fail` is set
    #[derive(Default)]
    struct Flaky {
        calls: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl DataSource for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn locate(&self, _point: GeoPoint) -> Result<CityInfo> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("geocoder down");
            }
            Ok(CityInfo::madrid())
        }

        async fn air_stations(
            &self,
            point: GeoPoint,
            _city: &CityInfo,
        ) -> Result<Dataset<StationReading>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("feed down");
            }
            let station = Candidate::new(point, StationReading::new(Pollutants::default()))
                .with_name("Flaky station");
            Ok(Dataset::new("flaky", vec![station]))
        }

        async fn recycling_points(
            &self,
            _point: GeoPoint,
            _radius_meters: f64,
            _city: &CityInfo,
        ) -> Result<Dataset<RecyclingInfo>> {
            anyhow::bail!("not used")
        }
    }

    const SOL: GeoPoint = GeoPoint {
        latitude: 40.4168,
        longitude: -3.7038,
    };

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = Arc::new(BoundedCache::new(8, Duration::from_secs(60)));
        let source = CachedSource::new(Flaky::default(), cache);
        let city = CityInfo::madrid();

        source.air_stations(SOL, &city).await.unwrap();
        // a point in the same rounded cell shares the entry
        let nearby = GeoPoint {
            latitude: 40.4171,
            longitude: -3.7041,
        };
        let second = source.air_stations(nearby, &city).await.unwrap();

        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.items[0].name.as_deref(), Some("Flaky station"));
        assert_eq!(source.name(), "cached+flaky");
    }

    #[tokio::test]
    async fn test_stale_entry_served_on_error() {
        let cache = Arc::new(BoundedCache::new(8, Duration::ZERO));
        let source = CachedSource::new(Flaky::default(), cache);
        let city = CityInfo::madrid();

        source.air_stations(SOL, &city).await.unwrap();
        source.inner.fail.store(true, Ordering::SeqCst);

        let stale = source.air_stations(SOL, &city).await.unwrap();
        assert_eq!(stale.items.len(), 1);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_cache_error() {
        let cache = Arc::new(BoundedCache::new(8, Duration::from_secs(60)));
        cache
            .put("air:40.42:-3.70:Madrid", &"not a dataset")
            .await
            .unwrap();
        let source = CachedSource::new(Flaky::default(), cache);

        let err = source
            .air_stations(SOL, &CityInfo::madrid())
            .await
            .unwrap_err();
        let err = AmbientalError::from(err);
        assert!(matches!(err, AmbientalError::Cache { .. }));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_city_served_stale_when_geocoder_fails() {
        let cache = Arc::new(BoundedCache::new(8, Duration::ZERO));
        let source = CachedSource::new(Flaky::default(), cache);

        let city = source.locate(SOL).await.unwrap();
        source.inner.fail.store(true, Ordering::SeqCst);
        assert_eq!(source.locate(SOL).await.unwrap(), city);
    }

    #[tokio::test]
    async fn test_error_without_stale_entry_propagates() {
        let cache = Arc::new(BoundedCache::new(8, Duration::from_secs(60)));
        let flaky = Flaky::default();
        flaky.fail.store(true, Ordering::SeqCst);
        let source = CachedSource::new(flaky, cache);

        let err = source
            .air_stations(SOL, &CityInfo::madrid())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("feed down"));
    }
}
