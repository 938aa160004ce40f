//! Data orchestrator: live-preferred, cache-backed, fallback-floored reads.
//!
//! Policy for every request:
//! 1. Fetch and parse the source. A non-empty result is cached and returned.
//! 2. Otherwise serve the cached snapshot, if one exists.
//! 3. Otherwise serve the fallback catalog.
//!
//! Expected failures (network, HTML page, bad payload, cache I/O) only move
//! the request down the chain; callers always receive a list.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use vitibrasil_parser::{try_parse_payload, Dataset, ParseError, Record};

use crate::cache::CacheStore;
use crate::fallback::fallback_records;
use crate::fetch::{FetchError, SourceFetcher};

#[derive(Debug, Error)]
pub enum LiveFetchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("source for {0} parsed to zero records")]
    Empty(Dataset),
}

/// Which tier of the chain served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Live,
    Cache,
    Fallback,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Live => "live",
            Tier::Cache => "cache",
            Tier::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Served {
    pub tier: Tier,
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOptions {
    /// Consult the cache when the live fetch fails.
    pub use_cache: bool,
    /// Persist a successful live fetch.
    pub write_cache: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            write_cache: true,
        }
    }
}

#[derive(Clone)]
pub struct DataService {
    fetcher: Arc<dyn SourceFetcher>,
    cache: CacheStore,
}

impl DataService {
    pub fn new(fetcher: Arc<dyn SourceFetcher>, cache: CacheStore) -> Self {
        Self { fetcher, cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub async fn get_data(&self, dataset: Dataset) -> Vec<Record> {
        self.get_data_with(dataset, GetOptions::default()).await.records
    }

    /// Resolve a dataset key first; unknown keys yield an empty list.
    pub async fn get_data_by_key(&self, key: &str) -> Vec<Record> {
        match key.parse::<Dataset>() {
            Ok(dataset) => self.get_data(dataset).await,
            Err(e) => {
                warn!(error = %e, "request for unknown dataset");
                Vec::new()
            }
        }
    }

    pub async fn get_data_with(&self, dataset: Dataset, opts: GetOptions) -> Served {
        match self.live_fetch(dataset).await {
            Ok(records) => {
                if opts.write_cache {
                    if let Err(e) = self.cache.save(dataset, &records).await {
                        warn!(%dataset, error = %e, "failed to write cache");
                    }
                }
                return Served {
                    tier: Tier::Live,
                    records,
                };
            }
            Err(e) => warn!(%dataset, error = %e, "live fetch unavailable"),
        }

        if opts.use_cache {
            match self.cache.load(dataset).await {
                Ok(Some(records)) => {
                    info!(%dataset, records = records.len(), "using cached data");
                    return Served {
                        tier: Tier::Cache,
                        records,
                    };
                }
                Ok(None) => debug!(%dataset, "no cached snapshot"),
                Err(e) => warn!(%dataset, error = %e, "cached snapshot unreadable"),
            }
        }

        info!(%dataset, "using fallback data");
        Served {
            tier: Tier::Fallback,
            records: fallback_records(dataset),
        }
    }

    /// Fetch and parse the source without touching the cache.
    pub async fn live_fetch(&self, dataset: Dataset) -> Result<Vec<Record>, LiveFetchError> {
        let fetched = self.fetcher.fetch(dataset).await?;
        let records = try_parse_payload(dataset, &fetched.body)?;
        if records.is_empty() {
            return Err(LiveFetchError::Empty(dataset));
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchedSource;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use vitibrasil_parser::Label;

    enum FakeSource {
        Payload(&'static [u8]),
        Html,
        Down,
    }

    struct FakeFetcher {
        source: FakeSource,
        calls: AtomicUsize,
    }

    impl FakeFetcher {
        fn new(source: FakeSource) -> Arc<Self> {
            Arc::new(Self {
                source,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SourceFetcher for FakeFetcher {
        async fn fetch(&self, dataset: Dataset) -> Result<FetchedSource, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let url = format!("http://fake/{}", dataset.source_path());
            match self.source {
                FakeSource::Payload(body) => Ok(FetchedSource::new(url, "text/csv", body.to_vec())),
                FakeSource::Html => Err(FetchError::HtmlPayload { url }),
                FakeSource::Down => Err(FetchError::Status { url, status: 503 }),
            }
        }
    }

    const PRODUCTION_CSV: &[u8] = b"id;control;produto;2022;2023\n\
        1;vm_Tinto;Tinto;100;200\n\
        2;vm_Branco;Branco;0;50\n";

    async fn service(source: FakeSource) -> (DataService, Arc<FakeFetcher>, TempDir) {
        let tmp = TempDir::new().unwrap();
        let cache = CacheStore::init(tmp.path().join("cache")).await.unwrap();
        let fetcher = FakeFetcher::new(source);
        (DataService::new(fetcher.clone(), cache), fetcher, tmp)
    }

    fn cached_record() -> Record {
        Record {
            ano: 2019,
            label: Label::Produto("Cached".to_string()),
            quantidade: 7,
            unidade: "litros".to_string(),
            tipo: None,
        }
    }

    #[tokio::test]
    async fn test_live_fetch_is_returned_and_cached() {
        let (svc, fetcher, _tmp) = service(FakeSource::Payload(PRODUCTION_CSV)).await;

        let served = svc.get_data_with(Dataset::Production, GetOptions::default()).await;
        assert_eq!(served.tier, Tier::Live);
        assert_eq!(served.records.len(), 3);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let cached = svc.cache().load(Dataset::Production).await.unwrap();
        assert_eq!(cached, Some(served.records));
    }

    #[tokio::test]
    async fn test_dry_run_does_not_write_cache() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Payload(PRODUCTION_CSV)).await;
        let opts = GetOptions {
            write_cache: false,
            ..GetOptions::default()
        };

        let served = svc.get_data_with(Dataset::Production, opts).await;
        assert_eq!(served.tier, Tier::Live);
        assert_eq!(svc.cache().load(Dataset::Production).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_falls_back_to_cache_when_source_down() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Down).await;
        svc.cache().save(Dataset::Production, &[cached_record()]).await.unwrap();

        let served = svc.get_data_with(Dataset::Production, GetOptions::default()).await;
        assert_eq!(served.tier, Tier::Cache);
        assert_eq!(served.records, vec![cached_record()]);
    }

    #[tokio::test]
    async fn test_falls_back_to_catalog_without_cache() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Down).await;

        let records = svc.get_data(Dataset::Production).await;
        assert_eq!(records, fallback_records(Dataset::Production));
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].label.as_str(), "Vinho de mesa");
        assert_eq!(records[0].ano, 2023);
        assert_eq!(records[1].label.as_str(), "Vinho fino");
        assert_eq!(records[2].ano, 2022);
    }

    #[tokio::test]
    async fn test_html_page_is_treated_as_unavailable() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Html).await;
        let served = svc.get_data_with(Dataset::Trade, GetOptions::default()).await;
        assert_eq!(served.tier, Tier::Fallback);
        assert_eq!(served.records, fallback_records(Dataset::Trade));
    }

    #[tokio::test]
    async fn test_payload_with_no_records_is_not_cached() {
        let payload = b"produto;2020\nPRODUTO;1\n";
        let (svc, _fetcher, _tmp) = service(FakeSource::Payload(payload)).await;
        let served = svc.get_data_with(Dataset::Production, GetOptions::default()).await;
        assert_eq!(served.tier, Tier::Fallback);
        assert_eq!(svc.cache().load(Dataset::Production).await.unwrap(), None);

        let err = svc.live_fetch(Dataset::Production).await.unwrap_err();
        assert!(matches!(err, LiveFetchError::Empty(Dataset::Production)));
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_parse_failure() {
        let payload = b"produto;2020\n\xFF\xFE;1\n";
        let (svc, _fetcher, _tmp) = service(FakeSource::Payload(payload)).await;
        let err = svc.live_fetch(Dataset::Production).await.unwrap_err();
        assert!(matches!(err, LiveFetchError::Parse(ParseError::Encoding { .. })));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_treated_as_miss() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Down).await;
        std::fs::write(svc.cache().path_for(Dataset::Exports), b"not json").unwrap();

        let served = svc.get_data_with(Dataset::Exports, GetOptions::default()).await;
        assert_eq!(served.tier, Tier::Fallback);
    }

    #[tokio::test]
    async fn test_cache_bypass_skips_snapshot() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Down).await;
        svc.cache().save(Dataset::Production, &[cached_record()]).await.unwrap();

        let opts = GetOptions {
            use_cache: false,
            ..GetOptions::default()
        };
        let served = svc.get_data_with(Dataset::Production, opts).await;
        assert_eq!(served.tier, Tier::Fallback);
    }

    #[tokio::test]
    async fn test_cache_write_failure_does_not_block_live_data() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Payload(PRODUCTION_CSV)).await;
        std::fs::remove_dir_all(svc.cache().dir()).unwrap();

        let served = svc.get_data_with(Dataset::Production, GetOptions::default()).await;
        assert_eq!(served.tier, Tier::Live);
        assert_eq!(served.records.len(), 3);
    }

    #[tokio::test]
    async fn test_every_dataset_returns_records_when_everything_fails() {
        let (svc, _fetcher, _tmp) = service(FakeSource::Down).await;
        for dataset in Dataset::ALL {
            assert!(!svc.get_data(dataset).await.is_empty(), "{dataset}");
        }
    }

    #[tokio::test]
    async fn test_get_data_by_key() {
        let (svc, fetcher, _tmp) = service(FakeSource::Down).await;

        assert!(svc.get_data_by_key("vinhos").await.is_empty());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        let records = svc.get_data_by_key("producao").await;
        assert_eq!(records, fallback_records(Dataset::Production));
    }

    #[tokio::test]
    async fn test_each_request_fetches_independently() {
        let (svc, fetcher, _tmp) = service(FakeSource::Payload(PRODUCTION_CSV)).await;
        svc.get_data(Dataset::Production).await;
        svc.get_data(Dataset::Production).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
