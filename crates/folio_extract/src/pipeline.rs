use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use folio_logging::{folio_debug, folio_info, folio_warn};
use serde::Serialize;
use url::Url;

use crate::convert::{Converter, MarkdownConverter};
use crate::extract::{Extractor, ReadabilityExtractor};
use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::words::count_words;
use crate::FetchError;

pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(8);
pub const DEFAULT_MEMORY_LIMIT_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_MINIMUM_CONTENT_LENGTH: usize = 50;

#[derive(Debug, Clone)]
pub struct ExtractorSettings {
    pub fetch: FetchSettings,
    /// Budget for fetch, parse and conversion together.
    pub total_timeout: Duration,
    /// Extraction is refused while the process holds more than this.
    pub memory_limit_bytes: u64,
    /// Minimum Markdown length in characters, inclusive.
    pub minimum_content_length: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            fetch: FetchSettings::default(),
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            memory_limit_bytes: DEFAULT_MEMORY_LIMIT_BYTES,
            minimum_content_length: DEFAULT_MINIMUM_CONTENT_LENGTH,
        }
    }
}

/// Source of the current resident memory figure.
pub trait MemoryProbe: Send + Sync {
    /// Resident bytes of this process; 0 when the platform cannot tell.
    fn resident_bytes(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessMemoryProbe;

impl MemoryProbe for ProcessMemoryProbe {
    fn resident_bytes(&self) -> u64 {
        memory_stats::memory_stats()
            .map(|stats| stats.physical_mem as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    pub excerpt: Option<String>,
    pub markdown_content: String,
    pub word_count: usize,
    pub extracted_at: DateTime<Utc>,
}

/// Failure inside one of the pipeline stages.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    /// The blocking parse/convert task panicked or was cancelled.
    #[error("processing failed: {0}")]
    Processing(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("extraction timed out after {0:?}")]
    Timeout(Duration),
    #[error("content too short: {length} characters, minimum {minimum}")]
    ContentTooShort { length: usize, minimum: usize },
    #[error("memory limit exceeded: {resident} bytes resident, limit {limit}")]
    MemoryLimitExceeded { resident: u64, limit: u64 },
    #[error("extraction failed: {0}")]
    ExtractionFailed(#[source] StageError),
}

impl ExtractionError {
    /// Only transient fetch failures are worth an immediate retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractionError::ExtractionFailed(StageError::Fetch(err)) => err.is_retryable(),
            _ => false,
        }
    }
}

impl From<StageError> for ExtractionError {
    fn from(err: StageError) -> Self {
        ExtractionError::ExtractionFailed(err)
    }
}

/// Fetch → readability → Markdown, bounded by time and memory budgets.
///
/// Cheap to clone; all components are shared. `extract` may run concurrently
/// for different URLs.
///
/// On timeout the HTTP request is cancelled at once. A readability pass that
/// is already running on the blocking pool finishes in the background, but
/// the Markdown conversion after it is skipped.
#[derive(Clone)]
pub struct ContentExtractor {
    settings: ExtractorSettings,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    converter: Arc<dyn Converter>,
    memory: Arc<dyn MemoryProbe>,
}

impl ContentExtractor {
    pub fn new(settings: ExtractorSettings) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch.clone()));
        Self::with_components(
            settings,
            fetcher,
            Arc::new(ReadabilityExtractor),
            Arc::new(MarkdownConverter),
            Arc::new(ProcessMemoryProbe),
        )
    }

    pub fn with_components(
        settings: ExtractorSettings,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        converter: Arc<dyn Converter>,
        memory: Arc<dyn MemoryProbe>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            extractor,
            converter,
            memory,
        }
    }

    pub fn settings(&self) -> &ExtractorSettings {
        &self.settings
    }

    pub async fn extract(&self, url: &str) -> Result<ExtractionResult, ExtractionError> {
        let url = validate_url(url)?;
        self.check_memory()?;

        let started = Instant::now();
        let budget = self.settings.total_timeout;
        // Dropping the losing branch cancels the in-flight request.
        let outcome = tokio::select! {
            outcome = self.run_pipeline(url) => outcome,
            _ = tokio::time::sleep(budget) => {
                folio_warn!("extract_timeout url={} budget_ms={}", url, budget.as_millis());
                Err(ExtractionError::Timeout(budget))
            }
        };

        match &outcome {
            Ok(result) => folio_info!(
                "extract_done url={} words={} elapsed_ms={}",
                url,
                result.word_count,
                started.elapsed().as_millis()
            ),
            Err(err) => folio_info!("extract_failed url={} error={}", url, err),
        }
        outcome
    }

    fn check_memory(&self) -> Result<(), ExtractionError> {
        let resident = self.memory.resident_bytes();
        let limit = self.settings.memory_limit_bytes;
        if resident > limit {
            folio_warn!("memory_limit_exceeded resident={} limit={}", resident, limit);
            return Err(ExtractionError::MemoryLimitExceeded { resident, limit });
        }
        Ok(())
    }

    async fn run_pipeline(&self, url: &str) -> Result<ExtractionResult, ExtractionError> {
        let document = self.fetcher.fetch(url).await.map_err(StageError::from)?;
        folio_debug!(
            "pipeline_fetched url={} final_url={} encoding={} bytes={}",
            url,
            document.metadata.final_url,
            document.encoding_label,
            document.metadata.byte_len
        );

        let extractor = Arc::clone(&self.extractor);
        let converter = Arc::clone(&self.converter);
        let page_url = document.metadata.final_url;
        let html = document.html;
        let abandoned = AbandonOnDrop::default();
        let flag = Arc::clone(&abandoned.0);
        // A started parse cannot be interrupted; conversion is skipped once the caller is gone.
        let processed = tokio::task::spawn_blocking(move || {
            let readable = extractor.extract(&html, &page_url);
            if flag.load(Ordering::Acquire) {
                folio_debug!("pipeline_abandoned url={}", page_url);
                return None;
            }
            let markdown = converter.to_markdown(&readable.content_html, readable.base_url.as_deref());
            Some((readable, markdown))
        })
        .await
        .map_err(|err| StageError::Processing(err.to_string()))?;
        let Some((readable, markdown)) = processed else {
            return Err(StageError::Processing("abandoned before conversion".to_string()).into());
        };

        let length = markdown.chars().count();
        let minimum = self.settings.minimum_content_length;
        if length < minimum {
            return Err(ExtractionError::ContentTooShort { length, minimum });
        }

        Ok(ExtractionResult {
            title: readable.title,
            author: readable.author,
            site_name: readable.site_name,
            excerpt: readable.excerpt,
            word_count: count_words(&markdown),
            markdown_content: markdown,
            extracted_at: Utc::now(),
        })
    }
}

/// Raises its flag when the pipeline future is dropped, e.g. by losing the timeout race.
#[derive(Default)]
struct AbandonOnDrop(Arc<AtomicBool>);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Trimmed URL when it parses as absolute http or https.
fn validate_url(url: &str) -> Result<&str, ExtractionError> {
    let trimmed = url.trim();
    match Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(trimmed),
        _ => Err(ExtractionError::InvalidUrl(url.to_string())),
    }
}
