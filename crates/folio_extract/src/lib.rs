//! Folio extraction: fetch a page, find its article, render it as Markdown.
mod convert;
mod decode;
mod dom;
mod extract;
mod fetch;
mod filename;
mod frontmatter;
mod metadata;
mod persist;
mod pipeline;
mod scoring;
mod types;
mod words;

pub use convert::{Converter, MarkdownConverter};
pub use decode::{decode_html, extract_charset, meta_charset, DecodedHtml};
pub use extract::{Extractor, ReadabilityExtractor, ReadabilityResult};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_RESPONSE_BYTES};
pub use filename::article_filename;
pub use frontmatter::build_markdown_document;
pub use metadata::{clean_title, ArticleMetadata};
pub use persist::{ensure_output_dir, save_article, write_atomic, PersistError};
pub use pipeline::{
    ContentExtractor, ExtractionError, ExtractionResult, ExtractorSettings, MemoryProbe,
    ProcessMemoryProbe, StageError, DEFAULT_MEMORY_LIMIT_BYTES, DEFAULT_MINIMUM_CONTENT_LENGTH,
    DEFAULT_TOTAL_TIMEOUT,
};
pub use scoring::{best_candidate, CandidateScore};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchedDocument};
pub use words::{count_words, is_cjk};
