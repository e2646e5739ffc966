use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use folio_logging::folio_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::article_filename;
use crate::frontmatter::build_markdown_document;
use crate::pipeline::ExtractionResult;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory {path} unusable: {reason}")]
    OutputDir { path: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Create `dir` if needed and confirm it accepts new files.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |reason: String| PersistError::OutputDir {
        path: dir.to_path_buf(),
        reason,
    };
    if dir.exists() && !dir.is_dir() {
        return Err(unusable("not a directory".to_string()));
    }
    fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))?;
    NamedTempFile::new_in(dir).map_err(|err| unusable(err.to_string()))?;
    Ok(())
}

/// Write `content` to `dir/filename` via a synced temp file and rename, so
/// readers never observe a partial file. An existing target is replaced.
pub fn write_atomic(dir: &Path, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
    ensure_output_dir(dir)?;

    let target = dir.join(filename);
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(content.as_bytes())?;
    staged.as_file_mut().sync_all()?;
    staged.persist(&target).map_err(|err| PersistError::Io(err.error))?;
    Ok(target)
}

/// Persist an extracted article as `{title}--{hash}.md` with front matter.
pub fn save_article(dir: &Path, url: &str, result: &ExtractionResult) -> Result<PathBuf, PersistError> {
    let filename = article_filename(result.title.as_deref(), url);
    let document = build_markdown_document(url, result);
    let path = write_atomic(dir, &filename, &document)?;
    folio_info!("article_saved url={} path={}", url, path.display());
    Ok(path)
}
