use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::classifier_kind::ClassifierKind;
use crate::shared::constants::CASCADE_DIR_ENV;

#[derive(Error, Debug)]
pub enum ClassifierResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write cascade to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cascade file not found: {0}")]
    NotFound(PathBuf),
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolves the cascade file for `kind` to a path on disk.
///
/// Custom cascades must already exist. Built-in cascades are looked up in
/// the user cache, then in the bundled directories, and downloaded into the
/// cache as a last resort.
pub fn resolve(
    kind: &ClassifierKind,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ClassifierResolveError> {
    if let Some(path) = kind.custom_path() {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(ClassifierResolveError::NotFound(path.to_path_buf()))
        };
    }
    match (kind.file_name(), kind.url()) {
        (Some(name), Some(url)) => {
            resolve_from(&cascade_cache_dir()?, &bundled_dirs(), name, url, progress)
        }
        _ => Err(ClassifierResolveError::NotFound(PathBuf::from(kind.label()))),
    }
}

/// Resolution order:
/// 1. `cache_dir/name`
/// 2. each of `bundled` in order
/// 3. download `url` into `cache_dir/name`
pub fn resolve_from(
    cache_dir: &Path,
    bundled: &[PathBuf],
    name: &str,
    url: &str,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ClassifierResolveError> {
    let cached_path = cache_dir.join(name);
    if cached_path.is_file() {
        return Ok(cached_path);
    }

    if let Some(bundled_path) = bundled.iter().map(|d| d.join(name)).find(|p| p.is_file()) {
        log::debug!("Using bundled cascade {}", bundled_path.display());
        return Ok(bundled_path);
    }

    fs::create_dir_all(cache_dir).map_err(ClassifierResolveError::CacheDir)?;
    log::info!("Downloading {name} from {url}");
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific cascade cache directory.
///
/// - macOS: `~/Library/Application Support/FaceCam/cascades/`
/// - Linux: `$XDG_CACHE_HOME/FaceCam/cascades/` or `~/.cache/FaceCam/cascades/`
/// - Windows: `%LOCALAPPDATA%/FaceCam/cascades/`
pub fn cascade_cache_dir() -> Result<PathBuf, ClassifierResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("FaceCam").join("cascades"))
            .ok_or(ClassifierResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("FaceCam").join("cascades"))
            .ok_or(ClassifierResolveError::NoCacheDir)
    }
}

/// Directories that may already hold the stock OpenCV cascades: the
/// directory named by `FACECAM_CASCADE_DIR`, then the usual install
/// prefixes of the OpenCV data package.
pub fn bundled_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::var_os(CASCADE_DIR_ENV) {
        candidates.push(PathBuf::from(dir));
    }
    for prefix in ["/usr/share", "/usr/local/share", "/opt/homebrew/share"] {
        for sub in ["haarcascades", "lbpcascades"] {
            candidates.push(Path::new(prefix).join("opencv4").join(sub));
        }
    }
    candidates
}

fn download(
    url: &str,
    dest: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ClassifierResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ClassifierResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ClassifierResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let write_err = |path: &Path, e: std::io::Error| ClassifierResolveError::Write {
        path: path.to_path_buf(),
        source: e,
    };

    let mut file = fs::File::create(temp_path).map_err(|e| write_err(temp_path, e))?;
    let mut buf = vec![0u8; 64 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = response
            .read(&mut buf)
            .map_err(|e| write_err(temp_path, e))?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| write_err(temp_path, e))?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(|e| write_err(temp_path, e))?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| write_err(dest, e))
}
