//! Asset transfer between URIs and local working storage.
//!
//! Sources and destinations are addressed by URI: `file://` (or a bare path)
//! for local storage and `http(s)://` for remote asset stores. Downloads
//! stream to disk; uploads stream from disk.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// A parsed transfer endpoint.
#[derive(Debug, Clone, PartialEq)]
enum Endpoint {
    Local(PathBuf),
    Http(String),
}

fn parse_uri(uri: &str) -> MediaResult<Endpoint> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(Endpoint::Local(PathBuf::from(path)));
    }
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Ok(Endpoint::Http(uri.to_string()));
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        return Err(MediaError::UnsupportedScheme(scheme.to_string()));
    }
    // Bare paths address local storage directly
    Ok(Endpoint::Local(PathBuf::from(uri)))
}

/// Fetch an asset from a URI into local working storage.
pub async fn fetch(uri: &str, dest: &Path) -> MediaResult<()> {
    match parse_uri(uri)? {
        Endpoint::Local(src) => {
            if !src.exists() {
                return Err(MediaError::fetch_failed(uri, "source file does not exist"));
            }
            fs::copy(&src, dest).await.map_err(|e| {
                MediaError::fetch_failed(uri, format!("local copy failed: {}", e))
            })?;
            debug!(uri, dest = %dest.display(), "Fetched local asset");
            Ok(())
        }
        Endpoint::Http(url) => fetch_http(&url, dest).await,
    }
}

async fn fetch_http(url: &str, dest: &Path) -> MediaResult<()> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| MediaError::fetch_failed(url, e.to_string()))?;

    if !response.status().is_success() {
        return Err(MediaError::fetch_failed(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    let mut file = fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| MediaError::fetch_failed(url, e.to_string()))?;
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!(url, bytes = bytes_written, dest = %dest.display(), "Downloaded asset");
    Ok(())
}

/// Upload a finished artifact to a storage URI.
pub async fn upload(src: &Path, uri: &str) -> MediaResult<()> {
    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }

    match parse_uri(uri)? {
        Endpoint::Local(dest) => {
            move_file(src, &dest).await.map_err(|e| {
                MediaError::upload_failed(uri, format!("local move failed: {}", e))
            })?;
            debug!(uri, "Published artifact to local storage");
            Ok(())
        }
        Endpoint::Http(url) => upload_http(src, &url).await,
    }
}

async fn upload_http(src: &Path, url: &str) -> MediaResult<()> {
    let file = fs::File::open(src).await?;
    let len = file.metadata().await?.len();
    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

    let client = reqwest::Client::new();
    let response = client
        .put(url)
        .header(reqwest::header::CONTENT_LENGTH, len)
        .body(body)
        .send()
        .await
        .map_err(|e| MediaError::upload_failed(url, e.to_string()))?;

    if !response.status().is_success() {
        return Err(MediaError::upload_failed(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    debug!(url, bytes = len, "Uploaded artifact");
    Ok(())
}

/// Move a file, falling back to copy-and-delete for cross-device moves.
///
/// The copy lands in a temp file next to the destination first, so the final
/// rename is atomic on the destination filesystem.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                "Cross-device rename detected, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp_dst = dst.with_extension("tmp");

    fs::copy(src, &tmp_dst).await?;

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        return Err(MediaError::from(e));
    }

    if let Err(e) = fs::remove_file(src).await {
        warn!(
            "Failed to remove source after cross-device move: {}: {}",
            src.display(),
            e
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_uri() {
        assert_eq!(
            parse_uri("file:///tmp/a.mp4").unwrap(),
            Endpoint::Local(PathBuf::from("/tmp/a.mp4"))
        );
        assert_eq!(
            parse_uri("/tmp/a.mp4").unwrap(),
            Endpoint::Local(PathBuf::from("/tmp/a.mp4"))
        );
        assert!(matches!(
            parse_uri("https://assets.example.com/a.mp4").unwrap(),
            Endpoint::Http(_)
        ));
        assert!(matches!(
            parse_uri("s3://bucket/key").unwrap_err(),
            MediaError::UnsupportedScheme(s) if s == "s3"
        ));
    }

    #[tokio::test]
    async fn test_fetch_local() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.bin");
        let dest = dir.path().join("dest.bin");
        fs::write(&src, b"content").await.unwrap();

        fetch(src.to_str().unwrap(), &dest).await.unwrap();
        assert_eq!(fs::read(&dest).await.unwrap(), b"content");
    }

    #[tokio::test]
    async fn test_fetch_local_missing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("dest.bin");
        let err = fetch("/nonexistent/source.mp4", &dest).await.unwrap_err();
        assert!(matches!(err, MediaError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/assets/clip.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video-bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("clip.mp4");
        let url = format!("{}/assets/clip.mp4", server.uri());

        fetch(&url, &dest).await.unwrap();
        assert_eq!(fs::read(&dest).await.unwrap(), b"video-bytes");
    }

    #[tokio::test]
    async fn test_fetch_http_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.mp3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing.mp3");
        let url = format!("{}/missing.mp3", server.uri());

        let err = fetch(&url, &dest).await.unwrap_err();
        assert!(matches!(err, MediaError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_upload_http() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/out/final.mp4"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let src = dir.path().join("final.mp4");
        fs::write(&src, b"artifact").await.unwrap();

        let url = format!("{}/out/final.mp4", server.uri());
        upload(&src, &url).await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_local_move() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("out.mp4");
        let dest = dir.path().join("published").join("out.mp4");
        fs::write(&src, b"artifact").await.unwrap();

        upload(&src, dest.to_str().unwrap()).await.unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).await.unwrap(), b"artifact");
    }

    #[tokio::test]
    async fn test_move_file_overwrites_destination() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("source.txt");
        let dst = dir.path().join("dest.txt");

        fs::write(&src, b"new content").await.unwrap();
        fs::write(&dst, b"old content").await.unwrap();

        move_file(&src, &dst).await.unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).await.unwrap(), "new content");
    }

    #[test]
    fn test_is_cross_device_error() {
        let exdev = std::io::Error::from_raw_os_error(18);
        assert!(is_cross_device_error(&exdev));

        let not_found = std::io::Error::from_raw_os_error(2);
        assert!(!is_cross_device_error(&not_found));
    }
}
