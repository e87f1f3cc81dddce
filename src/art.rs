use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use futures::{
    channel::oneshot,
    future::{BoxFuture, FutureExt},
};
use thiserror::Error;

const TEMP_PREFIX: &str = "tuner_album_";
const TEMP_SUFFIX: &str = ".jpg";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to store album art: {0}")]
    Io(#[from] std::io::Error),
    #[error("download task ended without a result")]
    Cancelled,
}

/// Path of the downloaded file, or `None` when there was nothing to fetch.
pub type FetchOutcome = Result<Option<PathBuf>, FetchError>;

/// Downloads album art to a transient file.
pub trait ArtSource: Send + Sync + 'static {
    fn download(&self, url: String) -> BoxFuture<'static, FetchOutcome>;
}

pub struct HttpArtSource {
    client: reqwest::Client,
    temp_dir: PathBuf,
}

impl HttpArtSource {
    pub fn new() -> Self {
        Self::with_temp_dir(std::env::temp_dir())
    }

    pub fn with_temp_dir(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            temp_dir: temp_dir.into(),
        }
    }
}

impl Default for HttpArtSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtSource for HttpArtSource {
    fn download(&self, url: String) -> BoxFuture<'static, FetchOutcome> {
        fetch_to_temp(self.client.clone(), url, self.temp_dir.clone()).boxed()
    }
}

async fn fetch_to_temp(client: reqwest::Client, url: String, temp_dir: PathBuf) -> FetchOutcome {
    if url.is_empty() {
        return Ok(None);
    }

    let bytes = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    let path = write_temp_image(&temp_dir, &bytes)?;
    Ok(Some(path))
}

/// Writes `bytes` to a uniquely named file in `dir` and keeps it on disk. The
/// caller owns the file from here on.
pub fn write_temp_image(dir: &Path, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|err| err.error)?;
    Ok(path)
}

/// Runs at most one download at a time on a background runtime and hands the
/// result back through a channel polled by the render loop.
pub struct ArtFetcher {
    runtime: tokio::runtime::Runtime,
    source: Arc<dyn ArtSource>,
    pending: Option<oneshot::Receiver<FetchOutcome>>,
}

impl ArtFetcher {
    pub fn new(source: Arc<dyn ArtSource>) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("tuner-art")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime,
            source,
            pending: None,
        })
    }

    pub fn in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Starts a download unless one is already running. Returns whether the
    /// download was started.
    pub fn dispatch(&mut self, url: String) -> bool {
        if self.in_flight() {
            return false;
        }

        let (tx, rx) = oneshot::channel();
        let download = self.source.download(url);
        self.runtime.spawn(async move {
            let _ = tx.send(download.await);
        });
        self.pending = Some(rx);
        true
    }

    /// Non-blocking. Returns the result of the running download once it is
    /// done, after which a new download may be dispatched.
    pub fn poll(&mut self) -> Option<FetchOutcome> {
        let rx = self.pending.as_mut()?;
        let outcome = match rx.try_recv() {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(FetchError::Cancelled),
        };
        self.pending = None;
        Some(outcome)
    }
}

impl Drop for ArtFetcher {
    fn drop(&mut self) {
        // A download that finished but was never adopted still owns its file.
        if let Some(mut rx) = self.pending.take() {
            if let Ok(Some(Ok(Some(path)))) = rx.try_recv() {
                if let Err(err) = std::fs::remove_file(&path) {
                    tracing::debug!("Failed to remove {}: {err}", path.display());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
        time::{Duration, Instant},
    };

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        release: Arc<std::sync::Mutex<Option<oneshot::Receiver<()>>>>,
    }

    impl ArtSource for CountingSource {
        fn download(&self, url: String) -> BoxFuture<'static, FetchOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.release.lock().unwrap().take();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                Ok(Some(PathBuf::from(url)))
            }
            .boxed()
        }
    }

    fn wait_for(fetcher: &mut ArtFetcher) -> FetchOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = fetcher.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "download never completed");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn second_dispatch_is_refused_while_in_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (gate_tx, gate_rx) = oneshot::channel();
        let source = CountingSource {
            calls: calls.clone(),
            release: Arc::new(std::sync::Mutex::new(Some(gate_rx))),
        };
        let mut fetcher = ArtFetcher::new(Arc::new(source)).unwrap();

        assert!(fetcher.dispatch("a".into()));
        assert!(!fetcher.dispatch("b".into()));
        assert!(fetcher.poll().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate_tx.send(()).unwrap();
        let outcome = wait_for(&mut fetcher).unwrap();
        assert_eq!(outcome, Some(PathBuf::from("a")));
        assert!(!fetcher.in_flight());

        assert!(fetcher.dispatch("c".into()));
        assert_eq!(wait_for(&mut fetcher).unwrap(), Some(PathBuf::from("c")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn poll_without_dispatch_yields_nothing() {
        let source = CountingSource {
            calls: Arc::new(AtomicUsize::new(0)),
            release: Arc::new(std::sync::Mutex::new(None)),
        };
        let mut fetcher = ArtFetcher::new(Arc::new(source)).unwrap();
        assert!(fetcher.poll().is_none());
        assert!(!fetcher.in_flight());
    }

    #[test]
    fn empty_url_is_a_no_op_download() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher =
            ArtFetcher::new(Arc::new(HttpArtSource::with_temp_dir(dir.path()))).unwrap();

        assert!(fetcher.dispatch(String::new()));
        assert_eq!(wait_for(&mut fetcher).unwrap(), None);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    struct DiskSource {
        dir: PathBuf,
    }

    impl ArtSource for DiskSource {
        fn download(&self, _url: String) -> BoxFuture<'static, FetchOutcome> {
            let dir = self.dir.clone();
            async move { write_temp_image(&dir, b"cover").map(Some).map_err(FetchError::from) }
                .boxed()
        }
    }

    #[test]
    fn dropping_the_fetcher_removes_an_unadopted_download() {
        let dir = tempfile::tempdir().unwrap();
        let mut fetcher = ArtFetcher::new(Arc::new(DiskSource {
            dir: dir.path().to_path_buf(),
        }))
        .unwrap();
        assert!(fetcher.dispatch("http://x/art.jpg".into()));

        let deadline = Instant::now() + Duration::from_secs(5);
        while std::fs::read_dir(dir.path()).unwrap().count() == 0 {
            assert!(Instant::now() < deadline, "download never completed");
            thread::sleep(Duration::from_millis(5));
        }
        // The result is sent right after the file is written.
        thread::sleep(Duration::from_millis(100));

        drop(fetcher);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn temp_images_get_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_temp_image(dir.path(), b"one").unwrap();
        let second = write_temp_image(dir.path(), b"two").unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        let name = first.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(TEMP_PREFIX));
        assert!(name.ends_with(TEMP_SUFFIX));
    }
}
