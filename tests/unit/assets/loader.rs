use std::{
    collections::HashMap,
    io::Cursor,
    sync::atomic::{AtomicUsize, Ordering},
};

use tokio::sync::Notify;

use super::*;

fn png(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([shade, shade, shade, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[derive(Default)]
struct FakeFetcher {
    payloads: HashMap<String, Vec<u8>>,
    gates: HashMap<String, Arc<Notify>>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    fn with(mut self, url: &str, bytes: Vec<u8>) -> Self {
        self.payloads.insert(url.to_string(), bytes);
        self
    }

    fn gated(mut self, url: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(url.to_string(), gate);
        self
    }
}

impl FetchBytes for FakeFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(url) {
            gate.notified().await;
        }
        self.payloads
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("404 for {url}"))
    }
}

#[tokio::test]
async fn load_success_becomes_current() {
    let loader = LogoLoader::new(FakeFetcher::default().with("logo.png", png(10)));
    let out = loader.load("logo.png").await;
    let asset = out.asset().cloned().unwrap();
    assert_eq!(asset.source, "logo.png");
    assert_eq!((asset.width, asset.height), (2, 2));
    assert_eq!(loader.current(), Some(asset));
    assert_eq!(loader.current_url().as_deref(), Some("logo.png"));
}

#[tokio::test]
async fn failure_is_unavailable_not_an_error() {
    let loader = LogoLoader::new(
        FakeFetcher::default()
            .with("logo.png", png(10))
            .with("broken.jpg", b"not an image".to_vec()),
    );
    assert!(matches!(loader.load("logo.png").await, LogoLoad::Ready(_)));

    assert_eq!(loader.load("missing.png").await, LogoLoad::Unavailable);
    assert_eq!(loader.current(), None);

    assert_eq!(loader.load("broken.jpg").await, LogoLoad::Unavailable);
    assert_eq!(loader.current(), None);
}

#[tokio::test]
async fn slow_stale_fetch_does_not_overwrite_newer_result() {
    let gate = Arc::new(Notify::new());
    let loader = LogoLoader::new(
        FakeFetcher::default()
            .with("a.png", png(1))
            .with("b.png", png(2))
            .gated("a.png", gate.clone()),
    );

    let first = loader.load("a.png");
    let second = loader.load("b.png");
    let (a, b) = tokio::join!(first, async {
        let out = second.await;
        gate.notify_one();
        out
    });

    assert_eq!(a, LogoLoad::Superseded);
    let b = b.asset().cloned().unwrap();
    assert_eq!(b.source, "b.png");
    assert_eq!(loader.current(), Some(b));
    assert_eq!(loader.current_url().as_deref(), Some("b.png"));
}

#[tokio::test]
async fn newer_failure_wins_over_older_success() {
    let gate = Arc::new(Notify::new());
    let loader = LogoLoader::new(
        FakeFetcher::default()
            .with("a.png", png(1))
            .gated("a.png", gate.clone()),
    );

    let first = loader.load("a.png");
    let second = loader.load("gone.png");
    let (a, b) = tokio::join!(first, async {
        let out = second.await;
        gate.notify_one();
        out
    });

    assert_eq!(a, LogoLoad::Superseded);
    assert_eq!(b, LogoLoad::Unavailable);
    assert_eq!(loader.current(), None);
    assert_eq!(loader.current_url().as_deref(), Some("gone.png"));
}

#[tokio::test]
async fn concurrent_loads_of_one_url_share_a_fetch() {
    let gate = Arc::new(Notify::new());
    let loader = LogoLoader::new(
        FakeFetcher::default()
            .with("a.png", png(1))
            .gated("a.png", gate.clone()),
    );

    let first = loader.load("a.png");
    let second = loader.load("a.png");
    let (a, b, ()) = tokio::join!(first, second, async {
        tokio::task::yield_now().await;
        gate.notify_one();
    });

    assert_eq!(loader.fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(a, LogoLoad::Superseded);
    assert!(matches!(b, LogoLoad::Ready(_)));
}

#[tokio::test]
async fn reloading_current_url_uses_cached_asset() {
    let loader = LogoLoader::new(FakeFetcher::default().with("a.png", png(1)));
    let first = loader.load("a.png").await;
    let again = loader.load("a.png").await;
    assert_eq!(first, again);
    assert_eq!(loader.fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn http_fetcher_reads_relative_paths_from_base_dir() {
    let dir = std::env::temp_dir().join(format!("qzes_loader_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("logo.png"), png(7)).unwrap();

    let loader = LogoLoader::new(HttpFetcher::new().unwrap().with_base_dir(&dir));
    let out = loader.load("logo.png").await;
    assert!(matches!(out, LogoLoad::Ready(_)));
    assert_eq!(loader.load("nope.png").await, LogoLoad::Unavailable);

    std::fs::remove_dir_all(&dir).ok();
}
