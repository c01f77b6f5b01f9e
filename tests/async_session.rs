use std::sync::Arc;
use std::time::Duration;

use fcdesign::platform::FontsReady;
use fcdesign::rendering::color::Rgba;
use fcdesign::rendering::pixmap::Pixmap;
use fcdesign::rendering::text::HeadlessRasterizer;
use fcdesign::scene::{CoverInputs, CoverScene, PostScene};
use fcdesign::{Error, RenderConfig, RenderOutcome, RenderSession};

fn config(debounce_ms: u64) -> RenderConfig {
    RenderConfig { supersample: Some(1), threads: 1, debounce_ms, ..Default::default() }
}

fn cover(source: &str) -> Arc<CoverScene> {
    Arc::new(CoverScene::new(CoverInputs { source: source.to_string() }))
}

#[tokio::test]
async fn burst_of_requests_presents_only_the_last() {
    let session = RenderSession::new(FontsReady::ready(Arc::new(HeadlessRasterizer::new())), config(30));

    let mut handles = Vec::new();
    for i in 0..5 {
        let s = session.clone();
        handles.push(tokio::spawn(async move { s.render(cover(&format!("T,{i}\n1,2,3"))).await }));
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    let mut outcomes = Vec::new();
    for h in handles {
        outcomes.push(h.await.unwrap().unwrap());
    }

    let presented: Vec<_> = outcomes.iter().filter(|o| o.is_presented()).collect();
    assert_eq!(presented.len(), 1);
    assert!(outcomes.last().unwrap().is_presented());
    let RenderOutcome::Presented(last) = outcomes.pop().unwrap() else { unreachable!() };
    assert_eq!(session.current(), Some(last));
}

#[tokio::test]
async fn request_superseded_at_the_fonts_gate_never_presents() {
    let (signal, fonts) = FontsReady::pending();
    let session = RenderSession::new(fonts, config(0));

    let older = tokio::spawn({
        let s = session.clone();
        async move { s.render(cover("C,D")).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    let newer = tokio::spawn({
        let s = session.clone();
        async move { s.render(cover("E,F")).await }
    });

    assert_eq!(older.await.unwrap().unwrap(), RenderOutcome::Superseded);
    assert!(session.current().is_none());

    signal.fire(Arc::new(HeadlessRasterizer::new()));
    let RenderOutcome::Presented(shot) = newer.await.unwrap().unwrap() else {
        panic!("latest request was not presented")
    };
    assert_eq!(session.current(), Some(shot));
}

#[tokio::test]
async fn genuine_failures_surface() {
    let fonts = FontsReady::ready(Arc::new(HeadlessRasterizer::new()));
    let session = RenderSession::new(fonts, RenderConfig { max_surface_pixels: 16, ..config(0) });
    let err = session.render(Arc::new(PostScene::default())).await.unwrap_err();
    assert!(matches!(err, Error::SurfaceError(_)));
    assert!(session.current().is_none());
}

#[tokio::test]
async fn dropped_fonts_signal_is_reported() {
    let (signal, fonts) = FontsReady::pending();
    drop(signal);
    let session = RenderSession::new(fonts, config(0));
    let err = session.render(cover("A,B")).await.unwrap_err();
    assert!(matches!(err, Error::FontError(_)));
}

#[tokio::test]
async fn images_load_through_the_worker_cache() {
    let dir = std::env::temp_dir().join(format!("fcdesign-async-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("logo.png");
    let logo = Pixmap::vertical_gradient(4, 4, Rgba::WHITE, Rgba::BLACK).unwrap();
    std::fs::write(&path, logo.encode_png().unwrap()).unwrap();

    let session = RenderSession::new(FontsReady::ready(Arc::new(HeadlessRasterizer::new())), config(0));
    let a = session.load_image(&path).await.unwrap();
    let b = session.load_image(&path).await.unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*a, logo);
    assert!(session.load_image(dir.join("missing.png")).await.is_err());
    session.close().await.unwrap();
    let _ = std::fs::remove_dir_all(dir);
}
