mod support;

use semantic_model_viewer::{Outcome, Page, ViewRoute, Viewer, ViewerSession};
use std::sync::Arc;
use std::time::Duration;

use support::{sample_source, MemorySource, BATCH, SERIAL_PART};

fn session(source: Arc<MemorySource>) -> Arc<ViewerSession<MemorySource>> {
    let viewer = Viewer::new(source, Duration::from_secs(300));
    Arc::new(ViewerSession::new(Arc::new(viewer)))
}

fn browse(model: &str, version: Option<&str>) -> ViewRoute {
    ViewRoute::Browse {
        model: model.to_string(),
        version: version.map(str::to_string),
    }
}

#[tokio::test]
async fn test_open_home_loads_catalogue() {
    let session = session(Arc::new(sample_source()));
    assert!(session.catalogue().is_none());

    let page = session.open_url("/").await.unwrap().current().unwrap();
    match page {
        Page::Home(catalogue) => assert_eq!(catalogue.len(), 2),
        other => panic!("expected home page, got {:?}", other),
    }
    assert!(session.catalogue().is_some());
    assert_eq!(session.route(), ViewRoute::Home);
}

#[tokio::test]
async fn test_browse_without_version_selects_latest() {
    let session = session(Arc::new(sample_source()));

    let page = session
        .open_url("/models/io.catenax.batch")
        .await
        .unwrap()
        .current()
        .unwrap();
    match page {
        Page::Model(view) => {
            assert_eq!(view.version, "2.0.0");
            assert!(view.attributes.is_ready());
        }
        other => panic!("expected model page, got {:?}", other),
    }
    assert_eq!(session.route(), browse(BATCH, Some("2.0.0")));
    assert_eq!(
        session.route().to_url(),
        "/models/io.catenax.batch/versions/2.0.0"
    );
}

#[tokio::test]
async fn test_diff_route_is_made_explicit() {
    let session = session(Arc::new(sample_source()));

    let outcome = session.open_url("/diff?model=io.catenax.batch").await.unwrap();
    assert!(matches!(outcome, Outcome::Current(Page::Diff(_))));
    assert_eq!(
        session.route().to_url(),
        "/diff?model=io.catenax.batch&from=1.0.0&to=2.0.0"
    );
}

#[tokio::test]
async fn test_unknown_url_falls_back_to_home() {
    let session = session(Arc::new(sample_source()));

    let outcome = session.open_url("/nowhere/at/all").await.unwrap();
    assert!(matches!(outcome, Outcome::Current(Page::Home(_))));
}

#[tokio::test]
async fn test_failed_navigation_keeps_previous_route() {
    let session = session(Arc::new(sample_source()));
    session.open(browse(BATCH, Some("1.0.0"))).await.unwrap();

    let result = session.open(browse("io.catenax.unknown", None)).await;
    assert!(result.is_err());
    assert_eq!(session.route(), browse(BATCH, Some("1.0.0")));
}

#[tokio::test]
async fn test_catalogue_failure_disables_browsing_until_refresh() {
    let source = Arc::new(sample_source());
    source.set_tree_failure(true);
    let session = session(source.clone());

    assert!(session.open_url("/").await.is_err());
    assert!(session.catalogue().is_none());

    source.set_tree_failure(false);
    let catalogue = session.refresh_catalogue().await.unwrap();
    assert!(catalogue.model(SERIAL_PART).is_some());
}

#[tokio::test]
async fn test_navigation_resets_diagram_transform() {
    let session = session(Arc::new(sample_source()));
    session.open(browse(BATCH, Some("2.0.0"))).await.unwrap();

    session.zoom_diagram(-100.0);
    session.begin_pan(10.0, 10.0);
    session.pan_to(30.0, 50.0);
    session.end_pan();
    let moved = session.diagram_transform();
    assert!((moved.zoom - 1.1).abs() < 1e-9);
    assert_eq!((moved.translate_x, moved.translate_y), (20.0, 40.0));

    session.open(browse(BATCH, Some("1.0.0"))).await.unwrap();
    let reset = session.diagram_transform();
    assert_eq!(reset.zoom, 1.0);
    assert_eq!((reset.translate_x, reset.translate_y), (0.0, 0.0));
}

#[tokio::test]
async fn test_slow_load_is_superseded_by_newer_navigation() {
    let source = Arc::new(sample_source());
    let session = session(source.clone());
    session.refresh_catalogue().await.unwrap();

    source.hold("io.catenax.batch/1.0.0/gen/Batch-schema.json");
    let slow = {
        let session = session.clone();
        tokio::spawn(async move { session.open(browse(BATCH, Some("1.0.0"))).await })
    };
    source.entered.notified().await;

    let fast = session.open(browse(SERIAL_PART, None)).await.unwrap();
    assert!(matches!(fast, Outcome::Current(Page::Model(_))));

    source.release.notify_one();
    let stale = slow.await.unwrap().unwrap();
    assert_eq!(stale, Outcome::Superseded);
    assert_eq!(session.route(), browse(SERIAL_PART, Some("1.0.0")));
}
