//! Pointer dispatch tests: hit testing, layer priority, selection side
//! effects, hover, debouncing.

use std::time::Duration;

use mvt_overlay::{FeatureId, LngLat, PointerEvent, PointerOptions};

use super::test_utils::*;

fn click_options() -> PointerOptions {
    PointerOptions {
        set_selected: true,
        ..PointerOptions::default()
    }
}

/// At zoom 0 the whole world is tile 0:0:0 and lng/lat (0, 0) lands on
/// pixel (128, 128).
const CENTER: LngLat = LngLat { lng: 0.0, lat: 0.0 };

/// Still inside tile 0:0:0, but east of the fixtures' squares.
const OFF_FEATURE: LngLat = LngLat { lng: 120.0, lat: 0.0 };

#[tokio::test]
async fn test_click_hits_and_selects_feature() {
    let (overlay, _fetcher, factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let hits = overlay
        .on_click(PointerEvent::new(CENTER), click_options())
        .await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].layer, "water");
    assert_eq!(hits[0].tile, ctx.id);
    let feature = hits[0].feature.as_ref().expect("feature under pointer");
    assert_eq!(feature.id, Some(FeatureId::from("a")));
    assert!(feature.selected);
    assert!(overlay.is_feature_selected(&FeatureId::from("a")));
}

#[tokio::test]
async fn test_click_miss_reports_layer_without_feature() {
    let (overlay, _fetcher, factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let hits = overlay
        .on_click(PointerEvent::new(OFF_FEATURE), click_options())
        .await;

    assert_eq!(hits.len(), 1);
    assert!(hits[0].feature.is_none());
    assert!(overlay.selected_features().is_empty());
}

#[tokio::test]
async fn test_click_outside_visible_tiles_is_noop() {
    let (overlay, _fetcher, _factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);

    let hits = overlay
        .on_click(PointerEvent::new(CENTER), click_options())
        .await;
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_layers_walked_in_reverse_declared_order() {
    let tile = StaticTile {
        layers: vec![
            (
                "roads".to_string(),
                StaticLayer {
                    features: vec![StaticFeature::square(Some("r"), 96, 160)],
                },
            ),
            (
                "pois".to_string(),
                StaticLayer {
                    features: vec![StaticFeature::square(Some("p"), 96, 160)],
                },
            ),
        ],
    };
    let (overlay, _fetcher, factory) =
        engine(tile, mvt_overlay::OverlayConfig::with_url(TEST_URL));
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let hits = overlay
        .on_click(PointerEvent::new(CENTER), PointerOptions::default())
        .await;

    // Last declared layer is on top, so it is visited first.
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].layer, "pois");
    assert_eq!(hits[1].layer, "roads");
}

#[tokio::test]
async fn test_limit_to_first_visible_layer_stops_early() {
    let tile = StaticTile {
        layers: vec![
            (
                "roads".to_string(),
                StaticLayer {
                    features: vec![StaticFeature::square(Some("r"), 96, 160)],
                },
            ),
            (
                "pois".to_string(),
                StaticLayer {
                    features: vec![StaticFeature::square(Some("p"), 96, 160)],
                },
            ),
        ],
    };
    let (overlay, _fetcher, factory) =
        engine(tile, mvt_overlay::OverlayConfig::with_url(TEST_URL));
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let options = PointerOptions {
        limit_to_first_visible_layer: true,
        ..PointerOptions::default()
    };
    let hits = overlay.on_click(PointerEvent::new(CENTER), options).await;

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].layer, "pois");
}

#[tokio::test]
async fn test_click_toggles_selection() {
    let (overlay, _fetcher, factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    overlay
        .on_click(PointerEvent::new(CENTER), click_options())
        .await;
    assert!(overlay.is_feature_selected(&FeatureId::from("a")));

    overlay
        .on_click(PointerEvent::new(CENTER), click_options())
        .await;
    assert!(!overlay.is_feature_selected(&FeatureId::from("a")));
}

#[tokio::test]
async fn test_toggle_disabled_keeps_selection() {
    let (overlay, _fetcher, factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let options = PointerOptions {
        set_selected: true,
        toggle_selection: false,
        ..PointerOptions::default()
    };
    overlay
        .on_click(PointerEvent::new(CENTER), options.clone())
        .await;
    overlay.on_click(PointerEvent::new(CENTER), options).await;
    assert!(overlay.is_feature_selected(&FeatureId::from("a")));
}

#[tokio::test]
async fn test_hover_selects_on_enter_and_deselects_on_leave() {
    let (overlay, _fetcher, factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    overlay
        .on_hover(PointerEvent::new(CENTER), click_options())
        .await;
    assert!(overlay.is_feature_selected(&FeatureId::from("a")));

    // Hovering the same feature again does not toggle it off.
    overlay
        .on_hover(PointerEvent::new(CENTER), click_options())
        .await;
    assert!(overlay.is_feature_selected(&FeatureId::from("a")));

    // Moving off the feature deselects everything.
    overlay
        .on_hover(PointerEvent::new(OFF_FEATURE), click_options())
        .await;
    assert!(overlay.selected_features().is_empty());
}

#[tokio::test]
async fn test_anonymous_feature_hit_is_reported_not_selected() {
    let (overlay, _fetcher, factory) =
        water_engine(vec![StaticFeature::square(None, 96, 160)]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let hits = overlay
        .on_click(PointerEvent::new(CENTER), click_options())
        .await;

    let feature = hits[0].feature.as_ref().expect("feature under pointer");
    assert_eq!(feature.id, None);
    assert!(!feature.selected);
    assert!(overlay.selected_features().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_debounced_dispatch_last_event_wins() {
    let (overlay, _fetcher, factory) = water_engine(vec![StaticFeature::square(
        Some("a"),
        96,
        160,
    )]);
    let ctx = overlay.get_tile(0, 0, 0, &factory);
    overlay.load_tile(&ctx).await.expect("load");

    let options = PointerOptions {
        set_selected: true,
        delay: Duration::from_millis(50),
        ..PointerOptions::default()
    };
    let (first, second) = tokio::join!(
        overlay.on_click(PointerEvent::new(CENTER), options.clone()),
        overlay.on_click(PointerEvent::new(CENTER), options),
    );

    assert!(first.is_empty(), "superseded dispatch must be inert");
    assert_eq!(second.len(), 1);
    assert!(overlay.is_feature_selected(&FeatureId::from("a")));
}
