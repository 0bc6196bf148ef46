use approx::assert_relative_eq;
use chrono::{DateTime, Duration, TimeZone, Utc};

use gnssr_sentinel::catalog::BUILTIN_CATALOG;
use gnssr_sentinel::projection::geodetic_from_scene;
use gnssr_sentinel::{Catalog, GeodeticCoordinate, LinkRole, SceneConfig, SentinelScene};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()
}

#[test]
fn baltic_target_over_one_day() {
    let scene = SentinelScene::builtin().unwrap();

    for step in 0..48 {
        let at = start() + Duration::minutes(30 * step);
        let frame = scene.evaluate(at, Some(GeodeticCoordinate::BALTIC_SECTOR));

        assert_eq!(frame.satellites.len(), 9);
        assert_eq!(frame.links.len(), 2, "at {at}");
        assert!(frame.links[0].true_distance <= frame.links[1].true_distance);
        assert_eq!(frame.links[0].role, LinkRole::Receiver);
        assert_eq!(frame.links[1].role, LinkRole::Transmitter);
        assert_ne!(frame.links[0].satellite_index, frame.links[1].satellite_index);

        for sat in &frame.satellites {
            let p = sat.render_position.expect("every builtin satellite propagates");
            assert!(p.is_finite());
        }
    }
}

#[test]
fn target_marker_sits_on_the_target() {
    let scene = SentinelScene::builtin().unwrap();
    let frame = scene.evaluate(start(), Some(GeodeticCoordinate::BALTIC_SECTOR));
    let marker = frame.target.unwrap();
    let back = geodetic_from_scene(&marker).unwrap();
    assert_relative_eq!(back.lat_deg, 54.2, epsilon = 1e-9);
    assert_relative_eq!(back.lon_deg, 12.1, epsilon = 1e-9);

    // Every link ends at the marker.
    for link in &frame.links {
        assert_eq!(link.target, marker);
    }
}

#[test]
fn single_satellite_catalog_gets_one_link() {
    let iss: String = BUILTIN_CATALOG.lines().take(3).collect::<Vec<_>>().join("\n");
    let scene = SentinelScene::new(Catalog::parse(&iss).unwrap(), SceneConfig::default()).unwrap();

    let frame = scene.evaluate(start(), Some(GeodeticCoordinate::new(0.0, 0.0)));
    assert_eq!(frame.links.len(), 1);
    assert!(frame.link(LinkRole::Transmitter).is_none());
    assert_relative_eq!(frame.links[0].satellite.radius(), 2.5, epsilon = 1e-9);
}

#[test]
fn custom_config_from_json() {
    let config = SceneConfig::from_json(
        r#"{ "globe_radius": 1.0, "marker_radius": 1.02, "altitude_compression": 1.0, "link_count": 3 }"#,
    )
    .unwrap();
    let scene = SentinelScene::new(Catalog::builtin().unwrap(), config).unwrap();
    let frame = scene.evaluate(start(), Some(GeodeticCoordinate::BALTIC_SECTOR));

    assert_eq!(frame.links.len(), 3);
    assert_eq!(frame.links[2].role, LinkRole::Auxiliary);

    // No compression: unlinked markers sit at their true positions.
    for sat in frame.satellites.iter().filter(|s| s.link_role.is_none()) {
        let drawn = sat.render_position.unwrap();
        let truth = sat.true_position.unwrap();
        assert_relative_eq!(drawn.0, truth.0, epsilon = 1e-12);
        assert!(truth.radius() > 1.0 && truth.radius() < 1.2);
    }
}

#[test]
fn orbit_paths_for_every_satellite() {
    let scene = SentinelScene::builtin().unwrap();
    let paths = scene.orbit_paths(start());
    assert_eq!(paths.len(), 9);
    for path in &paths {
        assert_eq!(path.points.len(), 128);
        assert!(path.points.iter().all(|p| p.is_finite() && p.radius() > 2.0));
        assert!(path.period_minutes > 90.0 && path.period_minutes < 100.0);
    }
}

#[test]
fn snapshot_serializes() {
    let scene = SentinelScene::builtin().unwrap();
    let frame = scene.evaluate(start(), Some(GeodeticCoordinate::BALTIC_SECTOR));
    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.contains("SENTINEL-P1"));
    assert!(json.contains("Receiver"));
}
