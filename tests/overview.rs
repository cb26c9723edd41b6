use rice_racer::graphics::{samples_per_curve, Canvas, MiniMap, Rect, TrackOverview};
use rice_racer::simulation::{Car, Race};
use rice_racer::track::{ControlPoint, Track};
use std::f32::consts::PI;
use std::sync::Arc;

fn oval() -> Arc<Track> {
    Arc::new(
        Track::build(
            "Oval",
            5,
            vec![
                ControlPoint::new([0.0, 0.0, 0.0], [0.0, 0.0, 100.0]),
                ControlPoint::new([100.0, 0.0, 0.0], [0.0, 0.0, -100.0]),
            ],
        )
        .expect("oval builds"),
    )
}

fn map_rect() -> Rect {
    Rect::new(800.0 * 0.68, 600.0 * 0.05, 800.0 * 0.3, 600.0 * 0.3)
}

#[test]
fn test_sample_density_scales_with_control_points() {
    assert_eq!(samples_per_curve(2), 40);
    assert_eq!(samples_per_curve(8), 10);
    assert_eq!(samples_per_curve(16), 6);
    assert_eq!(samples_per_curve(0), 80);
}

#[test]
fn test_minimap_fits_the_track_into_its_rect() {
    let track = oval();
    let rect = map_rect();
    let map = MiniMap::new(&track, rect);

    let outline = map.outline();
    assert_eq!(outline.len(), samples_per_curve(2) * 2 + 1);
    assert_eq!(outline.first(), outline.last());

    // Curve samples may reach a little past the outermost segment
    let slack = Rect::new(rect.x - 1.0, rect.y - 1.0, rect.width + 2.0, rect.height + 2.0);
    for point in outline {
        assert!(slack.contains(point), "{:?} outside {:?}", point, rect);
    }

    // The oval is wider than it is deep, so its width fills the rect
    let xs = outline.iter().map(|p| p.x);
    let span = xs.clone().fold(f32::MIN, f32::max) - xs.fold(f32::MAX, f32::min);
    assert!((span - rect.width).abs() < 2.0, "span {}", span);
    assert!((map.scale() - rect.width / 100.0).abs() < 0.05);

    let centre = map.project(&track.bounds().centre().expect("non-empty bounds"));
    assert!((centre - rect.centre()).norm() < 1e-3);
}

#[test]
fn test_minimap_marks_every_car_in_race_order() {
    let track = oval();
    let map = MiniMap::new(&track, map_rect());
    let race = Race::new(Car::roster(&["Racer X", "Joe", "Scott", "John"]), Arc::clone(&track), Some(4));

    let markers = map.markers(&race);
    assert_eq!(markers.len(), 4);
    for (index, marker) in markers.iter().enumerate() {
        assert_eq!(marker.place, index + 1);
        assert_eq!(marker.car, race.standings()[index]);
    }

    let human: Vec<_> = markers.iter().filter(|marker| marker.is_human).collect();
    assert_eq!(human.len(), 1);
    assert_eq!(human[0].place, 4);
}

#[test]
fn test_overview_draws_closed_edges() {
    let track = oval();
    let overview = TrackOverview::new(&track, Canvas::new(800.0, 600.0));

    let extent = track.bounds().size();
    assert!((overview.radius() - (extent.x.max(extent.z) + 20.0)).abs() < 1e-4);
    assert_eq!(overview.camera().pitch(), TrackOverview::PITCH);

    let [left, right] = overview.edges();
    assert!(left.len() > 2 && left.len() == right.len());
    assert_eq!(left.first(), left.last());
    assert_eq!(right.first(), right.last());

    let base = overview.base();
    assert_eq!(base.len(), 5);
    assert!(overview.start_line().is_some());
}

#[test]
fn test_overview_orbits_the_track() {
    let track = oval();
    let mut overview = TrackOverview::new(&track, Canvas::new(800.0, 600.0));
    let radius = overview.radius();
    let before = overview.edges();

    overview.set_rotation(PI / 2.0);
    let camera = overview.camera();
    assert!((camera.position.x + radius).abs() < 1e-3);
    assert!(camera.position.z.abs() < 1e-3);
    assert!((camera.position.y - radius).abs() < 1e-6);
    assert!((camera.yaw() - PI / 2.0).abs() < 1e-6);

    assert_ne!(overview.edges(), before);

    overview.set_rotation(0.0);
    assert_eq!(overview.edges(), before);
}
