use donkeyvis::config::UiConfig;
use donkeyvis::font::TextRenderer;
use donkeyvis::overlay::OverlayStyle;
use donkeyvis::pilot::ConstantPilot;
use donkeyvis::scrub::Scrubber;
use donkeyvis::tub::TubReader;
use donkeyvis::types::{Controls, RecordId};
use donkeyvis::view::RecordView;
use donkeyvis::VisError;
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;

// Ten records, ids 1000, 1010, ..., 1090, human steering varies per record.
fn write_tub(dir: &Path) -> Vec<RecordId> {
    fs::write(
        dir.join("meta.json"),
        r#"{"inputs": ["cam/image_array", "user/angle", "user/throttle", "user/mode"],
            "types": ["image_array", "float", "float", "str"]}"#,
    )
    .unwrap();

    (0..10u64)
        .map(|i| {
            let id = 1000 + 10 * i;
            let image_name = format!("{}_cam-image_array_.jpg", id);
            RgbImage::from_pixel(160, 120, Rgb([90, 90, 90]))
                .save(dir.join(&image_name))
                .unwrap();
            let record = serde_json::json!({
                "cam/image_array": image_name,
                "user/angle": -0.5 + i as f64 * 0.1,
                "user/throttle": 0.3,
                "user/mode": "user",
            });
            fs::write(dir.join(format!("record_{}.json", id)), record.to_string()).unwrap();
            id
        })
        .collect()
}

fn zero_pilot_view(dir: &Path) -> RecordView {
    let reader = TubReader::open(dir.to_str().unwrap()).unwrap();
    RecordView::new(reader, Box::new(ConstantPilot::new(Controls::new(0.0, 0.0))))
}

fn style() -> OverlayStyle {
    OverlayStyle::with_text(&UiConfig::default(), TextRenderer::bitmap(2)).unwrap()
}

#[test]
fn slider_to_five_shows_fifth_record_and_zero_pilot_arrow() {
    let dir = tempfile::tempdir().unwrap();
    let ids = write_tub(dir.path());
    let mut view = zero_pilot_view(dir.path());
    let style = style();
    let mut scrubber = Scrubber::new(&mut view, &style).unwrap();

    assert!(scrubber.set_position(5).unwrap());
    let frame = scrubber.frame();
    assert_eq!(frame.record_id, ids[5]);
    assert_eq!(frame.status, format!("5 {}", ids[5]));

    let arrows = &frame.plot.arrows;
    assert_eq!(arrows.len(), 2);
    let robot = arrows.iter().find(|a| a.spec.label == "robot").unwrap();
    let human = arrows.iter().find(|a| a.spec.label == "human").unwrap();
    assert_eq!(robot.geometry.length(), 0.0);
    assert!(human.geometry.length() > 0.0);
    assert!((human.spec.controls.angle - 0.0).abs() < 1e-6);
    assert!((human.spec.controls.throttle - 0.3).abs() < 1e-6);
}

#[test]
fn first_record_is_shown_without_interaction() {
    let dir = tempfile::tempdir().unwrap();
    let ids = write_tub(dir.path());
    let mut view = zero_pilot_view(dir.path());
    let style = style();
    let scrubber = Scrubber::new(&mut view, &style).unwrap();

    assert_eq!(scrubber.position(), 0);
    assert_eq!(scrubber.frame().record_id, ids[0]);
    assert_eq!(scrubber.frame().plot.image.dimensions(), (640, 480));
}

#[test]
fn every_position_round_trips_through_the_view() {
    let dir = tempfile::tempdir().unwrap();
    let ids = write_tub(dir.path());
    let mut view = zero_pilot_view(dir.path());

    assert_eq!(view.count(), 10);
    for (p, id) in ids.iter().enumerate() {
        let record = view.get(p).unwrap();
        assert_eq!(record.position, p);
        assert_eq!(record.record_id, *id);
        assert_eq!(record.pilot, Controls::new(0.0, 0.0));
    }
    assert!(matches!(
        view.get(10),
        Err(VisError::IndexOutOfRange { position: 10, count: 10 })
    ));
}

#[test]
fn revisiting_a_position_renders_the_same_plot() {
    let dir = tempfile::tempdir().unwrap();
    write_tub(dir.path());
    let mut view = zero_pilot_view(dir.path());
    let style = style();
    let mut scrubber = Scrubber::new(&mut view, &style).unwrap();

    scrubber.set_position(7).unwrap();
    let first: Vec<_> = scrubber.frame().plot.arrows.iter().map(|a| a.geometry).collect();
    let first_image = scrubber.frame().plot.image.clone();

    scrubber.set_position(2).unwrap();
    scrubber.set_position(7).unwrap();
    let second: Vec<_> = scrubber.frame().plot.arrows.iter().map(|a| a.geometry).collect();

    assert_eq!(first, second);
    assert_eq!(first_image, scrubber.frame().plot.image);
}
