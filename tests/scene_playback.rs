use euclid::default::Point2D;
use shape_animator::engine::{Document, Engine, FormatError, StepSignal};
use shape_animator::renderer::Renderer;
use shape_animator::types::Frame;

const ORBIT: &str = include_str!("../demos/orbit.txt");
const ARRIVAL: &str = include_str!("../demos/arrival.txt");
const PENDULUM: &str = include_str!("../demos/pendulum.txt");

fn close(a: Point2D<f64>, b: Point2D<f64>) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

#[test]
fn demo_durations() {
    // Cycles of 60, 120, 40 and 90 steps only realign after 360.
    assert_eq!(Document::load(ORBIT).unwrap().duration(), 360);
    // One-shots only: the slowest one decides.
    assert_eq!(Document::load(ARRIVAL).unwrap().duration(), 100);
    assert_eq!(Document::load(PENDULUM).unwrap().duration(), 50);
}

#[test]
fn demos_round_trip_through_save() {
    for text in [ORBIT, ARRIVAL, PENDULUM] {
        let doc = Document::load(text).unwrap();
        let reloaded = Document::load(&doc.save()).unwrap();
        assert_eq!(reloaded, doc);
    }
}

#[test]
fn cyclic_rotate_can_outlast_a_one_shot_move() {
    let one_shot = "100 100\n1\ncircle 10 10 5 red\n1\nmove 50 50 10\n";
    assert_eq!(Document::load(one_shot).unwrap().duration(), 10);

    let with_cycle = "100 100\n2\ncircle 10 10 5 red\n1\nmove 50 50 10\ntriangle 50 50 5 0 blue\n1\nrotate 90 6 cycle\n";
    assert_eq!(Document::load(with_cycle).unwrap().duration(), 12);
}

#[test]
fn cyclic_state_repeats_after_duration() {
    let doc = Document::load(PENDULUM).unwrap();
    let d = doc.duration();
    for step in [0, 7, 25, 49] {
        for i in 0..doc.shapes().len() {
            assert_eq!(doc.pose_at(i, step), doc.pose_at(i, step + d));
        }
    }
}

#[test]
fn one_shot_move_holds_at_target() {
    let doc = Document::load(ARRIVAL).unwrap();
    let triangle = 1;
    for step in [100, 101, 500] {
        let center = doc.pose_at(triangle, step).unwrap().transform_point(Point2D::origin());
        assert!(close(center, Point2D::new(150.0, 500.0)));
    }
}

#[test]
fn move_then_rotate_differs_from_rotate_then_move() {
    let a = Document::load("100 100\n1\nrectangle 50 50 10 10 0 red\n2\nmove 60 50 1\nrotate 90 1\n").unwrap();
    let b = Document::load("100 100\n1\nrectangle 50 50 10 10 0 red\n2\nrotate 90 1\nmove 60 50 1\n").unwrap();
    let probe = Point2D::new(5.0, 0.0);
    let pa = a.pose_at(0, 1).unwrap().transform_point(probe);
    let pb = b.pose_at(0, 1).unwrap().transform_point(probe);
    assert!(close(pa, Point2D::new(60.0, 55.0)));
    assert!(close(pb, Point2D::new(50.0, 65.0)));
}

#[test]
fn step_clamping_signals_stop() {
    let mut doc = Document::load(ARRIVAL).unwrap();
    assert_eq!(doc.set_step(-5), StepSignal::Continue);
    assert_eq!(doc.step(), 0);
    assert_eq!(doc.set_step(doc.duration() as i64 + 100), StepSignal::Stop);
    assert_eq!(doc.step(), doc.duration() - 1);
}

#[test]
fn failed_reload_keeps_the_active_document() {
    let mut active = Document::load(ORBIT).unwrap();
    let _ = active.set_step(17);
    let snapshot = active.clone();

    let broken = "800 600\n2\ncircle 1 2 3 red\n0\n";
    match Document::load(broken) {
        Ok(doc) => active = doc,
        Err(e) => assert!(matches!(e, FormatError::UnexpectedEnd { .. })),
    }
    assert_eq!(active, snapshot);
    assert_eq!(active.step(), 17);
}

#[test]
fn export_covers_every_step() {
    let doc = Document::load(PENDULUM).unwrap();
    let renderer = Renderer::new(10.0, 20.0);
    let presentation = renderer.render(Engine::compile(&doc, None));
    assert_eq!(presentation.frames.len(), doc.duration());
    assert_eq!(presentation.contract.width, 60);
    assert_eq!(presentation.contract.height, 20);
    assert!(matches!(presentation.frames[0], Frame::Full { .. }));
    assert!(presentation.frames[1..].iter().all(|f| matches!(f, Frame::Diff { .. })));
}
