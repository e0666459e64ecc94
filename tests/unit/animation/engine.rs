use super::*;
use crate::foundation::core::Size;

fn page(n: u32) -> PageNumber {
    PageNumber::new(n).unwrap()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn anim(p: u32, delay_ms: u64, duration_ms: u64, trigger: TriggerKind) -> Arc<AnimationConfig> {
    Arc::new(AnimationConfig {
        page: page(p),
        icon: "star.svg".to_owned(),
        center_x: 50.0,
        center_y: 25.0,
        size: 10.0,
        duration_ms,
        delay_ms,
        trigger,
    })
}

fn metrics() -> ImageMetrics {
    ImageMetrics {
        natural: Size::new(2000.0, 1000.0),
        rendered: Size::new(1000.0, 500.0),
    }
}

fn engine() -> AnimationTimingEngine {
    AnimationTimingEngine::new(&GalleryConfig::default())
}

#[test]
fn attach_creates_hidden_placed_instances() {
    let mut e = engine();
    let n = e.attach(
        page(1),
        &[anim(1, 0, 3_000, TriggerKind::Visible)],
        Some(metrics()),
    );
    assert_eq!(n, 1);
    let inst = &e.instances(page(1))[0];
    assert_eq!(inst.phase(), AnimationPhase::Created);
    let b = inst.bounds().unwrap();
    assert_eq!(b.width, 10.0);
    assert_eq!(b.height, 20.0);
    assert_eq!(b.left, 45.0);
    assert_eq!(b.top, 15.0);

    // Second attach is ignored.
    assert_eq!(
        e.attach(page(1), &[anim(1, 0, 10, TriggerKind::Hover)], None),
        0
    );
    assert_eq!(e.instances(page(1)).len(), 1);
}

#[test]
fn visible_trigger_fires_once_per_page() {
    let t0 = Instant::now();
    let mut e = engine();
    e.attach(
        page(1),
        &[
            anim(1, 0, 3_000, TriggerKind::Visible),
            anim(1, 0, 3_000, TriggerKind::Hover),
        ],
        None,
    );
    assert_eq!(e.on_visibility(page(1), true, t0), 1);
    assert_eq!(e.on_visibility(page(1), false, t0 + ms(100)), 0);
    assert_eq!(e.on_visibility(page(1), true, t0 + ms(200)), 0);
    assert_eq!(e.instances(page(1))[0].triggered_at(), Some(t0));
    assert_eq!(e.instances(page(1))[1].phase(), AnimationPhase::Created);
}

#[test]
fn hover_requires_page_in_view() {
    let t0 = Instant::now();
    let mut e = engine();
    e.attach(page(2), &[anim(2, 0, 3_000, TriggerKind::Hover)], None);
    assert_eq!(e.on_pointer_enter(page(2), t0), 0);
    e.on_visibility(page(2), true, t0);
    assert_eq!(e.on_pointer_enter(page(2), t0 + ms(10)), 1);
    assert_eq!(e.on_pointer_enter(page(2), t0 + ms(20)), 0);
    assert_eq!(e.on_pointer_enter(page(9), t0), 0);
}

#[test]
fn tick_walks_the_full_timeline() {
    let t0 = Instant::now();
    let mut e = engine();
    e.attach(page(1), &[anim(1, 200, 3_000, TriggerKind::Visible)], None);
    e.on_visibility(page(1), true, t0);

    let mut now = t0;
    while let Some(deadline) = e.next_deadline() {
        assert!(deadline >= now);
        now = deadline;
        e.tick(now);
    }
    let inst = &e.instances(page(1))[0];
    assert_eq!(
        inst.history(),
        &[
            AnimationPhase::Created,
            AnimationPhase::Delayed,
            AnimationPhase::Visible,
            AnimationPhase::Pulsing,
            AnimationPhase::Exiting,
            AnimationPhase::Removed,
        ]
    );
    assert_eq!(now, t0 + ms(3_200));
    assert!(e.frames(page(1), now).is_empty());
}

#[test]
fn frames_fade_in_and_pulse() {
    let t0 = Instant::now();
    let mut e = engine();
    e.attach(page(1), &[anim(1, 0, 5_000, TriggerKind::Visible)], None);
    e.on_visibility(page(1), true, t0);

    let f = &e.frames(page(1), t0)[0];
    assert_eq!(f.opacity, 0.0);
    let f = &e.frames(page(1), t0 + ms(200))[0];
    assert!(f.opacity > 0.5 && f.opacity < 1.0);
    assert_eq!(f.scale, 1.0);

    // Half a pulse period into the pulse window the scale peaks.
    let f = &e.frames(page(1), t0 + ms(400 + 600))[0];
    assert_eq!(f.opacity, 1.0);
    assert!(f.scale > 1.07);
}

#[test]
fn hide_fades_from_current_opacity_and_is_idempotent() {
    let t0 = Instant::now();
    let sink = std::rc::Rc::new(crate::events::RecordingSink::new());
    let mut e = engine().with_events(Events::new(sink.clone()));
    e.attach(page(1), &[anim(1, 0, 5_000, TriggerKind::Visible)], None);
    e.on_visibility(page(1), true, t0);
    e.tick(t0 + ms(1_000));

    assert_eq!(e.hide(page(1), 0, t0 + ms(1_000)), HideOutcome::Started);
    assert_eq!(e.hide(page(1), 0, t0 + ms(1_050)), HideOutcome::Ignored);
    assert_eq!(e.instances(page(1))[0].phase(), AnimationPhase::Hiding);

    let mid = &e.frames(page(1), t0 + ms(1_150))[0];
    assert!((mid.opacity - 0.5).abs() < 1e-9);

    assert_eq!(e.next_deadline(), Some(t0 + ms(1_300)));
    e.tick(t0 + ms(1_300));
    let inst = &e.instances(page(1))[0];
    assert_eq!(inst.phase(), AnimationPhase::HiddenPermanent);
    assert_eq!(
        inst.history()
            .iter()
            .filter(|p| **p == AnimationPhase::Hiding)
            .count(),
        1
    );
    assert_eq!(e.hide(page(1), 0, t0 + ms(2_000)), HideOutcome::Ignored);
    assert_eq!(e.next_deadline(), None);
    assert_eq!(
        sink.count(|ev| matches!(ev, GalleryEvent::AnimationHidden { .. })),
        1
    );
}

#[test]
fn hidden_instance_ignores_later_triggers() {
    let t0 = Instant::now();
    let mut e = engine();
    e.attach(page(3), &[anim(3, 0, 2_000, TriggerKind::Hover)], None);
    assert_eq!(e.hide(page(3), 0, t0), HideOutcome::Started);
    e.on_visibility(page(3), true, t0);
    assert_eq!(e.on_pointer_enter(page(3), t0 + ms(10)), 0);
    assert_eq!(e.instances(page(3))[0].triggered_at(), None);
}

#[test]
fn hide_unknown_instance_is_ignored() {
    let mut e = engine();
    assert_eq!(e.hide(page(1), 0, Instant::now()), HideOutcome::Ignored);
    e.attach(page(1), &[anim(1, 0, 100, TriggerKind::Visible)], None);
    assert_eq!(e.hide(page(1), 5, Instant::now()), HideOutcome::Ignored);
}

#[test]
fn hide_page_hides_every_instance() {
    let t0 = Instant::now();
    let mut e = engine();
    e.attach(
        page(1),
        &[
            anim(1, 0, 3_000, TriggerKind::Visible),
            anim(1, 0, 3_000, TriggerKind::Hover),
        ],
        None,
    );
    assert_eq!(e.hide_page(page(1), t0), 2);
    assert_eq!(e.hide_page(page(1), t0), 0);
}

#[test]
fn reposition_updates_bounds() {
    let mut e = engine();
    e.attach(page(1), &[anim(1, 0, 3_000, TriggerKind::Visible)], None);
    assert!(e.instances(page(1))[0].bounds().is_none());
    e.reposition(page(1), metrics());
    assert!(e.instances(page(1))[0].bounds().is_some());
}

#[tokio::test(start_paused = true)]
async fn drive_runs_until_every_timeline_ends() {
    let t0 = Instant::now();
    let e = RefCell::new(engine());
    e.borrow_mut().attach(
        page(1),
        &[
            anim(1, 0, 1_000, TriggerKind::Visible),
            anim(1, 500, 3_000, TriggerKind::Visible),
        ],
        None,
    );
    e.borrow_mut().on_visibility(page(1), true, t0);

    let changes = AnimationTimingEngine::drive(&e).await;
    assert!(changes >= 6);
    assert_eq!(t0.elapsed(), ms(3_500));
    let e = e.borrow();
    assert!(
        e.instances(page(1))
            .iter()
            .all(|i| i.phase() == AnimationPhase::Removed)
    );
}
