mod support;

use scrubline::{PropValue, RegionPlan, ScrollEngine, Target, Timeline};
use support::{Page, hero_config};

fn attached(duration: f64) -> (ScrollEngine, Page) {
    let mut page = Page::new(Some(duration));
    let mut engine = ScrollEngine::new(hero_config()).unwrap();
    engine.attach(&mut page).unwrap();
    (engine, page)
}

#[test]
fn fixture_validates_and_plans_tail() {
    let cfg = hero_config();
    assert_eq!(cfg.groups.len(), 7);

    let plan = RegionPlan::new(10.0, 800.0, cfg.tail_fraction_for(10.0)).unwrap();
    assert_eq!(plan.media_units, 8000.0);
    assert!((plan.total_units - 8960.0).abs() < 1e-9);
    assert!((plan.video_end_fraction() - 8000.0 / 8960.0).abs() < 1e-12);
}

#[test]
fn attach_writes_initial_state_before_progress() {
    let (_engine, page) = attached(10.0);
    assert_eq!(page.commits.len(), 1);
    assert_eq!(page.position, None);
    for sel in [".hero-title", ".hero-tyres", ".hero-chasis", ".hero-engine", ".hero-speed"] {
        assert_eq!(page.opacity(sel), 0.0);
        assert_eq!(page.visibility(sel), "hidden");
    }
    let caption = page.style(&Target::Ref("hero-caption".to_string()));
    assert_eq!(caption["opacity"], PropValue::Number(0.0));
    assert_eq!(
        page.style(&Target::Selector(".hero-video".to_string()))["maskSize"].to_string(),
        "5000%"
    );
}

#[test]
fn title_fades_in_then_out() {
    let (mut engine, mut page) = attached(10.0);

    // Title shows at 0.85s over 0.2s with the default out-quad ease.
    engine.apply_at(0.095, &mut page);
    assert!((page.opacity(".hero-title") - 0.75).abs() < 1e-9);
    assert_eq!(page.visibility(".hero-title"), "visible");

    engine.apply_at(0.12, &mut page);
    assert_eq!(page.opacity(".hero-title"), 1.0);
    assert_eq!(page.opacity(".hero-tyres"), 0.0);

    engine.apply_at(0.23, &mut page);
    assert_eq!(page.opacity(".hero-title"), 0.0);
    assert_eq!(page.visibility(".hero-title"), "hidden");
    assert_eq!(page.opacity(".hero-tyres"), 1.0);
}

#[test]
fn band_caption_follows_its_window() {
    let (mut engine, mut page) = attached(10.0);
    let caption = Target::Ref("hero-caption".to_string());

    engine.apply_at(0.11, &mut page);
    let op = page.style(&caption)["opacity"].as_number().unwrap();
    assert!((op - 0.5).abs() < 1e-9);

    engine.apply_at(0.25, &mut page);
    assert_eq!(page.style(&caption)["opacity"], PropValue::Number(0.0));
    assert_eq!(page.style(&caption)["visibility"], PropValue::hidden());
}

#[test]
fn tail_holds_media_at_its_end() {
    let (mut engine, mut page) = attached(10.0);
    let end = engine.region().unwrap().plan.video_end_fraction();

    let at_end = engine.on_progress(end, &mut page).unwrap();
    assert_eq!(at_end.content_progress, 1.0);
    assert_eq!(page.position, Some(10.0));
    let writes = page.position_writes;

    let in_tail = engine.on_progress(0.97, &mut page).unwrap();
    assert_eq!(in_tail.content_progress, 1.0);
    assert_eq!(in_tail.media_position, Some(10.0));
    assert_eq!(in_tail.style_writes, 0);
    assert_eq!(page.position_writes, writes);
    assert_eq!(page.visibility(".hero-speed"), "hidden");
}

#[test]
fn repeated_progress_is_idempotent() {
    let (mut engine, mut page) = attached(10.0);
    let first = engine.on_progress(0.3, &mut page).unwrap();
    assert!(first.style_writes > 0);
    let commits = page.commits.len();
    let styles = page.styles.clone();

    let second = engine.on_progress(0.3, &mut page).unwrap();
    assert_eq!(second.style_writes, 0);
    assert_eq!(page.commits.len(), commits);
    assert_eq!(page.styles, styles);
}

#[test]
fn scrubbing_back_matches_forward_scrub() {
    let (mut jumped, mut page_a) = attached(10.0);
    jumped.on_progress(0.9, &mut page_a);
    jumped.on_progress(0.2, &mut page_a);

    let (mut scrubbed, mut page_b) = attached(10.0);
    for i in 0..=20 {
        scrubbed.on_progress(i as f64 / 100.0, &mut page_b);
    }

    assert_eq!(page_a.styles, page_b.styles);
    assert_eq!(page_a.position, page_b.position);
}

#[test]
fn boundaries_give_baseline_and_final_states() {
    let (mut engine, mut page) = attached(10.0);
    let cfg = hero_config();

    engine.apply_at(0.6, &mut page);
    engine.apply_at(0.0, &mut page);
    for group in &cfg.groups {
        let live = page.style(&group.target);
        for (name, value) in group.baseline() {
            assert_eq!(live[&name], value, "{} {name}", group.target);
        }
    }

    engine.apply_at(1.0, &mut page);
    for sel in [".hero-title", ".hero-tyres", ".hero-chasis", ".hero-engine", ".hero-speed"] {
        assert_eq!(page.visibility(sel), "hidden", "{sel}");
    }
    assert_eq!(
        page.style(&Target::Selector(".hero-video".to_string()))["maskSize"].to_string(),
        "20%"
    );
}

#[test]
fn timeline_sample_matches_engine_writes() {
    let cfg = hero_config();
    let tl = Timeline::compile(&cfg.groups, 10.0).unwrap();
    let (mut engine, mut page) = attached(10.0);
    engine.apply_at(0.4, &mut page);

    for state in tl.sample(0.4) {
        let live = page.style(&state.target);
        for (name, value) in &state.props {
            assert_eq!(&live[name], value);
        }
    }
}
