// Host-side tests for option parsing and validation.

use fx_core::{Background, ConfigError, DisplayEnv, EffectKind, EffectOptions, Viewport};

fn desktop() -> DisplayEnv {
    DisplayEnv {
        viewport_width: 1920.0,
        viewport_height: 1080.0,
        device_pixel_ratio: 2.5,
    }
}

fn phone() -> DisplayEnv {
    DisplayEnv {
        viewport_width: 390.0,
        viewport_height: 844.0,
        device_pixel_ratio: 3.0,
    }
}

#[test]
fn empty_json_means_defaults() {
    let opts = EffectOptions::from_json("").unwrap();
    assert_eq!(opts, EffectOptions::default());
    let opts = EffectOptions::from_json("{}").unwrap();
    assert_eq!(opts.kind, EffectKind::FlowField);
}

#[test]
fn camel_case_json_is_accepted() {
    let json = r#"{
        "kind": "starfield",
        "particleCount": 4000,
        "palette": [[1.0, 1.0, 1.0], [0.5, 0.5, 0.5]],
        "speeds": { "orbit": 2.0 },
        "input": { "scrollSmoothing": 0.1 },
        "display": { "maxPixelRatio": 1.5 },
        "seed": 5
    }"#;
    let opts = EffectOptions::from_json(json).unwrap();
    let s = opts.resolve(desktop()).unwrap();
    assert_eq!(s.kind, EffectKind::Starfield);
    assert_eq!(s.particle_count, 4000);
    assert_eq!(s.speeds.orbit, 2.0);
    assert_eq!(s.input.scroll_smoothing, 0.1);
    assert_eq!(s.seed, 5);
    assert_eq!(s.effective_pixel_ratio(2.5), 1.5);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = EffectOptions::from_json(r#"{ "partcleCount": 10 }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn zero_particle_count_fails_fast() {
    let opts = EffectOptions {
        particle_count: Some(0),
        ..EffectOptions::default()
    };
    let err = opts.resolve(desktop()).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { field: "particleCount", .. }));
}

#[test]
fn smoothing_outside_unit_interval_fails() {
    let mut opts = EffectOptions::default();
    opts.input.smoothing = 1.5;
    assert!(opts.resolve(desktop()).is_err());
    opts.input.smoothing = 0.0;
    assert!(opts.resolve(desktop()).is_err());
}

#[test]
fn non_finite_values_fail() {
    let mut opts = EffectOptions::default();
    opts.flow.bounds = f32::INFINITY;
    let err = opts.resolve(desktop()).unwrap_err();
    assert_eq!(err, ConfigError::NotFinite { field: "flow.bounds" });
}

#[test]
fn decay_of_one_would_never_expire() {
    let mut opts = EffectOptions::for_kind(EffectKind::Trail);
    opts.trail.decay = 1.0;
    assert!(opts.resolve(desktop()).is_err());
}

#[test]
fn oversized_or_empty_palette_fails() {
    let opts = EffectOptions {
        palette: Some(vec![[0.1, 0.1, 0.1]; 5]),
        ..EffectOptions::default()
    };
    assert_eq!(
        opts.resolve(desktop()).unwrap_err(),
        ConfigError::Palette { len: 5, max: 4 }
    );
    let opts = EffectOptions {
        palette: Some(vec![]),
        ..EffectOptions::default()
    };
    assert!(opts.resolve(desktop()).is_err());
}

#[test]
fn phones_get_reduced_count_and_ratio() {
    let s = EffectOptions::for_kind(EffectKind::FlowField)
        .resolve(phone())
        .unwrap();
    assert!(s.is_mobile);
    assert_eq!(s.particle_count, 2000);
    assert_eq!(s.effective_pixel_ratio(3.0), 1.0);
    let vp = Viewport::new(390.0, 844.0, 3.0, s.pixel_ratio_cap);
    assert_eq!(vp.physical_size(), (390, 844));
}

#[test]
fn explicit_mobile_count_is_capped_by_desktop_count() {
    let opts = EffectOptions {
        particle_count: Some(100),
        mobile_particle_count: Some(500),
        ..EffectOptions::default()
    };
    assert_eq!(opts.resolve(phone()).unwrap().particle_count, 100);
}

#[test]
fn trail_decay_scales_with_speed() {
    let mut opts = EffectOptions::for_kind(EffectKind::Trail);
    opts.speeds.decay = 2.0;
    let s = opts.resolve(desktop()).unwrap();
    assert!((s.trail.decay - 0.84).abs() < 1e-6);
}

#[test]
fn background_override_wins() {
    let opts = EffectOptions {
        kind: EffectKind::Starfield,
        background: Some(Background::Noise),
        ..EffectOptions::default()
    };
    assert_eq!(opts.resolve(desktop()).unwrap().background, Background::Noise);
}

#[test]
fn low_density_screens_keep_their_ratio_in_the_backing_store() {
    let s = EffectOptions::default().resolve(desktop()).unwrap();
    let vp = Viewport::new(1920.0, 1080.0, 0.5, s.pixel_ratio_cap);
    assert_eq!(s.effective_pixel_ratio(0.5), 0.5);
    assert_eq!(vp.pixel_ratio, s.effective_pixel_ratio(0.5));
    assert_eq!(vp.physical_size(), (960, 540));
}

#[test]
fn particle_grid_is_named_and_thinned_on_phones() {
    assert_eq!(EffectKind::from_name("particle-grid"), Some(EffectKind::ParticleGrid));
    assert_eq!(EffectKind::from_name("particles"), Some(EffectKind::ParticleGrid));
    assert_eq!(EffectKind::ParticleGrid.name(), "particle-grid");

    let opts = EffectOptions::for_kind(EffectKind::ParticleGrid);
    assert_eq!(opts.resolve(desktop()).unwrap().particle_count, 2000);
    assert_eq!(opts.resolve(phone()).unwrap().particle_count, 400);
}
