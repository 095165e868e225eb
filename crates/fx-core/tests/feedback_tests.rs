// Host-side tests for the flow-field feedback rule (CPU reference).

use fx_core::constants::{FLOW_START_X, NOISE_TEXTURE_SIZE};
use fx_core::options::FlowOptions;
use fx_core::{CpuFeedback, FlowRule, FlowSeed};
use glam::{Vec4, Vec4Swizzles};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seed(count: usize) -> FlowSeed {
    let mut rng = StdRng::seed_from_u64(11);
    FlowSeed::generate(count, &mut rng)
}

fn rule() -> FlowRule {
    FlowRule::from_options(&FlowOptions::default())
}

#[test]
fn seed_places_movers_on_the_start_ring() {
    let s = seed(500);
    assert_eq!(s.layout.side, 23);
    assert_eq!(s.initial_velocity.len(), 23 * 23);
    assert_eq!(s.noise.texels.len(), (NOISE_TEXTURE_SIZE * NOISE_TEXTURE_SIZE) as usize);
    for v in &s.initial_velocity[..500] {
        assert_eq!(v.x, FLOW_START_X);
        let r = (v.y * v.y + v.z * v.z).sqrt();
        assert!((5.0 - 1e-3..=15.0 + 1e-3).contains(&r), "radius {r}");
        assert_eq!(v.w, 0.0);
    }
    assert!(s.delay.iter().all(|d| (0.0..10.0).contains(d)));
    assert!(s.mass.iter().all(|m| (0.0..1.0).contains(m)));
    assert_eq!(s.velocity_first, s.initial_velocity);
}

#[test]
fn zero_dt_skips_the_step() {
    let mut sim = CpuFeedback::start(&seed(64), rule());
    let before = sim.current_velocity().to_vec();
    assert!(!sim.update(0.0));
    assert_eq!(sim.steps(), 0);
    assert_eq!(sim.time(), 0.0);
    assert_eq!(sim.current_velocity(), &before[..]);
}

#[test]
fn each_step_swaps_each_pair_once() {
    let mut sim = CpuFeedback::start(&seed(64), rule());
    for n in 1..=5u64 {
        let acc_front = sim.acceleration_buffers().front_index();
        let vel_front = sim.velocity_buffers().front_index();
        assert!(sim.update(1.0 / 60.0));
        assert_eq!(sim.acceleration_buffers().swap_count(), n);
        assert_eq!(sim.velocity_buffers().swap_count(), n);
        assert_ne!(sim.acceleration_buffers().front_index(), acc_front);
        assert_ne!(sim.velocity_buffers().front_index(), vel_front);
    }
}

#[test]
fn delayed_particles_hold_their_spawn_state() {
    let mut s = seed(4);
    s.delay[0] = 1.0;
    s.delay[1] = 0.0;
    let mut sim = CpuFeedback::start(&s, rule());
    for _ in 0..30 {
        sim.update(1.0 / 60.0);
    }
    // half a second in: particle 0 is still waiting, particle 1 has launched
    let v = sim.current_velocity();
    assert_eq!(v[0], s.velocity_first[0]);
    assert_eq!(sim.current_acceleration()[0], Vec4::ZERO);
    assert_ne!(v[1].xyz(), s.velocity_first[1].xyz());
    assert!(v[1].w > 0.0);
}

#[test]
fn aged_particles_respawn_at_their_origin() {
    let mut s = seed(4);
    for d in s.delay.iter_mut() {
        *d = 0.0;
    }
    let rule = FlowRule {
        respawn_lifetime: 0.5,
        ..rule()
    };
    let mut sim = CpuFeedback::start(&s, rule);
    let mut respawned = false;
    for _ in 0..60 {
        sim.update(1.0 / 60.0);
        let v = sim.current_velocity()[0];
        assert!(v.w <= 0.5 + 1.0 / 60.0 + 1e-4);
        if v.w == 0.0 {
            assert_eq!(v.xyz(), s.velocity_first[0].xyz());
            respawned = true;
        }
    }
    assert!(respawned);
    assert_eq!(sim.current_velocity().len(), s.layout.texel_count());
}

#[test]
fn movers_leaving_bounds_are_reset() {
    let s = seed(1);
    let rule = rule();
    let far = Vec4::new(1000.0, 0.0, 0.0, 1.0);
    let acc = rule.step_acceleration(Vec4::ONE, far, Vec4::splat(0.5), 0.5, 0.0, 5.0, 0.016);
    assert_eq!(acc, Vec4::ZERO);
    let vel = rule.step_velocity(far, acc, s.velocity_first[0], 0.0, 5.0, 0.016);
    assert_eq!(vel, s.velocity_first[0].xyz().extend(0.0));
}
