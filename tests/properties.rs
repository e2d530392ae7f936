use approx::assert_relative_eq;
use nbody_raytracer::scene::default_lights;
use nbody_raytracer::utils::random_scene;
use nbody_raytracer::{
    Body, Camera, Color, ExecutionMode, Frame, FrameTime, Material, Scene, Simulation, Vec3,
};

fn sphere(pos: Vec3, vel: Vec3, mass: f32, radius: f32) -> Body {
    Body::new(pos, vel, mass, radius, Material::new(Color::new(1.0, 1.0, 1.0), 0.0))
}

fn simulation(g: f64, bodies: Vec<Body>, frame_time: f32) -> Simulation {
    let scene = Scene::new(g, bodies, default_lights(), Camera::default()).unwrap();
    let mut sim = Simulation::new(scene);
    sim.frame_time = FrameTime::Fixed(frame_time);
    sim
}

#[test]
fn equal_masses_swap_velocities_head_on() {
    let mut sim = simulation(
        0.0,
        vec![
            sphere(Vec3::zero(), Vec3::new(1.0, 0.0, 0.0), 1.0, 1.0),
            sphere(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 1.0, 1.0),
        ],
        10.0,
    );

    let report = sim.advance();
    assert_eq!(report.collisions, 1);
    assert_eq!(report.mini_steps, 2);

    let bodies = sim.scene.bodies();
    assert_relative_eq!(bodies[0].vel.x, -1.0, epsilon = 1e-5);
    assert_relative_eq!(bodies[1].vel.x, 1.0, epsilon = 1e-5);
    // contact at t = 4, then 6 more time units apart
    assert_relative_eq!(bodies[0].pos.x, -2.0, epsilon = 1e-3);
    assert_relative_eq!(bodies[1].pos.x, 12.0, epsilon = 1e-3);
}

#[test]
fn bodies_at_rest_without_gravity_stay_put() {
    let bodies = vec![
        sphere(Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0, 1.0),
        sphere(Vec3::new(0.0, 50.0, 0.0), Vec3::zero(), 2.0, 3.0),
        sphere(Vec3::new(0.0, 0.0, 80.0), Vec3::zero(), 5.0, 2.0),
    ];
    let mut sim = simulation(0.0, bodies.clone(), 1.0);

    for _ in 0..10 {
        let report = sim.advance();
        assert_eq!(report.mini_steps, 1);
        assert_eq!(report.collisions, 0);
        assert_eq!(sim.scene.bodies(), bodies.as_slice());
    }
}

#[test]
fn mini_steps_cover_the_whole_frame() {
    let mut sim = Simulation::new(random_scene(40, 9));
    for _ in 0..3 {
        let expected = sim.frame_time.for_bodies(sim.scene.body_count()) as f64;
        let report = sim.advance();
        assert!(report.mini_steps >= 1);
        assert_relative_eq!(report.elapsed, expected, max_relative = 1e-4);
    }
}

#[test]
fn fast_bodies_do_not_pass_through_each_other() {
    let mut sim = simulation(
        0.0,
        vec![
            sphere(Vec3::zero(), Vec3::new(50.0, 0.0, 0.0), 1.0, 1.0),
            sphere(Vec3::new(100.0, 0.0, 0.0), Vec3::new(-50.0, 0.0, 0.0), 1.0, 1.0),
        ],
        1.0,
    );

    let report = sim.advance();
    assert_eq!(report.collisions, 1);
    let bodies = sim.scene.bodies();
    assert!(bodies[0].pos.x < bodies[1].pos.x);
    assert!((bodies[1].pos - bodies[0].pos).mag() >= 2.0);
    assert!(bodies[0].vel.x < 0.0 && bodies[1].vel.x > 0.0);
}

#[test]
fn gravity_driven_approach_keeps_surfaces_apart() {
    let mut sim = simulation(
        10.0,
        vec![
            sphere(Vec3::new(-1.5, 0.0, 0.0), Vec3::zero(), 1.0, 1.0),
            sphere(Vec3::new(1.5, 0.0, 0.0), Vec3::zero(), 1.0, 1.0),
            sphere(Vec3::new(0.0, 6.0, 0.0), Vec3::new(0.0, -3.0, 0.0), 2.0, 1.5),
        ],
        1.0,
    );

    let mut collisions = 0;
    for _ in 0..8 {
        collisions += sim.advance().collisions;
        let bodies = sim.scene.bodies();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let d = (bodies[i].pos - bodies[j].pos).mag();
                let reach = bodies[i].radius + bodies[j].radius;
                assert!(d >= reach, "bodies {i} and {j}: centers {d} apart, radii sum {reach}");
            }
        }
    }
    assert!(collisions > 0);
}

#[test]
fn sphere_at_the_origin_is_lit_and_corners_are_background() {
    let sim = simulation(
        0.0,
        vec![sphere(Vec3::zero(), Vec3::zero(), 1.0, 10.0)],
        1.0,
    );
    let mut frame = Frame::new(256, 128);
    sim.render(&mut frame);

    let center = frame.pixel(128, 64);
    assert!(center.iter().sum::<f32>() > 0.0);
    assert!(center.iter().all(|c| (0.0..=1.0).contains(c)));
    assert_eq!(frame.pixel(0, 0), [0.0; 3]);
    assert_eq!(frame.pixel(255, 127), [0.0; 3]);
}

#[test]
fn empty_scene_renders_black() {
    let sim = simulation(1.0, Vec::new(), 1.0);
    let mut frame = Frame::new(16, 8);
    frame.pixels.fill(0.5);
    sim.render(&mut frame);
    assert!(frame.pixels.iter().all(|&c| c == 0.0));
}

#[test]
fn sorted_bodies_need_no_shifts() {
    let mut sim = Simulation::new(random_scene(32, 2));
    sim.sort_by_depth();
    assert_eq!(sim.sort_by_depth(), 0);

    let eye = sim.scene.camera.eye;
    let dists: Vec<f32> = sim
        .scene
        .bodies()
        .iter()
        .map(|b| (b.pos - eye).mag())
        .collect();
    assert!(dists.windows(2).all(|w| w[0] <= w[1] * (1.0 + 1e-6)));
}

#[test]
fn reference_and_parallel_agree_bit_for_bit() {
    let mut reference = Simulation::new(random_scene(48, 5));
    reference.set_mode(ExecutionMode::Reference);
    let mut parallel = Simulation::new(random_scene(48, 5));
    parallel.set_mode(ExecutionMode::Parallel);

    let mut a = Frame::new(64, 32);
    let mut b = Frame::new(64, 32);
    for _ in 0..3 {
        let ra = reference.step(&mut a);
        let rb = parallel.step(&mut b);
        assert_eq!(ra, rb);
        assert_eq!(reference.scene.bodies(), parallel.scene.bodies());
        assert_eq!(a, b);
    }
}

#[test]
fn active_counts_limit_what_is_drawn() {
    let mut sim = simulation(
        0.0,
        vec![
            sphere(Vec3::new(0.0, 0.0, 0.0), Vec3::zero(), 1.0, 10.0),
            sphere(Vec3::new(0.0, 40.0, 0.0), Vec3::zero(), 1.0, 10.0),
        ],
        1.0,
    );
    sim.scene.set_active_bodies(0);
    assert_eq!(sim.scene.active_body_count(), 1);
    sim.scene.set_active_lights(99);
    assert_eq!(sim.scene.active_light_count(), default_lights().len());
}
