//! Overlap demo
//!
//! Headless run of the collision world:
//! - A ring of boxes, spheres and capsules drifting inside a bounded arena
//! - Per-frame LBVH rebuild, frustum culling and centre-screen picking
//! - Begin / end / hit overlap events logged as they happen
//!
//! Usage: `overlap_demo [config.toml|config.ron]`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_engine::foundation::logging;
use spatial_engine::prelude::*;

// Arena bounds: -ARENA_HALF_SIZE to +ARENA_HALF_SIZE on each axis
const ARENA_HALF_SIZE: f32 = 25.0;

const NUM_OBJECTS: usize = 48;
const RING_RADIUS: f32 = 15.0;
const MAX_SPEED: f32 = 6.0;

const FRAMES: usize = 240;
const FRAME_DT: f32 = 1.0 / 60.0;

// Camera
const CAMERA_FOV_DEGREES: f32 = 60.0;
const CAMERA_ASPECT: f32 = 16.0 / 9.0;
const CAMERA_NEAR: f32 = 0.1;
const CAMERA_FAR: f32 = 200.0;

struct Mover {
    handle: ObjectHandle,
    position: Vec3,
    velocity: Vec3,
    spin: Vec3,
    rotation: Quat,
}

impl Mover {
    fn step(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.rotation = Quat::from_scaled_axis(self.spin * dt) * self.rotation;

        // Bounce off the arena walls
        for axis in 0..3 {
            if self.position[axis].abs() > ARENA_HALF_SIZE {
                self.position[axis] = self.position[axis].clamp(-ARENA_HALF_SIZE, ARENA_HALF_SIZE);
                self.velocity[axis] = -self.velocity[axis];
            }
        }
    }

    fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.rotation)
    }
}

struct OverlapDemo {
    world: CollisionWorld,
    movers: Vec<Mover>,
    camera_projection: Mat4,
    notified: NotifiedPairs<ObjectHandle>,
    events: OverlapEventLog<ObjectHandle>,
}

impl OverlapDemo {
    fn new(config: &SpatialConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = CollisionWorld::new(config);

        let mut descs = Vec::with_capacity(NUM_OBJECTS);
        let mut motion = Vec::with_capacity(NUM_OBJECTS);
        for i in 0..NUM_OBJECTS {
            let angle = i as f32 / NUM_OBJECTS as f32 * std::f32::consts::TAU;
            let position = Vec3::new(angle.cos() * RING_RADIUS, rng.gen_range(-2.0..2.0), angle.sin() * RING_RADIUS);

            let shape = match i % 3 {
                0 => CollisionShape::sphere(rng.gen_range(0.5..1.5)),
                1 => CollisionShape::cuboid(Vec3::new(
                    rng.gen_range(0.4..1.2),
                    rng.gen_range(0.4..1.2),
                    rng.gen_range(0.4..1.2),
                )),
                _ => CollisionShape::capsule(rng.gen_range(0.3..0.7), rng.gen_range(1.0..2.0)),
            };

            // Every fourth object is solid so hit events show up too
            let response = if i % 4 == 0 { CollisionResponse::Block } else { CollisionResponse::Overlap };
            let layer = if i % 4 == 0 { CollisionLayers::WORLD_STATIC } else { CollisionLayers::WORLD_DYNAMIC };

            let velocity = Vec3::new(
                rng.gen_range(-MAX_SPEED..MAX_SPEED),
                rng.gen_range(-MAX_SPEED..MAX_SPEED) * 0.25,
                rng.gen_range(-MAX_SPEED..MAX_SPEED),
            );
            let spin = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));

            descs.push(
                CollisionObjectDesc::new(shape, Transform::from_position(position))
                    .with_layers(layer, CollisionLayers::all())
                    .with_response(response),
            );
            motion.push((position, velocity, spin));
        }

        let handles = world.bulk_spawn(descs);
        let movers = handles
            .into_iter()
            .zip(motion)
            .map(|(handle, (position, velocity, spin))| Mover {
                handle,
                position,
                velocity,
                spin,
                rotation: Quat::identity(),
            })
            .collect();

        let camera_projection = Mat4::perspective(
            CAMERA_FOV_DEGREES.to_radians(),
            CAMERA_ASPECT,
            CAMERA_NEAR,
            CAMERA_FAR,
        );

        Self {
            world,
            movers,
            camera_projection,
            notified: NotifiedPairs::new(),
            events: OverlapEventLog::new(),
        }
    }

    fn run_frame(&mut self, frame: usize) {
        for mover in &mut self.movers {
            mover.step(FRAME_DT);
            self.world.set_transform(mover.handle, mover.transform());
        }
        self.world.flush_rebuild();

        // Orbit the camera around the arena
        let orbit = frame as f32 * FRAME_DT * 0.5;
        let eye = Vec3::new(orbit.cos() * 45.0, 12.0, orbit.sin() * 45.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        let frustum = Frustum::from_matrix(&(self.camera_projection * view));
        let visible = self.world.cull(&frustum);

        let ray = Ray::new(eye, -eye);
        let picked = self.world.pick(&ray, CAMERA_FAR);

        let notifications = self.world.update_overlaps(&mut self.notified, &mut self.events);

        for event in self.events.drain() {
            log::debug!("frame {frame}: {:?} {:?} -> {:?}", event.kind, event.this, event.other);
        }

        if frame % 60 == 0 {
            log::info!(
                "frame {frame}: {} visible, {} notifications, picked {:?}",
                visible.len(),
                notifications,
                picked.map(|hit| (hit.handle, hit.distance))
            );
        }
    }

    fn run(mut self) {
        log::info!("Running {FRAMES} frames with {} objects", self.movers.len());
        for frame in 0..FRAMES {
            self.run_frame(frame);
        }

        let stats = self.world.index().stats();
        log::info!(
            "Final index: {} tracked, {} nodes, depth {}",
            stats.tracked,
            stats.nodes,
            stats.max_occupied_depth
        );
        self.world.index().debug_dump();
    }
}

fn load_config() -> SpatialConfig {
    let Some(path) = std::env::args().nth(1) else {
        return SpatialConfig::default();
    };

    match SpatialConfig::load_validated(&path) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet
            eprintln!("Failed to load config from {path}: {e}; using defaults");
            SpatialConfig::default()
        }
    }
}

fn main() {
    let config = load_config();

    logging::init_with_level(&config.log_level);
    log::info!("Spatial config: {config:?}");

    OverlapDemo::new(&config, 0x0b7e_c7ed).run();
}
