//! Picking demo application
//!
//! Builds a field of procedural sphere, cube and dumbbell instances, fires
//! random rays into it and reports what each ray hit. A sample of the rays is
//! cross-checked against a linear scan over every triangle.
//!
//! Usage: `picking_demo [octree.toml | octree.ron]`

use std::sync::Arc;
use std::time::Instant;

use mesh_octree::config::{Config, OctreeConfig};
use mesh_octree::foundation::logging;
use mesh_octree::foundation::math::{Mat4, Vec3};
use mesh_octree::geometry::{MeshIntersection, Ray};
use mesh_octree::mesh::{shapes, Model};
use mesh_octree::picking::{PickHit, PickScene, ALL_LAYERS};
use rand::{rngs::StdRng, Rng, SeedableRng};

const RAY_COUNT: usize = 5000;
const VERIFIED_RAYS: usize = 250;
const GRID_EXTENT: i32 = 3;
const SPACING: f32 = 5.0;

const LAYER_ROUND: u32 = 0b01;
const LAYER_BOXY: u32 = 0b10;

fn load_config() -> Result<OctreeConfig, Box<dyn std::error::Error>> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(OctreeConfig::default());
    };

    let config = OctreeConfig::load_from_file(&path)?;
    config.validate()?;
    log::info!("Loaded octree config from {}: {:?}", path, config);
    Ok(config)
}

struct Models {
    sphere: Arc<Model>,
    cube: Arc<Model>,
    dumbbell: Arc<Model>,
}

fn build_models(config: &OctreeConfig) -> Result<Models, Box<dyn std::error::Error>> {
    let sphere_mesh = shapes::unit_sphere_with_config(shapes::SPHERE_GRID_SIZE, config)?;
    let cube_mesh = shapes::unit_cube_with_config(config)?;

    let stats = sphere_mesh.octree().stats();
    log::info!(
        "Sphere octree: {} triangles, {} nodes, {} leaves, depth {}, {} residual",
        sphere_mesh.triangles().len(),
        stats.node_count,
        stats.leaf_count,
        stats.max_depth,
        stats.residual_count
    );

    let mut sphere = Model::new("sphere");
    sphere.add_mesh(sphere_mesh.clone(), Mat4::identity())?;

    let mut cube = Model::new("cube");
    cube.add_mesh(cube_mesh.clone(), Mat4::new_scaling(0.8))?;

    // Two spheres joined by a thin bar
    let mut dumbbell = Model::new("dumbbell");
    let ball = Mat4::new_scaling(0.6);
    let left = Mat4::new_translation(&Vec3::new(-1.2, 0.0, 0.0)) * ball;
    let right = Mat4::new_translation(&Vec3::new(1.2, 0.0, 0.0)) * ball;
    let bar = Mat4::new_nonuniform_scaling(&Vec3::new(1.2, 0.15, 0.15));
    dumbbell.add_mesh(sphere_mesh.clone(), left)?;
    dumbbell.add_mesh(sphere_mesh, right)?;
    dumbbell.add_mesh(cube_mesh, bar)?;

    Ok(Models {
        sphere: Arc::new(sphere),
        cube: Arc::new(cube),
        dumbbell: Arc::new(dumbbell),
    })
}

fn build_scene(models: &Models, rng: &mut StdRng) -> Result<PickScene, Box<dyn std::error::Error>> {
    let mut scene = PickScene::new();

    for x in -GRID_EXTENT..=GRID_EXTENT {
        for z in -GRID_EXTENT..=GRID_EXTENT {
            let translation = Mat4::new_translation(&Vec3::new(
                x as f32 * SPACING,
                rng.gen_range(-1.0..1.0),
                z as f32 * SPACING,
            ));
            let rotation = Mat4::from_euler_angles(
                rng.gen_range(0.0..std::f32::consts::TAU),
                rng.gen_range(0.0..std::f32::consts::TAU),
                rng.gen_range(0.0..std::f32::consts::TAU),
            );
            let scale = Mat4::new_nonuniform_scaling(&Vec3::new(
                rng.gen_range(0.5..1.5),
                rng.gen_range(0.5..1.5),
                rng.gen_range(0.5..1.5),
            ));

            let (model, layers) = match (x + z).rem_euclid(3) {
                0 => (&models.sphere, LAYER_ROUND),
                1 => (&models.cube, LAYER_BOXY),
                _ => (&models.dumbbell, LAYER_ROUND | LAYER_BOXY),
            };
            scene.add_instance(Arc::clone(model), translation * rotation * scale, layers)?;
        }
    }

    log::info!("Scene holds {} instances", scene.len());
    Ok(scene)
}

/// Nearest world-space distance found by testing every triangle of every instance
fn linear_scan(scene: &PickScene, ray: &Ray) -> Option<f32> {
    let length = ray.direction.norm();
    let mut best: Option<f32> = None;

    for (_, instance) in scene.iter() {
        for placed in instance.model().meshes() {
            let world_to_mesh = placed.model_to_mesh * instance.world_to_model();
            let mesh_ray = ray.transformed(&world_to_mesh);

            let mut nearest = MeshIntersection::new(0.0);
            for triangle in placed.mesh.triangles() {
                triangle.is_intersecting(placed.mesh.vertices(), &mesh_ray, &mut nearest);
            }
            if nearest.valid() {
                let distance = nearest.t * length;
                best = Some(best.map_or(distance, |current| current.min(distance)));
            }
        }
    }

    best
}

fn random_ray(rng: &mut StdRng) -> Ray {
    let extent = GRID_EXTENT as f32 * SPACING;
    let direction = Vec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(0.2..1.0),
        rng.gen_range(-1.0..1.0),
    );
    let origin = direction.normalize() * (extent * 2.5);
    let target = Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-extent..extent),
    );
    Ray::from_points(origin, target)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");

    println!("=== Mesh Octree Picking Demo ===");

    let config = load_config()?;
    let mut rng = StdRng::seed_from_u64(0x5EED);

    let build_start = Instant::now();
    let models = build_models(&config)?;
    let scene = build_scene(&models, &mut rng)?;
    log::info!("Built models and scene in {:?}", build_start.elapsed());

    let rays: Vec<Ray> = (0..RAY_COUNT).map(|_| random_ray(&mut rng)).collect();

    let pick_start = Instant::now();
    let hits: Vec<Option<PickHit>> = rays.iter().map(|ray| scene.pick(ray, ALL_LAYERS)).collect();
    let pick_time = pick_start.elapsed();

    let hit_count = hits.iter().flatten().count();
    println!(
        "{} rays, {} hits, {:.2} us per pick",
        RAY_COUNT,
        hit_count,
        pick_time.as_secs_f64() * 1e6 / RAY_COUNT as f64
    );

    for hit in hits.iter().flatten().take(5) {
        let instance = scene.instance(hit.instance).map_or("?", |instance| instance.model().name());
        log::info!(
            "Hit {} mesh {} triangle {} at {:?}, distance {:.3}, normal {:?}",
            instance,
            hit.mesh_index,
            hit.triangle,
            hit.intersection.position,
            hit.intersection.t,
            hit.intersection.normal
        );
    }

    let round_hits = rays.iter().filter(|ray| scene.pick(ray, LAYER_ROUND).is_some()).count();
    let boxy_hits = rays.iter().filter(|ray| scene.pick(ray, LAYER_BOXY).is_some()).count();
    println!("Layer hits: round {round_hits}, boxy {boxy_hits}");

    let mut mismatches = 0;
    for (ray, hit) in rays.iter().zip(&hits).take(VERIFIED_RAYS) {
        let expected = linear_scan(&scene, ray);
        let found = hit.as_ref().map(|hit| hit.intersection.t);
        let agree = match (expected, found) {
            (Some(expected), Some(found)) => (expected - found).abs() <= 1e-3 * expected.max(1.0),
            (None, None) => true,
            _ => false,
        };
        if !agree {
            mismatches += 1;
            log::warn!(
                "Octree and linear scan disagree for {:?}: {:?} vs {:?}",
                ray,
                found,
                expected
            );
        }
    }
    println!("Cross-checked {VERIFIED_RAYS} rays against a linear scan: {mismatches} mismatches");

    Ok(())
}
