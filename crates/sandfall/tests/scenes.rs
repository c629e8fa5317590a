//! Bundled scene files load and behave

use std::path::PathBuf;

use glam::IVec2;
use sandfall::render::ascii_snapshot;
use sandfall::runner::{self, RunOptions};
use sandfall::{PixelRenderer, Scene};
use sandfall_core::world::{SimParams, World};
use sandfall_simulation::{MaterialId, Materials};

fn scenes_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenes")
}

fn load_world(scene: &Scene) -> World {
    let params = SimParams::with_size(
        scene.width.expect("scene sets a width"),
        scene.height.expect("scene sets a height"),
    );
    let mut world = World::new(params, Materials::new()).expect("valid world");
    scene.apply_strokes(&mut world).expect("strokes apply");
    world
}

fn options(ticks: u64) -> RunOptions {
    RunOptions {
        ticks,
        seed: 3,
        incremental: false,
        show_progress: false,
    }
}

#[test]
fn test_all_bundled_scenes_load() {
    let mut found = 0;
    for entry in std::fs::read_dir(scenes_dir()).expect("scenes directory") {
        let path = entry.expect("dir entry").path();
        if path.extension().is_some_and(|ext| ext == "ron") {
            let scene = Scene::from_file(&path)
                .unwrap_or_else(|e| panic!("{}: {e:#}", path.display()));
            let world = load_world(&scene);
            scene
                .validate_materials(&world)
                .unwrap_or_else(|e| panic!("{}: {e:#}", path.display()));
            found += 1;
        }
    }
    assert!(found >= 2);
}

#[test]
fn test_hourglass_drains_through_the_neck() {
    let scene = Scene::from_file(scenes_dir().join("hourglass.ron")).unwrap();
    let mut world = load_world(&scene);
    let mut renderer = PixelRenderer::for_world(&world);
    let sand_before = world.grid().count_material(MaterialId::SAND);
    let stone_before = world.grid().count_material(MaterialId::STONE);

    runner::run(&mut world, &scene, &mut renderer, &options(300)).unwrap();

    assert_eq!(world.grid().count_material(MaterialId::SAND), sand_before);
    assert_eq!(world.grid().count_material(MaterialId::STONE), stone_before);
    let below_neck = (0..world.width() as i32)
        .flat_map(|x| (0..30).map(move |y| IVec2::new(x, y)))
        .filter(|&pos| world.material_at(pos).id == MaterialId::SAND)
        .count();
    assert!(below_neck > 0, "no sand passed the funnel:\n{}", ascii_snapshot(&world));
}

#[test]
fn test_pools_layers_by_density() {
    let scene = Scene::from_file(scenes_dir().join("pools.ron")).unwrap();
    let mut world = load_world(&scene);
    let mut renderer = PixelRenderer::for_world(&world);

    runner::run(&mut world, &scene, &mut renderer, &options(400)).unwrap();

    let mean_height = |id: u16| {
        let rows: Vec<i32> = (0..world.grid().len())
            .map(|i| world.grid().position_of(i))
            .filter(|&pos| world.grid().material_id(pos) == id)
            .map(|pos| pos.y)
            .collect();
        rows.iter().sum::<i32>() as f32 / rows.len().max(1) as f32
    };

    // Oil floats on water once both have settled
    assert!(mean_height(MaterialId::OIL) > mean_height(MaterialId::WATER));
    // Smoke escapes from under the gravel
    assert!(mean_height(MaterialId::SMOKE) > 8.0, "{}", ascii_snapshot(&world));
}
