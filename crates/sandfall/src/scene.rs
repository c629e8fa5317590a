//! Scene definition and RON file loading
//!
//! A scene paints the initial grid with brush strokes and may keep pouring
//! material through emitters while the run is going.

use std::path::Path;

use anyhow::{Context, Result, bail};
use glam::IVec2;
use sandfall_core::world::World;
use serde::{Deserialize, Serialize};

/// One brush application, in grid coordinates (row 0 is the bottom)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub x: i32,
    pub y: i32,
    /// Half-extent of the square brush; the configured `brush_size` when absent
    #[serde(default)]
    pub radius: Option<u32>,
    /// Material name, matched case-insensitively
    pub material: String,
}

/// A brush that is re-applied every `every` ticks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub radius: Option<u32>,
    pub material: String,
    /// Period in ticks
    #[serde(default = "default_every")]
    pub every: u64,
    /// First tick the emitter no longer fires on
    #[serde(default)]
    pub until: Option<u64>,
}

fn default_every() -> u64 {
    1
}

impl Emitter {
    /// Whether the emitter fires before tick `tick`
    pub fn fires_at(&self, tick: u64) -> bool {
        self.every > 0 && tick % self.every == 0 && self.until.is_none_or(|until| tick < until)
    }
}

/// Top-level scene definition loaded from RON files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene name
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Grid size overrides; the configured size is used when absent
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,

    /// Ticks to run; overridden by `--ticks`
    #[serde(default)]
    pub ticks: Option<u64>,

    /// Applied once, in order, before the first tick
    #[serde(default)]
    pub strokes: Vec<Stroke>,

    #[serde(default)]
    pub emitters: Vec<Emitter>,
}

impl Scene {
    /// Load scene from RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file: {}", path.display()))?;

        let scene = Self::from_ron_str(&content)
            .with_context(|| format!("Failed to load scene: {}", path.display()))?;

        Ok(scene)
    }

    /// Parse and validate a scene from RON text
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let scene: Self = ron::from_str(source).context("Failed to parse RON scene")?;
        for emitter in &scene.emitters {
            if emitter.every == 0 {
                bail!(
                    "emitter of '{}' at ({}, {}) has a period of 0 ticks",
                    emitter.material,
                    emitter.x,
                    emitter.y
                );
            }
        }
        Ok(scene)
    }

    /// Built-in scene used when no scene file is given
    pub fn demo() -> Self {
        let stroke = |x, y, radius, material: &str| Stroke {
            x,
            y,
            radius: Some(radius),
            material: material.to_string(),
        };

        Self {
            name: "demo".to_string(),
            description: "Sand, water and oil poured over a stone shelf, with acid eating the floor"
                .to_string(),
            width: Some(96),
            height: Some(64),
            ticks: None,
            strokes: vec![
                stroke(30, 24, 1, "stone"),
                stroke(36, 24, 1, "stone"),
                stroke(42, 24, 1, "stone"),
                stroke(70, 2, 2, "stone"),
                stroke(70, 8, 2, "acid"),
                stroke(20, 50, 4, "sand"),
                stroke(60, 50, 4, "water"),
                stroke(80, 40, 3, "oil"),
                stroke(48, 10, 2, "smoke"),
            ],
            emitters: vec![Emitter {
                x: 36,
                y: 60,
                radius: None,
                material: "sand".to_string(),
                every: 4,
                until: Some(120),
            }],
        }
    }

    /// Check every material name against the world's table
    pub fn validate_materials(&self, world: &World) -> Result<()> {
        let names = self
            .strokes
            .iter()
            .map(|s| s.material.as_str())
            .chain(self.emitters.iter().map(|e| e.material.as_str()));
        for name in names {
            resolve(world, name)?;
        }
        Ok(())
    }

    /// Paint every stroke; returns the number of cells written
    pub fn apply_strokes(&self, world: &mut World) -> Result<usize> {
        let mut written = 0;
        for stroke in &self.strokes {
            let id = resolve(world, &stroke.material)?;
            let radius = stroke.radius.unwrap_or(world.params().brush_size);
            written += world.apply_brush(IVec2::new(stroke.x, stroke.y), radius, id)?;
        }
        log::info!(
            "Scene '{}': {} strokes painted {} cells",
            self.name,
            self.strokes.len(),
            written
        );
        Ok(written)
    }

    /// Fire the emitters due before tick `tick`
    pub fn emit(&self, world: &mut World, tick: u64) -> Result<usize> {
        let mut written = 0;
        for emitter in self.emitters.iter().filter(|e| e.fires_at(tick)) {
            let id = resolve(world, &emitter.material)?;
            let radius = emitter.radius.unwrap_or(world.params().brush_size);
            written += world.apply_brush(IVec2::new(emitter.x, emitter.y), radius, id)?;
        }
        Ok(written)
    }
}

fn resolve(world: &World, name: &str) -> Result<u16> {
    match world.materials().by_name(name) {
        Some(def) => Ok(def.id),
        None => bail!("unknown material '{name}' in scene"),
    }
}

#[cfg(test)]
mod tests {
    use sandfall_core::world::SimParams;
    use sandfall_simulation::{MaterialId, Materials};

    use super::*;

    fn world(width: u32, height: u32) -> World {
        World::new(SimParams::with_size(width, height), Materials::new()).unwrap()
    }

    #[test]
    fn test_scene_parses_with_defaults() {
        let scene = Scene::from_ron_str(
            r#"(
                name: "pile",
                strokes: [(x: 4, y: 9, material: "Sand")],
            )"#,
        )
        .unwrap();

        assert_eq!(scene.name, "pile");
        assert_eq!(scene.width, None);
        assert_eq!(scene.strokes[0].radius, None);
        assert!(scene.emitters.is_empty());
    }

    #[test]
    fn test_zero_period_emitter_rejected() {
        let result = Scene::from_ron_str(
            r#"(name: "bad", emitters: [(x: 1, y: 1, material: "water", every: 0)])"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_reports_path() {
        let err = Scene::from_file("/nonexistent/scene.ron").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/scene.ron"));
    }

    #[test]
    fn test_strokes_resolve_names() {
        let scene = Scene::from_ron_str(
            r#"(
                name: "two",
                strokes: [
                    (x: 1, y: 1, radius: 1, material: "stone"),
                    (x: 5, y: 5, radius: 0, material: "WATER"),
                ],
            )"#,
        )
        .unwrap();
        let mut world = world(8, 8);

        let written = scene.apply_strokes(&mut world).unwrap();

        assert_eq!(written, 10);
        assert_eq!(world.grid().count_material(MaterialId::STONE), 9);
        assert_eq!(world.material_at(IVec2::new(5, 5)).id, MaterialId::WATER);
    }

    #[test]
    fn test_unknown_material_is_an_error() {
        let scene = Scene::from_ron_str(
            r#"(name: "x", strokes: [(x: 1, y: 1, material: "plasma")])"#,
        )
        .unwrap();
        let mut world = world(4, 4);

        assert!(scene.validate_materials(&world).is_err());
        let err = scene.apply_strokes(&mut world).unwrap_err();
        assert!(err.to_string().contains("plasma"));
    }

    #[test]
    fn test_emitter_schedule() {
        let emitter = Emitter {
            x: 0,
            y: 0,
            radius: None,
            material: "sand".to_string(),
            every: 3,
            until: Some(7),
        };

        let fired: Vec<u64> = (0..10).filter(|&t| emitter.fires_at(t)).collect();
        assert_eq!(fired, vec![0, 3, 6]);
    }

    #[test]
    fn test_emit_paints_only_due_emitters() {
        let scene = Scene::from_ron_str(
            r#"(
                name: "pour",
                emitters: [
                    (x: 0, y: 3, radius: 0, material: "sand", every: 2),
                    (x: 3, y: 3, radius: 0, material: "water", every: 5),
                ],
            )"#,
        )
        .unwrap();
        let mut world = world(4, 4);

        assert_eq!(scene.emit(&mut world, 2).unwrap(), 1);
        assert_eq!(world.material_at(IVec2::new(0, 3)).id, MaterialId::SAND);
        assert_eq!(world.material_at(IVec2::new(3, 3)).id, MaterialId::AIR);
    }

    #[test]
    fn test_missing_radius_uses_brush_size() {
        let scene = Scene::from_ron_str(
            r#"(
                name: "sized",
                strokes: [(x: 4, y: 4, material: "stone")],
                emitters: [(x: 4, y: 8, material: "sand")],
            )"#,
        )
        .unwrap();
        let mut world = world_with_brush(2);

        assert_eq!(scene.apply_strokes(&mut world).unwrap(), 25);
        assert_eq!(world.material_at(IVec2::new(2, 2)).id, MaterialId::STONE);
        // Clipped at the top: rows 6 to 9 only
        assert_eq!(scene.emit(&mut world, 0).unwrap(), 20);

        let mut single = world_with_brush(0);
        assert_eq!(scene.apply_strokes(&mut single).unwrap(), 1);
        assert_eq!(single.grid().count_material(MaterialId::STONE), 1);
    }

    fn world_with_brush(brush_size: u32) -> World {
        let params = SimParams {
            brush_size,
            ..SimParams::with_size(10, 10)
        };
        World::new(params, Materials::new()).unwrap()
    }

    #[test]
    fn test_demo_scene_is_valid() {
        let scene = Scene::demo();
        let mut world = world(scene.width.unwrap(), scene.height.unwrap());
        scene.validate_materials(&world).unwrap();
        assert!(scene.apply_strokes(&mut world).unwrap() > 0);
    }
}
