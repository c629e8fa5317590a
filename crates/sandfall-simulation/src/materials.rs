//! Material definitions and registry

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Built-in material IDs
pub struct MaterialId;

impl MaterialId {
    // Designated materials
    pub const AIR: u16 = 0;
    pub const WALL: u16 = 1;

    // Granular solids
    pub const SAND: u16 = 2;

    // Liquids
    pub const WATER: u16 = 3;

    // Static solids
    pub const STONE: u16 = 4;

    pub const ACID: u16 = 5;
    pub const OIL: u16 = 6;

    // Gases
    pub const SMOKE: u16 = 7;
    pub const STEAM: u16 = 8;

    pub const GRAVEL: u16 = 9;
    pub const WOOD: u16 = 10;
}

/// State of matter - selects which update rule governs a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatterState {
    /// Falls and piles up when it uses gravity (sand, gravel), otherwise static (stone, wood)
    Solid,
    /// Falls, flows sideways, seeks level (water, oil, acid)
    Liquid,
    /// Rises through denser gas (smoke, steam)
    Gas,
}

/// Definition of a material's properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDef {
    pub id: u16,
    pub name: String,

    /// Base color (RGBA), opaque to the simulation
    pub color: [u8; 4],

    pub state: MatterState,

    /// Inert materials never move on their own
    pub uses_gravity: bool,

    /// Compared against neighbors for displacement and buoyancy
    pub density: i32,

    /// Depth of open space a tall pile needs below a slide target (solids)
    pub stacking_height: u32,

    // Corrosion
    /// Whether an acting corrosive material can dissolve this one
    pub corrodable: bool,
    /// Chance per tick this material corrodes a neighbor (0.0 - 1.0)
    pub corrosion_chance: f32,
    /// What both cells become after a successful corrosion (None = air)
    pub corrosion_result: Option<u16>,

    // Combustion (no rule consumes these yet)
    /// How readily this ignites (0.0 - 1.0)
    pub flammability: f32,
    /// What this becomes when burned (None = air)
    pub burn_result: Option<u16>,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            id: 0,
            name: "unknown".to_string(),
            color: [255, 0, 255, 255], // Magenta for missing materials
            state: MatterState::Solid,
            uses_gravity: false,
            density: 1000,
            stacking_height: 1,
            corrodable: false,
            corrosion_chance: 0.0,
            corrosion_result: None,
            flammability: 0.0,
            burn_result: None,
        }
    }
}

impl MaterialDef {
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.state == MatterState::Solid
    }

    #[inline]
    pub fn is_liquid(&self) -> bool {
        self.state == MatterState::Liquid
    }

    #[inline]
    pub fn is_gas(&self) -> bool {
        self.state == MatterState::Gas
    }

    fn validate_fields(&self) -> Result<(), MaterialError> {
        let invalid = |reason: &str| MaterialError::InvalidField {
            id: self.id,
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.stacking_height < 1 {
            return Err(invalid("stacking_height must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.corrosion_chance) {
            return Err(invalid("corrosion_chance must be within [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.flammability) {
            return Err(invalid("flammability must be within [0, 1]"));
        }
        Ok(())
    }
}

/// Errors raised while building a material table
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("material id {0} is registered more than once")]
    DuplicateId(u16),

    #[error("designated {role} material {id} is not registered")]
    MissingDesignated { role: &'static str, id: u16 },

    #[error("wall material {0} must be an inert, non-corrodable solid")]
    InvalidWall(u16),

    #[error("air material {0} must be a gas")]
    InvalidAir(u16),

    #[error("material {id} ({name}): {reason}")]
    InvalidField {
        id: u16,
        name: String,
        reason: String,
    },

    #[error("material {id} references unregistered {field} {target}")]
    DanglingReference {
        id: u16,
        field: &'static str,
        target: u16,
    },

    #[error("failed to parse material table: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Authored form of a material table (as stored in RON files)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialTableDef {
    /// Id of the material that fills empty space
    pub air: u16,
    /// Id of the material returned for out-of-bounds queries
    pub wall: u16,
    pub materials: Vec<MaterialDef>,
}

/// Registry of all materials
///
/// Immutable once built; the simulation only ever reads from it.
#[derive(Clone, Debug)]
pub struct Materials {
    materials: Vec<Option<MaterialDef>>,
    air: u16,
    wall: u16,
}

impl Materials {
    /// Built-in material table
    pub fn new() -> Self {
        let mut materials = Self {
            materials: Vec::new(),
            air: MaterialId::AIR,
            wall: MaterialId::WALL,
        };
        materials.register_defaults();
        materials
    }

    /// Build and validate a table from authored definitions
    pub fn from_defs(defs: Vec<MaterialDef>, air: u16, wall: u16) -> Result<Self, MaterialError> {
        let mut materials = Self {
            materials: Vec::new(),
            air,
            wall,
        };

        for def in defs {
            if materials.try_get(def.id).is_some() {
                return Err(MaterialError::DuplicateId(def.id));
            }
            def.validate_fields()?;
            materials.register(def);
        }

        materials.validate()?;

        log::info!(
            "Registered material table: {} materials (air = {}, wall = {})",
            materials.len(),
            air,
            wall
        );
        Ok(materials)
    }

    /// Parse a [`MaterialTableDef`] from RON and validate it
    pub fn from_ron_str(source: &str) -> Result<Self, MaterialError> {
        let table: MaterialTableDef = ron::from_str(source)?;
        Self::from_defs(table.materials, table.air, table.wall)
    }

    /// Export the table in its authored form
    pub fn to_table_def(&self) -> MaterialTableDef {
        MaterialTableDef {
            air: self.air,
            wall: self.wall,
            materials: self.iter().cloned().collect(),
        }
    }

    fn validate(&self) -> Result<(), MaterialError> {
        let air = self
            .try_get(self.air)
            .ok_or(MaterialError::MissingDesignated {
                role: "air",
                id: self.air,
            })?;
        if !air.is_gas() {
            return Err(MaterialError::InvalidAir(self.air));
        }

        let wall = self
            .try_get(self.wall)
            .ok_or(MaterialError::MissingDesignated {
                role: "wall",
                id: self.wall,
            })?;
        if !wall.is_solid() || wall.corrodable || wall.uses_gravity {
            return Err(MaterialError::InvalidWall(self.wall));
        }

        for def in self.iter() {
            for (field, target) in [
                ("corrosion_result", def.corrosion_result),
                ("burn_result", def.burn_result),
            ] {
                if let Some(target) = target
                    && self.try_get(target).is_none()
                {
                    return Err(MaterialError::DanglingReference {
                        id: def.id,
                        field,
                        target,
                    });
                }
            }
        }

        Ok(())
    }

    fn register_defaults(&mut self) {
        // Air (empty space) - inert, only displaced by others
        self.register(MaterialDef {
            id: MaterialId::AIR,
            name: "air".to_string(),
            color: [0, 0, 0, 255],
            state: MatterState::Gas,
            density: 1000,
            ..Default::default()
        });

        // Wall - the boundary material, also placeable
        self.register(MaterialDef {
            id: MaterialId::WALL,
            name: "wall".to_string(),
            color: [40, 40, 50, 255],
            state: MatterState::Solid,
            density: i32::MAX,
            ..Default::default()
        });

        // Sand
        self.register(MaterialDef {
            id: MaterialId::SAND,
            name: "sand".to_string(),
            color: [194, 178, 128, 255],
            state: MatterState::Solid,
            uses_gravity: true,
            density: 1500,
            corrodable: true,
            ..Default::default()
        });

        // Water
        self.register(MaterialDef {
            id: MaterialId::WATER,
            name: "water".to_string(),
            color: [64, 164, 223, 255],
            state: MatterState::Liquid,
            uses_gravity: true,
            density: 1000,
            ..Default::default()
        });

        // Stone
        self.register(MaterialDef {
            id: MaterialId::STONE,
            name: "stone".to_string(),
            color: [128, 128, 128, 255],
            state: MatterState::Solid,
            density: 2500,
            corrodable: true,
            ..Default::default()
        });

        // Acid - eats through corrodable neighbors, both cells become air
        self.register(MaterialDef {
            id: MaterialId::ACID,
            name: "acid".to_string(),
            color: [0, 255, 0, 255],
            state: MatterState::Liquid,
            uses_gravity: true,
            density: 1100,
            corrosion_chance: 0.05,
            ..Default::default()
        });

        // Oil - floats on water
        self.register(MaterialDef {
            id: MaterialId::OIL,
            name: "oil".to_string(),
            color: [50, 40, 30, 255],
            state: MatterState::Liquid,
            uses_gravity: true,
            density: 800,
            flammability: 0.6,
            burn_result: Some(MaterialId::SMOKE),
            ..Default::default()
        });

        // Smoke
        self.register(MaterialDef {
            id: MaterialId::SMOKE,
            name: "smoke".to_string(),
            color: [60, 60, 60, 255],
            state: MatterState::Gas,
            uses_gravity: true,
            density: 400,
            ..Default::default()
        });

        // Steam - lighter than smoke, ends up on top of gas columns
        self.register(MaterialDef {
            id: MaterialId::STEAM,
            name: "steam".to_string(),
            color: [200, 200, 200, 255],
            state: MatterState::Gas,
            uses_gravity: true,
            density: 300,
            ..Default::default()
        });

        // Gravel - piles steeply, needs a drop of 3 before it slides
        self.register(MaterialDef {
            id: MaterialId::GRAVEL,
            name: "gravel".to_string(),
            color: [110, 100, 90, 255],
            state: MatterState::Solid,
            uses_gravity: true,
            density: 1800,
            stacking_height: 3,
            corrodable: true,
            ..Default::default()
        });

        // Wood
        self.register(MaterialDef {
            id: MaterialId::WOOD,
            name: "wood".to_string(),
            color: [139, 90, 43, 255],
            state: MatterState::Solid,
            density: 600,
            corrodable: true,
            flammability: 0.3,
            burn_result: Some(MaterialId::SMOKE),
            ..Default::default()
        });
    }

    fn register(&mut self, material: MaterialDef) {
        let id = material.id as usize;

        // Ensure vec is large enough
        if self.materials.len() <= id {
            self.materials.resize(id + 1, None);
        }

        self.materials[id] = Some(material);
    }

    /// Get material definition by ID
    ///
    /// Panics on an unregistered id: cells only ever hold validated ids, so
    /// reaching this is a logic defect.
    #[inline]
    pub fn get(&self, id: u16) -> &MaterialDef {
        match self.try_get(id) {
            Some(def) => def,
            None => panic!("material id {id} is not registered"),
        }
    }

    /// Get material definition by ID, if registered
    #[inline]
    pub fn try_get(&self, id: u16) -> Option<&MaterialDef> {
        self.materials.get(id as usize).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: u16) -> bool {
        self.try_get(id).is_some()
    }

    /// Look up a material by its name (case-insensitive)
    pub fn by_name(&self, name: &str) -> Option<&MaterialDef> {
        self.iter().find(|def| def.name.eq_ignore_ascii_case(name))
    }

    /// Get color for a material
    pub fn get_color(&self, id: u16) -> [u8; 4] {
        self.get(id).color
    }

    pub fn air_id(&self) -> u16 {
        self.air
    }

    pub fn wall_id(&self) -> u16 {
        self.wall
    }

    /// The material filling empty space
    pub fn air(&self) -> &MaterialDef {
        self.get(self.air)
    }

    /// The immutable boundary material
    pub fn wall(&self) -> &MaterialDef {
        self.get(self.wall)
    }

    /// Material produced when `agent` corrodes something (air if unset)
    pub fn corrosion_result_of(&self, agent: &MaterialDef) -> u16 {
        agent.corrosion_result.unwrap_or(self.air)
    }

    /// Material produced when `material` burns out (air if unset)
    pub fn burn_result_of(&self, material: &MaterialDef) -> u16 {
        material.burn_result.unwrap_or(self.air)
    }

    /// Iterate over registered materials in id order
    pub fn iter(&self) -> impl Iterator<Item = &MaterialDef> {
        self.materials.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Materials {
    fn default() -> Self {
        Self::new()
    }
}
