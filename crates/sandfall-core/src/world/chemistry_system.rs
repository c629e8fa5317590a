//! Chemistry system - corrosion between adjacent cells

use glam::IVec2;

use super::grid::Grid;
use super::neighbor_queries::{Dir, NeighborQueries};
use crate::simulation::Materials;
use crate::world::{SimStats, WorldRng};

/// Neighbors a corrosive cell attacks, in priority order
const CORROSION_DIRECTIONS: [IVec2; 3] = [Dir::DOWN, Dir::LEFT, Dir::RIGHT];

/// Handles chemical reactions between neighboring cells
pub struct ChemistrySystem;

impl ChemistrySystem {
    /// Let the cell at `pos` corrode one neighbor
    ///
    /// Checks Down, Left, Right. Each corrodable neighbor gets one roll against
    /// the agent's `corrosion_chance`; the first success turns both cells into
    /// the agent's corrosion result and ends the attempt. Returns whether a
    /// corrosion happened.
    pub fn try_corrode_surrounding<R: WorldRng>(
        grid: &mut Grid,
        materials: &Materials,
        pos: IVec2,
        stats: &mut dyn SimStats,
        rng: &mut R,
    ) -> bool {
        let agent = materials.get(grid.material_id(pos));
        if agent.corrosion_chance <= 0.0 {
            return false;
        }

        for dir in CORROSION_DIRECTIONS {
            let target = NeighborQueries::material_at(grid, materials, pos, dir);
            if !target.corrodable {
                continue;
            }
            if !rng.check_probability(agent.corrosion_chance) {
                continue;
            }

            let result = materials.corrosion_result_of(agent);
            log::trace!(
                "{} corroded {} at {} -> {}",
                agent.name,
                target.name,
                pos + dir,
                materials.get(result).name
            );

            for cell_pos in [pos, pos + dir] {
                let cell = grid.cell_mut(cell_pos);
                cell.set_material(result);
                cell.mark_simulated();
            }
            stats.record_corrosion();
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{MaterialId, MatterState};
    use crate::world::{NoopStats, TickStats};

    /// Test RNG that answers probability checks from a script
    struct ScriptedRng {
        outcomes: Vec<bool>,
    }

    impl WorldRng for ScriptedRng {
        fn gen_bool(&mut self) -> bool {
            true
        }

        fn gen_f32(&mut self) -> f32 {
            0.5
        }

        fn check_probability(&mut self, _probability: f32) -> bool {
            if self.outcomes.is_empty() {
                false
            } else {
                self.outcomes.remove(0)
            }
        }
    }

    fn always() -> ScriptedRng {
        ScriptedRng {
            outcomes: vec![true; 8],
        }
    }

    fn acid_grid() -> (Grid, Materials, IVec2) {
        let mut grid = Grid::new(3, 3, MaterialId::AIR).unwrap();
        let center = IVec2::new(1, 1);
        grid.set_material(center, MaterialId::ACID);
        (grid, Materials::new(), center)
    }

    #[test]
    fn test_corrodes_below_first() {
        let (mut grid, materials, center) = acid_grid();
        grid.set_material(IVec2::new(1, 0), MaterialId::STONE);
        grid.set_material(IVec2::new(0, 1), MaterialId::STONE);
        let mut stats = TickStats::default();

        let corroded =
            ChemistrySystem::try_corrode_surrounding(&mut grid, &materials, center, &mut stats, &mut always());

        assert!(corroded);
        assert_eq!(grid.material_id(center), MaterialId::AIR);
        assert_eq!(grid.material_id(IVec2::new(1, 0)), MaterialId::AIR);
        // Only one corrosion per attempt
        assert_eq!(grid.material_id(IVec2::new(0, 1)), MaterialId::STONE);
        assert_eq!(stats.corrosions, 1);
    }

    #[test]
    fn test_failed_roll_moves_to_next_direction() {
        let (mut grid, materials, center) = acid_grid();
        grid.set_material(IVec2::new(1, 0), MaterialId::STONE);
        grid.set_material(IVec2::new(0, 1), MaterialId::SAND);
        let mut rng = ScriptedRng {
            outcomes: vec![false, true],
        };

        let corroded =
            ChemistrySystem::try_corrode_surrounding(&mut grid, &materials, center, &mut NoopStats, &mut rng);

        assert!(corroded);
        assert_eq!(grid.material_id(IVec2::new(1, 0)), MaterialId::STONE);
        assert_eq!(grid.material_id(IVec2::new(0, 1)), MaterialId::AIR);
        assert_eq!(grid.material_id(center), MaterialId::AIR);
    }

    #[test]
    fn test_non_corrodable_neighbors_untouched() {
        let (mut grid, materials, center) = acid_grid();
        grid.set_material(IVec2::new(1, 0), MaterialId::WATER);
        grid.set_material(IVec2::new(2, 1), MaterialId::ACID);

        let corroded =
            ChemistrySystem::try_corrode_surrounding(&mut grid, &materials, center, &mut NoopStats, &mut always());

        assert!(!corroded);
        assert_eq!(grid.material_id(center), MaterialId::ACID);
        assert_eq!(grid.material_id(IVec2::new(1, 0)), MaterialId::WATER);
        assert_eq!(grid.material_id(IVec2::new(2, 1)), MaterialId::ACID);
    }

    #[test]
    fn test_wall_is_never_corroded() {
        let mut grid = Grid::new(1, 1, MaterialId::AIR).unwrap();
        grid.set_material(IVec2::ZERO, MaterialId::ACID);
        let materials = Materials::new();

        let corroded =
            ChemistrySystem::try_corrode_surrounding(&mut grid, &materials, IVec2::ZERO, &mut NoopStats, &mut always());

        assert!(!corroded);
        assert_eq!(grid.material_id(IVec2::ZERO), MaterialId::ACID);
    }

    #[test]
    fn test_non_corrosive_agent_does_nothing() {
        let mut grid = Grid::new(3, 3, MaterialId::AIR).unwrap();
        let center = IVec2::new(1, 1);
        grid.set_material(center, MaterialId::WATER);
        grid.set_material(IVec2::new(1, 0), MaterialId::STONE);
        let materials = Materials::new();

        assert!(!ChemistrySystem::try_corrode_surrounding(
            &mut grid,
            &materials,
            center,
            &mut NoopStats,
            &mut always()
        ));
        assert_eq!(grid.material_id(IVec2::new(1, 0)), MaterialId::STONE);
    }

    #[test]
    fn test_uses_agent_corrosion_result() {
        let mut defs = Materials::new().to_table_def();
        for def in &mut defs.materials {
            if def.id == MaterialId::ACID {
                def.corrosion_result = Some(MaterialId::STEAM);
            }
        }
        let materials = Materials::from_defs(defs.materials, defs.air, defs.wall).unwrap();
        assert_eq!(materials.get(MaterialId::STEAM).state, MatterState::Gas);

        let mut grid = Grid::new(3, 3, MaterialId::AIR).unwrap();
        let center = IVec2::new(1, 1);
        grid.set_material(center, MaterialId::ACID);
        grid.set_material(IVec2::new(1, 0), MaterialId::SAND);

        ChemistrySystem::try_corrode_surrounding(&mut grid, &materials, center, &mut NoopStats, &mut always());

        assert_eq!(grid.material_id(center), MaterialId::STEAM);
        assert_eq!(grid.material_id(IVec2::new(1, 0)), MaterialId::STEAM);
    }
}
