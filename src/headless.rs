//! Windowless run of the CPU reference simulation.

use glam::{Vec2, Vec3};

use crate::config::SimulationParameters;
use crate::simulation::{
    FloaterField, Forcing, GridStats, HeightGrid, NoiseField, SurfaceSampler, WaveSimulator,
};

/// Steps between progress log lines
const LOG_INTERVAL: u32 = 50;

#[derive(Debug, Clone)]
pub struct HeadlessReport {
    pub initial: GridStats,
    pub last: GridStats,
    pub floaters: Vec<Vec3>,
}

/// Seed the grid, tap the centre once, then let it settle for `steps` steps
pub fn run(params: &SimulationParameters, steps: u32, floaters: usize) -> HeadlessReport {
    let noise = NoiseField::new(params.seed);
    let mut grid = HeightGrid::seeded(params.width, params.edge_mode, &noise);
    let simulator = WaveSimulator::new(params);
    let mut field = FloaterField::scatter(floaters, params.bounds, params.seed as u64);

    let initial = grid.stats();
    log::info!(
        "Headless run: {}x{} grid, {} steps, {} floaters",
        params.width,
        params.width,
        steps,
        floaters
    );
    log_stats(0, &initial);

    for step in 1..=steps {
        let forcing = if step == 1 {
            Forcing::At(Vec2::ZERO)
        } else {
            Forcing::None
        };
        simulator.step(&mut grid, forcing);
        field.step(&SurfaceSampler::new(&grid, params.bounds));

        if step % LOG_INTERVAL == 0 || step == steps {
            log_stats(step, &grid.stats());
        }
    }

    for (n, floater) in field.floaters.iter().enumerate() {
        log::info!(
            "Floater {}: ({:.3}, {:.3}, {:.3})",
            n,
            floater.position.x,
            floater.position.y,
            floater.position.z
        );
    }

    HeadlessReport {
        initial,
        last: grid.stats(),
        floaters: field.floaters.iter().map(|f| f.position).collect(),
    }
}

fn log_stats(step: u32, stats: &GridStats) {
    log::info!(
        "Step {:>5}: energy {:.6}, height [{:.4}, {:.4}]",
        step,
        stats.energy,
        stats.min,
        stats.max
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_run_settles() {
        let params = SimulationParameters {
            width: 32,
            ..Default::default()
        };
        let report = run(&params, 300, 4);
        assert!(report.last.energy < report.initial.energy);
        assert_eq!(report.floaters.len(), 4);
        let limit = params.bounds * 0.5;
        assert!(report
            .floaters
            .iter()
            .all(|p| p.x.abs() <= limit && p.z.abs() <= limit));
    }

    #[test]
    fn test_headless_is_reproducible() {
        let params = SimulationParameters {
            width: 16,
            seed: 8,
            ..Default::default()
        };
        let a = run(&params, 20, 2);
        let b = run(&params, 20, 2);
        assert_eq!(a.last, b.last);
        assert_eq!(a.floaters, b.floaters);
    }
}
