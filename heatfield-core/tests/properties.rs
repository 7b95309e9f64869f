use std::f64::consts::SQRT_2;

use approx::assert_relative_eq;
use heatfield_core::{
    DiffusionSolver, EikonalSolver, HeatSourceRegistry, Material, MeshState, SimConfig,
    Simulation, SimulationMode,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn small_sim(n: usize, alpha: f64) -> Simulation {
    let config = SimConfig::default()
        .with_grid_bounds(3, 200)
        .with_grid_size(n)
        .with_time_step(0.1)
        .with_speed_scale(1.0);
    Simulation::new(config, Material::with_diffusivity("test", alpha))
}

/// Relax every directed edge until nothing changes.
fn bellman_ford(mesh: &MeshState, sources: &[(usize, usize)]) -> Vec<f64> {
    let n = mesh.n();
    let speed = mesh.speed();
    let mut dist = vec![f64::INFINITY; n * n];
    for &(x, y) in sources {
        dist[y * n + x] = 0.0;
    }

    loop {
        let mut changed = false;
        for y in 0..n {
            for x in 0..n {
                let from = dist[y * n + x];
                if from.is_infinite() {
                    continue;
                }
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as isize + dx;
                        let ny = y as isize + dy;
                        if nx < 0 || ny < 0 || nx >= n as isize || ny >= n as isize {
                            continue;
                        }
                        let j = ny as usize * n + nx as usize;
                        let edge = if dx != 0 && dy != 0 { SQRT_2 } else { 1.0 };
                        let candidate = from + edge / speed[j];
                        if candidate < dist[j] - 1e-12 {
                            dist[j] = candidate;
                            changed = true;
                        }
                    }
                }
            }
        }
        if !changed {
            return dist;
        }
    }
}

#[test]
fn eikonal_matches_bellman_ford_on_random_speeds() {
    init_tracing();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..20 {
        let n = 5;
        let mut mesh = MeshState::new(n, 20.0, 1.0);
        for y in 0..n {
            for x in 0..n {
                mesh.set_speed(x, y, rng.gen_range(0.2..3.0));
            }
        }

        let mut reg = HeatSourceRegistry::new();
        let mut placed = Vec::new();
        for _ in 0..rng.gen_range(1..=3) {
            let (x, y) = (rng.gen_range(0..n), rng.gen_range(0..n));
            reg.add(&mut mesh, x, y, 800.0);
            placed.push((x, y));
        }

        EikonalSolver::new(n).solve(&mut mesh, &reg);
        let oracle = bellman_ford(&mesh, &placed);

        for (got, want) in mesh.eikonal().iter().zip(&oracle) {
            assert_relative_eq!(*got, *want, epsilon = 1e-9);
        }
        for &(x, y) in &placed {
            assert_eq!(mesh.eikonal_at(x, y), Some(0.0));
        }
    }
}

#[test]
fn slow_cells_force_repushes_and_still_match_bellman_ford() {
    // fast corridor along row 2 through a slow mesh
    let n = 7;
    let mut mesh = MeshState::new(n, 20.0, 0.2);
    for x in 0..n {
        mesh.set_speed(x, 2, 5.0);
    }
    let mut reg = HeatSourceRegistry::new();
    reg.add(&mut mesh, 0, 2, 800.0);

    let report = EikonalSolver::new(n).solve(&mut mesh, &reg);
    assert!(report.stale_pops > 0);
    assert_eq!(report.reached, n * n);

    let oracle = bellman_ford(&mesh, &[(0, 2)]);
    for (got, want) in mesh.eikonal().iter().zip(&oracle) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
}

#[test]
fn eikonal_is_non_negative_and_grows_away_from_source() {
    let mut mesh = MeshState::new(9, 20.0, 1.0);
    let mut reg = HeatSourceRegistry::new();
    reg.add(&mut mesh, 4, 4, 800.0);
    EikonalSolver::new(9).solve(&mut mesh, &reg);

    assert!(mesh.eikonal().iter().all(|&d| d >= 0.0 && d.is_finite()));
    // walking right from the source never gets closer
    let row: Vec<f64> = (4..9).map(|x| mesh.eikonal_at(x, 4).unwrap()).collect();
    assert!(row.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn stable_diffusion_obeys_maximum_principle() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n = 8;
    let mut mesh = MeshState::new(n, 20.0, 1.0);
    for y in 0..n {
        for x in 0..n {
            mesh.set_temperature(x, y, rng.gen_range(0.0..1000.0));
        }
    }
    let reg = HeatSourceRegistry::new();
    let solver = DiffusionSolver::new(2.0, 0.005);

    for _ in 0..10 {
        let old = mesh.temperature().to_vec();
        let report = solver.step(&mut mesh, &reg, 0.1);
        assert!(report.is_stable());

        for y in 1..n - 1 {
            for x in 1..n - 1 {
                let i = y * n + x;
                let around = [old[i], old[i - 1], old[i + 1], old[i - n], old[i + n]];
                let hi = around.iter().copied().fold(f64::MIN, f64::max);
                let lo = around.iter().copied().fold(f64::MAX, f64::min);
                let t = mesh.temperature()[i];
                assert!(t <= hi + 1e-9 && t >= lo - 1e-9, "cell ({x},{y}) = {t}");
            }
        }
    }
}

#[test]
fn sources_stay_pinned_in_every_mode() {
    init_tracing();
    let mut sim = small_sim(9, 2.0);
    sim.add_heat_source(1, 7, 950.0);
    sim.add_heat_source(6, 2, 400.0);
    sim.set_running(true);

    for mode in [
        SimulationMode::Diffusion,
        SimulationMode::Combined,
        SimulationMode::Eikonal,
        SimulationMode::Combined,
    ] {
        sim.set_mode(mode);
        for _ in 0..4 {
            sim.step();
            for s in sim.sources() {
                if mode != SimulationMode::Eikonal {
                    assert_eq!(sim.mesh().temperature_at(s.x, s.y), Some(s.temperature));
                }
                if mode != SimulationMode::Diffusion {
                    assert_eq!(sim.mesh().eikonal_at(s.x, s.y), Some(0.0));
                }
            }
        }
    }
}

#[test]
fn later_source_on_same_cell_wins() {
    let mut sim = small_sim(5, 2.0);
    sim.add_heat_source(1, 1, 900.0);
    sim.add_heat_source(1, 1, 300.0);
    sim.set_running(true);
    sim.step();
    assert_eq!(sim.mesh().temperature_at(1, 1), Some(300.0));
}

#[test]
fn heat_spreads_outward_over_time() {
    let mut sim = small_sim(11, 2.0);
    sim.set_running(true);
    let mut last = 20.0;
    for _ in 0..20 {
        sim.step();
        let t = sim.mesh().temperature_at(5, 3).unwrap();
        assert!(t >= last);
        last = t;
    }
    assert!(last > 20.0);
    assert_eq!(sim.iterations(), 20);
    assert_relative_eq!(sim.elapsed_time(), 2.0, epsilon = 1e-9);
}

#[test]
fn excessive_time_step_warns_but_runs() {
    init_tracing();
    let config = SimConfig::default()
        .with_grid_bounds(3, 200)
        .with_grid_size(5)
        .with_time_step_bounds(0.001, 10.0)
        .with_time_step(1.0);
    let mut sim = Simulation::new(config, Material::with_diffusivity("hot", 1.0));
    sim.set_running(true);
    let report = sim.step().unwrap();
    assert!(report.stability_warning());
    assert_eq!(sim.iterations(), 1);
}

#[test]
fn default_iron_setup_runs_stably() {
    let mut sim = Simulation::default();
    assert!(sim.diffusion_number() < 0.25);
    sim.toggle_running();
    sim.set_mode(SimulationMode::Combined);
    for _ in 0..3 {
        assert!(!sim.step().unwrap().stability_warning());
    }
    let stats = sim.stats();
    assert_eq!(stats.iterations, 3);
    assert!(stats.max_temperature >= 800.0);
}
