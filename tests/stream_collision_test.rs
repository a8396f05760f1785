//! Stream-collision scheme: conservation, fixed points and stability checks.

use approx::assert_relative_eq;
use lbm_rs::{
    BlockIndex, BlockSpec, BoundaryCondition, CaseBuilder, DirectionIndex, FieldSelector,
    Lattice, LbmError, NodeIndex, PeriodicHalo, Simulation, SimulationConfig, Surface,
    UpdateStage, VelocitySet,
};
use std::f64::consts::PI;

/// Periodic 2D shear wave with a density perturbation.
fn periodic_wave(config: SimulationConfig) -> Simulation {
    CaseBuilder::new("wave", Lattice::single(VelocitySet::D2Q9))
        .with_config(config)
        .with_block(BlockSpec::new([16, 12, 1], 1.0 / 16.0))
        .with_halo_exchange(PeriodicHalo::all())
        .with_initial_state(|x, vars| {
            vars[0] = 1.0 + 0.01 * (2.0 * PI * x[0]).cos();
            vars[1] = 0.02 * (2.0 * PI * x[1] * 16.0 / 12.0).sin();
            vars[2] = -0.01 * (2.0 * PI * x[0]).sin();
        })
        .build()
        .unwrap()
}

#[test]
fn test_mass_conservation_periodic_2d() {
    let mut sim = periodic_wave(SimulationConfig::default().with_tau_ref(vec![0.02]));
    let initial = sim.grid().total_mass();
    for _ in 0..20 {
        sim.step().unwrap();
    }
    assert_relative_eq!(sim.grid().total_mass(), initial, max_relative = 1e-13);
}

#[test]
fn test_mass_conservation_periodic_surfaces_3d() {
    let mut block = BlockSpec::new([6, 6, 6], 1.0 / 6.0);
    for s in Surface::ALL {
        block = block.with_boundary(s, BoundaryCondition::Periodic);
    }
    let mut sim = CaseBuilder::new("periodic box", Lattice::single(VelocitySet::D3Q19))
        .with_config(SimulationConfig::default().with_tau_ref(vec![0.05]))
        .with_block(block)
        .with_initial_state(|x, vars| {
            vars[0] = 1.0 + 0.02 * (2.0 * PI * x[0]).sin() * (2.0 * PI * x[2]).cos();
            vars[1] = 0.01 * (2.0 * PI * x[1]).sin();
            vars[3] = 0.005;
        })
        .build()
        .unwrap();
    let initial = sim.grid().total_mass();
    for _ in 0..10 {
        sim.step().unwrap();
    }
    assert_relative_eq!(sim.grid().total_mass(), initial, max_relative = 1e-13);
}

/// Closed 2D box with every surface carrying `wall`, started from a
/// non-uniform moving state.
fn moving_box(wall: BoundaryCondition) -> Simulation {
    let mut block = BlockSpec::new([10, 10, 1], 0.1);
    for s in [Surface::Left, Surface::Right, Surface::Bottom, Surface::Top] {
        block = block.with_boundary(s, wall);
    }
    CaseBuilder::new("closed box", Lattice::single(VelocitySet::D2Q9))
        .with_config(SimulationConfig::default().with_tau_ref(vec![0.05]))
        .with_block(block)
        .with_initial_state(|x, vars| {
            vars[0] = 1.0 + 0.01 * (2.0 * PI * x[0]).cos();
            vars[1] = 0.02 * (2.0 * PI * x[1]).sin();
            vars[2] = -0.01 * (PI * x[0]).sin();
        })
        .build()
        .unwrap()
}

#[test]
fn test_mass_conservation_closed_box_moving() {
    for wall in [BoundaryCondition::wall(), BoundaryCondition::FreeFlux] {
        let mut sim = moving_box(wall);
        let initial = sim.grid().total_mass();
        for step in 0..10 {
            sim.step().unwrap();
            let mass = sim.grid().total_mass();
            assert!(
                ((mass - initial) / initial).abs() < 1e-13,
                "{wall:?}: mass {mass} after step {step}, started at {initial}"
            );
        }
    }
}

#[test]
fn test_mass_conservation_closed_box_moving_3d() {
    let mut block = BlockSpec::new([6, 6, 6], 0.2);
    for s in Surface::ALL {
        block = block.with_boundary(s, BoundaryCondition::wall());
    }
    let mut sim = CaseBuilder::new("closed box", Lattice::single(VelocitySet::D3Q19))
        .with_config(SimulationConfig::default().with_tau_ref(vec![0.1]))
        .with_block(block)
        .with_initial_state(|x, vars| {
            vars[0] = 1.0 + 0.01 * (2.0 * PI * x[2]).cos();
            vars[1] = 0.01 * (2.0 * PI * x[1]).sin();
            vars[3] = 0.005 * (PI * x[0]).sin();
        })
        .build()
        .unwrap();
    let initial = sim.grid().total_mass();
    for _ in 0..10 {
        sim.step().unwrap();
        assert_relative_eq!(sim.grid().total_mass(), initial, max_relative = 1e-13);
    }
}

#[test]
fn test_equilibrium_is_collision_fixed_point() {
    let mut sim = periodic_wave(SimulationConfig::default().with_tau_ref(vec![0.3]));
    sim.update_macro_vars();
    sim.update_equilibrium_and_body_force();
    for block in sim.grid_mut().blocks_mut() {
        let feq = block.feq().clone();
        block.f_mut().copy_from(&feq).unwrap();
    }
    sim.copy_distribution().unwrap();
    sim.update_relaxation_time();
    sim.collide().unwrap();

    let block = sim.grid().block(BlockIndex::ZERO).unwrap();
    assert_eq!(block.f_stage().as_slice(), block.f().as_slice());
}

#[test]
fn test_streaming_round_trip() {
    let mut sim = periodic_wave(SimulationConfig::default());
    let lattice = sim.lattice().clone();
    let q = lattice.n_directions();

    let block = sim.grid_mut().block_mut(BlockIndex::ZERO).unwrap();
    let n_nodes = block.shape().n_nodes();
    for node in 0..n_nodes {
        for d in 0..q {
            let value = 1.0 + ((node * 31 + d * 7) % 97) as f64 / 97.0;
            block.f_mut().set(NodeIndex::new(node), DirectionIndex::new(d), value);
        }
    }
    let original = block.f().clone();

    let reverse = |sim: &mut Simulation| {
        let block = sim.grid_mut().block_mut(BlockIndex::ZERO).unwrap();
        let f = block.f().clone();
        for node in 0..n_nodes {
            let node = NodeIndex::new(node);
            for d in 0..q {
                let d = DirectionIndex::new(d);
                block.f_stage_mut().set(node, d, f.get(node, lattice.opposite(d)));
            }
        }
    };

    sim.copy_distribution().unwrap();
    sim.exchange_halo(FieldSelector::Staged);
    sim.stream();
    reverse(&mut sim);
    sim.exchange_halo(FieldSelector::Staged);
    sim.stream();

    let block = sim.grid().block(BlockIndex::ZERO).unwrap();
    for p in block.shape().bulk().iter() {
        let node = block.shape().node_index(p);
        for d in 0..q {
            let d = DirectionIndex::new(d);
            assert_eq!(
                block.f().get(node, lattice.opposite(d)),
                original.get(node, d),
                "node {p:?}, direction {d}"
            );
        }
    }
}

#[test]
fn test_instability_reported_with_diagnostics() {
    let mut sim = periodic_wave(SimulationConfig::default().with_diagnostics());
    let node = sim.grid().block(BlockIndex::ZERO).unwrap().node_at([5, 3, 0]);
    sim.grid_mut()
        .block_mut(BlockIndex::ZERO)
        .unwrap()
        .f_mut()
        .set(node, DirectionIndex::new(2), f64::NAN);

    match sim.step() {
        Err(LbmError::NumericalInstability(e)) => {
            assert_eq!(e.stage, UpdateStage::Collision);
            assert_eq!(e.block, BlockIndex::ZERO);
            assert_eq!(e.node, node);
            assert!(e.value.is_nan());
        }
        other => panic!("expected numerical instability, got {other:?}"),
    }
}

#[test]
fn test_instability_unchecked_without_diagnostics() {
    let mut sim = periodic_wave(SimulationConfig::default());
    let node = sim.grid().block(BlockIndex::ZERO).unwrap().node_at([5, 3, 0]);
    sim.grid_mut()
        .block_mut(BlockIndex::ZERO)
        .unwrap()
        .f_mut()
        .set(node, DirectionIndex::new(2), f64::NAN);
    assert!(sim.step().is_ok());
}

#[test]
fn test_iterate_stops_on_instability() {
    let config = SimulationConfig::default()
        .with_diagnostics()
        .with_check_period(5)
        .with_max_iterations(50);
    let mut sim = periodic_wave(config);
    let node = sim.grid().block(BlockIndex::ZERO).unwrap().node_at([0, 0, 0]);
    sim.grid_mut()
        .block_mut(BlockIndex::ZERO)
        .unwrap()
        .f_mut()
        .set(node, DirectionIndex::ZERO, -1.0e3);
    assert!(matches!(
        sim.iterate(),
        Err(LbmError::NumericalInstability(_))
    ));
}
