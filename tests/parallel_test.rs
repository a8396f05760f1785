//! Parallel node sweeps reproduce the serial sweeps bit for bit.
#![cfg(feature = "parallel")]

use lbm_rs::{
    BlockIndex, BlockSpec, BoundaryCondition, CaseBuilder, Lattice, PeriodicHalo, Scheme,
    Simulation, SimulationConfig, Surface, TimeIntegrator, VelocitySet,
};

fn channel(config: SimulationConfig) -> Simulation {
    let block = BlockSpec::new([24, 16, 1], 1.0 / 16.0)
        .with_boundary(Surface::Bottom, BoundaryCondition::wall())
        .with_boundary(
            Surface::Top,
            BoundaryCondition::EqmDiffuseRefl {
                velocity: [0.02, 0.0, 0.0],
            },
        )
        .with_solid(|p| (p[0] as i64 - 8).pow(2) + (p[1] as i64 - 8).pow(2) <= 9);
    CaseBuilder::new("cylinder", Lattice::single(VelocitySet::D2Q9))
        .with_config(config)
        .with_block(block)
        .with_halo_exchange(PeriodicHalo::new([true, false, false]))
        .build()
        .unwrap()
}

fn run_both(config: SimulationConfig) -> (Simulation, Simulation) {
    let mut serial = channel(config.clone());
    let mut parallel = channel(config.parallel());
    let a = serial.iterate().unwrap();
    let b = parallel.iterate().unwrap();
    assert_eq!(a, b);
    (serial, parallel)
}

fn assert_identical(a: &Simulation, b: &Simulation) {
    let (a, b) = (
        a.grid().block(BlockIndex::ZERO).unwrap(),
        b.grid().block(BlockIndex::ZERO).unwrap(),
    );
    assert_eq!(a.f().as_slice(), b.f().as_slice());
    assert_eq!(a.macro_vars().as_slice(), b.macro_vars().as_slice());
}

#[test]
fn test_stream_collision_parallel_matches_serial() {
    let config = SimulationConfig::default()
        .with_tau_ref(vec![0.05])
        .with_check_period(10)
        .with_max_iterations(40);
    let (serial, parallel) = run_both(config);
    assert_identical(&serial, &parallel);
}

#[test]
fn test_time_marching_parallel_matches_serial() {
    let config = SimulationConfig::default()
        .with_tau_ref(vec![0.05])
        .with_dt(0.005)
        .with_scheme(Scheme::FiniteDifference(TimeIntegrator::SemiImplicit))
        .with_check_period(10)
        .with_max_iterations(40);
    let (serial, parallel) = run_both(config);
    assert_identical(&serial, &parallel);
}
