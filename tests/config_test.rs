//! Case configuration from JSON.

use lbm_rs::{
    BodyForce, BoundaryCondition, Diagnostics, SimulationConfig, Scheme, SurfaceBoundary,
    Surface, TauModel, TimeIntegrator, VelocitySet,
};

#[test]
fn test_partial_config_uses_defaults() {
    let json = r#"{
        "tau_ref": [0.05],
        "scheme": { "FiniteDifference": { "Explicit": { "scheme_coeff": 0.5 } } },
        "diagnostics": "Enabled",
        "check_period": 10
    }"#;
    let config: SimulationConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.tau_ref, vec![0.05]);
    assert_eq!(
        config.scheme,
        Scheme::FiniteDifference(TimeIntegrator::Explicit { scheme_coeff: 0.5 })
    );
    assert_eq!(config.diagnostics, Diagnostics::Enabled);
    assert_eq!(config.check_period, 10);

    let defaults = SimulationConfig::default();
    assert_eq!(config.dt, defaults.dt);
    assert_eq!(config.max_iterations, defaults.max_iterations);
    assert_eq!(config.convergence_criterion, defaults.convergence_criterion);
    assert_eq!(config.tau_model, TauModel::Constant);
}

#[test]
fn test_config_round_trip() {
    let config = SimulationConfig::default()
        .with_dt(0.002)
        .with_tau_model(TauModel::InverseDensity)
        .with_body_force(BodyForce::Constant([0.0, -1e-5, 0.0]))
        .with_scheme(Scheme::FiniteDifference(TimeIntegrator::SemiImplicit));
    let json = serde_json::to_string(&config).unwrap();
    let back: SimulationConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_boundary_and_lattice_names() {
    let json = r#"[
        { "surface": "Top", "condition": { "ZouHeVelocity": { "velocity": [0.01, 0.0, 0.0] } } },
        { "surface": "Left", "condition": "FreeFlux" }
    ]"#;
    let boundaries: Vec<SurfaceBoundary> = serde_json::from_str(json).unwrap();
    assert_eq!(
        boundaries,
        vec![
            SurfaceBoundary::new(
                Surface::Top,
                BoundaryCondition::ZouHeVelocity {
                    velocity: [0.01, 0.0, 0.0]
                }
            ),
            SurfaceBoundary::new(Surface::Left, BoundaryCondition::FreeFlux),
        ]
    );
    let set: VelocitySet = serde_json::from_str("\"D3Q19\"").unwrap();
    assert_eq!(set, VelocitySet::D3Q19);
}
