//! Falsification tests for the SIRD core.
//!
//! Each test states a hypothesis about the model and tries to break it on
//! concrete scenarios. Tolerances are explicit: conservation and
//! monotonicity hold to solver accuracy, not bit-exactness.

use episim::prelude::*;

const POPULATION: f64 = 1000.0;

/// Allowed numeric slack for monotonicity checks, in individuals.
const MONO_TOL: f64 = 1e-9;

fn presets() -> [Parameters; 4] {
    [
        Parameters::default(),
        Parameters::strict_lockdown(),
        Parameters::no_measures(),
        Parameters::progressive_vaccination(),
    ]
}

// H0: S+I+R+D = N at every grid point, for every preset
// Falsification: integrate all presets, compare totals against N
#[test]
fn h0_1_population_is_conserved() {
    for params in presets() {
        let output = simulate(params).unwrap();
        let drift = output.trajectory.conservation_drift(POPULATION);

        assert!(drift < 1e-6, "relative drift {drift} exceeds tolerance");
    }
}

// H0: S never increases; R and D never decrease
// Falsification: scan consecutive samples in every preset
#[test]
fn h0_2_compartments_are_monotonic() {
    for params in presets() {
        let output = simulate(params).unwrap();
        let traj = &output.trajectory;

        for pair in traj.susceptible().windows(2) {
            assert!(pair[1] <= pair[0] + MONO_TOL, "S increased: {pair:?}");
        }
        for pair in traj.recovered().windows(2) {
            assert!(pair[1] >= pair[0] - MONO_TOL, "R decreased: {pair:?}");
        }
        for pair in traj.deceased().windows(2) {
            assert!(pair[1] >= pair[0] - MONO_TOL, "D decreased: {pair:?}");
        }
    }
}

// H0: with mu = 0 the deceased series is identically zero and the model
// reduces to classical SIR with S+I+R = N
// Falsification: run the default scenario without mortality
#[test]
fn h0_3_no_mortality_reduces_to_sir() {
    let params = Parameters::default().without_mortality();
    let output = simulate(params).unwrap();
    let traj = &output.trajectory;

    for &d in traj.deceased() {
        assert!(d.abs() < 1e-9, "deceased nonzero without mortality: {d}");
    }

    for i in 0..traj.len() {
        let s = traj.susceptible()[i];
        let inf = traj.infected()[i];
        let r = traj.recovered()[i];
        assert!(
            (s + inf + r - POPULATION).abs() / POPULATION < 1e-6,
            "S+I+R drifted from N at index {i}"
        );
    }
}

// H0: reported peak equals the maximum of the infected series and the
// reported day is the grid value at the first argmax
// Falsification: recompute the argmax independently
#[test]
fn h0_4_peak_matches_infected_series() {
    let output = simulate(Parameters::default()).unwrap();
    let traj = &output.trajectory;

    let mut max = f64::NEG_INFINITY;
    let mut argmax = 0;
    for (i, &v) in traj.infected().iter().enumerate() {
        if v > max {
            max = v;
            argmax = i;
        }
    }

    assert!((output.metrics.peak_infected - max).abs() < f64::EPSILON);
    assert!((output.metrics.peak_day - traj.time()[argmax]).abs() < f64::EPSILON);
}

// H0: Re(0) > 1 implies the infected count initially grows
// Falsification: default scenario has Re(0) ~ 4.3
#[test]
fn h0_5_above_threshold_infections_grow() {
    let output = simulate(Parameters::default()).unwrap();

    assert!(output.metrics.initial_reproduction() > 1.0);
    let infected = output.trajectory.infected();
    assert!(
        infected[1] > infected[0],
        "I did not grow: {} -> {}",
        infected[0],
        infected[1]
    );
}

// H0: Re(0) < 1 implies the infected count never rises above I0
// Falsification: beta = 0.1 against removal 0.32 gives Re(0) ~ 0.31
#[test]
fn h0_6_below_threshold_infections_decline() {
    let params = Parameters::builder()
        .beta(0.1)
        .gamma(0.3)
        .mu(0.02)
        .days(60)
        .build();
    let output = simulate(params).unwrap();

    assert!(output.metrics.initial_reproduction() < 1.0);
    for pair in output.trajectory.infected().windows(2) {
        assert!(pair[1] <= pair[0] + MONO_TOL, "I increased: {pair:?}");
    }
}

// H0: the reference scenario (N=1000, beta=0.3, gamma=0.05, mu=0.02, I0=1,
// 160 days) starts at the exact initial state, declines in S immediately,
// peaks strictly inside the horizon, and ends with an attack rate in (0, 1)
#[test]
fn h0_7_reference_scenario() {
    let params = Parameters::default();
    let output = simulate(params).unwrap();
    let traj = &output.trajectory;

    let first = traj.state_at(0).unwrap();
    assert!((first.susceptible - 999.0).abs() < f64::EPSILON);
    assert!((first.infected - 1.0).abs() < f64::EPSILON);
    assert!((first.recovered - 0.0).abs() < f64::EPSILON);
    assert!((first.deceased - 0.0).abs() < f64::EPSILON);

    assert!(traj.susceptible()[1] < traj.susceptible()[0]);

    assert!(output.metrics.peak_day > 0.0);
    assert!(output.metrics.peak_day < 160.0);
    assert!(output.metrics.peak_infected > 1.0);

    assert!(output.metrics.attack_rate > 0.0);
    assert!(output.metrics.attack_rate < 1.0);
}

// H0: two runs with identical parameters produce identical output, bitwise
// Falsification: compare full trajectories and metrics for equality
#[test]
fn h0_8_runs_are_idempotent() {
    for params in presets() {
        let a = simulate(params.clone()).unwrap();
        let b = simulate(params).unwrap();

        assert_eq!(a.trajectory, b.trajectory);
        assert_eq!(a.metrics, b.metrics);
    }
}

// H0: degenerate inputs are rejected with typed errors, never NaN output
#[test]
fn h0_9_degenerate_inputs_are_rejected() {
    let zero_population = Parameters {
        population: 0,
        ..Parameters::default()
    };
    assert!(simulate(zero_population).unwrap_err().is_domain());

    let zero_infected = Parameters {
        initial_infected: 0,
        ..Parameters::default()
    };
    assert!(simulate(zero_infected).unwrap_err().is_validation());

    let no_removal = Parameters {
        gamma: 0.0,
        mu: 0.0,
        ..Parameters::default()
    };
    assert!(simulate(no_removal).unwrap_err().is_domain());
}

// H0: the fixed-step and adaptive methods agree to well under one
// individual on the reference scenario
#[test]
fn h0_10_methods_agree() {
    let rk4 = Simulation::with_method(Parameters::default(), Method::Rk4)
        .unwrap()
        .run()
        .unwrap();
    let dopri = Simulation::with_method(Parameters::default(), Method::DormandPrince)
        .unwrap()
        .run()
        .unwrap();

    let max_diff = rk4
        .trajectory
        .infected()
        .iter()
        .zip(dopri.trajectory.infected())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);

    assert!(max_diff < 5e-3, "methods disagree by {max_diff}");
}

// H0: the numerical peak and final attack rate track the closed-form
// diagnostics of the model
// Falsification: compare against the analytical peak and the final-size
// equation root within a few percent
#[test]
fn h0_11_numerics_track_closed_forms() {
    let params = Parameters::default();
    let model = SirdModel::new(&params).unwrap();
    let output = simulate(params).unwrap();

    let analytical_peak = model.analytical_peak_infected().unwrap();
    let relative = (output.metrics.peak_infected - analytical_peak).abs() / analytical_peak;
    assert!(
        relative < 0.05,
        "numerical peak {} vs analytical {analytical_peak}",
        output.metrics.peak_infected
    );

    let final_size = model.final_size_fraction().unwrap();
    let relative = (output.metrics.attack_rate - final_size).abs() / final_size;
    assert!(
        relative < 0.02,
        "attack rate {} vs final-size root {final_size}",
        output.metrics.attack_rate
    );
}

// H0: grid resolution changes output density only, not the dynamics
// Falsification: compare shared sample points at 10/day and 20/day
#[test]
fn h0_12_resolution_changes_density_not_dynamics() {
    let coarse = simulate(Parameters::default()).unwrap();
    let fine = simulate(Parameters {
        samples_per_day: 20,
        ..Parameters::default()
    })
    .unwrap();

    assert_eq!(fine.trajectory.len(), 2 * coarse.trajectory.len() - 1);

    // Every coarse point t=k/10 appears in the fine grid at index 2k
    let max_diff = coarse
        .trajectory
        .infected()
        .iter()
        .enumerate()
        .map(|(k, v)| (v - fine.trajectory.infected()[2 * k]).abs())
        .fold(0.0, f64::max);
    assert!(max_diff < 5e-3, "resolution changed dynamics by {max_diff}");
}
