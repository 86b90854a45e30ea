//! Golden file keys
//!
//! Every expected string below was produced with the simulator's own format
//! strings for the parameters of [`golden_params`].

use std::path::{Path, PathBuf};

use super::fixtures::golden_params;
use crate::config::{Field, ParameterSet, SweepArgument, SweepKey};

fn key(argument: SweepArgument) -> SweepKey {
    SweepKey::new(
        &golden_params(),
        argument,
        Path::new("data"),
        Path::new("results"),
    )
}

#[test]
fn test_lambda_suffixes() {
    let key = key(SweepArgument::Lambda);
    assert_eq!(
        key.input_suffix().resolve(Some(0.125), 7).unwrap(),
        "_T250_N128_M256_H0.010_rho0.100_mu0.0125_Lambda0.0075_lambda0.1250_sig0.3333_a1.750_seed7"
    );
    assert_eq!(
        key.output_suffix(),
        "_T250_N128_M256_H0.010_rho0.100_Lambda0.0075_alpha1.750_mu0.0125_sigma0.3333"
    );
}

#[test]
fn test_alpha_suffixes() {
    let key = key(SweepArgument::Alpha);
    assert_eq!(
        key.input_suffix().resolve(Some(2.75), 12).unwrap(),
        "_T250_N128_M256_H0.0100_rho0.100_mu0.0125_Lambda0.0075_lambda0.5000_sigma0.3333_alpha2.750_seed12"
    );
    assert_eq!(
        key.output_suffix(),
        "_T250_N128_M256_H0.0100_rho0.100_Lambda0.0075_lambda0.5000_mu0.0125_sigma0.3333"
    );
}

#[test]
fn test_fragmentation_suffixes() {
    let key = key(SweepArgument::Fragmentation);
    assert_eq!(
        key.input_suffix().resolve(Some(0.9), 0).unwrap(),
        "_T250_N128_M256_H0.9000_rho0.100_mu0.0125_Lambda0.0075_lambda0.5000_sigma0.3333_alpha1.750_seed0"
    );
    assert_eq!(
        key.output_suffix(),
        "_T250_N128_M256_rho0.100_Lambda0.0075_lambda0.5000_mu0.0125_sigma0.3333_alpha1.750"
    );
}

#[test]
fn test_sigma_suffixes() {
    let key = key(SweepArgument::Sigma);
    assert_eq!(
        key.input_suffix().resolve(Some(0.05), 3).unwrap(),
        "_T250_N128_M256_H0.0100_rho0.100_mu0.0125_Lambda0.0075_lambda0.5000_sigma0.0500_alpha1.750_seed3"
    );
    assert_eq!(
        key.output_suffix(),
        "_T250_N128_M256_H0.0100_rho0.100_Lambda0.0075_lambda0.5000_mu0.0125_alpha1.750"
    );
}

#[test]
fn test_evolution_suffixes() {
    let key = key(SweepArgument::Evolution);
    assert!(!key.input_suffix().has_variable());
    assert_eq!(
        key.input_suffix().resolve(None, 42).unwrap(),
        "_T250_N128_M256_H0.0100_rho0.100_mu0.0125_Lambda0.0075_lambda0.5000_sigma0.3333_alpha1.750_seed42"
    );
    assert_eq!(
        key.output_suffix(),
        "_T250_N128_M256_H0.0100_rho0.100_Lambda0.0075_lambda0.5000_mu0.0125_sigma0.3333_alpha1.7500"
    );
}

#[test]
fn test_output_suffix_never_contains_seed_or_swept_value() {
    let exclusions = [
        (SweepArgument::Lambda, "_lambda"),
        (SweepArgument::Alpha, "_alpha"),
        (SweepArgument::Fragmentation, "_H"),
        (SweepArgument::Sigma, "_sigma"),
    ];
    for (argument, label) in exclusions {
        let key = key(argument);
        assert!(!key.output_suffix().contains("seed"), "{argument}");
        assert!(!key.output_suffix().contains(label), "{argument}");
    }
}

#[test]
fn test_sweeps_of_different_modes_write_to_different_places() {
    let outputs: Vec<_> = SweepArgument::ALL
        .iter()
        .map(|&a| {
            let key = key(a);
            key.results_dir().join(key.output_suffix())
        })
        .collect();
    for (i, a) in outputs.iter().enumerate() {
        for b in &outputs[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

const FIELDS: [Field; 10] = [
    Field::Horizon,
    Field::InitialPredators,
    Field::InitialPrey,
    Field::Fragmentation,
    Field::HabitatFraction,
    Field::Mortality,
    Field::DispersalRate,
    Field::PredationRate,
    Field::GrowthRate,
    Field::LevyExponent,
];

/// Smallest change of `field` that every naming table can still see
fn nudged(field: Field) -> ParameterSet {
    let mut params = golden_params();
    match field {
        Field::Horizon => params.horizon += 1,
        Field::InitialPredators => params.initial_predators += 1,
        Field::InitialPrey => params.initial_prey += 1,
        Field::Fragmentation => params.fragmentation += 0.01,
        Field::HabitatFraction => params.habitat_fraction += 0.01,
        Field::Mortality => params.mortality += 0.01,
        Field::DispersalRate => params.dispersal_rate += 0.01,
        Field::PredationRate => params.predation_rate += 0.01,
        Field::GrowthRate => params.growth_rate += 0.01,
        Field::LevyExponent => params.levy_exponent += 0.01,
    }
    params
}

fn output_key(params: &ParameterSet, argument: SweepArgument) -> PathBuf {
    let key = SweepKey::new(params, argument, Path::new("data"), Path::new("results"));
    key.results_dir().join(key.output_suffix())
}

#[test]
fn test_distinct_base_parameters_never_share_an_output_key() {
    let varying = |argument: SweepArgument| match argument {
        SweepArgument::Lambda => Some(Field::PredationRate),
        SweepArgument::Alpha => Some(Field::LevyExponent),
        SweepArgument::Fragmentation => Some(Field::Fragmentation),
        SweepArgument::Sigma => Some(Field::GrowthRate),
        SweepArgument::Evolution => None,
    };

    for argument in SweepArgument::ALL {
        let base = output_key(&golden_params(), argument);
        for field in FIELDS {
            let changed = output_key(&nudged(field), argument);
            if Some(field) == varying(argument) {
                assert_eq!(changed, base, "{argument}: {field:?} is swept");
            } else {
                assert_ne!(changed, base, "{argument}: {field:?} collides");
            }
        }

        let larger = ParameterSet {
            lattice_exponent: golden_params().lattice_exponent + 1,
            ..golden_params()
        };
        assert_ne!(output_key(&larger, argument), base, "{argument}: lattice collides");
    }
}

#[test]
fn test_output_key_is_shared_by_all_seeds() {
    for argument in SweepArgument::ALL {
        let key = key(argument);
        let value = argument.has_variable().then_some(0.5);
        let first = key.input_suffix().resolve(value, 1).unwrap();
        let second = key.input_suffix().resolve(value, 2).unwrap();
        assert_ne!(first, second);
        assert!(!key.output_suffix().contains("_seed"), "{argument}");
        assert_eq!(
            key.results_dir().join(key.output_suffix()),
            output_key(&golden_params(), argument)
        );
    }
}

#[test]
fn test_directories_use_lattice_size() {
    let alpha = key(SweepArgument::Alpha);
    assert_eq!(alpha.source_dir(), Path::new("data/sllvm/alpha/64x64"));
    assert_eq!(alpha.results_dir(), Path::new("results/sllvm/alpha/64x64"));
    assert_eq!(alpha.data_dir(Some(2.0)), Path::new("data/sllvm/alpha/64x64/H0.0100"));

    let h = key(SweepArgument::Fragmentation);
    assert_eq!(h.source_dir(), Path::new("data/sllvm/alpha/64x64"));
    assert_eq!(h.values_path().unwrap(), Path::new("data/sllvm/alpha/64x64/H.txt"));
    assert_eq!(h.data_dir(Some(0.9)), Path::new("data/sllvm/alpha/64x64/H0.9000"));
    assert_eq!(h.results_dir(), Path::new("results/sllvm/H/64x64"));

    let evolution = key(SweepArgument::Evolution);
    assert_eq!(evolution.values_path(), None);
    assert_eq!(evolution.seeds_path(), Path::new("data/sllvm/evolution/64x64/seeds.txt"));
}

#[test]
fn test_alphastar_suffix() {
    assert_eq!(
        SweepKey::alphastar_output_suffix(&golden_params()),
        "_T250_N128_M256_rho0.100_Lambda0.0075_lambda0.5000_mu0.0125_sigma0.3333"
    );
}

#[test]
fn test_template_display_shows_placeholders() {
    let key = key(SweepArgument::Alpha);
    assert_eq!(
        key.input_suffix().to_string(),
        "_T250_N128_M256_H0.0100_rho0.100_mu0.0125_Lambda0.0075_lambda0.5000_sigma0.3333_alpha{var:.3f}_seed{seed:d}"
    );
}
