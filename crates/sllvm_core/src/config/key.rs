//! File keys for the external simulator's output tree
//!
//! The simulator writes one npy file per (series, parameter point, seed) and
//! names it with a suffix rendered from the parameter values. Each sweep mode
//! uses its own field order and decimal precision, and lookups only succeed
//! when we reproduce those strings exactly. All precisions therefore live in
//! the [`Layout`] tables below and nowhere else.
//!
//! Directory layout (L = 2^m):
//!
//! ```text
//! <data_root>/sllvm/<argument>/<L>x<L>/
//!     seeds.txt
//!     <argument>.txt
//!     H<H:.4f>/pred_population<suffix>.npy
//!     H<H:.4f>/prey_population<suffix>.npy
//! <results_root>/sllvm/<argument>/<L>x<L>/
//!     N<output suffix>.npy ...
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use super::{AnalysisConfig, ParameterSet, SweepArgument};
use crate::error::{AnalysisError, Result};

/// A base parameter that appears in a rendered suffix or description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Horizon,
    InitialPredators,
    InitialPrey,
    Fragmentation,
    HabitatFraction,
    Mortality,
    DispersalRate,
    PredationRate,
    GrowthRate,
    LevyExponent,
}

impl Field {
    fn value(self, params: &ParameterSet) -> f64 {
        match self {
            Field::Horizon => params.horizon as f64,
            Field::InitialPredators => params.initial_predators as f64,
            Field::InitialPrey => params.initial_prey as f64,
            Field::Fragmentation => params.fragmentation,
            Field::HabitatFraction => params.habitat_fraction,
            Field::Mortality => params.mortality,
            Field::DispersalRate => params.dispersal_rate,
            Field::PredationRate => params.predation_rate,
            Field::GrowthRate => params.growth_rate,
            Field::LevyExponent => params.levy_exponent,
        }
    }
}

/// Number formatting of one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Integer,
    Decimals(usize),
}

impl Precision {
    /// Render a value the way the simulator does (`{:d}` / `{:.Nf}`)
    pub fn format(self, value: f64) -> String {
        match self {
            Precision::Integer => format!("{}", value.round() as i64),
            Precision::Decimals(places) => format!("{value:.places$}"),
        }
    }

    fn placeholder(self) -> String {
        match self {
            Precision::Integer => "{var:d}".to_string(),
            Precision::Decimals(places) => format!("{{var:.{places}f}}"),
        }
    }
}

/// One entry of a naming table: label, parameter and precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    pub field: Field,
    pub precision: Precision,
}

const fn int(label: &'static str, field: Field) -> FieldSpec {
    FieldSpec {
        label,
        field,
        precision: Precision::Integer,
    }
}

const fn dec(label: &'static str, field: Field, places: usize) -> FieldSpec {
    FieldSpec {
        label,
        field,
        precision: Precision::Decimals(places),
    }
}

use Field::*;

/// Naming tables for one sweep mode
struct Layout {
    /// Directory the value list and data live in
    source: &'static str,
    input: &'static [FieldSpec],
    varying: Option<Field>,
    output: &'static [FieldSpec],
    description: &'static [FieldSpec],
}

const LAMBDA: Layout = Layout {
    source: "lambda",
    input: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 3),
        dec("rho", HabitatFraction, 3),
        dec("mu", Mortality, 4),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("sig", GrowthRate, 4),
        dec("a", LevyExponent, 3),
    ],
    varying: Some(PredationRate),
    output: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 3),
        dec("rho", HabitatFraction, 3),
        dec("Lambda", DispersalRate, 4),
        dec("alpha", LevyExponent, 3),
        dec("mu", Mortality, 4),
        dec("sigma", GrowthRate, 4),
    ],
    description: &[
        dec("H", Fragmentation, 3),
        dec("\u{03C1}", HabitatFraction, 3),
        int("T", Horizon),
        dec("\u{039B}", DispersalRate, 4),
        dec("\u{03B1}", LevyExponent, 3),
        dec("\u{03BC}", Mortality, 4),
        dec("\u{03C3}", GrowthRate, 4),
    ],
};

const ALPHA: Layout = Layout {
    source: "alpha",
    input: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("mu", Mortality, 4),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("sigma", GrowthRate, 4),
        dec("alpha", LevyExponent, 3),
    ],
    varying: Some(LevyExponent),
    output: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("mu", Mortality, 4),
        dec("sigma", GrowthRate, 4),
    ],
    description: &[
        dec("H", Fragmentation, 4),
        dec("\u{03C1}", HabitatFraction, 3),
        int("T", Horizon),
        dec("\u{039B}", DispersalRate, 4),
        dec("\u{03BB}", PredationRate, 4),
        dec("\u{03BC}", Mortality, 4),
        dec("\u{03C3}", GrowthRate, 4),
    ],
};

// H values are listed in the alpha tree, so the H sweep reads from there.
const FRAGMENTATION: Layout = Layout {
    source: "alpha",
    input: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("mu", Mortality, 4),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("sigma", GrowthRate, 4),
        dec("alpha", LevyExponent, 3),
    ],
    varying: Some(Fragmentation),
    output: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("rho", HabitatFraction, 3),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("mu", Mortality, 4),
        dec("sigma", GrowthRate, 4),
        dec("alpha", LevyExponent, 3),
    ],
    description: &[
        dec("\u{03C1}", HabitatFraction, 3),
        int("T", Horizon),
        dec("\u{039B}", DispersalRate, 4),
        dec("\u{03BB}", PredationRate, 4),
        dec("\u{03BC}", Mortality, 4),
        dec("\u{03C3}", GrowthRate, 4),
        dec("\u{03B1}", LevyExponent, 3),
    ],
};

const SIGMA: Layout = Layout {
    source: "sigma",
    input: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("mu", Mortality, 4),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("sigma", GrowthRate, 4),
        dec("alpha", LevyExponent, 3),
    ],
    varying: Some(GrowthRate),
    output: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("mu", Mortality, 4),
        dec("alpha", LevyExponent, 3),
    ],
    description: &[
        dec("H", Fragmentation, 4),
        dec("\u{03C1}", HabitatFraction, 3),
        int("T", Horizon),
        dec("\u{039B}", DispersalRate, 4),
        dec("\u{03BB}", PredationRate, 4),
        dec("\u{03B1}", LevyExponent, 3),
        dec("\u{03BC}", Mortality, 4),
    ],
};

const EVOLUTION: Layout = Layout {
    source: "evolution",
    input: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("mu", Mortality, 4),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("sigma", GrowthRate, 4),
        dec("alpha", LevyExponent, 3),
    ],
    varying: None,
    output: &[
        int("T", Horizon),
        int("N", InitialPredators),
        int("M", InitialPrey),
        dec("H", Fragmentation, 4),
        dec("rho", HabitatFraction, 3),
        dec("Lambda", DispersalRate, 4),
        dec("lambda", PredationRate, 4),
        dec("mu", Mortality, 4),
        dec("sigma", GrowthRate, 4),
        dec("alpha", LevyExponent, 4),
    ],
    description: &[
        dec("H", Fragmentation, 3),
        dec("\u{03C1}", HabitatFraction, 3),
        int("T", Horizon),
        dec("\u{039B}", DispersalRate, 4),
        dec("\u{03BB}", PredationRate, 4),
        dec("\u{03B1}", LevyExponent, 3),
        dec("\u{03BC}", Mortality, 4),
        dec("\u{03C3}", GrowthRate, 4),
    ],
};

/// Results of the (H, alpha) search vary over both axes, so neither appears
const ALPHASTAR_OUTPUT: &[FieldSpec] = &[
    int("T", Horizon),
    int("N", InitialPredators),
    int("M", InitialPrey),
    dec("rho", HabitatFraction, 3),
    dec("Lambda", DispersalRate, 4),
    dec("lambda", PredationRate, 4),
    dec("mu", Mortality, 4),
    dec("sigma", GrowthRate, 4),
];

const ALPHASTAR_DESCRIPTION: &[FieldSpec] = &[
    dec("\u{03C1}", HabitatFraction, 3),
    int("T", Horizon),
    dec("\u{039B}", DispersalRate, 4),
    dec("\u{03BB}", PredationRate, 4),
    dec("\u{03BC}", Mortality, 4),
    dec("\u{03C3}", GrowthRate, 4),
];

fn layout(argument: SweepArgument) -> &'static Layout {
    match argument {
        SweepArgument::Lambda => &LAMBDA,
        SweepArgument::Alpha => &ALPHA,
        SweepArgument::Fragmentation => &FRAGMENTATION,
        SweepArgument::Sigma => &SIGMA,
        SweepArgument::Evolution => &EVOLUTION,
    }
}

fn render_suffix(specs: &[FieldSpec], params: &ParameterSet) -> String {
    specs
        .iter()
        .map(|spec| {
            format!(
                "_{}{}",
                spec.label,
                spec.precision.format(spec.field.value(params))
            )
        })
        .collect()
}

fn render_description(specs: &[FieldSpec], params: &ParameterSet) -> String {
    let l = params.lattice_size();
    let mut out = format!("{l}x{l} lattice");
    for spec in specs {
        out.push_str(&format!(
            ", {}={}",
            spec.label,
            spec.precision.format(spec.field.value(params))
        ));
    }
    out
}

/// A piece of an input-file suffix
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Already rendered base parameter, e.g. `_T500`
    Fixed(String),
    /// The swept parameter, rendered at resolve time
    Varying {
        label: &'static str,
        precision: Precision,
    },
    /// `_seed<seed>`
    Seed,
}

/// Input-file suffix with unresolved varying value and seed
///
/// Displays with Python-style placeholders, e.g.
/// `_T500_..._alpha{var:.3f}_seed{seed:d}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SuffixTemplate {
    segments: Vec<Segment>,
}

impl SuffixTemplate {
    fn new(specs: &[FieldSpec], varying: Option<Field>, params: &ParameterSet) -> Self {
        let mut segments: Vec<Segment> = specs
            .iter()
            .map(|spec| {
                if Some(spec.field) == varying {
                    Segment::Varying {
                        label: spec.label,
                        precision: spec.precision,
                    }
                } else {
                    Segment::Fixed(format!(
                        "_{}{}",
                        spec.label,
                        spec.precision.format(spec.field.value(params))
                    ))
                }
            })
            .collect();
        segments.push(Segment::Seed);
        Self { segments }
    }

    /// Whether a varying value must be supplied to [`SuffixTemplate::resolve`]
    pub fn has_variable(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Varying { .. }))
    }

    /// Substitute the varying value and seed
    pub fn resolve(&self, value: Option<f64>, seed: i64) -> Result<String> {
        match (self.has_variable(), value) {
            (true, None) => {
                return Err(AnalysisError::Config(
                    "suffix template needs a value for the swept parameter".to_string(),
                ));
            }
            (false, Some(v)) => {
                return Err(AnalysisError::Config(format!(
                    "suffix template has no swept parameter, got value {v}"
                )));
            }
            _ => {}
        }

        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Fixed(text) => out.push_str(text),
                Segment::Varying { label, precision } => {
                    out.push('_');
                    out.push_str(label);
                    out.push_str(&precision.format(value.unwrap_or_default()));
                }
                Segment::Seed => out.push_str(&format!("_seed{seed}")),
            }
        }
        Ok(out)
    }
}

impl fmt::Display for SuffixTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Fixed(text) => f.write_str(text)?,
                Segment::Varying { label, precision } => {
                    write!(f, "_{label}{}", precision.placeholder())?
                }
                Segment::Seed => f.write_str("_seed{seed:d}")?,
            }
        }
        Ok(())
    }
}

/// Every path and name needed for one sweep, derived once from the
/// configuration and passed explicitly to loaders and writers
#[derive(Debug, Clone, PartialEq)]
pub struct SweepKey {
    argument: SweepArgument,
    fragmentation: f64,
    source_dir: PathBuf,
    results_dir: PathBuf,
    input_suffix: SuffixTemplate,
    output_suffix: String,
    description: String,
}

impl SweepKey {
    /// Validate the configuration and derive its key
    pub fn build(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            &config.parameters,
            config.argument,
            &config.data_root,
            &config.results_root,
        ))
    }

    pub fn new(
        params: &ParameterSet,
        argument: SweepArgument,
        data_root: &Path,
        results_root: &Path,
    ) -> Self {
        let layout = layout(argument);
        let l = params.lattice_size();
        let lattice = format!("{l}x{l}");

        Self {
            argument,
            fragmentation: params.fragmentation,
            source_dir: data_root.join("sllvm").join(layout.source).join(&lattice),
            results_dir: results_root
                .join("sllvm")
                .join(argument.name())
                .join(&lattice),
            input_suffix: SuffixTemplate::new(layout.input, layout.varying, params),
            output_suffix: render_suffix(layout.output, params),
            description: render_description(layout.description, params),
        }
    }

    /// Output suffix for the (H, alpha) optimal-exponent matrices
    pub fn alphastar_output_suffix(params: &ParameterSet) -> String {
        render_suffix(ALPHASTAR_OUTPUT, params)
    }

    pub fn alphastar_description(params: &ParameterSet) -> String {
        render_description(ALPHASTAR_DESCRIPTION, params)
    }

    pub fn argument(&self) -> SweepArgument {
        self.argument
    }

    /// Directory holding `seeds.txt` and the value list
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn input_suffix(&self) -> &SuffixTemplate {
        &self.input_suffix
    }

    /// Suffix for aggregated outputs; excludes the swept value and seed
    pub fn output_suffix(&self) -> &str {
        &self.output_suffix
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn seeds_path(&self) -> PathBuf {
        self.source_dir.join("seeds.txt")
    }

    /// `<argument>.txt`, absent for sweeps without an independent variable
    pub fn values_path(&self) -> Option<PathBuf> {
        self.argument
            .has_variable()
            .then(|| self.source_dir.join(format!("{}.txt", self.argument.name())))
    }

    /// Directory of the trajectory files for one parameter point
    pub fn data_dir(&self, value: Option<f64>) -> PathBuf {
        let fragmentation = match (self.argument, value) {
            (SweepArgument::Fragmentation, Some(h)) => h,
            _ => self.fragmentation,
        };
        self.source_dir.join(format!("H{fragmentation:.4}"))
    }
}
