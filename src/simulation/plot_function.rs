//! Plot function adapter for Model 2
//!
//! Exposes the model's sweeps as named independent and dependent variables
//! for a plotting front end. The independent variable drives the sweep; the
//! dependent variables read back the series that sweep produced.

use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;

use super::error::SimError;
use super::model::{Model2, SimulationResults};
use super::types::CONSTANT_COUNT;

pub const PLOT_TYPE_STRING: &str = "Model 2";

/// Labels for the positional constants, in `set_constant_vals` order
pub const CONSTANT_STRINGS: [&str; CONSTANT_COUNT] = [
    "Bridge length (m)",
    "Car length (m)",
    "Crossing velocity (km/h)",
    "Qi (per min)",
    "Qj (per min)",
    "tgmax",
    "N",
];

/// Variables that can go on the x axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndependentVariable {
    /// Arrival index
    N,
    /// Elapsed time in minutes
    T,
}

/// Variables that can go on the y axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentVariable {
    Tw,
    PsiA,
    PsiC,
    PsiD,
    PsiAr,
    PsiAg,
}

impl IndependentVariable {
    pub const ALL: [IndependentVariable; 2] = [IndependentVariable::N, IndependentVariable::T];

    pub fn name(self) -> &'static str {
        match self {
            IndependentVariable::N => "N",
            IndependentVariable::T => "t",
        }
    }
}

impl DependentVariable {
    pub const ALL: [DependentVariable; 6] = [
        DependentVariable::Tw,
        DependentVariable::PsiA,
        DependentVariable::PsiC,
        DependentVariable::PsiD,
        DependentVariable::PsiAr,
        DependentVariable::PsiAg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DependentVariable::Tw => "tw",
            DependentVariable::PsiA => "psi_a",
            DependentVariable::PsiC => "psi_c",
            DependentVariable::PsiD => "psi_d",
            DependentVariable::PsiAr => "psi_ar",
            DependentVariable::PsiAg => "psi_ag",
        }
    }

    fn series(self, results: &SimulationResults) -> &[f64] {
        match self {
            DependentVariable::Tw => &results.tw,
            DependentVariable::PsiA => &results.psi_a,
            DependentVariable::PsiC => &results.psi_c,
            DependentVariable::PsiD => &results.psi_d,
            DependentVariable::PsiAr => &results.psi_ar,
            DependentVariable::PsiAg => &results.psi_ag,
        }
    }
}

impl fmt::Display for IndependentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for DependentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IndependentVariable {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|var| var.name() == s)
            .ok_or_else(|| SimError::UnknownVariable(s.to_string()))
    }
}

impl FromStr for DependentVariable {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|var| var.name() == s)
            .ok_or_else(|| SimError::UnknownVariable(s.to_string()))
    }
}

/// Either kind of plot variable, for name-based lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotVariable {
    Independent(IndependentVariable),
    Dependent(DependentVariable),
}

impl FromStr for PlotVariable {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IndependentVariable>()
            .map(PlotVariable::Independent)
            .or_else(|_| s.parse::<DependentVariable>().map(PlotVariable::Dependent))
    }
}

/// Extent of a plotted line. Infinite and NaN values are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesLimits {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl SeriesLimits {
    pub fn from_data(xdata: &[f64], ydata: &[f64]) -> Self {
        let (xmin, xmax) = finite_extent(xdata).unwrap_or((0.0, 0.0));
        let (ymin, ymax) = finite_extent(ydata).unwrap_or((0.0, 0.0));
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// Smallest limits covering both
    pub fn union(&self, other: &SeriesLimits) -> SeriesLimits {
        SeriesLimits {
            xmin: self.xmin.min(other.xmin),
            xmax: self.xmax.max(other.xmax),
            ymin: self.ymin.min(other.ymin),
            ymax: self.ymax.max(other.ymax),
        }
    }
}

fn finite_extent(data: &[f64]) -> Option<(f64, f64)> {
    let finite = || data.iter().copied().filter(|v| v.is_finite()).map(OrderedFloat);
    let min = finite().min()?;
    let max = finite().max()?;
    Some((min.into_inner(), max.into_inner()))
}

/// One computed line
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub x_var: IndependentVariable,
    pub y_var: DependentVariable,
    pub xdata: Vec<f64>,
    pub ydata: Vec<f64>,
    pub limits: SeriesLimits,
}

/// Named sweep functions over a `Model2`
#[derive(Debug, Clone, Default)]
pub struct Model2PlotFunction {
    pub model: Model2,
    swept: bool,
}

impl Model2PlotFunction {
    pub fn new(model: Model2) -> Self {
        Self {
            model,
            swept: false,
        }
    }

    pub fn plot_type_string(&self) -> &'static str {
        PLOT_TYPE_STRING
    }

    pub fn xvar_strings(&self) -> Vec<&'static str> {
        IndependentVariable::ALL.iter().map(|var| var.name()).collect()
    }

    pub fn yvar_strings(&self) -> Vec<&'static str> {
        DependentVariable::ALL.iter().map(|var| var.name()).collect()
    }

    pub fn constant_strings(&self) -> &'static [&'static str] {
        &CONSTANT_STRINGS
    }

    pub fn get_constant_vals(&self) -> [f64; CONSTANT_COUNT] {
        self.model.get_constant_vals()
    }

    /// Load new constants. Results of earlier sweeps no longer apply.
    pub fn set_constant_vals(&mut self, values: &[f64]) -> Result<(), SimError> {
        self.model.set_constant_vals(values)?;
        self.swept = false;
        Ok(())
    }

    /// Run the sweep over `N` in `[min, max]` and return the x values
    pub fn x_data(&mut self, var: IndependentVariable, min: i64, max: i64) -> Result<Vec<f64>, SimError> {
        self.swept = false;
        let values = self.model.sweep_n(min, max)?;
        self.swept = true;

        Ok(match var {
            IndependentVariable::N => values.into_iter().map(|n| n as f64).collect(),
            IndependentVariable::T => self.model.results().t.clone(),
        })
    }

    /// Series produced by the most recent sweep
    pub fn y_data(&self, var: DependentVariable) -> Result<Vec<f64>, SimError> {
        if !self.swept {
            return Err(SimError::NoData(var));
        }
        Ok(var.series(self.model.results()).to_vec())
    }

    /// Name-keyed entry point. Ranges are ignored for dependent variables.
    pub fn get_data(&mut self, name: &str, min: i64, max: i64) -> Result<Vec<f64>, SimError> {
        match name.parse::<PlotVariable>()? {
            PlotVariable::Independent(var) => self.x_data(var, min, max),
            PlotVariable::Dependent(var) => self.y_data(var),
        }
    }

    /// Sweep `x_var` over `[min, max]` and read `y_var` from it
    pub fn plot(
        &mut self,
        x_var: IndependentVariable,
        y_var: DependentVariable,
        min: i64,
        max: i64,
    ) -> Result<PlotData, SimError> {
        let xdata = self.x_data(x_var, min, max)?;
        let ydata = self.y_data(y_var)?;
        let limits = SeriesLimits::from_data(&xdata, &ydata);
        Ok(PlotData {
            x_var,
            y_var,
            xdata,
            ydata,
            limits,
        })
    }
}
