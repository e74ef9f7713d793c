//! Problem data injected into flux assembly: source term, boundary data and
//! the reference value used to pin the solution.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::mesh_error::FvmError;

/// Boundary-condition family applied to every boundary face.
///
/// Serialized as its integer selector (1, 2 or 3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum BoundaryType {
    /// Prescribed value at the face midpoint (selector 1).
    Dirichlet,
    /// Prescribed outward normal flux at the face midpoint (selector 2).
    #[default]
    Neumann,
    /// Exchange with an ambient value through a transfer coefficient (selector 3).
    Robin,
}

impl BoundaryType {
    /// Integer selector of this family.
    pub fn selector(self) -> i64 {
        match self {
            BoundaryType::Dirichlet => 1,
            BoundaryType::Neumann => 2,
            BoundaryType::Robin => 3,
        }
    }
}

impl TryFrom<i64> for BoundaryType {
    type Error = FvmError;

    fn try_from(selector: i64) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(BoundaryType::Dirichlet),
            2 => Ok(BoundaryType::Neumann),
            3 => Ok(BoundaryType::Robin),
            other => Err(FvmError::InvalidBoundaryType(other)),
        }
    }
}

impl From<BoundaryType> for i64 {
    fn from(boundary: BoundaryType) -> Self {
        boundary.selector()
    }
}

/// Robin boundary data at a point: outward flux `coefficient * (u - ambient)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobinData {
    pub coefficient: f64,
    pub ambient: f64,
}

/// Pointwise data of a diffusion problem `-Δu = f`.
pub trait ProblemData {
    /// Source term `f` at `p`.
    fn source(&self, p: &Point) -> f64;

    /// Outward normal derivative `du/dn` prescribed at boundary point `p`.
    fn boundary_flux(&self, p: &Point) -> f64;

    /// Value `u` prescribed at `p` (Dirichlet boundaries).
    fn boundary_value(&self, p: &Point) -> f64;

    /// Robin data at boundary point `p`. The default disables the exchange.
    fn robin(&self, _p: &Point) -> RobinData {
        RobinData::default()
    }

    /// Value pinned at the center of cell 0.
    fn reference_value(&self, p: &Point) -> f64 {
        self.boundary_value(p)
    }
}

type ScalarFn = Box<dyn Fn(&Point) -> f64 + Send + Sync>;
type RobinFn = Box<dyn Fn(&Point) -> RobinData + Send + Sync>;

/// [`ProblemData`] assembled from closures.
pub struct FnProblem {
    source: ScalarFn,
    flux: ScalarFn,
    value: ScalarFn,
    robin: Option<RobinFn>,
}

impl FnProblem {
    /// Build from a source, a Neumann flux and a prescribed value function.
    pub fn new<S, F, V>(source: S, flux: F, value: V) -> Self
    where
        S: Fn(&Point) -> f64 + Send + Sync + 'static,
        F: Fn(&Point) -> f64 + Send + Sync + 'static,
        V: Fn(&Point) -> f64 + Send + Sync + 'static,
    {
        Self {
            source: Box::new(source),
            flux: Box::new(flux),
            value: Box::new(value),
            robin: None,
        }
    }

    /// Constant source, boundary flux and prescribed value.
    pub fn constant(source: f64, flux: f64, value: f64) -> Self {
        Self::new(move |_| source, move |_| flux, move |_| value)
    }

    /// Attach Robin boundary data.
    pub fn with_robin<R>(mut self, robin: R) -> Self
    where
        R: Fn(&Point) -> RobinData + Send + Sync + 'static,
    {
        self.robin = Some(Box::new(robin));
        self
    }
}

impl std::fmt::Debug for FnProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProblem")
            .field("robin", &self.robin.is_some())
            .finish_non_exhaustive()
    }
}

impl ProblemData for FnProblem {
    fn source(&self, p: &Point) -> f64 {
        (self.source)(p)
    }

    fn boundary_flux(&self, p: &Point) -> f64 {
        (self.flux)(p)
    }

    fn boundary_value(&self, p: &Point) -> f64 {
        (self.value)(p)
    }

    fn robin(&self, p: &Point) -> RobinData {
        self.robin
            .as_ref()
            .map(|robin| robin(p))
            .unwrap_or_default()
    }
}
