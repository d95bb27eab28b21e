use crate::simplex::Pivot;
use crate::tableau::Tableau;

/// Receives every tableau the optimizer produces, e.g. to animate the path
/// through the feasible region.
///
/// Hooks are called synchronously from inside the pivot loop.
pub trait PivotObserver {
    /// Called once with the starting tableau.
    fn initial(&mut self, _tableau: &Tableau) {}

    /// Called after pivot number `step` (1-based) produced `tableau`.
    fn pivoted(&mut self, _step: usize, _pivot: Pivot, _tableau: &Tableau) {}
}

impl PivotObserver for () {}

/// A basic feasible solution visited by the optimizer.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// 0 for the starting tableau, then the pivot count
    pub step: usize,
    /// Pivot that led here, `None` for the starting vertex
    pub pivot: Option<Pivot>,
    /// Structural variable values at this vertex
    pub point: Vec<f64>,
    /// Objective value at this vertex
    pub objective: f64,
}

/// Observer that records the sequence of visited vertices.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    tolerance: f64,
    vertices: Vec<Vertex>,
}

impl Trajectory {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            vertices: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }

    fn record(&mut self, step: usize, pivot: Option<Pivot>, tableau: &Tableau) {
        self.vertices.push(Vertex {
            step,
            pivot,
            point: tableau.values(self.tolerance),
            objective: tableau.objective_value(),
        });
    }
}

impl PivotObserver for Trajectory {
    fn initial(&mut self, tableau: &Tableau) {
        self.vertices.clear();
        self.record(0, None, tableau);
    }

    fn pivoted(&mut self, step: usize, pivot: Pivot, tableau: &Tableau) {
        self.record(step, Some(pivot), tableau);
    }
}
