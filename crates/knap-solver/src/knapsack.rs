//! Incremental problem builder.
//!
//! Collects curves and their spend bounds one channel at a time, then
//! solves for the whole budget. The last solution is kept until the problem
//! changes.

use knap_core::error::AllocationError;
use knap_core::traits::ResponseFunction;
use knap_core::types::{Allocation, ChannelBounds, SolveOptions};

use crate::allocator::Allocator;

pub struct Knapsack<F> {
    budget: f64,
    curves: Vec<F>,
    bounds: Vec<ChannelBounds>,
    allocator: Allocator,
    solution: Option<Allocation>,
}

impl<F: ResponseFunction> Knapsack<F> {
    pub fn new(budget: f64) -> Self {
        Self {
            budget,
            curves: Vec::new(),
            bounds: Vec::new(),
            allocator: Allocator::default(),
            solution: None,
        }
    }

    pub fn with_options(budget: f64, options: SolveOptions) -> Result<Self, AllocationError> {
        Ok(Self {
            allocator: Allocator::new(options)?,
            ..Self::new(budget)
        })
    }

    /// Add a channel. `None` bounds leave the channel unconstrained.
    pub fn add_curve(&mut self, curve: F, bounds: Option<ChannelBounds>) -> &mut Self {
        self.curves.push(curve);
        self.bounds.push(bounds.unwrap_or_default());
        self.solution = None;
        self
    }

    pub fn budget(&self) -> f64 {
        self.budget
    }

    pub fn curves(&self) -> &[F] {
        &self.curves
    }

    pub fn bounds(&self) -> &[ChannelBounds] {
        &self.bounds
    }

    pub fn solve(&mut self) -> Result<&Allocation, AllocationError> {
        let allocation = self
            .allocator
            .solve_with_bounds(&self.curves, &self.bounds, self.budget)?;
        Ok(&*self.solution.insert(allocation))
    }

    pub fn solution(&self) -> Option<&Allocation> {
        self.solution.as_ref()
    }

    /// Spends of the last solution, or zeros before solving.
    pub fn mix(&self) -> Vec<f64> {
        match &self.solution {
            Some(a) => a.spends.clone(),
            None => vec![0.0; self.curves.len()],
        }
    }

    /// Total response of an arbitrary spend vector over these channels.
    pub fn response(&self, spends: &[f64]) -> Result<f64, AllocationError> {
        Allocator::total_response(&self.curves, spends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knap_curves::HillCurve;

    fn hill(cap: f64, steep: f64) -> HillCurve {
        HillCurve::new(cap, 0.5, steep).unwrap()
    }

    #[test]
    fn mix_is_zero_before_solving() {
        let mut k = Knapsack::new(100.0);
        k.add_curve(hill(100.0, 1.0), None).add_curve(hill(50.0, 0.8), None);
        assert_eq!(k.mix(), vec![0.0, 0.0]);
        assert!(k.solution().is_none());
        assert_eq!(k.bounds(), &[ChannelBounds::UNBOUNDED; 2]);
    }

    #[test]
    fn solve_stores_solution() {
        let mut k = Knapsack::new(100.0);
        k.add_curve(hill(100.0, 1.0), None).add_curve(hill(50.0, 0.8), None);
        let total = k.solve().unwrap().total_response;
        assert_eq!(k.mix().len(), 2);
        let mix = k.mix();
        assert!((k.response(&mix).unwrap() - total).abs() < 1e-12);
        assert!((mix.iter().sum::<f64>() - 100.0).abs() <= 1e-6);
    }

    #[test]
    fn adding_a_curve_clears_solution() {
        let mut k = Knapsack::new(10.0);
        k.add_curve(hill(10.0, 1.0), None);
        k.solve().unwrap();
        k.add_curve(hill(10.0, 1.0), Some(ChannelBounds::at_least(2.0)));
        assert!(k.solution().is_none());
        let a = k.solve().unwrap();
        assert!(a.spends[1] >= 2.0);
    }

    #[test]
    fn optimum_beats_even_split() {
        let mut k = Knapsack::new(60.0);
        k.add_curve(hill(100.0, 1.0), None)
            .add_curve(hill(20.0, 1.0), None)
            .add_curve(hill(5.0, 0.7), None);
        let best = k.solve().unwrap().total_response;
        let even = k.response(&[20.0, 20.0, 20.0]).unwrap();
        assert!(best >= even, "{best} < {even}");
    }

    #[test]
    fn invalid_options_rejected() {
        let opts = SolveOptions::default().with_tolerance(-1.0);
        assert!(Knapsack::<HillCurve>::with_options(1.0, opts).is_err());
    }

    #[test]
    fn response_checks_length() {
        let mut k = Knapsack::new(10.0);
        k.add_curve(hill(10.0, 1.0), None);
        assert!(matches!(
            k.response(&[1.0, 2.0]),
            Err(AllocationError::SpendsMismatch { spends: 2, channels: 1 })
        ));
    }
}
