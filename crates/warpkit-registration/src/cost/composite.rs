//! Weighted sum of cost terms.

use std::sync::Arc;
use burn::tensor::backend::Backend;
use warpkit_core::{DeviceDisplacementField, Dims, GridIndex, Region, Vector3};
use crate::cost::accumulator::CostAccumulator;
use crate::stream::{Completion, Stream};
use super::term::CostTerm;
use super::trait_::{CostFunction, RegionCost};

/// Ordered list of cost terms, each with its own weight.
///
/// Scheduling a composite queues every term on the same stream in list
/// order, so their contributions land in the accumulator one after the
/// other. The returned completion belongs to the last term; failures of
/// earlier terms surface through [`Stream::synchronize`].
///
/// # Examples
/// ```rust
/// use burn_ndarray::NdArray;
/// use warpkit_registration::cost::{CompositeCost, ConstantCost, CostTerm};
///
/// let total = CompositeCost::<NdArray<f32>>::new()
///     .with_term(CostTerm::from(ConstantCost::new(1.0, 2.0)), 1.0)
///     .with_term(CostTerm::from(ConstantCost::new(0.5, 0.5)), 0.1);
/// assert_eq!(total.len(), 2);
/// ```
pub struct CompositeCost<B: Backend> {
    terms: Vec<(CostTerm<B>, f32)>,
}

impl<B: Backend> CompositeCost<B> {
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Append a term with its weight.
    pub fn with_term(mut self, term: CostTerm<B>, weight: f32) -> Self {
        self.push(term, weight);
        self
    }

    pub fn push(&mut self, term: CostTerm<B>, weight: f32) {
        self.terms.push((term, weight));
    }

    /// Terms with their weights, in evaluation order.
    pub fn terms(&self) -> &[(CostTerm<B>, f32)] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl<B: Backend> CostFunction<B> for CompositeCost<B> {
    fn name(&self) -> &str {
        "composite"
    }

    fn evaluate(
        &self,
        field: &DeviceDisplacementField<B>,
        delta: Vector3,
        region: &Region,
    ) -> RegionCost<B> {
        let zero = RegionCost::uniform(region.len(), 0.0, 0.0, &field.device());
        self.terms.iter().fold(zero, |acc, (term, weight)| {
            acc.sum(term.evaluate(field, delta, region).scale(*weight))
        })
    }

    fn cost(
        self: Arc<Self>,
        field: &DeviceDisplacementField<B>,
        delta: Vector3,
        weight: f32,
        offset: GridIndex,
        dims: Dims,
        accumulator: &CostAccumulator<B>,
        stream: &Stream,
    ) -> Completion {
        let mut last = None;
        for (term, term_weight) in &self.terms {
            last = Some(Arc::new(term.clone()).cost(
                field,
                delta,
                weight * term_weight,
                offset,
                dims,
                accumulator,
                stream,
            ));
        }
        last.unwrap_or_else(|| stream.enqueue(|| Ok(())))
    }
}

impl<B: Backend> Default for CompositeCost<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> Clone for CompositeCost<B> {
    fn clone(&self) -> Self {
        Self {
            terms: self.terms.clone(),
        }
    }
}

impl<B: Backend> std::fmt::Debug for CompositeCost<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.terms.iter().map(|(term, weight)| (term.name(), weight)))
            .finish()
    }
}
