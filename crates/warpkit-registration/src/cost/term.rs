//! Closed set of cost terms.

use std::sync::Arc;
use burn::tensor::backend::Backend;
use warpkit_core::{DeviceDisplacementField, Dims, GridIndex, Region, Vector3};
use crate::cost::accumulator::CostAccumulator;
use crate::stream::{Completion, Stream};
use super::composite::CompositeCost;
use super::constant::ConstantCost;
use super::trait_::{enqueue_cost, CostFunction, RegionCost};

/// Any cost term a registration run can be configured with.
///
/// Built-in terms are matched directly; anything else plugs in through
/// [`CostTerm::Custom`].
pub enum CostTerm<B: Backend> {
    Constant(ConstantCost),
    Composite(CompositeCost<B>),
    Custom(Arc<dyn CostFunction<B>>),
}

impl<B: Backend> CostTerm<B> {
    /// Wrap a user-defined term.
    pub fn custom(term: impl CostFunction<B>) -> Self {
        Self::Custom(Arc::new(term))
    }
}

impl<B: Backend> CostFunction<B> for CostTerm<B> {
    fn name(&self) -> &str {
        match self {
            Self::Constant(term) => CostFunction::<B>::name(term),
            Self::Composite(term) => term.name(),
            Self::Custom(term) => term.name(),
        }
    }

    fn evaluate(
        &self,
        field: &DeviceDisplacementField<B>,
        delta: Vector3,
        region: &Region,
    ) -> RegionCost<B> {
        match self {
            Self::Constant(term) => term.evaluate(field, delta, region),
            Self::Composite(term) => term.evaluate(field, delta, region),
            Self::Custom(term) => term.evaluate(field, delta, region),
        }
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
        let nested: Option<Arc<dyn CostFunction<B>>> = match &*self {
            Self::Constant(_) => None,
            Self::Composite(term) => Some(Arc::new(term.clone())),
            Self::Custom(term) => Some(Arc::clone(term)),
        };
        match nested {
            Some(term) => term.cost(field, delta, weight, offset, dims, accumulator, stream),
            None => enqueue_cost(self, field, delta, weight, Region::new(offset, dims), accumulator, stream),
        }
    }
}

impl<B: Backend> From<ConstantCost> for CostTerm<B> {
    fn from(term: ConstantCost) -> Self {
        Self::Constant(term)
    }
}

impl<B: Backend> From<CompositeCost<B>> for CostTerm<B> {
    fn from(term: CompositeCost<B>) -> Self {
        Self::Composite(term)
    }
}

impl<B: Backend> Clone for CostTerm<B> {
    fn clone(&self) -> Self {
        match self {
            Self::Constant(term) => Self::Constant(*term),
            Self::Composite(term) => Self::Composite(term.clone()),
            Self::Custom(term) => Self::Custom(Arc::clone(term)),
        }
    }
}

impl<B: Backend> std::fmt::Debug for CostTerm<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant(term) => f.debug_tuple("Constant").field(term).finish(),
            Self::Composite(term) => f.debug_tuple("Composite").field(term).finish(),
            Self::Custom(term) => f.debug_tuple("Custom").field(&term.name()).finish(),
        }
    }
}
