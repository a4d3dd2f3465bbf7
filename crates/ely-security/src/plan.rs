//! Reconciliation plans.

use ely_model::Operation;
use serde::Serialize;

/// Ordered steps to apply as one atomic composite.
///
/// Steps are kept in dependency order: a resource is always added before
/// any step that references it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationPlan {
    steps: Vec<Operation>,
}

impl ReconciliationPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn push(&mut self, step: Operation) {
        tracing::debug!(operation = %step.name, address = %step.address, "staged step");
        self.steps.push(step);
    }

    /// Appends a step if there is one.
    pub fn push_opt(&mut self, step: Option<Operation>) {
        if let Some(step) = step {
            self.push(step);
        }
    }

    /// Appends every step of `other`.
    pub fn extend(&mut self, other: Self) {
        for step in other.steps {
            self.push(step);
        }
    }

    /// The staged steps.
    #[must_use]
    pub fn steps(&self) -> &[Operation] {
        &self.steps
    }

    /// Number of staged steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps named `name`.
    #[must_use]
    pub fn steps_named(&self, name: &str) -> Vec<&Operation> {
        self.steps.iter().filter(|s| s.name == name).collect()
    }

    /// The composite request carrying every step.
    #[must_use]
    pub fn to_composite(&self) -> Operation {
        Operation::composite(self.steps.clone())
    }
}
