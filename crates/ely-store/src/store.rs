//! Resource store trait.

use std::sync::Arc;

use async_trait::async_trait;
use ely_model::{Address, Operation, Response};

use crate::error::StoreResult;

/// Executes management operations against a hierarchical resource tree.
///
/// Implementations must be thread-safe. A composite is applied atomically:
/// either every step is applied or none is.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Executes a single operation.
    ///
    /// ## Errors
    ///
    /// Returns a `StoreError` when the store cannot be reached or answers
    /// with something that is not a response. A rejected operation is an
    /// `Ok` response with a `failed` outcome.
    async fn execute(&self, operation: &Operation) -> StoreResult<Response>;

    /// Executes `steps` as one atomic composite.
    ///
    /// ## Errors
    ///
    /// Same as [`ResourceStore::execute`].
    async fn execute_composite(&self, steps: Vec<Operation>) -> StoreResult<Response> {
        self.execute(&Operation::composite(steps)).await
    }

    /// Checks whether a resource exists.
    ///
    /// ## Errors
    ///
    /// Same as [`ResourceStore::execute`].
    async fn exists(&self, address: &Address) -> StoreResult<bool> {
        let response = self.execute(&Operation::read_resource(address.clone())).await?;
        Ok(response.is_success())
    }
}

#[async_trait]
impl<T: ResourceStore + ?Sized> ResourceStore for Arc<T> {
    async fn execute(&self, operation: &Operation) -> StoreResult<Response> {
        (**self).execute(operation).await
    }

    async fn execute_composite(&self, steps: Vec<Operation>) -> StoreResult<Response> {
        (**self).execute_composite(steps).await
    }

    async fn exists(&self, address: &Address) -> StoreResult<bool> {
        (**self).exists(address).await
    }
}
