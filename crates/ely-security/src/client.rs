//! Store access helpers shared by the builders.

use ely_model::{Address, Operation, ResourceType};
use ely_store::ResourceStore;
use serde_json::{Map, Value};

use crate::error::{SecurityError, SecurityResult};
use crate::plan::ReconciliationPlan;

/// Executes `operation` and returns its result.
///
/// ## Errors
///
/// Returns `SecurityError::Failed` with the store's description when the
/// outcome is `failed`, or `SecurityError::Store` on transport errors.
pub async fn execute(store: &dyn ResourceStore, operation: &Operation) -> SecurityResult<Value> {
    let response = store.execute(operation).await?;
    response.into_result().map_err(SecurityError::Failed)
}

/// Reads the attributes of a resource, `None` if the store rejects the read.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn read_resource(
    store: &dyn ResourceStore,
    address: &Address,
) -> SecurityResult<Option<Map<String, Value>>> {
    let response = store.execute(&Operation::read_resource(address.clone())).await?;
    if !response.is_success() {
        return Ok(None);
    }
    Ok(match response.result {
        Some(Value::Object(map)) => Some(map),
        _ => Some(Map::new()),
    })
}

/// Reads one attribute; `None` if it is undefined or the read is rejected.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn read_attribute(
    store: &dyn ResourceStore,
    address: &Address,
    name: &str,
) -> SecurityResult<Option<Value>> {
    let response = store
        .execute(&Operation::read_attribute(address.clone(), name))
        .await?;
    if !response.is_success() {
        return Ok(None);
    }
    Ok(response.result.filter(|v| !v.is_null()))
}

/// Reads a string attribute; `None` if undefined.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn read_string_attribute(
    store: &dyn ResourceStore,
    address: &Address,
    name: &str,
) -> SecurityResult<Option<String>> {
    Ok(read_attribute(store, address, name)
        .await?
        .and_then(|v| v.as_str().map(str::to_string)))
}

/// Names of the security resources of a type.
///
/// Used for name collision checks only, so any failure yields an empty list.
pub async fn security_resource_names(
    store: &dyn ResourceStore,
    resource_type: ResourceType,
) -> Vec<String> {
    children_names(store, &Address::elytron(), resource_type.as_str()).await
}

/// Names of children of `child_type` under `parent`; empty on any failure.
pub async fn children_names(
    store: &dyn ResourceStore,
    parent: &Address,
    child_type: &str,
) -> Vec<String> {
    let operation = Operation::read_children_names(parent.clone(), child_type);
    match store.execute(&operation).await {
        Ok(response) if response.is_success() => response
            .result
            .and_then(|v| match v {
                Value::Array(items) => Some(
                    items
                        .into_iter()
                        .filter_map(|i| i.as_str().map(str::to_string))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default(),
        Ok(response) => {
            tracing::debug!(%parent, child_type, failure = %response.failure_message(), "children names unavailable");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(%parent, child_type, error = %e, "children names unavailable");
            Vec::new()
        }
    }
}

/// Whether a security resource exists.
///
/// ## Errors
///
/// Returns `SecurityError::Store` on transport errors.
pub async fn security_resource_exists(
    store: &dyn ResourceStore,
    resource_type: ResourceType,
    name: &str,
) -> SecurityResult<bool> {
    Ok(store
        .exists(&Address::elytron_resource(resource_type, name))
        .await?)
}

/// What happened after a plan was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    /// The server was reloaded.
    Reloaded,
    /// Reload was skipped on request.
    Skipped,
    /// Nothing was applied, so nothing needed reloading.
    NotNeeded,
}

/// Executes `plan` as one composite; `false` if there was nothing to do.
///
/// ## Errors
///
/// Returns `SecurityError::Failed` if the composite is rejected, in which
/// case the store is unchanged.
pub async fn execute_plan(store: &dyn ResourceStore, plan: &ReconciliationPlan) -> SecurityResult<bool> {
    if plan.is_empty() {
        return Ok(false);
    }
    tracing::info!(steps = plan.len(), "applying composite");
    execute(store, &plan.to_composite()).await?;
    Ok(true)
}

/// Reloads the server unless `no_reload` is set.
///
/// ## Errors
///
/// Returns `SecurityError::Failed` if the reload is rejected.
pub async fn reload_server(store: &dyn ResourceStore, no_reload: bool) -> SecurityResult<ReloadStatus> {
    if no_reload {
        return Ok(ReloadStatus::Skipped);
    }
    tracing::info!("reloading server");
    execute(store, &Operation::reload()).await?;
    Ok(ReloadStatus::Reloaded)
}

/// Applies `plan` as one composite and reloads the server unless
/// `no_reload` is set.
///
/// ## Errors
///
/// Returns `SecurityError::Failed` if the composite or the reload is
/// rejected. A rejected composite leaves the store unchanged.
pub async fn apply_plan(
    store: &dyn ResourceStore,
    plan: &ReconciliationPlan,
    no_reload: bool,
) -> SecurityResult<ReloadStatus> {
    if !execute_plan(store, plan).await? {
        return Ok(ReloadStatus::NotNeeded);
    }
    reload_server(store, no_reload).await
}
