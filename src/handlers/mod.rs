pub mod accounts;
pub mod clarifai;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::future::Future;

use crate::error::BrainError;
use crate::router::BrainState;

/// Run a store or detector call under the state's backend timeout.
pub(crate) async fn bounded<T>(
    state: &BrainState,
    what: &'static str,
    call: impl Future<Output = Result<T, BrainError>>,
) -> Result<T, BrainError> {
    tokio::time::timeout(state.backend_timeout, call)
        .await
        .map_err(|_| BrainError::Timeout(what))?
}

/// Accept an integer sent either as a JSON number or as a numeric string.
/// Anything else (including `null`) reads as absent.
pub(crate) fn lenient_integer<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// `Some` only for a non-empty string.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
