//! Deep copies of mutable values.

use std::any;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{DuplicationError, DuplicationStage};

/// Returns an independent deep copy of `value`.
///
/// The copy is made by serializing the value and deserializing the result,
/// so it shares no storage with the original even where `Clone` would.
/// Fails if the value cannot be represented in the serialized form.
pub fn duplicate<T>(value: &T) -> Result<T, DuplicationError>
where
    T: Serialize + DeserializeOwned,
{
    let type_name = any::type_name::<T>();
    let fail = |stage: DuplicationStage| {
        move |source: serde_json::Error| {
            tracing::debug!(%stage, type_name, "duplication failed");
            DuplicationError {
                stage,
                type_name,
                source,
            }
        }
    };

    let bytes = serde_json::to_vec(value).map_err(fail(DuplicationStage::Serialize))?;
    serde_json::from_slice(&bytes).map_err(fail(DuplicationStage::Deserialize))
}
