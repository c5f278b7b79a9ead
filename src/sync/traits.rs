//! Core traits and helpers for the record synchronization engine.

use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// A JSON object carrying the fields of a partial update.
///
/// The same payload is sent to the backing store and used to compute the
/// merged cache value, so the request body is the source of truth for the
/// merge.
pub type Patch = Map<String, Value>;

/// Trait for record types managed by a [`Store`](super::Store).
///
/// Implementors are plain serde-serializable values; the identifier is the
/// only field the engine itself touches.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Collection name (e.g. "contacts"): names the backend endpoint and the
  /// demo-mode storage key.
  fn collection() -> &'static str;

  /// Identifier, if one has been assigned.
  fn id(&self) -> Option<i64>;

  /// Assign the identifier. Only called for records created in demo mode;
  /// online identifiers arrive already set in the server response.
  fn set_id(&mut self, id: i64);
}

/// Assigns identifiers to records created in demo mode.
///
/// `existing` is the collection as currently persisted, for policies that
/// derive per-record values from what is already there.
pub trait IdPolicy<E: Entity>: Send + Sync {
  fn assign(&self, record: &mut E, existing: &[E]);
}

/// Wall-clock identifier policy: the id is the creation time in milliseconds.
///
/// Unique under the single-writer assumption; rapid successive creations can
/// collide within one clock tick.
pub struct TimestampId;

impl<E: Entity> IdPolicy<E> for TimestampId {
  fn assign(&self, record: &mut E, _existing: &[E]) {
    record.set_id(Utc::now().timestamp_millis());
  }
}

/// Shallow-merge `patch` over `record`: patched fields win, every field
/// absent from the patch is retained unchanged.
pub fn merge_record<E: Entity>(record: &E, patch: &Patch) -> Result<E> {
  let mut value = serde_json::to_value(record)
    .map_err(|e| eyre!("Failed to serialize {} record: {}", E::collection(), e))?;

  if let Value::Object(fields) = &mut value {
    for (key, patched) in patch {
      fields.insert(key.clone(), patched.clone());
    }
  }

  serde_json::from_value(value)
    .map_err(|e| eyre!("Failed to apply update to {} record: {}", E::collection(), e))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Widget {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    name: String,
    qty: i64,
  }

  impl Entity for Widget {
    fn collection() -> &'static str {
      "widgets"
    }

    fn id(&self) -> Option<i64> {
      self.id
    }

    fn set_id(&mut self, id: i64) {
      self.id = Some(id);
    }
  }

  fn patch(raw: &str) -> Patch {
    serde_json::from_str(raw).unwrap()
  }

  #[test]
  fn test_merge_retains_absent_fields() {
    let widget = Widget {
      id: Some(1),
      name: "bolt".to_string(),
      qty: 7,
    };

    let merged = merge_record(&widget, &patch(r#"{"name": "nut"}"#)).unwrap();
    assert_eq!(merged.name, "nut");
    assert_eq!(merged.qty, 7);
    assert_eq!(merged.id, Some(1));
  }

  #[test]
  fn test_merge_patched_fields_win() {
    let widget = Widget {
      id: Some(1),
      name: "bolt".to_string(),
      qty: 7,
    };

    let merged = merge_record(&widget, &patch(r#"{"name": "nut", "qty": 9}"#)).unwrap();
    assert_eq!(merged.name, "nut");
    assert_eq!(merged.qty, 9);
  }

  #[test]
  fn test_merge_incompatible_patch_errors() {
    let widget = Widget {
      id: Some(1),
      name: "bolt".to_string(),
      qty: 7,
    };

    assert!(merge_record(&widget, &patch(r#"{"qty": "many"}"#)).is_err());
  }

  #[test]
  fn test_timestamp_policy_assigns_id() {
    let mut widget = Widget {
      id: None,
      name: "bolt".to_string(),
      qty: 1,
    };

    TimestampId.assign(&mut widget, &[]);
    assert!(widget.id.is_some());
  }
}
