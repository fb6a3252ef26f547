//! Append-only ledger of provisioning request ids stored on the task.
//!
//! Persisted under `provision_request_ids` as `{"0": id, "1": id, ...}`.
//! Existing entries keep their relative order (numeric key order, then any
//! non-numeric keys); new ids follow in submission order and the whole map
//! is re-indexed densely from 0. The ledger does not deduplicate.

use serde_json::Value;

use crate::error::{ProvisionError, ProvisionResult};
use crate::task::{ProvisioningTask, PROVISION_REQUEST_IDS};
use crate::types::ProvisionRequestId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestIdLedger {
    ids: Vec<ProvisionRequestId>,
}

impl RequestIdLedger {
    /// Decode a stored ledger value; `None` or null is an empty ledger.
    pub fn from_option(value: Option<&Value>) -> ProvisionResult<Self> {
        let ids = match value {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => {
                let mut numbered = Vec::new();
                let mut other = Vec::new();
                for (key, v) in map {
                    let id = id_from_value(v)?;
                    match key.parse::<u64>() {
                        Ok(idx) => numbered.push((idx, id)),
                        Err(_) => other.push(id),
                    }
                }
                numbered.sort_by_key(|(idx, _)| *idx);
                numbered.into_iter().map(|(_, id)| id).chain(other).collect()
            }
            Some(Value::Array(items)) => items
                .iter()
                .map(id_from_value)
                .collect::<ProvisionResult<Vec<_>>>()?,
            Some(other) => {
                return Err(ProvisionError::parse(format!(
                    "Unexpected {PROVISION_REQUEST_IDS} value: {other}"
                )))
            }
        };
        Ok(Self { ids })
    }

    pub fn load(task: &dyn ProvisioningTask) -> ProvisionResult<Self> {
        Self::from_option(task.get_option(PROVISION_REQUEST_IDS).as_ref())
    }

    pub fn ids(&self) -> &[ProvisionRequestId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn append<I>(&mut self, new_ids: I)
    where
        I: IntoIterator<Item = ProvisionRequestId>,
    {
        self.ids.extend(new_ids);
    }

    /// Dense `{"0": id, ...}` object.
    pub fn to_value(&self) -> Value {
        let map = self
            .ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (idx.to_string(), Value::String(id.0.clone())))
            .collect::<serde_json::Map<_, _>>();
        Value::Object(map)
    }

    /// Write the whole ledger back in a single `set_option`.
    pub fn store(&self, task: &mut dyn ProvisioningTask) {
        task.set_option(PROVISION_REQUEST_IDS, self.to_value());
    }

    /// Load, append and store.
    pub fn record(
        task: &mut dyn ProvisioningTask,
        new_ids: &[ProvisionRequestId],
    ) -> ProvisionResult<Self> {
        let mut ledger = Self::load(task)?;
        ledger.append(new_ids.iter().cloned());
        ledger.store(task);
        Ok(ledger)
    }
}

fn id_from_value(v: &Value) -> ProvisionResult<ProvisionRequestId> {
    match v {
        Value::String(s) => Ok(ProvisionRequestId(s.clone())),
        Value::Number(n) => Ok(ProvisionRequestId(n.to_string())),
        other => Err(ProvisionError::parse(format!(
            "Unexpected provision request id: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::InMemoryTask;
    use serde_json::json;

    fn ids(raw: &[&str]) -> Vec<ProvisionRequestId> {
        raw.iter().map(|s| ProvisionRequestId::from(*s)).collect()
    }

    #[test]
    fn appends_after_existing_entries() {
        let mut task = InMemoryTask::new("svc-1")
            .with_option(PROVISION_REQUEST_IDS, json!({"0": "a", "1": "b"}));
        RequestIdLedger::record(&mut task, &ids(&["c", "d"])).unwrap();
        assert_eq!(
            task.get_option(PROVISION_REQUEST_IDS),
            Some(json!({"0": "a", "1": "b", "2": "c", "3": "d"}))
        );
    }

    #[test]
    fn repeated_record_does_not_dedup() {
        let mut task = InMemoryTask::new("svc-1");
        RequestIdLedger::record(&mut task, &ids(&["x"])).unwrap();
        let ledger = RequestIdLedger::record(&mut task, &ids(&["x"])).unwrap();
        assert_eq!(ledger.ids(), ids(&["x", "x"]).as_slice());
    }

    #[test]
    fn numeric_keys_sort_numerically() {
        let stored = json!({"10": "k", "2": "c", "0": "a", "1": "b"});
        let ledger = RequestIdLedger::from_option(Some(&stored)).unwrap();
        assert_eq!(ledger.ids(), ids(&["a", "b", "c", "k"]).as_slice());
        assert_eq!(ledger.to_value(), json!({"0": "a", "1": "b", "2": "c", "3": "k"}));
    }

    #[test]
    fn numeric_ids_are_kept() {
        let stored = json!({"0": 1000000000042u64});
        let ledger = RequestIdLedger::from_option(Some(&stored)).unwrap();
        assert_eq!(ledger.ids()[0].as_str(), "1000000000042");
    }

    #[test]
    fn corrupt_ledger_is_left_untouched() {
        let mut task = InMemoryTask::new("svc-1")
            .with_option(PROVISION_REQUEST_IDS, json!("corrupt"));
        assert!(RequestIdLedger::load(&task).is_err());
        assert!(RequestIdLedger::record(&mut task, &ids(&["a"])).is_err());
        assert_eq!(task.get_option(PROVISION_REQUEST_IDS), Some(json!("corrupt")));
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(RequestIdLedger::from_option(Some(&json!("nope"))).is_err());
        assert!(RequestIdLedger::from_option(Some(&json!({"0": {"id": 1}}))).is_err());
    }
}
