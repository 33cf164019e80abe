//! Volatile, process-scoped report store.
//!
//! Records are immutable once stored and handed out as `Arc`s, so a reader
//! always sees one complete record. Re-processing replaces the `Arc` in a
//! single write. Writers and evictions for the same id are serialized by a
//! per-id gate; writers for different ids never wait on each other's
//! processing. A gate lives only while some caller holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use thiserror::Error;

use crate::models::{ReportRecord, ReportSummary};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Report store lock poisoned")]
    LockPoisoned,
}

#[derive(Default)]
pub struct ReportStore {
    records: RwLock<HashMap<String, Arc<ReportRecord>>>,
    gates: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Result<Arc<ReportRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.contains_key(id))
    }

    /// Store `record`, replacing any previous record with the same id.
    pub fn put(&self, record: ReportRecord) -> Result<Arc<ReportRecord>, StoreError> {
        let record = Arc::new(record);
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.insert(record.id.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Build a record for `id` and store it, holding the id's gate for the
    /// whole build. Concurrent calls for one id apply one after another;
    /// readers see the old record until the new one is swapped in.
    pub fn upsert_with<F, E>(&self, id: &str, build: F) -> Result<Arc<ReportRecord>, E>
    where
        F: FnOnce() -> Result<ReportRecord, E>,
        E: From<StoreError>,
    {
        self.with_gate(id, || self.build_and_put(id, build))
    }

    /// Like [`upsert_with`](Self::upsert_with), but only replaces a record
    /// that exists. The check runs under the gate, so a concurrent eviction
    /// either completes first (`NotFound`) or waits for the rebuild.
    pub fn replace_with<F, E>(&self, id: &str, build: F) -> Result<Arc<ReportRecord>, E>
    where
        F: FnOnce() -> Result<ReportRecord, E>,
        E: From<StoreError>,
    {
        self.with_gate(id, || -> Result<Arc<ReportRecord>, E> {
            if !self.contains(id)? {
                return Err(StoreError::NotFound(id.to_string()).into());
            }
            self.build_and_put(id, build)
        })
    }

    /// Evict a record. Waits for an in-flight rebuild of the same id, so the
    /// rebuilt record cannot reappear after the eviction returns.
    pub fn remove(&self, id: &str) -> Result<Arc<ReportRecord>, StoreError> {
        self.with_gate(id, || -> Result<Arc<ReportRecord>, StoreError> {
            let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
            records
                .remove(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))
        })
    }

    /// Summaries of every stored report, oldest first.
    pub fn list(&self) -> Result<Vec<ReportSummary>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut summaries: Vec<ReportSummary> = records.values().map(|r| r.summary()).collect();
        summaries.sort_by(|a, b| a.processed_at.cmp(&b.processed_at).then(a.id.cmp(&b.id)));
        Ok(summaries)
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build_and_put<F, E>(&self, id: &str, build: F) -> Result<Arc<ReportRecord>, E>
    where
        F: FnOnce() -> Result<ReportRecord, E>,
        E: From<StoreError>,
    {
        let record = build()?;
        debug_assert_eq!(record.id, id);
        Ok(self.put(record)?)
    }

    /// Run `f` while holding the gate for `id`.
    fn with_gate<T, E, F>(&self, id: &str, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<StoreError>,
    {
        let gate = {
            let mut gates = self.gates.lock().map_err(|_| StoreError::LockPoisoned)?;
            Arc::clone(gates.entry(id.to_string()).or_default())
        };
        let result = {
            // The gate guards no data, so a poisoned gate is still usable.
            let _held = gate.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release_gate(id, gate);
        result
    }

    /// Drop the map's gate for `id` once no other caller holds a clone.
    /// Clones are only taken under the `gates` lock, so the count is exact.
    fn release_gate(&self, id: &str, gate: Arc<Mutex<()>>) {
        let Ok(mut gates) = self.gates.lock() else {
            return;
        };
        let unshared = gates
            .get(id)
            .is_some_and(|g| Arc::ptr_eq(g, &gate) && Arc::strong_count(&gate) == 2);
        if unshared {
            gates.remove(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::pipeline::catalog::Catalog;
    use crate::pipeline::processor::ReportProcessor;

    fn record(id: &str, text: &str) -> ReportRecord {
        ReportProcessor::new(Catalog::shared())
            .process(id, "test.txt", text)
            .unwrap()
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let store = ReportStore::new();
        assert_eq!(
            store.get("missing").unwrap_err(),
            StoreError::NotFound("missing".into())
        );
    }

    #[test]
    fn put_then_get_and_overwrite() {
        let store = ReportStore::new();
        store.put(record("a", "FINDINGS: mass")).unwrap();
        assert_eq!(store.get("a").unwrap().original_text, "FINDINGS: mass");

        store.put(record("a", "FINDINGS: edema")).unwrap();
        assert_eq!(store.get("a").unwrap().original_text, "FINDINGS: edema");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_evicts() {
        let store = ReportStore::new();
        store.put(record("a", "FINDINGS: mass")).unwrap();
        assert!(store.remove("a").is_ok());
        assert!(store.is_empty());
        assert_eq!(store.remove("a").unwrap_err(), StoreError::NotFound("a".into()));
    }

    #[test]
    fn list_returns_summaries() {
        let store = ReportStore::new();
        store.put(record("a", "IMPRESSION: glioma")).unwrap();
        store.put(record("b", "Normal.")).unwrap();
        let list = store.list().unwrap();
        assert_eq!(list.len(), 2);
        let a = list.iter().find(|s| s.id == "a").unwrap();
        assert_eq!(a.top_condition.as_deref(), Some("Glioma"));
    }

    #[test]
    fn held_reader_keeps_old_record() {
        let store = ReportStore::new();
        store.put(record("a", "FINDINGS: mass")).unwrap();
        let old = store.get("a").unwrap();
        store.put(record("a", "FINDINGS: edema")).unwrap();
        assert_eq!(old.original_text, "FINDINGS: mass");
        assert!(old.term("mass").is_some());
        assert!(old.term("edema").is_none());
    }

    #[test]
    fn failed_build_leaves_previous_record() {
        let store = ReportStore::new();
        store.put(record("a", "FINDINGS: mass")).unwrap();
        let result: Result<_, StoreError> =
            store.upsert_with("a", || Err(StoreError::NotFound("boom".into())));
        assert!(result.is_err());
        assert_eq!(store.get("a").unwrap().original_text, "FINDINGS: mass");
    }

    #[test]
    fn replace_requires_existing_record() {
        let store = ReportStore::new();
        let result = store.replace_with::<_, StoreError>("a", || Ok(record("a", "FINDINGS: mass")));
        assert_eq!(result.unwrap_err(), StoreError::NotFound("a".into()));
        assert!(store.is_empty());

        store.put(record("a", "FINDINGS: mass")).unwrap();
        store
            .replace_with::<_, StoreError>("a", || Ok(record("a", "FINDINGS: edema")))
            .unwrap();
        assert_eq!(store.get("a").unwrap().original_text, "FINDINGS: edema");
    }

    #[test]
    fn gates_are_released_after_use() {
        let store = ReportStore::new();
        let failed: Result<_, StoreError> =
            store.upsert_with("fresh", || Err(StoreError::NotFound("fresh".into())));
        assert!(failed.is_err());
        store
            .upsert_with::<_, StoreError>("a", || Ok(record("a", "FINDINGS: mass")))
            .unwrap();
        store.remove("a").unwrap();
        assert!(store.gates.lock().unwrap().is_empty());
    }

    #[test]
    fn remove_waits_for_in_flight_rebuild() {
        let store = Arc::new(ReportStore::new());
        store.put(record("x", "FINDINGS: mass")).unwrap();

        let active = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicUsize::new(0));
        let building = Arc::new(Barrier::new(2));

        let writer = |text: &'static str, signal: Option<Arc<Barrier>>| {
            let store = Arc::clone(&store);
            let active = Arc::clone(&active);
            let overlapped = Arc::clone(&overlapped);
            thread::spawn(move || {
                store.upsert_with::<_, StoreError>("x", || {
                    if active.fetch_add(1, Ordering::SeqCst) > 0 {
                        overlapped.fetch_add(1, Ordering::SeqCst);
                    }
                    if let Some(signal) = signal {
                        signal.wait();
                    }
                    thread::sleep(Duration::from_millis(200));
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(record("x", text))
                })
            })
        };

        let first = writer("FINDINGS: edema", Some(Arc::clone(&building)));
        building.wait();
        store.remove("x").unwrap();
        assert_eq!(store.get("x").unwrap_err(), StoreError::NotFound("x".into()));

        let second = writer("FINDINGS: lesion", None);
        first.join().unwrap().unwrap();
        second.join().unwrap().unwrap();

        assert_eq!(overlapped.load(Ordering::SeqCst), 0);
        assert_eq!(store.get("x").unwrap().original_text, "FINDINGS: lesion");
    }

    #[test]
    fn same_id_writers_are_serialized() {
        let store = Arc::new(ReportStore::new());
        let active = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = Arc::clone(&store);
                let active = Arc::clone(&active);
                let overlapped = Arc::clone(&overlapped);
                thread::spawn(move || {
                    store
                        .upsert_with::<_, StoreError>("same", || {
                            if active.fetch_add(1, Ordering::SeqCst) > 0 {
                                overlapped.fetch_add(1, Ordering::SeqCst);
                            }
                            thread::sleep(Duration::from_millis(10));
                            active.fetch_sub(1, Ordering::SeqCst);
                            Ok(record("same", &format!("FINDINGS: writer {i}")))
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(overlapped.load(Ordering::SeqCst), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn concurrent_readers_never_see_mixed_records() {
        const OLD: &str = "FINDINGS: 2.3 cm mass in the frontal lobe.\nIMPRESSION: glioma.";
        const NEW: &str = "FINDINGS: Right lower lobe consolidation.\nIMPRESSION: pneumonia.";

        let store = Arc::new(ReportStore::new());
        store.put(record("r", OLD)).unwrap();

        let writer = {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for round in 0..20 {
                    let text = if round % 2 == 0 { NEW } else { OLD };
                    store
                        .upsert_with::<_, StoreError>("r", || Ok(record("r", text)))
                        .unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let r = store.get("r").unwrap();
                        let is_old = r.original_text == OLD;
                        assert!(is_old || r.original_text == NEW);
                        assert_eq!(r.term("glioma").is_some(), is_old);
                        assert_eq!(r.term("pneumonia").is_some(), !is_old);
                        let top = r.top_condition().map(|c| c.name.as_str());
                        assert_eq!(top, Some(if is_old { "Glioma" } else { "Pneumonia" }));
                        assert_eq!(r.clinical_context.measurements.is_empty(), !is_old);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
