use super::parse::parse_lms_table;
use super::source::ReferenceSource;
use super::table::LmsTable;
use crate::error::{GrowthError, GrowthResult};
use crate::models::{MeasurementKind, Sex};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

type TableMap = HashMap<(MeasurementKind, Sex), Arc<LmsTable>>;

/// Loads each `(kind, sex)` table at most once and shares it afterwards.
///
/// The map lock is held across a load, so concurrent callers asking for a key
/// that is still loading wait for that load instead of parsing again. Failed
/// loads are not cached; the next call retries.
pub struct ReferenceCache {
    source: Box<dyn ReferenceSource>,
    tables: Mutex<TableMap>,
}

impl ReferenceCache {
    pub fn new<S: ReferenceSource + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            tables: Mutex::new(HashMap::new()),
        }
    }

    pub fn table(&self, kind: MeasurementKind, sex: Sex) -> GrowthResult<Arc<LmsTable>> {
        let mut tables = self.lock();
        if let Some(table) = tables.get(&(kind, sex)) {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.load(kind, sex)?);
        tables.insert((kind, sex), Arc::clone(&table));
        Ok(table)
    }

    /// Install a table directly, replacing anything cached for the key.
    pub fn insert(&self, kind: MeasurementKind, sex: Sex, table: LmsTable) {
        self.lock().insert((kind, sex), Arc::new(table));
    }

    pub fn cached_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, TableMap> {
        // entries are inserted whole, so a poisoned map is still consistent
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self, kind: MeasurementKind, sex: Sex) -> GrowthResult<LmsTable> {
        let candidates = kind.file_stems(sex);
        for stem in &candidates {
            if let Some(resource) = self.source.fetch(stem)? {
                let table = parse_lms_table(&resource.location, &resource.bytes)?;
                debug!(
                    "Loaded {} ({}) reference from {} with {} rows",
                    kind,
                    sex,
                    resource.location,
                    table.len()
                );
                return Ok(table);
            }
        }

        Err(GrowthError::ResourceNotFound {
            kind,
            sex,
            candidates,
        })
    }
}

impl std::fmt::Debug for ReferenceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceCache")
            .field("cached", &self.cached_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::source::{InMemorySource, ReferenceResource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        inner: InMemorySource,
        fetches: Arc<AtomicUsize>,
    }

    impl ReferenceSource for CountingSource {
        fn fetch(&self, stem: &str) -> GrowthResult<Option<ReferenceResource>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            self.inner.fetch(stem)
        }
    }

    #[test]
    fn test_loads_once_across_threads() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let cache = ReferenceCache::new(CountingSource {
            inner: InMemorySource::new().with_table("wfa_0_5y_male_lms", "0,1,3.3,0.15\n1,1,4.5,0.15\n"),
            fetches: Arc::clone(&fetches),
        });

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let table = cache.table(MeasurementKind::WeightForAge, Sex::Male).unwrap();
                    assert_eq!(table.len(), 2);
                });
            }
        });

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_count(), 1);
    }

    #[test]
    fn test_same_arc_returned() {
        let cache = ReferenceCache::new(
            InMemorySource::new().with_table("hcfa_0_5y_female_lms", "0,1,34.0,0.035\n"),
        );
        let a = cache.table(MeasurementKind::HeadCircumferenceForAge, Sex::Female).unwrap();
        let b = cache.table(MeasurementKind::HeadCircumferenceForAge, Sex::Female).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_weight_for_length_falls_back_to_later_stem() {
        let cache = ReferenceCache::new(
            InMemorySource::new().with_table("wfl_0_5y_female_lms", "45,-0.38,2.46,0.09\n"),
        );
        let table = cache.table(MeasurementKind::WeightForLength, Sex::Female).unwrap();
        assert_eq!(table.rows()[0].x, 45.0);
    }

    #[test]
    fn test_missing_resource() {
        let cache = ReferenceCache::new(InMemorySource::new());
        let err = cache.table(MeasurementKind::BmiForAge, Sex::Male).unwrap_err();
        match err {
            GrowthError::ResourceNotFound { kind, sex, candidates } => {
                assert_eq!(kind, MeasurementKind::BmiForAge);
                assert_eq!(sex, Sex::Male);
                assert_eq!(candidates, vec!["bmifa_0_5y_male_lms".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(cache.cached_count(), 0);
    }

    #[test]
    fn test_malformed_first_hit_does_not_fall_back() {
        let cache = ReferenceCache::new(
            InMemorySource::new()
                .with_table("wfl_0_2y_male_lms", "Length,L,M,S\n")
                .with_table("wfl_0_5y_male_lms", "45,-0.35,2.44,0.09\n"),
        );
        let err = cache.table(MeasurementKind::WeightForLength, Sex::Male).unwrap_err();
        match err {
            GrowthError::MalformedCsv { resource, .. } => {
                assert_eq!(resource, "memory:wfl_0_2y_male_lms");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_insert_preloads() {
        let cache = ReferenceCache::new(InMemorySource::new());
        cache.insert(
            MeasurementKind::WeightForAge,
            Sex::Female,
            LmsTable::from_rows(vec![crate::reference::LmsRow::new(0.0, 1.0, 3.2, 0.14)]),
        );
        assert!(cache.table(MeasurementKind::WeightForAge, Sex::Female).is_ok());
    }
}
