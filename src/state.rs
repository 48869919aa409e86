use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::data::filter::FilterState;
use crate::data::model::DataStore;
use crate::pipeline::{self, PipelineOutput};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// One operator session, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Shared read-only tables (None until a folder is loaded).
    pub store: Option<Arc<DataStore>>,

    /// Current selection; replaced wholesale on each interaction.
    pub filters: Option<FilterState>,

    /// Chart and summary for `filters` (cached until they change).
    pub output: Option<PipelineOutput>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn with_store(store: Arc<DataStore>, config: &PipelineConfig) -> Self {
        let mut state = AppState::default();
        state.set_store(store, config);
        state
    }

    /// Ingest a newly loaded store, reset filters to its full range and rerun.
    pub fn set_store(&mut self, store: Arc<DataStore>, config: &PipelineConfig) {
        let filters = FilterState::from_store(&store);
        self.output = Some(pipeline::run(&store, &filters, config));
        self.filters = Some(filters);
        self.store = Some(store);
        self.status_message = None;
    }

    /// Replace the filter state. The pipeline reruns only when the new state
    /// differs from the current one; returns whether it did.
    pub fn apply_filters(&mut self, next: FilterState, config: &PipelineConfig) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        if self.filters == Some(next) {
            return false;
        }
        self.output = Some(pipeline::run(store, &next, config));
        self.filters = Some(next);
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::ObservedPoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn store() -> Arc<DataStore> {
        let observed = (1..=31)
            .map(|d| ObservedPoint {
                date: day(d),
                failure_pct: 2.0,
            })
            .collect();
        Arc::new(DataStore::new(observed, vec![], vec![]).unwrap())
    }

    #[test]
    fn loading_a_store_runs_the_pipeline_on_the_full_range() {
        let state = AppState::with_store(store(), &PipelineConfig::default());
        let out = state.output.as_ref().unwrap();
        assert_eq!(out.summary.total_records, 31);
        assert_eq!(state.filters.unwrap().start_date, day(1));
    }

    #[test]
    fn changed_filters_rerun_and_identical_filters_do_not() {
        let cfg = PipelineConfig::default();
        let mut state = AppState::with_store(store(), &cfg);
        let mut next = state.filters.unwrap();
        assert!(!state.apply_filters(next, &cfg));

        next.spike_enabled = true;
        assert!(state.apply_filters(next, &cfg));
        let out = state.output.as_ref().unwrap();
        assert_eq!(out.summary.high_failure_days, 4);
        assert_eq!(out.filter, next);
    }

    #[test]
    fn filters_are_ignored_without_a_store() {
        let cfg = PipelineConfig::default();
        let mut state = AppState::default();
        let f = FilterState::from_store(&store());
        assert!(!state.apply_filters(f, &cfg));
        assert!(state.output.is_none());
    }

    #[test]
    fn sessions_share_one_store() {
        let cfg = PipelineConfig::default();
        let shared = store();
        let mut a = AppState::with_store(Arc::clone(&shared), &cfg);
        let b = AppState::with_store(Arc::clone(&shared), &cfg);

        let mut f = a.filters.unwrap();
        f.end_date = day(10);
        a.apply_filters(f, &cfg);

        assert_eq!(a.output.as_ref().unwrap().summary.total_records, 10);
        assert_eq!(b.output.as_ref().unwrap().summary.total_records, 31);
        assert_eq!(Arc::strong_count(&shared), 3);
    }
}
