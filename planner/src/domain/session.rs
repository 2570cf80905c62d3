use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use entities::{BucketId, DispatchError, TaskRef};
use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

/// Inclusive UTC bounds of one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Self {
        let local_midnight = date.and_time(NaiveTime::MIN);
        let start = (local_midnight - TimeDelta::seconds(offset.local_minus_utc() as i64)).and_utc();
        let end = start + TimeDelta::days(1) - TimeDelta::milliseconds(1);

        Self { start, end }
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start <= *at && *at <= self.end
    }
}

/// State of one operator's planning screen.
#[derive(Debug)]
pub struct PlanningSession {
    selected_date: NaiveDate,
    utc_offset: FixedOffset,
    hovered: Option<TaskRef>,
    optimizing: Mutex<HashSet<BucketId>>,
}

impl PlanningSession {
    pub fn new(selected_date: NaiveDate, utc_offset: FixedOffset) -> Self {
        Self {
            selected_date,
            utc_offset,
            hovered: None,
            optimizing: Mutex::new(HashSet::new()),
        }
    }

    /// Session on today's date in the given offset.
    pub fn today(utc_offset: FixedOffset) -> Self {
        Self::new(Utc::now().with_timezone(&utc_offset).date_naive(), utc_offset)
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    pub fn shift_days(&mut self, days: i64) {
        self.selected_date = TimeDelta::try_days(days)
            .and_then(|delta| self.selected_date.checked_add_signed(delta))
            .unwrap_or(self.selected_date);
    }

    pub fn hover(&mut self, task: Option<TaskRef>) {
        self.hovered = task;
    }

    pub fn hovered(&self) -> Option<&TaskRef> {
        self.hovered.as_ref()
    }

    pub fn day_window(&self) -> DayWindow {
        DayWindow::new(self.selected_date, self.utc_offset)
    }

    fn optimizing(&self) -> MutexGuard<'_, HashSet<BucketId>> {
        self.optimizing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_optimizing(&self, bucket: &BucketId) -> bool {
        self.optimizing().contains(bucket)
    }

    /// Marks `bucket` as being optimized until the returned guard is dropped.
    pub fn begin_optimization(
        &self,
        bucket: &BucketId,
    ) -> Result<OptimizationGuard<'_>, DispatchError> {
        if !self.optimizing().insert(bucket.clone()) {
            return Err(DispatchError::optimization_in_progress(&bucket.to_string()));
        }

        debug!("Optimization started for {bucket}");
        Ok(OptimizationGuard {
            session: self,
            bucket: bucket.clone(),
        })
    }
}

pub struct OptimizationGuard<'a> {
    session: &'a PlanningSession,
    bucket: BucketId,
}

impl Drop for OptimizationGuard<'_> {
    fn drop(&mut self) {
        self.session.optimizing().remove(&self.bucket);
        debug!("Optimization finished for {}", self.bucket);
    }
}
