//! The vendor-neutral switch API implemented by every backend.
//!
//! - [`SaiApi`]: lifecycle, generic CRUD, entry-key CRUD, stats, FDB flush
//!   and bulk operations
//! - [`service`]: the service method table and profile map handed to
//!   `initialize`

pub mod service;

pub use service::{ProfileMap, ServiceMethodTable};

use crate::attr::Attribute;
use crate::error::{SaiError, SaiResult, SaiStatus};
use crate::key::ObjectKey;
use crate::notification::NotificationHandler;
use crate::oid::ObjectId;
use crate::stats::{StatId, StatsMode};
use crate::types::ObjectType;
use std::sync::Arc;

/// How a bulk call reacts to a failing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BulkOpMode {
    /// Stop at the first failure; later elements report `NOT_EXECUTED`.
    #[default]
    StopOnError,
    /// Attempt every element.
    IgnoreError,
}

/// Runs `op` over `items` following the bulk mode.
///
/// Always returns one result per item.
pub fn run_bulk<I, T>(
    items: impl IntoIterator<Item = I>,
    mode: BulkOpMode,
    mut op: impl FnMut(I) -> SaiResult<T>,
) -> Vec<SaiResult<T>> {
    let mut failed = false;
    items
        .into_iter()
        .map(|item| {
            if failed && mode == BulkOpMode::StopOnError {
                return Err(SaiError::NotExecuted);
            }
            let result = op(item);
            failed |= result.is_err();
            result
        })
        .collect()
}

/// Overall status of a bulk call: success only when every element succeeded.
pub fn bulk_status<T>(results: &[SaiResult<T>]) -> SaiResult<()> {
    match results.iter().find_map(|r| r.as_ref().err()) {
        Some(_) => Err(SaiError::failure(format!(
            "{} of {} bulk elements failed",
            results.iter().filter(|r| r.is_err()).count(),
            results.len()
        ))),
        None => Ok(()),
    }
}

/// Per-element statuses of a bulk call.
pub fn bulk_statuses<T>(results: &[SaiResult<T>]) -> Vec<SaiStatus> {
    results
        .iter()
        .map(|r| match r {
            Ok(_) => SaiStatus::Success,
            Err(e) => e.status(),
        })
        .collect()
}

/// Switch API surface shared by the redis and virtual switch backends.
pub trait SaiApi: Send + Sync {
    /// Starts the backend. Fails if it is already initialized.
    fn initialize(
        &self,
        services: ServiceMethodTable,
        handler: Option<Arc<dyn NotificationHandler>>,
    ) -> SaiResult<()>;

    /// Stops all background threads and drops all switch state.
    fn shutdown(&self) -> SaiResult<()>;

    /// Creates an id-addressed object. `switch_id` is ignored when creating
    /// a switch.
    fn create(
        &self,
        object_type: ObjectType,
        switch_id: ObjectId,
        attrs: &[Attribute],
    ) -> SaiResult<ObjectId>;

    fn remove(&self, object_type: ObjectType, oid: ObjectId) -> SaiResult<()>;

    fn set(&self, object_type: ObjectType, oid: ObjectId, attr: &Attribute) -> SaiResult<()>;

    /// Fills the values of `attrs`.
    ///
    /// List attributes are negotiated: when a buffer is too small its count
    /// is set to the required size and the call fails with
    /// `BUFFER_OVERFLOW`.
    fn get(&self, object_type: ObjectType, oid: ObjectId, attrs: &mut [Attribute]) -> SaiResult<()>;

    fn create_entry(&self, key: &ObjectKey, attrs: &[Attribute]) -> SaiResult<()>;

    fn remove_entry(&self, key: &ObjectKey) -> SaiResult<()>;

    fn set_entry(&self, key: &ObjectKey, attr: &Attribute) -> SaiResult<()>;

    fn get_entry(&self, key: &ObjectKey, attrs: &mut [Attribute]) -> SaiResult<()>;

    fn get_stats(
        &self,
        object_type: ObjectType,
        oid: ObjectId,
        ids: &[StatId],
    ) -> SaiResult<Vec<u64>> {
        self.get_stats_ext(object_type, oid, ids, StatsMode::Read)
    }

    fn get_stats_ext(
        &self,
        object_type: ObjectType,
        oid: ObjectId,
        ids: &[StatId],
        mode: StatsMode,
    ) -> SaiResult<Vec<u64>>;

    fn clear_stats(&self, object_type: ObjectType, oid: ObjectId, ids: &[StatId]) -> SaiResult<()>;

    /// Removes the FDB entries of a switch matching every given filter.
    fn flush_fdb_entries(&self, switch_id: ObjectId, attrs: &[Attribute]) -> SaiResult<()>;

    fn bulk_create(
        &self,
        object_type: ObjectType,
        switch_id: ObjectId,
        attrs: &[Vec<Attribute>],
        mode: BulkOpMode,
    ) -> Vec<SaiResult<ObjectId>> {
        run_bulk(attrs, mode, |a| self.create(object_type, switch_id, a))
    }

    fn bulk_remove(
        &self,
        object_type: ObjectType,
        oids: &[ObjectId],
        mode: BulkOpMode,
    ) -> Vec<SaiStatus> {
        bulk_statuses(&run_bulk(oids, mode, |oid| self.remove(object_type, *oid)))
    }

    fn bulk_create_entries(
        &self,
        keys: &[ObjectKey],
        attrs: &[Vec<Attribute>],
        mode: BulkOpMode,
    ) -> Vec<SaiResult<()>> {
        if keys.len() != attrs.len() {
            return keys
                .iter()
                .map(|_| {
                    Err(SaiError::invalid_parameter(format!(
                        "{} keys but {} attribute lists",
                        keys.len(),
                        attrs.len()
                    )))
                })
                .collect();
        }
        run_bulk(keys.iter().zip(attrs), mode, |(k, a)| self.create_entry(k, a))
    }

    fn bulk_remove_entries(&self, keys: &[ObjectKey], mode: BulkOpMode) -> Vec<SaiStatus> {
        bulk_statuses(&run_bulk(keys, mode, |k| self.remove_entry(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn op(n: &u32) -> SaiResult<u32> {
        if *n == 2 {
            Err(SaiError::not_found(format!("item {}", n)))
        } else {
            Ok(*n * 10)
        }
    }

    #[test]
    fn test_stop_on_error_marks_rest_not_executed() {
        let results = run_bulk(&[1, 2, 3], BulkOpMode::StopOnError, op);
        assert_eq!(
            bulk_statuses(&results),
            vec![SaiStatus::Success, SaiStatus::ItemNotFound, SaiStatus::NotExecuted]
        );
        assert!(bulk_status(&results).is_err());
    }

    #[test]
    fn test_ignore_error_attempts_all() {
        let results = run_bulk(&[1, 2, 3], BulkOpMode::IgnoreError, op);
        assert_eq!(
            bulk_statuses(&results),
            vec![SaiStatus::Success, SaiStatus::ItemNotFound, SaiStatus::Success]
        );
        assert_eq!(results[2].as_ref().ok(), Some(&30));
    }

    #[test]
    fn test_all_success() {
        let results = run_bulk(&[1, 3], BulkOpMode::StopOnError, op);
        assert!(bulk_status(&results).is_ok());
    }
}
