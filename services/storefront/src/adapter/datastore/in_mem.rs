use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use storefront_common::config::AppInMemoryDbCfg;

use crate::error::{AppError, AppErrorCode};

// simple implementation of in-memory data storage.
// Application callers are responsible to maintain the structure of each row
// in each table, each element of a row is stringified regardless of its
// original type (integer, decimal, date time)
type InnerRow = Vec<String>;
type InnerTable = HashMap<String, InnerRow>;
type AllTable = HashMap<String, InnerTable>;
pub type AppInMemFetchedSingleRow = InnerRow;
pub type AppInMemFetchedSingleTable = InnerTable;
pub type AppInMemUpdateData = AllTable;
pub type AppInMemDeleteInfo = HashMap<String, Vec<String>>; // list of IDs per table
pub type AppInMemFetchKeys = HashMap<String, Vec<String>>;
pub type AppInMemFetchedData = AllTable;
pub type AppInMemDstoreLock = OwnedMutexGuard<AllTable>;

pub trait AbsDStoreFilterKeyOp: Send + Sync {
    fn filter(&self, k: &String, v: &Vec<String>) -> bool;
}

#[async_trait]
pub trait AbstInMemoryDStore: Send + Sync {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError>;
    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError>;
    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError>;
    async fn fetch(&self, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError>;
    // the lock is held until the caller passes it back to `save_release()`, or
    // simply drops it
    async fn fetch_acquire(
        &self,
        info: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError>;
    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError>;
    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError>;
}

pub struct AppInMemoryDStore {
    max_items_per_table: u32,
    table_map: Arc<Mutex<AllTable>>,
}

impl AppInMemoryDStore {
    pub fn new(cfg: &AppInMemoryDbCfg) -> Self {
        let t_map = Arc::new(Mutex::new(HashMap::new()));
        Self {
            table_map: t_map,
            max_items_per_table: cfg.max_items,
        }
    }

    fn _check_table_existence<'a, I>(map: &AllTable, labels: I) -> DefaultResult<(), AppError>
    where
        I: Iterator<Item = &'a String>,
    {
        let mut invalid = labels.filter(|label| !map.contains_key(label.as_str()));
        if let Some(d) = invalid.next() {
            Err(AppError {
                detail: Some(d.to_string()),
                code: AppErrorCode::DataTableNotExist,
            })
        } else {
            Ok(())
        }
    }

    // all tables touched by the update are checked before any of them is
    // modified, so the update is applied either completely or not at all
    fn _check_capacity(&self, map: &AllTable, data: &AppInMemUpdateData) -> DefaultResult<(), AppError> {
        let limit = self.max_items_per_table as usize;
        let mut invalid = data.iter().filter(|(label, d_grp)| {
            let num_new = map
                .get(label.as_str())
                .map(|table| d_grp.keys().filter(|k| !table.contains_key(*k)).count())
                .unwrap_or(d_grp.len());
            let num_curr = map.get(label.as_str()).map(|t| t.len()).unwrap_or(0);
            (num_curr + num_new) > limit
        });
        if let Some((label, _)) = invalid.next() {
            let msg = format!("table:{}, limit:{}", label, limit);
            Err(AppError {
                detail: Some(msg),
                code: AppErrorCode::ExceedingMaxLimit,
            })
        } else {
            Ok(())
        }
    }

    fn _save_inner(
        &self,
        map: &mut AllTable,
        data: AppInMemUpdateData,
    ) -> DefaultResult<usize, AppError> {
        Self::_check_table_existence(map, data.keys())?;
        self._check_capacity(map, &data)?;
        let mut tot_cnt = 0usize;
        for (label, d_grp) in data {
            if let Some(table) = map.get_mut(label.as_str()) {
                tot_cnt += d_grp.len();
                table.extend(d_grp);
            }
        }
        Ok(tot_cnt)
    }

    fn _fetch_inner(
        map: &AllTable,
        info: AppInMemFetchKeys,
    ) -> DefaultResult<AppInMemFetchedData, AppError> {
        Self::_check_table_existence(map, info.keys())?;
        let rs_a = info.into_iter().filter_map(|(label, ids)| {
            map.get(label.as_str()).map(|table| {
                let rs_t = ids
                    .into_iter()
                    .filter_map(|id| table.get(id.as_str()).map(|row| (id, row.clone())));
                (label, HashMap::from_iter(rs_t))
            })
        });
        Ok(HashMap::from_iter(rs_a))
    }
} // end of impl AppInMemoryDStore

#[async_trait]
impl AbstInMemoryDStore for AppInMemoryDStore {
    async fn create_table(&self, label: &str) -> DefaultResult<(), AppError> {
        let mut guard = self.table_map.lock().await;
        if !guard.contains_key(label) {
            guard.insert(label.to_string(), HashMap::new());
        }
        Ok(())
    }

    async fn save(&self, data: AppInMemUpdateData) -> DefaultResult<usize, AppError> {
        let mut guard = self.table_map.lock().await;
        self._save_inner(&mut guard, data)
    }

    async fn delete(&self, info: AppInMemDeleteInfo) -> DefaultResult<usize, AppError> {
        let mut guard = self.table_map.lock().await;
        Self::_check_table_existence(&guard, info.keys())?;
        let mut tot_cnt = 0usize;
        for (label, ids) in info {
            if let Some(table) = guard.get_mut(label.as_str()) {
                tot_cnt += ids.iter().filter_map(|id| table.remove(id)).count();
            }
        }
        Ok(tot_cnt)
    }

    async fn fetch(&self, info: AppInMemFetchKeys) -> DefaultResult<AppInMemFetchedData, AppError> {
        let guard = self.table_map.lock().await;
        Self::_fetch_inner(&guard, info)
    }

    async fn fetch_acquire(
        &self,
        info: AppInMemFetchKeys,
    ) -> DefaultResult<(AppInMemFetchedData, AppInMemDstoreLock), AppError> {
        let guard = self.table_map.clone().lock_owned().await;
        let fetched = Self::_fetch_inner(&guard, info)?;
        Ok((fetched, guard))
    }

    fn save_release(
        &self,
        data: AppInMemUpdateData,
        lock: AppInMemDstoreLock,
    ) -> DefaultResult<usize, AppError> {
        let mut guard = lock;
        self._save_inner(&mut guard, data)
    } // lock released at the end of this function

    async fn filter_keys(
        &self,
        tbl_label: String,
        op: &dyn AbsDStoreFilterKeyOp,
    ) -> DefaultResult<Vec<String>, AppError> {
        let guard = self.table_map.lock().await;
        if let Some(table) = guard.get(tbl_label.as_str()) {
            let out = table
                .iter()
                .filter(|(k, v)| op.filter(k, v))
                .map(|(k, _)| k.clone())
                .collect();
            Ok(out)
        } else {
            Err(AppError {
                detail: Some(tbl_label),
                code: AppErrorCode::DataTableNotExist,
            })
        }
    }
} // end of impl AbstInMemoryDStore
