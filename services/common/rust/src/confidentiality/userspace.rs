use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::result::Result as DefaultResult;
use std::sync::RwLock;

use serde_json::Value as JsnVal;

use super::AbstractConfidentiality;
use crate::error::{AppConfidentialityError, AppErrorCode};

const SOURCE_SIZE_LIMIT_NBYTES: u64 = 8196;

/// Secrets kept in a JSON file on local file system, each entry is addressed
/// by slash-separated path e.g. `backend_apps/databases/storefront`
pub struct UserSpaceConfidentiality {
    _src_fullpath: String,
    _cached: RwLock<HashMap<String, String>>,
}

impl UserSpaceConfidentiality {
    pub fn build(fullpath: String) -> Self {
        let _cached = RwLock::new(HashMap::new());
        Self {
            _cached,
            _src_fullpath: fullpath,
        }
    }

    fn rawdata_from_source(&self) -> DefaultResult<Vec<u8>, AppConfidentialityError> {
        let srcpath = self._src_fullpath.as_str();
        let mut file = File::open(srcpath).map_err(|e| AppConfidentialityError {
            code: AppErrorCode::IOerror(e.kind()),
            detail: e.to_string(),
        })?;
        let actual_f_sz = file
            .metadata()
            .map_err(|e| AppConfidentialityError {
                code: AppErrorCode::IOerror(e.kind()),
                detail: e.to_string(),
            })?
            .len();
        if actual_f_sz >= SOURCE_SIZE_LIMIT_NBYTES {
            return Err(AppConfidentialityError {
                code: AppErrorCode::ExceedingMaxLimit,
                detail: format!("source-file, size:{}", actual_f_sz),
            });
        }
        let mut rawbuf = Vec::new();
        file.read_to_end(&mut rawbuf)
            .map_err(|e| AppConfidentialityError {
                code: AppErrorCode::IOerror(e.kind()),
                detail: e.to_string(),
            })?;
        Ok(rawbuf)
    } // end of rawdata_from_source

    fn search_json_payload<'a>(
        toplvl: &'a JsnVal,
        id_: &str,
    ) -> DefaultResult<&'a JsnVal, AppConfidentialityError> {
        let mut curr_lvl = toplvl;
        for tok in id_.split('/') {
            let nxtlvl = match curr_lvl {
                JsnVal::Object(o) => o.get(tok),
                JsnVal::Array(a) => tok.parse::<usize>().ok().and_then(|t| a.get(t)),
                _others => None,
            };
            curr_lvl = nxtlvl.ok_or(AppConfidentialityError {
                code: AppErrorCode::NoConfidentialityCfg,
                detail: format!("id:{}, token:{}", id_, tok),
            })?;
        }
        Ok(curr_lvl)
    }
} // end of impl UserSpaceConfidentiality

impl AbstractConfidentiality for UserSpaceConfidentiality {
    fn try_get_payload(&self, id_: &str) -> DefaultResult<String, AppConfidentialityError> {
        let lock_err = |e: String| AppConfidentialityError {
            code: AppErrorCode::AcquireLockFailure,
            detail: e + ", source: UserSpaceConfidentiality",
        };
        {
            let rguard = self._cached.read().map_err(|e| lock_err(e.to_string()))?;
            if let Some(v) = rguard.get(id_) {
                return Ok(v.clone());
            }
        }
        let rawdata = self.rawdata_from_source()?;
        let toplvl = serde_json::from_slice::<JsnVal>(&rawdata).map_err(|e| {
            AppConfidentialityError {
                code: AppErrorCode::InvalidJsonFormat,
                detail: e.to_string(),
            }
        })?;
        let found = Self::search_json_payload(&toplvl, id_)?;
        let found = found.to_string();
        let mut wguard = self._cached.write().map_err(|e| lock_err(e.to_string()))?;
        let _old = wguard.insert(id_.to_string(), found.clone());
        Ok(found)
    } // end of fn try_get_payload
}
