mod catalog;
mod order;

use std::env;
use std::sync::Arc;

use chrono::Local;

use storefront::AppDataStoreContext;
use storefront_common::confidentiality::UserSpaceConfidentiality;
use storefront_common::constant::env_vars::SYS_BASEPATH;

use crate::ut_setup_share_state;

// tables are created by `migration/init.sql`, database credentials are read
// from the secret file of the deployment environment
fn dstore_ctx_setup() -> Arc<AppDataStoreContext> {
    let cfdntl = {
        let sys_basepath = env::var(SYS_BASEPATH).unwrap();
        let path = sys_basepath.clone() + "/common/data/secrets.json";
        UserSpaceConfidentiality::build(path)
    };
    let app_state = ut_setup_share_state("config_mariadb.json", Box::new(cfdntl));
    let dstore = app_state.datastore();
    assert!(dstore.sql_dbs.is_some());
    let db_stores = dstore.sql_dbs.as_ref().unwrap();
    assert!(!db_stores.is_empty());
    dstore
}

// rows are never removed between test runs, each run picks phone numbers
// not seen before
fn ut_unique_phone(tag: u8) -> String {
    let ts = Local::now().timestamp_micros().unsigned_abs();
    format!("55{tag}{:09}", ts % 1_000_000_000)
}
