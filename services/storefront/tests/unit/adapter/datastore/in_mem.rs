use std::collections::{HashMap, HashSet};

use storefront::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemDeleteInfo, AppInMemFetchKeys,
    AppInMemUpdateData, AppInMemoryDStore,
};
use storefront::error::AppErrorCode;
use storefront_common::config::AppInMemoryDbCfg;

const UT_TABLE_LABEL_A: &str = "ut-menu-item";
const UT_TABLE_LABEL_B: &str = "ut-district";
const UT_TABLE_LABEL_C: &str = "ut-ticket";
const UT_TABLE_LABELS: [&str; 3] = [UT_TABLE_LABEL_A, UT_TABLE_LABEL_B, UT_TABLE_LABEL_C];

fn ut_row(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn ut_dstore(max_items: u32) -> AppInMemoryDStore {
    let cfg = AppInMemoryDbCfg {
        alias: "utest-kitchen".to_string(),
        max_items,
    };
    AppInMemoryDStore::new(&cfg)
}

#[tokio::test]
async fn save_fetch_ok() {
    let dstore = ut_dstore(10);
    for label in UT_TABLE_LABELS {
        let result = dstore.create_table(label).await;
        assert!(result.is_ok());
    }
    let new_data: AppInMemUpdateData = HashMap::from([
        (
            UT_TABLE_LABEL_A.to_string(),
            HashMap::from([
                ("11".to_string(), ut_row(&["coxinha", "6.5", "1"])),
                ("12".to_string(), ut_row(&["pastel", "8.25", "1"])),
            ]),
        ),
        (
            UT_TABLE_LABEL_C.to_string(),
            HashMap::from([
                ("501".to_string(), ut_row(&["Pendente", "pix"])),
                ("502".to_string(), ut_row(&["Cancelado", "dinheiro"])),
            ]),
        ),
    ]);
    let result = dstore.save(new_data).await;
    assert_eq!(result.unwrap(), 4);

    let fetching_keys: AppInMemFetchKeys = HashMap::from([
        (UT_TABLE_LABEL_A.to_string(), ut_row(&["10", "12", "13"])),
        (UT_TABLE_LABEL_B.to_string(), ut_row(&["Centro"])),
        (UT_TABLE_LABEL_C.to_string(), ut_row(&["502", "503"])),
    ]);
    let actual_fetched = dstore.fetch(fetching_keys).await.unwrap();
    {
        let a_table = actual_fetched.get(UT_TABLE_LABEL_A).unwrap();
        assert_eq!(a_table.len(), 1);
        assert_eq!(a_table.get("12").unwrap(), &ut_row(&["pastel", "8.25", "1"]));
        assert!(a_table.get("10").is_none());
    }
    {
        let a_table = actual_fetched.get(UT_TABLE_LABEL_B).unwrap();
        assert!(a_table.is_empty());
    }
    {
        let a_table = actual_fetched.get(UT_TABLE_LABEL_C).unwrap();
        assert_eq!(a_table.get("502").unwrap(), &ut_row(&["Cancelado", "dinheiro"]));
        assert!(a_table.get("503").is_none());
    }
} // end of fn save_fetch_ok

#[tokio::test]
async fn save_overwrite_existing() {
    let dstore = ut_dstore(3);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            ("11".to_string(), ut_row(&["coxinha", "6.5", "1"])),
            ("12".to_string(), ut_row(&["pastel", "8.25", "1"])),
            ("13".to_string(), ut_row(&["esfiha", "4.0", "1"])),
        ]),
    )]);
    assert_eq!(dstore.save(new_data).await.unwrap(), 3);
    // updating existing rows does not count against the table capacity
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([("12".to_string(), ut_row(&["pastel", "9.0", "0"]))]),
    )]);
    assert_eq!(dstore.save(new_data).await.unwrap(), 1);
    let keys = HashMap::from([(UT_TABLE_LABEL_A.to_string(), ut_row(&["12"]))]);
    let fetched = dstore.fetch(keys).await.unwrap();
    let row = fetched.get(UT_TABLE_LABEL_A).and_then(|t| t.get("12")).unwrap();
    assert_eq!(row, &ut_row(&["pastel", "9.0", "0"]));
}

#[tokio::test]
async fn fetch_acquire_save_release_ok() {
    let dstore = ut_dstore(10);
    dstore.create_table(UT_TABLE_LABEL_C).await.unwrap();
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_C.to_string(),
        HashMap::from([
            ("501".to_string(), ut_row(&["Pendente", "pix"])),
            ("502".to_string(), ut_row(&["Em Preparo", "cartao"])),
        ]),
    )]);
    assert_eq!(dstore.save(new_data).await.unwrap(), 2);

    let keys = HashMap::from([(UT_TABLE_LABEL_C.to_string(), ut_row(&["501", "599"]))]);
    let (mut fetched, lock) = dstore.fetch_acquire(keys).await.unwrap();
    {
        let a_table = fetched.get_mut(UT_TABLE_LABEL_C).unwrap();
        assert_eq!(a_table.len(), 1);
        let row = a_table.get_mut("501").unwrap();
        row[0] = "Em Preparo".to_string();
    }
    let result = dstore.save_release(fetched, lock);
    assert_eq!(result.unwrap(), 1);

    let keys = HashMap::from([(UT_TABLE_LABEL_C.to_string(), ut_row(&["501", "502"]))]);
    let fetched = dstore.fetch(keys).await.unwrap();
    let a_table = fetched.get(UT_TABLE_LABEL_C).unwrap();
    assert_eq!(a_table.get("501").unwrap(), &ut_row(&["Em Preparo", "pix"]));
    assert_eq!(a_table.get("502").unwrap(), &ut_row(&["Em Preparo", "cartao"]));
} // end of fn fetch_acquire_save_release_ok

#[tokio::test]
async fn delete_ok() {
    let chosen_key = "Boa Vista";
    let dstore = ut_dstore(10);
    dstore.create_table(UT_TABLE_LABEL_B).await.unwrap();
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_B.to_string(),
        HashMap::from([
            ("Centro".to_string(), ut_row(&["5.0", "1"])),
            (chosen_key.to_string(), ut_row(&["7.5", "1"])),
        ]),
    )]);
    assert_eq!(dstore.save(new_data).await.unwrap(), 2);
    let deleting: AppInMemDeleteInfo =
        HashMap::from([(UT_TABLE_LABEL_B.to_string(), ut_row(&[chosen_key, "Lapa"]))]);
    let result = dstore.delete(deleting).await;
    assert_eq!(result.unwrap(), 1usize);
    let keys = HashMap::from([(UT_TABLE_LABEL_B.to_string(), ut_row(&[chosen_key, "Centro"]))]);
    let fetched = dstore.fetch(keys).await.unwrap();
    let a_table = fetched.get(UT_TABLE_LABEL_B).unwrap();
    assert!(a_table.get(chosen_key).is_none());
    assert!(a_table.get("Centro").is_some());
}

#[tokio::test]
async fn access_nonexist_table() {
    let dstore = ut_dstore(10);
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([("11".to_string(), ut_row(&["coxinha", "6.5", "1"]))]),
    )]);
    let result = dstore.save(new_data).await;
    let actual = result.err().unwrap();
    assert_eq!(actual.code, AppErrorCode::DataTableNotExist);
    assert_eq!(actual.detail.as_deref(), Some(UT_TABLE_LABEL_A));

    let result = dstore
        .filter_keys(UT_TABLE_LABEL_B.to_string(), &UtestFiltKeyOp { patt: "x".to_string() })
        .await;
    let actual = result.err().unwrap();
    assert_eq!(actual.code, AppErrorCode::DataTableNotExist);
}

#[tokio::test]
async fn exceed_limit_error() {
    let dstore = ut_dstore(3);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            ("11".to_string(), ut_row(&["coxinha", "6.5", "1"])),
            ("12".to_string(), ut_row(&["pastel", "8.25", "1"])),
        ]),
    )]);
    assert_eq!(dstore.save(new_data).await.unwrap(), 2);
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_A.to_string(),
        HashMap::from([
            ("13".to_string(), ut_row(&["esfiha", "4.0", "1"])),
            ("14".to_string(), ut_row(&["quibe", "5.5", "1"])),
        ]),
    )]);
    let actual = dstore.save(new_data).await.err().unwrap();
    assert_eq!(actual.code, AppErrorCode::ExceedingMaxLimit);
    assert!(actual.detail.is_some());
}

#[tokio::test]
async fn exceed_limit_nothing_applied() {
    let dstore = ut_dstore(2);
    dstore.create_table(UT_TABLE_LABEL_A).await.unwrap();
    dstore.create_table(UT_TABLE_LABEL_C).await.unwrap();
    // table A fits, table C does not, none of them should be modified
    let new_data = HashMap::from([
        (
            UT_TABLE_LABEL_A.to_string(),
            HashMap::from([("11".to_string(), ut_row(&["coxinha", "6.5", "1"]))]),
        ),
        (
            UT_TABLE_LABEL_C.to_string(),
            HashMap::from([
                ("501".to_string(), ut_row(&["Pendente", "pix"])),
                ("502".to_string(), ut_row(&["Pendente", "pix"])),
                ("503".to_string(), ut_row(&["Pendente", "pix"])),
            ]),
        ),
    ]);
    let actual = dstore.save(new_data).await.err().unwrap();
    assert_eq!(actual.code, AppErrorCode::ExceedingMaxLimit);
    let keys = HashMap::from([
        (UT_TABLE_LABEL_A.to_string(), ut_row(&["11"])),
        (UT_TABLE_LABEL_C.to_string(), ut_row(&["501", "502", "503"])),
    ]);
    let fetched = dstore.fetch(keys).await.unwrap();
    assert!(fetched.get(UT_TABLE_LABEL_A).unwrap().is_empty());
    assert!(fetched.get(UT_TABLE_LABEL_C).unwrap().is_empty());
} // end of fn exceed_limit_nothing_applied

struct UtestFiltKeyOp {
    patt: String,
}

impl AbsDStoreFilterKeyOp for UtestFiltKeyOp {
    fn filter(&self, k: &String, _v: &Vec<String>) -> bool {
        k.contains(self.patt.as_str())
    }
}

#[tokio::test]
async fn filter_key_ok() {
    let dstore = ut_dstore(8);
    dstore.create_table(UT_TABLE_LABEL_C).await.unwrap();
    let search_id = "77";
    let new_data = HashMap::from([(
        UT_TABLE_LABEL_C.to_string(),
        HashMap::from([
            (format!("{search_id}-1"), ut_row(&["77", "3", "2"])),
            ("78-1".to_string(), ut_row(&["78", "4", "1"])),
            ("79-1".to_string(), ut_row(&["79", "3", "1"])),
            (format!("{search_id}-2"), ut_row(&["77", "9", "1"])),
        ]),
    )]);
    assert_eq!(dstore.save(new_data).await.unwrap(), 4);
    let op = UtestFiltKeyOp {
        patt: search_id.to_string(),
    };
    let actual_keys = dstore
        .filter_keys(UT_TABLE_LABEL_C.to_string(), &op)
        .await
        .unwrap();
    let actual_keys: HashSet<String> = HashSet::from_iter(actual_keys);
    let expect_keys = HashSet::from([format!("{search_id}-1"), format!("{search_id}-2")]);
    assert_eq!(actual_keys, expect_keys);
}
