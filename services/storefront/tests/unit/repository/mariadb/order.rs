use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use storefront::error::AppErrorCode;
use storefront::model::{
    CatalogEditCommand, CustomerContactModel, OrderCreateModel, OrderDeliveryModel,
    OrderLineCreateModel, OrderStatus, ProductEditModel,
};
use storefront::repository::{app_repo_catalog, app_repo_order};

use super::{dstore_ctx_setup, ut_unique_phone};

fn ut_time(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).unwrap()
}

fn ut_create_req(name: &str, phone: &str, lines: &[(u32, u32, i64)]) -> OrderCreateModel {
    let lines = lines
        .iter()
        .map(|(pid, qty, cents)| OrderLineCreateModel {
            product_id: *pid,
            quantity: *qty,
            unit_price: Decimal::new(*cents, 2),
        })
        .collect();
    OrderCreateModel {
        customer: CustomerContactModel {
            name: name.to_string(),
            phone: phone.to_string(),
        },
        delivery: OrderDeliveryModel::Delivery {
            street: "Rua das Flores".to_string(),
            number: "120".to_string(),
            neighborhood: "Vila Nova".to_string(),
        },
        delivery_fee: Decimal::new(850, 2),
        pay_method: "pix".to_string(),
        notes: None,
        lines,
        client_total: None,
    }
}

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn same_phone_upsert_customer() {
    let ds = dstore_ctx_setup();
    let repo = app_repo_order(ds).await.unwrap();
    let phone = ut_unique_phone(1);
    let req = ut_create_req("Joana", phone.as_str(), &[(4_294_967_001, 1, 2250)]);
    let oid1 = repo
        .create(req, ut_time("2024-03-02T19:05:00-03:00"))
        .await
        .unwrap();
    let req = ut_create_req("Joana Lima", phone.as_str(), &[(4_294_967_002, 2, 600)]);
    let oid2 = repo
        .create(req, ut_time("2024-03-03T11:40:00-03:00"))
        .await
        .unwrap();
    assert!(oid2 > oid1);
    let o1 = repo.fetch(oid1).await.unwrap().unwrap();
    let o2 = repo.fetch(oid2).await.unwrap().unwrap();
    assert_eq!(o1.customer.id, o2.customer.id);
    assert_eq!(o1.customer.name.as_str(), "Joana Lima");
    assert_eq!(o1.customer.create_time, ut_time("2024-03-02T19:05:00-03:00"));
    assert_eq!(o2.status, OrderStatus::Pending);
    assert_eq!(o2.subtotal, Decimal::new(1200, 2));
    assert_eq!(o2.lines.len(), 1);
    assert_eq!(o2.lines[0].product_name.as_str(), "produto #4294967002");
    let cust = repo
        .find_customer_by_phone(phone.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cust.id, o1.customer.id);
} // end of fn same_phone_upsert_customer

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn line_price_snapshot() {
    let ds = dstore_ctx_setup();
    let catalog = app_repo_catalog(ds.clone()).await.unwrap();
    let repo = app_repo_order(ds).await.unwrap();
    let mut data = ProductEditModel {
        name: "X-Burger".to_string(),
        description: None,
        price: Decimal::new(2250, 2),
        image_url: None,
        category_id: None,
        active: true,
    };
    let pid = catalog
        .apply(CatalogEditCommand::CreateProduct(data.clone()))
        .await
        .unwrap();
    let phone = ut_unique_phone(2);
    let req = ut_create_req("Caio", phone.as_str(), &[(pid, 2, 2250)]);
    let oid = repo
        .create(req, ut_time("2024-03-02T12:00:00-03:00"))
        .await
        .unwrap();
    data.name = "X-Burger Duplo".to_string();
    data.price = Decimal::new(3100, 2);
    catalog
        .apply(CatalogEditCommand::UpdateProduct(pid, data))
        .await
        .unwrap();
    let saved = repo.fetch(oid).await.unwrap().unwrap();
    assert_eq!(saved.lines[0].unit_price, Decimal::new(2250, 2));
    assert_eq!(saved.lines[0].product_name.as_str(), "X-Burger Duplo");
    assert_eq!(saved.subtotal, Decimal::new(4500, 2));
    catalog
        .apply(CatalogEditCommand::DeleteProduct(pid))
        .await
        .unwrap();
    let saved = repo.fetch(oid).await.unwrap().unwrap();
    assert_eq!(saved.lines[0].product_name, format!("produto #{pid}"));
    assert_eq!(saved.lines[0].unit_price, Decimal::new(2250, 2));
} // end of fn line_price_snapshot

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn rollback_on_line_insert_failure() {
    let ds = dstore_ctx_setup();
    let repo = app_repo_order(ds).await.unwrap();
    let phone = ut_unique_phone(3);
    // one order never holds two lines of the same product in the table,
    // the second line violates the unique key after customer and order
    // rows were already written in the transaction
    let lines = [(4_294_967_003, 1, 600), (4_294_967_003, 2, 600)];
    let req = ut_create_req("Bruno", phone.as_str(), &lines);
    let result = repo.create(req, ut_time("2024-03-04T20:00:00-03:00")).await;
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::RemoteDbServerFailure);
    let found = repo.find_customer_by_phone(phone.as_str()).await.unwrap();
    assert!(found.is_none());
    let pending = repo
        .fetch_by_status(Some(OrderStatus::Pending))
        .await
        .unwrap();
    assert!(pending.iter().all(|o| o.customer.phone != phone));
}

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn create_without_lines_rejected() {
    let ds = dstore_ctx_setup();
    let repo = app_repo_order(ds).await.unwrap();
    let phone = ut_unique_phone(4);
    let req = ut_create_req("Ana", phone.as_str(), &[]);
    let result = repo.create(req, ut_time("2024-03-04T20:00:00-03:00")).await;
    let e = result.err().unwrap();
    assert_eq!(e.code, AppErrorCode::EmptyInputData);
    let found = repo.find_customer_by_phone(phone.as_str()).await.unwrap();
    assert!(found.is_none());
}

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn update_status_locked_row() {
    let ds = dstore_ctx_setup();
    let repo = app_repo_order(ds).await.unwrap();
    let phone = ut_unique_phone(5);
    let req = ut_create_req("Davi", phone.as_str(), &[(4_294_967_004, 1, 1290)]);
    let oid = repo
        .create(req, ut_time("2024-03-05T18:30:00-03:00"))
        .await
        .unwrap();
    let updated = repo
        .update_status(oid, OrderStatus::Preparing, OrderStatus::transit)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Preparing);
    let e = repo
        .update_status(oid, OrderStatus::Pending, OrderStatus::transit)
        .await
        .err()
        .unwrap();
    assert_eq!(e.code, AppErrorCode::InvalidOrderStatus);
    let saved = repo.fetch(oid).await.unwrap().unwrap();
    assert_eq!(saved.status, OrderStatus::Preparing);
    let result = repo
        .update_status(u32::MAX, OrderStatus::Cancelled, OrderStatus::transit)
        .await;
    assert!(result.unwrap().is_none());
} // end of fn update_status_locked_row
