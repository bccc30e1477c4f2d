use std::collections::HashMap;
use std::ops::DerefMut;
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Connection, Executor, Row, Statement};

use crate::constant::UNKNOWN_PRODUCT_NAME_PREFIX;
use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    CustomerModel, OrderCreateModel, OrderDeliveryModel, OrderLineModel, OrderModel, OrderStatus,
};
use crate::repository::{AbsOrderRepo, AppOrderRepoUpdateStatusUserFunc};

use super::{check_num_affected, in_clause, to_app_time};

const TOPLVL_SELECT_PATT: &str = "SELECT o.`id`,o.`subtotal`,o.`delivery_fee`,o.`pay_method`,\
    o.`status`,o.`is_delivery`,o.`street`,o.`number`,o.`neighborhood`,o.`notes`,\
    o.`created_at`,c.`id`,c.`name`,c.`phone`,c.`created_at` FROM `order_toplvl` o \
    INNER JOIN `customer` c ON o.`customer_id` = c.`id`";

struct CustomerRow(MySqlRow);
struct TopLvlRow(MySqlRow);
struct OLineRow(MySqlRow);

impl TryFrom<CustomerRow> for CustomerModel {
    type Error = AppError;
    fn try_from(value: CustomerRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            name: row.try_get::<String, usize>(1)?,
            phone: row.try_get::<String, usize>(2)?,
            create_time: to_app_time(row.try_get::<NaiveDateTime, usize>(3)?),
        })
    }
}

impl TryFrom<TopLvlRow> for OrderModel {
    type Error = AppError;
    fn try_from(value: TopLvlRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        let status_raw = row.try_get::<String, usize>(4)?;
        let status = OrderStatus::from_str(status_raw.as_str()).map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: e.detail,
        })?;
        let delivery = if row.try_get::<bool, usize>(5)? {
            OrderDeliveryModel::Delivery {
                street: row.try_get::<Option<String>, usize>(6)?.unwrap_or_default(),
                number: row.try_get::<Option<String>, usize>(7)?.unwrap_or_default(),
                neighborhood: row.try_get::<Option<String>, usize>(8)?.unwrap_or_default(),
            }
        } else {
            OrderDeliveryModel::Pickup
        };
        let customer = CustomerModel {
            id: row.try_get::<u32, usize>(11)?,
            name: row.try_get::<String, usize>(12)?,
            phone: row.try_get::<String, usize>(13)?,
            create_time: to_app_time(row.try_get::<NaiveDateTime, usize>(14)?),
        };
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            customer,
            subtotal: row.try_get::<Decimal, usize>(1)?,
            delivery_fee: row.try_get::<Decimal, usize>(2)?,
            pay_method: row.try_get::<String, usize>(3)?,
            status,
            delivery,
            notes: row.try_get::<Option<String>, usize>(9)?,
            create_time: to_app_time(row.try_get::<NaiveDateTime, usize>(10)?),
            lines: Vec::new(),
        })
    }
} // end of impl TopLvlRow

// (order id, line)
impl TryFrom<OLineRow> for (u32, OrderLineModel) {
    type Error = AppError;
    fn try_from(value: OLineRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        let oid = row.try_get::<u32, usize>(1)?;
        let product_id = row.try_get::<u32, usize>(2)?;
        // product might be removed from catalog after the order was placed
        let product_name = row
            .try_get::<Option<String>, usize>(3)?
            .unwrap_or_else(|| format!("{UNKNOWN_PRODUCT_NAME_PREFIX}{product_id}"));
        let line = OrderLineModel {
            id: row.try_get::<u32, usize>(0)?,
            product_id,
            product_name,
            quantity: row.try_get::<u32, usize>(4)?,
            unit_price: row.try_get::<Decimal, usize>(5)?,
        };
        Ok((oid, line))
    }
}

pub(crate) struct OrderMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

impl OrderMariaDbRepo {
    pub(crate) fn new(dbs: &[Arc<AppMariaDbStore>]) -> DefaultResult<Self, AppError> {
        let _db = dbs.first().cloned().ok_or_else(|| AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { _db })
    }

    async fn _upsert_customer(
        conn: &mut MySqlConnection,
        req: &OrderCreateModel,
        ctime: NaiveDateTime,
    ) -> DefaultResult<u32, AppError> {
        // `LAST_INSERT_ID(expr)` reports id of the existing row on duplicate phone
        let sql_patt = "INSERT INTO `customer`(`name`,`phone`,`created_at`) VALUES (?,?,?) \
                        ON DUPLICATE KEY UPDATE `name`=VALUES(`name`), `id`=LAST_INSERT_ID(`id`)";
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt
            .query()
            .bind(req.customer.name.as_str())
            .bind(req.customer.phone.as_str())
            .bind(ctime);
        let resultset = query.execute(conn).await?;
        Ok(resultset.last_insert_id() as u32)
    }

    async fn _insert_toplvl(
        conn: &mut MySqlConnection,
        req: &OrderCreateModel,
        customer_id: u32,
        ctime: NaiveDateTime,
    ) -> DefaultResult<u32, AppError> {
        let sql_patt = "INSERT INTO `order_toplvl`(`customer_id`,`subtotal`,`delivery_fee`,\
                        `pay_method`,`status`,`is_delivery`,`street`,`number`,`neighborhood`,\
                        `notes`,`created_at`) VALUES (?,?,?,?,?,?,?,?,?,?,?)";
        let (street, number, neighborhood) = match &req.delivery {
            OrderDeliveryModel::Pickup => (None, None, None),
            OrderDeliveryModel::Delivery {
                street,
                number,
                neighborhood,
            } => (Some(street.as_str()), Some(number.as_str()), Some(neighborhood.as_str())),
        };
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt
            .query()
            .bind(customer_id)
            .bind(req.subtotal())
            .bind(req.delivery_fee)
            .bind(req.pay_method.as_str())
            .bind(OrderStatus::Pending.label())
            .bind(req.delivery.is_delivery())
            .bind(street)
            .bind(number)
            .bind(neighborhood)
            .bind(req.notes.as_deref())
            .bind(ctime);
        let resultset = query.execute(conn).await?;
        Ok(resultset.last_insert_id() as u32)
    }

    async fn _insert_lines(
        conn: &mut MySqlConnection,
        req: &OrderCreateModel,
        oid: u32,
    ) -> DefaultResult<(), AppError> {
        let num_batch = req.lines.len();
        if num_batch == 0 {
            return Err(AppError {
                code: AppErrorCode::EmptyInputData,
                detail: Some("order-lines".to_string()),
            });
        }
        let items = (0..num_batch).map(|_| "(?,?,?,?)").collect::<Vec<_>>();
        let sql_patt = format!(
            "INSERT INTO `order_line`(`order_id`,`product_id`,`quantity`,`unit_price`) VALUES {}",
            items.join(",")
        );
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let mut query = stmt.query();
        for line in req.lines.iter() {
            query = query
                .bind(oid)
                .bind(line.product_id)
                .bind(line.quantity)
                .bind(line.unit_price);
        }
        let resultset = query.execute(conn).await?;
        check_num_affected(&resultset, num_batch)
    }

    async fn _fetch_toplvl(
        conn: &mut MySqlConnection,
        status: Option<OrderStatus>,
        oid: Option<u32>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let mut conds = Vec::new();
        if status.is_some() {
            conds.push("o.`status` = ?");
        }
        if oid.is_some() {
            conds.push("o.`id` = ?");
        }
        let where_clause = if conds.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conds.join(" AND "))
        };
        let sql_patt = format!(
            "{TOPLVL_SELECT_PATT}{where_clause} ORDER BY o.`created_at` DESC, o.`id` DESC"
        );
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let mut query = stmt.query();
        if let Some(s) = status {
            query = query.bind(s.label());
        }
        if let Some(id) = oid {
            query = query.bind(id);
        }
        let rows = conn.fetch_all(query).await?;
        rows.into_iter()
            .map(|r| OrderModel::try_from(TopLvlRow(r)))
            .collect()
    }

    async fn _load_lines(
        conn: &mut MySqlConnection,
        orders: &mut [OrderModel],
    ) -> DefaultResult<(), AppError> {
        if orders.is_empty() {
            return Ok(());
        }
        let sql_patt = format!(
            "SELECT l.`id`,l.`order_id`,l.`product_id`,p.`name`,l.`quantity`,l.`unit_price` \
             FROM `order_line` l LEFT JOIN `product` p ON l.`product_id` = p.`id` \
             WHERE l.`order_id` IN ({}) ORDER BY l.`id` ASC",
            in_clause(orders.len())
        );
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let mut query = stmt.query();
        for o in orders.iter() {
            query = query.bind(o.id);
        }
        let rows = conn.fetch_all(query).await?;
        let mut grouped: HashMap<u32, Vec<OrderLineModel>> = HashMap::new();
        for r in rows {
            let (oid, line) = <(u32, OrderLineModel)>::try_from(OLineRow(r))?;
            grouped.entry(oid).or_default().push(line);
        }
        for o in orders.iter_mut() {
            o.lines = grouped.remove(&o.id).unwrap_or_default();
        }
        Ok(())
    }
} // end of impl OrderMariaDbRepo

#[async_trait]
impl AbsOrderRepo for OrderMariaDbRepo {
    async fn find_customer_by_phone(
        &self,
        phone: &str,
    ) -> DefaultResult<Option<CustomerModel>, AppError> {
        let mut conn = self._db.acquire().await?;
        let sql_patt = "SELECT `id`,`name`,`phone`,`created_at` FROM `customer` WHERE `phone` = ?";
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt.query().bind(phone);
        let exec = &mut *conn;
        let maybe_row = exec.fetch_optional(query).await?;
        maybe_row
            .map(|r| CustomerModel::try_from(CustomerRow(r)))
            .transpose()
    }

    async fn create(
        &self,
        req: OrderCreateModel,
        time: DateTime<FixedOffset>,
    ) -> DefaultResult<u32, AppError> {
        if req.lines.is_empty() {
            return Err(AppError {
                code: AppErrorCode::EmptyInputData,
                detail: Some("order-lines".to_string()),
            });
        }
        let ctime = time.naive_utc();
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let customer_id = Self::_upsert_customer(tx.deref_mut(), &req, ctime).await?;
        let oid = Self::_insert_toplvl(tx.deref_mut(), &req, customer_id, ctime).await?;
        Self::_insert_lines(tx.deref_mut(), &req, oid).await?;
        tx.commit().await?;
        Ok(oid)
    } // dropping uncommitted transaction rolls back everything

    async fn fetch(&self, oid: u32) -> DefaultResult<Option<OrderModel>, AppError> {
        let mut conn = self._db.acquire().await?;
        let mut orders = Self::_fetch_toplvl(&mut conn, None, Some(oid)).await?;
        Self::_load_lines(&mut conn, &mut orders).await?;
        Ok(orders.pop())
    }

    async fn fetch_by_status(
        &self,
        status: Option<OrderStatus>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let mut conn = self._db.acquire().await?;
        let mut orders = Self::_fetch_toplvl(&mut conn, status, None).await?;
        Self::_load_lines(&mut conn, &mut orders).await?;
        Ok(orders)
    }

    async fn update_status(
        &self,
        oid: u32,
        new_status: OrderStatus,
        usr_cb: AppOrderRepoUpdateStatusUserFunc,
    ) -> DefaultResult<Option<OrderModel>, AppError> {
        {
            let mut conn = self._db.acquire().await?;
            let mut tx = conn.begin().await?;
            let sql_patt = "SELECT `status` FROM `order_toplvl` WHERE `id` = ? FOR UPDATE";
            let stmt = tx.prepare(sql_patt).await?;
            let query = stmt.query().bind(oid);
            let exec = tx.deref_mut();
            let maybe_row = exec.fetch_optional(query).await?;
            let raw = match maybe_row {
                Some(r) => r.try_get::<String, usize>(0)?,
                None => return Ok(None),
            };
            let mut status = OrderStatus::from_str(raw.as_str()).map_err(|e| AppError {
                code: AppErrorCode::DataCorruption,
                detail: e.detail,
            })?;
            usr_cb(&mut status, new_status)?;
            let sql_patt = "UPDATE `order_toplvl` SET `status` = ? WHERE `id` = ?";
            let stmt = tx.prepare(sql_patt).await?;
            let query = stmt.query().bind(status.label()).bind(oid);
            let _rs = query.execute(tx.deref_mut()).await?;
            tx.commit().await?;
        }
        self.fetch(oid).await
    } // end of fn update_status
} // end of impl AbsOrderRepo
