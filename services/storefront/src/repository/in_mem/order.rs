use std::boxed::Box;
use std::collections::{HashMap, HashSet};
use std::result::Result as DefaultResult;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::constant::UNKNOWN_PRODUCT_NAME_PREFIX;
use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchedSingleRow,
    AppInMemFetchedSingleTable,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    CustomerModel, OrderCreateModel, OrderDeliveryModel, OrderLineModel, OrderModel, OrderStatus,
};

use super::super::{AbsOrderRepo, AppOrderRepoUpdateStatusUserFunc};
use super::catalog::_product;
use super::{_id_sequence, get_column, next_seq_id, parse_column};

mod _customer {
    pub(super) const TABLE_LABEL: &str = "customer";
    pub(super) enum InMemColIdx {
        Name,
        Phone,
        CreateTime,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

// unique index, phone number to customer id
mod _customer_phone {
    pub(super) const TABLE_LABEL: &str = "customer_phone";
    pub(super) enum InMemColIdx {
        CustomerId,
        CreateTime,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

mod _order_toplvl {
    pub(super) const TABLE_LABEL: &str = "order_toplvl";
    #[rustfmt::skip]
    pub(super) enum InMemColIdx {
        CustomerId, Subtotal, DeliveryFee, PayMethod, Status, IsDelivery,
        Street, Number, Neighborhood, Notes, CreateTime, TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

mod _order_line {
    pub(super) const TABLE_LABEL: &str = "order_line";
    #[rustfmt::skip]
    pub(super) enum InMemColIdx {
        OrderId, ProductId, Quantity, UnitPrice, TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
    // primary key is composed of order id and line id
    pub(super) fn pkey(oid: u32, line_id: u32) -> String {
        format!("{oid}-{line_id}")
    }
}

const SEQ_CUSTOMER: &str = "customer";
const SEQ_ORDER: &str = "order";
const SEQ_ORDER_LINE: &str = "order_line";

struct InMemDStoreFiltKeyOID {
    oids: HashSet<String>,
}

impl AbsDStoreFilterKeyOp for InMemDStoreFiltKeyOID {
    fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
        let idx: usize = _order_line::InMemColIdx::OrderId.into();
        v.get(idx).map(|o| self.oids.contains(o)).unwrap_or(false)
    }
}

struct InMemDStoreFiltStatusOp {
    label: Option<&'static str>,
}

impl AbsDStoreFilterKeyOp for InMemDStoreFiltStatusOp {
    fn filter(&self, _k: &String, v: &Vec<String>) -> bool {
        let idx: usize = _order_toplvl::InMemColIdx::Status.into();
        match self.label {
            Some(l) => v.get(idx).map(|s| s.as_str() == l).unwrap_or(false),
            None => true,
        }
    }
}

fn parse_time(raw: &str) -> DefaultResult<DateTime<FixedOffset>, AppError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| AppError {
        code: AppErrorCode::DataCorruption,
        detail: Some(format!("time:{raw}, reason:{e}")),
    })
}

// top-level order row before it is joined with customer and lines
struct OrderTopLvlRow {
    customer_id: u32,
    subtotal: Decimal,
    delivery_fee: Decimal,
    pay_method: String,
    status: OrderStatus,
    delivery: OrderDeliveryModel,
    notes: Option<String>,
    create_time: DateTime<FixedOffset>,
}

impl TryFrom<&AppInMemFetchedSingleRow> for OrderTopLvlRow {
    type Error = AppError;
    fn try_from(row: &AppInMemFetchedSingleRow) -> DefaultResult<Self, Self::Error> {
        use _order_toplvl::InMemColIdx;
        let col = |idx: InMemColIdx, label: &str| get_column(row, idx.into(), label);
        let status_raw = col(InMemColIdx::Status, "status")?;
        let status = OrderStatus::from_str(status_raw).map_err(|e| AppError {
            code: AppErrorCode::DataCorruption,
            detail: e.detail,
        })?;
        let delivery = if col(InMemColIdx::IsDelivery, "is_delivery")? == "1" {
            OrderDeliveryModel::Delivery {
                street: col(InMemColIdx::Street, "street")?.to_string(),
                number: col(InMemColIdx::Number, "number")?.to_string(),
                neighborhood: col(InMemColIdx::Neighborhood, "neighborhood")?.to_string(),
            }
        } else {
            OrderDeliveryModel::Pickup
        };
        let notes = Some(col(InMemColIdx::Notes, "notes")?.to_string()).filter(|n| !n.is_empty());
        Ok(Self {
            customer_id: parse_column(col(InMemColIdx::CustomerId, "customer_id")?, "customer_id")?,
            subtotal: parse_column(col(InMemColIdx::Subtotal, "subtotal")?, "subtotal")?,
            delivery_fee: parse_column(col(InMemColIdx::DeliveryFee, "fee")?, "fee")?,
            pay_method: col(InMemColIdx::PayMethod, "pay_method")?.to_string(),
            status,
            delivery,
            notes,
            create_time: parse_time(col(InMemColIdx::CreateTime, "create_time")?)?,
        })
    }
} // end of impl OrderTopLvlRow

pub struct OrderInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl OrderInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        let labels = [
            _customer::TABLE_LABEL,
            _customer_phone::TABLE_LABEL,
            _order_toplvl::TABLE_LABEL,
            _order_line::TABLE_LABEL,
            _id_sequence::TABLE_LABEL,
            _product::TABLE_LABEL,
        ];
        for label in labels {
            m.create_table(label).await?;
        }
        Ok(Self { datastore: m })
    }

    fn toplvl_row(req: &OrderCreateModel, customer_id: u32, time: &str) -> Vec<String> {
        let (is_delivery, street, number, neighborhood) = match &req.delivery {
            OrderDeliveryModel::Pickup => ("0", "", "", ""),
            OrderDeliveryModel::Delivery {
                street,
                number,
                neighborhood,
            } => ("1", street.as_str(), number.as_str(), neighborhood.as_str()),
        };
        let mut row = vec![String::new(); _order_toplvl::InMemColIdx::TotNumColumns.into()];
        let items = [
            (_order_toplvl::InMemColIdx::CustomerId, customer_id.to_string()),
            (_order_toplvl::InMemColIdx::Subtotal, req.subtotal().to_string()),
            (_order_toplvl::InMemColIdx::DeliveryFee, req.delivery_fee.to_string()),
            (_order_toplvl::InMemColIdx::PayMethod, req.pay_method.clone()),
            (_order_toplvl::InMemColIdx::Status, OrderStatus::Pending.label().to_string()),
            (_order_toplvl::InMemColIdx::IsDelivery, is_delivery.to_string()),
            (_order_toplvl::InMemColIdx::Street, street.to_string()),
            (_order_toplvl::InMemColIdx::Number, number.to_string()),
            (_order_toplvl::InMemColIdx::Neighborhood, neighborhood.to_string()),
            (_order_toplvl::InMemColIdx::Notes, req.notes.clone().unwrap_or_default()),
            (_order_toplvl::InMemColIdx::CreateTime, time.to_string()),
        ];
        for (idx, val) in items {
            let idx: usize = idx.into();
            row[idx] = val;
        }
        row
    } // end of fn toplvl_row

    async fn load_customers(
        &self,
        ids: HashSet<u32>,
    ) -> DefaultResult<HashMap<u32, CustomerModel>, AppError> {
        let keys = ids.iter().map(u32::to_string).collect();
        let info = HashMap::from([(_customer::TABLE_LABEL.to_string(), keys)]);
        let mut fetched = self.datastore.fetch(info).await?;
        let table = fetched.remove(_customer::TABLE_LABEL).unwrap_or_default();
        let mut out = HashMap::new();
        for (k, row) in table {
            let id = parse_column::<u32>(k.as_str(), "customer_id")?;
            let m = CustomerModel {
                id,
                name: get_column(&row, _customer::InMemColIdx::Name.into(), "name")?.to_string(),
                phone: get_column(&row, _customer::InMemColIdx::Phone.into(), "phone")?
                    .to_string(),
                create_time: parse_time(get_column(
                    &row,
                    _customer::InMemColIdx::CreateTime.into(),
                    "create_time",
                )?)?,
            };
            out.insert(id, m);
        }
        Ok(out)
    } // end of fn load_customers

    async fn load_lines(
        &self,
        oids: HashSet<String>,
    ) -> DefaultResult<HashMap<u32, Vec<OrderLineModel>>, AppError> {
        let op = InMemDStoreFiltKeyOID { oids };
        let tbl_label = _order_line::TABLE_LABEL.to_string();
        let keys = self.datastore.filter_keys(tbl_label.clone(), &op).await?;
        let info = HashMap::from([(tbl_label, keys)]);
        let mut fetched = self.datastore.fetch(info).await?;
        let table = fetched.remove(_order_line::TABLE_LABEL).unwrap_or_default();
        let mut raw_lines = Vec::new();
        for (k, row) in table.iter() {
            use _order_line::InMemColIdx;
            let line_id = k
                .rsplit('-')
                .next()
                .map(|s| parse_column::<u32>(s, "line_id"))
                .transpose()?
                .unwrap_or(0);
            let oid = parse_column::<u32>(get_column(row, InMemColIdx::OrderId.into(), "oid")?, "oid")?;
            let product_id = parse_column::<u32>(
                get_column(row, InMemColIdx::ProductId.into(), "product_id")?,
                "product_id",
            )?;
            let quantity = parse_column::<u32>(
                get_column(row, InMemColIdx::Quantity.into(), "quantity")?,
                "quantity",
            )?;
            let unit_price = parse_column::<Decimal>(
                get_column(row, InMemColIdx::UnitPrice.into(), "unit_price")?,
                "unit_price",
            )?;
            raw_lines.push((oid, line_id, product_id, quantity, unit_price));
        }
        let pids = raw_lines.iter().map(|r| r.2).collect::<HashSet<u32>>();
        let names = self.load_product_names(pids).await?;
        let mut out: HashMap<u32, Vec<OrderLineModel>> = HashMap::new();
        for (oid, id, product_id, quantity, unit_price) in raw_lines {
            let product_name = names
                .get(&product_id)
                .cloned()
                .unwrap_or_else(|| format!("{UNKNOWN_PRODUCT_NAME_PREFIX}{product_id}"));
            let line = OrderLineModel {
                id,
                product_id,
                product_name,
                quantity,
                unit_price,
            };
            out.entry(oid).or_default().push(line);
        }
        out.values_mut().for_each(|lines| lines.sort_by_key(|l| l.id));
        Ok(out)
    } // end of fn load_lines

    async fn load_product_names(
        &self,
        pids: HashSet<u32>,
    ) -> DefaultResult<HashMap<u32, String>, AppError> {
        let keys = pids.iter().map(u32::to_string).collect();
        let info = HashMap::from([(_product::TABLE_LABEL.to_string(), keys)]);
        let mut fetched = self.datastore.fetch(info).await?;
        let table = fetched.remove(_product::TABLE_LABEL).unwrap_or_default();
        let idx: usize = _product::InMemColIdx::Name.into();
        let mut out = HashMap::new();
        for (k, row) in table {
            let id = parse_column::<u32>(k.as_str(), "product_id")?;
            out.insert(id, get_column(&row, idx, "name")?.to_string());
        }
        Ok(out)
    }

    async fn load_orders(&self, keys: Vec<String>) -> DefaultResult<Vec<OrderModel>, AppError> {
        let info = HashMap::from([(_order_toplvl::TABLE_LABEL.to_string(), keys)]);
        let mut fetched = self.datastore.fetch(info).await?;
        let table: AppInMemFetchedSingleTable = fetched
            .remove(_order_toplvl::TABLE_LABEL)
            .unwrap_or_default();
        let mut toplvls = Vec::new();
        for (k, row) in table.iter() {
            let oid = parse_column::<u32>(k.as_str(), "oid")?;
            toplvls.push((oid, OrderTopLvlRow::try_from(row)?));
        }
        let cust_ids = toplvls.iter().map(|(_, t)| t.customer_id).collect();
        let customers = self.load_customers(cust_ids).await?;
        let oids = table.into_keys().collect();
        let mut lines = self.load_lines(oids).await?;
        let mut out = Vec::new();
        for (oid, t) in toplvls {
            let customer = customers.get(&t.customer_id).cloned().ok_or_else(|| AppError {
                code: AppErrorCode::DataCorruption,
                detail: Some(format!("oid:{oid}, missing-customer:{}", t.customer_id)),
            })?;
            out.push(OrderModel {
                id: oid,
                customer,
                subtotal: t.subtotal,
                delivery_fee: t.delivery_fee,
                pay_method: t.pay_method,
                status: t.status,
                delivery: t.delivery,
                notes: t.notes,
                create_time: t.create_time,
                lines: lines.remove(&oid).unwrap_or_default(),
            });
        }
        Ok(out)
    } // end of fn load_orders
} // end of impl OrderInMemRepo

#[async_trait]
impl AbsOrderRepo for OrderInMemRepo {
    async fn find_customer_by_phone(
        &self,
        phone: &str,
    ) -> DefaultResult<Option<CustomerModel>, AppError> {
        let info = HashMap::from([(
            _customer_phone::TABLE_LABEL.to_string(),
            vec![phone.to_string()],
        )]);
        let mut fetched = self.datastore.fetch(info).await?;
        let found = fetched
            .remove(_customer_phone::TABLE_LABEL)
            .and_then(|mut t| t.remove(phone));
        let cust_id = match found {
            Some(row) => {
                let raw = get_column(&row, _customer_phone::InMemColIdx::CustomerId.into(), "id")?;
                parse_column::<u32>(raw, "customer_id")?
            }
            None => return Ok(None),
        };
        let mut customers = self.load_customers(HashSet::from([cust_id])).await?;
        Ok(customers.remove(&cust_id))
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
        let phone = req.customer.phone.clone();
        let info = HashMap::from([
            (_customer_phone::TABLE_LABEL.to_string(), vec![phone.clone()]),
            (
                _id_sequence::TABLE_LABEL.to_string(),
                [SEQ_CUSTOMER, SEQ_ORDER, SEQ_ORDER_LINE]
                    .map(String::from)
                    .to_vec(),
            ),
        ]);
        // the whole store stays locked until the new rows are saved, that
        // serializes concurrent checkouts of the same phone number
        let (mut fetched, lock) = self.datastore.fetch_acquire(info).await?;
        let seq_tbl = fetched
            .remove(_id_sequence::TABLE_LABEL)
            .unwrap_or_default();
        let idx_tbl = fetched
            .remove(_customer_phone::TABLE_LABEL)
            .unwrap_or_default();
        let time_serial = time.to_rfc3339();
        let mut seq_rows = HashMap::new();
        let (cust_id, cust_ctime) = if let Some(row) = idx_tbl.get(phone.as_str()) {
            let raw = get_column(row, _customer_phone::InMemColIdx::CustomerId.into(), "id")?;
            let ctime = get_column(row, _customer_phone::InMemColIdx::CreateTime.into(), "ctime")?;
            (parse_column::<u32>(raw, "customer_id")?, ctime.to_string())
        } else {
            let id = next_seq_id(seq_tbl.get(SEQ_CUSTOMER))?;
            seq_rows.insert(SEQ_CUSTOMER.to_string(), vec![id.to_string()]);
            (id, time_serial.clone())
        };
        let oid = next_seq_id(seq_tbl.get(SEQ_ORDER))?;
        seq_rows.insert(SEQ_ORDER.to_string(), vec![oid.to_string()]);
        let first_line_id = next_seq_id(seq_tbl.get(SEQ_ORDER_LINE))?;
        let num_lines = req.lines.len() as u32;
        seq_rows.insert(
            SEQ_ORDER_LINE.to_string(),
            vec![(first_line_id + num_lines - 1).to_string()],
        );

        let customer_row = {
            let mut row = vec![String::new(); _customer::InMemColIdx::TotNumColumns.into()];
            row[usize::from(_customer::InMemColIdx::Name)] = req.customer.name.clone();
            row[usize::from(_customer::InMemColIdx::Phone)] = phone.clone();
            row[usize::from(_customer::InMemColIdx::CreateTime)] = cust_ctime.clone();
            row
        };
        let index_row = {
            let mut row = vec![String::new(); _customer_phone::InMemColIdx::TotNumColumns.into()];
            row[usize::from(_customer_phone::InMemColIdx::CustomerId)] = cust_id.to_string();
            row[usize::from(_customer_phone::InMemColIdx::CreateTime)] = cust_ctime;
            row
        };
        let toplvl_row = Self::toplvl_row(&req, cust_id, time_serial.as_str());
        let line_rows = req.lines.iter().zip(first_line_id..).map(|(l, lid)| {
            let mut row = vec![String::new(); _order_line::InMemColIdx::TotNumColumns.into()];
            row[usize::from(_order_line::InMemColIdx::OrderId)] = oid.to_string();
            row[usize::from(_order_line::InMemColIdx::ProductId)] = l.product_id.to_string();
            row[usize::from(_order_line::InMemColIdx::Quantity)] = l.quantity.to_string();
            row[usize::from(_order_line::InMemColIdx::UnitPrice)] = l.unit_price.to_string();
            (_order_line::pkey(oid, lid), row)
        });
        let data = HashMap::from([
            (
                _customer::TABLE_LABEL.to_string(),
                HashMap::from([(cust_id.to_string(), customer_row)]),
            ),
            (
                _customer_phone::TABLE_LABEL.to_string(),
                HashMap::from([(phone, index_row)]),
            ),
            (
                _order_toplvl::TABLE_LABEL.to_string(),
                HashMap::from([(oid.to_string(), toplvl_row)]),
            ),
            (_order_line::TABLE_LABEL.to_string(), HashMap::from_iter(line_rows)),
            (_id_sequence::TABLE_LABEL.to_string(), seq_rows),
        ]);
        let _num = self.datastore.save_release(data, lock)?;
        Ok(oid)
    } // end of fn create

    async fn fetch(&self, oid: u32) -> DefaultResult<Option<OrderModel>, AppError> {
        let mut orders = self.load_orders(vec![oid.to_string()]).await?;
        Ok(orders.pop())
    }

    async fn fetch_by_status(
        &self,
        status: Option<OrderStatus>,
    ) -> DefaultResult<Vec<OrderModel>, AppError> {
        let op = InMemDStoreFiltStatusOp {
            label: status.map(|s| s.label()),
        };
        let keys = self
            .datastore
            .filter_keys(_order_toplvl::TABLE_LABEL.to_string(), &op)
            .await?;
        let mut orders = self.load_orders(keys).await?;
        orders.sort_by(|a, b| {
            b.create_time
                .cmp(&a.create_time)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    async fn update_status(
        &self,
        oid: u32,
        new_status: OrderStatus,
        usr_cb: AppOrderRepoUpdateStatusUserFunc,
    ) -> DefaultResult<Option<OrderModel>, AppError> {
        let key = oid.to_string();
        let info = HashMap::from([(_order_toplvl::TABLE_LABEL.to_string(), vec![key.clone()])]);
        let (mut fetched, lock) = self.datastore.fetch_acquire(info).await?;
        let found = fetched
            .remove(_order_toplvl::TABLE_LABEL)
            .and_then(|mut t| t.remove(key.as_str()));
        let mut row = match found {
            Some(r) => r,
            None => return Ok(None),
        };
        let mut status = OrderTopLvlRow::try_from(&row)?.status;
        usr_cb(&mut status, new_status)?;
        let idx: usize = _order_toplvl::InMemColIdx::Status.into();
        if let Some(col) = row.get_mut(idx) {
            *col = status.label().to_string();
        }
        let data = HashMap::from([(
            _order_toplvl::TABLE_LABEL.to_string(),
            HashMap::from([(key, row)]),
        )]);
        let _num = self.datastore.save_release(data, lock)?;
        self.fetch(oid).await
    } // end of fn update_status
} // end of impl AbsOrderRepo
