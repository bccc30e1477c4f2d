use std::ops::DerefMut;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::mysql::{MySqlArguments, MySqlConnection, MySqlRow};
use sqlx::query::Query;
use sqlx::{Connection, Executor, MySql, Row, Statement};

use crate::datastore::AppMariaDbStore;
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    BannerEditModel, BannerModel, CatalogEditCommand, CatalogItemKind, CatalogItemModel,
    CategoryModel, NeighborhoodModel, PayMethodModel, ProductEditModel, ProductModel,
};
use crate::repository::AbsCatalogRepo;

use super::{check_num_affected, in_clause};

const PRODUCT_SELECT_PATT: &str = "SELECT `id`,`name`,`description`,`price`,`image_url`,\
    `category_id`,`active` FROM `product`";
const CATEGORY_SELECT_PATT: &str = "SELECT `id`,`name`,`active` FROM `category`";
const NEIGHBORHOOD_SELECT_PATT: &str = "SELECT `id`,`name`,`fee`,`active` FROM `neighborhood`";
const PAYMETHOD_SELECT_PATT: &str = "SELECT `id`,`name`,`value`,`active` FROM `pay_method`";
const BANNER_SELECT_PATT: &str = "SELECT `id`,`title`,`image_url`,`position`,`active` FROM `banner`";

struct CategoryRow(MySqlRow);
struct ProductRow(MySqlRow);
struct NeighborhoodRow(MySqlRow);
struct PayMethodRow(MySqlRow);
struct BannerRow(MySqlRow);

impl TryFrom<CategoryRow> for CategoryModel {
    type Error = AppError;
    fn try_from(value: CategoryRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            name: row.try_get::<String, usize>(1)?,
            active: row.try_get::<bool, usize>(2)?,
        })
    }
}
impl TryFrom<ProductRow> for ProductModel {
    type Error = AppError;
    fn try_from(value: ProductRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            name: row.try_get::<String, usize>(1)?,
            description: row.try_get::<Option<String>, usize>(2)?,
            price: row.try_get::<Decimal, usize>(3)?,
            image_url: row.try_get::<Option<String>, usize>(4)?,
            category_id: row.try_get::<Option<u32>, usize>(5)?,
            active: row.try_get::<bool, usize>(6)?,
        })
    }
}
impl TryFrom<NeighborhoodRow> for NeighborhoodModel {
    type Error = AppError;
    fn try_from(value: NeighborhoodRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            name: row.try_get::<String, usize>(1)?,
            fee: row.try_get::<Decimal, usize>(2)?,
            active: row.try_get::<bool, usize>(3)?,
        })
    }
}
impl TryFrom<PayMethodRow> for PayMethodModel {
    type Error = AppError;
    fn try_from(value: PayMethodRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            name: row.try_get::<String, usize>(1)?,
            value: row.try_get::<String, usize>(2)?,
            active: row.try_get::<bool, usize>(3)?,
        })
    }
}

impl TryFrom<BannerRow> for BannerModel {
    type Error = AppError;
    fn try_from(value: BannerRow) -> DefaultResult<Self, Self::Error> {
        let row = value.0;
        Ok(Self {
            id: row.try_get::<u32, usize>(0)?,
            title: row.try_get::<String, usize>(1)?,
            image_url: row.try_get::<String, usize>(2)?,
            position: row.try_get::<i32, usize>(3)?,
            active: row.try_get::<bool, usize>(4)?,
        })
    }
}

fn bind_banner<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    m: &'q BannerEditModel,
) -> Query<'q, MySql, MySqlArguments> {
    query
        .bind(m.title.as_str())
        .bind(m.image_url.as_str())
        .bind(m.position)
        .bind(m.active)
}

fn bind_product<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    m: &'q ProductEditModel,
) -> Query<'q, MySql, MySqlArguments> {
    query
        .bind(m.name.as_str())
        .bind(m.description.as_deref())
        .bind(m.price)
        .bind(m.image_url.as_deref())
        .bind(m.category_id)
        .bind(m.active)
}

pub(crate) struct CatalogMariaDbRepo {
    _db: Arc<AppMariaDbStore>,
}

impl CatalogMariaDbRepo {
    pub(crate) fn new(dbs: &[Arc<AppMariaDbStore>]) -> DefaultResult<Self, AppError> {
        let _db = dbs.first().cloned().ok_or_else(|| AppError {
            code: AppErrorCode::MissingDataStore,
            detail: Some("mariadb".to_string()),
        })?;
        Ok(Self { _db })
    }

    async fn _fetch_rows(&self, sql_patt: &str) -> DefaultResult<Vec<MySqlRow>, AppError> {
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt).await?;
        let query = stmt.query();
        let exec = &mut *conn;
        let rows = exec.fetch_all(query).await?;
        Ok(rows)
    }

    async fn _fetch_one(
        &self,
        select_patt: &str,
        id: u32,
    ) -> DefaultResult<Option<MySqlRow>, AppError> {
        let sql_patt = format!("{select_patt} WHERE `id` = ?");
        let mut conn = self._db.acquire().await?;
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query().bind(id);
        let exec = &mut *conn;
        let maybe_row = exec.fetch_optional(query).await?;
        Ok(maybe_row)
    }

    // row is locked until the end of the transaction
    async fn _exists(
        conn: &mut MySqlConnection,
        table: &str,
        id: u32,
    ) -> DefaultResult<bool, AppError> {
        let sql_patt = format!("SELECT `id` FROM `{table}` WHERE `id` = ? FOR UPDATE");
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query().bind(id);
        let maybe_row = conn.fetch_optional(query).await?;
        Ok(maybe_row.is_some())
    }

    async fn _create(
        conn: &mut MySqlConnection,
        query: Query<'_, MySql, MySqlArguments>,
    ) -> DefaultResult<u32, AppError> {
        let resultset = query.execute(conn).await?;
        check_num_affected(&resultset, 1)?;
        Ok(resultset.last_insert_id() as u32)
    }

    // the query has to bind the row id as its last argument
    async fn _update(
        conn: &mut MySqlConnection,
        table: &str,
        id: u32,
        query: Query<'_, MySql, MySqlArguments>,
    ) -> DefaultResult<u32, AppError> {
        if !Self::_exists(conn, table, id).await? {
            return Err(item_not_exist(table, id));
        }
        let _rs = query.execute(conn).await?;
        Ok(id)
    }

    async fn _delete(
        conn: &mut MySqlConnection,
        table: &str,
        id: u32,
    ) -> DefaultResult<u32, AppError> {
        let sql_patt = format!("DELETE FROM `{table}` WHERE `id` = ?");
        let stmt = conn.prepare(sql_patt.as_str()).await?;
        let query = stmt.query().bind(id);
        let resultset = query.execute(conn).await?;
        if resultset.rows_affected() == 0 {
            Err(item_not_exist(table, id))
        } else {
            Ok(id)
        }
    }

    async fn _check_category(
        conn: &mut MySqlConnection,
        m: &ProductEditModel,
    ) -> DefaultResult<(), AppError> {
        if let Some(cid) = m.category_id {
            if !Self::_exists(conn, "category", cid).await? {
                return Err(item_not_exist("category", cid));
            }
        }
        Ok(())
    }
} // end of impl CatalogMariaDbRepo

fn item_not_exist(table: &str, id: u32) -> AppError {
    AppError {
        code: AppErrorCode::CatalogItemNotExist,
        detail: Some(format!("{table}:{id}")),
    }
}

#[async_trait]
impl AbsCatalogRepo for CatalogMariaDbRepo {
    async fn fetch_categories(&self) -> DefaultResult<Vec<CategoryModel>, AppError> {
        let rows = self._fetch_rows(CATEGORY_SELECT_PATT).await?;
        rows.into_iter()
            .map(|r| CategoryModel::try_from(CategoryRow(r)))
            .collect()
    }

    async fn fetch_products(
        &self,
        ids: Option<Vec<u32>>,
    ) -> DefaultResult<Vec<ProductModel>, AppError> {
        let rows = match ids {
            Some(ids) if ids.is_empty() => Vec::new(),
            Some(ids) => {
                let sql_patt = format!(
                    "{PRODUCT_SELECT_PATT} WHERE `id` IN ({})",
                    in_clause(ids.len())
                );
                let mut conn = self._db.acquire().await?;
                let stmt = conn.prepare(sql_patt.as_str()).await?;
                let mut query = stmt.query();
                for id in ids {
                    query = query.bind(id);
                }
                let exec = &mut *conn;
                exec.fetch_all(query).await?
            }
            None => self._fetch_rows(PRODUCT_SELECT_PATT).await?,
        };
        rows.into_iter()
            .map(|r| ProductModel::try_from(ProductRow(r)))
            .collect()
    }

    async fn fetch_neighborhoods(&self) -> DefaultResult<Vec<NeighborhoodModel>, AppError> {
        let rows = self._fetch_rows(NEIGHBORHOOD_SELECT_PATT).await?;
        rows.into_iter()
            .map(|r| NeighborhoodModel::try_from(NeighborhoodRow(r)))
            .collect()
    }

    async fn fetch_pay_methods(&self) -> DefaultResult<Vec<PayMethodModel>, AppError> {
        let rows = self._fetch_rows(PAYMETHOD_SELECT_PATT).await?;
        rows.into_iter()
            .map(|r| PayMethodModel::try_from(PayMethodRow(r)))
            .collect()
    }

    async fn fetch_banners(&self) -> DefaultResult<Vec<BannerModel>, AppError> {
        let rows = self._fetch_rows(BANNER_SELECT_PATT).await?;
        rows.into_iter()
            .map(|r| BannerModel::try_from(BannerRow(r)))
            .collect()
    }

    async fn fetch_item(
        &self,
        kind: CatalogItemKind,
        id: u32,
    ) -> DefaultResult<Option<CatalogItemModel>, AppError> {
        let select_patt = match kind {
            CatalogItemKind::Category => CATEGORY_SELECT_PATT,
            CatalogItemKind::Product => PRODUCT_SELECT_PATT,
            CatalogItemKind::Neighborhood => NEIGHBORHOOD_SELECT_PATT,
            CatalogItemKind::PayMethod => PAYMETHOD_SELECT_PATT,
            CatalogItemKind::Banner => BANNER_SELECT_PATT,
        };
        let row = match self._fetch_one(select_patt, id).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let item = match kind {
            CatalogItemKind::Category => CatalogItemModel::Category(CategoryRow(row).try_into()?),
            CatalogItemKind::Product => CatalogItemModel::Product(ProductRow(row).try_into()?),
            CatalogItemKind::Neighborhood => {
                CatalogItemModel::Neighborhood(NeighborhoodRow(row).try_into()?)
            }
            CatalogItemKind::PayMethod => {
                CatalogItemModel::PayMethod(PayMethodRow(row).try_into()?)
            }
            CatalogItemKind::Banner => CatalogItemModel::Banner(BannerRow(row).try_into()?),
        };
        Ok(Some(item))
    } // end of fn fetch_item

    async fn apply(&self, cmd: CatalogEditCommand) -> DefaultResult<u32, AppError> {
        let mut conn = self._db.acquire().await?;
        let mut tx = conn.begin().await?;
        let c = tx.deref_mut();
        let out = match &cmd {
            CatalogEditCommand::CreateCategory(m) => {
                let sql_patt = "INSERT INTO `category`(`name`,`active`) VALUES (?,?)";
                let query = sqlx::query(sql_patt).bind(m.name.as_str()).bind(m.active);
                Self::_create(c, query).await?
            }
            CatalogEditCommand::UpdateCategory(id, m) => {
                let sql_patt = "UPDATE `category` SET `name`=?,`active`=? WHERE `id`=?";
                let query = sqlx::query(sql_patt)
                    .bind(m.name.as_str())
                    .bind(m.active)
                    .bind(*id);
                Self::_update(c, "category", *id, query).await?
            }
            CatalogEditCommand::DeleteCategory(id) => Self::_delete(c, "category", *id).await?,
            CatalogEditCommand::CreateProduct(m) => {
                Self::_check_category(c, m).await?;
                let sql_patt = "INSERT INTO `product`(`name`,`description`,`price`,`image_url`,\
                                `category_id`,`active`) VALUES (?,?,?,?,?,?)";
                let query = bind_product(sqlx::query(sql_patt), m);
                Self::_create(c, query).await?
            }
            CatalogEditCommand::UpdateProduct(id, m) => {
                Self::_check_category(c, m).await?;
                let sql_patt = "UPDATE `product` SET `name`=?,`description`=?,`price`=?,\
                                `image_url`=?,`category_id`=?,`active`=? WHERE `id`=?";
                let query = bind_product(sqlx::query(sql_patt), m).bind(*id);
                Self::_update(c, "product", *id, query).await?
            }
            CatalogEditCommand::DeleteProduct(id) => Self::_delete(c, "product", *id).await?,
            CatalogEditCommand::CreateNeighborhood(m) => {
                let sql_patt = "INSERT INTO `neighborhood`(`name`,`fee`,`active`) VALUES (?,?,?)";
                let query = sqlx::query(sql_patt)
                    .bind(m.name.as_str())
                    .bind(m.fee)
                    .bind(m.active);
                Self::_create(c, query).await?
            }
            CatalogEditCommand::UpdateNeighborhood(id, m) => {
                let sql_patt = "UPDATE `neighborhood` SET `name`=?,`fee`=?,`active`=? WHERE `id`=?";
                let query = sqlx::query(sql_patt)
                    .bind(m.name.as_str())
                    .bind(m.fee)
                    .bind(m.active)
                    .bind(*id);
                Self::_update(c, "neighborhood", *id, query).await?
            }
            CatalogEditCommand::DeleteNeighborhood(id) => {
                Self::_delete(c, "neighborhood", *id).await?
            }
            CatalogEditCommand::CreatePayMethod(m) => {
                let sql_patt = "INSERT INTO `pay_method`(`name`,`value`,`active`) VALUES (?,?,?)";
                let query = sqlx::query(sql_patt)
                    .bind(m.name.as_str())
                    .bind(m.value.as_str())
                    .bind(m.active);
                Self::_create(c, query).await?
            }
            CatalogEditCommand::UpdatePayMethod(id, m) => {
                let sql_patt = "UPDATE `pay_method` SET `name`=?,`value`=?,`active`=? WHERE `id`=?";
                let query = sqlx::query(sql_patt)
                    .bind(m.name.as_str())
                    .bind(m.value.as_str())
                    .bind(m.active)
                    .bind(*id);
                Self::_update(c, "pay_method", *id, query).await?
            }
            CatalogEditCommand::DeletePayMethod(id) => Self::_delete(c, "pay_method", *id).await?,
            CatalogEditCommand::CreateBanner(m) => {
                let sql_patt = "INSERT INTO `banner`(`title`,`image_url`,`position`,`active`) \
                                VALUES (?,?,?,?)";
                let query = bind_banner(sqlx::query(sql_patt), m);
                Self::_create(c, query).await?
            }
            CatalogEditCommand::UpdateBanner(id, m) => {
                let sql_patt = "UPDATE `banner` SET `title`=?,`image_url`=?,`position`=?,\
                                `active`=? WHERE `id`=?";
                let query = bind_banner(sqlx::query(sql_patt), m).bind(*id);
                Self::_update(c, "banner", *id, query).await?
            }
            CatalogEditCommand::DeleteBanner(id) => Self::_delete(c, "banner", *id).await?,
        };
        tx.commit().await?;
        Ok(out)
    } // end of fn apply
} // end of impl AbsCatalogRepo
