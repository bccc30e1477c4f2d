use std::boxed::Box;
use std::collections::HashMap;
use std::result::Result as DefaultResult;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::datastore::{
    AbsDStoreFilterKeyOp, AbstInMemoryDStore, AppInMemFetchedSingleRow, AppInMemFetchedSingleTable,
};
use crate::error::{AppError, AppErrorCode};
use crate::model::{
    BannerEditModel, BannerModel, CatalogEditCommand, CatalogItemKind, CatalogItemModel,
    CategoryEditModel, CategoryModel, NeighborhoodEditModel, NeighborhoodModel,
    PayMethodEditModel, PayMethodModel, ProductEditModel, ProductModel,
};

use super::super::AbsCatalogRepo;
use super::{_id_sequence, get_column, next_seq_id, parse_column};

mod _category {
    pub(super) const TABLE_LABEL: &str = "category";
    pub(super) enum InMemColIdx {
        Name,
        Active,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

// order lines look up product names from this table
pub(super) mod _product {
    pub(crate) const TABLE_LABEL: &str = "product";
    #[rustfmt::skip]
    pub(crate) enum InMemColIdx {
        Name, Description, Price, ImageUrl, CategoryId, Active, TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

mod _neighborhood {
    pub(super) const TABLE_LABEL: &str = "neighborhood";
    pub(super) enum InMemColIdx {
        Name,
        Fee,
        Active,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

mod _pay_method {
    pub(super) const TABLE_LABEL: &str = "pay_method";
    pub(super) enum InMemColIdx {
        Name,
        Value,
        Active,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

mod _banner {
    pub(super) const TABLE_LABEL: &str = "banner";
    pub(super) enum InMemColIdx {
        Title,
        ImageUrl,
        Position,
        Active,
        TotNumColumns,
    }
    impl From<InMemColIdx> for usize {
        fn from(value: InMemColIdx) -> usize {
            value as usize
        }
    }
}

fn bool_serial(v: bool) -> String {
    let out = if v { "1" } else { "0" };
    out.to_string()
}

fn opt_serial<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(T::to_string).unwrap_or_default()
}

fn opt_text(raw: &str) -> Option<String> {
    Some(raw.to_string()).filter(|s| !s.is_empty())
}

fn build_row(ncols: usize, items: Vec<(usize, String)>) -> Vec<String> {
    let mut row = vec![String::new(); ncols];
    for (idx, val) in items {
        if let Some(col) = row.get_mut(idx) {
            *col = val;
        }
    }
    row
}

impl From<&CategoryEditModel> for AppInMemFetchedSingleRow {
    fn from(value: &CategoryEditModel) -> Self {
        use _category::InMemColIdx;
        let items = vec![
            (InMemColIdx::Name.into(), value.name.clone()),
            (InMemColIdx::Active.into(), bool_serial(value.active)),
        ];
        build_row(InMemColIdx::TotNumColumns.into(), items)
    }
}
impl From<&ProductEditModel> for AppInMemFetchedSingleRow {
    fn from(value: &ProductEditModel) -> Self {
        use _product::InMemColIdx;
        let items = vec![
            (InMemColIdx::Name.into(), value.name.clone()),
            (InMemColIdx::Description.into(), opt_serial(&value.description)),
            (InMemColIdx::Price.into(), value.price.to_string()),
            (InMemColIdx::ImageUrl.into(), opt_serial(&value.image_url)),
            (InMemColIdx::CategoryId.into(), opt_serial(&value.category_id)),
            (InMemColIdx::Active.into(), bool_serial(value.active)),
        ];
        build_row(InMemColIdx::TotNumColumns.into(), items)
    }
}
impl From<&NeighborhoodEditModel> for AppInMemFetchedSingleRow {
    fn from(value: &NeighborhoodEditModel) -> Self {
        use _neighborhood::InMemColIdx;
        let items = vec![
            (InMemColIdx::Name.into(), value.name.clone()),
            (InMemColIdx::Fee.into(), value.fee.to_string()),
            (InMemColIdx::Active.into(), bool_serial(value.active)),
        ];
        build_row(InMemColIdx::TotNumColumns.into(), items)
    }
}
impl From<&PayMethodEditModel> for AppInMemFetchedSingleRow {
    fn from(value: &PayMethodEditModel) -> Self {
        use _pay_method::InMemColIdx;
        let items = vec![
            (InMemColIdx::Name.into(), value.name.clone()),
            (InMemColIdx::Value.into(), value.value.clone()),
            (InMemColIdx::Active.into(), bool_serial(value.active)),
        ];
        build_row(InMemColIdx::TotNumColumns.into(), items)
    }
}

impl From<&BannerEditModel> for AppInMemFetchedSingleRow {
    fn from(value: &BannerEditModel) -> Self {
        use _banner::InMemColIdx;
        let items = vec![
            (InMemColIdx::Title.into(), value.title.clone()),
            (InMemColIdx::ImageUrl.into(), value.image_url.clone()),
            (InMemColIdx::Position.into(), value.position.to_string()),
            (InMemColIdx::Active.into(), bool_serial(value.active)),
        ];
        build_row(InMemColIdx::TotNumColumns.into(), items)
    }
}

fn to_category(k: &str, row: &AppInMemFetchedSingleRow) -> DefaultResult<CategoryModel, AppError> {
    use _category::InMemColIdx;
    Ok(CategoryModel {
        id: parse_column(k, "id")?,
        name: get_column(row, InMemColIdx::Name.into(), "name")?.to_string(),
        active: get_column(row, InMemColIdx::Active.into(), "active")? == "1",
    })
}

fn to_product(k: &str, row: &AppInMemFetchedSingleRow) -> DefaultResult<ProductModel, AppError> {
    use _product::InMemColIdx;
    let category_id = match get_column(row, InMemColIdx::CategoryId.into(), "category_id")? {
        "" => None,
        raw => Some(parse_column::<u32>(raw, "category_id")?),
    };
    Ok(ProductModel {
        id: parse_column(k, "id")?,
        name: get_column(row, InMemColIdx::Name.into(), "name")?.to_string(),
        description: opt_text(get_column(row, InMemColIdx::Description.into(), "desc")?),
        price: parse_column::<Decimal>(get_column(row, InMemColIdx::Price.into(), "price")?, "price")?,
        image_url: opt_text(get_column(row, InMemColIdx::ImageUrl.into(), "image_url")?),
        category_id,
        active: get_column(row, InMemColIdx::Active.into(), "active")? == "1",
    })
}

fn to_neighborhood(
    k: &str,
    row: &AppInMemFetchedSingleRow,
) -> DefaultResult<NeighborhoodModel, AppError> {
    use _neighborhood::InMemColIdx;
    Ok(NeighborhoodModel {
        id: parse_column(k, "id")?,
        name: get_column(row, InMemColIdx::Name.into(), "name")?.to_string(),
        fee: parse_column::<Decimal>(get_column(row, InMemColIdx::Fee.into(), "fee")?, "fee")?,
        active: get_column(row, InMemColIdx::Active.into(), "active")? == "1",
    })
}

fn to_pay_method(k: &str, row: &AppInMemFetchedSingleRow) -> DefaultResult<PayMethodModel, AppError> {
    use _pay_method::InMemColIdx;
    Ok(PayMethodModel {
        id: parse_column(k, "id")?,
        name: get_column(row, InMemColIdx::Name.into(), "name")?.to_string(),
        value: get_column(row, InMemColIdx::Value.into(), "value")?.to_string(),
        active: get_column(row, InMemColIdx::Active.into(), "active")? == "1",
    })
}

fn to_banner(k: &str, row: &AppInMemFetchedSingleRow) -> DefaultResult<BannerModel, AppError> {
    use _banner::InMemColIdx;
    let position = get_column(row, InMemColIdx::Position.into(), "position")?;
    Ok(BannerModel {
        id: parse_column(k, "id")?,
        title: get_column(row, InMemColIdx::Title.into(), "title")?.to_string(),
        image_url: get_column(row, InMemColIdx::ImageUrl.into(), "image_url")?.to_string(),
        position: parse_column::<i32>(position, "position")?,
        active: get_column(row, InMemColIdx::Active.into(), "active")? == "1",
    })
}

enum InMemEditOp {
    Create(AppInMemFetchedSingleRow),
    Update(u32, AppInMemFetchedSingleRow),
    Delete(u32),
}

fn item_not_exist(label: &str, id: u32) -> AppError {
    AppError {
        code: AppErrorCode::CatalogItemNotExist,
        detail: Some(format!("{label}:{id}")),
    }
}

pub struct CatalogInMemRepo {
    datastore: Arc<Box<dyn AbstInMemoryDStore>>,
}

impl CatalogInMemRepo {
    pub async fn new(m: Arc<Box<dyn AbstInMemoryDStore>>) -> DefaultResult<Self, AppError> {
        let labels = [
            _category::TABLE_LABEL,
            _product::TABLE_LABEL,
            _neighborhood::TABLE_LABEL,
            _pay_method::TABLE_LABEL,
            _banner::TABLE_LABEL,
            _id_sequence::TABLE_LABEL,
        ];
        for label in labels {
            m.create_table(label).await?;
        }
        Ok(Self { datastore: m })
    }

    async fn fetch_all(&self, label: &str) -> DefaultResult<AppInMemFetchedSingleTable, AppError> {
        let keys = self
            .datastore
            .filter_keys(label.to_string(), &InMemDStoreFiltAll)
            .await?;
        let info = HashMap::from([(label.to_string(), keys)]);
        let mut fetched = self.datastore.fetch(info).await?;
        Ok(fetched.remove(label).unwrap_or_default())
    }

    // `required` lists rows of other tables which have to exist, checked
    // under the same lock as the modification
    async fn edit(
        &self,
        label: &str,
        op: InMemEditOp,
        required: Option<(&str, u32)>,
    ) -> DefaultResult<u32, AppError> {
        let mut info = HashMap::new();
        match &op {
            InMemEditOp::Create(_) => {
                info.insert(_id_sequence::TABLE_LABEL.to_string(), vec![label.to_string()]);
            }
            InMemEditOp::Update(id, _) | InMemEditOp::Delete(id) => {
                info.insert(label.to_string(), vec![id.to_string()]);
            }
        }
        if let Some((req_label, req_id)) = required {
            info.entry(req_label.to_string())
                .or_insert_with(Vec::new)
                .push(req_id.to_string());
        }
        let (fetched, lock) = self.datastore.fetch_acquire(info).await?;
        if let Some((req_label, req_id)) = required {
            let found = fetched
                .get(req_label)
                .map(|t| t.contains_key(req_id.to_string().as_str()))
                .unwrap_or(false);
            if !found {
                return Err(item_not_exist(req_label, req_id));
            }
        }
        let exists = |id: u32| {
            fetched
                .get(label)
                .map(|t| t.contains_key(id.to_string().as_str()))
                .unwrap_or(false)
        };
        match op {
            InMemEditOp::Create(row) => {
                let seq_row = fetched
                    .get(_id_sequence::TABLE_LABEL)
                    .and_then(|t| t.get(label));
                let id = next_seq_id(seq_row)?;
                let data = HashMap::from([
                    (
                        label.to_string(),
                        HashMap::from([(id.to_string(), row)]),
                    ),
                    (
                        _id_sequence::TABLE_LABEL.to_string(),
                        HashMap::from([(label.to_string(), vec![id.to_string()])]),
                    ),
                ]);
                let _num = self.datastore.save_release(data, lock)?;
                Ok(id)
            }
            InMemEditOp::Update(id, row) => {
                if !exists(id) {
                    return Err(item_not_exist(label, id));
                }
                let data = HashMap::from([(
                    label.to_string(),
                    HashMap::from([(id.to_string(), row)]),
                )]);
                let _num = self.datastore.save_release(data, lock)?;
                Ok(id)
            }
            InMemEditOp::Delete(id) => {
                if !exists(id) {
                    return Err(item_not_exist(label, id));
                }
                drop(lock);
                let info = HashMap::from([(label.to_string(), vec![id.to_string()])]);
                let num = self.datastore.delete(info).await?;
                if num == 0 {
                    Err(item_not_exist(label, id))
                } else {
                    Ok(id)
                }
            }
        }
    } // end of fn edit
} // end of impl CatalogInMemRepo

struct InMemDStoreFiltAll;

impl AbsDStoreFilterKeyOp for InMemDStoreFiltAll {
    fn filter(&self, _k: &String, _v: &Vec<String>) -> bool {
        true
    }
}

#[async_trait]
impl AbsCatalogRepo for CatalogInMemRepo {
    async fn fetch_categories(&self) -> DefaultResult<Vec<CategoryModel>, AppError> {
        let table = self.fetch_all(_category::TABLE_LABEL).await?;
        table.iter().map(|(k, row)| to_category(k, row)).collect()
    }

    async fn fetch_products(
        &self,
        ids: Option<Vec<u32>>,
    ) -> DefaultResult<Vec<ProductModel>, AppError> {
        let table = if let Some(ids) = ids {
            let keys = ids.iter().map(u32::to_string).collect();
            let info = HashMap::from([(_product::TABLE_LABEL.to_string(), keys)]);
            let mut fetched = self.datastore.fetch(info).await?;
            fetched.remove(_product::TABLE_LABEL).unwrap_or_default()
        } else {
            self.fetch_all(_product::TABLE_LABEL).await?
        };
        table.iter().map(|(k, row)| to_product(k, row)).collect()
    }

    async fn fetch_neighborhoods(&self) -> DefaultResult<Vec<NeighborhoodModel>, AppError> {
        let table = self.fetch_all(_neighborhood::TABLE_LABEL).await?;
        table.iter().map(|(k, row)| to_neighborhood(k, row)).collect()
    }

    async fn fetch_pay_methods(&self) -> DefaultResult<Vec<PayMethodModel>, AppError> {
        let table = self.fetch_all(_pay_method::TABLE_LABEL).await?;
        table.iter().map(|(k, row)| to_pay_method(k, row)).collect()
    }

    async fn fetch_banners(&self) -> DefaultResult<Vec<BannerModel>, AppError> {
        let table = self.fetch_all(_banner::TABLE_LABEL).await?;
        table.iter().map(|(k, row)| to_banner(k, row)).collect()
    }

    async fn fetch_item(
        &self,
        kind: CatalogItemKind,
        id: u32,
    ) -> DefaultResult<Option<CatalogItemModel>, AppError> {
        let label = match kind {
            CatalogItemKind::Category => _category::TABLE_LABEL,
            CatalogItemKind::Product => _product::TABLE_LABEL,
            CatalogItemKind::Neighborhood => _neighborhood::TABLE_LABEL,
            CatalogItemKind::PayMethod => _pay_method::TABLE_LABEL,
            CatalogItemKind::Banner => _banner::TABLE_LABEL,
        };
        let key = id.to_string();
        let info = HashMap::from([(label.to_string(), vec![key.clone()])]);
        let mut fetched = self.datastore.fetch(info).await?;
        let row = match fetched.remove(label).and_then(|mut t| t.remove(&key)) {
            Some(r) => r,
            None => return Ok(None),
        };
        let item = match kind {
            CatalogItemKind::Category => CatalogItemModel::Category(to_category(&key, &row)?),
            CatalogItemKind::Product => CatalogItemModel::Product(to_product(&key, &row)?),
            CatalogItemKind::Neighborhood => {
                CatalogItemModel::Neighborhood(to_neighborhood(&key, &row)?)
            }
            CatalogItemKind::PayMethod => CatalogItemModel::PayMethod(to_pay_method(&key, &row)?),
            CatalogItemKind::Banner => CatalogItemModel::Banner(to_banner(&key, &row)?),
        };
        Ok(Some(item))
    } // end of fn fetch_item

    async fn apply(&self, cmd: CatalogEditCommand) -> DefaultResult<u32, AppError> {
        let cate_required =
            |m: &ProductEditModel| m.category_id.map(|cid| (_category::TABLE_LABEL, cid));
        match cmd {
            CatalogEditCommand::CreateCategory(m) => {
                let op = InMemEditOp::Create((&m).into());
                self.edit(_category::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::UpdateCategory(id, m) => {
                let op = InMemEditOp::Update(id, (&m).into());
                self.edit(_category::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::DeleteCategory(id) => {
                let op = InMemEditOp::Delete(id);
                self.edit(_category::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::CreateProduct(m) => {
                let op = InMemEditOp::Create((&m).into());
                self.edit(_product::TABLE_LABEL, op, cate_required(&m)).await
            }
            CatalogEditCommand::UpdateProduct(id, m) => {
                let op = InMemEditOp::Update(id, (&m).into());
                self.edit(_product::TABLE_LABEL, op, cate_required(&m)).await
            }
            CatalogEditCommand::DeleteProduct(id) => {
                let op = InMemEditOp::Delete(id);
                self.edit(_product::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::CreateNeighborhood(m) => {
                let op = InMemEditOp::Create((&m).into());
                self.edit(_neighborhood::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::UpdateNeighborhood(id, m) => {
                let op = InMemEditOp::Update(id, (&m).into());
                self.edit(_neighborhood::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::DeleteNeighborhood(id) => {
                let op = InMemEditOp::Delete(id);
                self.edit(_neighborhood::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::CreatePayMethod(m) => {
                let op = InMemEditOp::Create((&m).into());
                self.edit(_pay_method::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::UpdatePayMethod(id, m) => {
                let op = InMemEditOp::Update(id, (&m).into());
                self.edit(_pay_method::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::DeletePayMethod(id) => {
                let op = InMemEditOp::Delete(id);
                self.edit(_pay_method::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::CreateBanner(m) => {
                let op = InMemEditOp::Create((&m).into());
                self.edit(_banner::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::UpdateBanner(id, m) => {
                let op = InMemEditOp::Update(id, (&m).into());
                self.edit(_banner::TABLE_LABEL, op, None).await
            }
            CatalogEditCommand::DeleteBanner(id) => {
                let op = InMemEditOp::Delete(id);
                self.edit(_banner::TABLE_LABEL, op, None).await
            }
        }
    } // end of fn apply
} // end of impl AbsCatalogRepo
