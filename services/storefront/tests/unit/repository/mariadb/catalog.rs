use rust_decimal::Decimal;

use storefront::error::AppErrorCode;
use storefront::model::{
    BannerEditModel, CatalogEditCommand, CatalogItemKind, CatalogItemModel, ProductEditModel,
};
use storefront::repository::app_repo_catalog;

use super::dstore_ctx_setup;

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn banner_edit_fetch_ok() {
    let ds = dstore_ctx_setup();
    let repo = app_repo_catalog(ds).await.unwrap();
    let data = BannerEditModel {
        title: "Combo da semana".to_string(),
        image_url: "/img/combo.png".to_string(),
        position: 7,
        active: false,
    };
    let bid = repo
        .apply(CatalogEditCommand::CreateBanner(data.clone()))
        .await
        .unwrap();
    let item = repo.fetch_item(CatalogItemKind::Banner, bid).await.unwrap();
    match item {
        Some(CatalogItemModel::Banner(b)) => {
            assert_eq!(b.id, bid);
            assert_eq!(b.title.as_str(), "Combo da semana");
            assert_eq!(b.position, 7);
            assert!(!b.active);
        }
        _others => panic!("expect banner"),
    }
    let mut data = data;
    data.active = true;
    data.position = -2;
    repo.apply(CatalogEditCommand::UpdateBanner(bid, data))
        .await
        .unwrap();
    let banners = repo.fetch_banners().await.unwrap();
    let saved = banners.iter().find(|b| b.id == bid).unwrap();
    assert_eq!(saved.position, -2);
    assert!(saved.active);
    repo.apply(CatalogEditCommand::DeleteBanner(bid))
        .await
        .unwrap();
    let item = repo.fetch_item(CatalogItemKind::Banner, bid).await.unwrap();
    assert!(item.is_none());
    let e = repo
        .apply(CatalogEditCommand::DeleteBanner(bid))
        .await
        .err()
        .unwrap();
    assert_eq!(e.code, AppErrorCode::CatalogItemNotExist);
} // end of fn banner_edit_fetch_ok

#[cfg(feature = "mariadb")]
#[tokio::test]
async fn product_unknown_category_nothing_saved() {
    let ds = dstore_ctx_setup();
    let repo = app_repo_catalog(ds).await.unwrap();
    let data = ProductEditModel {
        name: "Pastel".to_string(),
        description: Some("queijo".to_string()),
        price: Decimal::new(900, 2),
        image_url: None,
        category_id: Some(u32::MAX),
        active: true,
    };
    let e = repo
        .apply(CatalogEditCommand::CreateProduct(data))
        .await
        .err()
        .unwrap();
    assert_eq!(e.code, AppErrorCode::CatalogItemNotExist);
    assert_eq!(e.detail, Some(format!("category:{}", u32::MAX)));
    let item = repo
        .fetch_item(CatalogItemKind::Category, u32::MAX)
        .await
        .unwrap();
    assert!(item.is_none());
}
