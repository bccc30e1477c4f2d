mod cart;
mod catalog;
mod currency;
mod notify;
mod order;

pub use cart::{CartAction, CartDeliveryChoice, CartItemModel, CartModel, CartStore};
pub use catalog::{
    BannerEditModel, BannerModel, CatalogEditCommand, CatalogItemKind, CatalogItemModel,
    CatalogModelSet, CategoryEditModel, CategoryModel, NeighborhoodEditModel, NeighborhoodModel,
    NeighborhoodModelSet, PayMethodEditModel, PayMethodModel, ProductEditModel, ProductModel,
};
pub use currency::{format_amount, line_total};
pub use notify::{build_deep_link, format_order_message, NotifyLinkModel};
pub use order::{
    CustomerContactModel, CustomerModel, OrderCreateModel, OrderDeliveryModel,
    OrderLineCreateModel, OrderLineModel, OrderModel, OrderStatus,
};
