mod edit_catalog;
mod manage_order;
mod place_order;

pub use edit_catalog::{
    EditCatalogUsKsResult, EditCatalogUseCase, ListCatalogUseCase, RetrieveCatalogItemUsKsResult,
    RetrieveCatalogItemUseCase,
};
pub use manage_order::{
    ListOrdersUsKsResult, ListOrdersUseCase, OrderNotifyLinkUseCase, OrderNotifyUsKsResult,
    RetrieveOrderUsKsResult, RetrieveOrderUseCase, UpdateOrderStatusUsKsResult,
    UpdateOrderStatusUseCase,
};
pub use place_order::{PlaceOrderUsKsErr, PlaceOrderUseCase};

// only tail of phone number shows up in log messages
pub(crate) fn phone_log_hint(phone: &str) -> String {
    let digits = phone.chars().filter(char::is_ascii_digit).collect::<Vec<_>>();
    let start = digits.len().saturating_sub(4);
    format!("***{}", digits[start..].iter().collect::<String>())
}
