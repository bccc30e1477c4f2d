use crate::WebApiHdlrLabel;

pub use storefront_common::constant::env_vars::EXPECTED_LABELS as EXPECTED_ENV_VAR_LABELS;

pub mod app_meta {
    pub const LABAL: &str = "storefront";
}

pub mod limit {
    pub const MAX_ITEMS_STORED_PER_MODEL: u32 = 2200u32;
    pub const MAX_ORDER_LINES_PER_REQUEST: usize = 200;
    pub const MAX_DB_CONNECTIONS: u32 = 10000u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 600u16;
}

pub(crate) mod api {
    use super::WebApiHdlrLabel;

    #[allow(non_camel_case_types)]
    pub(crate) struct web {}

    impl web {
        pub(crate) const CREATE_NEW_ORDER: WebApiHdlrLabel = "create_new_order";
        pub(crate) const RETRIEVE_ORDER: WebApiHdlrLabel = "retrieve_order";
        pub(crate) const LIST_ORDERS: WebApiHdlrLabel = "list_orders";
        pub(crate) const UPDATE_ORDER_STATUS: WebApiHdlrLabel = "update_order_status";
        pub(crate) const ORDER_NOTIFY_LINK: WebApiHdlrLabel = "order_notify_link";
        pub(crate) const LIST_CATALOG: WebApiHdlrLabel = "list_catalog";
        pub(crate) const EDIT_CATALOG: WebApiHdlrLabel = "edit_catalog";
        pub(crate) const RETRIEVE_CATALOG_ITEM: WebApiHdlrLabel = "retrieve_catalog_item";
    }
}

pub(crate) const HTTP_CONTENT_TYPE_JSON: &str = "application/json";

pub const WHATSAPP_DEEPLINK_BASE: &str = "https://api.whatsapp.com/send";

// fallback for order lines whose product was removed from catalog
pub const UNKNOWN_PRODUCT_NAME_PREFIX: &str = "produto #";
