use std::collections::HashMap;

use axum::http::{
    header as HttpHeader, HeaderMap as HttpHeaderMap, HeaderValue as HttpHeaderValue,
    StatusCode as HttpStatusCode,
};
use axum::routing::{get, patch, post, MethodRouter};
use serde::Serialize;

use crate::constant::{api::web as WebConst, HTTP_CONTENT_TYPE_JSON};
use crate::{AppSharedState, WebApiHdlrLabel};

mod catalog;
pub mod dto;
mod order;

pub type ApiRouteType = MethodRouter<AppSharedState>;
pub type ApiRouteTableType = HashMap<WebApiHdlrLabel, ApiRouteType>;

pub fn route_table() -> ApiRouteTableType {
    let mut out: ApiRouteTableType = HashMap::new();
    out.insert(WebConst::CREATE_NEW_ORDER, post(order::create_handler));
    out.insert(WebConst::RETRIEVE_ORDER, get(order::retrieve_handler));
    out.insert(WebConst::LIST_ORDERS, get(order::list_handler));
    out.insert(WebConst::UPDATE_ORDER_STATUS, patch(order::update_status_handler));
    out.insert(WebConst::ORDER_NOTIFY_LINK, get(order::notify_link_handler));
    out.insert(WebConst::LIST_CATALOG, get(catalog::list_handler));
    out.insert(WebConst::EDIT_CATALOG, post(catalog::edit_handler));
    out.insert(WebConst::RETRIEVE_CATALOG_ITEM, get(catalog::retrieve_item_handler));
    out
}

pub(crate) const RESP_INTERNAL_ERROR: &str = r#"{"reason":"internal-error"}"#;

fn json_resp_header() -> HttpHeaderMap {
    let mut hdr_map = HttpHeaderMap::new();
    let resp_ctype_val = HttpHeaderValue::from_static(HTTP_CONTENT_TYPE_JSON);
    hdr_map.insert(HttpHeader::CONTENT_TYPE, resp_ctype_val);
    hdr_map
}

fn serialize_resp<T: Serialize>(status: HttpStatusCode, value: &T) -> (HttpStatusCode, String) {
    match serde_json::to_string(value) {
        Ok(s) => (status, s),
        Err(_) => (
            HttpStatusCode::INTERNAL_SERVER_ERROR,
            r#"{"reason":"serialization-faulire"}"#.to_string(),
        ),
    }
}

fn reason_resp(status: HttpStatusCode, reason: &str) -> (HttpStatusCode, String) {
    (status, format!(r#"{{"reason":"{reason}"}}"#))
}
