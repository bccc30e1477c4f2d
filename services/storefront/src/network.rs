use std::future::Future;
use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs};
use std::result::Result as DefaultResult;

use axum::routing::IntoMakeService;
use axum::Router;
use hyper::server::conn::AddrIncoming;

use storefront_common::config::{WebApiListenCfg, WebApiRouteCfg};

use crate::api::web::{ApiRouteTableType, ApiRouteType};
use crate::error::{AppError, AppErrorCode};
use crate::AppSharedState;

pub type WebApiServer = axum::Server<AddrIncoming, IntoMakeService<Router>>;

pub fn generate_webapi_route(
    cfg: &WebApiListenCfg,
    rtable: ApiRouteTableType,
) -> (u16, Router<AppSharedState>) {
    // state type should be explicitly annotated, since this application creates a
    // router first then specify the state later in different scope.
    let mut router: Router<AppSharedState> = Router::new();
    let filt_fn = |&item: &&WebApiRouteCfg| -> bool {
        let hdlr_label = item.handler.as_str();
        rtable.contains_key(hdlr_label)
    };
    let mut num_applied: u16 = 0;
    for item in cfg.routes.iter().filter(filt_fn) {
        let hdlr_label = item.handler.as_str();
        if let Some(route) = rtable.get(hdlr_label) {
            let route_cpy: ApiRouteType = route.clone();
            router = router.route(item.path.as_str(), route_cpy);
            num_applied += 1u16;
        } // a path may serve several handlers with different methods
    }
    let router = if num_applied > 0 {
        let api_ver_path = String::from("/") + &cfg.api_version;
        Router::new().nest(api_ver_path.as_str(), router)
    } else {
        router
    };
    (num_applied, router)
} // end of fn generate_webapi_route

pub fn generate_webapi_server(
    cfg: &WebApiListenCfg,
    router: Router<()>,
) -> DefaultResult<WebApiServer, AppError> {
    let mut domain_host = cfg.host.clone();
    if !domain_host.contains(':') {
        domain_host += ":0";
    }
    let iterator = domain_host.to_socket_addrs().map_err(|e| AppError {
        detail: Some(e.to_string() + ", domain_host:" + &domain_host),
        code: AppErrorCode::IOerror(ErrorKind::AddrNotAvailable),
    })?; // IP not found after domain name resolution
    for a in iterator {
        let mut addr: SocketAddr = a;
        addr.set_port(cfg.port);
        if let Ok(b) = axum::Server::try_bind(&addr) {
            // the router has to carry its state already, axum converts it to
            // a service only when the state type parameter becomes `()`
            let service = router.into_make_service();
            return Ok(b.serve(service));
        }
    }
    Err(AppError {
        detail: Some("failed to bound with all IPs".to_string()),
        code: AppErrorCode::IOerror(ErrorKind::AddrInUse),
    })
} // end of fn generate_webapi_server

pub async fn run_until_shutdown<F>(server: WebApiServer, signal: F) -> DefaultResult<(), AppError>
where
    F: Future<Output = ()>,
{
    server
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| AppError {
            detail: Some(e.to_string()),
            code: AppErrorCode::IOerror(ErrorKind::Interrupted),
        })
}

pub mod middleware {
    use std::fs::File;
    use std::str::FromStr;
    use std::time::Duration;

    use axum::extract::DefaultBodyLimit;
    use axum::http;
    use serde::Deserialize;
    use tower::limit::GlobalConcurrencyLimitLayer;
    use tower_http::cors::CorsLayer;

    use super::{AppError, AppErrorCode, DefaultResult};

    #[derive(Deserialize)]
    struct CorsAllowedOrigin {
        storefront: String,
    }

    #[allow(non_snake_case)]
    #[derive(Deserialize)]
    struct CorsConfig {
        ALLOWED_ORIGIN: CorsAllowedOrigin,
        ALLOWED_METHODS: Vec<String>,
        ALLOWED_HEADERS: Vec<String>,
        ALLOW_CREDENTIALS: bool,
        PREFLIGHT_MAX_AGE: u64,
    }

    pub fn cors(cfg_path: String) -> DefaultResult<CorsLayer, AppError> {
        let f = File::open(cfg_path).map_err(|e| AppError {
            detail: Some(e.to_string()),
            code: AppErrorCode::IOerror(e.kind()),
        })?;
        let val = serde_json::from_reader::<File, CorsConfig>(f).map_err(|e| AppError {
            detail: Some(e.to_string()),
            code: AppErrorCode::InvalidJsonFormat,
        })?;
        let methods = val
            .ALLOWED_METHODS
            .iter()
            .filter_map(|m| http::Method::from_bytes(m.as_bytes()).ok())
            .collect::<Vec<http::Method>>();
        if val.ALLOWED_METHODS.len() > methods.len() {
            return Err(AppError {
                detail: Some("invalid-allowed-method".to_string()),
                code: AppErrorCode::InvalidInput,
            });
        }
        let headers = val
            .ALLOWED_HEADERS
            .iter()
            .filter_map(|h| http::HeaderName::from_str(h.as_str()).ok())
            .collect::<Vec<http::HeaderName>>();
        if val.ALLOWED_HEADERS.len() > headers.len()
            || !headers.contains(&http::header::CONTENT_TYPE)
            || !headers.contains(&http::header::ACCEPT)
        {
            return Err(AppError {
                detail: Some("invalid-allowed-header".to_string()),
                code: AppErrorCode::InvalidInput,
            });
        }
        let origin = val
            .ALLOWED_ORIGIN
            .storefront
            .parse::<http::HeaderValue>()
            .map_err(|e| AppError {
                detail: Some(format!("invalid-origin-header: {}", e)),
                code: AppErrorCode::InvalidInput,
            })?;
        let co = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(headers)
            .allow_credentials(val.ALLOW_CREDENTIALS)
            .max_age(Duration::from_secs(val.PREFLIGHT_MAX_AGE));
        Ok(co)
    } // end of fn cors

    pub fn req_body_limit(limit: usize) -> DefaultBodyLimit {
        DefaultBodyLimit::max(limit)
    }

    // shared by all connections, unlike rate limiter it can be cloned into
    // each route service
    pub fn conn_limit(max_conn: u32) -> GlobalConcurrencyLimitLayer {
        GlobalConcurrencyLimitLayer::new(max_conn as usize)
    }
} // end of mod middleware
