use std::boxed::Box;
use std::collections::HashMap;
use std::env;

use tokio::runtime::Builder as RuntimeBuilder;
use tower_http::cors::CorsLayer;

use storefront::api::web::route_table;
use storefront::constant::{limit, EXPECTED_ENV_VAR_LABELS};
use storefront::network::{generate_webapi_route, generate_webapi_server, middleware, run_until_shutdown};
use storefront::AppSharedState;
use storefront_common::confidentiality::{self, AbstractConfidentiality};
use storefront_common::config::{AppCfgHardLimit, AppCfgInitArgs, AppConfig};
use storefront_common::logging::{app_log_event, AppLogContext, AppLogLevel};

async fn shutdown_signal() {
    // error on signal registration is treated as an immediate shutdown request
    let _ = tokio::signal::ctrl_c().await;
}

async fn start_server(shr_state: AppSharedState) {
    let log_ctx_p = shr_state.log_context().clone();
    let cfg = shr_state.config().clone();
    let listener = &cfg.api_server.listen;
    let (num_applied, router) = generate_webapi_route(listener, route_table());
    if num_applied == 0 {
        app_log_event!(
            log_ctx_p,
            AppLogLevel::ERROR,
            "no route created, web API server failed to start"
        );
        return;
    }
    let co = match middleware::cors(cfg.basepath.system.clone() + "/" + listener.cors.as_str()) {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(log_ctx_p, AppLogLevel::ERROR, "cors layer init error, {}", e);
            CorsLayer::new()
        }
    };
    let router = router
        .layer(middleware::req_body_limit(cfg.api_server.limit_req_body_in_bytes))
        .layer(co)
        .layer(middleware::conn_limit(listener.max_connections))
        .with_state(shr_state);
    match generate_webapi_server(listener, router) {
        Ok(server) => {
            app_log_event!(
                log_ctx_p,
                AppLogLevel::INFO,
                "API server listening, port:{}",
                listener.port
            );
            if let Err(e) = run_until_shutdown(server, shutdown_signal()).await {
                app_log_event!(log_ctx_p, AppLogLevel::ERROR, "API server stopped, {}", e);
            }
            app_log_event!(log_ctx_p, AppLogLevel::WARNING, "API server terminating");
        }
        Err(e) => {
            app_log_event!(log_ctx_p, AppLogLevel::ERROR, "API server failed to start, {}", e);
        }
    }
} // end of fn start_server

fn start_async_runtime(cfg: AppConfig, confidential: Box<dyn AbstractConfidentiality>) {
    let log_ctx = match AppLogContext::new(&cfg.basepath, &cfg.api_server.logging) {
        Ok(v) => v,
        Err(e) => {
            println!("app failed to init logging, {}", e);
            return;
        }
    };
    let shr_state = AppSharedState::new(cfg, log_ctx, confidential);
    let cfg = shr_state.config();
    let log_ctx = shr_state.log_context().clone();
    let log_ctx2 = log_ctx.clone();
    let stack_nbytes: usize = (cfg.api_server.stack_sz_kb as usize) << 10;
    let result = RuntimeBuilder::new_multi_thread()
        .worker_threads(cfg.api_server.num_workers as usize)
        .on_thread_start(move || {
            let log_cpy = log_ctx.clone();
            app_log_event!(log_cpy, AppLogLevel::INFO, "[API server] worker started");
        })
        .on_thread_stop(move || {
            let log_cpy = log_ctx2.clone();
            app_log_event!(log_cpy, AppLogLevel::INFO, "[API server] worker terminating");
        })
        .thread_stack_size(stack_nbytes)
        .thread_name("web-api-worker")
        .enable_io()
        .enable_time()
        .build();
    match result {
        Ok(rt) => {
            rt.block_on(async move {
                start_server(shr_state).await;
            });
        }
        Err(e) => {
            let log_ctx_p = shr_state.log_context();
            app_log_event!(log_ctx_p, AppLogLevel::ERROR, "async runtime failed to build, {}", e);
        }
    };
} // end of fn start_async_runtime

fn main() {
    let iter = env::vars().filter(|(k, _v)| EXPECTED_ENV_VAR_LABELS.contains(&k.as_str()));
    let args = AppCfgInitArgs {
        env_var_map: HashMap::from_iter(iter),
        limit: AppCfgHardLimit {
            nitems_per_inmem_table: limit::MAX_ITEMS_STORED_PER_MODEL,
            num_db_conns: limit::MAX_DB_CONNECTIONS,
            seconds_db_idle: limit::MAX_SECONDS_DB_IDLE,
        },
    };
    match AppConfig::new(args) {
        Ok(cfg) => match confidentiality::build_context(&cfg) {
            Ok(confidential) => start_async_runtime(cfg, confidential),
            Err(e) => {
                println!("app failed to init confidentiality handler, {}", e);
            }
        },
        Err(e) => {
            println!("app failed to configure, {}", e);
        }
    };
} // end of fn main
