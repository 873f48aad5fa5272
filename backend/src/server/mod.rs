//! HTTP server assembly: adapters, routes, and middleware.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

#[cfg(feature = "metrics")]
pub(crate) use metrics::build_metrics;
use state_builders::build_http_state;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tracing::info;

use chirp_backend::Trace;
use chirp_backend::inbound::http::configure_api;
use chirp_backend::inbound::http::health::{HealthState, live, ready};

/// Mount `/api`, the probes, and in debug builds the Swagger UI.
fn routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_api).service(ready).service(live);

    #[cfg(debug_assertions)]
    {
        use chirp_backend::ApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        cfg.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }
}

/// Bind the listener and start serving.
///
/// `health` flips to ready once the socket is bound; the caller flips it
/// back when shutdown begins.
///
/// # Errors
/// Returns the [`std::io::Error`] from binding `config.bind_addr`.
pub fn create_server(health: web::Data<HealthState>, config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);

    #[cfg(feature = "metrics")]
    let metrics = match config.prometheus {
        Some(metrics) => metrics,
        None => build_metrics().map_err(std::io::Error::other)?,
    };

    let probes = health.clone();
    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(probes.clone())
            .app_data(http_state.clone())
            .wrap(Trace)
            .configure(routes);

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());

        app
    })
    .bind(config.bind_addr)?
    .run();

    info!(addr = %config.bind_addr, "listener bound");
    health.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[case("/api/me", StatusCode::UNAUTHORIZED)]
    #[case("/api-docs/openapi.json", StatusCode::OK)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] path: &str, #[case] expected: StatusCode) {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        let state = build_http_state(&ServerConfig::new(addr, false));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(HealthState::new()))
                .app_data(state)
                .wrap(Trace)
                .configure(routes),
        )
        .await;

        let req = actix_test::TestRequest::get().uri(path).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), expected);
    }
}
