//! Prometheus request metrics, compiled in with the `metrics` feature.
//!
//! Series are labelled by route pattern, so `/api/posts/{id}` is one series
//! however many posts exist. The scrape endpoint is `/metrics`.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

const NAMESPACE: &str = "chirp";
const ENDPOINT: &str = "/metrics";

/// The Prometheus registry could not be set up.
#[derive(Debug, thiserror::Error)]
#[error("failed to register Prometheus metrics: {0}")]
pub struct MetricsError(String);

/// Build the request-metrics middleware on a fresh registry.
pub(crate) fn build_metrics() -> Result<PrometheusMetrics, MetricsError> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .endpoint(ENDPOINT)
        .build()
        .map_err(|err| MetricsError(err.to_string()))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test as actix_test, web};

    use super::*;

    #[actix_web::test]
    async fn scrape_endpoint_counts_requests() {
        let metrics = build_metrics().expect("registry builds");
        let app = actix_test::init_service(App::new().wrap(metrics).route(
            "/api/posts/{id}",
            web::get().to(|| async { HttpResponse::Ok().finish() }),
        ))
        .await;

        for id in [1, 2] {
            let req = actix_test::TestRequest::get()
                .uri(&format!("/api/posts/{id}"))
                .to_request();
            actix_test::call_service(&app, req).await;
        }
        let scrape = actix_test::TestRequest::get().uri(ENDPOINT).to_request();
        let body = actix_test::call_and_read_body(&app, scrape).await;
        let text = String::from_utf8(body.to_vec()).expect("utf8 exposition");
        assert!(text.contains("chirp_http_requests_total"));
    }
}
