use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;

/// Mount the operational endpoints next to the site routes.
pub(crate) fn with_ops_routes(site: Router) -> Router {
    site.route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::sample_listings;
    use crate::infra::SiteServices;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> (Router, SiteServices) {
        let services = SiteServices::in_memory(sample_listings(), "ops@example.com");
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
        };
        let router = with_ops_routes(services.router()).layer(Extension(state));
        (router, services)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_tracks_the_flag() {
        let (router, _) = app(false);
        let response = router
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ready");
    }

    #[tokio::test]
    async fn ops_routes_share_the_router_with_the_site() {
        let (router, services) = app(true);
        let response = router
            .clone()
            .oneshot(Request::get("/listings").body(Body::empty()).expect("request"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);

        let inquiry = "listing_id=1&listing=45+Drivewood+Circle&name=Sam&email=sam%40example.com\
                       &phone=555-0100&message=Viewing%3F&realtor_email=kyle%40estate-desk.local";
        let response = router
            .clone()
            .oneshot(
                Request::post("/contact")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(inquiry))
                    .expect("request"),
            )
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(services.outbox.events().len(), 1);
    }

    #[tokio::test]
    async fn inquiry_notifications_are_not_served_over_http() {
        let (router, services) = app(true);
        let inquiry = "listing_id=1&listing=45+Drivewood+Circle&name=Sam&email=sam%40example.com\
                       &phone=555-0100&message=Viewing%3F";
        router
            .clone()
            .oneshot(
                Request::post("/contact")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(inquiry))
                    .expect("request"),
            )
            .await
            .expect("responds");
        assert_eq!(services.outbox.events().len(), 1);

        for uri in ["/ops/notifications", "/ops/outbox"] {
            let response = router
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
                .await
                .expect("responds");
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body");
            let text = String::from_utf8_lossy(&bytes);
            assert!(!text.contains("555-0100"));
            assert!(!text.contains("sam@example.com"));
        }
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_prometheus_text() {
        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok()),
            Some("text/plain; version=0.0.4")
        );
    }
}
