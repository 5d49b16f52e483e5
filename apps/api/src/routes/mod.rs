pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::intake::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::health_handler))
        .route("/processar_curriculo", post(handlers::handle_submission))
        .route("/download/:filename", get(handlers::handle_download))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::checkout::{CheckoutGateway, CheckoutRequest, CheckoutSession, PaymentError};
    use crate::config::{Config, NamePolicy};
    use crate::intake::form::{decode_submission, FormFields};
    use crate::render::{compose_to_vec, RenderOptions};
    use crate::storage::ArtifactStore;

    const MARIA_FORM: &str = "nome=Maria+Silva&telefone=%2811%29+91234-5678";
    const MARIA_FILE: &str = "curriculo_Maria_11912345678.pdf";

    #[derive(Default)]
    struct RecordingGateway {
        seen: Mutex<Vec<CheckoutRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl CheckoutGateway for RecordingGateway {
        async fn create_session(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, PaymentError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(PaymentError::MissingInitPoint);
            }
            let item = &request.items[0];
            Ok(CheckoutSession {
                id: Some("pref-test".to_string()),
                init_point: format!(
                    "https://checkout.test/pay?price={:.2}&currency={}",
                    item.unit_price, item.currency_id
                ),
            })
        }
    }

    fn test_state(dir: &tempfile::TempDir, config: Config) -> AppState {
        let store = ArtifactStore::open(dir.path(), Duration::from_secs(3600)).unwrap();
        AppState {
            render: Arc::new(RenderOptions::with_locale(config.locale)),
            config,
            store: Arc::new(store),
            checkout: None,
        }
    }

    fn submit(form: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/processar_curriculo")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::HOST, "api.test")
            .body(Body::from(form.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn location(response: &Response) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[tokio::test]
    async fn test_health_reports_online() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let response = app.oneshot(get_req("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["status"], "online");
        assert_eq!(json["service"], "API Info Center");
    }

    #[tokio::test]
    async fn test_without_payment_redirects_to_download_and_serves_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, Config::default());
        let app = build_router(state.clone());

        let response = app.clone().oneshot(submit(MARIA_FORM)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert_eq!(target, format!("/download/{MARIA_FILE}"));

        let download = app.oneshot(get_req(&target)).await.unwrap();
        assert_eq!(download.status(), StatusCode::OK);
        assert_eq!(
            download.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let disposition = download
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains(MARIA_FILE));

        let served = body_bytes(download).await;
        let fields = FormFields::from_pairs([("nome", "Maria Silva"), ("telefone", "(11) 91234-5678")]);
        let expected = compose_to_vec(&decode_submission(&fields).record, &state.render).unwrap();
        assert_eq!(served, expected);

        let text = pdf_extract::extract_text_from_mem(&served).unwrap();
        assert!(text.contains("MARIA SILVA"));
        assert!(text.contains("Tel: (11) 91234-5678"));
    }

    #[tokio::test]
    async fn test_with_payment_redirects_to_checkout() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(RecordingGateway::default());
        let mut state = test_state(&dir, Config::default());
        state.checkout = Some(gateway.clone() as Arc<dyn CheckoutGateway>);
        let app = build_router(state);

        let response = app.oneshot(submit(MARIA_FORM)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(&response);
        assert!(target.starts_with("https://checkout.test/pay"));
        assert!(target.contains("15.00"));
        assert!(target.contains("BRL"));

        let seen = gateway.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].back_urls.success,
            format!("http://api.test/download/{MARIA_FILE}")
        );
        assert_eq!(seen[0].back_urls.failure, Config::default().checkout_return_url);
        assert!(dir.path().join(MARIA_FILE).exists());
    }

    #[tokio::test]
    async fn test_checkout_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(RecordingGateway {
            fail: true,
            ..Default::default()
        });
        let mut state = test_state(&dir, Config::default());
        state.checkout = Some(gateway as Arc<dyn CheckoutGateway>);
        let response = build_router(state)
            .oneshot(submit(MARIA_FORM))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["error"]["code"], "PAYMENT_ERROR");
    }

    #[tokio::test]
    async fn test_missing_artifact_is_404_with_retry_hint() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let response = app
            .oneshot(get_req("/download/curriculo_Nobody_0.pdf"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(
            json["error"]["message"],
            crate::errors::ARTIFACT_NOT_FOUND_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_download_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let response = app
            .oneshot(get_req("/download/..%2Fsecret.txt"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resubmission_overwrites_same_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let first = app.clone().oneshot(submit(MARIA_FORM)).await.unwrap();
        let second = app
            .clone()
            .oneshot(submit(&format!("{MARIA_FORM}&objetivo=Crescer")))
            .await
            .unwrap();
        assert_eq!(location(&first), location(&second));
        let pdfs = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".pdf"))
            .count();
        assert_eq!(pdfs, 1);
    }

    #[tokio::test]
    async fn test_unusable_host_fails_before_anything_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let request = Request::builder()
            .method("POST")
            .uri("/processar_curriculo")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::HOST, "bad host")
            .body(Body::from(MARIA_FORM))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_reject_policy_returns_400_without_name() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            name_policy: NamePolicy::Reject,
            ..Default::default()
        };
        let app = build_router(test_state(&dir, config));
        let response = app.oneshot(submit("telefone=123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_fail_soft_policy_accepts_missing_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let response = app.oneshot(submit("telefone=123")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/download/curriculo_Cliente_123.pdf");
    }

    #[tokio::test]
    async fn test_repeated_groups_render_through_the_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&dir, Config::default()));
        let form = format!(
            "{MARIA_FORM}&exp_empresa%5B%5D=Acme&exp_empresa%5B%5D=&exp_empresa%5B%5D=Globex\
             &exp_cargo%5B%5D=Dev&exp_cargo%5B%5D=Fantasma\
             &formacao_curso%5B%5D=ADS&formacao_ano%5B%5D=2020"
        );
        let response = app.clone().oneshot(submit(&form)).await.unwrap();
        let download = app.oneshot(get_req(&location(&response))).await.unwrap();
        let text = pdf_extract::extract_text_from_mem(&body_bytes(download).await).unwrap();
        assert!(text.contains("Acme"));
        assert!(text.contains("Globex"));
        assert!(!text.contains("Fantasma"));
        assert!(text.contains("ADS"));
        assert!(text.contains("Conclus"));
    }
}
