//! TFG authentication integration tests.

#[cfg(test)]
mod tests {
    use reqwest::{Method, StatusCode};
    use tfg_auth::client::RequestSigner;

    use crate::{http_client, now, send_signed, signer, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_request_without_authorization() {
        let response = http_client().get(url("/whoami")).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["www-authenticate"], "TFG");
        assert_eq!(response.text().await.unwrap(), "Unauthorized");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_malformed_authorization() {
        let response = http_client()
            .get(url("/whoami"))
            .header(reqwest::header::AUTHORIZATION, "TFG foobar")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.text().await.unwrap(),
            "Unprocessable Authorization header"
        );
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_accept_signed_get() {
        let client = http_client();
        let signer = signer().with_user_id("user-1");
        let response = send_signed(&client, &signer, Method::GET, "/whoami?page=2", b"", now())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["user_id"], "user-1");
        assert_eq!(json["path"], "/whoami");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_deliver_signed_body_to_handler() {
        let client = http_client();
        let response = send_signed(
            &client,
            &signer(),
            Method::POST,
            "/whoami",
            b"mybodydata",
            now(),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["body_bytes"], 10);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_stale_timestamp() {
        let client = http_client();
        let stale = now() - 4 * 3600 - 60;
        let response = send_signed(&client, &signer(), Method::GET, "/whoami", b"", stale)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_wrong_secret() {
        let client = http_client();
        let impostor = RequestSigner::new("integration", "not-the-secret");
        let response = send_signed(&client, &impostor, Method::GET, "/whoami", b"", now())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
