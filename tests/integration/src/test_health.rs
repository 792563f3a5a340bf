//! Health endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{http_client, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_health_without_credentials() {
        let response = http_client().get(url("/health")).send().await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let json: serde_json::Value = response.json().await.unwrap();
        assert_eq!(json["status"], "running");
    }
}
