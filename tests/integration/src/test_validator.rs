//! Validator middleware over a real HTTP connection.

#[cfg(test)]
mod tests {
    use http_body_util::Full;
    use signurl_auth::{DigestEncoding, SignerConfig, SigningAlgorithm, signed_url, signed_url_at};
    use signurl_http::{SignedUrlValidator, ValidatorPolicy};

    use crate::{EchoService, spawn_server, spawn_validated_server};

    fn config() -> SignerConfig {
        SignerConfig::new("mySuperSecurePrivateKey").unwrap()
    }

    #[tokio::test]
    async fn test_should_serve_valid_signed_url() {
        let server = spawn_validated_server(config()).await;
        let signed = signed_url(&config(), &server.url("/files/report.pdf?id=50")).unwrap();

        let resp = reqwest::get(&signed).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.text().await.unwrap(), "ok /files/report.pdf");
    }

    #[tokio::test]
    async fn test_should_forbid_tampered_url() {
        let server = spawn_validated_server(config()).await;
        let signed = signed_url(&config(), &server.url("/files/report.pdf?id=50")).unwrap();
        let tampered = signed.replacen("id=50", "id=51", 1);

        let resp = reqwest::get(&tampered).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["error"], "invalid_signature");
    }

    #[tokio::test]
    async fn test_should_forbid_appended_characters() {
        let server = spawn_validated_server(config()).await;
        let signed = signed_url(&config(), &server.url("/files/report.pdf?id=50")).unwrap();

        let resp = reqwest::get(format!("{signed}t")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_forbid_trailing_empty_query_segments() {
        let server = spawn_validated_server(config()).await;
        let signed = signed_url(&config(), &server.url("/files/report.pdf?id=50")).unwrap();

        for suffix in ["&", "&&"] {
            let resp = reqwest::get(format!("{signed}{suffix}")).await.unwrap();
            assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN, "suffix {suffix:?}");
        }
    }

    #[tokio::test]
    async fn test_should_serve_url_minted_with_uppercase_scheme() {
        let server = spawn_validated_server(config()).await;
        let minted = server.url("/files/report.pdf").replacen("http://", "HTTP://", 1);
        let signed = signed_url(&config(), &minted).unwrap();

        let resp = reqwest::get(&signed).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_forbid_unsigned_url() {
        let server = spawn_validated_server(config()).await;
        let resp = reqwest::get(server.url("/files/report.pdf")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_answer_gone_for_expired_url() {
        let config = config().with_ttl_seconds(1).unwrap();
        let server = spawn_validated_server(config.clone()).await;
        let signed = signed_url_at(&config, &server.url("/files/report.pdf"), 0).unwrap();

        let resp = reqwest::get(&signed).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::GONE);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["error"], "expired");
    }

    #[tokio::test]
    async fn test_should_forbid_expired_url_with_forged_expiry() {
        let config = config().with_ttl_seconds(1).unwrap();
        let server = spawn_validated_server(config.clone()).await;
        let signed = signed_url_at(&config, &server.url("/files/report.pdf"), 0).unwrap();
        let extended = signed.replacen("expires=1", "expires=99999999999", 1);

        let resp = reqwest::get(&extended).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_should_serve_url_without_expiry_when_ttl_is_zero() {
        let config = config().with_ttl_seconds(0).unwrap();
        let server = spawn_validated_server(config.clone()).await;
        let signed = signed_url(&config, &server.url("/forever")).unwrap();
        assert!(!signed.contains("expires="));

        let resp = reqwest::get(&signed).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_serve_with_non_default_algorithm_and_encoding() {
        let config = config()
            .with_algorithm(SigningAlgorithm::Sha512)
            .with_digest_encoding(DigestEncoding::Hex);
        let server = spawn_validated_server(config.clone()).await;
        let signed = signed_url(&config, &server.url("/a%20b.txt?owner=x%2By")).unwrap();

        let resp = reqwest::get(&signed).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_should_use_custom_rejection_responses() {
        let config = config().with_ttl_seconds(1).unwrap();
        let policy = ValidatorPolicy::new()
            .on_invalid(|_| {
                http::Response::builder()
                    .status(http::StatusCode::UNAUTHORIZED)
                    .body(Full::default())
                    .unwrap()
            })
            .on_expired(|_| {
                http::Response::builder()
                    .status(http::StatusCode::SEE_OTHER)
                    .header("Location", "/renew")
                    .body(Full::default())
                    .unwrap()
            });
        let server =
            spawn_server(SignedUrlValidator::new(EchoService, config.clone()).with_policy(policy))
                .await;
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        let resp = client.get(server.url("/x")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

        let expired = signed_url_at(&config, &server.url("/x"), 0).unwrap();
        let resp = client.get(&expired).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/renew");
    }
}
