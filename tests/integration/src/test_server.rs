//! Tests against a running `signurl-server`.

#[cfg(test)]
mod tests {
    use signurl_auth::{SignerConfig, signed_url};

    use crate::{endpoint_url, secret_key};

    fn signer() -> anyhow::Result<SignerConfig> {
        Ok(SignerConfig::new(secret_key())?)
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_healthy() -> anyhow::Result<()> {
        let resp = reqwest::get(format!("{}/health", endpoint_url())).await?;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let json: serde_json::Value = resp.json().await?;
        assert_eq!(json["services"]["signurl"], "running");
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_grant_signed_resource() -> anyhow::Result<()> {
        let signed = signed_url(&signer()?, &format!("{}/files/a.txt?id=1", endpoint_url()))?;

        let resp = reqwest::get(&signed).await?;
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let json: serde_json::Value = resp.json().await?;
        assert_eq!(json["resource"], "/files/a.txt");
        assert_eq!(json["status"], "granted");
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_forbid_unsigned_resource() -> anyhow::Result<()> {
        let resp = reqwest::get(format!("{}/files/a.txt", endpoint_url())).await?;
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_forbid_resource_signed_with_other_key() -> anyhow::Result<()> {
        let other = SignerConfig::new("not-the-server-secret")?;
        let signed = signed_url(&other, &format!("{}/files/a.txt", endpoint_url()))?;

        let resp = reqwest::get(&signed).await?;
        assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
        Ok(())
    }
}
