use axum::{extract::FromRequestParts, http::request::Parts};
use modkit::{unauthorized, ProblemResponse};

/// Header set by the upstream auth proxy. Trusted as-is.
pub const VERIFIED_IDENTITY_HEADER: &str = "x-verified-identity";

/// Caller identity taken from [`VERIFIED_IDENTITY_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity(pub String);

impl VerifiedIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(VERIFIED_IDENTITY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match value {
            Some(id) => Ok(Self(id.to_string())),
            None => {
                let mut resp = unauthorized(format!("missing {VERIFIED_IDENTITY_HEADER} header"));
                resp.0.instance = parts.uri.path().to_string();
                resp.0.code = "identity_missing".to_string();
                Err(resp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(req: Request<()>) -> Result<VerifiedIdentity, ProblemResponse> {
        let (mut parts, _) = req.into_parts();
        VerifiedIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn reads_trimmed_header() {
        let req = Request::builder()
            .uri("/matching/v1/profile")
            .header(VERIFIED_IDENTITY_HEADER, " ada@example.com ")
            .body(())
            .unwrap();
        let id = extract(req).await.unwrap();
        assert_eq!(id.as_str(), "ada@example.com");
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_401() {
        let req = Request::builder()
            .uri("/matching/v1/likes")
            .body(())
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert_eq!(err.0.status, StatusCode::UNAUTHORIZED.as_u16());
        assert_eq!(err.0.instance, "/matching/v1/likes");

        let req = Request::builder()
            .uri("/matching/v1/likes")
            .header(VERIFIED_IDENTITY_HEADER, "   ")
            .body(())
            .unwrap();
        assert!(extract(req).await.is_err());
    }
}
