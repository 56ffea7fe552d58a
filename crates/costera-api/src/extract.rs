//! Caller identity extraction
//!
//! Authentication happens upstream (gateway or session layer); the engine
//! trusts the `X-User-Id` and `X-User-Role` headers it forwards. Every
//! handler takes the resulting context explicitly, never ambient state.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use costera_core::{AppError, RequestContext, Role};
use futures::future::{ready, Ready};
use uuid::Uuid;

/// The authenticated caller, extracted from forwarded identity headers
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub RequestContext);

impl Caller {
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

fn header<'r>(req: &'r HttpRequest, name: &str) -> Result<&'r str, AppError> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Authorization(format!("Missing {} header", name)))
}

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_context(req).map(Caller))
    }
}

fn extract_context(req: &HttpRequest) -> Result<RequestContext, AppError> {
    let user_id = header(req, "X-User-Id").and_then(|raw| {
        Uuid::parse_str(raw)
            .map_err(|_| AppError::Authorization("X-User-Id must be a UUID".to_string()))
    })?;

    let role = header(req, "X-User-Role").and_then(|raw| {
        Role::from_str(raw)
            .ok_or_else(|| AppError::Authorization(format!("Unknown role: {}", raw)))
    })?;

    Ok(RequestContext { user_id, role })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_extracts_valid_headers() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header(("X-User-Id", id.to_string()))
            .insert_header(("X-User-Role", "travel_company"))
            .to_http_request();

        let caller = Caller::extract(&req).await.unwrap();
        assert_eq!(caller.0.user_id, id);
        assert_eq!(caller.0.role, Role::TravelCompany);
    }

    #[actix_web::test]
    async fn test_missing_header_is_rejected() {
        let req = TestRequest::default()
            .insert_header(("X-User-Id", Uuid::new_v4().to_string()))
            .to_http_request();

        let err = Caller::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[actix_web::test]
    async fn test_bad_role_is_rejected() {
        let req = TestRequest::default()
            .insert_header(("X-User-Id", Uuid::new_v4().to_string()))
            .insert_header(("X-User-Role", "superadmin"))
            .to_http_request();

        let err = Caller::extract(&req).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }
}
