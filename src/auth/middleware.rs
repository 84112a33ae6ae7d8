use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Claims, JwtService};
use crate::error::AppError;

/// Verifies the bearer token of every request it wraps.
///
/// On success the decoded `Claims` are stored in the request extensions, where the
/// `AuthenticatedUser` and `AdminUser` extractors pick them up. On failure the
/// request is answered with a 401 JSON error and the inner service is never called.
///
/// The verifier is looked up from `web::Data<JwtService>` app data.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

/// Extracts the raw token from an `Authorization` header value.
fn bearer_token(req: &ServiceRequest) -> Result<&str, AppError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Authorization header missing".into()))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => Ok(*token),
        _ => Err(AppError::Unauthorized(
            "Invalid Authorization header format".into(),
        )),
    }
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let token = bearer_token(req)?;
    let jwt = req
        .app_data::<web::Data<JwtService>>()
        .ok_or_else(|| AppError::InternalServerError("JWT service not configured".into()))?;

    jwt.verify_token(token).map_err(|e| {
        log::warn!("Rejected token for {} {}: {}", req.method(), req.path(), e);
        AppError::Unauthorized("Invalid or expired token".into())
    })
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                let response = req.into_response(app_err.error_response());
                Box::pin(async move { Ok(response.map_into_right_body()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App, HttpRequest, HttpResponse};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &str = "supersecretkeyforunittests123";

    fn sign(claims: Value, secret: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_an_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    async fn echo_claims(req: HttpRequest) -> HttpResponse {
        let claims = req.extensions().get::<Claims>().cloned().unwrap();
        HttpResponse::Ok().json(json!({ "username": claims.username, "role": claims.role }))
    }

    #[actix_rt::test]
    async fn test_auth_middleware() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(JwtService::new(SECRET)))
                .service(
                    web::resource("/")
                        .wrap(AuthMiddleware)
                        .route(web::get().to(echo_claims)),
                ),
        )
        .await;

        // Same claims, but the header claims RS256.
        let hs256 = sign(
            json!({ "username": "testuser", "role": "regular", "exp": in_an_hour() }),
            SECRET,
        );
        let payload = hs256.split('.').nth(1).unwrap();
        let rs256 = format!(
            "Bearer eyJhbGciOiJSUzI1NiIsInR5cCI6IkpXVCJ9.{}.fakesignature",
            payload
        );

        let rejected = vec![
            ("missing header", None, "Authorization header missing"),
            ("empty header", Some(String::new()), "Authorization header missing"),
            (
                "no bearer",
                Some("InvalidToken".to_string()),
                "Invalid Authorization header format",
            ),
            (
                "bearer without token",
                Some("Bearer".to_string()),
                "Invalid Authorization header format",
            ),
            (
                "wrong scheme",
                Some("Basic dXNlcjpwYXNz".to_string()),
                "Invalid Authorization header format",
            ),
            (
                "malformed jwt",
                Some("Bearer abc.def.ghi".to_string()),
                "Invalid or expired token",
            ),
            (
                "expired jwt",
                Some(format!(
                    "Bearer {}",
                    sign(
                        json!({ "username": "u", "role": "regular", "exp": chrono::Utc::now().timestamp() - 3600 }),
                        SECRET
                    )
                )),
                "Invalid or expired token",
            ),
            (
                "wrong secret",
                Some(format!(
                    "Bearer {}",
                    sign(
                        json!({ "username": "attacker", "role": "admin", "exp": in_an_hour() }),
                        "another_secret_key_different_from_test_secret"
                    )
                )),
                "Invalid or expired token",
            ),
            ("unexpected algorithm", Some(rs256), "Invalid or expired token"),
        ];

        for (description, header_value, expected) in rejected {
            let mut req = test::TestRequest::get().uri("/");
            if let Some(value) = header_value {
                req = req.insert_header((header::AUTHORIZATION, value));
            }
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", description);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "error": expected }), "{}", description);
        }

        let accepted = vec![
            (
                json!({ "username": "user1", "role": "regular", "exp": in_an_hour() }),
                "user1",
                "regular",
            ),
            (
                json!({ "username": "admin1", "role": "admin", "exp": in_an_hour() }),
                "admin1",
                "admin",
            ),
            (json!({ "role": "regular", "exp": in_an_hour() }), "", "regular"),
            (
                json!({ "username": "userWithoutRole", "exp": in_an_hour() }),
                "userWithoutRole",
                "",
            ),
        ];

        for (claims, username, role) in accepted {
            let req = test::TestRequest::get()
                .uri("/")
                .insert_header((
                    header::AUTHORIZATION,
                    format!("bearer {}", sign(claims, SECRET)),
                ))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "username": username, "role": role }));
        }
    }
}
