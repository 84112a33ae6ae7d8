use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::domain::Role;
use crate::error::AppError;

/// Claims of the caller, as verified by `AuthMiddleware`.
///
/// Fails with 401 when the middleware did not run for this route.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthorized("Authorization header missing".to_string());
                ready(Err(err.into()))
            }
        }
    }
}

/// Claims of a caller whose token carries the admin role.
///
/// Anything else, including a request without claims at all, is answered with 403.
/// List it before body extractors so the role check happens first.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

impl FromRequest for AdminUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) if claims.role == Role::Admin.as_str() => {
                ready(Ok(AdminUser(claims.clone())))
            }
            _ => {
                log::warn!("Admin access denied for {} {}", req.method(), req.path());
                ready(Err(AppError::Forbidden("Admin access only".to_string()).into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn claims(role: &str) -> Claims {
        Claims {
            username: "someone".to_string(),
            role: role.to_string(),
            exp: 0,
        }
    }

    #[actix_rt::test]
    async fn test_authenticated_user_extractor() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(claims("regular"));

        let extracted = AuthenticatedUser::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(extracted.0.username, "someone");

        let bare = test::TestRequest::default().to_http_request();
        let err = AuthenticatedUser::from_request(&bare, &mut Payload::None)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_admin_user_extractor() {
        for (role, allowed) in [("admin", true), ("regular", false), ("", false), ("Admin", false)] {
            let req = test::TestRequest::default().to_http_request();
            req.extensions_mut().insert(claims(role));

            let result = AdminUser::from_request(&req, &mut Payload::None).await;
            match (allowed, result) {
                (true, Ok(admin)) => assert_eq!(admin.0.role, "admin"),
                (false, Err(err)) => {
                    assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN, "{}", role)
                }
                (_, other) => panic!("unexpected result for role {:?}: {:?}", role, other.is_ok()),
            }
        }

        let bare = test::TestRequest::default().to_http_request();
        let err = AdminUser::from_request(&bare, &mut Payload::None)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::FORBIDDEN);
    }
}
