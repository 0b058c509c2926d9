/*!
 * JWT 认证中间件
 *
 * 令牌由外部认证服务签发，本服务只做校验：`sub` 为用户 ID，`role` 为角色。
 * 校验通过后把 [`Actor`] 放进请求扩展，处理程序再显式传给核心服务。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::scope("/api/v1/exam-taking")
 *     .wrap(RequireJWT)
 *     .route("/submissions/{id}", web::get().to(handler));
 *
 * async fn handler(req: HttpRequest) -> ActixResult<HttpResponse> {
 *     let actor = RequireJWT::extract_actor(&req);
 *     // ...
 * }
 * ```
 *
 * ## 认证流程
 *
 * 1. 客户端在请求头中包含 `Authorization: Bearer <JWT_TOKEN>`；
 *    浏览器的 WebSocket 无法设置请求头，改用查询参数 `?token=<JWT_TOKEN>`
 * 2. 中间件校验签名、过期时间与令牌类型
 * 3. 校验通过则写入请求扩展并继续处理，否则返回 401
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpRequest,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::{debug, info};

use super::create_error_response;
use crate::models::ErrorCode;
use crate::models::actors::{Actor, ActorRole};
use crate::utils::jwt::{Claims, JwtUtils};

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";
const TOKEN_QUERY_KEY: &str = "token=";

#[derive(Clone)]
pub struct RequireJWT;

// 辅助函数：从请求头或查询参数中取出令牌
fn extract_token(req: &ServiceRequest) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::to_string);

    from_header.or_else(|| {
        req.query_string()
            .split('&')
            .find_map(|pair| pair.strip_prefix(TOKEN_QUERY_KEY))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// 由令牌声明构造调用者
pub fn actor_from_claims(claims: &Claims) -> Result<Actor, String> {
    let id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| "Invalid user ID in JWT".to_string())?;
    let role = claims.role.parse::<ActorRole>()?;
    Ok(Actor::new(id, role))
}

// 辅助函数：提取并验证 JWT access token
fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<Actor, String> {
    let token =
        extract_token(req).ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let claims = JwtUtils::verify_access_token(&token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })?;

    actor_from_claims(&claims)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_validate_jwt(&req) {
                Ok(actor) => {
                    debug!(
                        "JWT authentication successful for ID: {} ({})",
                        actor.id, actor.role
                    );
                    req.extensions_mut().insert(actor);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中提取调用者
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_actor(req: &HttpRequest) -> Option<Actor> {
        req.extensions().get::<Actor>().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            token_type: "access".to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_actor_from_claims() {
        let actor = actor_from_claims(&claims("42", "TEACHER")).unwrap();
        assert_eq!(actor, Actor::teacher(42));
        assert!(actor_from_claims(&claims("abc", "TEACHER")).is_err());
        assert!(actor_from_claims(&claims("42", "JANITOR")).is_err());
    }

    #[test]
    fn test_token_from_header_wins_over_query() {
        let req = TestRequest::get()
            .uri("/api/v1/ws/exams/1?token=from-query")
            .insert_header((AUTHORIZATION_HEADER, "Bearer from-header"))
            .to_srv_request();
        assert_eq!(extract_token(&req).as_deref(), Some("from-header"));

        let req = TestRequest::get()
            .uri("/api/v1/ws/exams/1?foo=1&token=from-query")
            .to_srv_request();
        assert_eq!(extract_token(&req).as_deref(), Some("from-query"));

        let req = TestRequest::get().uri("/api/v1/ws/exams/1").to_srv_request();
        assert_eq!(extract_token(&req), None);
    }
}
