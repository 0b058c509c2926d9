use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体（令牌由外部认证服务签发，本服务只校验）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型: "access" 或 "refresh"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

pub struct JwtUtils;

impl JwtUtils {
    // 获取 JWT 密钥
    fn get_secret() -> String {
        AppConfig::get().jwt.secret.clone()
    }

    // 使用指定密钥验证 token
    pub fn verify_token_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        decode::<Claims>(token, &decoding_key, &validation).map(|token_data| token_data.claims)
    }

    // 验证 token 是否为 access 类型
    pub fn verify_access_token_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let claims = Self::verify_token_with_secret(token, secret)?;
        if claims.token_type != "access" {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }

    // 验证 Access Token
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_access_token_with_secret(token, &Self::get_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn sign(token_type: &str, secret: &str) -> String {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: "42".into(),
            role: "TEACHER".into(),
            token_type: token_type.into(),
            exp: (now + chrono::Duration::minutes(5)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    #[test]
    fn test_access_token_accepted() {
        let claims = JwtUtils::verify_access_token_with_secret(&sign("access", "s3"), "s3").unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, "TEACHER");
    }

    #[test]
    fn test_refresh_token_rejected() {
        assert!(JwtUtils::verify_access_token_with_secret(&sign("refresh", "s3"), "s3").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        assert!(JwtUtils::verify_access_token_with_secret(&sign("access", "s3"), "other").is_err());
    }
}
