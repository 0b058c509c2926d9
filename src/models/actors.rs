//! 请求主体
//!
//! 由认证层解析出的调用者身份，核心服务只依赖显式传入的 [`Actor`]，
//! 从不读取任何全局的“当前用户”。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Student,
    Teacher,
    Admin,
    DeptManager,
}

impl ActorRole {
    /// 可以管理任意考试的角色
    pub fn is_supervisor(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::DeptManager)
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, ActorRole::Student)
    }

    /// 教职角色（可访问监考与阅卷接口）
    pub fn staff_roles() -> &'static [&'static ActorRole] {
        &[&ActorRole::Teacher, &ActorRole::Admin, &ActorRole::DeptManager]
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorRole::Student => "STUDENT",
            ActorRole::Teacher => "TEACHER",
            ActorRole::Admin => "ADMIN",
            ActorRole::DeptManager => "DEPT_MANAGER",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(ActorRole::Student),
            "TEACHER" => Ok(ActorRole::Teacher),
            "ADMIN" => Ok(ActorRole::Admin),
            "DEPT_MANAGER" => Ok(ActorRole::DeptManager),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// 已认证的调用者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: i64, role: ActorRole) -> Self {
        Self { id, role }
    }

    pub fn student(id: i64) -> Self {
        Self::new(id, ActorRole::Student)
    }

    pub fn teacher(id: i64) -> Self {
        Self::new(id, ActorRole::Teacher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_claims_string() {
        for role in [
            ActorRole::Student,
            ActorRole::Teacher,
            ActorRole::Admin,
            ActorRole::DeptManager,
        ] {
            assert_eq!(role.to_string().parse::<ActorRole>().unwrap(), role);
        }
        assert_eq!("teacher".parse::<ActorRole>().unwrap(), ActorRole::Teacher);
        assert!("guest".parse::<ActorRole>().is_err());
    }

    #[test]
    fn test_supervisor_roles() {
        assert!(ActorRole::Admin.is_supervisor());
        assert!(ActorRole::DeptManager.is_supervisor());
        assert!(!ActorRole::Teacher.is_supervisor());
    }
}
