//! Exam Proctor - 在线考试答题、阅卷与实时监考后端服务
//!
//! 基于 Actix Web 构建，核心是一台答卷状态机：
//! 开考资格校验、限时答题与自动保存、自动判分、人工阅卷与实时监考。
//!
//! # 架构
//! - `cache`: 考试目录缓存（Moka）
//! - `config`: 配置管理
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理与后台任务
//! - `services`: 业务逻辑层
//! - `storage`: 数据存储层（SeaORM / 内存）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod entity;
pub mod errors;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
