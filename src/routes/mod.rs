pub mod exam_taking;

pub mod monitoring;

pub mod grading;

pub mod ws;

pub use exam_taking::configure_exam_taking_routes;
pub use grading::configure_grading_routes;
pub use monitoring::configure_monitoring_routes;
pub use ws::configure_ws_routes;

use actix_web::HttpRequest;

use crate::errors::{ExamError, Result};
use crate::middlewares::RequireJWT;
use crate::models::actors::Actor;

// 取出 RequireJWT 写入的调用者
pub(crate) fn current_actor(req: &HttpRequest) -> Result<Actor> {
    RequireJWT::extract_actor(req)
        .ok_or_else(|| ExamError::authentication("Unable to resolve the current user"))
}
