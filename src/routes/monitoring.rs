use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::current_actor;
use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::actors::ActorRole;
use crate::models::common::response::respond;
use crate::models::monitor::requests::RiskSignals;
use crate::models::submissions::requests::{PauseExamRequest, ResumeExamRequest};
use crate::services::{ExamSessionService, MonitorService};

// 暂停考试
pub async fn pause_exam(
    req: HttpRequest,
    sessions: web::Data<ExamSessionService>,
    path: web::Path<i64>,
    body: Option<web::Json<PauseExamRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let result = async {
        let actor = current_actor(&req)?;
        sessions.pause_exam(path.into_inner(), &actor, body).await
    }
    .await;
    Ok(respond(result, "Exam paused"))
}

// 恢复考试
pub async fn resume_exam(
    req: HttpRequest,
    sessions: web::Data<ExamSessionService>,
    path: web::Path<i64>,
    body: Option<web::Json<ResumeExamRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let result = async {
        let actor = current_actor(&req)?;
        sessions.resume_exam(path.into_inner(), &actor, body).await
    }
    .await;
    Ok(respond(result, "Exam resumed"))
}

// 考试实时快照
pub async fn live_snapshot(
    req: HttpRequest,
    monitor: web::Data<MonitorService>,
    path: web::Path<i64>, // exam_id
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        monitor.snapshot(path.into_inner(), &actor).await
    }
    .await;
    Ok(respond(result, "Live snapshot generated"))
}

// 进行中的答卷
pub async fn active_sessions(
    req: HttpRequest,
    monitor: web::Data<MonitorService>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        monitor.active_sessions(&actor).await
    }
    .await;
    Ok(respond(result, "Active sessions loaded"))
}

// 风险评估
pub async fn assess_risk(
    req: HttpRequest,
    monitor: web::Data<MonitorService>,
    body: web::Json<RiskSignals>,
) -> ActixResult<HttpResponse> {
    let result =
        current_actor(&req).and_then(|actor| monitor.assess_risk(&actor, &body.into_inner()));
    Ok(respond(result, "Risk assessed"))
}

// 配置路由
pub fn configure_monitoring_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/monitoring")
            .wrap(RequireRole::new_any(ActorRole::staff_roles()))
            .wrap(RequireJWT)
            .route("/submissions/{id}/pause", web::post().to(pause_exam))
            .route("/submissions/{id}/resume", web::post().to(resume_exam))
            .route("/exams/{exam_id}/live", web::get().to(live_snapshot))
            .route("/active-sessions", web::get().to(active_sessions))
            .route("/risk-assessment", web::post().to(assess_risk)),
    );
}
