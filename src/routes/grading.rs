use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::current_actor;
use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::actors::ActorRole;
use crate::models::common::response::respond;
use crate::models::grading::requests::{GradeAnswerRequest, GradingListQuery};
use crate::services::GradingService;

// 阅卷队列
pub async fn list_for_grading(
    req: HttpRequest,
    grading: web::Data<GradingService>,
    query: web::Query<GradingListQuery>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        grading.list_for_grading(&actor, query.into_inner()).await
    }
    .await;
    Ok(respond(result, "Grading queue loaded"))
}

// 阅卷详情
pub async fn get_submission_detail(
    req: HttpRequest,
    grading: web::Data<GradingService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        grading.get_submission_detail(path.into_inner(), &actor).await
    }
    .await;
    Ok(respond(result, "Submission loaded"))
}

// 教师给分
pub async fn grade_answer(
    req: HttpRequest,
    grading: web::Data<GradingService>,
    path: web::Path<i64>, // answer_id
    body: web::Json<GradeAnswerRequest>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        grading
            .grade_answer(path.into_inner(), &actor, body.into_inner())
            .await
    }
    .await;
    Ok(respond(result, "Answer graded"))
}

// 完成阅卷
pub async fn finalize_grading(
    req: HttpRequest,
    grading: web::Data<GradingService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        grading.finalize_grading(path.into_inner(), &actor).await
    }
    .await;
    Ok(respond(result, "Grading finalized"))
}

// 阅卷统计
pub async fn get_grading_stats(
    req: HttpRequest,
    grading: web::Data<GradingService>,
    path: web::Path<i64>, // exam_id
) -> ActixResult<HttpResponse> {
    let result = async {
        let actor = current_actor(&req)?;
        grading.get_grading_stats(path.into_inner(), &actor).await
    }
    .await;
    Ok(respond(result, "Grading statistics loaded"))
}

// 配置路由
pub fn configure_grading_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/grading")
            .wrap(RequireRole::new_any(ActorRole::staff_roles()))
            .wrap(RequireJWT)
            .route("/submissions", web::get().to(list_for_grading))
            .route("/submissions/{id}", web::get().to(get_submission_detail))
            .route(
                "/submissions/{id}/finalize",
                web::post().to(finalize_grading),
            )
            .route("/answers/{answer_id}", web::put().to(grade_answer))
            .route("/exams/{exam_id}/stats", web::get().to(get_grading_stats)),
    );
}
