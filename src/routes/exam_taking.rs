use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::current_actor;
use crate::middlewares::{RequireJWT, RequireRole};
use crate::models::actors::ActorRole;
use crate::models::answers::requests::SaveAnswerRequest;
use crate::models::common::response::respond;
use crate::services::ExamSessionService;

// 开考资格
pub async fn check_eligibility(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>, // exam_id
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service.check_eligibility(path.into_inner(), student.id).await
    }
    .await;
    Ok(respond(result, "Eligibility checked"))
}

// 开始考试
pub async fn start_exam(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>, // exam_id
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service.start_exam(path.into_inner(), student.id).await
    }
    .await;
    Ok(respond(result, "Exam started"))
}

// 续考
pub async fn get_session(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service.get_session(path.into_inner(), student.id).await
    }
    .await;
    Ok(respond(result, "Session loaded"))
}

// 获取试题
pub async fn get_exam_questions(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service.get_exam_questions(path.into_inner(), student.id).await
    }
    .await;
    Ok(respond(result, "Questions loaded"))
}

// 保存作答
pub async fn save_answer(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>,
    body: web::Json<SaveAnswerRequest>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service
            .save_answer(path.into_inner(), student.id, body.into_inner())
            .await
    }
    .await;
    let message = match &result {
        Ok(saved) => saved.message.clone(),
        Err(_) => String::new(),
    };
    Ok(respond(result, message))
}

// 交卷
pub async fn submit_exam(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service.submit_exam(path.into_inner(), student.id).await
    }
    .await;
    Ok(respond(result, "Exam submitted"))
}

// 查看成绩
pub async fn get_result(
    req: HttpRequest,
    service: web::Data<ExamSessionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let result = async {
        let student = current_actor(&req)?;
        service.get_result(path.into_inner(), student.id).await
    }
    .await;
    Ok(respond(result, "Result loaded"))
}

// 配置路由
pub fn configure_exam_taking_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/exam-taking")
            .wrap(RequireRole::new(&ActorRole::Student))
            .wrap(RequireJWT)
            .route(
                "/exams/{exam_id}/eligibility",
                web::get().to(check_eligibility),
            )
            .route("/exams/{exam_id}/start", web::post().to(start_exam))
            .route("/submissions/{id}", web::get().to(get_session))
            .route(
                "/submissions/{id}/questions",
                web::get().to(get_exam_questions),
            )
            .route("/submissions/{id}/answers", web::post().to(save_answer))
            .route("/submissions/{id}/submit", web::post().to(submit_exam))
            .route("/submissions/{id}/result", web::get().to(get_result)),
    );
}
