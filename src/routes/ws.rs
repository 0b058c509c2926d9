use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, rt, web};
use tracing::info;

use super::current_actor;
use crate::errors::ExamError;
use crate::middlewares::RequireJWT;
use crate::models::common::response::error_response;
use crate::services::websocket::{Topic, WebSocketService};
use crate::services::{ExamSessionService, MonitorService};

// 升级连接并在后台处理
fn upgrade(
    req: &HttpRequest,
    stream: web::Payload,
    topic: Topic,
    user_id: i64,
) -> ActixResult<HttpResponse> {
    let (response, session, msg_stream) = actix_ws::handle(req, stream)?;
    rt::spawn(WebSocketService::handle_connection(
        topic, user_id, session, msg_stream,
    ));
    Ok(response)
}

// 教师订阅考试事件
pub async fn exam_stream(
    req: HttpRequest,
    stream: web::Payload,
    monitor: web::Data<MonitorService>,
    path: web::Path<i64>, // exam_id
) -> ActixResult<HttpResponse> {
    let exam_id = path.into_inner();
    let topic = Topic::Exam(exam_id);
    let authorized = async {
        let actor = current_actor(&req)?;
        monitor.authorize_exam_stream(exam_id, &actor).await?;
        Ok::<_, ExamError>(actor)
    }
    .await;
    match authorized {
        Ok(actor) => upgrade(&req, stream, topic, actor.id),
        Err(err) => {
            info!("WebSocket subscription to {} rejected", topic);
            Ok(error_response(&err))
        }
    }
}

// 学生订阅自己答卷的事件
pub async fn submission_stream(
    req: HttpRequest,
    stream: web::Payload,
    sessions: web::Data<ExamSessionService>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let submission_id = path.into_inner();
    let topic = Topic::Submission(submission_id);
    let authorized = async {
        let actor = current_actor(&req)?;
        sessions
            .authorize_submission_stream(submission_id, actor.id)
            .await?;
        Ok::<_, ExamError>(actor)
    }
    .await;
    match authorized {
        Ok(actor) => upgrade(&req, stream, topic, actor.id),
        Err(err) => {
            info!("WebSocket subscription to {} rejected", topic);
            Ok(error_response(&err))
        }
    }
}

// 配置路由
pub fn configure_ws_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/ws")
            .wrap(RequireJWT)
            .route("/exams/{exam_id}", web::get().to(exam_stream))
            .route("/submissions/{id}", web::get().to(submission_stream)),
    );
}
