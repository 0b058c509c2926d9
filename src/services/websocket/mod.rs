/*!
 * WebSocket 考试事件推送
 *
 * 按主题分发考试事件：教师订阅考试主题，学生订阅自己答卷的主题。
 *
 * ## 使用方法
 *
 * 客户端通过以下 URL 连接：
 * ```text
 * ws://host/api/v1/ws/exams/{exam_id}?token=<access_token>
 * ws://host/api/v1/ws/submissions/{submission_id}?token=<access_token>
 * ```
 *
 * ## 消息格式
 *
 * ### 服务端推送
 * ```json
 * {
 *     "type": "event",
 *     "payload": {
 *         "event": "timer_sync",
 *         "exam_id": 3,
 *         "submission_id": 42,
 *         "remaining_seconds": 3540,
 *         "must_submit_before": "2026-03-01T10:00:00Z"
 *     }
 * }
 * ```
 *
 * ### 心跳
 * ```json
 * {"type": "ping"}
 * {"type": "pong"}
 * ```
 */

use actix_ws::Message;
use dashmap::DashMap;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::services::events::{EventPublisher, ExamEvent};

/// 全局连接管理器
static CONNECTION_MANAGER: Lazy<ConnectionManager> = Lazy::new(ConnectionManager::new);

/// 每个主题的缓冲消息数
const TOPIC_CAPACITY: usize = 100;

/// 订阅主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Topic {
    /// 教师：某场考试的全部事件
    Exam(i64),
    /// 学生：自己答卷的计时与状态事件
    Submission(i64),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Exam(id) => write!(f, "exam:{id}"),
            Topic::Submission(id) => write!(f, "submission:{id}"),
        }
    }
}

/// WebSocket 消息类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// 考试事件
    Event { payload: ExamEvent },
    /// 心跳请求
    Ping,
    /// 心跳响应
    Pong,
    /// 连接成功
    Connected { topic: Topic },
    /// 错误消息
    Error { message: String },
}

/// 连接管理器
pub struct ConnectionManager {
    /// 主题 -> 广播发送器
    connections: DashMap<Topic, broadcast::Sender<WsMessage>>,
}

impl ConnectionManager {
    pub(crate) fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// 获取全局实例
    pub fn get() -> &'static Self {
        &CONNECTION_MANAGER
    }

    /// 订阅主题
    pub fn register(&self, topic: Topic) -> broadcast::Receiver<WsMessage> {
        let entry = self.connections.entry(topic).or_insert_with(|| {
            let (tx, _) = broadcast::channel(TOPIC_CAPACITY);
            tx
        });
        entry.subscribe()
    }

    /// 取消订阅
    pub fn unregister(&self, topic: Topic) {
        // 只有当没有订阅者时才移除
        self.connections
            .remove_if(&topic, |_, sender| sender.receiver_count() == 0);
    }

    /// 向主题发送消息，没有订阅者时返回 false
    pub fn send_to_topic(&self, topic: Topic, message: WsMessage) -> bool {
        self.connections
            .get(&topic)
            .is_some_and(|sender| sender.send(message).is_ok())
    }

    /// 按主题分发考试事件
    pub fn dispatch(&self, event: &ExamEvent) {
        self.send_to_topic(
            Topic::Exam(event.exam_id()),
            WsMessage::Event {
                payload: event.clone(),
            },
        );
        if event.is_student_visible() {
            self.send_to_topic(
                Topic::Submission(event.submission_id()),
                WsMessage::Event {
                    payload: event.clone(),
                },
            );
        }
    }

    /// 有订阅者的主题数
    pub fn online_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.receiver_count() > 0)
            .count()
    }
}

/// 通过 WebSocket 推送事件的发布器
pub struct WebSocketPublisher {
    manager: &'static ConnectionManager,
}

impl WebSocketPublisher {
    pub fn new() -> Self {
        Self::with_manager(ConnectionManager::get())
    }

    pub fn with_manager(manager: &'static ConnectionManager) -> Self {
        Self { manager }
    }
}

impl Default for WebSocketPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for WebSocketPublisher {
    fn publish(&self, event: ExamEvent) -> Result<()> {
        // 没有在线订阅者不算失败
        self.manager.dispatch(&event);
        Ok(())
    }
}

/// WebSocket 服务
pub struct WebSocketService;

impl WebSocketService {
    /// 处理 WebSocket 连接
    pub async fn handle_connection(
        topic: Topic,
        user_id: i64,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) {
        info!("WebSocket connected for user {} on {}", user_id, topic);

        // 注册连接
        let mut rx = ConnectionManager::get().register(topic);

        // 发送连接成功消息
        let connected_msg = WsMessage::Connected { topic };
        if let Ok(json) = serde_json::to_string(&connected_msg) {
            let _ = session.text(json).await;
        }

        // 心跳间隔
        let heartbeat_interval = std::time::Duration::from_secs(30);
        let mut heartbeat = tokio::time::interval(heartbeat_interval);

        loop {
            tokio::select! {
                // 处理来自客户端的消息
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if let Ok(ws_msg) = serde_json::from_str::<WsMessage>(&text) {
                                match ws_msg {
                                    WsMessage::Ping => {
                                        let pong = serde_json::to_string(&WsMessage::Pong)
                                            .unwrap_or_else(|_| r#"{"type":"pong"}"#.to_string());
                                        if session.text(pong).await.is_err() {
                                            break;
                                        }
                                    }
                                    _ => {
                                        debug!("Received message on {} from user {}: {:?}", topic, user_id, ws_msg);
                                    }
                                }
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if session.pong(&data).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!("WebSocket closed for user {} on {}", user_id, topic);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("WebSocket error for user {} on {}: {:?}", user_id, topic, e);
                            break;
                        }
                        _ => {}
                    }
                }

                // 处理来自服务器的推送消息
                msg = rx.recv() => {
                    match msg {
                        Ok(ws_msg) => {
                            if let Ok(json) = serde_json::to_string(&ws_msg)
                                && session.text(json).await.is_err() {
                                    break;
                                }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("WebSocket for user {} on {} lagged by {} messages", user_id, topic, n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            break;
                        }
                    }
                }

                // 心跳
                _ = heartbeat.tick() => {
                    if session.ping(b"").await.is_err() {
                        break;
                    }
                }
            }
        }

        // 清理连接
        drop(rx);
        ConnectionManager::get().unregister(topic);
        info!("WebSocket disconnected for user {} on {}", user_id, topic);
    }
}
