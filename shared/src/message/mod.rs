//! 实时通知消息定义
//!
//! 服务器与 WebSocket 客户端之间的唯一帧格式：
//! `{ "event": <name>, "data": <payload> }`，以 JSON 文本帧传输。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Order;

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// 新订单（广播给所有连接）
    NewOrder,
    /// 订单状态变化
    StatusUpdated,
}

impl EventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::NewOrder => "new_order",
            EventType::StatusUpdated => "status_updated",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new_order" => Ok(EventType::NewOrder),
            "status_updated" => Ok(EventType::StatusUpdated),
            _ => Err(()),
        }
    }
}

/// WebSocket 帧
///
/// `event` 保留为字符串：入站帧可能携带服务器不认识的事件名，
/// 解析时不应因此失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WsMessage {
    pub fn new(event: EventType, data: serde_json::Value) -> Self {
        Self {
            event: event.as_str().to_string(),
            data,
        }
    }

    /// `new_order` 帧，携带完整订单
    pub fn new_order(order: &Order) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::NewOrder, serde_json::to_value(order)?))
    }

    /// `status_updated` 帧，携带完整订单
    pub fn status_updated(order: &Order) -> Result<Self, serde_json::Error> {
        Ok(Self::new(EventType::StatusUpdated, serde_json::to_value(order)?))
    }

    /// 已知事件类型；未知事件返回 None
    pub fn event_type(&self) -> Option<EventType> {
        self.event.parse().ok()
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_type_names() {
        assert_eq!(EventType::NewOrder.to_string(), "new_order");
        assert_eq!("status_updated".parse(), Ok(EventType::StatusUpdated));
        assert!("order_deleted".parse::<EventType>().is_err());
    }

    #[test]
    fn test_frame_shape() {
        let msg = WsMessage::new(EventType::StatusUpdated, json!({ "id": "o1" }));
        let text = msg.to_text().unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["event"], "status_updated");
        assert_eq!(value["data"]["id"], "o1");
    }

    #[test]
    fn test_unknown_event_still_parses() {
        let msg = WsMessage::from_text(r#"{"event":"typing","data":1}"#).unwrap();
        assert_eq!(msg.event, "typing");
        assert_eq!(msg.event_type(), None);
    }

    #[test]
    fn test_missing_data_defaults_to_null() {
        let msg = WsMessage::from_text(r#"{"event":"new_order"}"#).unwrap();
        assert_eq!(msg.event_type(), Some(EventType::NewOrder));
        assert!(msg.data.is_null());
    }

    #[test]
    fn test_malformed_frame_is_error() {
        assert!(WsMessage::from_text("not json").is_err());
        assert!(WsMessage::from_text(r#"{"data":1}"#).is_err());
    }
}
