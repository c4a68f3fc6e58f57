
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Editor cursor position as reported by the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CursorPosition {
    pub row: u32,
    pub col: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JoinEvent {
    pub room_id: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeEvent {
    pub room_id: String,
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CursorMoveEvent {
    pub room_id: String,
    pub cursor: CursorPosition,
}

/// Drawing strokes are relayed verbatim, so the payload stays opaque JSON.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DrawEvent {
    pub room_id: String,
    pub data: serde_json::Value,
}

/// Inbound events received over the WebSocket channel.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ClientEvent {
    #[serde(rename = "join")]
    Join(JoinEvent),
    #[serde(rename = "leave")]
    Leave,
    #[serde(rename = "code-change")]
    CodeChange(CodeChangeEvent),
    #[serde(rename = "cursor-move")]
    CursorMove(CursorMoveEvent),
    #[serde(rename = "draw")]
    Draw(DrawEvent),
}

/// One entry in a roster snapshot.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub connection_id: Uuid,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RosterUpdateEvent {
    pub participants: Vec<ParticipantInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CodeUpdateEvent {
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdateEvent {
    pub connection_id: Uuid,
    pub name: String,
    pub cursor: CursorPosition,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DrawBroadcastEvent {
    pub data: serde_json::Value,
}

/// Outbound events sent to WebSocket clients.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "roster-update")]
    RosterUpdate(RosterUpdateEvent),
    #[serde(rename = "code-update")]
    CodeUpdate(CodeUpdateEvent),
    #[serde(rename = "cursor-update")]
    CursorUpdate(CursorUpdateEvent),
    #[serde(rename = "draw")]
    Draw(DrawBroadcastEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_event_parses_from_tagged_json() {
        let raw = r#"{"type":"join","roomId":"abcd1234","name":"Alice"}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::Join(join) => {
                assert_eq!(join.room_id, "abcd1234");
                assert_eq!(join.name, "Alice");
            }
            other => panic!("expected join, got {other:?}"),
        }
    }

    #[test]
    fn leave_event_needs_no_payload() {
        let event: ClientEvent = serde_json::from_str(r#"{"type":"leave"}"#).unwrap();
        assert!(matches!(event, ClientEvent::Leave));
    }

    #[test]
    fn cursor_move_carries_row_and_col() {
        let raw = r#"{"type":"cursor-move","roomId":"R1","cursor":{"row":3,"col":14}}"#;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::CursorMove(m) => {
                assert_eq!(m.cursor, CursorPosition { row: 3, col: 14 });
            }
            other => panic!("expected cursor-move, got {other:?}"),
        }
    }

    #[test]
    fn draw_payload_is_kept_opaque() {
        let raw = r##"{"type":"draw","roomId":"R1","data":{"points":[[0,0],[5,9]],"color":"#fff"}}"##;
        let event: ClientEvent = serde_json::from_str(raw).unwrap();
        match event {
            ClientEvent::Draw(d) => {
                assert_eq!(d.data["color"], "#fff");
            }
            other => panic!("expected draw, got {other:?}"),
        }
    }

    #[test]
    fn join_without_name_is_rejected() {
        let raw = r#"{"type":"join","roomId":"abcd1234"}"#;
        assert!(serde_json::from_str::<ClientEvent>(raw).is_err());
    }

    #[test]
    fn server_events_serialize_with_type_tag() {
        let event = ServerEvent::CodeUpdate(CodeUpdateEvent {
            code: "print(1)".to_string(),
        });
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(json["type"], "code-update");
        assert_eq!(json["code"], "print(1)");
    }
}
