use std::collections::HashMap;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::registry::{normalize_room_id, RoomRegistry, RosterSnapshot};
use crate::models::{
    ClientEvent, CodeUpdateEvent, CursorUpdateEvent, DrawBroadcastEvent, ParticipantInfo,
    RosterUpdateEvent, ServerEvent,
};

/// Outbound channel for one connection. The WebSocket layer drains it into
/// the socket; the hub only ever queues events on it.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Live counts for the diagnostics endpoint.
pub struct CoordinatorStats {
    pub connections: u32,
    pub rooms: u32,
    pub participants: u32,
}

/// The session coordinator: one registry plus the sender handles of every
/// open connection, behind a single lock so all state mutations are
/// serialized in arrival order.
pub struct Coordinator {
    inner: Mutex<CoordinatorInner>,
}

struct CoordinatorInner {
    registry: RoomRegistry,
    connections: HashMap<Uuid, EventSender>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CoordinatorInner {
                registry: RoomRegistry::new(),
                connections: HashMap::new(),
            }),
        }
    }

    /// Register a freshly opened connection and its outbound channel.
    pub async fn register(&self, connection_id: Uuid, sender: EventSender) {
        let mut inner = self.inner.lock().await;
        inner.connections.insert(connection_id, sender);
        info!("Connection registered: {}", connection_id);
    }

    /// Apply one inbound event against shared state and fan out the result.
    pub async fn dispatch(&self, connection_id: Uuid, event: ClientEvent) {
        let mut inner = self.inner.lock().await;
        match event {
            ClientEvent::Join(join) => {
                inner.handle_join(connection_id, &join.room_id, &join.name);
            }
            ClientEvent::Leave => {
                inner.leave_and_broadcast(connection_id);
            }
            ClientEvent::CodeChange(change) => {
                inner.registry.set_code(&change.room_id, &change.code);
                // Echoed back to the sender too; clients reconcile against
                // their own last sent value.
                inner.broadcast(
                    &change.room_id,
                    ServerEvent::CodeUpdate(CodeUpdateEvent { code: change.code }),
                );
            }
            ClientEvent::CursorMove(m) => {
                let Some(name) = inner.registry.name_of(connection_id).map(str::to_string) else {
                    debug!("Cursor event from connection outside any room: {}", connection_id);
                    return;
                };
                inner.relay_except(
                    &m.room_id,
                    connection_id,
                    ServerEvent::CursorUpdate(CursorUpdateEvent {
                        connection_id,
                        name,
                        cursor: m.cursor,
                    }),
                );
            }
            ClientEvent::Draw(draw) => {
                inner.relay_except(
                    &draw.room_id,
                    connection_id,
                    ServerEvent::Draw(DrawBroadcastEvent { data: draw.data }),
                );
            }
        }
    }

    /// Tear down a closed connection. Called exactly once per connection by
    /// the WebSocket layer; safe when the connection never joined a room.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.connections.remove(&connection_id);
        if let Some(room_id) = inner.leave_and_broadcast(connection_id) {
            info!("Connection {} reaped from room {}", connection_id, room_id);
        } else {
            info!("Connection closed: {}", connection_id);
        }
    }

    /// Roster snapshot of a room as seen by the live registry.
    pub async fn list_participants(&self, room_id: &str) -> Option<Vec<ParticipantInfo>> {
        let inner = self.inner.lock().await;
        inner.registry.list_participants(room_id)
    }

    pub async fn stats(&self) -> CoordinatorStats {
        let inner = self.inner.lock().await;
        CoordinatorStats {
            connections: inner.connections.len() as u32,
            rooms: inner.registry.room_count() as u32,
            participants: inner.registry.participant_count() as u32,
        }
    }
}

impl CoordinatorInner {
    fn handle_join(&mut self, connection_id: Uuid, room_id: &str, name: &str) {
        if room_id.trim().is_empty() || name.trim().is_empty() {
            warn!("Dropping join with missing roomId/name from {}", connection_id);
            return;
        }

        // A connection belongs to at most one room: moving to a different
        // room leaves the previous one first, roster rebroadcast included.
        let target = normalize_room_id(room_id);
        let switching = self
            .registry
            .room_of(connection_id)
            .map(|current| current != target.as_str())
            .unwrap_or(false);
        if switching {
            self.leave_and_broadcast(connection_id);
        }

        let (room_id, roster) = self.registry.join(room_id, connection_id, name);
        info!("{} joined room {} ({} member(s))", name, room_id, roster.len());

        // Late-joiner catch-up: current buffer goes to the new member only,
        // and before any other broadcast reaches it.
        if let Some(code) = self.registry.get_code(&room_id) {
            if !code.is_empty() {
                let catch_up = ServerEvent::CodeUpdate(CodeUpdateEvent {
                    code: code.to_string(),
                });
                self.send_to(connection_id, catch_up);
            }
        }

        self.broadcast_roster(&room_id, roster);
    }

    /// Shared leave path for explicit leave events and channel close.
    /// Returns the room id the connection was removed from.
    fn leave_and_broadcast(&mut self, connection_id: Uuid) -> Option<String> {
        let (room_id, roster) = self.registry.leave(connection_id)?;
        if roster.is_empty() {
            info!("Room {} cleaned up (no participants)", room_id);
        } else {
            self.broadcast_roster(&room_id, roster);
        }
        Some(room_id)
    }

    fn broadcast_roster(&self, room_id: &str, roster: RosterSnapshot) {
        self.broadcast(
            room_id,
            ServerEvent::RosterUpdate(RosterUpdateEvent {
                participants: roster,
            }),
        );
    }

    /// Send to every member of a room, the originator included.
    fn broadcast(&self, room_id: &str, event: ServerEvent) {
        for member in self.registry.member_ids(room_id) {
            self.send_to(member, event.clone());
        }
    }

    /// Send to every member of a room except the originator.
    fn relay_except(&self, room_id: &str, exclude: Uuid, event: ServerEvent) {
        for member in self.registry.member_ids(room_id) {
            if member != exclude {
                self.send_to(member, event.clone());
            }
        }
    }

    /// Best-effort delivery: a closed channel is skipped, never aborting the
    /// rest of a fan-out.
    fn send_to(&self, connection_id: Uuid, event: ServerEvent) {
        let Some(sender) = self.connections.get(&connection_id) else {
            debug!("No channel for connection {}", connection_id);
            return;
        };
        if sender.send(event).is_err() {
            debug!("Skipping delivery to closed connection {}", connection_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CodeChangeEvent, CursorMoveEvent, CursorPosition, DrawEvent, JoinEvent};
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn connect(hub: &Coordinator) -> (Uuid, UnboundedReceiver<ServerEvent>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        hub.register(id, tx).await;
        (id, rx)
    }

    async fn join(hub: &Coordinator, conn: Uuid, room: &str, name: &str) {
        hub.dispatch(
            conn,
            ClientEvent::Join(JoinEvent {
                room_id: room.to_string(),
                name: name.to_string(),
            }),
        )
        .await;
    }

    fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn roster_names(event: &ServerEvent) -> Vec<String> {
        match event {
            ServerEvent::RosterUpdate(r) => {
                r.participants.iter().map(|p| p.name.clone()).collect()
            }
            other => panic!("expected roster-update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn interview_session_scenario() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        let (bob, mut bob_rx) = connect(&hub).await;

        join(&hub, alice, "ABCD1234", "Alice").await;
        let events = drain(&mut alice_rx);
        assert_eq!(events.len(), 1);
        assert_eq!(roster_names(&events[0]), vec!["Alice"]);

        join(&hub, bob, "ABCD1234", "Bob").await;
        let events = drain(&mut alice_rx);
        assert_eq!(roster_names(&events[0]), vec!["Alice", "Bob"]);

        hub.dispatch(
            alice,
            ClientEvent::CodeChange(CodeChangeEvent {
                room_id: "ABCD1234".to_string(),
                code: "print(1)".to_string(),
            }),
        )
        .await;

        // Both members receive the echo, sender included.
        for rx in [&mut alice_rx, &mut bob_rx] {
            let events = drain(rx);
            let last = events.last().unwrap();
            match last {
                ServerEvent::CodeUpdate(c) => assert_eq!(c.code, "print(1)"),
                other => panic!("expected code-update, got {other:?}"),
            }
        }

        hub.unregister(bob).await;
        let events = drain(&mut alice_rx);
        assert_eq!(roster_names(&events[0]), vec!["Alice"]);

        hub.unregister(alice).await;
        assert!(hub.list_participants("ABCD1234").await.is_none());
        let stats = hub.stats().await;
        assert_eq!(stats.rooms, 0);
        assert_eq!(stats.connections, 0);
    }

    #[tokio::test]
    async fn late_joiner_receives_buffer_before_roster() {
        let hub = Coordinator::new();
        let (alice, _alice_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        hub.dispatch(
            alice,
            ClientEvent::CodeChange(CodeChangeEvent {
                room_id: "R1".to_string(),
                code: "X".to_string(),
            }),
        )
        .await;

        let (bob, mut bob_rx) = connect(&hub).await;
        join(&hub, bob, "r1", "Bob").await;
        let events = drain(&mut bob_rx);
        match &events[0] {
            ServerEvent::CodeUpdate(c) => assert_eq!(c.code, "X"),
            other => panic!("catch-up must come first, got {other:?}"),
        }
        assert_eq!(roster_names(&events[1]), vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn joiner_of_empty_room_gets_no_catch_up() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        let events = drain(&mut alice_rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ServerEvent::RosterUpdate(_)));
    }

    #[tokio::test]
    async fn cursor_relay_excludes_sender() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        let (bob, mut bob_rx) = connect(&hub).await;
        let (carol, mut carol_rx) = connect(&hub).await;
        for (conn, name) in [(alice, "Alice"), (bob, "Bob"), (carol, "Carol")] {
            join(&hub, conn, "R1", name).await;
        }
        drain(&mut alice_rx);
        drain(&mut bob_rx);
        drain(&mut carol_rx);

        hub.dispatch(
            alice,
            ClientEvent::CursorMove(CursorMoveEvent {
                room_id: "R1".to_string(),
                cursor: CursorPosition { row: 2, col: 7 },
            }),
        )
        .await;

        assert!(drain(&mut alice_rx).is_empty());
        for rx in [&mut bob_rx, &mut carol_rx] {
            let events = drain(rx);
            assert_eq!(events.len(), 1);
            match &events[0] {
                ServerEvent::CursorUpdate(c) => {
                    assert_eq!(c.connection_id, alice);
                    assert_eq!(c.name, "Alice");
                    assert_eq!(c.cursor, CursorPosition { row: 2, col: 7 });
                }
                other => panic!("expected cursor-update, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn draw_relay_excludes_sender_and_keeps_payload() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        let (bob, mut bob_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        join(&hub, bob, "R1", "Bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        let stroke = json!({"points": [[1, 2], [3, 4]], "width": 2});
        hub.dispatch(
            alice,
            ClientEvent::Draw(DrawEvent {
                room_id: "R1".to_string(),
                data: stroke.clone(),
            }),
        )
        .await;

        assert!(drain(&mut alice_rx).is_empty());
        let events = drain(&mut bob_rx);
        match &events[0] {
            ServerEvent::Draw(d) => assert_eq!(d.data, stroke),
            other => panic!("expected draw, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn explicit_leave_shrinks_roster_and_allows_rejoin() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        let (bob, mut bob_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        join(&hub, bob, "R1", "Bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        hub.dispatch(bob, ClientEvent::Leave).await;

        // The remaining member sees the shrunken roster; the leaver is out
        // of the room and hears nothing.
        let events = drain(&mut alice_rx);
        assert_eq!(roster_names(&events[0]), vec!["Alice"]);
        assert!(drain(&mut bob_rx).is_empty());
        let roster = hub.list_participants("R1").await.unwrap();
        assert_eq!(roster.len(), 1);

        // Leaving does not close the channel: the connection is still
        // registered and can join again.
        let stats = hub.stats().await;
        assert_eq!(stats.connections, 2);
        join(&hub, bob, "R1", "Bob").await;
        let events = drain(&mut bob_rx);
        assert_eq!(roster_names(events.last().unwrap()), vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn rejoin_does_not_duplicate_roster_entries() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        join(&hub, alice, "R1", "Alice").await;
        let events = drain(&mut alice_rx);
        assert_eq!(roster_names(events.last().unwrap()), vec!["Alice"]);
    }

    #[tokio::test]
    async fn switching_rooms_leaves_the_first_one() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        let (bob, mut bob_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        join(&hub, bob, "R1", "Bob").await;
        drain(&mut alice_rx);
        drain(&mut bob_rx);

        join(&hub, bob, "R2", "Bob").await;

        // Alice sees Bob leave R1.
        let events = drain(&mut alice_rx);
        assert_eq!(roster_names(&events[0]), vec!["Alice"]);
        // Bob only belongs to R2 now.
        let r2 = hub.list_participants("R2").await.unwrap();
        assert_eq!(r2.len(), 1);
        let r1 = hub.list_participants("R1").await.unwrap();
        assert_eq!(r1.len(), 1);
    }

    #[tokio::test]
    async fn unregister_without_join_is_noop() {
        let hub = Coordinator::new();
        let (conn, _rx) = connect(&hub).await;
        hub.unregister(conn).await;
        let stats = hub.stats().await;
        assert_eq!(stats.connections, 0);
        assert_eq!(stats.rooms, 0);
    }

    #[tokio::test]
    async fn join_with_blank_name_is_dropped() {
        let hub = Coordinator::new();
        let (conn, mut rx) = connect(&hub).await;
        join(&hub, conn, "R1", "   ").await;
        assert!(drain(&mut rx).is_empty());
        assert!(hub.list_participants("R1").await.is_none());
    }

    #[tokio::test]
    async fn broadcast_survives_a_closed_member_channel() {
        let hub = Coordinator::new();
        let (alice, alice_rx) = connect(&hub).await;
        let (bob, mut bob_rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        join(&hub, bob, "R1", "Bob").await;
        drain(&mut bob_rx);

        // Alice's channel dies without her leaving yet.
        drop(alice_rx);

        hub.dispatch(
            bob,
            ClientEvent::CodeChange(CodeChangeEvent {
                room_id: "R1".to_string(),
                code: "still flows".to_string(),
            }),
        )
        .await;

        let events = drain(&mut bob_rx);
        match &events[0] {
            ServerEvent::CodeUpdate(c) => assert_eq!(c.code, "still flows"),
            other => panic!("expected code-update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cursor_event_before_join_is_ignored() {
        let hub = Coordinator::new();
        let (alice, mut alice_rx) = connect(&hub).await;
        let (stranger, _rx) = connect(&hub).await;
        join(&hub, alice, "R1", "Alice").await;
        drain(&mut alice_rx);

        hub.dispatch(
            stranger,
            ClientEvent::CursorMove(CursorMoveEvent {
                room_id: "R1".to_string(),
                cursor: CursorPosition { row: 0, col: 0 },
            }),
        )
        .await;
        assert!(drain(&mut alice_rx).is_empty());
    }
}
