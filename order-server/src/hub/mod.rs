//! NotificationHub - 房间制实时分发
//!
//! ```text
//! OrderService / OrderStateMachine / inbound relay
//!       │ WsMessage
//!       ▼
//! NotificationHub  (一把互斥锁保护全部成员关系)
//!   ├── connections: ConnId → Member { WeakSender, identity, rooms }
//!   └── rooms:       RoomKey → {ConnId}
//!       │ try_send (不等待)
//!       ▼
//! 每个连接自己的 outbox (有界 mpsc) → writer task → socket
//! ```
//!
//! Hub 只持有 `WeakSender`：连接的生命周期完全由 ConnectionManager 决定。
//! 投递是尽力而为的，队列满或连接已关闭只记日志，不会阻塞或向调用方报错。

mod room;

pub use room::{ConnId, Identity, RoomKey};

use parking_lot::Mutex;
use shared::message::WsMessage;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// 已序列化的帧，广播时只编码一次，各连接共享
pub type Frame = Arc<str>;

struct Member {
    outbox: mpsc::WeakSender<Frame>,
    identity: Identity,
    rooms: HashSet<RoomKey>,
}

#[derive(Default)]
struct HubInner {
    connections: HashMap<ConnId, Member>,
    rooms: HashMap<RoomKey, HashSet<ConnId>>,
}

impl HubInner {
    fn join(&mut self, conn: ConnId, room: RoomKey) -> bool {
        let Some(member) = self.connections.get_mut(&conn) else {
            return false;
        };
        member.rooms.insert(room.clone());
        self.rooms.entry(room).or_default().insert(conn);
        true
    }
}

/// Room-keyed publish/subscribe registry
///
/// Cheap to clone; all clones share the same membership state.
#[derive(Clone, Default)]
pub struct NotificationHub {
    inner: Arc<Mutex<HubInner>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("NotificationHub")
            .field("connections", &inner.connections.len())
            .field("rooms", &inner.rooms.len())
            .finish()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册连接并立即加入其身份对应的房间
    pub fn register(&self, identity: Identity, outbox: &mpsc::Sender<Frame>) -> ConnId {
        let conn = ConnId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let room = identity.personal_room(conn);

        let mut guard = self.inner.lock();
        guard.connections.insert(
            conn,
            Member {
                outbox: outbox.downgrade(),
                identity: identity.clone(),
                rooms: HashSet::new(),
            },
        );
        guard.join(conn, room.clone());
        drop(guard);

        tracing::debug!(conn = %conn, identity = %identity, room = %room, "Connection registered");
        conn
    }

    /// 加入房间 (幂等)；连接未注册时返回 false
    pub fn join(&self, conn: ConnId, room: RoomKey) -> bool {
        self.inner.lock().join(conn, room)
    }

    /// 从全局集合和所有房间中移除连接
    ///
    /// 返回移除前的身份；未注册的连接返回 None。
    pub fn remove(&self, conn: ConnId) -> Option<Identity> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let member = inner.connections.remove(&conn)?;
        for room in &member.rooms {
            if let Some(members) = inner.rooms.get_mut(room) {
                members.remove(&conn);
                if members.is_empty() {
                    inner.rooms.remove(room);
                }
            }
        }
        drop(guard);

        tracing::debug!(conn = %conn, rooms = member.rooms.len(), "Connection removed from hub");
        Some(member.identity)
    }

    /// 广播到房间内的每个成员，返回成功入队的数量
    pub fn broadcast_to_room(&self, room: &RoomKey, message: &WsMessage) -> usize {
        match encode(message) {
            Some(frame) => self.send_to_room(room, &frame),
            None => 0,
        }
    }

    /// 广播到所有已注册连接，不区分房间
    pub fn broadcast_to_all(&self, message: &WsMessage) -> usize {
        let Some(frame) = encode(message) else {
            return 0;
        };

        let inner = self.inner.lock();
        let delivered = inner
            .connections
            .iter()
            .filter(|(conn, member)| deliver(**conn, member, &frame))
            .count();
        tracing::debug!(event = %message.event, delivered, total = inner.connections.len(), "Broadcast to all");
        delivered
    }

    /// 原样转发客户端发来的帧
    pub fn relay_to_room(&self, room: &RoomKey, raw: &str) -> usize {
        self.send_to_room(room, &Frame::from(raw))
    }

    fn send_to_room(&self, room: &RoomKey, frame: &Frame) -> usize {
        let inner = self.inner.lock();
        let Some(members) = inner.rooms.get(room) else {
            tracing::debug!(room = %room, "Room has no members");
            return 0;
        };

        let mut delivered = 0;
        for conn in members {
            if let Some(member) = inner.connections.get(conn)
                && deliver(*conn, member, frame)
            {
                delivered += 1;
            }
        }
        tracing::debug!(room = %room, delivered, total = members.len(), "Broadcast to room");
        delivered
    }

    pub fn connection_count(&self) -> usize {
        self.inner.lock().connections.len()
    }

    pub fn room_count(&self) -> usize {
        self.inner.lock().rooms.len()
    }

    pub fn room_size(&self, room: &RoomKey) -> usize {
        self.inner.lock().rooms.get(room).map_or(0, HashSet::len)
    }

    /// 连接当前所在的房间 (排序后返回)
    pub fn rooms_of(&self, conn: ConnId) -> Vec<RoomKey> {
        let inner = self.inner.lock();
        let mut rooms: Vec<RoomKey> = inner
            .connections
            .get(&conn)
            .map(|m| m.rooms.iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }
}

fn encode(message: &WsMessage) -> Option<Frame> {
    match message.to_text() {
        Ok(text) => Some(Frame::from(text)),
        Err(e) => {
            tracing::warn!(event = %message.event, error = %e, "Failed to encode broadcast frame");
            None
        }
    }
}

/// 非阻塞投递；失败只记日志
fn deliver(conn: ConnId, member: &Member, frame: &Frame) -> bool {
    let Some(outbox) = member.outbox.upgrade() else {
        tracing::warn!(conn = %conn, identity = %member.identity, "Connection closed, frame dropped");
        return false;
    };
    match outbox.try_send(frame.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(conn = %conn, identity = %member.identity, "Outbox full, frame dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::warn!(conn = %conn, identity = %member.identity, "Outbox closed, frame dropped");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::message::EventType;

    fn msg(n: i64) -> WsMessage {
        WsMessage::new(EventType::StatusUpdated, json!({ "n": n }))
    }

    fn recv_all(rx: &mut mpsc::Receiver<Frame>) -> Vec<WsMessage> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(WsMessage::from_text(&frame).unwrap());
        }
        out
    }

    #[test]
    fn test_register_joins_personal_room() {
        let hub = NotificationHub::new();
        let (tx, _rx) = mpsc::channel(8);
        let conn = hub.register(Identity::Staff("a".into()), &tx);

        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.rooms_of(conn), vec![RoomKey::staff("a")]);
        assert_eq!(hub.room_size(&RoomKey::staff("a")), 1);
    }

    #[test]
    fn test_join_is_idempotent_and_bidirectional() {
        let hub = NotificationHub::new();
        let (tx, _rx) = mpsc::channel(8);
        let conn = hub.register(Identity::Anonymous, &tx);

        assert!(hub.join(conn, RoomKey::table("t1")));
        assert!(hub.join(conn, RoomKey::table("t1")));
        assert_eq!(hub.room_size(&RoomKey::table("t1")), 1);
        assert_eq!(
            hub.rooms_of(conn),
            vec![RoomKey::connection(conn), RoomKey::table("t1")]
        );
        assert!(!hub.join(ConnId(999), RoomKey::table("t1")));
    }

    #[test]
    fn test_room_isolation() {
        let hub = NotificationHub::new();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        hub.register(Identity::Table("t1".into()), &tx1);
        hub.register(Identity::Table("t2".into()), &tx2);

        assert_eq!(hub.broadcast_to_room(&RoomKey::table("t1"), &msg(1)), 1);

        assert_eq!(recv_all(&mut rx1), vec![msg(1)]);
        assert!(recv_all(&mut rx2).is_empty());
    }

    #[test]
    fn test_broadcast_to_all_ignores_rooms() {
        let hub = NotificationHub::new();
        let (tx1, mut rx1) = mpsc::channel(8);
        let (tx2, mut rx2) = mpsc::channel(8);
        hub.register(Identity::Table("t1".into()), &tx1);
        hub.register(Identity::Staff("a".into()), &tx2);

        assert_eq!(hub.broadcast_to_all(&msg(7)), 2);
        assert_eq!(recv_all(&mut rx1), vec![msg(7)]);
        assert_eq!(recv_all(&mut rx2), vec![msg(7)]);
    }

    #[test]
    fn test_events_arrive_in_broadcast_order() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(Identity::Table("t1".into()), &tx);

        hub.broadcast_to_room(&RoomKey::table("t1"), &msg(1));
        hub.broadcast_to_all(&msg(2));
        hub.broadcast_to_room(&RoomKey::table("t1"), &msg(3));

        assert_eq!(recv_all(&mut rx), vec![msg(1), msg(2), msg(3)]);
    }

    #[test]
    fn test_full_outbox_does_not_block_others() {
        let hub = NotificationHub::new();
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        hub.register(Identity::Table("t1".into()), &slow_tx);
        let fast = hub.register(Identity::Anonymous, &fast_tx);
        hub.join(fast, RoomKey::table("t1"));

        assert_eq!(hub.broadcast_to_room(&RoomKey::table("t1"), &msg(1)), 2);
        // slow outbox is now full
        assert_eq!(hub.broadcast_to_room(&RoomKey::table("t1"), &msg(2)), 1);

        assert_eq!(recv_all(&mut slow_rx), vec![msg(1)]);
        assert_eq!(recv_all(&mut fast_rx), vec![msg(1), msg(2)]);
    }

    #[test]
    fn test_dead_connection_is_skipped() {
        let hub = NotificationHub::new();
        let (dead_tx, dead_rx) = mpsc::channel(8);
        let (live_tx, mut live_rx) = mpsc::channel(8);
        hub.register(Identity::Table("t1".into()), &dead_tx);
        let live = hub.register(Identity::Anonymous, &live_tx);
        hub.join(live, RoomKey::table("t1"));

        drop(dead_rx);
        assert_eq!(hub.broadcast_to_room(&RoomKey::table("t1"), &msg(1)), 1);
        assert_eq!(recv_all(&mut live_rx), vec![msg(1)]);

        // owner dropped its sender: the weak handle no longer upgrades
        drop(dead_tx);
        assert_eq!(hub.broadcast_to_all(&msg(2)), 1);
    }

    #[test]
    fn test_hub_does_not_keep_outbox_alive() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::channel::<Frame>(8);
        hub.register(Identity::Anonymous, &tx);
        drop(tx);
        assert!(rx.try_recv().is_err());
        assert!(rx.is_closed());
    }

    #[test]
    fn test_remove_cleans_every_room() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::channel(8);
        let (other_tx, _other_rx) = mpsc::channel(8);
        let conn = hub.register(Identity::Staff("a".into()), &tx);
        hub.join(conn, RoomKey::table("t1"));
        let other = hub.register(Identity::Table("t1".into()), &other_tx);

        assert_eq!(hub.remove(conn), Some(Identity::Staff("a".into())));
        assert_eq!(hub.remove(conn), None);

        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.room_size(&RoomKey::staff("a")), 0);
        assert_eq!(hub.room_size(&RoomKey::table("t1")), 1);
        // empty staff room was collected, table room kept for `other`
        assert_eq!(hub.room_count(), 1);
        assert_eq!(hub.rooms_of(other), vec![RoomKey::table("t1")]);

        hub.broadcast_to_all(&msg(1));
        assert!(recv_all(&mut rx).is_empty());
    }

    #[test]
    fn test_relay_is_verbatim() {
        let hub = NotificationHub::new();
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(Identity::Table("t1".into()), &tx);

        let raw = r#"{"event":"status_updated","data":{"id":"o1","status":"done"}}"#;
        assert_eq!(hub.relay_to_room(&RoomKey::table("t1"), raw), 1);
        assert_eq!(&*rx.try_recv().unwrap(), raw);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_join_broadcast_remove() {
        let hub = NotificationHub::new();
        let (watch_tx, mut watch_rx) = mpsc::channel(1024);
        hub.register(Identity::Table("t1".into()), &watch_tx);

        let mut tasks = Vec::new();
        for i in 0..32 {
            let hub = hub.clone();
            tasks.push(tokio::spawn(async move {
                let (tx, _rx) = mpsc::channel(4);
                let conn = hub.register(Identity::Staff(format!("s{i}")), &tx);
                hub.join(conn, RoomKey::table("t1"));
                hub.broadcast_to_room(&RoomKey::table("t1"), &msg(i));
                hub.remove(conn);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(hub.connection_count(), 1);
        assert_eq!(hub.room_count(), 1);
        assert_eq!(recv_all(&mut watch_rx).len(), 32);
    }
}
