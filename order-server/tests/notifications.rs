//! 订单事件的房间分发

mod common;

use common::*;
use order_server::hub::{Frame, Identity, RoomKey};
use shared::message::EventType;
use tokio::sync::mpsc;

fn outbox() -> (mpsc::Sender<Frame>, mpsc::Receiver<Frame>) {
    mpsc::channel(32)
}

#[tokio::test]
async fn test_new_order_reaches_every_connection() {
    let state = memory_state().await;
    let table = seed_table(&state, 7).await;
    let soup = seed_food(&state, "Soup", 10).await;
    let bread = seed_food(&state, "Bread", 5).await;

    let (staff_tx, mut staff_rx) = outbox();
    let (table_tx, mut table_rx) = outbox();
    let (anon_tx, mut anon_rx) = outbox();
    state.hub.register(Identity::Staff("staff-a".into()), &staff_tx);
    state.hub.register(Identity::Table("elsewhere".into()), &table_tx);
    state.hub.register(Identity::Anonymous, &anon_tx);

    let order = state
        .orders
        .create_order(order_request(&table.id, &[(&soup.id, 2), (&bread.id, 1)]))
        .await
        .unwrap();

    for rx in [&mut staff_rx, &mut table_rx, &mut anon_rx] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event_type(), Some(EventType::NewOrder));
        assert_eq!(frames[0].data["id"], order.id.as_str());
        assert_eq!(frames[0].data["total"], 25);
        assert_eq!(frames[0].data["table"]["number"], 7);
        assert_eq!(frames[0].data["items"].as_array().map(Vec::len), Some(2));
    }
}

#[tokio::test]
async fn test_failed_create_publishes_nothing() {
    let state = memory_state().await;
    let table = seed_table(&state, 1).await;
    let (tx, mut rx) = outbox();
    state.hub.register(Identity::Staff("staff-a".into()), &tx);

    let result = state
        .orders
        .create_order(order_request(&table.id, &[("ghost", 1)]))
        .await;

    assert!(result.is_err());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_claim_is_broadcast_to_all_and_complete_to_table_and_claimant() {
    let state = memory_state().await;
    let table = seed_table(&state, 4).await;
    let other_table = seed_table(&state, 5).await;
    let soup = seed_food(&state, "Soup", 10).await;
    let order = state
        .orders
        .create_order(order_request(&table.id, &[(&soup.id, 1)]))
        .await
        .unwrap();

    let (guest_tx, mut guest_rx) = outbox();
    let (neighbour_tx, mut neighbour_rx) = outbox();
    let (claimant_tx, mut claimant_rx) = outbox();
    let (colleague_tx, mut colleague_rx) = outbox();
    state.hub.register(Identity::Table(table.id.clone()), &guest_tx);
    state
        .hub
        .register(Identity::Table(other_table.id.clone()), &neighbour_tx);
    state.hub.register(Identity::Staff("staff-a".into()), &claimant_tx);
    state.hub.register(Identity::Staff("staff-b".into()), &colleague_tx);

    state.state_machine.claim(&order.id, "staff-a").await.unwrap();
    for rx in [
        &mut guest_rx,
        &mut neighbour_rx,
        &mut claimant_rx,
        &mut colleague_rx,
    ] {
        let frames = drain(rx);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event_type(), Some(EventType::StatusUpdated));
        assert_eq!(frames[0].data["status"], "in_process");
        assert_eq!(frames[0].data["claimed_by"], "staff-a");
    }

    state.state_machine.complete(&order.id, "staff-a").await.unwrap();

    let guest = drain(&mut guest_rx);
    assert_eq!(guest.len(), 1);
    assert_eq!(guest[0].data["status"], "done");
    assert_eq!(guest[0].data["table"]["number"], 4);

    let claimant = drain(&mut claimant_rx);
    assert_eq!(claimant.len(), 1);
    assert_eq!(claimant[0].data["id"], order.id.as_str());

    assert!(drain(&mut neighbour_rx).is_empty());
    assert!(drain(&mut colleague_rx).is_empty());
}

#[tokio::test]
async fn test_rejected_transitions_publish_nothing() {
    let state = memory_state().await;
    let table = seed_table(&state, 1).await;
    let soup = seed_food(&state, "Soup", 10).await;
    let order = state
        .orders
        .create_order(order_request(&table.id, &[(&soup.id, 1)]))
        .await
        .unwrap();
    state.state_machine.claim(&order.id, "staff-a").await.unwrap();

    let (tx, mut rx) = outbox();
    state.hub.register(Identity::Table(table.id.clone()), &tx);

    assert!(state.state_machine.claim(&order.id, "staff-b").await.is_err());
    assert!(state.state_machine.complete(&order.id, "staff-b").await.is_err());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_staff_room_spans_every_connection_of_that_staff() {
    let state = memory_state().await;
    let table = seed_table(&state, 1).await;
    let soup = seed_food(&state, "Soup", 10).await;
    let order = state
        .orders
        .create_order(order_request(&table.id, &[(&soup.id, 1)]))
        .await
        .unwrap();

    let (phone_tx, mut phone_rx) = outbox();
    let (tablet_tx, mut tablet_rx) = outbox();
    state.hub.register(Identity::Staff("staff-a".into()), &phone_tx);
    state.hub.register(Identity::Staff("staff-a".into()), &tablet_tx);
    assert_eq!(state.hub.room_size(&RoomKey::staff("staff-a")), 2);

    state.state_machine.claim(&order.id, "staff-a").await.unwrap();
    drain(&mut phone_rx);
    drain(&mut tablet_rx);

    state.state_machine.complete(&order.id, "staff-a").await.unwrap();
    assert_eq!(drain(&mut phone_rx).len(), 1);
    assert_eq!(drain(&mut tablet_rx).len(), 1);
}
