//! Integration tests for the activation and check-in flow.
//!
//! These tests verify the end-to-end path:
//! 1. Creating an event publishes `event.created`; the bridge activates
//!    it immediately when its schedule is already inside the window
//! 2. The creator's code feed and the attendee check-in protocol agree
//!    on the rotating code
//! 3. The reconciliation loop converges the registry after schedule
//!    edits and after restarts, and never mutates on a failed fetch
//!
//! Uses the in-memory adapters throughout; nothing external.

use std::sync::Arc;

use rollcall::adapters::websocket::{
    ClientMessage, Gateway, RoomId, RoomManager, ServerMessage,
};
use rollcall::adapters::{InMemoryEventBus, InMemoryEventStore};
use rollcall::application::activation::{
    ActivationBridge, ActiveEventRegistry, ReconciliationLoop,
};
use rollcall::application::handlers::{
    CreateEventCommand, CreateEventHandler, EditEventCommand, EditEventHandler,
};
use rollcall::client::{
    Command, ConnectionStateMachine, Eligibility, Input, Role, ViewState,
};
use rollcall::config::ActivationConfig;
use rollcall::domain::event::EventRecord;
use rollcall::domain::foundation::{AuthenticatedUser, Timestamp, UserId};
use rollcall::ports::{EventStore, RoomBroadcaster};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Stack {
    store: Arc<InMemoryEventStore>,
    rooms: Arc<RoomManager>,
    registry: ActiveEventRegistry,
    gateway: Gateway,
    reconciler: ReconciliationLoop,
    create_handler: CreateEventHandler,
    edit_handler: EditEventHandler,
}

fn stack() -> Stack {
    let config = ActivationConfig::default();
    let store = Arc::new(InMemoryEventStore::new());
    let rooms = Arc::new(RoomManager::with_default_capacity());
    let registry =
        ActiveEventRegistry::new(config.clone(), rooms.clone() as Arc<dyn RoomBroadcaster>);

    let bus = Arc::new(InMemoryEventBus::new());
    ActivationBridge::register(
        registry.clone(),
        store.clone() as Arc<dyn EventStore>,
        config.clone(),
        bus.as_ref(),
    );

    let gateway = Gateway::new(registry.clone(), store.clone(), rooms.clone());
    let reconciler = ReconciliationLoop::new(store.clone(), registry.clone(), config);
    let create_handler = CreateEventHandler::new(store.clone(), bus.clone());
    let edit_handler = EditEventHandler::new(store.clone(), bus);

    Stack {
        store,
        rooms,
        registry,
        gateway,
        reconciler,
        create_handler,
        edit_handler,
    }
}

fn user(id: &str) -> AuthenticatedUser {
    AuthenticatedUser::new(UserId::new(id).unwrap(), format!("{id}@example.com"), None)
}

fn create_command(offset_start_mins: i64, offset_end_mins: i64) -> CreateEventCommand {
    let now = Timestamp::now();
    CreateEventCommand {
        name: "Distributed Systems Lecture".to_string(),
        description: None,
        time_start: now.plus_mins(offset_start_mins),
        time_end: now.plus_mins(offset_end_mins),
        requires_code: true,
        created_by: UserId::new("creator").unwrap(),
    }
}

// =============================================================================
// Immediate activation
// =============================================================================

#[tokio::test]
async fn creating_a_running_event_activates_it_with_a_code() {
    let stack = stack();

    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();

    // The bridge activated it off the bus; no reconcile tick needed.
    assert!(stack.registry.is_active(record.id()).await);

    // And the code exists synchronously, not after the first rotation.
    let code = stack.registry.current_code(record.id()).await.unwrap();
    assert_eq!(code.as_str().len(), 4);

    stack.registry.shutdown().await;
}

#[tokio::test]
async fn creating_a_far_future_event_does_not_activate_it() {
    let stack = stack();

    let record = stack
        .create_handler
        .handle(create_command(120, 180))
        .await
        .unwrap();

    assert!(!stack.registry.is_active(record.id()).await);
}

#[tokio::test]
async fn immediate_hook_and_tick_agree_on_one_activation() {
    let stack = stack();

    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();
    // The tick runs over the same store; the registry must not end up
    // with a second timer for the same id.
    stack.reconciler.tick().await.unwrap();
    stack.reconciler.tick().await.unwrap();

    assert_eq!(stack.registry.active_ids().await.len(), 1);
    assert!(stack.registry.is_active(record.id()).await);

    stack.registry.shutdown().await;
}

// =============================================================================
// Check-in protocol against live activation state
// =============================================================================

#[tokio::test]
async fn creator_feed_and_attendee_check_in_share_the_code() {
    let stack = stack();
    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();

    // Creator joins the code feed.
    let outcome = stack
        .gateway
        .handle(
            &user("creator"),
            ClientMessage::JoinCreator {
                event_id: record.id().to_string(),
            },
        )
        .await;
    let ServerMessage::CodeUpdate { code } = outcome.reply.unwrap() else {
        panic!("creator join must reply with the current code");
    };
    let mut creator_feed = outcome
        .subscriptions
        .into_iter()
        .find(|(room, _)| *room == RoomId::creator(*record.id()))
        .map(|(_, rx)| rx)
        .unwrap();

    // Attendee checks in with exactly that code.
    let outcome = stack
        .gateway
        .handle(
            &user("alice"),
            ClientMessage::CheckIn {
                event_id: record.id().to_string(),
                code,
                identity: None,
            },
        )
        .await;
    assert_eq!(outcome.reply, Some(ServerMessage::SuccessJoin));

    // The creator hears about the check-in on the feed.
    assert!(matches!(
        creator_feed.recv().await.unwrap(),
        ServerMessage::UserCheckedIn { user, .. } if user == "alice"
    ));

    // Persisted with implicit registration.
    let snapshot = stack.store.snapshot(record.id()).await.unwrap();
    assert!(snapshot.is_checked_in(&UserId::new("alice").unwrap()));
    assert!(snapshot.is_attending(&UserId::new("alice").unwrap()));

    stack.registry.shutdown().await;
}

#[tokio::test]
async fn chat_reaches_both_attendees_and_the_creator() {
    let stack = stack();
    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();
    let event_id = record.id().to_string();

    // Creator joins (mirrored chat membership included).
    let creator_outcome = stack
        .gateway
        .handle(
            &user("creator"),
            ClientMessage::JoinCreator {
                event_id: event_id.clone(),
            },
        )
        .await;
    let mut creator_chat = creator_outcome
        .subscriptions
        .into_iter()
        .find(|(room, _)| *room == RoomId::chat(*record.id()))
        .map(|(_, rx)| rx)
        .unwrap();

    // Attendee checks in and chats.
    let code = stack.registry.current_code(record.id()).await.unwrap();
    stack
        .gateway
        .handle(
            &user("alice"),
            ClientMessage::CheckIn {
                event_id: event_id.clone(),
                code: code.as_str().to_string(),
                identity: None,
            },
        )
        .await;

    let outcome = stack
        .gateway
        .handle(
            &user("alice"),
            ClientMessage::SendMessage {
                event_id,
                body: "hello everyone".to_string(),
            },
        )
        .await;
    assert!(outcome.reply.is_none());

    assert_eq!(
        creator_chat.recv().await.unwrap(),
        ServerMessage::ChatMessage {
            sender: "alice".to_string(),
            body: "hello everyone".to_string()
        }
    );

    stack.registry.shutdown().await;
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn reschedule_takes_effect_at_the_next_tick_and_evicts_rooms() {
    let stack = stack();
    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();

    // Creator is on the feed.
    let outcome = stack
        .gateway
        .handle(
            &user("creator"),
            ClientMessage::JoinCreator {
                event_id: record.id().to_string(),
            },
        )
        .await;
    let mut creator_feed = outcome
        .subscriptions
        .into_iter()
        .find(|(room, _)| *room == RoomId::creator(*record.id()))
        .map(|(_, rx)| rx)
        .unwrap();

    // Alice checks in while the event is live.
    let code = stack.registry.current_code(record.id()).await.unwrap();
    let outcome = stack
        .gateway
        .handle(
            &user("alice"),
            ClientMessage::CheckIn {
                event_id: record.id().to_string(),
                code: code.as_str().to_string(),
                identity: None,
            },
        )
        .await;
    assert_eq!(outcome.reply, Some(ServerMessage::SuccessJoin));
    assert!(matches!(
        creator_feed.recv().await.unwrap(),
        ServerMessage::UserCheckedIn { .. }
    ));

    // The creator moves the event into the past. Nothing happens yet:
    // edits converge at the next tick, not immediately.
    let now = Timestamp::now();
    stack
        .edit_handler
        .handle(EditEventCommand {
            event_id: *record.id(),
            time_start: now.minus_mins(120),
            time_end: now.minus_mins(60),
        })
        .await
        .unwrap();
    assert!(stack.registry.is_active(record.id()).await);

    // Tick: the event left the window, so it deactivates and both rooms
    // hear the terminal signal before their channels close.
    let outcome = stack.reconciler.tick().await.unwrap();
    assert_eq!(outcome.deactivated, 1);
    assert!(!stack.registry.is_active(record.id()).await);

    assert_eq!(creator_feed.recv().await.unwrap(), ServerMessage::EventEnded);
    assert!(creator_feed.recv().await.is_err());

    // Membership was revoked with the room.
    assert_eq!(
        stack
            .rooms
            .member_count(&RoomId::creator(*record.id()))
            .await,
        0
    );

    // Even Alice's persisted check-in cannot rejoin a dead event.
    let outcome = stack
        .gateway
        .handle(
            &user("alice"),
            ClientMessage::Rejoin {
                event_id: record.id().to_string(),
            },
        )
        .await;
    assert!(matches!(outcome.reply, Some(ServerMessage::Error { .. })));
}

#[tokio::test]
async fn restart_rebuilds_active_state_from_the_store() {
    let config = ActivationConfig::default();
    let store = Arc::new(InMemoryEventStore::new());

    let now = Timestamp::now();
    let record = store
        .create_event(
            EventRecord::new(
                "Distributed Systems Lecture",
                None,
                now.minus_mins(5),
                now.plus_mins(55),
                UserId::new("creator").unwrap(),
                true,
            )
            .unwrap(),
        )
        .await
        .unwrap();

    // A fresh process: empty registry, no timer survived.
    let rooms = Arc::new(RoomManager::with_default_capacity());
    let registry =
        ActiveEventRegistry::new(config.clone(), rooms as Arc<dyn RoomBroadcaster>);
    let reconciler = ReconciliationLoop::new(store.clone(), registry.clone(), config);

    assert!(!registry.is_active(record.id()).await);
    reconciler.tick().await.unwrap();
    assert!(registry.is_active(record.id()).await);
    assert!(registry.current_code(record.id()).await.is_some());

    registry.shutdown().await;
}

#[tokio::test]
async fn store_outage_does_not_evict_live_events() {
    let stack = stack();
    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();

    stack.store.set_fail_fetch(true);
    assert!(stack.reconciler.tick().await.is_err());
    assert!(stack.registry.is_active(record.id()).await);

    stack.store.set_fail_fetch(false);
    stack.reconciler.tick().await.unwrap();
    assert!(stack.registry.is_active(record.id()).await);

    stack.registry.shutdown().await;
}

// =============================================================================
// Client state machine against real gateway replies
// =============================================================================

#[tokio::test]
async fn attendee_machine_walks_lobby_to_chat_against_the_gateway() {
    let stack = stack();
    let record = stack.create_handler.handle(create_command(0, 60)).await.unwrap();
    let alice = user("alice");

    let mut machine = ConnectionStateMachine::new();
    assert_eq!(machine.on_connected(), vec![Command::EmitIsActive]);

    // is_active for a live event stays silent, so no input arrives;
    // the eligibility fetch resolves the attendee with a code form.
    let outcome = stack
        .gateway
        .handle(
            &alice,
            ClientMessage::IsActive {
                event_id: record.id().to_string(),
            },
        )
        .await;
    assert!(outcome.reply.is_none());

    let commands = machine.apply(Input::EligibilityResolved(Eligibility {
        role: Role::Attendee,
        requires_code: true,
        already_checked_in: false,
    }));
    assert!(commands.is_empty());
    assert_eq!(machine.view(), ViewState::AttendeeLobby);

    // The user submits the code; the gateway's reply feeds the machine.
    let code = stack.registry.current_code(record.id()).await.unwrap();
    let outcome = stack
        .gateway
        .handle(
            &alice,
            ClientMessage::CheckIn {
                event_id: record.id().to_string(),
                code: code.as_str().to_string(),
                identity: None,
            },
        )
        .await;
    assert_eq!(outcome.reply, Some(ServerMessage::SuccessJoin));

    machine.apply(Input::GatewaySuccessJoin);
    assert_eq!(machine.view(), ViewState::AttendeeChat);

    stack.registry.shutdown().await;
}

#[tokio::test]
async fn machine_lands_on_not_active_for_a_dead_event() {
    let stack = stack();
    // Never activated: scheduled far in the future.
    let record = stack
        .create_handler
        .handle(create_command(120, 180))
        .await
        .unwrap();

    let mut machine = ConnectionStateMachine::new();

    let outcome = stack
        .gateway
        .handle(
            &user("alice"),
            ClientMessage::IsActive {
                event_id: record.id().to_string(),
            },
        )
        .await;
    assert_eq!(outcome.reply, Some(ServerMessage::NotActive));

    // The gateway answered before the role fetch; the machine caches it.
    machine.apply(Input::GatewayNotActive);
    assert_eq!(machine.view(), ViewState::Loading);

    machine.apply(Input::EligibilityResolved(Eligibility {
        role: Role::Attendee,
        requires_code: true,
        already_checked_in: false,
    }));
    assert_eq!(machine.view(), ViewState::NotActive);
}
