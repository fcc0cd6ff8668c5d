mod common;

use axum::http::StatusCode;

use boardsync_backend::client::BoardReplica;
use boardsync_backend::domain::{BoardEvent, Card, List, SyncError};
use boardsync_backend::services::{CardService, ListService, MoveEngine, PositionIndex};
use boardsync_backend::sync::ChannelRegistry;

async fn positions_of(state: &boardsync_backend::api::AppState, list_id: &str) -> Vec<f64> {
    PositionIndex::list_cards(&state.db, list_id)
        .await
        .unwrap()
        .iter()
        .map(|c| c.position)
        .collect()
}

fn assert_unique_and_sorted(positions: &[f64]) {
    for pair in positions.windows(2) {
        assert!(
            pair[0] < pair[1],
            "positions not strictly ordered: {:?}",
            positions
        );
    }
}

#[tokio::test]
async fn move_to_head_lands_before_first_card() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];

    let a = common::create_card(&app, &token, &board_id, doing, "A").await;
    common::create_card(&app, &token, &board_id, doing, "B").await;
    let c = common::create_card(&app, &token, &board_id, doing, "C").await;

    // Doing holds A(0), B(1), C(2); moving C to index 0 must land strictly
    // before A and leave the sequence C, A, B.
    let (status, envelope) =
        common::move_card(&app, &token, c["id"].as_str().unwrap(), doing, 0).await;
    assert_eq!(status, StatusCode::OK);

    let moved = &envelope["card"];
    assert!(moved["position"].as_f64().unwrap() < a["position"].as_f64().unwrap());

    let titles = common::list_titles(&app, &token, &board_id, doing).await;
    assert_eq!(titles, ["C", "A", "B"]);

    assert_unique_and_sorted(&positions_of(&state, doing).await);
}

#[tokio::test]
async fn move_sole_card_to_empty_list_yields_order_zero() {
    let (app, _state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let todo = &lists[0];
    let done = &lists[2];

    let a = common::create_card(&app, &token, &board_id, todo, "A").await;

    let (status, envelope) =
        common::move_card(&app, &token, a["id"].as_str().unwrap(), done, 0).await;
    assert_eq!(status, StatusCode::OK);

    let moved = &envelope["card"];
    assert_eq!(moved["listId"].as_str().unwrap(), done.as_str());
    assert_eq!(moved["position"].as_f64().unwrap(), 0.0);
    assert_eq!(common::list_titles(&app, &token, &board_id, todo).await.len(), 0);
}

#[tokio::test]
async fn interior_move_lands_strictly_between_neighbors() {
    let (app, _state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];
    let done = &lists[2];

    let a = common::create_card(&app, &token, &board_id, doing, "A").await;
    let b = common::create_card(&app, &token, &board_id, doing, "B").await;
    let x = common::create_card(&app, &token, &board_id, done, "X").await;

    // Cross-list move into index 1 of Doing: strictly between A and B.
    let (status, envelope) =
        common::move_card(&app, &token, x["id"].as_str().unwrap(), doing, 1).await;
    assert_eq!(status, StatusCode::OK);

    let position = envelope["card"]["position"].as_f64().unwrap();
    assert!(position > a["position"].as_f64().unwrap());
    assert!(position < b["position"].as_f64().unwrap());

    let titles = common::list_titles(&app, &token, &board_id, doing).await;
    assert_eq!(titles, ["A", "X", "B"]);
}

#[tokio::test]
async fn index_past_end_clamps_to_append() {
    let (app, _state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];
    let done = &lists[2];

    common::create_card(&app, &token, &board_id, doing, "A").await;
    let x = common::create_card(&app, &token, &board_id, done, "X").await;

    let (status, _) = common::move_card(&app, &token, x["id"].as_str().unwrap(), doing, 99).await;
    assert_eq!(status, StatusCode::OK);

    let titles = common::list_titles(&app, &token, &board_id, doing).await;
    assert_eq!(titles, ["A", "X"]);
}

#[tokio::test]
async fn cross_board_move_is_rejected() {
    let (app, _state, token) = common::setup_app().await;
    let (board_a, lists_a) = common::create_board(&app, &token, "A").await;
    let (_board_b, lists_b) = common::create_board(&app, &token, "B").await;

    let card = common::create_card(&app, &token, &board_a, &lists_a[0], "Pinned").await;

    let (status, body) =
        common::move_card(&app, &token, card["id"].as_str().unwrap(), &lists_b[0], 0).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("different board"));
}

#[tokio::test]
async fn move_of_missing_card_is_not_found() {
    let (app, _state, token) = common::setup_app().await;
    let (_board_id, lists) = common::create_board(&app, &token, "Project").await;

    let (status, _) = common::move_card(&app, &token, "no-such-card", &lists[0], 0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn move_to_missing_list_is_not_found() {
    let (app, _state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let card = common::create_card(&app, &token, &board_id, &lists[0], "A").await;

    let (status, _) =
        common::move_card(&app, &token, card["id"].as_str().unwrap(), "no-such-list", 0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn random_move_sequence_keeps_orders_unique() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];

    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D", "E"] {
        let card = common::create_card(&app, &token, &board_id, doing, title).await;
        ids.push(card["id"].as_str().unwrap().to_string());
    }

    // Deterministic shuffle of (card, index) pairs, head-heavy to stress the
    // midpoint path.
    let moves = [
        (0usize, 4usize),
        (2, 0),
        (4, 1),
        (1, 3),
        (3, 0),
        (0, 0),
        (2, 2),
        (4, 0),
        (1, 1),
        (3, 4),
    ];
    for (card_index, destination_index) in moves {
        let (status, _) =
            common::move_card(&app, &token, &ids[card_index], doing, destination_index).await;
        assert_eq!(status, StatusCode::OK);

        assert_unique_and_sorted(&positions_of(&state, doing).await);
    }
}

#[tokio::test]
async fn renumbering_preserves_relative_order() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];
    let done = &lists[2];

    let a = common::create_card(&app, &token, &board_id, doing, "A").await;
    let b = common::create_card(&app, &token, &board_id, doing, "B").await;
    common::create_card(&app, &token, &board_id, doing, "C").await;
    let x = common::create_card(&app, &token, &board_id, done, "X").await;

    // Collapse the gap between A and B to a single ulp so the midpoint is
    // not representable and the engine must renumber.
    let lo = 1.0_f64;
    let hi = f64::from_bits(lo.to_bits() + 1);
    sqlx::query("UPDATE cards SET position = ? WHERE id = ?")
        .bind(lo)
        .bind(a["id"].as_str().unwrap())
        .execute(&state.db)
        .await
        .unwrap();
    sqlx::query("UPDATE cards SET position = ? WHERE id = ?")
        .bind(hi)
        .bind(b["id"].as_str().unwrap())
        .execute(&state.db)
        .await
        .unwrap();

    let (status, _) = common::move_card(&app, &token, x["id"].as_str().unwrap(), doing, 1).await;
    assert_eq!(status, StatusCode::OK);

    // Relative sequence survives the renumbering pass exactly.
    let titles = common::list_titles(&app, &token, &board_id, doing).await;
    assert_eq!(titles, ["A", "X", "B", "C"]);
    assert_unique_and_sorted(&positions_of(&state, doing).await);
}

#[tokio::test]
async fn stale_version_write_is_detected() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];

    let created = common::create_card(&app, &token, &board_id, doing, "A").await;
    let card_id = created["id"].as_str().unwrap();

    let stale: Card = CardService::get_card(&state.db, card_id).await.unwrap();
    // Another writer bumps the version behind our back.
    CardService::toggle_complete(&state.db, card_id).await.unwrap();

    let destination: List = ListService::get_list(&state.db, doing).await.unwrap();
    let result = PositionIndex::set_position(&state.db, &stale, &destination, 5.0).await;

    assert!(matches!(
        result,
        Err(SyncError::ConcurrentModification(_))
    ));

    // The engine re-reads and therefore still succeeds.
    let moved = MoveEngine::execute(&state.db, card_id, doing, 0).await.unwrap();
    assert_eq!(moved.version, stale.version + 2);
}

#[tokio::test]
async fn concurrent_same_list_moves_both_complete() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];

    let mut ids = Vec::new();
    for title in ["A", "B", "C", "D"] {
        let card = common::create_card(&app, &token, &board_id, doing, title).await;
        ids.push(card["id"].as_str().unwrap().to_string());
    }

    let app1 = app.clone();
    let app2 = app.clone();
    let token1 = token.clone();
    let token2 = token.clone();
    let id1 = ids[3].clone();
    let id2 = ids[2].clone();
    let doing1 = doing.clone();
    let doing2 = doing.clone();

    let (first, second) = tokio::join!(
        tokio::spawn(async move { common::move_card(&app1, &token1, &id1, &doing1, 0).await }),
        tokio::spawn(async move { common::move_card(&app2, &token2, &id2, &doing2, 0).await }),
    );

    assert_eq!(first.unwrap().0, StatusCode::OK);
    assert_eq!(second.unwrap().0, StatusCode::OK);

    // Both moves landed and no duplicate order values remain.
    assert_unique_and_sorted(&positions_of(&state, doing).await);
}

#[tokio::test]
async fn committed_move_fans_out_to_board_observers_only() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Watched").await;
    let (other_board, _other_lists) = common::create_board(&app, &token, "Elsewhere").await;
    let doing = &lists[1];

    let card = common::create_card(&app, &token, &board_id, &lists[0], "X").await;

    // Two observers of the board, one bystander on another board, wired
    // straight into the registry the way the socket handler does it.
    let (observer_a, mut rx_a) = register_connection(&state.registry);
    let (observer_b, mut rx_b) = register_connection(&state.registry);
    let (bystander, mut rx_c) = register_connection(&state.registry);
    state.registry.join(observer_a, &board_id);
    state.registry.join(observer_b, &board_id);
    state.registry.join(bystander, &other_board);

    let (status, _) = common::move_card(&app, &token, card["id"].as_str().unwrap(), doing, 0).await;
    assert_eq!(status, StatusCode::OK);

    for rx in [&mut rx_a, &mut rx_b] {
        let payload = rx.recv().await.expect("observer missed the event");
        let event: BoardEvent = serde_json::from_str(&payload).unwrap();
        match event {
            BoardEvent::CardModified { card: moved } => {
                assert_eq!(moved.list_id, doing.as_str());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        // Exactly one event per observer.
        assert!(rx.try_recv().is_err());
    }

    assert!(rx_c.try_recv().is_err(), "bystander received foreign event");
}

#[tokio::test]
async fn replica_converges_with_server_after_move() {
    let (app, state, token) = common::setup_app().await;
    let (board_id, lists) = common::create_board(&app, &token, "Project").await;
    let doing = &lists[1];
    let done = &lists[2];

    for title in ["A", "B", "C"] {
        common::create_card(&app, &token, &board_id, doing, title).await;
    }

    let server_lists = ListService::board_lists(&state.db, &board_id).await.unwrap();
    let server_cards = CardService::board_cards(&state.db, &board_id).await.unwrap();

    let mut replica = BoardReplica::new();
    replica.load(server_lists, server_cards.clone());

    let c_id = server_cards
        .iter()
        .find(|c| c.title == "C")
        .unwrap()
        .id
        .clone();

    // Drag end: speculate locally, then issue the authoritative request.
    let ticket = replica.apply_optimistic_move(&c_id, done, 0).unwrap();
    let (status, envelope) = common::move_card(&app, &token, &c_id, done, 0).await;
    assert_eq!(status, StatusCode::OK);

    let authoritative: Card = serde_json::from_value(envelope["card"].clone()).unwrap();
    replica.confirm(&c_id, ticket, authoritative);

    // Exactly one instance of the card, at the server's (listId, order).
    let server_side = CardService::get_card(&state.db, &c_id).await.unwrap();
    let local = replica.card(&c_id).unwrap();
    assert_eq!(local.list_id, server_side.list_id);
    assert_eq!(local.position, server_side.position);
    assert_eq!(replica.cards_in_list(done).len(), 1);
    assert_eq!(replica.cards_in_list(doing).len(), 2);
}

fn register_connection(
    registry: &ChannelRegistry,
) -> (
    boardsync_backend::sync::ConnectionId,
    tokio::sync::mpsc::UnboundedReceiver<String>,
) {
    let id = uuid::Uuid::new_v4();
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    registry.register(id, tx);
    (id, rx)
}
