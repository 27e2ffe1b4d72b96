use mindmap_core::{
    ActionKind, ConnectionPatch, ConnectionStyle, EditKind, EngineConfig, GraphEngine, GraphError,
    GraphState, NodeColor, NodePatch, NodeSize, MAX_ZOOM, MIN_ZOOM,
};
use uuid::Uuid;

fn engine_with_nodes(count: usize) -> (GraphEngine, Vec<Uuid>) {
    let mut engine = GraphEngine::default();
    let ids = (0..count)
        .map(|index| {
            let offset = index as f64 * 100.0;
            engine.add_node(offset, offset).unwrap().id
        })
        .collect();
    (engine, ids)
}

#[test]
fn add_add_connect_then_undo_back_to_empty() {
    let mut engine = GraphEngine::default();
    let n1 = engine.add_node(100.0, 100.0).unwrap();
    let n2 = engine.add_node(200.0, 200.0).unwrap();
    engine.add_connection(n1.id, n2.id, None, None).unwrap();

    // Baseline plus one snapshot per mutation.
    assert_eq!(engine.history().len(), 4);
    assert_eq!(engine.history().position(), 3);

    assert!(engine.undo());
    assert!(engine.state().connections.is_empty());
    assert_eq!(engine.state().nodes.len(), 2);

    assert!(engine.undo());
    assert!(engine.undo());
    assert!(engine.state().is_empty());
    assert!(!engine.undo());
    assert_eq!(engine.history().position(), 0);
}

#[test]
fn deleting_node_cascades_connections_in_one_step() {
    let (mut engine, ids) = engine_with_nodes(3);
    engine.add_connection(ids[0], ids[1], None, None).unwrap();
    engine.add_connection(ids[2], ids[0], None, None).unwrap();
    let keep = engine.add_connection(ids[1], ids[2], None, None).unwrap();
    let before = engine.state().clone();
    let history_len = engine.history().len();

    assert!(engine.delete_node(ids[0]));

    let state = engine.state();
    assert!(state.node(ids[0]).is_none());
    assert_eq!(state.connections.len(), 1);
    assert_eq!(state.connections[0].id, keep.id);
    assert!(state.connections.iter().all(|c| !c.touches(ids[0])));
    assert_eq!(engine.history().len(), history_len + 1);

    assert!(engine.undo());
    assert_eq!(engine.state(), &before);
}

#[test]
fn undo_restores_prior_state_and_redo_restores_undone_state() {
    let (mut engine, ids) = engine_with_nodes(2);
    let (a, b) = (ids[0], ids[1]);
    let connection_id = engine.add_connection(a, b, None, None).unwrap().id;

    let edits: Vec<Box<dyn Fn(&mut GraphEngine)>> = vec![
        Box::new(|engine: &mut GraphEngine| {
            engine.add_node(5.0, 5.0).unwrap();
        }),
        Box::new(move |engine: &mut GraphEngine| {
            engine.update_node(a, &NodePatch::text("Renamed")).unwrap();
        }),
        Box::new(move |engine: &mut GraphEngine| {
            engine
                .update_node(b, &NodePatch::size(NodeSize::Large))
                .unwrap();
        }),
        Box::new(move |engine: &mut GraphEngine| {
            let patch = ConnectionPatch {
                style: Some(ConnectionStyle::Dotted),
                ..ConnectionPatch::default()
            };
            engine.update_connection(connection_id, &patch).unwrap();
        }),
        Box::new(move |engine: &mut GraphEngine| {
            assert!(engine.delete_connection(connection_id));
        }),
        Box::new(move |engine: &mut GraphEngine| {
            assert!(engine.delete_node(b));
        }),
    ];

    for edit in edits {
        let before = engine.state().clone();
        edit(&mut engine);
        let after = engine.state().clone();
        assert_ne!(before, after);

        assert!(engine.undo());
        assert_eq!(engine.state(), &before);
        assert!(engine.redo());
        assert_eq!(engine.state(), &after);
    }
}

#[test]
fn new_mutation_after_undo_discards_redo_branch() {
    let (mut engine, _) = engine_with_nodes(2);
    assert!(engine.undo());
    assert!(engine.can_redo());

    engine.add_node(400.0, 400.0).unwrap();
    assert!(!engine.can_redo());
    assert!(!engine.redo());
    assert_eq!(engine.state().nodes.len(), 2);
}

#[test]
fn self_connection_is_never_created() {
    let (mut engine, ids) = engine_with_nodes(3);
    for id in &ids {
        let err = engine.add_connection(*id, *id, None, None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConnection { .. }));
    }
    assert!(engine.state().connections.is_empty());
}

#[test]
fn connection_to_missing_node_is_rejected() {
    let (mut engine, ids) = engine_with_nodes(1);
    let missing = Uuid::new_v4();
    assert!(engine.add_connection(ids[0], missing, None, None).is_err());
    assert!(engine.add_connection(missing, ids[0], None, None).is_err());
    assert!(engine.state().connections.is_empty());
}

#[test]
fn duplicate_connections_follow_config() {
    let (mut deduped, ids) = engine_with_nodes(2);
    let first = deduped.add_connection(ids[0], ids[1], None, None).unwrap();
    assert_eq!(
        deduped.add_connection(ids[0], ids[1], None, None),
        Err(GraphError::DuplicateConnection(first.id))
    );
    // Reverse direction is a different connection.
    assert!(deduped.add_connection(ids[1], ids[0], None, None).is_ok());

    let mut literal = GraphEngine::new(EngineConfig::uncoalesced());
    let a = literal.add_node(0.0, 0.0).unwrap().id;
    let b = literal.add_node(50.0, 0.0).unwrap().id;
    literal.add_connection(a, b, None, None).unwrap();
    literal.add_connection(a, b, None, None).unwrap();
    assert_eq!(literal.state().connections.len(), 2);
}

#[test]
fn connected_nodes_covers_both_directions_once() {
    let (mut engine, ids) = engine_with_nodes(4);
    engine.add_connection(ids[0], ids[1], None, None).unwrap();
    engine.add_connection(ids[2], ids[0], None, None).unwrap();
    engine.add_connection(ids[1], ids[0], None, None).unwrap();

    let neighbors: Vec<Uuid> = engine
        .connected_nodes(ids[0])
        .iter()
        .map(|node| node.id)
        .collect();
    assert_eq!(neighbors, vec![ids[1], ids[2]]);
    assert!(engine.connected_nodes(ids[3]).is_empty());
    assert!(engine.connected_nodes(Uuid::new_v4()).is_empty());
}

#[test]
fn node_edits_apply_color_size_and_text() {
    let (mut engine, ids) = engine_with_nodes(1);
    let patch = NodePatch {
        text: Some("Goals".to_string()),
        color: Some(NodeColor::parse("#FFAA00").unwrap()),
        size: Some(NodeSize::Small),
        ..NodePatch::default()
    };
    engine.update_node(ids[0], &patch).unwrap();

    let node = engine.node(ids[0]).unwrap();
    assert_eq!(node.text, "Goals");
    assert_eq!(node.color.as_str(), "#ffaa00");
    assert_eq!(node.size, NodeSize::Small);
    assert_eq!(engine.action_log().latest().unwrap().action, ActionKind::EditNode);
}

#[test]
fn non_finite_position_is_rejected() {
    let (mut engine, ids) = engine_with_nodes(1);
    assert!(engine.add_node(f64::NAN, 0.0).is_err());
    assert!(engine
        .update_node(ids[0], &NodePatch::position(f64::INFINITY, 1.0))
        .is_err());
    assert_eq!(engine.state().nodes.len(), 1);
}

#[test]
fn drag_session_coalesces_into_one_history_and_log_entry() {
    let (mut engine, ids) = engine_with_nodes(1);
    let before = engine.state().clone();
    let history_len = engine.history().len();
    let log_len = engine.action_log().len();

    engine.begin_edit_session(EditKind::Drag, ids[0]);
    for step in 1..=5 {
        let offset = step as f64 * 10.0;
        engine
            .update_node(ids[0], &NodePatch::position(offset, offset))
            .unwrap();
    }
    engine.end_edit_session();

    assert_eq!(engine.history().len(), history_len + 1);
    assert_eq!(engine.action_log().len(), log_len + 1);
    assert_eq!(
        engine.action_log().latest().unwrap().action,
        ActionKind::MoveNode
    );
    let node = engine.node(ids[0]).unwrap();
    assert_eq!((node.x, node.y), (50.0, 50.0));

    assert!(engine.undo());
    assert_eq!(engine.state(), &before);
}

#[test]
fn uncoalesced_engine_records_every_move() {
    let mut engine = GraphEngine::new(EngineConfig::uncoalesced());
    let id = engine.add_node(0.0, 0.0).unwrap().id;
    let history_len = engine.history().len();

    engine.begin_edit_session(EditKind::Drag, id);
    engine.update_node(id, &NodePatch::position(1.0, 1.0)).unwrap();
    engine.update_node(id, &NodePatch::position(2.0, 2.0)).unwrap();
    engine.end_edit_session();

    assert_eq!(engine.history().len(), history_len + 2);
}

#[test]
fn history_limit_drops_oldest_snapshots() {
    let config = EngineConfig {
        history_limit: Some(3),
        ..EngineConfig::default()
    };
    let mut engine = GraphEngine::new(config);
    for index in 0..6 {
        engine.add_node(index as f64, 0.0).unwrap();
    }
    assert_eq!(engine.history().len(), 3);

    assert!(engine.undo());
    assert!(engine.undo());
    assert!(!engine.undo());
    assert_eq!(engine.state().nodes.len(), 4);
}

#[test]
fn zoom_stays_within_bounds_for_any_deltas() {
    let mut engine = GraphEngine::default();
    for delta in [0.3, 0.3, 0.3, 0.3, 0.3, -4.0, -0.1, 1e9, f64::NAN, -1e9, 0.25] {
        let zoom = engine.zoom_by(delta);
        assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom), "zoom {zoom}");
    }
    assert_eq!(engine.set_zoom(10.0), MAX_ZOOM);
    assert_eq!(engine.set_zoom(0.0), MIN_ZOOM);
}

#[test]
fn action_log_is_newest_first_and_skips_failures() {
    let (mut engine, ids) = engine_with_nodes(2);
    let _ = engine.add_connection(ids[0], ids[0], None, None);
    engine.add_connection(ids[0], ids[1], None, None).unwrap();
    engine.undo();

    let actions: Vec<ActionKind> = engine.action_log().entries().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            ActionKind::Undo,
            ActionKind::AddConnection,
            ActionKind::AddNode,
            ActionKind::AddNode,
        ]
    );
    let timestamps: Vec<i64> = engine
        .action_log()
        .entries()
        .map(|e| e.timestamp_ms)
        .collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn engine_state_always_validates() {
    let (mut engine, ids) = engine_with_nodes(3);
    engine.add_connection(ids[0], ids[1], None, None).unwrap();
    engine.add_connection(ids[1], ids[2], None, None).unwrap();
    engine.delete_node(ids[1]);
    engine.undo();
    engine.delete_node(ids[2]);

    assert_eq!(engine.state().validate(), Ok(()));
    assert_ne!(engine.state(), &GraphState::new());
}

#[test]
fn zoom_deltas_clamp_at_each_step() {
    let mut engine = GraphEngine::default();
    assert_eq!(engine.zoom(), 1.0);
    engine.zoom_by(0.7);
    assert_eq!(engine.zoom_by(0.7), MAX_ZOOM);
    assert_eq!(engine.zoom_by(-3.0), MIN_ZOOM);
}
