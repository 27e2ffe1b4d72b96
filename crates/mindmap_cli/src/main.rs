//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mindmap_core` linkage.
//! - Run one scripted editing session through the controller and storage.
//! - Keep output deterministic for quick local sanity checks (counts, no ids).

use mindmap_core::db::open_db_in_memory;
use mindmap_core::{
    Command, EngineConfig, GraphEngine, GraphPersistence, InteractionController, ScreenPoint,
    SqliteSlotStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("mindmap_core ping={}", mindmap_core::ping());
    println!("mindmap_core version={}", mindmap_core::core_version());

    match scripted_session() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("mindmap_cli error={message}");
            ExitCode::FAILURE
        }
    }
}

fn scripted_session() -> Result<(), String> {
    let config = EngineConfig::default();
    let slot_key = config.slot_key.clone();
    let mut engine = GraphEngine::new(config);
    let mut controller = InteractionController::default();

    let script = [
        Command::PointerDown(ScreenPoint::new(100.0, 100.0)),
        Command::PointerUp(ScreenPoint::new(100.0, 100.0)),
        Command::PointerDown(ScreenPoint::new(300.0, 100.0)),
        Command::PointerUp(ScreenPoint::new(300.0, 100.0)),
        Command::PointerDown(ScreenPoint::new(100.0, 100.0)),
        Command::PointerMove(ScreenPoint::new(120.0, 140.0)),
        Command::PointerUp(ScreenPoint::new(120.0, 140.0)),
        Command::ToggleConnect,
        Command::PointerUp(ScreenPoint::new(300.0, 100.0)),
        Command::ZoomBy(0.5),
    ];
    for command in script {
        controller.handle(&mut engine, command);
    }
    println!(
        "session nodes={} connections={} zoom={:.1} undo={}",
        engine.state().nodes.len(),
        engine.state().connections.len(),
        engine.zoom(),
        engine.can_undo()
    );

    let conn = open_db_in_memory().map_err(|err| err.to_string())?;
    let store = SqliteSlotStore::try_new(&conn).map_err(|err| err.to_string())?;
    let persistence = GraphPersistence::new(store, slot_key);
    engine.save_to(&persistence).map_err(|err| err.to_string())?;

    let mut reloaded = GraphEngine::new(EngineConfig::default());
    if !reloaded.load_from(&persistence) {
        return Err("saved diagram could not be loaded".to_string());
    }
    println!(
        "reload nodes={} connections={} matches={}",
        reloaded.state().nodes.len(),
        reloaded.state().connections.len(),
        reloaded.state() == engine.state()
    );

    for entry in engine.action_log().entries() {
        println!("log action={:?}", entry.action);
    }
    Ok(())
}
