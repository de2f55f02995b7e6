//! Outline demo application
//!
//! Plays the part of an outline panel: loads the editor configuration,
//! opens a small scene and replays a scripted series of drags, menu picks
//! and undo/redo, printing the outline after every step.
//!
//! Usage: `outline_demo [config.toml|config.ron]`

use scene_editor::config::{Config, ConfigError};
use scene_editor::foundation::logging;
use scene_editor::prelude::*;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Editor(#[from] EditorError),
}

/// One scripted UI gesture, entities named the way a user sees them
#[derive(Debug)]
enum UiEvent {
    Click(&'static str),
    Drag {
        dragged: &'static str,
        onto: Option<&'static str>,
    },
    Menu(MenuAction, Option<&'static str>),
    Undo,
    Redo,
}

fn main() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => EditorConfig::load_from_file(path)?,
        None => EditorConfig::default(),
    };
    config.validate()?;
    logging::init(&config.log_level);

    log::info!("Creating scene editor...");
    let editor = SceneEditor::new(config);
    editor.on_structural_change(|editor, change| {
        log::info!("scene changed: {change:?} ({} entities)", editor.graph().len());
    });
    editor.on_selection_changed(|_, selected| log::info!("selection: {selected:?}"));

    editor.open_scene(sample_scene())?;
    print_outline(&editor);

    let script = [
        UiEvent::Click("Lamp"),
        UiEvent::Drag {
            dragged: "Lamp",
            onto: Some("Tree"),
        },
        UiEvent::Menu(MenuAction::Duplicate, Some("House")),
        UiEvent::Menu(MenuAction::AddTerrain, None),
        UiEvent::Menu(MenuAction::Rename("Cottage".to_string()), Some("House")),
        UiEvent::Menu(MenuAction::Delete, Some("Tree")),
        UiEvent::Undo,
        UiEvent::Redo,
        UiEvent::Undo,
        UiEvent::Drag {
            dragged: "Level",
            onto: Some("Cottage"),
        },
    ];

    for event in script {
        println!("> {event:?}");
        if let Err(err) = replay(&editor, &event) {
            log::warn!("{event:?} failed: {err}");
        }
        print_outline(&editor);
    }

    log::info!("Undo history: {:?}", editor.history().entries().collect::<Vec<_>>());
    Ok(())
}

/// Level ── House(5,0,0) ── Lamp(1,2,0)
/// Tree(-3,0,4)
fn sample_scene() -> Vec<Subtree> {
    let id = EntityId::new;
    vec![
        Subtree::new(Entity::new(id(1), "Level")).with_child(
            Subtree::new(Entity::new(id(2), "House").with_transform(Transform::from_xyz(5.0, 0.0, 0.0)))
                .with_child(Entity::new(id(3), "Lamp").with_transform(Transform::from_xyz(1.0, 2.0, 0.0))),
        ),
        Subtree::from(Entity::new(id(4), "Tree").with_transform(Transform::from_xyz(-3.0, 0.0, 4.0))),
    ]
}

fn replay(editor: &SceneEditor, event: &UiEvent) -> Result<(), EditorError> {
    match event {
        UiEvent::Click(name) => {
            editor.select(find(editor, name));
        }
        UiEvent::Drag { dragged, onto } => {
            let from_row = row_of(editor, dragged);
            // Past the last row means empty space, i.e. root level
            let to_row = onto.and_then(|name| row_of(editor, name)).unwrap_or(usize::MAX);
            let Some(drop) = from_row.and_then(|from| editor.outline().resolve_drop(from, to_row)) else {
                log::warn!("nothing to drag at '{dragged}'");
                return Ok(());
            };
            editor.handle_drop(drop)?;
        }
        UiEvent::Menu(action, target) => {
            let target = target.and_then(|name| find(editor, name));
            if !editor.menu_for(target).contains(action.item()) {
                log::info!("'{action}' is greyed out for {target:?}");
            }
            if let Some(created) = editor.perform(action.clone(), target)? {
                log::info!("'{action}' created entity {created}");
            }
        }
        UiEvent::Undo => editor.undo()?,
        UiEvent::Redo => editor.redo()?,
    }
    Ok(())
}

fn find(editor: &SceneEditor, name: &str) -> Option<EntityId> {
    editor
        .graph()
        .traverse()
        .iter()
        .find(|(entity, _)| entity.name() == name)
        .map(|(entity, _)| entity.id())
}

fn row_of(editor: &SceneEditor, name: &str) -> Option<usize> {
    let entity = find(editor, name)?;
    editor
        .outline()
        .visible_rows()
        .iter()
        .position(|node| node.entity() == entity)
}

fn print_outline(editor: &SceneEditor) {
    let graph = editor.graph();
    for node in editor.outline().visible_rows() {
        let marker = if node.is_highlighted() { "*" } else { " " };
        let world = graph
            .world_position(node.entity())
            .map(|p| format!("({:.1}, {:.1}, {:.1})", p.x, p.y, p.z))
            .unwrap_or_default();
        println!("{marker} {}{} {world}", "  ".repeat(node.depth()), node.label());
    }
}
