use bevy::prelude::*;
use engine::InputIntent;
use leafwing_input_manager::prelude::*;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Restart,
    DebugSkip,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Forward, KeyCode::ArrowUp);
    input_map.insert(InputAction::Back, KeyCode::KeyS);
    input_map.insert(InputAction::Back, KeyCode::ArrowDown);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Left, KeyCode::ArrowLeft);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Right, KeyCode::ArrowRight);
    input_map.insert(InputAction::Jump, KeyCode::Space);
    input_map.insert(InputAction::Restart, KeyCode::KeyR);
    input_map.insert(InputAction::DebugSkip, KeyCode::KeyP);
    app.insert_resource(input_map);
    app.insert_resource(ActionState::<InputAction>::default());
}

/// Snapshot the action state as gameplay intents. Jump, restart and skip are edge-triggered.
pub fn intent(actions: &ActionState<InputAction>) -> InputIntent {
    InputIntent {
        forward: actions.pressed(&InputAction::Forward),
        back: actions.pressed(&InputAction::Back),
        left: actions.pressed(&InputAction::Left),
        right: actions.pressed(&InputAction::Right),
        jump: actions.just_pressed(&InputAction::Jump),
        restart: actions.just_pressed(&InputAction::Restart),
        debug_skip: actions.just_pressed(&InputAction::DebugSkip),
    }
}
