use super::*;

use crate::testing::{AnimationCall, RecordingAnimation};

fn load(path: &str, looping: bool) -> AnimationCall {
    AnimationCall::Load {
        path: path.into(),
        looping,
    }
}

#[test]
fn same_path_is_loaded_once() {
    let player = RecordingAnimation::new();
    let mut slot = AnimationSlot::new(Some(Box::new(player.clone())));

    slot.play(Some("/static/loader.json"), true);
    slot.play(Some("/static/loader.json"), true);

    assert_eq!(player.calls(), vec![load("/static/loader.json", true)]);
    assert_eq!(slot.current_path(), Some("/static/loader.json"));
}

#[test]
fn switching_paths_destroys_previous_instance_first() {
    let player = RecordingAnimation::new();
    let mut slot = AnimationSlot::new(Some(Box::new(player.clone())));

    slot.play(Some("/static/loader.json"), true);
    slot.play(Some("/static/check.json"), false);

    assert_eq!(
        player.calls(),
        vec![
            load("/static/loader.json", true),
            AnimationCall::Destroy,
            load("/static/check.json", false),
        ]
    );
}

#[test]
fn missing_player_or_path_is_a_no_op() {
    let mut slot = AnimationSlot::new(None);
    slot.play(Some("/static/loader.json"), true);
    assert_eq!(slot.current_path(), None);

    let player = RecordingAnimation::new();
    let mut slot = AnimationSlot::new(Some(Box::new(player.clone())));
    slot.play(None, true);
    assert!(player.calls().is_empty());
}

#[test]
fn failed_load_leaves_slot_empty_and_retries_next_time() {
    let player = RecordingAnimation::new();
    player.fail_on("/static/missing.json");
    let mut slot = AnimationSlot::new(Some(Box::new(player.clone())));

    slot.play(Some("/static/missing.json"), true);
    assert_eq!(slot.current_path(), None);

    slot.play(Some("/static/loader.json"), true);
    assert_eq!(player.calls(), vec![load("/static/loader.json", true)]);
}
