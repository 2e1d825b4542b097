use super::*;

#[test]
fn arrow_keys_route_to_steps() {
    assert_eq!(route_key(Key::ArrowLeft), Some(StepDirection::Back));
    assert_eq!(route_key(Key::ArrowRight), Some(StepDirection::Forward));
}

#[test]
fn other_keys_route_nowhere() {
    assert_eq!(route_key(Key::Other), None);
}

#[test]
fn step_deltas_are_unit_sized() {
    assert_eq!(StepDirection::Back.delta(), -1);
    assert_eq!(StepDirection::Forward.delta(), 1);
}
