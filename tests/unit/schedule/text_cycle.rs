use super::*;

#[test]
fn cycles_center_bottom_top() {
    let cycle = TextPositionCycle::new();
    assert_eq!(cycle.current(), Location::Top);

    let (a, cycle) = cycle.advance();
    let (b, cycle) = cycle.advance();
    let (c, cycle) = cycle.advance();
    let (d, _) = cycle.advance();
    assert_eq!(
        [a, b, c, d],
        [Location::Center, Location::Bottom, Location::Top, Location::Center]
    );
}

#[test]
fn advancing_a_copy_leaves_the_original_untouched() {
    let cycle = TextPositionCycle::new();
    let (_, advanced) = cycle.advance();
    assert_eq!(cycle.current(), Location::Top);
    assert_eq!(advanced.current(), Location::Center);
}
