use rstest::rstest;
use throttle_core::{Direction, DriveCommand, SensorRange, Zone};

fn cmd(range: &SensorRange, raw: u16, reversed: bool) -> DriveCommand {
    range.command_for(range.classify(raw), raw, reversed)
}

#[test]
fn dead_zone_and_unknown_are_all_off() {
    let range = SensorRange::default();
    assert_eq!(cmd(&range, 512, false), DriveCommand::AllOff);
    assert_eq!(cmd(&range, 512, true), DriveCommand::AllOff);
    assert_eq!(cmd(&range, 2000, false), DriveCommand::AllOff);
    // Defensive: even when handed a bogus zone/raw pairing, the rest zones
    // stay off.
    assert_eq!(
        range.command_for(Zone::Unknown, 0, false),
        DriveCommand::AllOff
    );
}

// Concrete scenario from the reference tuning: max 1023, dead zone 200,
// pwm max 255.
#[rstest]
#[case(1023, false, Direction::Forward, 255)]
#[case(0, false, Direction::Backward, 255)]
#[case(612, false, Direction::Forward, 0)]
#[case(411, false, Direction::Backward, 1)]
#[case(1023, true, Direction::Backward, 255)]
#[case(0, true, Direction::Forward, 255)]
fn reference_commands(
    #[case] raw: u16,
    #[case] reversed: bool,
    #[case] direction: Direction,
    #[case] magnitude: u16,
) {
    let range = SensorRange::default();
    assert_eq!(
        cmd(&range, raw, reversed),
        DriveCommand::Drive {
            direction,
            magnitude
        }
    );
}

#[test]
fn positive_magnitude_is_monotonic_non_decreasing() {
    let range = SensorRange::default();
    let mut last = 0;
    for raw in (range.dead_zone_upper() + 1)..=range.max_value() {
        let m = cmd(&range, raw, false).magnitude();
        assert!(m >= last, "magnitude dropped at raw {raw}");
        assert!(m <= range.pwm_max());
        last = m;
    }
    assert_eq!(last, range.pwm_max());
}

#[test]
fn negative_magnitude_is_monotonic_non_increasing() {
    let range = SensorRange::default();
    let mut last = range.pwm_max();
    for raw in 0..range.dead_zone_lower() {
        let m = cmd(&range, raw, false).magnitude();
        assert!(m <= last, "magnitude rose at raw {raw}");
        last = m;
    }
    // Just outside the dead zone the drive is nearly idle.
    assert!(last <= 1, "edge magnitude too high: {last}");
    assert_eq!(cmd(&range, 0, false).magnitude(), range.pwm_max());
}

#[test]
fn reversal_only_flips_direction_never_magnitude() {
    let range = SensorRange::default();
    for raw in [0, 100, 411, 612, 800, 1023] {
        let normal = cmd(&range, raw, false);
        let reversed = cmd(&range, raw, true);
        assert_eq!(normal.magnitude(), reversed.magnitude());
        assert_eq!(
            normal.direction().map(Direction::inverted),
            reversed.direction()
        );
    }
}
