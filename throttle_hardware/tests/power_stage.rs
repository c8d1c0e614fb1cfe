use rstest::rstest;
use throttle_hardware::SimulatedPowerStage;
use throttle_traits::{Direction, DriveCommand, PowerStage};

#[rstest]
#[case(Direction::Forward, 200, (true, false))]
#[case(Direction::Backward, 17, (false, true))]
fn drive_activates_exactly_one_line(
    #[case] direction: Direction,
    #[case] magnitude: u16,
    #[case] expected_lines: (bool, bool),
) {
    let mut stage = SimulatedPowerStage::new();
    stage
        .apply(DriveCommand::Drive {
            direction,
            magnitude,
        })
        .unwrap();
    assert_eq!(stage.line_states(), expected_lines);
    assert_eq!(stage.magnitude(), magnitude);
}

#[test]
fn all_off_clears_both_lines_and_magnitude() {
    let mut stage = SimulatedPowerStage::new();
    stage
        .apply(DriveCommand::Drive {
            direction: Direction::Forward,
            magnitude: 255,
        })
        .unwrap();
    stage.apply(DriveCommand::AllOff).unwrap();
    assert_eq!(stage.line_states(), (false, false));
    assert_eq!(stage.magnitude(), 0);
}

#[test]
fn direction_change_never_leaves_both_lines_active() {
    let mut stage = SimulatedPowerStage::new();
    let commands = [
        DriveCommand::Drive {
            direction: Direction::Forward,
            magnitude: 100,
        },
        DriveCommand::Drive {
            direction: Direction::Backward,
            magnitude: 100,
        },
        DriveCommand::Drive {
            direction: Direction::Forward,
            magnitude: 1,
        },
        DriveCommand::AllOff,
    ];
    for cmd in commands {
        stage.apply(cmd).unwrap();
        let (fwd, back) = stage.line_states();
        assert!(!(fwd && back), "both enable lines active after {cmd:?}");
    }
}
