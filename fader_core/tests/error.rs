use fader_core::error::FaderError;
use fader_core::mocks::{FailingPosition, FixedPosition, NeverTouched, NullMotor};
use fader_core::{Fader, build_fader};
use fader_traits::{BoxError, Direction, MotorActuator};

#[test]
fn failing_sensor_surfaces_typed_io_error_at_build() {
    let err = Fader::builder()
        .with_position_sensor(FailingPosition)
        .with_touch_sensor(NeverTouched)
        .with_motor(NullMotor)
        .build()
        .expect_err("sensor is offline");
    let typed = err
        .chain()
        .find_map(|e| e.downcast_ref::<FaderError>())
        .expect("typed error in chain");
    assert!(matches!(typed, FaderError::Io(msg) if msg.contains("adc offline")));
    assert!(format!("{err:#}").contains("initializing fader"));
}

struct JammedMotor;

impl MotorActuator for JammedMotor {
    fn drive(&mut self, _direction: Direction, _magnitude: u8) -> Result<(), BoxError> {
        Err("h-bridge fault".into())
    }
    fn stop(&mut self) -> Result<(), BoxError> {
        Ok(())
    }
}

#[test]
fn motor_failure_propagates_from_tick() {
    let mut fader = build_fader(
        FixedPosition(20.0),
        NeverTouched,
        JammedMotor,
        fader_core::FaderCfg::default(),
        None,
    )
    .expect("build");
    fader.handle_line("L80").expect("apply");
    let err = fader.poll().expect_err("drive fails");
    let typed = err
        .chain()
        .find_map(|e| e.downcast_ref::<FaderError>())
        .expect("typed error in chain");
    assert!(matches!(typed, FaderError::Hardware(msg) if msg.contains("h-bridge")));
}
