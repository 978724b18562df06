pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Which side of the chassis a sensor or motor sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Digital contact switch (bump sensor). True while physically depressed.
pub trait DigitalInput {
    fn is_pressed(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Analog intensity sensor (line reflectance or proximity). Raw ADC counts;
/// range is implementation-defined, comparison thresholds live in config.
pub trait AnalogInput {
    fn read(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

/// One drive motor with an incremental shaft encoder.
///
/// A `drive` command persists until the next command to the same motor or a
/// `stop`; there is no implicit timeout.
pub trait DriveMotor {
    /// Command continuous rotation at a signed percent speed (-100..=100).
    fn drive(&mut self, speed: i16) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Zero the encoder counter.
    fn reset_ticks(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Ticks accumulated since the last `reset_ticks`.
    fn ticks(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn is_pressed(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).is_pressed()
    }
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read()
    }
}

impl<T: DriveMotor + ?Sized> DriveMotor for Box<T> {
    fn drive(&mut self, speed: i16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).drive(speed)
    }
    fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).stop()
    }
    fn reset_ticks(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).reset_ticks()
    }
    fn ticks(&mut self) -> Result<i32, Box<dyn std::error::Error + Send + Sync>> {
        (**self).ticks()
    }
}

/// Positioning servo used for the sort gate.
pub trait SortServo {
    /// One-time actuator enable at process start.
    fn enable(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Command an absolute position.
    fn set_position(&mut self, position: u16)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

impl<T: SortServo + ?Sized> SortServo for Box<T> {
    fn enable(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).enable()
    }
    fn set_position(
        &mut self,
        position: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_position(position)
    }
}
