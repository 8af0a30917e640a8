//! Common level/period helpers for fader_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: u64 = 1_000;

/// Compute the period in milliseconds for a given polling rate in Hz.
/// - Clamps `hz` to at least 1 to avoid division by zero.
/// - Ensures result is at least 1 millisecond.
#[inline]
pub fn period_ms(hz: u32) -> u64 {
    (MILLIS_PER_SEC / u64::from(hz.max(1))).max(1)
}

/// Clamp an integer level into `0..=100`.
#[inline]
pub fn clamp_level(level: i32) -> u8 {
    level.clamp(0, 100) as u8
}

/// Round a sensor position to the nearest whole level, clamped to `0..=100`.
#[inline]
pub fn round_position(position: f32) -> u8 {
    if !position.is_finite() {
        return 0;
    }
    position.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_never_zero() {
        assert_eq!(period_ms(0), 1_000);
        assert_eq!(period_ms(20), 50);
        assert_eq!(period_ms(5_000), 1);
    }

    #[test]
    fn levels_clamp() {
        assert_eq!(clamp_level(-4), 0);
        assert_eq!(clamp_level(150), 100);
        assert_eq!(round_position(62.4), 62);
        assert_eq!(round_position(99.7), 100);
        assert_eq!(round_position(f32::NAN), 0);
    }
}
