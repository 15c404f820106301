use super::easing::{Easing, lerp};

/// Scalar tween. Zero or negative durations finish on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    pub fn value(&self) -> f32 {
        lerp(self.from, self.to, self.easing.apply(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn tick(&mut self, dt: f32) -> f32 {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_tween_reaches_target() {
        let mut tween = Tween::new(1.0, 0.0, 2.0, Easing::Linear);
        assert_eq!(tween.tick(0.5), 0.75);
        assert!(!tween.is_finished());
        assert_eq!(tween.tick(5.0), 0.0);
        assert!(tween.is_finished());
    }

    #[test]
    fn zero_duration_is_already_finished() {
        let tween = Tween::new(3.0, 7.0, 0.0, Easing::QuadraticInOut);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 7.0);
    }
}
