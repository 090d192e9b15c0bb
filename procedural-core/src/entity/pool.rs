use serde::{Deserialize, Serialize};

/// A bounded resource. `0 <= current <= max` holds after every operation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    current: f32,
    max: f32,
}

impl Pool {
    /// Full pool
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { current: max, max }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.max
    }

    /// Overwrite the current value, clamped. Non-finite input is ignored.
    pub fn set(&mut self, value: f32) {
        if value.is_finite() {
            self.current = value.clamp(0.0, self.max);
        }
    }

    /// Remove up to `amount`; returns how much was actually taken
    pub fn drain(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let taken = amount.min(self.current);
        self.current -= taken;
        if self.current < 0.0 {
            self.current = 0.0;
        }
        taken
    }

    pub fn restore(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.current = (self.current + amount).min(self.max);
        }
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }

    /// Scale the maximum (and current value proportionally)
    pub fn scale_max(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.max *= factor;
        self.current = (self.current * factor).clamp(0.0, self.max);
    }
}
