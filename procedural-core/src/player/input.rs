use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Per-tick input for the avatar.
///
/// Axes are independent signals in [-1, 1]. `forward` points up the screen
/// (negative world y); `right` points along positive world x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub forward: f32,
    pub right: f32,
    pub sprint: bool,
    pub attack: bool,
    /// Aim point in world coordinates; facing follows movement when absent
    pub aim: Option<Vec2>,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Movement intent in world space, clamped per axis and to unit length
    pub fn movement(&self) -> Vec2 {
        let axis = |v: f32| if v.is_finite() { v.clamp(-1.0, 1.0) } else { 0.0 };
        let v = Vec2::new(axis(self.right), -axis(self.forward));
        if v.length_squared() > 1.0 {
            v.normalize()
        } else {
            v
        }
    }

    pub fn moving(&self) -> bool {
        self.movement() != Vec2::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_map_to_world() {
        let input = PlayerInput {
            forward: 1.0,
            ..Default::default()
        };
        assert_eq!(input.movement(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_diagonal_normalized() {
        let input = PlayerInput {
            forward: 1.0,
            right: 1.0,
            ..Default::default()
        };
        assert!((input.movement().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_garbage_axes_clamped() {
        let input = PlayerInput {
            forward: f32::NAN,
            right: 7.0,
            ..Default::default()
        };
        assert_eq!(input.movement(), Vec2::new(1.0, 0.0));
        assert!(!PlayerInput::idle().moving());
    }
}
