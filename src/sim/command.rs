//! Per-tick control input for one ship

use serde::{Deserialize, Serialize};

/// A ship's command register
///
/// The renderer fills one of these for the flagship each frame; the AI
/// fills one for every other ship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Turn rate in [-1, 1]; positive turns counterclockwise
    pub turn: f64,
    /// -1 reverse, 0 coast, 1 forward
    pub thrust: f64,
    /// Bit `i` fires hardpoint `i`
    pub fire: u32,
    /// Extra hardpoint to fire (the selected secondary weapon)
    pub secondary: Option<usize>,
    pub target_nearest: bool,
    pub target_next: bool,
    pub board: bool,
    pub land: bool,
    pub jump: bool,
    /// Release carried fighters
    pub launch: bool,
    /// Text the input adapter wants shown
    pub message: Option<String>,
}

impl Command {
    /// Force the analog fields into range
    pub fn clamp(&mut self) {
        self.turn = if self.turn.is_finite() { self.turn.clamp(-1.0, 1.0) } else { 0.0 };
        self.thrust = if self.thrust.is_finite() {
            self.thrust.clamp(-1.0, 1.0).round()
        } else {
            0.0
        };
    }

    pub fn fires(&self, hardpoint: usize) -> bool {
        hardpoint < 32 && self.fire & (1 << hardpoint) != 0
    }

    pub fn set_fire(&mut self, hardpoint: usize) {
        if hardpoint < 32 {
            self.fire |= 1 << hardpoint;
        }
    }

    /// True when the pilot is steering by hand
    pub fn has_manual_input(&self) -> bool {
        self.turn != 0.0 || self.thrust != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        let mut command = Command {
            turn: 3.0,
            thrust: -0.7,
            ..Default::default()
        };
        command.clamp();
        assert_eq!(command.turn, 1.0);
        assert_eq!(command.thrust, -1.0);

        command.turn = f64::NAN;
        command.clamp();
        assert_eq!(command.turn, 0.0);
    }

    #[test]
    fn test_fire_bits() {
        let mut command = Command::default();
        command.set_fire(3);
        command.set_fire(40);
        assert!(command.fires(3));
        assert!(!command.fires(2));
        assert!(!command.fires(40));
    }
}
