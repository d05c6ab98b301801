//! Government relations
//!
//! Hostility starts from the catalog's attitude matrix and is overridden by
//! provocations collected during play. Provocations are temporary and are
//! cleared when the player lands.

use std::collections::BTreeSet;

use super::data::{GameData, GovernmentId};

#[derive(Debug, Clone, Default)]
pub struct Politics {
    player: GovernmentId,
    /// attitudes[a][b]: how `a` feels about `b`
    attitudes: Vec<Vec<f64>>,
    /// (offended, offender) pairs
    provoked: BTreeSet<(GovernmentId, GovernmentId)>,
}

impl Politics {
    pub fn new(data: &GameData) -> Self {
        let count = data.governments.len();
        let mut attitudes = vec![vec![0.0; count]; count];
        for (index, government) in data.governments.iter().enumerate() {
            attitudes[index][index] = 1.0;
            for &(other, attitude) in &government.attitudes {
                if let Some(slot) = attitudes[index].get_mut(other.index()) {
                    *slot = attitude;
                }
            }
        }
        Self {
            player: data.player_government,
            attitudes,
            provoked: BTreeSet::new(),
        }
    }

    pub fn player(&self) -> GovernmentId {
        self.player
    }

    /// Attitude of `from` toward `to`; unknown governments are neutral
    pub fn attitude(&self, from: GovernmentId, to: GovernmentId) -> f64 {
        self.attitudes
            .get(from.index())
            .and_then(|row| row.get(to.index()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_enemy(&self, first: GovernmentId, second: GovernmentId) -> bool {
        if first == second {
            return false;
        }
        if self.provoked.contains(&(first, second)) || self.provoked.contains(&(second, first)) {
            return true;
        }
        self.attitude(first, second) < 0.0 || self.attitude(second, first) < 0.0
    }

    /// Record that `offender` attacked a ship of `victim`
    ///
    /// An attack by the player also angers every government that is fond of
    /// the victim.
    pub fn provoke(&mut self, victim: GovernmentId, offender: GovernmentId) {
        if victim == offender {
            return;
        }
        let fresh = self.provoked.insert((victim, offender));
        if offender == self.player {
            for ally in 0..self.attitudes.len() {
                let ally = GovernmentId(ally as u32);
                if ally != offender && self.attitude(ally, victim) > 0.0 {
                    self.provoked.insert((ally, offender));
                }
            }
        }
        if fresh {
            log::debug!("Government {} provoked by {}", victim.0, offender.0);
        }
    }

    pub fn is_provoked(&self, victim: GovernmentId, offender: GovernmentId) -> bool {
        self.provoked.contains(&(victim, offender))
    }

    /// Forget all temporary hostilities
    pub fn reset_daily(&mut self) {
        self.provoked.clear();
    }
}
