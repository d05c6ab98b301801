//! Incoming traffic
//!
//! Every tick there is a `1 / period` chance that a ship appears in one of
//! the systems linked to the player's, headed for the player's system.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_pcg::Pcg32;

use super::data::{GameData, GovernmentId, ModelId, SystemId};

/// What the spawner decided to create this tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnOrder {
    pub origin: SystemId,
    pub model: ModelId,
    pub government: GovernmentId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Spawner {
    /// Mean ticks between spawns; zero disables spawning
    period: u32,
    spawned: u64,
}

impl Spawner {
    pub fn new(period: u32) -> Self {
        Self { period, spawned: 0 }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    /// Ships created so far
    pub fn spawned(&self) -> u64 {
        self.spawned
    }

    /// Roll for one spawn headed to `system`
    ///
    /// Nothing is drawn from `rng` beyond the probability roll unless a ship
    /// is actually created.
    pub fn roll(&mut self, rng: &mut Pcg32, data: &GameData, system: SystemId) -> Option<SpawnOrder> {
        if self.period == 0 || rng.random_range(0..self.period) != 0 {
            return None;
        }
        let links = &data.system(system)?.links;
        if links.is_empty() {
            return None;
        }
        let origin = links[rng.random_range(0..links.len())];

        let models = data.spawnable_models();
        if models.is_empty() {
            log::debug!("No ship models available to spawn");
            return None;
        }
        let model = models[rng.random_range(0..models.len())];

        let government = pick_government(rng, data)?;

        self.spawned += 1;
        let name = if data.ship_names.is_empty() {
            let model_name = data.model(model).map(|m| m.name.as_str()).unwrap_or("Ship");
            format!("{model_name} {}", self.spawned)
        } else {
            data.ship_names[rng.random_range(0..data.ship_names.len())].clone()
        };

        log::debug!(
            "Spawning {name} in {} bound for {}",
            data.system_name(origin),
            data.system_name(system)
        );
        Some(SpawnOrder {
            origin,
            model,
            government,
            name,
        })
    }
}

/// Weighted pick from the catalog's spawn table, or any non-player
/// government when the table is empty
fn pick_government(rng: &mut Pcg32, data: &GameData) -> Option<GovernmentId> {
    if let Ok(weights) = WeightedIndex::new(data.spawn_governments.iter().map(|(_, w)| *w)) {
        return Some(data.spawn_governments[weights.sample(rng)].0);
    }
    let candidates: Vec<GovernmentId> = (0..data.governments.len())
        .map(|i| GovernmentId(i as u32))
        .filter(|&g| g != data.player_government)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::data::{Government, ShipModel, StarSystem};
    use rand::SeedableRng;

    fn data() -> GameData {
        GameData {
            governments: vec![
                Government {
                    name: "Player".into(),
                    ..Default::default()
                },
                Government {
                    name: "Merchant".into(),
                    ..Default::default()
                },
                Government {
                    name: "Pirate".into(),
                    ..Default::default()
                },
            ],
            models: vec![ShipModel {
                name: "Freighter".into(),
                ..Default::default()
            }],
            systems: vec![
                StarSystem {
                    name: "Hub".into(),
                    links: vec![SystemId(1), SystemId(2), SystemId(3)],
                    ..Default::default()
                },
                StarSystem::default(),
                StarSystem::default(),
                StarSystem::default(),
            ],
            spawn_governments: vec![(GovernmentId(1), 3), (GovernmentId(2), 1)],
            ..Default::default()
        }
    }

    #[test]
    fn test_spawn_cadence_and_origin_spread() {
        let data = data();
        let mut spawner = Spawner::new(100);
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        let mut origins = [0u32; 4];
        let mut governments = [0u32; 3];
        for _ in 0..100_000 {
            if let Some(order) = spawner.roll(&mut rng, &data, SystemId(0)) {
                origins[order.origin.index()] += 1;
                governments[order.government.index()] += 1;
            }
        }

        // Binomial(100000, 1/100): mean 1000, sigma ~31.5
        let count = spawner.spawned();
        assert!((905..=1095).contains(&count), "spawned {count}");
        assert_eq!(origins[0], 0);
        // Uniform over three links: ~333 each, sigma ~15
        for &hits in &origins[1..] {
            assert!((265..=400).contains(&hits), "origins {origins:?}");
        }
        assert_eq!(governments[0], 0);
        assert!(governments[1] > governments[2] * 2);
    }

    #[test]
    fn test_zero_period_disables() {
        let data = data();
        let mut spawner = Spawner::new(0);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..1000 {
            assert!(spawner.roll(&mut rng, &data, SystemId(0)).is_none());
        }
    }

    #[test]
    fn test_government_fallback_skips_player() {
        let mut data = data();
        data.spawn_governments.clear();
        let mut spawner = Spawner::new(1);
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..50 {
            let order = spawner.roll(&mut rng, &data, SystemId(0)).unwrap();
            assert_ne!(order.government, GovernmentId(0));
            assert!(order.name.starts_with("Freighter "));
        }
    }

    #[test]
    fn test_isolated_system_spawns_nothing() {
        let data = data();
        let mut spawner = Spawner::new(1);
        let mut rng = Pcg32::seed_from_u64(2);
        assert!(spawner.roll(&mut rng, &data, SystemId(1)).is_none());
        assert_eq!(spawner.spawned(), 0);
    }
}
