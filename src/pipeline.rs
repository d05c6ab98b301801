//! Two-thread simulation pipeline
//!
//! A worker thread advances the world while the caller presents the last
//! committed [`SceneSnapshot`]. There are exactly two scene buffers: the
//! caller owns the draw buffer, the worker writes the calc buffer, and the
//! two trade places inside [`Engine::begin_tick`] under the swap mutex.
//!
//! `calc_tick_tock == draw_tick_tock` means the worker is idle. Flipping
//! `calc_tick_tock` wakes it for one tick; it flips `draw_tick_tock` back
//! when the tick is committed.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crate::error::EngineError;
use crate::scene::{PanelHandle, SceneSnapshot, SceneTransition};
use crate::sim::command::Command;
use crate::sim::state::World;

/// What the worker runs each tick
pub trait Simulation: Send + 'static {
    /// Advance one tick into `out`, returning any scene transition it caused
    fn advance(&mut self, input: &Command, take_off: bool, out: &mut SceneSnapshot)
    -> Option<SceneTransition>;
}

impl Simulation for World {
    fn advance(
        &mut self,
        input: &Command,
        take_off: bool,
        out: &mut SceneSnapshot,
    ) -> Option<SceneTransition> {
        if take_off {
            self.take_off();
        }
        self.tick(input, out);
        self.transition.take()
    }
}

struct SwapState {
    calc_tick_tock: bool,
    draw_tick_tock: bool,
    terminate: bool,
    /// Worker-side buffer; `None` only while the worker is writing it
    calc: Option<Box<SceneSnapshot>>,
    /// The calc buffer holds a committed tick the caller has not taken
    fresh: bool,
    input: Command,
    take_off: bool,
    transition: Option<SceneTransition>,
    failure: Option<String>,
}

struct Shared {
    state: Mutex<SwapState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SwapState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, SwapState>) -> MutexGuard<'a, SwapState> {
        self.wake.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Engine {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
    /// Caller-side buffer
    draw: Box<SceneSnapshot>,
    started: bool,
    dead: bool,
    /// Set when the flagship lands, consumed by `panel_to_show`
    should_land: Option<PanelHandle>,
}

impl Engine {
    /// Start the worker thread around a simulation
    pub fn new(simulation: impl Simulation) -> Result<Self, EngineError> {
        let shared = Arc::new(Shared {
            state: Mutex::new(SwapState {
                calc_tick_tock: false,
                draw_tick_tock: false,
                terminate: false,
                calc: Some(Box::default()),
                fresh: false,
                input: Command::default(),
                take_off: false,
                transition: None,
                failure: None,
            }),
            wake: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("sim-worker".into())
            .spawn(move || run_worker(&worker_shared, simulation))
            .map_err(EngineError::WorkerSpawn)?;
        log::info!("Simulation worker started");

        Ok(Self {
            shared,
            worker: Some(worker),
            draw: Box::default(),
            started: false,
            dead: false,
            should_land: None,
        })
    }

    /// Wait for the tick in flight, take its snapshot and hand over input
    ///
    /// When `active` is false no new tick is started; the world stays as it
    /// is and the current snapshot remains valid.
    pub fn begin_tick(
        &mut self,
        active: bool,
        input: &Command,
    ) -> Result<Option<SceneTransition>, EngineError> {
        if self.dead {
            return Err(EngineError::WorldDead);
        }
        let mut state = self.shared.lock();
        while state.calc_tick_tock != state.draw_tick_tock {
            state = self.shared.wait(state);
        }
        self.started = true;

        if let Some(message) = state.failure.take() {
            self.dead = true;
            log::error!("Simulation worker panicked: {message}");
            return Err(EngineError::WorkerPanicked(message));
        }

        let transition = state.transition.take();
        if let Some(SceneTransition::Landed(handle)) = &transition {
            self.should_land = Some(handle.clone());
        }
        if state.fresh
            && let Some(done) = state.calc.take()
        {
            state.calc = Some(std::mem::replace(&mut self.draw, done));
            state.fresh = false;
        }

        state.input = input.clone();
        if active {
            state.calc_tick_tock = !state.calc_tick_tock;
            self.shared.wake.notify_all();
        }
        Ok(transition)
    }

    /// The committed snapshot, valid until the next `begin_tick`
    ///
    /// # Panics
    ///
    /// Panics if `begin_tick` has never been called.
    pub fn snapshot(&self) -> &SceneSnapshot {
        assert!(self.started, "snapshot() called before the first begin_tick()");
        &self.draw
    }

    /// The planet to show, once per completed landing
    pub fn panel_to_show(&mut self) -> Option<PanelHandle> {
        self.should_land.take()
    }

    /// Leave the planet; the next tick relaunches the fleet
    pub fn take_off(&mut self) {
        self.should_land = None;
        self.shared.lock().take_off = true;
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shared.lock().terminate = true;
        self.shared.wake.notify_all();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::error!("Simulation worker exited abnormally");
        }
    }
}

fn run_worker(shared: &Shared, mut simulation: impl Simulation) {
    let mut state = shared.lock();
    loop {
        while state.calc_tick_tock == state.draw_tick_tock && !state.terminate {
            state = shared.wait(state);
        }
        if state.terminate {
            break;
        }

        let mut scene = state.calc.take().unwrap_or_default();
        let input = state.input.clone();
        let take_off = std::mem::take(&mut state.take_off);
        drop(state);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            simulation.advance(&input, take_off, &mut scene)
        }));

        state = shared.lock();
        state.calc = Some(scene);
        state.draw_tick_tock = state.calc_tick_tock;
        match result {
            Ok(transition) => {
                state.fresh = true;
                // Keep a landing visible even if a later tick reports something else
                if transition.is_some() {
                    state.transition = transition;
                }
                shared.wake.notify_all();
            }
            Err(payload) => {
                state.failure = Some(panic_message(payload.as_ref()));
                shared.wake.notify_all();
                break;
            }
        }
    }
    log::info!("Simulation worker stopped");
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::scene::DrawSource;
    use crate::sim::fixtures;
    use crate::sim::ship::FlightState;

    #[test]
    fn test_snapshots_arrive_in_tick_order() {
        let mut world = fixtures::world();
        fixtures::place_player(&mut world, DVec2::ZERO);
        fixtures::add(&mut world, fixtures::GUNBOAT, fixtures::PIRATE, DVec2::new(300.0, 0.0));
        fixtures::add(&mut world, fixtures::GUNBOAT, fixtures::MERCHANT, DVec2::new(-300.0, 0.0));
        let mut engine = Engine::new(world).unwrap();

        for expected in 0..30u64 {
            engine.begin_tick(true, &Command::default()).unwrap();
            let scene = engine.snapshot();
            assert_eq!(scene.step, expected);
            // Every drawn ship belongs to the same tick's roster
            for item in scene.draw.items() {
                if let DrawSource::Ship(id) = item.source {
                    assert!(scene.ships_in_view.contains(&id), "ship {id:?} not in tick {expected}");
                }
            }
        }
    }

    #[test]
    fn test_inactive_tick_keeps_snapshot() {
        let mut world = fixtures::world();
        fixtures::place_player(&mut world, DVec2::ZERO);
        let mut engine = Engine::new(world).unwrap();
        engine.begin_tick(true, &Command::default()).unwrap();
        engine.begin_tick(true, &Command::default()).unwrap();
        assert_eq!(engine.snapshot().step, 1);
        engine.begin_tick(false, &Command::default()).unwrap();
        assert_eq!(engine.snapshot().step, 2);
        engine.begin_tick(false, &Command::default()).unwrap();
        assert_eq!(engine.snapshot().step, 2);
    }

    #[test]
    #[should_panic(expected = "before the first begin_tick")]
    fn test_snapshot_before_first_tick_panics() {
        let engine = Engine::new(fixtures::world()).unwrap();
        engine.snapshot();
    }

    #[test]
    fn test_landing_handle_shown_once() {
        let mut world = fixtures::world();
        let player = fixtures::place_player(&mut world, DVec2::new(1000.0, 0.0));
        {
            let ship = world.ship_mut(player).unwrap();
            ship.target_planet = Some(1);
            ship.state = FlightState::Landing;
            ship.zoom = 0.05;
        }
        let mut engine = Engine::new(world).unwrap();

        let mut handle = None;
        for _ in 0..10 {
            engine.begin_tick(true, &Command::default()).unwrap();
            handle = engine.panel_to_show();
            if handle.is_some() {
                break;
            }
        }
        assert_eq!(handle.unwrap().name, "Earth");
        for _ in 0..5 {
            assert!(engine.panel_to_show().is_none());
            engine.begin_tick(true, &Command::default()).unwrap();
        }
        assert!(engine.panel_to_show().is_none());

        // After takeoff the world moves again
        engine.take_off();
        engine.begin_tick(true, &Command::default()).unwrap();
        let step = engine.snapshot().step;
        engine.begin_tick(true, &Command::default()).unwrap();
        engine.begin_tick(true, &Command::default()).unwrap();
        assert!(engine.snapshot().step > step);
    }

    struct Faulty {
        ticks: u32,
    }

    impl Simulation for Faulty {
        fn advance(&mut self, _: &Command, _: bool, out: &mut SceneSnapshot) -> Option<SceneTransition> {
            self.ticks += 1;
            if self.ticks == 3 {
                panic!("hull integrity lost");
            }
            out.step = u64::from(self.ticks);
            None
        }
    }

    #[test]
    fn test_worker_panic_surfaces_then_world_is_dead() {
        let mut engine = Engine::new(Faulty { ticks: 0 }).unwrap();
        let input = Command::default();
        engine.begin_tick(true, &input).unwrap();
        engine.begin_tick(true, &input).unwrap();
        engine.begin_tick(true, &input).unwrap();
        assert_eq!(engine.snapshot().step, 2);

        match engine.begin_tick(true, &input) {
            Err(EngineError::WorkerPanicked(message)) => assert!(message.contains("hull integrity")),
            other => panic!("expected a worker panic, got {other:?}"),
        }
        assert!(matches!(engine.begin_tick(true, &input), Err(EngineError::WorldDead)));
        assert!(engine.is_dead());
        // The last good frame is still readable
        assert_eq!(engine.snapshot().step, 2);
    }
}
