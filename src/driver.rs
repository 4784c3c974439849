//! Fixed-interval tick driver for a [`Cascade`].
//!
//! The driver owns the timer. It hands out [`TickToken`]s tagged with the
//! board generation they were scheduled for; a token whose generation no
//! longer matches the cascade (a move was applied or the board replaced in
//! the meantime) is dropped instead of acting on the new board.
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::cascade::{Cascade, MoveOutcome, TickReport};
use crate::config::EngineConfig;
use crate::error::EngineError;

/// A scheduled tick, valid only for the board generation it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickToken {
    generation: u64,
}

impl TickToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Drives a cascade's resolution at a fixed interval.
#[derive(Debug)]
pub struct TickDriver {
    cascade: Cascade,
    interval: Duration,
}

impl TickDriver {
    pub fn new(cascade: Cascade, interval: Duration) -> Self {
        TickDriver { cascade, interval }
    }

    /// Builds the cascade and the driver from one configuration.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(TickDriver::new(Cascade::new(config)?, config.tick_interval()))
    }

    pub fn cascade(&self) -> &Cascade {
        &self.cascade
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedules the next tick, or returns `None` when the cascade is idle.
    pub fn schedule(&self) -> Option<TickToken> {
        self.cascade.is_busy().then(|| TickToken {
            generation: self.cascade.generation(),
        })
    }

    /// Runs the tick for `token`, unless the token is stale.
    pub fn fire(&mut self, token: TickToken) -> Option<TickReport> {
        if token.generation != self.cascade.generation() {
            debug!(
                token = token.generation,
                current = self.cascade.generation(),
                "dropping stale tick"
            );
            return None;
        }
        Some(self.cascade.resolve_tick())
    }

    /// Ticks at the configured interval until the cascade is idle, handing
    /// every report to `observer`.
    ///
    /// # Returns
    /// The number of ticks run.
    pub fn run_until_idle(&mut self, mut observer: impl FnMut(&TickReport)) -> usize {
        let mut ticks = 0;
        while let Some(token) = self.schedule() {
            if !self.interval.is_zero() {
                thread::sleep(self.interval);
            }
            if let Some(report) = self.fire(token) {
                observer(&report);
                ticks += 1;
            }
        }
        ticks
    }

    pub fn select(&mut self, index: usize) -> Result<bool, EngineError> {
        self.cascade.select(index)
    }

    pub fn drop_on(&mut self, target: usize) -> Result<MoveOutcome, EngineError> {
        self.cascade.drop_on(target)
    }

    pub fn commit_move(&mut self, a: usize, b: usize) -> Result<MoveOutcome, EngineError> {
        self.cascade.commit_move(a, b)
    }

    pub fn new_session(&mut self) -> Result<(), EngineError> {
        self.cascade.new_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::TickStep;
    use crate::utils::board_from_str_array;

    fn driver() -> TickDriver {
        let config = EngineConfig {
            side: 4,
            seed: Some(3),
            tick_interval_ms: 0,
            ..EngineConfig::default()
        };
        let board = board_from_str_array(&["RGRB", "GBGR", "BRBG", "GBRB"]).unwrap();
        TickDriver::new(
            Cascade::with_board(&config, board).unwrap(),
            config.tick_interval(),
        )
    }

    #[test]
    fn test_idle_cascade_schedules_nothing() {
        let driver = driver();
        assert_eq!(driver.schedule(), None);
    }

    #[test]
    fn test_run_until_idle_reports_every_tick() {
        let mut driver = driver();
        assert_eq!(driver.commit_move(1, 5).unwrap(), MoveOutcome::Applied);

        let mut steps = Vec::new();
        let ticks = driver.run_until_idle(|report| steps.push(report.step));
        assert_eq!(ticks, steps.len());
        assert_eq!(steps[0], TickStep::Cleared { cells: 3, chain: 1 });
        assert_eq!(steps.last(), Some(&TickStep::Settled));
        assert!(!driver.cascade().is_busy());
        assert_eq!(driver.schedule(), None);
    }

    #[test]
    fn test_stale_token_is_dropped_after_new_session() {
        let mut driver = driver();
        driver.commit_move(1, 5).unwrap();
        let token = driver.schedule().unwrap();

        driver.new_session().unwrap();
        let board_before = driver.cascade().board().clone();
        assert!(driver.fire(token).is_none());
        assert_eq!(driver.cascade().board(), &board_before);
    }

    #[test]
    fn test_token_issued_before_a_move_is_stale() {
        let mut driver = driver();
        driver.commit_move(1, 5).unwrap();
        let token = driver.schedule().unwrap();
        driver.run_until_idle(|_| {});

        assert!(driver.select(9).unwrap());
        assert_eq!(driver.drop_on(10).unwrap(), MoveOutcome::Applied);
        assert!(driver.fire(token).is_none());

        let fresh = driver.schedule().unwrap();
        assert_eq!(fresh.generation(), driver.cascade().generation());
        assert!(driver.fire(fresh).is_some());
    }

    #[test]
    fn test_from_config_uses_tick_interval() {
        let config = EngineConfig {
            seed: Some(11),
            tick_interval_ms: 25,
            ..EngineConfig::default()
        };
        let driver = TickDriver::from_config(&config).unwrap();
        assert_eq!(driver.interval(), Duration::from_millis(25));
        assert_eq!(driver.cascade().side(), 8);
    }
}
