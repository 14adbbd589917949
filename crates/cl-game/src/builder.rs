//! Fluent builder for constructing a [`Game`].

use cl_core::GameConfig;
use cl_spatial::{BfsRouter, Router};

use crate::{Game, GameResult, NoopObserver};

/// Fluent builder for [`Game<R>`].
///
/// # Optional inputs (have defaults)
///
/// | Method        | Default      |
/// |---------------|--------------|
/// | `.router(r)`  | `BfsRouter`  |
///
/// # Example
///
/// ```rust,ignore
/// let mut game = GameBuilder::new(GameConfig::default()).build()?;
/// game.frame(1.0 / 60.0, &mut NoopObserver)?;
/// ```
pub struct GameBuilder<R: Router = BfsRouter> {
    config: GameConfig,
    router: R,
}

impl GameBuilder<BfsRouter> {
    pub fn new(config: GameConfig) -> Self {
        Self { config, router: BfsRouter }
    }
}

impl<R: Router> GameBuilder<R> {
    /// Swap the cargo routing algorithm.
    pub fn router<R2: Router>(self, router: R2) -> GameBuilder<R2> {
        GameBuilder { config: self.config, router }
    }

    /// Validate the configuration, spawn the opening stations, and start the
    /// timers.
    pub fn build(self) -> GameResult<Game<R>> {
        self.config.validate()?;
        let mut game = Game::new(self.config, self.router);
        game.spawn_opening_stations(&mut NoopObserver)?;
        Ok(game)
    }
}
