//! App: load the starting field, then drive the engine from stdin or on its own clock.

use crate::game::GameState;
use crate::input::Control;
use crate::theme::Theme;
use crate::ui::{GAME_OVER_TEXT, render_rows};
use crate::{GameConfig, Mode};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::fs;
use std::io::{self, BufRead, Write};

pub struct App {
    config: GameConfig,
    /// `None` renders plain text.
    theme: Option<Theme>,
    state: GameState,
}

impl App {
    pub fn new(config: GameConfig) -> Result<Self> {
        let state = match config.seed {
            Some(seed) => GameState::with_seed(config.rows, config.columns, seed),
            None => GameState::new(config.rows, config.columns),
        }?;
        let theme = if config.color {
            let mut theme = Theme::default();
            for (jewel, hex) in &config.jewel_colors {
                theme = theme.with_jewel_hex(*jewel, hex)?;
            }
            Some(theme)
        } else {
            None
        };
        let mut app = Self { config, theme, state };
        if let Some(path) = app.config.contents.clone() {
            let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
            app.load_contents(&text)?;
        }
        Ok(app)
    }

    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Seed visible rows from the top, one line per row, then let everything fall.
    pub fn load_contents(&mut self, text: &str) -> Result<()> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() > self.state.rows() {
            bail!("contents have {} rows, field has {}", lines.len(), self.state.rows());
        }
        for (row, line) in lines.iter().enumerate() {
            self.state
                .seed_row(row, line)
                .with_context(|| format!("contents row {}", row + 1))?;
        }
        self.state.drop_jewels();
        self.end_of_tick();
        debug!("loaded {} content row(s)", lines.len());
        Ok(())
    }

    pub fn run(&mut self) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.config.mode {
            Mode::Script => self.run_script(io::stdin().lock(), &mut out),
            Mode::Auto => self.run_auto(&mut out),
        }
    }

    /// One command per input line; the field is redrawn after each accepted command.
    pub fn run_script<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        self.draw(out)?;
        for line in input.lines() {
            let line = line.context("reading command")?;
            match self.state.submit_command(&line) {
                Ok(Control::Quit) => {
                    info!("quit");
                    break;
                }
                Ok(Control::Continue) => {}
                Err(e) => {
                    warn!("{e}");
                    continue;
                }
            }
            self.end_of_tick();
            self.draw(out)?;
            if self.state.is_game_over() {
                writeln!(out, "{GAME_OVER_TEXT}")?;
                break;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Headless game: tick, match checks, game-over check, random spawn; repeated.
    pub fn run_auto<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let mut ticks = 0;
        while ticks < self.config.ticks {
            ticks += 1;
            self.state.tick();
            self.end_of_tick();
            if self.state.is_game_over() {
                break;
            }
            self.state.spawn_random();
        }
        info!("auto run stopped after {ticks} tick(s)");
        self.draw(out)?;
        if self.state.is_game_over() {
            writeln!(out, "{GAME_OVER_TEXT}")?;
        }
        out.flush()?;
        Ok(())
    }

    fn end_of_tick(&mut self) {
        self.state.check_horizontal_match();
        self.state.check_vertical_match();
        self.state.check_diagonal_match();
        self.state.check_game_over();
    }

    fn draw<W: Write>(&self, out: &mut W) -> Result<()> {
        let rows = if self.config.show_buffer {
            self.state.full_field()
        } else {
            self.state.visible_field()
        };
        out.write_all(render_rows(&rows, self.theme.as_ref()).as_bytes())?;
        Ok(())
    }
}
