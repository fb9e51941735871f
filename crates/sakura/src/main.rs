mod background;
mod device;
mod page;
mod smooth;

use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEventKind,
    },
    execute,
};
use directories::ProjectDirs;
use log::{debug, info};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
    widgets::Paragraph,
};
use sakura_config::AppConfig;
use sakura_core::{SizeClass, Viewport};
use sakura_field::{DrawDescriptor, ParticleField, ScrollTracker};

use crate::background::PetalLayer;
use crate::page::Page;
use crate::smooth::{ScrollPlan, SmoothScroll};

/// Input poll timeout, one display frame.
const FRAME: Duration = Duration::from_millis(16);

/// Rows moved per mouse wheel notch.
const WHEEL_ROWS: isize = 3;

/// Falling cherry blossom petals behind a scrollable terminal page.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible petal field
    #[arg(long)]
    seed: Option<u64>,

    /// Force low-power mode
    #[arg(long)]
    low_power: bool,

    /// Write the default configuration file and exit
    #[arg(long)]
    write_default_config: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging();

    let path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_path()?,
    };

    if cli.write_default_config {
        AppConfig::default().save_to(&path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(&path)?;
    if cli.seed.is_some() {
        config.display.seed = cli.seed;
    }
    if cli.low_power {
        config.display.low_power = Some(true);
    }

    let terminal = ratatui::init();
    let result = execute!(stdout(), EnableMouseCapture)
        .map_err(Into::into)
        .and_then(|()| App::new(config).run(terminal));
    let mouse_off = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    first_error(result, mouse_off)
}

/// Combine the app result with the mouse release that follows it. The
/// app's own error wins; a failed release only surfaces after a clean run.
fn first_error(
    result: color_eyre::Result<()>,
    cleanup: std::io::Result<()>,
) -> color_eyre::Result<()> {
    result.and(cleanup.map_err(Into::into))
}

/// Send log output to a file in the cache directory so it never lands on
/// the terminal. Logging stays off when the file cannot be created.
fn init_logging() {
    let Some(dirs) = ProjectDirs::from("", "", "sakura") else {
        return;
    };
    let dir = dirs.cache_dir();
    if std::fs::create_dir_all(dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("sakura.log")) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("SAKURA_LOG", "warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: AppConfig,
    field: ParticleField,
    tracker: ScrollTracker,
    page: Page,
    /// Eased scroll in progress, if any.
    smooth: Option<SmoothScroll>,
    /// Last rendered petal frame; repainted while frames are throttled.
    petals: Vec<DrawDescriptor>,
    /// Page rows available above the help line.
    rows: usize,
    low_powered: bool,
    epoch: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: AppConfig) -> Self {
        let mut field = match config.display.seed {
            Some(seed) => ParticleField::seeded(config.field.clone(), seed),
            None => ParticleField::from_entropy(config.field.clone()),
        };
        let low_powered = device::resolve_low_power(config.display.low_power);
        field.set_low_powered(low_powered);
        info!("low-power mode: {low_powered}");

        let tracker = ScrollTracker::new(Duration::from_millis(config.display.scroll_settle_ms));

        Self {
            running: false,
            config,
            field,
            tracker,
            page: Page::new(),
            smooth: None,
            petals: Vec::new(),
            rows: 0,
            low_powered,
            epoch: Instant::now(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        let size = terminal.size()?;
        self.resize(size.width, size.height);
        self.field.start(self.field.viewport());

        self.running = true;
        while self.running {
            self.update();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }

        self.field.stop();
        Ok(())
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Advance the eased scroll, the scroll signal and the petal field.
    fn update(&mut self) {
        let now = self.now();

        if let Some(smooth) = self.smooth {
            let row = smooth.position_at(now) / self.config.display.cell_height;
            self.move_page_to(row.round() as usize, now);
            if smooth.is_finished(now) {
                self.smooth = None;
            }
        }

        self.tracker.poll(now);
        let signal = self.tracker.state();
        self.field.set_scroll_state(signal.is_scrolling, signal.speed);

        if let Some(petals) = self.field.tick(now) {
            self.petals = petals;
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);

        let page = Paragraph::new(self.page.visible(chunks[0].height as usize).to_vec());
        frame.render_widget(page, chunks[0]);

        let layer = PetalLayer::new(
            &self.petals,
            self.config.display.cell_width,
            self.config.display.cell_height,
        );
        frame.render_widget(layer, area);

        let status = format!(
            "  {} petals  {}  {:.0}px/100ms{}{}",
            self.field.len(),
            self.field.fidelity().label(),
            self.field.scroll_state().speed,
            if self.low_powered { "  low-power" } else { "" },
            if self.field.is_running() { "" } else { "  paused" },
        );
        let help = Line::from(vec![
            "q".bold(),
            " quit  ".dark_gray(),
            "j/k".bold(),
            " scroll  ".dark_gray(),
            "p".bold(),
            " pause  ".dark_gray(),
            "l".bold(),
            " low-power".dark_gray(),
            status.dark_gray(),
        ])
        .centered();
        frame.render_widget(help, chunks[1]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(FRAME)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => self.scroll_by(WHEEL_ROWS),
                    MouseEventKind::ScrollUp => self.scroll_by(-WHEEL_ROWS),
                    _ => {}
                },
                Event::Resize(width, height) => self.resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('j') | KeyCode::Down) => self.scroll_by(1),
            (_, KeyCode::Char('k') | KeyCode::Up) => self.scroll_by(-1),
            (_, KeyCode::PageDown) => self.glide_to(self.page.offset() + self.rows),
            (_, KeyCode::PageUp) => self.glide_to(self.page.offset().saturating_sub(self.rows)),
            (_, KeyCode::Char('g') | KeyCode::Home) => self.glide_to(0),
            (_, KeyCode::Char('G') | KeyCode::End) => self.glide_to(self.page.max_offset(self.rows)),
            (_, KeyCode::Char(c @ '1'..='9')) => {
                let index = c as usize - '1' as usize;
                if let Some(row) = self.page.anchor(index) {
                    self.glide_to(row);
                }
            }
            (_, KeyCode::Char('p')) => self.toggle_pause(),
            (_, KeyCode::Char('l')) => self.toggle_low_power(),
            _ => {}
        }
    }

    /// User scroll by whole rows. Interrupts any eased scroll.
    fn scroll_by(&mut self, rows: isize) {
        self.smooth = None;
        let now = self.now();
        let target = self.page.offset().saturating_add_signed(rows);
        self.move_page_to(target, now);
    }

    /// Start an eased scroll to `row`.
    fn glide_to(&mut self, row: usize) {
        let now = self.now();
        let cell_height = self.config.display.cell_height;
        let from = self.page.offset() as f32 * cell_height;
        let to = row.min(self.page.max_offset(self.rows)) as f32 * cell_height;

        let duration = match self.field.size_class() {
            SizeClass::Mobile => self.config.display.mobile_smooth_scroll_ms,
            SizeClass::Desktop => self.config.display.smooth_scroll_ms,
        };
        match SmoothScroll::plan(
            from,
            to,
            now,
            self.field.size_class(),
            Duration::from_millis(duration),
        ) {
            ScrollPlan::Jump(target) => {
                self.smooth = None;
                self.move_page_to((target / cell_height).round() as usize, now);
            }
            ScrollPlan::Animate(smooth) => {
                debug!("gliding from {from}px to {}px", smooth.target());
                self.smooth = Some(smooth);
            }
        }
    }

    /// Move the page and report the movement as a scroll event.
    fn move_page_to(&mut self, row: usize, now: Duration) {
        let before = self.page.offset();
        self.page.set_offset(row, self.rows);
        if self.page.offset() != before {
            let position = self.page.offset() as f32 * self.config.display.cell_height;
            self.tracker.record(position, now);
        }
    }

    /// Propagate a terminal size to the page and the petal field.
    fn resize(&mut self, width: u16, height: u16) {
        let display = &self.config.display;
        let viewport = Viewport::new(
            width as f32 * display.cell_width,
            height as f32 * display.cell_height,
        );
        self.field.on_viewport_resize(viewport);
        self.rows = height.saturating_sub(1) as usize;
        self.page.set_offset(self.page.offset(), self.rows);

        let settle = match self.field.size_class() {
            SizeClass::Mobile => display.mobile_scroll_settle_ms,
            SizeClass::Desktop => display.scroll_settle_ms,
        };
        self.tracker.set_settle(Duration::from_millis(settle));
    }

    /// Stop or resume the petal field.
    fn toggle_pause(&mut self) {
        if self.field.is_running() {
            self.field.stop();
        } else {
            self.field.start(self.field.viewport());
        }
    }

    fn toggle_low_power(&mut self) {
        self.low_powered = !self.low_powered;
        self.field.set_low_powered(self.low_powered);
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use color_eyre::eyre::eyre;

    use super::*;

    #[test]
    fn test_run_error_wins_over_cleanup_error() {
        let err = first_error(Err(eyre!("draw failed")), Err(io::Error::other("mouse")))
            .unwrap_err();
        assert_eq!(err.to_string(), "draw failed");
    }

    #[test]
    fn test_cleanup_error_reported_after_clean_run() {
        let err = first_error(Ok(()), Err(io::Error::other("mouse"))).unwrap_err();
        assert_eq!(err.to_string(), "mouse");
    }

    #[test]
    fn test_clean_run_and_cleanup() {
        assert!(first_error(Ok(()), Ok(())).is_ok());
    }
}
