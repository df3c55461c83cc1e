use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, BufWriter, Stdout, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod animator;
mod config;
mod scheduler;
mod starfield;
mod surface;

use animator::Animator;
use config::StarfieldConfig;
use scheduler::FramePacer;
use surface::{Rgb, TerminalSurface};

const SPACE_COLOR: Rgb = (5, 5, 15);

/// Idle wait when no frame is pending.
const IDLE_POLL: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(name = "lensfield")]
#[command(about = "Terminal starfield bent and swirled around a gravity well")]
#[command(after_help = "Press 'q', ESC, or Ctrl+C to exit, 'r' to scatter new stars")]
struct Args {
    /// JSON file with starfield settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background color as hex, e.g. 1a1b26
    #[arg(long, value_parser = parse_hex_color)]
    bg_color: Option<Rgb>,

    /// Frame rate cap
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for reproducible star placement
    #[arg(long)]
    seed: Option<u64>,

    /// Stars per square sub-pixel
    #[arg(long)]
    star_density: Option<f32>,

    /// Make every star twinkle
    #[arg(long)]
    all_stars_twinkle: bool,

    #[arg(long)]
    twinkle_probability: Option<f32>,

    #[arg(long)]
    min_twinkle_speed: Option<f32>,

    #[arg(long)]
    max_twinkle_speed: Option<f32>,

    /// Diameter of the star-free disc at the centre
    #[arg(long)]
    exclusion_size: Option<f32>,

    #[arg(long)]
    gravity_strength: Option<f32>,

    #[arg(long)]
    swirl_strength: Option<f32>,

    #[arg(long)]
    gravity_radius_factor: Option<f32>,

    #[arg(long)]
    inner_gravity_radius_factor: Option<f32>,

    #[arg(long)]
    trail_length: Option<usize>,

    /// Swirl rotation in radians per millisecond
    #[arg(long)]
    swirl_rotation_speed: Option<f32>,

    #[arg(long)]
    min_trail_strength: Option<f32>,
}

fn parse_hex_color(hex: &str) -> Result<Rgb, String> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected RRGGBB, got {hex:?}"));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|e| format!("invalid hex color {hex:?}: {e}"))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

macro_rules! override_fields {
    ($config:ident, $args:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $args.$field {
                $config.$field = value;
            }
        )+
    };
}

/// Defaults, then the config file, then command line flags.
fn resolve_config(args: &Args) -> Result<StarfieldConfig> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => StarfieldConfig::default(),
    };

    override_fields!(
        config,
        args,
        star_density,
        twinkle_probability,
        min_twinkle_speed,
        max_twinkle_speed,
        exclusion_size,
        gravity_strength,
        swirl_strength,
        gravity_radius_factor,
        inner_gravity_radius_factor,
        trail_length,
        swirl_rotation_speed,
        min_trail_strength,
    );
    if args.all_stars_twinkle {
        config.all_stars_twinkle = true;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    Ok(config)
}

fn run(config: StarfieldConfig, background: Rgb, fps: u32) -> io::Result<()> {
    let Some(surface) = TerminalSurface::open(background) else {
        log::info!("stdout is not a drawable terminal, nothing to do");
        return Ok(());
    };

    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    enter_screen(&mut stdout, terminal::enable_raw_mode, terminal::disable_raw_mode)?;

    let start = Instant::now();
    let mut animator = Animator::new(config, FramePacer::new(fps, start));
    animator.mount(Some(surface));

    let result = event_loop(&mut animator, &mut stdout, start);

    if let Some(field) = animator.field() {
        log::debug!("leaving after {} regenerations", field.generation());
    }
    animator.unmount();
    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    result
}

/// Raw mode plus alternate screen. Raw mode is switched back off if the
/// screen cannot be set up.
fn enter_screen<W: Write>(
    out: &mut W,
    raw_on: impl FnOnce() -> io::Result<()>,
    raw_off: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    raw_on()?;
    if let Err(err) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
        let _ = raw_off();
        return Err(err);
    }
    Ok(())
}

fn event_loop(
    animator: &mut Animator<TerminalSurface, FramePacer>,
    stdout: &mut BufWriter<Stdout>,
    start: Instant,
) -> io::Result<()> {
    loop {
        let wait = animator
            .scheduler()
            .until_due(Instant::now())
            .unwrap_or(IDLE_POLL);

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('r') => animator.regenerate(),
                    _ => {}
                },
                Event::Resize(cols, rows) => {
                    log::debug!("terminal resized to {cols}x{rows}");
                    animator.resize(cols as usize, rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        if let Some(request) = animator.scheduler_mut().take_due(now) {
            let time_ms = now.duration_since(start).as_secs_f64() * 1000.0;
            animator.frame(request, time_ms);
            if let Some(surface) = animator.surface_mut() {
                surface.present(stdout)?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    log::debug!("starfield config: {config:?}");

    run(config, args.bg_color.unwrap_or(SPACE_COLOR), args.fps).context("terminal I/O failed")
}
