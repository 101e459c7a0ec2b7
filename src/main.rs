// Copyright (c) 2026 rezky_nightky

mod canvas;
mod cell;
mod charset;
mod clock;
mod config;
mod field;
mod frame;
mod page;
mod palette;
mod progress;
mod rain;
mod render;
mod runtime;
mod script;
mod sequencer;
mod shards;
mod stage;
mod terminal;

use std::env;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::LevelFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::charset::{build_chars, charset_from_str};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, parse_color_mode, parse_theme,
    print_help_detail, print_list_charsets, print_list_themes, Args, ColorBg,
};
use crate::frame::Frame;
use crate::palette::build_palette;
use crate::runtime::ColorMode;
use crate::script::{Script, Timings};
use crate::stage::{Stage, StageConfig};
use crate::terminal::{restore_terminal_best_effort, Terminal};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const DEFAULT_PAGE: &str = "Welcome aboard.\n\nThe intro is over and the page is yours.\nScroll with the arrow keys, quit with q.";

/// Rows moved by PageUp/PageDown.
const PAGE_STEP: isize = 8;

fn build_info() -> &'static str {
    env!("BOOTSTRIX_BUILD")
}

fn git_sha() -> &'static str {
    env!("BOOTSTRIX_GIT_SHA")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn require_u16_range(name: &str, v: u16, min: u16, max: u16) -> u16 {
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn or_exit<T>(r: Result<T, String>) -> T {
    r.unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    })
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

/// Default level is `warn` on stderr, or `info` into `--log-file`.
/// `RUST_LOG` wins over both.
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if log_file.is_some() {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    });
    builder.parse_default_env();
    builder.format_timestamp_millis();
    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    if let Err(e) = builder.try_init() {
        eprintln!("failed to initialise logging: {}", e);
    }
    Ok(())
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

/// Returns false when the key asks to quit.
fn handle_key(stage: &mut Stage, k: KeyEvent) -> bool {
    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    if !stage.sequencer().is_hidden() {
        match k.code {
            KeyCode::Char('q') => return false,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('s') => {
                stage.skip();
            }
            _ => {}
        }
        return true;
    }

    match k.code {
        KeyCode::Esc | KeyCode::Char('q') => return false,
        KeyCode::Up | KeyCode::Char('k') => {
            stage.scroll(-1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            stage.scroll(1);
        }
        KeyCode::PageUp => {
            stage.scroll(-PAGE_STEP);
        }
        KeyCode::PageDown => {
            stage.scroll(PAGE_STEP);
        }
        _ => {}
    }
    true
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let mut argv: Vec<std::ffi::OsString> = env::args_os().collect();
    for arg in argv.iter_mut().skip(1) {
        if arg == "-mB" || arg == "-mb" {
            *arg = "--message-no-border".into();
        }
    }

    let matches = cmd.get_matches_from(argv);
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_charsets {
        print_list_charsets();
        return Ok(());
    }

    if args.list_themes {
        print_list_themes();
        return Ok(());
    }

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {} ({})", build_info(), git_sha());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return Ok(());
    }

    init_logging(args.log_file.as_deref())?;

    let mut script = Script::default();
    if let Some(name) = &args.name {
        script.name = name.clone();
    }
    if let Some(sub) = &args.subtitle {
        script.subtitle = sub.clone();
    }

    let safety_ms = require_u64_range("--safety-ms", args.safety_ms, 1000, 60_000);
    let timings = Timings {
        safety: Duration::from_millis(safety_ms),
        ..Timings::default()
    };

    let warnings = timings.audit(script.letter_count());
    if args.check_timings {
        println!("TIMING CHECK:");
        println!("  letters: {}", script.letter_count());
        println!("  script_total_ms: {}", timings.script_total().as_millis());
        println!("  safety_ms: {}", timings.safety.as_millis());
        if warnings.is_empty() {
            println!("  ok");
        }
        for w in &warnings {
            println!("  warning: {}", w);
        }
        return Ok(());
    }
    for w in &warnings {
        log::warn!("intro timing: {}", w);
    }

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let duration_s = args.duration.map(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        if s > 0.0 {
            return require_f64_range("--duration", s, 0.1, 86400.0);
        }
        s
    });
    let particles = args
        .particles
        .map(|p| require_u16_range("--particles", p, 1, 400) as usize);

    let theme = or_exit(parse_theme(&args.theme));
    let color_mode = match args.colormode {
        Some(v) => or_exit(parse_color_mode(v)),
        None => detect_color_mode_auto(),
    };
    let palette = build_palette(
        theme,
        color_mode,
        args.color_bg == ColorBg::DefaultBackground,
    );

    let charset = or_exit(charset_from_str(&args.charset));
    let glyphs = build_chars(charset, args.chars.as_deref(), default_to_ascii());

    let message = args
        .message
        .as_deref()
        .unwrap_or(DEFAULT_PAGE)
        .replace("\\n", "\n");
    let seed = args.seed.unwrap_or_else(time_seed);
    log::info!("starting with seed {}", seed);

    let cfg = StageConfig {
        script,
        timings,
        particles,
        force_compact: args.compact,
        rain_glyphs: glyphs,
        message,
        message_border: !args.message_no_border,
        seed,
        skip_intro: args.no_intro,
        ..StageConfig::default()
    };

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let mut stage = Stage::new(cfg, w, h);
    log::info!("{}x{} cells, {} particles", w, h, stage.particle_count());
    let mut frame = Frame::new(w, h, palette.bg);

    let start_time = Instant::now();
    let end_time = duration_s.and_then(|s| {
        if s <= 0.0 {
            return None;
        }
        Some(start_time + Duration::from_secs_f64(s))
    });
    stage.start();

    let target_period = Duration::from_secs_f64(1.0 / target_fps);
    let mut next_frame = Instant::now();
    let mut running = true;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;

        loop {
            while Terminal::poll_event(Duration::from_millis(0))? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => {
                        pending_resize = Some((nw, nh));
                    }
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if !handle_key(&mut stage, k) {
                            running = false;
                            break;
                        }
                    }
                    _ => {}
                }
            }

            if !running || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            if now >= next_frame {
                break;
            }

            let mut timeout = next_frame - now;
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            let _ = Terminal::poll_event(timeout)?;
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            stage.resize(nw, nh);
        }

        let now = start_time.elapsed();
        stage.step(now, &palette);
        frame.present(stage.compose(now), &palette);
        if frame.is_dirty_all() || !frame.dirty_indices().is_empty() {
            term.draw(&mut frame)?;
        }

        if args.once && stage.is_done() {
            break;
        }

        next_frame += target_period;
        let now = Instant::now();
        if now > next_frame {
            next_frame = now;
        }
    }

    stage.shutdown();
    drop(term);
    log::info!(
        "stopped in {:?} after {}ms (exit cause {:?})",
        stage.phase(),
        stage.now().as_millis(),
        stage.sequencer().exit_cause()
    );
    Ok(())
}
