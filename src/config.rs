// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::runtime::{ColorMode, Theme};

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  bootstrix --name BOOTSTRIX --theme cyber --charset loader --fps 60 --safety-ms 9000 --color-bg black";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  bootstrix") {
            out.push_str("  \x1b[1;34mbootstrix\x1b[0m");
            out.push_str(rest);
        } else if let Some(rest) = line.strip_prefix("  -") {
            out.push_str("  \x1b[33m-");
            out.push_str(rest);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

pub fn parse_theme(s: &str) -> Result<Theme, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "cyber" | "default" => Ok(Theme::Cyber),
        "amber" => Ok(Theme::Amber),
        "ice" => Ok(Theme::Ice),
        "mono" | "gray" | "grey" => Ok(Theme::Mono),
        _ => Err(format!("invalid theme: {} (see --list-themes)", s)),
    }
}

/// Maps a `--colormode` value; 8 and 256 are the same mode, as are 24 and 32.
pub fn parse_color_mode(v: u16) -> Result<ColorMode, String> {
    match v {
        0 => Ok(ColorMode::Mono),
        16 => Ok(ColorMode::Color16),
        8 | 256 => Ok(ColorMode::Color256),
        24 | 32 => Ok(ColorMode::TrueColor),
        _ => Err(format!(
            "invalid --colormode: {} (allowed: 0,16,8/256,24/32)",
            v
        )),
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "bootstrix", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'n',
        long = "name",
        help_heading = "SEQUENCE",
        help = "Name spelled out by the letter reveal"
    )]
    pub name: Option<String>,

    #[arg(
        long = "subtitle",
        help_heading = "SEQUENCE",
        help = "Line shown under the name once every letter landed"
    )]
    pub subtitle: Option<String>,

    #[arg(
        short = 'm',
        long = "message",
        help_heading = "GENERAL",
        help = "Page text revealed behind the intro (\\n for new lines)"
    )]
    pub message: Option<String>,

    #[arg(
        long = "message-no-border",
        help_heading = "GENERAL",
        help = "Draw the page panel without a border (shorthand: -mB)"
    )]
    pub message_no_border: bool,

    #[arg(
        long = "seed",
        help_heading = "SEQUENCE",
        help = "Random seed for tilts, jitter, particles and shards"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "safety-ms",
        default_value_t = 9000,
        help_heading = "SEQUENCE",
        help = "Hard ceiling before the intro is forced to exit (min 1000 max 60000)"
    )]
    pub safety_ms: u64,

    #[arg(
        long = "no-intro",
        help_heading = "SEQUENCE",
        help = "Start with the intro already skipped"
    )]
    pub no_intro: bool,

    #[arg(
        long = "once",
        help_heading = "GENERAL",
        help = "Quit as soon as the intro finished"
    )]
    pub once: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (default level info; RUST_LOG overrides)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        short = 't',
        long = "theme",
        default_value = "cyber",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-themes)"
    )]
    pub theme: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "charset",
        default_value = "loader",
        help_heading = "APPEARANCE",
        help = "Charset of the loader rain (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "APPEARANCE",
        help = "Custom characters for the loader rain"
    )]
    pub chars: Option<String>,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "PERFORMANCE",
        help = "Target FPS (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        long = "particles",
        help_heading = "PERFORMANCE",
        help = "Ambient particle count (min 1 max 400). Default: 35 compact, 75 otherwise"
    )]
    pub particles: Option<u16>,

    #[arg(
        long = "compact",
        help_heading = "PERFORMANCE",
        help = "Treat the terminal as a compact device"
    )]
    pub compact: bool,

    #[arg(
        long = "check-timings",
        help_heading = "HELP",
        help = "Audit the intro schedule against the name and exit"
    )]
    pub check_timings: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help for all parameters and exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "list-themes",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_themes: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

fn print_list_heading(title: &str, flag: &str) {
    if color_enabled_stdout() {
        println!("\x1b[1;36m{}:\x1b[0m", title);
        println!(
            "\x1b[2mNOTE: Use only the VALUE (left side) with {}.\x1b[0m",
            flag
        );
    } else {
        println!("{}:", title);
        println!("NOTE: Use only the VALUE (left side) with {}.", flag);
    }
    println!();
    println!("VALUE        DESCRIPTION");
}

pub fn print_list_charsets() {
    print_list_heading("AVAILABLE CHARSET PRESETS", "--charset");
    println!("loader       Letters, digits and code punctuation (alias: auto)");
    println!("binary       0 and 1 (aliases: bin, 01)");
    println!("hex          0-9 and A-F (alias: hexadecimal)");
    println!("ascii        Printable ASCII");
    println!("katakana     Half-width katakana (ASCII fallback on non-UTF locales)");
    println!("matrix       Digits, capitals and katakana");
}

pub fn print_list_themes() {
    print_list_heading("AVAILABLE COLOR THEMES", "--theme");
    println!("cyber        Teal and pink accents (alias: default)");
    println!("amber        Amber phosphor");
    println!("ice          Pale blue and lilac");
    println!("mono         Grayscale (aliases: gray, grey)");
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  bootstrix [OPTIONS]\n\nGENERAL:\n  -m, --message <text>\n      Page text revealed behind the intro.\n      Example: bootstrix -m \"hello\\nworld\"\n\n  --message-no-border, -mB\n      Draw the page panel without a border.\n\n  --once\n      Quit as soon as the intro finished.\n\n  --duration <seconds>\n      Stop after N seconds (min 0.1 max 86400).\n      Example: bootstrix --duration 15\n\n  --log-file <path>\n      Write logs to a file instead of stderr.\n      Example: RUST_LOG=debug bootstrix --log-file intro.log\n\nSEQUENCE:\n  -n, --name <text>\n      Name spelled out by the letter reveal.\n      Example: bootstrix -n \"ADA LOVELACE\"\n\n  --subtitle <text>\n      Line shown under the name.\n\n  --seed <number>\n      Fix tilts, jitter, particles and shards.\n      Example: bootstrix --seed 42\n\n  --safety-ms <ms>\n      Hard ceiling before the intro is forced out (min 1000 max 60000).\n\n  --no-intro\n      Start with the intro already skipped.\n\nAPPEARANCE:\n  -t, --theme <name>\n      Color theme (see --list-themes).\n      Example: bootstrix --theme amber\n\n  --colormode <0|16|8|24>\n      Force color mode; otherwise auto-detected from COLORTERM/TERM.\n\n  --color-bg <black|default-background>\n      Background mode.\n\n  --charset <name>\n      Charset of the loader rain (see --list-charsets).\n\n  --chars <string>\n      Custom characters for the loader rain.\n      Example: bootstrix --chars \"01\"\n\nPERFORMANCE:\n  -f, --fps <number>\n      Target FPS (min 1 max 240).\n\n  --particles <number>\n      Ambient particle count (min 1 max 400).\n\n  --compact\n      Use the compact particle count.\n\nKEYS:\n  Esc, Enter, Space, s\n      Skip the intro.\n\n  Up, Down, PageUp, PageDown, j, k\n      Scroll the page once the intro is gone.\n\n  q, Esc\n      Quit once the intro is gone.\n\nHELP:\n  --check-timings\n      Audit the intro schedule and exit.\n\n  --help-detail\n      Show this detailed help.\n\n  --list-charsets\n      List available charset presets and exit.\n\n  --list-themes\n      List available color themes and exit.\n\n  -v, --version\n      Print version and exit.\n\n  -i, --info\n      Print version info and exit.\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }
    println!();
    print_list_charsets();
    println!();
    print_list_themes();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_parse() {
        let args = Args::try_parse_from(["bootstrix"]).unwrap();
        assert_eq!(args.safety_ms, 9000);
        assert_eq!(args.fps, 60.0);
        assert_eq!(args.theme, "cyber");
        assert_eq!(args.color_bg, ColorBg::Black);
        assert!(args.name.is_none());
    }

    #[test]
    fn sequence_options_parse() {
        let args = Args::try_parse_from([
            "bootstrix",
            "-n",
            "ADA",
            "--seed",
            "7",
            "--no-intro",
            "--particles",
            "20",
            "--log-file",
            "x.log",
        ])
        .unwrap();
        assert_eq!(args.name.as_deref(), Some("ADA"));
        assert_eq!(args.seed, Some(7));
        assert!(args.no_intro);
        assert_eq!(args.particles, Some(20));
        assert_eq!(args.log_file, Some(PathBuf::from("x.log")));
    }

    #[test]
    fn theme_and_color_mode_parsing() {
        assert_eq!(parse_theme("Amber"), Ok(Theme::Amber));
        assert_eq!(parse_theme("grey"), Ok(Theme::Mono));
        assert!(parse_theme("plaid").is_err());
        assert_eq!(parse_color_mode(256), Ok(ColorMode::Color256));
        assert_eq!(parse_color_mode(32), Ok(ColorMode::TrueColor));
        assert!(parse_color_mode(7).is_err());
    }
}
