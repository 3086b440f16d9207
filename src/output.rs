use owo_colors::OwoColorize;
use std::sync::OnceLock;

/// Small wrapper around stdout/stderr printing to provide consistent
/// `PROGRAM: message` diagnostics. Colors are enabled only when the stream is a TTY.
static PROGRAM: OnceLock<String> = OnceLock::new();

/// Name used to prefix diagnostics (the invocation name: mmv, mcp, mln, ...).
pub fn set_program_name(name: &str) {
    let _ = PROGRAM.set(name.to_string());
}

pub fn program_name() -> &'static str {
    PROGRAM.get().map(String::as_str).unwrap_or("mmv")
}

fn stderr_is_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_warn(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", format!("{}:", program_name()).yellow().bold(), msg);
    } else {
        eprintln!("{}: {}", program_name(), msg);
    }
}

pub fn print_error(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", format!("{}:", program_name()).red().bold(), msg);
    } else {
        eprintln!("{}: {}", program_name(), msg);
    }
}

pub fn print_info(msg: &str) {
    if atty::is(atty::Stream::Stdout) {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix). Plan lines such as
/// `a.txt -> a.bak` go through here so users can script against them.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
