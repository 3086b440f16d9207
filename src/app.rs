//! Application orchestrator.
//! Loads/merges config, initializes logging, installs signal handlers, runs the
//! batch and maps the outcome to an exit status.

use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

use crate::cli::{default_kind_for, Args};
use crate::config::{config_path, load_config, Config, CONFIG_ENV};
use crate::errors::MmvError;
use crate::logging::init_tracing;
use crate::output as out;
use crate::prompt::TerminalPrompter;
use crate::{run, shutdown};

/// Run the CLI application.
pub fn run(args: Args) -> ExitCode {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return ExitCode::SUCCESS;
    }

    let mut cfg = Config::with_kind(default_kind_for(out::program_name()));
    match load_config() {
        Ok(Some((_, settings))) => settings.apply_to(&mut cfg),
        Ok(None) => {}
        Err(e) => return fail(&MmvError::Config(format!("{e:#}"))),
    }
    if let Err(e) = args.apply_overrides(&mut cfg) {
        return fail(&e);
    }

    let guard = match init_tracing(&cfg.log_level, cfg.log_file.as_deref(), cfg.json) {
        Ok(g) => g,
        Err(e) => {
            out::print_warn(&format!("diagnostic logging disabled: {e:#}"));
            None
        }
    };
    let guard_slot = Arc::new(Mutex::new(guard));

    // Ctrl-C: stop between steps; the executor puts staged files back.
    {
        let slot = Arc::clone(&guard_slot);
        if let Err(e) = ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("interrupt received, finishing the current step");
            if let Ok(mut g) = slot.lock() {
                let _ = g.take();
            }
        }) {
            out::print_warn(&format!("cannot install interrupt handler: {e}"));
        }
    }

    let (Some(from), Some(to)) = (args.from.as_deref(), args.to.as_deref()) else {
        return fail(&MmvError::Config("both FROM and TO patterns are required".into()));
    };
    debug!(from, to, ?cfg, "starting");

    let mut prompter = TerminalPrompter;
    let result = run::run(&cfg, from, to, &mut prompter).and_then(|report| report.into_result());

    let code = match result {
        Ok(report) => {
            debug!(completed = report.completed, "finished");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    };

    // Drop guard to flush logs
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    code
}

fn print_config_location() {
    match (std::env::var_os(CONFIG_ENV), config_path()) {
        (Some(v), Some(p)) if !v.is_empty() => {
            out::print_info(&format!("using {CONFIG_ENV} (explicit): {}", p.display()));
        }
        (_, Some(p)) if p.exists() => out::print_info(&format!("using config file: {}", p.display())),
        (_, Some(p)) => out::print_info(&format!("no config file; would read {}", p.display())),
        (_, None) => out::print_info("no config directory available; using built-in defaults"),
    }
}

/// Report `e` as `PROGRAM: message` and return its exit status.
fn fail(e: &MmvError) -> ExitCode {
    match e {
        MmvError::Collisions(list) => {
            for c in list {
                out::print_error(&format!(
                    "destination conflict: {}, {} -> {}",
                    c.first.display(),
                    c.second.display(),
                    c.destination.display()
                ));
            }
        }
        MmvError::Rejected(problems) => {
            for p in problems {
                out::print_error(&p.to_string());
            }
        }
        _ => {}
    }
    error!(kind = ?e.kind(), untouched = e.is_fatal_before_mutation(), "{e}");
    out::print_error(&e.to_string());
    ExitCode::from(u8::try_from(e.code()).unwrap_or(1))
}
