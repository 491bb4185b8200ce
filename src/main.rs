#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod cli;
mod config;
mod error;
mod locate;
mod logging;
mod process;
mod registry;
mod report;

use anyhow::Result;
use config::Config;
use locate::{FsProbe, Install};
use registry::{WindowsRegistry, PYTHON_CORE_ROOTS};
use tracing::{debug, error};

fn main() {
    let args = cli::Cli::parse();

    let code = match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            report::display_error(error::title_for(&e), &format!("{e:#}"));
            error::exit_code_for(&e)
        }
    };
    std::process::exit(error::process_exit_code(code));
}

#[tokio::main(flavor = "current_thread")]
async fn run(args: cli::Cli) -> Result<i32> {
    let cfg = Config::load()?;
    logging::init(&cfg.log_level(), args.verbose, cfg.log_file().as_deref())?;
    debug!(config = %cfg.config_path.display(), "configuration loaded");

    let package = cfg.package();

    if args.list_installs {
        let found = locate::list_candidates(&WindowsRegistry, &FsProbe, &PYTHON_CORE_ROOTS, &package)?;
        for c in found {
            let mark = if c.has_package { "*" } else { " " };
            println!("{mark} {}", c.entry);
            match c.python_path {
                Some(p) => println!("    PythonPath: {p}"),
                None => println!("    PythonPath: (missing)"),
            }
        }
        return Ok(0);
    }

    // CLI overrides config; fall back to the registry scan
    let install = match args.python_home.clone().or_else(|| cfg.python_home()) {
        Some(dir) => Install::explicit(dir),
        None => locate::find_install(&WindowsRegistry, &FsProbe, &PYTHON_CORE_ROOTS, &package)?,
    };
    if let Some(entry) = &install.entry {
        debug!(entry, dir = %install.dir.display(), "using registered install");
    }

    let module = args.module.clone().unwrap_or_else(|| cfg.module());
    let plan = process::python::module_plan(&install, &cfg.python_exe(), &module, &args.args);

    if args.dry_run {
        println!("{plan}");
        return Ok(0);
    }

    Ok(process::launch(&plan, cfg.new_console()).await?)
}
