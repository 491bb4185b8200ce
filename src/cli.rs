use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "winsync-loader",
    about = "Find the Python install that carries Winsync and run it",
    version
)]
pub struct Cli {
    /// Arguments forwarded to the module after `-m <MODULE>`.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Resolve the install and print the command line without starting it.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Use this Python install directory instead of scanning the registry.
    #[arg(long = "python-home", value_name = "DIR")]
    pub python_home: Option<PathBuf>,

    /// Module to run with `python -m`.
    #[arg(long, value_name = "NAME")]
    pub module: Option<String>,

    /// List every registered Python and whether it carries the package.
    #[arg(long = "list-installs")]
    pub list_installs: bool,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
