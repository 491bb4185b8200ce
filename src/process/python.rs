//! Command line for running a module with the located Python interpreter.

use super::LaunchPlan;
use crate::locate::Install;

/// `<install>\<python_exe> -m <module> [extra...]`, run from the install dir.
pub fn module_plan(install: &Install, python_exe: &str, module: &str, extra: &[String]) -> LaunchPlan {
    let mut args = vec!["-m".to_string(), module.to_string()];
    args.extend(extra.iter().cloned());

    LaunchPlan {
        program: install.dir.join(python_exe),
        args,
        working_dir: install.dir.clone(),
    }
}
