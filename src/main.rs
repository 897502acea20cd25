#![cfg_attr(all(windows, not(feature = "console")), windows_subsystem = "windows")]

use std::process::ExitCode;

use flow_scene::{Exit, Settings, backend::WinitRoot};

fn main() -> ExitCode {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    match launch() {
        Ok(Exit::Graceful) => ExitCode::SUCCESS,
        Ok(Exit::Cancelled) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            eprintln!("An exception has occurred: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn launch() -> anyhow::Result<Exit> {
    let settings = Settings::load_or_default(Settings::path_from_env())?;

    let mut root = WinitRoot::new()?;
    if settings.confirm_config {
        root = root.with_config_prompt(&settings.window);
    }
    let input = root.input();
    flow_scene::run(root, input, &settings)
}
