mod app;

use app::error::BlueprintError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = app::run() {
        let kind = match err.downcast_ref::<BlueprintError>() {
            Some(e) if e.is_configuration_error() => "Configuration error",
            Some(e) if e.is_path_error() => "Path error",
            _ => "Error",
        };
        log::error!("[ERROR] {}: {:#}", kind, err);
        std::process::exit(1);
    }
}
