use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::process::ExitCode;

use almanac_app::{AlmanacArgs, AppConfig, AppError, Session};

fn run(args: &AlmanacArgs, mut config: AppConfig) -> Result<usize, AppError> {
    if let Some(max_undo) = args.max_undo() {
        config.edit_log.max_undo = max_undo;
    }
    let mut session = Session::new(&config, args.today())?;
    let stdout = io::stdout().lock();
    match args.script() {
        Some(path) => {
            let file = File::open(path).map_err(|source| AppError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            session.run(BufReader::new(file), stdout, false)
        }
        None => {
            let stdin = io::stdin();
            let prompt = stdin.is_terminal();
            session.run(stdin.lock(), stdout, prompt)
        }
    }
}

fn main() -> ExitCode {
    let args = AlmanacArgs::parse_args();
    let loaded = AppConfig::load(args.config());

    let level = match (&loaded, args.log_level()) {
        (_, Some(level)) => level.as_filter().to_string(),
        (Ok((config, _)), None) => config.logging.level.clone(),
        (Err(_), None) => "info".to_string(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    almanac_core::init();
    almanac_app::init();

    let config = match loaded {
        Ok((config, true)) => {
            log::info!("Loaded {}", args.config().display());
            config
        }
        Ok((config, false)) => {
            log::debug!("{} not found, using defaults", args.config().display());
            config
        }
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, config) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failures) => {
            log::warn!("{failures} commands failed");
            ExitCode::from(2)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
