#[macro_use]
extern crate log;

use std::{env, process};

use env_logger::Env;
use imageio_core::utils::print_intro;

use cli::{build_registry, convert_file, describe_formats, parse_command, plugins_dir, Command};

mod cli;

const DEFAULT_LOGGING_LEVEL: &str = "info";
const PLUGINS_DIR: &str = "plugins";

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOGGING_LEVEL)).init();
    let args: Vec<String> = env::args().collect();
    debug!("args are: {:?}", args);

    print_intro();

    let command = match parse_command(&args) {
        Ok(v) => v,
        Err(err) => {
            error!("{}", err);
            error!("please specify command:\nconverter --source=example.json --goal-format=ppm [--output=result.ppm] [--option=binary:false]\nconverter formats");
            process::exit(2);
        }
    };

    let registry = match build_registry(&plugins_dir(&args, PLUGINS_DIR)) {
        Ok(v) => v,
        Err(err) => {
            error!("failed to set up image formats: {}", err);
            process::exit(1);
        }
    };

    match command {
        Command::ListFormats => {
            for format in describe_formats(&registry) {
                println!("{}", format);
            }
        },
        Command::Convert(request) => {
            if let Err(err) = convert_file(&registry, &request) {
                error!("failed to convert {}: {}", request.source.to_string_lossy(), err);
                process::exit(1);
            }
        }
    }
}
