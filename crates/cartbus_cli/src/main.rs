fn main() {
    env_logger::init();

    let options = match cartbus_cli::Options::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };

    log::info!("Running ROM path: '{}'", options.rom.display());
    if let Err(err) = cartbus_cli::run(&options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
