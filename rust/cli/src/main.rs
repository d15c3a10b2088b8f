fn main() {
    alea_cli::logging::init_logging();
    let code = alea_cli::run(
        std::env::args(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    std::process::exit(code);
}
