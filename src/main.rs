fn main() {
    if let Err(e) = cinegrid::app::run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
