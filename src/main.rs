fn main() {
    if let Err(e) = mitm_analyser::cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
