fn main() {
    if let Err(e) = keyscope_cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
