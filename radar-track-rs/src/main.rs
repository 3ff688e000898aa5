fn main() {
    if let Err(e) = radar_track::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
