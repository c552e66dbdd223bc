fn main() {
    if let Err(err) = networth_migrate::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
