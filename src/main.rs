fn main() {
    if let Err(e) = reportsight_lib::run() {
        eprintln!("reportsight: {e}");
        std::process::exit(1);
    }
}
