use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    std::process::exit(beerlist::cli::run_with_args(&args));
}
