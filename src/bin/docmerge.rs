use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    docmerge::example_apps::run_merge_demo(std::env::args().skip(1))
}
