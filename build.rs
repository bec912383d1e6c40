use std::env;

fn main() {
    // TRANSIT_GRAPH_VERSION from the environment takes precedence over the package version
    let version = env::var("TRANSIT_GRAPH_VERSION")
        .unwrap_or_else(|_| env::var("CARGO_PKG_VERSION").unwrap_or_default());
    println!("cargo:rustc-env=TRANSIT_GRAPH_VERSION={}", version);

    println!("cargo:rerun-if-env-changed=TRANSIT_GRAPH_VERSION");
    println!("cargo:rerun-if-changed=Cargo.toml");
}
