// Linker scripts for the firmware image. Host builds (the library and its tests) need none.

use std::env;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("riscv32") {
        println!("cargo:rustc-link-arg-bins=-Tlinkall.x");
        if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
            println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
        }
    }
    println!("cargo:rerun-if-changed=build.rs");
}
