use std::env;

fn main() {
    // Only the firmware build needs the ESP-IDF environment; host builds run the tests
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "espidf" {
        embuild::espidf::sysenv::output();
    }

    println!("cargo:rerun-if-changed=build.rs");
}
