fn main() {
    println!("cargo:rerun-if-env-changed=WEATHERNODE_CONFIG");

    // ESP-IDF link arguments only exist for the firmware build; host builds
    // (tests, simulation) skip the embuild step entirely.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
