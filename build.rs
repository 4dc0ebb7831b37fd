use std::env;

fn main() {
    // Compile-time defaults for the detect_bridge binary.
    // Used when neither a config file nor a command-line flag sets them.

    // Autopilot endpoint (serial device, tcp:HOST:PORT, udpin:HOST:PORT, ...)
    if let Ok(endpoint) = env::var("DETECT_LINK_ENDPOINT") {
        println!("cargo:rustc-env=DETECT_LINK_ENDPOINT={}", endpoint);
        println!(
            "cargo:warning=Using DETECT_LINK_ENDPOINT from environment: {}",
            endpoint
        );
    } else {
        println!("cargo:rustc-env=DETECT_LINK_ENDPOINT=");
    }

    // Serial baud rate
    if let Ok(baud) = env::var("DETECT_LINK_BAUD") {
        println!("cargo:rustc-env=DETECT_LINK_BAUD={}", baud);
        println!("cargo:warning=Using DETECT_LINK_BAUD from environment: {}", baud);
    } else {
        println!("cargo:rustc-env=DETECT_LINK_BAUD=");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=DETECT_LINK_ENDPOINT");
    println!("cargo:rerun-if-env-changed=DETECT_LINK_BAUD");
}
