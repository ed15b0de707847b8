//! Build script for detecting system dependencies and providing installation guidance.
//!
//! Checks for OpenCV and pkg-config, and for the Haar cascade the application
//! loads at startup.

use std::env;
use std::path::Path;
use std::process::Command;

const CLASSIFIER_FILE: &str = "haarcascade_frontalface_default.xml";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=assets");

    check_pkg_config();
    check_opencv();
    check_classifier();

    println!(
        "cargo:rustc-env=BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_default()
    );
}

fn pkg_config_version(package: &str) -> Option<String> {
    let output = Command::new("pkg-config").args(["--modversion", package]).output().ok()?;
    if output.status.success() {
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        None
    }
}

fn check_opencv() {
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match pkg_config_version("opencv4").or_else(|| pkg_config_version("opencv")) {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => {
            println!("cargo:warning=OpenCV not found via pkg-config. Make sure OpenCV is installed.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install libopencv-dev");
            println!("cargo:warning=On macOS: brew install opencv");
        }
    }
}

fn check_classifier() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_default();
    let local = Path::new(&manifest_dir).join("assets").join(CLASSIFIER_FILE);
    if local.exists() {
        return;
    }

    // Distribution packages ship the cascades alongside OpenCV
    let system = ["/usr/share/opencv4/haarcascades", "/usr/share/opencv/haarcascades"]
        .iter()
        .map(|dir| Path::new(dir).join(CLASSIFIER_FILE))
        .find(|path| path.exists());

    match system {
        Some(path) => {
            println!("cargo:warning=Face classifier not in assets/, found {}", path.display());
            println!("cargo:warning=Copy it to assets/ or pass --classifier {}", path.display());
        }
        None => {
            println!("cargo:warning=Face classifier {CLASSIFIER_FILE} not found.");
            println!("cargo:warning=Download it from the OpenCV repository (data/haarcascades) into assets/");
        }
    }
}

fn check_pkg_config() {
    let output = Command::new("pkg-config").arg("--version").output();

    match output {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Found pkg-config version: {}", version.trim());
        }
        _ => {
            println!("cargo:warning=pkg-config not found. This is required to find system libraries.");
            println!("cargo:warning=On Ubuntu: sudo apt-get install pkg-config");
            println!("cargo:warning=On macOS: brew install pkg-config");
        }
    }
}
