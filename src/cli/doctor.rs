//! Environment readiness check.

use crate::browser::chromium::find_chromium;
use anyhow::Result;
use std::process::Command;

/// Check Chromium availability and memory headroom.
pub async fn run() -> Result<()> {
    println!("Kargo Takip Doctor");
    println!("==================");
    println!();

    // OS and architecture
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install google-chrome/chromium or set KARGO_CHROMIUM_PATH."
        ),
    }

    // Headless Chromium is memory-hungry; warn early.
    match read_memory_mb() {
        Some((label, mb)) => {
            if mb >= 512 {
                println!("[OK] {label}: {mb}MB (>= 512MB required)");
            } else {
                println!("[!!] {label}: {mb}MB (< 512MB, queries may fail)");
            }
        }
        None => println!("[??] Could not determine memory"),
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        println!("  Install Chromium or point KARGO_CHROMIUM_PATH at a binary.");
    }

    Ok(())
}

/// Memory headroom in MB, labeled by what the platform can measure:
/// total RAM on macOS (`sysctl hw.memsize` is the only cheap number
/// there), truly available memory on Linux (`free -m`).
fn read_memory_mb() -> Option<(&'static str, u64)> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(("Total memory", bytes / 1_048_576))
    }
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("free").args(["-m"]).output().ok()?;
        parse_free_available_mb(&String::from_utf8_lossy(&output.stdout))
            .map(|mb| ("Available memory", mb))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Pull the `available` column out of `free -m` output.
#[cfg(target_os = "linux")]
fn parse_free_available_mb(output: &str) -> Option<u64> {
    for line in output.lines() {
        if line.starts_with("Mem:") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 7 {
                return parts[6].parse().ok();
            }
        }
    }
    None
}
