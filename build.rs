//! Purpose: Compile the C native probe used to exercise low-level stdio capture.
//! Role: Cargo build-script; configures `cc` inputs and rebuild triggers.
//! Invariants: `cargo:rerun-if-changed` covers every C source and header.
//! Invariants: Produces a `native_probe` object library linked into the Rust crate.
//! Invariants: Uses only Cargo-provided env vars (e.g. `CARGO_MANIFEST_DIR`).
use std::env;
use std::path::PathBuf;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR"));
    let c_dir = manifest_dir.join("c");

    println!("cargo:rerun-if-changed=c/native_probe.c");
    println!("cargo:rerun-if-changed=c/native_probe.h");

    let mut build = cc::Build::new();
    build
        .include(&c_dir)
        .file(c_dir.join("native_probe.c"))
        .warnings(true);

    configure_probe_compiler(&mut build, &target);

    build.compile("native_probe");
}

fn configure_probe_compiler(build: &mut cc::Build, target: &str) {
    if target.contains("windows-msvc") {
        if !has_user_cc_override(target) {
            build.compiler("clang-cl");
        }
    } else {
        build.flag_if_supported("-std=c11");
    }
}

fn has_user_cc_override(target: &str) -> bool {
    let target_cc = format!("CC_{target}");
    let target_cc_underscored = format!("CC_{}", target.replace('-', "_"));
    env::var_os("CC").is_some()
        || env::var_os(target_cc).is_some()
        || env::var_os(target_cc_underscored).is_some()
}
