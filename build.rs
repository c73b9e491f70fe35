use std::env;
use std::path::{Path, PathBuf};

const MIN_VERSION: &str = "2.12";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // liburing-ffi exports the helpers that liburing.h declares inline
    // (get_sqe, cqe_seen, sqe_set_buf_group, ...), so link against it.
    if probe_system(MIN_VERSION) {
        println!("cargo:rustc-link-lib=uring-ffi");
        return;
    }

    println!("cargo:rustc-link-lib=static=uring-ffi");
    build_from_source(MIN_VERSION);
}

fn probe_system(min_version: &str) -> bool {
    let lib = match pkg_config::Config::new()
        .cargo_metadata(false)
        .atleast_version(min_version)
        .probe("liburing-ffi")
    {
        Ok(lib) => lib,
        Err(e) => {
            println!("cargo:warning=liburing-ffi not found via pkg-config ({e:?})");
            return false;
        }
    };

    // Emit search paths now that the probe is known to succeed.
    if let Err(e) = pkg_config::Config::new()
        .atleast_version(min_version)
        .probe("liburing-ffi")
    {
        println!("cargo:warning=pkg-config re-probe failed ({e:?})");
        return false;
    }

    match lib.include_paths.first() {
        Some(include_dir) => {
            generate_bindings(&include_dir.join("liburing.h"), include_dir);
            true
        }
        None => false,
    }
}

fn generate_bindings(header_path: &Path, include_dir: &Path) {
    let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let bindings = bindgen::Builder::default()
        .header(header_path.to_string_lossy())
        .clang_arg(format!("-I{}", include_dir.display()))
        .allowlist_type("io_uring.*")
        .allowlist_type("__kernel_timespec")
        .allowlist_function("io_uring_queue_init.*")
        .allowlist_function("io_uring_queue_exit")
        .allowlist_function("io_uring_submit.*")
        .allowlist_function("io_uring_wait_cqe_timeout")
        .allowlist_var("IORING_.*")
        .allowlist_var("IO_URING_.*")
        .rustified_enum("io_uring_op")
        .derive_debug(true)
        .derive_default(true)
        .layout_tests(false)
        .generate_comments(true)
        .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
        .generate()
        .expect("Unable to generate liburing bindings");

    bindings
        .write_to_file(out_path.join("bindings.rs"))
        .expect("Couldn't write bindings");

    println!("cargo:rerun-if-changed={}", header_path.display());
}

fn build_from_source(min_version: &str) {
    use std::process::Command;

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let src_dir = out_dir.join("liburing-src");

    if !src_dir.exists() {
        println!("cargo:warning=Cloning liburing {min_version} from GitHub...");

        let status = Command::new("git")
            .args(["clone", "--depth=1", "--branch"])
            .arg(format!("liburing-{min_version}"))
            .arg("https://github.com/axboe/liburing.git")
            .arg(&src_dir)
            .status()
            .expect("Failed to execute git clone");

        if !status.success() {
            panic!("Failed to clone liburing from GitHub");
        }
    }

    let configured = Command::new("./configure")
        .current_dir(&src_dir)
        .status()
        .expect("Failed to run ./configure");
    if !configured.success() {
        panic!("Failed to configure liburing");
    }

    let built = Command::new("make")
        .current_dir(src_dir.join("src"))
        .arg("-j")
        .status()
        .expect("Failed to run make");
    if !built.success() {
        panic!("Failed to build liburing");
    }

    println!(
        "cargo:rustc-link-search=native={}",
        src_dir.join("src").display()
    );

    let include_dir = src_dir.join("src/include");
    generate_bindings(&include_dir.join("liburing.h"), &include_dir);
}
