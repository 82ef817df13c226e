use std::env;
use std::path::PathBuf;
use std::process::Command;

/// Reset vector and trap entry for the RV32 board
const BOOT_SOURCE: &str = "src/boot.s";

/// Link the RV32 startup code into the firmware image.
///
/// Host builds (unit tests) skip this entirely.
fn main() {
    println!("cargo:rerun-if-changed={}", BOOT_SOURCE);
    println!("cargo:rerun-if-changed=linker.ld");

    let target = env::var("TARGET").unwrap_or_default();
    if !target.starts_with("riscv32") {
        return;
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    let object = out_dir.join("boot.o");
    let archive = out_dir.join("libboot.a");

    // The firmware target carries the A extension (spin needs CAS), so the
    // startup object is assembled for the same ISA
    run(
        Command::new("clang")
            .args(["--target=riscv32-unknown-elf", "-march=rv32imac", "-mabi=ilp32"])
            .arg("-c")
            .arg(BOOT_SOURCE)
            .arg("-o")
            .arg(&object),
        "assemble src/boot.s for rv32imac",
    );

    run(
        Command::new("ar").arg("crs").arg(&archive).arg(&object),
        "archive boot.o into libboot.a",
    );

    // whole-archive keeps _start and _trap_entry, which nothing in Rust calls
    println!("cargo:rustc-link-search=native={}", out_dir.display());
    println!("cargo:rustc-link-lib=static:+whole-archive=boot");
    println!("cargo:rustc-link-arg-bins=-Tlinker.ld");
}

fn run(command: &mut Command, what: &str) {
    let status = command
        .status()
        .unwrap_or_else(|err| panic!("failed to {}: {}", what, err));
    if !status.success() {
        panic!("failed to {}: {}", what, status);
    }
}
