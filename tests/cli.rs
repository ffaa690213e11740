//! CLI tests: preflight check, apply/status wiring, and exit codes.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn setup_checkout() -> TempDir {
    let dir = TempDir::new().unwrap();
    let libmodbus = dir.path().join("src/libmodbus");
    fs::create_dir_all(&libmodbus).unwrap();

    fs::write(
        libmodbus.join("modbus-private.h"),
        "struct _modbus {\n    void *backend_data;\n};\n",
    )
    .unwrap();
    fs::write(
        libmodbus.join("modbus.h"),
        "MODBUS_BEGIN_DECLS\nint modbus_set_response_timeout(modbus_t *ctx, uint32_t to_sec, uint32_t to_usec);\nMODBUS_END_DECLS\n",
    )
    .unwrap();
    fs::write(
        libmodbus.join("modbus.c"),
        "void init(modbus_t *ctx)\n{\n    ctx->error_recovery = MODBUS_ERROR_RECOVERY_NONE;\n}\n\nint modbus_connect(modbus_t *ctx)\n{\n    return 0;\n}\n\nint modbus_reply(modbus_t *ctx)\n{\n    int offset;\n    offset = ctx->backend->header_length;\n    return 0;\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/ModbusServer.h"),
        "class ModbusServer {\npublic:\n  virtual void poll();\n};\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("src/ModbusServer.cpp"),
        "#include \"ModbusServer.h\"\n\nint ModbusServer::begin(int slaveId)\n{\n    modbus_set_slave(_modbus, slaveId);\n    return 1;\n}\n",
    )
    .unwrap();

    dir
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_modbus-hook-patcher"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn preflight_rejects_a_directory_without_libmodbus() {
    let dir = TempDir::new().unwrap();

    let output = run_cli(&["apply", "--root", dir.path().to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("src/libmodbus"));
}

#[test]
fn apply_patches_and_reports_a_summary() {
    let checkout = setup_checkout();

    let output = run_cli(&["apply", "--root", checkout.path().to_str().unwrap()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Summary:"));
    assert!(stdout.contains("9 applied"));

    let modbus_c =
        fs::read_to_string(checkout.path().join("src/libmodbus/modbus.c")).unwrap();
    assert!(modbus_c.contains("ctx->request_callback = NULL;"));
}

#[test]
fn second_apply_reports_everything_already_applied() {
    let checkout = setup_checkout();
    let root = checkout.path().to_str().unwrap().to_string();

    assert!(run_cli(&["apply", "--root", &root]).status.success());
    let output = run_cli(&["apply", "--root", &root]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 applied"));
    assert!(stdout.contains("9 already applied"));
}

#[test]
fn status_is_read_only_and_exits_zero_on_a_patchable_checkout() {
    let checkout = setup_checkout();
    let root = checkout.path().to_str().unwrap().to_string();

    let before =
        fs::read_to_string(checkout.path().join("src/libmodbus/modbus.h")).unwrap();

    let output = run_cli(&["status", "--root", &root]);
    assert!(output.status.success());

    let after =
        fs::read_to_string(checkout.path().join("src/libmodbus/modbus.h")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn missing_target_fails_the_run_but_patches_the_rest() {
    let checkout = setup_checkout();
    fs::remove_file(checkout.path().join("src/ModbusServer.cpp")).unwrap();

    let output = run_cli(&["apply", "--root", checkout.path().to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ModbusServer.cpp"));

    // The other four targets were still patched.
    let server_h = fs::read_to_string(checkout.path().join("src/ModbusServer.h")).unwrap();
    assert!(server_h.contains("void onRequest("));
}
