//! The hook plan: the fixed set of patches that inject a request callback
//! into ArduinoModbus.
//!
//! Five files are touched. The bundled libmodbus gains a `request_callback`
//! pointer on the context struct, a setter, and an invocation at the top of
//! `modbus_reply`; the C++ `ModbusServer` wrapper gains an `onRequest`
//! registration API backed by an `extern "C"` helper that decodes the raw
//! request frame.
//!
//! Every payload contains its step's signature, so re-running the plan is
//! always a no-op (see the self-sealing test below).

use crate::runner::FileTarget;
use crate::step::{PatchStep, Transform};

/// Directory whose presence proves we are at the root of an ArduinoModbus
/// checkout. Checked once before any target is touched.
pub const MARKER_DIR: &str = "src/libmodbus";

/// Setter implementation inserted ahead of `modbus_connect` in modbus.c.
const SETTER_IMPL: &str = r"
void modbus_set_request_callback(modbus_t *ctx, int (*callback)(modbus_t *ctx, uint8_t *req, int req_length)) {
    ctx->request_callback = callback;
}

";

/// Callback invocation inserted at the top of `modbus_reply`, just before
/// the offset computation. The trailing indent re-aligns the anchor line.
const REPLY_HOOK: &str = "\n    if (ctx->request_callback != NULL) {\n        ctx->request_callback(ctx, (uint8_t*)req, req_length);\n    }\n\n    ";

/// Static member definition plus the `extern "C"` bridge between libmodbus
/// and the `ModbusServer` class, inserted after the include in
/// ModbusServer.cpp. Decodes slave, function, address, and quantity from the
/// raw frame before handing them to the registered callback.
const SERVER_HELPER: &str = r#"

// Define the static member
void (*ModbusServer::_onRequestCallback)(int, int, int, int) = NULL;

extern "C" {
// Helper callback for libmodbus
int internalRequestCallback(modbus_t *ctx, uint8_t *req, int req_length) {
    if (ModbusServer::_onRequestCallback) {
        int header_length = modbus_get_header_length(ctx);
        if (req_length < header_length + 1) return 0;

        int slave = req[header_length - 1];
        int function = req[header_length];
        int address = 0;
        int quantity = 0;

        // Extract address (usually 2 bytes after function)
        if (req_length >= header_length + 3) {
            address = (req[header_length + 1] << 8) + req[header_length + 2];
        }

        // Extract quantity based on function type
        switch(function) {
            case MODBUS_FC_READ_COILS:
            case MODBUS_FC_READ_DISCRETE_INPUTS:
            case MODBUS_FC_READ_HOLDING_REGISTERS:
            case MODBUS_FC_READ_INPUT_REGISTERS:
            case MODBUS_FC_WRITE_MULTIPLE_COILS:
            case MODBUS_FC_WRITE_MULTIPLE_REGISTERS:
                if (req_length >= header_length + 5) {
                    quantity = (req[header_length + 3] << 8) + req[header_length + 4];
                }
                break;
            case MODBUS_FC_WRITE_SINGLE_COIL:
            case MODBUS_FC_WRITE_SINGLE_REGISTER:
                quantity = 1;
                break;
            default:
                quantity = 0;
        }

        ModbusServer::_onRequestCallback(slave, function, address, quantity);
    }
    return 0;
}
}
"#;

/// `onRequest` definition, anchored on the tail of the helper block the
/// previous step inserts.
const ON_REQUEST_IMPL: &str = "\n\nvoid ModbusServer::onRequest(void (*callback)(int, int, int, int)) {\n    _onRequestCallback = callback;\n}\n";

/// Build the full ordered plan.
pub fn hook_plan() -> Vec<FileTarget<'static>> {
    vec![
        FileTarget {
            path: "src/libmodbus/modbus-private.h",
            steps: vec![PatchStep {
                id: "private-h-struct-member",
                signature: "int (*request_callback)",
                anchors: &["void *backend_data;"],
                transform: Transform::Replace,
                payload: "void *backend_data;\n    int (*request_callback)(modbus_t *ctx, uint8_t *req, int req_length);",
            }],
        },
        FileTarget {
            path: "src/libmodbus/modbus.h",
            steps: vec![PatchStep {
                id: "h-declare-setter",
                signature: "modbus_set_request_callback",
                // The response-timeout declaration is the preferred spot but
                // has changed shape across libmodbus releases; the decls
                // guard macro is the stable fallback.
                anchors: &[
                    "int modbus_set_response_timeout(modbus_t *ctx, uint32_t to_sec, uint32_t to_usec);",
                    "MODBUS_BEGIN_DECLS",
                ],
                transform: Transform::InsertAfter,
                payload: "\n\nvoid modbus_set_request_callback(modbus_t *ctx, int (*callback)(modbus_t *ctx, uint8_t *req, int req_length));",
            }],
        },
        FileTarget {
            path: "src/libmodbus/modbus.c",
            steps: vec![
                PatchStep {
                    id: "c-init-null",
                    signature: "ctx->request_callback = NULL;",
                    anchors: &["ctx->error_recovery = MODBUS_ERROR_RECOVERY_NONE;"],
                    transform: Transform::InsertAfter,
                    payload: "\n    ctx->request_callback = NULL;",
                },
                PatchStep {
                    id: "c-define-setter",
                    signature: "void modbus_set_request_callback",
                    anchors: &["int modbus_connect(modbus_t *ctx)"],
                    transform: Transform::InsertBefore,
                    payload: SETTER_IMPL,
                },
                PatchStep {
                    id: "c-invoke-in-reply",
                    signature: "ctx->request_callback(ctx",
                    anchors: &["offset = ctx->backend->header_length;"],
                    transform: Transform::InsertBefore,
                    payload: REPLY_HOOK,
                },
            ],
        },
        FileTarget {
            path: "src/ModbusServer.h",
            steps: vec![PatchStep {
                id: "server-h-declare-on-request",
                signature: "void onRequest(",
                anchors: &["virtual void poll();"],
                transform: Transform::InsertAfter,
                payload: "\n\n  void onRequest(void (*callback)(int slave, int function, int address, int quantity));\n  static void (*_onRequestCallback)(int slave, int function, int address, int quantity);\n",
            }],
        },
        FileTarget {
            path: "src/ModbusServer.cpp",
            steps: vec![
                PatchStep {
                    id: "server-cpp-helper",
                    signature: "internalRequestCallback",
                    anchors: &["#include \"ModbusServer.h\""],
                    transform: Transform::InsertAfter,
                    payload: SERVER_HELPER,
                },
                PatchStep {
                    id: "server-cpp-define-on-request",
                    signature: "void ModbusServer::onRequest",
                    // Anchored on the closing of the extern "C" block that
                    // the helper step just inserted. The empty destructor is
                    // the fallback insertion point when the helper step could
                    // not run; non-empty destructor bodies vary across
                    // releases and offer no safe literal anchor.
                    anchors: &[
                        "    return 0;\n}\n}",
                        "ModbusServer::~ModbusServer()\n{\n}",
                    ],
                    transform: Transform::InsertAfter,
                    payload: ON_REQUEST_IMPL,
                },
                PatchStep {
                    id: "server-cpp-register",
                    signature: "modbus_set_request_callback",
                    anchors: &["modbus_set_slave(_modbus, slaveId);"],
                    transform: Transform::InsertAfter,
                    payload: "\n    modbus_set_request_callback(_modbus, internalRequestCallback);",
                },
            ],
        },
    ]
}
