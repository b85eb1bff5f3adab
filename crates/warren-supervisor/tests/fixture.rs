use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// A tiny python guest that speaks the newline-delimited JSON blob
/// protocol directly, standing in for a real compiled guest interpreter
/// (mirroring the teacher's own pattern of spawning a scripted fixture
/// process for supervisor-level tests rather than a real target binary).
pub fn write_echo_guest() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let script_path = dir.path().join("echo-guest.py");
    let script = r#"#!/usr/bin/env python3
import json
import sys

def send(obj):
    sys.stdout.write(json.dumps(obj) + "\n")
    sys.stdout.flush()

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    obj = json.loads(line)
    kind = obj.get("type")
    if kind == "construct":
        send({"type": "construct", "id": obj["id"], "resource": obj["resource"], "deconstructed": True})
    elif kind == "destruct":
        send({"type": "destruct", "id": obj["id"], "resource": obj["resource"], "deconstructed": True})
    elif kind == "request":
        header = obj["header"]
        method = obj["method"]
        if method == "Ping":
            send({"type": "response", "header": {"id": header["id"]}, "result": "[\"pong\"]"})
        elif method == "Boom":
            sys.exit(1)
        else:
            send({
                "type": "response",
                "header": {"id": header["id"], "error": {"message": "no such method", "code": "NoSuchMethod"}},
                "result": "",
            })
"#;
    fs::write(&script_path, script).expect("write script");
    let mut perms = fs::metadata(&script_path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script_path, perms).expect("chmod");
    (dir, script_path)
}

/// A guest that, on `Trigger`, emits its own outbound `request` blob (as
/// if calling another resource through its `Mcp` capability) and logs
/// whatever response blob comes back to a sibling `.outbound` file before
/// answering the original `Trigger` call.
pub fn write_outbound_guest() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let script_path = dir.path().join("outbound-guest.py");
    let script = r#"#!/usr/bin/env python3
import json
import sys

source_path = sys.argv[1] if len(sys.argv) > 1 else None
outbound_path = (source_path + ".outbound") if source_path else None

def send(obj):
    sys.stdout.write(json.dumps(obj) + "\n")
    sys.stdout.flush()

while True:
    line = sys.stdin.readline()
    if not line:
        break
    line = line.strip()
    if not line:
        continue
    obj = json.loads(line)
    kind = obj.get("type")
    if kind == "construct":
        send({"type": "construct", "id": obj["id"], "resource": obj["resource"], "deconstructed": True})
    elif kind == "destruct":
        send({"type": "destruct", "id": obj["id"], "resource": obj["resource"], "deconstructed": True})
    elif kind == "request":
        header = obj["header"]
        method = obj["method"]
        rid = header["id"]
        if method == "Trigger":
            send({
                "type": "request",
                "header": {"id": "out1", "source": obj["resource"]},
                "resource": "bob",
                "method": "Ping",
                "parameters": "[]",
            })
            reply = sys.stdin.readline()
            if outbound_path:
                with open(outbound_path, "w") as fh:
                    fh.write(reply)
            send({"type": "response", "header": {"id": rid}, "result": "[\"done\"]"})
        else:
            send({
                "type": "response",
                "header": {"id": rid, "error": {"message": "no such method", "code": "NoSuchMethod"}},
                "result": "",
            })
"#;
    fs::write(&script_path, script).expect("write script");
    let mut perms = fs::metadata(&script_path).expect("metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script_path, perms).expect("chmod");
    (dir, script_path)
}

pub struct NullResourceFinder;

#[async_trait::async_trait]
impl warren_supervisor::ResourceFinder for NullResourceFinder {
    async fn handlers(
        &self,
        _source: &str,
        _target: &str,
    ) -> Result<Vec<warren_dispatch::Handler>, warren_supervisor::SupervisorError> {
        Ok(Vec::new())
    }
}

/// A finder that always rejects, as the router does for a non-neighbor
/// call, carrying a structured code through `SupervisorError::ResourceFinder`.
pub struct RejectingResourceFinder;

#[async_trait::async_trait]
impl warren_supervisor::ResourceFinder for RejectingResourceFinder {
    async fn handlers(
        &self,
        _source: &str,
        _target: &str,
    ) -> Result<Vec<warren_dispatch::Handler>, warren_supervisor::SupervisorError> {
        Err(warren_supervisor::SupervisorError::ResourceFinder {
            code: warren_proto::ErrorCode::UnavailableResource,
            message: "target is not a neighbor of source".into(),
        })
    }
}
