use kalip::{ActionRegistry, Session, SlotAllocator, TransformSpec};
use serde_json::json;

fn main() {
    // Build everything once, up front. The stage is immutable afterwards and
    // would normally be shared by every virtual user in the benchmark.
    let registry = ActionRegistry::with_builtins();
    let mut alloc = SlotAllocator::new();

    let spec: TransformSpec = serde_json::from_value(json!({
        "variable": "body",
        "format": "string",
        "pattern": "status=${status} body=${body}",
        "actions": [
            // Pretend we derived a status from the body; real deployments
            // register their own kinds for that.
            {"kind": "set", "var": "status", "text": "ok"},
            {"kind": "append", "var": "body", "text": " (seen)"},
        ],
    }))
    .unwrap();

    // `true` because our fake network below delivers the record in pieces.
    let stage = spec.build(&registry, &mut alloc, true).unwrap();

    // One session per virtual user. Declare first, always.
    let mut session = Session::new();
    stage.reserve(&mut session);

    let mut out = Vec::new();
    for (bytes, last) in [
        (b"hel".as_slice(), false),
        (b"lo wor".as_slice(), false),
        (b"ld".as_slice(), true),
    ] {
        stage
            .transform(&mut session, bytes, 0, bytes.len(), last, &mut out)
            .unwrap();
    }

    println!("{}", String::from_utf8_lossy(&out));
}
