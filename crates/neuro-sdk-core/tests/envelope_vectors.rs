//! Inbound envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use neuro_sdk_core::protocol::{command, Envelope, IncomingAction};

mod vector_loader;
use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn inbound_vectors() {
    let files = [
        "action_min.json",
        "action_with_data.json",
        "action_null_data.json",
        "reregister_all.json",
        "not_json.json",
        "missing_command.json",
        "action_missing_id.json",
        "action_missing_data.json",
    ];

    for f in files {
        let v = load(f);
        let text = v.frame.decode();
        let res = Envelope::decode(&text);

        if let Some(err) = v.expect_error.as_ref().filter(|e| e.stage == "envelope") {
            let e = res.expect_err("expected envelope error");
            assert_eq!(e.kind().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let env = res.expect("expected ok envelope");

        if let Some(err) = v.expect_error.as_ref().filter(|e| e.stage == "action") {
            let e = env
                .parse_data::<IncomingAction>()
                .expect_err("expected action error");
            assert_eq!(e.kind().as_str(), err.code, "vector={}", v.description);
            continue;
        }

        let ex = v.expect.expect("missing expect block");
        assert_eq!(env.command, ex["command"].as_str().unwrap(), "vector={}", v.description);
        assert_eq!(env.game, ex["game"].as_str().unwrap(), "vector={}", v.description);

        if env.command == command::ACTION {
            let action: IncomingAction = env.parse_data().unwrap();
            assert_eq!(action.id, ex["id"].as_str().unwrap(), "vector={}", v.description);
            assert_eq!(action.name, ex["name"].as_str().unwrap(), "vector={}", v.description);
            assert_eq!(
                action.data.is_some(),
                ex["has_data"].as_bool().unwrap(),
                "vector={}",
                v.description
            );
        } else {
            assert!(env.data.is_none(), "vector={}", v.description);
        }
    }
}
