//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use fswatch_core::{ObjectKind, Operation};

/// Decode a contiguous stream of wire messages.
pub fn decode_all(mut bytes: &[u8]) -> Vec<Operation> {
    let mut operations = Vec::new();
    while !bytes.is_empty() {
        let (operation, consumed) = decode_one(bytes);
        operations.push(operation);
        bytes = &bytes[consumed..];
    }
    operations
}

/// Decode one message, returning it and the number of bytes consumed.
pub fn decode_one(bytes: &[u8]) -> (Operation, usize) {
    let kind = match bytes[1] {
        1 => ObjectKind::File,
        2 => ObjectKind::Directory,
        other => panic!("unknown object kind {other}"),
    };

    let mut offset = 2;
    let mut read_path = || {
        let len = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]) as usize;
        let start = offset + 2;
        offset = start + len;
        PathBuf::from(String::from_utf8(bytes[start..offset].to_vec()).unwrap())
    };

    let operation = match bytes[0] {
        3 => Operation::Added {
            kind,
            path: read_path(),
        },
        4 => Operation::Modified {
            kind,
            path: read_path(),
        },
        5 => Operation::Created {
            kind,
            path: read_path(),
        },
        6 => {
            let from = read_path();
            let to = read_path();
            Operation::Renamed { kind, from, to }
        }
        7 => Operation::Removed {
            kind,
            path: read_path(),
        },
        other => panic!("unknown opcode {other}"),
    };

    (operation, offset)
}
