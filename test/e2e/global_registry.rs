//! End-to-end tests over the process-wide registry and configuration.
//!
//! These exercise the global entry points the way an application does at
//! startup: record types attach themselves, then EIDs arriving from outside
//! are resolved back to records.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p exid-e2e --test global_registry
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use exid::{attach, configure, registry, reset_configuration, Eid, ExidError};
use exid_testing::{init_tracing, MemoryStore, Organization, Voucher};
use tracing::info;

/// Serializes tests that touch global state, and resets it on entry.
fn global() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    let guard = LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    init_tracing();
    registry().unload();
    reset_configuration();
    guard
}

#[test]
fn literal_scenario() {
    let _guard = global();

    let vouchers = Arc::new(MemoryStore::with_rows([Voucher::new(
        "018977bb-02f0-729c-8c00-2f384eccb763",
        "WELCOME",
    )]));
    let voucher_type = attach("vhr", "uuid", Arc::clone(&vouchers)).unwrap();

    let voucher = Voucher::new("018977bb-02f0-729c-8c00-2f384eccb763", "WELCOME");
    assert_eq!(
        voucher_type.eid_value(&voucher).unwrap(),
        "vhr_02TOxMzOS0VaLzYiS3NPd9"
    );

    let found = registry()
        .fetch_exactly_one("vhr_02TOxMzOS0VaLzYiS3NPd9")
        .unwrap();
    assert_eq!(found.downcast_ref::<Voucher>().unwrap().code, "WELCOME");

    let eid: Eid = "vhr_02TOxMzOS0VaLzYiS3NPd9".parse().unwrap();
    assert_eq!(eid.uuid(), voucher.uuid);
}

#[test]
fn configured_policy_applies_to_attach() {
    let _guard = global();

    configure(|config| config.set_prefix_validator(|p| matches!(p, "usr" | "org")));

    assert!(attach("usr", "uuid", Arc::new(MemoryStore::<Voucher>::new())).is_ok());

    let err = attach("bad", "uuid", Arc::new(MemoryStore::<Voucher>::new())).unwrap_err();
    assert_eq!(
        err,
        ExidError::PolicyViolation {
            prefix: "bad".to_string()
        }
    );
    assert!(!registry().contains("bad"));

    reset_configuration();
    assert!(attach("long5", "uuid", Arc::new(MemoryStore::<Voucher>::new())).is_err());
}

#[test]
fn configured_handle_length() {
    let _guard = global();

    configure(|config| config.set_handle_length(6));
    let orgs = attach("org", "external_id", Arc::new(MemoryStore::<Organization>::new())).unwrap();

    let org = Organization::new(1, "Acme");
    let eid = orgs.eid_value(&org).unwrap();
    let handle = orgs.eid_handle(&org).unwrap();
    assert_eq!(handle.len(), 6);
    assert!(eid.ends_with(&handle));
}

#[test]
fn unload_isolates_lifecycles() {
    let _guard = global();

    attach("vhr", "uuid", Arc::new(MemoryStore::<Voucher>::new())).unwrap();
    attach("org", "external_id", Arc::new(MemoryStore::<Organization>::new())).unwrap();
    assert_eq!(registry().len(), 2);

    registry().unload();

    assert!(registry().entries().is_empty());
    for prefix in ["vhr", "org", "any"] {
        assert!(matches!(
            registry().find(prefix),
            Err(ExidError::PrefixNotRegistered { .. })
        ));
    }
}

#[test]
fn concurrent_attach_from_many_threads() {
    let _guard = global();

    let handles: Vec<_> = (0..16)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..25 {
                    let prefix = format!("{t:x}{i:02}");
                    let store = Arc::new(MemoryStore::<Voucher>::new());
                    attach(&prefix, "uuid", store).unwrap();
                    // Every thread also redefines the same shared type.
                    attach("shr", "uuid", Arc::new(MemoryStore::<Voucher>::new())).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let entries = registry().entries();
    let prefixes: HashSet<_> = entries.iter().map(|e| e.prefix().to_string()).collect();

    info!(count = entries.len(), "concurrent attach finished");
    assert_eq!(entries.len(), 16 * 25 + 1);
    assert_eq!(prefixes.len(), entries.len());
    assert!(prefixes.contains("shr"));
}

#[test]
fn concurrent_lookups_during_reload() {
    let _guard = global();

    let voucher = Voucher::random("RELOAD");
    let eid = exid::coder::encode("vhr", &voucher.uuid.hyphenated().to_string()).unwrap();
    let vouchers = Arc::new(MemoryStore::with_rows([voucher.clone()]));
    attach("vhr", "uuid", Arc::clone(&vouchers)).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let eid = eid.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let found = registry().fetch(&eid).unwrap().unwrap();
                    assert_eq!(found.type_name(), "Voucher");
                }
            })
        })
        .collect();

    let writer = {
        let vouchers = Arc::clone(&vouchers);
        thread::spawn(move || {
            for _ in 0..200 {
                attach("vhr", "uuid", Arc::clone(&vouchers)).unwrap();
            }
        })
    };

    for handle in readers {
        handle.join().unwrap();
    }
    writer.join().unwrap();

    assert_eq!(registry().len(), 1);
}
