//! Tests for binding argument lists against `rb_scan_args` format strings.
//!
//! Every test goes through the public API with the `Object` reference host, the same
//! way an embedder would.

use pretty_assertions::assert_eq;
use rbshim::{
    ArgSpec, HashKey, KeywordState, Object, ObjectContext, RecordingTracer, ScanError, ScanOutput, Scanner, SlotKind,
    TraceEvent, scan_args,
};

fn int(i: i64) -> Object {
    Object::Int(i)
}

fn array(items: &[i64]) -> Object {
    Object::Array(items.iter().copied().map(Object::Int).collect())
}

fn kwargs(key: &str, value: i64) -> Object {
    Object::hash([(HashKey::symbol(key), Object::Int(value))])
}

fn proc_named(name: &str) -> Object {
    Object::Proc(name.to_owned())
}

/// Scans without a block, panicking on error.
fn scan(format: &str, args: &[Object]) -> ScanOutput<Object> {
    scan_args(&mut ObjectContext::new(), args, format).expect("scan should succeed")
}

fn scan_err(format: &str, args: &[Object]) -> ScanError {
    scan_args(&mut ObjectContext::new(), args, format).expect_err("scan should fail")
}

#[test]
fn leading_and_optional_bound_in_order() {
    let out = scan("11", &[int(1), int(2)]);
    assert_eq!(out.values(), [int(1), int(2)]);
    assert_eq!(out.argc(), 2);
}

#[test]
fn missing_optionals_are_nil() {
    let out = scan("12", &[int(1)]);
    assert_eq!(out.values(), [int(1), Object::Nil, Object::Nil]);
    assert_eq!(out.argc(), 1);
}

#[test]
fn rest_collects_between_leading_and_trailing() {
    let out = scan("1*1", &[int(1), int(2), int(3), int(4)]);
    assert_eq!(out.values(), [int(1), array(&[2, 3]), int(4)]);
    assert_eq!(out.argc(), 4);
}

#[test]
fn empty_rest_is_still_an_array() {
    let out = scan("0*", &[]);
    assert_eq!(out.values(), [array(&[])]);
    assert_eq!(out.argc(), 0);
}

#[test]
fn trailing_reserved_before_optionals() {
    // the trailing slot takes the last argument, so the optional goes unfilled
    let out = scan("111", &[int(1), int(2)]);
    assert_eq!(out.values(), [int(1), Object::Nil, int(2)]);
}

#[test]
fn keyword_hash_is_consumed() {
    let out = scan("1:", &[int(1), kwargs("k", 1)]);
    assert_eq!(out.values(), [int(1), kwargs("k", 1)]);
    assert_eq!(out.kind(1), Some(SlotKind::Keywords));
    assert_eq!(out.argc(), 1);
}

#[test]
fn keyword_hash_after_rest_and_trailing() {
    let out = scan("1*1:", &[int(1), int(2), int(3), kwargs("k", 4)]);
    assert_eq!(out.values(), [int(1), array(&[2]), int(3), kwargs("k", 4)]);
    assert_eq!(out.argc(), 3);
}

#[test]
fn rest_then_keywords() {
    let out = scan("*:", &[int(1), int(2), kwargs("k", 3)]);
    assert_eq!(out.values(), [array(&[1, 2]), kwargs("k", 3)]);
    assert_eq!(out.argc(), 2);
}

#[test]
fn empty_hash_is_keywords() {
    let out = scan(":", &[Object::hash([])]);
    assert_eq!(out.values(), [Object::hash([])]);
    assert_eq!(out.argc(), 0);
}

#[test]
fn unambiguous_trailing_nil_is_an_empty_options_hash() {
    // more arguments than positional slots and no rest: nil stands for `{}`
    let out = scan("1:", &[int(1), Object::Nil]);
    assert_eq!(out.values(), [int(1), Object::Nil]);
    assert_eq!(out.argc(), 1);
}

#[test]
fn ambiguous_trailing_nil_stays_positional() {
    let out = scan("11:", &[int(1), Object::Nil]);
    assert_eq!(out.values(), [int(1), Object::Nil, Object::Nil]);
    assert_eq!(out.kind(2), Some(SlotKind::Keywords));
    assert_eq!(out.argc(), 2);

    let out = scan("1*:", &[int(1), Object::Nil]);
    assert_eq!(out.values(), [int(1), Object::Array(vec![Object::Nil]), Object::Nil]);
    assert_eq!(out.argc(), 2);
}

#[test]
fn non_hash_trailing_argument_erases_keywords() {
    let out = scan("11:", &[int(1), int(2)]);
    assert_eq!(out.values(), [int(1), int(2), Object::Nil]);
    assert_eq!(out.argc(), 2);
}

#[test]
fn string_keyed_hash_is_positional() {
    let hash = Object::hash([(HashKey::string("k"), int(1))]);
    let out = scan("11:", &[int(1), hash.clone()]);
    assert_eq!(out.values(), [int(1), hash, Object::Nil]);
    assert_eq!(out.argc(), 2);
}

#[test]
fn erased_keywords_do_not_hide_surplus_arguments() {
    assert_eq!(
        scan_err("1:", &[int(1), int(2)]),
        ScanError::Arity {
            actual: 2,
            min: 1,
            max: Some(1)
        }
    );
}

#[test]
fn keyword_hash_with_surplus_positionals_fails() {
    assert_eq!(
        scan_err("1:", &[int(1), int(2), kwargs("k", 1)]),
        ScanError::Arity {
            actual: 2,
            min: 1,
            max: Some(1)
        }
    );
}

#[test]
fn hash_filling_a_mandatory_slot_is_positional() {
    let out = scan("1:", &[kwargs("k", 1)]);
    assert_eq!(out.values(), [kwargs("k", 1), Object::Nil]);
    assert_eq!(out.argc(), 1);
}

#[test]
fn hash_without_keyword_support_is_positional() {
    let out = scan("1", &[kwargs("k", 1)]);
    assert_eq!(out.values(), [kwargs("k", 1)]);
    assert_eq!(out.argc(), 1);
}

#[test]
fn block_slot() {
    let mut ctx = ObjectContext::with_block(proc_named("blk"));
    let out = scan_args(&mut ctx, &[int(1)], "1&").unwrap();
    assert_eq!(out.values(), [int(1), proc_named("blk")]);
    assert_eq!(out.kind(1), Some(SlotKind::Block));

    let out = scan("1&", &[int(1)]);
    assert_eq!(out.values(), [int(1), Object::Nil]);
}

#[test]
fn block_follows_keywords() {
    let mut ctx = ObjectContext::with_block(proc_named("blk"));
    let out = scan_args(&mut ctx, &[kwargs("k", 1)], ":&").unwrap();
    assert_eq!(out.values(), [kwargs("k", 1), proc_named("blk")]);
    assert_eq!(out.argc(), 0);
}

#[test]
fn too_few_arguments() {
    assert_eq!(
        scan_err("2", &[int(1)]),
        ScanError::Arity {
            actual: 1,
            min: 2,
            max: Some(2)
        }
    );
    assert_eq!(
        scan_err("1*", &[]),
        ScanError::Arity {
            actual: 0,
            min: 1,
            max: None
        }
    );
}

#[test]
fn too_many_arguments() {
    let err = scan_err("11", &[int(1), int(2), int(3)]);
    assert_eq!(
        err,
        ScanError::Arity {
            actual: 3,
            min: 1,
            max: Some(2)
        }
    );
    assert_eq!(err.message(), "wrong number of arguments (given 3, expected 1..2)");
}

#[test]
fn too_few_is_reported_before_any_host_query() {
    // a block-carrying context would be queried during binding; the arity check comes first
    let mut tracer = RecordingTracer::new();
    let mut ctx = ObjectContext::with_block(proc_named("blk"));
    let spec = ArgSpec::parse("2&").unwrap();
    let result = rbshim::bind_args(&spec, &mut ctx, &[int(1)], &mut tracer);
    assert!(matches!(result, Err(ScanError::Arity { .. })));
    assert!(tracer.events().is_empty());
}

#[test]
fn bad_format_is_rejected() {
    assert_eq!(
        scan_err("1x", &[int(1)]),
        ScanError::InvalidFormat {
            format: "1x".to_owned()
        }
    );
}

#[test]
fn only_ten_slots_are_returned() {
    let args: Vec<Object> = (0..18).map(Object::Int).collect();
    let out = scan("91*9:&", &args);
    assert_eq!(out.len(), 10);
    assert_eq!(out.get(8), Some(&int(8)));
    assert_eq!(out.get(9), Some(&Object::Nil));
    assert_eq!(out.kind(9), Some(SlotKind::Optional));
    assert_eq!(out.argc(), 18);
}

#[test]
fn first_of_finds_slot_by_kind() {
    let out = scan("1*1", &[int(1), int(2), int(3)]);
    assert_eq!(out.first_of(SlotKind::Rest), Some(&array(&[2])));
    assert_eq!(out.first_of(SlotKind::Keywords), None);
}

#[test]
fn scan_macro_writes_requested_slots() {
    let mut ctx = ObjectContext::new();
    let mut leading = Object::Nil;
    let mut rest = Object::Nil;
    let argc = rbshim::scan_args!(
        &mut ctx,
        &[int(1), int(2), int(3)],
        "1*",
        Some(&mut leading),
        Some(&mut rest)
    )
    .unwrap();
    assert_eq!(argc, 3);
    assert_eq!(leading, int(1));
    assert_eq!(rest, array(&[2, 3]));
}

#[test]
fn recording_tracer_sees_every_step() {
    let mut ctx = ObjectContext::new();
    let mut scanner = Scanner::new(RecordingTracer::new());
    scanner.scan(&mut ctx, &[int(1), int(2), kwargs("k", 3)], "1*:").unwrap();
    assert_eq!(
        scanner.into_tracer().into_events(),
        vec![
            TraceEvent::Parse {
                format: "1*:".to_owned(),
                spec: ArgSpec::parse("1*:").unwrap(),
                cached: false,
            },
            TraceEvent::KeywordResolved {
                state: KeywordState::Pending
            },
            TraceEvent::Slot {
                index: 0,
                kind: SlotKind::Leading,
                stored: true
            },
            TraceEvent::Slot {
                index: 1,
                kind: SlotKind::Rest,
                stored: true
            },
            TraceEvent::Slot {
                index: 2,
                kind: SlotKind::Keywords,
                stored: true
            },
            TraceEvent::Finish { argc: 2 },
        ]
    );
}

#[test]
fn tracer_records_errors() {
    let mut scanner = Scanner::new(RecordingTracer::new());
    let err = scanner.scan(&mut ObjectContext::new(), &[], "?").unwrap_err();
    assert_eq!(scanner.tracer().events(), [TraceEvent::Error(err)]);
}

#[test]
fn cached_scanner_reuses_parsed_formats() {
    let mut scanner = Scanner::new(RecordingTracer::new()).with_cache(4);
    let mut ctx = ObjectContext::new();
    for _ in 0..3 {
        scanner.scan(&mut ctx, &[int(1)], "1").unwrap();
    }
    let cached: Vec<bool> = scanner
        .tracer()
        .events()
        .iter()
        .filter_map(|event| match event {
            TraceEvent::Parse { cached, .. } => Some(*cached),
            _ => None,
        })
        .collect();
    assert_eq!(cached, [false, true, true]);
    let cache = scanner.cache().unwrap();
    assert_eq!((cache.hits(), cache.misses()), (2, 1));
}

#[test]
fn scans_are_independent_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let args: Vec<Object> = (0..=i).map(Object::Int).collect();
                let out = scan_args(&mut ObjectContext::new(), &args, "*").unwrap();
                (out.argc(), out.into_values().into_iter().next())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let (argc, rest) = handle.join().unwrap();
        assert_eq!(argc, i + 1);
        let expected: Vec<i64> = (0..=i64::try_from(i).unwrap()).collect();
        assert_eq!(rest, Some(array(&expected)));
    }
}
