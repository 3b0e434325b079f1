//! Integration tests for the paginated aggregator
//!
//! # Test Coverage
//! - Output length and ordering across page sizes
//! - Round-trip count for a given page size
//! - Out-of-order page completion
//! - All-or-nothing failure on transport, encode and decode errors
//! - Heterogeneous return shapes within one batch
//! - Option forwarding, concurrency cap and reentrancy
//!
//! # Test Infrastructure
//! - `EchoAggregator` stands in for the RPC layer; no network access

mod common;

use std::sync::{atomic::Ordering, Arc};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{address, Address, U256},
};
use common::{as_u64, echo_calls, uint, EchoAggregator, FORK_BLOCK, MULTICALL, TOKEN};
use revest_multicall::{
    errors::{CodecError, TransportError},
    interface::ContractInterface,
    AggregateError, CallDescriptor, CallOptions, Multicall, DEFAULT_PAGE_SIZE,
};

fn values(results: &[revest_multicall::DecodedResult]) -> Vec<u64> {
    results
        .iter()
        .map(|result| as_u64(result.single().expect("single output")))
        .collect()
}

#[tokio::test]
async fn test_empty_batch_makes_no_request() -> anyhow::Result<()> {
    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);

    let results = multicall.aggregate(&[], 500, &CallOptions::default()).await?;
    assert!(results.is_empty());
    let results = multicall.aggregate(&[], 1, &CallOptions::default()).await?;
    assert!(results.is_empty());
    assert_eq!(multicall.caller().dispatch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_zero_page_size_fails_before_dispatch() {
    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    let calls = echo_calls(0..10);

    let err = multicall
        .aggregate(&calls, 0, &CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AggregateError::InvalidPageSize(0)));
    assert_eq!(multicall.caller().dispatch_count(), 0);

    let err = Multicall::new(EchoAggregator::new(), MULTICALL)
        .with_page_size(0)
        .aggregate_default(&calls)
        .await
        .unwrap_err();
    assert!(matches!(err, AggregateError::InvalidPageSize(0)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_1200_calls_take_three_pages() -> anyhow::Result<()> {
    let multicall = Multicall::new(EchoAggregator::new().with_reverse_delays(), MULTICALL);
    let calls = echo_calls(0..1200);

    let output = multicall
        .aggregate_with_blocks(&calls, 500, &CallOptions::default())
        .await?;

    assert_eq!(multicall.caller().dispatch_count(), 3);
    assert_eq!(multicall.caller().page_sizes(), vec![500, 500, 200]);
    assert_eq!(output.block_numbers, vec![FORK_BLOCK; 3]);
    assert_eq!(output.results.len(), 1200);
    assert_eq!(values(&output.results), (0..1200).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ordering_independent_of_page_size() -> anyhow::Result<()> {
    let calls = echo_calls((0..137).map(|i| i * 7 + 3));
    let expected = (0..137).map(|i| i * 7 + 3).collect::<Vec<_>>();

    for page_size in [1, 2, 10, 50, 136, 137, 138, DEFAULT_PAGE_SIZE] {
        let multicall = Multicall::new(EchoAggregator::new().with_reverse_delays(), MULTICALL);
        let results = multicall
            .aggregate(&calls, page_size, &CallOptions::default())
            .await?;
        assert_eq!(results.len(), calls.len(), "page size {page_size}");
        assert_eq!(values(&results), expected, "page size {page_size}");
        assert_eq!(
            multicall.caller().dispatch_count(),
            calls.len().div_ceil(page_size),
            "page size {page_size}"
        );
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_page_size_one_matches_single_page() -> anyhow::Result<()> {
    let calls = echo_calls([42, 7, 42, 0, 99, 1]);

    let per_call = Multicall::new(EchoAggregator::new(), MULTICALL);
    let one_page = Multicall::new(EchoAggregator::new(), MULTICALL);

    let a = per_call.aggregate(&calls, 1, &CallOptions::default()).await?;
    let b = one_page
        .aggregate(&calls, calls.len(), &CallOptions::default())
        .await?;

    assert_eq!(a, b);
    assert_eq!(per_call.caller().dispatch_count(), 6);
    assert_eq!(one_page.caller().dispatch_count(), 1);
    // pages of one are still sent concurrently
    assert!(per_call.caller().max_in_flight.load(Ordering::SeqCst) > 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_middle_page_fails_everything() {
    // 700 lands in the second of three pages
    let multicall = Multicall::new(EchoAggregator::failing_on(700), MULTICALL);
    let calls = echo_calls(0..1200);

    let err = multicall
        .aggregate(&calls, 500, &CallOptions::default())
        .await
        .unwrap_err();

    match err {
        AggregateError::Transport { page, source } => {
            assert_eq!(page, 1);
            assert!(matches!(source, TransportError::Rpc(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
    // every page was still awaited
    assert_eq!(multicall.caller().dispatch_count(), 3);
}

#[tokio::test]
async fn test_lowest_failing_page_is_reported() {
    let aggregator = EchoAggregator {
        fail_on: Some(5),
        ..EchoAggregator::new()
    };
    let multicall = Multicall::new(aggregator, MULTICALL);
    // value 5 appears in the second and third pages
    let calls = echo_calls([0, 1, 5, 2, 3, 5]);

    let err = multicall
        .aggregate(&calls, 2, &CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AggregateError::Transport { page: 1, .. }));
}

#[tokio::test]
async fn test_encode_failure_aborts_before_dispatch() {
    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    let mut calls = echo_calls(0..10);
    calls[4] = CallDescriptor::new(
        TOKEN,
        "function echo(uint256 x) view returns (uint256 x)",
        vec![uint(1), uint(2)],
    )
    .unwrap();

    let err = multicall
        .aggregate(&calls, 3, &CallOptions::default())
        .await
        .unwrap_err();

    match err {
        AggregateError::Encode {
            index,
            target,
            signature,
            source,
        } => {
            assert_eq!(index, 4);
            assert_eq!(target, TOKEN);
            assert_eq!(signature, "echo(uint256)");
            assert_eq!(source, CodecError::ArgumentCount { expected: 1, actual: 2 });
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(multicall.caller().dispatch_count(), 0);
}

#[tokio::test]
async fn test_decode_failure_fails_batch() {
    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    let mut calls = echo_calls(0..4);
    // no inputs, so the echo is empty and cannot decode as uint256
    let total_supply = "function totalSupply() view returns (uint256)";
    calls.push(CallDescriptor::new(TOKEN, total_supply, vec![]).unwrap());

    let err = multicall
        .aggregate(&calls, 2, &CallOptions::default())
        .await
        .unwrap_err();
    match err {
        AggregateError::Decode { index, signature, .. } => {
            assert_eq!(index, 4);
            assert_eq!(signature, "totalSupply()");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_short_page_is_rejected() {
    let aggregator = EchoAggregator {
        drop_last: true,
        ..EchoAggregator::new()
    };
    let multicall = Multicall::new(aggregator, MULTICALL);

    let err = multicall
        .aggregate(&echo_calls(0..5), 5, &CallOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AggregateError::PageLength { page: 0, expected: 5, actual: 4 }
    ));
}

#[tokio::test]
async fn test_heterogeneous_return_shapes() -> anyhow::Result<()> {
    let ve = ContractInterface::parse([
        "function locked(int128 amount, uint256 end) view returns (int128 amount, uint256 end)",
        "function token(address addr) view returns (address)",
        "function transfersEnabled(bool enabled) view returns (bool)",
        "function name(string value) view returns (string)",
    ])?;
    let owner = address!("0d0707963952f2fba59dd06f2b425ace40b492fe");
    let amount = "-1000".parse::<alloy::primitives::I256>()?;

    let calls = vec![
        ve.call(TOKEN, "name", vec![DynSolValue::String("inSpirit".into())])?,
        ve.call(
            TOKEN,
            "locked",
            vec![DynSolValue::Int(amount, 128), uint(1_700_000_000)],
        )?,
        ve.call(TOKEN, "token", vec![DynSolValue::Address(owner)])?,
        ve.call(TOKEN, "transfersEnabled", vec![DynSolValue::Bool(false)])?,
    ];

    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    let results = multicall.aggregate(&calls, 3, &CallOptions::default()).await?;

    assert_eq!(results.len(), 4);
    assert_eq!(results[0].single(), Some(&DynSolValue::String("inSpirit".into())));
    assert_eq!(results[1].get("amount"), Some(&DynSolValue::Int(amount, 128)));
    assert_eq!(as_u64(results[1].get("end").unwrap()), 1_700_000_000);
    assert_eq!(results[2].single(), Some(&DynSolValue::Address(owner)));
    assert_eq!(results[3].single(), Some(&DynSolValue::Bool(false)));
    Ok(())
}

#[tokio::test]
async fn test_same_function_different_args_do_not_leak() -> anyhow::Result<()> {
    let holder_a = address!("8cA573430Fd584065C080fF1d2eA1a8DfB259Ae8");
    let holder_b = address!("4d5362dd18ea4ba880c829b0152b7ba371741e59");
    let balance_of = "function balanceOf(address owner) view returns (address owner)";

    let calls = vec![
        CallDescriptor::new(TOKEN, balance_of, vec![DynSolValue::Address(holder_a)])?,
        CallDescriptor::new(TOKEN, balance_of, vec![DynSolValue::Address(holder_b)])?,
        CallDescriptor::new(TOKEN, balance_of, vec![DynSolValue::Address(holder_a)])?,
    ];

    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    let results = multicall.aggregate(&calls, 2, &CallOptions::default()).await?;

    assert_eq!(results[0].get("owner"), Some(&DynSolValue::Address(holder_a)));
    assert_eq!(results[1].get("owner"), Some(&DynSolValue::Address(holder_b)));
    assert_eq!(results[2].get("owner"), Some(&DynSolValue::Address(holder_a)));
    Ok(())
}

#[tokio::test]
async fn test_options_are_forwarded_to_every_page() -> anyhow::Result<()> {
    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    let options = CallOptions::default()
        .at_block(FORK_BLOCK)
        .with_gas(1_050_000)
        .with_from(Address::repeat_byte(0x11));

    multicall.aggregate(&echo_calls(0..9), 4, &options).await?;

    let seen = multicall.caller().options.lock().unwrap().clone();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|o| *o == options));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrency_cap_keeps_order() -> anyhow::Result<()> {
    let multicall = Multicall::new(EchoAggregator::new().with_reverse_delays(), MULTICALL)
        .with_max_concurrent_pages(2);
    let calls = echo_calls(0..40);

    let results = multicall.aggregate(&calls, 4, &CallOptions::default()).await?;

    assert_eq!(values(&results), (0..40).collect::<Vec<_>>());
    assert_eq!(multicall.caller().dispatch_count(), 10);
    assert!(multicall.caller().max_in_flight.load(Ordering::SeqCst) <= 2);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_batches_do_not_interfere() -> anyhow::Result<()> {
    let multicall = Arc::new(Multicall::new(
        Arc::new(EchoAggregator::new().with_reverse_delays()),
        MULTICALL,
    ));

    let first = echo_calls(0..300);
    let second = echo_calls((1000..1250).rev());
    let options = CallOptions::default();
    let (a, b) = tokio::join!(
        multicall.aggregate(&first, 64, &options),
        multicall.aggregate(&second, 100, &options),
    );

    assert_eq!(values(&a?), (0..300).collect::<Vec<_>>());
    assert_eq!(values(&b?), (1000..1250).rev().collect::<Vec<_>>());
    assert_eq!(multicall.caller().dispatch_count(), 5 + 3);
    Ok(())
}

#[tokio::test]
async fn test_default_page_size() -> anyhow::Result<()> {
    let multicall = Multicall::new(EchoAggregator::new(), MULTICALL);
    assert_eq!(multicall.page_size(), 500);
    assert_eq!(multicall.address(), MULTICALL);

    let results = multicall.aggregate_default(&echo_calls(0..1001)).await?;
    assert_eq!(results.len(), 1001);
    assert_eq!(multicall.caller().page_sizes(), vec![500, 500, 1]);
    assert_eq!(results[1000].single(), Some(&DynSolValue::Uint(U256::from(1000), 256)));
    Ok(())
}
