//! Integration tests for the XCM builder
//!
//! Tests the complete build workflow including:
//! - Asset registration and resolution per scope
//! - Hop transitions and nested program assembly
//! - Wire output of finalized programs

use serde_json::json;
use xcmc_builder::{BuilderError, XcmBuilder};
use xcmc_spec::{
    Asset, AssetFilter, AssetId, Instruction, Junction, Location, NetworkId, Program, TransferType,
    XcmError,
};

const WETH_MOONBEAM: &str = "0xab3f0245b83feb11d15aaffefd7ad465a59817ed";
const WETH_ETHEREUM: &str = "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2";
const BOB: &str = "0x1111111111111111111111111111111111111111";

fn moonbeam() -> Location {
    Location::new(
        0,
        vec![
            Junction::GlobalConsensus(NetworkId::Polkadot),
            Junction::Parachain(2004),
        ],
    )
    .unwrap()
}

fn weth_on_ethereum_from(parents: u8) -> Location {
    Location::new(
        parents,
        vec![
            Junction::GlobalConsensus(NetworkId::Ethereum),
            Junction::account_id20_hex(WETH_ETHEREUM).unwrap(),
        ],
    )
    .unwrap()
}

fn moonbeam_builder() -> XcmBuilder {
    XcmBuilder::using_context(moonbeam())
        .define_asset("GLMR", Location::here())
        .unwrap()
        .define_asset(
            "WETH_MOONBEAM",
            Location::new(
                0,
                vec![
                    Junction::PalletInstance(104),
                    Junction::account_id20_hex(WETH_MOONBEAM).unwrap(),
                ],
            )
            .unwrap(),
        )
        .unwrap()
        .define_asset("WETH_ETHEREUM", weth_on_ethereum_from(2))
        .unwrap()
}

// ============================================================================
// Basic Build Tests
// ============================================================================

#[test]
fn test_empty_program() {
    let program = XcmBuilder::using_context(moonbeam()).finalize().unwrap();
    assert!(program.is_empty());
    assert_eq!(program.to_json().unwrap(), "[]");
}

#[test]
fn test_withdraw_then_pay_fees() {
    let program = moonbeam_builder()
        .withdraw_asset("GLMR", 10)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap()
        .finalize()
        .unwrap();

    assert_eq!(program.len(), 2);
    assert_eq!(
        program[1],
        Instruction::PayFees {
            asset: AssetId(Location::here())
        }
    );
}

#[test]
fn test_registry_is_carried_into_program() {
    let program = moonbeam_builder().finalize().unwrap();
    assert_eq!(program.registry().len(), 3);
    assert_eq!(program.context(), &moonbeam());
}

// ============================================================================
// Multi-hop Tests
// ============================================================================

fn weth_to_ethereum() -> XcmBuilder {
    let bob = Location::from(Junction::account_id20_hex(BOB).unwrap());
    moonbeam_builder()
        .withdraw_asset("WETH_MOONBEAM", 5_000)
        .unwrap()
        .withdraw_asset("GLMR", 100)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap()
        .set_next_hop(Location::with_junction(1, Junction::Parachain(2000)).unwrap())
        .unwrap()
        .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
        .unwrap()
        // Asset Hub vocabulary
        .define_asset(
            "GLMR",
            Location::with_junction(1, Junction::Parachain(2004)).unwrap(),
        )
        .unwrap()
        .define_asset("WETH_ETHEREUM", weth_on_ethereum_from(2))
        .unwrap()
        .exchange_asset("GLMR", "WETH_ETHEREUM", true)
        .unwrap()
        .set_next_hop(
            Location::with_junction(2, Junction::GlobalConsensus(NetworkId::Ethereum)).unwrap(),
        )
        .unwrap()
        .initiate_transfer(TransferType::ReserveTransfer, AssetFilter::all(), true)
        .unwrap()
        .deposit_all(bob)
        .unwrap()
}

#[test]
fn test_weth_to_ethereum_structure() {
    let builder = weth_to_ethereum();
    assert_eq!(builder.depth(), 1);

    let program = builder.finalize().unwrap();
    assert_eq!(program.len(), 4);
    assert_eq!(program.depth(), 2);
    assert_eq!(program.len_recursive(), 7);

    let hub = program[3].nested().unwrap();
    assert_eq!(hub.len(), 2);
    assert_eq!(hub[0].name(), "exchangeAsset");
    let ethereum = hub[1].nested().unwrap();
    assert_eq!(ethereum.len(), 1);
    assert_eq!(ethereum[0].name(), "depositAsset");
    assert_eq!(
        ethereum.context(),
        &Location::with_junction(0, Junction::GlobalConsensus(NetworkId::Ethereum)).unwrap()
    );
}

#[test]
fn test_weth_to_ethereum_wire_format() {
    let program = weth_to_ethereum().finalize().unwrap();
    let value = serde_json::to_value(&program).unwrap();

    let transfer = &value[3]["initiateAssetsTransfer"];
    assert_eq!(
        transfer["dest"],
        json!({"parents": 1, "interior": {"X1": [{"Parachain": 2000}]}})
    );
    assert_eq!(transfer["assets"], json!([{"wild": "All"}]));
    assert_eq!(transfer["preserve_origin"], json!(false));
    assert_eq!(transfer["transfer_type"], json!("teleport"));

    let second = &transfer["xcm"][1]["initiateAssetsTransfer"];
    assert_eq!(second["preserve_origin"], json!(true));
    assert_eq!(second["transfer_type"], json!("reserve"));
    assert_eq!(
        second["xcm"][0]["depositAsset"]["beneficiary"],
        json!({"parents": 0, "interior": {"X1": [{"AccountId20": BOB}]}})
    );
}

#[test]
fn test_parent_names_not_visible_in_hop() {
    let nested = moonbeam_builder()
        .withdraw_asset("GLMR", 100)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap()
        .set_next_hop(Location::with_junction(1, Junction::Parachain(2000)).unwrap())
        .unwrap()
        .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
        .unwrap();

    for name in ["GLMR", "WETH_MOONBEAM", "WETH_ETHEREUM"] {
        assert_eq!(
            nested.withdraw_asset(name, 1).unwrap_err(),
            BuilderError::Spec(XcmError::UnknownAsset(name.to_string()))
        );
    }
}

#[test]
fn test_definite_selector_moves_only_selected() {
    let builder = moonbeam_builder()
        .withdraw_asset("WETH_MOONBEAM", 5_000)
        .unwrap()
        .withdraw_asset("GLMR", 100)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap();
    let selected = builder.select(&[("WETH_MOONBEAM", 5_000)]).unwrap();
    let nested = builder
        .set_next_hop(Location::with_junction(1, Junction::Parachain(2000)).unwrap())
        .unwrap()
        .initiate_transfer(TransferType::ReserveTransfer, selected, false)
        .unwrap();

    let after = nested.end_hop().unwrap();
    assert!(after.holds("GLMR"));
    assert!(!after.holds("WETH_MOONBEAM"));
}

#[test]
fn test_transact_in_nested_scope() {
    let program = weth_to_ethereum()
        .transact(vec![0x0a, 0x00])
        .unwrap()
        .finalize()
        .unwrap();
    let hub = program[3].nested().unwrap();
    assert_eq!(hub[2], Instruction::Transact { call: vec![0x0a, 0x00] });
}

// ============================================================================
// Finalize Tests
// ============================================================================

#[test]
fn test_finalize_reports_nested_violation() {
    // Paying fees inside a scope that inherited the origin requires held assets.
    let err = moonbeam_builder()
        .withdraw_asset("GLMR", 100)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap()
        .set_next_hop(Location::with_junction(1, Junction::Parachain(2000)).unwrap())
        .unwrap()
        .initiate_transfer(TransferType::Teleport, AssetFilter::all(), true)
        .unwrap()
        .set_next_hop(Location::with_junction(1, Junction::Parachain(1000)).unwrap())
        .unwrap()
        .initiate_transfer(TransferType::Teleport, AssetFilter::all(), true)
        .unwrap()
        .finalize()
        .unwrap_err();

    match err {
        BuilderError::Validation(e) => {
            assert_eq!(e.depth, 1);
            assert_eq!(e.path, vec![2]);
            assert_eq!(e.index, 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_finalize_is_deterministic() {
    let a = weth_to_ethereum().finalize().unwrap();
    let b = weth_to_ethereum().finalize().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
}

#[test]
fn test_max_amount_wire_roundtrip() {
    let program = moonbeam_builder()
        .withdraw_asset("GLMR", u128::MAX)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap()
        .finalize()
        .unwrap();
    let back = Program::from_json(&program.to_json().unwrap()).unwrap();
    assert_eq!(back.instructions(), program.instructions());
}

#[test]
fn test_definite_deposit_of_unheld_asset_rejected() {
    let builder = moonbeam_builder()
        .withdraw_asset("GLMR", 10)
        .unwrap()
        .pay_fees_with("GLMR")
        .unwrap();
    let weth = builder.resolve("WETH_MOONBEAM").unwrap();
    let bob = Location::from(Junction::account_id20_hex(BOB).unwrap());

    let err = builder
        .deposit_asset(AssetFilter::Definite(vec![Asset::new(weth, 5)]), bob)
        .unwrap_err();
    assert_eq!(err, BuilderError::AssetNotHeld("WETH_MOONBEAM".to_string()));
    assert!(err.is_local());
}
