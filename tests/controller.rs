//! End-to-end behaviour of the controller against the mock oracle and
//! the in-memory ledger.

use superposition::{
    entropy::keccak, Address, Amount, BlockOracle, Controller, Event, Hash32, InMemoryLedger,
    Ledger, MockOracle, ObservationError, ProtocolConfig, ReboxError, SimulatedChain,
    SimulationConfig, Token,
};

const CONTROLLER: Address = Address::repeat(0xc0);
const DEPLOYER: Address = Address::repeat(0xde);
const ALICE: Address = Address::repeat(0xa1);
const KEEPER: Address = Address::repeat(0xee);
const DATA: &[u8] = b"round-trip";
const START: u64 = 5_000;

fn secret() -> Hash32 {
    Hash32::from_low_u64(0x0bad_cafe)
}

fn deploy(balance: Amount) -> Controller<MockOracle, InMemoryLedger> {
    let mut ledger = InMemoryLedger::new(CONTROLLER);
    ledger.credit(Token::Superposed, &ALICE, balance).unwrap();
    Controller::deploy(
        ProtocolConfig::default(),
        DEPLOYER,
        CONTROLLER,
        MockOracle::at(START),
        ledger,
    )
    .unwrap()
}

fn outcome_total(controller: &Controller<MockOracle, InMemoryLedger>, account: &Address) -> Amount {
    controller.ledger().balance_of(Token::OutcomeA, account)
        + controller.ledger().balance_of(Token::OutcomeB, account)
}

#[test]
fn test_round_trip_example() {
    let mut controller = deploy(1_000);
    controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();

    let delay = controller.config().reveal_delay;
    for offset in 0..=delay {
        controller.oracle_mut().advance_to(START + offset);
        assert!(matches!(
            controller.reveal(&ALICE, DATA, secret()),
            Err(ObservationError::TooEarly { .. })
        ));
    }

    controller.oracle_mut().advance_to(START + delay + 1);
    let resolution = controller.reveal(&ALICE, DATA, secret()).unwrap();

    assert!(
        (resolution.outcome_a, resolution.outcome_b) == (100, 0)
            || (resolution.outcome_a, resolution.outcome_b) == (0, 100)
    );
    assert_eq!(outcome_total(&controller, &ALICE), 100);
    assert_eq!(controller.ledger().balance_of(Token::Superposed, &ALICE), 900);
}

#[test]
fn test_expiry_example() {
    let mut controller = deploy(100);
    controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
    assert_eq!(controller.ledger().balance_of(Token::Superposed, &ALICE), 0);

    let window = controller.config().max_reveal_window;
    controller.oracle_mut().advance_to(START + window + 1);

    assert!(matches!(
        controller.reveal(&ALICE, DATA, secret()),
        Err(ObservationError::WindowClosed { .. })
    ));
    let cancellation = controller.cancel(&ALICE).unwrap();
    assert_eq!(cancellation.amount, 100);
    assert_eq!(controller.ledger().balance_of(Token::Superposed, &ALICE), 100);
    assert_eq!(outcome_total(&controller, &ALICE), 0);
}

#[test]
fn test_events_follow_lifecycle() {
    let mut controller = deploy(1_000);
    controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
    controller.oracle_mut().advance(6);
    controller.reveal(&ALICE, DATA, secret()).unwrap();

    let names: Vec<&str> = controller.events().iter().map(Event::name).collect();
    assert_eq!(
        names,
        vec!["pool_updated", "committed", "revealed", "pool_updated"]
    );

    match &controller.events()[1] {
        Event::Committed {
            account,
            amount,
            data_hash,
            ref_block,
            ..
        } => {
            assert_eq!(*account, ALICE);
            assert_eq!(*amount, 100);
            assert_eq!(*data_hash, keccak(DATA));
            assert_eq!(*ref_block, START);
        }
        other => panic!("unexpected event {:?}", other),
    }

    assert_eq!(controller.drain_events().len(), 4);
    assert!(controller.events().is_empty());
}

#[test]
fn test_failed_operations_emit_nothing() {
    let mut controller = deploy(1_000);
    let pool = controller.entropy_pool();

    assert!(controller.commit(&ALICE, 0, keccak(DATA), secret()).is_err());
    assert!(controller.reveal(&ALICE, DATA, secret()).is_err());
    assert!(controller.cancel(&ALICE).is_err());

    assert!(controller.events().is_empty());
    assert_eq!(controller.entropy_pool(), pool);
    assert_eq!(controller.stats().commits, 0);
}

#[test]
fn test_status_agrees_with_operations_at_every_block() {
    let config = ProtocolConfig::default();
    let last = START + config.max_reveal_window + 3;

    for at in START..=last {
        let mut controller = deploy(1_000);
        controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
        controller.oracle_mut().advance_to(at);

        let status = controller.status(&ALICE);
        assert_eq!(status.current_block, at);

        let mut reveal_probe = clone_state(&controller);
        assert_eq!(
            status.can_reveal,
            reveal_probe.reveal(&ALICE, DATA, secret()).is_ok(),
            "reveal disagreement at block {}",
            at
        );

        let mut force_probe = clone_state(&controller);
        assert_eq!(
            status.can_force_reveal,
            force_probe.force_reveal(&KEEPER, &ALICE, DATA, secret()).is_ok(),
            "force disagreement at block {}",
            at
        );

        let mut cancel_probe = clone_state(&controller);
        assert_eq!(
            status.can_cancel,
            cancel_probe.cancel(&ALICE).is_ok(),
            "cancel disagreement at block {}",
            at
        );

        assert_eq!(status.blocks_until_reveal == Some(0), at > START + config.reveal_delay);
        assert_eq!(
            status.blocks_until_force_reveal == Some(0),
            at > START + config.force_offset()
        );
        assert_eq!(status.blocks_until_expiry == Some(0), status.can_cancel);
    }
}

#[test]
fn test_status_reports_expired_source() {
    let mut controller = deploy(1_000);
    controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
    controller.oracle_mut().advance(30);
    assert!(controller.status(&ALICE).source_available);

    let source = START + controller.config().reveal_delay;
    controller.oracle_mut().expire(source);

    let status = controller.status(&ALICE);
    assert!(!status.source_available);
    assert!(!status.can_reveal);
    assert!(!status.can_force_reveal);
    assert!(!status.can_cancel);
    assert_eq!(
        controller.reveal(&ALICE, DATA, secret()),
        Err(ObservationError::SourceExpired(source))
    );

    // The escrow is recoverable once the window closes.
    let wait = controller.status(&ALICE).blocks_until_expiry.unwrap();
    controller.oracle_mut().advance(wait);
    assert!(controller.cancel(&ALICE).is_ok());
    assert_eq!(controller.ledger().balance_of(Token::Superposed, &ALICE), 1_000);
}

#[test]
fn test_status_without_pending() {
    let controller = deploy(1_000);
    let status = controller.status(&ALICE);
    assert_eq!(status.pending_amount, 0);
    assert_eq!(status.ref_block, None);
    assert!(!status.can_reveal && !status.can_force_reveal && !status.can_cancel);
    assert_eq!(status.blocks_until_reveal, None);
    assert!(!status.source_available);
}

#[test]
fn test_force_reveal_matches_self_reveal() {
    let mut revealing = deploy(1_000);
    let mut forcing = deploy(1_000);

    for controller in [&mut revealing, &mut forcing] {
        controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
        controller.oracle_mut().advance(120);
    }

    let a = revealing.reveal(&ALICE, DATA, secret()).unwrap();
    let b = forcing.force_reveal(&KEEPER, &ALICE, DATA, secret()).unwrap();

    assert_eq!((a.outcome_a, a.outcome_b), (b.outcome_a, b.outcome_b));
    assert_eq!(a.randomness, b.randomness);
    assert_eq!(revealing.entropy_pool(), forcing.entropy_pool());
    assert_eq!(outcome_total(&forcing, &KEEPER), 0);
    assert_eq!(forcing.stats().forced_reveals, 1);
}

#[test]
fn test_other_observations_change_the_pool() {
    let bob = Address::repeat(0xb0);

    let mut quiet = deploy(1_000);
    let mut busy = deploy(1_000);
    busy.ledger_mut().credit(Token::Superposed, &bob, 10).unwrap();

    for controller in [&mut quiet, &mut busy] {
        controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
    }
    busy.commit(&bob, 10, keccak(b"bob"), Hash32::from_low_u64(3)).unwrap();

    quiet.oracle_mut().advance(6);
    busy.oracle_mut().advance(6);
    let a = quiet.reveal(&ALICE, DATA, secret()).unwrap();
    let b = busy.reveal(&ALICE, DATA, secret()).unwrap();

    assert_ne!(a.randomness, b.randomness);
}

#[test]
fn test_block_context_feeds_randomness() {
    let mut baseline = deploy(1_000);
    let mut other_chain = deploy(1_000);
    let mut other_mix_in = deploy(1_000);

    for controller in [&mut baseline, &mut other_chain, &mut other_mix_in] {
        controller.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
        controller.oracle_mut().advance(10);
    }
    other_chain.oracle_mut().set_chain_id(137);
    other_mix_in.oracle_mut().set_mix_in(Hash32::from_low_u64(0xfeed));

    let base = baseline.reveal(&ALICE, DATA, secret()).unwrap().randomness;
    assert_ne!(other_chain.reveal(&ALICE, DATA, secret()).unwrap().randomness, base);
    assert_ne!(other_mix_in.reveal(&ALICE, DATA, secret()).unwrap().randomness, base);
}

#[test]
fn test_rebox_example_through_controller() {
    let mut controller = deploy(0);
    controller.ledger_mut().credit(Token::OutcomeA, &ALICE, 100).unwrap();
    controller.ledger_mut().credit(Token::OutcomeB, &ALICE, 100).unwrap();

    assert_eq!(controller.calculate_output(100), Ok((195, 5)));
    assert_eq!(controller.calculate_output(0), Ok((0, 0)));
    assert_eq!(controller.quote_rebox(0), Err(ReboxError::ZeroPairs));
    let quote = controller.quote_rebox(100).unwrap();
    assert_eq!((quote.output, quote.fee), (195, 5));

    assert_eq!(
        controller.rebox_with_min_output(&ALICE, 100, 200),
        Err(ReboxError::InsufficientOutput {
            output: 195,
            min_output: 200
        })
    );
    controller.rebox(&ALICE, 100).unwrap();

    assert_eq!(controller.ledger().balance_of(Token::Superposed, &ALICE), 195);
    assert_eq!(controller.ledger().total_supply(Token::OutcomeA), 0);
    assert_eq!(controller.ledger().total_supply(Token::OutcomeB), 0);
    assert_eq!(controller.stats().fee_burned, 5);
    assert!(matches!(
        controller.events().last(),
        Some(Event::Reboxed { pairs: 100, output: 195, fee: 5, .. })
    ));
    assert_eq!(controller.rebox_max(&ALICE, None), Err(ReboxError::NothingToRebox));
}

#[test]
fn test_observe_then_rebox_round_trip() {
    let mut controller = deploy(1_000);
    let mut data_index = 0u64;

    // Observe until both outcome balances are non-zero.
    while controller.ledger().balance_of(Token::OutcomeA, &ALICE) == 0
        || controller.ledger().balance_of(Token::OutcomeB, &ALICE) == 0
    {
        let data = data_index.to_be_bytes();
        data_index += 1;
        controller.commit(&ALICE, 10, keccak(&data), secret()).unwrap();
        controller.oracle_mut().advance(6);
        controller.reveal(&ALICE, &data, secret()).unwrap();
        assert!(data_index < 200, "outcome never varied");
    }

    let quote = controller.rebox_max(&ALICE, None).unwrap();
    assert_eq!(quote.output + quote.fee, 2 * quote.pairs);
}

#[test]
fn test_simulated_chain_end_to_end() {
    let sim = SimulationConfig::default();
    let chain = SimulatedChain::with_seed(&sim, 256, [3u8; 32]);
    let mut ledger = InMemoryLedger::new(CONTROLLER);
    ledger.credit(Token::Superposed, &ALICE, 500).unwrap();

    let mut controller =
        Controller::deploy(ProtocolConfig::default(), DEPLOYER, CONTROLLER, chain, ledger).unwrap();
    let start = controller.oracle().current_index();

    controller.commit(&ALICE, 500, keccak(DATA), secret()).unwrap();
    controller.oracle_mut().advance(6);
    assert_eq!(controller.oracle().current_index(), start + 6);

    let resolution = controller.reveal(&ALICE, DATA, secret()).unwrap();
    assert_eq!(resolution.outcome_a + resolution.outcome_b, 500);
    assert_eq!(controller.registry().pending_count(), 0);
}

/// Copies a controller's full state so an operation can be probed
/// without disturbing the original.
fn clone_state(
    controller: &Controller<MockOracle, InMemoryLedger>,
) -> Controller<MockOracle, InMemoryLedger> {
    let mut copy = Controller::deploy(
        controller.config().clone(),
        DEPLOYER,
        CONTROLLER,
        MockOracle::at(START),
        InMemoryLedger::new(CONTROLLER),
    )
    .unwrap();
    copy.ledger_mut()
        .credit(Token::Superposed, &ALICE, 1_000)
        .unwrap();
    copy.commit(&ALICE, 100, keccak(DATA), secret()).unwrap();
    copy.oracle_mut()
        .advance_to(controller.oracle().current_index());
    copy
}
