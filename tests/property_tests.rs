//! Property-based tests for the machines and their building blocks.
//!
//! These tests use proptest to check invariants across many randomly
//! generated action sequences.

use patternworks::core::{Guard, State, StateHistory, StateTransition};
use patternworks::feedback::Silent;
use patternworks::hotel::{FlatRate, HotelBooking, HotelStage};
use patternworks::money::Amount;
use patternworks::roles::{Campus, Role};
use patternworks::ticket::{TicketCommand, TicketMachine, TicketMachineBuilder, TicketStage};
use proptest::prelude::*;
use std::sync::Arc;

const STANDARD_STOCK: u32 = 4;
const STUDENT_STOCK: u32 = 2;

prop_compose! {
    fn arbitrary_stage()(variant in 0..5u8) -> TicketStage {
        match variant {
            0 => TicketStage::Idle,
            1 => TicketStage::WaitingForPayment,
            2 => TicketStage::PaymentReceived,
            3 => TicketStage::Dispensed,
            _ => TicketStage::Cancelled,
        }
    }
}

fn arbitrary_command() -> impl Strategy<Value = TicketCommand> {
    prop_oneof![
        prop::sample::select(vec!["Standard", "student", "Ghost"])
            .prop_map(|code| TicketCommand::Select(code.to_string())),
        (-20i64..150).prop_map(|units| TicketCommand::Insert(Amount::from_units(units))),
        Just(TicketCommand::Confirm),
        Just(TicketCommand::Cancel),
    ]
}

fn machine() -> TicketMachine<Silent> {
    TicketMachineBuilder::new()
        .ticket("Standard", "Standard", Amount::from_units(100))
        .ticket("Student", "Student", Amount::from_units(90))
        .stock("Standard", STANDARD_STOCK)
        .stock("Student", STUDENT_STOCK)
        .build(Silent)
        .unwrap()
}

/// What a single action may or may not touch.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    stage: TicketStage,
    balance: Amount,
    selection: Option<String>,
    standard: u32,
    student: u32,
    sold: usize,
}

impl Snapshot {
    fn of(machine: &TicketMachine<Silent>) -> Self {
        Self {
            stage: machine.stage(),
            balance: machine.balance(),
            selection: machine.selection().map(|ticket| ticket.code.clone()),
            standard: machine.remaining("Standard"),
            student: machine.remaining("Student"),
            sold: machine.sales().len(),
        }
    }
}

proptest! {
    #[test]
    fn guard_is_deterministic(units in -1_000i64..1_000) {
        let guard = Guard::new("must be positive", |a: &Amount| a.is_positive());
        let amount = Amount::from_units(units);
        prop_assert_eq!(guard.check(&amount), guard.check(&amount));
        prop_assert_eq!(guard.check(&amount), units > 0);
    }

    #[test]
    fn stage_name_is_stable(stage in arbitrary_stage()) {
        prop_assert_eq!(stage.name(), stage.name());
        prop_assert_eq!(stage.to_string(), stage.name());
    }

    #[test]
    fn history_path_length_is_transitions_plus_one(
        stages in prop::collection::vec(arbitrary_stage(), 1..12)
    ) {
        let mut history = StateHistory::new();
        for pair in stages.windows(2) {
            history = history.record(StateTransition {
                from: pair[0].clone(),
                to: pair[1].clone(),
                action: "step".into(),
                timestamp: chrono::Utc::now(),
            });
        }
        let expected = if stages.len() > 1 { stages.len() } else { 0 };
        prop_assert_eq!(history.get_path().len(), expected);
    }

    #[test]
    fn amounts_display_what_they_parse(cents in -10_000_000i64..10_000_000) {
        let amount = Amount::from_cents(cents);
        let back: Amount = amount.to_string().parse().unwrap();
        prop_assert_eq!(back, amount);
    }

    #[test]
    fn refused_actions_change_nothing_and_stock_only_moves_with_sales(
        commands in prop::collection::vec(arbitrary_command(), 0..40)
    ) {
        let mut machine = machine();
        for command in &commands {
            let before = Snapshot::of(&machine);
            let result = command.apply(&mut machine);
            let after = Snapshot::of(&machine);

            match result {
                Err(error) => {
                    prop_assert_eq!(after.balance, before.balance, "{:?} -> {}", command, error);
                    prop_assert_eq!(after.standard, before.standard);
                    prop_assert_eq!(after.student, before.student);
                    prop_assert_eq!(after.sold, before.sold);
                    // Finished sessions reroute through Idle, which clears the
                    // old selection before refusing the action.
                    let rerouted = matches!(
                        before.stage,
                        TicketStage::Dispensed | TicketStage::Cancelled
                    );
                    if rerouted {
                        prop_assert_eq!(after.stage, TicketStage::Idle);
                        prop_assert_eq!(after.selection, None);
                    } else {
                        prop_assert_eq!(after.stage, before.stage);
                        prop_assert_eq!(after.selection, before.selection);
                    }
                }
                Ok(()) => {
                    let settles = matches!(command, TicketCommand::Confirm | TicketCommand::Cancel);
                    prop_assert!(
                        after.balance >= before.balance || (settles && after.balance.is_zero()),
                        "{:?} took the balance from {} to {}",
                        command,
                        before.balance,
                        after.balance
                    );
                    if after.sold > before.sold {
                        prop_assert_eq!(command, &TicketCommand::Confirm);
                        prop_assert_eq!(after.sold, before.sold + 1);
                    }
                }
            }
            prop_assert!(!after.balance.is_negative());
        }

        let sold = |code: &str| machine.sales().iter().filter(|s| s.code == code).count() as u32;
        prop_assert_eq!(machine.remaining("Standard") + sold("Standard"), STANDARD_STOCK);
        prop_assert_eq!(machine.remaining("Student") + sold("Student"), STUDENT_STOCK);
    }

    #[test]
    fn dispensing_empties_the_balance(extra in 0i64..200) {
        let mut machine = machine();
        machine.select("Standard").unwrap();
        machine.insert_funds(Amount::from_units(100 + extra)).unwrap();
        machine.confirm().unwrap();

        prop_assert_eq!(machine.stage(), TicketStage::Dispensed);
        prop_assert_eq!(machine.balance(), Amount::ZERO);
        prop_assert_eq!(machine.sales()[0].change, Amount::from_units(extra));
        prop_assert_eq!(machine.remaining("Standard"), STANDARD_STOCK - 1);
    }

    #[test]
    fn rejected_coins_leave_the_machine_alone(units in -500i64..=0) {
        let mut machine = machine();
        machine.select("Standard").unwrap();
        machine.insert_funds(Amount::from_units(40)).unwrap();
        let transitions = machine.history().len();

        prop_assert!(machine.insert_funds(Amount::from_units(units)).is_err());
        prop_assert_eq!(machine.stage(), TicketStage::WaitingForPayment);
        prop_assert_eq!(machine.balance(), Amount::from_units(40));
        prop_assert_eq!(machine.history().len(), transitions);
    }

    #[test]
    fn underpaying_a_booking_changes_nothing(short in 1i64..3000) {
        let mut booking = HotelBooking::new(Arc::new(FlatRate(Amount::from_units(3000))), Silent);
        booking.select_room("101").unwrap();
        booking.confirm().unwrap();

        prop_assert!(booking.pay(Amount::from_units(3000 - short)).is_err());
        prop_assert_eq!(booking.stage(), HotelStage::Confirmed);
        prop_assert!(booking.pay(Amount::from_units(3000)).is_ok());
        prop_assert_eq!(booking.stage(), HotelStage::Paid);
    }

    #[test]
    fn progress_never_exceeds_one_hundred(progress in 0u32..10_000) {
        let mut campus = Campus::new();
        let admin = campus.register("Admin", "admin@x.test", Role::Administrator).unwrap();
        let teacher = campus.register("Tess", "tess@x.test", Role::Teacher).unwrap();
        let student = campus.register("Sam", "sam@x.test", Role::Student).unwrap();
        campus.create_category(&admin, "Math", "Numbers").unwrap();
        let course = campus.create_course(&teacher, "Algebra", "Basics", "Math").unwrap();
        campus.enroll(&student, &course).unwrap();

        let stored = campus.update_progress(&student, &course, progress).unwrap();
        prop_assert!(stored <= 100);
        prop_assert_eq!(u32::from(stored), progress.min(100));
    }
}
