//! Handler outcomes.

/// What a stage handler asks its machine to do next.
///
/// Handlers never install their successor themselves. They return a step
/// and the owning machine commits it, records the transition and runs the
/// successor's entry hook.
///
/// `B` is usually a trait object such as `dyn TicketMachineState`.
pub enum Step<B: ?Sized> {
    /// Remain in the current stage.
    Stay,
    /// Enter `next`.
    Enter(Box<B>),
    /// Enter `next`, then hand the same action to it.
    Reroute(Box<B>),
}

impl<B: ?Sized> Step<B> {
    /// Whether the handler asked for a stage change.
    pub fn moves(&self) -> bool {
        !matches!(self, Step::Stay)
    }
}

impl<B: ?Sized> std::fmt::Debug for Step<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Stay => f.write_str("Stay"),
            Step::Enter(_) => f.write_str("Enter(..)"),
            Step::Reroute(_) => f.write_str("Reroute(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Lamp {
        fn lit(&self) -> bool;
    }

    struct On;
    impl Lamp for On {
        fn lit(&self) -> bool {
            true
        }
    }

    #[test]
    fn stay_does_not_move() {
        let step: Step<dyn Lamp> = Step::Stay;
        assert!(!step.moves());
        assert_eq!(format!("{step:?}"), "Stay");
    }

    #[test]
    fn enter_carries_successor() {
        let step: Step<dyn Lamp> = Step::Enter(Box::new(On));
        assert!(step.moves());
        match step {
            Step::Enter(next) => assert!(next.lit()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
