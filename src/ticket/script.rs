//! Scripted ticket machine sessions.
//!
//! One command per line: `select <code>`, `insert <amount>`,
//! `confirm` (alias `dispense`) and `cancel`. Blank lines and lines
//! starting with `#` are skipped.

use super::error::TicketError;
use super::machine::TicketMachine;
use crate::feedback::Feedback;
use crate::money::{Amount, AmountError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketCommand {
    Select(String),
    Insert(Amount),
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' takes no argument")]
    UnexpectedArgument(&'static str),

    #[error("bad amount: {0}")]
    BadAmount(#[from] AmountError),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<ScriptError>,
    },
}

impl TicketCommand {
    /// Parse a single command line.
    pub fn parse(line: &str) -> Result<Self, ScriptError> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(ScriptError::Empty)?.to_lowercase();
        let argument = words.next();
        if words.next().is_some() {
            return Err(ScriptError::UnknownCommand(line.trim().to_string()));
        }

        match (verb.as_str(), argument) {
            ("select", Some(code)) => Ok(TicketCommand::Select(code.to_string())),
            ("select", None) => Err(ScriptError::MissingArgument("select")),
            ("insert", Some(amount)) => Ok(TicketCommand::Insert(amount.parse()?)),
            ("insert", None) => Err(ScriptError::MissingArgument("insert")),
            ("confirm" | "dispense", None) => Ok(TicketCommand::Confirm),
            ("confirm" | "dispense", Some(_)) => Err(ScriptError::UnexpectedArgument("confirm")),
            ("cancel", None) => Ok(TicketCommand::Cancel),
            ("cancel", Some(_)) => Err(ScriptError::UnexpectedArgument("cancel")),
            _ => Err(ScriptError::UnknownCommand(verb)),
        }
    }

    /// Forward this command to `machine`.
    pub fn apply<F: Feedback>(&self, machine: &mut TicketMachine<F>) -> Result<(), TicketError> {
        match self {
            TicketCommand::Select(code) => machine.select(code),
            TicketCommand::Insert(amount) => machine.insert_funds(*amount),
            TicketCommand::Confirm => machine.confirm(),
            TicketCommand::Cancel => machine.cancel(),
        }
    }
}

impl FromStr for TicketCommand {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TicketCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketCommand::Select(code) => write!(f, "select {code}"),
            TicketCommand::Insert(amount) => write!(f, "insert {}", amount.to_plain_string()),
            TicketCommand::Confirm => f.write_str("confirm"),
            TicketCommand::Cancel => f.write_str("cancel"),
        }
    }
}

/// Parse a whole script, skipping blank lines and `#` comments.
pub fn parse_script(text: &str) -> Result<Vec<TicketCommand>, ScriptError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(index, line)| {
            TicketCommand::parse(line).map_err(|source| ScriptError::AtLine {
                line: index + 1,
                source: Box::new(source),
            })
        })
        .collect()
}

/// The stock demo session: one exact purchase, one cancellation, one
/// purchase paid in two parts.
pub fn demo_script() -> Vec<TicketCommand> {
    vec![
        TicketCommand::Select("Standard".into()),
        TicketCommand::Insert(Amount::from_units(100)),
        TicketCommand::Confirm,
        TicketCommand::Select("Student".into()),
        TicketCommand::Insert(Amount::from_units(50)),
        TicketCommand::Cancel,
        TicketCommand::Select("Child".into()),
        TicketCommand::Insert(Amount::from_units(20)),
        TicketCommand::Insert(Amount::from_units(30)),
        TicketCommand::Confirm,
    ]
}

/// Run `commands` against `machine`, echoing each command and reporting
/// refusals through the machine's feedback. Returns the number of refused
/// commands.
pub fn run_script<F: Feedback>(machine: &mut TicketMachine<F>, commands: &[TicketCommand]) -> usize {
    let mut refused = 0;
    for command in commands {
        machine.feedback_mut().say(&format!("> {command}"));
        if let Err(error) = command.apply(machine) {
            refused += 1;
            machine.feedback_mut().say(&format!("Error: {error}"));
        }
    }
    refused
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Transcript;
    use crate::ticket::{TicketMachineBuilder, TicketStage};

    #[test]
    fn parses_each_command() {
        assert_eq!(
            TicketCommand::parse("select Standard"),
            Ok(TicketCommand::Select("Standard".into()))
        );
        assert_eq!(
            TicketCommand::parse("  INSERT 12.50 "),
            Ok(TicketCommand::Insert("12.5".parse().unwrap()))
        );
        assert_eq!(TicketCommand::parse("dispense"), Ok(TicketCommand::Confirm));
        assert_eq!(TicketCommand::parse("confirm"), Ok(TicketCommand::Confirm));
        assert_eq!(TicketCommand::parse("cancel"), Ok(TicketCommand::Cancel));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(TicketCommand::parse("   "), Err(ScriptError::Empty));
        assert_eq!(
            TicketCommand::parse("select"),
            Err(ScriptError::MissingArgument("select"))
        );
        assert!(matches!(
            TicketCommand::parse("insert ten"),
            Err(ScriptError::BadAmount(_))
        ));
        assert_eq!(
            TicketCommand::parse("refund"),
            Err(ScriptError::UnknownCommand("refund".into()))
        );
        assert_eq!(
            TicketCommand::parse("cancel now"),
            Err(ScriptError::UnexpectedArgument("cancel"))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for command in demo_script() {
            assert_eq!(TicketCommand::parse(&command.to_string()), Ok(command));
        }
    }

    #[test]
    fn script_skips_comments_and_reports_line_numbers() {
        let text = "# morning run\nselect Child\n\ninsert 50\nfly away\n";
        match parse_script(text) {
            Err(ScriptError::AtLine { line, .. }) => assert_eq!(line, 5),
            other => panic!("expected line error, got {other:?}"),
        }

        let ok = parse_script("# only\nselect Child\ninsert 50\nconfirm\n").unwrap();
        assert_eq!(ok.len(), 3);
    }

    #[test]
    fn demo_script_runs_cleanly() {
        let mut machine = TicketMachineBuilder::from_config(&Default::default())
            .build(Transcript::new())
            .unwrap();

        let refused = run_script(&mut machine, &demo_script());

        assert_eq!(refused, 0);
        assert_eq!(machine.stage(), TicketStage::Dispensed);
        assert_eq!(machine.sales().len(), 2);
        assert_eq!(machine.remaining("Standard"), 9);
        assert_eq!(machine.remaining("Student"), 5);
        assert_eq!(machine.remaining("Child"), 2);
        assert!(machine.feedback().contains("> select Standard"));
    }

    #[test]
    fn refusals_are_reported_and_counted() {
        let mut machine = TicketMachineBuilder::from_config(&Default::default())
            .build(Transcript::new())
            .unwrap();

        let commands = vec![TicketCommand::Confirm, TicketCommand::Select("Nope".into())];
        assert_eq!(run_script(&mut machine, &commands), 2);
        assert!(machine.feedback().contains("Error: no ticket with code 'Nope'"));
    }
}
