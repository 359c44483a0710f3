//! Bench command parser.
//!
//! Parses the line-oriented stand-in for the slider panel into `Command`s.
//!
//! # Supported syntax
//!
//! ```text
//! # comment line
//! t2 <value>          (load torque slider)
//! romega <value>      (series armature resistance slider)
//! rf <value>          (field resistance slider)
//! u <value>           (supply voltage slider)
//! sample              (record the current reading)
//! fit                 (fit a line to every run)
//! clear               (discard all runs)
//! show                (print operating point)
//! quit
//! ```
//!
//! Keywords are case-insensitive. `=` may separate a slider name from its
//! value (`rf = 190`). Anything after `#` is ignored.

use nom::branch::alt;
use nom::bytes::complete::tag_no_case;
use nom::character::complete::{char, space0, space1};
use nom::combinator::{all_consuming, map, value};
use nom::number::complete::double;
use nom::sequence::preceded;
use nom::IResult;
use nom::Parser;

use crate::error::{ArmatureError, Result};
use crate::ir::{Command, Parameter};

/// Parse a whole script, skipping blank and comment lines.
pub fn parse(input: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (line_num, raw_line) in input.lines().enumerate() {
        if let Some(cmd) = parse_line(raw_line).map_err(|e| with_line(line_num, e))? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

/// Parse a single line. Blank and comment-only lines yield `None`.
pub fn parse_line(raw_line: &str) -> Result<Option<Command>> {
    let line = strip_comment(raw_line).trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (_, cmd) = all_consuming(command)
        .parse(line)
        .map_err(|_| ArmatureError::Command(format!("unrecognized command: {}", line)))?;
    Ok(Some(cmd))
}

fn with_line(line_num: usize, err: ArmatureError) -> ArmatureError {
    match err {
        ArmatureError::Command(detail) => {
            ArmatureError::Command(format!("line {}: {}", line_num + 1, detail))
        }
        other => other,
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

fn command(input: &str) -> IResult<&str, Command> {
    alt((set_command, button)).parse(input)
}

/// Match a slider name. Longer names first so `romega` is not read as `r...`.
fn parameter(input: &str) -> IResult<&str, Parameter> {
    alt((
        value(Parameter::SeriesResistance, tag_no_case("romega")),
        value(Parameter::SeriesResistance, tag_no_case("r_omega")),
        value(Parameter::LoadTorque, tag_no_case("t2")),
        value(Parameter::FieldResistance, tag_no_case("rf")),
        value(Parameter::SupplyVoltage, tag_no_case("u")),
    ))
    .parse(input)
}

/// `<slider> <value>` or `<slider> = <value>`
fn set_command(input: &str) -> IResult<&str, Command> {
    let separator = alt((
        map((space0, char('='), space0), |_| ()),
        map(space1, |_| ()),
    ));
    map(
        (parameter, preceded(separator, double)),
        |(p, v)| Command::Set(p, v),
    )
    .parse(input)
}

fn button(input: &str) -> IResult<&str, Command> {
    alt((
        value(Command::Sample, tag_no_case("sample")),
        value(Command::Fit, tag_no_case("fit")),
        value(Command::Clear, tag_no_case("clear")),
        value(Command::Show, tag_no_case("show")),
        value(Command::Quit, tag_no_case("quit")),
        value(Command::Quit, tag_no_case("exit")),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_set_commands() {
        assert_eq!(one("t2 54.1"), Command::Set(Parameter::LoadTorque, 54.1));
        assert_eq!(one("romega 0.25"), Command::Set(Parameter::SeriesResistance, 0.25));
        assert_eq!(one("R_Omega 0.5"), Command::Set(Parameter::SeriesResistance, 0.5));
        assert_eq!(one("rf 190"), Command::Set(Parameter::FieldResistance, 190.0));
        assert_eq!(one("u 2.2e2"), Command::Set(Parameter::SupplyVoltage, 220.0));
    }

    #[test]
    fn test_set_with_equals() {
        assert_eq!(one("Rf = 200.5"), Command::Set(Parameter::FieldResistance, 200.5));
        assert_eq!(one("U=180"), Command::Set(Parameter::SupplyVoltage, 180.0));
    }

    #[test]
    fn test_negative_value_parses() {
        // Range handling is the controller's job.
        assert_eq!(one("t2 -5"), Command::Set(Parameter::LoadTorque, -5.0));
    }

    #[test]
    fn test_buttons() {
        assert_eq!(one("sample"), Command::Sample);
        assert_eq!(one("FIT"), Command::Fit);
        assert_eq!(one("Clear"), Command::Clear);
        assert_eq!(one("show"), Command::Show);
        assert_eq!(one("quit"), Command::Quit);
        assert_eq!(one("exit"), Command::Quit);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# only a comment").unwrap(), None);
        assert_eq!(one("sample   # first point"), Command::Sample);
        assert_eq!(one("  t2 60 # heavier"), Command::Set(Parameter::LoadTorque, 60.0));
    }

    #[test]
    fn test_missing_value_rejected() {
        assert!(matches!(parse_line("rf"), Err(ArmatureError::Command(_))));
        assert!(matches!(parse_line("rf ="), Err(ArmatureError::Command(_))));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        assert!(parse_line("rf 190 ohm").is_err());
        assert!(parse_line("samples").is_err());
        assert!(parse_line("fit now").is_err());
    }

    #[test]
    fn test_unknown_keyword_rejected() {
        let err = parse_line("torque 50").unwrap_err();
        assert!(err.to_string().contains("torque"), "{}", err);
    }

    #[test]
    fn test_script_reports_line_number() {
        let script = "\
# sweep
t2 40
sample
bogus
";
        let err = parse(script).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{}", err);
    }

    #[test]
    fn test_script() {
        let script = "\
t2 40
sample
t2 60
sample

u 200
sample
fit
";
        let cmds = parse(script).unwrap();
        assert_eq!(
            cmds,
            vec![
                Command::Set(Parameter::LoadTorque, 40.0),
                Command::Sample,
                Command::Set(Parameter::LoadTorque, 60.0),
                Command::Sample,
                Command::Set(Parameter::SupplyVoltage, 200.0),
                Command::Sample,
                Command::Fit,
            ]
        );
    }
}
