#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use std::path::PathBuf;

pub const USAGE: &str = "usage: railway [--config PATH] <orders|scores|parallel|batch|all>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Orders,
    Scores,
    Parallel,
    Batch,
    All,
}

impl Scenario {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "orders" => Some(Self::Orders),
            "scores" => Some(Self::Scores),
            "parallel" => Some(Self::Parallel),
            "batch" => Some(Self::Batch),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    ShowHelp,
    Run {
        config: Option<PathBuf>,
        scenario: Scenario,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("Missing required argument: {arg}")]
    MissingRequiredArg { arg: String },
    #[error("Unknown scenario: {name}")]
    UnknownScenario { name: String },
    #[error("Unknown flag: {flag}")]
    UnknownFlag { flag: String },
    #[error("Unexpected argument: {arg}")]
    UnexpectedArgument { arg: String },
}

/// Parses the arguments that follow the program name.
pub fn parse_cli_args(args: &[String]) -> Result<CliAction, CliError> {
    let mut config = None;
    let mut scenario = None;
    let mut rest = args.iter();

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(CliAction::ShowHelp),
            "-c" | "--config" => {
                let path = rest.next().ok_or_else(|| CliError::MissingRequiredArg {
                    arg: "--config".to_string(),
                })?;
                config = Some(PathBuf::from(path));
            }
            flag if flag.starts_with('-') => {
                return Err(CliError::UnknownFlag {
                    flag: flag.to_string(),
                })
            }
            name if scenario.is_some() => {
                return Err(CliError::UnexpectedArgument {
                    arg: name.to_string(),
                })
            }
            name => {
                scenario = Some(Scenario::parse(name).ok_or_else(|| {
                    CliError::UnknownScenario {
                        name: name.to_string(),
                    }
                })?);
            }
        }
    }

    scenario
        .map(|scenario| CliAction::Run { config, scenario })
        .ok_or_else(|| CliError::MissingRequiredArg {
            arg: "scenario".to_string(),
        })
}
