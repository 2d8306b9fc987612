//! A simple CLI tool for printing survey results as text.
//! Results are read from a JSON dump of `GET /api/surveys/<id>/results`, or
//! fetched from a running server.

use std::fs::File;
use std::io::BufReader;

use clap::{Arg, ArgAction, ArgMatches, Command};
use rocket::{serde::json::serde_json, tokio::runtime::Runtime};
use thiserror::Error;

use survey_backend::{
    client::{ClientError, SurveyClient},
    model::{id::Id, results::SurveyResults},
    render::{render_results, Report},
};

const PROGRAM_NAME: &str = "results-cli";

const ABOUT_TEXT: &str = "Print the aggregated results of a survey.

EXIT CODES:
     0: Results printed.
     1: Error.";

const RESULTS_PATH: &str = "RESULTS_PATH";
const SERVER: &str = "server";
const SURVEY: &str = "survey";
const TOKEN: &str = "token";

const RESULTS_PATH_HELP: &str = "The path to a JSON dump of a survey's results,\n\
as returned by `GET /api/surveys/<survey_id>/results`";

/// Construct the CLI configuration.
fn cli() -> Command {
    // Make the build dirty when the toml changes.
    include_str!("../Cargo.toml");

    clap::command!(PROGRAM_NAME)
        .about(ABOUT_TEXT)
        .arg(
            Arg::new(RESULTS_PATH)
                .help(RESULTS_PATH_HELP)
                .action(ArgAction::Set)
                .required_unless_present(SERVER)
                .conflicts_with(SERVER),
        )
        .arg(
            Arg::new(SERVER)
                .long(SERVER)
                .value_name("URL")
                .help("Fetch the results from the server at this base URL instead")
                .action(ArgAction::Set)
                .requires_all([SURVEY, TOKEN]),
        )
        .arg(
            Arg::new(SURVEY)
                .long(SURVEY)
                .value_name("ID")
                .help("The survey to fetch")
                .action(ArgAction::Set)
                .requires(SERVER),
        )
        .arg(
            Arg::new(TOKEN)
                .long(TOKEN)
                .value_name("JWT")
                .help("Bearer token to authenticate with")
                .env("SURVEY_TOKEN")
                .action(ArgAction::Set),
        )
}

/// Errors that this program may produce.
#[derive(Debug, Eq, PartialEq, Error)]
enum Error {
    /// IO error described by the inner message.
    #[error("IO error: {0}")]
    IO(String),
    /// Failed to decode the JSON dump.
    #[error("Invalid results: {0}")]
    Format(String),
    /// The server could not be asked, or refused.
    #[error("{0}")]
    Remote(String),
}

impl From<ClientError> for Error {
    fn from(err: ClientError) -> Self {
        Self::Remote(err.to_string())
    }
}

/// Load a results dump from a file.
fn load(path: &str) -> Result<SurveyResults, Error> {
    let file = File::open(path).map_err(|e| Error::IO(e.to_string()))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| Error::Format(e.to_string()))
}

/// Fetch results from a running server, along with the survey's questions so
/// that bars follow the declared option order.
fn fetch(server: &str, survey: &str, token: &str) -> Result<Report, Error> {
    let survey_id: Id = survey.parse().map_err(|e| Error::Format(format!("{e}")))?;
    let runtime = Runtime::new().map_err(|e| Error::IO(e.to_string()))?;
    runtime.block_on(async {
        let client = SurveyClient::new(server, token);
        let results = client.results(survey_id).await?;
        let questions = client
            .survey(survey_id)
            .await
            .map(|detail| detail.survey.questions)
            .ok();
        Ok(render_results(&results, questions.as_deref()))
    })
}

/// Produce the report the arguments ask for.
fn report(args: &ArgMatches) -> Result<Report, Error> {
    match args.get_one::<String>(SERVER) {
        Some(server) => {
            let survey = args.get_one::<String>(SURVEY).map_or("", String::as_str);
            let token = args.get_one::<String>(TOKEN).map_or("", String::as_str);
            fetch(server, survey, token)
        }
        None => {
            let path = args.get_one::<String>(RESULTS_PATH).map_or("", String::as_str);
            load(path).map(|results| render_results(&results, None))
        }
    }
}

/// Run the program, returning the exit code.
fn run(args: &ArgMatches) -> u8 {
    match report(args) {
        Ok(report) => {
            print!("{report}");
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn main() {
    let args = cli().get_matches();
    let exit_code = run(&args);
    std::process::exit(exit_code.into())
}
