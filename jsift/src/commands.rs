use crate::CLAP_STYLING;
use clap::{arg, command};

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("jsift")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("jsift")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Fetch a page, follow its script assets and report the endpoints they \
                reference.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The page to scan (https:// is assumed when no scheme is given)")
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of pages to scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-t --"threads" <NUM_WORKERS>)
                        .required(false)
                        .help("The number of scripts fetched concurrently.")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds (at least 1)")
                        .value_parser(clap::value_parser!(u64).range(1..))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"relay" <PREFIX>)
                        .required(false)
                        .help(
                            "Route every request through a relay; the encoded target URL is \
                        appended to this prefix (e.g. https://corsproxy.io/?url=)",
                        ),
                )
                .arg(
                    arg!(--"user-agent" <AGENT>)
                        .required(false)
                        .help("User-Agent header sent with every request"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the export to a file (default: print after the summary)"),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Export format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"grep" <KEYWORD>)
                        .required(false)
                        .help("Only keep endpoints containing this keyword (case-insensitive)"),
                )
                .arg(
                    arg!(--"exclude-ext" <EXT>)
                        .required(false)
                        .help("Additional extension to drop, e.g. php (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"exclude-domain" <DOMAIN>)
                        .required(false)
                        .help("Additional domain to drop (repeatable)")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-v --"verbose")
                        .required(false)
                        .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                        .action(clap::ArgAction::Count),
                ),
        )
}
