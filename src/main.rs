use anyhow::{Context, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use env_logger::Env;
use folio::build::{build_site, clean, BuildOptions};
use folio::config::Config;
use log::error;
use std::path::{Path, PathBuf};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let output = Arg::with_name("output")
        .long("output")
        .short("o")
        .takes_value(true)
        .value_name("DIR")
        .help("The directory to write the site into [default: docs under the project]");

    let matches = App::new("folio")
        .about("Builds a static site from a tree of markdown documents")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .short("p")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("A directory inside the project [default: .]"),
                )
                .arg(output.clone())
                .arg(
                    Arg::with_name("dev")
                        .long("dev")
                        .help("Serves links from the development path"),
                ),
        )
        .subcommand(
            SubCommand::with_name("clean")
                .about("Removes the generated site")
                .arg(output),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("clean", Some(matches)) => clean_site(matches),
        _ => Ok(()),
    };
    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn build(matches: &ArgMatches) -> Result<()> {
    let project = Path::new(matches.value_of("project").unwrap_or("."));
    let config = Config::from_directory(project)?;
    let options = BuildOptions {
        output_directory: match matches.value_of("output") {
            Some(dir) => absolute(dir)?,
            None => config.default_output_directory(),
        },
        dev: matches.is_present("dev"),
    };
    build_site(&config, &options).context("Building site")
}

fn clean_site(matches: &ArgMatches) -> Result<()> {
    let output_directory = match matches.value_of("output") {
        Some(dir) => absolute(dir)?,
        None => Config::from_directory(Path::new("."))?.default_output_directory(),
    };
    clean(&output_directory).context("Cleaning site")
}

// Makes `dir` absolute so it compares equal to the paths the content walk
// produces.
fn absolute(dir: &str) -> Result<PathBuf> {
    let dir = Path::new(dir);
    match dir.is_absolute() {
        true => Ok(dir.to_owned()),
        false => Ok(std::env::current_dir()
            .context("Resolving the current directory")?
            .join(dir)),
    }
}
