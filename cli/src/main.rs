#[macro_use]
extern crate clap;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate util;
extern crate wordcount;

use errors::*;

mod errors {
    error_chain! {
        links {
            WordCount(::wordcount::Error, ::wordcount::ErrorKind);
            Util(::util::errors::Error, ::util::errors::ErrorKind);
        }

        foreign_links {
            Clap(::clap::Error);
        }
    }
}

mod parser;
mod runner;

fn main() {
    if let Err(ref e) = util::init_logger() {
        eprintln!("Error: {}", e);
        ::std::process::exit(1);
    }

    let matches = parser::parse_command_line();

    match run(&matches) {
        Ok(true) => ::std::process::exit(0),
        Ok(false) => ::std::process::exit(1),
        Err(ref e) => {
            util::output_error(e);
            ::std::process::exit(1);
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<bool> {
    let options = runner::job_options(matches).chain_err(|| "Invalid arguments")?;
    runner::run(options)
}
