use clap::{App, Arg, ArgMatches};

pub fn parse_command_line<'a>() -> ArgMatches<'a> {
    App::new("wordcount")
        .version(crate_version!())
        .author("Wordcount Authors")
        .about("Count the words of a text file and write the totals to a fresh output directory")
        .arg(
            Arg::with_name("base")
                .long("base")
                .short("b")
                .help("Base directory from which the default input and output paths are derived")
                .takes_value(true)
                .default_value(".")
                .required(false),
        )
        .arg(
            Arg::with_name("input")
                .long("input")
                .short("i")
                .help("Input file, defaults to <base>/input.txt")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("output")
                .long("output")
                .short("o")
                .help("Directory in which the output directory of the run is created, defaults to <base>/output")
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::with_name("reducers")
                .long("reducers")
                .short("r")
                .help("Number of reduce tasks, and so of output parts")
                .takes_value(true)
                .default_value("1")
                .required(false),
        )
        .arg(
            Arg::with_name("workers")
                .long("workers")
                .short("w")
                .help("Number of threads running map and reduce tasks")
                .takes_value(true)
                .default_value("4")
                .required(false),
        )
        .arg(
            Arg::with_name("split_size")
                .long("split-size")
                .short("s")
                .help("Target size of an input split in bytes")
                .takes_value(true)
                .default_value("64000000")
                .required(false),
        )
        .arg(
            Arg::with_name("no_combine")
                .long("no-combine")
                .help("Disable the combine stage")
                .required(false),
        )
        .get_matches()
}
