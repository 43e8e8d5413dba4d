// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("mimeogram")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exchange collections of files with chat interfaces")
        .subcommand_required(true)
        .arg(
            Arg::new("configfile")
                .long("configfile")
                .value_name("PATH")
                .global(true)
                .help("Configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Increase log verbosity"),
        )
        .subcommand(
            Command::new("create")
                .about("Bundle files and URLs into a mimeogram")
                .arg(
                    Arg::new("sources")
                        .num_args(0..)
                        .value_name("SOURCES")
                        .help("Files, directories, or HTTP(S) URLs"),
                )
                .arg(
                    Arg::new("message")
                        .short('m')
                        .long("message")
                        .help("Message to include as the first part"),
                )
                .arg(flag("edit-message", "Compose the message in the editor"))
                .arg(
                    Arg::new("recurse")
                        .short('r')
                        .long("recurse")
                        .action(ArgAction::SetTrue)
                        .help("Descend into subdirectories"),
                )
                .arg(flag("no-ignores", "Include files excluded by gitignore rules"))
                .arg(flag("strict", "Fail on the first source that cannot be acquired"))
                .arg(flag(
                    "deterministic-boundary",
                    "Derive the boundary from the content",
                ))
                .arg(flag("to-clipboard", "Copy the mimeogram to the clipboard"))
                .arg(flag("count-tokens", "Report an estimated token count")),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a mimeogram to the filesystem")
                .arg(Arg::new("file").value_name("FILE").help("Mimeogram file, or - for stdin"))
                .arg(flag("from-clipboard", "Read the mimeogram from the clipboard"))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_parser(["silent", "partitive"])
                        .help("Review mode"),
                )
                .arg(
                    Arg::new("base")
                        .long("base")
                        .value_name("DIR")
                        .help("Directory that relative locations are resolved against"),
                )
                .arg(flag("force", "Write protected destinations without asking")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");
    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("mimeogram.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
