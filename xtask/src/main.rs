// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//!
//! Test driver for fsp-hob: runs the feature matrix the crate supports.
//!
use duct::cmd;
use std::env;
use std::process;

/// One cargo invocation of the test matrix.
struct Step {
    what: &'static str,
    args: &'static str,
}

/// The library has to build without std; serde and schemars are only
/// built and tested as add-ons of std.
const MATRIX: &[Step] = &[
    Step { what: "unit tests", args: "test --lib" },
    Step { what: "no_std build", args: "build --no-default-features" },
    Step { what: "serde build", args: "build --features serde" },
    Step { what: "schemars build", args: "build --features serde,schemars" },
    Step {
        what: "gpio_table demo",
        args: "build --features serde --example gpio_table",
    },
    Step {
        what: "configuration tests",
        args: "test --test * --features serde,schemars",
    },
];

fn main() {
    let matches = parse_args();
    match matches.subcommand() {
        Some(("test", m)) => {
            test(m.get_flag("release"), m.get_flag("locked"))
        }
        Some(("clippy", m)) => clippy(m.get_flag("locked")),
        _ => {
            println!("Unknown command");
            process::exit(1);
        }
    }
}

/// Parse program arguments and return the match structure.
fn parse_args() -> clap::ArgMatches {
    clap::Command::new("xtask")
        .version("0.1.0")
        .author("Oxide Computer Company")
        .about("fsp-hob test driver")
        .arg(clap::arg!(--locked "Build or test locked to Cargo.lock").global(true))
        .subcommand(
            clap::Command::new("test")
                .about("Run the test matrix")
                .arg(clap::arg!(--release "Test optimized version")),
        )
        .subcommand(
            clap::Command::new("clippy")
                .about("Run cargo clippy linter on every feature"),
        )
        .get_matches()
}

/// Runs every step of MATRIX, stopping at the first failure.
fn test(release: bool, with_locked: bool) {
    let release = release.then_some("--release").unwrap_or("");
    let locked = with_locked.then_some("--locked").unwrap_or("");
    for step in MATRIX {
        let args = format!("{} {locked} {release}", step.args);
        println!("xtask: {}", step.what);
        cmd(cargo(), args.split_whitespace()).run().expect(step.what);
    }
}

/// Runs the Clippy linter.
fn clippy(with_locked: bool) {
    let locked = with_locked.then_some("--locked").unwrap_or("");
    let args = format!("clippy {locked} --all-targets --features serde,schemars");
    cmd(cargo(), args.split_whitespace()).run().expect("clippy successful");
}

/// Returns the name of the cargo binary.
fn cargo() -> String {
    env::var("CARGO").unwrap_or_else(|_| "cargo".into())
}
