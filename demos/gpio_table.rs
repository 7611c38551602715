//! Reads a YAML table of pad configurations (pad number to GpioConfig) and
//! prints the GPIO_CONFIG every pad encodes to.

use fsp_hob::{GpioConfig, GpioPad};
use std::collections::BTreeMap;
use std::io::Read;

/// Parse program arguments and return the match structure.
fn parse_args() -> clap::ArgMatches {
    clap::Command::new("gpio_table")
        .about("Encodes a YAML pad table into GPIO_CONFIG words")
        .arg(clap::arg!([FILE] "Pad table (standard input if missing)"))
        .get_matches()
}

fn read_input(path: Option<&String>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = parse_args();
    let input = read_input(matches.get_one::<String>("FILE"))?;
    let table: BTreeMap<GpioPad, GpioConfig> = serde_yaml::from_str(&input)?;
    for (pad, config) in &table {
        println!(
            "{:#010x}: {:#018x} {:02x?}",
            pad,
            config.to_word(),
            config.to_bytes()
        );
    }
    Ok(())
}
