//! Summarizes an RTX "show config" dump
//!
//! Usage: `cargo run --example summarize_config [path] [--json]`
//!
//! Without a path, a built-in sample dump is used.

use rtx_config::{ConfigError, ParsedConfig, parse, parse_file};

const SAMPLE: &str = "\
ip route default gateway 198.51.100.254
ip lan2 secure filter in 200020 200021 200022 200023 200024 200025 200026 2000
27 200099
pp select anonymous
 pp bind tunnel1
 pp enable anonymous
tunnel select 1
 tunnel encapsulation l2tpv3
 ipsec tunnel 101
  ipsec sa policy 101 1 esp aes-cbc sha-hmac
 l2tp always-on on
 tunnel enable 1
dns server select 1 192.0.2.53 edns
=on any .
";

fn print_summary(config: &ParsedConfig) {
    println!(
        "{} non-empty line(s), {} command(s), {} context(s)",
        config.non_empty_line_count,
        config.command_count,
        config.contexts.len()
    );

    println!("\nglobal:");
    for command in config.global_commands() {
        println!("  {:>4}  {}", command.line_number, command.text);
    }

    for (context, commands) in config.commands_by_context() {
        println!("\n{}:", context);
        for command in commands {
            println!("  {:>4}  {}", command.line_number, command.text);
        }
    }
}

fn main() -> Result<(), ConfigError> {
    let mut path = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            path = Some(arg);
        }
    }

    let config = match path {
        Some(path) => parse_file(path)?,
        None => parse(SAMPLE),
    };

    if json {
        match serde_json::to_string_pretty(&config) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize: {}", e),
        }
    } else {
        print_summary(&config);
    }
    Ok(())
}
