//! # RTX Config Parser
//!
//! Turns the textual configuration dump of an RTX router ("show config")
//! into an ordered, context-tagged command stream that resource extractors
//! can filter without tracking line context themselves.
//!
//! ## Overview
//!
//! Parsing happens in two stages:
//!
//! 1. **Reassembly**: the router's terminal wraps long lines at a fixed
//!    column. Wrapped `key=value` parameters and wrapped filter ID lists are
//!    joined back into single logical lines (see [`reassembler`]).
//! 2. **Context tracking**: every line is classified by the scope it belongs
//!    to: global, `tunnel select N`, `pp select N|anonymous`, or an
//!    `ipsec tunnel N` nested inside a tunnel (see [`parser`]).
//!
//! The result is a [`ParsedConfig`] with one [`Command`] per logical line and
//! the distinct [`Context`]s in first-seen order.
//!
//! ## Basic Usage
//!
//! ```rust
//! use rtx_config::{Context, parse};
//!
//! let dump = "\
//! ip route default gateway 192.0.2.254
//! tunnel select 1
//!  tunnel encapsulation l2tpv3
//!  ipsec tunnel 101
//!   ipsec sa policy 101 1 esp aes-cbc sha-hmac
//!  tunnel enable 1
//! dhcp service server
//! ";
//!
//! let config = parse(dump);
//! assert_eq!(config.contexts.len(), 2);
//!
//! let tunnel: Vec<&str> = config
//!     .commands_in_context(&Context::tunnel(1))
//!     .iter()
//!     .map(|c| c.text.as_str())
//!     .collect();
//! assert_eq!(
//!     tunnel,
//!     vec!["tunnel select 1", "tunnel encapsulation l2tpv3", "tunnel enable 1"]
//! );
//! assert_eq!(config.global_commands().len(), 2);
//! ```
//!
//! ## Feeding Extractors
//!
//! Extractors narrow the model to the lines they understand:
//!
//! ```rust
//! use rtx_config::parse;
//!
//! let config = parse("ip route default gateway 192.0.2.254\nsshd service on\n");
//! let routes = config.global_section(&["ip route "]);
//! assert_eq!(routes.as_deref(), Some("ip route default gateway 192.0.2.254"));
//! ```
//!
//! ## Wrapped Lines
//!
//! ```rust
//! use rtx_config::reassemble;
//!
//! // Continuation without indentation: one number was split
//! assert_eq!(
//!     reassemble("ip lan2 secure filter in 20001\n0 20002"),
//!     "ip lan2 secure filter in 200010 20002"
//! );
//! // Indented continuation: the list was split between numbers
//! assert_eq!(
//!     reassemble("ip lan2 secure filter in 20001\n 20002"),
//!     "ip lan2 secure filter in 20001 20002"
//! );
//! ```
//!
//! ## Error Handling
//!
//! [`parse`] never fails. Reading from files or readers, and enforcing
//! [`ParserConfig::max_input_bytes`], report [`ConfigError`]:
//!
//! ```rust
//! use rtx_config::{ConfigError, ConfigParser, ParserConfig};
//!
//! let parser = ConfigParser::with_config(ParserConfig::new().with_max_input_bytes(4));
//! match parser.try_parse("tunnel select 1") {
//!     Err(ConfigError::InputTooLarge { size, limit }) => assert!(size > limit),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```
//!
//! ## Logging
//!
//! Context transitions and wrap repairs are reported through `tracing` at
//! `trace` level, with a per-parse summary at `debug`. The crate installs no
//! subscriber.

pub mod context;
pub mod error;
pub mod model;
pub mod parser;
pub mod reassembler;


pub use context::{
    Context, ContextKind, belongs_to_parent_tunnel, detect_context_open, is_context_exit,
    is_contextual,
};
pub use error::ConfigError;
pub use model::{Command, ParsedConfig};
pub use parser::{ConfigParser, ContextTracker, ParserConfig};
pub use reassembler::reassemble;

use std::io::Read;
use std::path::Path;

/// Parses a dump with the default configuration
pub fn parse(raw: &str) -> ParsedConfig {
    ConfigParser::new().parse(raw)
}

/// Reads a dump from `reader` and parses it with the default configuration.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn parse_reader<R: Read>(reader: R) -> Result<ParsedConfig, ConfigError> {
    parse_reader_with_config(reader, ParserConfig::default())
}

/// Reads a dump from `reader` and parses it with `config`
pub fn parse_reader_with_config<R: Read>(
    mut reader: R,
    config: ParserConfig,
) -> Result<ParsedConfig, ConfigError> {
    let mut bytes = Vec::new();
    match config.max_input_bytes {
        Some(limit) => {
            // One byte past the limit is enough to know it was exceeded
            let read = reader
                .by_ref()
                .take((limit as u64).saturating_add(1))
                .read_to_end(&mut bytes)?;
            config.check_input_size(read)?;
        }
        None => {
            reader.read_to_end(&mut bytes)?;
        }
    }
    let text = String::from_utf8_lossy(&bytes);
    Ok(ConfigParser::with_config(config).parse(&text))
}

/// Reads and parses the dump stored at `path`
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedConfig, ConfigError> {
    let file = std::fs::File::open(path)?;
    parse_reader(std::io::BufReader::new(file))
}
