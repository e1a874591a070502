//! Configuration contexts and the keyword tables that classify lines
//!
//! RTX configuration is a flat list of keyword-prefixed commands. A few
//! `select`-style commands open a scope that later lines belong to. This
//! module holds the context types and the literal prefix tables used to
//! decide when a scope opens, closes, or is left implicitly.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Kind of configuration scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKind {
    /// Top level, outside any selected scope
    #[serde(rename = "global")]
    Global,
    /// `tunnel select N`
    #[serde(rename = "tunnel")]
    Tunnel,
    /// `pp select N` or `pp select anonymous`
    #[serde(rename = "pp")]
    PointToPoint,
    /// `ipsec tunnel N`, nested inside a tunnel
    #[serde(rename = "ipsec-tunnel")]
    NestedIPsecTunnel,
}

impl ContextKind {
    /// Short name used in logs and textual identities
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextKind::Global => "global",
            ContextKind::Tunnel => "tunnel",
            ContextKind::PointToPoint => "pp",
            ContextKind::NestedIPsecTunnel => "ipsec-tunnel",
        }
    }

    /// Returns true for kinds that start a fresh top-level scope
    pub fn is_top_level(&self) -> bool {
        matches!(self, ContextKind::Tunnel | ContextKind::PointToPoint)
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "global" => Ok(ContextKind::Global),
            "tunnel" => Ok(ContextKind::Tunnel),
            "pp" => Ok(ContextKind::PointToPoint),
            "ipsec-tunnel" => Ok(ContextKind::NestedIPsecTunnel),
            _ => Err(ConfigError::invalid_context(
                s,
                "expected one of global, tunnel, pp, ipsec-tunnel",
            )),
        }
    }
}

/// One configuration scope.
///
/// Identity is `(kind, name)` when a name is set and `(kind, id)`
/// otherwise, so `pp select anonymous` never collides with `pp select 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub kind: ContextKind,
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Context {
    /// Creates a numbered context
    pub fn numbered(kind: ContextKind, id: u32) -> Self {
        Self {
            kind,
            id,
            name: None,
        }
    }

    /// Creates a named context; the numeric id is zero
    pub fn named(kind: ContextKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            id: 0,
            name: Some(name.into()),
        }
    }

    pub fn tunnel(id: u32) -> Self {
        Self::numbered(ContextKind::Tunnel, id)
    }

    pub fn pp(id: u32) -> Self {
        Self::numbered(ContextKind::PointToPoint, id)
    }

    pub fn pp_anonymous() -> Self {
        Self::named(ContextKind::PointToPoint, ANONYMOUS)
    }

    pub fn ipsec_tunnel(id: u32) -> Self {
        Self::numbered(ContextKind::NestedIPsecTunnel, id)
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.id == other.id,
            _ => false,
        }
    }
}

impl Eq for Context {}

impl Hash for Context {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        match &self.name {
            Some(name) => {
                1u8.hash(state);
                name.hash(state);
            }
            None => {
                0u8.hash(state);
                self.id.hash(state);
            }
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{}", self.kind, name),
            None => write!(f, "{}/{}", self.kind, self.id),
        }
    }
}

impl FromStr for Context {
    type Err = ConfigError;

    /// Parses `<kind>/<id>` or `<kind>/<name>`, e.g. `tunnel/1`,
    /// `pp/anonymous`, `ipsec-tunnel/101`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, selector) = s
            .split_once('/')
            .ok_or_else(|| ConfigError::invalid_context(s, "expected <kind>/<id or name>"))?;
        let kind: ContextKind = kind.parse().map_err(|_| {
            ConfigError::invalid_context(s, format!("unknown context kind '{}'", kind))
        })?;
        if selector.is_empty() {
            return Err(ConfigError::invalid_context(s, "missing id or name"));
        }
        if selector.bytes().all(|b| b.is_ascii_digit()) {
            let id = selector
                .parse()
                .map_err(|_| ConfigError::invalid_context(s, "numeric id out of range"))?;
            Ok(Context::numbered(kind, id))
        } else {
            Ok(Context::named(kind, selector))
        }
    }
}

const ANONYMOUS: &str = "anonymous";

/// A `select`-style line that opens a scope: two keywords plus one argument
struct ContextOpener {
    keywords: [&'static str; 2],
    kind: ContextKind,
    /// Literal arguments accepted in place of a number
    names: &'static [&'static str],
}

const CONTEXT_OPENERS: &[ContextOpener] = &[
    ContextOpener {
        keywords: ["tunnel", "select"],
        kind: ContextKind::Tunnel,
        names: &[],
    },
    ContextOpener {
        keywords: ["pp", "select"],
        kind: ContextKind::PointToPoint,
        names: &[ANONYMOUS],
    },
    ContextOpener {
        keywords: ["ipsec", "tunnel"],
        kind: ContextKind::NestedIPsecTunnel,
        names: &[],
    },
];

/// `<keyword> <action> <anything>` lines that close the current scope
const CONTEXT_EXITS: &[[&str; 2]] = &[
    ["tunnel", "enable"],
    ["tunnel", "disable"],
    ["pp", "enable"],
    ["pp", "disable"],
];

const TUNNEL_PREFIXES: &[&str] = &["tunnel ", "ipsec ", "l2tp ", "description "];
const PP_PREFIXES: &[&str] = &["pp ", "pppoe ", "ppp ", "ip pp ", "description "];
const IPSEC_TUNNEL_PREFIXES: &[&str] = &["ipsec "];

/// Lines inside a nested IPsec scope that belong to the enclosing tunnel
const PARENT_TUNNEL_PREFIXES: &[&str] = &[
    "l2tp ",
    "tunnel endpoint",
    "tunnel enable",
    "tunnel disable",
    "ip tunnel ",
];

/// Returns the context a trimmed line opens, if any.
///
/// Only the whole-line forms `tunnel select <N>`, `pp select anonymous`,
/// `pp select <N>` and `ipsec tunnel <N>` qualify.
pub fn detect_context_open(trimmed_line: &str) -> Option<Context> {
    let mut words = trimmed_line.split_whitespace();
    let first = words.next()?;
    let second = words.next()?;
    let argument = words.next()?;
    if words.next().is_some() {
        return None;
    }

    let opener = CONTEXT_OPENERS
        .iter()
        .find(|o| o.keywords == [first, second])?;

    if let Some(name) = opener.names.iter().find(|n| **n == argument) {
        return Some(Context::named(opener.kind, *name));
    }
    if argument.bytes().all(|b| b.is_ascii_digit()) {
        return argument
            .parse()
            .ok()
            .map(|id| Context::numbered(opener.kind, id));
    }
    None
}

/// Returns true for `tunnel|pp enable|disable <arg>` lines.
///
/// The argument is not compared against the open context's id.
pub fn is_context_exit(trimmed_line: &str) -> bool {
    let mut words = trimmed_line.split_whitespace();
    let (Some(first), Some(second), Some(_)) = (words.next(), words.next(), words.next()) else {
        return false;
    };
    CONTEXT_EXITS.iter().any(|exit| *exit == [first, second])
}

/// Returns true if a zero-indent line is known to belong to `context`
pub fn is_contextual(trimmed_line: &str, context: &Context) -> bool {
    contextual_prefixes(context.kind)
        .iter()
        .any(|prefix| trimmed_line.starts_with(prefix))
}

/// Returns true if a line seen inside `ipsec tunnel N` belongs to the
/// surrounding `tunnel select`
pub fn belongs_to_parent_tunnel(trimmed_line: &str) -> bool {
    PARENT_TUNNEL_PREFIXES
        .iter()
        .any(|prefix| trimmed_line.starts_with(prefix))
}

fn contextual_prefixes(kind: ContextKind) -> &'static [&'static str] {
    match kind {
        ContextKind::Tunnel => TUNNEL_PREFIXES,
        ContextKind::PointToPoint => PP_PREFIXES,
        ContextKind::NestedIPsecTunnel => IPSEC_TUNNEL_PREFIXES,
        ContextKind::Global => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_detect_tunnel_select() {
        assert_eq!(detect_context_open("tunnel select 1"), Some(Context::tunnel(1)));
        assert_eq!(
            detect_context_open("tunnel   select\t12"),
            Some(Context::tunnel(12))
        );
    }

    #[test]
    fn test_detect_pp_select() {
        assert_eq!(detect_context_open("pp select 3"), Some(Context::pp(3)));

        let anonymous = detect_context_open("pp select anonymous").unwrap();
        assert_eq!(anonymous.kind, ContextKind::PointToPoint);
        assert_eq!(anonymous.name.as_deref(), Some("anonymous"));
        assert_eq!(anonymous.id, 0);
    }

    #[test]
    fn test_detect_ipsec_tunnel() {
        assert_eq!(
            detect_context_open("ipsec tunnel 101"),
            Some(Context::ipsec_tunnel(101))
        );
    }

    #[test]
    fn test_non_opening_lines() {
        for line in [
            "tunnel select none",
            "tunnel select 1 extra",
            "tunnel select",
            "ipsec tunnel outer-df off",
            "pp select other",
            "tunnel encapsulation ipsec",
            "ip route default gateway pp 1",
            "tunnel select 99999999999",
            "",
        ] {
            assert_eq!(detect_context_open(line), None, "line: {:?}", line);
        }
    }

    #[test]
    fn test_context_exit_lines() {
        assert!(is_context_exit("tunnel enable 1"));
        assert!(is_context_exit("tunnel disable 2"));
        assert!(is_context_exit("pp enable anonymous"));
        assert!(is_context_exit("pp disable 1"));
        assert!(!is_context_exit("tunnel enable"));
        assert!(!is_context_exit("tunnel endpoint name vpn.example.com fqdn"));
        assert!(!is_context_exit("ip pp enable 1"));
    }

    #[test]
    fn test_contextual_prefixes() {
        let tunnel = Context::tunnel(1);
        assert!(is_contextual("tunnel encapsulation l2tpv3", &tunnel));
        assert!(is_contextual("l2tp always-on on", &tunnel));
        assert!(is_contextual("description tunnel site-b", &tunnel));
        assert!(!is_contextual("ip route default gateway 192.0.2.1", &tunnel));

        let pp = Context::pp_anonymous();
        assert!(is_contextual("ppp ipcp ipaddress on", &pp));
        assert!(is_contextual("ip pp mtu 1258", &pp));
        assert!(is_contextual("pppoe use lan2", &pp));
        assert!(!is_contextual("ip lan1 address 192.0.2.1/24", &pp));

        let ipsec = Context::ipsec_tunnel(101);
        assert!(is_contextual("ipsec sa policy 101 1 esp", &ipsec));
        assert!(!is_contextual("tunnel enable 1", &ipsec));
    }

    #[test]
    fn test_parent_tunnel_lines() {
        assert!(belongs_to_parent_tunnel("l2tp tunnel auth on secret"));
        assert!(belongs_to_parent_tunnel("tunnel endpoint address 192.0.2.1"));
        assert!(belongs_to_parent_tunnel("ip tunnel tcp mss limit auto"));
        assert!(belongs_to_parent_tunnel("tunnel enable 1"));
        assert!(!belongs_to_parent_tunnel("ipsec ike keepalive use 1 on"));
    }

    #[test]
    fn test_identity_uses_name_when_present() {
        let a = Context::pp_anonymous();
        let b = Context {
            kind: ContextKind::PointToPoint,
            id: 7,
            name: Some("anonymous".to_string()),
        };
        assert_eq!(a, b);
        assert_ne!(a, Context::pp(0));
        assert_ne!(Context::tunnel(1), Context::ipsec_tunnel(1));

        let set: HashSet<Context> = [a, b, Context::pp(0)].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(Context::tunnel(1).to_string(), "tunnel/1");
        assert_eq!(Context::pp_anonymous().to_string(), "pp/anonymous");
        assert_eq!(Context::ipsec_tunnel(101).to_string(), "ipsec-tunnel/101");

        assert_eq!("tunnel/1".parse::<Context>().unwrap(), Context::tunnel(1));
        assert_eq!(
            "pp/anonymous".parse::<Context>().unwrap(),
            Context::pp_anonymous()
        );
        assert!("bogus/1".parse::<Context>().is_err());
        assert!("tunnel".parse::<Context>().is_err());
        assert!("tunnel/".parse::<Context>().is_err());
    }
}
