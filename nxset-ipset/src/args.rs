//! Argument vector construction
//!
//! Turns an action, a target name, an optional payload and an [`Options`]
//! bag into the exact token sequence handed to the utility. Tokens are
//! written into an [`ArgBuffer`] that keeps its string storage between
//! uses, so a pooled command builds its arguments without allocating once
//! warmed up.

use std::fmt::{self, Write};

use crate::action::Action;
use crate::error::{IpsetError, Result};
use crate::matrix::{Modifier, RULES};
use crate::options::Options;
use crate::set_type::SetType;

/// Reusable storage for command-line tokens
#[derive(Debug, Default, Clone)]
pub struct ArgBuffer {
    tokens: Vec<String>,
    len: usize,
}

impl ArgBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all tokens, keeping their storage
    pub fn clear(&mut self) {
        for token in &mut self.tokens[..self.len] {
            token.clear();
        }
        self.len = 0;
    }

    fn next_slot(&mut self) -> &mut String {
        if self.len == self.tokens.len() {
            self.tokens.push(String::new());
        }
        let slot = &mut self.tokens[self.len];
        slot.clear();
        self.len += 1;
        slot
    }

    pub fn push(&mut self, token: &str) {
        self.next_slot().push_str(token);
    }

    /// Push a number as base-10 without leading zeros
    pub fn push_u64(&mut self, value: u64) {
        // writing into a String cannot fail
        let _ = write!(self.next_slot(), "{}", value);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.as_slice().to_vec()
    }

    /// Number of token slots kept for reuse
    pub fn capacity(&self) -> usize {
        self.tokens.len()
    }
}

impl fmt::Display for ArgBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.as_slice().iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}

/// A requested modifier value, ready to encode
enum Requested<'a> {
    Flag,
    Number(u64),
    Text(&'a str),
}

fn flag(on: bool) -> Option<Requested<'static>> {
    on.then_some(Requested::Flag)
}

fn number(n: u64) -> Option<Requested<'static>> {
    (n > 0).then_some(Requested::Number(n))
}

fn text(s: &str) -> Option<Requested<'_>> {
    (!s.is_empty()).then_some(Requested::Text(s))
}

fn requested(modifier: Modifier, opts: &Options) -> Option<Requested<'_>> {
    match modifier {
        Modifier::Timeout => number(opts.timeout_secs()),
        Modifier::Exist => flag(opts.exist),
        Modifier::Resolve => flag(opts.resolve),
        Modifier::Counters => flag(opts.counters),
        Modifier::Packets => number(opts.counters_packets),
        Modifier::Bytes => number(opts.counters_bytes),
        Modifier::Comment => flag(opts.comment),
        Modifier::CommentContent => text(&opts.comment_content),
        Modifier::SkbInfo => flag(opts.skb_info),
        Modifier::SkbMark => text(&opts.skb_mark),
        Modifier::SkbPrio => text(&opts.skb_prio),
        Modifier::SkbQueue => number(opts.skb_queue),
        Modifier::NoMatch => flag(opts.no_match),
        Modifier::Family => opts.family.map(|f| Requested::Text(f.as_str())),
        Modifier::HashSize => number(opts.hash_size),
    }
}

/// Write the positional tokens and every applicable modifier into `args`
///
/// `payload` is the set type name for create, the entry for add/del/test
/// and the second set name for rename/swap. It is ignored for actions that
/// end after the set name.
///
/// `name` is `None` only to address every set with list, save, flush or
/// destroy; bare actions ignore it. An empty name is always rejected.
pub fn build_args(
    action: Action,
    name: Option<&str>,
    payload: &str,
    set_type: Option<SetType>,
    opts: &Options,
    args: &mut ArgBuffer,
) -> Result<()> {
    args.clear();
    args.push(action.as_str());

    if action.is_two_args() {
        if let Some(name) = name {
            args.push(set_name(action, name)?);
        }
    } else if !action.is_bare() {
        let name = name.ok_or_else(|| {
            IpsetError::InvalidCommand(format!("{} requires a set name", action))
        })?;
        args.push(set_name(action, name)?);
        args.push(payload);
    }

    append_modifiers(action, set_type, opts, args);
    Ok(())
}

fn set_name(action: Action, name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(IpsetError::InvalidCommand(format!(
            "empty set name for {}",
            action
        )));
    }
    Ok(name)
}

/// Append the modifiers of `opts` that are legal for `action` and `set_type`
pub fn append_modifiers(
    action: Action,
    set_type: Option<SetType>,
    opts: &Options,
    args: &mut ArgBuffer,
) {
    for rule in &RULES {
        let Some(value) = requested(rule.modifier, opts) else {
            continue;
        };
        if !rule.admits(action, set_type) {
            continue;
        }

        args.push(rule.modifier.flag());
        match value {
            Requested::Flag => {}
            Requested::Number(n) => args.push_u64(n),
            Requested::Text(s) => args.push(s),
        }
    }
}

/// Convenience wrapper returning an owned token vector
pub fn to_args(
    action: Action,
    name: Option<&str>,
    payload: &str,
    set_type: Option<SetType>,
    opts: &Options,
) -> Result<Vec<String>> {
    let mut buf = ArgBuffer::new();
    build_args(action, name, payload, set_type, opts, &mut buf)?;
    Ok(buf.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::is_applicable;
    use crate::options::Family;
    use std::time::Duration;

    fn modifiers_only(action: Action, set_type: Option<SetType>, opts: &Options) -> Vec<String> {
        let mut buf = ArgBuffer::new();
        append_modifiers(action, set_type, opts, &mut buf);
        buf.to_vec()
    }

    fn line_for(
        action: Action,
        name: &str,
        payload: &str,
        set_type: Option<SetType>,
        opts: &Options,
    ) -> Vec<String> {
        to_args(action, Some(name), payload, set_type, opts).unwrap()
    }

    /// One bag per modifier, each requesting only that modifier
    fn single_requests() -> Vec<(Modifier, Options, Vec<&'static str>)> {
        vec![
            (
                Modifier::Timeout,
                Options::new().with_timeout(Duration::from_secs(1)),
                vec!["timeout", "1"],
            ),
            (Modifier::Exist, Options::new().with_exist(true), vec!["-exist"]),
            (Modifier::Resolve, Options::new().with_resolve(true), vec!["-resolve"]),
            (Modifier::Counters, Options::new().with_counters(true), vec!["counters"]),
            (Modifier::Packets, Options::new().with_packets(1), vec!["packets", "1"]),
            (Modifier::Bytes, Options::new().with_bytes(1), vec!["bytes", "1"]),
            (Modifier::Comment, Options::new().with_comment(true), vec!["comment"]),
            (
                Modifier::CommentContent,
                Options::new().with_comment_content("hi"),
                vec!["comment", "hi"],
            ),
            (Modifier::SkbInfo, Options::new().with_skb_info(true), vec!["skbinfo"]),
            (
                Modifier::SkbMark,
                Options::new().with_skb_mark("0x1"),
                vec!["skbmark", "0x1"],
            ),
            (
                Modifier::SkbPrio,
                Options::new().with_skb_prio("1:10"),
                vec!["skbprio", "1:10"],
            ),
            (Modifier::SkbQueue, Options::new().with_skb_queue(1), vec!["skbqueue", "1"]),
            (Modifier::NoMatch, Options::new().with_no_match(true), vec!["nomatch"]),
            (
                Modifier::Family,
                Options::new().with_family(Family::Inet),
                vec!["family", "inet"],
            ),
            (
                Modifier::HashSize,
                Options::new().with_hash_size(1024),
                vec!["hashsize", "1024"],
            ),
        ]
    }

    #[test]
    fn test_each_modifier_follows_matrix() {
        let set_types = SetType::ALL.iter().copied().map(Some).chain([None]);
        for set_type in set_types {
            for action in Action::ALL {
                for (modifier, opts, expected) in single_requests() {
                    let args = modifiers_only(action, set_type, &opts);
                    if is_applicable(modifier, action, set_type) {
                        assert_eq!(args, expected, "{:?} on {} {:?}", modifier, action, set_type);
                    } else {
                        assert!(args.is_empty(), "{:?} on {} {:?}", modifier, action, set_type);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unrequested_modifiers_emit_nothing() {
        for action in Action::ALL {
            for set_type in SetType::ALL {
                assert!(modifiers_only(action, Some(set_type), &Options::new()).is_empty());
            }
        }
    }

    #[test]
    fn test_timeout_truncates_to_seconds() {
        let opts = Options::new().with_timeout(Duration::from_millis(1500));
        let line = line_for(Action::Create, "s", "hash:ip", Some(SetType::HashIp), &opts);
        assert_eq!(line, vec!["create", "s", "hash:ip", "timeout", "1"]);

        let opts = Options::new().with_timeout(Duration::from_millis(999));
        let line = line_for(Action::Add, "s", "1.1.1.1", Some(SetType::HashIp), &opts);
        assert_eq!(line, vec!["add", "s", "1.1.1.1"]);
    }

    #[test]
    fn test_counters_dropped_on_delete() {
        let opts = Options::new().with_counters(true).with_exist(true);
        let line = line_for(Action::Delete, "s", "1.1.1.1", Some(SetType::HashIp), &opts);
        assert_eq!(line, vec!["del", "s", "1.1.1.1", "-exist"]);
    }

    #[test]
    fn test_full_create_line() {
        let opts = Options::new()
            .with_timeout(Duration::from_secs(60))
            .with_exist(true)
            .with_counters(true)
            .with_comment(true)
            .with_skb_info(true)
            .with_family(Family::Inet6)
            .with_hash_size(4096)
            // add-only modifiers are ignored on create
            .with_packets(5)
            .with_comment_content("ignored")
            .with_no_match(true);

        let line = line_for(Action::Create, "blocked", "hash:net", Some(SetType::HashNet), &opts);
        assert_eq!(
            line,
            vec![
                "create", "blocked", "hash:net", "timeout", "60", "-exist", "counters", "comment",
                "skbinfo", "family", "inet6", "hashsize", "4096",
            ]
        );
    }

    #[test]
    fn test_full_add_line() {
        let opts = Options::new()
            .with_timeout(Duration::from_secs(30))
            .with_exist(true)
            .with_packets(10)
            .with_bytes(2048)
            .with_comment_content("two words")
            .with_skb_mark("0x10/0xff")
            .with_skb_prio("1:10")
            .with_skb_queue(2)
            .with_no_match(true)
            // create-only modifiers are ignored on add
            .with_counters(true)
            .with_hash_size(64);

        let line = line_for(Action::Add, "nets", "10.0.0.0/8", Some(SetType::HashNet), &opts);
        assert_eq!(
            line,
            vec![
                "add",
                "nets",
                "10.0.0.0/8",
                "timeout",
                "30",
                "-exist",
                "packets",
                "10",
                "bytes",
                "2048",
                "comment",
                "two words",
                "skbmark",
                "0x10/0xff",
                "skbprio",
                "1:10",
                "skbqueue",
                "2",
                "nomatch",
            ]
        );
    }

    #[test]
    fn test_nomatch_dropped_for_hash_ip() {
        let opts = Options::new().with_no_match(true);
        let line = line_for(Action::Add, "s", "1.1.1.1", Some(SetType::HashIp), &opts);
        assert_eq!(line, vec!["add", "s", "1.1.1.1"]);
    }

    #[test]
    fn test_family_dropped_for_hash_mac_and_bitmap() {
        let opts = Options::new().with_family(Family::Inet).with_hash_size(128);
        let mac = line_for(Action::Create, "m", "hash:mac", Some(SetType::HashMac), &opts);
        assert_eq!(mac, vec!["create", "m", "hash:mac", "hashsize", "128"]);

        let bitmap = line_for(Action::Create, "b", "bitmap:port", Some(SetType::BitmapPort), &opts);
        assert_eq!(bitmap, vec!["create", "b", "bitmap:port"]);
    }

    #[test]
    fn test_two_arg_positionals() {
        let opts = Options::new().with_resolve(true);
        assert_eq!(
            line_for(Action::List, "s", "ignored", None, &opts),
            vec!["list", "s", "-resolve"]
        );
        assert_eq!(line_for(Action::Save, "s", "", None, &Options::new()), vec!["save", "s"]);
        assert_eq!(line_for(Action::Destroy, "s", "", None, &opts), vec!["destroy", "s"]);
    }

    #[test]
    fn test_all_sets_only_without_name() {
        let opts = Options::new();
        assert_eq!(to_args(Action::Flush, None, "", None, &opts).unwrap(), vec!["flush"]);
        assert_eq!(to_args(Action::Destroy, None, "", None, &opts).unwrap(), vec!["destroy"]);

        for action in [Action::Flush, Action::Destroy, Action::List, Action::Save] {
            assert!(
                matches!(
                    to_args(action, Some(""), "", None, &opts),
                    Err(IpsetError::InvalidCommand(_))
                ),
                "{}",
                action
            );
        }
    }

    #[test]
    fn test_three_arg_requires_name() {
        let opts = Options::new();
        assert!(to_args(Action::Add, None, "1.1.1.1", None, &opts).is_err());
        assert!(to_args(Action::Test, Some(""), "1.1.1.1", None, &opts).is_err());
        assert!(to_args(Action::Swap, Some(""), "b", None, &opts).is_err());
    }

    #[test]
    fn test_rename_swap_and_bare_actions() {
        let opts = Options::new().with_exist(true);
        assert_eq!(
            line_for(Action::Rename, "old", "new", None, &opts),
            vec!["rename", "old", "new"]
        );
        assert_eq!(line_for(Action::Swap, "a", "b", None, &opts), vec!["swap", "a", "b"]);
        assert_eq!(line_for(Action::Restore, "x", "y", None, &opts), vec!["restore"]);
        assert_eq!(
            to_args(Action::Version, None, "", None, &opts).unwrap(),
            vec!["version"]
        );
        assert_eq!(
            line_for(Action::Test, "s", "1.1.1.1", None, &opts),
            vec!["test", "s", "1.1.1.1"]
        );
    }

    #[test]
    fn test_deterministic_and_reusable_buffer() {
        let opts = Options::new()
            .with_timeout(Duration::from_secs(9))
            .with_comment_content("c");
        let mut buf = ArgBuffer::new();

        build_args(Action::Add, Some("s"), "1.2.3.4", Some(SetType::HashIp), &opts, &mut buf)
            .unwrap();
        let first = buf.to_vec();
        let slots = buf.capacity();

        build_args(Action::List, Some("other"), "", None, &Options::new(), &mut buf).unwrap();
        assert_eq!(buf.as_slice(), ["list", "other"]);

        build_args(Action::Add, Some("s"), "1.2.3.4", Some(SetType::HashIp), &opts, &mut buf)
            .unwrap();
        assert_eq!(buf.to_vec(), first);
        assert_eq!(buf.capacity(), slots);
    }

    #[test]
    fn test_display_joins_tokens() {
        let mut buf = ArgBuffer::new();
        build_args(Action::Test, Some("s"), "1.1.1.1", None, &Options::new(), &mut buf).unwrap();
        assert_eq!(buf.to_string(), "test s 1.1.1.1");
    }
}
