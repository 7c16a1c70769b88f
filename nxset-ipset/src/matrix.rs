//! Applicability of modifiers per action and set type
//!
//! One table, [`RULES`], says which actions accept which modifier and
//! whether the set type further restricts it. Rules appear in the order
//! their tokens are emitted on the command line.

use crate::action::Action;
use crate::set_type::SetType;

/// A command-line modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Timeout,
    Exist,
    Resolve,
    Counters,
    Packets,
    Bytes,
    Comment,
    CommentContent,
    SkbInfo,
    SkbMark,
    SkbPrio,
    SkbQueue,
    NoMatch,
    Family,
    HashSize,
}

impl Modifier {
    /// Flag token written before the value, if any
    pub const fn flag(&self) -> &'static str {
        match self {
            Modifier::Timeout => "timeout",
            Modifier::Exist => "-exist",
            Modifier::Resolve => "-resolve",
            Modifier::Counters => "counters",
            Modifier::Packets => "packets",
            Modifier::Bytes => "bytes",
            Modifier::Comment | Modifier::CommentContent => "comment",
            Modifier::SkbInfo => "skbinfo",
            Modifier::SkbMark => "skbmark",
            Modifier::SkbPrio => "skbprio",
            Modifier::SkbQueue => "skbqueue",
            Modifier::NoMatch => "nomatch",
            Modifier::Family => "family",
            Modifier::HashSize => "hashsize",
        }
    }

    /// Whether the flag is followed by a value token
    pub const fn takes_value(&self) -> bool {
        matches!(
            self,
            Modifier::Timeout
                | Modifier::Packets
                | Modifier::Bytes
                | Modifier::CommentContent
                | Modifier::SkbMark
                | Modifier::SkbPrio
                | Modifier::SkbQueue
                | Modifier::Family
                | Modifier::HashSize
        )
    }
}

/// Extra set-type restriction on top of the action list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetTypeGate {
    /// Any set type, or none at all
    Any,
    /// Network-style hash types that accept `nomatch` entries
    NoMatch,
    /// Hash types except `hash:mac`
    HashWithFamily,
    /// Any hash type
    Hash,
}

impl SetTypeGate {
    fn admits(&self, set_type: Option<SetType>) -> bool {
        match self {
            SetTypeGate::Any => true,
            SetTypeGate::NoMatch => set_type.is_some_and(|t| t.accepts_nomatch()),
            SetTypeGate::HashWithFamily => {
                set_type.is_some_and(|t| t.is_hash() && t != SetType::HashMac)
            }
            SetTypeGate::Hash => set_type.is_some_and(|t| t.is_hash()),
        }
    }
}

/// One row of the applicability matrix
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub modifier: Modifier,
    pub actions: &'static [Action],
    pub gate: SetTypeGate,
}

const fn rule(modifier: Modifier, actions: &'static [Action], gate: SetTypeGate) -> Rule {
    Rule {
        modifier,
        actions,
        gate,
    }
}

const CREATE: &[Action] = &[Action::Create];
const ADD: &[Action] = &[Action::Add];

/// The applicability matrix, in emission order
pub const RULES: [Rule; 15] = [
    rule(Modifier::Timeout, &[Action::Create, Action::Add], SetTypeGate::Any),
    rule(
        Modifier::Exist,
        &[Action::Create, Action::Add, Action::Delete],
        SetTypeGate::Any,
    ),
    rule(Modifier::Resolve, &[Action::List, Action::Save], SetTypeGate::Any),
    rule(Modifier::Counters, CREATE, SetTypeGate::Any),
    rule(Modifier::Packets, ADD, SetTypeGate::Any),
    rule(Modifier::Bytes, ADD, SetTypeGate::Any),
    rule(Modifier::Comment, CREATE, SetTypeGate::Any),
    rule(Modifier::CommentContent, ADD, SetTypeGate::Any),
    rule(Modifier::SkbInfo, CREATE, SetTypeGate::Any),
    rule(Modifier::SkbMark, ADD, SetTypeGate::Any),
    rule(Modifier::SkbPrio, ADD, SetTypeGate::Any),
    rule(Modifier::SkbQueue, ADD, SetTypeGate::Any),
    rule(Modifier::NoMatch, ADD, SetTypeGate::NoMatch),
    rule(Modifier::Family, CREATE, SetTypeGate::HashWithFamily),
    rule(Modifier::HashSize, CREATE, SetTypeGate::Hash),
];

impl Rule {
    pub fn admits(&self, action: Action, set_type: Option<SetType>) -> bool {
        self.actions.contains(&action) && self.gate.admits(set_type)
    }
}

/// Look up the rule for a modifier
pub fn rule_for(modifier: Modifier) -> &'static Rule {
    // rows are laid out in Modifier declaration order
    &RULES[modifier as usize]
}

/// Whether `modifier` may appear on a command for `action` against `set_type`
pub fn is_applicable(modifier: Modifier, action: Action, set_type: Option<SetType>) -> bool {
    rule_for(modifier).admits(action, set_type)
}
