use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::{mode::is_single_char, Mode, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convert {
    Int,
    Float,
}

/// What a handler parameter does with the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `--verbose`, `-v`.
    Flag,
    /// `--mode=fast`, `--mode fast`, `-m fast`, `-mfast`.
    Option(Option<Convert>),
    /// `-Dname=value`, `--definename=value`, collected as pairs.
    Prefix,
    Positional,
    /// Positional arguments beyond the declared ones.
    Vararg,
    /// Named arguments no other parameter recognizes. Not available in
    /// getopt mode.
    CatchAll,
}

impl Role {
    pub fn is_named(self) -> bool {
        matches!(self, Role::Flag | Role::Option(_) | Role::Prefix)
    }

    pub(crate) fn kind(self) -> &'static str {
        match self {
            Role::Flag => "flag",
            Role::Option(_) => "option",
            Role::Prefix => "prefix",
            Role::Positional | Role::Vararg | Role::CatchAll => "parameter",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unset,
    Flag(bool),
    Str(String),
    Int(i64),
    Float(f64),
    Pairs(Vec<(String, Option<String>)>),
}

impl From<bool> for Value {
    fn from(it: bool) -> Value {
        Value::Flag(it)
    }
}

impl From<&str> for Value {
    fn from(it: &str) -> Value {
        Value::Str(it.to_string())
    }
}

impl From<String> for Value {
    fn from(it: String) -> Value {
        Value::Str(it)
    }
}

impl From<i64> for Value {
    fn from(it: i64) -> Value {
        Value::Int(it)
    }
}

impl From<f64> for Value {
    fn from(it: f64) -> Value {
        Value::Float(it)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => f.write_str("unset"),
            Value::Flag(it) => write!(f, "{it}"),
            Value::Str(it) => write!(f, "{it:?}"),
            Value::Int(it) => write!(f, "{it}"),
            Value::Float(it) => write!(f, "{it:?}"),
            Value::Pairs(pairs) => {
                f.write_str("[")?;
                for (i, (name, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match value {
                        Some(value) => write!(f, "{name}={value}")?,
                        None => f.write_str(name)?,
                    }
                }
                f.write_str("]")
            }
        }
    }
}

#[derive(Debug, Clone)]
struct SlotDecl {
    name: String,
    role: Role,
    bound: bool,
}

/// Declaration of one candidate handler.
///
/// Parameters are listed in call order; the resolved values come back in
/// the same order.
#[derive(Debug, Clone)]
pub struct Handler {
    name: String,
    doc: Option<String>,
    priority: i32,
    slots: Vec<SlotDecl>,
    defaults: Vec<(String, Value)>,
    aliases: Vec<(String, String)>,
}

impl Handler {
    pub fn new(name: impl Into<String>) -> Handler {
        Handler {
            name: name.into(),
            doc: None,
            priority: 0,
            slots: Vec::new(),
            defaults: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Handler {
        self.doc = Some(doc.into());
        self
    }

    /// Handlers with higher priority are tried first.
    pub fn priority(mut self, priority: i32) -> Handler {
        self.priority = priority;
        self
    }

    pub fn slot(mut self, name: impl Into<String>, role: Role) -> Handler {
        self.slots.push(SlotDecl { name: name.into(), role, bound: true });
        self
    }

    pub fn flag(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Flag)
    }

    /// A flag that must be given but has no value of its own.
    pub fn required_flag(mut self, name: impl Into<String>) -> Handler {
        self.slots.push(SlotDecl { name: name.into(), role: Role::Flag, bound: false });
        self
    }

    pub fn option(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Option(None))
    }

    pub fn int_option(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Option(Some(Convert::Int)))
    }

    pub fn float_option(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Option(Some(Convert::Float)))
    }

    pub fn prefix(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Prefix)
    }

    pub fn positional(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Positional)
    }

    pub fn vararg(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::Vararg)
    }

    pub fn catch_all(self, name: impl Into<String>) -> Handler {
        self.slot(name, Role::CatchAll)
    }

    pub fn default_for(mut self, name: impl Into<String>, value: impl Into<Value>) -> Handler {
        self.defaults.push((name.into(), value.into()));
        self
    }

    /// Makes `alias` another spelling of the option `name`, in either
    /// direction. In getopt mode one of them must be a single letter.
    pub fn alias(mut self, name: impl Into<String>, alias: impl Into<String>) -> Handler {
        self.aliases.push((name.into(), alias.into()));
        self
    }
}

#[derive(Debug, Clone)]
pub struct Slot {
    name: String,
    role: Role,
    bound: bool,
    default: Option<Value>,
    names: Vec<String>,
}

impl Slot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether the value is passed to the handler. Required flags are not.
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Every public name of a flag, option or prefix, aliases included.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A validated handler declaration, bound to a [`Mode`].
#[derive(Debug, Clone)]
pub struct HandlerSpec {
    name: String,
    doc: Option<String>,
    priority: i32,
    slots: Vec<Slot>,
    names: HashMap<String, usize>,
    positionals: usize,
    vararg: bool,
    catch_all: bool,
    short_addressing: bool,
    pub(crate) help: bool,
}

impl HandlerSpec {
    pub fn new(handler: Handler, mode: &Mode) -> Result<HandlerSpec> {
        HandlerSpec::compile(handler, mode, &[])
    }

    pub(crate) fn compile(
        handler: Handler,
        mode: &Mode,
        shared_aliases: &[(String, String)],
    ) -> Result<HandlerSpec> {
        let Handler { name, doc, priority, slots, defaults, aliases } = handler;
        let mut res = HandlerSpec {
            name,
            doc,
            priority,
            slots: Vec::new(),
            names: HashMap::new(),
            positionals: 0,
            vararg: false,
            catch_all: false,
            short_addressing: mode.short_addressing(),
            help: false,
        };

        let mut seen = HashSet::new();
        for SlotDecl { name, role, bound } in slots {
            if name.is_empty() {
                bail!(Config, "empty parameter name in handler `{}`", res.name)
            }
            if !seen.insert(name.clone()) {
                bail!(Config, "invalid parameter reuse: `{name}` in handler `{}`", res.name)
            }
            match role {
                Role::Positional => res.positionals += 1,
                Role::Vararg => {
                    if res.vararg {
                        bail!(Config, "handler `{}` declares more than one vararg", res.name)
                    }
                    res.vararg = true;
                }
                Role::CatchAll => {
                    if mode.short_addressing() {
                        bail!(Config, "catch-all `{name}` is not supported in getopt mode")
                    }
                    if res.catch_all {
                        bail!(Config, "handler `{}` declares more than one catch-all", res.name)
                    }
                    res.catch_all = true;
                }
                Role::Flag | Role::Option(_) | Role::Prefix => {
                    res.names.insert(name.clone(), res.slots.len());
                }
            }
            let names = if role.is_named() { vec![name.clone()] } else { Vec::new() };
            res.slots.push(Slot { name, role, bound, default: None, names });
        }

        for (name, value) in defaults {
            let slot = match res.slots.iter_mut().find(|it| it.name == name) {
                Some(it) => it,
                None => bail!(
                    Config,
                    "default for unknown parameter `{name}` in handler `{}`",
                    res.name
                ),
            };
            if !slot.bound || matches!(slot.role, Role::Vararg | Role::CatchAll) {
                bail!(Config, "parameter `{name}` in handler `{}` cannot have a default", res.name)
            }
            slot.default = Some(value);
        }

        for (name, alias) in aliases.iter().chain(shared_aliases) {
            res.apply_alias(name, alias, mode)?;
        }
        Ok(res)
    }

    fn apply_alias(&mut self, a: &str, b: &str, mode: &Mode) -> Result<()> {
        let (known, alias) = if mode.short_addressing() {
            let (short, long) = if a.chars().count() > b.chars().count() { (b, a) } else { (a, b) };
            if !is_single_char(short) || is_single_char(long) {
                bail!(Config, "bad alias `{a}`/`{b}`: one side must be a single letter")
            }
            if self.names.contains_key(long) {
                (long, short)
            } else {
                (short, long)
            }
        } else if self.names.contains_key(b) {
            (b, a)
        } else {
            (a, b)
        };

        let slot = match self.names.get(known) {
            Some(&it) => it,
            None => return Ok(()),
        };
        if self.names.contains_key(alias) {
            bail!(Config, "bad alias `{a}`/`{b}` in handler `{}`", self.name)
        }
        self.names.insert(alias.to_string(), slot);
        self.slots[slot].names.push(alias.to_string());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn supports_vararg(&self) -> bool {
        self.vararg
    }

    pub fn supports_catch_all(&self) -> bool {
        self.catch_all
    }

    pub(crate) fn positional_count(&self) -> usize {
        self.positionals
    }

    /// Slot owning the long option `name`.
    pub(crate) fn long(&self, name: &str) -> Option<usize> {
        if self.short_addressing && is_single_char(name) {
            return None;
        }
        self.names.get(name).copied()
    }

    /// Slot owning the short option `name`.
    pub(crate) fn short(&self, name: &str) -> Option<usize> {
        if !is_single_char(name) {
            return None;
        }
        self.names.get(name).copied()
    }

    /// Finds the longest long prefix `name` starts with, returning its slot
    /// and the rest of `name`.
    pub(crate) fn split_prefix<'n>(&self, name: &'n str) -> Option<(usize, &'n str)> {
        self.names
            .iter()
            .filter(|(prefix, &slot)| {
                self.slots[slot].role == Role::Prefix
                    && !(self.short_addressing && is_single_char(prefix))
                    && name.starts_with(prefix.as_str())
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, &slot)| (slot, &name[prefix.len()..]))
    }
}
