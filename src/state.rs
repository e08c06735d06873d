//! Per-handler accumulation of the values found on the command line.
use std::collections::BTreeMap;

use crate::{Convert, Cursor, HandlerSpec, Invocation, Result, Role, Slot, Value};

/// Result of offering the current piece of the command line to a handler.
///
/// Malformed input that no other handler could accept either is reported
/// through the `Err` side of [`HandlerState::consume`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Consumed,
    /// Not for this handler; someone else may take it.
    Rejected(String),
}

#[derive(Debug)]
pub struct HandlerState {
    spec: HandlerSpec,
    values: Vec<Option<Value>>,
    positionals: Vec<String>,
    named: BTreeMap<String, Option<String>>,
}

impl HandlerState {
    pub fn new(spec: HandlerSpec) -> HandlerState {
        let mut res = HandlerState {
            spec,
            values: Vec::new(),
            positionals: Vec::new(),
            named: BTreeMap::new(),
        };
        res.reset();
        res
    }

    pub fn spec(&self) -> &HandlerSpec {
        &self.spec
    }

    /// Forgets everything collected; prefixes start as empty lists.
    pub fn reset(&mut self) {
        self.values = self
            .spec
            .slots()
            .iter()
            .map(|slot| match slot.role() {
                Role::Prefix => Some(Value::Pairs(Vec::new())),
                _ => None,
            })
            .collect();
        self.positionals.clear();
        self.named.clear();
    }

    /// Whether anything on the command line was attributed to this handler.
    pub fn provided_anything(&self) -> bool {
        !self.positionals.is_empty()
            || !self.named.is_empty()
            || self.values.iter().flatten().any(|it| match it {
                Value::Pairs(pairs) => !pairs.is_empty(),
                _ => true,
            })
    }

    pub fn consume(&mut self, cursor: &mut Cursor<'_>) -> Result<Outcome> {
        if !cursor.is_option() {
            return self.consume_positional(cursor);
        }
        if cursor.is_short() {
            self.consume_short(cursor)
        } else {
            self.consume_long(cursor)
        }
    }

    fn consume_positional(&mut self, cursor: &mut Cursor<'_>) -> Result<Outcome> {
        let raw = cursor.raw();
        if !self.spec.supports_vararg() && self.positionals.len() >= self.spec.positional_count() {
            return Ok(Outcome::Rejected(format!("unexpected argument: `{raw}`")));
        }
        tracing::trace!(handler = self.spec.name(), value = raw, "positional");
        self.positionals.push(raw.to_string());
        cursor.advance_past_current_argument()?;
        Ok(Outcome::Consumed)
    }

    fn consume_long(&mut self, cursor: &mut Cursor<'_>) -> Result<Outcome> {
        let name = cursor.name();
        let raw = cursor.raw();

        if let Some(slot) = self.spec.long(name) {
            match self.spec.slots()[slot].role() {
                Role::Option(convert) => {
                    self.consume_option(slot, convert, cursor)?;
                    return Ok(Outcome::Consumed);
                }
                Role::Flag => {
                    if cursor.was_split() {
                        bail!(Fatal, "incorrect flag `{name}`")
                    }
                    tracing::trace!(handler = self.spec.name(), flag = name, "flag");
                    self.values[slot] = Some(Value::Flag(true));
                    cursor.advance_past_current_argument()?;
                    return Ok(Outcome::Consumed);
                }
                _ => (),
            }
        }

        if let Some((slot, sub)) = self.spec.split_prefix(name) {
            let pair = if sub.is_empty() {
                if cursor.was_split()
                    || !cursor.mode().short_addressing()
                    || cursor.advance_past_current_argument()?
                {
                    bail!(Fatal, "incorrect prefix usage on argument `{raw}`")
                }
                (cursor.name().to_string(), cursor.value().map(str::to_string))
            } else {
                (sub.to_string(), cursor.value().map(str::to_string))
            };
            self.push_pair(slot, pair);
            cursor.advance_past_current_argument()?;
            return Ok(Outcome::Consumed);
        }

        if self.spec.supports_catch_all() {
            tracing::trace!(handler = self.spec.name(), name, "catch-all");
            self.named.insert(name.to_string(), cursor.value().map(str::to_string));
            cursor.advance_past_current_argument()?;
            return Ok(Outcome::Consumed);
        }

        Ok(Outcome::Rejected(format!("unexpected argument: `{raw}`")))
    }

    fn consume_short(&mut self, cursor: &mut Cursor<'_>) -> Result<Outcome> {
        let name = cursor.name();
        let raw = cursor.raw();
        let slot = match self.spec.short(name) {
            Some(it) => it,
            None => {
                let reason = format!("unexpected flag `{name}` in argument `{raw}`");
                return Ok(Outcome::Rejected(reason));
            }
        };

        match self.spec.slots()[slot].role() {
            Role::Flag => {
                tracing::trace!(handler = self.spec.name(), flag = name, "flag");
                self.values[slot] = Some(Value::Flag(true));
                cursor.advance_past_current_short_letter()?;
            }
            Role::Option(convert) => self.consume_option(slot, convert, cursor)?,
            Role::Prefix => {
                let pair = match cursor.value() {
                    Some(rest) => {
                        if rest.starts_with(cursor.mode().delimiter()) {
                            bail!(Fatal, "incorrect prefix usage on argument `{raw}`")
                        }
                        match cursor.separate(rest) {
                            Some((sub, value)) => (sub.to_string(), Some(value.to_string())),
                            None => (rest.to_string(), None),
                        }
                    }
                    None => {
                        if cursor.advance_past_current_argument()? {
                            bail!(Fatal, "incorrect prefix `{name}`")
                        }
                        match cursor.separate(cursor.raw()) {
                            Some((sub, value)) => (sub.to_string(), Some(value.to_string())),
                            None => bail!(Fatal, "incorrect prefix `{name}`"),
                        }
                    }
                };
                self.push_pair(slot, pair);
                cursor.advance_past_current_argument()?;
            }
            Role::Positional | Role::Vararg | Role::CatchAll => {
                return Ok(Outcome::Rejected(format!(
                    "unexpected flag `{name}` in argument `{raw}`"
                )))
            }
        }
        Ok(Outcome::Consumed)
    }

    /// Reads the value of an option, inline or from the next argument.
    fn consume_option(
        &mut self,
        slot: usize,
        convert: Option<Convert>,
        cursor: &mut Cursor<'_>,
    ) -> Result<()> {
        let name = cursor.name();
        let raw = match cursor.value() {
            Some(it) => it,
            None => {
                if !cursor.mode().short_addressing()
                    || cursor.advance_past_current_argument()?
                    || cursor.was_split()
                {
                    bail!(Fatal, "incorrect option `{name}`")
                }
                cursor.raw()
            }
        };
        let value = match convert {
            None => Value::Str(raw.to_string()),
            Some(Convert::Int) => match raw.parse::<i64>() {
                Ok(it) => Value::Int(it),
                Err(_) => bail!(Fatal, "incorrect value for `{name}`"),
            },
            Some(Convert::Float) => match raw.parse::<f64>() {
                Ok(it) => Value::Float(it),
                Err(_) => bail!(Fatal, "incorrect value for `{name}`"),
            },
        };
        tracing::trace!(handler = self.spec.name(), option = name, value = raw, "option");
        self.values[slot] = Some(value);
        cursor.advance_past_current_argument()?;
        Ok(())
    }

    fn push_pair(&mut self, slot: usize, pair: (String, Option<String>)) {
        tracing::trace!(
            handler = self.spec.name(),
            prefix = self.spec.slots()[slot].name(),
            name = pair.0.as_str(),
            "prefix"
        );
        match &mut self.values[slot] {
            Some(Value::Pairs(pairs)) => pairs.push(pair),
            it => *it = Some(Value::Pairs(vec![pair])),
        }
    }

    /// Arguments to call the handler with, or the reason it cannot be
    /// called.
    pub fn invocation(&self) -> Result<Invocation, String> {
        let mut positionals = self.positionals.iter();
        let mut args = Vec::new();
        for (slot, value) in self.spec.slots().iter().zip(&self.values) {
            if !slot.is_bound() || matches!(slot.role(), Role::Vararg | Role::CatchAll) {
                continue;
            }
            let value = match (slot.role(), value) {
                (_, Some(it)) => Some(it.clone()),
                (Role::Positional, None) => positionals.next().map(|it| Value::Str(it.clone())),
                _ => None,
            };
            let value = match value.or_else(|| slot.default().cloned()) {
                Some(it) => it,
                None => return Err(missing(slot)),
            };
            args.push((slot.name().to_string(), value));
        }

        for (slot, value) in self.spec.slots().iter().zip(&self.values) {
            if !slot.is_bound() && value.is_none() {
                return Err(missing(slot));
            }
        }

        Ok(Invocation {
            handler: self.spec.name().to_string(),
            args,
            rest: positionals.cloned().collect(),
            named: self.named.clone(),
        })
    }
}

fn missing(slot: &Slot) -> String {
    format!("missing required {} `{}`", slot.role().kind(), slot.name())
}
