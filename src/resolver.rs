use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
    fmt, iter,
};

use crate::{
    Cursor, Error, ErrorKind, Handler, HandlerSpec, HandlerState, Mode, Outcome, Position, Result,
    Usage, Value,
};

/// Values to call a handler with.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub handler: String,
    /// Flags, options, prefixes and positionals, in declaration order.
    pub args: Vec<(String, Value)>,
    /// Positionals beyond the declared ones, if the handler has a vararg.
    pub rest: Vec<String>,
    /// Options nobody declared, if the handler has a catch-all.
    pub named: BTreeMap<String, Option<String>>,
}

impl Invocation {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(it, _)| it == name).map(|(_, value)| value)
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Value::Flag(true)))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.handler)?;
        let mut sep = "";
        for (name, value) in &self.args {
            write!(f, "{sep}{name}={value}")?;
            sep = ", ";
        }
        if !self.rest.is_empty() {
            write!(f, "{sep}*{:?}", self.rest)?;
            sep = ", ";
        }
        if !self.named.is_empty() {
            write!(f, "{sep}**{{")?;
            let mut sep = "";
            for (name, value) in &self.named {
                match value {
                    Some(value) => write!(f, "{sep}{name}={value}")?,
                    None => write!(f, "{sep}{name}")?,
                }
                sep = ", ";
            }
            f.write_str("}")?;
        }
        f.write_str(")")
    }
}

/// The handler that matched, plus the common handlers to run before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    pub commons: Vec<Invocation>,
    pub invocation: Invocation,
}

impl fmt::Display for Matched {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for common in &self.commons {
            writeln!(f, "{common}")?;
        }
        write!(f, "{}", self.invocation)
    }
}

#[derive(Debug, Default)]
pub struct ResolverBuilder {
    mode: Mode,
    gnu: bool,
    default_help: bool,
    aliases: Vec<(String, String)>,
    handlers: Vec<Handler>,
    commons: Vec<Handler>,
    option_help: HashMap<String, String>,
    var_names: HashMap<String, String>,
}

impl ResolverBuilder {
    pub fn mode(mut self, mode: Mode) -> ResolverBuilder {
        self.mode = mode;
        self
    }

    /// Stop recognizing options after the first non option argument.
    pub fn gnu(mut self, yes: bool) -> ResolverBuilder {
        self.gnu = yes;
        self
    }

    /// Adds a `help` handler, tried last, which makes
    /// [`Resolver::process`] fail with the usage text.
    pub fn default_help(mut self, yes: bool) -> ResolverBuilder {
        self.default_help = yes;
        self
    }

    /// An alias applied to every handler declaring either name.
    pub fn alias(mut self, name: impl Into<String>, alias: impl Into<String>) -> ResolverBuilder {
        self.aliases.push((name.into(), alias.into()));
        self
    }

    pub fn handler(mut self, handler: Handler) -> ResolverBuilder {
        self.handlers.push(handler);
        self
    }

    /// A handler matched alongside every candidate, for shared options.
    pub fn common(mut self, handler: Handler) -> ResolverBuilder {
        self.commons.push(handler);
        self
    }

    pub fn option_help(
        mut self,
        name: impl Into<String>,
        doc: impl Into<String>,
    ) -> ResolverBuilder {
        self.option_help.insert(name.into(), doc.into());
        self
    }

    /// Name shown for the value of an option in the usage, `MODE` in
    /// `--mode=MODE`.
    pub fn var_name(mut self, name: impl Into<String>, var: impl Into<String>) -> ResolverBuilder {
        self.var_names.insert(name.into(), var.into());
        self
    }

    pub fn build(self) -> Result<Resolver> {
        let ResolverBuilder {
            mode,
            gnu,
            default_help,
            aliases,
            handlers,
            commons,
            mut option_help,
            var_names,
        } = self;

        if handlers.is_empty() {
            bail!(Config, "no handlers to match the command line against")
        }

        let compile = |handlers: Vec<Handler>| -> Result<Vec<HandlerState>> {
            let mut specs = handlers
                .into_iter()
                .map(|it| HandlerSpec::compile(it, &mode, &aliases))
                .collect::<Result<Vec<_>>>()?;
            specs.sort_by_key(|it| Reverse(it.priority()));
            Ok(specs.into_iter().map(HandlerState::new).collect())
        };
        let mut candidates = compile(handlers)?;
        let commons = compile(commons)?;

        if default_help {
            let mut help = Handler::new("help").flag("help");
            let renamed = aliases.iter().any(|(a, b)| a == "help" || b == "help");
            if mode.short_addressing() && !renamed {
                help = help.alias("help", "h");
            }
            let mut spec = HandlerSpec::compile(help, &mode, &aliases)?;
            spec.help = true;
            candidates.push(HandlerState::new(spec));
            option_help
                .entry("help".to_string())
                .or_insert_with(|| "shows this help message".to_string());
        }

        Ok(Resolver { mode, gnu, candidates, commons, option_help, var_names })
    }
}

#[derive(Debug)]
pub struct Resolver {
    mode: Mode,
    gnu: bool,
    candidates: Vec<HandlerState>,
    commons: Vec<HandlerState>,
    option_help: HashMap<String, String>,
    var_names: HashMap<String, String>,
}

enum Trial {
    Matched(Matched),
    Failed { position: Position, reason: String },
}

impl Resolver {
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Candidates in the order they are tried.
    pub fn candidates(&self) -> impl Iterator<Item = &HandlerSpec> {
        self.candidates.iter().map(HandlerState::spec)
    }

    pub fn commons(&self) -> impl Iterator<Item = &HandlerSpec> {
        self.commons.iter().map(HandlerState::spec)
    }

    pub fn usage(&self) -> Usage<'_> {
        Usage::new(
            self.candidates().collect(),
            self.commons().collect(),
            &self.mode,
            &self.option_help,
            &self.var_names,
        )
    }

    /// Matches `args` against the candidates. `args[0]`, the program name,
    /// is ignored.
    pub fn process<I>(&mut self, args: I) -> Result<Matched>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect::<Vec<String>>();
        let (winner, matched) = self.resolve(&args)?;
        if self.candidates[winner].spec().help {
            return Err(Error::new(ErrorKind::Help, self.usage().to_string()));
        }
        Ok(matched)
    }

    pub fn process_env(&mut self) -> Result<Matched> {
        let args = std::env::args_os()
            .map(|it| {
                it.into_string().map_err(|it| format_err!(Usage, "invalid utf8 argument: {it:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        self.process(args)
    }

    pub fn process_env_or_exit(&mut self) -> Matched {
        self.process_env().unwrap_or_else(|err| err.exit())
    }

    fn resolve(&mut self, args: &[String]) -> Result<(usize, Matched)> {
        let Resolver { mode, gnu, candidates, commons, .. } = self;
        let mut cursor = Cursor::new(args, mode, *gnu)?;

        let mut deepest: Option<(Position, String)> = None;
        for (i, candidate) in candidates.iter_mut().enumerate() {
            tracing::debug!(handler = candidate.spec().name(), "trying handler");
            match trial(commons, candidate, &mut cursor)? {
                Trial::Matched(matched) => {
                    tracing::debug!(handler = candidate.spec().name(), "matched");
                    return Ok((i, matched));
                }
                Trial::Failed { position, reason } => {
                    tracing::debug!(
                        handler = candidate.spec().name(),
                        token = position.token,
                        offset = position.offset,
                        reason = reason.as_str(),
                        "no match"
                    );
                    if deepest.as_ref().map_or(true, |(deepest, _)| position > *deepest) {
                        deepest = Some((position, reason));
                    }
                }
            }
        }

        let reason = match deepest {
            Some((_, reason)) => reason,
            None => "invalid command line input".to_string(),
        };
        Err(Error::new(ErrorKind::Usage, reason))
    }
}

fn trial(
    commons: &mut [HandlerState],
    candidate: &mut HandlerState,
    cursor: &mut Cursor<'_>,
) -> Result<Trial> {
    for common in commons.iter_mut() {
        common.reset();
    }
    candidate.reset();
    cursor.reset()?;

    while !cursor.finished() {
        let position = cursor.position();
        let mut rejection = None;
        for state in commons.iter_mut().chain(iter::once(&mut *candidate)) {
            match state.consume(cursor)? {
                Outcome::Consumed => {
                    rejection = None;
                    break;
                }
                Outcome::Rejected(reason) => rejection = Some(reason),
            }
        }
        if let Some(reason) = rejection {
            return Ok(Trial::Failed { position, reason });
        }
    }

    let end = cursor.position();
    let mut invocations = Vec::new();
    for common in commons.iter() {
        match common.invocation() {
            Ok(it) => invocations.push(it),
            Err(reason) if common.provided_anything() => {
                return Ok(Trial::Failed { position: end, reason })
            }
            Err(_) => (),
        }
    }
    match candidate.invocation() {
        Ok(invocation) => Ok(Trial::Matched(Matched { commons: invocations, invocation })),
        Err(reason) => Ok(Trial::Failed { position: end, reason }),
    }
}
