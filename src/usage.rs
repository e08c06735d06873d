use std::{collections::HashMap, fmt};

use crate::{HandlerSpec, Mode, Role, Value};

/// Help text describing a set of handlers.
///
/// With a single candidate the usage line lists all of its options and
/// parameters. With several, the usage line only shows the parameters and
/// each candidate is expanded under `alternatives:`.
pub struct Usage<'a> {
    handlers: Vec<&'a HandlerSpec>,
    commons: Vec<&'a HandlerSpec>,
    mode: &'a Mode,
    option_help: &'a HashMap<String, String>,
    var_names: &'a HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct Opt<'a> {
    role: Role,
    name: &'a str,
    aliases: Vec<&'a str>,
    default: Option<&'a Value>,
}

impl<'a> Usage<'a> {
    pub(crate) fn new(
        handlers: Vec<&'a HandlerSpec>,
        commons: Vec<&'a HandlerSpec>,
        mode: &'a Mode,
        option_help: &'a HashMap<String, String>,
        var_names: &'a HashMap<String, String>,
    ) -> Usage<'a> {
        Usage { handlers, commons, mode, option_help, var_names }
    }

    pub fn render(&self, width: usize, column: usize, indent: usize) -> String {
        let mut buf = Layout::new(width);
        let alternatives = self.alternatives();
        if alternatives.is_empty() {
            buf.add_text("Error, no usage configured", 0);
            return buf.finish();
        }

        buf.add_text("Usage:", 0);
        let options = self.all_options();
        if let [single] = alternatives[..] {
            let mut words =
                self.options_of(single).iter().map(|it| self.describe(it)).collect::<Vec<_>>();
            words.extend(self.parameters_of(single));
            buf.add(words, 0);
        } else {
            if !options.is_empty() {
                buf.add_text("[common options]", 0);
            }
            buf.add(self.all_parameters(&alternatives), 0);
        }

        if !options.is_empty() {
            buf.new_line();
            buf.new_line();
            buf.add_text("options:", 0);
            for opt in &options {
                buf.new_line();
                buf.add_text(&self.aliases(opt), indent);
                if let Some(doc) = self.option_doc(opt) {
                    buf.add_text(doc, column);
                }
            }
        }

        if alternatives.len() > 1 {
            buf.new_line();
            buf.new_line();
            buf.add_text("alternatives:", 0);
            for &handler in &alternatives {
                let mut words =
                    self.options_of(handler).iter().map(|it| self.describe(it)).collect::<Vec<_>>();
                words.extend(self.parameters_of(handler));
                buf.new_line();
                buf.new_line();
                buf.add_text("*", 0);
                buf.add(words, indent);
                if let Some(doc) = handler.doc() {
                    buf.add_text(doc, column);
                }
            }
        }
        buf.finish()
    }

    fn alternatives(&self) -> Vec<&'a HandlerSpec> {
        self.handlers.iter().copied().filter(|it| !it.help).collect()
    }

    /// Options of every handler, flags first.
    fn all_options(&self) -> Vec<Opt<'a>> {
        let mut res = self.collect(&self.handlers);
        res.sort_by_key(|it| (it.role != Role::Flag, it.name.to_lowercase()));
        res
    }

    /// Options of one handler plus the common ones, optional ones first.
    fn options_of(&self, handler: &'a HandlerSpec) -> Vec<Opt<'a>> {
        let mut res = self.collect(&[handler]);
        res.sort_by_key(|it| (it.default.is_none(), it.name.to_lowercase()));
        res
    }

    fn collect(&self, handlers: &[&'a HandlerSpec]) -> Vec<Opt<'a>> {
        let common = options_dir(&self.commons, &[]);
        let mut res = options_dir(handlers, &common);
        res.extend(common);
        res
    }

    fn parameters_of(&self, handler: &'a HandlerSpec) -> Vec<String> {
        let mut res = Vec::new();
        for spec in self.commons.iter().copied().chain(Some(handler)) {
            for slot in spec.slots().iter().filter(|it| it.role() == Role::Positional) {
                res.push(with_default(slot.name().to_string(), slot.default()));
            }
            if spec.supports_vararg() {
                res.push("...".to_string());
                break;
            }
        }
        res
    }

    /// Parameter names shared by all alternatives; names that differ
    /// between alternatives become `argN`.
    fn all_parameters(&self, alternatives: &[&'a HandlerSpec]) -> Vec<String> {
        let mut args: Vec<String> = Vec::new();
        let mut vararg = false;
        for handler in alternatives {
            let params = positional_names(handler);
            for (i, name) in params.iter().enumerate().take(args.len()) {
                if args[i] != *name {
                    args[i] = format!("arg{}", i + 1);
                }
            }
            if params.len() > args.len() {
                args.extend(params[args.len()..].iter().map(|it| it.to_string()));
            }
            if handler.supports_vararg() {
                vararg = true;
                break;
            }
        }

        let mut res = Vec::new();
        for common in &self.commons {
            res.extend(positional_names(common).into_iter().map(String::from));
            if common.supports_vararg() {
                vararg = true;
                args.clear();
                break;
            }
        }
        if vararg {
            args.push("...".to_string());
        }
        res.extend(args);
        res
    }

    fn describe(&self, opt: &Opt<'a>) -> String {
        let text =
            format!("{}{}{}", self.mode.prefix_for(opt.name), opt.name, self.suffix(opt, opt.name));
        with_default(text, opt.default)
    }

    /// `-m MODE, --mode=MODE`
    fn aliases(&self, opt: &Opt<'a>) -> String {
        opt.aliases
            .iter()
            .map(|it| format!("{}{it}{}", self.mode.prefix_for(it), self.suffix(opt, it)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn suffix(&self, opt: &Opt<'a>, name: &str) -> String {
        if opt.role == Role::Flag {
            return String::new();
        }
        let var = opt
            .aliases
            .iter()
            .find_map(|it| self.var_names.get(*it).cloned())
            .unwrap_or_else(|| opt.aliases.last().copied().unwrap_or(opt.name).to_uppercase());
        format!("{}{var}", self.mode.delimiter_for(name))
    }

    fn option_doc(&self, opt: &Opt<'a>) -> Option<&'a str> {
        opt.aliases.iter().find_map(|it| self.option_help.get(*it)).map(String::as_str)
    }
}

impl fmt::Display for Usage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(72, 24, 2))
    }
}

/// Options of `handlers` keyed by their shortest name, first one wins.
fn options_dir<'a>(handlers: &[&'a HandlerSpec], base: &[Opt<'a>]) -> Vec<Opt<'a>> {
    let mut res: Vec<Opt<'a>> = Vec::new();
    for handler in handlers {
        for slot in handler.slots().iter().filter(|it| it.role().is_named()) {
            let mut aliases = slot.names().iter().map(String::as_str).collect::<Vec<_>>();
            aliases.sort_by_key(|it| it.chars().count());
            let name = aliases[0];
            if res.iter().chain(base).any(|it| it.name == name) {
                continue;
            }
            res.push(Opt { role: slot.role(), name, aliases, default: slot.default() });
        }
    }
    res
}

fn positional_names(handler: &HandlerSpec) -> Vec<&str> {
    handler.slots().iter().filter(|it| it.role() == Role::Positional).map(|it| it.name()).collect()
}

fn with_default(text: String, default: Option<&Value>) -> String {
    match default {
        None => text,
        Some(Value::Unset) | Some(Value::Flag(false)) => format!("[{text}]"),
        Some(Value::Str(it)) => format!("[{text} ({it})]"),
        Some(value) => format!("[{text} ({value})]"),
    }
}

/// Word wrapping text buffer: content is placed at a column and continues
/// at that column when it overflows the width.
struct Layout {
    lines: Vec<String>,
    width: usize,
}

impl Layout {
    fn new(width: usize) -> Layout {
        Layout { lines: vec![String::new()], width }
    }

    fn new_line(&mut self) {
        self.lines.push(String::new());
    }

    fn add_text(&mut self, text: &str, column: usize) {
        self.add(text.split(' ').map(String::from), column)
    }

    fn add(&mut self, words: impl IntoIterator<Item = String>, column: usize) {
        let mut current = self.lines.pop().unwrap_or_default();
        if column > 0 && !current.is_empty() && len(&current) + 1 > column {
            self.lines.push(current);
            current = String::new();
        }
        let mut started = column == 0 && !current.trim().is_empty();
        pad(&mut current, column);
        for word in words {
            if started && len(&current) + len(&word) >= self.width {
                self.lines.push(current);
                current = " ".repeat(column);
                started = false;
            }
            if !word.is_empty() || started {
                if started {
                    current.push(' ');
                }
                current.push_str(&word);
                started = true;
            }
        }
        self.lines.push(current.trim_end().to_string());
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn len(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &mut String, column: usize) {
    let n = column.saturating_sub(len(s));
    s.extend(std::iter::repeat(' ').take(n));
}
