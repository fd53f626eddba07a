//! A small script toolchain implementing [`ScriptCompiler`].
//!
//! Compiled form:
//!
//! ```text
//! SC <kind>
//! <one statement per line>
//! SC
//! ```
//!
//! Decompilation recovers every quoted `NAME.EXT` literal whose extension is a
//! known resource kind as a reference.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::collab::{Decompiled, ScriptCompiler};
use crate::content::ScriptKind;
use crate::error::ScriptError;
use crate::identity::ExtractedReference;
use crate::kind::TypeTag;

const MARKER: &str = "SC";

static QUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap());
static RESREF_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w{1,8})\.([A-Za-z0-9]{2,4})$").unwrap());

/// Compiler for the quoted-literal script dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralScriptCompiler;

impl LiteralScriptCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptCompiler for LiteralScriptCompiler {
    fn compile(&self, source: &str, kind: ScriptKind) -> Result<String, ScriptError> {
        check_balanced(source)?;

        let mut code = format!("{MARKER} {kind}\n");
        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            code.push_str(line);
            code.push('\n');
        }
        code.push_str(MARKER);
        code.push('\n');
        Ok(code)
    }

    fn decompile(&self, bytecode: &str, kind: ScriptKind) -> Result<Decompiled, ScriptError> {
        let mut lines = bytecode.lines().map(str::trim).filter(|l| !l.is_empty());

        let expected = format!("{MARKER} {kind}");
        match lines.next() {
            Some(header) if header == expected => {}
            Some(header) => {
                return Err(ScriptError::decompile(format!(
                    "expected header '{expected}', found '{header}'"
                )));
            }
            None => return Err(ScriptError::decompile("empty bytecode")),
        }

        let body: Vec<&str> = lines.collect();
        let Some((&last, body)) = body.split_last() else {
            return Err(ScriptError::decompile("missing end marker"));
        };
        if last != MARKER {
            return Err(ScriptError::decompile("missing end marker"));
        }

        let mut references = HashSet::new();
        for line in body {
            for capture in QUOTED.captures_iter(line) {
                let Some(file) = RESREF_FILE.captures(&capture[1]) else {
                    continue;
                };
                let kind = TypeTag::new(&file[2]);
                if kind.is_known() {
                    references.insert(ExtractedReference::new(&file[1], kind));
                }
            }
        }

        Ok(Decompiled {
            source: body.join("\n"),
            references,
        })
    }
}

fn check_balanced(source: &str) -> Result<(), ScriptError> {
    let mut depth: i64 = 0;
    let mut in_quote = false;

    for (line_no, line) in source.lines().enumerate() {
        for c in line.chars() {
            match c {
                '"' => in_quote = !in_quote,
                '(' if !in_quote => depth += 1,
                ')' if !in_quote => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(ScriptError::compile(format!(
                            "unexpected ')' on line {}",
                            line_no + 1
                        )));
                    }
                }
                _ => {}
            }
        }
        if in_quote {
            return Err(ScriptError::compile(format!(
                "unterminated string on line {}",
                line_no + 1
            )));
        }
    }

    if depth != 0 {
        return Err(ScriptError::compile("unclosed '('"));
    }
    Ok(())
}
