//! Scripted in-memory analysis engine for tests.
//!
//! [`FakeEngine`] understands just enough C++ to exercise the cache and the
//! extractors: top-level function declarations and definitions, global
//! variables, typedefs, struct/class/enum heads, `#define` names, and
//! identifier references inside function bodies. `#error` and `#warning`
//! lines become diagnostics. Every parse and reparse is counted so tests can
//! assert on cache hits.

use lens_diagnostics::{RawDiagnostic, Severity};
use lens_source::Location;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::completion::CompletionCandidate;
use crate::cursor::{Cursor, CursorId, CursorKind, ParameterInfo};
use crate::engine::{AnalysisEngine, ParseRequest, UnsavedFile};
use crate::error::EngineError;
use crate::options::ParseOptions;
use crate::unit::TranslationUnit;

type FailPredicate = Box<dyn Fn(&ParseRequest<'_>) -> bool + Send>;

/// A parse request as seen by the fake engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedParse {
    /// Main file of the request.
    pub main_file: PathBuf,
    /// Arguments of the request.
    pub args: Vec<String>,
    /// Options of the request.
    pub options: ParseOptions,
    /// Paths of the unsaved buffers.
    pub unsaved: Vec<PathBuf>,
    /// Whether the attempt failed.
    pub failed: bool,
}

#[derive(Default)]
struct FakeState {
    parses: usize,
    reparses: usize,
    fail_parse: Option<FailPredicate>,
    fail_reparse: bool,
    extra_diagnostics: Vec<RawDiagnostic>,
    extra_completions: Vec<CompletionCandidate>,
    recorded: Vec<RecordedParse>,
}

/// A scripted [`AnalysisEngine`] with call counters.
///
/// Clones share their counters and script.
#[derive(Clone, Default)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    /// Creates an engine that parses everything successfully.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `parse` fail whenever `predicate` returns `true`.
    pub fn failing_when(self, predicate: impl Fn(&ParseRequest<'_>) -> bool + Send + 'static) -> Self {
        self.state.lock().fail_parse = Some(Box::new(predicate));
        self
    }

    /// Makes every reparse fail (or succeed again).
    pub fn set_reparse_failure(&self, fail: bool) {
        self.state.lock().fail_reparse = fail;
    }

    /// Adds a diagnostic reported by every unit.
    pub fn with_diagnostic(self, diag: RawDiagnostic) -> Self {
        self.state.lock().extra_diagnostics.push(diag);
        self
    }

    /// Adds a completion offered by every unit.
    pub fn with_completion(self, candidate: CompletionCandidate) -> Self {
        self.state.lock().extra_completions.push(candidate);
        self
    }

    /// Number of `parse` calls so far, failed ones included.
    pub fn parse_count(&self) -> usize {
        self.state.lock().parses
    }

    /// Number of `reparse` calls so far.
    pub fn reparse_count(&self) -> usize {
        self.state.lock().reparses
    }

    /// Parse and reparse calls combined.
    pub fn call_count(&self) -> usize {
        let state = self.state.lock();
        state.parses + state.reparses
    }

    /// All parse requests so far, in order.
    pub fn recorded(&self) -> Vec<RecordedParse> {
        self.state.lock().recorded.clone()
    }

    /// Resets counters and recorded requests.
    pub fn reset_counts(&self) {
        let mut state = self.state.lock();
        state.parses = 0;
        state.reparses = 0;
        state.recorded.clear();
    }
}

impl AnalysisEngine for FakeEngine {
    fn parse(&self, request: &ParseRequest<'_>) -> Result<Box<dyn TranslationUnit>, EngineError> {
        let mut state = self.state.lock();
        state.parses += 1;
        let failed = state
            .fail_parse
            .as_ref()
            .is_some_and(|predicate| predicate(request));
        state.recorded.push(RecordedParse {
            main_file: request.main_file.to_path_buf(),
            args: request.args.to_vec(),
            options: request.options,
            unsaved: request.unsaved.iter().map(|f| f.path.clone()).collect(),
            failed,
        });
        if failed {
            return Err(EngineError::ParseFailed {
                file: request.main_file.to_path_buf(),
                reason: "scripted failure".to_string(),
            });
        }
        if request.main_contents().is_none() {
            return Err(EngineError::MissingMainFile(request.main_file.to_path_buf()));
        }
        let model = Model::build(request.main_file, request.unsaved);
        Ok(Box::new(FakeUnit {
            main_file: request.main_file.to_path_buf(),
            state: Arc::clone(&self.state),
            model,
        }))
    }
}

struct FakeUnit {
    main_file: PathBuf,
    state: Arc<Mutex<FakeState>>,
    model: Model,
}

impl TranslationUnit for FakeUnit {
    fn main_file(&self) -> &Path {
        &self.main_file
    }

    fn reparse(&mut self, unsaved: &[UnsavedFile]) -> Result<(), EngineError> {
        let fail = {
            let mut state = self.state.lock();
            state.reparses += 1;
            state.fail_reparse
        };
        if fail {
            return Err(EngineError::ReparseFailed {
                file: self.main_file.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.model = Model::build(&self.main_file, unsaved);
        Ok(())
    }

    fn diagnostics(&self) -> Vec<RawDiagnostic> {
        let mut diags = self.model.diagnostics.clone();
        diags.extend(self.state.lock().extra_diagnostics.iter().cloned());
        diags
    }

    fn top_level(&self) -> Vec<Cursor> {
        self.model
            .top
            .iter()
            .map(|&i| self.model.nodes[i].cursor.clone())
            .collect()
    }

    fn children(&self, parent: &Cursor) -> Vec<Cursor> {
        self.model
            .node(parent)
            .map(|n| {
                n.children
                    .iter()
                    .map(|&i| self.model.nodes[i].cursor.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn cursor_at(&self, location: &Location) -> Option<Cursor> {
        self.model
            .nodes
            .iter()
            .find(|n| {
                n.name_len > 0
                    && n.cursor.location.file == location.file
                    && n.cursor.location.line == location.line
                    && (n.cursor.location.column..n.cursor.location.column + n.name_len)
                        .contains(&location.column)
            })
            .map(|n| n.cursor.clone())
    }

    fn referenced(&self, cursor: &Cursor) -> Option<Cursor> {
        let node = self.model.node(cursor)?;
        match node.referenced {
            Some(target) => Some(self.model.nodes[target].cursor.clone()),
            None if node.cursor.kind.is_symbol() => Some(node.cursor.clone()),
            None => None,
        }
    }

    fn definition(&self, cursor: &Cursor) -> Option<Cursor> {
        if cursor.usr.is_empty() {
            return None;
        }
        self.model
            .nodes
            .iter()
            .find(|n| n.cursor.usr == cursor.usr && n.cursor.is_definition && n.cursor.kind.is_symbol())
            .map(|n| n.cursor.clone())
    }

    fn canonical(&self, cursor: &Cursor) -> Cursor {
        if !cursor.kind.is_symbol() || cursor.usr.is_empty() {
            return cursor.clone();
        }
        self.model
            .nodes
            .iter()
            .find(|n| n.cursor.usr == cursor.usr && n.cursor.kind.is_symbol())
            .map_or_else(|| cursor.clone(), |n| n.cursor.clone())
    }

    fn complete_at(&self, _location: &Location, _unsaved: &[UnsavedFile]) -> Vec<CompletionCandidate> {
        let mut out: Vec<CompletionCandidate> = self
            .model
            .nodes
            .iter()
            .filter(|n| n.cursor.kind.is_symbol() && n.cursor.kind != CursorKind::ParmDecl)
            .map(|n| {
                let c = &n.cursor;
                let label = if c.kind.is_function_like() {
                    let params: Vec<String> = c
                        .parameters
                        .iter()
                        .map(|p| format!("{} {}", p.type_name, p.name).trim().to_string())
                        .collect();
                    format!("{}({})", c.spelling, params.join(", "))
                } else {
                    c.spelling.clone()
                };
                CompletionCandidate::new(c.spelling.clone(), c.kind)
                    .with_signature(label, c.result_type.clone())
                    .in_file(c.location.file.clone())
            })
            .collect();
        out.extend(self.state.lock().extra_completions.iter().cloned());
        out
    }
}

// ---------------------------------------------------------------------------
// Model construction
// ---------------------------------------------------------------------------

struct Node {
    cursor: Cursor,
    children: Vec<usize>,
    referenced: Option<usize>,
    name_len: u32,
}

#[derive(Default)]
struct Model {
    nodes: Vec<Node>,
    top: Vec<usize>,
    diagnostics: Vec<RawDiagnostic>,
}

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Ident(String),
    Punct(char),
    Ellipsis,
    Literal,
}

#[derive(Clone, Debug)]
struct Token {
    tok: Tok,
    line: u32,
    col: u32,
    len: u32,
}

impl Token {
    fn ident(&self) -> Option<&str> {
        match &self.tok {
            Tok::Ident(s) => Some(s),
            _ => None,
        }
    }

    fn is_punct(&self, c: char) -> bool {
        self.tok == Tok::Punct(c)
    }

    fn text(&self) -> String {
        match &self.tok {
            Tok::Ident(s) => s.clone(),
            Tok::Punct(c) => c.to_string(),
            Tok::Ellipsis => "...".to_string(),
            Tok::Literal => "0".to_string(),
        }
    }
}

struct Directive {
    line: u32,
    col: u32,
    body: String,
}

fn lex(text: &str) -> (Vec<Token>, Vec<Directive>) {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut directives = Vec::new();
    let (mut i, mut line, mut col) = (0usize, 1u32, 1u32);
    let mut line_start = true;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'\n' {
            i += 1;
            line += 1;
            col = 1;
            line_start = true;
            continue;
        }
        if c.is_ascii_whitespace() {
            i += 1;
            col += 1;
            continue;
        }
        if line_start && c == b'#' {
            let end = text[i..].find('\n').map_or(bytes.len(), |p| i + p);
            directives.push(Directive {
                line,
                col,
                body: text[i + 1..end].trim().to_string(),
            });
            col += (end - i) as u32;
            i = end;
            continue;
        }
        line_start = false;
        let next = bytes.get(i + 1).copied().unwrap_or(0);

        if c == b'/' && next == b'/' {
            let end = text[i..].find('\n').map_or(bytes.len(), |p| i + p);
            col += (end - i) as u32;
            i = end;
            continue;
        }
        if c == b'/' && next == b'*' {
            i += 2;
            col += 2;
            while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                if bytes[i] == b'\n' {
                    line += 1;
                    col = 1;
                } else {
                    col += 1;
                }
                i += 1;
            }
            i += 2;
            col += 2;
            continue;
        }
        let start_col = col;
        if c == b'"' || c == b'\'' {
            let mut j = i + 1;
            let mut escape = false;
            while j < bytes.len() && bytes[j] != b'\n' {
                if !escape && bytes[j] == c {
                    j += 1;
                    break;
                }
                escape = !escape && bytes[j] == b'\\';
                j += 1;
            }
            col += (j - i) as u32;
            tokens.push(Token { tok: Tok::Literal, line, col: start_col, len: (j - i) as u32 });
            i = j;
            continue;
        }
        if c.is_ascii_alphabetic() || c == b'_' {
            let mut j = i;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_') {
                j += 1;
            }
            tokens.push(Token {
                tok: Tok::Ident(text[i..j].to_string()),
                line,
                col: start_col,
                len: (j - i) as u32,
            });
            col += (j - i) as u32;
            i = j;
            continue;
        }
        if c.is_ascii_digit() {
            let mut j = i;
            while j < bytes.len() && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'.') {
                j += 1;
            }
            tokens.push(Token { tok: Tok::Literal, line, col: start_col, len: (j - i) as u32 });
            col += (j - i) as u32;
            i = j;
            continue;
        }
        if text[i..].starts_with("...") {
            tokens.push(Token { tok: Tok::Ellipsis, line, col: start_col, len: 3 });
            i += 3;
            col += 3;
            continue;
        }
        tokens.push(Token { tok: Tok::Punct(c as char), line, col: start_col, len: 1 });
        i += 1;
        col += 1;
    }
    (tokens, directives)
}

const NOT_A_NAME: &[&str] = &[
    "if", "while", "for", "switch", "return", "sizeof", "else", "do", "case",
];
const STORAGE: &[&str] = &["static", "inline", "extern", "constexpr", "virtual"];

fn matching(tokens: &[Token], open_at: usize, open: char, close: char) -> usize {
    let mut depth = 0;
    for (i, t) in tokens.iter().enumerate().skip(open_at) {
        if t.is_punct(open) {
            depth += 1;
        } else if t.is_punct(close) {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
    }
    tokens.len().saturating_sub(1)
}

fn join(tokens: &[&Token]) -> String {
    tokens.iter().map(|t| t.text()).collect::<Vec<_>>().join(" ")
}

struct FunctionHead {
    name_at: usize,
    result_type: String,
    is_static: bool,
    is_variadic: bool,
    parameters: Vec<ParameterInfo>,
}

fn function_head(stmt: &[&Token]) -> Option<FunctionHead> {
    let open = stmt.iter().position(|t| t.is_punct('('))?;
    let name_at = open.checked_sub(1)?;
    let name = stmt[name_at].ident()?;
    if NOT_A_NAME.contains(&name) || stmt[..name_at].iter().any(|t| t.is_punct('=')) {
        return None;
    }
    let is_static = stmt[..name_at].iter().any(|t| t.ident() == Some("static"));
    let ret: Vec<&Token> = stmt[..name_at]
        .iter()
        .copied()
        .filter(|t| !t.ident().is_some_and(|s| STORAGE.contains(&s)))
        .collect();
    if ret.is_empty() {
        return None;
    }

    let mut depth = 0;
    let mut close = open;
    for (i, t) in stmt.iter().enumerate().skip(open) {
        if t.is_punct('(') {
            depth += 1;
        } else if t.is_punct(')') {
            depth -= 1;
            if depth == 0 {
                close = i;
                break;
            }
        }
    }

    let mut parameters = Vec::new();
    let mut is_variadic = false;
    let mut current: Vec<&Token> = Vec::new();
    let mut depth = 0;
    let inner = stmt.get(open + 1..close).unwrap_or(&[]);
    for t in inner.iter().copied().chain(std::iter::once(stmt[close])) {
        let at_end = std::ptr::eq(t, stmt[close]);
        if t.is_punct('(') {
            depth += 1;
        } else if t.is_punct(')') && !at_end {
            depth -= 1;
        }
        if (t.is_punct(',') && depth == 0) || at_end {
            match current.as_slice() {
                [] => {}
                [only] if only.tok == Tok::Ellipsis => is_variadic = true,
                [only] if only.ident() == Some("void") => {}
                [.., last] if current.len() >= 2 && last.ident().is_some() => {
                    let ty = join(&current[..current.len() - 1]);
                    parameters.push(ParameterInfo::new(ty, last.text()));
                }
                _ => parameters.push(ParameterInfo::new(join(&current), "")),
            }
            current.clear();
            continue;
        }
        current.push(t);
    }

    Some(FunctionHead {
        name_at,
        result_type: join(&ret),
        is_static,
        is_variadic,
        parameters,
    })
}

struct PendingRef {
    file: PathBuf,
    token: Token,
    owner: usize,
}

impl Model {
    fn node(&self, cursor: &Cursor) -> Option<&Node> {
        self.nodes.get(cursor.id.0 as usize).filter(|n| n.cursor.id == cursor.id)
    }

    fn push(&mut self, cursor: Cursor, name_len: u32, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        let mut cursor = cursor;
        cursor.id = CursorId(idx as u64);
        self.nodes.push(Node {
            cursor,
            children: Vec::new(),
            referenced: None,
            name_len,
        });
        match parent {
            Some(p) => self.nodes[p].children.push(idx),
            None => self.top.push(idx),
        }
        idx
    }

    fn build(main_file: &Path, unsaved: &[UnsavedFile]) -> Self {
        let mut model = Model::default();
        let mut refs = Vec::new();
        let ordered = unsaved
            .iter()
            .filter(|f| f.path != main_file)
            .chain(unsaved.iter().filter(|f| f.path == main_file));
        for file in ordered {
            model.scan_file(&file.path, &file.contents, &mut refs);
        }
        model.resolve_refs(refs);
        model
    }

    fn scan_file(&mut self, file: &Path, text: &str, refs: &mut Vec<PendingRef>) {
        let (tokens, directives) = lex(text);
        for d in directives {
            let loc = Location::new(file, d.line, d.col);
            if let Some(msg) = d.body.strip_prefix("error") {
                self.diagnostics.push(RawDiagnostic::at(Severity::Error, loc, msg.trim()));
            } else if let Some(msg) = d.body.strip_prefix("warning") {
                self.diagnostics.push(RawDiagnostic::at(Severity::Warning, loc, msg.trim()));
            } else if let Some(rest) = d.body.strip_prefix("define") {
                let name: String = rest
                    .trim_start()
                    .chars()
                    .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                    .collect();
                if !name.is_empty() {
                    let offset = rest.len() - rest.trim_start().len();
                    let col = d.col + 1 + "define".len() as u32 + offset as u32;
                    let cursor = Cursor {
                        kind: CursorKind::MacroDefinition,
                        display_name: name.clone(),
                        usr: format!("c:macro@{name}"),
                        location: Location::new(file, d.line, col),
                        extent_end: Location::new(file, d.line, col + name.len() as u32),
                        is_definition: true,
                        spelling: name.clone(),
                        ..Cursor::default()
                    };
                    self.push(cursor, name.len() as u32, None);
                }
            }
        }

        let mut stmt: Vec<&Token> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let t = &tokens[i];
            if t.is_punct('{') {
                let close = matching(&tokens, i, '{', '}');
                self.open_brace(file, &stmt, &tokens, i, close, refs);
                stmt.clear();
                i = close + 1;
                continue;
            }
            if t.is_punct(';') {
                self.declaration(file, &stmt);
                stmt.clear();
                i += 1;
                continue;
            }
            stmt.push(t);
            i += 1;
        }
    }

    fn open_brace(
        &mut self,
        file: &Path,
        stmt: &[&Token],
        tokens: &[Token],
        open: usize,
        close: usize,
        refs: &mut Vec<PendingRef>,
    ) {
        let end_loc = |t: &Token| Location::new(file, t.line, t.col + t.len);
        if let Some(head) = function_head(stmt) {
            let name_tok = stmt[head.name_at];
            let name = name_tok.text();
            let fn_idx = self.push(
                function_cursor(file, name_tok, &head, true, end_loc(&tokens[close])),
                name.len() as u32,
                None,
            );
            let body = Cursor {
                kind: CursorKind::CompoundStmt,
                location: Location::new(file, tokens[open].line, tokens[open].col),
                extent_end: end_loc(&tokens[close]),
                ..Cursor::default()
            };
            let body_idx = self.push(body, 0, Some(fn_idx));
            for p in &head.parameters {
                let Some(tok) = stmt[head.name_at + 1..]
                    .iter()
                    .find(|t| !p.name.is_empty() && t.ident() == Some(p.name.as_str()))
                else {
                    continue;
                };
                let parm = Cursor {
                    kind: CursorKind::ParmDecl,
                    spelling: p.name.clone(),
                    display_name: p.name.clone(),
                    location: Location::new(file, tok.line, tok.col),
                    extent_end: end_loc(tok),
                    type_name: p.type_name.clone(),
                    is_definition: true,
                    ..Cursor::default()
                };
                self.push(parm, tok.len, Some(fn_idx));
            }
            for t in &tokens[open + 1..close] {
                if t.ident().is_some() {
                    refs.push(PendingRef {
                        file: file.to_path_buf(),
                        token: t.clone(),
                        owner: body_idx,
                    });
                }
            }
            return;
        }

        let kind = match stmt.first().and_then(|t| t.ident()) {
            Some("struct") => CursorKind::StructDecl,
            Some("class") => CursorKind::ClassDecl,
            Some("union") => CursorKind::UnionDecl,
            Some("enum") => CursorKind::EnumDecl,
            _ => return,
        };
        if let Some(name_tok) = stmt.get(1).filter(|t| t.ident().is_some()) {
            let name = name_tok.text();
            let cursor = Cursor {
                kind,
                spelling: name.clone(),
                display_name: name.clone(),
                usr: format!("c:@S@{name}"),
                location: Location::new(file, name_tok.line, name_tok.col),
                extent_end: end_loc(&tokens[close]),
                type_name: name.clone(),
                is_definition: true,
                ..Cursor::default()
            };
            let idx = self.push(cursor, name.len() as u32, None);
            if kind != CursorKind::EnumDecl {
                self.members(file, &tokens[open + 1..close], idx, &name);
            }
        }
    }

    /// Fields and member functions of a record body. Nested blocks other
    /// than method bodies are skipped.
    fn members(&mut self, file: &Path, body: &[Token], owner: usize, owner_name: &str) {
        let mut stmt: Vec<&Token> = Vec::new();
        let mut i = 0;
        while i < body.len() {
            let t = &body[i];
            if t.is_punct(':')
                && matches!(
                    stmt.as_slice(),
                    [only] if matches!(only.ident(), Some("public" | "private" | "protected"))
                )
            {
                stmt.clear();
                i += 1;
                continue;
            }
            if t.is_punct('{') {
                let close = matching(body, i, '{', '}');
                let end = &body[close];
                self.member(file, &stmt, owner, owner_name, Some(Location::new(file, end.line, end.col + end.len)));
                stmt.clear();
                i = close + 1;
                while body.get(i).is_some_and(|t| t.is_punct(';')) {
                    i += 1;
                }
                continue;
            }
            if t.is_punct(';') {
                self.member(file, &stmt, owner, owner_name, None);
                stmt.clear();
                i += 1;
                continue;
            }
            stmt.push(t);
            i += 1;
        }
    }

    fn member(&mut self, file: &Path, stmt: &[&Token], owner: usize, owner_name: &str, body_end: Option<Location>) {
        if let Some(head) = function_head(stmt) {
            let name_tok = stmt[head.name_at];
            let end = body_end.clone().unwrap_or_else(|| {
                stmt.last()
                    .map_or(Location::default(), |t| Location::new(file, t.line, t.col + t.len))
            });
            let mut cursor = function_cursor(file, name_tok, &head, body_end.is_some(), end);
            cursor.kind = CursorKind::CxxMethod;
            cursor.usr = format!("c:@S@{owner_name}@F@{}", name_tok.text());
            self.push(cursor, name_tok.len, Some(owner));
            return;
        }
        if body_end.is_some() || stmt.len() < 2 || stmt.iter().any(|t| t.is_punct('(')) {
            return;
        }
        let decl_end = stmt.iter().position(|t| t.is_punct('=')).unwrap_or(stmt.len());
        let decl = &stmt[..decl_end];
        let Some(name_tok) = decl.last().filter(|t| decl.len() >= 2 && t.ident().is_some()) else {
            return;
        };
        let name = name_tok.text();
        let cursor = Cursor {
            kind: CursorKind::FieldDecl,
            display_name: name.clone(),
            usr: format!("c:@S@{owner_name}@FI@{name}"),
            location: Location::new(file, name_tok.line, name_tok.col),
            extent_end: Location::new(file, name_tok.line, name_tok.col + name_tok.len),
            type_name: join(&decl[..decl.len() - 1]),
            is_definition: true,
            spelling: name,
            ..Cursor::default()
        };
        self.push(cursor, name_tok.len, Some(owner));
    }

    fn declaration(&mut self, file: &Path, stmt: &[&Token]) {
        if let Some(head) = function_head(stmt) {
            let name_tok = stmt[head.name_at];
            let end = stmt.last().map_or(Location::default(), |t| {
                Location::new(file, t.line, t.col + t.len)
            });
            let cursor = function_cursor(file, name_tok, &head, false, end);
            self.push(cursor, name_tok.len, None);
            return;
        }

        let decl_end = stmt.iter().position(|t| t.is_punct('=')).unwrap_or(stmt.len());
        let decl = &stmt[..decl_end];
        if decl.len() < 2 || decl.iter().any(|t| t.is_punct('(')) {
            return;
        }
        let Some(name) = decl[decl.len() - 1].ident() else {
            return;
        };
        let first = decl[0].ident().unwrap_or("");
        let (kind, usr) = match first {
            "typedef" => (CursorKind::TypedefDecl, format!("c:@T@{name}")),
            "return" | "using" | "struct" | "class" | "enum" | "union" => return,
            _ => (CursorKind::VarDecl, format!("c:@{name}")),
        };
        let ty: Vec<&Token> = decl[..decl.len() - 1]
            .iter()
            .copied()
            .filter(|t| {
                !t.ident()
                    .is_some_and(|s| STORAGE.contains(&s) || s == "typedef")
            })
            .collect();
        let name_tok = decl[decl.len() - 1];
        let is_static = decl.iter().any(|t| t.ident() == Some("static"));
        let is_extern = decl.iter().any(|t| t.ident() == Some("extern"));
        let cursor = Cursor {
            kind,
            spelling: name.to_string(),
            display_name: name.to_string(),
            usr,
            location: Location::new(file, name_tok.line, name_tok.col),
            extent_end: Location::new(file, name_tok.line, name_tok.col + name_tok.len),
            type_name: join(&ty),
            is_definition: !is_extern,
            is_static,
            ..Cursor::default()
        };
        self.push(cursor, name_tok.len, None);
    }

    fn resolve_refs(&mut self, refs: Vec<PendingRef>) {
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (i, n) in self.nodes.iter().enumerate() {
            if n.cursor.kind.is_symbol() && n.cursor.kind != CursorKind::ParmDecl {
                by_name.entry(n.cursor.spelling.clone()).or_insert(i);
            }
        }
        for r in refs {
            let Some(name) = r.token.ident() else { continue };
            let Some(&target) = by_name.get(name) else { continue };
            let target_cursor = &self.nodes[target].cursor;
            let kind = if target_cursor.kind == CursorKind::MacroDefinition {
                CursorKind::MacroExpansion
            } else {
                CursorKind::DeclRefExpr
            };
            let cursor = Cursor {
                kind,
                spelling: name.to_string(),
                display_name: name.to_string(),
                usr: target_cursor.usr.clone(),
                location: Location::new(&r.file, r.token.line, r.token.col),
                extent_end: Location::new(&r.file, r.token.line, r.token.col + r.token.len),
                type_name: target_cursor.type_name.clone(),
                ..Cursor::default()
            };
            let idx = self.push(cursor, r.token.len, Some(r.owner));
            self.nodes[idx].referenced = Some(target);
        }
    }
}

fn function_cursor(
    file: &Path,
    name_tok: &Token,
    head: &FunctionHead,
    is_definition: bool,
    extent_end: Location,
) -> Cursor {
    let name = name_tok.text();
    let types: Vec<&str> = head.parameters.iter().map(|p| p.type_name.as_str()).collect();
    let mut arg_list = types.join(", ");
    if head.is_variadic {
        if !arg_list.is_empty() {
            arg_list.push_str(", ");
        }
        arg_list.push_str("...");
    }
    Cursor {
        kind: CursorKind::FunctionDecl,
        display_name: format!("{name}({arg_list})"),
        usr: format!("c:@F@{name}"),
        location: Location::new(file, name_tok.line, name_tok.col),
        extent_end,
        result_type: head.result_type.clone(),
        type_name: format!("{} ({arg_list})", head.result_type),
        is_definition,
        is_static: head.is_static,
        is_variadic: head.is_variadic,
        parameters: head.parameters.clone(),
        spelling: name,
        ..Cursor::default()
    }
}
