//! Declaration-skeleton hashing.
//!
//! The skeleton of a file is its text with comments, string and character
//! literals, and function bodies removed, and with whitespace collapsed.
//! Edits confined to function bodies leave the skeleton unchanged, which lets
//! callers reuse decisions that only depend on the file's declarations.

use crate::hash::{ContentHash, HashBuilder};

/// Result of scanning a file's declaration skeleton.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclarationSkeleton {
    /// Hash of the file name and the skeleton text.
    pub signature: ContentHash,
    /// 1-based lines on which a skipped function body opens.
    pub body_lines: Vec<u32>,
}

impl DeclarationSkeleton {
    /// Hash of the signature together with the position of every function body.
    ///
    /// Changes whenever a definition moves to another line, even if the
    /// declarations themselves are untouched.
    pub fn layout(&self) -> ContentHash {
        self.body_lines
            .iter()
            .fold(HashBuilder::new().hash(self.signature), |b, &line| {
                b.u64(u64::from(line))
            })
            .finish()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    LineComment,
    BlockComment,
    Str,
    Char,
}

struct SkeletonText {
    bytes: Vec<u8>,
    last_was_space: bool,
}

impl SkeletonText {
    fn space(&mut self) {
        if !self.last_was_space {
            self.bytes.push(b' ');
            self.last_was_space = true;
        }
    }

    fn push(&mut self, c: u8) {
        self.bytes.push(c);
        self.last_was_space = false;
    }
}

/// Scans `code` and hashes its declaration skeleton, mixed with `filename`.
///
/// A `{` is treated as the start of a function body when it follows a `)`
/// with no `;` in between. Braces inside a skipped body are counted so the
/// body ends at its matching `}`; comments and literals inside it are still
/// recognized so braces within them do not confuse the count.
pub fn declaration_skeleton(filename: &str, code: &str) -> DeclarationSkeleton {
    let bytes = code.as_bytes();
    let mut text = SkeletonText {
        bytes: Vec::with_capacity(bytes.len() / 2),
        last_was_space: false,
    };
    let mut body_lines = Vec::new();

    let mut state = Lexical::Code;
    let mut escape = false;
    let mut body_depth = 0u32;
    let mut pending_body = false;
    let mut line = 1u32;
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let next = bytes.get(i + 1).copied().unwrap_or(0);

        if c == b'\n' {
            line += 1;
            if state == Lexical::LineComment {
                state = Lexical::Code;
            }
            text.space();
            i += 1;
            continue;
        }

        match state {
            Lexical::LineComment => {
                i += 1;
                continue;
            }
            Lexical::BlockComment => {
                if c == b'*' && next == b'/' {
                    state = Lexical::Code;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            Lexical::Str | Lexical::Char => {
                let close = if state == Lexical::Str { b'"' } else { b'\'' };
                if !escape && c == close {
                    state = Lexical::Code;
                }
                escape = !escape && c == b'\\';
                i += 1;
                continue;
            }
            Lexical::Code => {}
        }

        match (c, next) {
            (b'/', b'/') => {
                state = Lexical::LineComment;
                i += 2;
                continue;
            }
            (b'/', b'*') => {
                state = Lexical::BlockComment;
                i += 2;
                continue;
            }
            (b'"', _) => {
                state = Lexical::Str;
                escape = false;
                i += 1;
                continue;
            }
            (b'\'', _) => {
                state = Lexical::Char;
                escape = false;
                i += 1;
                continue;
            }
            _ => {}
        }

        if body_depth > 0 {
            match c {
                b'{' => body_depth += 1,
                b'}' => {
                    body_depth -= 1;
                    if body_depth == 0 {
                        text.push(b'}');
                    }
                }
                _ => {}
            }
            i += 1;
            continue;
        }

        if c.is_ascii_whitespace() {
            text.space();
            i += 1;
            continue;
        }

        match c {
            b')' => pending_body = true,
            b';' => pending_body = false,
            b'{' if pending_body => {
                pending_body = false;
                body_depth = 1;
                body_lines.push(line);
            }
            _ => {}
        }
        text.push(c);
        i += 1;
    }

    let signature = HashBuilder::new()
        .str(filename)
        .bytes(&text.bytes)
        .finish();
    DeclarationSkeleton {
        signature,
        body_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(code: &str) -> ContentHash {
        declaration_skeleton("Foo.ino", code).signature
    }

    #[test]
    fn body_edits_keep_signature() {
        assert_eq!(sig("void f(){ a(); }"), sig("void f(){ b(); c(); }"));
    }

    #[test]
    fn signature_edits_change_signature() {
        assert_ne!(sig("void f(){}"), sig("void f(int x){}"));
    }

    #[test]
    fn trailing_comments_ignored() {
        assert_eq!(sig("void f(){} // first"), sig("void f(){} // second"));
        assert_eq!(sig("int a; /* x */ int b;"), sig("int a; /* yyy */ int b;"));
    }

    #[test]
    fn whitespace_collapsed() {
        assert_eq!(sig("void  f( ) {}"), sig("void f(\n) {}"));
    }

    #[test]
    fn braces_in_body_literals_do_not_end_body() {
        assert_eq!(
            sig("void f(){ s(\"}\"); c('}'); }\nint x;"),
            sig("void f(){ }\nint x;")
        );
    }

    #[test]
    fn non_function_braces_are_hashed() {
        assert_ne!(sig("struct A { int x; };"), sig("struct A { int y; };"));
    }

    #[test]
    fn filename_is_mixed_in() {
        let a = declaration_skeleton("a.ino", "void f(){}").signature;
        let b = declaration_skeleton("b.ino", "void f(){}").signature;
        assert_ne!(a, b);
    }

    #[test]
    fn body_lines_recorded() {
        let s = declaration_skeleton("Foo.ino", "int x;\n\nvoid setup() {\n}\nvoid loop() {}\n");
        assert_eq!(s.body_lines, vec![3, 5]);
    }

    #[test]
    fn layout_tracks_moved_definitions() {
        let a = declaration_skeleton("Foo.ino", "void f() {\n}\nvoid g() {}\n");
        let b = declaration_skeleton("Foo.ino", "void f() {\n\n}\nvoid g() {}\n");
        assert_eq!(a.signature, b.signature);
        assert_ne!(a.layout(), b.layout());
    }
}
