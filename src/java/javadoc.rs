// SPDX-License-Identifier: MIT OR Apache-2.0

//! References inside `/** ... */` comments: `{@link ...}`, `{@linkplain ...}` and `@see`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::Span;

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\{@link(?:plain)?|@see)\s+(?P<type>[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)?(?:#(?P<member>[A-Za-z_$][\w$]*)(?P<args>\([^)]*\))?)?",
    )
    .expect("doc reference expression")
});

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z_$][\w$]*").expect("identifier expression"));

/// A dotted name with one span per segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocName {
    pub tokens: Vec<String>,
    pub spans: Vec<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocReference {
    pub type_name: Option<DocName>,
    pub member: Option<(String, Span)>,
    /// Parameter types of a method reference; `None` for fields.
    pub arguments: Option<Vec<DocName>>,
    /// The whole reference text.
    pub span: Span,
}

/// Scan comment text starting at byte `base` of the unit.
pub(crate) fn scan(comment: &str, base: usize) -> Vec<DocReference> {
    let mut references = Vec::new();
    for caps in REFERENCE.captures_iter(comment) {
        let type_name = caps.name("type").map(|m| dotted(m.as_str(), base + m.start()));
        let member = caps
            .name("member")
            .map(|m| (m.as_str().to_string(), Span::new(base + m.start(), base + m.end())));
        if type_name.is_none() && member.is_none() {
            continue;
        }
        let arguments = caps.name("args").map(|m| {
            let inner = m.as_str().trim_start_matches('(').trim_end_matches(')');
            let inner_base = base + m.start() + 1;
            let mut offset = 0;
            let mut args = Vec::new();
            for part in inner.split(',') {
                let trimmed = part.trim_start();
                let lead = part.len() - trimmed.len();
                // `int[] values` or `String name`: the type is the leading dotted word
                let word_end = trimmed
                    .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
                    .unwrap_or(trimmed.len());
                let type_text = &trimmed[..word_end];
                if !type_text.is_empty() {
                    args.push(dotted(type_text, inner_base + offset + lead));
                }
                offset += part.len() + 1;
            }
            args
        });
        let whole = caps.get(0).map(|m| Span::new(base + m.start(), base + m.end())).unwrap_or_default();
        references.push(DocReference {
            type_name,
            member,
            arguments,
            span: whole,
        });
    }
    references
}

fn dotted(text: &str, base: usize) -> DocName {
    let mut tokens = Vec::new();
    let mut spans = Vec::new();
    for m in IDENTIFIER.find_iter(text) {
        tokens.push(m.as_str().to_string());
        spans.push(Span::new(base + m.start(), base + m.end()));
    }
    DocName { tokens, spans }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_to_method_with_arguments() {
        let text = "/** See {@link Widget#foo(int, String)} */";
        let refs = scan(text, 100);
        assert_eq!(refs.len(), 1);
        let r = &refs[0];
        assert_eq!(r.type_name.as_ref().unwrap().tokens, vec!["Widget".to_string()]);
        let (member, span) = r.member.as_ref().unwrap();
        assert_eq!(member, "foo");
        assert_eq!(&text[span.start - 100..span.end - 100], "foo");
        let args = r.arguments.as_ref().unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args[1].tokens, vec!["String".to_string()]);
        assert_eq!(&text[args[1].spans[0].start - 100..args[1].spans[0].end - 100], "String");
    }

    #[test]
    fn see_tag_with_qualified_type_and_field() {
        let refs = scan("/**\n * @see com.acme.Widget#count\n */", 0);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].type_name.as_ref().unwrap().tokens.len(), 3);
        assert!(refs[0].arguments.is_none());
        assert_eq!(refs[0].member.as_ref().unwrap().0, "count");
    }

    #[test]
    fn member_of_current_type() {
        let refs = scan("/** {@link #run()} */", 0);
        assert!(refs[0].type_name.is_none());
        assert_eq!(refs[0].arguments.as_ref().map(Vec::len), Some(0));
    }
}
