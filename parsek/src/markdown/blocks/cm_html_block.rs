// CommonMark HTML blocks
//
// A seven-way start classifier on the first line decides the end condition:
// types 1-5 run until a line containing their terminator (that line is part
// of the block), types 6 and 7 run until a blank line (left unconsumed).
// Type 7 additionally requires the rest of its first line to be blank and
// cannot interrupt a paragraph.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::Block;
use crate::markdown::blocks::{is_blank, line_at, MdParser};
use crate::markdown::inlines::cm_raw_html::{close_tag_regex, open_tag_regex};

// Tag names opening a type 6 block, per the CommonMark spec.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body",
    "caption", "center", "col", "colgroup", "dd", "details", "dialog", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form",
    "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header",
    "hr", "html", "iframe", "legend", "li", "link", "main", "menu", "menuitem",
    "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead",
    "title", "tr", "track", "ul",
];

// Raw-content tag names opening a type 1 block.
const RAW_CONTENT_TAGS: &[&str] = &["pre", "script", "style", "textarea"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HtmlBlockKind {
    /// Raw-content element; ends on the line with its matching closing tag.
    RawContent(String),
    Comment,
    ProcessingInstruction,
    Declaration,
    Cdata,
    BlockTag,
    CompleteTag,
}

pub(crate) fn html_block() -> MdParser<Block> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let tokens = input.tokens();
        let start = input.index();
        let first = line_at(tokens, start);
        let kind = match classify_start(&first.text) {
            Some(kind) => kind,
            None => return ParseResult::failure("HTML block", input),
        };
        log::debug!("HTML block ({:?}): {:?}", kind, first.text);

        let mut literal = String::new();
        let mut pos = start;
        let mut consumed = start;

        loop {
            if pos >= tokens.len() {
                break;
            }
            let line = line_at(tokens, pos);
            match &kind {
                HtmlBlockKind::BlockTag | HtmlBlockKind::CompleteTag => {
                    if is_blank(&line.text) {
                        break;
                    }
                    push_line(&mut literal, &line);
                    consumed = line.next_start;
                    pos = line.next_start;
                }
                _ => {
                    push_line(&mut literal, &line);
                    consumed = line.next_start;
                    pos = line.next_start;
                    if line_terminates(&line.text, &kind) {
                        break;
                    }
                }
            }
        }

        input
            .context()
            .emit(start..consumed, HighlightKind::HtmlBlock);
        let next = input.at_index(consumed);
        ParseResult::success(Block::HtmlBlock { literal }, next)
    })
}

fn push_line(literal: &mut String, line: &super::Line) {
    literal.push_str(&line.text);
    // Source line endings normalise to a single newline; a final line at end
    // of input contributes none.
    if line.next_start > line.content_end {
        literal.push('\n');
    }
}

fn line_terminates(line: &str, kind: &HtmlBlockKind) -> bool {
    let lower = line.to_lowercase();
    match kind {
        HtmlBlockKind::RawContent(name) => lower.contains(&format!("</{}>", name)),
        HtmlBlockKind::Comment => line.contains("-->"),
        HtmlBlockKind::ProcessingInstruction => line.contains("?>"),
        HtmlBlockKind::Declaration => line.contains('>'),
        HtmlBlockKind::Cdata => line.contains("]]>"),
        HtmlBlockKind::BlockTag | HtmlBlockKind::CompleteTag => false,
    }
}

/// Classify the start condition of `line`, types 1 through 7 in order.
pub(crate) fn classify_start(line: &str) -> Option<HtmlBlockKind> {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 || !trimmed.starts_with('<') {
        return None;
    }
    let lower = trimmed.to_lowercase();

    // Type 1: <pre, <script, <style, <textarea + whitespace / > / end of line
    for name in RAW_CONTENT_TAGS {
        if let Some(rest) = lower.strip_prefix('<').and_then(|t| t.strip_prefix(name)) {
            if matches!(rest.chars().next(), None | Some(' ') | Some('\t') | Some('>')) {
                return Some(HtmlBlockKind::RawContent(name.to_string()));
            }
        }
    }
    // Type 2: comment
    if trimmed.starts_with("<!--") {
        return Some(HtmlBlockKind::Comment);
    }
    // Type 3: processing instruction
    if trimmed.starts_with("<?") {
        return Some(HtmlBlockKind::ProcessingInstruction);
    }
    // Type 4: declaration, <! followed by an ASCII uppercase letter
    if let Some(rest) = trimmed.strip_prefix("<!") {
        if rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return Some(HtmlBlockKind::Declaration);
        }
    }
    // Type 5: CDATA
    if trimmed.starts_with("<![CDATA[") {
        return Some(HtmlBlockKind::Cdata);
    }
    // Type 6: block-level tag name after < or </
    let after_angle = lower
        .strip_prefix("</")
        .or_else(|| lower.strip_prefix('<'));
    if let Some(rest) = after_angle {
        for name in BLOCK_TAGS {
            if let Some(after_name) = rest.strip_prefix(name) {
                let delimited = match after_name.chars().next() {
                    None | Some(' ') | Some('\t') | Some('>') => true,
                    Some('/') => after_name[1..].starts_with('>'),
                    _ => false,
                };
                if delimited {
                    return Some(HtmlBlockKind::BlockTag);
                }
            }
        }
    }
    // Type 7: a single complete tag with only whitespace after it
    let tag_end = if let Some(m) = close_tag_regex().find(trimmed) {
        Some(m.end())
    } else if !RAW_CONTENT_TAGS
        .iter()
        .any(|name| lower.starts_with(&format!("<{}", name)))
    {
        open_tag_regex().find(trimmed).map(|m| m.end())
    } else {
        None
    };
    if let Some(end) = tag_end {
        // The tag regexes allow embedded newlines; a block start must close
        // on its own line.
        let matched = &trimmed[..end];
        if !matched.contains('\n') && trimmed[end..].chars().all(|c| c == ' ' || c == '\t') {
            return Some(HtmlBlockKind::CompleteTag);
        }
    }
    None
}

/// Types 1-6 may interrupt a paragraph; type 7 may not.
pub(crate) fn interrupts_paragraph(line: &str) -> bool {
    matches!(
        classify_start(line),
        Some(
            HtmlBlockKind::RawContent(_)
                | HtmlBlockKind::Comment
                | HtmlBlockKind::ProcessingInstruction
                | HtmlBlockKind::Declaration
                | HtmlBlockKind::Cdata
                | HtmlBlockKind::BlockTag
        )
    )
}
