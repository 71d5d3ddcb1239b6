// CommonMark ATX heading
//
// 0-3 leading spaces, 1-6 hashes, then a space/tab or end of line. The
// content is trimmed, an optional closing hash run (preceded by a space or
// tab) is stripped, and the result is staged as raw text for the inline
// pass.

use crate::combinator::{ParseResult, Parser, ParserInput};
use crate::highlight::{HighlightContext, HighlightKind};
use crate::markdown::ast::{Block, InlineContent};
use crate::markdown::blocks::{line_at, MdParser};

pub(crate) fn atx_heading() -> MdParser<Block> {
    Parser::new(|input: ParserInput<char, HighlightContext>| {
        let start = input.index();
        let line = line_at(input.tokens(), start);
        let chars: Vec<char> = line.text.chars().collect();

        let mut i = 0;
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        if i > 3 {
            return ParseResult::failure("ATX heading", input);
        }
        let hash_start = i;
        while i < chars.len() && chars[i] == '#' {
            i += 1;
        }
        let level = i - hash_start;
        if level == 0 || level > 6 {
            return ParseResult::failure("ATX heading", input);
        }
        if i < chars.len() && chars[i] != ' ' && chars[i] != '\t' {
            // No separator: "#hashtag" is a paragraph
            return ParseResult::failure("ATX heading", input);
        }

        while i < chars.len() && (chars[i] == ' ' || chars[i] == '\t') {
            i += 1;
        }
        let content_start = i;
        let mut content_end = chars.len();
        while content_end > content_start
            && (chars[content_end - 1] == ' ' || chars[content_end - 1] == '\t')
        {
            content_end -= 1;
        }

        // Strip a closing hash run when a space/tab precedes it (or when the
        // content is nothing but hashes).
        let mut run_start = content_end;
        while run_start > content_start && chars[run_start - 1] == '#' {
            run_start -= 1;
        }
        if run_start < content_end
            && (run_start == content_start
                || chars[run_start - 1] == ' '
                || chars[run_start - 1] == '\t')
        {
            content_end = run_start;
            while content_end > content_start
                && (chars[content_end - 1] == ' ' || chars[content_end - 1] == '\t')
            {
                content_end -= 1;
            }
        }

        let content: String = chars[content_start..content_end].iter().collect();
        log::debug!("ATX heading level {}: {:?}", level, content);

        let context = input.context().clone();
        context.emit(
            start + hash_start..start + hash_start + level,
            HighlightKind::HeadingMarker,
        );
        if content_end > content_start {
            context.emit(
                start + content_start..start + content_end,
                HighlightKind::HeadingText,
            );
        }

        let next = input.at_index(line.next_start);
        ParseResult::success(
            Block::Heading {
                level: level as u8,
                content: InlineContent::raw(content),
            },
            next,
        )
    })
}

pub(crate) fn is_atx_heading_line(line: &str) -> bool {
    let trimmed = line.trim_start_matches(' ');
    if line.len() - trimmed.len() > 3 {
        return false;
    }
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&hashes) {
        return false;
    }
    matches!(
        trimmed.chars().nth(hashes),
        None | Some(' ') | Some('\t')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::ParserInput;
    use crate::highlight::HighlightContext;

    fn parse_heading(text: &str) -> Option<(u8, String)> {
        let input = ParserInput::from_text(text, HighlightContext::default());
        match atx_heading().parse(input) {
            ParseResult::Success { value, .. } => match value {
                Block::Heading {
                    level,
                    content: InlineContent::Raw(raw),
                } => Some((level, raw)),
                _ => None,
            },
            ParseResult::Failure { .. } => None,
        }
    }

    #[test]
    fn smoke_test_atx_levels() {
        assert_eq!(parse_heading("# one\n"), Some((1, "one".into())));
        assert_eq!(parse_heading("###### six\n"), Some((6, "six".into())));
        assert_eq!(parse_heading("####### seven\n"), None);
    }

    #[test]
    fn smoke_test_atx_requires_separator() {
        assert_eq!(parse_heading("#hashtag\n"), None);
        assert_eq!(parse_heading("#\n"), Some((1, String::new())));
    }

    #[test]
    fn smoke_test_atx_closing_run() {
        assert_eq!(parse_heading("## foo ##\n"), Some((2, "foo".into())));
        assert_eq!(parse_heading("# foo#\n"), Some((1, "foo#".into())));
        assert_eq!(parse_heading("### foo ### b\n"), Some((3, "foo ### b".into())));
        assert_eq!(parse_heading("## #\n"), Some((2, String::new())));
    }

    #[test]
    fn smoke_test_atx_leading_spaces() {
        assert_eq!(parse_heading("   # ok\n"), Some((1, "ok".into())));
        assert_eq!(parse_heading("    # code\n"), None);
    }
}
