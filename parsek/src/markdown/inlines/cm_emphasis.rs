// CommonMark emphasis and strong emphasis
//
// Two halves: classifying delimiter runs while tokenising (flanking rules
// over the chars around the run), and the left-to-right matching walk over
// the finished token stream. The walk works on an index-addressed node
// arena plus a stack of arena indices, so delimiter identity is positional
// rather than by value.

use crate::combinator::text::{is_unicode_punctuation, is_unicode_whitespace};
use crate::highlight::HighlightKind;
use crate::markdown::ast::Inline;
use crate::markdown::blocks::MdInput;
use crate::markdown::inlines::InlineToken;

/// Scan a `*`/`_` run at the cursor and classify it. The chars on both
/// sides drive the flanking rules; the ends of the input count as newlines.
pub(crate) fn scan_delimiter_run(input: &MdInput) -> Option<(InlineToken, MdInput)> {
    let tokens = input.tokens();
    let start = input.index();
    let delim = match tokens.get(start) {
        Some(&c) if c == '*' || c == '_' => c,
        _ => return None,
    };
    let mut end = start;
    while tokens.get(end) == Some(&delim) {
        end += 1;
    }
    let count = end - start;

    let before = if start == 0 { '\n' } else { tokens[start - 1] };
    let after = if end >= tokens.len() { '\n' } else { tokens[end] };

    let left_flanking = !is_unicode_whitespace(after)
        && (!is_unicode_punctuation(after)
            || is_unicode_whitespace(before)
            || is_unicode_punctuation(before));
    let right_flanking = !is_unicode_whitespace(before)
        && (!is_unicode_punctuation(before)
            || is_unicode_whitespace(after)
            || is_unicode_punctuation(after));

    let (can_open, can_close) = if delim == '*' {
        (left_flanking, right_flanking)
    } else {
        (
            left_flanking && (!right_flanking || is_unicode_punctuation(before)),
            right_flanking && (!left_flanking || is_unicode_punctuation(after)),
        )
    };

    let kind = if count >= 2 {
        HighlightKind::StrongMarker
    } else {
        HighlightKind::EmphasisMarker
    };
    input.context().emit(start..end, kind);

    log::trace!(
        "delimiter run {}x{:?}: open={}, close={}",
        count,
        delim,
        can_open,
        can_close
    );
    Some((
        InlineToken::Delim {
            ch: delim,
            count,
            can_open,
            can_close,
        },
        input.at_index(end),
    ))
}

#[derive(Debug, Clone)]
struct DelimEntry {
    ch: char,
    remaining: usize,
    original: usize,
    can_open: bool,
    can_close: bool,
}

#[derive(Debug, Clone)]
enum NodeEntry {
    Content(Inline),
    Delim(DelimEntry),
}

/// The rule of 3: when either endpoint of a candidate pair can both open
/// and close, the pair is rejected if the original lengths sum to a
/// multiple of 3, unless both are themselves multiples of 3.
fn passes_rule_of_three(opener: &DelimEntry, closer: &DelimEntry) -> bool {
    let either_both = (opener.can_open && opener.can_close)
        || (closer.can_open && closer.can_close);
    if !either_both {
        return true;
    }
    (opener.original + closer.original) % 3 != 0
        || (opener.original % 3 == 0 && closer.original % 3 == 0)
}

fn delim(nodes: &[NodeEntry], index: usize) -> &DelimEntry {
    match &nodes[index] {
        NodeEntry::Delim(entry) => entry,
        NodeEntry::Content(_) => unreachable!("stack points at content node"),
    }
}

fn delim_mut(nodes: &mut [NodeEntry], index: usize) -> &mut DelimEntry {
    match &mut nodes[index] {
        NodeEntry::Delim(entry) => entry,
        NodeEntry::Content(_) => unreachable!("stack points at content node"),
    }
}

/// Run the matching walk over the token stream, producing the final inline
/// sequence. Unconsumed delimiter chars degrade to literal text.
pub(crate) fn process_delimiters(stream: Vec<InlineToken>) -> Vec<Inline> {
    let mut nodes: Vec<NodeEntry> = stream
        .into_iter()
        .map(|token| match token {
            InlineToken::Node(inline) => NodeEntry::Content(inline),
            InlineToken::Delim {
                ch,
                count,
                can_open,
                can_close,
            } => NodeEntry::Delim(DelimEntry {
                ch,
                remaining: count,
                original: count,
                can_open,
                can_close,
            }),
        })
        .collect();
    let mut stack: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter_map(|(i, node)| matches!(node, NodeEntry::Delim(_)).then_some(i))
        .collect();

    let mut i = 0;
    while i < stack.len() {
        let ci = stack[i];
        let closer = delim(&nodes, ci).clone();
        if !closer.can_close || closer.remaining == 0 {
            if closer.can_open && closer.remaining > 0 {
                i += 1;
            } else {
                stack.remove(i);
            }
            continue;
        }

        // Search backward for the nearest eligible opener.
        let mut opener_stack_pos = None;
        for j in (0..i).rev() {
            let candidate = delim(&nodes, stack[j]);
            if candidate.ch == closer.ch
                && candidate.can_open
                && candidate.remaining > 0
                && passes_rule_of_three(candidate, &closer)
            {
                opener_stack_pos = Some(j);
                break;
            }
        }
        let j = match opener_stack_pos {
            Some(j) => j,
            None => {
                if closer.can_open {
                    i += 1;
                } else {
                    stack.remove(i);
                }
                continue;
            }
        };

        let oi = stack[j];
        let strength = if delim(&nodes, oi).remaining >= 2 && delim(&nodes, ci).remaining >= 2 {
            2
        } else {
            1
        };
        delim_mut(&mut nodes, oi).remaining -= strength;
        delim_mut(&mut nodes, ci).remaining -= strength;
        log::trace!(
            "matched {}x{:?} at nodes {}..{}",
            strength,
            closer.ch,
            oi,
            ci
        );

        // Inner content; leftover delimiters inside become literal text.
        let mut children = Vec::new();
        for node in &nodes[oi + 1..ci] {
            match node {
                NodeEntry::Content(inline) => children.push(inline.clone()),
                NodeEntry::Delim(entry) => {
                    if entry.remaining > 0 {
                        children.push(Inline::Text {
                            literal: entry.ch.to_string().repeat(entry.remaining),
                        });
                    }
                }
            }
        }
        let wrapped = if strength == 2 {
            Inline::StrongEmphasis { children }
        } else {
            Inline::Emphasis { children }
        };

        // Collapse the inner span to the one wrapped node and re-aim the
        // stack's arena indices.
        let old_span = ci - oi - 1;
        nodes.splice(oi + 1..ci, std::iter::once(NodeEntry::Content(wrapped)));
        let delta = old_span as isize - 1;
        stack.retain(|&n| n <= oi || n >= ci);
        for n in stack.iter_mut() {
            if *n >= ci {
                *n = (*n as isize - delta) as usize;
            }
        }
        let mut ci_now = (ci as isize - delta) as usize;

        i = j + 1;
        if delim(&nodes, oi).remaining == 0 {
            nodes.remove(oi);
            stack.remove(j);
            for n in stack.iter_mut() {
                if *n > oi {
                    *n -= 1;
                }
            }
            i = j;
            ci_now -= 1;
        }
        if delim(&nodes, ci_now).remaining == 0 {
            if let Some(pos) = stack.iter().position(|&n| n == ci_now) {
                stack.remove(pos);
            }
            nodes.remove(ci_now);
            for n in stack.iter_mut() {
                if *n > ci_now {
                    *n -= 1;
                }
            }
        }
    }

    nodes
        .into_iter()
        .filter_map(|node| match node {
            NodeEntry::Content(inline) => Some(inline),
            NodeEntry::Delim(entry) => (entry.remaining > 0).then(|| Inline::Text {
                literal: entry.ch.to_string().repeat(entry.remaining),
            }),
        })
        .collect()
}
