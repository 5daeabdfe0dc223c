//! Block structure: turns numbered lines into a nested program tree.
//!
//! `LOOP`, `GEN` and `DESC` open a block; `LOOPEND`, `GENEND`, `DESCEND` or
//! a bare `END` close the innermost open block. Every other line is a leaf.

use crate::core::error::{ErrorKind, ScriptError};
use crate::schema::command::{Block, BlockKind, Line, Node, Program};

struct OpenBlock {
    kind: BlockKind,
    opener: Line,
    body: Vec<Node>,
}

/// Parse program source text into a tree.
pub fn parse_source(source: &str) -> Result<Program, ScriptError> {
    parse_lines(Line::number_source(source))
}

/// Nest a flat line sequence into blocks.
///
/// The synthetic root is the `nodes` vector itself; the explicit stack holds
/// the blocks still waiting for a closer.
pub fn parse_lines(lines: Vec<Line>) -> Result<Program, ScriptError> {
    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<OpenBlock> = Vec::new();

    for line in lines {
        if let Some(kind) = BlockKind::from_opener(&line) {
            stack.push(OpenBlock {
                kind,
                opener: line,
                body: Vec::new(),
            });
            continue;
        }

        let node = if line.is_closer() {
            let open = stack.pop().ok_or_else(|| {
                ScriptError::new(
                    ErrorKind::UnmatchedCloser,
                    &line,
                    "too many END-style commands (LOOPEND, GENEND, DESCEND) reached",
                )
            })?;
            Node::Block(Block {
                kind: open.kind,
                opener: open.opener,
                body: open.body,
                closer: line,
            })
        } else {
            Node::Line(line)
        };

        match stack.last_mut() {
            Some(parent) => parent.body.push(node),
            None => root.push(node),
        }
    }

    if let Some(innermost) = stack.last() {
        let open = stack.len();
        return Err(ScriptError::new(
            ErrorKind::UnclosedBlock,
            &innermost.opener,
            "insufficient END-style commands compared to start-style commands",
        )
        .expected("an equal number of start-style and end-style commands")
        .actual(format!("{} extra starts or missing ends in your program", open)));
    }

    Ok(Program { nodes: root })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(program: &Program) -> Vec<String> {
        program.lines().iter().map(|l| l.text.clone()).collect()
    }

    #[test]
    fn flat_program_stays_flat() {
        let p = parse_source("FORMAT CPS\nNEWPARA\n# note").unwrap();
        assert_eq!(p.nodes.len(), 3);
        assert!(p.nodes.iter().all(|n| matches!(n, Node::Line(_))));
    }

    #[test]
    fn nested_blocks() {
        let src = "LOOP 2\nWRITE s w\nLOOP 3\nNEWLINE\nLOOPEND\nLOOPEND\nNEWPARA";
        let p = parse_source(src).unwrap();
        assert_eq!(p.nodes.len(), 2);
        let Node::Block(outer) = &p.nodes[0] else {
            panic!("expected block");
        };
        assert_eq!(outer.kind, BlockKind::Loop);
        assert_eq!(outer.opener.number, 1);
        assert_eq!(outer.closer.number, 6);
        assert_eq!(outer.body.len(), 2);
        let Node::Block(inner) = &outer.body[1] else {
            panic!("expected inner block");
        };
        assert_eq!(inner.opener.text, "LOOP 3");
        assert_eq!(inner.body, vec![Node::Line(Line::new(4, "NEWLINE"))]);
    }

    #[test]
    fn block_sequence_includes_opener_and_closer() {
        let p = parse_source("GEN hero 2 human\nmood 1 moods\nGENEND").unwrap();
        let Node::Block(block) = &p.nodes[0] else {
            panic!("expected block");
        };
        let seq = block.sequence();
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.first().map(|n| n.first_line().number), Some(1));
        assert_eq!(seq.last().map(|n| n.first_line().number), Some(3));
        assert_eq!(block.kind, BlockKind::Gen);
    }

    #[test]
    fn unmatched_closer_reports_its_line() {
        let err = parse_source("NEWLINE\nLOOPEND").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnmatchedCloser);
        assert_eq!(err.line, 2);
        assert_eq!(err.text, "LOOPEND");
    }

    #[test]
    fn unclosed_blocks_report_count() {
        let err = parse_source("LOOP 2\nDESC intro\nNEWLINE").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnclosedBlock);
        assert_eq!(err.line, 2);
        assert!(err.actual.as_deref().unwrap_or("").starts_with("2 extra"));
    }

    #[test]
    fn any_closer_closes_innermost() {
        let p = parse_source("LOOP\nDESC x\nNEWLINE\nEND\nGENEND").unwrap();
        let Node::Block(outer) = &p.nodes[0] else {
            panic!("expected block");
        };
        assert_eq!(outer.closer.text, "GENEND");
    }

    #[test]
    fn flatten_reproduces_source() {
        let src = "# intro\nLOOP 2\n\nGEN c 2\nname 1 names\nGENEND\nDESC d\nNEWLINE\nDESCEND\nLOOPEND\nCALL d";
        let p = parse_source(src).unwrap();
        let expected: Vec<String> = src.lines().map(|s| s.to_string()).collect();
        assert_eq!(texts(&p), expected);
    }
}
