use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of a program. Line numbers start at 1 and the text is stored
/// trimmed, exactly as the interpreter sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub number: usize,
    pub text: String,
}

impl Line {
    pub fn new(number: usize, text: impl AsRef<str>) -> Self {
        Self {
            number,
            text: text.as_ref().trim().to_string(),
        }
    }

    /// Number every line of a program source, starting at 1.
    pub fn number_source(source: &str) -> Vec<Line> {
        source
            .lines()
            .enumerate()
            .map(|(i, text)| Line::new(i + 1, text))
            .collect()
    }

    /// The first whitespace-separated word, uppercased. Empty for blank lines.
    pub fn keyword(&self) -> String {
        self.text
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_uppercase()
    }

    /// Everything after the first word, trimmed.
    pub fn params(&self) -> &str {
        match self.text.find(char::is_whitespace) {
            Some(idx) => self.text[idx..].trim(),
            None => "",
        }
    }

    /// The parameters split on whitespace.
    pub fn param_words(&self) -> Vec<&str> {
        self.params().split_whitespace().collect()
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_comment(&self) -> bool {
        self.text.starts_with('#')
    }

    /// True for `LOOPEND`, `GENEND`, `DESCEND` and a bare `END`.
    pub fn is_closer(&self) -> bool {
        let upper = self.text.to_uppercase();
        upper.starts_with("LOOPEND")
            || upper.starts_with("GENEND")
            || upper.starts_with("DESCEND")
            || upper == "END"
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.number, self.text)
    }
}

/// The three kinds of block a program can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// `LOOP ... LOOPEND`: replay the body.
    Loop,
    /// `GEN ... GENEND`: generate an entity group.
    Gen,
    /// `DESC ... DESCEND`: store a snippet for `CALL`.
    Desc,
}

impl BlockKind {
    pub fn from_opener(line: &Line) -> Option<Self> {
        match line.keyword().as_str() {
            "LOOP" => Some(Self::Loop),
            "GEN" => Some(Self::Gen),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Loop => "LOOP",
            Self::Gen => "GEN",
            Self::Desc => "DESC",
        }
    }
}

/// The fixed command surface. Block keywords are included so that the
/// linter and error messages can name them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Display,
    Write,
    Format,
    NewLine,
    NewPara,
    NewChapter,
    AssignList,
    AssignCatalog,
    AssignGen,
    WordJoin,
    UpCase,
    LowCase,
    SupCase,
    SlowCase,
    RefGender,
    Recite,
    Shift,
    Shuffle,
    Call,
    Gen,
    GenEnd,
    Loop,
    LoopEnd,
    Desc,
    DescEnd,
}

impl Keyword {
    pub const ALL: [Keyword; 25] = [
        Self::Display,
        Self::Write,
        Self::Format,
        Self::NewLine,
        Self::NewPara,
        Self::NewChapter,
        Self::AssignList,
        Self::AssignCatalog,
        Self::AssignGen,
        Self::WordJoin,
        Self::UpCase,
        Self::LowCase,
        Self::SupCase,
        Self::SlowCase,
        Self::RefGender,
        Self::Recite,
        Self::Shift,
        Self::Shuffle,
        Self::Call,
        Self::Gen,
        Self::GenEnd,
        Self::Loop,
        Self::LoopEnd,
        Self::Desc,
        Self::DescEnd,
    ];

    /// Case-insensitive lookup of a command word.
    pub fn parse(word: &str) -> Option<Self> {
        let upper = word.to_uppercase();
        Self::ALL.iter().copied().find(|k| k.name() == upper)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Display => "DISPLAY",
            Self::Write => "WRITE",
            Self::Format => "FORMAT",
            Self::NewLine => "NEWLINE",
            Self::NewPara => "NEWPARA",
            Self::NewChapter => "NEWCHAPTER",
            Self::AssignList => "ASSIGNLIST",
            Self::AssignCatalog => "ASSIGNCATALOG",
            Self::AssignGen => "ASSIGNGEN",
            Self::WordJoin => "WORDJOIN",
            Self::UpCase => "UPCASE",
            Self::LowCase => "LOWCASE",
            Self::SupCase => "SUPCASE",
            Self::SlowCase => "SLOWCASE",
            Self::RefGender => "REFGENDER",
            Self::Recite => "RECITE",
            Self::Shift => "SHIFT",
            Self::Shuffle => "SHUFFLE",
            Self::Call => "CALL",
            Self::Gen => "GEN",
            Self::GenEnd => "GENEND",
            Self::Loop => "LOOP",
            Self::LoopEnd => "LOOPEND",
            Self::Desc => "DESC",
            Self::DescEnd => "DESCEND",
        }
    }

    /// Block keywords are handled structurally, never dispatched as leaves.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Gen | Self::GenEnd | Self::Loop | Self::LoopEnd | Self::Desc | Self::DescEnd
        )
    }
}

/// A node of the parsed program tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Line(Line),
    Block(Block),
}

impl Node {
    /// The first source line of this node.
    pub fn first_line(&self) -> &Line {
        match self {
            Node::Line(line) => line,
            Node::Block(block) => &block.opener,
        }
    }

    /// In-order flattening back to source lines.
    pub fn flatten_into<'a>(&'a self, out: &mut Vec<&'a Line>) {
        match self {
            Node::Line(line) => out.push(line),
            Node::Block(block) => {
                out.push(&block.opener);
                for node in &block.body {
                    node.flatten_into(out);
                }
                out.push(&block.closer);
            }
        }
    }
}

/// A block with its opening and closing lines. `body` holds everything in
/// between, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub opener: Line,
    pub body: Vec<Node>,
    pub closer: Line,
}

impl Block {
    /// The full node sequence of this block: opener, body, closer.
    pub fn sequence(&self) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(self.body.len() + 2);
        nodes.push(Node::Line(self.opener.clone()));
        nodes.extend(self.body.iter().cloned());
        nodes.push(Node::Line(self.closer.clone()));
        nodes
    }
}

/// A parsed program: the children of the synthetic root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Program {
    pub nodes: Vec<Node>,
}

impl Program {
    /// Flatten the tree back into its source lines.
    pub fn lines(&self) -> Vec<&Line> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.flatten_into(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_and_params() {
        let line = Line::new(4, "  write   sfolder wfolder 3  ");
        assert_eq!(line.keyword(), "WRITE");
        assert_eq!(line.params(), "sfolder wfolder 3");
        assert_eq!(line.param_words(), vec!["sfolder", "wfolder", "3"]);
    }

    #[test]
    fn single_word_line_has_no_params() {
        let line = Line::new(1, "NEWPARA");
        assert_eq!(line.keyword(), "NEWPARA");
        assert_eq!(line.params(), "");
    }

    #[test]
    fn openers_and_closers() {
        assert_eq!(BlockKind::from_opener(&Line::new(1, "loop 5")), Some(BlockKind::Loop));
        assert_eq!(BlockKind::from_opener(&Line::new(1, "GEN")), Some(BlockKind::Gen));
        assert_eq!(BlockKind::from_opener(&Line::new(1, "desc intro")), Some(BlockKind::Desc));
        assert_eq!(BlockKind::from_opener(&Line::new(1, "LOOPEND")), None);
        assert_eq!(BlockKind::from_opener(&Line::new(1, "looping 3")), None);

        assert!(Line::new(1, "loopend").is_closer());
        assert!(Line::new(1, "GENEND").is_closer());
        assert!(Line::new(1, "descend").is_closer());
        assert!(Line::new(1, "end").is_closer());
        assert!(!Line::new(1, "ending").is_closer());
    }

    #[test]
    fn keyword_parse_is_case_insensitive() {
        assert_eq!(Keyword::parse("assignlist"), Some(Keyword::AssignList));
        assert_eq!(Keyword::parse("ReFgEnDeR"), Some(Keyword::RefGender));
        assert_eq!(Keyword::parse("PRINT"), None);
        assert!(Keyword::Loop.is_structural());
        assert!(!Keyword::Write.is_structural());
    }

    #[test]
    fn number_source_starts_at_one() {
        let lines = Line::number_source("a\n\n  b  ");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], Line::new(1, "a"));
        assert!(lines[1].is_blank());
        assert_eq!(lines[2].text, "b");
    }
}
