use super::Error;
use crate::error;

/// A typed placeholder inserted into a source line during tagging.
/// Keyword and operator tags carry their binary token code; the rest
/// carry an index into the relevant pool or table.
#[derive(Debug, PartialEq, Clone)]
pub enum Tag {
    Keyword(u16),
    Raw(usize),
    Str(usize),
    Comment(usize),
    Number(usize),
    LabelDef(usize),
    LabelRef(usize),
    Var(usize),
    Operator(u16),
}

/// One element of a packed line: a literal character or a tag.
#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Char(char),
    Tag(Tag),
}

impl Tag {
    fn kind_char(&self) -> char {
        use Tag::*;
        match self {
            Keyword(_) => 'r',
            Raw(_) => 'a',
            Str(_) => 's',
            Comment(_) => 'c',
            Number(_) => 'n',
            LabelDef(_) => 'l',
            LabelRef(_) => 'g',
            Var(_) => 'v',
            Operator(_) => 'o',
        }
    }

    fn id(&self) -> usize {
        use Tag::*;
        match self {
            Keyword(code) | Operator(code) => *code as usize,
            Raw(id) | Str(id) | Comment(id) | Number(id) | LabelDef(id) | LabelRef(id)
            | Var(id) => *id,
        }
    }

    /// The in-line text form, e.g. `{r:153}`.
    pub fn marker(&self) -> String {
        format!("{{{}:{}}}", self.kind_char(), self.id())
    }

    fn from_parts(kind: char, id: usize) -> Option<Tag> {
        use Tag::*;
        let code = if id <= u16::max_value() as usize {
            id as u16
        } else {
            return None;
        };
        match kind {
            'r' => Some(Keyword(code)),
            'a' => Some(Raw(id)),
            's' => Some(Str(id)),
            'c' => Some(Comment(id)),
            'n' => Some(Number(id)),
            'l' => Some(LabelDef(id)),
            'g' => Some(LabelRef(id)),
            'v' => Some(Var(id)),
            'o' => Some(Operator(code)),
            _ => None,
        }
    }
}

/// Converts a tagged line into its final node sequence. A malformed
/// marker means a tagging bug, never a user error.
pub fn pack(line: &str) -> Result<Vec<Node>, Error> {
    let mut nodes: Vec<Node> = vec![];
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '{' {
            nodes.push(Node::Char(c));
            continue;
        }
        let kind = chars
            .next()
            .ok_or_else(|| error!(InternalError; "INVALID TAG"))?;
        if chars.next() != Some(':') {
            return Err(error!(InternalError; "INVALID TAG"));
        }
        let mut id = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(d) => id.push(d),
                None => return Err(error!(InternalError; "INVALID TAG")),
            }
        }
        let id = id
            .parse::<usize>()
            .map_err(|_| error!(InternalError; "INVALID TAG"))?;
        match Tag::from_parts(kind, id) {
            Some(tag) => nodes.push(Node::Tag(tag)),
            None => return Err(error!(InternalError; "INVALID TAG")),
        }
    }
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_round_trip() {
        let tags = vec![
            Tag::Keyword(153),
            Tag::Keyword(0x84ce),
            Tag::Raw(1),
            Tag::Str(0),
            Tag::Comment(2),
            Tag::Number(3),
            Tag::LabelDef(0),
            Tag::LabelRef(0),
            Tag::Var(4),
            Tag::Operator(178),
        ];
        let line: String = tags.iter().map(|t| t.marker()).collect();
        let nodes = pack(&line).unwrap();
        let expected: Vec<Node> = tags.into_iter().map(Node::Tag).collect();
        assert_eq!(nodes, expected);
    }

    #[test]
    fn test_pack_mixed() {
        let nodes = pack("AA{o:178}1 {c:0}").unwrap();
        assert_eq!(
            nodes,
            vec![
                Node::Char('A'),
                Node::Char('A'),
                Node::Tag(Tag::Operator(178)),
                Node::Char('1'),
                Node::Char(' '),
                Node::Tag(Tag::Comment(0)),
            ]
        );
    }

    #[test]
    fn test_pack_rejects_malformed() {
        assert!(pack("{r153}").is_err());
        assert!(pack("{r:153").is_err());
        assert!(pack("{x:1}").is_err());
        assert!(pack("{r:}").is_err());
    }
}
