//! GTD list library: turns an indentation-structured to-do list into a forest of
//! goals, tasks, and notes, and exposes read-model projectors over that forest.
//!
//! Pipeline, leaf-first:
//! - `dedent`: indented text into a marker stream (`=`, `>`, `<` lines).
//! - `indent`: marker stream into a nested tree of raw lines.
//! - `grammar`: raw lines into `Task`/`Note` values.
//! - `builder`: raw tree into a flat list of unlinked tasks.
//! - `forest`: synthesizes missing goals and links everything into one forest.
//! - `projectors` / `format`: filtered views and their presentation.

pub mod error {
    use thiserror::Error;

    /// Every way loading a list can fail. There is no partial recovery: any of
    /// these aborts the whole load.
    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum GtdError {
        #[error("parse error in {line:?}: {reason} (tokens: {tokens:?})")]
        Parse {
            line: String,
            tokens: Vec<String>,
            reason: String,
        },

        #[error("cannot split {line:?} into words: {reason}")]
        Tokenize { line: String, reason: String },

        #[error("invalid input event {event:?} on line {line_no}: {line:?} (value: {value:?})")]
        IndentEvent {
            line_no: usize,
            line: String,
            event: String,
            value: String,
        },

        #[error("malformed nesting on line {line_no}: {reason}")]
        IndentStructure { line_no: usize, reason: String },

        #[error("inconsistent indentation on line {line_no}: {reason}")]
        Dedent { line_no: usize, reason: String },

        #[error("task {description:?} declares goals {declared:?} but is nested under {derived:?}")]
        Consistency {
            description: String,
            declared: Vec<String>,
            derived: Vec<String>,
        },

        #[error("description {description:?} is used by more than one entry")]
        DuplicateDescription { description: String },

        #[error("goal chain through {description:?} is cyclic")]
        CyclicGoal { description: String },

        #[error("no entry with description {description:?}")]
        NotFound { description: String },
    }

    impl GtdError {
        pub(crate) fn parse(line: &str, tokens: &[String], reason: impl Into<String>) -> Self {
            Self::Parse {
                line: line.to_string(),
                tokens: tokens.to_vec(),
                reason: reason.into(),
            }
        }
    }

    pub type Result<T, E = GtdError> = std::result::Result<T, E>;
}

pub mod core {
    use serde::Serialize;
    use std::hash::{Hash, Hasher};

    /* ------------------------------- IDs ------------------------------- */

    /// Arena index of a node inside a `Forest`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
    #[serde(transparent)]
    pub struct NodeId(pub usize);

    /* ---------------------------- Value Objects ---------------------------- */

    /// Free-text task state such as `done`, `urgent` or `delegated to Bob`.
    ///
    /// The empty status is the "no status" instance every task starts with.
    #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
    #[serde(transparent)]
    pub struct Status(String);

    impl Status {
        pub fn new(text: impl Into<String>) -> Self {
            Self(text.into())
        }

        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        /// A `false` here does not imply the task is open; rare statuses are neither.
        pub fn done(&self) -> bool {
            matches!(
                self.0.to_lowercase().as_str(),
                "done" | "complete" | "finished"
            )
        }

        pub fn urgent(&self) -> bool {
            self.0.to_lowercase() == "urgent"
        }

        pub fn delegated(&self) -> bool {
            self.0.to_lowercase().starts_with("delegated")
        }

        /// Who the task was handed to: every word after the first, minus a leading `to`.
        pub fn delegated_to(&self) -> Option<String> {
            if !self.delegated() {
                return None;
            }
            let mut words = self.0.split_whitespace().skip(1).peekable();
            if words.peek() == Some(&"to") {
                words.next();
            }
            Some(words.collect::<Vec<_>>().join(" "))
        }
    }

    /// Free-text annotation owned by exactly one task or goal.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct Note {
        pub note: String,
    }

    /* ------------------------------ Entities ------------------------------ */

    /// A task as written in the list, before goal resolution.
    ///
    /// Identity is the description alone; descriptions are unique across a list.
    #[derive(Debug, Clone, Serialize)]
    pub struct Task {
        pub description: String,
        pub context: Option<String>,
        pub status: Status,
        /// Ancestor goal descriptions, nearest last.
        pub goals: Vec<String>,
        pub notes: Vec<Note>,
    }

    impl Task {
        pub fn new(description: impl Into<String>) -> Self {
            Self {
                description: description.into(),
                context: None,
                status: Status::default(),
                goals: vec![],
                notes: vec![],
            }
        }

        pub fn immediate_goal(&self) -> Option<&str> {
            self.goals.last().map(String::as_str)
        }
    }

    impl PartialEq for Task {
        fn eq(&self, other: &Self) -> bool {
            self.description == other.description
        }
    }

    impl Eq for Task {}

    impl Hash for Task {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.description.hash(state);
        }
    }

    /// Style class handed to the graph renderer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Formatting {
        Done,
        Delegated,
        Urgent,
        Default,
        Goal,
    }

    impl Formatting {
        pub fn dot_attributes(self) -> &'static str {
            match self {
                Formatting::Done => "[color=blue]",
                Formatting::Delegated => "[color=yellow]",
                Formatting::Urgent => "[color=red, fillcolor=red, style=filled]",
                Formatting::Default => "[color=red]",
                Formatting::Goal => "[color=green]",
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum NodeKind {
        Task {
            context: Option<String>,
            status: Status,
        },
        /// Goals are never written directly; they come from `in order to` clauses.
        Goal,
    }

    /// A linked entity inside a `Forest`.
    #[derive(Debug, Clone, Serialize)]
    pub struct Node {
        pub id: NodeId,
        pub description: String,
        #[serde(flatten)]
        pub kind: NodeKind,
        /// Ancestor goal descriptions, nearest last.
        pub goals: Vec<String>,
        pub parent: Option<NodeId>,
        pub subtasks: Vec<NodeId>,
        pub notes: Vec<Note>,
    }

    impl Node {
        pub fn from_task(id: NodeId, task: Task) -> Self {
            Self {
                id,
                description: task.description,
                kind: NodeKind::Task {
                    context: task.context,
                    status: task.status,
                },
                goals: task.goals,
                parent: None,
                subtasks: vec![],
                notes: task.notes,
            }
        }

        pub fn goal(id: NodeId, description: impl Into<String>, goals: Vec<String>) -> Self {
            Self {
                id,
                description: description.into(),
                kind: NodeKind::Goal,
                goals,
                parent: None,
                subtasks: vec![],
                notes: vec![],
            }
        }

        pub fn is_task(&self) -> bool {
            matches!(self.kind, NodeKind::Task { .. })
        }

        pub fn is_goal(&self) -> bool {
            matches!(self.kind, NodeKind::Goal)
        }

        pub fn context(&self) -> Option<&str> {
            match &self.kind {
                NodeKind::Task { context, .. } => context.as_deref(),
                NodeKind::Goal => None,
            }
        }

        pub fn status(&self) -> Option<&Status> {
            match &self.kind {
                NodeKind::Task { status, .. } => Some(status),
                NodeKind::Goal => None,
            }
        }

        pub fn is_done(&self) -> bool {
            self.status().is_some_and(Status::done)
        }

        pub fn is_delegated(&self) -> bool {
            self.status().is_some_and(Status::delegated)
        }

        pub fn toplevel(&self) -> bool {
            self.parent.is_none()
        }

        pub fn formatting(&self) -> Formatting {
            match self.status() {
                None => Formatting::Goal,
                Some(s) if s.done() => Formatting::Done,
                Some(s) if s.delegated() => Formatting::Delegated,
                Some(s) if s.urgent() => Formatting::Urgent,
                Some(_) => Formatting::Default,
            }
        }
    }

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            self.description == other.description
        }
    }

    impl Eq for Node {}

    impl Hash for Node {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.description.hash(state);
        }
    }

}

pub mod grammar {
    //! Line grammars for the list.
    //!
    //! ```text
    //! Do <task> [<context>] (in order to <goal>)* [<status>]
    //! note <text>
    //! ```
    //!
    //! Lines are split like a POSIX shell would, so `"quoted phrases"` are one word.

    use crate::core::{Note, Status, Task};
    use crate::error::{GtdError, Result};
    use std::borrow::Cow;

    /// A parsed line: either a task or a note. Goals never appear here.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Entry {
        Task(Task),
        Note(Note),
    }

    pub fn split_words(line: &str) -> Result<Vec<String>> {
        shell_words::split(&escape_comment_marks(line)).map_err(|e| GtdError::Tokenize {
            line: line.to_string(),
            reason: e.to_string(),
        })
    }

    /// Escape every unquoted `#` that starts a word, so `#home` stays a token
    /// instead of opening a shell comment.
    fn escape_comment_marks(line: &str) -> Cow<'_, str> {
        if !line.contains('#') {
            return Cow::Borrowed(line);
        }
        let mut out = String::with_capacity(line.len() + 4);
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut word_start = true;
        for c in line.chars() {
            if escaped {
                escaped = false;
            } else if let Some(q) = quote {
                if c == q {
                    quote = None;
                } else if c == '\\' && q == '"' {
                    escaped = true;
                }
            } else {
                match c {
                    '\\' => escaped = true,
                    '\'' | '"' => quote = Some(c),
                    '#' if word_start => out.push('\\'),
                    _ => {}
                }
                word_start = c.is_whitespace();
            }
            out.push(c);
        }
        Cow::Owned(out)
    }

    /// Parse one raw line. `parent` is the task this line is nested under, if any.
    pub fn parse_entry(line: &str, parent: Option<&Task>) -> Result<Entry> {
        if Task::instance(line) {
            Task::parse(line, parent).map(Entry::Task)
        } else if Note::instance(line) {
            Note::parse(line).map(Entry::Note)
        } else {
            Err(GtdError::parse(line, &[], "unknown format (first word)"))
        }
    }

    /* ------------------------------- Status ------------------------------- */

    impl Status {
        pub fn parse(word: &str) -> Result<Self> {
            word.strip_prefix('[')
                .and_then(|inner| inner.strip_suffix(']'))
                .map(Status::new)
                .ok_or_else(|| GtdError::parse(word, &[], "status must be wrapped in [brackets]"))
        }

        pub fn instance(word: &str) -> bool {
            Self::parse(word).is_ok()
        }
    }

    /* -------------------------------- Task -------------------------------- */

    impl Task {
        pub fn instance(line: &str) -> bool {
            line.to_lowercase().starts_with("do")
        }

        pub fn parse(line: &str, parent: Option<&Task>) -> Result<Self> {
            let atoms = split_words(line)?;
            let fail = |reason: &str| GtdError::parse(line, &atoms, reason);
            let words: Vec<&str> = atoms.iter().map(String::as_str).collect();

            let description = match words.as_slice() {
                ["Do", description, ..] => description.to_string(),
                ["Do"] => return Err(fail("task has no description")),
                _ => return Err(fail("not a task")),
            };

            let (context, mut rest) = match &words[2..] {
                [] | ["in", "order", "to", ..] => (None, &words[2..]),
                [first, ..] if Status::instance(first) => (None, &words[2..]),
                [context, rest @ ..] => (Some(context.to_string()), rest),
            };

            let mut status = None;
            let mut reasons = Vec::new();
            loop {
                match rest {
                    [] => break,
                    ["in", "order", "to", reason, tail @ ..] => {
                        reasons.push(reason.to_string());
                        rest = tail;
                    }
                    ["in", "order", "to"] => return Err(fail("\"in order to\" has no goal")),
                    [word] if Status::instance(word) => {
                        status = Some(Status::parse(word)?);
                        rest = &[];
                    }
                    [word, ..] if Status::instance(word) => {
                        return Err(fail("status should always be last in task"));
                    }
                    _ => return Err(fail("generic error")),
                }
            }
            // First clause written is the nearest goal.
            reasons.reverse();

            let goals = match parent {
                Some(parent) => {
                    let mut derived = parent.goals.clone();
                    derived.push(parent.description.clone());
                    if !reasons.is_empty() && reasons != derived {
                        return Err(GtdError::Consistency {
                            description,
                            declared: reasons,
                            derived,
                        });
                    }
                    derived
                }
                None => reasons,
            };

            Ok(Task {
                description,
                context,
                status: status.unwrap_or_default(),
                goals,
                notes: vec![],
            })
        }

        /// Rebuild a grammar line that parses back into the same fields.
        ///
        /// A context that itself looks like a status or starts an `in order to`
        /// clause cannot be represented and will not survive the trip.
        pub fn to_line(&self) -> String {
            let mut words = vec!["Do".to_string(), shell_words::quote(&self.description).into_owned()];
            if let Some(context) = &self.context {
                words.push(shell_words::quote(context).into_owned());
            }
            for goal in self.goals.iter().rev() {
                words.extend(["in", "order", "to"].map(String::from));
                words.push(shell_words::quote(goal).into_owned());
            }
            if !self.status.is_empty() {
                let status = format!("[{}]", self.status.as_str());
                words.push(shell_words::quote(&status).into_owned());
            }
            words.join(" ")
        }
    }

    /* -------------------------------- Note -------------------------------- */

    impl Note {
        pub fn instance(line: &str) -> bool {
            split_words(line)
                .ok()
                .and_then(|words| words.first().map(|w| w.eq_ignore_ascii_case("note")))
                .unwrap_or(false)
        }

        pub fn parse(line: &str) -> Result<Self> {
            let atoms = split_words(line)?;
            match atoms.as_slice() {
                [word, text] if word.eq_ignore_ascii_case("note") => Ok(Note { note: text.clone() }),
                [word, ..] if word.eq_ignore_ascii_case("note") => Err(GtdError::parse(
                    line,
                    &atoms,
                    "note takes exactly one argument (check quotes)",
                )),
                _ => Err(GtdError::parse(line, &atoms, "not a note")),
            }
        }
    }

}

pub mod dedent {
    //! Converts an indented list into the marker stream read by `indent`.
    //!
    //! Each output line starts with `=` (content), `>` (open a level under the
    //! previous line) or `<` (close a level). The stream ends with a newline.

    use crate::error::{GtdError, Result};
    use nom::{IResult, bytes::complete::take_while};

    const TAB_WIDTH: usize = 4;

    fn leading_whitespace(line: &str) -> IResult<&str, &str> {
        take_while(|c: char| c == ' ' || c == '\t')(line)
    }

    fn width(indent: &str) -> usize {
        indent
            .chars()
            .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
            .sum()
    }

    pub fn dedent(text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len() + 16);
        let mut levels = vec![0usize];
        // Whether each open level has emitted a content line yet.
        let mut filled = vec![false];

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let (content, indent) = leading_whitespace(line).map_err(|e| GtdError::Dedent {
                line_no,
                reason: e.to_string(),
            })?;
            let content = content.trim_end();

            // Blank and comment lines never move the nesting.
            if content.is_empty() || content.starts_with('#') {
                out.push('=');
                out.push_str(content);
                out.push('\n');
                continue;
            }

            let column = width(indent);
            let current = levels.last().copied().unwrap_or(0);
            if column > current {
                if !filled.last().copied().unwrap_or(false) {
                    return Err(GtdError::Dedent {
                        line_no,
                        reason: format!("indented to column {column} with nothing to nest under"),
                    });
                }
                out.push_str(">\n");
                levels.push(column);
                filled.push(false);
            } else {
                while column < levels.last().copied().unwrap_or(0) {
                    levels.pop();
                    filled.pop();
                    out.push_str("<\n");
                }
                let landed = levels.last().copied().unwrap_or(0);
                if column != landed {
                    return Err(GtdError::Dedent {
                        line_no,
                        reason: format!(
                            "column {column} matches no enclosing level (nearest is {landed})"
                        ),
                    });
                }
            }
            if let Some(seen) = filled.last_mut() {
                *seen = true;
            }
            out.push('=');
            out.push_str(content);
            out.push('\n');
        }

        for _ in 1..levels.len() {
            out.push_str("<\n");
        }
        Ok(out)
    }

}

pub mod indent {
    //! Marker stream into a tree of raw lines.
    //!
    //! Uses an explicit stack of open nodes, so nesting depth is not bounded by
    //! the call stack.

    use crate::error::{GtdError, Result};
    use nom::{
        IResult,
        branch::alt,
        character::complete::char,
        combinator::{rest, value},
        sequence::pair,
    };
    use tracing::debug;

    /// A raw line plus the lines nested under it.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct IndentNode {
        pub value: String,
        pub children: Vec<IndentNode>,
    }

    impl IndentNode {
        pub fn leaf(value: impl Into<String>) -> Self {
            Self {
                value: value.into(),
                children: vec![],
            }
        }

        pub fn is_leaf(&self) -> bool {
            self.children.is_empty()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Event {
        Content,
        Push,
        Pop,
    }

    fn event_line(i: &str) -> IResult<&str, (Event, &str)> {
        pair(
            alt((
                value(Event::Content, char('=')),
                value(Event::Push, char('>')),
                value(Event::Pop, char('<')),
            )),
            rest,
        )(i)
    }

    fn current<'a>(
        roots: &'a mut Vec<IndentNode>,
        open: &'a mut [IndentNode],
    ) -> &'a mut Vec<IndentNode> {
        match open.last_mut() {
            Some(node) => &mut node.children,
            None => roots,
        }
    }

    pub fn parse_indents(stream: &str) -> Result<Vec<IndentNode>> {
        let mut roots = Vec::new();
        let mut open: Vec<IndentNode> = Vec::new();

        let mut lines: Vec<&str> = stream.split('\n').collect();
        // Final segment is the trailing-newline artifact.
        lines.pop();

        for (idx, line) in lines.into_iter().enumerate() {
            let line_no = idx + 1;
            let (_, (event, value)) = event_line(line).map_err(|_| {
                let mut chars = line.chars();
                let event = chars.next().map(String::from).unwrap_or_default();
                GtdError::IndentEvent {
                    line_no,
                    line: line.to_string(),
                    event,
                    value: chars.as_str().to_string(),
                }
            })?;

            match event {
                Event::Content => {
                    let trimmed = value.trim();
                    if trimmed.is_empty() || trimmed.starts_with('#') {
                        continue;
                    }
                    current(&mut roots, &mut open).push(IndentNode::leaf(value));
                }
                Event::Push => {
                    let head = current(&mut roots, &mut open).pop().ok_or_else(|| {
                        GtdError::IndentStructure {
                            line_no,
                            reason: "nothing to nest under".into(),
                        }
                    })?;
                    open.push(head);
                }
                Event::Pop => {
                    let closed = open.pop().ok_or_else(|| GtdError::IndentStructure {
                        line_no,
                        reason: "no open level to close".into(),
                    })?;
                    current(&mut roots, &mut open).push(closed);
                }
            }
        }

        if !open.is_empty() {
            debug!(levels = open.len(), "closing levels left open at end of stream");
        }
        while let Some(closed) = open.pop() {
            current(&mut roots, &mut open).push(closed);
        }
        Ok(roots)
    }

}

pub mod builder {
    //! Raw tree into a flat list of tasks with notes attached.

    use crate::core::Task;
    use crate::error::{GtdError, Result};
    use crate::grammar::{Entry, parse_entry};
    use crate::indent::IndentNode;

    /// Interpret every node of the tree. Each task appears once in the result,
    /// parents before their children; notes are absorbed by their owner.
    pub fn build_entities(tree: &[IndentNode]) -> Result<Vec<Task>> {
        let mut out = Vec::new();
        for node in tree {
            for entry in build_node(node, None)? {
                match entry {
                    Entry::Task(task) => out.push(task),
                    Entry::Note(_) => {
                        return Err(GtdError::parse(
                            &node.value,
                            &[],
                            "note must be nested under a task",
                        ));
                    }
                }
            }
        }
        Ok(out)
    }

    fn build_node(node: &IndentNode, parent: Option<&Task>) -> Result<Vec<Entry>> {
        let mut task = match parse_entry(&node.value, parent)? {
            Entry::Note(note) if node.is_leaf() => return Ok(vec![Entry::Note(note)]),
            Entry::Note(_) => {
                return Err(GtdError::parse(&node.value, &[], "note cannot have children"));
            }
            Entry::Task(task) => task,
        };

        let mut descendants = Vec::new();
        for child in &node.children {
            for entry in build_node(child, Some(&task))? {
                match entry {
                    Entry::Note(note) => task.notes.push(note),
                    Entry::Task(t) => descendants.push(Entry::Task(t)),
                }
            }
        }

        let mut out = Vec::with_capacity(descendants.len() + 1);
        out.push(Entry::Task(task));
        out.extend(descendants);
        Ok(out)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::indent::parse_indents;

        fn build(stream: &str) -> Result<Vec<Task>> {
            build_entities(&parse_indents(stream)?)
        }

        #[test]
        fn nested_tasks_flatten_with_goal_chains() {
            let tasks = build("=Do move\n>\n=Do pack\n>\n=Do boxes store\n<\n=note \"call movers\"\n<\n").unwrap();
            let names: Vec<_> = tasks.iter().map(|t| t.description.as_str()).collect();
            assert_eq!(names, ["move", "pack", "boxes"]);
            assert_eq!(tasks[1].goals, vec!["move"]);
            assert_eq!(tasks[2].goals, vec!["move", "pack"]);
            assert_eq!(tasks[0].notes.len(), 1);
            assert_eq!(tasks[0].notes[0].note, "call movers");
            assert!(tasks[1].notes.is_empty());
        }

        #[test]
        fn notes_attach_to_their_direct_owner() {
            let tasks = build("=Do a\n>\n=Do b\n>\n=note deep\n<\n=note shallow\n<\n").unwrap();
            assert_eq!(tasks[0].notes[0].note, "shallow");
            assert_eq!(tasks[1].notes[0].note, "deep");
        }

        #[test]
        fn note_with_children_is_rejected() {
            let err = build("=Do a\n>\n=note n\n>\n=Do b\n<\n<\n").unwrap_err();
            assert!(matches!(err, GtdError::Parse { ref reason, .. } if reason.contains("children")));
        }

        #[test]
        fn top_level_note_is_rejected() {
            assert!(build("=note orphan\n").is_err());
        }

        #[test]
        fn unknown_lines_fail_the_whole_build() {
            assert!(build("=Do a\n=Call b\n").is_err());
        }
    }
}

pub mod forest {
    //! Goal-graph normalization.
    //!
    //! Tasks only name their goals by description, often before (or without)
    //! any node for that goal existing. `Forest::from_tasks` resolves those
    //! names with a work queue over a description index, synthesizing goals as
    //! needed, then rebuilds every chain from the final parent pointers.

    use crate::core::{Node, NodeId, Task};
    use crate::error::{GtdError, Result};
    use indexmap::IndexMap;
    use std::collections::{HashSet, VecDeque};
    use std::ops::Index;
    use tracing::{debug, trace};

    /// Arena of linked nodes plus the description index.
    #[derive(Debug, Clone, Default)]
    pub struct Forest {
        nodes: Vec<Node>,
        index: IndexMap<String, NodeId>,
    }

    impl Forest {
        /// Link parsed tasks into a normalized forest.
        pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Result<Self> {
            let mut forest = Forest::default();
            for task in tasks {
                forest.insert_task(task)?;
            }
            let parsed = forest.len();
            forest.normalize()?;
            debug!(
                parsed,
                synthesized = forest.len() - parsed,
                "normalized goal forest"
            );
            Ok(forest)
        }

        pub fn insert_task(&mut self, task: Task) -> Result<NodeId> {
            if self.index.contains_key(&task.description) {
                return Err(GtdError::DuplicateDescription {
                    description: task.description,
                });
            }
            let id = NodeId(self.nodes.len());
            self.index.insert(task.description.clone(), id);
            self.nodes.push(Node::from_task(id, task));
            Ok(id)
        }

        fn insert_goal(&mut self, description: &str, goals: Vec<String>) -> NodeId {
            let id = NodeId(self.nodes.len());
            self.index.insert(description.to_string(), id);
            self.nodes.push(Node::goal(id, description, goals));
            id
        }

        pub fn len(&self) -> usize {
            self.nodes.len()
        }

        pub fn is_empty(&self) -> bool {
            self.nodes.is_empty()
        }

        pub fn nodes(&self) -> &[Node] {
            &self.nodes
        }

        pub fn find(&self, description: &str) -> Option<NodeId> {
            self.index.get(description).copied()
        }

        /// Every node, in arena order: source order, then synthesized goals.
        pub fn flatten(&self) -> Vec<NodeId> {
            (0..self.nodes.len()).map(NodeId).collect()
        }

        /// Run both passes. Running it again on a normalized forest is a no-op.
        pub fn normalize(&mut self) -> Result<()> {
            self.link_goals();
            self.normalize_goals()
        }

        /// Fixpoint pass: attach every node to the node named by its nearest goal,
        /// creating goals that were only referenced.
        ///
        /// Chains only ever grow, and never past the longest chain in the input,
        /// so the queue drains.
        pub fn link_goals(&mut self) {
            let mut queue: VecDeque<NodeId> = self.flatten().into();
            let mut pending: HashSet<NodeId> = queue.iter().copied().collect();

            while let Some(id) = queue.pop_front() {
                pending.remove(&id);
                let goals = self.nodes[id.0].goals.clone();
                let Some((nearest, ancestors)) = goals.split_last() else {
                    continue;
                };

                let goal_id = match self.index.get(nearest).copied() {
                    None => {
                        let gid = self.insert_goal(nearest, ancestors.to_vec());
                        debug!(goal = %nearest, depth = ancestors.len(), "synthesized goal");
                        queue.push_back(gid);
                        pending.insert(gid);
                        gid
                    }
                    Some(gid) => {
                        if ancestors.len() > self.nodes[gid.0].goals.len() {
                            trace!(goal = %nearest, depth = ancestors.len(), "found deeper ancestry");
                            self.nodes[gid.0].goals = ancestors.to_vec();
                            if pending.insert(gid) {
                                queue.push_back(gid);
                            }
                        }
                        gid
                    }
                };
                self.attach(id, goal_id);
            }
        }

        fn attach(&mut self, child: NodeId, parent: NodeId) {
            if let Some(old) = self.nodes[child.0].parent {
                if old != parent {
                    self.nodes[old.0].subtasks.retain(|&c| c != child);
                }
            }
            self.nodes[child.0].parent = Some(parent);
            let subtasks = &mut self.nodes[parent.0].subtasks;
            if !subtasks.contains(&child) {
                subtasks.push(child);
            }
        }

        /// Second sweep: fill missing parent links from `subtasks`, then replace
        /// every chain with the one read off the parent pointers.
        pub fn normalize_goals(&mut self) -> Result<()> {
            for idx in 0..self.nodes.len() {
                for child in self.nodes[idx].subtasks.clone() {
                    let node = &mut self.nodes[child.0];
                    if node.parent.is_none() {
                        node.parent = Some(NodeId(idx));
                    }
                }
            }

            let chains = self
                .flatten()
                .into_iter()
                .map(|id| self.goal_chain(id))
                .collect::<Result<Vec<_>>>()?;
            for (node, chain) in self.nodes.iter_mut().zip(chains) {
                node.goals = chain;
            }
            Ok(())
        }

        /// Ancestors of `id`, nearest first.
        pub fn ancestors(&self, id: NodeId) -> Result<Vec<NodeId>> {
            let mut seen = HashSet::from([id]);
            let mut out = Vec::new();
            let mut cursor = self.nodes[id.0].parent;
            while let Some(p) = cursor {
                if !seen.insert(p) {
                    return Err(GtdError::CyclicGoal {
                        description: self.nodes[p.0].description.clone(),
                    });
                }
                out.push(p);
                cursor = self.nodes[p.0].parent;
            }
            Ok(out)
        }

        /// Ancestor descriptions of `id`, nearest last.
        pub fn goal_chain(&self, id: NodeId) -> Result<Vec<String>> {
            let mut chain: Vec<String> = self
                .ancestors(id)?
                .into_iter()
                .map(|a| self.nodes[a.0].description.clone())
                .collect();
            chain.reverse();
            Ok(chain)
        }
    }

    impl Index<NodeId> for Forest {
        type Output = Node;

        fn index(&self, id: NodeId) -> &Node {
            &self.nodes[id.0]
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::builder::build_entities;
        use crate::indent::parse_indents;

        fn forest(stream: &str) -> Result<Forest> {
            Forest::from_tasks(build_entities(&parse_indents(stream)?)?)
        }

        fn node<'a>(f: &'a Forest, description: &str) -> &'a Node {
            &f[f.find(description).expect(description)]
        }

        fn assert_invariants(f: &Forest) {
            for n in f.nodes() {
                match n.goals.last() {
                    Some(nearest) => {
                        let parent = n.parent.expect("node with goals has a parent");
                        assert_eq!(&f[parent].description, nearest);
                    }
                    None => assert!(n.toplevel()),
                }
                assert_eq!(n.goals.len(), f.ancestors(n.id).unwrap().len());
                for &child in &n.subtasks {
                    assert_eq!(f[child].parent, Some(n.id));
                }
            }
        }

        #[test]
        fn synthesizes_goal_chain() {
            let f = forest(
                "=Do dishes in order to \"keep kitchen clean\" in order to \"be a good roommate\"\n",
            )
            .unwrap();
            assert_eq!(f.len(), 3);

            let dishes = node(&f, "dishes");
            assert_eq!(dishes.goals, vec!["be a good roommate", "keep kitchen clean"]);
            assert_eq!(f[dishes.parent.unwrap()].description, "keep kitchen clean");

            let clean = node(&f, "keep kitchen clean");
            assert!(clean.is_goal());
            assert_eq!(clean.goals, vec!["be a good roommate"]);
            assert_eq!(clean.subtasks, vec![dishes.id]);

            let roommate = node(&f, "be a good roommate");
            assert!(roommate.is_goal() && roommate.toplevel());
            assert!(roommate.goals.is_empty());
            assert_invariants(&f);
        }

        #[test]
        fn shared_goal_takes_longest_chain() {
            let f = forest(concat!(
                "=Do sweep in order to \"clean house\"\n",
                "=Do mop in order to \"clean house\" in order to \"host party\"\n",
            ))
            .unwrap();

            let house = node(&f, "clean house");
            assert_eq!(house.goals, vec!["host party"]);
            assert_eq!(f[house.parent.unwrap()].description, "host party");
            assert_eq!(house.subtasks.len(), 2);
            assert_eq!(node(&f, "sweep").goals, vec!["host party", "clean house"]);
            assert_invariants(&f);
        }

        #[test]
        fn deeper_chain_found_late_rehomes_goal() {
            let f = forest(concat!(
                "=Do g in order to short\n",
                "=Do b in order to g in order to mid in order to root\n",
            ))
            .unwrap();

            let g = node(&f, "g");
            assert_eq!(g.goals, vec!["root", "mid"]);
            assert!(!node(&f, "short").subtasks.contains(&g.id));
            assert_eq!(node(&f, "mid").subtasks, vec![g.id]);
            assert_invariants(&f);
        }

        #[test]
        fn nested_tasks_link_to_their_parent_task() {
            let f = forest("=Do move in order to \"new job\"\n>\n=Do pack\n<\n").unwrap();
            let pack = node(&f, "pack");
            assert_eq!(f[pack.parent.unwrap()].description, "move");
            assert_eq!(pack.goals, vec!["new job", "move"]);
            assert_invariants(&f);
        }

        #[test]
        fn normalizing_twice_changes_nothing() {
            let mut f = forest(concat!(
                "=Do sweep in order to \"clean house\"\n",
                "=Do mop in order to \"clean house\" in order to \"host party\"\n",
                "=Do invite in order to \"host party\"\n",
                ">\n=Do cards\n<\n",
            ))
            .unwrap();
            let before: Vec<_> = f
                .nodes()
                .iter()
                .map(|n| (n.goals.clone(), n.parent, n.subtasks.clone()))
                .collect();
            f.normalize().unwrap();
            let after: Vec<_> = f
                .nodes()
                .iter()
                .map(|n| (n.goals.clone(), n.parent, n.subtasks.clone()))
                .collect();
            assert_eq!(before, after);
        }

        #[test]
        fn duplicate_descriptions_are_fatal() {
            let err = forest("=Do a\n=Do a home\n").unwrap_err();
            assert_eq!(
                err,
                GtdError::DuplicateDescription {
                    description: "a".into()
                }
            );
        }

        #[test]
        fn cyclic_goals_are_fatal() {
            let err = forest("=Do a in order to b\n=Do b in order to a\n").unwrap_err();
            assert!(matches!(err, GtdError::CyclicGoal { .. }));

            let err = forest("=Do a in order to a\n").unwrap_err();
            assert!(matches!(err, GtdError::CyclicGoal { .. }));
        }

        #[test]
        fn goal_may_be_a_declared_task() {
            let f = forest("=Do errands town\n=Do bank in order to errands\n").unwrap();
            let errands = node(&f, "errands");
            assert!(errands.is_task());
            assert_eq!(errands.subtasks, vec![node(&f, "bank").id]);
            assert_eq!(f.len(), 2);
        }

        #[test]
        fn empty_list_is_an_empty_forest() {
            let f = Forest::from_tasks(Vec::new()).unwrap();
            assert!(f.is_empty());
            assert!(f.flatten().is_empty());
        }
    }
}

pub mod projectors {
    //! Order-preserving views over a flat node list.

    use crate::core::{Node, NodeId};
    use crate::forest::Forest;
    use std::collections::HashMap;

    fn keep(forest: &Forest, nodes: &[NodeId], pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        nodes.iter().copied().filter(|&id| pred(&forest[id])).collect()
    }

    pub fn tasks(forest: &Forest, nodes: &[NodeId]) -> Vec<NodeId> {
        keep(forest, nodes, Node::is_task)
    }

    pub fn goals(forest: &Forest, nodes: &[NodeId]) -> Vec<NodeId> {
        keep(forest, nodes, Node::is_goal)
    }

    pub fn top_level_goals(forest: &Forest, nodes: &[NodeId]) -> Vec<NodeId> {
        keep(forest, nodes, |n| n.is_goal() && n.toplevel())
    }

    pub fn complete(forest: &Forest, nodes: &[NodeId]) -> Vec<NodeId> {
        keep(forest, nodes, |n| n.is_task() && n.is_done())
    }

    pub fn incomplete(forest: &Forest, nodes: &[NodeId]) -> Vec<NodeId> {
        keep(forest, nodes, |n| n.is_task() && !n.is_done())
    }

    /// Goals always pass; tasks pass when their context equals `context`, or
    /// when they have none and `include_none` is set.
    pub fn only_contexts(
        forest: &Forest,
        nodes: &[NodeId],
        context: Option<&str>,
        include_none: bool,
    ) -> Vec<NodeId> {
        keep(forest, nodes, |n| {
            n.is_goal() || (include_none && n.context().is_none()) || n.context() == context
        })
    }

    /// `focus` itself plus everything above or below it.
    pub fn focus_on(forest: &Forest, nodes: &[NodeId], focus: NodeId) -> Vec<NodeId> {
        let target = &forest[focus];
        keep(forest, nodes, |n| {
            n.id == focus || target.goals.contains(&n.description) || n.goals.contains(&target.description)
        })
    }

    pub fn find(forest: &Forest, nodes: &[NodeId], description: &str) -> Option<NodeId> {
        nodes
            .iter()
            .copied()
            .find(|&id| forest[id].description == description)
    }

    pub fn delegated_only(forest: &Forest, nodes: &[NodeId]) -> Vec<NodeId> {
        keep(forest, nodes, |n| n.is_task() && n.is_delegated())
    }

    /// Presentation-only labels keyed by node; nodes without an entry show
    /// their description.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct DisplayLabels(HashMap<NodeId, String>);

    impl DisplayLabels {
        pub fn insert(&mut self, id: NodeId, label: String) {
            self.0.insert(id, label);
        }

        pub fn label<'a>(&'a self, forest: &'a Forest, id: NodeId) -> &'a str {
            self.0
                .get(&id)
                .map(String::as_str)
                .unwrap_or(forest[id].description.as_str())
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct Abbreviated {
        pub nodes: Vec<NodeId>,
        pub labels: DisplayLabels,
    }

    /// Collapse completed subtrees.
    ///
    /// Goals, roots and children of goals always pass untouched. Other tasks are
    /// dropped when their parent task is done; a done task that survives and has
    /// descendants in `nodes` is labelled `(<n>) <description>`, n counting itself.
    pub fn abbreviated(forest: &Forest, nodes: &[NodeId]) -> Abbreviated {
        let all_tasks = tasks(forest, nodes);
        let mut out = Abbreviated::default();

        for &id in nodes {
            let node = &forest[id];
            let parent = node.parent.map(|p| &forest[p]);
            match parent {
                _ if node.is_goal() => {}
                None => {}
                Some(p) if p.is_goal() => {}
                Some(p) if p.is_done() => continue,
                Some(_) => {
                    if node.is_done() {
                        let descendants = all_tasks
                            .iter()
                            .filter(|&&d| forest[d].goals.contains(&node.description))
                            .count();
                        if descendants > 0 {
                            out.labels
                                .insert(id, format!("({}) {}", descendants + 1, node.description));
                        }
                    }
                }
            }
            out.nodes.push(id);
        }
        out
    }

}

pub mod format {
    //! Presentation: DOT export, plain listings, delegation report, completions.

    use crate::core::NodeId;
    use crate::forest::Forest;
    use crate::projectors::DisplayLabels;
    use indexmap::IndexMap;
    use std::collections::{BTreeMap, HashMap, HashSet};
    use std::fmt::Write;
    use tracing::warn;

    /// Parent to shown subtasks, for every shown node.
    pub type TaskGraph = IndexMap<NodeId, Vec<NodeId>>;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DotOptions {
        pub wrap_width: usize,
        pub size: String,
    }

    impl Default for DotOptions {
        fn default() -> Self {
            Self {
                wrap_width: 20,
                size: "140,10000".to_string(),
            }
        }
    }

    /// Restrict parent/subtask edges to `shown`.
    pub fn graph(forest: &Forest, shown: &[NodeId]) -> TaskGraph {
        let members: HashSet<NodeId> = shown.iter().copied().collect();
        shown
            .iter()
            .map(|&start| {
                let ends = forest[start]
                    .subtasks
                    .iter()
                    .copied()
                    .filter(|end| members.contains(end))
                    .collect();
                (start, ends)
            })
            .collect()
    }

    fn wrap(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            let mut rest: Vec<char> = word.chars().collect();
            loop {
                let used = line.chars().count();
                let sep = usize::from(used > 0);
                if used + sep + rest.len() <= width {
                    if sep == 1 {
                        line.push(' ');
                    }
                    line.extend(rest.iter());
                    break;
                }
                // A word longer than a whole line fills what is left of this one.
                if rest.len() > width && used + sep <= width {
                    let room = (width - used - sep).max(1);
                    if sep == 1 {
                        line.push(' ');
                    }
                    line.extend(rest.drain(..room));
                }
                lines.push(std::mem::take(&mut line));
            }
        }
        if !line.is_empty() {
            lines.push(line);
        }
        lines
    }

    /// Wrap a label into DOT line breaks.
    pub fn short_label(label: &str, width: usize) -> String {
        let short = wrap(&label.replace('"', "\\\""), width).join("\\n");
        if short.trim().is_empty() || short.trim() == "urgent" {
            warn!(label, "suspicious node label");
        }
        short
    }

    /// One unique label per node; collisions get `#2`, `#3`, ... on a new line.
    pub fn make_labels(
        forest: &Forest,
        nodes: impl IntoIterator<Item = NodeId>,
        display: &DisplayLabels,
        width: usize,
    ) -> HashMap<NodeId, String> {
        let mut labels = HashMap::new();
        let mut used = HashSet::new();
        for id in nodes {
            if labels.contains_key(&id) {
                continue;
            }
            let short = short_label(display.label(forest, id), width);
            let label = if used.contains(&short) {
                (2..)
                    .map(|n| format!("{short}\\n#{n}"))
                    .find(|alt| !used.contains(alt))
                    .unwrap_or_default()
            } else {
                short
            };
            used.insert(label.clone());
            labels.insert(id, label);
        }
        labels
    }

    pub fn dot(
        forest: &Forest,
        graph: &TaskGraph,
        display: &DisplayLabels,
        opts: &DotOptions,
    ) -> String {
        let labels = make_labels(forest, graph.keys().copied(), display, opts.wrap_width);
        let mut out = String::new();
        let _ = writeln!(out, "digraph gtd {{");
        let _ = writeln!(out, "size=\"{}\"", opts.size);
        let _ = writeln!(out, "overlap=false;");
        for (start, ends) in graph {
            let from = &labels[start];
            let _ = writeln!(out, "\"{from}\" {};", forest[*start].formatting().dot_attributes());
            for end in ends {
                let _ = writeln!(out, "\"{from}\" -> \"{}\";", labels[end]);
            }
        }
        out.push_str("}\n");
        out
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ListingOptions {
        pub include_tally: bool,
    }

    impl Default for ListingOptions {
        fn default() -> Self {
            Self { include_tally: true }
        }
    }

    pub fn listing(forest: &Forest, nodes: &[NodeId], opts: ListingOptions) -> String {
        let mut out = String::new();
        for &id in nodes {
            let _ = writeln!(out, "{}", forest[id].description);
        }
        if opts.include_tally {
            let _ = writeln!(out, "{} total", nodes.len());
        }
        out
    }

    /// Group tasks by who they were handed to.
    pub fn delegation_report(forest: &Forest, nodes: &[NodeId]) -> String {
        let mut groups: BTreeMap<String, Vec<NodeId>> = BTreeMap::new();
        for &id in nodes {
            let key = forest[id]
                .status()
                .and_then(|s| s.delegated_to())
                .unwrap_or_else(|| "Not delegated".to_string());
            groups.entry(key).or_default().push(id);
        }

        let mut out = String::new();
        for (who, members) in &groups {
            let _ = writeln!(out, "{who}:");
            for &id in members {
                let _ = writeln!(out, "\t{}", forest[id].description);
            }
            let _ = writeln!(out, "\t{} total", members.len());
        }
        let _ = writeln!(out, "{} total", nodes.len());
        out
    }

    /// Shell-quoted descriptions starting with `prefix`.
    pub fn completions(forest: &Forest, nodes: &[NodeId], prefix: &str) -> Vec<String> {
        nodes
            .iter()
            .map(|&id| forest[id].description.as_str())
            .filter(|d| d.starts_with(prefix))
            .map(|d| shell_words::quote(d).into_owned())
            .collect()
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::parser::parse_marker_stream;
        use crate::projectors;

        #[test]
        fn wraps_at_word_boundaries() {
            assert_eq!(short_label("be a good roommate forever", 20), "be a good roommate\\nforever");
            assert_eq!(short_label("abcdefghij", 4), "abcd\\nefgh\\nij");
            assert_eq!(short_label("ab abcdefghij", 4), "ab a\\nbcde\\nfghi\\nj");
            assert_eq!(short_label("abcd efghijkl", 4), "abcd\\nefgh\\nijkl");
            assert_eq!(short_label("say \"hi\"", 20), "say \\\"hi\\\"");
        }

        #[test]
        fn colliding_labels_get_suffixes() {
            let f = parse_marker_stream(concat!(
                "=Do \"water the plants on the balcony\"\n",
                "=Do \"water the plants on the patio\"\n",
                "=Do \"water the plants on the porch\"\n",
            ))
            .unwrap();
            let labels = make_labels(&f, f.flatten(), &DisplayLabels::default(), 20);
            assert_eq!(labels[&NodeId(0)], "water the plants on\\nthe balcony");
            assert_eq!(labels[&NodeId(1)], "water the plants on\\nthe patio");
            assert_eq!(labels[&NodeId(2)], "water the plants on\\nthe porch");

            let f = parse_marker_stream("=Do \"same label here ok\"\n=Do \"same label here  ok\"\n").unwrap();
            let labels = make_labels(&f, f.flatten(), &DisplayLabels::default(), 20);
            assert_eq!(labels[&NodeId(0)], "same label here ok");
            assert_eq!(labels[&NodeId(1)], "same label here ok\\n#2");
        }

        #[test]
        fn dot_restricts_edges_to_shown_nodes() {
            let f = parse_marker_stream(concat!(
                "=Do run gym in order to fit\n",
                "=Do swim pool in order to fit [done]\n",
            ))
            .unwrap();
            let shown = projectors::incomplete(&f, &f.flatten());
            let mut with_goals = projectors::goals(&f, &f.flatten());
            with_goals.extend(shown);

            let g = graph(&f, &with_goals);
            let fit = f.find("fit").unwrap();
            assert_eq!(g[&fit], vec![f.find("run").unwrap()]);

            let text = dot(&f, &g, &DisplayLabels::default(), &DotOptions::default());
            assert!(text.starts_with("digraph gtd {\nsize=\"140,10000\"\noverlap=false;\n"));
            assert!(text.contains("\"fit\" [color=green];\n"));
            assert!(text.contains("\"fit\" -> \"run\";\n"));
            assert!(text.contains("\"run\" [color=red];\n"));
            assert!(!text.contains("swim"));
            assert!(text.ends_with("}\n"));
        }

        #[test]
        fn listing_and_delegation() {
            let f = parse_marker_stream(concat!(
                "=Do a \"[delegated to Bob]\"\n",
                "=Do b \"[delegated Amy]\"\n",
                "=Do c\n",
                "=Do d \"[delegated to Bob]\"\n",
            ))
            .unwrap();
            let all = f.flatten();

            assert_eq!(listing(&f, &all, ListingOptions::default()), "a\nb\nc\nd\n4 total\n");
            assert_eq!(listing(&f, &all[..1], ListingOptions { include_tally: false }), "a\n");
            assert_eq!(
                delegation_report(&f, &all),
                "Amy:\n\tb\n\t1 total\nBob:\n\ta\n\td\n\t2 total\nNot delegated:\n\tc\n\t1 total\n4 total\n"
            );
        }

        #[test]
        fn completions_are_quoted() {
            let f = parse_marker_stream("=Do \"call mom\"\n=Do cook\n=Do clean\n").unwrap();
            let all = f.flatten();
            assert_eq!(completions(&f, &all, "c"), ["'call mom'", "cook", "clean"]);
            assert_eq!(completions(&f, &all, "co"), ["cook"]);
        }
    }
}

pub mod parser {
    //! Entry points that run the whole pipeline.

    use crate::builder::build_entities;
    use crate::dedent::dedent;
    use crate::error::Result;
    use crate::forest::Forest;
    use crate::indent::parse_indents;
    use crate::storage::ListParser;
    use std::{fs, path::Path};
    use tracing::debug;

    /// What the input text looks like.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum InputFormat {
        /// A hand-written, indented list.
        #[default]
        Indented,
        /// Already converted into `=`/`>`/`<` marker lines.
        MarkerStream,
    }

    pub fn parse_marker_stream(stream: &str) -> Result<Forest> {
        let tree = parse_indents(stream)?;
        debug!(roots = tree.len(), "parsed indentation tree");
        let tasks = build_entities(&tree)?;
        debug!(tasks = tasks.len(), "built entities");
        Forest::from_tasks(tasks)
    }

    pub fn parse_list_from_str(input: &str, format: InputFormat) -> Result<Forest> {
        match format {
            InputFormat::Indented => parse_marker_stream(&dedent(input)?),
            InputFormat::MarkerStream => parse_marker_stream(input),
        }
    }

    /// Reads a list file from disk.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FileListParser {
        pub format: InputFormat,
    }

    impl ListParser for FileListParser {
        fn parse_file(&self, path: &Path) -> anyhow::Result<Forest> {
            use anyhow::Context;
            let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            parse_list_from_str(&text, self.format).with_context(|| format!("parsing {:?}", path))
        }
    }

}

pub mod storage {
    use crate::forest::Forest;
    use anyhow::Result;
    use std::path::Path;

    /// Loads a list from somewhere on disk.
    pub trait ListParser {
        fn parse_file(&self, path: &Path) -> Result<Forest>;
    }
}

pub use error::GtdError;
pub use forest::Forest;
pub use parser::{FileListParser, InputFormat, parse_list_from_str, parse_marker_stream};
