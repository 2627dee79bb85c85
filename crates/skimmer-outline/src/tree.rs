use crate::heading::HeadingCandidate;

/// One heading node in the outline forest.
#[derive(Debug, Clone)]
pub struct OutlineNode {
    pub level: u8,
    /// The raw heading line as it appeared in the document.
    pub heading: String,
    pub candidate: HeadingCandidate,
    /// Accumulated body text up to the next heading, soft wraps rejoined.
    pub body: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Arena-backed forest of heading nodes.
///
/// Nodes are addressed by index; each stores its parent index and child
/// indices, so there is no ownership cycle and subtrees serialize trivially
/// in tests. Multiple roots arise when the level sequencing resets.
#[derive(Debug, Clone, Default)]
pub struct OutlineForest {
    nodes: Vec<OutlineNode>,
    roots: Vec<usize>,
    preamble: String,
}

impl OutlineForest {
    /// Build the forest from a document and its classified heading lines.
    ///
    /// `candidates` must be in line order (as produced by
    /// [`crate::heading::classify_lines`]).
    pub fn build(text: &str, candidates: &[HeadingCandidate]) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut next_candidate = candidates.iter().peekable();

        // Segment pass: split lines into (heading, body) runs.
        let mut preamble_lines: Vec<&str> = Vec::new();
        let mut segments: Vec<(HeadingCandidate, String, Vec<&str>)> = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if next_candidate.peek().is_some_and(|c| c.line_index == i) {
                let candidate = next_candidate.next().expect("peeked").clone();
                segments.push((candidate, line.trim().to_string(), Vec::new()));
            } else if let Some(last) = segments.last_mut() {
                last.2.push(line);
            } else {
                preamble_lines.push(line);
            }
        }

        // Elision pre-pass: a heading with neither body text nor a deeper
        // heading following it is a decorative run-in.
        let kept: Vec<(HeadingCandidate, String, String)> = segments
            .iter()
            .enumerate()
            .filter_map(|(i, (candidate, heading, body_lines))| {
                let body = join_wrapped(body_lines).trim().to_string();
                let has_child = segments
                    .get(i + 1)
                    .is_some_and(|(next, _, _)| next.level > candidate.level);
                if body.is_empty() && !has_child {
                    None
                } else {
                    Some((candidate.clone(), heading.clone(), body))
                }
            })
            .collect();

        // Stack attach: a node becomes a child of the most recent node with a
        // strictly lower level, else a new root.
        let mut forest = OutlineForest {
            nodes: Vec::with_capacity(kept.len()),
            roots: Vec::new(),
            preamble: join_wrapped(&preamble_lines).trim().to_string(),
        };
        let mut stack: Vec<usize> = Vec::new();

        for (candidate, heading, body) in kept {
            let level = candidate.level;
            while stack
                .last()
                .is_some_and(|&top| forest.nodes[top].level >= level)
            {
                stack.pop();
            }
            let parent = stack.last().copied();
            let idx = forest.nodes.len();
            forest.nodes.push(OutlineNode {
                level,
                heading,
                candidate,
                body,
                parent,
                children: Vec::new(),
            });
            match parent {
                Some(p) => forest.nodes[p].children.push(idx),
                None => forest.roots.push(idx),
            }
            stack.push(idx);
        }

        forest
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, idx: usize) -> &OutlineNode {
        &self.nodes[idx]
    }

    /// Unsectioned text before the first heading.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Render a node's body plus all descendant headings and bodies, in
    /// document order. Child heading lines are preserved verbatim.
    pub fn render_subtree(&self, idx: usize) -> String {
        let node = &self.nodes[idx];
        let mut out = node.body.clone();
        for &child in &node.children {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&self.nodes[child].heading);
            let rendered = self.render_subtree(child);
            if !rendered.is_empty() {
                out.push_str("\n\n");
                out.push_str(&rendered);
            }
        }
        out
    }

    /// Render a node's heading, body, and descendants (used when folding a
    /// stray node into an open section).
    pub fn render_with_heading(&self, idx: usize) -> String {
        let node = &self.nodes[idx];
        let rendered = self.render_subtree(idx);
        if rendered.is_empty() {
            node.heading.clone()
        } else {
            format!("{}\n\n{}", node.heading, rendered)
        }
    }
}

/// Join body lines, rejoining soft-hyphenated wraps:
/// `word-\ncontinuation` becomes `wordcontinuation`.
fn join_wrapped(lines: &[&str]) -> String {
    let mut out = String::new();
    for raw in lines {
        let line = raw.trim_end();
        if out.ends_with('-')
            && out.chars().rev().nth(1).is_some_and(|c| c.is_alphabetic())
            && line
                .trim_start()
                .chars()
                .next()
                .is_some_and(|c| c.is_lowercase())
        {
            out.pop();
            out.push_str(line.trim_start());
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}
