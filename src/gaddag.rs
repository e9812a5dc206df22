use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::iter::once;
use std::path::Path;

use hashbrown::{HashMap, HashSet};

use crate::error::SolverError;
use crate::letter_set::LetterSet;

/// Pivot marker separating the reversed prefix from the suffix on every
/// path through the automaton.
pub const SEP: char = '$';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArcId(u32);

#[derive(Debug, Default)]
struct Node {
    edges: HashMap<char, ArcId>,
}

#[derive(Debug)]
struct Arc {
    label: char,
    target: NodeId,
    /// Letters that complete an accepted word when consumed right after
    /// this arc
    letters: LetterSet,
}

/// Lexicon automaton for anchored move generation. Every word of length
/// n is reachable from any of its letters: for each split point the
/// automaton holds the reversed prefix, the pivot marker, and the
/// remaining suffix, with the word's last letter kept in the terminal
/// letter set of the final arc. Suffix tails are shared between splits,
/// so the structure is a DAG, not a tree.
pub struct Gaddag {
    nodes: Vec<Node>,
    arcs: Vec<Arc>,
    initial_state: NodeId,
    initial_arc: ArcId,
    n_words: usize,
}

impl Gaddag {
    pub fn new() -> Self {
        let initial_state = NodeId(0);
        let initial_arc = ArcId(0);
        Self {
            nodes: vec![Node::default()],
            arcs: vec![Arc {
                label: SEP,
                target: initial_state,
                letters: LetterSet::empty(),
            }],
            initial_state,
            initial_arc,
            n_words: 0,
        }
    }

    /// Reads a word list (one word per line) into a fresh automaton.
    /// Lines starting with an uppercase letter are skipped (likely proper
    /// names), as are words shorter than two letters and lines holding
    /// anything outside a-z after lowercasing.
    pub fn build_from_file<P: AsRef<Path>>(path: P) -> Result<Self, SolverError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SolverError::io(path, e))?;
        let reader = BufReader::new(file);

        let mut gaddag = Self::new();
        for line in reader.lines() {
            let line = line.map_err(|e| SolverError::io(path, e))?;
            if line.chars().next().map_or(false, |c| c.is_uppercase()) {
                continue;
            }
            let word = line.trim().to_lowercase();
            if word.chars().count() < 2 || !word.chars().all(|c| c.is_ascii_lowercase()) {
                continue;
            }
            gaddag.add_word(&word)?;
        }
        log::info!("loaded {} words", gaddag.n_words);
        Ok(gaddag)
    }

    /// Adds one lowercase word of length >= 2.
    pub fn add_word(&mut self, word: &str) -> Result<(), SolverError> {
        let w: Vec<char> = word.chars().collect();
        let n = w.len();
        if n < 2 {
            return Ok(());
        }

        self.n_words += 1;
        if self.n_words % 5000 == 0 {
            log::debug!("... {} {}", self.n_words, word);
        }

        // Last two letters stored compactly: the path w[n-1]..w[2] ends
        // in an arc labelled w[1] holding w[0] in its terminal set.
        let mut st = self.initial_state;
        for i in (2..n).rev() {
            st = self.add_arc(st, w[i]);
        }
        self.add_final_arc(st, w[1], w[0]);

        // Whole word reversed, then the pivot, holding the last letter.
        let mut st = self.initial_state;
        for i in (0..n - 1).rev() {
            st = self.add_arc(st, w[i]);
        }
        let mut st = self.add_final_arc(st, SEP, w[n - 1]);
        let final_state = st;

        // Remaining split points, stitched onto the spine built above so
        // identical residual suffixes share one downstream node.
        for m in (1..=n.saturating_sub(2)).rev() {
            let force = st;
            let mut walk = self.initial_state;
            for i in (1..=m).rev() {
                walk = self.add_arc(walk, w[i - 1]);
            }
            walk = self.add_arc(walk, SEP);
            let narc = self.force_arc(walk, w[m], force)?;
            if force == final_state {
                self.arcs[narc.0 as usize].letters.insert(w[n - 1]);
            }
            st = walk;
        }
        Ok(())
    }

    pub fn initial_arc(&self) -> ArcId {
        self.initial_arc
    }

    /// The arc leaving `arc`'s target labelled `letter`
    pub fn next_arc(&self, arc: ArcId, letter: char) -> Option<ArcId> {
        let target = self.arc(arc).target;
        self.node(target).edges.get(&letter).copied()
    }

    /// Follows `next_arc` for every character of `path`
    pub fn lookup_path(&self, arc: ArcId, path: &str) -> Option<ArcId> {
        let mut arc = arc;
        for ch in path.chars() {
            arc = self.next_arc(arc, ch)?;
        }
        Some(arc)
    }

    pub fn has_letter(&self, arc: ArcId, letter: char) -> bool {
        self.arc(arc).letters.contains(letter)
    }

    pub fn is_word(&self, word: &str) -> bool {
        let w: Vec<char> = word.chars().collect();
        let n = w.len();
        if n < 2 {
            return false;
        }
        let path: String = once(w[0])
            .chain(once(SEP))
            .chain(w[1..n - 1].iter().copied())
            .collect();
        match self.lookup_path(self.initial_arc, &path) {
            Some(arc) => self.has_letter(arc, w[n - 1]),
            None => false,
        }
    }

    /// The letters that can be placed between `left` and `right` (the
    /// tiles already on the board on either side, in reading order) so
    /// that the combined word is accepted. Unconstrained squares admit
    /// the whole alphabet.
    pub fn cross_set(&self, left: &str, right: &str) -> LetterSet {
        match (left.is_empty(), right.is_empty()) {
            (true, true) => LetterSet::any(),
            (false, true) => self.cross_set_suffix(left),
            (true, false) => self.cross_set_prefix(right),
            (false, false) => self.cross_set_middle(left, right),
        }
    }

    /// Letters that can precede `word`
    fn cross_set_prefix(&self, word: &str) -> LetterSet {
        let w: Vec<char> = word.chars().collect();
        let last = w[w.len() - 1];
        let mut set = LetterSet::empty();
        for i in 'a'..='z' {
            let path: String = once(i)
                .chain(once(SEP))
                .chain(w[..w.len() - 1].iter().copied())
                .collect();
            if let Some(arc) = self.lookup_path(self.initial_arc, &path) {
                if self.has_letter(arc, last) {
                    set.insert(i);
                }
            }
        }
        set
    }

    /// Letters that can follow `word`
    fn cross_set_suffix(&self, word: &str) -> LetterSet {
        let w: Vec<char> = word.chars().collect();
        let path: String = once(w[0])
            .chain(once(SEP))
            .chain(w[1..].iter().copied())
            .collect();
        match self.lookup_path(self.initial_arc, &path) {
            Some(arc) => self.arc(arc).letters,
            None => LetterSet::empty(),
        }
    }

    /// Letters that join `left` and `right` into one accepted word
    fn cross_set_middle(&self, left: &str, right: &str) -> LetterSet {
        let path: String = left.chars().rev().chain(once(SEP)).collect();
        let arc = match self.lookup_path(self.initial_arc, &path) {
            Some(arc) => arc,
            None => return LetterSet::empty(),
        };
        let r: Vec<char> = right.chars().collect();
        let last = r[r.len() - 1];
        let mut set = LetterSet::empty();
        for i in 'a'..='z' {
            let rest: String = once(i).chain(r[..r.len() - 1].iter().copied()).collect();
            if let Some(rarc) = self.lookup_path(arc, &rest) {
                if self.has_letter(rarc, last) {
                    set.insert(i);
                }
            }
        }
        set
    }

    /// Writes the automaton as a GraphViz digraph, one line per arc.
    /// Arcs whose terminal set is nonempty carry it in brackets after
    /// the label.
    pub fn dump_dot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "digraph {{")?;
        let mut seen = HashSet::new();
        let mut stack = vec![self.initial_state];
        seen.insert(self.initial_state);
        while let Some(id) = stack.pop() {
            let mut arcs: Vec<&ArcId> = self.node(id).edges.values().collect();
            arcs.sort_by_key(|a| self.arc(**a).label);
            for &arc_id in arcs {
                let arc = self.arc(arc_id);
                if arc.letters.is_empty() {
                    writeln!(out, "N{} -> N{} [label=\"{}\"];", id.0, arc.target.0, arc.label)?;
                } else {
                    let letters: String = arc.letters.iter().collect();
                    writeln!(
                        out,
                        "N{} -> N{} [label=\"{} [{}]\"];",
                        id.0, arc.target.0, arc.label, letters
                    )?;
                }
                if seen.insert(arc.target) {
                    stack.push(arc.target);
                }
            }
        }
        writeln!(out, "}}")
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    fn arc(&self, id: ArcId) -> &Arc {
        &self.arcs[id.0 as usize]
    }

    fn new_node(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::default());
        id
    }

    fn new_arc(&mut self, label: char, target: NodeId) -> ArcId {
        let id = ArcId(self.arcs.len() as u32);
        self.arcs.push(Arc {
            label,
            target,
            letters: LetterSet::empty(),
        });
        id
    }

    /// Walks the arc labelled `ch` out of `node`, creating it (and a
    /// fresh target) if absent. Returns the target node.
    fn add_arc(&mut self, node: NodeId, ch: char) -> NodeId {
        if let Some(&arc) = self.node(node).edges.get(&ch) {
            return self.arc(arc).target;
        }
        let target = self.new_node();
        let arc = self.new_arc(ch, target);
        self.nodes[node.0 as usize].edges.insert(ch, arc);
        target
    }

    /// add_arc plus `c2` recorded in the arc's terminal set
    fn add_final_arc(&mut self, node: NodeId, c1: char, c2: char) -> NodeId {
        let target = self.add_arc(node, c1);
        if let Some(&arc) = self.node(node).edges.get(&c1) {
            self.arcs[arc.0 as usize].letters.insert(c2);
        }
        target
    }

    /// Adds an arc labelled `ch` from `node` to exactly `target`. If the
    /// arc already exists it must already point there; anything else is
    /// a construction invariant violation.
    fn force_arc(&mut self, node: NodeId, ch: char, target: NodeId) -> Result<ArcId, SolverError> {
        if let Some(&arc) = self.node(node).edges.get(&ch) {
            let existing = self.arc(arc).target;
            if existing != target {
                return Err(SolverError::ArcConflict {
                    letter: ch,
                    existing: existing.0,
                    wanted: target.0,
                });
            }
            return Ok(arc);
        }
        let arc = self.new_arc(ch, target);
        self.nodes[node.0 as usize].edges.insert(ch, arc);
        Ok(arc)
    }
}

impl Default for Gaddag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Gaddag;
    use crate::letter_set::LetterSet;

    fn build(words: &[&str]) -> Gaddag {
        let mut gaddag = Gaddag::new();
        for w in words {
            gaddag.add_word(w).unwrap();
        }
        gaddag
    }

    #[test]
    fn test_is_word() {
        let gaddag = build(&["cat", "at"]);
        assert!(gaddag.is_word("cat"));
        assert!(gaddag.is_word("at"));
        assert!(!gaddag.is_word("a"));
        assert!(!gaddag.is_word("ca"));
        assert!(!gaddag.is_word("ta"));
        assert!(!gaddag.is_word("cats"));
    }

    #[test]
    fn test_suffix_spine_is_shared() {
        // Words overlapping in every split must coexist without arc
        // conflicts, and stay individually recognizable
        let words = ["car", "care", "cares", "at", "cat", "cats", "scare"];
        let gaddag = build(&words);
        for w in words {
            assert!(gaddag.is_word(w), "{} lost during construction", w);
        }
        assert!(!gaddag.is_word("scares"));
        assert!(!gaddag.is_word("ares"));
    }

    #[test]
    fn test_cross_set_unconstrained() {
        let gaddag = build(&["cat", "at"]);
        assert!(gaddag.cross_set("", "").is_any());
    }

    #[test]
    fn test_cross_set_prefix() {
        let gaddag = build(&["cat", "at", "bat"]);
        let set = gaddag.cross_set("", "at");
        assert_eq!(set.iter().collect::<String>(), "bc");
    }

    #[test]
    fn test_cross_set_suffix() {
        let gaddag = build(&["cat", "cab", "at"]);
        let set = gaddag.cross_set("ca", "");
        assert_eq!(set.iter().collect::<String>(), "bt");
        assert!(gaddag.cross_set("at", "").is_empty());
    }

    #[test]
    fn test_cross_set_middle() {
        let gaddag = build(&["cat", "cot", "at"]);
        let set = gaddag.cross_set("c", "t");
        assert_eq!(set.iter().collect::<String>(), "ao");
    }

    #[test]
    fn test_cross_set_members_spell_words() {
        let gaddag = build(&["bead", "bread", "brad", "bad"]);
        let set = gaddag.cross_set("b", "ad");
        for l in set.iter() {
            let word: String = format!("b{}ad", l);
            assert!(gaddag.is_word(&word));
        }
        assert!(set.contains('e'));
        assert!(set.contains('r'));
        assert!(!set.contains('z'));
    }

    #[test]
    fn test_short_words_ignored() {
        let mut gaddag = Gaddag::new();
        gaddag.add_word("a").unwrap();
        assert!(!gaddag.is_word("a"));
        assert!(gaddag.cross_set("", "").is_any());
    }

    #[test]
    fn test_dump_dot() {
        let gaddag = build(&["at"]);
        let mut out = Vec::new();
        gaddag.dump_dot(&mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(dot.starts_with("digraph {\n"));
        assert!(dot.trim_end().ends_with('}'));
        // the compact path: arc 't' from the initial state carries 'a'
        assert!(dot.contains("[label=\"t [a]\"]"));
    }

    #[test]
    fn test_terminal_sets() {
        let gaddag = build(&["cat", "car"]);
        let set: LetterSet = gaddag.cross_set("ca", "");
        assert_eq!(set.iter().collect::<String>(), "rt");
    }
}
