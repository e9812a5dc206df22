use std::fmt;
use std::hash::{Hash, Hasher};

use hashbrown::HashSet;
use itertools::Itertools;

use crate::board::Board;
use crate::gaddag::{ArcId, Gaddag, SEP};
use crate::letter_set::LetterSet;
use crate::rack::Rack;
use crate::util::{Anchor, Direction, Position};

/// One legal placement. `start` is the square of the word's first
/// letter; `played` holds only the tiles consumed from the rack, blanks
/// as '*'. Two placements are the same play when they put the same word
/// at the same start, however the traversal reached them.
#[derive(Debug, Clone)]
pub struct Solution {
    pub start: Anchor,
    pub word: String,
    pub score: i32,
    pub played: String,
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.word == other.word
    }
}

impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start.hash(state);
        self.word.hash(state);
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<PLAY: @{},{} {} {} {}>",
            self.start.pos.row, self.start.pos.col, self.start.dir, self.word, self.score
        )
    }
}

/// Enumerates every legal play for the board's rack by walking the
/// automaton outward from each anchor square, leftward first, pivoting
/// through the separator to extend rightward.
pub struct Solver<'a> {
    board: &'a Board,
    gaddag: &'a Gaddag,
}

impl<'a> Solver<'a> {
    pub fn new(board: &'a Board, gaddag: &'a Gaddag) -> Self {
        Self { board, gaddag }
    }

    pub fn solve(&self) -> Vec<Solution> {
        let mut plays = HashSet::new();
        for anchor in self.anchors() {
            self.gen(
                &anchor,
                0,
                "",
                self.board.rack(),
                &[0],
                &[],
                self.gaddag.initial_arc(),
                &mut plays,
            );
        }
        let mut plays: Vec<Solution> = plays.into_iter().collect();
        plays.sort_by(|a, b| {
            a.score
                .cmp(&b.score)
                .then(a.start.cmp(&b.start))
                .then(a.word.cmp(&b.word))
        });
        plays
    }

    /// Every empty square with at least one played 4-neighbour, in both
    /// orientations. A virgin board gets the center square instead so an
    /// opening move can be generated.
    pub fn anchors(&self) -> Vec<Anchor> {
        let mut anchors = Vec::new();
        for row in 0..self.board.rows() {
            for col in 0..self.board.cols() {
                if self.board.get_letter(row, col).is_some() {
                    continue;
                }
                let (r, c) = (row as i32, col as i32);
                let adjacent = [(r, c + 1), (r, c - 1), (r + 1, c), (r - 1, c)]
                    .iter()
                    .any(|&(nr, nc)| self.letter_at(nr, nc).is_some());
                if adjacent {
                    for &dir in Direction::iter() {
                        anchors.push(Anchor::new(row, col, dir));
                    }
                }
            }
        }
        if anchors.is_empty() && self.board.is_empty() {
            let center = self.board.center();
            for &dir in Direction::iter() {
                anchors.push(Anchor::new(center.row, center.col, dir));
            }
        }
        anchors
    }

    #[allow(clippy::too_many_arguments)]
    fn gen(
        &self,
        anchor: &Anchor,
        pos: i32,
        word: &str,
        rack: &Rack,
        score: &[i32],
        multipliers: &[i32],
        arc: ArcId,
        plays: &mut HashSet<Solution>,
    ) {
        if let Some(l) = self.square_letter(anchor, pos) {
            // tile already on the board counts face value, no premiums
            let mut score = score.to_vec();
            score[0] += Board::letter_points(l);
            self.goon(
                anchor,
                pos,
                l,
                word,
                rack,
                &score,
                multipliers,
                self.gaddag.next_arc(arc, l),
                arc,
                plays,
            );
        } else if !rack.is_empty() {
            let (partial, cross_set) = self.cross_set_at(anchor, pos);
            let letter_mult = self.letter_multiplier(anchor, pos);
            let word_mult = self.word_multiplier(anchor, pos);
            let mut tried = LetterSet::empty();

            for l in rack.distinct_letters() {
                if !cross_set.contains(l) || tried.contains(l) {
                    continue;
                }
                let new_rack = match rack.remove(l) {
                    Some(r) => r,
                    None => continue,
                };
                let letter_score = Board::letter_points(l) * letter_mult;
                let (new_score, new_multipliers) =
                    branch(score, multipliers, letter_score, word_mult, partial);
                self.goon(
                    anchor,
                    pos,
                    l,
                    word,
                    &new_rack,
                    &new_score,
                    &new_multipliers,
                    self.gaddag.next_arc(arc, l),
                    arc,
                    plays,
                );
                tried.insert(l);
            }

            if rack.has_blank() {
                if let Some(new_rack) = rack.remove_blank() {
                    // a blank scores nothing but still takes the word premium
                    let (new_score, new_multipliers) =
                        branch(score, multipliers, 0, word_mult, partial);
                    for l in cross_set.iter() {
                        if tried.contains(l) {
                            continue;
                        }
                        self.goon(
                            anchor,
                            pos,
                            l,
                            word,
                            &new_rack,
                            &new_score,
                            &new_multipliers,
                            self.gaddag.next_arc(arc, l),
                            arc,
                            plays,
                        );
                        tried.insert(l);
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn goon(
        &self,
        anchor: &Anchor,
        pos: i32,
        l: char,
        word: &str,
        rack: &Rack,
        score: &[i32],
        multipliers: &[i32],
        new_arc: Option<ArcId>,
        old_arc: ArcId,
        plays: &mut HashSet<Solution>,
    ) {
        if pos <= 0 {
            let word = format!("{}{}", l, word);
            if self.gaddag.has_letter(old_arc, l)
                && self.terminates(anchor, pos - 1)
                && self.is_empty_at(anchor, 1)
            {
                self.record(anchor, pos, &word, rack, score, multipliers, plays);
            }
            if let Some(arc) = new_arc {
                if self.can_go(anchor, pos - 1) {
                    self.gen(anchor, pos - 1, &word, rack, score, multipliers, arc, plays);
                }
                // switch from prepending to appending
                if let Some(pivot) = self.gaddag.next_arc(arc, SEP) {
                    if self.terminates(anchor, pos - 1) && self.can_go(anchor, 1) {
                        self.gen(anchor, 1, &word, rack, score, multipliers, pivot, plays);
                    }
                }
            }
        } else {
            let word = format!("{}{}", word, l);
            if self.gaddag.has_letter(old_arc, l) && self.terminates(anchor, pos + 1) {
                self.record(anchor, pos, &word, rack, score, multipliers, plays);
            }
            if let Some(arc) = new_arc {
                if self.can_go(anchor, pos + 1) {
                    self.gen(anchor, pos + 1, &word, rack, score, multipliers, arc, plays);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn record(
        &self,
        anchor: &Anchor,
        pos: i32,
        word: &str,
        remaining: &Rack,
        score: &[i32],
        multipliers: &[i32],
        plays: &mut HashSet<Solution>,
    ) {
        let score = calculate_score(remaining, score, multipliers);
        let start = word_start(anchor, pos, word.chars().count());
        let played = self.board.rack().played_against(remaining);
        plays.insert(Solution {
            start,
            word: word.to_string(),
            score,
            played,
        });
    }

    /// Sum of the face values of the cross-direction neighbours, plus
    /// the letters that keep the cross word valid at this square
    fn cross_set_at(&self, anchor: &Anchor, pos: i32) -> (i32, LetterSet) {
        let p = match self.abs_position(anchor, pos) {
            Some(p) => p,
            None => return (0, LetterSet::empty()),
        };
        let cross = Anchor {
            pos: p,
            dir: anchor.dir.flip(),
        };
        let (before_score, before) = self.slurp(&cross, -1);
        let (after_score, after) = self.slurp(&cross, 1);
        let set = self.gaddag.cross_set(&before, &after);
        (before_score + after_score, set)
    }

    /// Contiguous run of played tiles on one side of `start`, read in
    /// board order, with its point sum
    fn slurp(&self, start: &Anchor, step: i32) -> (i32, String) {
        let mut s = String::new();
        let mut score = 0;
        let mut pos = step;
        while let Some(l) = self.square_letter(start, pos) {
            if step > 0 {
                s.push(l);
            } else {
                s.insert(0, l);
            }
            score += Board::letter_points(l);
            pos += step;
        }
        (score, s)
    }

    fn letter_at(&self, row: i32, col: i32) -> Option<char> {
        if self.board.contains(row, col) {
            self.board.get_letter(row as usize, col as usize)
        } else {
            None
        }
    }

    fn abs_position(&self, anchor: &Anchor, pos: i32) -> Option<Position> {
        let (row, col) = anchor.offset(pos);
        if self.board.contains(row, col) {
            Some(Position {
                row: row as usize,
                col: col as usize,
            })
        } else {
            None
        }
    }

    fn square_letter(&self, anchor: &Anchor, pos: i32) -> Option<char> {
        let p = self.abs_position(anchor, pos)?;
        self.board.get_letter(p.row, p.col)
    }

    fn can_go(&self, anchor: &Anchor, pos: i32) -> bool {
        self.abs_position(anchor, pos).is_some()
    }

    fn is_empty_at(&self, anchor: &Anchor, pos: i32) -> bool {
        match self.abs_position(anchor, pos) {
            Some(p) => self.board.get_letter(p.row, p.col).is_none(),
            None => false,
        }
    }

    /// Off the board, or on it but unoccupied
    fn terminates(&self, anchor: &Anchor, pos: i32) -> bool {
        self.square_letter(anchor, pos).is_none()
    }

    fn letter_multiplier(&self, anchor: &Anchor, pos: i32) -> i32 {
        match self.abs_position(anchor, pos) {
            Some(p) => self.board.letter_multiplier(p.row, p.col),
            None => 1,
        }
    }

    fn word_multiplier(&self, anchor: &Anchor, pos: i32) -> i32 {
        match self.abs_position(anchor, pos) {
            Some(p) => self.board.word_multiplier(p.row, p.col),
            None => 1,
        }
    }
}

/// Branch-owned copies of the score vector and multiplier list with one
/// newly placed tile folded in. Cross-word points enter as their own
/// entry so word multipliers later apply to the main word only.
fn branch(
    score: &[i32],
    multipliers: &[i32],
    letter_score: i32,
    word_mult: i32,
    partial: i32,
) -> (Vec<i32>, Vec<i32>) {
    let mut score = score.to_vec();
    let mut multipliers = multipliers.to_vec();
    score[0] += letter_score;
    multipliers.push(word_mult);
    if partial > 0 {
        score.push(word_mult * (partial + letter_score));
    }
    (score, multipliers)
}

fn calculate_score(remaining: &Rack, score: &[i32], multipliers: &[i32]) -> i32 {
    let mut score = score.to_vec();
    for m in multipliers.iter().sorted().rev() {
        score[0] *= m;
    }
    let bonus = if remaining.is_empty() { 35 } else { 0 };
    bonus + score.iter().sum::<i32>()
}

fn word_start(anchor: &Anchor, pos: i32, word_len: usize) -> Anchor {
    if pos > 0 {
        anchor.add(pos - word_len as i32 + 1)
    } else {
        anchor.add(pos)
    }
}
