use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::grammar::Grammar;
use crate::rules::{Order, Pattern, Symbol};
use crate::syntree::{Constituent, SynTree, Word};

/// How the best derivation of a label over a span was built.
#[derive(Debug, Clone, PartialEq)]
pub enum Backpointer {
  /// A rule rewriting straight to the source token.
  Terminal {
    label: Symbol,
    token: String,
    span: (usize, usize),
  },
  /// A single-label rule applied over a constituent of the same span.
  Unary {
    label: Symbol,
    child: Symbol,
    span: (usize, usize),
  },
  /// Two adjacent constituents split at `split`.
  Binary {
    label: Symbol,
    left: Symbol,
    right: Symbol,
    span: (usize, usize),
    split: usize,
  },
}

impl Backpointer {
  pub fn label(&self) -> &Symbol {
    match self {
      Self::Terminal { label, .. } | Self::Unary { label, .. } | Self::Binary { label, .. } => {
        label
      }
    }
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Terminal { span, .. } | Self::Unary { span, .. } | Self::Binary { span, .. } => *span,
    }
  }

  pub fn is_unary(&self) -> bool {
    matches!(self, Self::Unary { .. })
  }

  /// Children as templates and pattern keys name them: `NN[0]`, `VBD[1]`.
  pub fn tagged_children(&self) -> Option<(String, String)> {
    match self {
      Self::Binary { left, right, .. } => {
        Some((left.tagged(Order::Left), right.tagged(Order::Right)))
      }
      _ => None,
    }
  }
}

impl fmt::Display for Backpointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Terminal { token, .. } => write!(f, "{:?}", token),
      Self::Unary { child, .. } => write!(f, "<- {}", child),
      Self::Binary {
        left, right, split, ..
      } => write!(
        f,
        "{} {} @{}",
        left.tagged(Order::Left),
        right.tagged(Order::Right),
        split
      ),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
  pub score: f64,
  pub back: Backpointer,
}

/// Best entry per label for one span. Labels without a derivation are absent,
/// which reads as a score of zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
  best: IndexMap<Symbol, Entry>,
  // terminal or binary entries that a unary rule outscored
  shadowed: IndexMap<Symbol, Entry>,
}

impl Cell {
  fn with_capacity(n: usize) -> Self {
    Self {
      best: IndexMap::with_capacity(n),
      shadowed: IndexMap::new(),
    }
  }

  pub fn score(&self, label: &Symbol) -> f64 {
    self.best.get(label).map_or(0.0, |e| e.score)
  }

  pub fn get(&self, label: &Symbol) -> Option<&Entry> {
    self.best.get(label)
  }

  /// Best terminal or binary entry for `label`, ignoring unary promotions.
  /// This is what a unary entry's child refers to.
  pub fn base(&self, label: &Symbol) -> Option<&Entry> {
    match self.shadowed.get(label) {
      Some(entry) => Some(entry),
      None => self.best.get(label).filter(|e| !e.back.is_unary()),
    }
  }

  pub fn len(&self) -> usize {
    self.best.len()
  }

  pub fn is_empty(&self) -> bool {
    self.best.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Entry)> {
    self.best.iter()
  }

  /// Records `back` if `score` strictly beats the label's current score.
  /// Ties keep the earlier derivation.
  fn offer(&mut self, label: &Symbol, score: f64, back: impl FnOnce() -> Backpointer) -> bool {
    if score > self.score(label) {
      self.best.insert(label.clone(), Entry { score, back: back() });
      true
    } else {
      false
    }
  }

  /// Applies single-label rules to the terminal and binary entries of the
  /// cell. A promotion replaces an entry only on a strictly greater score,
  /// and its child is always one of the entries from before promotion, so
  /// promotions never chain or cycle.
  fn promote(&mut self, g: &Grammar, span: (usize, usize)) {
    let base = self.best.clone();

    for (child, entry) in base.iter() {
      let Some(parents) = g.scores().candidates(&Pattern::Terminal(child.name.clone())) else {
        continue;
      };
      for (label, w) in parents.iter() {
        if g.templates().unary(label, child).is_none() {
          continue;
        }
        let score = w.weight * entry.score;
        let improved = self.offer(label, score, || Backpointer::Unary {
          label: label.clone(),
          child: child.clone(),
          span,
        });
        if improved {
          if let Some(outscored) = base.get(label) {
            self
              .shadowed
              .entry(label.clone())
              .or_insert_with(|| outscored.clone());
          }
          trace!(i = span.0, j = span.1, label = %label, %child, score, "promoted");
        }
      }
    }
  }
}

/// Triangular CKY chart over a tokenized sentence: one cell for every span
/// `(i, j)` with `0 <= i < j <= n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
  tokens: Vec<String>,
  // cells[i][j - i - 1] holds span (i, j)
  cells: Vec<Vec<Cell>>,
}

impl Chart {
  fn new(tokens: &[&str]) -> Self {
    let n = tokens.len();
    Self {
      tokens: tokens.iter().map(|t| t.to_string()).collect(),
      cells: (0..n).map(|i| vec![Cell::default(); n - i]).collect(),
    }
  }

  /// Fills the chart bottom-up over span length, keeping only the best
  /// derivation per cell and label.
  pub fn parse(g: &Grammar, tokens: &[&str]) -> Self {
    let mut chart = Self::new(tokens);
    let scores = g.scores();
    let n = tokens.len();
    let width = g.labels().len();
    let unary = g.config().unary_rules;

    for (p, token) in tokens.iter().enumerate() {
      let mut cell = Cell::with_capacity(width);
      if let Some(labels) = scores.candidates(&Pattern::terminal(token)) {
        for (label, w) in labels.iter() {
          cell.offer(label, w.weight, || Backpointer::Terminal {
            label: label.clone(),
            token: token.to_string(),
            span: (p, p + 1),
          });
        }
      } else {
        trace!(position = p, token, "unknown token");
      }
      if unary {
        cell.promote(g, (p, p + 1));
      }
      chart.cells[p][0] = cell;
    }

    for len in 2..=n {
      for i in 0..=(n - len) {
        let j = i + len;
        let mut cell = Cell::with_capacity(width);

        for k in (i + 1)..j {
          let left = chart.cell(i, k);
          let right = chart.cell(k, j);
          for (y, ey) in left.iter() {
            for (z, ez) in right.iter() {
              let key = Pattern::binary(y, z);
              let Some(parents) = scores.candidates(&key) else {
                continue;
              };
              for (x, w) in parents.iter() {
                let score = w.weight * ey.score * ez.score;
                let improved = cell.offer(x, score, || Backpointer::Binary {
                  label: x.clone(),
                  left: y.clone(),
                  right: z.clone(),
                  span: (i, j),
                  split: k,
                });
                if improved {
                  trace!(i, k, j, label = %x, score, "improved");
                }
              }
            }
          }
        }

        if unary {
          cell.promote(g, (i, j));
        }
        chart.cells[i][len - 1] = cell;
      }
    }

    debug!(
      tokens = n,
      entries = chart.entries(),
      parsed = chart.root().is_some(),
      "filled chart"
    );

    chart
  }

  fn cell(&self, i: usize, j: usize) -> &Cell {
    &self.cells[i][j - i - 1]
  }

  /// The cell for span `(i, j)`, if that is a valid span of the sentence.
  pub fn get_cell(&self, i: usize, j: usize) -> Option<&Cell> {
    if i < j && j <= self.len() {
      Some(self.cell(i, j))
    } else {
      None
    }
  }

  pub fn get(&self, i: usize, j: usize, label: &Symbol) -> Option<&Entry> {
    self.get_cell(i, j)?.get(label)
  }

  /// See [`Cell::base`].
  pub fn get_base(&self, i: usize, j: usize, label: &Symbol) -> Option<&Entry> {
    self.get_cell(i, j)?.base(label)
  }

  /// Best `PHRASE` over the whole sentence.
  pub fn root(&self) -> Option<&Entry> {
    self.get(0, self.len(), &Symbol::phrase())
  }

  /// Number of tokens covered.
  pub fn len(&self) -> usize {
    self.tokens.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Total number of (span, label) entries.
  pub fn entries(&self) -> usize {
    self.cells.iter().flatten().map(Cell::len).sum()
  }

  /// Rebuilds the best derivation of `label` over `(i, j)` as a tree.
  pub fn derivation(&self, label: &Symbol, i: usize, j: usize) -> Option<SynTree<Symbol, String>> {
    self.derive(self.get(i, j, label)?)
  }

  fn derive(&self, entry: &Entry) -> Option<SynTree<Symbol, String>> {
    let (i, j) = entry.back.span();
    let cons = Constituent {
      value: entry.back.label().clone(),
      span: (i, j),
    };

    let children = match &entry.back {
      Backpointer::Terminal { token, span, .. } => vec![SynTree::Leaf(Word {
        value: token.clone(),
        span: *span,
      })],
      Backpointer::Unary { child, .. } => vec![self.derive(self.get_base(i, j, child)?)?],
      Backpointer::Binary {
        left, right, split, ..
      } => vec![
        self.derivation(left, i, *split)?,
        self.derivation(right, *split, j)?,
      ],
    };

    Some(SynTree::Branch(cons, children))
  }
}

impl fmt::Display for Chart {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for len in 1..=self.len() {
      for i in 0..=(self.len() - len) {
        let j = i + len;
        for (label, entry) in self.cell(i, j).iter() {
          writeln!(f, "  {}..{}: {} {:e} {}", i, j, label, entry.score, entry.back)?;
        }
      }
    }
    Ok(())
  }
}
