use std::fmt;

/// A labelled node of a derivation and the source span it covers.
#[derive(Debug, PartialEq, Clone)]
pub struct Constituent<T> {
  pub value: T,
  pub span: (usize, usize),
}

impl<T> fmt::Display for Constituent<T>
where
  T: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

/// A source token at the bottom of a derivation.
#[derive(Debug, PartialEq, Clone)]
pub struct Word<U> {
  pub value: U,
  pub span: (usize, usize),
}

impl<U> fmt::Display for Word<U>
where
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}..{}: {}", self.span.0, self.span.1, self.value)
  }
}

#[derive(Debug, PartialEq, Clone)]
pub enum SynTree<T, U> {
  Branch(Constituent<T>, Vec<SynTree<T, U>>),
  Leaf(Word<U>),
}

impl<T, U> SynTree<T, U> {
  pub fn is_leaf(&self) -> bool {
    matches!(self, Self::Leaf(_))
  }

  pub fn span(&self) -> (usize, usize) {
    match self {
      Self::Branch(c, _) => c.span,
      Self::Leaf(w) => w.span,
    }
  }

  pub fn get_leaf(&self) -> Option<&Word<U>> {
    match self {
      Self::Leaf(w) => Some(w),
      _ => None,
    }
  }

  pub fn get_branch(&self) -> Option<(&Constituent<T>, &Vec<SynTree<T, U>>)> {
    match self {
      Self::Branch(c, cs) => Some((c, cs)),
      _ => None,
    }
  }

  /// Leaves in source order.
  pub fn leaves(&self) -> Vec<&Word<U>> {
    let mut out = Vec::new();
    self.collect_leaves(&mut out);
    out
  }

  fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Word<U>>) {
    match self {
      Self::Leaf(w) => out.push(w),
      Self::Branch(_, children) => {
        for c in children {
          c.collect_leaves(out);
        }
      }
    }
  }

  /// Height of the tree; a lone leaf has depth 1.
  pub fn depth(&self) -> usize {
    match self {
      Self::Leaf(_) => 1,
      Self::Branch(_, children) => 1 + children.iter().map(Self::depth).max().unwrap_or(0),
    }
  }
}

impl<T, U> SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    match self {
      Self::Leaf(w) => write!(f, "{:indent$}{}", "", w, indent = indent),
      Self::Branch(c, children) => {
        write!(f, "{:indent$}({}", "", c, indent = indent)?;
        for child in children {
          writeln!(f)?;
          child.fmt_indented(f, indent + 2)?;
        }
        write!(f, ")")
      }
    }
  }
}

impl<T, U> fmt::Display for SynTree<T, U>
where
  T: fmt::Display,
  U: fmt::Display,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.fmt_indented(f, 0)
  }
}

#[test]
fn test_display_and_leaves() {
  type Tree = SynTree<String, String>;

  let leaf = |value: &str, at: usize| -> Tree {
    SynTree::Leaf(Word {
      value: value.to_string(),
      span: (at, at + 1),
    })
  };
  let branch = |value: &str, span: (usize, usize), children: Vec<Tree>| -> Tree {
    SynTree::Branch(
      Constituent {
        value: value.to_string(),
        span,
      },
      children,
    )
  };

  let tree = branch(
    "PHRASE",
    (0, 2),
    vec![
      branch("NN", (0, 1), vec![leaf("dog", 0)]),
      branch("VBD", (1, 2), vec![leaf("ran", 1)]),
    ],
  );

  assert_eq!(
    tree.to_string(),
    "(0..2: PHRASE\n  (0..1: NN\n    0..1: dog)\n  (1..2: VBD\n    1..2: ran))"
  );
  assert_eq!(
    tree.leaves().iter().map(|w| w.value.as_str()).collect::<Vec<_>>(),
    vec!["dog", "ran"]
  );
  assert_eq!(tree.depth(), 3);
  assert_eq!(tree.span(), (0, 2));
  assert!(!tree.is_leaf());
}
