use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scfgtrans::{Err, Grammar, GrammarConfig};

/// Translates sentences with a binarized synchronous context-free grammar.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// Rule file: one `lhs<TAB>rhs<TAB>template<TAB>weight` rule per line
  #[clap(short, long, default_value = "data/rules.binary")]
  rulefile: PathBuf,

  /// File to translate, one sentence per line. Reads stdin interactively if absent
  #[clap(short, long)]
  infile: Option<PathBuf>,

  /// Where to write translations, one per line
  #[clap(short, long, default_value = "translations")]
  outfile: PathBuf,

  /// Let known source words pass through untranslated as bare phrases
  #[clap(long)]
  identity_rules: bool,

  /// Don't apply single-label rules like `PHRASE -> NN`
  #[clap(long)]
  no_unary: bool,

  /// Print the parse chart for every sentence
  #[clap(short, long)]
  chart: bool,

  /// Print the best derivation tree for every sentence
  #[clap(short, long)]
  tree: bool,
}

impl Args {
  fn config(&self) -> GrammarConfig {
    GrammarConfig::default()
      .with_identity_rules(self.identity_rules)
      .with_unary_rules(!self.no_unary)
  }
}

fn translate(g: &Grammar, sentence: &str, opts: &Args) -> String {
  let tokens = scfgtrans::utils::tokenize(sentence);

  if opts.chart {
    eprintln!("chart:\n{}", g.parse_chart(&tokens));
  }
  if opts.tree {
    match g.derivation(&tokens) {
      Some(tree) => eprintln!("{}\n", tree),
      None => eprintln!("no derivation\n"),
    }
  }

  g.translate_tokens(&tokens)
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = Args::parse();

  let g = Grammar::read_from_file(&opts.rulefile, opts.config())?;
  info!(rulefile = %opts.rulefile.display(), labels = g.labels().len(), "loaded grammar");

  let mut out = BufWriter::new(File::create(&opts.outfile)?);

  match &opts.infile {
    Some(infile) => {
      let src = fs::read_to_string(infile)?;
      let mut count = 0;
      for line in src.lines() {
        let translation = translate(&g, line, &opts);
        println!("{}", translation);
        writeln!(out, "{}", translation)?;
        count += 1;
      }
      info!(sentences = count, outfile = %opts.outfile.display(), "done");
    }
    None => {
      let stdin = io::stdin();
      let mut input = String::new();
      loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
          // ctrl+d
          break;
        }
        let translation = translate(&g, input.trim_end_matches(['\n', '\r']), &opts);
        println!("{}", translation);
        writeln!(out, "{}", translation)?;
        out.flush()?;
      }
    }
  }

  out.flush()?;
  Ok(())
}
