//! crfprep command-line tool
//!
//! Trains CRF models through an external column-based trainer and labels
//! new data with them. Feature data is read as JSON Lines, one sequence per
//! line.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crfprep_core::{ContiguousGrouper, SequenceEncoder, TemplateCompiler, Vocabulary};
use crfprep_trainer::config::DEFAULT_PROGRAM;
use crfprep_trainer::{load_records, Chunker, CliTagger, CrfTrainer, SequenceRecord, TrainerConfig};

/// Suffix appended to the model path for the saved vocabulary.
const VOCAB_SUFFIX: &str = ".vocab.json";

/// CLI arguments
#[derive(Parser)]
#[command(name = "crfprep")]
#[command(about = "Prepare data and templates for column-based CRF trainers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model and save its feature vocabulary next to it
    Train(TrainArgs),
    /// Print a template with feature names replaced by column numbers
    CompileTemplate {
        /// Vocabulary saved by `train`
        #[arg(long)]
        vocab: PathBuf,
        /// Template referencing features by name
        #[arg(short, long)]
        template: PathBuf,
    },
    /// Print unlabeled trainer rows for a JSON Lines file
    Encode {
        /// Vocabulary saved by `train`
        #[arg(long)]
        vocab: PathBuf,
        /// JSON Lines input
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Label a JSON Lines file with a trained model
    Label(LabelArgs),
}

#[derive(Args)]
struct LabelArgs {
    /// Vocabulary saved by `train`; defaults to `<model>.vocab.json`
    #[arg(long)]
    vocab: Option<PathBuf>,
    /// Trained model
    #[arg(short, long)]
    model: PathBuf,
    /// JSON Lines input
    #[arg(short, long)]
    input: PathBuf,
    /// Print grouped spans as JSON instead of one token per line
    #[arg(long)]
    spans: bool,
    /// Tagger executable
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    wapiti: PathBuf,
    /// Directory for temporary files
    #[arg(long)]
    temp_dir: Option<PathBuf>,
    /// Keep temporary input files after the run
    #[arg(long)]
    keep_temp: bool,
}

impl LabelArgs {
    fn vocab_file(&self) -> PathBuf {
        self.vocab
            .clone()
            .unwrap_or_else(|| vocab_path(&self.model))
    }

    /// Tagger settings taken from the label flags.
    fn tagger_config(&self) -> TrainerConfig {
        let mut config = TrainerConfig::new(&self.model)
            .with_program(&self.wapiti)
            .with_unlink_temp(!self.keep_temp);
        if let Some(dir) = &self.temp_dir {
            config = config.with_temp_dir(dir);
        }
        config
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Labeled JSON Lines training data
    #[arg(long)]
    train: PathBuf,
    /// Labeled JSON Lines development data
    #[arg(long)]
    dev: Option<PathBuf>,
    /// Where to write the development check report
    #[arg(long, requires = "dev")]
    out_dev: Option<PathBuf>,
    /// Template referencing features by name
    #[arg(short, long)]
    template: Option<PathBuf>,
    /// Model output path
    #[arg(short, long)]
    model: Option<PathBuf>,
    /// JSON trainer configuration; flags override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Trainer executable
    #[arg(long)]
    wapiti: Option<PathBuf>,
    /// Feature pinned to the front columns (repeatable)
    #[arg(long = "front")]
    front: Vec<String>,
    /// Scope prefix for the generated unigram block
    #[arg(long, conflicts_with = "no_unigrams")]
    unigram_scope: Option<String>,
    /// Do not append the generated unigram block
    #[arg(long)]
    no_unigrams: bool,
    /// Directory for temporary files
    #[arg(long)]
    temp_dir: Option<PathBuf>,
    /// Keep temporary files after the run
    #[arg(long)]
    keep_temp: bool,
    /// Extra arguments passed to the trainer
    #[arg(last = true)]
    trainer_args: Vec<String>,
}

/// Path of the vocabulary saved alongside `model`.
fn vocab_path(model: &Path) -> PathBuf {
    let mut path = model.as_os_str().to_owned();
    path.push(VOCAB_SUFFIX);
    PathBuf::from(path)
}

/// Trainer configuration from `--config`, with flags applied on top.
fn build_config(args: &TrainArgs) -> Result<TrainerConfig> {
    let mut config = match &args.config {
        Some(path) => TrainerConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrainerConfig::default(),
    };

    if let Some(path) = &args.template {
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;
        config = config.with_template(template);
    }
    if let Some(model) = &args.model {
        config = config.with_model_path(model);
    }
    if let Some(program) = &args.wapiti {
        config = config.with_program(program);
    }
    if !args.front.is_empty() {
        config = config.with_front_features(&args.front);
    }
    if args.no_unigrams {
        config = config.with_unigram_scope(None::<String>);
    } else if let Some(scope) = &args.unigram_scope {
        config = config.with_unigram_scope(Some(scope));
    }
    if let Some(dir) = &args.temp_dir {
        config = config.with_temp_dir(dir);
    }
    if args.keep_temp {
        config = config.with_unlink_temp(false);
    }
    if !args.trainer_args.is_empty() {
        config = config.with_trainer_args(&args.trainer_args);
    }

    Ok(config)
}

fn read_records(path: &Path) -> Result<Vec<SequenceRecord>> {
    load_records(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_vocab(path: &Path) -> Result<Vocabulary> {
    Vocabulary::load_json(path)
        .with_context(|| format!("Failed to load vocabulary {}", path.display()))
}

fn train(args: &TrainArgs) -> Result<()> {
    let config = build_config(args)?;
    let train: Vec<_> = read_records(&args.train)?
        .into_iter()
        .map(SequenceRecord::into_labeled)
        .collect();
    let dev: Option<Vec<_>> = match &args.dev {
        Some(path) => Some(
            read_records(path)?
                .into_iter()
                .map(SequenceRecord::into_labeled)
                .collect(),
        ),
        None => None,
    };

    let mut trainer = CrfTrainer::new(config)?;
    trainer
        .fit(&train, dev.as_deref(), args.out_dev.as_deref())
        .context("Training failed")?;

    let model_path = trainer.config().model_path.clone();
    let vocab_file = vocab_path(&model_path);
    let vocab = trainer.into_vocabulary();
    vocab
        .save_json(&vocab_file)
        .with_context(|| format!("Failed to save vocabulary {}", vocab_file.display()))?;
    info!(
        model = %model_path.display(),
        vocab = %vocab_file.display(),
        features = vocab.len(),
        "model trained"
    );
    Ok(())
}

fn compile_template<W: Write>(vocab: &Path, template: &Path, out: &mut W) -> Result<()> {
    let vocab = read_vocab(vocab)?;
    let text = fs::read_to_string(template)
        .with_context(|| format!("Failed to read template {}", template.display()))?;
    let compiled = TemplateCompiler::new()?.compile(&text, &vocab)?;

    out.write_all(compiled.as_str().as_bytes())?;
    out.flush()?;
    Ok(())
}

fn encode<W: Write>(vocab: &Path, input: &Path, out: &mut W) -> Result<()> {
    let vocab = read_vocab(vocab)?;
    let encoder = SequenceEncoder::new(&vocab);

    for record in read_records(input)? {
        let encoded = encoder.encode_sequence(&record.features);
        writeln!(out, "{}\n", encoded.to_input_block())?;
    }
    out.flush()?;
    Ok(())
}

fn label<W: Write>(args: &LabelArgs, out: &mut W) -> Result<()> {
    let tagger = CliTagger::from_config(&args.tagger_config());
    let chunker = Chunker::new(tagger, read_vocab(&args.vocab_file())?);
    info!(
        model = %args.model.display(),
        features = chunker.vocabulary().len(),
        "labeling"
    );

    for (n, record) in read_records(&args.input)?.into_iter().enumerate() {
        let doc = record.into_document();
        if args.spans {
            let grouped = chunker
                .chunk(&doc, &ContiguousGrouper)
                .with_context(|| format!("Failed to label sequence {}", n + 1))?;
            writeln!(out, "{}", serde_json::to_string(&grouped)?)?;
        } else {
            let pairs = chunker
                .label(&doc)
                .with_context(|| format!("Failed to label sequence {}", n + 1))?;
            for (token, label) in pairs {
                writeln!(out, "{token}\t{label}")?;
            }
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Train(args) => train(&args),
        Commands::CompileTemplate { vocab, template } => {
            compile_template(&vocab, &template, &mut io::stdout().lock())
        }
        Commands::Encode { vocab, input } => {
            encode(&vocab, &input, &mut BufWriter::new(io::stdout().lock()))
        }
        Commands::Label(args) => label(&args, &mut BufWriter::new(io::stdout().lock())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn train_args(extra: &[&str]) -> TrainArgs {
        let mut argv = vec!["crfprep", "train", "--train", "train.jsonl"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Train(args) => args,
            _ => panic!("expected train"),
        }
    }

    fn label_args(extra: &[&str]) -> LabelArgs {
        let mut argv = vec!["crfprep", "label"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Label(args) => args,
            _ => panic!("expected label"),
        }
    }

    fn write_vocab(path: &Path) {
        let seq = vec![crfprep_core::types::observation([
            ("token", crfprep_core::FeatureValue::from("the")),
            ("tag", "DT".into()),
        ])];
        let mut vocab = Vocabulary::new(["token", "tag"]);
        vocab.fit([&seq]);
        vocab.save_json(path).unwrap();
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_vocab_path() {
        assert_eq!(
            vocab_path(Path::new("models/ner.wapiti")),
            PathBuf::from("models/ner.wapiti.vocab.json")
        );
    }

    #[test]
    fn test_flags_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("ner.tpl");
        fs::write(&template, "*:w=%x[0,token]\n").unwrap();
        let template = template.to_string_lossy().into_owned();

        let args = train_args(&[
            "--template",
            &template,
            "--model",
            "ner.model",
            "--front",
            "token",
            "--front",
            "pos",
            "--no-unigrams",
            "--keep-temp",
            "--",
            "--algo",
            "l-bfgs",
        ]);
        let config = build_config(&args).unwrap();

        assert_eq!(config.feature_template, "*:w=%x[0,token]\n");
        assert_eq!(config.model_path, PathBuf::from("ner.model"));
        assert_eq!(config.front_features, vec!["token", "pos"]);
        assert_eq!(config.unigram_scope, None);
        assert!(!config.unlink_temp);
        assert_eq!(config.trainer_args, vec!["--algo", "l-bfgs"]);
    }

    #[test]
    fn test_config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crf.json");
        fs::write(
            &path,
            r#"{"model_path": "from-file.model", "unigram_scope": "w", "verbose": false}"#,
        )
        .unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = build_config(&train_args(&["--config", &path])).unwrap();
        assert_eq!(config.model_path, PathBuf::from("from-file.model"));
        assert_eq!(config.unigram_scope.as_deref(), Some("w"));
        assert!(!config.verbose);

        let config =
            build_config(&train_args(&["--config", &path, "--unigram-scope", "u2"])).unwrap();
        assert_eq!(config.unigram_scope.as_deref(), Some("u2"));
    }

    #[test]
    fn test_out_dev_requires_dev() {
        let parsed = Cli::try_parse_from([
            "crfprep",
            "train",
            "--train",
            "t.jsonl",
            "--out-dev",
            "report.txt",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_unigram_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "crfprep",
            "train",
            "--train",
            "t.jsonl",
            "--unigram-scope",
            "u",
            "--no-unigrams",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_label_vocab_defaults_next_to_model() {
        let args = label_args(&["--model", "models/ner.wapiti", "--input", "in.jsonl"]);
        assert_eq!(args.vocab_file(), PathBuf::from("models/ner.wapiti.vocab.json"));

        let args = label_args(&[
            "--model",
            "ner.wapiti",
            "--input",
            "in.jsonl",
            "--vocab",
            "shared.json",
        ]);
        assert_eq!(args.vocab_file(), PathBuf::from("shared.json"));
    }

    #[test]
    fn test_label_tagger_config() {
        let args = label_args(&[
            "--model",
            "ner.wapiti",
            "--input",
            "in.jsonl",
            "--wapiti",
            "/opt/wapiti",
            "--temp-dir",
            "/tmp/crf",
            "--keep-temp",
        ]);
        let config = args.tagger_config();
        assert_eq!(config.model_path, PathBuf::from("ner.wapiti"));
        assert_eq!(config.program, PathBuf::from("/opt/wapiti"));
        assert_eq!(config.temp_dir, Some(PathBuf::from("/tmp/crf")));
        assert!(!config.unlink_temp);

        let config = label_args(&["--model", "m", "--input", "i"]).tagger_config();
        assert_eq!(config.program, PathBuf::from(DEFAULT_PROGRAM));
        assert!(config.unlink_temp);
    }

    #[test]
    fn test_encode_and_compile_template_output() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("ner.vocab.json");
        write_vocab(&vocab);

        let input = dir.path().join("in.jsonl");
        fs::write(
            &input,
            concat!(
                "{\"features\": [{\"token\": \"the\", \"tag\": \"DT\"}, {\"token\": \"dog\"}]}\n",
                "{\"features\": [{\"token\": \"barks\", \"tag\": \"VB\"}]}\n",
            ),
        )
        .unwrap();
        let mut out = Vec::new();
        encode(&vocab, &input, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "the DT\ndog ~\n\nbarks VB\n\n");

        let template = dir.path().join("ner.tpl");
        fs::write(&template, "# %x[0,shape]\n*:p=%x[-1, tag]\n").unwrap();
        let mut out = Vec::new();
        compile_template(&vocab, &template, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "# %x[0,shape]\n*:p=%x[-1,1]\n");
    }

    #[test]
    fn test_missing_vocab_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.vocab.json");
        let err = encode(&missing, &dir.path().join("in.jsonl"), &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("absent.vocab.json"));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Tagger stand-in: appends `ENT` to every input row.
        fn write_tagger(dir: &Path) -> PathBuf {
            let path = dir.join("fake-wapiti");
            fs::write(&path, "#!/bin/sh\nawk '{ print $0 \" ENT\" }' \"$4\"\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn write_input(dir: &Path) -> PathBuf {
            let input = dir.join("in.jsonl");
            fs::write(
                &input,
                concat!(
                    "{\"features\": [{\"token\": \"new\"}, {\"token\": \"york\"}], ",
                    "\"tokens\": [\"New\", \"York\"]}\n",
                ),
            )
            .unwrap();
            input
        }

        #[test]
        fn test_label_runs_tagger_with_default_vocab() {
            let dir = tempfile::tempdir().unwrap();
            let model = dir.path().join("ner.wapiti");
            write_vocab(&vocab_path(&model));
            let tagger = write_tagger(dir.path());
            let input = write_input(dir.path());
            let temp = dir.path().join("tmp");
            fs::create_dir(&temp).unwrap();

            let argv = |spans: bool| {
                let mut argv = vec![
                    "--model".to_string(),
                    model.display().to_string(),
                    "--input".into(),
                    input.display().to_string(),
                    "--wapiti".into(),
                    tagger.display().to_string(),
                    "--temp-dir".into(),
                    temp.display().to_string(),
                ];
                if spans {
                    argv.push("--spans".into());
                }
                argv
            };

            let words = argv(false);
            let args = label_args(&words.iter().map(String::as_str).collect::<Vec<_>>());
            let mut out = Vec::new();
            label(&args, &mut out).unwrap();
            assert_eq!(String::from_utf8(out).unwrap(), "New\tENT\nYork\tENT\n\n");

            let words = argv(true);
            let args = label_args(&words.iter().map(String::as_str).collect::<Vec<_>>());
            let mut out = Vec::new();
            label(&args, &mut out).unwrap();
            let spans: Vec<crfprep_core::Span> =
                serde_json::from_slice(out.trim_ascii()).unwrap();
            assert_eq!(spans.len(), 1);
            assert_eq!(spans[0].text, "New York");
            assert_eq!((spans[0].start_token, spans[0].end_token), (0, 2));

            assert_eq!(fs::read_dir(&temp).unwrap().count(), 0);
        }

        #[test]
        fn test_train_saves_vocab_next_to_model() {
            let dir = tempfile::tempdir().unwrap();
            let train_file = dir.path().join("train.jsonl");
            fs::write(
                &train_file,
                "{\"features\": [{\"token\": \"Tokyo\", \"shape\": \"Xx\"}], \"labels\": [\"B-LOC\"]}\n",
            )
            .unwrap();
            let template = dir.path().join("ner.tpl");
            fs::write(&template, "*:s=%x[0,shape]\n").unwrap();
            let model = dir.path().join("ner.wapiti");

            let argv = [
                "crfprep".to_string(),
                "train".into(),
                "--train".into(),
                train_file.display().to_string(),
                "--template".into(),
                template.display().to_string(),
                "--model".into(),
                model.display().to_string(),
                "--wapiti".into(),
                "true".into(),
                "--temp-dir".into(),
                dir.path().display().to_string(),
            ];
            let Commands::Train(args) = Cli::try_parse_from(argv).unwrap().command else {
                panic!("expected train");
            };
            train(&args).unwrap();

            let vocab = Vocabulary::load_json(vocab_path(&model)).unwrap();
            assert_eq!(vocab.names(), ["token", "shape"]);
        }
    }
}
