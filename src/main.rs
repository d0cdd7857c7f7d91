//! mdrender - Fast markdown renderer

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};

use mdrender::{Buffer, Format, ParseFlags, RenderFlags, RenderOptions, render};

#[derive(Parser)]
#[command(name = "mdrender")]
#[command(version, about = "Fast markdown renderer", long_about = None)]
#[command(after_help = "EXAMPLES:
    mdrender README.md -o README.html     Render to HTML
    mdrender -f json notes.md             Print the document tree as JSON
    cat doc.md | mdrender --commonmark    Strict CommonMark from stdin")]
struct Cli {
    /// Markdown input file (reads stdin when omitted or "-")
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output file (writes stdout when omitted)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Output format: html, xhtml or json
    #[arg(short, long, default_value_t = Format::Html)]
    format: Format,

    /// Strict CommonMark, without tables, strikethrough or task lists
    #[arg(long)]
    commonmark: bool,

    /// Treat raw HTML as text
    #[arg(long)]
    no_html: bool,

    /// Enable $ and $$ LaTeX math spans
    #[arg(long)]
    math: bool,

    /// Keep javascript: link destinations
    #[arg(long)]
    allow_js_uri: bool,

    /// Do not insert anchors into headings
    #[arg(long)]
    no_anchors: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> RenderOptions {
        let mut parse_flags = if self.commonmark {
            ParseFlags::empty()
        } else {
            ParseFlags::DEFAULT
        };
        parse_flags.set(ParseFlags::NO_HTML, self.no_html);
        parse_flags.set(ParseFlags::LATEX_MATH_SPANS, self.math);

        let mut render_flags = RenderFlags::empty();
        render_flags.set(RenderFlags::ALLOW_JS_URI, self.allow_js_uri);
        render_flags.set(RenderFlags::NO_HEADLINE_ANCHORS, self.no_anchors);

        RenderOptions::new(self.format)
            .with_parse_flags(parse_flags)
            .with_render_flags(render_flags)
    }

    fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> mdrender::Result<()> {
    let input = read_input(cli.input.as_deref())?;

    let mut out = Buffer::new();
    let len = render(&input, &cli.options(), &mut out)?;
    let rendered = &out.as_bytes()[..len];

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)?;
            tracing::info!(path = %path.display(), bytes = len, "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> io::Result<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read(path),
        _ => {
            let mut input = Vec::new();
            io::stdin().lock().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}
