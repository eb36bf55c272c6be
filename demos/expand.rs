//! Expand a macro file (or a built-in sample) and print the document.
//!
//! Run with: RUST_LOG=tikzmac=trace cargo run --example expand --features tracing -- figure.tikz

use tracing::level_filters::LevelFilter;

fn main() {
    // RUST_LOG wins; otherwise show debug output
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing::Level::DEBUG).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args().nth(1);
    let input = path
        .as_deref()
        .map(|path| std::fs::read_to_string(path).expect("Failed to read file"))
        .unwrap_or_else(|| {
            r#"\coor{0,0}{A}{$A$}{}
\coor{4,0}{B}{$B$}{}
\coor{1,3}{C}{$C$}{}
\draw[thick] (A)-- node{$c$} (B)--(C)--cycle;
\circle{A}{B}{C}{dashed}
\pic{B}{A}{C}{$\alpha$}{}
\vec{A}{$(A)!0.5!(C)$}{$v$}{red}"#
                .to_string()
        });

    let options = tikzmac::PreprocessOptions::default()
        .source_name(path.unwrap_or_else(|| "<sample>".to_string()));
    match tikzmac::preprocess_with_options(&input, &options) {
        Ok(document) => println!("{}", document),
        Err(e) => eprintln!("{:?}", miette::Report::new(e)),
    }
}
